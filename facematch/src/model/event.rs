use base64::{engine::general_purpose, Engine as _};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::consts::consts::{FaceId, ImageRef};

use super::{
    face::{FaceMatch, FaceMatchResult},
    person::{MissingPersonData, MissingPersonRequest},
    validation::{ValidationError, ValidationResult},
};

fn parse_body<T: DeserializeOwned>(body: &str) -> ValidationResult<T> {
    serde_json::from_str(body).map_err(|e| ValidationError::MalformedPayload(e.to_string()))
}

/// Body of a face registration request
#[derive(Deserialize, Debug)]
pub struct UploadRequest {
    pub image: Option<String>,
    pub missingpersondata: Option<MissingPersonRequest>,
}

impl UploadRequest {
    pub fn parse(body: &str) -> ValidationResult<(ImageRef, MissingPersonData)> {
        let request: UploadRequest = parse_body(body)?;

        let image = request.image.ok_or(ValidationError::MissingField("image"))?;
        let data = request
            .missingpersondata
            .ok_or(ValidationError::MissingField("missingpersondata"))?
            .validate()?;

        Ok((ImageRef(image), data))
    }
}

/// Body of a face search request
#[derive(Deserialize, Debug)]
pub struct SearchRequest {
    pub image: Option<String>,
}

impl SearchRequest {
    pub fn parse(body: &str) -> ValidationResult<ImageRef> {
        let request: SearchRequest = parse_body(body)?;

        request
            .image
            .map(ImageRef)
            .ok_or(ValidationError::MissingField("image"))
    }
}

/// A batch of stream records as delivered by the streaming source
#[derive(Deserialize, Debug, Default)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

impl StreamEvent {
    pub fn parse(body: &str) -> ValidationResult<Self> {
        parse_body(body)
    }
}

/// One record of a batch. Any JSON value is accepted, a broken envelope only fails its own `decode`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(from = "Value")]
pub struct StreamRecord {
    pub kinesis: KinesisData,
}

#[derive(Debug, Clone, Default)]
pub struct KinesisData {
    /// Base64 encoded face search payload
    pub data: Option<String>,
    pub sequence_number: Option<String>,
}

impl From<Value> for StreamRecord {
    fn from(envelope: Value) -> Self {
        let field = |pointer: &str| {
            envelope
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        StreamRecord {
            kinesis: KinesisData {
                data: field("/kinesis/data"),
                sequence_number: field("/kinesis/sequenceNumber"),
            },
        }
    }
}

impl StreamRecord {
    pub fn new(payload: &str, sequence_number: Option<&str>) -> Self {
        StreamRecord {
            kinesis: KinesisData {
                data: Some(general_purpose::STANDARD.encode(payload)),
                sequence_number: sequence_number.map(str::to_string),
            },
        }
    }

    pub fn sequence_number(&self) -> Option<&str> {
        self.kinesis.sequence_number.as_deref()
    }

    pub fn decode(&self) -> ValidationResult<FrameSearch> {
        let data = self
            .kinesis
            .data
            .as_deref()
            .ok_or(ValidationError::MissingField("data"))?;

        let bytes = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| ValidationError::MalformedPayload(format!("invalid base64: {}", e)))?;

        let payload: FaceSearchPayload = serde_json::from_slice(&bytes)
            .map_err(|e| ValidationError::MalformedPayload(format!("invalid json: {}", e)))?;

        Ok(payload.into_frame_search())
    }
}

/// What the stream processor saw in one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSearch {
    NoFaceDetected,
    Searched(FaceMatchResult),
}

#[derive(Deserialize, Debug)]
struct FaceSearchPayload {
    #[serde(rename = "FaceSearchResponse")]
    face_search_response: Vec<DetectedFace>,
}

#[derive(Deserialize, Debug)]
struct DetectedFace {
    #[serde(rename = "MatchedFaces", default)]
    matched_faces: Vec<MatchedFace>,
}

#[derive(Deserialize, Debug)]
struct MatchedFace {
    #[serde(rename = "Similarity", default)]
    similarity: Option<f32>,
    #[serde(rename = "Face")]
    face: MatchedFaceDetail,
}

#[derive(Deserialize, Debug)]
struct MatchedFaceDetail {
    #[serde(rename = "FaceId")]
    face_id: String,
}

impl FaceSearchPayload {
    // Only the first detected face of a frame is searched
    fn into_frame_search(self) -> FrameSearch {
        let Some(detected) = self.face_search_response.into_iter().next() else {
            return FrameSearch::NoFaceDetected;
        };

        FrameSearch::Searched(FaceMatchResult::from_candidates(
            detected.matched_faces.into_iter().map(|matched| {
                FaceMatch::new(
                    FaceId(matched.face.face_id),
                    matched.similarity.unwrap_or_default(),
                )
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod upload {
        use super::*;

        #[test]
        fn parses_image_and_details() {
            let body = r#"{
                "image": "missing.jpg",
                "missingpersondata": {
                    "firstname": "Jane", "lastname": "Doe", "dateofbirth": "1990-05-17",
                    "missingfromlocation": "Central Park", "age": "33",
                    "familycontactphone": "5550100",
                    "reportingcentrecontact": "centre@example.org", "dateofreport": "2024-01-01"
                }
            }"#;

            let (image, data) = UploadRequest::parse(body).unwrap();

            assert_eq!(image, ImageRef("missing.jpg".to_string()));
            assert_eq!(data, MissingPersonData::new_test());
        }

        #[test]
        fn missing_person_data_is_required() {
            let result = UploadRequest::parse(r#"{"image": "missing.jpg"}"#);

            assert_eq!(
                result.unwrap_err(),
                ValidationError::MissingField("missingpersondata")
            );
        }

        #[test]
        fn not_json() {
            let result = UploadRequest::parse("image=missing.jpg");

            assert!(matches!(
                result,
                Err(ValidationError::MalformedPayload(_))
            ));
        }
    }

    mod search {
        use super::*;

        #[test]
        fn image_is_required() {
            assert_eq!(
                SearchRequest::parse("{}").unwrap_err(),
                ValidationError::MissingField("image")
            );
        }

        #[test]
        fn parses_image() {
            assert_eq!(
                SearchRequest::parse(r#"{"image": "known.jpg"}"#).unwrap(),
                ImageRef("known.jpg".to_string())
            );
        }
    }

    mod stream {
        use super::*;

        #[test]
        fn matched_face_is_decoded() {
            let record = StreamRecord::new(
                r#"{"FaceSearchResponse": [{"MatchedFaces": [
                    {"Similarity": 97.5, "Face": {"FaceId": "F1"}},
                    {"Similarity": 91.0, "Face": {"FaceId": "F2"}}
                ]}]}"#,
                Some("1"),
            );

            assert_eq!(
                record.decode().unwrap(),
                FrameSearch::Searched(FaceMatchResult::Matched(FaceMatch::new(
                    FaceId("F1".to_string()),
                    97.5
                )))
            );
            assert_eq!(record.sequence_number(), Some("1"));
        }

        #[test]
        fn empty_matches_is_no_match() {
            let record = StreamRecord::new(r#"{"FaceSearchResponse": [{"MatchedFaces": []}]}"#, None);

            assert_eq!(
                record.decode().unwrap(),
                FrameSearch::Searched(FaceMatchResult::NoMatch)
            );
        }

        #[test]
        fn empty_frame_has_no_face() {
            let record = StreamRecord::new(r#"{"FaceSearchResponse": []}"#, None);

            assert_eq!(record.decode().unwrap(), FrameSearch::NoFaceDetected);
        }

        #[test]
        fn invalid_base64() {
            let record = StreamRecord {
                kinesis: KinesisData {
                    data: Some("***".to_string()),
                    sequence_number: None,
                },
            };

            assert!(matches!(
                record.decode(),
                Err(ValidationError::MalformedPayload(_))
            ));
        }

        #[test]
        fn missing_search_response() {
            let record = StreamRecord::new(r#"{"InputInformation": {}}"#, None);

            assert!(matches!(
                record.decode(),
                Err(ValidationError::MalformedPayload(_))
            ));
        }

        #[test]
        fn event_records_keep_order() {
            let event = StreamEvent::parse(
                r#"{"Records": [
                    {"kinesis": {"data": "e30=", "sequenceNumber": "a"}},
                    {"kinesis": {"data": "e30=", "sequenceNumber": "b"}}
                ]}"#,
            )
            .unwrap();

            let sequence: Vec<_> = event
                .records
                .iter()
                .map(|r| r.sequence_number().unwrap())
                .collect();

            assert_eq!(sequence, vec!["a", "b"]);
        }

        #[test]
        fn broken_envelope_fails_only_on_decode() {
            let event = StreamEvent::parse(
                r#"{"Records": [
                    {"kinesis": {"sequenceNumber": "a"}},
                    {"kinesis": {"data": 42, "sequenceNumber": "b"}},
                    "not a record"
                ]}"#,
            )
            .unwrap();

            assert_eq!(event.records.len(), 3);
            assert_eq!(event.records[0].sequence_number(), Some("a"));

            for record in &event.records {
                assert_eq!(
                    record.decode().unwrap_err(),
                    ValidationError::MissingField("data")
                );
            }
        }

        #[test]
        fn records_must_be_a_list() {
            assert!(matches!(
                StreamEvent::parse(r#"{"Records": {"kinesis": {}}}"#),
                Err(ValidationError::MalformedPayload(_))
            ));
        }
    }
}
