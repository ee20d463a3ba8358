use thiserror::Error;

use crate::{
    consts::consts::FaceId,
    gateway::{GatewayError, RecordStore},
    model::{
        face::{FaceMatch, FaceMatchResult},
        person::{MissingPersonData, PersonRecord},
    },
};

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("{0}")]
    ExternalService(#[from] GatewayError),

    /// The recognizer knows the face but no biographic record exists for it
    #[error("No person record found for faceid={0}")]
    RecordNotFound(FaceId),
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// A matched face together with the record stored for it
#[derive(Debug, Clone, PartialEq)]
pub struct Identified {
    pub record: PersonRecord,
    pub face_match: FaceMatch,
}

/// Terminal state of one resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NoMatch,
    /// The face matched and a record already exists for it
    Resolved(Identified),
    /// A new record was stored for the face
    Registered { face_id: FaceId },
}

/// Decides, for one face match, whether a person record exists and creates one when registering.
///
/// Holds no state of its own between calls, every invocation can use its own resolver.
pub struct IdentityResolver<'a> {
    records: &'a dyn RecordStore,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(records: &'a dyn RecordStore) -> Self {
        Self { records }
    }

    /// `registration` carries the biographic data in the registration flow. Without it this is
    /// a lookup-only resolution.
    pub async fn resolve(
        &self,
        result: FaceMatchResult,
        registration: Option<&MissingPersonData>,
    ) -> ResolutionResult<Resolution> {
        let Some(data) = registration else {
            let identified = self.lookup(result).await?;

            return Ok(identified.map_or(Resolution::NoMatch, Resolution::Resolved));
        };

        let FaceMatchResult::Matched(face_match) = result else {
            return Ok(Resolution::NoMatch);
        };

        match self.find(&face_match).await? {
            Some(record) => Ok(Resolution::Resolved(Identified { record, face_match })),
            None => Ok(Resolution::Registered {
                face_id: self.register(face_match.face_id, data).await?,
            }),
        }
    }

    /// Lookup-only flow. A matched face without a record is an inconsistency and fails
    pub async fn lookup(&self, result: FaceMatchResult) -> ResolutionResult<Option<Identified>> {
        let FaceMatchResult::Matched(face_match) = result else {
            return Ok(None);
        };

        match self.find(&face_match).await? {
            Some(record) => Ok(Some(Identified { record, face_match })),
            None => Err(ResolutionError::RecordNotFound(face_match.face_id)),
        }
    }

    pub async fn register(
        &self,
        face_id: FaceId,
        data: &MissingPersonData,
    ) -> ResolutionResult<FaceId> {
        let record = PersonRecord::new(face_id, data.clone());

        self.records.put_record(&record).await?;

        log::info!("Registered person record [FaceId: {}]", record.face_id);

        Ok(record.face_id)
    }

    async fn find(&self, face_match: &FaceMatch) -> ResolutionResult<Option<PersonRecord>> {
        log::info!(
            "Match found [FaceId: {}, Similarity: {}]",
            face_match.face_id,
            face_match.similarity
        );

        Ok(self.records.get_record(&face_match.face_id).await?)
    }
}

/// Summary sent to observers when a known face is seen
pub fn render_notification_summary(record: &PersonRecord) -> String {
    format!(
        "{},{} , missing since={}, from location={}",
        record.first_name, record.last_name, record.date_of_report, record.missing_from_location
    )
}

/// Reply to a registration attempt for a face that is already registered
pub fn render_duplicate_summary(record: &PersonRecord) -> String {
    format!(
        "Face already registered under faceid={}, firstname={},lastname={}",
        record.face_id, record.first_name, record.last_name
    )
}

#[cfg(test)]
mod tests {
    use crate::gateway::memory::MemoryRecordStore;

    use super::*;

    fn known_match() -> FaceMatchResult {
        FaceMatchResult::Matched(FaceMatch::new(FaceId("F1".to_string()), 98.2))
    }

    mod resolve {
        use super::*;

        #[tokio::test]
        async fn no_match() {
            let store = MemoryRecordStore::new();

            let resolution = IdentityResolver::new(&store)
                .resolve(FaceMatchResult::NoMatch, Some(&MissingPersonData::new_test()))
                .await
                .unwrap();

            assert_eq!(resolution, Resolution::NoMatch);
            assert!(store.is_empty(), "No match should never write a record");
        }

        #[tokio::test]
        async fn match_with_existing_record() {
            // Given a stored record for F1
            let store = MemoryRecordStore::new().with_record(PersonRecord::new_test());

            // When F1 is matched in a lookup only flow
            let resolution = IdentityResolver::new(&store)
                .resolve(known_match(), None)
                .await
                .unwrap();

            // Then the record is resolved with the match
            assert_eq!(
                resolution,
                Resolution::Resolved(Identified {
                    record: PersonRecord::new_test(),
                    face_match: FaceMatch::new(FaceId("F1".to_string()), 98.2),
                })
            );
        }

        #[tokio::test]
        async fn existing_record_is_not_overwritten_when_registering() {
            let store = MemoryRecordStore::new().with_record(PersonRecord::new_test());

            let mut other = MissingPersonData::new_test();
            other.first_name = "Someone".to_string();

            let resolution = IdentityResolver::new(&store)
                .resolve(known_match(), Some(&other))
                .await
                .unwrap();

            assert!(matches!(resolution, Resolution::Resolved(_)));
            assert_eq!(
                store
                    .get_record(&FaceId("F1".to_string()))
                    .await
                    .unwrap()
                    .unwrap()
                    .first_name,
                "Jane"
            );
        }

        #[tokio::test]
        async fn lookup_without_record_is_an_error() {
            let store = MemoryRecordStore::new();

            let result = IdentityResolver::new(&store)
                .resolve(known_match(), None)
                .await;

            assert!(matches!(
                result,
                Err(ResolutionError::RecordNotFound(FaceId(ref id))) if id == "F1"
            ));
        }

        #[tokio::test]
        async fn registration_without_record_creates_one() {
            let store = MemoryRecordStore::new();

            let resolution = IdentityResolver::new(&store)
                .resolve(known_match(), Some(&MissingPersonData::new_test()))
                .await
                .unwrap();

            assert_eq!(
                resolution,
                Resolution::Registered {
                    face_id: FaceId("F1".to_string())
                }
            );
            assert_eq!(store.len(), 1);
        }
    }

    mod lookup {
        use super::*;

        #[tokio::test]
        async fn no_match_is_none() {
            let store = MemoryRecordStore::new();

            let identified = IdentityResolver::new(&store)
                .lookup(FaceMatchResult::NoMatch)
                .await
                .unwrap();

            assert_eq!(identified, None);
        }

        #[tokio::test]
        async fn known_face_is_identified() {
            let store = MemoryRecordStore::new().with_record(PersonRecord::new_test());

            let identified = IdentityResolver::new(&store)
                .lookup(known_match())
                .await
                .unwrap()
                .unwrap();

            assert_eq!(identified.record, PersonRecord::new_test());
            assert_eq!(identified.face_match.similarity, 98.2);
        }
    }

    mod render {
        use super::*;

        fn scenario_record() -> PersonRecord {
            PersonRecord {
                face_id: FaceId("F1".to_string()),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                date_of_report: "2024-01-01".to_string(),
                missing_from_location: "Central Park".to_string(),
                ..PersonRecord::new_test()
            }
        }

        #[test]
        fn notification_summary() {
            assert_eq!(
                render_notification_summary(&scenario_record()),
                "Jane,Doe , missing since=2024-01-01, from location=Central Park"
            );
        }

        #[test]
        fn duplicate_summary() {
            assert_eq!(
                render_duplicate_summary(&scenario_record()),
                "Face already registered under faceid=F1, firstname=Jane,lastname=Doe"
            );
        }

        #[test]
        fn rendering_is_pure() {
            let record = scenario_record();

            assert_eq!(
                render_notification_summary(&record),
                render_notification_summary(&record.clone())
            );
        }
    }
}
