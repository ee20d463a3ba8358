use serde::Serialize;

use crate::consts::consts::FaceId;

/// The single best face the recognition service matched, with its similarity in [0, 100]
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FaceMatch {
    #[serde(rename = "faceId")]
    pub face_id: FaceId,
    pub similarity: f32,
}

impl FaceMatch {
    pub fn new(face_id: FaceId, similarity: f32) -> Self {
        Self {
            face_id,
            similarity,
        }
    }
}

/// Outcome of a face search. Request scoped, never persisted
#[derive(Clone, Debug, PartialEq)]
pub enum FaceMatchResult {
    NoMatch,
    Matched(FaceMatch),
}

impl FaceMatchResult {
    /// Candidates are ranked by the recognition service, only the first one is considered
    pub fn from_candidates(candidates: impl IntoIterator<Item = FaceMatch>) -> Self {
        match candidates.into_iter().next() {
            Some(face_match) => FaceMatchResult::Matched(face_match),
            None => FaceMatchResult::NoMatch,
        }
    }

    pub fn face_match(&self) -> Option<&FaceMatch> {
        match self {
            FaceMatchResult::Matched(face_match) => Some(face_match),
            FaceMatchResult::NoMatch => None,
        }
    }
}
