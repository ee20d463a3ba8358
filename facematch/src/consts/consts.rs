use std::fmt;

use serde::{Deserialize, Serialize};

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html

/// Identifier the recognition service assigns to an indexed face, primary key of a person record
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct FaceId(pub String);

impl FaceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object key of an image in the backing object store
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Recognition
pub const MAX_FACES: i32 = 1;
pub const DEFAULT_FACE_MATCH_THRESHOLD: f32 = 80.0;
pub const REGISTERED_FACE_SIMILARITY: f32 = 100.0;

// Person record attributes, shared by the inbound request and the key-value item
pub const FACE_ID_KEY: &str = "faceid";
pub const FIRST_NAME_KEY: &str = "firstname";
pub const LAST_NAME_KEY: &str = "lastname";
pub const DATE_OF_BIRTH_KEY: &str = "dateofbirth";
pub const MISSING_FROM_LOCATION_KEY: &str = "missingfromlocation";
pub const AGE_KEY: &str = "age";
pub const FAMILY_CONTACT_PHONE_KEY: &str = "familycontactphone";
pub const REPORTING_CENTRE_CONTACT_KEY: &str = "reportingcentrecontact";
pub const DATE_OF_REPORT_KEY: &str = "dateofreport";

// Environment
pub const BUCKET_ENV: &str = "BUCKETNAME";
pub const COLLECTION_ENV: &str = "REKOGNITIONCOLLECTION";
pub const FACE_MATCH_THRESHOLD_ENV: &str = "REKOGNITIONFACEMATCHTHRESHOLD";
pub const SNS_TOPIC_ENV: &str = "SnsTopic";
pub const PERSON_TABLE_ENV: &str = "PersonData";
pub const REGION_ENV: &str = "AWS_REGION";
