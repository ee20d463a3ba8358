use std::env;

use thiserror::Error;

use crate::consts::consts::{
    BUCKET_ENV, COLLECTION_ENV, DEFAULT_FACE_MATCH_THRESHOLD, FACE_MATCH_THRESHOLD_ENV,
    PERSON_TABLE_ENV, REGION_ENV, SNS_TOPIC_ENV,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(&'static str),

    #[error("Face match threshold must be a number between 0 and 100, got: {0}")]
    InvalidThreshold(String),
}

/// Deployment configuration shared by every handler invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub bucket: String,
    pub collection_id: String,
    pub face_match_threshold: f32,
    pub sns_topic: String,
    pub person_table: String,
    pub region: Option<String>,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl PipelineOptions {
    /// Bucket the image references resolve against
    pub fn set_bucket(mut self, bucket: String) -> Self {
        self.bucket = bucket;
        self
    }

    /// Recognition collection that faces are searched in and indexed into
    pub fn set_collection_id(mut self, collection_id: String) -> Self {
        self.collection_id = collection_id;
        self
    }

    /// Minimum similarity (0-100) a face must reach to count as a match
    pub fn set_face_match_threshold(mut self, face_match_threshold: f32) -> Self {
        self.face_match_threshold = face_match_threshold;
        self
    }

    pub fn set_sns_topic(mut self, sns_topic: String) -> Self {
        self.sns_topic = sns_topic;
        self
    }

    pub fn set_person_table(mut self, person_table: String) -> Self {
        self.person_table = person_table;
        self
    }

    pub fn set_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVariable(name));

        let threshold = required(FACE_MATCH_THRESHOLD_ENV)?;

        let options = PipelineOptions::default()
            .set_bucket(required(BUCKET_ENV)?)
            .set_collection_id(required(COLLECTION_ENV)?)
            .set_face_match_threshold(parse_threshold(&threshold)?)
            .set_sns_topic(required(SNS_TOPIC_ENV)?)
            .set_person_table(required(PERSON_TABLE_ENV)?)
            .set_region(lookup(REGION_ENV));

        Ok(options)
    }
}

fn parse_threshold(value: &str) -> Result<f32, ConfigError> {
    match value.trim().parse::<f32>() {
        Ok(threshold) if (0.0..=100.0).contains(&threshold) => Ok(threshold),
        _ => Err(ConfigError::InvalidThreshold(value.to_string())),
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bucket: "missing-person-images".to_string(),
            collection_id: "missing-person-faces".to_string(),
            face_match_threshold: DEFAULT_FACE_MATCH_THRESHOLD,
            sns_topic: "missing-person-notifications".to_string(),
            person_table: "missing-person-data".to_string(),
            region: None,
        }
    }
}
