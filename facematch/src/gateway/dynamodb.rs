use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{types::AttributeValue, Client};

use crate::{
    consts::consts::{
        FaceId, AGE_KEY, DATE_OF_BIRTH_KEY, DATE_OF_REPORT_KEY, FACE_ID_KEY,
        FAMILY_CONTACT_PHONE_KEY, FIRST_NAME_KEY, LAST_NAME_KEY, MISSING_FROM_LOCATION_KEY,
        REPORTING_CENTRE_CONTACT_KEY,
    },
    model::{
        person::{parse_age, PersonRecord},
        validation::{ValidationError, ValidationResult},
    },
    options::PipelineOptions,
};

use super::{GatewayError, GatewayResult, RecordStore};

type Item = HashMap<String, AttributeValue>;

/// Person records keyed by `faceid`, every attribute stored as a string
pub struct DynamoDBRecordStore {
    client: Client,
    table: String,
}

impl DynamoDBRecordStore {
    pub fn new(sdk: &SdkConfig, options: &PipelineOptions) -> Self {
        Self {
            client: Client::new(sdk),
            table: options.person_table.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoDBRecordStore {
    #[tracing::instrument(skip(self))]
    async fn get_record(&self, face_id: &FaceId) -> GatewayResult<Option<PersonRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(FACE_ID_KEY, AttributeValue::S(face_id.to_string()))
            .send()
            .await
            .map_err(|e| GatewayError::UnableToReadRecord(anyhow!(e)))?;

        // An empty item is treated the same as no item
        match response.item() {
            Some(item) if !item.is_empty() => Ok(Some(record_from_item(item)?)),
            _ => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, record), fields(face_id = %record.face_id))]
    async fn put_record(&self, record: &PersonRecord) -> GatewayResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item_from_record(record)))
            .send()
            .await
            .map_err(|e| GatewayError::UnableToWriteRecord(anyhow!(e)))?;

        Ok(())
    }
}

pub fn item_from_record(record: &PersonRecord) -> Item {
    [
        (FACE_ID_KEY, record.face_id.to_string()),
        (FIRST_NAME_KEY, record.first_name.clone()),
        (LAST_NAME_KEY, record.last_name.clone()),
        (DATE_OF_BIRTH_KEY, record.date_of_birth.clone()),
        (MISSING_FROM_LOCATION_KEY, record.missing_from_location.clone()),
        (AGE_KEY, record.age.to_string()),
        (FAMILY_CONTACT_PHONE_KEY, record.family_contact_phone.clone()),
        (REPORTING_CENTRE_CONTACT_KEY, record.reporting_centre_contact.clone()),
        (DATE_OF_REPORT_KEY, record.date_of_report.clone()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), AttributeValue::S(value)))
    .collect()
}

pub fn record_from_item(item: &Item) -> ValidationResult<PersonRecord> {
    let field = |key: &'static str| -> ValidationResult<String> {
        match item.get(key) {
            Some(AttributeValue::S(value)) => Ok(value.clone()),
            Some(other) => Err(ValidationError::InvalidField {
                field: key,
                reason: format!("expected a string attribute, got {:?}", other),
            }),
            None => Err(ValidationError::MissingField(key)),
        }
    };

    Ok(PersonRecord {
        face_id: FaceId(field(FACE_ID_KEY)?),
        first_name: field(FIRST_NAME_KEY)?,
        last_name: field(LAST_NAME_KEY)?,
        date_of_birth: field(DATE_OF_BIRTH_KEY)?,
        missing_from_location: field(MISSING_FROM_LOCATION_KEY)?,
        age: parse_age(&field(AGE_KEY)?)?,
        family_contact_phone: field(FAMILY_CONTACT_PHONE_KEY)?,
        reporting_centre_contact: field(REPORTING_CENTRE_CONTACT_KEY)?,
        date_of_report: field(DATE_OF_REPORT_KEY)?,
    })
}
