use serde::{Deserialize, Serialize};

use crate::consts::consts::{
    FaceId, AGE_KEY, DATE_OF_BIRTH_KEY, DATE_OF_REPORT_KEY, FAMILY_CONTACT_PHONE_KEY,
    FIRST_NAME_KEY, LAST_NAME_KEY, MISSING_FROM_LOCATION_KEY, REPORTING_CENTRE_CONTACT_KEY,
};

use super::validation::{ValidationError, ValidationResult};

/// A missing person registered against a face. Created once at registration, never updated
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonRecord {
    #[serde(rename = "faceid")]
    pub face_id: FaceId,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "dateofbirth")]
    pub date_of_birth: String,
    #[serde(rename = "missingfromlocation")]
    pub missing_from_location: String,
    pub age: u32,
    #[serde(rename = "familycontactphone")]
    pub family_contact_phone: String,
    #[serde(rename = "reportingcentrecontact")]
    pub reporting_centre_contact: String,
    #[serde(rename = "dateofreport")]
    pub date_of_report: String,
}

impl PersonRecord {
    pub fn new(face_id: FaceId, data: MissingPersonData) -> Self {
        PersonRecord {
            face_id,
            first_name: data.first_name,
            last_name: data.last_name,
            date_of_birth: data.date_of_birth,
            missing_from_location: data.missing_from_location,
            age: data.age,
            family_contact_phone: data.family_contact_phone,
            reporting_centre_contact: data.reporting_centre_contact,
            date_of_report: data.date_of_report,
        }
    }

    pub fn new_test() -> Self {
        PersonRecord::new(FaceId("F1".to_string()), MissingPersonData::new_test())
    }
}

/// Validated biographic data supplied when registering a face
#[derive(Clone, Debug, PartialEq)]
pub struct MissingPersonData {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub missing_from_location: String,
    pub age: u32,
    pub family_contact_phone: String,
    pub reporting_centre_contact: String,
    pub date_of_report: String,
}

impl MissingPersonData {
    pub fn new_test() -> Self {
        MissingPersonData {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: "1990-05-17".to_string(),
            missing_from_location: "Central Park".to_string(),
            age: 33,
            family_contact_phone: "5550100".to_string(),
            reporting_centre_contact: "centre@example.org".to_string(),
            date_of_report: "2024-01-01".to_string(),
        }
    }
}

/// Some clients send numeric fields (age, phone) as JSON numbers, others as strings
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// The `missingpersondata` object as it arrives on the wire, every field optional
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MissingPersonRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub dateofbirth: Option<String>,
    pub missingfromlocation: Option<String>,
    pub age: Option<StringOrNumber>,
    pub familycontactphone: Option<StringOrNumber>,
    pub reportingcentrecontact: Option<String>,
    pub dateofreport: Option<String>,
}

impl MissingPersonRequest {
    pub fn validate(self) -> ValidationResult<MissingPersonData> {
        let age = required(self.age.map(StringOrNumber::into_string), AGE_KEY)?;

        Ok(MissingPersonData {
            first_name: required(self.firstname, FIRST_NAME_KEY)?,
            last_name: required(self.lastname, LAST_NAME_KEY)?,
            date_of_birth: required(self.dateofbirth, DATE_OF_BIRTH_KEY)?,
            missing_from_location: required(self.missingfromlocation, MISSING_FROM_LOCATION_KEY)?,
            age: parse_age(&age)?,
            family_contact_phone: required(
                self.familycontactphone.map(StringOrNumber::into_string),
                FAMILY_CONTACT_PHONE_KEY,
            )?,
            reporting_centre_contact: required(
                self.reportingcentrecontact,
                REPORTING_CENTRE_CONTACT_KEY,
            )?,
            date_of_report: required(self.dateofreport, DATE_OF_REPORT_KEY)?,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> ValidationResult<String> {
    value.ok_or(ValidationError::MissingField(field))
}

pub fn parse_age(value: &str) -> ValidationResult<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| ValidationError::InvalidField {
            field: AGE_KEY,
            reason: format!("{} ({})", e, value),
        })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn full_request() -> serde_json::Value {
        json!({
            "firstname": "Jane",
            "lastname": "Doe",
            "dateofbirth": "1990-05-17",
            "missingfromlocation": "Central Park",
            "age": 33,
            "familycontactphone": 5550100,
            "reportingcentrecontact": "centre@example.org",
            "dateofreport": "2024-01-01"
        })
    }

    #[test]
    fn numeric_fields_accept_numbers() {
        let request: MissingPersonRequest = serde_json::from_value(full_request()).unwrap();

        let data = request.validate().unwrap();

        assert_eq!(data, MissingPersonData::new_test());
    }

    #[test]
    fn numeric_fields_accept_strings() {
        let mut body = full_request();
        body["age"] = json!("33");
        body["familycontactphone"] = json!("5550100");

        let request: MissingPersonRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.validate().unwrap(), MissingPersonData::new_test());
    }

    #[rstest]
    #[case("firstname")]
    #[case("lastname")]
    #[case("dateofbirth")]
    #[case("missingfromlocation")]
    #[case("age")]
    #[case("familycontactphone")]
    #[case("reportingcentrecontact")]
    #[case("dateofreport")]
    fn missing_field_is_named(#[case] field: &'static str) {
        let mut body = full_request();
        body.as_object_mut().unwrap().remove(field);

        let request: MissingPersonRequest = serde_json::from_value(body).unwrap();

        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField(field)),
            "Validation should name the missing field"
        );
    }

    #[test]
    fn non_integer_age_is_rejected() {
        let mut body = full_request();
        body["age"] = json!("thirty");

        let request: MissingPersonRequest = serde_json::from_value(body).unwrap();

        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidField { field: "age", .. })
        ));
    }

    #[test]
    fn record_takes_face_id_and_data() {
        let record = PersonRecord::new(FaceId("F9".to_string()), MissingPersonData::new_test());

        assert_eq!(record.face_id, FaceId("F9".to_string()));
        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.date_of_report, "2024-01-01");
    }
}
