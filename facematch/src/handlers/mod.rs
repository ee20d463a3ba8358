use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    gateway::GatewayError, model::validation::ValidationError, resolver::identity::ResolutionError,
};

pub mod search;
pub mod stream;
pub mod upload;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    ExternalService(#[from] GatewayError),

    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    #[error("Fail to find similar face")]
    NoSimilarFace,
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// Response of the request/response handlers, shaped like a proxy integration response
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(skip)]
    payload: Value,
}

impl HandlerResponse {
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn error(error: &HandlerError) -> Self {
        Self::new(500, json!({ "message": format!("Error: {}", error) }))
    }

    fn new(status_code: u16, body: Value) -> Self {
        let headers = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]);

        Self {
            status_code,
            headers,
            body: body.to_string(),
            payload: body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// The JSON value `body` was rendered from
    pub fn body_json(&self) -> &Value {
        &self.payload
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_has_message() {
        let response = HandlerResponse::error(&HandlerError::NoSimilarFace);

        assert_eq!(response.status_code, 500);
        assert_eq!(
            *response.body_json(),
            json!({ "message": "Error: Fail to find similar face" })
        );
        assert_eq!(
            response.headers.get("Access-Control-Allow-Origin"),
            Some(&"*".to_string())
        );
    }

    #[test]
    fn body_is_rendered_from_json() {
        let response = HandlerResponse::ok(json!({
            "message": "Success. Face recorded",
            "faceId": "F1"
        }));

        assert!(response.is_success());
        assert_eq!(response.body_json()["faceId"], "F1");
        assert_eq!(
            serde_json::from_str::<Value>(&response.body).unwrap(),
            *response.body_json()
        );
    }
}
