//! Request and response bodies for the JSON endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Message;

pub const RESULT_OK: &str = "ok";
pub const RESULT_ERROR: &str = "error";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub data: LoginFormData,
}

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Both credentials must be non-empty
    pub fn validate(&self) -> Result<(), Message> {
        if self.data.username.trim().is_empty() {
            return Err(Message("username is required".into()));
        }
        if self.data.password.is_empty() {
            return Err(Message("password is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponseData {
    pub expiry: i64,
    pub token: String,
}

/// Body of a save request; `data` must be a JSON object.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    pub data: Map<String, Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct SaveWordResponseData {}

#[derive(Debug, Default, Serialize)]
pub struct SavePictureResponseData {}

#[derive(Debug, Deserialize)]
pub struct StatsForm {
    pub data: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct StatsResponseData {
    pub num_words: i64,
    pub num_definitions: i64,
    pub num_undefined_words: i64,
    pub num_phrases: i64,
    pub num_topics: i64,
    pub num_notes: i64,
    pub undefined_words: Vec<String>,
    pub untagged_words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_form_requires_both_fields() {
        let missing: Result<LoginForm, _> =
            serde_json::from_value(json!({ "data": { "username": "dario" } }));
        assert!(missing.is_err());

        let empty: LoginForm =
            serde_json::from_value(json!({ "data": { "username": "", "password": "pw" } }))
                .unwrap();
        assert!(empty.validate().is_err());

        let ok: LoginForm =
            serde_json::from_value(json!({ "data": { "username": "dario", "password": "pw" } }))
                .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn save_form_requires_object_data() {
        assert!(serde_json::from_value::<SaveForm>(json!({})).is_err());
        assert!(serde_json::from_value::<SaveForm>(json!({ "data": [1, 2] })).is_err());
        assert!(serde_json::from_value::<SaveForm>(json!({ "data": {} })).is_ok());
    }

    #[test]
    fn stats_default_is_all_zero() {
        let value = serde_json::to_value(StatsResponseData::default()).unwrap();
        assert_eq!(value["num_words"], json!(0));
        assert_eq!(value["undefined_words"], json!([]));
    }
}
