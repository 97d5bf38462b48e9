use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Untyped user entry as it lives inside the collection document.
pub type Record = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const USERNAME_FIELD: &str = "username";
pub const TOKEN_FIELD: &str = "token";

/// A user of the directory.
///
/// `token` doubles as the bearer credential; an absent token is the empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub token: String,
}

impl User {
    /// Build a user from an untyped record.
    ///
    /// `id` and `username` are required strings; `token` defaults to `""`.
    /// Unknown fields are ignored.
    pub fn from_record(record: &Record) -> Result<Self, ModelError> {
        let id = required_str(record, ID_FIELD)?;
        let username = required_str(record, USERNAME_FIELD)?;
        let token = optional_str(record, TOKEN_FIELD)?.unwrap_or_default();
        Ok(Self { id, username, token })
    }
}

/// Creation input; the id is assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub token: String,
}

impl NewUser {
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        record.insert(USERNAME_FIELD.into(), Value::String(self.username));
        record.insert(TOKEN_FIELD.into(), Value::String(self.token));
        record
    }
}

/// Partial update input. Only the fields present are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserPatch {
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        if let Some(username) = self.username {
            record.insert(USERNAME_FIELD.into(), Value::String(username));
        }
        if let Some(token) = self.token {
            record.insert(TOKEN_FIELD.into(), Value::String(token));
        }
        record
    }
}

fn required_str(record: &Record, field: &'static str) -> Result<String, ModelError> {
    optional_str(record, field)?.ok_or(ModelError::MissingField(field))
}

fn optional_str(record: &Record, field: &'static str) -> Result<Option<String>, ModelError> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ModelError::InvalidField { field, expected: "string" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn from_record_defaults_token() {
        let user = User::from_record(&record(json!({"id": "1", "username": "alice"}))).unwrap();
        assert_eq!(user, User { id: "1".into(), username: "alice".into(), token: String::new() });
    }

    #[test]
    fn from_record_requires_id_and_username() {
        let err = User::from_record(&record(json!({"username": "alice"}))).unwrap_err();
        assert_eq!(err, ModelError::MissingField("id"));

        let err = User::from_record(&record(json!({"id": "1", "token": "t"}))).unwrap_err();
        assert_eq!(err, ModelError::MissingField("username"));
    }

    #[test]
    fn from_record_rejects_non_string_fields() {
        let err = User::from_record(&record(json!({"id": 7, "username": "alice"}))).unwrap_err();
        assert!(matches!(err, ModelError::InvalidField { field: "id", .. }));
    }

    #[test]
    fn from_record_ignores_unknown_fields() {
        let user = User::from_record(&record(json!({"id": "1", "username": "a", "token": "t", "age": 3}))).unwrap();
        assert_eq!(user.token, "t");
    }

    #[test]
    fn patch_only_writes_present_fields() {
        let patch = UserPatch { username: Some("bob".into()), token: None };
        let rec = patch.into_record();
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("username"), Some(&json!("bob")));
        assert!(UserPatch::default().into_record().is_empty());
    }

    #[test]
    fn new_user_deserializes_without_token() {
        let input: NewUser = serde_json::from_value(json!({"username": "pepe"})).unwrap();
        assert_eq!(input.into_record().get("token"), Some(&json!("")));
    }
}
