//! Password record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Keys a client may not smuggle in through the free-form part of a record.
/// Identifiers and ownership are always assigned by the server.
const RESERVED_KEYS: &[&str] = &["id", "_id", "userId", "user_id", "createdAt"];

/// A stored credential, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    /// Any additional fields submitted by the client
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Password record creation payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPasswordRecord {
    pub site: String,
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewPasswordRecord {
    /// Drop client-supplied identifiers from the free-form fields
    pub fn sanitized(mut self) -> Self {
        for key in RESERVED_KEYS {
            self.extra.remove(*key);
        }
        self
    }
}
