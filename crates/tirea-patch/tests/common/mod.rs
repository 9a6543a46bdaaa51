//! Shared fixtures for integration tests.
#![allow(dead_code)]

use serde_json::{Map, Value};
use tirea_patch::Patchable;

#[derive(Debug, Default, Clone, PartialEq, Patchable)]
pub struct User {
    #[patch(json = "id", skip)]
    pub id: u64,
    #[patch(json = "username", bson = "username")]
    pub username: String,
    #[patch(json = "email_address", bson = "mail")]
    pub email: String,
    #[patch(json = "is_banned", bson = "banned")]
    pub is_banned: bool,
    #[patch(json = "profile", bson = "profile", nested)]
    pub profile: Profile,
    #[patch(json = "ban_data", bson = "ban", replace)]
    pub ban_data: Option<BanData>,
    password_hash: String,
}

impl User {
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[derive(Debug, Default, Clone, PartialEq, Patchable)]
pub struct Profile {
    #[patch(json = "motto", bson = "motto")]
    pub motto: String,
    #[patch(json = "website")]
    pub website: String,
    #[patch(json = "metadata", bson = "meta", nested)]
    pub metadata: Metadata,
}

#[derive(Debug, Default, Clone, PartialEq, Patchable)]
pub struct Metadata {
    #[patch(json = "updated_at", bson = "updated_at")]
    pub updated_at: String,
    #[patch(json = "views", bson = "views")]
    pub views: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Patchable)]
pub struct BanData {
    #[patch(json = "reason", bson = "reason")]
    pub reason: String,
    #[patch(json = "length_days", bson = "length_days")]
    pub length_days: i64,
}

/// A user with every nested field populated.
pub fn populated_user() -> User {
    User {
        id: 7,
        username: "alice".into(),
        email: "alice@example.com".into(),
        is_banned: false,
        profile: Profile {
            motto: "hello".into(),
            website: "https://alice.example.com".into(),
            metadata: Metadata {
                updated_at: "2020-01-01T00:00:00Z".into(),
                views: 10,
            },
        },
        ban_data: Some(BanData {
            reason: "spam".into(),
            length_days: 30,
        }),
        password_hash: "hash".into(),
    }
}

/// Unwrap a `json!` object literal into a patch map.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}
