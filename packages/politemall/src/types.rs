//! Domain records produced by the crawler and consumed by the store.
//!
//! All IDs are strings taken from the last path segment of a canonical link.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// ID of the user's [`School`]
    pub school: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub code: String,
    pub semester_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub unit_id: String,
    pub title: String,
    pub transparent: bool,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub lesson_id: String,
    pub title: String,
}

/// Response of the site's `users/whoami` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhoAmI {
    pub identifier: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    /// POLITEMall uses this as the user's email address.
    #[serde(default)]
    pub unique_name: Option<String>,
}

/// Response of the site's token exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
}
