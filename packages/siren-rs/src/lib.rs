//! Siren hypermedia entity model.
//!
//! A [`Entity`] is one node of a Siren graph: classification tags, a property bag,
//! links, actions and embedded sub-entities. Everything decodes leniently (absent
//! or `null` collections become empty) and is read back through typed accessors,
//! so a missing element surfaces as a [`SirenError`] at the point of use.
//!
//! Tag comparisons ([`Entity::class_is`], [`Entity::find_link`]) are exact and
//! order-sensitive: `["self", "describes"]` does not match `["describes", "self"]`.
//!
//! # Example
//!
//! ```rust,ignore
//! let entity: siren::Entity = serde_json::from_str(body)?;
//! let title = entity.require_str("title")?;
//! let org = entity.link(&["https://api.brightspace.com/rels/organization"])?;
//! ```

pub mod error;

pub use error::{Result, SirenError};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One node of a Siren graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, deserialize_with = "nullable_strings")]
    pub class: Vec<String>,
    #[serde(default, deserialize_with = "nullable_strings")]
    pub rel: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<Entity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Action>,
    /// Retrieval URL, present on embedded links to other entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "nullable_strings")]
    pub rel: Vec<String>,
    /// Empty if the document omitted it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
    #[serde(default, deserialize_with = "nullable_strings")]
    pub class: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, deserialize_with = "nullable_strings")]
    pub class: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Entity {
    /// Exact, order-sensitive comparison of the classification tags.
    pub fn class_is(&self, classes: &[&str]) -> bool {
        tags_eq(&self.class, classes)
    }

    /// First link whose rels equal `rels` exactly (same tags, same order).
    pub fn find_link(&self, rels: &[&str]) -> Option<&Link> {
        self.links.iter().find(|link| tags_eq(&link.rel, rels))
    }

    /// Like [`Entity::find_link`] but missing links are an error.
    pub fn link(&self, rels: &[&str]) -> Result<&Link> {
        self.find_link(rels).ok_or_else(|| SirenError::MissingLink {
            rels: rels.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Embedded sub-entities whose class equals `classes` exactly.
    pub fn children_with_class<'a>(
        &'a self,
        classes: &'a [&'a str],
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.class_is(classes))
    }

    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn action(&self, name: &str) -> Result<&Action> {
        self.find_action(name)
            .ok_or_else(|| SirenError::MissingAction { name: name.to_string() })
    }

    pub fn require_href(&self) -> Result<&str> {
        self.href.as_deref().ok_or(SirenError::MissingHref)
    }

    /// String property, `None` if absent or not a string.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn bool_property(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(Value::as_bool)
    }

    pub fn i64_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(Value::as_i64)
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.require(key, "a string", Value::as_str)
    }

    pub fn require_bool(&self, key: &str) -> Result<bool> {
        self.require(key, "a boolean", Value::as_bool)
    }

    pub fn require_i64(&self, key: &str) -> Result<i64> {
        self.require(key, "an integer", Value::as_i64)
    }

    fn require<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        let value = self
            .properties
            .get(key)
            .ok_or_else(|| SirenError::MissingProperty { key: key.to_string() })?;

        extract(value).ok_or_else(|| SirenError::PropertyType {
            key: key.to_string(),
            expected,
            found: json_type(value),
        })
    }
}

fn tags_eq(tags: &[String], query: &[&str]) -> bool {
    tags.len() == query.len() && tags.iter().zip(query).all(|(tag, q)| tag == q)
}

/// Human-readable JSON type, used in error messages.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// `null` tag entries decode as empty strings so positions are preserved.
fn nullable_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}
