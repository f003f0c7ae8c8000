use thiserror::Error;

/// A required element was absent from (or malformed in) a Siren entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SirenError {
    #[error("missing link with rel {rels:?}")]
    MissingLink { rels: Vec<String> },

    #[error("missing property {key:?}")]
    MissingProperty { key: String },

    /// Property exists but holds a different JSON type
    #[error("property {key:?} is {found}, expected {expected}")]
    PropertyType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing action {name:?}")]
    MissingAction { name: String },

    #[error("sub-entity has no href")]
    MissingHref,
}

pub type Result<T> = std::result::Result<T, SirenError>;
