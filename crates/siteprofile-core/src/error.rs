use thiserror::Error;

use crate::path::FieldPath;

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is absent.
    MissingField,
    /// The field is present but holds the wrong JSON type.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    /// A string that must be non-empty is empty.
    EmptyValue,
    /// A priority that is zero, negative, or not an integer.
    InvalidNumber,
    /// A timestamp that does not parse as a calendar date.
    InvalidDate,
    /// A field not part of the schema, reported only in strict mode.
    UnknownField,
}

impl ErrorKind {
    /// Stable machine-readable reason code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing_field",
            ErrorKind::WrongType { .. } => "wrong_type",
            ErrorKind::EmptyValue => "empty_value",
            ErrorKind::InvalidNumber => "invalid_number",
            ErrorKind::InvalidDate => "invalid_date",
            ErrorKind::UnknownField => "unknown_field",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The first violation found while validating a profile document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    path: FieldPath,
    kind: ErrorKind,
    message: String,
}

impl ValidationError {
    pub(crate) fn missing(path: FieldPath) -> Self {
        Self {
            path,
            kind: ErrorKind::MissingField,
            message: "required field is missing".to_owned(),
        }
    }

    pub(crate) fn wrong_type(path: FieldPath, expected: &'static str, found: &'static str) -> Self {
        Self {
            path,
            kind: ErrorKind::WrongType { expected, found },
            message: format!("expected {expected}, found {found}"),
        }
    }

    pub(crate) fn empty(path: FieldPath) -> Self {
        Self {
            path,
            kind: ErrorKind::EmptyValue,
            message: "must be a non-empty string".to_owned(),
        }
    }

    pub(crate) fn invalid_number(path: FieldPath, raw: &serde_json::Value) -> Self {
        Self {
            path,
            kind: ErrorKind::InvalidNumber,
            message: format!("must be a positive integer, got {raw}"),
        }
    }

    pub(crate) fn invalid_date(path: FieldPath, raw: &str) -> Self {
        Self {
            path,
            kind: ErrorKind::InvalidDate,
            message: format!("\"{raw}\" is not a valid calendar date"),
        }
    }

    pub(crate) fn unknown(path: FieldPath) -> Self {
        Self {
            path,
            kind: ErrorKind::UnknownField,
            message: "field is not part of the site profile schema".to_owned(),
        }
    }

    /// Path of the offending field, e.g. `elements.checkout.button.selectors.primary`.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Human-readable reason, without the path prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Shorthand for `self.kind().code()`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Errors raised while reading, parsing, or storing profile files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {context}: {source}")]
    Yaml {
        context: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("profile url {url:?} does not map to a usable site directory name")]
    UnsafeProfilePath { url: String },

    #[error("unsupported profile format for {path}; expected .json, .yaml or .yml")]
    UnsupportedFormat { path: String },

    #[error("{context} is not a valid site profile: {source}")]
    Invalid {
        context: String,
        #[source]
        source: ValidationError,
    },
}

impl LoadError {
    /// The validation failure behind this error, if that is what it was.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            LoadError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
