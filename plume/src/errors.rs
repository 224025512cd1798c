use std::borrow::Cow;

use serde::Serialize;
use thiserror::Error;

/// Error returned by every `PostManager` operation.
///
/// The `Display` text is safe to hand to callers: store failures render as a
/// generic message and keep their detail behind [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum PostError {
    /// Required input was missing or malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A referenced post, comment or user does not exist.
    #[error("{entity} not found")]
    NotFound { entity: EntityKind, id: String },

    /// The caller is authenticated but may not perform the mutation.
    #[error("{message}")]
    Forbidden { message: Cow<'static, str> },

    /// The mutation contradicts the aggregate's current state.
    #[error("{message}")]
    Conflict { message: Cow<'static, str> },

    /// A collaborator did not answer before the operation deadline.
    #[error("operation timed out")]
    Timeout,

    /// The underlying store failed.
    #[error("store failure")]
    Store(#[source] StoreError),
}

impl PostError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PostError::Validation(_) => ErrorKind::Validation,
            PostError::NotFound { .. } => ErrorKind::NotFound,
            PostError::Forbidden { .. } => ErrorKind::Forbidden,
            PostError::Conflict { .. } => ErrorKind::Conflict,
            PostError::Timeout => ErrorKind::Timeout,
            PostError::Store(_) => ErrorKind::Store,
        }
    }
}

impl From<StoreError> for PostError {
    fn from(err: StoreError) -> Self {
        PostError::Store(err)
    }
}

/// Caller-facing classification of a [`PostError`].
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Timeout,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Store => "store",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Post,
    Comment,
    User,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Post => "post",
            EntityKind::Comment => "comment",
            EntityKind::User => "user",
        };
        f.write_str(label)
    }
}

/// Failure raised by an identity or post store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A Lua script answered with an error code the store does not expect.
    #[error("script error: {code}")]
    Script { code: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl StoreError {
    pub fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other { message: message.into() }
    }
}

/// Collection of validation issues encountered while checking operation input.
#[derive(Debug, Error)]
#[error("validation failed: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
