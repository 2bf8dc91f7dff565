use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SourceSelector, SourceType};

/// Shared, type-erased underlying cause of a [`ResponseError`].
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

/// Classification of a failed source call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// The source tried and failed.
    #[default]
    Failed,
    /// The source answered but holds nothing for the given params.
    Empty,
    /// A composition validator refused the intermediate response.
    Rejected,
    /// The call exceeded its configured deadline.
    TimedOut,
    /// The call was aborted through `cancel`.
    Cancelled,
}

impl ErrorKind {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Empty => "empty",
            Self::Rejected => "rejected",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn shown_message<'a>(user_message: &'a Option<String>, message: &'a str) -> &'a str {
    user_message.as_deref().unwrap_or(message)
}

fn status_suffix(status: &u32) -> String {
    if *status > 0 {
        format!(", status = {status}")
    } else {
        String::new()
    }
}

fn cause_suffix(cause: &Option<ErrorCause>) -> String {
    cause
        .as_ref()
        .map(|c| format!(", cause = {c}"))
        .unwrap_or_default()
}

/// Failure reported by a source, a composition, or a middleware layer.
///
/// Errors are values: an error filter derives a modified copy with
/// [`ResponseError::to_builder`] or the `with_*` helpers rather than mutating
/// in place.
///
/// Displays as the user-facing message, followed by the status and cause when set.
#[derive(Debug, Clone, Error)]
#[error(
    "{}{}{}",
    shown_message(.user_message, .message),
    status_suffix(.status),
    cause_suffix(.cause)
)]
pub struct ResponseError {
    kind: ErrorKind,
    message: String,
    user_message: Option<String>,
    status: u32,
    #[source]
    cause: Option<ErrorCause>,
    failed_source: SourceType,
}

impl ResponseError {
    /// Start building an error raised by a source of `failed_source`.
    pub fn builder(failed_source: SourceType, message: impl Into<String>) -> ResponseErrorBuilder {
        ResponseErrorBuilder {
            inner: Self {
                kind: ErrorKind::Failed,
                message: message.into(),
                user_message: None,
                status: 0,
                cause: None,
                failed_source,
            },
        }
    }

    /// A plain `Failed` error.
    pub fn failed(failed_source: SourceType, message: impl Into<String>) -> Self {
        Self::builder(failed_source, message).build()
    }

    /// An `Empty` error: the source has nothing for the requested params.
    #[must_use]
    pub fn empty(failed_source: SourceType) -> Self {
        Self::builder(failed_source, "no data")
            .kind(ErrorKind::Empty)
            .build()
    }

    /// A `Cancelled` error.
    #[must_use]
    pub fn cancelled(failed_source: SourceType) -> Self {
        Self::builder(failed_source, "cancelled")
            .kind(ErrorKind::Cancelled)
            .build()
    }

    /// A `TimedOut` error carrying the elapsed budget in its message.
    #[must_use]
    pub fn timed_out(failed_source: SourceType, after: std::time::Duration) -> Self {
        Self::builder(
            failed_source,
            format!("no response within {}ms", after.as_millis()),
        )
        .kind(ErrorKind::TimedOut)
        .build()
    }

    /// Wrap an underlying error as the cause of a `Failed` error.
    pub fn from_cause<E>(failed_source: SourceType, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::builder(failed_source, cause.to_string())
            .cause(cause)
            .build()
    }

    /// Error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Developer-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message suitable for end users; falls back to [`ResponseError::message`].
    #[must_use]
    pub fn user_message(&self) -> &str {
        self.user_message.as_deref().unwrap_or(&self.message)
    }

    /// Status code, `0` when unset.
    #[must_use]
    pub const fn status(&self) -> u32 {
        self.status
    }

    /// Underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }

    /// Tier of the source that failed.
    #[must_use]
    pub const fn failed_source(&self) -> SourceType {
        self.failed_source
    }

    /// True for [`ErrorKind::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind == ErrorKind::Empty
    }

    /// Copy with a different developer message.
    #[must_use]
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        self.to_builder().message(message).build()
    }

    /// Copy with a user-facing message.
    #[must_use]
    pub fn with_user_message(&self, message: impl Into<String>) -> Self {
        self.to_builder().user_message(message).build()
    }

    /// Copy with a status code.
    #[must_use]
    pub fn with_status(&self, status: u32) -> Self {
        self.to_builder().status(status).build()
    }

    /// Builder pre-filled with every field of this error.
    #[must_use]
    pub fn to_builder(&self) -> ResponseErrorBuilder {
        ResponseErrorBuilder {
            inner: self.clone(),
        }
    }
}

/// Builder for [`ResponseError`].
#[derive(Debug, Clone)]
pub struct ResponseErrorBuilder {
    inner: ResponseError,
}

impl ResponseErrorBuilder {
    /// Set the classification.
    #[must_use]
    pub const fn kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Replace the developer message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.inner.message = message.into();
        self
    }

    /// Set the user-facing message.
    #[must_use]
    pub fn user_message(mut self, message: impl Into<String>) -> Self {
        self.inner.user_message = Some(message.into());
        self
    }

    /// Set the status code.
    #[must_use]
    pub const fn status(mut self, status: u32) -> Self {
        self.inner.status = status;
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.inner.cause = Some(Arc::new(cause));
        self
    }

    /// Attach an already shared cause.
    #[must_use]
    pub fn shared_cause(mut self, cause: ErrorCause) -> Self {
        self.inner.cause = Some(cause);
        self
    }

    /// Re-attribute the failure to another tier.
    #[must_use]
    pub const fn failed_source(mut self, failed_source: SourceType) -> Self {
        self.inner.failed_source = failed_source;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> ResponseError {
        self.inner
    }
}

/// Orchestration-level error for the cascade workspace.
///
/// Source failures travel as [`ResponseError`] values to subscribers; this
/// type covers misconfiguration and lookups against the registry.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CascadeError {
    /// No registered source matches the selector.
    #[error("not found: {selector}")]
    NotFound {
        /// The selector that failed to resolve.
        selector: SourceSelector,
    },

    /// A controller was built without any source.
    #[error("no sources registered; add at least one via with_source(...)")]
    NoSources,

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A serialized layer stack could not be turned into a source.
    #[error("invalid layer stack: {message}")]
    InvalidLayerStack {
        /// Human-readable description of the validation failure.
        message: String,
    },
}

impl CascadeError {
    /// Helper: build a `NotFound` error for a selector.
    #[must_use]
    pub const fn not_found(selector: SourceSelector) -> Self {
        Self::NotFound { selector }
    }

    /// Helper: build an `InvalidLayerStack` error.
    pub fn invalid_layer_stack(message: impl Into<String>) -> Self {
        Self::InvalidLayerStack {
            message: message.into(),
        }
    }
}
