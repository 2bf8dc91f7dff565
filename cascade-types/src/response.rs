//! Successful source results.

use crate::SourceType;

/// A payload tagged with the source that produced it.
///
/// Responses are immutable once built. The origin tag is what lets a guarded
/// source skip storing a response back into the tier it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    payload: T,
    origin_type: SourceType,
    origin_id: Option<String>,
}

impl<T> Response<T> {
    /// Wrap `payload` as produced by a source of `origin_type`.
    pub const fn new(payload: T, origin_type: SourceType) -> Self {
        Self {
            payload,
            origin_type,
            origin_id: None,
        }
    }

    /// Attach an identifier for the concrete origin (e.g. a source name or URL).
    #[must_use]
    pub fn with_origin_id(mut self, id: impl Into<String>) -> Self {
        self.origin_id = Some(id.into());
        self
    }

    /// Borrow the payload.
    pub const fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the response and return the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// The tier that produced this response.
    pub const fn origin_type(&self) -> SourceType {
        self.origin_type
    }

    /// The concrete origin identifier, if one was attached.
    pub fn origin_id(&self) -> Option<&str> {
        self.origin_id.as_deref()
    }

    /// Transform the payload while keeping the origin tags.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            payload: f(self.payload),
            origin_type: self.origin_type,
            origin_id: self.origin_id,
        }
    }

    /// Re-tag the response as originating from `origin_type`.
    #[must_use]
    pub fn with_origin_type(mut self, origin_type: SourceType) -> Self {
        self.origin_type = origin_type;
        self
    }
}
