//! The per-call model: decoded attributes, captured parameters, the response
//! under construction, and a string-keyed extensions registry.

use crate::attributes::AttributeMap;
use crate::values::ValueMap;
use bytes::Bytes;
use http::{Method, StatusCode};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one call, generated as a UUID v7.
///
/// V7 IDs are time-ordered, which keeps log correlation and storage
/// locality friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The decoded attributes of an incoming call.
///
/// Produced by the engine adapter after wire parsing: the path is already
/// percent-decoded, headers are a case-insensitive multi-value map, query
/// parameters a case-sensitive one.
///
/// # Example
///
/// ```rust
/// use keryx_core::{CallAttributes, Method};
///
/// let attributes = CallAttributes::new(Method::GET, "/users/42")
///     .with_header("Accept", "application/json")
///     .with_query("expand", "profile");
///
/// assert_eq!(attributes.path, "/users/42");
/// assert_eq!(attributes.headers.get("accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct CallAttributes {
    /// HTTP method token.
    pub method: Method,
    /// Decoded request path.
    pub path: String,
    /// Case-insensitive multi-value header map.
    pub headers: AttributeMap,
    /// Multi-value query parameter map.
    pub query: AttributeMap,
}

impl CallAttributes {
    /// Creates attributes for `method` and `path` with empty maps.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: AttributeMap::case_insensitive(),
            query: AttributeMap::new(),
        }
    }

    /// Shorthand for a GET call.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST call.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Appends a header value.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Appends a query parameter value.
    #[must_use]
    pub fn with_query(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }
}

/// The response being built for one call.
///
/// Interceptors and the handler mutate this in place; once `commit` is
/// called the response is considered written and downstream stages should
/// not replace it.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: StatusCode,
    /// Case-insensitive response header map.
    pub headers: AttributeMap,
    /// Response body, if any has been produced yet.
    pub body: Option<Bytes>,
    committed: bool,
}

impl Response {
    /// Creates an empty 200 response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status and body, then commits.
    pub fn respond(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        self.status = status;
        self.body = Some(body.into());
        self.commit();
    }

    /// Marks the response as written.
    pub fn commit(&mut self) {
        self.committed = true;
    }

    /// Returns true once the response has been committed.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: AttributeMap::case_insensitive(),
            body: None,
            committed: false,
        }
    }
}

/// Call-scoped extension storage keyed by caller-chosen string identifiers.
///
/// Plugins stash typed state here under a stable key they own (for example
/// `"session"` or `"metrics.start"`). Keys are explicit strings rather than
/// type tokens so two plugins can carry values of the same Rust type without
/// colliding.
#[derive(Debug, Default)]
pub struct Extensions {
    entries: IndexMap<String, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Creates an empty extension store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Retrieves the value under `key` if it exists and has type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|boxed| boxed.downcast_ref())
    }

    /// Mutable variant of [`Extensions::get`].
    pub fn get_mut<T: Any + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .get_mut(key)
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Removes and returns the value under `key` if it has type `T`.
    pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        let boxed = self.entries.shift_remove(key)?;
        boxed.downcast().ok().map(|value| *value)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// One in-flight call: attributes, captured parameters, response, and
/// extension state.
///
/// Exclusively owned by the task handling the call; nothing here is shared
/// across calls, so no locking is involved on the hot path.
#[derive(Debug)]
pub struct Call {
    /// Correlation ID for this call.
    pub request_id: RequestId,
    /// The decoded inbound attributes.
    pub attributes: CallAttributes,
    /// Parameters captured during route resolution.
    pub parameters: ValueMap,
    /// The response under construction.
    pub response: Response,
    /// String-keyed call-scoped extension state.
    pub extensions: Extensions,
}

impl Call {
    /// Creates a call around decoded attributes.
    #[must_use]
    pub fn new(attributes: CallAttributes) -> Self {
        Self {
            request_id: RequestId::new(),
            attributes,
            parameters: ValueMap::new(),
            response: Response::new(),
            extensions: Extensions::new(),
        }
    }

    /// Attaches resolved route parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ValueMap) -> Self {
        self.parameters = parameters;
        self
    }
}
