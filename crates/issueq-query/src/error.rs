//! Error types for query translation and execution.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Why a predicate could not be rendered as query-language text.
///
/// Translation errors never reach callers of [`crate::Query`]; the splitter
/// consumes them and leaves the affected filter to local evaluation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The field path has no remote counterpart
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The predicate shape has no query-language form
    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),
}

/// Opaque failure reported by a [`crate::RemoteFetch`] implementation.
///
/// The underlying transport error is kept as the error source.
pub struct FetchError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl FetchError {
    /// Wrap a transport error
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            inner: error.into(),
        }
    }

    /// Create a fetch error from a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }

    /// Borrow the wrapped transport error
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Attempt to downcast the wrapped error
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FetchError").field(&self.inner).finish()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Errors surfaced to the caller of a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// The operation chain is not well typed
    #[error("Malformed operation chain: {0}")]
    MalformedChain(String),

    /// The remote fetch failed
    #[error("Remote fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
