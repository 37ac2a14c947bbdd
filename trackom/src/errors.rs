use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by trackom records and model classes.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The persistence adapter reported a failure. The record keeps its
    /// dirty state so the caller can retry.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// A typed attribute rejected its raw persisted value during `load`.
    #[error("coercion failed for attribute '{attribute}'")]
    Coercion {
        attribute: String,
        #[source]
        source: CoercionError,
    },

    /// A nested path write traversed through a value that cannot hold
    /// children.
    #[error("invalid path '{path}': {message}")]
    InvalidPath {
        path: String,
        message: Cow<'static, str>,
    },

    /// `save` or `find` was called on a model class with no adapter
    /// configured.
    #[error("model class '{class}' has no adapter configured")]
    NoAdapter { class: String },

    /// `load` was handed something other than a JSON object.
    #[error("load expects a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// Placeholder for other error kinds.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Failure reported by an [`Adapter`](crate::adapter::Adapter) operation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AdapterError {
    message: Cow<'static, str>,
    not_found: bool,
}

impl AdapterError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            not_found: false,
        }
    }

    /// A missing record rather than a backend fault.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            not_found: true,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found
    }
}

/// Raw value rejected by an attribute type's coercion rule.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CoercionError {
    message: Cow<'static, str>,
}

impl CoercionError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
