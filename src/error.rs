//! Error types used by subscription builders, pipelines and execution contexts.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — raised synchronously when a builder option is set twice.
//! - [`TransformError`] — raised when a transformer fails (or panics).
//! - [`RuntimeError`] — raised when an execution context cannot be created.
//!
//! All types provide `as_label` (stable snake_case label for logs/metrics) and
//! `as_message` helpers.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error value produced by user transformers.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// # Errors produced while configuring a subscription.
///
/// Each optional builder field can be set at most once; the second attempt
/// consumes the builder and returns one of these variants.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A transformer was already configured.
    #[error("only one transformer allowed")]
    TransformerAlreadySet,

    /// An error observer was already configured.
    #[error("only one error observer allowed")]
    ErrorObserverAlreadySet,

    /// A scheduler was already configured.
    #[error("only one scheduler allowed")]
    SchedulerAlreadySet,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use datasub::ConfigError;
    ///
    /// assert_eq!(ConfigError::SchedulerAlreadySet.as_label(), "config_scheduler_already_set");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::TransformerAlreadySet => "config_transformer_already_set",
            ConfigError::ErrorObserverAlreadySet => "config_error_observer_already_set",
            ConfigError::SchedulerAlreadySet => "config_scheduler_already_set",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by a transformer.
///
/// A transformer returning `Err` yields [`TransformError::Failed`]; a panic
/// inside the transformer is caught and yields [`TransformError::Panicked`].
/// Both are routed to the error observer, or escalated to the worker-pool
/// harness when none is configured.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransformError {
    /// The transformer returned an error.
    #[error("transform failed: {source}")]
    Failed {
        /// The error returned by the transformer.
        #[source]
        source: BoxError,
    },

    /// The transformer panicked.
    #[error("transform panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TransformError {
    /// Wraps an arbitrary error value returned by a transformer.
    pub fn failed(source: impl Into<BoxError>) -> Self {
        TransformError::Failed {
            source: source.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use datasub::TransformError;
    ///
    /// let err = TransformError::failed("boom");
    /// assert_eq!(err.as_label(), "transform_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TransformError::Failed { .. } => "transform_failed",
            TransformError::Panicked { .. } => "transform_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TransformError::Failed { source } => format!("error: {source}"),
            TransformError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Returns the transformer's original error if it is of type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            TransformError::Failed { source } => source.downcast_ref::<E>(),
            TransformError::Panicked { .. } => None,
        }
    }
}

/// # Errors produced while creating execution contexts.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No tokio runtime is available on the calling thread.
    #[error("no tokio runtime available: {error}")]
    NoRuntime {
        /// The underlying error message.
        error: String,
    },

    /// The scheduler thread could not be spawned.
    #[error("failed to spawn scheduler thread '{name}': {error}")]
    SchedulerSpawn {
        /// Requested thread name.
        name: String,
        /// The underlying I/O error message.
        error: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoRuntime { .. } => "runtime_missing",
            RuntimeError::SchedulerSpawn { .. } => "runtime_scheduler_spawn",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NoRuntime { error } => format!("no runtime: {error}"),
            RuntimeError::SchedulerSpawn { name, error } => {
                format!("scheduler '{name}' spawn failed: {error}")
            }
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
