//! Handler contract
//!
//! A handler turns the content of a protocol-tagged string into a value.
//! Handlers come in two explicit kinds chosen at registration time:
//!
//! - [`Handler::Transform`]: a synchronous function of the input.
//! - [`Handler::Continuation`]: an asynchronous handler that may perform
//!   I/O and, when first in its chain, receives the filename of the
//!   document being resolved.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HandlerError;

/// Synchronous transform function
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, HandlerError> + Send + Sync>;

/// Asynchronous handler.
///
/// Completing the returned future is the single completion signal: the
/// handler finishes once, with either a value or an error.
#[async_trait]
pub trait ContinuationHandler: Send + Sync {
    /// Resolve `input`.
    ///
    /// `filename` is the document being resolved, and is only provided to
    /// the first handler of a chain.
    async fn call(&self, input: Value, filename: Option<&Path>) -> Result<Value, HandlerError>;
}

/// A registered resolution function
#[derive(Clone)]
pub enum Handler {
    Transform(TransformFn),
    Continuation(Arc<dyn ContinuationHandler>),
}

impl Handler {
    /// Wrap a synchronous function.
    ///
    /// # Example
    ///
    /// ```
    /// use protocall_core::Handler;
    /// use serde_json::Value;
    ///
    /// let upper = Handler::transform(|input: Value| {
    ///     Ok(Value::String(input.as_str().unwrap_or_default().to_uppercase()))
    /// });
    /// assert!(upper.is_transform());
    /// ```
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self::Transform(Arc::new(f))
    }

    /// Wrap an asynchronous handler implementation.
    pub fn continuation<H>(handler: H) -> Self
    where
        H: ContinuationHandler + 'static,
    {
        Self::Continuation(Arc::new(handler))
    }

    /// Wrap an async closure as a continuation handler.
    ///
    /// The closure receives an owned copy of the filename so the returned
    /// future can be `'static`.
    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Option<PathBuf>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self::continuation(AsyncFn(f))
    }

    pub fn is_transform(&self) -> bool {
        matches!(self, Self::Transform(_))
    }

    /// Run the handler, treating both kinds uniformly.
    ///
    /// Transform handlers never see the filename.
    pub async fn invoke(&self, input: Value, filename: Option<&Path>) -> Result<Value, HandlerError> {
        match self {
            Self::Transform(f) => f(input),
            Self::Continuation(handler) => handler.call(input, filename).await,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(_) => f.write_str("Handler::Transform"),
            Self::Continuation(_) => f.write_str("Handler::Continuation"),
        }
    }
}

struct AsyncFn<F>(F);

#[async_trait]
impl<F, Fut> ContinuationHandler for AsyncFn<F>
where
    F: Fn(Value, Option<PathBuf>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn call(&self, input: Value, filename: Option<&Path>) -> Result<Value, HandlerError> {
        (self.0)(input, filename.map(Path::to_path_buf)).await
    }
}
