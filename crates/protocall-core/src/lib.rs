//! Protocol-tagged value resolution for configuration data
//!
//! Strings such as `env:API_TOKEN` or `path:data/cache` inside a data tree
//! are handed to the handler chain registered for their protocol, and the
//! tree is rebuilt with each tagged string replaced by the chain's output.

pub mod document;
pub mod error;
pub mod handler;
pub mod module;
pub mod registration;
pub mod resolver;

pub use document::DocumentFormat;
pub use error::{Error, HandlerError, Result};
pub use handler::{ContinuationHandler, Handler, TransformFn};
pub use module::{Export, ExportFn, LoadError, ModuleLoader};
pub use registration::{HandlerMap, HandlerSet, Registration, Registrations};
pub use resolver::Resolver;

pub use serde_json::Value;
