//! Protocol resolution engine
//!
//! A [`Resolver`] maps protocol names to ordered handler chains and walks
//! data trees, replacing every string of the form `<protocol>:<content>`
//! with the output of that protocol's chain.

use std::path::Path;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, try_join_all};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::document::DocumentFormat;
use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::module::ModuleLoader;
use crate::registration::{Entry, HandlerList, HandlerMap, HandlerSet, Registration, Registrations};

/// Resolves protocol-tagged strings inside arbitrary data.
///
/// A resolver may borrow a parent. Protocols registered on the parent are
/// visible through the child, and for a protocol known to both, the
/// parent's handlers run before the child's own.
///
/// Registration takes `&self`, but registering while a resolution is in
/// flight is not supported: the chain seen by an in-flight string is
/// whatever was registered when that string started resolving.
///
/// # Example
///
/// ```
/// use protocall_core::{Handler, Resolver};
/// use serde_json::{Value, json};
///
/// # futures::executor::block_on(async {
/// let resolver = Resolver::new();
/// resolver
///     .register("upper", Handler::transform(|input: Value| {
///         Ok(Value::String(input.as_str().unwrap_or_default().to_uppercase()))
///     }))
///     .unwrap();
///
/// let resolved = resolver
///     .resolve(&json!({"name": "upper:svc", "port": 80}), None)
///     .await
///     .unwrap();
/// assert_eq!(resolved, json!({"name": "SVC", "port": 80}));
/// # });
/// ```
pub struct Resolver<'p> {
    parent: Option<&'p Resolver<'p>>,
    handlers: RwLock<IndexMap<String, HandlerList>>,
    modules: Option<Arc<dyn ModuleLoader>>,
}

impl<'p> Resolver<'p> {
    /// Create a resolver with no parent and no handlers
    pub fn new() -> Self {
        Self {
            parent: None,
            handlers: RwLock::new(IndexMap::new()),
            modules: None,
        }
    }

    /// Create a resolver that inherits the protocols of `parent`.
    ///
    /// The child only borrows its parent.
    pub fn child_of(parent: &'p Resolver<'p>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new()
        }
    }

    /// Register an initial set of handlers.
    pub fn with_handlers(self, handlers: HandlerMap) -> Result<Self> {
        self.register_map(handlers)?;
        Ok(self)
    }

    /// Install the loader used by [`resolve_file`](Self::resolve_file) for
    /// module paths.
    pub fn with_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.modules = Some(loader);
        self
    }

    pub fn parent(&self) -> Option<&'p Resolver<'p>> {
        self.parent
    }

    /// Append `handler` to the chain of `protocol`.
    pub fn register(&self, protocol: &str, handler: Handler) -> Result<Registration> {
        let list = self.handler_list(protocol)?;
        let entry = Entry::new(handler);
        let registration = Registration::new(protocol, entry.id, &list);
        list.write().push(entry);
        tracing::debug!(protocol, "Registered handler");
        Ok(registration)
    }

    /// Append each handler, in order, to the chain of `protocol`.
    ///
    /// The protocol is declared even when `handlers` is empty, which makes
    /// resolving it an [`Error::EmptyChain`].
    pub fn register_all(
        &self,
        protocol: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<Vec<Registration>> {
        self.handler_list(protocol)?;
        handlers
            .into_iter()
            .map(|handler| self.register(protocol, handler))
            .collect()
    }

    /// Register every entry of a protocol → handler(s) map.
    ///
    /// The returned map has the same keys, each holding the handle(s) for
    /// that protocol's handlers.
    pub fn register_map(&self, handlers: HandlerMap) -> Result<IndexMap<String, Registrations>> {
        handlers
            .into_iter()
            .map(|(protocol, set)| {
                let registrations = match set {
                    HandlerSet::One(handler) => {
                        Registrations::One(self.register(&protocol, handler)?)
                    }
                    HandlerSet::Many(handlers) => {
                        Registrations::Many(self.register_all(&protocol, handlers)?)
                    }
                };
                Ok((protocol, registrations))
            })
            .collect()
    }

    /// Protocols visible to this resolver: its own in registration order,
    /// then its ancestors', without duplicates.
    pub fn supported_protocols(&self) -> Vec<String> {
        let mut protocols: IndexSet<String> = self.handlers.read().keys().cloned().collect();
        if let Some(parent) = self.parent {
            protocols.extend(parent.supported_protocols());
        }
        protocols.into_iter().collect()
    }

    /// Find the protocol whose `<name>:` prefix matches `candidate`.
    ///
    /// When several protocols match, the longest name wins, so with both
    /// `e` and `env` registered, `env:HOME` selects `env`.
    pub fn protocol_for(&self, candidate: &str) -> Option<String> {
        self.supported_protocols()
            .into_iter()
            .filter(|protocol| {
                candidate
                    .strip_prefix(protocol.as_str())
                    .is_some_and(|rest| rest.starts_with(':'))
            })
            .max_by_key(String::len)
    }

    /// The full chain for `protocol`: ancestors' handlers first, then this
    /// resolver's own, each in registration order.
    pub fn handlers(&self, protocol: &str) -> Vec<Handler> {
        let mut chain = self
            .parent
            .map(|parent| parent.handlers(protocol))
            .unwrap_or_default();
        if let Some(list) = self.handlers.read().get(protocol) {
            chain.extend(list.read().iter().map(|entry| entry.handler.clone()));
        }
        chain
    }

    /// Resolve every protocol-tagged string in `data`.
    ///
    /// `filename` is handed to the first handler of each chain that runs.
    /// Sequence elements and mapping values are resolved concurrently;
    /// the first failure fails the whole call and abandons the siblings
    /// still in flight. Resolved outputs are not scanned again.
    pub async fn resolve(&self, data: &Value, filename: Option<&Path>) -> Result<Value> {
        self.resolve_node(data, filename).await
    }

    /// Callback form of [`resolve`](Self::resolve).
    ///
    /// This is an adapter for callers that consume the outcome through a
    /// completion closure: the returned future still has to be driven, and
    /// `callback` runs exactly once when it completes.
    pub async fn resolve_with_callback<F>(&self, data: &Value, filename: Option<&Path>, callback: F)
    where
        F: FnOnce(Result<Value>),
    {
        callback(self.resolve(data, filename).await)
    }

    /// Load a document or module from `path` and resolve it, with `path` as
    /// the filename context.
    pub async fn resolve_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let data = self.load_file(path).await?;
        self.resolve(&data, Some(path)).await
    }

    /// Callback form of [`resolve_file`](Self::resolve_file), with the same
    /// adapter semantics as [`resolve_with_callback`](Self::resolve_with_callback).
    pub async fn resolve_file_with_callback<F>(&self, path: impl AsRef<Path>, callback: F)
    where
        F: FnOnce(Result<Value>),
    {
        callback(self.resolve_file(path).await)
    }

    fn handler_list(&self, protocol: &str) -> Result<HandlerList> {
        if protocol.is_empty() {
            return Err(Error::invalid_protocol(protocol, "protocol name is empty"));
        }
        if protocol.contains(':') {
            return Err(Error::invalid_protocol(protocol, "protocol name contains ':'"));
        }
        Ok(self
            .handlers
            .write()
            .entry(protocol.to_string())
            .or_default()
            .clone())
    }

    async fn load_file(&self, path: &Path) -> Result<Value> {
        if let Some(loader) = self.modules.as_ref().filter(|loader| loader.is_module(path)) {
            let specifier = path.to_string_lossy();
            tracing::debug!(path = %path.display(), "Loading module");
            return Ok(loader.load(&specifier)?.into_value(&specifier)?);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::read(path, source))?;
        let format = DocumentFormat::from_path(path);
        tracing::debug!(path = %path.display(), %format, "Loading document");
        format.parse(&content).map_err(|message| Error::Parse {
            path: path.to_path_buf(),
            format: format.to_string(),
            message,
        })
    }

    fn resolve_node<'a>(&'a self, data: &'a Value, filename: Option<&'a Path>) -> BoxFuture<'a, Result<Value>> {
        async move {
            match data {
                Value::Array(items) => {
                    let resolved =
                        try_join_all(items.iter().map(|item| self.resolve_node(item, filename)))
                            .await?;
                    Ok(Value::Array(resolved))
                }
                Value::Object(map) => {
                    let entries = try_join_all(map.iter().map(|(key, value)| async move {
                        let value = self.resolve_node(value, filename).await?;
                        Ok::<_, Error>((key.clone(), value))
                    }))
                    .await?;
                    Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
                }
                Value::String(text) => self.resolve_string(text, filename).await,
                other => Ok(other.clone()),
            }
        }
        .boxed()
    }

    async fn resolve_string(&self, text: &str, filename: Option<&Path>) -> Result<Value> {
        let Some(protocol) = self.protocol_for(text) else {
            return Ok(Value::String(text.to_string()));
        };

        let chain = self.handlers(&protocol);
        if chain.is_empty() {
            return Err(Error::EmptyChain { protocol });
        }

        let content = &text[protocol.len() + 1..];
        tracing::trace!(%protocol, content, handlers = chain.len(), "Running handler chain");

        let mut value = Value::String(content.to_string());
        for (index, handler) in chain.iter().enumerate() {
            let filename = if index == 0 { filename } else { None };
            value = handler
                .invoke(value, filename)
                .await
                .map_err(Error::Handler)?;
        }
        Ok(value)
    }
}

impl Default for Resolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("protocols", &self.supported_protocols())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
