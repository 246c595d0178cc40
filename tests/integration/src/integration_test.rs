//! End-to-end tests across the engine and the default handlers
//!
//! These exercise the complete flow: document on disk -> default resolver
//! with an application resolver layered on top -> resolved tree.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use protocall_core::{Error, Handler, HandlerError, Resolver, Value};
use protocall_handlers::{Base64Handler, DefaultHandlers, EnvSource};
use serde_json::json;
use tempfile::TempDir;

/// Set up a service directory with a YAML config and a secret file
fn setup_service() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("secrets")).unwrap();
    fs::write(temp.path().join("secrets/db.b64"), "czNjcjN0").unwrap();
    fs::write(
        temp.path().join("service.yaml"),
        r#"
name: billing
listen:
  port: env:PORT|d
  debug: env:DEBUG|b
storage:
  root: path:var/data
  scratch: path:/tmp/scratch
database:
  password: file:secrets/db.b64
  user: vault:db/user
tags:
  - env:REGION
  - static
"#,
    )
    .unwrap();
    temp
}

/// Application resolver: decodes `file:` output and adds a `vault:` protocol.
fn app_resolver<'p>(defaults: &'p Resolver<'p>) -> Resolver<'p> {
    let vault: Arc<HashMap<&'static str, &'static str>> =
        Arc::new(HashMap::from([("db/user", "billing_rw")]));

    let resolver = Resolver::child_of(defaults);
    resolver
        .register(
            "file",
            Handler::transform(|contents: Value| {
                let text = contents.as_str().ok_or("file contents must be text")?;
                Ok(Base64Handler::new().decode(text)?)
            }),
        )
        .unwrap();
    resolver
        .register(
            "vault",
            Handler::from_async_fn(move |key: Value, _filename: Option<PathBuf>| {
                let vault = Arc::clone(&vault);
                async move {
                    tokio::task::yield_now().await;
                    let key = key.as_str().unwrap_or_default();
                    vault
                        .get(key)
                        .map(|secret| Value::String(secret.to_string()))
                        .ok_or_else(|| HandlerError::from(format!("vault: no secret at {key}")))
                }
            }),
        )
        .unwrap();
    resolver
}

fn defaults_for(base: &Path) -> Resolver<'static> {
    DefaultHandlers::new(base)
        .with_env(
            [("PORT", "9000"), ("DEBUG", "1"), ("REGION", "eu-west-1")]
                .into_iter()
                .collect::<EnvSource>(),
        )
        .build(None)
        .unwrap()
}

#[tokio::test]
async fn test_resolve_service_config() {
    let temp = setup_service();
    let defaults = defaults_for(temp.path());
    let resolver = app_resolver(&defaults);

    let out = resolver
        .resolve_file(temp.path().join("service.yaml"))
        .await
        .unwrap();

    let root = temp.path().join("var").join("data");
    assert_eq!(
        out,
        json!({
            "name": "billing",
            "listen": {"port": 9000, "debug": true},
            "storage": {"root": root.to_string_lossy(), "scratch": "/tmp/scratch"},
            "database": {"password": "s3cr3t", "user": "billing_rw"},
            "tags": ["eu-west-1", "static"]
        })
    );
}

#[tokio::test]
async fn test_defaults_alone_leave_file_encoded() {
    let temp = setup_service();
    let defaults = defaults_for(temp.path());

    let out = defaults
        .resolve(&json!("file:secrets/db.b64"), None)
        .await
        .unwrap();
    assert_eq!(out, json!("czNjcjN0"));
}

#[tokio::test]
async fn test_unknown_secret_fails_whole_document() {
    let temp = setup_service();
    fs::write(
        temp.path().join("broken.json"),
        r#"{"ok": "path:x", "user": "vault:db/admin"}"#,
    )
    .unwrap();
    let defaults = defaults_for(temp.path());
    let resolver = app_resolver(&defaults);

    let err = resolver
        .resolve_file(temp.path().join("broken.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Handler(_)));
    assert_eq!(err.to_string(), "vault: no secret at db/admin");
}

#[tokio::test]
async fn test_unregistering_app_handler_restores_default_behaviour() {
    let temp = setup_service();
    let defaults = defaults_for(temp.path());
    let resolver = Resolver::child_of(&defaults);
    let upper = resolver
        .register(
            "env",
            Handler::transform(|v| Ok(json!(v.as_str().map(str::to_uppercase)))),
        )
        .unwrap();

    let input = json!("env:REGION");
    assert_eq!(resolver.resolve(&input, None).await.unwrap(), json!("EU-WEST-1"));

    assert!(upper.unregister().is_some());
    assert!(upper.unregister().is_none());
    assert_eq!(resolver.resolve(&input, None).await.unwrap(), json!("eu-west-1"));
}
