//! Tests for the preloaded default resolver

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use protocall_core::{Export, Handler, Resolver, Value};
use protocall_handlers::{DefaultHandlers, EnvSource, ModuleRegistry, default_resolver};
use serde_json::json;
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> EnvSource {
    vars.iter().map(|&(k, v)| (k, v)).collect()
}

#[test]
fn test_default_protocols() {
    let resolver = default_resolver("/srv", None).unwrap();
    assert_eq!(
        resolver.supported_protocols(),
        vec!["path", "file", "base64", "env", "require", "exec"]
    );

    let with_glob = DefaultHandlers::new("/srv").with_glob(true).build(None).unwrap();
    assert!(with_glob.supported_protocols().contains(&"glob".to_string()));
}

#[tokio::test]
async fn test_env_lookup() {
    let resolver = DefaultHandlers::new("/app")
        .with_env(env(&[("FOO", "bar")]))
        .build(None)
        .unwrap();

    assert_eq!(resolver.resolve(&json!("env:FOO"), None).await.unwrap(), json!("bar"));
    assert_eq!(resolver.resolve(&json!("env:MISSING"), None).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_path_resolution() {
    let resolver = default_resolver("/app", None).unwrap();

    assert_eq!(
        resolver.resolve(&json!("path:config/app.json"), None).await.unwrap(),
        json!("/app/config/app.json")
    );
    assert_eq!(
        resolver.resolve(&json!("path:/etc/app.json"), None).await.unwrap(),
        json!("/etc/app.json")
    );
}

#[tokio::test]
async fn test_env_and_path_together() {
    let resolver = DefaultHandlers::new("/srv")
        .with_env(env(&[("API_TOKEN", "xyz")]))
        .build(None)
        .unwrap();

    let out = resolver
        .resolve(&json!({"dir": "path:data", "token": "env:API_TOKEN"}), None)
        .await
        .unwrap();
    assert_eq!(out, json!({"dir": "/srv/data", "token": "xyz"}));
}

#[tokio::test]
async fn test_child_extends_default_chain() {
    let defaults = DefaultHandlers::new("/srv")
        .with_env(env(&[("PORT", "8080")]))
        .build(None)
        .unwrap();
    let child = Resolver::child_of(&defaults);
    child
        .register("env", Handler::transform(|port| Ok(json!({"port": port}))))
        .unwrap();

    let out = child.resolve(&json!("env:PORT|d"), None).await.unwrap();
    assert_eq!(out, json!({"port": 8080}));
}

#[tokio::test]
async fn test_default_resolver_as_child() {
    let root = Resolver::new();
    root.register("secret", Handler::transform(|_| Ok(json!("hunter2"))))
        .unwrap();
    let resolver = default_resolver("/srv", Some(&root)).unwrap();

    let out = resolver
        .resolve(&json!(["secret:db", "base64:aGk="]), None)
        .await
        .unwrap();
    assert_eq!(out, json!(["hunter2", "hi"]));
}

#[tokio::test]
async fn test_file_and_require_from_document() {
    let temp = TempDir::new().unwrap();
    let base = temp.path();
    fs::write(base.join("motd.txt"), "welcome").unwrap();
    fs::write(
        base.join("app.json"),
        r#"{
            "motd": "file:motd.txt",
            "defaults": "require:./defaults",
            "started": "exec:./clock#now",
            "literal": "just text"
        }"#,
    )
    .unwrap();

    let modules = ModuleRegistry::new();
    let defaults_path = base.join("defaults").to_string_lossy().into_owned();
    modules.insert_value(defaults_path, json!({"retries": 3}));
    let clock_path = base.join("clock").to_string_lossy().into_owned();
    modules.insert(
        clock_path,
        Export::Namespace(
            [("now".to_string(), Export::function(|| Ok(json!(42))))]
                .into_iter()
                .collect(),
        ),
    );

    let resolver = DefaultHandlers::new(base)
        .with_modules(Arc::new(modules))
        .build(None)
        .unwrap();
    let out = resolver.resolve_file(base.join("app.json")).await.unwrap();
    assert_eq!(
        out,
        json!({
            "motd": "welcome",
            "defaults": {"retries": 3},
            "started": 42,
            "literal": "just text"
        })
    );
}

#[tokio::test]
async fn test_resolve_file_loads_registered_module() {
    let modules = ModuleRegistry::new();
    modules.insert_value("/virtual/settings", json!({"home": "path:home"}));

    let resolver = DefaultHandlers::new("/virtual")
        .with_modules(Arc::new(modules))
        .build(None)
        .unwrap();
    let out = resolver.resolve_file("/virtual/settings").await.unwrap();
    assert_eq!(out, json!({"home": "/virtual/home"}));
}

#[tokio::test]
async fn test_handler_failure_fails_whole_resolution() {
    let resolver = default_resolver("/srv", None).unwrap();
    let err = resolver
        .resolve(&json!({"ok": "path:x", "bad": "base64:%%%"}), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid base64"));
}
