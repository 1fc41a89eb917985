//! End-to-end resolution tests
//!
//! Drives the static and dynamic import hooks against the in-memory registry,
//! with closure-registered schemes and the filesystem backend.

use spacey_modules::{
    FileBackend, HostBridge, ImportErrorKind, InMemoryRegistry, LoaderError, ModuleRegistry,
    Referrer, ResolverContext, SearchPath, Specifier, classify, resolve_module,
    resolve_module_async,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_bare_classification_ignores_referrer() {
    for specifier in ["widgets", "gettext", "lib/sub", "_private", ".dotfile"] {
        assert_eq!(classify(specifier), Specifier::Bare(specifier));
    }
}

#[test]
fn test_uri_resolution_is_idempotent() {
    let calls = counter();
    let loads = Arc::clone(&calls);
    let mut ctx = ResolverContext::new();
    ctx.register_scheme(["x"]).loader(move |_| {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok(Some("export default 1;".to_string()))
    });
    let registry = InMemoryRegistry::new();

    let first = resolve_module(&ctx, &registry, "x://lib/a.js", None)
        .unwrap()
        .unwrap();
    let second = resolve_module(&ctx, &registry, "x://lib/a.js", None)
        .unwrap()
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_search_path_shadowing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b1/x.js", "// from b1");
    write(dir.path(), "b2/x.js", "// from b2");

    let search_path: SearchPath = ["resource:///b1/", "resource:///b2/"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    Arc::new(FileBackend::with_resource_root(dir.path())).install(&mut ctx);
    let registry = InMemoryRegistry::new();

    let module = resolve_module(&ctx, &registry, "x", None).unwrap().unwrap();
    assert_eq!(module.source(), "// from b1");
    assert_eq!(module.human_id(), "resource:///b1/x.js");
}

#[test]
fn test_relative_from_scheme_without_resolver() {
    let mut ctx = ResolverContext::new();
    ctx.register_scheme(["file", "resource"])
        .relative_resolver(|_, relative| Ok(relative.to_string()));
    ctx.register_scheme(["gi"]).loader(|_| Ok(Some("1;".into())));

    let err = resolve_module(&ctx, &InMemoryRegistry::new(), "./y", Some("gi://Gtk"))
        .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::UnsupportedRelativeScheme);
    assert_eq!(
        err.to_string(),
        "Relative imports can only occur from the following URI schemes: file://, resource://"
    );
}

#[tokio::test]
async fn test_async_bare_probe_recovers_from_failed_base() {
    let search_path: SearchPath = ["resource:///b1", "resource:///b2"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    ctx.register_scheme(["resource"]).async_loader(|uri| {
        let raw = uri.raw().to_string();
        async move {
            if raw.contains("/b1/") {
                Err(LoaderError::from(format!("Unable to load file from: {}", raw)))
            } else {
                Ok(Some("// from b2".to_string()))
            }
        }
    });
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));

    bridge
        .dynamic_import_hook(Referrer::unknown(), "x".to_string(), 1)
        .await
        .unwrap();

    let module = bridge.host().lookup_internal_module("x").unwrap();
    assert_eq!(module.human_id(), "resource:///b2/x.js");
    assert_eq!(module.source(), "// from b2");
}

#[tokio::test]
async fn test_sync_and_async_loaders_are_separate() {
    let sync_calls = counter();
    let async_calls = counter();
    let (f, g) = (Arc::clone(&sync_calls), Arc::clone(&async_calls));

    let mut ctx = ResolverContext::new();
    ctx.register_scheme(["x"])
        .loader(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
            Ok(Some("// sync".to_string()))
        })
        .async_loader(move |_| {
            g.fetch_add(1, Ordering::SeqCst);
            async { Ok(Some("// async".to_string())) }
        });

    let sync_registry = InMemoryRegistry::new();
    resolve_module(&ctx, &sync_registry, "x://mod", None).unwrap();
    assert_eq!(sync_calls.load(Ordering::SeqCst), 1);
    assert_eq!(async_calls.load(Ordering::SeqCst), 0);

    let async_registry = InMemoryRegistry::new();
    resolve_module_async(&ctx, &async_registry, "x://mod", None)
        .await
        .unwrap();
    assert_eq!(sync_calls.load(Ordering::SeqCst), 1);
    assert_eq!(async_calls.load(Ordering::SeqCst), 1);
    assert_eq!(async_registry.lookup_module("x://mod").unwrap().source(), "// async");
}

#[test]
fn test_relative_file_import() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app/main.js", "import './util';");
    write(dir.path(), "app/util.js", "export const util = true;");

    let main_uri = url::Url::from_file_path(dir.path().join("app/main.js")).unwrap();
    let util_uri = url::Url::from_file_path(dir.path().join("app/util.js")).unwrap();

    let mut ctx = ResolverContext::new();
    Arc::new(FileBackend::new()).install(&mut ctx);
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));

    let module = bridge
        .resolve_hook(&Referrer::new(main_uri.as_str()), "./util")
        .unwrap()
        .unwrap();

    assert_eq!(module.key(), util_uri.as_str());
    assert_eq!(module.human_id(), util_uri.as_str());
    assert_eq!(module.source(), "export const util = true;");
    assert_eq!(bridge.host().module_keys(), vec![util_uri.to_string()]);
}

#[test]
fn test_relative_import_counts_one_load() {
    let calls = counter();
    let loads = Arc::clone(&calls);
    let mut ctx = ResolverContext::new();
    ctx.register_scheme(["file"])
        .relative_resolver(|base, relative| {
            let backend = FileBackend::new();
            spacey_modules::SchemeBackend::resolve_relative(&backend, base, relative)
        })
        .loader(move |_| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Some("export {};".to_string()))
        });
    let registry = InMemoryRegistry::new();

    let module = resolve_module(&ctx, &registry, "./util", Some("file:///app/main.js"))
        .unwrap()
        .unwrap();

    assert_eq!(module.key(), "file:///app/util.js");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(registry.lookup_module("file:///app/util.js").is_some());
}

#[test]
fn test_bare_module_from_second_base() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "esm/widgets.js", "export default 'widgets';");

    let search_path: SearchPath = ["resource:///core/", "resource:///esm/"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    Arc::new(FileBackend::with_resource_root(dir.path())).install(&mut ctx);
    let registry = InMemoryRegistry::new();

    let module = resolve_module(&ctx, &registry, "widgets", None)
        .unwrap()
        .unwrap();

    assert!(module.is_internal());
    assert_eq!(module.key(), "widgets");
    assert_eq!(module.human_id(), "resource:///esm/widgets.js");
    assert_eq!(registry.internal_names(), vec!["widgets"]);
    assert!(registry.module_keys().is_empty());

    // Internal modules are found by name from then on
    let again = resolve_module(&ctx, &registry, "widgets", None)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&module, &again));
}

#[tokio::test]
async fn test_dynamic_import_of_unknown_bare_module() {
    let ctx = ResolverContext::with_search_path(SearchPath::new());
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));

    let err = bridge
        .dynamic_import_hook(Referrer::new("file:///app/main.js"), "missing-thing".to_string(), 9)
        .await
        .unwrap_err();

    assert_eq!(err.root_kind(), ImportErrorKind::UnregisteredBareModule);
    assert!(
        err.to_string()
            .ends_with("Attempted to load unregistered global module: missing-thing")
    );
    assert!(bridge.host().finished_imports().is_empty());
}

#[tokio::test]
async fn test_dynamic_relative_file_import() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app/main.js", "import('./lazy');");
    write(dir.path(), "app/lazy.js", "export const lazy = true;");

    let main_uri = url::Url::from_file_path(dir.path().join("app/main.js")).unwrap();
    let lazy_uri = url::Url::from_file_path(dir.path().join("app/lazy.js")).unwrap();

    let mut ctx = ResolverContext::new();
    Arc::new(FileBackend::new()).install(&mut ctx);
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));
    let referrer = Referrer::new(main_uri.as_str());

    bridge
        .dynamic_import_hook(referrer.clone(), "./lazy".to_string(), 4)
        .await
        .unwrap();

    let module = bridge.host().lookup_module(lazy_uri.as_str()).unwrap();
    assert!(module.is_evaluated());

    let finished = bridge.host().finished_imports();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].referrer, referrer);
    assert_eq!(finished[0].specifier, "./lazy");
    assert_eq!(finished[0].token, 4);
}

#[tokio::test]
async fn test_concurrent_dynamic_imports_register_once() {
    let mut ctx = ResolverContext::new();
    ctx.register_scheme(["x"]).async_loader(|_| async {
        tokio::task::yield_now().await;
        Ok(Some("export {};".to_string()))
    });
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));

    let (a, b) = tokio::join!(
        bridge.dynamic_import_hook(Referrer::unknown(), "x://shared".to_string(), 1),
        bridge.dynamic_import_hook(Referrer::unknown(), "x://shared".to_string(), 2),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(bridge.host().module_keys(), vec!["x://shared"]);
    assert_eq!(bridge.host().finished_imports().len(), 2);
}

#[tokio::test]
async fn test_concurrent_dynamic_imports_of_bare_module() {
    let loads = counter();
    let calls = Arc::clone(&loads);
    let search_path: SearchPath = ["resource:///b1"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    ctx.register_scheme(["resource"]).async_loader(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::task::yield_now().await;
            Ok(Some("export {};".to_string()))
        }
    });
    let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));

    let (a, b) = tokio::join!(
        bridge.dynamic_import_hook(Referrer::unknown(), "x".to_string(), 1),
        bridge.dynamic_import_hook(Referrer::unknown(), "x".to_string(), 2),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(bridge.host().internal_names(), vec!["x"]);
    assert_eq!(bridge.host().finished_imports().len(), 2);
}

#[test]
fn test_sync_bare_load_failure_does_not_fall_through() {
    let search_path: SearchPath = ["resource:///b1", "resource:///b2"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    ctx.set_resource_probe(Arc::new(|_: &str| true));
    ctx.register_scheme(["resource"]).loader(|uri| {
        if uri.raw().starts_with("resource:///b1/") {
            Err(LoaderError::from("permission denied"))
        } else {
            Ok(Some("// from b2".to_string()))
        }
    });
    let registry = InMemoryRegistry::new();

    let err = resolve_module(&ctx, &registry, "x", None).unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::Load);
    assert!(err.to_string().contains("resource:///b1/x.js"));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_async_bare_probe_ignores_resource_probe() {
    let search_path: SearchPath = ["resource:///b1"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    ctx.set_resource_probe(Arc::new(|_: &str| false));
    ctx.register_scheme(["resource"])
        .loader(|_| Ok(Some("// sync".to_string())))
        .async_loader(|_| async { Ok(Some("// async".to_string())) });

    let sync_registry = InMemoryRegistry::new();
    let err = resolve_module(&ctx, &sync_registry, "x", None).unwrap_err();
    assert_eq!(err.kind(), ImportErrorKind::UnregisteredBareModule);

    let async_registry = InMemoryRegistry::new();
    resolve_module_async(&ctx, &async_registry, "x", None)
        .await
        .unwrap();

    let module = async_registry.lookup_internal_module("x").unwrap();
    assert_eq!(module.human_id(), "resource:///b1/x.js");
    assert_eq!(module.source(), "// async");
}

#[test]
fn test_resource_with_space_in_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "esm/my mod.js", "export default 'spaced';");

    let search_path: SearchPath = ["resource:///esm"].into_iter().collect();
    let mut ctx = ResolverContext::with_search_path(search_path);
    Arc::new(FileBackend::with_resource_root(dir.path())).install(&mut ctx);
    let registry = InMemoryRegistry::new();

    let module = resolve_module(&ctx, &registry, "my mod", None)
        .unwrap()
        .unwrap();

    assert_eq!(module.source(), "export default 'spaced';");
    assert_eq!(module.human_id(), "resource:///esm/my mod.js");
}
