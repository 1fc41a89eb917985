// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolver session shared by the one-shot commands and the REPL

use spacey_modules::{
    FileBackend, HostBridge, InMemoryRegistry, LoaderConfig, ModuleRecord, ModuleRegistry,
    Referrer, ResolverContext,
};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

/// Outcome of resolving one specifier
pub enum Resolution {
    /// A module is registered for the specifier
    Module(Arc<ModuleRecord>),
    /// The loader produced no source text
    Empty,
}

/// A resolver context, an in-memory registry, and the current referrer
pub struct Session {
    bridge: HostBridge<InMemoryRegistry>,
    runtime: Runtime,
    referrer: Referrer,
    next_token: u64,
}

impl Session {
    /// Build a session from configuration
    pub fn new(config: &LoaderConfig) -> std::io::Result<Self> {
        let mut ctx = ResolverContext::from_config(config);
        Arc::new(FileBackend::from_config(config)).install(&mut ctx);
        debug!("Search path: {:?}", ctx.search_path().bases());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            bridge: HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new())),
            runtime,
            referrer: Referrer::unknown(),
            next_token: 0,
        })
    }

    /// Resolver context
    pub fn context(&self) -> &ResolverContext {
        self.bridge.context()
    }

    /// Module registry
    pub fn registry(&self) -> &InMemoryRegistry {
        self.bridge.host()
    }

    /// Current referrer
    pub fn referrer(&self) -> &Referrer {
        &self.referrer
    }

    /// Resolve further imports as if made from `uri`
    pub fn set_referrer(&mut self, uri: Option<&str>) {
        self.referrer = match uri {
            Some(uri) => Referrer::new(uri),
            None => Referrer::unknown(),
        };
    }

    /// Forget every registered module so the next import loads again
    pub fn reset(&mut self) {
        self.registry().clear();
        self.next_token = 0;
    }

    /// Resolve a static import
    pub fn resolve(&self, specifier: &str) -> spacey_modules::Result<Resolution> {
        let module = self.bridge.resolve_hook(&self.referrer, specifier)?;
        Ok(module.map_or(Resolution::Empty, Resolution::Module))
    }

    /// Run a dynamic import to completion
    pub fn import(&mut self, specifier: &str) -> spacey_modules::Result<Resolution> {
        self.next_token += 1;
        let import = self.bridge.dynamic_import_hook(
            self.referrer.clone(),
            specifier.to_string(),
            self.next_token,
        );
        self.runtime.block_on(import)?;

        // Success carries no module; look it up like the engine would
        let registry = self.registry();
        let module = registry.lookup_module(specifier).or_else(|| {
            registry.lookup_internal_module(specifier).or_else(|| {
                spacey_modules::resolve_specifier(self.context(), specifier, self.referrer.uri())
                    .ok()
                    .flatten()
                    .and_then(|uri| registry.lookup_module(uri.raw()))
            })
        });

        Ok(module.map_or(Resolution::Empty, Resolution::Module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_static_and_dynamic_imports() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("esm")).unwrap();
        fs::write(dir.path().join("esm/greet.js"), "export default 'hi';").unwrap();
        fs::write(dir.path().join("esm/lazy.js"), "export default 'later';").unwrap();

        let config = LoaderConfig {
            default_search_path: false,
            search_path: vec!["resource:///esm".to_string()],
            resource_root: Some(dir.path().to_path_buf()),
            log_filter: None,
        };
        let mut session = Session::new(&config).unwrap();

        match session.resolve("greet").unwrap() {
            Resolution::Module(module) => assert_eq!(module.source(), "export default 'hi';"),
            Resolution::Empty => panic!("expected a module"),
        }

        session.set_referrer(Some("resource:///esm/greet.js"));
        match session.import("./lazy").unwrap() {
            Resolution::Module(module) => {
                assert_eq!(module.key(), "resource:///esm/lazy.js");
                assert!(module.is_evaluated());
            }
            Resolution::Empty => panic!("expected a module"),
        }
        assert_eq!(session.registry().finished_imports().len(), 1);

        session.reset();
        assert!(session.registry().is_empty());
        assert!(matches!(session.resolve("greet"), Ok(Resolution::Module(_))));
    }
}
