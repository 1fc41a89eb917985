// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Scheme loader registry
//!
//! Each URI scheme may register up to three capabilities:
//! - a relative resolver, turning `./x` into an absolute URI of the same scheme
//! - a synchronous loader, used by static imports
//! - an asynchronous loader, used by dynamic `import()`
//!
//! Registration goes through a fluent [`SchemeBuilder`] so one backend can be
//! installed for several schemes at once:
//!
//! ```rust,ignore
//! registry
//!     .register(["file", "resource"])
//!     .relative_resolver(resolve)
//!     .loader(load)
//!     .async_loader(load_async);
//! ```

use crate::error::LoaderError;
use crate::uri::ModuleUri;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Result of a scheme handler
pub type HandlerResult<T> = std::result::Result<T, LoaderError>;

/// Resolves a relative path against a module URI of the same scheme
pub type RelativeResolver =
    Arc<dyn Fn(&ModuleUri, &str) -> HandlerResult<String> + Send + Sync + 'static>;

/// Loads source text synchronously. `None` or empty text means "no module".
pub type SyncLoader =
    Arc<dyn Fn(&ModuleUri) -> HandlerResult<Option<String>> + Send + Sync + 'static>;

/// Loads source text asynchronously
pub type AsyncLoader = Arc<
    dyn Fn(&ModuleUri) -> BoxFuture<'static, HandlerResult<Option<String>>> + Send + Sync + 'static,
>;

/// A backend providing all three capabilities for its schemes
#[async_trait]
pub trait SchemeBackend: Send + Sync + 'static {
    /// Resolve `relative` against the module at `base`
    fn resolve_relative(&self, base: &ModuleUri, relative: &str) -> HandlerResult<String>;

    /// Load source text, blocking
    fn load(&self, uri: &ModuleUri) -> HandlerResult<Option<String>>;

    /// Load source text without blocking
    async fn load_async(&self, uri: &ModuleUri) -> HandlerResult<Option<String>>;
}

/// Table of scheme capabilities
#[derive(Default, Clone)]
pub struct SchemeRegistry {
    relative_resolvers: HashMap<String, RelativeResolver>,
    loaders: HashMap<String, SyncLoader>,
    async_loaders: HashMap<String, AsyncLoader>,
    /// Schemes with a relative resolver, in registration order
    relative_schemes: Vec<String>,
}

impl SchemeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering capabilities for one or more schemes
    pub fn register<I, S>(&mut self, schemes: I) -> SchemeBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schemes = schemes
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();

        SchemeBuilder {
            registry: self,
            schemes,
        }
    }

    /// Install a [`SchemeBackend`] for every capability of the given schemes
    pub fn install_backend<I, S, B>(&mut self, schemes: I, backend: Arc<B>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        B: SchemeBackend,
    {
        let resolver = Arc::clone(&backend);
        let loader = Arc::clone(&backend);

        self.register(schemes)
            .relative_resolver(move |base, relative| resolver.resolve_relative(base, relative))
            .loader(move |uri| loader.load(uri))
            .async_loader(move |uri| {
                let backend = Arc::clone(&backend);
                let uri = uri.clone();
                async move { backend.load_async(&uri).await }
            });
    }

    /// Get the relative resolver for a scheme
    pub fn relative_resolver_for(&self, scheme: &str) -> Option<&RelativeResolver> {
        self.relative_resolvers.get(scheme)
    }

    /// Get the synchronous loader for a scheme
    pub fn loader_for(&self, scheme: &str) -> Option<&SyncLoader> {
        self.loaders.get(scheme)
    }

    /// Get the asynchronous loader for a scheme
    pub fn async_loader_for(&self, scheme: &str) -> Option<&AsyncLoader> {
        self.async_loaders.get(scheme)
    }

    /// Schemes that relative imports may be resolved against
    pub fn allowed_relative_schemes(&self) -> &[String] {
        &self.relative_schemes
    }

    /// All schemes with at least one capability, sorted
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self
            .relative_resolvers
            .keys()
            .chain(self.loaders.keys())
            .chain(self.async_loaders.keys())
            .map(String::as_str)
            .collect();
        schemes.sort_unstable();
        schemes.dedup();
        schemes
    }

    fn set_relative_resolver(&mut self, scheme: &str, handler: RelativeResolver) {
        if !self.relative_schemes.iter().any(|s| s == scheme) {
            self.relative_schemes.push(scheme.to_string());
        }
        self.relative_resolvers.insert(scheme.to_string(), handler);
    }
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut loaders: Vec<_> = self.loaders.keys().collect();
        let mut async_loaders: Vec<_> = self.async_loaders.keys().collect();
        loaders.sort();
        async_loaders.sort();

        f.debug_struct("SchemeRegistry")
            .field("relative", &self.relative_schemes)
            .field("loaders", &loaders)
            .field("async_loaders", &async_loaders)
            .finish()
    }
}

/// Fluent registration of capabilities for a set of schemes
pub struct SchemeBuilder<'r> {
    registry: &'r mut SchemeRegistry,
    schemes: Vec<String>,
}

impl SchemeBuilder<'_> {
    /// Register a relative resolver, allowing relative imports from these schemes
    pub fn relative_resolver<F>(self, handler: F) -> Self
    where
        F: Fn(&ModuleUri, &str) -> HandlerResult<String> + Send + Sync + 'static,
    {
        let handler: RelativeResolver = Arc::new(handler);
        for scheme in &self.schemes {
            self.registry
                .set_relative_resolver(scheme, Arc::clone(&handler));
        }
        self
    }

    /// Register a synchronous loader
    pub fn loader<F>(self, handler: F) -> Self
    where
        F: Fn(&ModuleUri) -> HandlerResult<Option<String>> + Send + Sync + 'static,
    {
        let handler: SyncLoader = Arc::new(handler);
        for scheme in &self.schemes {
            self.registry
                .loaders
                .insert(scheme.clone(), Arc::clone(&handler));
        }
        self
    }

    /// Register an asynchronous loader
    pub fn async_loader<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(&ModuleUri) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Option<String>>> + Send + 'static,
    {
        let handler: AsyncLoader = Arc::new(move |uri: &ModuleUri| handler(uri).boxed());
        for scheme in &self.schemes {
            self.registry
                .async_loaders
                .insert(scheme.clone(), Arc::clone(&handler));
        }
        self
    }

    /// The schemes this builder registers for
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(raw: &str) -> ModuleUri {
        ModuleUri::parse(raw).unwrap()
    }

    #[test]
    fn test_register_multiple_schemes() {
        let mut registry = SchemeRegistry::new();
        let builder = registry
            .register(["File", "resource"])
            .loader(|uri| Ok(Some(format!("// {}", uri))));
        assert_eq!(builder.schemes(), ["file", "resource"]);

        assert!(registry.loader_for("file").is_some());
        assert!(registry.loader_for("resource").is_some());
        assert!(registry.loader_for("gi").is_none());
        assert!(registry.async_loader_for("file").is_none());

        let loader = registry.loader_for("resource").unwrap();
        let text = loader(&uri("resource:///x.js")).unwrap();
        assert_eq!(text.as_deref(), Some("// resource:///x.js"));
    }

    #[test]
    fn test_later_registration_overwrites() {
        let mut registry = SchemeRegistry::new();
        registry.register(["x"]).loader(|_| Ok(Some("first".into())));
        registry.register(["x"]).loader(|_| Ok(Some("second".into())));

        let text = registry.loader_for("x").unwrap()(&uri("x://a")).unwrap();
        assert_eq!(text.as_deref(), Some("second"));
    }

    #[test]
    fn test_relative_schemes_follow_resolvers() {
        let mut registry = SchemeRegistry::new();
        registry.register(["gi"]).loader(|_| Ok(None));
        registry
            .register(["File", "resource"])
            .relative_resolver(|base, rel| Ok(format!("{}{}", base, rel)));
        registry
            .register(["file"])
            .relative_resolver(|_, rel| Ok(rel.to_string()));

        assert_eq!(registry.allowed_relative_schemes(), ["file", "resource"]);
        assert!(registry.relative_resolver_for("gi").is_none());
        assert_eq!(registry.schemes(), vec!["file", "gi", "resource"]);
    }

    #[tokio::test]
    async fn test_async_loader() {
        let mut registry = SchemeRegistry::new();
        registry.register(["x"]).async_loader(|uri| {
            let raw = uri.raw().to_string();
            async move { Ok(Some(raw)) }
        });

        let loader = registry.async_loader_for("x").unwrap();
        let text = loader(&uri("x://mod")).await.unwrap();
        assert_eq!(text.as_deref(), Some("x://mod"));
    }
}
