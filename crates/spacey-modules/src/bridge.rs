// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host engine hooks
//!
//! The engine calls [`HostBridge::resolve_hook`] for every static import and
//! drives the future returned by [`HostBridge::dynamic_import_hook`] for every
//! dynamic `import()`.

use crate::context::ResolverContext;
use crate::error::{ImportError, Result};
use crate::host::ModuleHost;
use crate::resolve::resolve_module;
use crate::resolve_async::resolve_module_async;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Connects a [`ResolverContext`] to a host engine
pub struct HostBridge<H: ModuleHost> {
    ctx: Arc<ResolverContext>,
    host: Arc<H>,
}

impl<H: ModuleHost> HostBridge<H> {
    /// Create a bridge over a fully configured context
    pub fn new(ctx: Arc<ResolverContext>, host: Arc<H>) -> Self {
        Self { ctx, host }
    }

    /// The resolver context
    pub fn context(&self) -> &ResolverContext {
        &self.ctx
    }

    /// The host engine
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Resolve a static import
    pub fn resolve_hook(
        &self,
        info: &H::ReferencingInfo,
        specifier: &str,
    ) -> Result<Option<H::Module>> {
        debug!("Starting module import...");
        let uri = self.host.module_uri(info);

        if let Some(uri) = &uri {
            debug!("Found base URI: {}", uri);
        }

        resolve_module(&self.ctx, self.host.as_ref(), specifier, uri.as_deref())
    }

    /// Resolve, load and evaluate a dynamic import, then complete it
    ///
    /// On success the host's `finish_dynamic_import` is called with the same
    /// referrer, specifier and token. On failure it is not called and the
    /// error comes back wrapped in [`ImportError::DynamicImportFailed`].
    pub fn dynamic_import_hook(
        &self,
        info: H::ReferencingInfo,
        specifier: String,
        token: H::PromiseToken,
    ) -> impl Future<Output = Result<()>> + use<H> {
        let ctx = Arc::clone(&self.ctx);
        let host = Arc::clone(&self.host);

        async move {
            debug!("Starting dynamic import...");
            let uri = host.module_uri(&info);

            if let Some(uri) = &uri {
                debug!("Found base URI: {}", uri);
            }

            match resolve_module_async(&ctx, host.as_ref(), &specifier, uri.as_deref()).await {
                Ok(()) => {
                    debug!("Successfully imported module!");
                    host.finish_dynamic_import(&info, &specifier, token);
                    Ok(())
                }
                Err(err) => {
                    debug!("Dynamic import of {} failed: {}", specifier, err);
                    Err(ImportError::dynamic(err))
                }
            }
        }
    }
}

impl<H: ModuleHost> Clone for HostBridge<H> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            host: Arc::clone(&self.host),
        }
    }
}
