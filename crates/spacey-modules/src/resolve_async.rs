// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Asynchronous module resolution (dynamic `import()`)
//!
//! Mirrors [`resolve_module`](crate::resolve::resolve_module) but loads through
//! the schemes' asynchronous loaders and compiles the module once it is
//! registered. Success carries no value: the host re-queries its registry.
//!
//! Bare specifiers are not checked for existence up front. Each search-path
//! candidate is loaded in turn and the first one that loads and registers
//! wins; failures of earlier candidates are logged and skipped.

use crate::context::{RESOURCE_SCHEME, ResolverContext};
use crate::error::{ImportError, Result};
use crate::host::ModuleRegistry;
use crate::resolve::resolve_specifier;
use crate::uri::ModuleUri;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Resolve, load, register and evaluate a dynamically imported module
pub async fn resolve_module_async<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    specifier: &str,
    module_uri: Option<&str>,
) -> Result<()> {
    debug!("Resolving (asynchronously): {}...", specifier);

    if registry.lookup_module(specifier).is_some() {
        trace!("Module cache hit: {}", specifier);
        return Ok(());
    }

    if registry.lookup_internal_module(specifier).is_some() {
        trace!("Internal module cache hit: {}", specifier);
        return Ok(());
    }

    match resolve_specifier(ctx, specifier, module_uri)? {
        Some(uri) => load_and_evaluate(ctx, registry, &uri).await,
        None => probe_internal(ctx, registry, specifier).await,
    }
}

async fn load_and_evaluate<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    uri: &ModuleUri,
) -> Result<()> {
    let key = uri.raw();
    debug!("Full path found: {}", key);

    if registry.lookup_module(key).is_some() {
        return Ok(());
    }

    let Some(text) = load_uri_async(ctx, uri).await? else {
        return Ok(());
    };

    // Another import of the same URI may have finished while this one was suspended
    if registry.lookup_module(key).is_some() {
        debug!("Module {} was registered while loading", key);
        return Ok(());
    }

    if !registry.register_module(key, key, &text, false) {
        return Err(ImportError::RegistrationFailure {
            key: key.to_string(),
        });
    }

    if registry.lookup_module(key).is_none() {
        return Err(ImportError::UnknownDynamicImport);
    }

    if !registry.compile_and_eval_module(key) {
        return Err(ImportError::CompileFailure {
            uri: key.to_string(),
        });
    }

    Ok(())
}

async fn probe_internal<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    specifier: &str,
) -> Result<()> {
    for uri in ctx.search_path().candidate_uris(specifier) {
        match load_internal_candidate(ctx, registry, specifier, &uri).await {
            Ok(true) => return Ok(()),
            Ok(false) => debug!("Internal module {} not available at {}.", specifier, uri),
            Err(err) => warn!("Failed to load {}: {}", uri, err),
        }
    }

    Err(ImportError::unregistered(specifier))
}

/// Load one search-path candidate. `Ok(true)` once the registry confirms it.
async fn load_internal_candidate<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    specifier: &str,
    uri: &str,
) -> Result<bool> {
    let parsed = ModuleUri::parse(uri).ok_or_else(|| ImportError::InvalidModuleUri {
        uri: uri.to_string(),
    })?;

    let loader = ctx
        .schemes()
        .async_loader_for(RESOURCE_SCHEME)
        .map(Arc::clone)
        .ok_or_else(|| ImportError::NoLoaderForScheme {
            uri: uri.to_string(),
        })?;

    let Some(text) = loader(&parsed).await.map_err(|source| ImportError::Load {
        uri: uri.to_string(),
        source,
    })?
    else {
        return Ok(false);
    };

    // Another import of the same name may have finished while this one was suspended
    if registry.lookup_internal_module(specifier).is_some() {
        debug!("Internal module {} was registered while loading", specifier);
        return Ok(true);
    }

    if !registry.register_internal_module(specifier, uri, &text) {
        return Err(ImportError::RegistrationFailure {
            key: specifier.to_string(),
        });
    }

    Ok(registry.lookup_internal_module(specifier).is_some())
}

/// Load a URI through its scheme's asynchronous loader
async fn load_uri_async(ctx: &ResolverContext, uri: &ModuleUri) -> Result<Option<String>> {
    debug!("URI: {}", uri);

    let loader = ctx
        .schemes()
        .async_loader_for(uri.scheme())
        .map(Arc::clone)
        .ok_or_else(|| ImportError::NoLoaderForScheme {
            uri: uri.raw().to_string(),
        })?;

    let text = loader(uri).await.map_err(|source| ImportError::Load {
        uri: uri.raw().to_string(),
        source,
    })?;

    Ok(text.filter(|text| !text.is_empty()))
}
