// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Synchronous module resolution (static imports)
//!
//! Order:
//! 1. modules already registered under the specifier
//! 2. internal modules already registered under the specifier
//! 3. relative paths and URIs, through the scheme's synchronous loader
//! 4. bare names, through the internal search path

use crate::context::{RESOURCE_SCHEME, ResolverContext};
use crate::error::{ImportError, Result};
use crate::host::ModuleRegistry;
use crate::specifier::{Specifier, classify};
use crate::uri::ModuleUri;
use tracing::{debug, trace};

/// Resolve a static import to a registered module
///
/// Returns `Ok(None)` when the loader produced no source text, or when the
/// registry declined to intern an internal module.
pub fn resolve_module<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    specifier: &str,
    module_uri: Option<&str>,
) -> Result<Option<R::Module>> {
    debug!("Resolving: {}", specifier);

    if let Some(module) = registry.lookup_module(specifier) {
        trace!("Module cache hit: {}", specifier);
        return Ok(Some(module));
    }

    if let Some(module) = registry.lookup_internal_module(specifier) {
        trace!("Internal module cache hit: {}", specifier);
        return Ok(Some(module));
    }

    if let Some(uri) = resolve_specifier(ctx, specifier, module_uri)? {
        debug!("Full path found: {}", uri);

        // A relative import may land on a module that is already loaded
        if let Some(module) = registry.lookup_module(uri.raw()) {
            return Ok(Some(module));
        }

        let Some(text) = load_uri(ctx, &uri)? else {
            return Ok(None);
        };

        if !registry.register_module(uri.raw(), uri.raw(), &text, false) {
            return Err(ImportError::RegistrationFailure {
                key: uri.into_raw(),
            });
        }

        return Ok(registry.lookup_module(uri.raw()));
    }

    resolve_internal(ctx, registry, specifier)
}

/// Turn a relative or URI specifier into an absolute module URI
///
/// Returns `Ok(None)` for bare specifiers.
pub fn resolve_specifier(
    ctx: &ResolverContext,
    specifier: &str,
    module_uri: Option<&str>,
) -> Result<Option<ModuleUri>> {
    match classify(specifier) {
        Specifier::Relative(relative) => {
            let resolved = resolve_relative_path(ctx, module_uri, relative)?;
            match ModuleUri::parse(resolved.as_str()) {
                Some(uri) => Ok(Some(uri)),
                None => Err(ImportError::InvalidModuleUri { uri: resolved }),
            }
        }
        Specifier::Uri(uri) => Ok(Some(uri)),
        Specifier::Bare(_) => Ok(None),
    }
}

/// Resolve `relative` against the URI of the importing module
pub fn resolve_relative_path(
    ctx: &ResolverContext,
    module_uri: Option<&str>,
    relative: &str,
) -> Result<String> {
    let module_uri = module_uri.ok_or(ImportError::UnknownReferencingPath)?;
    debug!("moduleURI: {}", module_uri);

    let parsed = ModuleUri::parse(module_uri).ok_or_else(|| ImportError::InvalidModuleUri {
        uri: module_uri.to_string(),
    })?;

    let resolver = ctx
        .schemes()
        .relative_resolver_for(parsed.scheme())
        .ok_or_else(|| ImportError::UnsupportedRelativeScheme {
            scheme: parsed.scheme().to_string(),
            allowed: ctx.schemes().allowed_relative_schemes().to_vec(),
        })?;

    resolver(&parsed, relative).map_err(|source| ImportError::RelativeResolution {
        base: module_uri.to_string(),
        specifier: relative.to_string(),
        source,
    })
}

/// Load a URI through its scheme's synchronous loader
fn load_uri(ctx: &ResolverContext, uri: &ModuleUri) -> Result<Option<String>> {
    debug!("URI: {}", uri);

    let loader = ctx
        .schemes()
        .loader_for(uri.scheme())
        .ok_or_else(|| ImportError::NoLoaderForScheme {
            uri: uri.raw().to_string(),
        })?;

    let text = loader(uri).map_err(|source| ImportError::Load {
        uri: uri.raw().to_string(),
        source,
    })?;

    Ok(text.filter(|text| !text.is_empty()))
}

/// Find a bare specifier on the search path and register it as an internal module
fn resolve_internal<R: ModuleRegistry>(
    ctx: &ResolverContext,
    registry: &R,
    specifier: &str,
) -> Result<Option<R::Module>> {
    let uri = ctx
        .search_path()
        .candidate_uris(specifier)
        .into_iter()
        .find(|candidate| ctx.resource_exists(candidate))
        .ok_or_else(|| ImportError::unregistered(specifier))?;

    let parsed = ModuleUri::parse(uri.as_str())
        .ok_or_else(|| ImportError::InvalidModuleUri { uri: uri.clone() })?;

    // Internal modules always come from the resource backend
    let loader = ctx
        .schemes()
        .loader_for(RESOURCE_SCHEME)
        .ok_or_else(|| ImportError::NoLoaderForScheme { uri: uri.clone() })?;

    let text = loader(&parsed)
        .map_err(|source| ImportError::Load {
            uri: uri.clone(),
            source,
        })?
        .unwrap_or_default();

    if !registry.register_internal_module(specifier, &uri, &text) {
        debug!("Registry declined internal module {} at {}", specifier, uri);
        return Ok(None);
    }

    Ok(registry.lookup_internal_module(specifier))
}
