// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolver context
//!
//! Owns the scheme table, the internal search path and the resource probe.
//! Startup code builds one context, installs loader backends into it, and then
//! hands it to the [`HostBridge`](crate::bridge::HostBridge). After that it is
//! only read.

use crate::config::LoaderConfig;
use crate::host::{NoResources, ResourceProbe};
use crate::scheme::{SchemeBuilder, SchemeRegistry};
use crate::search_path::SearchPath;
use std::fmt;
use std::sync::Arc;

/// Scheme every internal module is loaded through
pub const RESOURCE_SCHEME: &str = "resource";

/// State shared by every resolution
#[derive(Clone)]
pub struct ResolverContext {
    schemes: SchemeRegistry,
    search_path: SearchPath,
    probe: Arc<dyn ResourceProbe>,
}

impl ResolverContext {
    /// Create a context with the default search path and no schemes
    pub fn new() -> Self {
        Self::with_search_path(SearchPath::with_defaults())
    }

    /// Create a context with an explicit search path
    pub fn with_search_path(search_path: SearchPath) -> Self {
        Self {
            schemes: SchemeRegistry::new(),
            search_path,
            probe: Arc::new(NoResources),
        }
    }

    /// Create a context whose search path follows the configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        let mut search_path = if config.default_search_path {
            SearchPath::with_defaults()
        } else {
            SearchPath::new()
        };
        for base in &config.search_path {
            search_path.add_search_base(base.as_str());
        }
        Self::with_search_path(search_path)
    }

    /// Start registering capabilities for one or more schemes
    pub fn register_scheme<I, S>(&mut self, schemes: I) -> SchemeBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schemes.register(schemes)
    }

    /// Append a base URI to the internal search path
    pub fn add_search_base(&mut self, base: impl Into<String>) -> bool {
        self.search_path.add_search_base(base)
    }

    /// Set the existence check used for bare specifiers on the static path
    pub fn set_resource_probe(&mut self, probe: Arc<dyn ResourceProbe>) {
        self.probe = probe;
    }

    /// Scheme table
    pub fn schemes(&self) -> &SchemeRegistry {
        &self.schemes
    }

    /// Mutable scheme table, for installing backends
    pub fn schemes_mut(&mut self) -> &mut SchemeRegistry {
        &mut self.schemes
    }

    /// Internal search path
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Check if a resource exists
    pub fn resource_exists(&self, uri: &str) -> bool {
        self.probe.exists(uri)
    }
}

impl Default for ResolverContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContext")
            .field("schemes", &self.schemes)
            .field("search_path", &self.search_path)
            .finish_non_exhaustive()
    }
}
