// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Internal module search path
//!
//! Bare specifiers such as `gettext` are looked up under a list of base URIs.
//! Bases are probed in the order they were added, so a module under an earlier
//! base shadows a module of the same name under a later one.

use tracing::debug;

/// Base holding ESM variants of the built-in modules
pub const DEFAULT_ESM_BASE: &str = "resource:///org/spacey/modules/esm/";

/// Base holding the core built-in modules
pub const DEFAULT_CORE_BASE: &str = "resource:///org/spacey/modules/core/";

/// Insertion-ordered set of base URIs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    bases: Vec<String>,
}

impl SearchPath {
    /// Create an empty search path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the default search path. ESM modules take priority over core modules.
    pub fn with_defaults() -> Self {
        let mut path = Self::new();
        path.add_search_base(DEFAULT_ESM_BASE);
        path.add_search_base(DEFAULT_CORE_BASE);
        path
    }

    /// Append a base URI. Adding a base twice keeps its first position.
    pub fn add_search_base(&mut self, base: impl Into<String>) -> bool {
        let base = base.into();
        if self.bases.contains(&base) {
            return false;
        }
        self.bases.push(base);
        true
    }

    /// Candidate URIs for a bare specifier, one per base, in priority order
    pub fn candidate_uris(&self, specifier: &str) -> Vec<String> {
        self.bases
            .iter()
            .map(|base| {
                let built = format!("{}/{}.js", base.trim_end_matches('/'), specifier);
                debug!("Built internal URI {} with {} for {}.", built, specifier, base);
                built
            })
            .collect()
    }

    /// Registered bases in priority order
    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Number of bases
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Check if no bases are registered
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SearchPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut path = Self::new();
        for base in iter {
            path.add_search_base(base);
        }
        path
    }
}
