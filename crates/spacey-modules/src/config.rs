// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration
//!
//! Read from a TOML file such as:
//!
//! ```toml
//! default_search_path = true
//! search_path = ["resource:///org/app/modules/"]
//! resource_root = "/usr/share/app/resources"
//! log_filter = "spacey_modules=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`LoaderConfig`]
    #[error("Invalid config {path}: {source}")]
    Toml {
        /// Config file path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration of the resolver and the filesystem backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Start from the built-in ESM and core search bases
    pub default_search_path: bool,

    /// Extra search bases, probed after the defaults in this order
    pub search_path: Vec<String>,

    /// Directory backing `resource:///` URIs
    pub resource_root: Option<PathBuf>,

    /// `tracing` filter directive for front ends that install a subscriber
    pub log_filter: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_search_path: true,
            search_path: Vec::new(),
            resource_root: None,
            log_filter: None,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Append search bases, skipping ones already configured
    pub fn extend_search_path<I, S>(&mut self, bases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for base in bases {
            let base = base.into();
            if !self.search_path.contains(&base) {
                self.search_path.push(base);
            }
        }
    }
}
