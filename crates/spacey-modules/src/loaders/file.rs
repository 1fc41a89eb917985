// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `file://` and `resource://` backend
//!
//! `file:` URIs map to local paths. `resource:` URIs map onto a resource root
//! directory, so `resource:///org/app/x.js` reads `<root>/org/app/x.js`.

use crate::config::LoaderConfig;
use crate::context::ResolverContext;
use crate::error::LoaderError;
use crate::host::ResourceProbe;
use crate::scheme::{HandlerResult, SchemeBackend};
use crate::uri::ModuleUri;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Schemes served by [`FileBackend`]
pub const FILE_SCHEMES: [&str; 2] = ["file", "resource"];

/// A module file could not be read
#[derive(Debug, Error)]
#[error("Unable to load file from: {uri}")]
pub struct FileLoadError {
    uri: String,
    #[source]
    source: std::io::Error,
}

/// Filesystem-backed loader for `file` and `resource` URIs
#[derive(Debug, Clone, Default)]
pub struct FileBackend {
    resource_root: Option<PathBuf>,
}

impl FileBackend {
    /// Create a backend without a resource root; `resource:` URIs fail to load
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend serving `resource:` URIs from `root`
    pub fn with_resource_root(root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: Some(root.into()),
        }
    }

    /// Create a backend from configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            resource_root: config.resource_root.clone(),
        }
    }

    /// Directory backing `resource:` URIs
    pub fn resource_root(&self) -> Option<&Path> {
        self.resource_root.as_deref()
    }

    /// Register this backend for `file` and `resource`, and use it as the
    /// context's resource probe
    pub fn install(self: Arc<Self>, ctx: &mut ResolverContext) {
        ctx.schemes_mut()
            .install_backend(FILE_SCHEMES, Arc::clone(&self));
        ctx.set_resource_probe(self);
    }

    /// Map a URI to the local path it names
    pub fn to_path(&self, uri: &ModuleUri) -> HandlerResult<PathBuf> {
        let url = Url::parse(uri.raw())?;

        match uri.scheme() {
            "file" => url
                .to_file_path()
                .map_err(|()| LoaderError::from(format!("Not a local file URI: {}", uri))),
            "resource" => {
                let root = self
                    .resource_root
                    .as_ref()
                    .ok_or_else(|| format!("No resource root configured for {}", uri))?;

                let segments = url
                    .path_segments()
                    .ok_or_else(|| format!("Not a hierarchical URI: {}", uri))?;

                let mut path = root.clone();
                for segment in segments.filter(|s| !s.is_empty()) {
                    let decoded = urlencoding::decode(segment)?;
                    if decoded.contains(['/', '\\']) || decoded == "." || decoded == ".." {
                        return Err(LoaderError::from(format!(
                            "Invalid path segment '{}' in {}",
                            decoded, uri
                        )));
                    }
                    path.push(decoded.as_ref());
                }
                Ok(path)
            }
            other => Err(LoaderError::from(format!(
                "Unsupported scheme '{}' for {}",
                other, uri
            ))),
        }
    }

    fn load_error(uri: &ModuleUri, source: std::io::Error) -> FileLoadError {
        FileLoadError {
            uri: uri.raw().to_string(),
            source,
        }
    }
}

#[async_trait]
impl SchemeBackend for FileBackend {
    fn resolve_relative(&self, base: &ModuleUri, relative: &str) -> HandlerResult<String> {
        let base = Url::parse(base.raw())?;
        let mut resolved = base.join(relative)?;

        let needs_extension = resolved
            .path()
            .rsplit('/')
            .next()
            .is_some_and(|name| !name.is_empty() && Path::new(name).extension().is_none());

        if needs_extension {
            let path = format!("{}.js", resolved.path());
            resolved.set_path(&path);
        }

        Ok(resolved.into())
    }

    fn load(&self, uri: &ModuleUri) -> HandlerResult<Option<String>> {
        let path = self.to_path(uri)?;
        let text = std::fs::read_to_string(&path).map_err(|e| Self::load_error(uri, e))?;
        Ok(Some(text))
    }

    async fn load_async(&self, uri: &ModuleUri) -> HandlerResult<Option<String>> {
        let path = self.to_path(uri)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Self::load_error(uri, e))?;
        Ok(Some(text))
    }
}

impl ResourceProbe for FileBackend {
    fn exists(&self, uri: &str) -> bool {
        ModuleUri::parse(uri)
            .and_then(|uri| self.to_path(&uri).ok())
            .is_some_and(|path| path.is_file())
    }
}
