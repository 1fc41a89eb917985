// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-modules
//!
//! ES module resolution and loading for the Spacey runtime.
//!
//! Given an import specifier and the URI of the importing module, the
//! resolver works out which module is meant, fetches its source through a
//! scheme-specific loader, and registers it with the host engine exactly once.
//!
//! - **Relative paths** (`./util`, `../lib/x.js`) are resolved against the
//!   importing module by its scheme's relative resolver
//! - **URIs** (`file:///app/main.js`, `resource:///org/app/x.js`) go straight
//!   to the scheme's loader
//! - **Bare names** (`gettext`) are looked up on the internal search path
//!
//! Static imports use the synchronous path ([`resolve_module`]); dynamic
//! `import()` uses the asynchronous path ([`resolve_module_async`]), which also
//! compiles the module once registered.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_modules::{FileBackend, HostBridge, InMemoryRegistry, Referrer, ResolverContext};
//! use std::sync::Arc;
//!
//! let mut ctx = ResolverContext::new();
//! Arc::new(FileBackend::with_resource_root("/usr/share/app")).install(&mut ctx);
//!
//! let bridge = HostBridge::new(Arc::new(ctx), Arc::new(InMemoryRegistry::new()));
//! let module = bridge.resolve_hook(&Referrer::new("file:///app/main.js"), "./util")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod loaders;
pub mod registry;
pub mod resolve;
pub mod resolve_async;
pub mod scheme;
pub mod search_path;
pub mod specifier;
pub mod uri;

// Re-exports
pub use bridge::HostBridge;
pub use config::{ConfigError, LoaderConfig};
pub use context::{RESOURCE_SCHEME, ResolverContext};
pub use error::{ImportError, ImportErrorKind, LoaderError, Result};
pub use host::{ModuleHost, ModuleRegistry, NoResources, ResourceProbe};
pub use loaders::FileBackend;
pub use registry::{FinishedImport, InMemoryRegistry, ModuleRecord, Referrer};
pub use resolve::{resolve_module, resolve_specifier};
pub use resolve_async::resolve_module_async;
pub use scheme::{SchemeBackend, SchemeBuilder, SchemeRegistry};
pub use search_path::{DEFAULT_CORE_BASE, DEFAULT_ESM_BASE, SearchPath};
pub use specifier::{Specifier, classify};
pub use uri::{ModuleUri, parse_scheme};

/// Version of spacey-modules
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
