// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution

use thiserror::Error;

/// Result type for module resolution operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Error raised by a scheme handler (relative resolver or loader)
pub type LoaderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving or loading a module
#[derive(Debug, Error)]
pub enum ImportError {
    /// Relative import attempted from a module with no known URI
    #[error("Cannot import from relative path when module path is unknown.")]
    UnknownReferencingPath,

    /// A module URI failed to parse
    #[error("Module has invalid URI: {uri}")]
    InvalidModuleUri {
        /// The offending URI
        uri: String,
    },

    /// Relative import from a scheme without a relative resolver
    #[error(
        "Relative imports can only occur from the following URI schemes: {}",
        format_schemes(.allowed)
    )]
    UnsupportedRelativeScheme {
        /// Scheme of the referencing module
        scheme: String,
        /// Schemes that have a relative resolver registered
        allowed: Vec<String>,
    },

    /// No loader of the required flavor is registered for the scheme
    #[error("No resolver found for URI: {uri}")]
    NoLoaderForScheme {
        /// The URI that could not be dispatched
        uri: String,
    },

    /// A relative resolver raised
    #[error("Unable to resolve '{specifier}' relative to {base}: {source}")]
    RelativeResolution {
        /// Referencing module URI
        base: String,
        /// The relative specifier
        specifier: String,
        /// Underlying resolver error
        #[source]
        source: LoaderError,
    },

    /// A scheme loader raised
    #[error("Unable to load module {uri}: {source}")]
    Load {
        /// The URI being loaded
        uri: String,
        /// Underlying loader error
        #[source]
        source: LoaderError,
    },

    /// The registry rejected a registration
    #[error("Failed to register module: {key}")]
    RegistrationFailure {
        /// Registry key of the rejected module
        key: String,
    },

    /// No search-path candidate exists or loaded for a bare specifier
    #[error("Attempted to load unregistered global module: {specifier}")]
    UnregisteredBareModule {
        /// The bare specifier
        specifier: String,
    },

    /// Compile-and-evaluate of a freshly registered module failed
    #[error("Failed to compile and evaluate module {uri}.")]
    CompileFailure {
        /// Registry key of the module
        uri: String,
    },

    /// A module vanished between registration and evaluation
    #[error("Unknown dynamic import error occurred.")]
    UnknownDynamicImport,

    /// Any failure surfaced through the dynamic import hook
    #[error("Dynamic module import failed: {0}")]
    DynamicImportFailed(#[source] Box<ImportError>),
}

/// Discriminant of an [`ImportError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportErrorKind {
    /// See [`ImportError::UnknownReferencingPath`]
    UnknownReferencingPath,
    /// See [`ImportError::InvalidModuleUri`]
    InvalidModuleUri,
    /// See [`ImportError::UnsupportedRelativeScheme`]
    UnsupportedRelativeScheme,
    /// See [`ImportError::NoLoaderForScheme`]
    NoLoaderForScheme,
    /// See [`ImportError::RelativeResolution`]
    RelativeResolution,
    /// See [`ImportError::Load`]
    Load,
    /// See [`ImportError::RegistrationFailure`]
    RegistrationFailure,
    /// See [`ImportError::UnregisteredBareModule`]
    UnregisteredBareModule,
    /// See [`ImportError::CompileFailure`]
    CompileFailure,
    /// [`ImportError::UnknownDynamicImport`] or [`ImportError::DynamicImportFailed`]
    GenericDynamicImportFailure,
}

impl ImportError {
    /// Get the kind of this error
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            Self::UnknownReferencingPath => ImportErrorKind::UnknownReferencingPath,
            Self::InvalidModuleUri { .. } => ImportErrorKind::InvalidModuleUri,
            Self::UnsupportedRelativeScheme { .. } => ImportErrorKind::UnsupportedRelativeScheme,
            Self::NoLoaderForScheme { .. } => ImportErrorKind::NoLoaderForScheme,
            Self::RelativeResolution { .. } => ImportErrorKind::RelativeResolution,
            Self::Load { .. } => ImportErrorKind::Load,
            Self::RegistrationFailure { .. } => ImportErrorKind::RegistrationFailure,
            Self::UnregisteredBareModule { .. } => ImportErrorKind::UnregisteredBareModule,
            Self::CompileFailure { .. } => ImportErrorKind::CompileFailure,
            Self::UnknownDynamicImport | Self::DynamicImportFailed(_) => {
                ImportErrorKind::GenericDynamicImportFailure
            }
        }
    }

    /// Get the kind of the innermost error, looking through dynamic import wrappers
    pub fn root_kind(&self) -> ImportErrorKind {
        match self {
            Self::DynamicImportFailed(inner) => inner.root_kind(),
            other => other.kind(),
        }
    }

    /// Wrap an error for the dynamic import hook
    pub fn dynamic(inner: ImportError) -> Self {
        Self::DynamicImportFailed(Box::new(inner))
    }

    /// Create an unregistered global module error
    pub fn unregistered(specifier: impl Into<String>) -> Self {
        Self::UnregisteredBareModule {
            specifier: specifier.into(),
        }
    }
}

fn format_schemes(schemes: &[String]) -> String {
    schemes
        .iter()
        .map(|s| format!("{}://", s))
        .collect::<Vec<_>>()
        .join(", ")
}
