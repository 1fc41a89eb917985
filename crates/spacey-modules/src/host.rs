// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host engine collaborators
//!
//! The resolver never owns module objects. It asks the host engine's registry
//! whether a key is already known, hands it source text to intern, and asks it
//! to compile dynamically imported modules. These traits describe that surface.

/// The host engine's module registry
///
/// Methods take `&self`; implementations are expected to use interior
/// mutability, since the resolver holds shared references across awaits.
pub trait ModuleRegistry {
    /// Opaque handle to a registered module
    type Module: Clone;

    /// Look up a module registered under a URI key
    fn lookup_module(&self, key: &str) -> Option<Self::Module>;

    /// Register source text under a URI key. Returns `false` if rejected.
    fn register_module(
        &self,
        key: &str,
        human_id: &str,
        source: &str,
        compile_immediately: bool,
    ) -> bool;

    /// Look up an internal module by bare name
    fn lookup_internal_module(&self, name: &str) -> Option<Self::Module>;

    /// Register an internal module under its bare name. Returns `false` if rejected.
    fn register_internal_module(&self, name: &str, uri: &str, source: &str) -> bool;

    /// Compile and evaluate a registered module. Returns `false` on failure.
    fn compile_and_eval_module(&self, key: &str) -> bool;
}

/// The host engine's import hook surface
pub trait ModuleHost: ModuleRegistry {
    /// Whatever the engine passes to identify the importing module
    type ReferencingInfo;
    /// Token correlating a dynamic import with its pending promise
    type PromiseToken;

    /// Get the URI of the importing module, if it has one
    fn module_uri(&self, info: &Self::ReferencingInfo) -> Option<String>;

    /// Complete a dynamic import after its module was loaded and evaluated
    fn finish_dynamic_import(
        &self,
        info: &Self::ReferencingInfo,
        specifier: &str,
        token: Self::PromiseToken,
    );
}

/// Checks whether a resource behind a URI exists
pub trait ResourceProbe: Send + Sync {
    /// Check if `uri` names an existing resource
    fn exists(&self, uri: &str) -> bool;
}

/// A probe that finds nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceProbe for NoResources {
    fn exists(&self, _uri: &str) -> bool {
        false
    }
}

impl<F> ResourceProbe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn exists(&self, uri: &str) -> bool {
        self(uri)
    }
}
