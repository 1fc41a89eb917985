// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! In-memory module registry
//!
//! A standalone implementation of the host collaborator traits. It keeps the
//! registered source text and remembers which modules were evaluated and which
//! dynamic imports were completed, which is all the resolver needs to be
//! driven outside of a full engine.

use crate::host::{ModuleHost, ModuleRegistry};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether a module compiles
pub type Compiler = Arc<dyn Fn(&ModuleRecord) -> bool + Send + Sync>;

/// A registered module
#[derive(Debug)]
pub struct ModuleRecord {
    key: String,
    human_id: String,
    source: String,
    internal: bool,
    evaluated: AtomicBool,
}

impl ModuleRecord {
    /// Registry key: the URI, or the bare name for internal modules
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable id. For internal modules this is the URI it was loaded from.
    pub fn human_id(&self) -> &str {
        &self.human_id
    }

    /// Source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this module was found on the internal search path
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Whether the module has been compiled and evaluated
    pub fn is_evaluated(&self) -> bool {
        self.evaluated.load(Ordering::Acquire)
    }
}

/// Identifies the module performing an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Referrer {
    uri: Option<String>,
}

impl Referrer {
    /// A referrer loaded from `uri`
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
        }
    }

    /// A referrer with no known location (e.g. an eval'd script)
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Location of the referrer
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// A dynamic import that reached completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedImport {
    /// The importing module
    pub referrer: Referrer,
    /// Specifier as written by the importer
    pub specifier: String,
    /// Promise token passed to the hook
    pub token: u64,
}

/// Thread-safe in-memory module registry
pub struct InMemoryRegistry {
    /// Modules keyed by URI
    modules: DashMap<String, Arc<ModuleRecord>>,
    /// Internal modules keyed by bare name
    internal: DashMap<String, Arc<ModuleRecord>>,
    sealed: AtomicBool,
    compiler: RwLock<Option<Compiler>>,
    finished: Mutex<Vec<FinishedImport>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            internal: DashMap::new(),
            sealed: AtomicBool::new(false),
            compiler: RwLock::new(None),
            finished: Mutex::new(Vec::new()),
        }
    }

    /// Reject every further registration
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// Check if the registry rejects registrations
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Install a compile step. Without one every module compiles.
    pub fn set_compiler<F>(&self, compiler: F)
    where
        F: Fn(&ModuleRecord) -> bool + Send + Sync + 'static,
    {
        *self.compiler.write() = Some(Arc::new(compiler));
    }

    /// Registry keys of all URI modules, sorted
    pub fn module_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.modules.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Names of all internal modules, sorted
    pub fn internal_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.internal.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Dynamic imports completed so far, in completion order
    pub fn finished_imports(&self) -> Vec<FinishedImport> {
        self.finished.lock().clone()
    }

    /// Total number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len() + self.internal.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.internal.is_empty()
    }

    /// Forget every module and completed import
    pub fn clear(&self) {
        self.modules.clear();
        self.internal.clear();
        self.finished.lock().clear();
    }

    fn compile(&self, record: &ModuleRecord) -> bool {
        let compiles = match self.compiler.read().as_ref() {
            Some(compiler) => compiler(record),
            None => true,
        };
        if compiles {
            record.evaluated.store(true, Ordering::Release);
        }
        compiles
    }

    fn insert(
        &self,
        table: &DashMap<String, Arc<ModuleRecord>>,
        record: ModuleRecord,
    ) -> Option<Arc<ModuleRecord>> {
        if self.is_sealed() {
            return None;
        }

        match table.entry(record.key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let record = Arc::new(record);
                slot.insert(Arc::clone(&record));
                Some(record)
            }
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry for InMemoryRegistry {
    type Module = Arc<ModuleRecord>;

    fn lookup_module(&self, key: &str) -> Option<Self::Module> {
        self.modules.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn register_module(
        &self,
        key: &str,
        human_id: &str,
        source: &str,
        compile_immediately: bool,
    ) -> bool {
        let record = ModuleRecord {
            key: key.to_string(),
            human_id: human_id.to_string(),
            source: source.to_string(),
            internal: false,
            evaluated: AtomicBool::new(false),
        };

        match self.insert(&self.modules, record) {
            Some(record) if compile_immediately => self.compile(&record),
            Some(_) => true,
            None => false,
        }
    }

    fn lookup_internal_module(&self, name: &str) -> Option<Self::Module> {
        self.internal.get(name).map(|entry| Arc::clone(entry.value()))
    }

    fn register_internal_module(&self, name: &str, uri: &str, source: &str) -> bool {
        let record = ModuleRecord {
            key: name.to_string(),
            human_id: uri.to_string(),
            source: source.to_string(),
            internal: true,
            evaluated: AtomicBool::new(false),
        };

        self.insert(&self.internal, record).is_some()
    }

    fn compile_and_eval_module(&self, key: &str) -> bool {
        match self.lookup_module(key) {
            Some(record) => self.compile(&record),
            None => false,
        }
    }
}

impl ModuleHost for InMemoryRegistry {
    type ReferencingInfo = Referrer;
    type PromiseToken = u64;

    fn module_uri(&self, info: &Referrer) -> Option<String> {
        info.uri().map(str::to_string)
    }

    fn finish_dynamic_import(&self, info: &Referrer, specifier: &str, token: u64) {
        self.finished.lock().push(FinishedImport {
            referrer: info.clone(),
            specifier: specifier.to_string(),
            token,
        });
    }
}
