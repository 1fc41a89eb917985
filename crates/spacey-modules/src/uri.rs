// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module URIs
//!
//! A module URI is kept exactly as the importer wrote it. The only thing
//! extracted from it is the scheme, which selects the loader backend.

use std::fmt;

/// A parsed module URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleUri {
    raw: String,
    scheme: String,
}

impl ModuleUri {
    /// Parse a URI, returning `None` if it has no scheme
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let scheme = parse_scheme(&raw)?;
        Some(Self { raw, scheme })
    }

    /// The URI as originally written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercase scheme token
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Consume the URI, returning the raw string
    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl fmt::Display for ModuleUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Extract the scheme of a URI string
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by `:`. The returned token is lowercased.
pub fn parse_scheme(uri: &str) -> Option<String> {
    let colon = uri.find(':')?;
    let scheme = &uri[..colon];

    let mut chars = scheme.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }

    Some(scheme.to_ascii_lowercase())
}
