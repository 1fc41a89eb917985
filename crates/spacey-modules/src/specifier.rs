// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier classification

use crate::uri::ModuleUri;

/// What an import specifier names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier<'a> {
    /// `./foo` or `../foo`, resolved against the referencing module
    Relative(&'a str),
    /// A scheme-prefixed URI
    Uri(ModuleUri),
    /// A bare name looked up on the internal search path
    Bare(&'a str),
}

/// Check if a specifier is a relative path
pub fn is_relative_path(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Classify a specifier. Never fails; anything unrecognized is bare.
pub fn classify(specifier: &str) -> Specifier<'_> {
    if is_relative_path(specifier) {
        return Specifier::Relative(specifier);
    }

    match ModuleUri::parse(specifier) {
        Some(uri) => Specifier::Uri(uri),
        None => Specifier::Bare(specifier),
    }
}
