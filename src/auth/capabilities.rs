// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path-prefix capabilities and the authorization check.

use serde::{Deserialize, Serialize};

/// Set of path prefixes a token bearer may access.
///
/// Order is preserved on the wire so a list survives an encode/decode cycle
/// unchanged, but it plays no part in authorization: duplicates are inert and
/// any element may grant access.
///
/// - `"/"` grants the whole site
/// - `"/album/subalbum/"` grants that album and everything below it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityList(Vec<String>);

impl CapabilityList {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self(prefixes)
    }

    /// The capability granting access to every path.
    pub fn full_site() -> Self {
        Self(vec!["/".to_string()])
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether `path` falls under one of these prefixes. See [`check`].
    pub fn allows(&self, path: &str) -> bool {
        check(self, path)
    }
}

impl From<Vec<String>> for CapabilityList {
    fn from(prefixes: Vec<String>) -> Self {
        Self::new(prefixes)
    }
}

impl<'a> FromIterator<&'a str> for CapabilityList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Returns true iff some capability is a literal string prefix of `path`.
///
/// Matching is deliberately not segment-aware: `"/a"` admits `"/ab"`.
/// Operators scope a folder by granting a `/`-terminated prefix.
pub fn check(capabilities: &CapabilityList, path: &str) -> bool {
    capabilities.iter().any(|prefix| path.starts_with(prefix))
}
