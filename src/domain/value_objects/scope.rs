//! Scope Path Value Object
//!
//! The chain of named scopes enclosing a code unit: inline modules
//! (`mod name { .. }`) and inherent impl blocks (`impl Name { .. }`).
//! Code units are stored as a flat table; the scope path is what keeps
//! identity comparison independent of traversal depth.

use std::fmt;

use serde::Serialize;

/// What kind of named scope a segment re-opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Inline module
    Module,
    /// Inherent impl block of a named type
    Type,
}

/// One named scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeSegment {
    pub name: String,
    pub kind: ScopeKind,
}

impl ScopeSegment {
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Module,
        }
    }

    pub fn ty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Type,
        }
    }
}

/// Ordered list of enclosing scopes. Empty for file-level items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScopePath(Vec<ScopeSegment>);

impl ScopePath {
    /// The file-level scope
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<ScopeSegment>) -> Self {
        Self(segments)
    }

    /// A new path with `segment` appended; `self` is left untouched.
    pub fn child(&self, segment: ScopeSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[ScopeSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the leading module segments
    pub fn modules(&self) -> Vec<&str> {
        self.0
            .iter()
            .take_while(|s| s.kind == ScopeKind::Module)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// The innermost type segment, if the path ends inside an impl block
    pub fn owner_type(&self) -> Option<&str> {
        self.0
            .last()
            .filter(|s| s.kind == ScopeKind::Type)
            .map(|s| s.name.as_str())
    }

    /// `a::B::name`, or just `name` at file level
    pub fn qualify(&self, name: &str) -> String {
        if self.0.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self, name)
        }
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}
