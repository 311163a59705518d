//! Code Unit Entity
//!
//! One declared function or named type of a source file.

use serde::Serialize;

use crate::domain::value_objects::ScopePath;

/// Kind of a code unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Function,
    Type,
}

/// A declared function or named type
///
/// Identity is `(scope, name, kind)` plus the signature for functions.
/// `signature` and `body` are token renderings, so formatting and ordinary
/// comments never influence comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeUnit {
    pub scope: ScopePath,
    pub name: String,
    pub kind: UnitKind,
    /// Canonical signature; empty for types
    pub signature: String,
    /// Canonical body; empty for types
    pub body: String,
    /// Rendering of the whole item, used only to re-emit it
    #[serde(skip)]
    pub origin: String,
    /// Declared `pub`
    pub public: bool,
    /// Has type or const parameters, directly or through its impl block
    pub generic: bool,
}

impl CodeUnit {
    pub fn function(
        scope: ScopePath,
        name: impl Into<String>,
        signature: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            name: name.into(),
            kind: UnitKind::Function,
            signature: signature.into(),
            body: body.into(),
            origin: String::new(),
            public: true,
            generic: false,
        }
    }

    pub fn type_decl(scope: ScopePath, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
            kind: UnitKind::Type,
            signature: String::new(),
            body: String::new(),
            origin: String::new(),
            public: true,
            generic: false,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_generic(mut self, generic: bool) -> Self {
        self.generic = generic;
        self
    }

    /// Same `(scope, name, kind)` and, for functions, the same signature
    pub fn same_declaration(&self, other: &CodeUnit) -> bool {
        self.scope == other.scope
            && self.name == other.name
            && self.kind == other.kind
            && (self.kind != UnitKind::Function || self.signature == other.signature)
    }

    /// Same canonical body
    pub fn same_implementation(&self, other: &CodeUnit) -> bool {
        self.body == other.body
    }

    /// `scope::name`
    pub fn qualified_name(&self) -> String {
        self.scope.qualify(&self.name)
    }

    pub fn is_method(&self) -> bool {
        self.kind == UnitKind::Function && self.scope.owner_type().is_some()
    }
}
