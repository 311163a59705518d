//! Parsed File Entity
//!
//! The code units of one source file, plus the facts about the file the
//! patch synthesizer needs to emit standalone code.

use std::collections::{BTreeMap, BTreeSet};

use super::CodeUnit;
use crate::domain::value_objects::ScopePath;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// Code units in declaration order
    pub units: Vec<CodeUnit>,
    /// Rendered file-level `use` items
    pub imports: Vec<String>,
    /// Modules declared at file level (`mod a;` and `mod a { .. }`)
    pub modules: BTreeSet<String>,
    /// Qualified paths of inline modules, e.g. `a` and `a::b`
    pub inline_modules: BTreeSet<String>,
    /// Qualified names of non-`pub` functions, types, consts and statics
    /// declared at module level (file level or inside inline modules)
    pub private_items: BTreeSet<String>,
    /// Non-`pub` named fields, keyed by the struct's qualified name
    pub private_fields: BTreeMap<String, BTreeSet<String>>,
    /// Qualified names of every module-level `static` and `thread_local!`
    /// key, public or not
    pub statics: BTreeSet<String>,
}

impl ParsedFile {
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// Whether `name`, referenced from module scope `scope`, is a private
    /// module-level item of this file
    pub fn is_private_item(&self, scope: &[&str], name: &str) -> bool {
        self.private_items.contains(&qualify_modules(scope, name))
    }

    /// Whether `field` of the struct `ty` (declared in module scope `scope`)
    /// is private
    pub fn is_private_field(&self, scope: &[&str], ty: &str, field: &str) -> bool {
        self.private_fields
            .get(&qualify_modules(scope, ty))
            .map(|fields| fields.contains(field))
            .unwrap_or(false)
    }

    /// A struct declared directly in module scope `scope` that keeps `field`
    /// private
    pub fn private_field_owner(&self, scope: &[&str], field: &str) -> Option<&str> {
        let module = scope.join("::");
        self.private_fields
            .iter()
            .filter(|(_, fields)| fields.contains(field))
            .map(|(ty, _)| ty.as_str())
            .find(|ty| match ty.rsplit_once("::") {
                Some((parent, _)) => parent == module,
                None => module.is_empty(),
            })
    }

    /// Whether `name`, referenced from module scope `scope`, is a static of
    /// this file
    pub fn is_static(&self, scope: &[&str], name: &str) -> bool {
        self.statics.contains(&qualify_modules(scope, name))
    }

    /// Non-`pub` methods declared in the impl scope `scope`
    pub fn private_methods(&self, scope: &ScopePath) -> BTreeSet<&str> {
        self.units
            .iter()
            .filter(|u| &u.scope == scope && !u.public)
            .map(|u| u.name.as_str())
            .collect()
    }
}

/// `a::b::name`, or `name` at file level
pub fn qualify_modules(scope: &[&str], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope.join("::"), name)
    }
}
