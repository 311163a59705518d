//! Standalone checks
//!
//! A patch crate sees the host only through its public interface. These
//! checks reject items whose re-emitted code would reach private state of
//! the edited file.

use std::collections::BTreeSet;

use syn::visit::{self, Visit};
use syn::{Expr, ExprField, ExprMethodCall, ExprStruct, Member, Path};

use crate::domain::entities::{qualify_modules, CodeUnit, ParsedFile};

/// Visits one re-emitted item and records the first private reference
pub struct StandaloneCheck<'a> {
    file: &'a ParsedFile,
    unit: &'a CodeUnit,
    modules: Vec<&'a str>,
    private_methods: BTreeSet<&'a str>,
    /// Qualified names the patch emits under their original name
    reemitted: &'a BTreeSet<String>,
    problem: Option<String>,
}

impl<'a> StandaloneCheck<'a> {
    pub fn new(file: &'a ParsedFile, unit: &'a CodeUnit, reemitted: &'a BTreeSet<String>) -> Self {
        Self {
            file,
            unit,
            modules: unit.scope.modules(),
            private_methods: file.private_methods(&unit.scope),
            reemitted,
            problem: None,
        }
    }

    /// Check the owner type of a method before visiting its body
    pub fn check_owner(&mut self) {
        if let Some(owner) = self.unit.scope.owner_type() {
            if self.file.is_private_item(&self.modules, owner) {
                self.report(format!("type `{}` is private", owner));
            }
        }
    }

    pub fn finish(self) -> Result<(), String> {
        match self.problem {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    fn report(&mut self, problem: String) {
        if self.problem.is_none() {
            self.problem = Some(problem);
        }
    }

    fn is_reemitted_method(&self, name: &str) -> bool {
        self.reemitted.contains(&self.unit.scope.qualify(name))
    }

    fn check_static(&mut self, name: &str) {
        let qualified = qualify_modules(&self.modules, name);
        if self.file.is_static(&self.modules, name) && !self.reemitted.contains(&qualified) {
            self.report(format!(
                "touches host static `{}`; a patch would get its own copy",
                qualified
            ));
        }
    }

    /// Struct a field access or literal resolves to: the impl owner when it
    /// keeps `field` private, otherwise any struct of the same module that does
    fn private_field_owner(&self, field: &str) -> Option<String> {
        if let Some(owner) = self.unit.scope.owner_type() {
            if self.file.is_private_field(&self.modules, owner, field) {
                return Some(owner.to_string()).filter(|ty| !self.is_reemitted_type(ty));
            }
        }
        self.file
            .private_field_owner(&self.modules, field)
            .map(|ty| ty.rsplit("::").next().unwrap_or(ty).to_string())
            .filter(|ty| !self.is_reemitted_type(ty))
    }

    fn is_reemitted_type(&self, ty: &str) -> bool {
        self.reemitted.contains(&qualify_modules(&self.modules, ty))
    }
}

fn is_self(expr: &Expr) -> bool {
    matches!(expr, Expr::Path(path) if path.qself.is_none() && path.path.is_ident("self"))
}

impl<'ast> Visit<'ast> for StandaloneCheck<'_> {
    fn visit_path(&mut self, path: &'ast Path) {
        if path.leading_colon.is_none() {
            let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
            match segments.as_slice() {
                [name] => {
                    self.check_static(name);
                    let qualified = qualify_modules(&self.modules, name);
                    if self.file.is_private_item(&self.modules, name) && !self.reemitted.contains(&qualified) {
                        self.report(format!("references private item `{}`", qualified));
                    }
                }
                [first, name] if first == "self" => self.check_static(name),
                [first, method] if first == "Self" => {
                    if self.private_methods.contains(method.as_str()) && !self.is_reemitted_method(method) {
                        self.report(format!("calls private method `Self::{}`", method));
                    }
                }
                _ => {}
            }
        }
        visit::visit_path(self, path);
    }

    fn visit_expr_field(&mut self, expr: &'ast ExprField) {
        if let Member::Named(field) = &expr.member {
            let field = field.to_string();
            if let Some(owner) = self.private_field_owner(&field) {
                self.report(format!("reads private field `{}::{}`", owner, field));
            }
        }
        visit::visit_expr_field(self, expr);
    }

    fn visit_expr_struct(&mut self, expr: &'ast ExprStruct) {
        let target = expr.path.segments.last().map(|s| s.ident.to_string());
        let owner = match target.as_deref() {
            Some("Self") => self.unit.scope.owner_type().map(str::to_string),
            other => other.map(str::to_string),
        };
        if let Some(owner) = owner.filter(|ty| !self.is_reemitted_type(ty)) {
            for field in &expr.fields {
                if let Member::Named(name) = &field.member {
                    let name = name.to_string();
                    if self.file.is_private_field(&self.modules, &owner, &name) {
                        self.report(format!("builds `{}` with private field `{}`", owner, name));
                    }
                }
            }
        }
        visit::visit_expr_struct(self, expr);
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        let method = call.method.to_string();
        if is_self(&call.receiver)
            && self.private_methods.contains(method.as_str())
            && !self.is_reemitted_method(&method)
        {
            self.report(format!("calls private method `self.{}()`", method));
        }
        visit::visit_expr_method_call(self, call);
    }
}
