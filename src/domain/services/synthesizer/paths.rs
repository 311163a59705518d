//! Path rewriting for re-emitted items
//!
//! A patch is compiled as its own crate, so every path in a re-emitted item
//! that was relative to the host crate (`crate::`, `self::`, `super::`, or a
//! module declared in the edited file) must become an absolute path through
//! the host crate's extern name.

use std::collections::BTreeSet;

use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{Ident, ItemUse, Path, PathSegment, UsePath, UseTree};

/// Rewrites host-relative paths to absolute ones
pub struct PathRewriter {
    crate_name: String,
    /// Module path of the enclosing scope inside the host crate
    context: Vec<String>,
    /// Modules declared in the enclosing scope of the edited file
    local_modules: BTreeSet<String>,
    error: Option<String>,
}

impl PathRewriter {
    pub fn new(crate_name: &str, context: Vec<String>, local_modules: BTreeSet<String>) -> Self {
        Self {
            crate_name: crate_name.to_string(),
            context,
            local_modules,
            error: None,
        }
    }

    /// The first failure seen, if any
    pub fn finish(self) -> Result<(), String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Absolute path segments of the enclosing scope, crate name first
    pub fn scope_prefix(&self) -> Vec<String> {
        let mut prefix = vec![self.crate_name.clone()];
        prefix.extend(self.context.iter().cloned());
        prefix
    }

    /// Rewrite a file-level `use` item
    pub fn rewrite_use(&mut self, item: &mut ItemUse) {
        if item.leading_colon.is_some() {
            return;
        }
        let (prefix, rest) = match &item.tree {
            UseTree::Path(path) if path.ident == "crate" => {
                (vec![self.crate_name.clone()], (*path.tree).clone())
            }
            UseTree::Path(path) if path.ident == "self" => (self.scope_prefix(), (*path.tree).clone()),
            UseTree::Path(path) if path.ident == "super" => {
                let mut depth = 1;
                let mut rest = (*path.tree).clone();
                while let UseTree::Path(inner) = &rest {
                    if inner.ident != "super" {
                        break;
                    }
                    depth += 1;
                    rest = (*inner.tree).clone();
                }
                match self.ancestor(depth) {
                    Some(prefix) => (prefix, rest),
                    None => return,
                }
            }
            UseTree::Path(path) if self.local_modules.contains(&path.ident.to_string()) => {
                (self.scope_prefix(), item.tree.clone())
            }
            _ => return,
        };

        let mut tree = rest;
        for name in prefix.iter().rev() {
            let Some(ident) = self.ident(name) else {
                return;
            };
            tree = UseTree::Path(UsePath {
                ident,
                colon2_token: Default::default(),
                tree: Box::new(tree),
            });
        }
        item.tree = tree;
        item.leading_colon = Some(Default::default());
    }

    /// `{crate}::{context[..len - depth]}`, or `None` (with the error
    /// recorded) when `depth` climbs above the crate root
    fn ancestor(&mut self, depth: usize) -> Option<Vec<String>> {
        if depth > self.context.len() {
            self.fail(format!(
                "`{}` climbs above the crate root",
                vec!["super"; depth].join("::")
            ));
            return None;
        }
        let mut prefix = vec![self.crate_name.clone()];
        prefix.extend(self.context[..self.context.len() - depth].iter().cloned());
        Some(prefix)
    }

    fn ident(&mut self, name: &str) -> Option<Ident> {
        match syn::parse_str::<Ident>(name) {
            Ok(ident) => Some(ident),
            Err(_) => {
                self.fail(format!("`{}` is not a valid path segment", name));
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    fn absolute(&mut self, path: &mut Path, prefix: Vec<String>, skip: usize) {
        let mut segments: Punctuated<PathSegment, syn::Token![::]> = Punctuated::new();
        for name in &prefix {
            let Some(ident) = self.ident(name) else {
                return;
            };
            segments.push(PathSegment::from(ident));
        }
        for segment in path.segments.iter().skip(skip) {
            segments.push(segment.clone());
        }
        path.segments = segments;
        path.leading_colon = Some(Default::default());
    }
}

impl VisitMut for PathRewriter {
    fn visit_path_mut(&mut self, path: &mut Path) {
        if path.leading_colon.is_none() && path.segments.len() >= 2 {
            let first = path.segments[0].ident.to_string();
            match first.as_str() {
                "crate" => {
                    let prefix = vec![self.crate_name.clone()];
                    self.absolute(path, prefix, 1);
                }
                "self" => {
                    let prefix = self.scope_prefix();
                    self.absolute(path, prefix, 1);
                }
                "super" => {
                    let depth = path
                        .segments
                        .iter()
                        .take_while(|s| s.ident == "super")
                        .count();
                    if let Some(prefix) = self.ancestor(depth) {
                        self.absolute(path, prefix, depth);
                    }
                }
                name if self.local_modules.contains(name) => {
                    let prefix = self.scope_prefix();
                    self.absolute(path, prefix, 0);
                }
                _ => {}
            }
        }
        visit_mut::visit_path_mut(self, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;

    fn rewriter(context: &[&str]) -> PathRewriter {
        PathRewriter::new(
            "app",
            context.iter().map(|s| s.to_string()).collect(),
            ["helpers".to_string()].into_iter().collect(),
        )
    }

    fn rewrite_expr(rewriter: &mut PathRewriter, source: &str) -> String {
        let mut expr: syn::Expr = syn::parse_str(source).unwrap();
        rewriter.visit_expr_mut(&mut expr);
        expr.to_token_stream().to_string()
    }

    #[test]
    fn crate_paths_use_extern_name() {
        let mut r = rewriter(&["greet"]);
        assert_eq!(rewrite_expr(&mut r, "crate::util::shout(x)"), ":: app :: util :: shout (x)");
    }

    #[test]
    fn self_and_super_resolve_against_context() {
        let mut r = rewriter(&["a", "b"]);
        assert_eq!(rewrite_expr(&mut r, "self::f()"), ":: app :: a :: b :: f ()");
        assert_eq!(rewrite_expr(&mut r, "super::f()"), ":: app :: a :: f ()");
        assert_eq!(rewrite_expr(&mut r, "super::super::f()"), ":: app :: f ()");
        assert!(r.finish().is_ok());
    }

    #[test]
    fn local_module_paths_become_absolute() {
        let mut r = rewriter(&["greet"]);
        assert_eq!(rewrite_expr(&mut r, "helpers::pad(s)"), ":: app :: greet :: helpers :: pad (s)");
    }

    #[test]
    fn unrelated_paths_are_untouched() {
        let mut r = rewriter(&[]);
        assert_eq!(rewrite_expr(&mut r, "std::mem::take(x)"), "std :: mem :: take (x)");
        assert_eq!(rewrite_expr(&mut r, "Self::new()"), "Self :: new ()");
        assert_eq!(rewrite_expr(&mut r, "self.count"), "self . count");
    }

    #[test]
    fn super_above_root_is_an_error() {
        let mut r = rewriter(&[]);
        rewrite_expr(&mut r, "super::f()");
        assert!(r.finish().unwrap_err().contains("crate root"));
    }

    #[test]
    fn use_items_are_rewritten() {
        let mut r = rewriter(&["net", "http"]);
        let cases = [
            ("use crate::a::B;", "use :: app :: a :: B ;"),
            ("use super::{x, y};", "use :: app :: net :: { x , y } ;"),
            ("use self::inner::*;", "use :: app :: net :: http :: inner :: * ;"),
            ("use helpers::pad;", "use :: app :: net :: http :: helpers :: pad ;"),
            ("use std::fmt;", "use std :: fmt ;"),
        ];
        for (source, expected) in cases {
            let mut item: ItemUse = syn::parse_str(source).unwrap();
            r.rewrite_use(&mut item);
            assert_eq!(item.to_token_stream().to_string(), expected, "{}", source);
        }
    }
}
