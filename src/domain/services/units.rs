//! Unit Extractor
//!
//! Turns a Rust source file into a flat table of code units. The traversal
//! is an explicit depth-first walk that passes the enclosing scope path down
//! as an argument; nothing about the current scope is kept on the side.

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::visit::{self, Visit};
use syn::{
    Block, Fields, GenericParam, Generics, ImplItem, Item, PathArguments, Signature, Type,
    TypeImplTrait, Visibility,
};

use crate::domain::entities::{qualify_modules, CodeUnit, ParsedFile};
use crate::domain::value_objects::{ScopePath, ScopeSegment};

/// Parse `content` and extract its code units
pub fn parse_file(content: &str) -> syn::Result<ParsedFile> {
    let file = syn::parse_file(content)?;
    Ok(extract(&file))
}

/// Extract code units from an already parsed file
pub fn extract(file: &syn::File) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for item in &file.items {
        match item {
            Item::Use(item) => parsed.imports.push(render(item)),
            Item::Mod(item) => {
                parsed.modules.insert(name_of(&item.ident));
            }
            _ => {}
        }
    }

    collect_items(&file.items, &ScopePath::root(), &mut parsed);
    parsed
}

fn collect_items(items: &[Item], scope: &ScopePath, out: &mut ParsedFile) {
    let modules = scope.modules();

    for item in items {
        match item {
            Item::Fn(item) => {
                note_private(out, &modules, &item.vis, &item.sig.ident);
                out.units.push(
                    function_unit(scope, &item.sig, &item.block, false)
                        .with_public(is_public(&item.vis))
                        .with_origin(render(item)),
                );
            }
            Item::Struct(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                if let Fields::Named(fields) = &item.fields {
                    let private: std::collections::BTreeSet<String> = fields
                        .named
                        .iter()
                        .filter(|f| !is_public(&f.vis))
                        .filter_map(|f| f.ident.as_ref().map(name_of))
                        .collect();
                    if !private.is_empty() {
                        out.private_fields
                            .insert(qualify_modules(&modules, &name_of(&item.ident)), private);
                    }
                }
                out.units.push(type_unit(scope, &item.ident, &item.vis, item));
            }
            Item::Enum(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                out.units.push(type_unit(scope, &item.ident, &item.vis, item));
            }
            Item::Union(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                out.units.push(type_unit(scope, &item.ident, &item.vis, item));
            }
            Item::Trait(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                out.units.push(type_unit(scope, &item.ident, &item.vis, item));
            }
            Item::Type(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                out.units.push(type_unit(scope, &item.ident, &item.vis, item));
            }
            Item::Const(item) => note_private(out, &modules, &item.vis, &item.ident),
            Item::Static(item) => {
                note_private(out, &modules, &item.vis, &item.ident);
                out.statics
                    .insert(qualify_modules(&modules, &name_of(&item.ident)));
            }
            Item::Macro(item) if is_thread_local(&item.mac.path) => {
                for name in thread_local_names(&item.mac.tokens) {
                    out.statics.insert(qualify_modules(&modules, &name));
                }
            }
            Item::Mod(item) => {
                if let Some((_, nested)) = &item.content {
                    out.inline_modules
                        .insert(qualify_modules(&modules, &name_of(&item.ident)));
                    let child = scope.child(ScopeSegment::module(name_of(&item.ident)));
                    collect_items(nested, &child, out);
                }
            }
            // Trait impls are not re-openable from a patch crate; only
            // inherent impls contribute units.
            Item::Impl(item) if item.trait_.is_none() => {
                let Some((name, generic_self)) = self_type(&item.self_ty) else {
                    continue;
                };
                let impl_scope = scope.child(ScopeSegment::ty(name));
                let generic_impl = generic_self || !item.generics.params.is_empty();
                for member in &item.items {
                    if let ImplItem::Fn(method) = member {
                        out.units.push(
                            function_unit(&impl_scope, &method.sig, &method.block, generic_impl)
                                .with_public(is_public(&method.vis))
                                .with_origin(render(method)),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn function_unit(scope: &ScopePath, sig: &Signature, block: &Block, generic_owner: bool) -> CodeUnit {
    CodeUnit::function(
        scope.clone(),
        name_of(&sig.ident),
        render(sig),
        render(block),
    )
    .with_generic(generic_owner || has_type_params(&sig.generics) || has_impl_trait(sig))
}

fn type_unit<T: ToTokens>(scope: &ScopePath, ident: &syn::Ident, vis: &Visibility, item: &T) -> CodeUnit {
    CodeUnit::type_decl(scope.clone(), name_of(ident))
        .with_public(is_public(vis))
        .with_origin(render(item))
}

fn note_private(out: &mut ParsedFile, modules: &[&str], vis: &Visibility, ident: &syn::Ident) {
    if !is_public(vis) {
        out.private_items
            .insert(qualify_modules(modules, &name_of(ident)));
    }
}

fn is_thread_local(path: &syn::Path) -> bool {
    path.segments
        .last()
        .is_some_and(|segment| segment.ident == "thread_local")
}

/// Keys declared inside a `thread_local!` invocation: every identifier that
/// follows a `static` keyword
fn thread_local_names(tokens: &TokenStream) -> Vec<String> {
    let mut names = Vec::new();
    let mut after_static = false;
    for token in tokens.clone() {
        match token {
            TokenTree::Ident(ident) if ident == "static" => after_static = true,
            TokenTree::Ident(ident) if after_static => {
                names.push(name_of(&ident));
                after_static = false;
            }
            _ => after_static = false,
        }
    }
    names
}

/// Name of an impl's self type, and whether it carries generic arguments
fn self_type(ty: &Type) -> Option<(String, bool)> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    let generic = match &segment.arguments {
        PathArguments::None => false,
        PathArguments::AngleBracketed(args) => !args.args.is_empty(),
        PathArguments::Parenthesized(_) => true,
    };
    Some((name_of(&segment.ident), generic))
}

/// Type or const parameters; lifetimes alone do not prevent taking a
/// function's address
fn has_type_params(generics: &Generics) -> bool {
    generics
        .params
        .iter()
        .any(|p| !matches!(p, GenericParam::Lifetime(_)))
}

/// `impl Trait` anywhere in the signature hides a type parameter or an
/// unnameable return type
fn has_impl_trait(sig: &Signature) -> bool {
    struct Finder(bool);

    impl<'ast> Visit<'ast> for Finder {
        fn visit_type_impl_trait(&mut self, node: &'ast TypeImplTrait) {
            self.0 = true;
            visit::visit_type_impl_trait(self, node);
        }
    }

    let mut finder = Finder(false);
    finder.visit_signature(sig);
    finder.0
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

/// Identifier text without the `r#` prefix
fn name_of(ident: &syn::Ident) -> String {
    ident.unraw().to_string()
}

fn render<T: ToTokens>(node: &T) -> String {
    let tokens: TokenStream = node.to_token_stream();
    tokens.to_string()
}
