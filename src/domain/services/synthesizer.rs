//! Patch Synthesizer Domain Service
//!
//! Emits one standalone crate root holding replacement code for every
//! added or changed unit of a diff. Changed units are renamed to
//! `{name}_patch_{generation}` and registered with the patch table through
//! the exported entry point; added units are re-emitted under their own
//! names. Removed units produce nothing.

mod paths;
mod standalone;

use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, ToTokens};
use syn::visit::Visit;
use syn::visit_mut::VisitMut;
use syn::{Attribute, ImplItemFn, Item, ItemFn, ItemUse, LitStr, Visibility};

use crate::domain::entities::{CodeUnit, ParsedFile, UnitKind};
use crate::domain::services::differ::DiffResult;
use crate::domain::value_objects::Generation;
use crate::error::{ReloadError, ReloadResult};

pub use paths::PathRewriter;
pub use standalone::StandaloneCheck;

/// Attributes that must not follow an item into a patch crate. `unsafe(..)`
/// is the 2024 spelling of `no_mangle` and `export_name`.
const DROPPED_ATTRIBUTES: &[&str] = &["no_mangle", "export_name", "unsafe", "test"];

const PATCH_HEADER: &str = "#![allow(unused_imports, dead_code, non_snake_case, non_camel_case_types, unused_variables, unused_mut, unused_unsafe)]";

/// Everything needed to synthesize one patch
#[derive(Debug, Clone, Copy)]
pub struct PatchRequest<'a> {
    pub diff: &'a DiffResult,
    /// The file before the edit; decides which scopes exist in the host
    pub old: &'a ParsedFile,
    /// The file after the edit; supplies imports and privacy facts
    pub new: &'a ParsedFile,
    /// `--crate-name` of the host crate
    pub crate_name: &'a str,
    /// Module path of the edited file inside the host crate
    pub module_path: &'a [String],
    pub generation: Generation,
}

/// One redirected symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// Patch table key of the original, `{crate}::{module}::{scope}::{name}`
    pub key: String,
    /// Name of the replacement inside the patch crate
    pub replacement: String,
}

/// The synthesized crate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedPatch {
    pub generation: Generation,
    pub source: String,
    pub overrides: Vec<Override>,
    /// Qualified names of units re-emitted under their own name
    pub added: Vec<String>,
}

/// Items collected for one module scope of the patch
#[derive(Default)]
struct ModuleBlock {
    items: Vec<TokenStream>,
    extensions: BTreeMap<String, Extension>,
    children: BTreeMap<String, ModuleBlock>,
}

/// A local extension trait re-opening a host type
struct Extension {
    self_ty: TokenStream,
    declarations: Vec<TokenStream>,
    definitions: Vec<TokenStream>,
}

impl ModuleBlock {
    fn descend(&mut self, modules: &[&str]) -> &mut ModuleBlock {
        let mut block = self;
        for name in modules {
            block = block.children.entry(name.to_string()).or_default();
        }
        block
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchSynthesizer;

impl PatchSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, request: &PatchRequest<'_>) -> ReloadResult<SynthesizedPatch> {
        let generation = request.generation;
        let reemitted: BTreeSet<String> = request.diff.added().map(|u| u.qualified_name()).collect();

        let mut root = ModuleBlock::default();
        let mut registrations: Vec<TokenStream> = Vec::new();
        let mut overrides = Vec::new();

        for unit in request.diff.added() {
            self.emit_added(request, unit, &reemitted, &mut root)?;
        }

        for (_, unit) in request.diff.changed() {
            let (pointer, replacement) = self.emit_changed(request, unit, &reemitted, &mut root)?;
            let key = symbol_key(request.crate_name, request.module_path, unit);
            let key_lit = LitStr::new(&key, Span::call_site());
            registrations.push(quote! {
                register(ctx, #key_lit.as_ptr(), #key_lit.len(), #pointer as *const ());
            });
            tracing::trace!(key = %key, replacement = %replacement, "override");
            overrides.push(Override { key, replacement });
        }

        let imports = self.imports(request)?;
        let host = host_path(request.crate_name, request.module_path)
            .map_err(|reason| failure("<imports>", reason))?;

        let entry = format_ident!("{}", generation.entry_symbol());
        let entry_point = quote! {
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn #entry(
                ctx: *mut ::core::ffi::c_void,
                register: unsafe extern "C" fn(*mut ::core::ffi::c_void, *const u8, usize, *const ()),
            ) {
                unsafe {
                    #(#registrations)*
                }
            }
        };

        let mut lines = vec![PATCH_HEADER.to_string(), quote!(use #host::*;).to_string()];
        lines.extend(imports.iter().map(|item| item.to_token_stream().to_string()));
        render_block(&root, &[], request, &mut lines)?;
        lines.push(entry_point.to_string());

        let source = lines.join("\n") + "\n";
        syn::parse_file(&source)
            .map_err(|e| failure("<patch>", format!("synthesized source does not parse: {}", e)))?;

        Ok(SynthesizedPatch {
            generation,
            source,
            overrides,
            added: reemitted.into_iter().collect(),
        })
    }

    fn imports(&self, request: &PatchRequest<'_>) -> ReloadResult<Vec<ItemUse>> {
        let mut rewriter = PathRewriter::new(
            request.crate_name,
            request.module_path.to_vec(),
            request.new.modules.clone(),
        );
        let mut imports = Vec::with_capacity(request.new.imports.len());
        for import in &request.new.imports {
            let mut item: ItemUse = syn::parse_str(import)
                .map_err(|e| failure("<imports>", format!("cannot re-parse `{}`: {}", import, e)))?;
            rewriter.rewrite_use(&mut item);
            imports.push(item);
        }
        rewriter.finish().map_err(|reason| failure("<imports>", reason))?;
        Ok(imports)
    }

    fn emit_added(
        &self,
        request: &PatchRequest<'_>,
        unit: &CodeUnit,
        reemitted: &BTreeSet<String>,
        root: &mut ModuleBlock,
    ) -> ReloadResult<()> {
        let name = unit.qualified_name();
        let modules = unit.scope.modules();
        let mut rewriter = rewriter_for(request, unit);

        match (unit.kind, unit.scope.owner_type()) {
            (UnitKind::Function, Some(owner)) => {
                let mut method = parse_method(unit)?;
                check_standalone(request.new, unit, reemitted, |c| c.visit_impl_item_fn(&method))?;
                rewriter.visit_impl_item_fn_mut(&mut method);
                rewriter.finish().map_err(|reason| failure(&name, reason))?;
                let extension = extension_for(request, root, &modules, owner)?;
                push_method(extension, method);
            }
            (UnitKind::Function, None) => {
                let mut item: ItemFn = syn::parse_str(&unit.origin)
                    .map_err(|e| failure(&name, format!("cannot re-parse: {}", e)))?;
                check_standalone(request.new, unit, reemitted, |c| c.visit_item_fn(&item))?;
                rewriter.visit_item_fn_mut(&mut item);
                rewriter.finish().map_err(|reason| failure(&name, reason))?;
                item.attrs.retain(keep_attribute);
                root.descend(&modules).items.push(item.into_token_stream());
            }
            (UnitKind::Type, _) => {
                let mut item: Item = syn::parse_str(&unit.origin)
                    .map_err(|e| failure(&name, format!("cannot re-parse: {}", e)))?;
                check_standalone(request.new, unit, reemitted, |c| c.visit_item(&item))?;
                rewriter.visit_item_mut(&mut item);
                rewriter.finish().map_err(|reason| failure(&name, reason))?;
                root.descend(&modules).items.push(item.into_token_stream());
            }
        }
        Ok(())
    }

    /// Emit a changed unit; returns the pointer expression registered for
    /// it and the replacement's name
    fn emit_changed(
        &self,
        request: &PatchRequest<'_>,
        unit: &CodeUnit,
        reemitted: &BTreeSet<String>,
        root: &mut ModuleBlock,
    ) -> ReloadResult<(TokenStream, String)> {
        let name = unit.qualified_name();
        if unit.generic {
            return Err(failure(&name, "generic items have no single address to redirect"));
        }

        let generation = request.generation;
        let replacement = generation.patch_name(&unit.name);
        let replacement_ident = format_ident!("{}", replacement);
        let modules = unit.scope.modules();
        let mut rewriter = rewriter_for(request, unit);
        let module_tokens: Vec<_> = modules.iter().map(|m| format_ident!("{}", m)).collect();

        match unit.scope.owner_type() {
            Some(owner) => {
                let mut method = parse_method(unit)?;
                check_standalone(request.new, unit, reemitted, |c| {
                    c.check_owner();
                    c.visit_impl_item_fn(&method);
                })?;
                rewriter.visit_impl_item_fn_mut(&mut method);
                rewriter.finish().map_err(|reason| failure(&name, reason))?;
                method.sig.ident = replacement_ident.clone();

                let extension = extension_for(request, root, &modules, owner)?;
                let self_ty = extension.self_ty.clone();
                push_method(extension, method);

                let trait_ident = format_ident!("{}Patch{}", owner, generation.value());
                let pointer = quote! {
                    <#self_ty as crate #(:: #module_tokens)* :: #trait_ident>::#replacement_ident
                };
                Ok((pointer, replacement))
            }
            None => {
                let mut item: ItemFn = syn::parse_str(&unit.origin)
                    .map_err(|e| failure(&name, format!("cannot re-parse: {}", e)))?;
                check_standalone(request.new, unit, reemitted, |c| c.visit_item_fn(&item))?;
                rewriter.visit_item_fn_mut(&mut item);
                rewriter.finish().map_err(|reason| failure(&name, reason))?;
                item.sig.ident = replacement_ident.clone();
                item.vis = syn::parse_quote!(pub);
                item.attrs.retain(keep_attribute);
                root.descend(&modules).items.push(item.into_token_stream());

                let pointer = quote! { crate #(:: #module_tokens)* :: #replacement_ident };
                Ok((pointer, replacement))
            }
        }
    }
}

/// Patch table key of a unit: `{crate}::{module}::{scope}::{name}`
pub fn symbol_key(crate_name: &str, module_path: &[String], unit: &CodeUnit) -> String {
    let mut key = crate_name.to_string();
    for segment in module_path {
        key.push_str("::");
        key.push_str(segment);
    }
    key.push_str("::");
    key.push_str(&unit.qualified_name());
    key
}

fn failure(unit: &str, reason: impl Into<String>) -> ReloadError {
    ReloadError::Synthesis {
        unit: unit.to_string(),
        reason: reason.into(),
    }
}

fn keep_attribute(attr: &Attribute) -> bool {
    !DROPPED_ATTRIBUTES.iter().any(|name| attr.path().is_ident(name))
}

fn parse_method(unit: &CodeUnit) -> ReloadResult<ImplItemFn> {
    let mut method: ImplItemFn = syn::parse_str(&unit.origin)
        .map_err(|e| failure(&unit.qualified_name(), format!("cannot re-parse: {}", e)))?;
    method.vis = Visibility::Inherited;
    method.attrs.retain(keep_attribute);
    Ok(method)
}

fn push_method(extension: &mut Extension, method: ImplItemFn) {
    let mut sig = method.sig.clone();
    sig.constness = None;
    extension.declarations.push(quote! { #sig; });
    extension.definitions.push(method.into_token_stream());
}

fn check_standalone<F>(file: &ParsedFile, unit: &CodeUnit, reemitted: &BTreeSet<String>, visit: F) -> ReloadResult<()>
where
    F: FnOnce(&mut StandaloneCheck<'_>),
{
    let mut checker = StandaloneCheck::new(file, unit, reemitted);
    visit(&mut checker);
    checker
        .finish()
        .map_err(|reason| failure(&unit.qualified_name(), reason))
}

fn rewriter_for(request: &PatchRequest<'_>, unit: &CodeUnit) -> PathRewriter {
    let modules = unit.scope.modules();
    let mut context = request.module_path.to_vec();
    context.extend(modules.iter().map(|m| m.to_string()));
    PathRewriter::new(request.crate_name, context, local_modules(request.new, &modules))
}

/// Modules declared directly inside the module scope `modules` of a file
fn local_modules(file: &ParsedFile, modules: &[&str]) -> BTreeSet<String> {
    if modules.is_empty() {
        return file.modules.clone();
    }
    let prefix = format!("{}::", modules.join("::"));
    file.inline_modules
        .iter()
        .filter_map(|m| m.strip_prefix(&prefix))
        .filter(|rest| !rest.contains("::"))
        .map(ToString::to_string)
        .collect()
}

/// `::{crate}::{module..}`
fn host_path(crate_name: &str, module_path: &[String]) -> Result<TokenStream, String> {
    let mut segments = Vec::with_capacity(module_path.len() + 1);
    for name in std::iter::once(crate_name).chain(module_path.iter().map(String::as_str)) {
        let ident: syn::Ident =
            syn::parse_str(name).map_err(|_| format!("`{}` is not a valid path segment", name))?;
        segments.push(ident);
    }
    Ok(quote! { #(:: #segments)* })
}

fn extension_for<'b>(
    request: &PatchRequest<'_>,
    root: &'b mut ModuleBlock,
    modules: &[&str],
    owner: &str,
) -> ReloadResult<&'b mut Extension> {
    let mut path: Vec<String> = request.module_path.to_vec();
    path.extend(modules.iter().map(|m| m.to_string()));
    path.push(owner.to_string());
    let self_ty = host_path(request.crate_name, &path).map_err(|reason| failure(owner, reason))?;

    Ok(root
        .descend(modules)
        .extensions
        .entry(owner.to_string())
        .or_insert_with(|| Extension {
            self_ty,
            declarations: Vec::new(),
            definitions: Vec::new(),
        }))
}

fn render_block(
    block: &ModuleBlock,
    scope: &[String],
    request: &PatchRequest<'_>,
    lines: &mut Vec<String>,
) -> ReloadResult<()> {
    for item in &block.items {
        lines.push(item.to_string());
    }

    for (owner, extension) in &block.extensions {
        let trait_ident = format_ident!("{}Patch{}", owner, request.generation.value());
        let self_ty = &extension.self_ty;
        let declarations = &extension.declarations;
        let definitions = &extension.definitions;
        lines.push(quote! { pub trait #trait_ident { #(#declarations)* } }.to_string());
        lines.push(quote! { impl #trait_ident for #self_ty { #(#definitions)* } }.to_string());
    }

    for (name, child) in &block.children {
        let mut child_scope = scope.to_vec();
        child_scope.push(name.clone());

        let module_ident = format_ident!("{}", name);
        lines.push(format!("pub mod {} {{", module_ident));
        lines.push("use super::*;".to_string());
        if request.old.inline_modules.contains(&child_scope.join("::")) {
            let mut host_module = request.module_path.to_vec();
            host_module.extend(child_scope.iter().cloned());
            let host = host_path(request.crate_name, &host_module).map_err(|reason| failure(name, reason))?;
            lines.push(quote!(use #host::*;).to_string());
        }
        render_block(child, &child_scope, request, lines)?;
        lines.push("}".to_string());
    }
    Ok(())
}
