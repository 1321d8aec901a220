//! Resolution of the paths a source file names.

use std::collections::BTreeSet;
use std::path::Path;

use syn::visit::{self, Visit};

/// Top-level modules of `admin/src` that the lint covers.
pub(crate) const LAYERS: [&str; 3] = ["domain", "inbound", "outbound"];

/// Library name of the linted crate, as used in absolute paths.
const CRATE_NAME: &str = "user_admin";

/// Module a source file defines, e.g. `inbound::views::list_view`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModulePath(Vec<String>);

impl ModulePath {
    /// `domain/ports/mod.rs` defines `domain::ports`. Files outside
    /// [`LAYERS`] have no module path.
    pub(crate) fn from_file(file: &Path) -> Option<Self> {
        let mut segments: Vec<String> = file
            .with_extension("")
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.last().is_some_and(|last| last == "mod") {
            segments.pop();
        }
        let layer = segments.first()?;
        LAYERS.contains(&layer.as_str()).then_some(Self(segments))
    }

    /// Whether the module sits at or below `scope`, written `inbound/views`.
    pub(crate) fn is_within(&self, scope: &str) -> bool {
        let expected: Vec<&str> = scope.split('/').collect();
        self.0.len() >= expected.len()
            && self
                .0
                .iter()
                .zip(&expected)
                .all(|(segment, expected)| segment.as_str() == *expected)
    }
}

/// Every path `syntax` names outside `#[cfg(test)]` items.
///
/// Paths into the linted crate come back rooted at `crate`, whichever of
/// `crate::`, `self::`, `super::` or `user_admin::` they were written with.
/// Other multi-segment paths are returned as written. Single-segment
/// expression paths are locals or prelude names and are skipped.
pub(crate) fn named_paths(syntax: &syn::File, module: &ModulePath) -> BTreeSet<Vec<String>> {
    let mut collector = Collector {
        module,
        found: BTreeSet::new(),
    };
    collector.visit_file(syntax);
    collector.found
}

struct Collector<'m> {
    module: &'m ModulePath,
    found: BTreeSet<Vec<String>>,
}

impl Collector<'_> {
    fn record(&mut self, segments: &[String]) {
        if let Some(resolved) = resolve(&self.module.0, segments) {
            self.found.insert(resolved);
        }
    }

    fn record_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(name) => self.record_leaf(prefix, &name.ident),
            syn::UseTree::Rename(rename) => self.record_leaf(prefix, &rename.ident),
            syn::UseTree::Glob(_) => self.record(prefix),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use(item, prefix);
                }
            }
        }
    }

    fn record_leaf(&mut self, prefix: &[String], leaf: &syn::Ident) {
        let mut segments = prefix.to_vec();
        // `use super::views::{self, ListView}` names `views` itself.
        if leaf != "self" {
            segments.push(leaf.to_string());
        }
        self.record(&segments);
    }
}

impl<'ast> Visit<'ast> for Collector<'_> {
    fn visit_item(&mut self, item: &'ast syn::Item) {
        if is_test_only(attributes(item)) {
            return;
        }
        visit::visit_item(self, item);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use(&node.tree, &mut Vec::new());
    }

    fn visit_path(&mut self, path: &'ast syn::Path) {
        if path.segments.len() > 1 {
            let segments: Vec<String> = path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect();
            self.record(&segments);
        }
        visit::visit_path(self, path);
    }
}

fn resolve(module: &[String], segments: &[String]) -> Option<Vec<String>> {
    let (first, after_first) = segments.split_first()?;
    let (mut base, mut rest) = match first.as_str() {
        "crate" | CRATE_NAME => (Vec::new(), after_first),
        "self" | "super" => (module.to_vec(), segments),
        _ => return Some(segments.to_vec()),
    };
    while let Some((head, tail)) = rest.split_first() {
        match head.as_str() {
            "self" => {}
            "super" => {
                base.pop()?;
            }
            _ => break,
        }
        rest = tail;
    }

    let mut resolved = Vec::with_capacity(1 + base.len() + rest.len());
    resolved.push("crate".to_owned());
    resolved.extend(base);
    resolved.extend_from_slice(rest);
    Some(resolved)
}

fn attributes(item: &syn::Item) -> &[syn::Attribute] {
    match item {
        syn::Item::Const(item) => &item.attrs,
        syn::Item::Enum(item) => &item.attrs,
        syn::Item::Fn(item) => &item.attrs,
        syn::Item::Impl(item) => &item.attrs,
        syn::Item::Mod(item) => &item.attrs,
        syn::Item::Static(item) => &item.attrs,
        syn::Item::Struct(item) => &item.attrs,
        syn::Item::Trait(item) => &item.attrs,
        syn::Item::Use(item) => &item.attrs,
        _ => &[],
    }
}

fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| match &attr.meta {
        syn::Meta::List(list) => list.path.is_ident("cfg") && list.tokens.to_string() == "test",
        _ => false,
    })
}
