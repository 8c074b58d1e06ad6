//! Entry bundler for relative ES module imports.
//!
//! Every module gets an exports object up front and runs as a function over
//! it. Exports are getters over the module's own bindings, and every use of
//! an imported binding reads through the exporting module's object, so
//! imports stay live and import cycles link:
//!
//! ```text
//! (function () {
//! "use strict";
//! function __kiln_export(t, k, get) { ... }
//! var __kiln_e0 = {}, __kiln_e1 = {};
//! // util.js
//! (function (__kiln_e) {
//! __kiln_export(__kiln_e, "count", function () { return count; });
//! let count = 0;
//! function inc() { count++; }
//! })(__kiln_e1);
//! // main.js
//! (function (__kiln_e) {
//! (0, __kiln_e1["inc"])();
//! console.log(__kiln_e1["count"]);
//! })(__kiln_e0);
//! })();
//! ```
//!
//! Modules run in dependency order; inside a cycle, the module reached
//! first runs last, as in native module evaluation.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    CallExpression, Declaration, ExportDefaultDeclarationKind, Expression,
    ImportDeclarationSpecifier, ObjectProperty, Statement,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::semantic::{Semantic, SemanticBuilder};
use oxc::span::{GetSpan, SourceType, Span};
use oxc::syntax::symbol::SymbolId;
use parcel_sourcemap::{OriginalLocation, SourceMap};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::utils::path::{display_rel, normalize_path};

const EXPORTS: &str = "__kiln_e";
const DEFAULT_LOCAL: &str = "__kiln_default";
const EXPORT_HELPER: &str = "function __kiln_export(t, k, get) { Object.defineProperty(t, k, { enumerable: true, get: get }); }";
const STAR_HELPER: &str = "function __kiln_star(t, s) { Object.keys(s).forEach(function (k) { if (k !== \"default\" && !Object.prototype.hasOwnProperty.call(t, k)) __kiln_export(t, k, function () { return s[k]; }); }); }";

#[derive(Debug, Clone)]
enum Import {
    Default,
    Named(String),
    Namespace,
}

#[derive(Debug, Clone)]
enum Export {
    Local { exported: String, local: String },
    From { exported: String, imported: String, spec: String },
    Namespace { exported: String, spec: String },
    Star { spec: String },
}

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Where a reference to an imported binding sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Site {
    Plain,
    /// `f()`: read without binding `this` to the exports object
    Callee,
    /// `{ f }`: needs an explicit key
    Shorthand,
}

#[derive(Debug)]
struct Use {
    span: Span,
    local: String,
    site: Site,
}

#[derive(Debug)]
struct Binding {
    spec: String,
    import: Import,
}

#[derive(Debug)]
struct Module {
    path: PathBuf,
    source: String,
    edits: Vec<Edit>,
    /// Imported local name -> where it comes from
    bindings: FxHashMap<String, Binding>,
    /// Specifiers in source order, including side-effect imports
    imports: Vec<String>,
    uses: Vec<Use>,
    exports: Vec<Export>,
    /// Resolved dependency per specifier
    resolved: FxHashMap<String, usize>,
}

impl Module {
    fn specifiers(&self) -> Vec<String> {
        let mut specs = self.imports.clone();
        for export in &self.exports {
            match export {
                Export::From { spec, .. } | Export::Namespace { spec, .. } | Export::Star { spec } => {
                    specs.push(spec.clone());
                }
                Export::Local { .. } => {}
            }
        }
        let mut seen = FxHashSet::default();
        specs.retain(|s| seen.insert(s.clone()));
        specs
    }
}

/// Output of [`bundle_entry`]: the bundled text and a map from bundle
/// positions back to the module files.
pub struct Bundle {
    pub code: String,
    pub map: SourceMap,
}

pub fn bundle_entry(entry: &Path) -> Result<Bundle> {
    let mut graph = Graph::default();
    graph.load(entry)?;

    let base = normalize_path(entry.parent().unwrap_or(Path::new(".")));
    let mut out = Writer::new();
    out.generated("(function () {\n\"use strict\";\n");
    out.generated(EXPORT_HELPER);
    out.generated("\n");
    if graph.uses_star() {
        out.generated(STAR_HELPER);
        out.generated("\n");
    }
    let objects: Vec<String> = (0..graph.modules.len())
        .map(|i| format!("{} = {{}}", exports_var(i)))
        .collect();
    out.generated(&format!("var {};\n", objects.join(", ")));

    for &index in &graph.order {
        let module = &graph.modules[index];
        let name = display_rel(&normalize_path(&module.path), &base).replace('\\', "/");
        let source_index = out.map.add_source(&name);
        out.map
            .set_source_content(source_index as usize, &module.source)
            .map_err(|e| anyhow!("{name}: source map: {e:?}"))?;

        out.generated(&format!("// {name}\n(function ({EXPORTS}) {{\n"));
        out.generated(&graph.render_exports(index)?);
        let edits = graph.body_edits(index)?;
        out.copied_with_edits(source_index, &module.source, &edits);
        if !out.code.ends_with('\n') {
            out.generated("\n");
        }
        out.generated(&format!("}})({});\n", exports_var(index)));
    }
    out.generated("})();\n");

    Ok(Bundle {
        code: out.code,
        map: out.map,
    })
}

fn exports_var(index: usize) -> String {
    format!("{EXPORTS}{index}")
}

fn quoted(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
}

#[derive(Default)]
struct Graph {
    modules: Vec<Module>,
    by_path: FxHashMap<PathBuf, usize>,
    /// Post-order: dependencies before dependents
    order: Vec<usize>,
}

impl Graph {
    fn load(&mut self, path: &Path) -> Result<usize> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        // also true for modules still loading, which closes a cycle
        if let Some(&index) = self.by_path.get(&key) {
            return Ok(index);
        }

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let module = scan(path, &source)?;
        let specs = module.specifiers();

        let index = self.modules.len();
        self.modules.push(module);
        self.by_path.insert(key, index);

        for spec in specs {
            let target = resolve(path, &spec)?;
            let dep = self.load(&target)?;
            self.modules[index].resolved.insert(spec, dep);
        }

        self.order.push(index);
        Ok(index)
    }

    fn uses_star(&self) -> bool {
        self.modules
            .iter()
            .any(|m| m.exports.iter().any(|e| matches!(e, Export::Star { .. })))
    }

    fn dep_var(&self, module: &Module, spec: &str) -> Result<String> {
        module
            .resolved
            .get(spec)
            .map(|&i| exports_var(i))
            .ok_or_else(|| anyhow!("unresolved import `{spec}` in {}", module.path.display()))
    }

    /// Expression reading imported binding `local` of `module`.
    fn accessor(&self, module: &Module, local: &str) -> Result<Option<String>> {
        let Some(binding) = module.bindings.get(local) else {
            return Ok(None);
        };
        let var = self.dep_var(module, &binding.spec)?;
        Ok(Some(match &binding.import {
            Import::Default => format!("{var}[\"default\"]"),
            Import::Named(imported) => format!("{var}[{}]", quoted(imported)),
            Import::Namespace => var,
        }))
    }

    fn render_exports(&self, index: usize) -> Result<String> {
        let module = &self.modules[index];
        let mut out = String::new();
        for export in &module.exports {
            let (exported, value) = match export {
                Export::Star { spec } => {
                    let _ = writeln!(out, "__kiln_star({EXPORTS}, {});", self.dep_var(module, spec)?);
                    continue;
                }
                Export::Local { exported, local } => {
                    // re-exported imports read through their source module
                    let value = self.accessor(module, local)?.unwrap_or_else(|| local.clone());
                    (exported, value)
                }
                Export::From {
                    exported,
                    imported,
                    spec,
                } => (
                    exported,
                    format!("{}[{}]", self.dep_var(module, spec)?, quoted(imported)),
                ),
                Export::Namespace { exported, spec } => (exported, self.dep_var(module, spec)?),
            };
            let _ = writeln!(
                out,
                "__kiln_export({EXPORTS}, {}, function () {{ return {value}; }});",
                quoted(exported)
            );
        }
        Ok(out)
    }

    /// Syntax removals plus the rewrite of every imported-binding use.
    fn body_edits(&self, index: usize) -> Result<Vec<Edit>> {
        let module = &self.modules[index];
        let mut edits: Vec<Edit> = module
            .edits
            .iter()
            .map(|e| Edit {
                start: e.start,
                end: e.end,
                text: e.text.clone(),
            })
            .collect();

        for site in &module.uses {
            let Some(accessor) = self.accessor(module, &site.local)? else {
                continue;
            };
            let namespace = matches!(
                module.bindings.get(&site.local).map(|b| &b.import),
                Some(Import::Namespace)
            );
            let text = match site.site {
                Site::Callee if !namespace => format!("(0, {accessor})"),
                Site::Shorthand => format!("{}: {accessor}", site.local),
                Site::Plain | Site::Callee => accessor,
            };
            edits.push(Edit {
                start: site.span.start as usize,
                end: site.span.end as usize,
                text,
            });
        }
        edits.sort_by_key(|e| e.start);
        Ok(edits)
    }
}

/// Line and UTF-16 column, zero-based.
#[derive(Debug, Clone, Copy, Default)]
struct Position {
    line: u32,
    column: u32,
}

impl Position {
    fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += c.len_utf16() as u32;
        }
    }

    fn advance_str(&mut self, text: &str) {
        text.chars().for_each(|c| self.advance(c));
    }
}

/// Bundle text with a map of copied source back to its module.
struct Writer {
    code: String,
    at: Position,
    map: SourceMap,
}

impl Writer {
    fn new() -> Self {
        Self {
            code: String::new(),
            at: Position::default(),
            map: SourceMap::new("/"),
        }
    }

    /// Text with no counterpart in any module.
    fn generated(&mut self, text: &str) {
        self.at.advance_str(text);
        self.code.push_str(text);
    }

    /// Copy `source` with `edits` (sorted by start) applied. Every copied
    /// token is mapped to its place in the module.
    fn copied_with_edits(&mut self, source_index: u32, source: &str, edits: &[Edit]) {
        let mut original = Position::default();
        let mut last = 0;
        for edit in edits {
            if edit.start < last {
                continue;
            }
            self.copied(source_index, &source[last..edit.start], &mut original);
            if !edit.text.is_empty() {
                self.map_here(source_index, original);
            }
            self.generated(&edit.text);
            original.advance_str(&source[edit.start..edit.end]);
            last = edit.end;
        }
        self.copied(source_index, &source[last..], &mut original);
    }

    fn copied(&mut self, source_index: u32, text: &str, original: &mut Position) {
        let mut boundary = true;
        for c in text.chars() {
            let word = c.is_alphanumeric() || c == '_' || c == '$';
            if !c.is_whitespace() && (boundary || !word) {
                self.map_here(source_index, *original);
            }
            boundary = !word;
            self.at.advance(c);
            original.advance(c);
            self.code.push(c);
        }
    }

    fn map_here(&mut self, source_index: u32, original: Position) {
        self.map.add_mapping(
            self.at.line,
            self.at.column,
            Some(OriginalLocation::new(original.line, original.column, source_index, None)),
        );
    }
}

/// Resolve a relative specifier the way bundlers do for browser code.
fn resolve(from: &Path, spec: &str) -> Result<PathBuf> {
    if !(spec.starts_with("./") || spec.starts_with("../")) {
        bail!(
            "bare import `{spec}` in {}: only relative imports (./, ../) are bundled",
            from.display()
        );
    }
    let base = from.parent().unwrap_or(Path::new("."));
    let target = base.join(spec);

    let candidates = [
        target.clone(),
        target.with_extension("js"),
        target.with_extension("mjs"),
        target.join("index.js"),
    ];
    // `with_extension` would replace `.min` in `./lib.min`, so try appending too
    let appended = PathBuf::from(format!("{}.js", target.display()));

    candidates
        .into_iter()
        .chain(std::iter::once(appended))
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow!("cannot resolve `{spec}` from {}", from.display()))
}

fn span_range(span: Span) -> (usize, usize) {
    (span.start as usize, span.end as usize)
}

/// Spans of identifiers used as callees or as shorthand property values.
#[derive(Default)]
struct Sites {
    callees: FxHashSet<u32>,
    shorthand: FxHashSet<u32>,
}

impl<'a> Visit<'a> for Sites {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(id) = &call.callee {
            self.callees.insert(id.span.start);
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if prop.shorthand
            && let Expression::Identifier(id) = &prop.value
        {
            self.shorthand.insert(id.span.start);
        }
        walk::walk_object_property(self, prop);
    }
}

/// Every resolved reference to the binding declared at `symbol`.
fn references(semantic: &Semantic, symbol: SymbolId, sites: &Sites, local: &str) -> Vec<Use> {
    let scoping = semantic.scoping();
    scoping
        .get_resolved_reference_ids(symbol)
        .iter()
        .map(|&id| {
            let node = scoping.get_reference(id).node_id();
            let span = semantic.nodes().get_node(node).kind().span();
            let site = if sites.shorthand.contains(&span.start) {
                Site::Shorthand
            } else if sites.callees.contains(&span.start) {
                Site::Callee
            } else {
                Site::Plain
            };
            Use {
                span,
                local: local.to_string(),
                site,
            }
        })
        .collect()
}

/// Parse a module and record the rewrites for its import/export syntax.
fn scan(path: &Path, source: &str) -> Result<Module> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        bail!("{}: {}", path.display(), error);
    }
    let program = ret.program;
    let semantic = SemanticBuilder::new().build(&program).semantic;
    let mut sites = Sites::default();
    sites.visit_program(&program);

    let mut edits = Vec::new();
    let mut imports = Vec::new();
    let mut bindings = FxHashMap::default();
    let mut uses = Vec::new();
    let mut exports = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let spec = decl.source.value.to_string();
                for specifier in decl.specifiers.iter().flatten() {
                    let (local, import) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (&s.local, Import::Named(s.imported.name().to_string()))
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (&s.local, Import::Default),
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (&s.local, Import::Namespace)
                        }
                    };
                    let name = local.name.to_string();
                    uses.extend(references(&semantic, local.symbol_id(), &sites, &name));
                    bindings.insert(
                        name,
                        Binding {
                            spec: spec.clone(),
                            import,
                        },
                    );
                }
                imports.push(spec);
                let (start, end) = span_range(decl.span);
                edits.push(Edit {
                    start,
                    end,
                    text: String::new(),
                });
            }

            Statement::ExportNamedDeclaration(decl) => {
                let (start, end) = span_range(decl.span);
                if let Some(declaration) = &decl.declaration {
                    // drop the `export` keyword, keep the declaration
                    edits.push(Edit {
                        start,
                        end: declaration.span().start as usize,
                        text: String::new(),
                    });
                    for name in declared_names(declaration) {
                        exports.push(Export::Local {
                            exported: name.clone(),
                            local: name,
                        });
                    }
                    continue;
                }

                for specifier in &decl.specifiers {
                    let exported = specifier.exported.name().to_string();
                    let local = specifier.local.name().to_string();
                    exports.push(match &decl.source {
                        Some(source) => Export::From {
                            exported,
                            imported: local,
                            spec: source.value.to_string(),
                        },
                        None => Export::Local { exported, local },
                    });
                }
                edits.push(Edit {
                    start,
                    end,
                    text: String::new(),
                });
            }

            Statement::ExportDefaultDeclaration(decl) => {
                let (start, end) = span_range(decl.span);
                let inner = decl.declaration.span().start as usize;
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                        f.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => {
                        c.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                match named {
                    Some(local) => {
                        edits.push(Edit {
                            start,
                            end: inner,
                            text: String::new(),
                        });
                        exports.push(Export::Local {
                            exported: "default".into(),
                            local,
                        });
                    }
                    None => {
                        edits.push(Edit {
                            start,
                            end: inner,
                            text: format!("var {DEFAULT_LOCAL} = "),
                        });
                        edits.push(Edit {
                            start: end,
                            end,
                            text: ";".into(),
                        });
                        exports.push(Export::Local {
                            exported: "default".into(),
                            local: DEFAULT_LOCAL.into(),
                        });
                    }
                }
            }

            Statement::ExportAllDeclaration(decl) => {
                let spec = decl.source.value.to_string();
                exports.push(match &decl.exported {
                    Some(name) => Export::Namespace {
                        exported: name.name().to_string(),
                        spec,
                    },
                    None => Export::Star { spec },
                });
                let (start, end) = span_range(decl.span);
                edits.push(Edit {
                    start,
                    end,
                    text: String::new(),
                });
            }

            _ => {}
        }
    }
    Ok(Module {
        path: path.to_path_buf(),
        source: source.to_string(),
        edits,
        bindings,
        imports,
        uses,
        exports,
        resolved: FxHashMap::default(),
    })
}

fn declared_names(declaration: &Declaration) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(f) => {
            f.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(c) => c.id.iter().map(|id| id.name.to_string()).collect(),
        _ => Vec::new(),
    }
}
