//! Declaration classification and reassembly.
//!
//! One pass buckets every top-level declaration (imports, init funcs,
//! plain/iota constants, vars, types, constructors, methods, orphan
//! methods, functions, main), then the assembly policy emits the buckets
//! in a fixed order with explicit blank-line decorations:
//!
//! imports, init funcs, merged consts, iota const blocks, merged vars,
//! types (simple, single-method interfaces, other interfaces, structs —
//! each type followed by its constructors and methods), orphan methods,
//! functions, main.
//!
//! Methods and functions are ranked exported-first, then by call-graph
//! layer (callers above callees), then by name.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::ast::*;
use crate::callgraph::{assign_layers, build_call_graph};

/// Tree shapes the reorganization invariants cannot survive. Fatal for the
/// file being processed, harmless to any other file in a batch.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("type declaration group has no type specs")]
    EmptyTypeGroup,
    #[error("method {0:?} has no resolvable receiver type")]
    UnresolvableReceiver(String),
}

#[derive(Default)]
pub struct DeclCollector {
    imports: Vec<Decl>,
    init_funcs: Vec<FuncDecl>,
    const_specs: Vec<ValueSpec>,
    iota_const_decls: Vec<GenDecl>,
    blank_var_specs: Vec<ValueSpec>,
    var_specs: Vec<ValueSpec>,
    type_decls: Vec<GenDecl>,
    constructors: HashMap<String, Vec<FuncDecl>>,
    methods_by_type: HashMap<String, Vec<FuncDecl>>,
    orphan_methods: Vec<FuncDecl>,
    functions: Vec<FuncDecl>,
    main_func: Option<FuncDecl>,
    type_names: HashSet<String>,
}

impl DeclCollector {
    pub fn collect(decls: Vec<Decl>) -> Result<Self, StructureError> {
        let mut collector = DeclCollector {
            type_names: collect_type_names(&decls),
            ..DeclCollector::default()
        };
        for decl in decls {
            match decl {
                Decl::Gen(d) => collector.collect_gen_decl(d),
                Decl::Func(d) => collector.collect_func_decl(d)?,
            }
        }
        Ok(collector)
    }

    fn collect_gen_decl(&mut self, decl: GenDecl) {
        match decl.kind {
            DeclKind::Import => self.imports.push(Decl::Gen(decl)),
            DeclKind::Const => {
                if has_iota(&decl) {
                    self.iota_const_decls.push(decl);
                } else {
                    for spec in decl.specs {
                        if let Spec::Value(vs) = spec {
                            self.const_specs.push(vs);
                        }
                    }
                }
            }
            DeclKind::Var => {
                for spec in decl.specs {
                    if let Spec::Value(vs) = spec {
                        if vs.names.iter().any(|n| n == "_") {
                            self.blank_var_specs.push(vs);
                        } else {
                            self.var_specs.push(vs);
                        }
                    }
                }
            }
            DeclKind::Type => self.type_decls.push(decl),
        }
    }

    fn collect_func_decl(&mut self, decl: FuncDecl) -> Result<(), StructureError> {
        if let Some(recv) = &decl.recv {
            let recv_type = extract_type_name(&recv.ty)
                .ok_or_else(|| StructureError::UnresolvableReceiver(decl.name.clone()))?
                .to_string();
            if self.type_names.contains(&recv_type) {
                self.methods_by_type.entry(recv_type).or_default().push(decl);
            } else {
                self.orphan_methods.push(decl);
            }
            return Ok(());
        }

        match decl.name.as_str() {
            "init" => self.init_funcs.push(decl),
            "main" => self.main_func = Some(decl),
            _ => {
                if let Some(type_name) = find_constructor_type(&decl, &self.type_names) {
                    self.constructors.entry(type_name).or_default().push(decl);
                } else {
                    self.functions.push(decl);
                }
            }
        }
        Ok(())
    }

    fn sort(&mut self) {
        sort_value_specs(&mut self.const_specs);
        sort_value_specs(&mut self.var_specs);

        for ctors in self.constructors.values_mut() {
            ctors.sort_by(|a, b| a.name.cmp(&b.name));
        }
        for methods in self.methods_by_type.values_mut() {
            sort_funcs_by_exportability_then_layer(methods);
        }
        sort_funcs_by_exportability_then_layer(&mut self.orphan_methods);
        sort_funcs_by_exportability_then_layer(&mut self.functions);
    }
}

/// Rebuilds the declaration list of one file under the fixed ordering
/// policy. The result is a permutation of the input declarations (specs
/// may migrate between merged groups, none are created or dropped).
pub fn reorder_declarations(decls: Vec<Decl>) -> Result<Vec<Decl>, StructureError> {
    let mut collector = DeclCollector::collect(decls)?;
    collector.sort();

    let DeclCollector {
        imports,
        init_funcs,
        const_specs,
        iota_const_decls,
        blank_var_specs,
        var_specs,
        type_decls,
        mut constructors,
        mut methods_by_type,
        orphan_methods,
        functions,
        main_func,
        ..
    } = collector;

    let mut result: Vec<Decl> = Vec::new();
    result.extend(imports);
    append_init_funcs(&mut result, init_funcs);
    append_const_block(&mut result, const_specs);
    append_iota_const_blocks(&mut result, iota_const_decls);
    append_var_block(&mut result, blank_var_specs, var_specs);
    append_types_with_members(
        &mut result,
        type_decls,
        &mut constructors,
        &mut methods_by_type,
    )?;
    append_orphan_methods(&mut result, orphan_methods);
    append_functions(&mut result, functions);
    append_main_func(&mut result, main_func);
    Ok(result)
}

fn append_init_funcs(result: &mut Vec<Decl>, init_funcs: Vec<FuncDecl>) {
    for mut func in init_funcs {
        func.decor.before = Spacing::Blank;
        result.push(Decl::Func(func));
    }
}

fn append_const_block(result: &mut Vec<Decl>, specs: Vec<ValueSpec>) {
    if specs.is_empty() {
        return;
    }
    let mut decl = merge_specs_into_block(DeclKind::Const, specs);
    if !result.is_empty() {
        decl.decor.before = Spacing::Blank;
    }
    result.push(Decl::Gen(decl));
}

fn append_iota_const_blocks(result: &mut Vec<Decl>, decls: Vec<GenDecl>) {
    for mut decl in decls {
        if !result.is_empty() {
            decl.decor.before = Spacing::Blank;
        }
        result.push(Decl::Gen(decl));
    }
}

fn append_var_block(result: &mut Vec<Decl>, blank_specs: Vec<ValueSpec>, specs: Vec<ValueSpec>) {
    let mut all = blank_specs;
    all.extend(specs);
    if all.is_empty() {
        return;
    }
    let mut decl = merge_specs_into_block(DeclKind::Var, all);
    if !result.is_empty() {
        decl.decor.before = Spacing::Blank;
    }
    result.push(Decl::Gen(decl));
}

fn append_types_with_members(
    result: &mut Vec<Decl>,
    type_decls: Vec<GenDecl>,
    constructors: &mut HashMap<String, Vec<FuncDecl>>,
    methods_by_type: &mut HashMap<String, Vec<FuncDecl>>,
) -> Result<(), StructureError> {
    let split = split_and_group_type_decls(type_decls)?;

    for (i, mut type_decl) in split.into_iter().enumerate() {
        if i == 0 && !result.is_empty() {
            type_decl.decor.before = Spacing::Blank;
        }
        let type_name = type_decl.specs.first().and_then(|s| match s {
            Spec::Type(ts) => Some(ts.name.clone()),
            _ => None,
        });
        result.push(Decl::Gen(type_decl));

        let Some(type_name) = type_name else { continue };
        for mut ctor in constructors.remove(&type_name).unwrap_or_default() {
            ctor.decor.before = Spacing::Blank;
            result.push(Decl::Func(ctor));
        }
        for mut method in methods_by_type.remove(&type_name).unwrap_or_default() {
            method.decor.before = Spacing::Blank;
            result.push(Decl::Func(method));
        }
    }
    Ok(())
}

fn append_orphan_methods(result: &mut Vec<Decl>, methods: Vec<FuncDecl>) {
    for mut method in methods {
        if !result.is_empty() {
            method.decor.before = Spacing::Blank;
        }
        result.push(Decl::Func(method));
    }
}

fn append_functions(result: &mut Vec<Decl>, functions: Vec<FuncDecl>) {
    for mut func in functions {
        if !result.is_empty() {
            func.decor.before = Spacing::Blank;
        }
        result.push(Decl::Func(func));
    }
}

fn append_main_func(result: &mut Vec<Decl>, main_func: Option<FuncDecl>) {
    if let Some(mut func) = main_func {
        func.decor.before = Spacing::Blank;
        result.push(Decl::Func(func));
    }
}

/// Merges loose specs into a single declaration: parenthesized with
/// blank-line-separated visibility groups when more than one spec exists,
/// a plain one-line declaration otherwise.
fn merge_specs_into_block(kind: DeclKind, specs: Vec<ValueSpec>) -> GenDecl {
    let grouped = specs.len() > 1;
    let mut specs: Vec<Spec> = specs.into_iter().map(Spec::Value).collect();
    if grouped {
        add_blank_lines_between_spec_groups(&mut specs);
    }
    GenDecl {
        decor: Decor::default(),
        kind,
        grouped,
        specs,
    }
}

fn add_blank_lines_between_spec_groups(specs: &mut [Spec]) {
    let mut last_group = 0;
    for (i, spec) in specs.iter_mut().enumerate() {
        let group = export_group(spec.first_name().unwrap_or(""));
        let before = if i > 0 && group != last_group {
            Spacing::Blank
        } else {
            Spacing::Newline
        };
        spec.decor_mut().before = before;
        last_group = group;
    }
}

/// Splits multi-spec type declarations into one declaration per type (the
/// group comment stays with the first), then orders them: simple types,
/// single-method interfaces, remaining interfaces, record types.
fn split_and_group_type_decls(type_decls: Vec<GenDecl>) -> Result<Vec<GenDecl>, StructureError> {
    let mut simple = Vec::new();
    let mut func_interfaces = Vec::new();
    let mut other_interfaces = Vec::new();
    let mut records = Vec::new();

    let mut categorize = |decl: GenDecl| {
        let bucket = match decl.specs.first() {
            Some(Spec::Type(ts)) => match &ts.ty {
                TypeExpr::Struct(_) => &mut records,
                TypeExpr::Interface(iface) => {
                    if is_func_interface(iface) {
                        &mut func_interfaces
                    } else {
                        &mut other_interfaces
                    }
                }
                _ => &mut simple,
            },
            _ => &mut simple,
        };
        bucket.push(decl);
    };

    for decl in type_decls {
        if decl.specs.is_empty() {
            return Err(StructureError::EmptyTypeGroup);
        }
        if decl.specs.len() == 1 {
            categorize(decl);
            continue;
        }
        let group_decor = decl.decor;
        for (i, mut spec) in decl.specs.into_iter().enumerate() {
            let decor = if i == 0 {
                // The group's comment stays with the first split slot; the
                // spec's own decorations would otherwise be dropped by the
                // ungrouped form.
                let mut decor = group_decor.clone();
                decor
                    .comments
                    .extend(std::mem::take(&mut spec.decor_mut().comments));
                if decor.suffix.is_none() {
                    decor.suffix = spec.decor_mut().suffix.take();
                }
                decor
            } else {
                std::mem::take(spec.decor_mut())
            };
            *spec.decor_mut() = Decor::default();
            categorize(GenDecl {
                decor,
                kind: DeclKind::Type,
                grouped: false,
                specs: vec![spec],
            });
        }
    }

    let mut result = Vec::new();
    for group in [simple, func_interfaces, other_interfaces, records] {
        for mut decl in group {
            if !result.is_empty() {
                decl.decor.before = Spacing::Blank;
            }
            result.push(decl);
        }
    }
    Ok(result)
}

fn is_func_interface(iface: &InterfaceType) -> bool {
    matches!(iface.members.as_slice(), [InterfaceMember::Method(_)])
}

fn collect_type_names(decls: &[Decl]) -> HashSet<String> {
    let mut names = HashSet::new();
    for decl in decls {
        if let Decl::Gen(d) = decl {
            if d.kind == DeclKind::Type {
                for spec in &d.specs {
                    if let Spec::Type(ts) = spec {
                        names.insert(ts.name.clone());
                    }
                }
            }
        }
    }
    names
}

/// A function constructs `T` when it is named like `NewT` (or `newT` for an
/// unexported type), returns `T` by value or reference, and the name after
/// `NewT` does not continue into a longer word (`NewServerless` never
/// constructs `Server`; `NewServerTLS` does).
fn find_constructor_type(func: &FuncDecl, type_names: &HashSet<String>) -> Option<String> {
    if !(func.name.starts_with("New") || func.name.starts_with("new")) {
        return None;
    }
    for result in &func.sig.results {
        let Some(type_name) = extract_type_name(&result.ty) else {
            continue;
        };
        if !type_names.contains(type_name) {
            continue;
        }
        if matches_constructor_pattern(&func.name, type_name) {
            return Some(type_name.to_string());
        }
    }
    None
}

fn matches_constructor_pattern(func_name: &str, type_name: &str) -> bool {
    for prefix in ["New", "new"] {
        let Some(rest) = func_name.strip_prefix(prefix) else {
            continue;
        };
        let target = capitalize(type_name);
        if rest == target {
            return true;
        }
        if let Some(tail) = rest.strip_prefix(&target) {
            if tail.chars().next().is_some_and(|c| !c.is_lowercase()) {
                return true;
            }
        }
    }
    false
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn has_iota(decl: &GenDecl) -> bool {
    decl.specs.iter().any(|spec| match spec {
        Spec::Value(vs) => vs.values.iter().any(contains_iota),
        _ => false,
    })
}

fn contains_iota(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(name) => name == "iota",
        Expr::Binary(lhs, _, rhs) => contains_iota(lhs) || contains_iota(rhs),
        Expr::Unary(_, x) | Expr::Paren(x) => contains_iota(x),
        Expr::Call { args, .. } => args.iter().any(contains_iota),
        _ => false,
    }
}

/// Discard bindings, then exported names, then unexported names.
fn export_group(name: &str) -> u8 {
    if name == "_" {
        0
    } else if is_exported(name) {
        1
    } else {
        2
    }
}

fn sort_value_specs(specs: &mut [ValueSpec]) {
    specs.sort_by(|a, b| {
        let name_a = a.names.first().map(String::as_str).unwrap_or("");
        let name_b = b.names.first().map(String::as_str).unwrap_or("");
        export_group(name_a)
            .cmp(&export_group(name_b))
            .then_with(|| name_a.cmp(name_b))
    });
}

/// Exported functions first, each visibility partition layered over its own
/// call graph: callers come before the leaves they call, names break ties.
pub fn sort_funcs_by_exportability_then_layer(funcs: &mut Vec<FuncDecl>) {
    let (mut exported, mut unexported): (Vec<_>, Vec<_>) =
        funcs.drain(..).partition(|f| is_exported(&f.name));
    sort_funcs_by_layer(&mut exported);
    sort_funcs_by_layer(&mut unexported);
    funcs.extend(exported);
    funcs.extend(unexported);
}

fn sort_funcs_by_layer(funcs: &mut [FuncDecl]) {
    if funcs.len() <= 1 {
        return;
    }
    let names: HashSet<String> = funcs.iter().map(|f| f.name.clone()).collect();
    let graph = build_call_graph(funcs, &names);
    let layers = assign_layers(&graph, &names);

    funcs.sort_by(|a, b| {
        let layer_a = layers.get(&a.name).copied().unwrap_or(0);
        let layer_b = layers.get(&b.name).copied().unwrap_or(0);
        layer_b.cmp(&layer_a).then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;

    fn reorder(source: &str) -> Vec<Decl> {
        let file = GoParser::new().parse(source, "test.go").unwrap();
        reorder_declarations(file.decls).unwrap()
    }

    /// Compact, order-sensitive shape of a declaration list.
    fn summarize(decls: &[Decl]) -> Vec<String> {
        decls
            .iter()
            .map(|decl| match decl {
                Decl::Gen(d) => {
                    let names: Vec<&str> = d
                        .specs
                        .iter()
                        .filter_map(|s| s.first_name())
                        .collect();
                    format!("{} {}", d.kind.keyword(), names.join(","))
                }
                Decl::Func(f) => match &f.recv {
                    Some(recv) => format!(
                        "({}) {}",
                        extract_type_name(&recv.ty).unwrap_or("?"),
                        f.name
                    ),
                    None => format!("func {}", f.name),
                },
            })
            .collect()
    }

    #[test]
    fn test_constants_merge_and_sort() {
        let decls = reorder("package main\n\nconst z = \"z\"\n\nconst a = \"a\"\n");
        assert_eq!(summarize(&decls), vec!["const a,z"]);
    }

    #[test]
    fn test_single_const_stays_ungrouped() {
        let decls = reorder("package main\n\nconst answer = 42\n");
        match &decls[0] {
            Decl::Gen(d) => assert!(!d.grouped),
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_iota_groups_stay_separate() {
        let source = "package main\n\nconst (\n\tLow Priority = iota\n\tHigh\n)\n\nconst name = \"x\"\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["const name", "const Low,High"]);
    }

    #[test]
    fn test_init_first_main_last() {
        let source = "package main\n\nfunc main() {}\n\nfunc helper() {}\n\nfunc init() {}\n";
        let decls = reorder(source);
        assert_eq!(
            summarize(&decls),
            vec!["func init", "func helper", "func main"]
        );
    }

    #[test]
    fn test_constructor_follows_type() {
        let source =
            "package main\n\nfunc NewServer() *Server {\n\treturn nil\n}\n\ntype Server struct{}\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["type Server", "func NewServer"]);
    }

    #[test]
    fn test_unexported_constructor_matches() {
        let source = "package main\n\ntype pool struct{}\n\nfunc newPool() *pool {\n\treturn nil\n}\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["type pool", "func newPool"]);
    }

    #[test]
    fn test_word_continuation_is_not_a_constructor() {
        // NewServerless continues into a longer word, so it does not
        // construct Server; it stays in the plain-function bucket after
        // every type slot.
        let source = "package main\n\ntype Server struct{}\n\ntype Zoo struct{}\n\nfunc NewServerless() *Server {\n\treturn nil\n}\n";
        let decls = reorder(source);
        assert_eq!(
            summarize(&decls),
            vec!["type Server", "type Zoo", "func NewServerless"],
        );
    }

    #[test]
    fn test_compound_constructor_name_attaches() {
        let source = "package main\n\ntype Client struct{}\n\ntype Zoo struct{}\n\nfunc NewClientWithTimeout(t int) *Client {\n\treturn nil\n}\n";
        let decls = reorder(source);
        assert_eq!(
            summarize(&decls),
            vec!["type Client", "func NewClientWithTimeout", "type Zoo"],
        );
    }

    #[test]
    fn test_methods_attach_to_their_type() {
        let source = "package main\n\nfunc (s *Server) close() {}\n\ntype Server struct{}\n\nfunc (s *Server) Open() {}\n";
        let decls = reorder(source);
        assert_eq!(
            summarize(&decls),
            vec!["type Server", "(Server) Open", "(Server) close"]
        );
    }

    #[test]
    fn test_orphan_methods_after_types() {
        let source = "package main\n\nfunc (w *Widget) Draw() {}\n\ntype Server struct{}\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["type Server", "(Widget) Draw"]);
    }

    #[test]
    fn test_type_buckets_order() {
        let source = r#"package main

type S struct{}

type R interface {
	Read(p []byte) (n int, err error)
}

type RW interface {
	Read(p []byte) (n int, err error)
	Write(p []byte) (n int, err error)
}

type Alias int
"#;
        let decls = reorder(source);
        assert_eq!(
            summarize(&decls),
            vec!["type Alias", "type R", "type RW", "type S"]
        );
    }

    #[test]
    fn test_functions_layered_callers_first() {
        let source = "package main\n\nfunc leaf() {}\n\nfunc driver() {\n\tleaf()\n}\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["func driver", "func leaf"]);
    }

    #[test]
    fn test_exported_functions_before_unexported() {
        let source = "package main\n\nfunc zed() {}\n\nfunc Alpha() {\n\tzed()\n}\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["func Alpha", "func zed"]);
    }

    #[test]
    fn test_blank_var_specs_come_first_in_order() {
        let source = "package main\n\nvar b = 2\n\nvar _ = check()\n\nvar a = 1\n";
        let decls = reorder(source);
        assert_eq!(summarize(&decls), vec!["var _,a,b"]);
    }

    #[test]
    fn test_spec_groups_get_blank_boundaries() {
        let source = "package main\n\nconst b = 1\n\nconst A = 2\n\nconst C = 3\n";
        let decls = reorder(source);
        match &decls[0] {
            Decl::Gen(d) => {
                assert!(d.grouped);
                let befores: Vec<Spacing> = d
                    .specs
                    .iter()
                    .map(|s| match s {
                        Spec::Value(vs) => vs.decor.before,
                        _ => Spacing::None,
                    })
                    .collect();
                // A, C (exported), then blank line, then b.
                assert_eq!(
                    befores,
                    vec![Spacing::Newline, Spacing::Newline, Spacing::Blank]
                );
            }
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_empty_type_group_is_structural_error() {
        let file = GoParser::new()
            .parse("package main\n\ntype ()\n", "test.go")
            .unwrap();
        assert!(matches!(
            reorder_declarations(file.decls),
            Err(StructureError::EmptyTypeGroup)
        ));
    }

    #[test]
    fn test_permutation_invariant() {
        let source = r#"package main

import "fmt"

const z = 1

var x = 2

type T struct{}

func (t *T) M() {}

func NewT() T {
	return T{}
}

func helper() {
	fmt.Println(x)
}

func main() {
	helper()
}
"#;
        let file = GoParser::new().parse(source, "test.go").unwrap();
        let before = count_units(&file.decls);
        let after = count_units(&reorder_declarations(file.decls).unwrap());
        assert_eq!(before, after);
    }

    fn count_units(decls: &[Decl]) -> (usize, usize) {
        let mut specs = 0;
        let mut funcs = 0;
        for decl in decls {
            match decl {
                Decl::Gen(d) => specs += d.specs.len(),
                Decl::Func(_) => funcs += 1,
            }
        }
        (specs, funcs)
    }
}
