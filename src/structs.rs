//! Struct member normalization.
//!
//! Members are regrouped as embedded, then exported, then unexported, each
//! group alphabetized, with a blank line at every group boundary. The same
//! module computes the per-type member orders the literal normalizer feeds
//! on: the canonical (post-normalization) order and the source order.

use std::collections::HashMap;

use crate::ast::*;

/// Reorders the members of every struct type in the file.
pub fn reorder_struct_fields(file: &mut File) {
    struct FieldSorter;

    impl MutVisitor for FieldSorter {
        fn visit_type(&mut self, ty: &mut TypeExpr) {
            if let TypeExpr::Struct(st) = ty {
                reorder_fields(st);
            }
        }
    }

    walk_file(file, &mut FieldSorter);
}

pub fn reorder_fields(st: &mut StructType) {
    if st.fields.is_empty() {
        return;
    }

    let mut embedded = Vec::new();
    let mut public = Vec::new();
    let mut private = Vec::new();

    for field in st.fields.drain(..) {
        if field.names.is_empty() {
            embedded.push(field);
        } else if is_exported(&field.names[0]) {
            public.push(field);
        } else {
            private.push(field);
        }
    }

    embedded.sort_by(|a, b| field_type_name(a).cmp(field_type_name(b)));
    public.sort_by(|a, b| a.names[0].cmp(&b.names[0]));
    private.sort_by(|a, b| a.names[0].cmp(&b.names[0]));

    st.fields = assemble_field_list(embedded, public, private);
}

/// Same field objects, regrouped with blank-line boundaries between
/// non-empty groups.
fn assemble_field_list(
    embedded: Vec<Field>,
    public: Vec<Field>,
    private: Vec<Field>,
) -> Vec<Field> {
    let mut result = Vec::with_capacity(embedded.len() + public.len() + private.len());

    for mut field in embedded {
        field.decor.before = Spacing::Newline;
        result.push(field);
    }

    let mut boundary = !result.is_empty();
    for (i, mut field) in public.into_iter().enumerate() {
        field.decor.before = if i == 0 && boundary {
            Spacing::Blank
        } else {
            Spacing::Newline
        };
        result.push(field);
    }

    boundary = !result.is_empty();
    for (i, mut field) in private.into_iter().enumerate() {
        field.decor.before = if i == 0 && boundary {
            Spacing::Blank
        } else {
            Spacing::Newline
        };
        result.push(field);
    }

    result
}

fn field_type_name(field: &Field) -> &str {
    extract_type_name(&field.ty).unwrap_or("")
}

/// Canonical (normalized) member order for every named struct type:
/// embedded, exported, unexported, each alphabetized.
pub fn collect_struct_definitions(file: &File) -> HashMap<String, Vec<String>> {
    let mut defs = HashMap::new();
    scan_type_specs(file, &mut |ts| {
        if let TypeExpr::Struct(st) = &ts.ty {
            defs.insert(ts.name.clone(), compute_member_order(st));
        }
    });
    defs
}

/// Member order exactly as written in the source. Positional literals are
/// bound to this order, not the normalized one.
pub fn collect_source_field_orders(file: &File) -> HashMap<String, Vec<String>> {
    let mut defs = HashMap::new();
    scan_type_specs(file, &mut |ts| {
        if let TypeExpr::Struct(st) = &ts.ty {
            defs.insert(ts.name.clone(), field_names_of(st));
        }
    });
    defs
}

fn compute_member_order(st: &StructType) -> Vec<String> {
    let mut embedded = Vec::new();
    let mut public = Vec::new();
    let mut private = Vec::new();

    for field in &st.fields {
        if field.names.is_empty() {
            embedded.push(field_type_name(field).to_string());
        } else {
            for name in &field.names {
                if is_exported(name) {
                    public.push(name.clone());
                } else {
                    private.push(name.clone());
                }
            }
        }
    }

    embedded.sort();
    public.sort();
    private.sort();

    let mut order = embedded;
    order.extend(public);
    order.extend(private);
    order
}

/// Member names in declaration order, embedded members contributing their
/// type name.
pub fn field_names_of(st: &StructType) -> Vec<String> {
    let mut names = Vec::new();
    for field in &st.fields {
        if field.names.is_empty() {
            names.push(field_type_name(field).to_string());
        } else {
            names.extend(field.names.iter().cloned());
        }
    }
    names
}

/// Visits every named type spec: the top-level ones plus function-local
/// declarations.
fn scan_type_specs(file: &File, f: &mut impl FnMut(&TypeSpec)) {
    for decl in &file.decls {
        match decl {
            Decl::Gen(d) => scan_gen_decl(d, f),
            Decl::Func(func) => {
                if let Some(body) = &func.body {
                    scan_block(body, f);
                }
            }
        }
    }
}

fn scan_gen_decl(decl: &GenDecl, f: &mut impl FnMut(&TypeSpec)) {
    if decl.kind != DeclKind::Type {
        return;
    }
    for spec in &decl.specs {
        if let Spec::Type(ts) = spec {
            f(ts);
        }
    }
}

fn scan_block(block: &Block, f: &mut impl FnMut(&TypeSpec)) {
    for stmt in &block.stmts {
        scan_stmt(stmt, f);
    }
}

fn scan_stmt(stmt: &Stmt, f: &mut impl FnMut(&TypeSpec)) {
    match stmt {
        Stmt::Decl { decl, .. } => scan_gen_decl(decl, f),
        Stmt::Labeled { stmt, .. } => scan_stmt(stmt, f),
        Stmt::If(s) => {
            scan_block(&s.then, f);
            if let Some(else_branch) = &s.else_branch {
                scan_stmt(else_branch, f);
            }
        }
        Stmt::For(s) => scan_block(&s.body, f),
        Stmt::Switch(s) => {
            for case in &s.cases {
                for stmt in &case.body {
                    scan_stmt(stmt, f);
                }
            }
        }
        Stmt::Select(s) => {
            for case in &s.cases {
                for stmt in &case.body {
                    scan_stmt(stmt, f);
                }
            }
        }
        Stmt::Block { block, .. } => scan_block(block, f),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;

    fn first_struct(file: &File) -> &StructType {
        for decl in &file.decls {
            if let Decl::Gen(d) = decl {
                for spec in &d.specs {
                    if let Spec::Type(ts) = spec {
                        if let TypeExpr::Struct(st) = &ts.ty {
                            return st;
                        }
                    }
                }
            }
        }
        panic!("no struct in file");
    }

    fn parse(source: &str) -> File {
        GoParser::new().parse(source, "test.go").unwrap()
    }

    #[test]
    fn test_fields_regroup_embedded_public_private() {
        let mut file = parse(
            "package main\n\ntype Server struct {\n\tport int\n\tHost string\n\t*Client\n\ttimeout int\n\tEmbedded\n\tMaxConns int\n}\n",
        );
        reorder_struct_fields(&mut file);
        let st = first_struct(&file);
        let names = field_names_of(st);
        assert_eq!(
            names,
            vec!["Client", "Embedded", "Host", "MaxConns", "port", "timeout"]
        );
    }

    #[test]
    fn test_group_boundaries_get_blank_lines() {
        let mut file = parse(
            "package main\n\ntype Mixed struct {\n\tage int\n\tName string\n\tEmbedded\n}\n",
        );
        reorder_struct_fields(&mut file);
        let st = first_struct(&file);
        let befores: Vec<Spacing> = st.fields.iter().map(|f| f.decor.before).collect();
        assert_eq!(
            befores,
            vec![Spacing::Newline, Spacing::Blank, Spacing::Blank]
        );
    }

    #[test]
    fn test_reorder_is_idempotent() {
        let mut file = parse(
            "package main\n\ntype Config struct {\n\tdebug bool\n\tVerbose bool\n\tname string\n\tTimeout int\n}\n",
        );
        reorder_struct_fields(&mut file);
        let once = first_struct(&file).clone();
        reorder_struct_fields(&mut file);
        assert_eq!(*first_struct(&file), once);
    }

    #[test]
    fn test_member_orders() {
        let file = parse(
            "package main\n\ntype T struct {\n\tb int\n\tA string\n\tEmbedded\n}\n",
        );
        let canonical = collect_struct_definitions(&file);
        assert_eq!(canonical["T"], vec!["Embedded", "A", "b"]);
        let source = collect_source_field_orders(&file);
        assert_eq!(source["T"], vec!["b", "A", "Embedded"]);
    }

    #[test]
    fn test_function_local_structs_are_seen() {
        let file = parse(
            "package main\n\nfunc f() {\n\ttype local struct {\n\t\tY int\n\t\tX int\n\t}\n\t_ = local{}\n}\n",
        );
        let defs = collect_struct_definitions(&file);
        assert_eq!(defs["local"], vec!["X", "Y"]);
    }

    #[test]
    fn test_empty_struct_is_untouched() {
        let mut file = parse("package main\n\ntype Empty struct{}\n");
        reorder_struct_fields(&mut file);
        assert!(first_struct(&file).fields.is_empty());
    }
}
