//! Go source printer.
//!
//! Renders the mutated tree back to canonical text: tab indentation,
//! single-line signatures, one statement per line, blank lines driven by
//! the `Decor` values the engine sets. The output deliberately skips
//! column alignment — it is valid input for any downstream style tool that
//! wants to add it.

use anyhow::Result;

use crate::ast::*;

pub struct CodeGenerator;

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, file: &File) -> Result<String> {
        let mut printer = Printer {
            out: String::new(),
            indent: 0,
        };
        printer.file(file);
        Ok(printer.out)
    }
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn tabs(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn blank_line(&mut self) {
        self.out.push('\n');
    }

    /// Comment group above a node, each comment on its own line.
    fn decor_lines(&mut self, decor: &Decor) {
        for (i, comment) in decor.comments.iter().enumerate() {
            if i > 0 && comment.blank_before {
                self.blank_line();
            }
            self.tabs();
            self.write(&comment.text);
            self.write("\n");
        }
        if !decor.comments.is_empty() && decor.blank_after_comments {
            self.blank_line();
        }
    }

    fn suffix(&mut self, decor: &Decor) {
        if let Some(text) = &decor.suffix {
            self.write(" ");
            self.write(text);
        }
    }

    fn file(&mut self, file: &File) {
        self.decor_lines(&file.decor);
        self.write("package ");
        self.write(&file.package);
        self.write("\n");

        for (i, decl) in file.decls.iter().enumerate() {
            if i == 0 || decl.decor().before == Spacing::Blank {
                self.blank_line();
            }
            self.decl(decl);
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Gen(d) => self.gen_decl(d),
            Decl::Func(d) => self.func_decl(d),
        }
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        self.decor_lines(&decl.decor);
        self.tabs();
        self.gen_decl_core(decl);
        self.suffix(&decl.decor);
        self.write("\n");
    }

    fn gen_decl_core(&mut self, decl: &GenDecl) {
        self.write(decl.kind.keyword());
        if decl.grouped {
            self.write(" (\n");
            self.indent += 1;
            for (i, spec) in decl.specs.iter().enumerate() {
                if i > 0 && spec_decor(spec).before == Spacing::Blank {
                    self.blank_line();
                }
                self.decor_lines(spec_decor(spec));
                self.tabs();
                self.spec(spec);
                self.suffix(spec_decor(spec));
                self.write("\n");
            }
            self.indent -= 1;
            self.tabs();
            self.write(")");
        } else if let Some(spec) = decl.specs.first() {
            self.write(" ");
            self.spec(spec);
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(s) => {
                if let Some(alias) = &s.alias {
                    self.write(alias);
                    self.write(" ");
                }
                self.write("\"");
                self.write(&s.path);
                self.write("\"");
            }
            Spec::Value(s) => {
                self.write(&s.names.join(", "));
                if let Some(ty) = &s.ty {
                    self.write(" ");
                    self.type_expr(ty);
                }
                if !s.values.is_empty() {
                    self.write(" = ");
                    self.expr_list(&s.values);
                }
            }
            Spec::Type(s) => {
                self.write(&s.name);
                if s.alias {
                    self.write(" = ");
                } else {
                    self.write(" ");
                }
                self.type_expr(&s.ty);
            }
        }
    }

    fn func_decl(&mut self, decl: &FuncDecl) {
        self.decor_lines(&decl.decor);
        self.tabs();
        self.write("func ");
        if let Some(recv) = &decl.recv {
            self.write("(");
            if let Some(name) = &recv.name {
                self.write(name);
                self.write(" ");
            }
            self.type_expr(&recv.ty);
            self.write(") ");
        }
        self.write(&decl.name);
        self.signature(&decl.sig);
        if let Some(body) = &decl.body {
            self.write(" ");
            self.block(body);
        }
        self.suffix(&decl.decor);
        self.write("\n");
    }

    fn signature(&mut self, sig: &Signature) {
        self.write("(");
        for (i, param) in sig.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.param(param);
        }
        self.write(")");

        match sig.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() && !single.variadic => {
                self.write(" ");
                self.type_expr(&single.ty);
            }
            results => {
                self.write(" (");
                for (i, param) in results.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.param(param);
                }
                self.write(")");
            }
        }
    }

    fn param(&mut self, param: &Param) {
        if !param.names.is_empty() {
            self.write(&param.names.join(", "));
            self.write(" ");
        }
        if param.variadic {
            self.write("...");
        }
        self.type_expr(&param.ty);
    }

    fn block(&mut self, block: &Block) {
        if block.stmts.is_empty() && block.trailing.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{\n");
        self.indent += 1;
        for (i, stmt) in block.stmts.iter().enumerate() {
            if i > 0 && stmt.decor().before == Spacing::Blank {
                self.blank_line();
            }
            self.stmt(stmt);
        }
        for (i, comment) in block.trailing.iter().enumerate() {
            if comment.blank_before && (i > 0 || !block.stmts.is_empty()) {
                self.blank_line();
            }
            self.tabs();
            self.write(&comment.text);
            self.write("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.write("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        // Labels introduce their own line; the labeled statement follows as
        // a statement of its own.
        if let Stmt::Labeled {
            decor,
            label,
            stmt: inner,
        } = stmt
        {
            self.decor_lines(decor);
            self.tabs();
            self.write(label);
            self.write(":");
            self.suffix(decor);
            self.write("\n");
            self.stmt(inner);
            return;
        }

        self.decor_lines(stmt.decor());
        self.tabs();
        self.stmt_core(stmt);
        self.suffix(stmt.decor());
        self.write("\n");
    }

    /// The statement itself, written inline starting at the current output
    /// position. Also used for if/for/switch header clauses.
    fn stmt_core(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr, .. } => self.expr(expr),
            Stmt::Send { chan, value, .. } => {
                self.expr(chan);
                self.write(" <- ");
                self.expr(value);
            }
            Stmt::IncDec { expr, dec, .. } => {
                self.expr(expr);
                self.write(if *dec { "--" } else { "++" });
            }
            Stmt::Assign { lhs, op, rhs, .. } => {
                self.expr_list(lhs);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.expr_list(rhs);
            }
            Stmt::Decl { decl, .. } => self.gen_decl_core(decl),
            Stmt::Return { values, .. } => {
                self.write("return");
                if !values.is_empty() {
                    self.write(" ");
                    self.expr_list(values);
                }
            }
            Stmt::Branch { keyword, label, .. } => {
                self.write(keyword);
                if let Some(label) = label {
                    self.write(" ");
                    self.write(label);
                }
            }
            Stmt::Labeled { .. } => unreachable!("handled in stmt"),
            Stmt::Go { call, .. } => {
                self.write("go ");
                self.expr(call);
            }
            Stmt::Defer { call, .. } => {
                self.write("defer ");
                self.expr(call);
            }
            Stmt::If(s) => self.if_stmt(s),
            Stmt::For(s) => self.for_stmt(s),
            Stmt::Switch(s) => self.switch_stmt(s),
            Stmt::Select(s) => self.select_stmt(s),
            Stmt::Block { block, .. } => self.block(block),
        }
    }

    fn if_stmt(&mut self, s: &IfStmt) {
        self.write("if ");
        if let Some(init) = &s.init {
            self.stmt_core(init);
            self.write("; ");
        }
        self.expr(&s.cond);
        self.write(" ");
        self.block(&s.then);
        if let Some(else_branch) = &s.else_branch {
            self.write(" else ");
            match else_branch.as_ref() {
                Stmt::If(chained) => self.if_stmt(chained),
                Stmt::Block { block, .. } => self.block(block),
                other => self.stmt_core(other),
            }
        }
    }

    fn for_stmt(&mut self, s: &ForStmt) {
        self.write("for ");
        match &s.header {
            ForHeader::Forever => {}
            ForHeader::Cond(cond) => {
                self.expr(cond);
                self.write(" ");
            }
            ForHeader::Clause { init, cond, post } => {
                if let Some(init) = init {
                    self.stmt_core(init);
                }
                self.write("; ");
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.write("; ");
                if let Some(post) = post {
                    self.stmt_core(post);
                    self.write(" ");
                }
            }
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => {
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.write(", ");
                        self.expr(value);
                    }
                    self.write(if *define { " := " } else { " = " });
                }
                self.write("range ");
                self.expr(expr);
                self.write(" ");
            }
        }
        self.block(&s.body);
    }

    fn switch_stmt(&mut self, s: &SwitchStmt) {
        self.write("switch ");
        if let Some(init) = &s.init {
            self.stmt_core(init);
            self.write("; ");
        }
        if let Some(subject) = &s.subject {
            self.stmt_core(subject);
            self.write(" ");
        }
        self.write("{\n");
        for case in &s.cases {
            if case.decor.before == Spacing::Blank {
                self.blank_line();
            }
            self.decor_lines(&case.decor);
            self.tabs();
            if case.exprs.is_empty() {
                self.write("default:");
            } else {
                self.write("case ");
                self.expr_list(&case.exprs);
                self.write(":");
            }
            self.suffix(&case.decor);
            self.write("\n");
            self.clause_body(&case.body);
        }
        self.tabs();
        self.write("}");
    }

    fn select_stmt(&mut self, s: &SelectStmt) {
        self.write("select {\n");
        for case in &s.cases {
            if case.decor.before == Spacing::Blank {
                self.blank_line();
            }
            self.decor_lines(&case.decor);
            self.tabs();
            match &case.comm {
                Some(comm) => {
                    self.write("case ");
                    self.stmt_core(comm);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.suffix(&case.decor);
            self.write("\n");
            self.clause_body(&case.body);
        }
        self.tabs();
        self.write("}");
    }

    fn clause_body(&mut self, body: &[Stmt]) {
        self.indent += 1;
        for (i, stmt) in body.iter().enumerate() {
            if i > 0 && stmt.decor().before == Spacing::Blank {
                self.blank_line();
            }
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.write(name),
            Expr::Lit(text) => self.write(text),
            Expr::Selector(x, name) => {
                self.expr(x);
                self.write(".");
                self.write(name);
            }
            Expr::Index(x, index) => {
                self.expr(x);
                self.write("[");
                self.expr(index);
                self.write("]");
            }
            Expr::SliceExpr { x, low, high, max } => {
                self.expr(x);
                self.write("[");
                if let Some(low) = low {
                    self.expr(low);
                }
                self.write(":");
                if let Some(high) = high {
                    self.expr(high);
                }
                if let Some(max) = max {
                    self.write(":");
                    self.expr(max);
                }
                self.write("]");
            }
            Expr::Call { func, args, spread } => {
                self.expr(func);
                self.write("(");
                self.expr_list(args);
                if *spread {
                    self.write("...");
                }
                self.write(")");
            }
            Expr::Unary(op, x) => {
                self.write(op);
                self.expr(x);
            }
            Expr::Star(x) => {
                self.write("*");
                self.expr(x);
            }
            Expr::Paren(x) => {
                self.write("(");
                self.expr(x);
                self.write(")");
            }
            Expr::Binary(lhs, op, rhs) => {
                self.expr(lhs);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.expr(rhs);
            }
            Expr::Composite(lit) => self.composite(lit),
            Expr::FuncLit(sig, body) => {
                self.write("func");
                self.signature(sig);
                self.write(" ");
                self.block(body);
            }
            Expr::TypeAssert(x, ty) => {
                self.expr(x);
                self.write(".(");
                match ty {
                    Some(ty) => self.type_expr(ty),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Type(ty) => self.type_expr(ty),
        }
    }

    fn composite(&mut self, lit: &CompositeLit) {
        if let Some(ty) = &lit.ty {
            self.type_expr(ty);
        }
        if lit.elems.is_empty() {
            self.write("{}");
            return;
        }
        if lit.multiline {
            self.write("{\n");
            self.indent += 1;
            for elem in &lit.elems {
                self.decor_lines(&elem.decor);
                self.tabs();
                self.lit_elem(elem);
                self.write(",");
                self.suffix(&elem.decor);
                self.write("\n");
            }
            self.indent -= 1;
            self.tabs();
            self.write("}");
        } else {
            self.write("{");
            for (i, elem) in lit.elems.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.lit_elem(elem);
            }
            self.write("}");
        }
    }

    fn lit_elem(&mut self, elem: &LitElem) {
        if let Some(key) = &elem.key {
            self.expr(key);
            self.write(": ");
        }
        self.expr(&elem.value);
    }

    fn type_expr(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Name(name) => self.write(name),
            TypeExpr::Qualified(pkg, sel) => {
                self.write(pkg);
                self.write(".");
                self.write(sel);
            }
            TypeExpr::Pointer(inner) => {
                self.write("*");
                self.type_expr(inner);
            }
            TypeExpr::Slice(inner) => {
                self.write("[]");
                self.type_expr(inner);
            }
            TypeExpr::Array(len, inner) => {
                self.write("[");
                match len {
                    Some(len) => self.expr(len),
                    None => self.write("..."),
                }
                self.write("]");
                self.type_expr(inner);
            }
            TypeExpr::Map(key, value) => {
                self.write("map[");
                self.type_expr(key);
                self.write("]");
                self.type_expr(value);
            }
            TypeExpr::Chan(dir, inner) => {
                match dir {
                    ChanDir::Both => self.write("chan "),
                    ChanDir::Send => self.write("chan<- "),
                    ChanDir::Recv => self.write("<-chan "),
                }
                self.type_expr(inner);
            }
            TypeExpr::Func(sig) => {
                self.write("func");
                self.signature(sig);
            }
            TypeExpr::Struct(st) => self.struct_type(st),
            TypeExpr::Interface(iface) => self.interface_type(iface),
            TypeExpr::Paren(inner) => {
                self.write("(");
                self.type_expr(inner);
                self.write(")");
            }
        }
    }

    fn struct_type(&mut self, st: &StructType) {
        if st.fields.is_empty() {
            self.write("struct{}");
            return;
        }
        self.write("struct {\n");
        self.indent += 1;
        for (i, field) in st.fields.iter().enumerate() {
            if i > 0 && field.decor.before == Spacing::Blank {
                self.blank_line();
            }
            self.decor_lines(&field.decor);
            self.tabs();
            if !field.names.is_empty() {
                self.write(&field.names.join(", "));
                self.write(" ");
            }
            self.type_expr(&field.ty);
            if let Some(tag) = &field.tag {
                self.write(" ");
                self.write(tag);
            }
            self.suffix(&field.decor);
            self.write("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.write("}");
    }

    fn interface_type(&mut self, iface: &InterfaceType) {
        if iface.members.is_empty() {
            self.write("interface{}");
            return;
        }
        self.write("interface {\n");
        self.indent += 1;
        for member in &iface.members {
            match member {
                InterfaceMember::Method(m) => {
                    self.decor_lines(&m.decor);
                    self.tabs();
                    self.write(&m.name);
                    self.signature(&m.sig);
                    self.suffix(&m.decor);
                    self.write("\n");
                }
                InterfaceMember::Embedded(e) => {
                    self.decor_lines(&e.decor);
                    self.tabs();
                    self.type_expr(&e.ty);
                    self.suffix(&e.decor);
                    self.write("\n");
                }
            }
        }
        self.indent -= 1;
        self.tabs();
        self.write("}");
    }
}

fn spec_decor(spec: &Spec) -> &Decor {
    match spec {
        Spec::Import(s) => &s.decor,
        Spec::Value(s) => &s.decor,
        Spec::Type(s) => &s.decor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        let file = GoParser::new().parse(source, "test.go").unwrap();
        CodeGenerator::new().generate(&file).unwrap()
    }

    #[test]
    fn test_roundtrip_declarations() {
        let source = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nconst (\n\tA = 1\n\n\tb = 2\n)\n\nfunc main() {\n\tfmt.Println(\"hi\")\n\t_ = os.Args\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_method_with_blank_lines() {
        let source = "package main\n\nfunc (s *Server) Get(k string) (string, error) {\n\tv, ok := s.items[k]\n\tif !ok {\n\t\treturn \"\", errNotFound\n\t}\n\n\treturn v, nil\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_struct_and_literal() {
        let source = "package main\n\ntype Point struct {\n\tX int\n\tY int\n}\n\nvar origin = Point{X: 0, Y: 0}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_multiline_literal() {
        let source = "package main\n\nvar p = Point{\n\tX: 1,\n\tY: 2,\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_signature_collapses_to_one_line() {
        let source = "package main\n\nfunc join(\n\ta string,\n\tb string,\n) string {\n\treturn a + b\n}\n";
        let out = roundtrip(source);
        assert!(out.contains("func join(a string, b string) string {"));
    }

    #[test]
    fn test_one_line_body_expands() {
        let out = roundtrip("package main\n\nfunc f() { return }\n");
        assert_eq!(out, "package main\n\nfunc f() {\n\treturn\n}\n");
    }

    #[test]
    fn test_comments_survive() {
        let source = "package main\n\n// helper does a thing.\nfunc helper() {}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_switch_layout() {
        let source = "package main\n\nfunc f(x int) string {\n\tswitch x {\n\tcase 1:\n\t\treturn \"one\"\n\tdefault:\n\t\treturn \"many\"\n\t}\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_chan_and_map_types() {
        let source =
            "package main\n\nvar a chan int\n\nvar b <-chan string\n\nvar c map[string][]int\n";
        assert_eq!(roundtrip(source), source);
    }
}
