//! Annotated Go syntax tree.
//!
//! The tree is owned: every pass takes the `File` (or pieces of it) by value
//! or `&mut` and moves nodes around rather than copying them, so the
//! reorganized output is a permutation of the parsed nodes by construction.
//! Comments and blank-line intent live in `Decor` values attached to every
//! node that can start a line; reordering a node carries its comments along.

/// Vertical placement of a node relative to whatever precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// No line break of its own (e.g. an element of a single-line literal).
    #[default]
    None,
    /// Starts on a fresh line with no blank line above.
    Newline,
    /// Starts on a fresh line with one blank line above.
    Blank,
}

/// A single comment line (`// ...` or `/* ... */`) above a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    /// Blank line between this comment and the previous comment line.
    pub blank_before: bool,
}

/// Decorations carried by a node: the blank-line state above its comment
/// group, the comment group itself, and an optional same-line suffix comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decor {
    pub before: Spacing,
    pub comments: Vec<Comment>,
    /// Blank line between the last comment and the node's own first line.
    pub blank_after_comments: bool,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub decor: Decor,
    pub package: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn decor(&self) -> &Decor {
        match self {
            Decl::Gen(d) => &d.decor,
            Decl::Func(d) => &d.decor,
        }
    }

    pub fn decor_mut(&mut self) -> &mut Decor {
        match self {
            Decl::Gen(d) => &mut d.decor,
            Decl::Func(d) => &mut d.decor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Import => "import",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
            DeclKind::Type => "type",
        }
    }
}

/// `import`/`const`/`var`/`type` declaration, possibly a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub decor: Decor,
    pub kind: DeclKind,
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub fn decor_mut(&mut self) -> &mut Decor {
        match self {
            Spec::Import(s) => &mut s.decor,
            Spec::Value(s) => &mut s.decor,
            Spec::Type(s) => &mut s.decor,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        match self {
            Spec::Import(_) => None,
            Spec::Value(s) => s.names.first().map(String::as_str),
            Spec::Type(s) => Some(&s.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub decor: Decor,
    pub alias: Option<String>,
    /// Import path without the surrounding quotes.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub decor: Decor,
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub decor: Decor,
    pub name: String,
    /// `type T = U` alias form.
    pub alias: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub decor: Decor,
    pub recv: Option<Receiver>,
    pub name: String,
    pub sig: Signature,
    /// Absent for externally-implemented functions.
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Empty for an unnamed parameter/result.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    /// `pkg.T`
    Qualified(String, String),
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[n]T`; a `None` length is the `[...]T` form.
    Array(Option<Box<Expr>>, Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Chan(ChanDir, Box<TypeExpr>),
    Func(Box<Signature>),
    Struct(StructType),
    Interface(InterfaceType),
    Paren(Box<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub decor: Decor,
    /// Empty for an embedded field.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Struct tag, verbatim including backticks/quotes.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub members: Vec<InterfaceMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    Method(MethodElem),
    Embedded(EmbeddedElem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodElem {
    pub decor: Decor,
    pub name: String,
    pub sig: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedElem {
    pub decor: Decor,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    /// Any literal token (number, string, rune), verbatim.
    Lit(String),
    Selector(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    SliceExpr {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        spread: bool,
    },
    Unary(String, Box<Expr>),
    /// `*x` (deref, or pointer type in expression position).
    Star(Box<Expr>),
    Paren(Box<Expr>),
    Binary(Box<Expr>, String, Box<Expr>),
    Composite(CompositeLit),
    FuncLit(Box<Signature>, Block),
    /// `x.(T)`; `None` is the `x.(type)` form.
    TypeAssert(Box<Expr>, Option<TypeExpr>),
    /// A type in expression position (conversions, literal types).
    Type(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// Absent for nested literals whose type is inherited from context.
    pub ty: Option<TypeExpr>,
    pub elems: Vec<LitElem>,
    pub multiline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LitElem {
    pub decor: Decor,
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Comments sitting above the closing brace.
    pub trailing: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr {
        decor: Decor,
        expr: Expr,
    },
    Send {
        decor: Decor,
        chan: Expr,
        value: Expr,
    },
    IncDec {
        decor: Decor,
        expr: Expr,
        dec: bool,
    },
    Assign {
        decor: Decor,
        lhs: Vec<Expr>,
        /// `=`, `:=`, or a compound assignment operator.
        op: String,
        rhs: Vec<Expr>,
    },
    Decl {
        decor: Decor,
        decl: GenDecl,
    },
    Return {
        decor: Decor,
        values: Vec<Expr>,
    },
    Branch {
        decor: Decor,
        keyword: String,
        label: Option<String>,
    },
    Labeled {
        decor: Decor,
        label: String,
        stmt: Box<Stmt>,
    },
    Go {
        decor: Decor,
        call: Expr,
    },
    Defer {
        decor: Decor,
        call: Expr,
    },
    If(IfStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Select(SelectStmt),
    Block {
        decor: Decor,
        block: Block,
    },
}

impl Stmt {
    pub fn decor(&self) -> &Decor {
        match self {
            Stmt::Expr { decor, .. }
            | Stmt::Send { decor, .. }
            | Stmt::IncDec { decor, .. }
            | Stmt::Assign { decor, .. }
            | Stmt::Decl { decor, .. }
            | Stmt::Return { decor, .. }
            | Stmt::Branch { decor, .. }
            | Stmt::Labeled { decor, .. }
            | Stmt::Go { decor, .. }
            | Stmt::Defer { decor, .. }
            | Stmt::Block { decor, .. } => decor,
            Stmt::If(s) => &s.decor,
            Stmt::For(s) => &s.decor,
            Stmt::Switch(s) => &s.decor,
            Stmt::Select(s) => &s.decor,
        }
    }

    pub fn decor_mut(&mut self) -> &mut Decor {
        match self {
            Stmt::Expr { decor, .. }
            | Stmt::Send { decor, .. }
            | Stmt::IncDec { decor, .. }
            | Stmt::Assign { decor, .. }
            | Stmt::Decl { decor, .. }
            | Stmt::Return { decor, .. }
            | Stmt::Branch { decor, .. }
            | Stmt::Labeled { decor, .. }
            | Stmt::Go { decor, .. }
            | Stmt::Defer { decor, .. }
            | Stmt::Block { decor, .. } => decor,
            Stmt::If(s) => &mut s.decor,
            Stmt::For(s) => &mut s.decor,
            Stmt::Switch(s) => &mut s.decor,
            Stmt::Select(s) => &mut s.decor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub decor: Decor,
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    /// Either `Stmt::If` (else-if chain) or `Stmt::Block`.
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub decor: Decor,
    pub header: ForHeader,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHeader {
    Forever,
    Cond(Expr),
    Clause {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub decor: Decor,
    pub init: Option<Box<Stmt>>,
    /// Tag expression statement, or the `v := x.(type)` guard.
    pub subject: Option<Box<Stmt>>,
    pub type_switch: bool,
    pub cases: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub decor: Decor,
    /// Empty for `default`.
    pub exprs: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub decor: Decor,
    pub cases: Vec<CommClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    pub decor: Decor,
    /// `None` for `default`.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

/// First-letter-casing export convention.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Base type name behind pointers, parens and package qualifiers.
pub fn extract_type_name(ty: &TypeExpr) -> Option<&str> {
    match ty {
        TypeExpr::Name(name) => Some(name),
        TypeExpr::Qualified(_, sel) => Some(sel),
        TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) => extract_type_name(inner),
        _ => None,
    }
}

/// Tree walker with override points for the passes that need them. Each
/// method is called before descending; `visit_expr` can veto the descent
/// into an expression's children by returning `false`.
pub trait MutVisitor {
    fn visit_expr(&mut self, _expr: &mut Expr) -> bool {
        true
    }

    fn visit_type(&mut self, _ty: &mut TypeExpr) {}

    fn visit_stmt(&mut self, _stmt: &mut Stmt) {}

    fn visit_stmt_list(&mut self, _stmts: &mut Vec<Stmt>) {}
}

pub fn walk_file<V: MutVisitor>(file: &mut File, v: &mut V) {
    for decl in &mut file.decls {
        walk_decl(decl, v);
    }
}

pub fn walk_decl<V: MutVisitor>(decl: &mut Decl, v: &mut V) {
    match decl {
        Decl::Gen(d) => walk_gen_decl(d, v),
        Decl::Func(d) => {
            if let Some(recv) = &mut d.recv {
                walk_type(&mut recv.ty, v);
            }
            walk_signature(&mut d.sig, v);
            if let Some(body) = &mut d.body {
                walk_block(body, v);
            }
        }
    }
}

fn walk_gen_decl<V: MutVisitor>(decl: &mut GenDecl, v: &mut V) {
    for spec in &mut decl.specs {
        match spec {
            Spec::Import(_) => {}
            Spec::Value(s) => {
                if let Some(ty) = &mut s.ty {
                    walk_type(ty, v);
                }
                for value in &mut s.values {
                    walk_expr(value, v);
                }
            }
            Spec::Type(s) => walk_type(&mut s.ty, v),
        }
    }
}

fn walk_signature<V: MutVisitor>(sig: &mut Signature, v: &mut V) {
    for param in sig.params.iter_mut().chain(sig.results.iter_mut()) {
        walk_type(&mut param.ty, v);
    }
}

pub fn walk_type<V: MutVisitor>(ty: &mut TypeExpr, v: &mut V) {
    v.visit_type(ty);
    match ty {
        TypeExpr::Name(_) | TypeExpr::Qualified(..) => {}
        TypeExpr::Pointer(inner)
        | TypeExpr::Slice(inner)
        | TypeExpr::Chan(_, inner)
        | TypeExpr::Paren(inner) => walk_type(inner, v),
        TypeExpr::Array(len, inner) => {
            if let Some(len) = len {
                walk_expr(len, v);
            }
            walk_type(inner, v);
        }
        TypeExpr::Map(key, value) => {
            walk_type(key, v);
            walk_type(value, v);
        }
        TypeExpr::Func(sig) => walk_signature(sig, v),
        TypeExpr::Struct(st) => {
            for field in &mut st.fields {
                walk_type(&mut field.ty, v);
            }
        }
        TypeExpr::Interface(iface) => {
            for member in &mut iface.members {
                match member {
                    InterfaceMember::Method(m) => walk_signature(&mut m.sig, v),
                    InterfaceMember::Embedded(e) => walk_type(&mut e.ty, v),
                }
            }
        }
    }
}

pub fn walk_block<V: MutVisitor>(block: &mut Block, v: &mut V) {
    v.visit_stmt_list(&mut block.stmts);
    for stmt in &mut block.stmts {
        walk_stmt(stmt, v);
    }
}

fn walk_stmt_list<V: MutVisitor>(stmts: &mut Vec<Stmt>, v: &mut V) {
    v.visit_stmt_list(stmts);
    for stmt in stmts {
        walk_stmt(stmt, v);
    }
}

pub fn walk_stmt<V: MutVisitor>(stmt: &mut Stmt, v: &mut V) {
    v.visit_stmt(stmt);
    match stmt {
        Stmt::Expr { expr, .. } => walk_expr(expr, v),
        Stmt::Send { chan, value, .. } => {
            walk_expr(chan, v);
            walk_expr(value, v);
        }
        Stmt::IncDec { expr, .. } => walk_expr(expr, v),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter_mut().chain(rhs.iter_mut()) {
                walk_expr(expr, v);
            }
        }
        Stmt::Decl { decl, .. } => walk_gen_decl(decl, v),
        Stmt::Return { values, .. } => {
            for expr in values {
                walk_expr(expr, v);
            }
        }
        Stmt::Branch { .. } => {}
        Stmt::Labeled { stmt, .. } => walk_stmt(stmt, v),
        Stmt::Go { call, .. } | Stmt::Defer { call, .. } => walk_expr(call, v),
        Stmt::If(s) => {
            if let Some(init) = &mut s.init {
                walk_stmt(init, v);
            }
            walk_expr(&mut s.cond, v);
            walk_block(&mut s.then, v);
            if let Some(else_branch) = &mut s.else_branch {
                walk_stmt(else_branch, v);
            }
        }
        Stmt::For(s) => {
            match &mut s.header {
                ForHeader::Forever => {}
                ForHeader::Cond(cond) => walk_expr(cond, v),
                ForHeader::Clause { init, cond, post } => {
                    if let Some(init) = init {
                        walk_stmt(init, v);
                    }
                    if let Some(cond) = cond {
                        walk_expr(cond, v);
                    }
                    if let Some(post) = post {
                        walk_stmt(post, v);
                    }
                }
                ForHeader::Range {
                    key, value, expr, ..
                } => {
                    if let Some(key) = key {
                        walk_expr(key, v);
                    }
                    if let Some(value) = value {
                        walk_expr(value, v);
                    }
                    walk_expr(expr, v);
                }
            }
            walk_block(&mut s.body, v);
        }
        Stmt::Switch(s) => {
            if let Some(init) = &mut s.init {
                walk_stmt(init, v);
            }
            if let Some(subject) = &mut s.subject {
                walk_stmt(subject, v);
            }
            for case in &mut s.cases {
                for expr in &mut case.exprs {
                    walk_expr(expr, v);
                }
                walk_stmt_list(&mut case.body, v);
            }
        }
        Stmt::Select(s) => {
            for case in &mut s.cases {
                if let Some(comm) = &mut case.comm {
                    walk_stmt(comm, v);
                }
                walk_stmt_list(&mut case.body, v);
            }
        }
        Stmt::Block { block, .. } => walk_block(block, v),
    }
}

pub fn walk_expr<V: MutVisitor>(expr: &mut Expr, v: &mut V) {
    if !v.visit_expr(expr) {
        return;
    }
    match expr {
        Expr::Ident(_) | Expr::Lit(_) => {}
        Expr::Selector(x, _) => walk_expr(x, v),
        Expr::Index(x, index) => {
            walk_expr(x, v);
            walk_expr(index, v);
        }
        Expr::SliceExpr { x, low, high, max } => {
            walk_expr(x, v);
            for part in [low, high, max].into_iter().flatten() {
                walk_expr(part, v);
            }
        }
        Expr::Call { func, args, .. } => {
            walk_expr(func, v);
            for arg in args {
                walk_expr(arg, v);
            }
        }
        Expr::Unary(_, x) | Expr::Star(x) | Expr::Paren(x) => walk_expr(x, v),
        Expr::Binary(lhs, _, rhs) => {
            walk_expr(lhs, v);
            walk_expr(rhs, v);
        }
        Expr::Composite(lit) => {
            if let Some(ty) = &mut lit.ty {
                walk_type(ty, v);
            }
            for elem in &mut lit.elems {
                if let Some(key) = &mut elem.key {
                    walk_expr(key, v);
                }
                walk_expr(&mut elem.value, v);
            }
        }
        Expr::FuncLit(sig, body) => {
            walk_signature(sig, v);
            walk_block(body, v);
        }
        Expr::TypeAssert(x, ty) => {
            walk_expr(x, v);
            if let Some(ty) = ty {
                walk_type(ty, v);
            }
        }
        Expr::Type(ty) => walk_type(ty, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Server"));
        assert!(is_exported("URL"));
        assert!(!is_exported("server"));
        assert!(!is_exported("_"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_extract_type_name() {
        let ty = TypeExpr::Pointer(Box::new(TypeExpr::Name("Server".into())));
        assert_eq!(extract_type_name(&ty), Some("Server"));

        let ty = TypeExpr::Qualified("fmt".into(), "Stringer".into());
        assert_eq!(extract_type_name(&ty), Some("Stringer"));

        let ty = TypeExpr::Slice(Box::new(TypeExpr::Name("int".into())));
        assert_eq!(extract_type_name(&ty), None);
    }
}
