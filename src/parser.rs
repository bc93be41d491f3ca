//! Recursive-descent Go parser.
//!
//! Builds the annotated tree in `ast` from the cooked token stream. The
//! grammar coverage is pragmatic rather than complete: declarations, the
//! type language, and the statement/expression repertoire of ordinary Go
//! code. Type parameters are rejected up front — the reorganization rules
//! have no generic-aware behavior yet.

use thiserror::Error;

use crate::ast::*;
use crate::lexer::{lex, Token, TokenKind};

#[derive(Debug, Error)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: u32,
    pub message: String,
}

pub struct GoParser;

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GoParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, source: &str, filename: &str) -> Result<File, ParseError> {
        let tokens = lex(source).map_err(|e| ParseError {
            file: filename.to_string(),
            line: e.line,
            message: e.to_string(),
        })?;
        let mut cursor = Cursor {
            tokens,
            pos: 0,
            file: filename.to_string(),
            last_suffix: None,
        };
        cursor.parse_file()
    }
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    last_suffix: Option<String>,
}

enum ParamItem {
    /// A bare identifier: either a parameter name or a type name, resolved
    /// once the whole list is known.
    Bare(String),
    Named(String, TypeExpr, bool),
    Unnamed(TypeExpr, bool),
}

impl Cursor {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        if token.suffix.is_some() {
            self.last_suffix = token.suffix.clone();
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek().text)))
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            file: self.file.clone(),
            line: self.peek().line,
            message,
        }
    }

    fn take_suffix(&mut self) -> Option<String> {
        self.last_suffix.take()
    }

    /// Decorations carried by the upcoming token.
    fn decor_here(&self) -> Decor {
        let token = self.peek();
        Decor {
            before: if token.blank_before {
                Spacing::Blank
            } else {
                Spacing::Newline
            },
            comments: token.comments.clone(),
            blank_after_comments: token.blank_after_comments,
            suffix: None,
        }
    }

    /// A statement/spec terminator: an explicit or inserted semicolon, or a
    /// closing token that makes one optional.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semi) {
            return Ok(());
        }
        match self.kind() {
            TokenKind::RBrace
            | TokenKind::RParen
            | TokenKind::KwCase
            | TokenKind::KwDefault
            | TokenKind::Eof => Ok(()),
            _ => Err(self.error(format!(
                "expected newline or ';', found {:?}",
                self.peek().text
            ))),
        }
    }

    fn skip_semis(&mut self) {
        while self.at(TokenKind::Semi) {
            self.bump();
        }
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Ident
                | TokenKind::Star
                | TokenKind::LBrack
                | TokenKind::KwMap
                | TokenKind::KwChan
                | TokenKind::KwFunc
                | TokenKind::KwStruct
                | TokenKind::KwInterface
                | TokenKind::LParen
                | TokenKind::Arrow
        )
    }

    // ----- file & declarations ---------------------------------------------

    fn parse_file(&mut self) -> Result<File, ParseError> {
        self.skip_semis();
        let decor = self.decor_here();
        self.expect(TokenKind::KwPackage, "package clause")?;
        let package = self.expect(TokenKind::Ident, "package name")?.text;
        self.expect_semi()?;

        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            if self.at(TokenKind::Eof) {
                break;
            }
            let mut decl = self.parse_decl()?;
            self.expect_semi()?;
            if decl.decor().suffix.is_none() {
                decl.decor_mut().suffix = self.take_suffix();
            }
            self.last_suffix = None;
            decls.push(decl);
        }

        Ok(File {
            decor,
            package,
            decls,
        })
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        match self.kind() {
            TokenKind::KwImport => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Import)?)),
            TokenKind::KwConst => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Const)?)),
            TokenKind::KwVar => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Var)?)),
            TokenKind::KwType => Ok(Decl::Gen(self.parse_gen_decl(DeclKind::Type)?)),
            TokenKind::KwFunc => Ok(Decl::Func(self.parse_func_decl()?)),
            _ => Err(self.error(format!(
                "expected declaration, found {:?}",
                self.peek().text
            ))),
        }
    }

    fn parse_gen_decl(&mut self, kind: DeclKind) -> Result<GenDecl, ParseError> {
        let decor = self.decor_here();
        self.bump();

        let mut specs = Vec::new();
        let mut grouped = false;
        if self.eat(TokenKind::LParen) {
            grouped = true;
            loop {
                self.skip_semis();
                if self.eat(TokenKind::RParen) {
                    break;
                }
                if self.at(TokenKind::Eof) {
                    return Err(self.error("unterminated declaration group".into()));
                }
                let spec_decor = self.decor_here();
                self.last_suffix = None;
                let mut spec = self.parse_spec(kind, spec_decor)?;
                self.expect_semi()?;
                spec.decor_mut().suffix = self.take_suffix();
                specs.push(spec);
            }
        } else {
            specs.push(self.parse_spec(kind, Decor::default())?);
        }

        Ok(GenDecl {
            decor,
            kind,
            grouped,
            specs,
        })
    }

    fn parse_spec(&mut self, kind: DeclKind, decor: Decor) -> Result<Spec, ParseError> {
        match kind {
            DeclKind::Import => {
                let alias = match self.kind() {
                    TokenKind::Ident => Some(self.bump().text),
                    TokenKind::Dot => {
                        self.bump();
                        Some(".".to_string())
                    }
                    _ => None,
                };
                let path_tok = self.expect(TokenKind::Str, "import path")?;
                let path = path_tok.text.trim_matches('"').to_string();
                Ok(Spec::Import(ImportSpec { decor, alias, path }))
            }
            DeclKind::Const | DeclKind::Var => {
                let mut names = vec![self.expect(TokenKind::Ident, "identifier")?.text];
                while self.eat(TokenKind::Comma) {
                    names.push(self.expect(TokenKind::Ident, "identifier")?.text);
                }
                let mut ty = None;
                if !self.at(TokenKind::Assign) && self.at_type_start() {
                    ty = Some(self.parse_type()?);
                }
                let mut values = Vec::new();
                if self.eat(TokenKind::Assign) {
                    values = self.parse_expr_list(true)?;
                }
                Ok(Spec::Value(ValueSpec {
                    decor,
                    names,
                    ty,
                    values,
                }))
            }
            DeclKind::Type => {
                let name = self.expect(TokenKind::Ident, "type name")?.text;
                if self.at(TokenKind::LBrack)
                    && self.kind_at(1) == TokenKind::Ident
                    && matches!(self.kind_at(2), TokenKind::Ident | TokenKind::Comma)
                {
                    return Err(self.error("type parameters are not supported".into()));
                }
                let alias = self.eat(TokenKind::Assign);
                let ty = self.parse_type()?;
                Ok(Spec::Type(TypeSpec {
                    decor,
                    name,
                    alias,
                    ty,
                }))
            }
        }
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let decor = self.decor_here();
        self.expect(TokenKind::KwFunc, "func")?;

        let mut recv = None;
        if self.at(TokenKind::LParen) {
            self.bump();
            let name = if self.at(TokenKind::Ident) && self.kind_at(1) != TokenKind::RParen {
                Some(self.bump().text)
            } else {
                None
            };
            let ty = self.parse_type()?;
            self.expect(TokenKind::RParen, "')' after receiver")?;
            recv = Some(Receiver { name, ty });
        }

        let name = self.expect(TokenKind::Ident, "function name")?.text;
        if self.at(TokenKind::LBrack) {
            return Err(self.error("type parameters are not supported".into()));
        }
        let sig = self.parse_signature()?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            decor,
            recv,
            name,
            sig,
            body,
        })
    }

    // ----- types -----------------------------------------------------------

    fn parse_signature(&mut self) -> Result<Signature, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_param_list()?;

        let mut results = Vec::new();
        if self.at(TokenKind::LParen) {
            self.bump();
            results = self.parse_param_list()?;
        } else if self.at_type_start() {
            results.push(Param {
                names: Vec::new(),
                ty: self.parse_type()?,
                variadic: false,
            });
        }

        Ok(Signature { params, results })
    }

    /// Parses the elements of a parenthesized parameter/result list up to and
    /// including the closing paren, resolving Go's names-vs-types ambiguity
    /// once the whole list is known.
    fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut items = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Eof) {
                return Err(self.error("unterminated parameter list".into()));
            }
            items.push(self.parse_param_item()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        let has_named = items.iter().any(|i| matches!(i, ParamItem::Named(..)));
        let mut params = Vec::new();
        if has_named {
            let mut buffered: Vec<String> = Vec::new();
            for item in items {
                match item {
                    ParamItem::Bare(name) => buffered.push(name),
                    ParamItem::Named(name, ty, variadic) => {
                        buffered.push(name);
                        params.push(Param {
                            names: std::mem::take(&mut buffered),
                            ty,
                            variadic,
                        });
                    }
                    ParamItem::Unnamed(..) => {
                        return Err(self.error("mixed named and unnamed parameters".into()))
                    }
                }
            }
            if !buffered.is_empty() {
                return Err(self.error("parameter list is missing a type".into()));
            }
        } else {
            for item in items {
                match item {
                    ParamItem::Bare(name) => params.push(Param {
                        names: Vec::new(),
                        ty: TypeExpr::Name(name),
                        variadic: false,
                    }),
                    ParamItem::Unnamed(ty, variadic) => params.push(Param {
                        names: Vec::new(),
                        ty,
                        variadic,
                    }),
                    ParamItem::Named(..) => unreachable!(),
                }
            }
        }
        Ok(params)
    }

    fn parse_param_item(&mut self) -> Result<ParamItem, ParseError> {
        if self.eat(TokenKind::Ellipsis) {
            return Ok(ParamItem::Unnamed(self.parse_type()?, true));
        }
        if self.at(TokenKind::Ident) {
            match self.kind_at(1) {
                TokenKind::Comma | TokenKind::RParen => {
                    return Ok(ParamItem::Bare(self.bump().text));
                }
                TokenKind::Dot => {
                    return Ok(ParamItem::Unnamed(self.parse_type()?, false));
                }
                _ => {
                    let name = self.bump().text;
                    let variadic = self.eat(TokenKind::Ellipsis);
                    let ty = self.parse_type()?;
                    return Ok(ParamItem::Named(name, ty, variadic));
                }
            }
        }
        Ok(ParamItem::Unnamed(self.parse_type()?, false))
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        match self.kind() {
            TokenKind::Ident => {
                let name = self.bump().text;
                if self.eat(TokenKind::Dot) {
                    let sel = self.expect(TokenKind::Ident, "qualified type name")?.text;
                    Ok(TypeExpr::Qualified(name, sel))
                } else {
                    Ok(TypeExpr::Name(name))
                }
            }
            TokenKind::Star => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBrack => {
                self.bump();
                if self.eat(TokenKind::RBrack) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                if self.eat(TokenKind::Ellipsis) {
                    self.expect(TokenKind::RBrack, "']'")?;
                    return Ok(TypeExpr::Array(None, Box::new(self.parse_type()?)));
                }
                let len = self.parse_expr(true)?;
                self.expect(TokenKind::RBrack, "']'")?;
                Ok(TypeExpr::Array(
                    Some(Box::new(len)),
                    Box::new(self.parse_type()?),
                ))
            }
            TokenKind::KwMap => {
                self.bump();
                self.expect(TokenKind::LBrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBrack, "']'")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            TokenKind::KwChan => {
                self.bump();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan(dir, Box::new(self.parse_type()?)))
            }
            TokenKind::Arrow => {
                self.bump();
                self.expect(TokenKind::KwChan, "chan")?;
                Ok(TypeExpr::Chan(ChanDir::Recv, Box::new(self.parse_type()?)))
            }
            TokenKind::KwFunc => {
                self.bump();
                Ok(TypeExpr::Func(Box::new(self.parse_signature()?)))
            }
            TokenKind::KwStruct => self.parse_struct_type(),
            TokenKind::KwInterface => self.parse_interface_type(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            _ => Err(self.error(format!("expected type, found {:?}", self.peek().text))),
        }
    }

    fn parse_struct_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect(TokenKind::KwStruct, "struct")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.error("unterminated struct type".into()));
            }
            let decor = self.decor_here();
            self.last_suffix = None;
            let mut field = self.parse_field(decor)?;
            self.expect_semi()?;
            field.decor.suffix = self.take_suffix();
            fields.push(field);
        }

        Ok(TypeExpr::Struct(StructType { fields }))
    }

    fn parse_field(&mut self, decor: Decor) -> Result<Field, ParseError> {
        let embedded = match self.kind() {
            TokenKind::Star => true,
            TokenKind::Ident => matches!(
                self.kind_at(1),
                TokenKind::Semi
                    | TokenKind::RBrace
                    | TokenKind::Dot
                    | TokenKind::Str
                    | TokenKind::RawStr
            ),
            _ => false,
        };

        let (names, ty) = if embedded {
            (Vec::new(), self.parse_type()?)
        } else {
            let mut names = vec![self.expect(TokenKind::Ident, "field name")?.text];
            while self.eat(TokenKind::Comma) {
                names.push(self.expect(TokenKind::Ident, "field name")?.text);
            }
            (names, self.parse_type()?)
        };

        let tag = match self.kind() {
            TokenKind::Str | TokenKind::RawStr => Some(self.bump().text),
            _ => None,
        };

        Ok(Field {
            decor,
            names,
            ty,
            tag,
        })
    }

    fn parse_interface_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect(TokenKind::KwInterface, "interface")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut members = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.error("unterminated interface type".into()));
            }
            let decor = self.decor_here();
            if self.at(TokenKind::Ident) && self.kind_at(1) == TokenKind::LParen {
                let name = self.bump().text;
                let sig = self.parse_signature()?;
                self.expect_semi()?;
                members.push(InterfaceMember::Method(MethodElem { decor, name, sig }));
            } else {
                let ty = self.parse_type()?;
                self.expect_semi()?;
                members.push(InterfaceMember::Embedded(EmbeddedElem { decor, ty }));
            }
        }

        Ok(TypeExpr::Interface(InterfaceType { members }))
    }

    // ----- statements ------------------------------------------------------

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        let trailing;
        loop {
            self.skip_semis();
            if self.at(TokenKind::RBrace) {
                trailing = self.peek().comments.clone();
                self.bump();
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.error("unterminated block".into()));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(Block { stmts, trailing })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let decor = self.decor_here();
        self.last_suffix = None;
        let mut stmt = self.parse_stmt_inner(decor)?;
        if stmt.decor().suffix.is_none() {
            stmt.decor_mut().suffix = self.take_suffix();
        }
        Ok(stmt)
    }

    fn parse_stmt_inner(&mut self, decor: Decor) -> Result<Stmt, ParseError> {
        match self.kind() {
            TokenKind::KwVar | TokenKind::KwConst | TokenKind::KwType => {
                let kind = match self.kind() {
                    TokenKind::KwVar => DeclKind::Var,
                    TokenKind::KwConst => DeclKind::Const,
                    _ => DeclKind::Type,
                };
                let decl = self.parse_gen_decl(kind)?;
                self.expect_semi()?;
                Ok(Stmt::Decl { decor, decl })
            }
            TokenKind::KwReturn => {
                self.bump();
                let values = if matches!(self.kind(), TokenKind::Semi | TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list(true)?
                };
                self.expect_semi()?;
                Ok(Stmt::Return { decor, values })
            }
            TokenKind::KwIf => self.parse_if(decor),
            TokenKind::KwFor => self.parse_for(decor),
            TokenKind::KwSwitch => self.parse_switch(decor),
            TokenKind::KwSelect => self.parse_select(decor),
            TokenKind::KwGo => {
                self.bump();
                let call = self.parse_expr(true)?;
                self.expect_semi()?;
                Ok(Stmt::Go { decor, call })
            }
            TokenKind::KwDefer => {
                self.bump();
                let call = self.parse_expr(true)?;
                self.expect_semi()?;
                Ok(Stmt::Defer { decor, call })
            }
            TokenKind::KwBreak | TokenKind::KwContinue | TokenKind::KwGoto => {
                let keyword = self.bump().text;
                let label = if self.at(TokenKind::Ident) {
                    Some(self.bump().text)
                } else {
                    None
                };
                self.expect_semi()?;
                Ok(Stmt::Branch {
                    decor,
                    keyword,
                    label,
                })
            }
            TokenKind::KwFallthrough => {
                let keyword = self.bump().text;
                self.expect_semi()?;
                Ok(Stmt::Branch {
                    decor,
                    keyword,
                    label: None,
                })
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::Block { decor, block })
            }
            TokenKind::Ident if self.kind_at(1) == TokenKind::Colon => {
                let label = self.bump().text;
                self.bump();
                self.skip_semis();
                let stmt = if self.at(TokenKind::RBrace) {
                    Stmt::Block {
                        decor: Decor::default(),
                        block: Block::default(),
                    }
                } else {
                    self.parse_stmt()?
                };
                Ok(Stmt::Labeled {
                    decor,
                    label,
                    stmt: Box::new(stmt),
                })
            }
            _ => {
                let stmt = self.parse_simple_stmt(decor, true)?;
                self.expect_semi()?;
                Ok(stmt)
            }
        }
    }

    fn parse_simple_stmt(&mut self, decor: Decor, allow_lit: bool) -> Result<Stmt, ParseError> {
        let lhs = self.parse_expr_list(allow_lit)?;
        let mut stmt = self.finish_simple_stmt(lhs, allow_lit)?;
        *stmt.decor_mut() = decor;
        Ok(stmt)
    }

    fn single_expr(&self, mut exprs: Vec<Expr>) -> Result<Expr, ParseError> {
        if exprs.len() == 1 {
            Ok(exprs.remove(0))
        } else {
            Err(self.error("unexpected expression list".into()))
        }
    }

    fn parse_if(&mut self, decor: Decor) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::KwIf, "if")?;

        let first = self.parse_simple_stmt(Decor::default(), false)?;
        let (init, cond) = if self.eat(TokenKind::Semi) {
            let cond_stmt = self.parse_simple_stmt(Decor::default(), false)?;
            (Some(Box::new(first)), self.stmt_to_cond(cond_stmt)?)
        } else {
            (None, self.stmt_to_cond(first)?)
        };

        let then = self.parse_block()?;
        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.at(TokenKind::KwIf) {
                Some(Box::new(self.parse_if(Decor::default())?))
            } else {
                let block = self.parse_block()?;
                Some(Box::new(Stmt::Block {
                    decor: Decor::default(),
                    block,
                }))
            }
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            decor,
            init,
            cond,
            then,
            else_branch,
        }))
    }

    fn stmt_to_cond(&self, stmt: Stmt) -> Result<Expr, ParseError> {
        match stmt {
            Stmt::Expr { expr, .. } => Ok(expr),
            _ => Err(self.error("expected condition expression".into())),
        }
    }

    fn parse_for(&mut self, decor: Decor) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::KwFor, "for")?;

        let header = if self.at(TokenKind::LBrace) {
            ForHeader::Forever
        } else if self.eat(TokenKind::KwRange) {
            ForHeader::Range {
                key: None,
                value: None,
                define: false,
                expr: self.parse_expr(false)?,
            }
        } else if self.at(TokenKind::Semi) {
            self.parse_for_clause(None)?
        } else {
            let lhs = self.parse_expr_list(false)?;
            match self.kind() {
                TokenKind::Define | TokenKind::Assign
                    if self.kind_at(1) == TokenKind::KwRange =>
                {
                    let op = self.bump().text;
                    self.bump();
                    let expr = self.parse_expr(false)?;
                    let mut vars = lhs.into_iter();
                    ForHeader::Range {
                        key: vars.next(),
                        value: vars.next(),
                        define: op == ":=",
                        expr,
                    }
                }
                _ => {
                    let stmt = self.finish_simple_stmt(lhs, false)?;
                    if self.at(TokenKind::LBrace) {
                        ForHeader::Cond(self.stmt_to_cond(stmt)?)
                    } else {
                        self.parse_for_clause(Some(Box::new(stmt)))?
                    }
                }
            }
        };

        let body = self.parse_block()?;
        Ok(Stmt::For(ForStmt {
            decor,
            header,
            body,
        }))
    }

    fn parse_for_clause(&mut self, init: Option<Box<Stmt>>) -> Result<ForHeader, ParseError> {
        self.expect(TokenKind::Semi, "';' in for clause")?;
        let cond = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr(false)?)
        };
        self.expect(TokenKind::Semi, "';' in for clause")?;
        let post = if self.at(TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt(Decor::default(), false)?))
        };
        Ok(ForHeader::Clause { init, cond, post })
    }

    /// Continues a simple statement whose leading expression list is already
    /// parsed.
    fn finish_simple_stmt(&mut self, lhs: Vec<Expr>, allow_lit: bool) -> Result<Stmt, ParseError> {
        match self.kind() {
            TokenKind::Define | TokenKind::Assign | TokenKind::AssignOp => {
                let op = self.bump().text;
                let rhs = self.parse_expr_list(allow_lit)?;
                Ok(Stmt::Assign {
                    decor: Decor::default(),
                    lhs,
                    op,
                    rhs,
                })
            }
            TokenKind::IncDec => {
                let op = self.bump().text;
                let expr = self.single_expr(lhs)?;
                Ok(Stmt::IncDec {
                    decor: Decor::default(),
                    expr,
                    dec: op == "--",
                })
            }
            TokenKind::Arrow => {
                self.bump();
                let chan = self.single_expr(lhs)?;
                let value = self.parse_expr(allow_lit)?;
                Ok(Stmt::Send {
                    decor: Decor::default(),
                    chan,
                    value,
                })
            }
            _ => {
                let expr = self.single_expr(lhs)?;
                Ok(Stmt::Expr {
                    decor: Decor::default(),
                    expr,
                })
            }
        }
    }

    fn parse_switch(&mut self, decor: Decor) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::KwSwitch, "switch")?;

        let mut init = None;
        let mut subject = None;
        if !self.at(TokenKind::LBrace) {
            let first = self.parse_simple_stmt(Decor::default(), false)?;
            if self.eat(TokenKind::Semi) {
                init = Some(Box::new(first));
                if !self.at(TokenKind::LBrace) {
                    subject = Some(Box::new(self.parse_simple_stmt(Decor::default(), false)?));
                }
            } else {
                subject = Some(Box::new(first));
            }
        }

        let type_switch = subject.as_deref().is_some_and(is_type_switch_guard);

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut cases = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let case_decor = self.decor_here();
            let exprs = if self.eat(TokenKind::KwCase) {
                self.parse_expr_list(true)?
            } else {
                self.expect(TokenKind::KwDefault, "'case' or 'default'")?;
                Vec::new()
            };
            self.expect(TokenKind::Colon, "':'")?;
            let body = self.parse_clause_body()?;
            cases.push(CaseClause {
                decor: case_decor,
                exprs,
                body,
            });
        }

        Ok(Stmt::Switch(SwitchStmt {
            decor,
            init,
            subject,
            type_switch,
            cases,
        }))
    }

    fn parse_select(&mut self, decor: Decor) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::KwSelect, "select")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut cases = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let case_decor = self.decor_here();
            let comm = if self.eat(TokenKind::KwCase) {
                Some(Box::new(self.parse_simple_stmt(Decor::default(), true)?))
            } else {
                self.expect(TokenKind::KwDefault, "'case' or 'default'")?;
                None
            };
            self.expect(TokenKind::Colon, "':'")?;
            let body = self.parse_clause_body()?;
            cases.push(CommClause {
                decor: case_decor,
                comm,
                body,
            });
        }

        Ok(Stmt::Select(SelectStmt { decor, cases }))
    }

    fn parse_clause_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            self.skip_semis();
            if matches!(
                self.kind(),
                TokenKind::KwCase | TokenKind::KwDefault | TokenKind::RBrace | TokenKind::Eof
            ) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    // ----- expressions -----------------------------------------------------

    fn parse_expr_list(&mut self, allow_lit: bool) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr(allow_lit)?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr(allow_lit)?);
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self, allow_lit: bool) -> Result<Expr, ParseError> {
        self.parse_binary(1, allow_lit)
    }

    fn parse_binary(&mut self, min_prec: u8, allow_lit: bool) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary(allow_lit)?;
        while let Some(prec) = self.kind().binary_prec() {
            if prec < min_prec {
                break;
            }
            let op = self.bump().text;
            let rhs = self.parse_binary(prec + 1, allow_lit)?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, allow_lit: bool) -> Result<Expr, ParseError> {
        match self.kind() {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Not
            | TokenKind::Caret
            | TokenKind::Amp => {
                let op = self.bump().text;
                Ok(Expr::Unary(op, Box::new(self.parse_unary(allow_lit)?)))
            }
            TokenKind::Arrow => {
                self.bump();
                Ok(Expr::Unary(
                    "<-".to_string(),
                    Box::new(self.parse_unary(allow_lit)?),
                ))
            }
            TokenKind::Star => {
                self.bump();
                Ok(Expr::Star(Box::new(self.parse_unary(allow_lit)?)))
            }
            _ => self.parse_primary(allow_lit),
        }
    }

    fn parse_primary(&mut self, allow_lit: bool) -> Result<Expr, ParseError> {
        let mut expr = self.parse_operand(allow_lit)?;
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    if self.kind_at(1) == TokenKind::LParen {
                        self.bump();
                        self.bump();
                        if self.eat(TokenKind::KwType) {
                            self.expect(TokenKind::RParen, "')'")?;
                            expr = Expr::TypeAssert(Box::new(expr), None);
                        } else {
                            let ty = self.parse_type()?;
                            self.expect(TokenKind::RParen, "')'")?;
                            expr = Expr::TypeAssert(Box::new(expr), Some(ty));
                        }
                    } else {
                        self.bump();
                        let name = self.expect(TokenKind::Ident, "selector")?.text;
                        expr = Expr::Selector(Box::new(expr), name);
                    }
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    let mut spread = false;
                    while !self.at(TokenKind::RParen) {
                        if self.at(TokenKind::Eof) {
                            return Err(self.error("unterminated call".into()));
                        }
                        args.push(self.parse_expr(true)?);
                        if self.eat(TokenKind::Ellipsis) {
                            spread = true;
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        spread,
                    };
                }
                TokenKind::LBrack => {
                    self.bump();
                    let low = if self.at(TokenKind::Colon) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr(true)?))
                    };
                    if self.eat(TokenKind::RBrack) {
                        let index =
                            low.ok_or_else(|| self.error("expected index expression".into()))?;
                        expr = Expr::Index(Box::new(expr), index);
                        continue;
                    }
                    self.expect(TokenKind::Colon, "':'")?;
                    let high = if self.at(TokenKind::RBrack) || self.at(TokenKind::Colon) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr(true)?))
                    };
                    let max = if self.eat(TokenKind::Colon) {
                        Some(Box::new(self.parse_expr(true)?))
                    } else {
                        None
                    };
                    self.expect(TokenKind::RBrack, "']'")?;
                    expr = Expr::SliceExpr {
                        x: Box::new(expr),
                        low,
                        high,
                        max,
                    };
                }
                TokenKind::LBrace if can_start_literal(&expr, allow_lit) => {
                    let ty = expr_to_type(expr)
                        .ok_or_else(|| self.error("invalid composite literal type".into()))?;
                    let lit = self.parse_composite_body(Some(ty))?;
                    expr = Expr::Composite(lit);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_operand(&mut self, _allow_lit: bool) -> Result<Expr, ParseError> {
        match self.kind() {
            TokenKind::Ident => Ok(Expr::Ident(self.bump().text)),
            TokenKind::Number | TokenKind::Str | TokenKind::RawStr | TokenKind::Rune => {
                Ok(Expr::Lit(self.bump().text))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr(true)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::KwFunc => {
                self.bump();
                let sig = self.parse_signature()?;
                if self.at(TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    Ok(Expr::FuncLit(Box::new(sig), body))
                } else {
                    Ok(Expr::Type(TypeExpr::Func(Box::new(sig))))
                }
            }
            TokenKind::KwMap
            | TokenKind::KwChan
            | TokenKind::KwStruct
            | TokenKind::KwInterface
            | TokenKind::LBrack => Ok(Expr::Type(self.parse_type()?)),
            _ => Err(self.error(format!(
                "expected expression, found {:?}",
                self.peek().text
            ))),
        }
    }

    fn parse_composite_body(&mut self, ty: Option<TypeExpr>) -> Result<CompositeLit, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut multiline = self.peek().newline_before;

        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.error("unterminated composite literal".into()));
            }
            let decor = self.decor_here();
            let first = self.parse_elem_value()?;
            let elem = if self.eat(TokenKind::Colon) {
                LitElem {
                    decor,
                    key: Some(first),
                    value: self.parse_elem_value()?,
                }
            } else {
                LitElem {
                    decor,
                    key: None,
                    value: first,
                }
            };
            elems.push(elem);
            if !self.eat(TokenKind::Comma) {
                self.skip_semis();
                self.expect(TokenKind::RBrace, "'}' or ','")?;
                break;
            }
        }

        if elems.iter().any(|e| !e.decor.comments.is_empty()) {
            multiline = true;
        }
        Ok(CompositeLit {
            ty,
            elems,
            multiline,
        })
    }

    fn parse_elem_value(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::LBrace) {
            Ok(Expr::Composite(self.parse_composite_body(None)?))
        } else {
            self.parse_expr(true)
        }
    }
}

fn is_type_switch_guard(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr {
            expr: Expr::TypeAssert(_, None),
            ..
        } => true,
        Stmt::Assign { rhs, .. } => {
            matches!(rhs.as_slice(), [Expr::TypeAssert(_, None)])
        }
        _ => false,
    }
}

/// Whether `expr { ... }` should be read as a composite literal. Bare names
/// and qualified names only qualify where the grammar allows it (not in
/// if/for/switch headers); explicit type expressions always do.
fn can_start_literal(expr: &Expr, allow_lit: bool) -> bool {
    match expr {
        Expr::Type(_) => true,
        Expr::Ident(_) => allow_lit,
        Expr::Selector(base, _) => allow_lit && matches!(base.as_ref(), Expr::Ident(_)),
        _ => false,
    }
}

fn expr_to_type(expr: Expr) -> Option<TypeExpr> {
    match expr {
        Expr::Ident(name) => Some(TypeExpr::Name(name)),
        Expr::Selector(base, sel) => match *base {
            Expr::Ident(pkg) => Some(TypeExpr::Qualified(pkg, sel)),
            _ => None,
        },
        Expr::Type(ty) => Some(ty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> File {
        GoParser::new().parse(source, "test.go").unwrap()
    }

    #[test]
    fn test_parse_empty_file() {
        let file = parse("package main\n");
        assert_eq!(file.package, "main");
        assert!(file.decls.is_empty());
    }

    #[test]
    fn test_parse_imports() {
        let file = parse("package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n");
        assert_eq!(file.decls.len(), 1);
        match &file.decls[0] {
            Decl::Gen(d) => {
                assert_eq!(d.kind, DeclKind::Import);
                assert!(d.grouped);
                assert_eq!(d.specs.len(), 2);
                match &d.specs[0] {
                    Spec::Import(s) => assert_eq!(s.path, "fmt"),
                    _ => panic!("expected import spec"),
                }
            }
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_parse_func_with_receiver() {
        let file = parse("package main\n\nfunc (s *Server) Close() error {\n\treturn nil\n}\n");
        match &file.decls[0] {
            Decl::Func(f) => {
                assert_eq!(f.name, "Close");
                let recv = f.recv.as_ref().unwrap();
                assert_eq!(recv.name.as_deref(), Some("s"));
                assert_eq!(extract_type_name(&recv.ty), Some("Server"));
                assert_eq!(f.sig.results.len(), 1);
            }
            _ => panic!("expected func decl"),
        }
    }

    #[test]
    fn test_parse_struct_fields() {
        let file = parse(
            "package main\n\ntype Server struct {\n\t*Client\n\tHost string\n\tport int\n}\n",
        );
        match &file.decls[0] {
            Decl::Gen(d) => match &d.specs[0] {
                Spec::Type(ts) => match &ts.ty {
                    TypeExpr::Struct(st) => {
                        assert_eq!(st.fields.len(), 3);
                        assert!(st.fields[0].names.is_empty());
                        assert_eq!(st.fields[1].names, vec!["Host".to_string()]);
                    }
                    _ => panic!("expected struct type"),
                },
                _ => panic!("expected type spec"),
            },
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_parse_shared_param_type() {
        let file = parse("package main\n\nfunc add(a, b int) int {\n\treturn a + b\n}\n");
        match &file.decls[0] {
            Decl::Func(f) => {
                assert_eq!(f.sig.params.len(), 1);
                assert_eq!(
                    f.sig.params[0].names,
                    vec!["a".to_string(), "b".to_string()]
                );
            }
            _ => panic!("expected func decl"),
        }
    }

    #[test]
    fn test_parse_composite_literal() {
        let file = parse("package main\n\nvar s = Server{Host: \"x\", port: 1}\n");
        match &file.decls[0] {
            Decl::Gen(d) => match &d.specs[0] {
                Spec::Value(vs) => match &vs.values[0] {
                    Expr::Composite(lit) => {
                        assert_eq!(lit.elems.len(), 2);
                        assert!(lit.elems.iter().all(|e| e.key.is_some()));
                        assert!(!lit.multiline);
                    }
                    _ => panic!("expected composite literal"),
                },
                _ => panic!("expected value spec"),
            },
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_parse_multiline_literal() {
        let file = parse("package main\n\nvar s = Server{\n\tHost: \"x\",\n}\n");
        match &file.decls[0] {
            Decl::Gen(d) => match &d.specs[0] {
                Spec::Value(vs) => match &vs.values[0] {
                    Expr::Composite(lit) => assert!(lit.multiline),
                    _ => panic!("expected composite literal"),
                },
                _ => panic!("expected value spec"),
            },
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"package main

func classify(x int) string {
	if x < 0 {
		return "negative"
	} else if x == 0 {
		return "zero"
	}
	for i := 0; i < x; i++ {
		x += i
	}
	switch x {
	case 1:
		return "one"
	default:
		return "many"
	}
}
"#;
        let file = parse(source);
        match &file.decls[0] {
            Decl::Func(f) => {
                let body = f.body.as_ref().unwrap();
                assert_eq!(body.stmts.len(), 3);
                assert!(matches!(body.stmts[0], Stmt::If(_)));
                assert!(matches!(body.stmts[1], Stmt::For(_)));
                assert!(matches!(body.stmts[2], Stmt::Switch(_)));
            }
            _ => panic!("expected func decl"),
        }
    }

    #[test]
    fn test_parse_type_switch() {
        let source = "package main\n\nfunc f(x interface{}) {\n\tswitch v := x.(type) {\n\tcase int:\n\t\t_ = v\n\t}\n}\n";
        let file = parse(source);
        match &file.decls[0] {
            Decl::Func(f) => match &f.body.as_ref().unwrap().stmts[0] {
                Stmt::Switch(s) => assert!(s.type_switch),
                _ => panic!("expected switch"),
            },
            _ => panic!("expected func decl"),
        }
    }

    #[test]
    fn test_parse_range_loop() {
        let file = parse(
            "package main\n\nfunc f(xs []int) {\n\tfor i, x := range xs {\n\t\t_ = i\n\t\t_ = x\n\t}\n}\n",
        );
        match &file.decls[0] {
            Decl::Func(f) => match &f.body.as_ref().unwrap().stmts[0] {
                Stmt::For(s) => {
                    assert!(matches!(s.header, ForHeader::Range { define: true, .. }))
                }
                _ => panic!("expected for"),
            },
            _ => panic!("expected func decl"),
        }
    }

    #[test]
    fn test_comments_attach_to_decls() {
        let file =
            parse("package main\n\n// Server speaks the wire protocol.\ntype Server struct{}\n");
        let decor = file.decls[0].decor();
        assert_eq!(decor.comments.len(), 1);
        assert_eq!(
            decor.comments[0].text,
            "// Server speaks the wire protocol."
        );
    }

    #[test]
    fn test_iota_const_group() {
        let file = parse("package main\n\nconst (\n\tA = iota\n\tB\n\tC\n)\n");
        match &file.decls[0] {
            Decl::Gen(d) => {
                assert_eq!(d.specs.len(), 3);
                match &d.specs[1] {
                    Spec::Value(vs) => assert!(vs.values.is_empty()),
                    _ => panic!("expected value spec"),
                }
            }
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn test_generics_are_rejected() {
        let parser = GoParser::new();
        let result = parser.parse(
            "package main\n\nfunc f[T any](x T) T { return x }\n",
            "test.go",
        );
        assert!(result.is_err());
        let result = parser.parse("package main\n\ntype List[T any] struct{}\n", "test.go");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_syntax_error() {
        let result = GoParser::new().parse("package main\n\nfunc {\n", "test.go");
        assert!(result.is_err());
    }

    #[test]
    fn test_array_type_is_not_generic() {
        let file = parse("package main\n\ntype Buf [16]byte\n");
        match &file.decls[0] {
            Decl::Gen(d) => match &d.specs[0] {
                Spec::Type(ts) => assert!(matches!(ts.ty, TypeExpr::Array(Some(_), _))),
                _ => panic!("expected type spec"),
            },
            _ => panic!("expected gen decl"),
        }
    }
}
