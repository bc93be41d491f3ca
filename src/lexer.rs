//! Go lexer.
//!
//! A logos-derived raw scanner feeds a cooking pass that performs Go's
//! automatic semicolon insertion, tracks blank lines, and attaches comments
//! to the token that follows them (or, for same-line comments, to the token
//! they trail). The parser consumes the cooked stream and never sees raw
//! newlines or comments.

use logos::Logos;
use thiserror::Error;

use crate::ast::Comment;

#[derive(Debug, Error)]
#[error("line {line}: unexpected character {found:?}")]
pub struct LexError {
    pub line: u32,
    pub found: String,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum RawTok {
    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    BlockComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?i?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"`[^`]*`")]
    RawStr,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Rune,

    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("...")]
    #[token("&^")]
    #[token("<<")]
    #[token(">>")]
    #[token("&&")]
    #[token("||")]
    #[token("<-")]
    #[token("++")]
    #[token("--")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token(":=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("<")]
    #[token(">")]
    #[token("=")]
    #[token("!")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    #[token(",")]
    #[token(";")]
    #[token(":")]
    #[token(".")]
    Op,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    RawStr,
    Rune,
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,
    Assign,
    Define,
    AssignOp,
    IncDec,
    Arrow,
    Not,
    Star,
    Amp,
    Plus,
    Minus,
    Slash,
    Percent,
    Caret,
    Pipe,
    Shl,
    Shr,
    AmpCaret,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Eof,
}

impl TokenKind {
    /// Go operator precedence for binary operators, higher binds tighter.
    pub fn binary_prec(self) -> Option<u8> {
        match self {
            TokenKind::OrOr => Some(1),
            TokenKind::AndAnd => Some(2),
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge => Some(3),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Pipe | TokenKind::Caret => Some(4),
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::Amp
            | TokenKind::AmpCaret => Some(5),
            _ => None,
        }
    }

    /// Tokens after which a newline inserts an implicit semicolon.
    fn triggers_semi(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Str
                | TokenKind::RawStr
                | TokenKind::Rune
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwFallthrough
                | TokenKind::KwReturn
                | TokenKind::IncDec
                | TokenKind::RParen
                | TokenKind::RBrack
                | TokenKind::RBrace
        )
    }
}

fn keyword_kind(word: &str) -> TokenKind {
    match word {
        "break" => TokenKind::KwBreak,
        "case" => TokenKind::KwCase,
        "chan" => TokenKind::KwChan,
        "const" => TokenKind::KwConst,
        "continue" => TokenKind::KwContinue,
        "default" => TokenKind::KwDefault,
        "defer" => TokenKind::KwDefer,
        "else" => TokenKind::KwElse,
        "fallthrough" => TokenKind::KwFallthrough,
        "for" => TokenKind::KwFor,
        "func" => TokenKind::KwFunc,
        "go" => TokenKind::KwGo,
        "goto" => TokenKind::KwGoto,
        "if" => TokenKind::KwIf,
        "import" => TokenKind::KwImport,
        "interface" => TokenKind::KwInterface,
        "map" => TokenKind::KwMap,
        "package" => TokenKind::KwPackage,
        "range" => TokenKind::KwRange,
        "return" => TokenKind::KwReturn,
        "select" => TokenKind::KwSelect,
        "struct" => TokenKind::KwStruct,
        "switch" => TokenKind::KwSwitch,
        "type" => TokenKind::KwType,
        "var" => TokenKind::KwVar,
        _ => TokenKind::Ident,
    }
}

fn op_kind(op: &str) -> TokenKind {
    match op {
        "(" => TokenKind::LParen,
        ")" => TokenKind::RParen,
        "[" => TokenKind::LBrack,
        "]" => TokenKind::RBrack,
        "{" => TokenKind::LBrace,
        "}" => TokenKind::RBrace,
        "," => TokenKind::Comma,
        ";" => TokenKind::Semi,
        ":" => TokenKind::Colon,
        "." => TokenKind::Dot,
        "..." => TokenKind::Ellipsis,
        "=" => TokenKind::Assign,
        ":=" => TokenKind::Define,
        "++" | "--" => TokenKind::IncDec,
        "<-" => TokenKind::Arrow,
        "!" => TokenKind::Not,
        "*" => TokenKind::Star,
        "&" => TokenKind::Amp,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "/" => TokenKind::Slash,
        "%" => TokenKind::Percent,
        "^" => TokenKind::Caret,
        "|" => TokenKind::Pipe,
        "<<" => TokenKind::Shl,
        ">>" => TokenKind::Shr,
        "&^" => TokenKind::AmpCaret,
        "&&" => TokenKind::AndAnd,
        "||" => TokenKind::OrOr,
        "==" => TokenKind::EqEq,
        "!=" => TokenKind::NotEq,
        "<" => TokenKind::Lt,
        ">" => TokenKind::Gt,
        "<=" => TokenKind::Le,
        ">=" => TokenKind::Ge,
        // Compound assignment operators all share one kind; the parser
        // keeps the operator text.
        _ => TokenKind::AssignOp,
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub newline_before: bool,
    pub blank_before: bool,
    pub comments: Vec<Comment>,
    pub blank_after_comments: bool,
    pub suffix: Option<String>,
}

struct Cooker {
    out: Vec<Token>,
    pending: Vec<Comment>,
    /// Blank-line state above the first pending comment.
    first_gap: u32,
    /// Newlines seen since the last token or comment.
    newlines: u32,
    line: u32,
    asi: bool,
}

impl Cooker {
    fn new() -> Self {
        Cooker {
            out: Vec::new(),
            pending: Vec::new(),
            first_gap: 0,
            newlines: 0,
            line: 1,
            asi: false,
        }
    }

    fn push_token(&mut self, kind: TokenKind, text: &str) {
        let comments = std::mem::take(&mut self.pending);
        let token = if comments.is_empty() {
            Token {
                kind,
                text: text.to_string(),
                line: self.line,
                newline_before: self.newlines >= 1,
                blank_before: self.newlines >= 2,
                comments,
                blank_after_comments: false,
                suffix: None,
            }
        } else {
            Token {
                kind,
                text: text.to_string(),
                line: self.line,
                newline_before: true,
                blank_before: self.first_gap >= 2,
                comments,
                blank_after_comments: self.newlines >= 2,
                suffix: None,
            }
        };
        self.out.push(token);
        self.newlines = 0;
        self.asi = kind.triggers_semi();
    }

    fn push_comment(&mut self, text: &str) {
        if self.newlines == 0 && self.pending.is_empty() {
            // Same line as the previous token: a trailing comment.
            if let Some(last) = self.out.last_mut() {
                match &mut last.suffix {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(text);
                    }
                    None => last.suffix = Some(text.to_string()),
                }
                return;
            }
        }
        if self.pending.is_empty() {
            self.first_gap = self.newlines;
            self.pending.push(Comment {
                text: text.to_string(),
                blank_before: false,
            });
        } else {
            self.pending.push(Comment {
                text: text.to_string(),
                blank_before: self.newlines >= 2,
            });
        }
        self.newlines = 0;
    }

    fn newline(&mut self) {
        self.line += 1;
        if self.asi {
            self.push_token(TokenKind::Semi, ";");
            self.asi = false;
            self.newlines = 1;
        } else {
            self.newlines += 1;
        }
    }

    fn finish(mut self) -> Vec<Token> {
        if self.asi {
            self.push_token(TokenKind::Semi, ";");
        }
        self.push_token(TokenKind::Eof, "");
        self.out
    }
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cooker = Cooker::new();

    for (result, span) in RawTok::lexer(source).spanned() {
        let slice = &source[span];
        let raw = result.map_err(|()| LexError {
            line: cooker.line,
            found: slice.chars().take(1).collect(),
        })?;

        match raw {
            RawTok::Newline => cooker.newline(),
            RawTok::LineComment => cooker.push_comment(slice),
            RawTok::BlockComment => {
                cooker.push_comment(slice);
                cooker.line += slice.matches('\n').count() as u32;
            }
            RawTok::Word => cooker.push_token(keyword_kind(slice), slice),
            RawTok::Number => cooker.push_token(TokenKind::Number, slice),
            RawTok::Str => cooker.push_token(TokenKind::Str, slice),
            RawTok::RawStr => {
                cooker.push_token(TokenKind::RawStr, slice);
                cooker.line += slice.matches('\n').count() as u32;
            }
            RawTok::Rune => cooker.push_token(TokenKind::Rune, slice),
            RawTok::Op => cooker.push_token(op_kind(slice), slice),
        }
    }

    Ok(cooker.finish())
}
