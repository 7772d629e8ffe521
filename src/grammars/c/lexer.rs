//! Logos lexer for the C dialect.
//!
//! Comment delimiters are lexed as single tokens; the comment groups of
//! the tables merge everything up to the matching end into one token.

use logos::Logos;

use crate::grammars::kit::{self, Lexeme};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\f\v]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    NewLine,

    #[token("//")]
    LineComment,

    #[token("/*")]
    BlockOpen,

    #[token("*/")]
    BlockClose,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("void")]
    Void,
    #[token("char")]
    Char,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("signed")]
    Signed,
    #[token("unsigned")]
    Unsigned,
    #[token("_Bool")]
    Bool,
    #[token("const")]
    Const,
    #[token("volatile")]
    Volatile,
    #[token("static")]
    Static,
    #[token("extern")]
    Extern,
    #[token("register")]
    Register,
    #[token("auto")]
    Auto,
    #[token("inline")]
    Inline,
    #[token("struct")]
    Struct,
    #[token("union")]
    Union,
    #[token("enum")]
    Enum,
    #[token("typedef")]
    Typedef,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("sizeof")]
    Sizeof,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Type names substituted by the preprocessor.
    #[regex(r"__nassi_type_[0-9]+__", priority = 5)]
    UserTypeId,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    #[regex(r"[0-9]+[uUlL]*")]
    DecLiteral,

    #[regex(r"0[xX][0-9A-Fa-f]+[uUlL]*")]
    HexLiteral,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFlL]?")]
    FloatLiteral,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    CharLiteral,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("...")]
    Ellipsis,
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("->")]
    Arrow,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("=")]
    Assign,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
}

impl CToken {
    /// Symbol name in the grammar tables.
    pub fn symbol(self) -> &'static str {
        use CToken::*;
        match self {
            Whitespace => "Whitespace",
            NewLine => "NewLine",
            LineComment => "//",
            BlockOpen => "/*",
            BlockClose => "*/",
            Void => "void",
            Char => "char",
            Short => "short",
            Int => "int",
            Long => "long",
            Float => "float",
            Double => "double",
            Signed => "signed",
            Unsigned => "unsigned",
            Bool => "_Bool",
            Const => "const",
            Volatile => "volatile",
            Static => "static",
            Extern => "extern",
            Register => "register",
            Auto => "auto",
            Inline => "inline",
            Struct => "struct",
            Union => "union",
            Enum => "enum",
            Typedef => "typedef",
            If => "if",
            Else => "else",
            While => "while",
            Do => "do",
            For => "for",
            Switch => "switch",
            Case => "case",
            Default => "default",
            Break => "break",
            Continue => "continue",
            Return => "return",
            Sizeof => "sizeof",
            UserTypeId => "UserTypeId",
            Id => "Id",
            DecLiteral => "DecLiteral",
            HexLiteral => "HexLiteral",
            FloatLiteral => "FloatLiteral",
            CharLiteral => "CharLiteral",
            StringLiteral => "StringLiteral",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            Ellipsis => "...",
            Increment => "++",
            Decrement => "--",
            Arrow => "->",
            AndAnd => "&&",
            OrOr => "||",
            EqualEqual => "==",
            NotEqual => "!=",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Shl => "<<",
            Shr => ">>",
            Assign => "=",
            Less => "<",
            Greater => ">",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Bang => "!",
            Tilde => "~",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Question => "?",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
        }
    }
}

/// Terminal symbol names, in table order.
pub const TERMINALS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool", "const",
    "volatile", "static", "extern", "register", "auto", "inline", "struct", "union", "enum", "typedef",
    "if", "else", "while", "do", "for", "switch", "case", "default", "break", "continue", "return",
    "sizeof", "UserTypeId", "Id", "DecLiteral", "HexLiteral", "FloatLiteral", "CharLiteral",
    "StringLiteral", "<<=", ">>=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "...", "++", "--",
    "->", "&&", "||", "==", "!=", "<=", ">=", "<<", ">>", "=", "<", ">", "+", "-", "*", "/", "%", "!",
    "~", "&", "|", "^", "?", ":", ";", ",", ".", "(", ")", "[", "]", "{", "}",
];

/// Keywords that can start a type.
pub const TYPE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool", "const",
    "volatile", "static", "extern", "register", "auto", "inline", "struct", "union", "enum", "UserTypeId",
];

pub fn lex(source: &str) -> Vec<Lexeme<'_>> {
    kit::lex_with(source, CToken::symbol)
}
