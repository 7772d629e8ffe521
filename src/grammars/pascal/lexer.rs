//! Logos lexer for the Pascal dialect.
//!
//! Keywords are case-insensitive. `{ }` comments are assembled by the
//! repaired comment group; `(* *)` comments are lexed whole.

use logos::Logos;

use crate::grammars::kit::{self, Lexeme};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PascalToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\f]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    NewLine,

    #[token("//")]
    LineComment,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[regex(r"\(\*([^*]|\*+[^*)])*\*+\)")]
    StarComment,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("program", ignore(ascii_case))]
    Program,
    #[token("unit", ignore(ascii_case))]
    Unit,
    #[token("interface", ignore(ascii_case))]
    Interface,
    #[token("implementation", ignore(ascii_case))]
    Implementation,
    #[token("initialization", ignore(ascii_case))]
    Initialization,
    #[token("uses", ignore(ascii_case))]
    Uses,
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("out", ignore(ascii_case))]
    Out,
    #[token("type", ignore(ascii_case))]
    Type,
    #[token("record", ignore(ascii_case))]
    Record,
    #[token("procedure", ignore(ascii_case))]
    Procedure,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("forward", ignore(ascii_case))]
    Forward,
    #[token("begin", ignore(ascii_case))]
    Begin,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("repeat", ignore(ascii_case))]
    Repeat,
    #[token("until", ignore(ascii_case))]
    Until,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("downto", ignore(ascii_case))]
    Downto,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("of", ignore(ascii_case))]
    Of,
    #[token("otherwise", ignore(ascii_case))]
    Otherwise,
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("xor", ignore(ascii_case))]
    Xor,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("div", ignore(ascii_case))]
    Div,
    #[token("mod", ignore(ascii_case))]
    Mod,
    #[token("shl", ignore(ascii_case))]
    Shl,
    #[token("shr", ignore(ascii_case))]
    Shr,
    #[token("nil", ignore(ascii_case))]
    Nil,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    #[regex(r"[0-9]+")]
    DecLiteral,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    RealLiteral,

    #[regex(r"\$[0-9A-Fa-f]+")]
    HexLiteral,

    #[regex(r"'([^'\n]|'')*'")]
    StringLiteral,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token(":=")]
    Assign,
    #[token("..")]
    DotDot,
    #[token("<>")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("=")]
    Equal,
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
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
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
    #[token("^")]
    Caret,
    #[token("@")]
    At,
}

impl PascalToken {
    /// Symbol name in the grammar tables.
    pub fn symbol(self) -> &'static str {
        use PascalToken::*;
        match self {
            Whitespace => "Whitespace",
            NewLine => "NewLine",
            LineComment => "//",
            BraceOpen => "{",
            BraceClose => "}",
            StarComment => "Comment",
            Program => "program",
            Unit => "unit",
            Interface => "interface",
            Implementation => "implementation",
            Initialization => "initialization",
            Uses => "uses",
            Var => "var",
            Const => "const",
            Out => "out",
            Type => "type",
            Record => "record",
            Procedure => "procedure",
            Function => "function",
            Forward => "forward",
            Begin => "begin",
            End => "end",
            If => "if",
            Then => "then",
            Else => "else",
            While => "while",
            Do => "do",
            Repeat => "repeat",
            Until => "until",
            For => "for",
            To => "to",
            Downto => "downto",
            In => "in",
            Case => "case",
            Of => "of",
            Otherwise => "otherwise",
            And => "and",
            Or => "or",
            Xor => "xor",
            Not => "not",
            Div => "div",
            Mod => "mod",
            Shl => "shl",
            Shr => "shr",
            Nil => "nil",
            Id => "Id",
            DecLiteral => "DecLiteral",
            RealLiteral => "RealLiteral",
            HexLiteral => "HexLiteral",
            StringLiteral => "StringLiteral",
            Assign => ":=",
            DotDot => "..",
            NotEqual => "<>",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "=",
            Less => "<",
            Greater => ">",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Semicolon => ";",
            Colon => ":",
            Comma => ",",
            Dot => ".",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            Caret => "^",
            At => "@",
        }
    }
}

/// Terminal symbol names, in table order.
pub const TERMINALS: &[&str] = &[
    "program", "unit", "interface", "implementation", "initialization", "uses", "var", "const", "out",
    "type", "record", "procedure", "function", "forward", "begin", "end", "if", "then", "else", "while",
    "do", "repeat", "until", "for", "to", "downto", "in", "case", "of", "otherwise", "and", "or", "xor",
    "not", "div", "mod", "shl", "shr", "nil", "Id", "DecLiteral", "RealLiteral", "HexLiteral",
    "StringLiteral", ":=", "..", "<>", "<=", ">=", "=", "<", ">", "+", "-", "*", "/", ";", ":", ",", ".",
    "(", ")", "[", "]", "^", "@",
];

pub fn lex(source: &str) -> Vec<Lexeme<'_>> {
    kit::lex_with(source, PascalToken::symbol)
}
