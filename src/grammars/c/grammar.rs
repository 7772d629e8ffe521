//! C grammar: tables and recursive descent.
//!
//! ```text
//! Goal → TranslationUnit → { Typedef | FuncDef | Declaration | Stmt }
//! FuncDef → DeclSpecs Declarator Block
//! Declaration → DeclSpecs [InitDecl {',' InitDecl}] ';'
//! Expr → AssignExpr {',' AssignExpr} → CondExpr → OrExpr ... MulExpr
//!      → CastExpr → UnaryExpr → PostfixExpr → Primary
//! ```
//!
//! Top-level statements are accepted and belong to the main diagram.
//! Type names must be keywords or substituted `UserTypeId`s; the
//! preprocessor takes care of `typedef` names.

use crate::grammars::kit::{self, Cursor, Grammar, Parse, rule_kinds};
use crate::parser::{AdvanceMode, EndingMode, GrammarTables, SymbolKind, TableVersion, Token};

use super::lexer::{self, TERMINALS, TYPE_KEYWORDS};

rule_kinds! {
    TranslationUnit: "<TranslationUnit>" => ["<TranslationUnit>", "<ExternalDecl>"],
    EmptyUnit: "<TranslationUnit>" => [],
    FuncDef: "<FuncDef>" => ["<DeclSpecs>", "<Declarator>", "<Block>"],
    Declaration: "<Declaration>" => ["<DeclSpecs>", "<InitDeclList>", ";"],
    TagDeclaration: "<Declaration>" => ["<DeclSpecs>", ";"],
    Typedef: "<Typedef>" => ["typedef", "<TypeName>", ";"],
    DeclSpecs: "<DeclSpecs>" => ["int"],
    TypeName: "<TypeName>" => ["int"],
    InitDeclList: "<InitDeclList>" => ["<InitDeclList>", ",", "<InitDecl>"],
    InitDecl: "<InitDecl>" => ["<Declarator>", "=", "<Initializer>"],
    BraceInit: "<Initializer>" => ["{", "}"],
    PointerDecl: "<Declarator>" => ["*", "<Declarator>"],
    DeclId: "<DirectDecl>" => ["Id"],
    ParenDecl: "<DirectDecl>" => ["(", "<Declarator>", ")"],
    ArrayDecl: "<DirectDecl>" => ["<DirectDecl>", "[", "<Expr>", "]"],
    OpenArrayDecl: "<DirectDecl>" => ["<DirectDecl>", "[", "]"],
    FuncDecl: "<DirectDecl>" => ["<DirectDecl>", "(", "<ParamList>", ")"],
    NoParamsDecl: "<DirectDecl>" => ["<DirectDecl>", "(", ")"],
    ParamList: "<ParamList>" => ["<ParamList>", ",", "<Param>"],
    Param: "<Param>" => ["<DeclSpecs>", "<Declarator>"],
    Block: "<Block>" => ["{", "<BlockItems>", "}"],
    EmptyBlock: "<Block>" => ["{", "}"],
    BlockItems: "<BlockItems>" => ["<BlockItems>", "<BlockItem>"],
    ExprStmt: "<ExprStmt>" => ["<Expr>", ";"],
    EmptyStmt: "<ExprStmt>" => [";"],
    If: "<IfStmt>" => ["if", "(", "<Expr>", ")", "<Stmt>"],
    IfElse: "<IfStmt>" => ["if", "(", "<Expr>", ")", "<Stmt>", "else", "<Stmt>"],
    While: "<WhileStmt>" => ["while", "(", "<Expr>", ")", "<Stmt>"],
    DoWhile: "<DoStmt>" => ["do", "<Stmt>", "while", "(", "<Expr>", ")", ";"],
    For: "<ForStmt>" => ["for", "(", "<ForInit>", "<ExprStmt>", "<Expr>", ")", "<Stmt>"],
    ForNoStep: "<ForStmt>" => ["for", "(", "<ForInit>", "<ExprStmt>", ")", "<Stmt>"],
    Switch: "<SwitchStmt>" => ["switch", "(", "<Expr>", ")", "{", "<SwitchItems>", "}"],
    EmptySwitch: "<SwitchStmt>" => ["switch", "(", "<Expr>", ")", "{", "}"],
    SwitchItems: "<SwitchItems>" => ["<SwitchItems>", "<SwitchItem>"],
    CaseLabel: "<SwitchItem>" => ["case", "<Expr>", ":"],
    DefaultLabel: "<SwitchItem>" => ["default", ":"],
    Break: "<JumpStmt>" => ["break", ";"],
    Continue: "<JumpStmt>" => ["continue", ";"],
    Return: "<JumpStmt>" => ["return", "<Expr>", ";"],
    ReturnVoid: "<JumpStmt>" => ["return", ";"],
    Comma: "<Expr>" => ["<Expr>", ",", "<AssignExpr>"],
    Assign: "<AssignExpr>" => ["<UnaryExpr>", "=", "<AssignExpr>"],
    AddAssign: "<AssignExpr>" => ["<UnaryExpr>", "+=", "<AssignExpr>"],
    SubAssign: "<AssignExpr>" => ["<UnaryExpr>", "-=", "<AssignExpr>"],
    MulAssign: "<AssignExpr>" => ["<UnaryExpr>", "*=", "<AssignExpr>"],
    DivAssign: "<AssignExpr>" => ["<UnaryExpr>", "/=", "<AssignExpr>"],
    ModAssign: "<AssignExpr>" => ["<UnaryExpr>", "%=", "<AssignExpr>"],
    ShlAssign: "<AssignExpr>" => ["<UnaryExpr>", "<<=", "<AssignExpr>"],
    ShrAssign: "<AssignExpr>" => ["<UnaryExpr>", ">>=", "<AssignExpr>"],
    AndAssign: "<AssignExpr>" => ["<UnaryExpr>", "&=", "<AssignExpr>"],
    OrAssign: "<AssignExpr>" => ["<UnaryExpr>", "|=", "<AssignExpr>"],
    XorAssign: "<AssignExpr>" => ["<UnaryExpr>", "^=", "<AssignExpr>"],
    Conditional: "<CondExpr>" => ["<OrExpr>", "?", "<Expr>", ":", "<CondExpr>"],
    LogOr: "<OrExpr>" => ["<OrExpr>", "||", "<AndExpr>"],
    LogAnd: "<AndExpr>" => ["<AndExpr>", "&&", "<BitOrExpr>"],
    BitOr: "<BitOrExpr>" => ["<BitOrExpr>", "|", "<BitXorExpr>"],
    BitXor: "<BitXorExpr>" => ["<BitXorExpr>", "^", "<BitAndExpr>"],
    BitAnd: "<BitAndExpr>" => ["<BitAndExpr>", "&", "<EqExpr>"],
    Eq: "<EqExpr>" => ["<EqExpr>", "==", "<RelExpr>"],
    Ne: "<EqExpr>" => ["<EqExpr>", "!=", "<RelExpr>"],
    Lt: "<RelExpr>" => ["<RelExpr>", "<", "<ShiftExpr>"],
    Gt: "<RelExpr>" => ["<RelExpr>", ">", "<ShiftExpr>"],
    Le: "<RelExpr>" => ["<RelExpr>", "<=", "<ShiftExpr>"],
    Ge: "<RelExpr>" => ["<RelExpr>", ">=", "<ShiftExpr>"],
    Shl: "<ShiftExpr>" => ["<ShiftExpr>", "<<", "<AddExpr>"],
    Shr: "<ShiftExpr>" => ["<ShiftExpr>", ">>", "<AddExpr>"],
    Add: "<AddExpr>" => ["<AddExpr>", "+", "<MulExpr>"],
    Sub: "<AddExpr>" => ["<AddExpr>", "-", "<MulExpr>"],
    Mul: "<MulExpr>" => ["<MulExpr>", "*", "<CastExpr>"],
    Div: "<MulExpr>" => ["<MulExpr>", "/", "<CastExpr>"],
    Mod: "<MulExpr>" => ["<MulExpr>", "%", "<CastExpr>"],
    Cast: "<CastExpr>" => ["(", "<TypeName>", ")", "<CastExpr>"],
    PreInc: "<UnaryExpr>" => ["++", "<UnaryExpr>"],
    PreDec: "<UnaryExpr>" => ["--", "<UnaryExpr>"],
    AddressOf: "<UnaryExpr>" => ["&", "<CastExpr>"],
    Deref: "<UnaryExpr>" => ["*", "<CastExpr>"],
    Negate: "<UnaryExpr>" => ["-", "<CastExpr>"],
    UnaryPlus: "<UnaryExpr>" => ["+", "<CastExpr>"],
    Not: "<UnaryExpr>" => ["!", "<CastExpr>"],
    BitNot: "<UnaryExpr>" => ["~", "<CastExpr>"],
    SizeofExpr: "<UnaryExpr>" => ["sizeof", "<UnaryExpr>"],
    SizeofType: "<UnaryExpr>" => ["sizeof", "(", "<TypeName>", ")"],
    Index: "<PostfixExpr>" => ["<PostfixExpr>", "[", "<Expr>", "]"],
    Call: "<PostfixExpr>" => ["<PostfixExpr>", "(", "<ArgList>", ")"],
    CallEmpty: "<PostfixExpr>" => ["<PostfixExpr>", "(", ")"],
    Member: "<PostfixExpr>" => ["<PostfixExpr>", ".", "Id"],
    Arrow: "<PostfixExpr>" => ["<PostfixExpr>", "->", "Id"],
    PostInc: "<PostfixExpr>" => ["<PostfixExpr>", "++"],
    PostDec: "<PostfixExpr>" => ["<PostfixExpr>", "--"],
    ArgList: "<ArgList>" => ["<ArgList>", ",", "<AssignExpr>"],
    Paren: "<Primary>" => ["(", "<Expr>", ")"],
    StringConcat: "<Strings>" => ["<Strings>", "StringLiteral"],
}

impl RuleKind {
    /// Rules that make up a statement or declaration of their own.
    pub fn is_statement(self) -> bool {
        use RuleKind::*;
        matches!(
            self,
            FuncDef
                | Declaration
                | TagDeclaration
                | Typedef
                | Block
                | ExprStmt
                | If
                | IfElse
                | While
                | DoWhile
                | For
                | ForNoStep
                | Switch
                | EmptySwitch
                | CaseLabel
                | DefaultLabel
                | Break
                | Continue
                | Return
                | ReturnVoid
        )
    }

    /// Left-recursive list rules.
    pub fn is_list(self) -> bool {
        use RuleKind::*;
        matches!(self, TranslationUnit | BlockItems | SwitchItems | InitDeclList | ParamList | ArgList)
    }

    /// The compound assignment operator as a binary operator symbol.
    pub fn compound_operator(self) -> Option<&'static str> {
        use RuleKind::*;
        Some(match self {
            AddAssign => "+",
            SubAssign => "-",
            MulAssign => "*",
            DivAssign => "/",
            ModAssign => "%",
            ShlAssign => "<<",
            ShrAssign => ">>",
            AndAssign => "&",
            OrAssign => "|",
            XorAssign => "^",
            _ => return None,
        })
    }
}

/// The C dialect.
pub struct C;

impl Grammar for C {
    fn tables() -> GrammarTables {
        let mut tables = kit::build_tables(
            "ANSI C",
            TableVersion::V5,
            &[
                ("Whitespace", SymbolKind::Noise),
                ("NewLine", SymbolKind::Noise),
                ("Comment", SymbolKind::Noise),
                ("//", SymbolKind::GroupStart),
                ("/*", SymbolKind::GroupStart),
                ("*/", SymbolKind::GroupEnd),
            ],
            TERMINALS,
            RuleKind::ALL.iter().map(|kind| (kind.head(), kind.body())),
        );
        let symbols = ["Comment", "//", "NewLine", "/*", "*/"].map(|name| tables.symbol_index(name));
        if let [Some(comment), Some(line), Some(new_line), Some(open), Some(close)] = symbols {
            tables.add_group("Comment Line", comment, line, new_line, AdvanceMode::Token, EndingMode::Open);
            tables.add_group("Comment Block", comment, open, close, AdvanceMode::Character, EndingMode::Closed);
        }
        tables
    }

    fn lex(source: &str) -> Vec<kit::Lexeme<'_>> {
        lexer::lex(source)
    }

    fn goal(c: &mut Cursor<'_, '_>) -> Parse<Token> {
        translation_unit(c)
    }
}

type Parser = fn(&mut Cursor<'_, '_>) -> Parse<Token>;

fn reduce(c: &mut Cursor<'_, '_>, kind: RuleKind, tokens: Vec<Token>) -> Token {
    c.reduce(kind.index(), tokens)
}

fn at_type(c: &mut Cursor<'_, '_>) -> bool {
    c.at_any(TYPE_KEYWORDS)
}

// ============================================================================
// Declarations
// ============================================================================

fn translation_unit(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut unit = reduce(c, RuleKind::EmptyUnit, Vec::new());
    while !c.at_eof() {
        let item = if c.at("typedef") {
            typedef(c)?
        } else if at_type(c) {
            external_declaration(c)?
        } else {
            statement(c)?
        };
        unit = reduce(c, RuleKind::TranslationUnit, vec![unit, item]);
    }
    Ok(unit)
}

/// `typedef` declarations only introduce names; the body is kept raw.
fn typedef(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("typedef")?;
    let body = raw_run(c, RuleKind::TypeName, &[";"])?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::Typedef, vec![keyword, body, semi]))
}

fn external_declaration(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let specs = declaration_specifiers(c)?;
    if c.at(";") {
        let semi = c.bump();
        return Ok(reduce(c, RuleKind::TagDeclaration, vec![specs, semi]));
    }
    let first = declarator(c)?;
    if c.at("{") {
        let body = block(c)?;
        return Ok(reduce(c, RuleKind::FuncDef, vec![specs, first, body]));
    }
    declaration_rest(c, specs, first)
}

fn declaration(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let specs = declaration_specifiers(c)?;
    if c.at(";") {
        let semi = c.bump();
        return Ok(reduce(c, RuleKind::TagDeclaration, vec![specs, semi]));
    }
    let first = declarator(c)?;
    declaration_rest(c, specs, first)
}

fn declaration_rest(c: &mut Cursor<'_, '_>, specs: Token, first: Token) -> Parse<Token> {
    let mut list = init_declarator(c, first)?;
    while c.at(",") {
        let comma = c.bump();
        let target = declarator(c)?;
        let next = init_declarator(c, target)?;
        list = reduce(c, RuleKind::InitDeclList, vec![list, comma, next]);
    }
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::Declaration, vec![specs, list, semi]))
}

fn init_declarator(c: &mut Cursor<'_, '_>, target: Token) -> Parse<Token> {
    if !c.at("=") {
        return Ok(target);
    }
    let equals = c.bump();
    let value = if c.at("{") {
        let open = c.bump();
        let mut tokens = vec![open];
        let inner = raw_tokens(c, &["}"]);
        tokens.extend(inner);
        tokens.push(c.expect("}")?);
        reduce(c, RuleKind::BraceInit, tokens)
    } else {
        assignment_expression(c)?
    };
    Ok(reduce(c, RuleKind::InitDecl, vec![target, equals, value]))
}

/// Type keywords, substituted type names and tagged types, kept raw.
fn declaration_specifiers(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut tokens = Vec::new();
    while at_type(c) {
        let tagged = c.at_any(&["struct", "union", "enum"]);
        tokens.push(c.bump());
        if tagged {
            if let Some(tag) = c.eat("Id") {
                tokens.push(tag);
            }
            if c.at("{") {
                tokens.push(c.bump());
                tokens.extend(raw_tokens(c, &["}"]));
                tokens.push(c.expect("}")?);
            }
        }
    }
    if tokens.is_empty() {
        return c.unexpected();
    }
    Ok(reduce(c, RuleKind::DeclSpecs, tokens))
}

/// Tokens up to a stop symbol at bracket level 0.
fn raw_tokens(c: &mut Cursor<'_, '_>, stops: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    loop {
        let name = c.current().name.clone();
        let name = name.as_str();
        if name == "EOF" || (depth == 0 && stops.contains(&name)) {
            break;
        }
        match name {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" if depth == 0 => break,
            ")" | "]" | "}" => depth -= 1,
            _ => {}
        }
        tokens.push(c.bump());
    }
    tokens
}

fn raw_run(c: &mut Cursor<'_, '_>, kind: RuleKind, stops: &[&str]) -> Parse<Token> {
    let tokens = raw_tokens(c, stops);
    if tokens.is_empty() {
        return c.unexpected();
    }
    Ok(reduce(c, kind, tokens))
}

fn declarator(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    c.nested(|c| {
        if c.at("*") {
            let star = c.bump();
            // qualifiers after the star do not change the name
            while c.at_any(&["const", "volatile"]) {
                c.bump();
            }
            let inner = declarator(c)?;
            return Ok(reduce(c, RuleKind::PointerDecl, vec![star, inner]));
        }
        let mut target = if c.at("(") {
            let open = c.bump();
            let inner = declarator(c)?;
            let close = c.expect(")")?;
            reduce(c, RuleKind::ParenDecl, vec![open, inner, close])
        } else {
            let name = c.expect("Id")?;
            reduce(c, RuleKind::DeclId, vec![name])
        };
        loop {
            target = if c.at("[") {
                let open = c.bump();
                if c.at("]") {
                    let close = c.bump();
                    reduce(c, RuleKind::OpenArrayDecl, vec![target, open, close])
                } else {
                    let size = expression(c)?;
                    let close = c.expect("]")?;
                    reduce(c, RuleKind::ArrayDecl, vec![target, open, size, close])
                }
            } else if c.at("(") {
                let open = c.bump();
                if c.at(")") {
                    let close = c.bump();
                    reduce(c, RuleKind::NoParamsDecl, vec![target, open, close])
                } else {
                    let params = parameter_list(c)?;
                    let close = c.expect(")")?;
                    reduce(c, RuleKind::FuncDecl, vec![target, open, params, close])
                }
            } else {
                return Ok(target);
            };
        }
    })
}

fn parameter_list(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut list = parameter(c)?;
    while c.at(",") {
        let comma = c.bump();
        let next = parameter(c)?;
        list = reduce(c, RuleKind::ParamList, vec![list, comma, next]);
    }
    Ok(list)
}

fn parameter(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at("...") {
        return Ok(c.bump());
    }
    let specs = declaration_specifiers(c)?;
    if c.at(",") || c.at(")") {
        return Ok(specs);
    }
    let target = declarator(c)?;
    Ok(reduce(c, RuleKind::Param, vec![specs, target]))
}

// ============================================================================
// Statements
// ============================================================================

fn block(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let open = c.expect("{")?;
    if c.at("}") {
        let close = c.bump();
        return Ok(reduce(c, RuleKind::EmptyBlock, vec![open, close]));
    }
    let mut items = block_item(c)?;
    while !c.at("}") && !c.at_eof() {
        let next = block_item(c)?;
        items = reduce(c, RuleKind::BlockItems, vec![items, next]);
    }
    let close = c.expect("}")?;
    Ok(reduce(c, RuleKind::Block, vec![open, items, close]))
}

fn block_item(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at("typedef") {
        typedef(c)
    } else if at_type(c) {
        declaration(c)
    } else {
        statement(c)
    }
}

fn statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    c.nested(|c| {
        if c.at("{") {
            block(c)
        } else if c.at("if") {
            if_statement(c)
        } else if c.at("while") {
            while_statement(c)
        } else if c.at("do") {
            do_statement(c)
        } else if c.at("for") {
            for_statement(c)
        } else if c.at("switch") {
            switch_statement(c)
        } else if c.at("break") || c.at("continue") {
            let kind = if c.at("break") { RuleKind::Break } else { RuleKind::Continue };
            let keyword = c.bump();
            let semi = c.expect(";")?;
            Ok(reduce(c, kind, vec![keyword, semi]))
        } else if c.at("return") {
            let keyword = c.bump();
            if c.at(";") {
                let semi = c.bump();
                return Ok(reduce(c, RuleKind::ReturnVoid, vec![keyword, semi]));
            }
            let value = expression(c)?;
            let semi = c.expect(";")?;
            Ok(reduce(c, RuleKind::Return, vec![keyword, value, semi]))
        } else {
            expression_statement(c)
        }
    })
}

fn expression_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at(";") {
        let semi = c.bump();
        return Ok(reduce(c, RuleKind::EmptyStmt, vec![semi]));
    }
    let value = expression(c)?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::ExprStmt, vec![value, semi]))
}

/// `keyword ( Expr )`
fn parenthesized(c: &mut Cursor<'_, '_>, keyword: &str) -> Parse<[Token; 4]> {
    let keyword = c.expect(keyword)?;
    let open = c.expect("(")?;
    let condition = expression(c)?;
    let close = c.expect(")")?;
    Ok([keyword, open, condition, close])
}

fn if_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut tokens: Vec<Token> = parenthesized(c, "if")?.into();
    tokens.push(statement(c)?);
    if c.at("else") {
        tokens.push(c.bump());
        tokens.push(statement(c)?);
        return Ok(reduce(c, RuleKind::IfElse, tokens));
    }
    Ok(reduce(c, RuleKind::If, tokens))
}

fn while_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut tokens: Vec<Token> = parenthesized(c, "while")?.into();
    tokens.push(statement(c)?);
    Ok(reduce(c, RuleKind::While, tokens))
}

fn do_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("do")?;
    let body = statement(c)?;
    let mut tokens = vec![keyword, body];
    tokens.extend(parenthesized(c, "while")?);
    tokens.push(c.expect(";")?);
    Ok(reduce(c, RuleKind::DoWhile, tokens))
}

fn for_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("for")?;
    let open = c.expect("(")?;
    let init = if at_type(c) { declaration(c)? } else { expression_statement(c)? };
    let condition = expression_statement(c)?;
    if c.at(")") {
        let close = c.bump();
        let body = statement(c)?;
        return Ok(reduce(
            c,
            RuleKind::ForNoStep,
            vec![keyword, open, init, condition, close, body],
        ));
    }
    let step = expression(c)?;
    let close = c.expect(")")?;
    let body = statement(c)?;
    Ok(reduce(
        c,
        RuleKind::For,
        vec![keyword, open, init, condition, step, close, body],
    ))
}

fn switch_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut tokens: Vec<Token> = parenthesized(c, "switch")?.into();
    tokens.push(c.expect("{")?);
    if c.at("}") {
        tokens.push(c.bump());
        return Ok(reduce(c, RuleKind::EmptySwitch, tokens));
    }
    let mut items = switch_item(c)?;
    while !c.at("}") && !c.at_eof() {
        let next = switch_item(c)?;
        items = reduce(c, RuleKind::SwitchItems, vec![items, next]);
    }
    tokens.push(items);
    tokens.push(c.expect("}")?);
    Ok(reduce(c, RuleKind::Switch, tokens))
}

fn switch_item(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at("case") {
        let keyword = c.bump();
        let label = conditional_expression(c)?;
        let colon = c.expect(":")?;
        return Ok(reduce(c, RuleKind::CaseLabel, vec![keyword, label, colon]));
    }
    if c.at("default") {
        let keyword = c.bump();
        let colon = c.expect(":")?;
        return Ok(reduce(c, RuleKind::DefaultLabel, vec![keyword, colon]));
    }
    block_item(c)
}

// ============================================================================
// Expressions
// ============================================================================

const ASSIGNMENT: &[(&str, RuleKind)] = &[
    ("=", RuleKind::Assign),
    ("+=", RuleKind::AddAssign),
    ("-=", RuleKind::SubAssign),
    ("*=", RuleKind::MulAssign),
    ("/=", RuleKind::DivAssign),
    ("%=", RuleKind::ModAssign),
    ("<<=", RuleKind::ShlAssign),
    (">>=", RuleKind::ShrAssign),
    ("&=", RuleKind::AndAssign),
    ("|=", RuleKind::OrAssign),
    ("^=", RuleKind::XorAssign),
];

/// Binary operator levels, loosest first.
const BINARY: &[&[(&str, RuleKind)]] = &[
    &[("||", RuleKind::LogOr)],
    &[("&&", RuleKind::LogAnd)],
    &[("|", RuleKind::BitOr)],
    &[("^", RuleKind::BitXor)],
    &[("&", RuleKind::BitAnd)],
    &[("==", RuleKind::Eq), ("!=", RuleKind::Ne)],
    &[("<", RuleKind::Lt), (">", RuleKind::Gt), ("<=", RuleKind::Le), (">=", RuleKind::Ge)],
    &[("<<", RuleKind::Shl), (">>", RuleKind::Shr)],
    &[("+", RuleKind::Add), ("-", RuleKind::Sub)],
    &[("*", RuleKind::Mul), ("/", RuleKind::Div), ("%", RuleKind::Mod)],
];

const UNARY: &[(&str, RuleKind)] = &[
    ("++", RuleKind::PreInc),
    ("--", RuleKind::PreDec),
    ("&", RuleKind::AddressOf),
    ("*", RuleKind::Deref),
    ("-", RuleKind::Negate),
    ("+", RuleKind::UnaryPlus),
    ("!", RuleKind::Not),
    ("~", RuleKind::BitNot),
];

fn operator_at(c: &mut Cursor<'_, '_>, operators: &[(&str, RuleKind)]) -> Option<RuleKind> {
    let mut found = None;
    for (name, kind) in operators {
        if c.at(name) && found.is_none() {
            found = Some(*kind);
        }
    }
    found
}

pub(super) fn expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    c.nested(|c| {
        let mut left = assignment_expression(c)?;
        while c.at(",") {
            let comma = c.bump();
            let right = assignment_expression(c)?;
            left = reduce(c, RuleKind::Comma, vec![left, comma, right]);
        }
        Ok(left)
    })
}

fn assignment_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let left = conditional_expression(c)?;
    match operator_at(c, ASSIGNMENT) {
        Some(kind) => {
            let op = c.bump();
            let right = c.nested(assignment_expression)?;
            Ok(reduce(c, kind, vec![left, op, right]))
        }
        None => Ok(left),
    }
}

fn conditional_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let condition = binary(c, 0)?;
    if !c.at("?") {
        return Ok(condition);
    }
    let question = c.bump();
    let on_true = expression(c)?;
    let colon = c.expect(":")?;
    let on_false = c.nested(conditional_expression)?;
    Ok(reduce(
        c,
        RuleKind::Conditional,
        vec![condition, question, on_true, colon, on_false],
    ))
}

fn binary(c: &mut Cursor<'_, '_>, level: usize) -> Parse<Token> {
    let Some(operators) = BINARY.get(level) else {
        return cast_expression(c);
    };
    let mut left = binary(c, level + 1)?;
    while let Some(kind) = operator_at(c, operators) {
        let op = c.bump();
        let right = binary(c, level + 1)?;
        left = reduce(c, kind, vec![left, op, right]);
    }
    Ok(left)
}

fn type_follows(c: &Cursor<'_, '_>) -> bool {
    TYPE_KEYWORDS.iter().any(|name| c.nth_is(1, name))
}

fn cast_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at("(") && type_follows(c) {
        let open = c.bump();
        let target = raw_run(c, RuleKind::TypeName, &[")"])?;
        let close = c.expect(")")?;
        let operand = c.nested(cast_expression)?;
        return Ok(reduce(c, RuleKind::Cast, vec![open, target, close, operand]));
    }
    unary_expression(c)
}

fn unary_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if let Some(kind) = operator_at(c, UNARY) {
        let op = c.bump();
        let operand: Parser = match kind {
            RuleKind::PreInc | RuleKind::PreDec => unary_expression,
            _ => cast_expression,
        };
        let operand = c.nested(operand)?;
        return Ok(reduce(c, kind, vec![op, operand]));
    }
    if c.at("sizeof") {
        let keyword = c.bump();
        if c.at("(") && type_follows(c) {
            let open = c.bump();
            let target = raw_run(c, RuleKind::TypeName, &[")"])?;
            let close = c.expect(")")?;
            return Ok(reduce(c, RuleKind::SizeofType, vec![keyword, open, target, close]));
        }
        let operand = c.nested(unary_expression)?;
        return Ok(reduce(c, RuleKind::SizeofExpr, vec![keyword, operand]));
    }
    postfix_expression(c)
}

fn postfix_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut target = primary(c)?;
    loop {
        target = if c.at("[") {
            let open = c.bump();
            let index = expression(c)?;
            let close = c.expect("]")?;
            reduce(c, RuleKind::Index, vec![target, open, index, close])
        } else if c.at("(") {
            let open = c.bump();
            if c.at(")") {
                let close = c.bump();
                reduce(c, RuleKind::CallEmpty, vec![target, open, close])
            } else {
                let args = argument_list(c)?;
                let close = c.expect(")")?;
                reduce(c, RuleKind::Call, vec![target, open, args, close])
            }
        } else if c.at(".") || c.at("->") {
            let kind = if c.at(".") { RuleKind::Member } else { RuleKind::Arrow };
            let op = c.bump();
            let field = c.expect("Id")?;
            reduce(c, kind, vec![target, op, field])
        } else if c.at("++") || c.at("--") {
            let kind = if c.at("++") { RuleKind::PostInc } else { RuleKind::PostDec };
            let op = c.bump();
            reduce(c, kind, vec![target, op])
        } else {
            return Ok(target);
        };
    }
}

fn argument_list(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut list = assignment_expression(c)?;
    while c.at(",") {
        let comma = c.bump();
        let next = assignment_expression(c)?;
        list = reduce(c, RuleKind::ArgList, vec![list, comma, next]);
    }
    Ok(list)
}

fn primary(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if c.at_any(&["Id", "DecLiteral", "HexLiteral", "FloatLiteral", "CharLiteral"]) {
        return Ok(c.bump());
    }
    if c.at("StringLiteral") {
        let mut strings = c.bump();
        while c.at("StringLiteral") {
            let next = c.bump();
            strings = reduce(c, RuleKind::StringConcat, vec![strings, next]);
        }
        return Ok(strings);
    }
    if c.at("(") {
        let open = c.bump();
        let inner = expression(c)?;
        let close = c.expect(")")?;
        return Ok(reduce(c, RuleKind::Paren, vec![open, inner, close]));
    }
    c.unexpected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::kit::Engine;
    use crate::parser::{ParseEngine, Reduction, TokenSink};

    struct Ignore;

    impl TokenSink for Ignore {
        fn token_read(&mut self, _token: &Token, _tables: &GrammarTables) {}
    }

    fn parse(source: &str) -> (Engine<C>, bool) {
        let mut engine = Engine::<C>::new();
        let ok = engine.parse_source_statements(source, &mut Ignore).unwrap();
        (engine, ok)
    }

    fn kind_of(engine: &Engine<C>, reduction: &Reduction) -> Option<RuleKind> {
        RuleKind::resolve(engine.tables())[reduction.rule]
    }

    #[test]
    fn test_rule_kinds_resolve_to_themselves() {
        let tables = C::tables();
        let kinds = RuleKind::resolve(&tables);
        for kind in RuleKind::ALL {
            assert_eq!(kinds[kind.index()], Some(*kind), "{kind:?}");
        }
    }

    #[test]
    fn test_comment_groups_are_declared() {
        let tables = C::tables();
        let names: Vec<&str> = tables.groups().iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, ["Comment Line", "Comment Block"]);
    }

    #[test]
    fn test_function_definition() {
        let (engine, ok) = parse("int add(int a, int b) {\n  return a + b;\n}\n");
        assert!(ok, "{}", engine.error_message());
        let unit = engine.current_reduction().unwrap();
        assert_eq!(kind_of(&engine, unit), Some(RuleKind::TranslationUnit));
        let function = unit.child(1).unwrap();
        assert_eq!(kind_of(&engine, function), Some(RuleKind::FuncDef));
    }

    #[test]
    fn test_statements_and_declarations_mix() {
        let source = "int main(void) {\n  int i, n = 10;\n  for (i = 0; i < n; i++) { if (i % 2 == 0) continue; }\n  \
                      do { n--; } while (n > 0);\n  switch (n) { case 1: case 2: n = 3; break; default: n = 0; }\n  \
                      return (int) n;\n}";
        let (engine, ok) = parse(source);
        assert!(ok, "{}", engine.error_message());
    }

    #[test]
    fn test_pointer_and_array_declarators() {
        let (engine, ok) = parse("char *names[10];\nint (*compare)(int, int);\nvoid f(int *p, ...);\n");
        assert!(ok, "{}", engine.error_message());
    }

    #[test]
    fn test_missing_semicolon_is_a_syntax_error() {
        let (engine, ok) = parse("int main() {\n  x = 1\n}");
        assert!(!ok);
        assert!(engine.error_message().contains("line 3"), "{}", engine.error_message());
    }
}
