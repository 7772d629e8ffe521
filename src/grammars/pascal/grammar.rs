//! Pascal grammar: tables and recursive descent.
//!
//! ```text
//! Goal → Program | Unit | StmtList
//! Program → ProgHeader Decls Compound '.'
//! Unit → UnitHeader 'interface' Decls 'implementation' Decls InitSection '.'
//! Expr → AddExpr [RelOp AddExpr] → MulExpr {AddOp MulExpr}
//!      → Unary {MulOp Unary} → ['not' | '-' | '+'] Factor
//! ```
//!
//! Lists are left-recursive, as a table-driven engine would produce them.

use crate::grammars::kit::{self, Cursor, Grammar, Parse, rule_kinds};
use crate::parser::{GrammarTables, SymbolKind, TableVersion, Token};

use super::lexer::{self, TERMINALS};

rule_kinds! {
    Program: "<Program>" => ["<ProgHeader>", "<Decls>", "<Compound>", "."],
    ProgHeader: "<ProgHeader>" => ["program", "Id", "<OptProgParams>", ";"],
    ProgParams: "<OptProgParams>" => ["(", "<IdList>", ")"],
    NoProgParams: "<OptProgParams>" => [],
    Unit: "<Unit>" => ["<UnitHeader>", "interface", "<Decls>", "implementation", "<Decls>", "<InitSection>", "."],
    UnitHeader: "<UnitHeader>" => ["unit", "Id", ";"],
    InitEnd: "<InitSection>" => ["end"],
    InitBegin: "<InitSection>" => ["begin", "<StmtList>", "end"],
    InitInitialization: "<InitSection>" => ["initialization", "<StmtList>", "end"],
    Decls: "<Decls>" => ["<Decls>", "<Decl>"],
    NoDecls: "<Decls>" => [],
    Uses: "<UsesClause>" => ["uses", "<IdList>", ";"],
    IdList: "<IdList>" => ["<IdList>", ",", "Id"],
    IdSingle: "<IdList>" => ["Id"],
    VarSection: "<VarSection>" => ["var", "<VarDecls>"],
    VarDecls: "<VarDecls>" => ["<VarDecls>", "<VarDecl>"],
    VarDecl: "<VarDecl>" => ["<IdList>", ":", "<TypeSpec>", ";"],
    VarDeclInit: "<VarDecl>" => ["<IdList>", ":", "<TypeSpec>", "=", "<Initializer>", ";"],
    ConstSection: "<ConstSection>" => ["const", "<ConstDecls>"],
    ConstDecls: "<ConstDecls>" => ["<ConstDecls>", "<ConstDecl>"],
    ConstDecl: "<ConstDecl>" => ["Id", "=", "<Expr>", ";"],
    TypedConstDecl: "<ConstDecl>" => ["Id", ":", "<TypeSpec>", "=", "<Initializer>", ";"],
    TypeSection: "<TypeSection>" => ["type", "<TypeDecls>"],
    TypeDecls: "<TypeDecls>" => ["<TypeDecls>", "<TypeDecl>"],
    TypeDecl: "<TypeDecl>" => ["Id", "=", "<TypeSpec>", ";"],
    TypeSpec: "<TypeSpec>" => ["Id"],
    Initializer: "<Initializer>" => ["Id"],
    ProcDecl: "<ProcDecl>" => ["<ProcHeading>", "<Decls>", "<Compound>", ";"],
    ProcForward: "<ProcDecl>" => ["<ProcHeading>", "forward", ";"],
    FuncDecl: "<FuncDecl>" => ["<FuncHeading>", "<Decls>", "<Compound>", ";"],
    FuncForward: "<FuncDecl>" => ["<FuncHeading>", "forward", ";"],
    ProcHeading: "<ProcHeading>" => ["procedure", "Id", "<OptParams>", ";"],
    FuncHeading: "<FuncHeading>" => ["function", "Id", "<OptParams>", ":", "<TypeSpec>", ";"],
    Params: "<OptParams>" => ["(", "<ParamGroups>", ")"],
    NoParams: "<OptParams>" => [],
    ParamGroups: "<ParamGroups>" => ["<ParamGroups>", ";", "<ParamGroup>"],
    ParamGroup: "<ParamGroup>" => ["<IdList>", ":", "<TypeSpec>"],
    ParamVar: "<ParamGroup>" => ["var", "<IdList>", ":", "<TypeSpec>"],
    ParamConst: "<ParamGroup>" => ["const", "<IdList>", ":", "<TypeSpec>"],
    ParamOut: "<ParamGroup>" => ["out", "<IdList>", ":", "<TypeSpec>"],
    Compound: "<Compound>" => ["begin", "<StmtList>", "end"],
    StmtList: "<StmtList>" => ["<StmtList>", ";", "<Stmt>"],
    EmptyStmt: "<Stmt>" => [],
    Assign: "<AssignStmt>" => ["<Designator>", ":=", "<Expr>"],
    IfThen: "<IfStmt>" => ["if", "<Expr>", "then", "<Stmt>"],
    IfThenElse: "<IfStmt>" => ["if", "<Expr>", "then", "<Stmt>", "else", "<Stmt>"],
    While: "<WhileStmt>" => ["while", "<Expr>", "do", "<Stmt>"],
    Repeat: "<RepeatStmt>" => ["repeat", "<StmtList>", "until", "<Expr>"],
    ForTo: "<ForStmt>" => ["for", "Id", ":=", "<Expr>", "to", "<Expr>", "do", "<Stmt>"],
    ForDownTo: "<ForStmt>" => ["for", "Id", ":=", "<Expr>", "downto", "<Expr>", "do", "<Stmt>"],
    ForIn: "<ForStmt>" => ["for", "Id", "in", "<Expr>", "do", "<Stmt>"],
    Case: "<CaseStmt>" => ["case", "<Expr>", "of", "<CaseList>", "end"],
    CaseElse: "<CaseStmt>" => ["case", "<Expr>", "of", "<CaseList>", "else", "<StmtList>", "end"],
    CaseOtherwise: "<CaseStmt>" => ["case", "<Expr>", "of", "<CaseList>", "otherwise", "<StmtList>", "end"],
    CaseList: "<CaseList>" => ["<CaseList>", ";", "<CaseItem>"],
    CaseListSemi: "<CaseList>" => ["<CaseList>", ";"],
    CaseItem: "<CaseItem>" => ["<CaseLabels>", ":", "<Stmt>"],
    CaseLabels: "<CaseLabels>" => ["<CaseLabels>", ",", "<CaseLabel>"],
    Range: "<Range>" => ["<Expr>", "..", "<Expr>"],
    DesignatorId: "<Designator>" => ["Id"],
    DesignatorCall: "<Designator>" => ["<Designator>", "(", "<ExprList>", ")"],
    DesignatorEmptyCall: "<Designator>" => ["<Designator>", "(", ")"],
    DesignatorIndex: "<Designator>" => ["<Designator>", "[", "<ExprList>", "]"],
    DesignatorField: "<Designator>" => ["<Designator>", ".", "Id"],
    DesignatorDeref: "<Designator>" => ["<Designator>", "^"],
    ExprList: "<ExprList>" => ["<ExprList>", ",", "<Expr>"],
    ExprEq: "<Expr>" => ["<AddExpr>", "=", "<AddExpr>"],
    ExprNe: "<Expr>" => ["<AddExpr>", "<>", "<AddExpr>"],
    ExprLt: "<Expr>" => ["<AddExpr>", "<", "<AddExpr>"],
    ExprLe: "<Expr>" => ["<AddExpr>", "<=", "<AddExpr>"],
    ExprGt: "<Expr>" => ["<AddExpr>", ">", "<AddExpr>"],
    ExprGe: "<Expr>" => ["<AddExpr>", ">=", "<AddExpr>"],
    ExprIn: "<Expr>" => ["<AddExpr>", "in", "<AddExpr>"],
    AddPlus: "<AddExpr>" => ["<AddExpr>", "+", "<MulExpr>"],
    AddMinus: "<AddExpr>" => ["<AddExpr>", "-", "<MulExpr>"],
    AddOr: "<AddExpr>" => ["<AddExpr>", "or", "<MulExpr>"],
    AddXor: "<AddExpr>" => ["<AddExpr>", "xor", "<MulExpr>"],
    MulStar: "<MulExpr>" => ["<MulExpr>", "*", "<Unary>"],
    MulSlash: "<MulExpr>" => ["<MulExpr>", "/", "<Unary>"],
    MulDiv: "<MulExpr>" => ["<MulExpr>", "div", "<Unary>"],
    MulMod: "<MulExpr>" => ["<MulExpr>", "mod", "<Unary>"],
    MulAnd: "<MulExpr>" => ["<MulExpr>", "and", "<Unary>"],
    MulShl: "<MulExpr>" => ["<MulExpr>", "shl", "<Unary>"],
    MulShr: "<MulExpr>" => ["<MulExpr>", "shr", "<Unary>"],
    NegNot: "<Unary>" => ["not", "<Unary>"],
    NegMinus: "<Unary>" => ["-", "<Unary>"],
    NegPlus: "<Unary>" => ["+", "<Unary>"],
    Paren: "<Factor>" => ["(", "<Expr>", ")"],
    AddressOf: "<Factor>" => ["@", "<Designator>"],
    ValueDec: "<Value>" => ["DecLiteral"],
    ValueReal: "<Value>" => ["RealLiteral"],
    ValueHex: "<Value>" => ["HexLiteral"],
    ValueString: "<Value>" => ["StringLiteral"],
    ValueNil: "<Value>" => ["nil"],
    SetLiteral: "<SetLiteral>" => ["[", "<ExprList>", "]"],
    EmptySet: "<SetLiteral>" => ["[", "]"],
}

impl RuleKind {
    /// Rules that make up a statement of their own.
    pub fn is_statement(self) -> bool {
        use RuleKind::*;
        matches!(
            self,
            Assign
                | IfThen
                | IfThenElse
                | While
                | Repeat
                | ForTo
                | ForDownTo
                | ForIn
                | Case
                | CaseElse
                | CaseOtherwise
                | CaseItem
                | Compound
                | VarDecl
                | VarDeclInit
                | ConstDecl
                | TypedConstDecl
                | ProcDecl
                | FuncDecl
        )
    }

    /// Left-recursive list rules.
    pub fn is_list(self) -> bool {
        use RuleKind::*;
        matches!(
            self,
            Decls | IdList | VarDecls | ConstDecls | TypeDecls | ParamGroups | StmtList | CaseList | CaseListSemi
                | CaseLabels | ExprList
        )
    }
}

/// The Pascal dialect.
pub struct Pascal;

impl Grammar for Pascal {
    fn tables() -> GrammarTables {
        kit::build_tables(
            "Pascal",
            TableVersion::V1,
            &[
                ("Whitespace", SymbolKind::Noise),
                ("NewLine", SymbolKind::Noise),
                ("Comment", SymbolKind::Noise),
                ("//", SymbolKind::CommentLine),
                ("{", SymbolKind::GroupStart),
                ("}", SymbolKind::GroupEnd),
            ],
            TERMINALS,
            RuleKind::ALL.iter().map(|kind| (kind.head(), kind.body())),
        )
    }

    fn lex(source: &str) -> Vec<kit::Lexeme<'_>> {
        lexer::lex(source)
    }

    fn goal(c: &mut Cursor<'_, '_>) -> Parse<Token> {
        if c.at("program") {
            program(c)
        } else if c.at("unit") {
            unit(c)
        } else {
            statement_list(c)
        }
    }
}

type Parser = fn(&mut Cursor<'_, '_>) -> Parse<Token>;

fn reduce(c: &mut Cursor<'_, '_>, kind: RuleKind, tokens: Vec<Token>) -> Token {
    c.reduce(kind.index(), tokens)
}

// ============================================================================
// Program structure
// ============================================================================

fn program(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let program = c.expect("program")?;
    let name = c.expect("Id")?;
    let params = if c.at("(") {
        let open = c.bump();
        let ids = id_list(c)?;
        let close = c.expect(")")?;
        reduce(c, RuleKind::ProgParams, vec![open, ids, close])
    } else {
        reduce(c, RuleKind::NoProgParams, Vec::new())
    };
    let semi = c.expect(";")?;
    let header = reduce(c, RuleKind::ProgHeader, vec![program, name, params, semi]);
    let decls = declarations(c, false)?;
    let body = compound(c)?;
    let dot = c.expect(".")?;
    Ok(reduce(c, RuleKind::Program, vec![header, decls, body, dot]))
}

fn unit(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("unit")?;
    let name = c.expect("Id")?;
    let semi = c.expect(";")?;
    let header = reduce(c, RuleKind::UnitHeader, vec![keyword, name, semi]);
    let interface = c.expect("interface")?;
    let exported = declarations(c, true)?;
    let implementation = c.expect("implementation")?;
    let decls = declarations(c, false)?;
    let init = if c.at("begin") || c.at("initialization") {
        let kind = if c.at("begin") {
            RuleKind::InitBegin
        } else {
            RuleKind::InitInitialization
        };
        let open = c.bump();
        let statements = statement_list(c)?;
        let end = c.expect("end")?;
        reduce(c, kind, vec![open, statements, end])
    } else {
        let end = c.expect("end")?;
        reduce(c, RuleKind::InitEnd, vec![end])
    };
    let dot = c.expect(".")?;
    Ok(reduce(
        c,
        RuleKind::Unit,
        vec![header, interface, exported, implementation, decls, init, dot],
    ))
}

/// Declaration sections; in a unit interface routines are headings only.
fn declarations(c: &mut Cursor<'_, '_>, headings_only: bool) -> Parse<Token> {
    let mut decls = reduce(c, RuleKind::NoDecls, Vec::new());
    loop {
        let decl = if c.at("uses") {
            uses_clause(c)?
        } else if c.at("var") {
            section(c, RuleKind::VarSection, RuleKind::VarDecls, var_decl)?
        } else if c.at("const") {
            section(c, RuleKind::ConstSection, RuleKind::ConstDecls, const_decl)?
        } else if c.at("type") {
            section(c, RuleKind::TypeSection, RuleKind::TypeDecls, type_decl)?
        } else if c.at("procedure") || c.at("function") {
            routine(c, headings_only)?
        } else {
            return Ok(decls);
        };
        decls = reduce(c, RuleKind::Decls, vec![decls, decl]);
    }
}

fn uses_clause(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let uses = c.expect("uses")?;
    let ids = id_list(c)?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::Uses, vec![uses, ids, semi]))
}

/// `keyword item+` where every item starts with an identifier.
fn section(c: &mut Cursor<'_, '_>, kind: RuleKind, list: RuleKind, item: Parser) -> Parse<Token> {
    let keyword = c.bump();
    let mut items = item(c)?;
    while c.at("Id") {
        let next = item(c)?;
        items = reduce(c, list, vec![items, next]);
    }
    Ok(reduce(c, kind, vec![keyword, items]))
}

fn var_decl(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let ids = id_list(c)?;
    let colon = c.expect(":")?;
    let spec = raw_run(c, RuleKind::TypeSpec, &[";", "="])?;
    if c.at("=") {
        let equals = c.bump();
        let value = raw_run(c, RuleKind::Initializer, &[";"])?;
        let semi = c.expect(";")?;
        return Ok(reduce(c, RuleKind::VarDeclInit, vec![ids, colon, spec, equals, value, semi]));
    }
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::VarDecl, vec![ids, colon, spec, semi]))
}

fn const_decl(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let name = c.expect("Id")?;
    if c.at(":") {
        let colon = c.bump();
        let spec = raw_run(c, RuleKind::TypeSpec, &["="])?;
        let equals = c.expect("=")?;
        let value = raw_run(c, RuleKind::Initializer, &[";"])?;
        let semi = c.expect(";")?;
        return Ok(reduce(c, RuleKind::TypedConstDecl, vec![name, colon, spec, equals, value, semi]));
    }
    let equals = c.expect("=")?;
    let value = expression(c)?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::ConstDecl, vec![name, equals, value, semi]))
}

fn type_decl(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let name = c.expect("Id")?;
    let equals = c.expect("=")?;
    let spec = raw_run(c, RuleKind::TypeSpec, &[";"])?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::TypeDecl, vec![name, equals, spec, semi]))
}

/// Type denoters and typed-constant values are not analysed: the
/// reduction holds the token run up to a stop symbol at nesting level 0.
fn raw_run(c: &mut Cursor<'_, '_>, kind: RuleKind, stops: &[&str]) -> Parse<Token> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    loop {
        let name = c.current().name.clone();
        let name = name.as_str();
        if name == "EOF" || (depth == 0 && stops.contains(&name)) {
            break;
        }
        match name {
            "(" | "[" | "record" => depth += 1,
            ")" | "]" | "end" if depth == 0 => break,
            ")" | "]" | "end" => depth -= 1,
            _ => {}
        }
        tokens.push(c.bump());
    }
    if tokens.is_empty() {
        c.at("Id");
        return c.unexpected();
    }
    Ok(reduce(c, kind, tokens))
}

fn routine(c: &mut Cursor<'_, '_>, heading_only: bool) -> Parse<Token> {
    let function = c.at("function");
    let heading = if function { function_heading(c)? } else { procedure_heading(c)? };
    if heading_only {
        return Ok(heading);
    }
    let (declared, forward) = if function {
        (RuleKind::FuncDecl, RuleKind::FuncForward)
    } else {
        (RuleKind::ProcDecl, RuleKind::ProcForward)
    };
    if c.at("forward") {
        let keyword = c.bump();
        let semi = c.expect(";")?;
        return Ok(reduce(c, forward, vec![heading, keyword, semi]));
    }
    let decls = declarations(c, false)?;
    let body = compound(c)?;
    let semi = c.expect(";")?;
    Ok(reduce(c, declared, vec![heading, decls, body, semi]))
}

fn procedure_heading(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("procedure")?;
    let name = c.expect("Id")?;
    let params = parameters(c)?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::ProcHeading, vec![keyword, name, params, semi]))
}

fn function_heading(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("function")?;
    let name = c.expect("Id")?;
    let params = parameters(c)?;
    let colon = c.expect(":")?;
    let result = raw_run(c, RuleKind::TypeSpec, &[";"])?;
    let semi = c.expect(";")?;
    Ok(reduce(c, RuleKind::FuncHeading, vec![keyword, name, params, colon, result, semi]))
}

fn parameters(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    if !c.at("(") {
        return Ok(reduce(c, RuleKind::NoParams, Vec::new()));
    }
    let open = c.bump();
    let mut groups = parameter_group(c)?;
    while c.at(";") {
        let semi = c.bump();
        let next = parameter_group(c)?;
        groups = reduce(c, RuleKind::ParamGroups, vec![groups, semi, next]);
    }
    let close = c.expect(")")?;
    Ok(reduce(c, RuleKind::Params, vec![open, groups, close]))
}

fn parameter_group(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mode = if c.at("var") {
        Some((RuleKind::ParamVar, c.bump()))
    } else if c.at("const") {
        Some((RuleKind::ParamConst, c.bump()))
    } else if c.at("out") {
        Some((RuleKind::ParamOut, c.bump()))
    } else {
        None
    };
    let ids = id_list(c)?;
    let colon = c.expect(":")?;
    let spec = raw_run(c, RuleKind::TypeSpec, &[";", ")"])?;
    Ok(match mode {
        Some((kind, keyword)) => reduce(c, kind, vec![keyword, ids, colon, spec]),
        None => reduce(c, RuleKind::ParamGroup, vec![ids, colon, spec]),
    })
}

fn id_list(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let first = c.expect("Id")?;
    let mut ids = reduce(c, RuleKind::IdSingle, vec![first]);
    while c.at(",") {
        let comma = c.bump();
        let id = c.expect("Id")?;
        ids = reduce(c, RuleKind::IdList, vec![ids, comma, id]);
    }
    Ok(ids)
}

// ============================================================================
// Statements
// ============================================================================

fn compound(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let begin = c.expect("begin")?;
    let statements = statement_list(c)?;
    let end = c.expect("end")?;
    Ok(reduce(c, RuleKind::Compound, vec![begin, statements, end]))
}

fn statement_list(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut list = statement(c)?;
    while c.at(";") {
        let semi = c.bump();
        let next = statement(c)?;
        list = reduce(c, RuleKind::StmtList, vec![list, semi, next]);
    }
    Ok(list)
}

fn statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    c.nested(|c| {
        if c.at("begin") {
            compound(c)
        } else if c.at("if") {
            if_statement(c)
        } else if c.at("while") {
            while_statement(c)
        } else if c.at("repeat") {
            repeat_statement(c)
        } else if c.at("for") {
            for_statement(c)
        } else if c.at("case") {
            case_statement(c)
        } else if c.at("Id") {
            simple_statement(c)
        } else {
            Ok(reduce(c, RuleKind::EmptyStmt, Vec::new()))
        }
    })
}

/// Assignment or procedure call.
fn simple_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let target = designator(c)?;
    if c.at(":=") {
        let op = c.bump();
        let value = expression(c)?;
        return Ok(reduce(c, RuleKind::Assign, vec![target, op, value]));
    }
    Ok(target)
}

fn if_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("if")?;
    let condition = expression(c)?;
    let then = c.expect("then")?;
    let on_true = statement(c)?;
    if c.at("else") {
        let otherwise = c.bump();
        let on_false = statement(c)?;
        return Ok(reduce(
            c,
            RuleKind::IfThenElse,
            vec![keyword, condition, then, on_true, otherwise, on_false],
        ));
    }
    Ok(reduce(c, RuleKind::IfThen, vec![keyword, condition, then, on_true]))
}

fn while_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("while")?;
    let condition = expression(c)?;
    let body_start = c.expect("do")?;
    let body = statement(c)?;
    Ok(reduce(c, RuleKind::While, vec![keyword, condition, body_start, body]))
}

fn repeat_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("repeat")?;
    let body = statement_list(c)?;
    let until = c.expect("until")?;
    let condition = expression(c)?;
    Ok(reduce(c, RuleKind::Repeat, vec![keyword, body, until, condition]))
}

fn for_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("for")?;
    let var = c.expect("Id")?;
    if c.at("in") {
        let within = c.bump();
        let list = expression(c)?;
        let body_start = c.expect("do")?;
        let body = statement(c)?;
        return Ok(reduce(c, RuleKind::ForIn, vec![keyword, var, within, list, body_start, body]));
    }
    let assign = c.expect(":=")?;
    let start = expression(c)?;
    let kind = if c.at("to") {
        RuleKind::ForTo
    } else if c.at("downto") {
        RuleKind::ForDownTo
    } else {
        return c.unexpected();
    };
    let direction = c.bump();
    let end = expression(c)?;
    let body_start = c.expect("do")?;
    let body = statement(c)?;
    Ok(reduce(c, kind, vec![keyword, var, assign, start, direction, end, body_start, body]))
}

fn case_statement(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let keyword = c.expect("case")?;
    let selector = expression(c)?;
    let of = c.expect("of")?;
    let mut items = case_item(c)?;
    while c.at(";") {
        let semi = c.bump();
        if c.at("end") || c.at("else") || c.at("otherwise") {
            items = reduce(c, RuleKind::CaseListSemi, vec![items, semi]);
            break;
        }
        let next = case_item(c)?;
        items = reduce(c, RuleKind::CaseList, vec![items, semi, next]);
    }
    let default = if c.at("else") {
        Some(RuleKind::CaseElse)
    } else if c.at("otherwise") {
        Some(RuleKind::CaseOtherwise)
    } else {
        None
    };
    if let Some(kind) = default {
        let otherwise = c.bump();
        let statements = statement_list(c)?;
        let end = c.expect("end")?;
        return Ok(reduce(c, kind, vec![keyword, selector, of, items, otherwise, statements, end]));
    }
    let end = c.expect("end")?;
    Ok(reduce(c, RuleKind::Case, vec![keyword, selector, of, items, end]))
}

fn case_item(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut labels = range_or_expression(c)?;
    while c.at(",") {
        let comma = c.bump();
        let next = range_or_expression(c)?;
        labels = reduce(c, RuleKind::CaseLabels, vec![labels, comma, next]);
    }
    let colon = c.expect(":")?;
    let body = statement(c)?;
    Ok(reduce(c, RuleKind::CaseItem, vec![labels, colon, body]))
}

fn range_or_expression(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let low = expression(c)?;
    if c.at("..") {
        let dots = c.bump();
        let high = expression(c)?;
        return Ok(reduce(c, RuleKind::Range, vec![low, dots, high]));
    }
    Ok(low)
}

fn designator(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let name = c.expect("Id")?;
    let mut target = reduce(c, RuleKind::DesignatorId, vec![name]);
    loop {
        target = if c.at("(") {
            let open = c.bump();
            if c.at(")") {
                let close = c.bump();
                reduce(c, RuleKind::DesignatorEmptyCall, vec![target, open, close])
            } else {
                let args = expression_list(c, expression)?;
                let close = c.expect(")")?;
                reduce(c, RuleKind::DesignatorCall, vec![target, open, args, close])
            }
        } else if c.at("[") {
            let open = c.bump();
            let index = expression_list(c, expression)?;
            let close = c.expect("]")?;
            reduce(c, RuleKind::DesignatorIndex, vec![target, open, index, close])
        } else if c.at(".") && c.nth_is(1, "Id") {
            let dot = c.bump();
            let field = c.bump();
            reduce(c, RuleKind::DesignatorField, vec![target, dot, field])
        } else if c.at("^") {
            let caret = c.bump();
            reduce(c, RuleKind::DesignatorDeref, vec![target, caret])
        } else {
            return Ok(target);
        };
    }
}

fn expression_list(c: &mut Cursor<'_, '_>, item: Parser) -> Parse<Token> {
    let mut list = item(c)?;
    while c.at(",") {
        let comma = c.bump();
        let next = item(c)?;
        list = reduce(c, RuleKind::ExprList, vec![list, comma, next]);
    }
    Ok(list)
}

// ============================================================================
// Expressions
// ============================================================================

const RELATIONAL: &[(&str, RuleKind)] = &[
    ("=", RuleKind::ExprEq),
    ("<>", RuleKind::ExprNe),
    ("<", RuleKind::ExprLt),
    ("<=", RuleKind::ExprLe),
    (">", RuleKind::ExprGt),
    (">=", RuleKind::ExprGe),
    ("in", RuleKind::ExprIn),
];

const ADDITIVE: &[(&str, RuleKind)] = &[
    ("+", RuleKind::AddPlus),
    ("-", RuleKind::AddMinus),
    ("or", RuleKind::AddOr),
    ("xor", RuleKind::AddXor),
];

const MULTIPLICATIVE: &[(&str, RuleKind)] = &[
    ("*", RuleKind::MulStar),
    ("/", RuleKind::MulSlash),
    ("div", RuleKind::MulDiv),
    ("mod", RuleKind::MulMod),
    ("and", RuleKind::MulAnd),
    ("shl", RuleKind::MulShl),
    ("shr", RuleKind::MulShr),
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
        let left = additive(c)?;
        match operator_at(c, RELATIONAL) {
            Some(kind) => {
                let op = c.bump();
                let right = additive(c)?;
                Ok(reduce(c, kind, vec![left, op, right]))
            }
            None => Ok(left),
        }
    })
}

fn additive(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut left = multiplicative(c)?;
    while let Some(kind) = operator_at(c, ADDITIVE) {
        let op = c.bump();
        let right = multiplicative(c)?;
        left = reduce(c, kind, vec![left, op, right]);
    }
    Ok(left)
}

fn multiplicative(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let mut left = unary(c)?;
    while let Some(kind) = operator_at(c, MULTIPLICATIVE) {
        let op = c.bump();
        let right = unary(c)?;
        left = reduce(c, kind, vec![left, op, right]);
    }
    Ok(left)
}

fn unary(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let kind = if c.at("not") {
        RuleKind::NegNot
    } else if c.at("-") {
        RuleKind::NegMinus
    } else if c.at("+") {
        RuleKind::NegPlus
    } else {
        return factor(c);
    };
    let op = c.bump();
    let operand = c.nested(unary)?;
    Ok(reduce(c, kind, vec![op, operand]))
}

fn factor(c: &mut Cursor<'_, '_>) -> Parse<Token> {
    let literal = [
        ("DecLiteral", RuleKind::ValueDec),
        ("RealLiteral", RuleKind::ValueReal),
        ("HexLiteral", RuleKind::ValueHex),
        ("StringLiteral", RuleKind::ValueString),
        ("nil", RuleKind::ValueNil),
    ];
    if let Some(kind) = operator_at(c, &literal) {
        let value = c.bump();
        return Ok(reduce(c, kind, vec![value]));
    }
    if c.at("(") {
        let open = c.bump();
        let inner = expression(c)?;
        let close = c.expect(")")?;
        return Ok(reduce(c, RuleKind::Paren, vec![open, inner, close]));
    }
    if c.at("[") {
        let open = c.bump();
        if c.at("]") {
            let close = c.bump();
            return Ok(reduce(c, RuleKind::EmptySet, vec![open, close]));
        }
        let elements = expression_list(c, range_or_expression)?;
        let close = c.expect("]")?;
        return Ok(reduce(c, RuleKind::SetLiteral, vec![open, elements, close]));
    }
    if c.at("@") {
        let at = c.bump();
        let target = designator(c)?;
        return Ok(reduce(c, RuleKind::AddressOf, vec![at, target]));
    }
    if c.at("Id") {
        return designator(c);
    }
    c.unexpected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::kit::Engine;
    use crate::parser::{ParseEngine, TokenSink};

    struct Ignore;

    impl TokenSink for Ignore {
        fn token_read(&mut self, _token: &Token, _tables: &GrammarTables) {}
    }

    fn parse(source: &str) -> (Engine<Pascal>, bool) {
        let mut engine = Engine::<Pascal>::new();
        let ok = engine.parse_source_statements(source, &mut Ignore).unwrap();
        (engine, ok)
    }

    fn top_kind(engine: &Engine<Pascal>) -> Option<RuleKind> {
        let rule = engine.current_reduction()?.rule;
        RuleKind::resolve(engine.tables())[rule]
    }

    #[test]
    fn test_rule_kinds_resolve_to_themselves() {
        let tables = Pascal::tables();
        let kinds = RuleKind::resolve(&tables);
        for kind in RuleKind::ALL {
            assert_eq!(kinds[kind.index()], Some(*kind), "{kind:?}");
        }
    }

    #[test]
    fn test_bare_statement_is_the_goal() {
        let (engine, ok) = parse("if x > 0 then y := 1 else y := 2");
        assert!(ok, "{}", engine.error_message());
        assert_eq!(top_kind(&engine), Some(RuleKind::IfThenElse));
    }

    #[test]
    fn test_program_with_routines() {
        let source = "program demo;\nvar i: integer;\nprocedure hello(n: integer);\nbegin\n  writeln(n)\nend;\nbegin\n  hello(3)\nend.";
        let (engine, ok) = parse(source);
        assert!(ok, "{}", engine.error_message());
        assert_eq!(top_kind(&engine), Some(RuleKind::Program));
    }

    #[test]
    fn test_unit_with_interface_headings() {
        let source = "unit tools;\ninterface\nfunction twice(x: integer): integer;\nimplementation\nfunction twice(x: integer): integer;\nbegin\n  twice := 2 * x\nend;\nend.";
        let (engine, ok) = parse(source);
        assert!(ok, "{}", engine.error_message());
        assert_eq!(top_kind(&engine), Some(RuleKind::Unit));
    }

    #[test]
    fn test_case_with_trailing_semicolon_and_else() {
        let (engine, ok) = parse("case k of 1, 2: a := 1; 3..5: a := 2; else a := 0 end");
        assert!(ok, "{}", engine.error_message());
        assert_eq!(top_kind(&engine), Some(RuleKind::CaseElse));
    }

    #[test]
    fn test_missing_then_is_reported() {
        let (engine, ok) = parse("if x > 0 y := 1");
        assert!(!ok);
        assert!(engine.error_message().starts_with("Syntax error at line 1, column 10"));
        let expected: Vec<String> = engine.expected_symbols().iter().map(|symbol| symbol.name.to_string()).collect();
        assert!(expected.contains(&"then".to_string()));
    }
}
