//! C reductions to diagrams.
//!
//! ```text
//! TranslationUnit ─┬─ FuncDef main   ─► main diagram (named after the file)
//!                  ├─ FuncDef other  ─► subroutine diagram `name(params)`
//!                  ├─ Declaration    ─► "<file>Globals" includable diagram
//!                  └─ Stmt           ─► main diagram
//! ```

use rustc_hash::FxHashSet;

use super::grammar::{C, RuleKind};
use super::preprocess::CPreprocessor;
use crate::config::KeywordKey;
use crate::diagram::{CaseBranches, Color, Element, ForLoop, Root, Subqueue};
use crate::grammars::compose::{Composer, Pad};
use crate::grammars::kit::Engine;
use crate::import::comments::CommentDelimiters;
use crate::import::{BuildError, CodeImporter, ImportSession, Preprocessor};
use crate::parser::{GrammarTables, Reduction, Token};

const PADS: &[(&str, Pad)] = &[
    ("=", Pad::Both),
    ("==", Pad::Both),
    ("!=", Pad::Both),
    ("<", Pad::Both),
    (">", Pad::Both),
    ("<=", Pad::Both),
    (">=", Pad::Both),
    ("+", Pad::Both),
    ("-", Pad::Both),
    ("*", Pad::Both),
    ("/", Pad::Both),
    ("%", Pad::Both),
    ("&&", Pad::Both),
    ("||", Pad::Both),
    ("<<", Pad::Both),
    (">>", Pad::Both),
    ("&", Pad::Both),
    ("|", Pad::Both),
    ("^", Pad::Both),
    ("?", Pad::Both),
    (":", Pad::Both),
    ("!", Pad::Both),
    (",", Pad::After),
    (";", Pad::After),
];

const TRANSLATIONS: &[(&str, &str)] = &[
    ("!", "not"),
    ("%", "mod"),
    ("&&", "and"),
    ("||", "or"),
    ("<<", "shl"),
    (">>", "shr"),
    ("=", "<-"),
    ("==", "="),
    ("!=", "<>"),
];

const COMPOSER: Composer<'static> = Composer {
    pads: PADS,
    translations: TRANSLATIONS,
};

/// Importer for ANSI C sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct CImporter;

impl CImporter {
    fn globals_name(session: &ImportSession<'_>) -> String {
        format!("{}Globals", session.source_stem())
    }
}

impl CodeImporter for CImporter {
    type Engine = Engine<C>;

    fn name(&self) -> &'static str {
        "ANSI-C"
    }

    fn dialog_title(&self) -> &'static str {
        "ANSI-C Code Import"
    }

    fn file_description(&self) -> &'static str {
        "ANSI-C source files"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["c", "h"]
    }

    fn create_engine(&self) -> Self::Engine {
        Engine::new()
    }

    fn preprocessor(&self) -> &dyn Preprocessor {
        &CPreprocessor
    }

    fn terminal_translations(&self) -> &'static [(&'static str, &'static str)] {
        &[("UserTypeId", "<type name>"), ("Id", "<identifier>")]
    }

    fn comment_delimiters(&self) -> CommentDelimiters {
        &[("//", None), ("/*", Some("*/"))]
    }

    fn statement_rules(&self, tables: &GrammarTables) -> FxHashSet<usize> {
        RuleKind::resolve(tables)
            .into_iter()
            .enumerate()
            .filter_map(|(rule, kind)| kind.filter(|kind| kind.is_statement()).map(|_| rule))
            .collect()
    }

    fn build(&self, reduction: &Reduction, session: &mut ImportSession<'_>) -> Result<(), BuildError> {
        let mut synthesizer = Synthesizer {
            kinds: RuleKind::resolve(session.tables()),
            globals: Subqueue::new(),
        };
        let mut main = Subqueue::new();
        synthesizer.unit(session, reduction, &mut main)?;
        session.root.children.extend(main.into_elements());
        if !synthesizer.globals.is_empty() {
            let mut globals = Root::includable(&Self::globals_name(session));
            globals.children = synthesizer.globals;
            session.sub_roots.insert(0, globals);
        }
        restore_type_names(session);
        Ok(())
    }

    /// The main diagram is named after the file.
    fn update_root(&self, root: &mut Root, session: &ImportSession<'_>) -> bool {
        if root.is_program() {
            root.set_text(&session.source_stem());
        }
        false
    }

    /// Every other diagram depends on the globals diagram, if one was built.
    fn post_process(&self, session: &mut ImportSession<'_>) -> Result<(), BuildError> {
        let name = Self::globals_name(session);
        let has_globals = session
            .roots
            .iter()
            .any(|root| root.is_includable() && root.text_string() == name);
        if has_globals {
            for root in session.roots.iter_mut().filter(|root| !root.is_includable()) {
                root.add_include(&name);
            }
        }
        Ok(())
    }
}

/// Put the original type names back into all built text.
fn restore_type_names(session: &mut ImportSession<'_>) {
    if session.replacements.is_empty() {
        return;
    }
    let replacements = &session.replacements;
    let undo = |lines: &mut Vec<String>| {
        for line in lines.iter_mut() {
            *line = replacements.undo(line);
        }
    };
    for root in std::iter::once(&mut session.root).chain(session.sub_roots.iter_mut()) {
        undo(&mut root.text);
        root.walk_mut(&mut |element| undo(&mut element.text));
    }
}

/// What a declarator declares.
#[derive(Debug, Default)]
struct Declared {
    name: String,
    pointers: usize,
    dimensions: Vec<String>,
    parameters: Option<Vec<String>>,
}

impl Declared {
    fn type_text(&self, base: &str) -> String {
        let mut text = base.to_string();
        text.push_str(&"*".repeat(self.pointers));
        for dimension in &self.dimensions {
            text.push_str(&format!("[{dimension}]"));
        }
        text
    }
}

struct Synthesizer {
    kinds: Vec<Option<RuleKind>>,
    globals: Subqueue,
}

impl Synthesizer {
    fn kind(&self, reduction: &Reduction) -> Option<RuleKind> {
        self.kinds.get(reduction.rule).copied().flatten()
    }

    fn token_kind(&self, token: &Token) -> Option<RuleKind> {
        token.as_reduction().and_then(|reduction| self.kind(reduction))
    }

    fn is_list(&self, reduction: &Reduction) -> bool {
        self.kind(reduction).is_some_and(RuleKind::is_list)
    }

    /// Items of a left-recursive list, separators included, in source order.
    fn flatten<'r>(&self, reduction: &'r Reduction) -> Vec<&'r Token> {
        let mut tails: Vec<&'r [Token]> = Vec::new();
        let mut current = reduction;
        let first = loop {
            let Some((head, tail)) = current.tokens.split_first() else {
                break None;
            };
            tails.push(tail);
            match head.as_reduction() {
                Some(inner) if self.is_list(inner) => current = inner,
                _ => break Some(head),
            }
        };
        let mut items: Vec<&Token> = first.into_iter().collect();
        for tail in tails.iter().rev() {
            items.extend(tail.iter());
        }
        items
    }

    /// The items of a list token, or the token itself if it is no list.
    fn items<'r>(&self, token: &'r Token) -> Vec<&'r Token> {
        match token.as_reduction() {
            Some(list) if self.is_list(list) => self.flatten(list),
            _ => vec![token],
        }
    }

    // =========================================================================
    // Top level
    // =========================================================================

    fn unit(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        main: &mut Subqueue,
    ) -> Result<(), BuildError> {
        let items = if self.is_list(reduction) {
            self.flatten(reduction)
        } else {
            Vec::new()
        };
        for item in items.into_iter().filter_map(Token::as_reduction) {
            session.check_cancelled()?;
            match self.kind(item) {
                Some(RuleKind::FuncDef) => self.function(session, item, main)?,
                Some(RuleKind::Declaration) => {
                    let mut globals = std::mem::take(&mut self.globals);
                    self.declaration(session, item, true, &mut globals);
                    self.globals = globals;
                }
                _ => self.build(session, item, main)?,
            }
        }
        Ok(())
    }

    fn function(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        main: &mut Subqueue,
    ) -> Result<(), BuildError> {
        let declared = reduction
            .token(1)
            .map(|token| self.declarator(token))
            .unwrap_or_default();
        if declared.name == "main" {
            return self.build_child(session, reduction, 2, main);
        }
        let parameters = declared.parameters.clone().unwrap_or_default();
        let mut root = Root::subroutine(&format!("{}({})", declared.name, parameters.join(", ")));
        if let Some(comment) = session.comment_for(reduction) {
            root.set_comment(&comment);
        }
        let mut body = Subqueue::new();
        self.build_child(session, reduction, 2, &mut body)?;
        root.children = body;
        session.add_sub_root(root);
        Ok(())
    }

    fn declarator(&self, token: &Token) -> Declared {
        let mut declared = Declared::default();
        self.analyze_declarator(token, &mut declared);
        declared
    }

    fn analyze_declarator(&self, token: &Token, declared: &mut Declared) {
        let Some(reduction) = token.as_reduction() else {
            if token.name == "Id" {
                declared.name = token.text().to_string();
            }
            return;
        };
        match self.kind(reduction) {
            Some(RuleKind::DeclId) => declared.name = reduction.lexeme(0).unwrap_or_default().to_string(),
            Some(RuleKind::PointerDecl) => {
                declared.pointers += 1;
                if let Some(inner) = reduction.tokens.last() {
                    self.analyze_declarator(inner, declared);
                }
            }
            Some(RuleKind::ParenDecl) => {
                if let Some(inner) = reduction.token(1) {
                    self.analyze_declarator(inner, declared);
                }
            }
            Some(RuleKind::ArrayDecl | RuleKind::OpenArrayDecl) => {
                if let Some(inner) = reduction.token(0) {
                    self.analyze_declarator(inner, declared);
                }
                let size = if reduction.token_count() == 4 {
                    COMPOSER.compose_child(reduction, 2)
                } else {
                    String::new()
                };
                declared.dimensions.push(size);
            }
            Some(RuleKind::FuncDecl | RuleKind::NoParamsDecl) => {
                if let Some(inner) = reduction.token(0) {
                    self.analyze_declarator(inner, declared);
                }
                let parameters = match reduction.token(2) {
                    Some(list) if reduction.token_count() == 4 => self
                        .items(list)
                        .into_iter()
                        .filter(|item| item.name != ",")
                        .map(|item| self.parameter_text(item))
                        .collect(),
                    _ => Vec::new(),
                };
                declared.parameters.get_or_insert(parameters);
            }
            _ => {}
        }
    }

    /// `int *p` rather than the composed `int*p`.
    fn parameter_text(&self, token: &Token) -> String {
        match token.as_reduction() {
            Some(param) if self.kind(param) == Some(RuleKind::Param) => {
                let base = COMPOSER.compose_child(param, 0);
                let declared = param.token(1).map(|token| self.declarator(token)).unwrap_or_default();
                let stars = "*".repeat(declared.pointers);
                let dimensions: String = declared.dimensions.iter().map(|size| format!("[{size}]")).collect();
                format!("{base} {stars}{}{dimensions}", declared.name)
            }
            _ => COMPOSER.compose_token(token),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declaration(&self, session: &ImportSession<'_>, reduction: &Reduction, global: bool, parent: &mut Subqueue) {
        let Some(specifiers) = reduction.child(0) else {
            return;
        };
        let mut is_const = false;
        specifiers.for_each_terminal(&mut |token| is_const |= token.name == "const");
        let base = COMPOSER.compose(specifiers);
        let import_var_decl = session.options.import_var_decl;
        let mut elements = Vec::new();
        for item in reduction.token(1).map(|list| self.items(list)).unwrap_or_default() {
            if item.name == "," {
                continue;
            }
            let (target, value) = match item.as_reduction() {
                Some(init) if self.kind(init) == Some(RuleKind::InitDecl) => {
                    (init.token(0), Some(COMPOSER.compose_child(init, 2)))
                }
                _ => (Some(item), None),
            };
            let declared = target.map(|target| self.declarator(target)).unwrap_or_default();
            if declared.parameters.is_some() || declared.name.is_empty() {
                continue;
            }
            let text = match value {
                Some(value) if is_const && import_var_decl => format!("const {} <- {value}", declared.name),
                Some(value) if import_var_decl => format!("{} {} <- {value}", declared.type_text(&base), declared.name),
                Some(value) => format!("{} <- {value}", declared.name),
                None if import_var_decl => format!("var {}: {}", declared.name, declared.type_text(&base)),
                None => continue,
            };
            let color = if is_const {
                Some(Color::CONST)
            } else if global {
                Some(Color::GLOBAL)
            } else if import_var_decl {
                Some(Color::DECL)
            } else {
                None
            };
            let mut element = Element::instruction(&text);
            element.color = color;
            elements.push(element);
        }
        if let Some(first) = elements.first_mut() {
            session.equip_with_comment(first, reduction);
        }
        parent.extend(elements);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn build_child(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        index: usize,
        parent: &mut Subqueue,
    ) -> Result<(), BuildError> {
        match reduction.child(index) {
            Some(child) => self.build(session, child, parent),
            None => Ok(()),
        }
    }

    fn build_body(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        index: usize,
    ) -> Result<Subqueue, BuildError> {
        let mut body = Subqueue::new();
        self.build_child(session, reduction, index, &mut body)?;
        Ok(body)
    }

    fn build(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        parent: &mut Subqueue,
    ) -> Result<(), BuildError> {
        session.check_cancelled()?;
        let Some(kind) = self.kind(reduction) else {
            return Ok(());
        };
        let keywords = &session.keywords;
        match kind {
            RuleKind::Declaration => self.declaration(session, reduction, false, parent),
            RuleKind::ExprStmt => {
                if let Some(expression) = reduction.token(0) {
                    let mut elements = self.expression_elements(session, expression);
                    if let Some(first) = elements.first_mut() {
                        session.equip_with_comment(first, reduction);
                    }
                    parent.extend(elements);
                }
            }
            RuleKind::If | RuleKind::IfElse => {
                let condition = self.condition(session, reduction, 2, KeywordKey::PreAlt, KeywordKey::PostAlt);
                let on_true = self.build_body(session, reduction, 4)?;
                let on_false = if kind == RuleKind::IfElse {
                    self.build_body(session, reduction, 6)?
                } else {
                    Subqueue::new()
                };
                self.emit(session, reduction, Element::alternative(&condition, on_true, on_false), parent);
            }
            RuleKind::While => {
                let condition = self.condition(session, reduction, 2, KeywordKey::PreWhile, KeywordKey::PostWhile);
                let body = self.build_body(session, reduction, 4)?;
                self.emit(session, reduction, Element::while_loop(&condition, body), parent);
            }
            RuleKind::DoWhile => {
                let negated = match reduction.child(4) {
                    Some(not) if self.kind(not) == Some(RuleKind::Not) => COMPOSER.compose_child(not, 1),
                    _ => format!("not ({})", COMPOSER.compose_child(reduction, 4)),
                };
                let insert = session.options.insert_opt_keywords;
                let condition = format!(
                    "{}{negated}{}",
                    keywords.get_opt(KeywordKey::PreRepeat, insert, false, true),
                    keywords.get_opt(KeywordKey::PostRepeat, insert, true, false)
                );
                let body = self.build_body(session, reduction, 1)?;
                self.emit(session, reduction, Element::repeat(&condition, body), parent);
            }
            RuleKind::For | RuleKind::ForNoStep => self.for_loop(session, reduction, kind, parent)?,
            RuleKind::Switch | RuleKind::EmptySwitch => {
                let element = self.switch(session, reduction, kind)?;
                self.emit(session, reduction, element, parent);
            }
            RuleKind::Break => {
                let text = keywords.get(KeywordKey::PreLeave).to_string();
                self.emit(session, reduction, Element::jump(&text), parent);
            }
            RuleKind::Continue => self.emit(session, reduction, Element::jump("continue"), parent),
            RuleKind::Return | RuleKind::ReturnVoid => {
                let mut text = keywords.get(KeywordKey::PreReturn).to_string();
                if kind == RuleKind::Return {
                    text.push(' ');
                    text.push_str(&COMPOSER.compose_child(reduction, 1));
                }
                self.emit(session, reduction, Element::jump(text.trim()), parent);
            }
            RuleKind::Block => self.build_child(session, reduction, 1, parent)?,
            RuleKind::BlockItems | RuleKind::TranslationUnit => {
                for item in self.flatten(reduction) {
                    if let Some(item) = item.as_reduction() {
                        self.build(session, item, parent)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn emit(&self, session: &ImportSession<'_>, reduction: &Reduction, mut element: Element, parent: &mut Subqueue) {
        session.equip_with_comment(&mut element, reduction);
        parent.push(element);
    }

    fn condition(
        &self,
        session: &ImportSession<'_>,
        reduction: &Reduction,
        index: usize,
        pre: KeywordKey,
        post: KeywordKey,
    ) -> String {
        let insert = session.options.insert_opt_keywords;
        format!(
            "{}{}{}",
            session.keywords.get_opt(pre, insert, false, true),
            COMPOSER.compose_child(reduction, index),
            session.keywords.get_opt(post, insert, true, false)
        )
    }

    // =========================================================================
    // Expression statements
    // =========================================================================

    fn expression_elements(&self, session: &ImportSession<'_>, token: &Token) -> Vec<Element> {
        let Some(expression) = token.as_reduction() else {
            return vec![Element::instruction(&COMPOSER.compose_token(token))];
        };
        let Some(kind) = self.kind(expression) else {
            return vec![Element::instruction(&COMPOSER.compose(expression))];
        };
        let element = match kind {
            RuleKind::Comma => {
                let mut elements = Vec::new();
                for part in [expression.token(0), expression.token(2)].into_iter().flatten() {
                    elements.extend(self.expression_elements(session, part));
                }
                return elements;
            }
            RuleKind::PostInc | RuleKind::PreInc | RuleKind::PostDec | RuleKind::PreDec => {
                let operand = if matches!(kind, RuleKind::PostInc | RuleKind::PostDec) { 0 } else { 1 };
                let target = COMPOSER.compose_child(expression, operand);
                let op = if matches!(kind, RuleKind::PostInc | RuleKind::PreInc) { "+" } else { "-" };
                Element::instruction(&format!("{target} <- {target} {op} 1"))
            }
            RuleKind::Call | RuleKind::CallEmpty => self.routine_call(session, expression),
            _ => match kind.compound_operator() {
                Some(op) => {
                    let target = COMPOSER.compose_child(expression, 0);
                    let value = COMPOSER.compose_child(expression, 2);
                    let op = TRANSLATIONS
                        .iter()
                        .find(|(symbol, _)| *symbol == op)
                        .map_or(op, |(_, replacement)| *replacement);
                    let value = if expression.token(2).and_then(|value| self.token_kind(value)).is_some_and(is_operation) {
                        format!("({value})")
                    } else {
                        value
                    };
                    Element::instruction(&format!("{target} <- {target} {op} {value}"))
                }
                None => Element::instruction(&COMPOSER.compose(expression)),
            },
        };
        vec![element]
    }

    /// Output and input routines become OUTPUT/INPUT instructions.
    fn routine_call(&self, session: &ImportSession<'_>, call: &Reduction) -> Element {
        let text = COMPOSER.compose(call);
        let Some(name) = call.lexeme(0) else {
            return Element::instruction(&text);
        };
        let args: Vec<&Token> = match call.token(2) {
            Some(list) if call.token_count() == 4 => {
                self.items(list).into_iter().filter(|item| item.name != ",").collect()
            }
            _ => Vec::new(),
        };
        let keywords = &session.keywords;
        let line = |key: KeywordKey, items: Vec<String>| {
            format!("{} {}", keywords.get(key), items.join(", ")).trim().to_string()
        };
        match name {
            "printf" => {
                let mut items = Vec::new();
                let mut rest = args.iter().map(|arg| COMPOSER.compose_token(arg));
                match args.first().filter(|format| format.name == "StringLiteral") {
                    Some(format) => {
                        rest.next();
                        for piece in format_pieces(format.text()) {
                            match piece {
                                FormatPiece::Text(text) => items.push(format!("\"{text}\"")),
                                FormatPiece::Value => items.extend(rest.next()),
                            }
                        }
                        items.extend(rest);
                    }
                    None => items.extend(rest),
                }
                Element::instruction(&line(KeywordKey::Output, items))
            }
            "puts" | "putchar" => {
                let items = args.iter().map(|arg| COMPOSER.compose_token(arg)).collect();
                Element::instruction(&line(KeywordKey::Output, items))
            }
            "scanf" => {
                let items = args
                    .iter()
                    .skip(1)
                    .map(|arg| {
                        let composed = COMPOSER.compose_token(arg);
                        composed.strip_prefix('&').map_or(composed.clone(), str::to_string)
                    })
                    .collect();
                Element::instruction(&line(KeywordKey::Input, items))
            }
            _ => Element::instruction(&text),
        }
    }

    // =========================================================================
    // Loops and switch
    // =========================================================================

    fn for_loop(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        kind: RuleKind,
        parent: &mut Subqueue,
    ) -> Result<(), BuildError> {
        let (step_index, body_index) = if kind == RuleKind::For { (Some(4), 6) } else { (None, 5) };
        let body = self.build_body(session, reduction, body_index)?;
        if let Some(counter) = self.counting_loop(reduction, step_index) {
            let for_loop = ForLoop::counter(&counter.var, &counter.start, &counter.end, counter.step, body);
            let text = for_loop.compose_text(&session.keywords);
            self.emit(session, reduction, Element::for_loop(&text, for_loop), parent);
            return Ok(());
        }

        // init; while (cond) { body; step }
        let mut init = Subqueue::new();
        if let Some(statement) = reduction.child(2) {
            match self.kind(statement) {
                Some(RuleKind::Declaration) => self.declaration(session, statement, false, &mut init),
                Some(RuleKind::ExprStmt) => {
                    if let Some(expression) = statement.token(0) {
                        init.extend(self.expression_elements(session, expression));
                    }
                }
                _ => {}
            }
        }
        parent.extend(init.into_elements().into_iter().map(|element| element.with_color(Color::MISC)));
        let mut body = body;
        if let Some(step) = step_index.and_then(|index| reduction.token(index)) {
            for element in self.expression_elements(session, step) {
                body.push(element.with_color(Color::MISC));
            }
        }
        let condition = reduction
            .child(3)
            .filter(|condition| self.kind(condition) == Some(RuleKind::ExprStmt))
            .map(|condition| COMPOSER.compose_child(condition, 0));
        let element = match condition {
            Some(condition) => Element::while_loop(&condition, body),
            None => Element::forever(body),
        };
        self.emit(session, reduction, element.with_color(Color::MISC), parent);
        Ok(())
    }

    /// `i = a; i < b; i++` and its variants as a counting loop.
    fn counting_loop(&self, reduction: &Reduction, step_index: Option<usize>) -> Option<Counter> {
        let init = reduction.child(2)?;
        let (var, start) = match self.kind(init)? {
            RuleKind::ExprStmt => {
                let assign = init.child(0).filter(|assign| self.kind(assign) == Some(RuleKind::Assign))?;
                let var = assign.token(0).filter(|target| target.name == "Id")?.text().to_string();
                (var, COMPOSER.compose_child(assign, 2))
            }
            RuleKind::Declaration => {
                let item = init.child(1).filter(|item| self.kind(item) == Some(RuleKind::InitDecl))?;
                let declared = self.declarator(item.token(0)?);
                if declared.pointers > 0 || !declared.dimensions.is_empty() {
                    return None;
                }
                (declared.name, COMPOSER.compose_child(item, 2))
            }
            _ => return None,
        };

        let comparison = reduction.child(3)?.child(0)?;
        let relation = self.kind(comparison)?;
        if comparison.token(0)?.text() != var {
            return None;
        }
        let bound = COMPOSER.compose_child(comparison, 2);

        let step_expression = reduction.child(step_index?)?;
        let step = match self.kind(step_expression)? {
            RuleKind::PostInc | RuleKind::PreInc => 1,
            RuleKind::PostDec | RuleKind::PreDec => -1,
            kind @ (RuleKind::AddAssign | RuleKind::SubAssign) => {
                let amount: i64 = step_expression.lexeme(2)?.parse().ok()?;
                if kind == RuleKind::AddAssign { amount } else { -amount }
            }
            _ => return None,
        };
        let operand = match self.kind(step_expression)? {
            RuleKind::PreInc | RuleKind::PreDec => step_expression.token(1)?,
            _ => step_expression.token(0)?,
        };
        if operand.text() != var || step == 0 {
            return None;
        }

        let end = match (relation, step > 0) {
            (RuleKind::Le, true) | (RuleKind::Ge, false) => bound,
            (RuleKind::Lt, true) => offset_bound(&bound, -1),
            (RuleKind::Gt, false) => offset_bound(&bound, 1),
            _ => return None,
        };
        Some(Counter { var, start, end, step })
    }

    fn switch(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        kind: RuleKind,
    ) -> Result<Element, BuildError> {
        let discriminator = self.condition(session, reduction, 2, KeywordKey::PreCase, KeywordKey::PostCase);
        let mut groups: Vec<SwitchGroup> = Vec::new();
        let items = match reduction.token(5) {
            Some(items) if kind == RuleKind::Switch => self.items(items),
            _ => Vec::new(),
        };
        for item in items.into_iter().filter_map(Token::as_reduction) {
            let label = match self.kind(item) {
                Some(RuleKind::CaseLabel) => Some(Some(COMPOSER.compose_child(item, 1))),
                Some(RuleKind::DefaultLabel) => Some(None),
                _ => None,
            };
            match (label, groups.last_mut()) {
                (Some(label), Some(group)) if group.body.is_empty() => group.add_label(label),
                (Some(label), _) => {
                    let mut group = SwitchGroup::default();
                    group.add_label(label);
                    groups.push(group);
                }
                // statements before the first label are unreachable
                (None, None) => {}
                (None, Some(group)) => self.build(session, item, &mut group.body)?,
            }
        }

        let mut branches = CaseBranches::new();
        let mut default = None;
        for mut group in groups {
            if group.body.last().is_some_and(|last| last.is_leave(&session.keywords)) {
                group.body.pop();
            }
            if group.is_default {
                default = Some(group.body);
            } else {
                branches.push(group.selectors.join(", "), group.body);
            }
        }
        match default {
            Some(body) => branches.push("default", body),
            None => branches.push("%", Subqueue::new()),
        }
        Ok(Element::case(&discriminator, branches))
    }
}

/// Binary, conditional and assignment expressions need parentheses when
/// they become an operand.
fn is_operation(kind: RuleKind) -> bool {
    use RuleKind::*;
    kind.compound_operator().is_some()
        || matches!(
            kind,
            Comma | Assign | Conditional | LogOr | LogAnd | BitOr | BitXor | BitAnd | Eq | Ne | Lt | Gt | Le
                | Ge | Shl | Shr | Add | Sub | Mul | Div | Mod
        )
}

/// `bound + delta`, folded when the bound is an integer literal.
fn offset_bound(bound: &str, delta: i64) -> String {
    match bound.parse::<i64>() {
        Ok(value) => (value + delta).to_string(),
        Err(_) if delta < 0 => format!("{bound} - {}", -delta),
        Err(_) => format!("{bound} + {delta}"),
    }
}

struct Counter {
    var: String,
    start: String,
    end: String,
    step: i64,
}

#[derive(Default)]
struct SwitchGroup {
    selectors: Vec<String>,
    is_default: bool,
    body: Subqueue,
}

impl SwitchGroup {
    /// `None` is the default label.
    fn add_label(&mut self, label: Option<String>) {
        match label {
            Some(selector) => self.selectors.push(selector),
            None => self.is_default = true,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FormatPiece {
    Text(String),
    Value,
}

/// Split a printf format literal into text runs and conversions.
///
/// Line feed escapes are dropped; `%%` is a literal percent sign.
fn format_pieces(literal: &str) -> Vec<FormatPiece> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(literal);
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'n') => {
                chars.next();
            }
            '\\' => {
                text.push(ch);
                text.extend(chars.next());
            }
            '%' if chars.peek() == Some(&'%') => {
                chars.next();
                text.push('%');
            }
            '%' => {
                // flags, width, precision and length up to the conversion
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() && !matches!(next, 'h' | 'l' | 'L' | 'z' | 'j' | 't') {
                        break;
                    }
                }
                if !text.is_empty() {
                    pieces.push(FormatPiece::Text(std::mem::take(&mut text)));
                }
                pieces.push(FormatPiece::Value);
            }
            _ => text.push(ch),
        }
    }
    if !text.is_empty() {
        pieces.push(FormatPiece::Text(text));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImportOptions, ParserKeywords};
    use crate::diagram::ElementKind;
    use crate::import::import_file;
    use rstest::rstest;
    use tokio_util::sync::CancellationToken;

    fn import_with(name: &str, source: &str, options: &ImportOptions) -> Vec<Root> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        let outcome = import_file(
            &CImporter,
            &path,
            &ParserKeywords::default(),
            options,
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(outcome.is_ok(), "{}", outcome.error);
        outcome.roots
    }

    fn import(source: &str) -> Vec<Root> {
        import_with("demo.c", source, &ImportOptions::default())
    }

    fn texts(queue: &Subqueue) -> Vec<String> {
        queue.iter().map(Element::text_string).collect()
    }

    #[rstest]
    #[case("\"x = %d\\n\"", vec![FormatPiece::Text("x = ".into()), FormatPiece::Value])]
    #[case("\"%5.2f%%\"", vec![FormatPiece::Value, FormatPiece::Text("%".into())])]
    #[case("\"%ld and %s\"", vec![FormatPiece::Value, FormatPiece::Text(" and ".into()), FormatPiece::Value])]
    fn test_format_pieces(#[case] literal: &str, #[case] expected: Vec<FormatPiece>) {
        assert_eq!(format_pieces(literal), expected);
    }

    #[test]
    fn test_main_function_fills_the_main_diagram() {
        let roots = import(
            "#include <stdio.h>\nint main() {\n  int x = 5;\n  if (x > 0) printf(\"positive %d\\n\", x);\n  \
             else x = -x;\n  return 0;\n}\n",
        );
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].text, ["demo"]);
        assert!(roots[0].is_program());
        let elements = roots[0].children.elements();
        assert_eq!(elements[0].text, ["x <- 5"]);
        let ElementKind::Alternative { on_true, on_false } = &elements[1].kind else {
            panic!("expected alternative, got {}", elements[1].type_name());
        };
        assert_eq!(elements[1].text, ["x > 0"]);
        assert_eq!(texts(on_true), ["OUTPUT \"positive \", x"]);
        assert_eq!(texts(on_false), ["x <- -x"]);
        assert!(matches!(elements[2].kind, ElementKind::Jump));
        assert_eq!(elements[2].text, ["return 0"]);
    }

    #[test]
    fn test_counting_for_loop() {
        let roots = import("for (i = 0; i < 10; i++) sum += i;\nfor (int k = 10; k >= 1; k -= 2) s = s * k;");
        let elements = roots[0].children.elements();
        let ElementKind::For(first) = &elements[0].kind else {
            panic!("expected for");
        };
        assert_eq!(elements[0].text, ["for i <- 0 to 9"]);
        assert_eq!(texts(&first.body), ["sum <- sum + i"]);
        assert_eq!(elements[1].text, ["for k <- 10 to 1 by -2"]);
    }

    #[test]
    fn test_other_for_loops_become_while_loops() {
        let roots = import("for (i = 0; i < n; i += step) { total += i; }");
        let elements = roots[0].children.elements();
        assert_eq!(elements[0].text, ["i <- 0"]);
        assert_eq!(elements[0].color, Some(Color::MISC));
        let ElementKind::While { body } = &elements[1].kind else {
            panic!("expected while");
        };
        assert_eq!(elements[1].text, ["i < n"]);
        assert_eq!(elements[1].color, Some(Color::MISC));
        assert_eq!(texts(body), ["total <- total + i", "i <- i + step"]);
    }

    #[test]
    fn test_do_while_negates_the_condition() {
        let roots = import("do { n--; } while (n > 0);\ndo n++; while (!done);");
        let elements = roots[0].children.elements();
        assert_eq!(elements[0].text, ["not (n > 0)"]);
        assert!(matches!(elements[0].kind, ElementKind::Repeat { .. }));
        assert_eq!(elements[1].text, ["done"]);
    }

    #[test]
    fn test_switch_merges_labels_and_drops_breaks() {
        let roots = import(
            "switch (c) {\n  default: a = 0; break;\n  case 1:\n  case 2: a = 1; break;\n  case 3: a = 2;\n}\n\
             switch (d) { case 1: b = 1; }",
        );
        let elements = roots[0].children.elements();
        let ElementKind::Case(branches) = &elements[0].kind else {
            panic!("expected case");
        };
        assert_eq!(branches.selectors(), ["1, 2", "3", "default"]);
        assert_eq!(texts(&branches.branches()[0]), ["a <- 1"]);
        assert_eq!(texts(&branches.branches()[2]), ["a <- 0"]);
        let ElementKind::Case(second) = &elements[1].kind else {
            panic!("expected case");
        };
        assert_eq!(second.selectors(), ["1", "%"]);
    }

    #[test]
    fn test_functions_and_globals() {
        let source = "int count = 0;\nint add(int a, int *b) {\n  return a + *b;\n}\n\
                      int main(void) {\n  count = add(1, &count);\n  scanf(\"%d\", &count);\n}\n";
        let roots = import_with("prog.c", source, &ImportOptions::default());
        let names: Vec<String> = roots.iter().map(Root::text_string).collect();
        assert_eq!(names, ["prog", "progGlobals", "add(int a, int *b)"]);
        assert!(roots[1].is_includable());
        assert_eq!(texts(&roots[1].children), ["count <- 0"]);
        assert_eq!(roots[1].children.elements()[0].color, Some(Color::GLOBAL));
        assert!(roots[0].include_list.contains("progGlobals"));
        assert!(roots[2].include_list.contains("progGlobals"));
        let main = roots[0].children.elements();
        assert!(matches!(main[0].kind, ElementKind::Call));
        assert_eq!(main[1].text, ["INPUT count"]);
    }

    #[test]
    fn test_declarations_with_typedef_names() {
        let options = ImportOptions {
            import_var_decl: true,
            ..ImportOptions::default()
        };
        let source = "typedef unsigned int number;\nint main() {\n  number n;\n  const int limit = 3;\n  \
                      number values[4];\n  n = limit * 2;\n}";
        let roots = import_with("types.c", source, &options);
        assert_eq!(
            texts(&roots[0].children),
            ["var n: number", "const limit <- 3", "var values: number[4]", "n <- limit * 2"]
        );
        assert_eq!(roots[0].children.elements()[1].color, Some(Color::CONST));
    }

    #[test]
    fn test_comments_are_attached() {
        let options = ImportOptions::with_comments();
        let source = "int main() {\n  /* start\n   * value */\n  int x = 1;\n  x++; // count\n}";
        let roots = import_with("notes.c", source, &options);
        let elements = roots[0].children.elements();
        assert_eq!(elements[0].comment, ["start", "value"]);
        assert_eq!(elements[1].text, ["x <- x + 1"]);
        assert_eq!(elements[1].comment, ["count"]);
    }
}
