//! Pascal reductions to diagrams.

use rustc_hash::FxHashSet;

use super::grammar::{Pascal, RuleKind};
use crate::base::is_identifier;
use crate::config::KeywordKey;
use crate::diagram::calls::Invocation;
use crate::diagram::{CaseBranches, Color, Element, ForLoop, Root, RootKind, Subqueue};
use crate::grammars::compose::{Composer, Pad};
use crate::grammars::kit::Engine;
use crate::import::comments::CommentDelimiters;
use crate::import::{BuildError, CodeImporter, ImportSession};
use crate::parser::{GrammarTables, Reduction, Token};

const PADS: &[(&str, Pad)] = &[
    ("=", Pad::Both),
    ("<>", Pad::Both),
    ("<", Pad::Both),
    ("<=", Pad::Both),
    (">", Pad::Both),
    (">=", Pad::Both),
    ("in", Pad::Both),
    (":=", Pad::Both),
    ("+", Pad::Both),
    ("-", Pad::Both),
    ("*", Pad::Both),
    ("/", Pad::Both),
    ("div", Pad::Both),
    ("mod", Pad::Both),
    ("and", Pad::Both),
    ("or", Pad::Both),
    ("xor", Pad::Both),
    ("not", Pad::Both),
    ("shl", Pad::Both),
    ("shr", Pad::Both),
    (",", Pad::After),
    (":", Pad::After),
    (";", Pad::After),
];

const COMPOSER: Composer<'static> = Composer {
    pads: PADS,
    translations: &[(":=", "<-")],
};

/// Importer for Pascal and Delphi sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalImporter;

impl CodeImporter for PascalImporter {
    type Engine = Engine<Pascal>;

    fn name(&self) -> &'static str {
        "Pascal"
    }

    fn dialog_title(&self) -> &'static str {
        "Pascal Code Import"
    }

    fn file_description(&self) -> &'static str {
        "Pascal / Delphi source files"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["pas", "dpr", "lpr", "pp"]
    }

    fn create_engine(&self) -> Self::Engine {
        Engine::new()
    }

    fn comment_delimiters(&self) -> CommentDelimiters {
        &[("//", None), ("{", Some("}")), ("(*", Some("*)"))]
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
            unit: None,
        };
        let mut main = Subqueue::new();
        synthesizer.build(session, reduction, &mut main)?;
        session.root.children.extend(main.into_elements());
        Ok(())
    }

    /// Routines of a unit depend on the unit's own diagram, if one was kept.
    fn post_process(&self, session: &mut ImportSession<'_>) -> Result<(), BuildError> {
        let units: Vec<String> = session
            .roots
            .iter()
            .filter(|root| root.is_includable())
            .map(Root::text_string)
            .collect();
        for root in session.roots.iter_mut().filter(|root| root.is_subroutine()) {
            for unit in &units {
                root.add_include(unit);
            }
        }
        Ok(())
    }
}

struct Synthesizer {
    kinds: Vec<Option<RuleKind>>,
    /// Name of the unit being imported.
    unit: Option<String>,
}

impl Synthesizer {
    fn kind(&self, reduction: &Reduction) -> Option<RuleKind> {
        self.kinds.get(reduction.rule).copied().flatten()
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
            return self.pass_through(session, reduction, parent);
        };
        match kind {
            RuleKind::ProgHeader => {
                let name = reduction.lexeme(1).unwrap_or_default();
                session.root.set_text(name);
            }
            RuleKind::Unit => {
                let name = reduction
                    .child(0)
                    .and_then(|header| header.lexeme(1))
                    .unwrap_or_default()
                    .to_string();
                session.root.kind = RootKind::Includable;
                session.root.set_text(&name);
                self.unit = Some(name);
                // the interface part only repeats the routine headings
                self.build_child(session, reduction, 4, parent)?;
                self.build_child(session, reduction, 5, parent)?;
            }
            RuleKind::Uses => {
                if let Some(ids) = reduction.child(1) {
                    let mut names = Vec::new();
                    ids.for_each_terminal(&mut |token| {
                        if token.name == "Id" {
                            names.push(token.text().to_string());
                        }
                    });
                    for name in names {
                        session.root.add_include(&name);
                    }
                }
            }
            RuleKind::VarSection | RuleKind::ConstSection => {
                if session.options.import_var_decl {
                    self.build_child(session, reduction, 1, parent)?;
                }
            }
            RuleKind::TypeSection
            | RuleKind::ProcForward
            | RuleKind::FuncForward
            | RuleKind::ProcHeading
            | RuleKind::FuncHeading
            | RuleKind::EmptyStmt
            | RuleKind::InitEnd => {}
            RuleKind::VarDecl | RuleKind::VarDeclInit => {
                let mut text = format!(
                    "var {}: {}",
                    COMPOSER.compose_child(reduction, 0),
                    COMPOSER.compose_child(reduction, 2)
                );
                if kind == RuleKind::VarDeclInit {
                    text.push_str(" <- ");
                    text.push_str(&COMPOSER.compose_child(reduction, 4));
                }
                self.emit(session, reduction, Element::instruction(&text).with_color(Color::DECL), parent);
            }
            RuleKind::ConstDecl | RuleKind::TypedConstDecl => {
                let name = reduction.lexeme(0).unwrap_or_default();
                let text = if kind == RuleKind::ConstDecl {
                    format!("const {name} <- {}", COMPOSER.compose_child(reduction, 2))
                } else {
                    format!(
                        "const {name}: {} <- {}",
                        COMPOSER.compose_child(reduction, 2),
                        COMPOSER.compose_child(reduction, 4)
                    )
                };
                self.emit(session, reduction, Element::instruction(&text).with_color(Color::CONST), parent);
            }
            RuleKind::ProcDecl | RuleKind::FuncDecl => self.routine(session, reduction)?,
            RuleKind::Assign => {
                let text = COMPOSER.compose(reduction);
                self.emit(session, reduction, Element::instruction(&text), parent);
            }
            RuleKind::DesignatorId
            | RuleKind::DesignatorCall
            | RuleKind::DesignatorEmptyCall
            | RuleKind::DesignatorIndex
            | RuleKind::DesignatorField
            | RuleKind::DesignatorDeref => {
                let element = routine_call(&COMPOSER.compose(reduction), session);
                self.emit(session, reduction, element, parent);
            }
            RuleKind::IfThen | RuleKind::IfThenElse => {
                let condition = self.condition(session, reduction, 1, KeywordKey::PreAlt, KeywordKey::PostAlt);
                let on_true = self.build_body(session, reduction, 3)?;
                // the else part is optional; its slot only exists in the longer rule
                let on_false = if reduction.token_count() >= 5 {
                    self.build_body(session, reduction, 5)?
                } else {
                    Subqueue::new()
                };
                self.emit(session, reduction, Element::alternative(&condition, on_true, on_false), parent);
            }
            RuleKind::While => {
                let condition = self.condition(session, reduction, 1, KeywordKey::PreWhile, KeywordKey::PostWhile);
                let body = self.build_body(session, reduction, 3)?;
                self.emit(session, reduction, Element::while_loop(&condition, body), parent);
            }
            RuleKind::Repeat => {
                let condition = self.condition(session, reduction, 3, KeywordKey::PreRepeat, KeywordKey::PostRepeat);
                let body = self.build_body(session, reduction, 1)?;
                self.emit(session, reduction, Element::repeat(&condition, body), parent);
            }
            RuleKind::ForTo | RuleKind::ForDownTo => {
                let var = reduction.lexeme(1).unwrap_or_default();
                let start = COMPOSER.compose_child(reduction, 3);
                let end = COMPOSER.compose_child(reduction, 5);
                let step = if kind == RuleKind::ForDownTo { -1 } else { 1 };
                let body = self.build_body(session, reduction, 7)?;
                let for_loop = ForLoop::counter(var, &start, &end, step, body);
                let text = for_loop.compose_text(&session.keywords);
                self.emit(session, reduction, Element::for_loop(&text, for_loop), parent);
            }
            RuleKind::ForIn => {
                let var = reduction.lexeme(1).unwrap_or_default();
                let list = COMPOSER.compose_child(reduction, 3);
                let body = self.build_body(session, reduction, 5)?;
                let for_loop = ForLoop::traversal(var, &list, body);
                let text = for_loop.compose_text(&session.keywords);
                self.emit(session, reduction, Element::for_loop(&text, for_loop), parent);
            }
            RuleKind::Case | RuleKind::CaseElse | RuleKind::CaseOtherwise => {
                let element = self.case(session, reduction, kind)?;
                self.emit(session, reduction, element, parent);
            }
            RuleKind::Compound | RuleKind::InitBegin | RuleKind::InitInitialization => {
                self.build_child(session, reduction, 1, parent)?;
            }
            _ if kind.is_list() => {
                for token in self.flatten(reduction) {
                    if let Some(item) = token.as_reduction() {
                        self.build(session, item, parent)?;
                    }
                }
            }
            _ => self.pass_through(session, reduction, parent)?,
        }
        Ok(())
    }

    fn pass_through(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        parent: &mut Subqueue,
    ) -> Result<(), BuildError> {
        for child in reduction.children() {
            self.build(session, child, parent)?;
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

    fn case(
        &mut self,
        session: &mut ImportSession<'_>,
        reduction: &Reduction,
        kind: RuleKind,
    ) -> Result<Element, BuildError> {
        let discriminator = self.condition(session, reduction, 1, KeywordKey::PreCase, KeywordKey::PostCase);
        let mut branches = CaseBranches::new();
        let items = match reduction.child(3) {
            Some(list) if self.is_list(list) => self.flatten(list),
            _ => reduction.token(3).into_iter().collect(),
        };
        for item in items.into_iter().filter_map(Token::as_reduction) {
            if self.kind(item) != Some(RuleKind::CaseItem) {
                continue;
            }
            let selector = COMPOSER.compose_child(item, 0);
            let body = self.build_body(session, item, 2)?;
            branches.push(selector, body);
        }
        if kind == RuleKind::Case {
            branches.push("%", Subqueue::new());
        } else {
            let body = self.build_body(session, reduction, 5)?;
            branches.push("else", body);
        }
        Ok(Element::case(&discriminator, branches))
    }

    /// A procedure or function becomes a diagram of its own.
    fn routine(&mut self, session: &mut ImportSession<'_>, reduction: &Reduction) -> Result<(), BuildError> {
        let Some(heading) = reduction.child(0) else {
            return Err(BuildError::malformed("ProcDecl", "routine without heading"));
        };
        let name = heading.lexeme(1).unwrap_or_default();
        let mut header = format!("{name}{}", COMPOSER.compose_child(heading, 2));
        if self.kind(heading) == Some(RuleKind::FuncHeading) {
            header.push_str(": ");
            header.push_str(&COMPOSER.compose_child(heading, 4));
        }
        let mut root = Root::subroutine(&header);
        let mut comment: Vec<String> = Vec::new();
        if let Some(unit) = &self.unit {
            comment.push(format!("(UNIT {unit})"));
        }
        comment.extend(session.comment_for(heading));
        root.set_comment(&comment.join("\n"));

        let mut body = Subqueue::new();
        self.build_child(session, reduction, 1, &mut body)?;
        self.build_child(session, reduction, 2, &mut body)?;
        root.children = body;
        session.add_sub_root(root);
        Ok(())
    }
}

/// A call statement: output, input, jumps or a plain instruction.
fn routine_call(text: &str, session: &ImportSession<'_>) -> Element {
    let (name, args) = match Invocation::parse(text) {
        Some(invocation) => (invocation.name, invocation.args),
        None if is_identifier(text) => (text.to_string(), Vec::new()),
        None => return Element::instruction(text),
    };
    let keywords = &session.keywords;
    let with = |key: KeywordKey| format!("{} {}", keywords.get(key), args.join(", ")).trim().to_string();
    match name.to_ascii_lowercase().as_str() {
        "exit" => Element::jump(&with(KeywordKey::PreReturn)),
        "halt" => Element::jump(&with(KeywordKey::PreExit)),
        "break" => Element::jump(&with(KeywordKey::PreLeave)),
        "write" | "writeln" => Element::instruction(&with(KeywordKey::Output)),
        "read" | "readln" => Element::instruction(&with(KeywordKey::Input)),
        _ => Element::instruction(text),
    }
}
