//! Tree reconstruction over one stack of frames.
//!
//! Every stored format describes the diagram as a stream of open and close
//! markers. [`TreeBuilder`] turns that stream into a [`Root`]:
//!
//! ```text
//! <root>                      [Root]
//!   <children>                [Root, Slot(children)]
//!     <alternative>           [Root, Slot(children), Element(alt)]
//!       <qTrue>               [.., Element(alt), Slot(qTrue)]
//!         <instruction/>      [.., Slot(qTrue), Element(instr)] → popped into qTrue
//!       </qTrue>              [.., Element(alt)]               qTrue moved into alt
//!       <qFalse> .. </qFalse>                                  only after qTrue closed
//!     </alternative>          [Root, Slot(children)]           alt moved into children
//!   </children>               [Root]
//! </root>                     finish() → Root
//! ```
//!
//! Elements are moved into their slot when they close and slots into their
//! element when they close, so nothing is ever shared.

use std::collections::VecDeque;

use super::InterchangeError;
use crate::diagram::{Element, ElementKind, Root, Subqueue};

/// A named subqueue position inside an element or the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Children,
    True,
    False,
    For,
    While,
    Repeat,
    Forever,
    Case,
    Thread,
}

impl SlotKind {
    /// The tagged-format name of the slot.
    pub fn tag(self) -> &'static str {
        match self {
            SlotKind::Children => "children",
            SlotKind::True => "qTrue",
            SlotKind::False => "qFalse",
            SlotKind::For => "qFor",
            SlotKind::While => "qWhile",
            SlotKind::Repeat => "qRepeat",
            SlotKind::Forever => "qForever",
            SlotKind::Case => "qCase",
            SlotKind::Thread => "qPara",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "children" => SlotKind::Children,
            "qTrue" => SlotKind::True,
            "qFalse" => SlotKind::False,
            "qFor" => SlotKind::For,
            "qWhile" => SlotKind::While,
            "qRepeat" => SlotKind::Repeat,
            "qForever" => SlotKind::Forever,
            "qCase" => SlotKind::Case,
            "qPara" => SlotKind::Thread,
            _ => return None,
        })
    }

    /// The loop slot of a loop element.
    pub fn loop_slot(kind: &ElementKind) -> Option<Self> {
        match kind {
            ElementKind::For(_) => Some(SlotKind::For),
            ElementKind::While { .. } => Some(SlotKind::While),
            ElementKind::Repeat { .. } => Some(SlotKind::Repeat),
            ElementKind::Forever { .. } => Some(SlotKind::Forever),
            _ => None,
        }
    }

    fn fits(self, kind: &ElementKind) -> bool {
        match self {
            SlotKind::Children => false,
            SlotKind::True | SlotKind::False => matches!(kind, ElementKind::Alternative { .. }),
            SlotKind::Case => matches!(kind, ElementKind::Case(_)),
            SlotKind::Thread => matches!(kind, ElementKind::Parallel { .. }),
            loop_slot => SlotKind::loop_slot(kind) == Some(loop_slot),
        }
    }
}

/// Progress of the two branches of an alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Branches {
    #[default]
    Untouched,
    TrueClosed,
    FalseClosed,
}

#[derive(Debug)]
enum Frame {
    Root(Root),
    Element {
        element: Element,
        tag: String,
        /// Case selectors not yet paired with a branch.
        selectors: VecDeque<String>,
        branches: Branches,
    },
    Slot {
        kind: SlotKind,
        queue: Subqueue,
    },
}

/// Builds one [`Root`] from open/close events.
#[derive(Debug)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    pub fn new(root: Root) -> Self {
        Self {
            stack: vec![Frame::Root(root)],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The root under construction; its children arrive on `finish`.
    pub fn root_mut(&mut self) -> Option<&mut Root> {
        match self.stack.first_mut() {
            Some(Frame::Root(root)) => Some(root),
            _ => None,
        }
    }

    /// The innermost open element, if no slot is open inside it.
    pub fn current_element_mut(&mut self) -> Option<&mut Element> {
        match self.stack.last_mut() {
            Some(Frame::Element { element, .. }) => Some(element),
            _ => None,
        }
    }

    /// Whether the true branch of the innermost open alternative was closed.
    pub fn true_branch_closed(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Element {
                branches: Branches::TrueClosed | Branches::FalseClosed,
                ..
            })
        )
    }

    /// Add a selector for the next branch of the innermost open case.
    pub fn add_selector(&mut self, selector: impl Into<String>) -> Result<(), InterchangeError> {
        match self.stack.last_mut() {
            Some(Frame::Element {
                element, selectors, ..
            }) if matches!(element.kind, ElementKind::Case(_)) => {
                selectors.push_back(selector.into());
                Ok(())
            }
            _ => Err(InterchangeError::malformed("case", "selector outside of a case element")),
        }
    }

    /// Open a container or leaf element inside the current slot.
    ///
    /// A case element's text lines after the first are taken as its
    /// selectors; its text keeps the discriminator only.
    pub fn open_element(&mut self, tag: &str, mut element: Element) -> Result<(), InterchangeError> {
        if !matches!(self.stack.last(), Some(Frame::Slot { .. })) {
            return Err(InterchangeError::malformed(tag, "element outside of a slot"));
        }
        let mut selectors = VecDeque::new();
        if matches!(element.kind, ElementKind::Case(_)) && element.text.len() > 1 {
            selectors.extend(element.text.drain(1..));
        }
        tracing::trace!(tag, depth = self.stack.len(), "open element");
        self.stack.push(Frame::Element {
            element,
            tag: tag.to_string(),
            selectors,
            branches: Branches::Untouched,
        });
        Ok(())
    }

    /// Close the innermost element and append it to the enclosing slot.
    pub fn close_element(&mut self, tag: &str) -> Result<(), InterchangeError> {
        if !matches!(self.stack.last(), Some(Frame::Element { .. })) {
            return Err(InterchangeError::malformed(tag, "close without an open element"));
        }
        let Some(Frame::Element {
            mut element,
            tag: open_tag,
            selectors,
            ..
        }) = self.stack.pop()
        else {
            return Err(InterchangeError::malformed(tag, "close without an open element"));
        };
        if open_tag != tag {
            return Err(InterchangeError::malformed(tag, format!("closes <{open_tag}>")));
        }
        match &mut element.kind {
            ElementKind::Case(branches) => {
                // selectors without a stored branch get an empty one
                for selector in selectors {
                    branches.push(selector, Subqueue::new());
                }
            }
            ElementKind::Parallel { threads } => element.text = vec![threads.len().to_string()],
            _ => {}
        }
        match self.stack.last_mut() {
            Some(Frame::Slot { queue, .. }) => {
                queue.push(element);
                Ok(())
            }
            _ => Err(InterchangeError::malformed(tag, "element outside of a slot")),
        }
    }

    /// Open a slot of the innermost element (or the root's children).
    pub fn open_slot(&mut self, kind: SlotKind) -> Result<(), InterchangeError> {
        let tag = kind.tag();
        match self.stack.last() {
            Some(Frame::Root(_)) if kind == SlotKind::Children => {}
            Some(Frame::Element {
                element, branches, ..
            }) if kind.fits(&element.kind) => match (kind, branches) {
                (SlotKind::True, Branches::Untouched) => {}
                (SlotKind::True, _) => return Err(InterchangeError::malformed(tag, "second true branch")),
                (SlotKind::False, Branches::TrueClosed) => {}
                (SlotKind::False, Branches::Untouched) => {
                    return Err(InterchangeError::malformed(tag, "false branch before the true branch"));
                }
                (SlotKind::False, Branches::FalseClosed) => {
                    return Err(InterchangeError::malformed(tag, "second false branch"));
                }
                _ => {}
            },
            Some(Frame::Element { tag: open_tag, .. }) => {
                return Err(InterchangeError::malformed(tag, format!("not a slot of <{open_tag}>")));
            }
            _ => return Err(InterchangeError::malformed(tag, "slot outside of an element")),
        }
        self.stack.push(Frame::Slot {
            kind,
            queue: Subqueue::new(),
        });
        Ok(())
    }

    /// Close the innermost slot and move its queue into its owner.
    pub fn close_slot(&mut self, kind: SlotKind) -> Result<(), InterchangeError> {
        let tag = kind.tag();
        if !matches!(self.stack.last(), Some(Frame::Slot { kind: open, .. }) if *open == kind) {
            return Err(InterchangeError::malformed(tag, "close without the matching open slot"));
        }
        let Some(Frame::Slot { queue, .. }) = self.stack.pop() else {
            return Err(InterchangeError::malformed(tag, "close without the matching open slot"));
        };
        match self.stack.last_mut() {
            Some(Frame::Root(root)) => root.children.extend(queue.into_elements()),
            Some(Frame::Element {
                element,
                selectors,
                branches,
                ..
            }) => match (&mut element.kind, kind) {
                (ElementKind::Alternative { on_true, .. }, SlotKind::True) => {
                    *on_true = queue;
                    *branches = Branches::TrueClosed;
                }
                (ElementKind::Alternative { on_false, .. }, SlotKind::False) => {
                    *on_false = queue;
                    *branches = Branches::FalseClosed;
                }
                (ElementKind::Case(case), SlotKind::Case) => {
                    case.push(selectors.pop_front().unwrap_or_default(), queue);
                }
                (ElementKind::Parallel { threads }, SlotKind::Thread) => threads.push(queue),
                (kind, _) => {
                    if let Some(body) = loop_body(kind) {
                        *body = queue;
                    }
                }
            },
            _ => return Err(InterchangeError::malformed(tag, "slot without an owner")),
        }
        Ok(())
    }

    /// The finished root; only the root frame may be left.
    pub fn finish(mut self) -> Result<Root, InterchangeError> {
        match self.stack.len() {
            1 => match self.stack.pop() {
                Some(Frame::Root(root)) => Ok(root),
                _ => Err(InterchangeError::malformed("root", "root frame missing")),
            },
            depth => {
                let open = match self.stack.last() {
                    Some(Frame::Element { tag, .. }) => tag.clone(),
                    Some(Frame::Slot { kind, .. }) => kind.tag().to_string(),
                    _ => "root".to_string(),
                };
                Err(InterchangeError::malformed(open, format!("{} frame(s) still open", depth - 1)))
            }
        }
    }
}

fn loop_body(kind: &mut ElementKind) -> Option<&mut Subqueue> {
    match kind {
        ElementKind::For(for_loop) => Some(&mut for_loop.body),
        ElementKind::While { body } | ElementKind::Repeat { body } | ElementKind::Forever { body } => Some(body),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::CaseBranches;
    use rstest::rstest;

    fn builder() -> TreeBuilder {
        let mut builder = TreeBuilder::new(Root::program("main"));
        builder.open_slot(SlotKind::Children).unwrap();
        builder
    }

    fn leaf(builder: &mut TreeBuilder, text: &str) {
        builder.open_element("instruction", Element::instruction(text)).unwrap();
        builder.close_element("instruction").unwrap();
    }

    #[test]
    fn test_alternative_branches() {
        let mut builder = builder();
        let alternative = Element::alternative("x > 0", Subqueue::new(), Subqueue::new());
        builder.open_element("alternative", alternative).unwrap();
        builder.open_slot(SlotKind::True).unwrap();
        leaf(&mut builder, "y <- 1");
        builder.close_slot(SlotKind::True).unwrap();
        assert!(builder.true_branch_closed());
        builder.open_slot(SlotKind::False).unwrap();
        leaf(&mut builder, "y <- 2");
        builder.close_slot(SlotKind::False).unwrap();
        builder.close_element("alternative").unwrap();
        builder.close_slot(SlotKind::Children).unwrap();
        assert_eq!(builder.depth(), 1);

        let root = builder.finish().unwrap();
        let ElementKind::Alternative { on_true, on_false } = &root.children.elements()[0].kind else {
            panic!("expected alternative");
        };
        assert_eq!(on_true.elements()[0].text, ["y <- 1"]);
        assert_eq!(on_false.elements()[0].text, ["y <- 2"]);
    }

    #[test]
    fn test_false_branch_requires_closed_true_branch() {
        let mut builder = builder();
        let alternative = Element::alternative("c", Subqueue::new(), Subqueue::new());
        builder.open_element("alternative", alternative).unwrap();
        let error = builder.open_slot(SlotKind::False).unwrap_err();
        assert!(error.is_malformed());
    }

    #[test]
    fn test_case_selectors_pair_with_branches() {
        let mut builder = builder();
        let mut case = Element::case("n", CaseBranches::new());
        case.text.extend(["1".to_string(), "2".to_string(), "default".to_string()]);
        builder.open_element("case", case).unwrap();
        builder.open_slot(SlotKind::Case).unwrap();
        leaf(&mut builder, "a <- 1");
        builder.close_slot(SlotKind::Case).unwrap();
        builder.close_element("case").unwrap();
        builder.close_slot(SlotKind::Children).unwrap();

        let root = builder.finish().unwrap();
        let element = &root.children.elements()[0];
        let ElementKind::Case(branches) = &element.kind else {
            panic!("expected case");
        };
        assert_eq!(element.text, ["n"]);
        assert_eq!(branches.selectors(), ["1", "2", "default"]);
        assert_eq!(branches.branches().len(), 3);
        assert_eq!(branches.branches()[0].len(), 1);
    }

    #[test]
    fn test_parallel_text_is_thread_count() {
        let mut builder = builder();
        builder.open_element("parallel", Element::parallel(Vec::new())).unwrap();
        for _ in 0..3 {
            builder.open_slot(SlotKind::Thread).unwrap();
            builder.close_slot(SlotKind::Thread).unwrap();
        }
        builder.close_element("parallel").unwrap();
        builder.close_slot(SlotKind::Children).unwrap();
        let root = builder.finish().unwrap();
        assert_eq!(root.children.elements()[0].text, ["3"]);
    }

    #[rstest]
    #[case(SlotKind::While, true)]
    #[case(SlotKind::Repeat, false)]
    #[case(SlotKind::True, false)]
    fn test_slot_must_fit_element(#[case] slot: SlotKind, #[case] fits: bool) {
        let mut builder = builder();
        builder.open_element("while", Element::while_loop("c", Subqueue::new())).unwrap();
        assert_eq!(builder.open_slot(slot).is_ok(), fits);
    }

    #[test]
    fn test_unclosed_frames_are_malformed() {
        let mut builder = builder();
        builder.open_element("while", Element::while_loop("c", Subqueue::new())).unwrap();
        let error = builder.finish().unwrap_err();
        assert!(matches!(error, InterchangeError::Malformed { ref tag, .. } if tag == "while"));
    }

    #[test]
    fn test_mismatched_close_is_malformed() {
        let mut builder = builder();
        builder.open_element("while", Element::while_loop("c", Subqueue::new())).unwrap();
        assert!(builder.close_element("repeat").is_err());
        assert!(builder.close_slot(SlotKind::While).is_err());
    }

    #[rstest]
    #[case("qTrue", Some(SlotKind::True))]
    #[case("qPara", Some(SlotKind::Thread))]
    #[case("children", Some(SlotKind::Children))]
    #[case("qElse", None)]
    fn test_slot_tags(#[case] tag: &str, #[case] expected: Option<SlotKind>) {
        assert_eq!(SlotKind::from_tag(tag), expected);
        if let Some(kind) = expected {
            assert_eq!(kind.tag(), tag);
        }
    }
}
