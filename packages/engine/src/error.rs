use std::fmt;

use tagfill_document::{Document, DocumentError, ElementKind, NodeId};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template structure violated: {0}")]
    Structural(#[from] StructuralError),

    #[error("document tree error: {0}")]
    Document(#[from] DocumentError),

    #[error("section `{section}` record #{index} is `{value_type}` data, expected `dict`.")]
    RecordShape {
        section: String,
        index: usize,
        value_type: String,
    },
}

/// A template that breaks the engine's structural assumptions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind} ({location})")]
pub struct StructuralError {
    pub kind: StructuralErrorKind,
    pub location: Location,
}

impl StructuralError {
    pub fn new(kind: StructuralErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralErrorKind {
    #[error("found `[` while a tag was already open")]
    NestedTagOpen,

    #[error("found `]` without an open tag")]
    UnmatchedTagClose,

    #[error("tag opened with `[` is never closed")]
    UnclosedTag,

    #[error("found loop end `>` before any loop start `<`")]
    LoopCloseBeforeOpen,

    #[error("found a second loop start `<` before the open loop was closed")]
    NestedLoop,

    #[error("no loop start `<` follows the section tag")]
    LoopNotFound,

    #[error("loop start `<` is never closed by `>`")]
    UnclosedLoop,

    #[error("found another loop marker in the block closing the loop")]
    MultipleLoops,

    #[error("expected a `{expected}` element, found `{found}`")]
    WrongElement {
        expected: ElementKind,
        found: ElementKind,
    },
}

/// Approximate position of a problem in the template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub section: Option<String>,
    /// Index of the block among the body's children.
    pub block: Option<usize>,
    pub excerpt: Option<String>,
}

impl Location {
    /// Position of any node: the body child it sits under, and its text.
    pub fn of_leaf(doc: &Document, leaf: &NodeId) -> Self {
        let mut node = leaf.clone();
        let block = loop {
            match doc.parent(&node).ok().flatten() {
                Some(parent) if parent == *doc.body() => break doc.position(&node).ok(),
                Some(parent) => node = parent,
                None => break None,
            }
        };
        Self {
            section: None,
            block,
            excerpt: doc.inner_text(leaf).ok().as_deref().map(excerpt),
        }
    }

    pub fn of_block(doc: &Document, block: &NodeId) -> Self {
        Self {
            section: None,
            block: doc.position(block).ok(),
            excerpt: doc.inner_text(block).ok().as_deref().map(excerpt),
        }
    }

    pub fn in_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }
}

fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 40;
    if text.chars().count() > MAX_CHARS {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{head}…")
    } else {
        text.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(section) = &self.section {
            parts.push(format!("section `{section}`"));
        }
        if let Some(block) = self.block {
            parts.push(format!("block #{block}"));
        }
        if let Some(excerpt) = &self.excerpt {
            parts.push(format!("near `{excerpt}`"));
        }
        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

pub(crate) fn violation_at_leaf(
    doc: &Document,
    leaf: &NodeId,
    kind: StructuralErrorKind,
) -> RenderError {
    StructuralError::new(kind, Location::of_leaf(doc, leaf)).into()
}

/// The paragraph holding a text leaf. A misplaced node is reported as a
/// structural violation at its position.
pub(crate) fn paragraph_of(doc: &Document, leaf: &NodeId) -> Result<NodeId, RenderError> {
    doc.enclosing_paragraph(leaf).map_err(|err| match err {
        DocumentError::UnexpectedElement { expected, found } => violation_at_leaf(
            doc,
            leaf,
            StructuralErrorKind::WrongElement { expected, found },
        ),
        other => other.into(),
    })
}
