use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Document,
    Body,
    Paragraph,
    Run,
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Document,
    Body,
    Paragraph,
    Run,
    Text,
}

impl DocNode {
    pub fn kind(&self) -> ElementKind {
        match self {
            DocNode::Document => ElementKind::Document,
            DocNode::Body => ElementKind::Body,
            DocNode::Paragraph => ElementKind::Paragraph,
            DocNode::Run => ElementKind::Run,
            DocNode::Text(_) => ElementKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Document => "document",
            ElementKind::Body => "body",
            ElementKind::Paragraph => "paragraph",
            ElementKind::Run => "run",
            ElementKind::Text => "text",
        };
        write!(f, "{name}")
    }
}
