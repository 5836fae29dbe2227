use std::{collections::HashMap, fmt};

use id_tree::{InsertBehavior, MoveBehavior, Node, NodeId, Tree, TreeBuilder};

use crate::{
    element::{DocNode, ElementKind},
    error::DocumentError,
};

/// Source id -> copy id, for every node of a copied subtree.
pub type CopyMap = HashMap<NodeId, NodeId>;

/// A document tree: body -> paragraph -> run -> text leaf.
///
/// All nodes live in one arena. Removing a block never frees its slot: the
/// block is moved out of the body and parked under the document root, so an
/// id held by a caller is never handed out again to a newer node.
#[derive(Debug)]
pub struct Document {
    pub(crate) tree: Tree<DocNode>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut tree = TreeBuilder::new().build();
        let root = tree
            .insert(Node::new(DocNode::Document), InsertBehavior::AsRoot)
            .expect("document init failed.");
        let body = tree
            .insert(Node::new(DocNode::Body), InsertBehavior::UnderNode(&root))
            .expect("document init failed.");
        Self { tree, root, body }
    }

    /// Builds a document with one paragraph per item, one run per string.
    pub fn from_runs<P, R, S>(paragraphs: P) -> Result<Self, DocumentError>
    where
        P: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut doc = Self::new();
        for runs in paragraphs {
            let paragraph = doc.push_paragraph()?;
            for text in runs {
                doc.push_run(&paragraph, Some(text.as_ref()))?;
            }
        }
        Ok(doc)
    }

    pub fn body(&self) -> &NodeId {
        &self.body
    }

    pub fn push_paragraph(&mut self) -> Result<NodeId, DocumentError> {
        let body = self.body.clone();
        self.append(&body, DocNode::Paragraph)
    }

    /// Appends a run to `paragraph`, with a text leaf when `text` is given.
    pub fn push_run(
        &mut self,
        paragraph: &NodeId,
        text: Option<&str>,
    ) -> Result<NodeId, DocumentError> {
        self.expect_kind(paragraph, ElementKind::Paragraph)?;
        let run = self.append(paragraph, DocNode::Run)?;
        if let Some(text) = text {
            self.append(&run, DocNode::Text(text.to_string()))?;
        }
        Ok(run)
    }

    fn append(&mut self, parent: &NodeId, node: DocNode) -> Result<NodeId, DocumentError> {
        Ok(self
            .tree
            .insert(Node::new(node), InsertBehavior::UnderNode(parent))?)
    }

    pub fn node(&self, id: &NodeId) -> Result<&DocNode, DocumentError> {
        Ok(self.tree.get(id)?.data())
    }

    pub fn kind(&self, id: &NodeId) -> Result<ElementKind, DocumentError> {
        Ok(self.node(id)?.kind())
    }

    pub fn expect_kind(&self, id: &NodeId, expected: ElementKind) -> Result<(), DocumentError> {
        let found = self.kind(id)?;
        if found != expected {
            return Err(DocumentError::UnexpectedElement { expected, found });
        }
        Ok(())
    }

    pub fn text(&self, leaf: &NodeId) -> Result<&str, DocumentError> {
        let node = self.node(leaf)?;
        node.as_text().ok_or(DocumentError::UnexpectedElement {
            expected: ElementKind::Text,
            found: node.kind(),
        })
    }

    pub fn set_text(
        &mut self,
        leaf: &NodeId,
        text: impl Into<String>,
    ) -> Result<(), DocumentError> {
        match self.tree.get_mut(leaf)?.data_mut() {
            DocNode::Text(value) => {
                *value = text.into();
                Ok(())
            }
            other => Err(DocumentError::UnexpectedElement {
                expected: ElementKind::Text,
                found: other.kind(),
            }),
        }
    }

    pub fn parent(&self, id: &NodeId) -> Result<Option<NodeId>, DocumentError> {
        Ok(self.tree.get(id)?.parent().cloned())
    }

    pub fn children(&self, id: &NodeId) -> Result<Vec<NodeId>, DocumentError> {
        Ok(self.tree.get(id)?.children().clone())
    }

    /// Top-level blocks of the body.
    pub fn paragraphs(&self) -> Vec<NodeId> {
        self.children(&self.body).unwrap_or_default()
    }

    /// The paragraph carrying a text leaf. Checks every link of the
    /// text -> run -> paragraph chain.
    pub fn enclosing_paragraph(&self, leaf: &NodeId) -> Result<NodeId, DocumentError> {
        self.expect_kind(leaf, ElementKind::Text)?;
        let run = self.parent(leaf)?.ok_or(DocumentError::Detached {
            kind: ElementKind::Text,
        })?;
        self.expect_kind(&run, ElementKind::Run)?;
        let paragraph = self.parent(&run)?.ok_or(DocumentError::Detached {
            kind: ElementKind::Run,
        })?;
        self.expect_kind(&paragraph, ElementKind::Paragraph)?;
        Ok(paragraph)
    }

    /// Index of a node among its parent's children.
    pub fn position(&self, id: &NodeId) -> Result<usize, DocumentError> {
        let kind = self.kind(id)?;
        let parent = self.parent(id)?.ok_or(DocumentError::Detached { kind })?;
        self.tree
            .get(&parent)?
            .children()
            .iter()
            .position(|child| child == id)
            .ok_or(DocumentError::Detached { kind })
    }

    pub fn following_siblings(&self, id: &NodeId) -> Result<Vec<NodeId>, DocumentError> {
        // the body's siblings are parked (removed) blocks
        if *id == self.body || *id == self.root {
            return Ok(Vec::new());
        }
        let index = self.position(id)?;
        let Some(parent) = self.parent(id)? else {
            return Ok(Vec::new());
        };
        Ok(self.tree.get(&parent)?.children()[index + 1..].to_vec())
    }

    /// Whether `id` is the body or attached somewhere beneath it.
    pub fn contains(&self, id: &NodeId) -> bool {
        if *id == self.body {
            return true;
        }
        match self.tree.ancestor_ids(id) {
            Ok(mut ancestors) => ancestors.any(|ancestor| *ancestor == self.body),
            Err(_) => false,
        }
    }

    /// Detaches a node and its subtree from the body.
    pub fn remove(&mut self, id: &NodeId) -> Result<(), DocumentError> {
        let kind = self.kind(id)?;
        if *id == self.body {
            return Err(DocumentError::UnexpectedElement {
                expected: ElementKind::Paragraph,
                found: kind,
            });
        }
        if !self.contains(id) {
            return Err(DocumentError::Detached { kind });
        }
        let root = self.root.clone();
        self.tree.move_node(id, MoveBehavior::ToParent(&root))?;
        Ok(())
    }

    /// Copies `source_id` and its subtree out of `source`, inserting the copy
    /// as child number `index` of `parent`. An index past the end appends.
    pub fn insert_copy(
        &mut self,
        parent: &NodeId,
        index: usize,
        source: &Document,
        source_id: &NodeId,
    ) -> Result<CopyMap, DocumentError> {
        let mut copies = CopyMap::new();
        let top = self.graft(parent, source, source_id, &mut copies)?;
        let last = self.tree.get(parent)?.children().len() - 1;
        if index < last {
            self.tree.make_nth_sibling(&top, index)?;
        }
        Ok(copies)
    }

    pub fn append_copy(
        &mut self,
        parent: &NodeId,
        source: &Document,
        source_id: &NodeId,
    ) -> Result<CopyMap, DocumentError> {
        self.insert_copy(parent, usize::MAX, source, source_id)
    }

    fn graft(
        &mut self,
        parent: &NodeId,
        source: &Document,
        source_id: &NodeId,
        copies: &mut CopyMap,
    ) -> Result<NodeId, DocumentError> {
        let copy = self.append(parent, source.node(source_id)?.clone())?;
        copies.insert(source_id.clone(), copy.clone());
        for child in source.tree.children_ids(source_id)? {
            self.graft(&copy, source, child, copies)?;
        }
        Ok(copy)
    }

    /// A fully independent copy of the body's content.
    pub fn deep_copy(&self) -> Result<Document, DocumentError> {
        let mut copy = Document::new();
        let body = copy.body.clone();
        let mut copies = CopyMap::new();
        for child in self.tree.children_ids(&self.body)? {
            copy.graft(&body, self, child, &mut copies)?;
        }
        Ok(copy)
    }

    /// Concatenated text of every leaf under `id`.
    pub fn inner_text(&self, id: &NodeId) -> Result<String, DocumentError> {
        Ok(self.text_leaves(id)?.map(|leaf| leaf.text).collect())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for paragraph in self.paragraphs() {
            let text = self.inner_text(&paragraph).map_err(|_| fmt::Error)?;
            writeln!(f, "{text}")?;
        }
        Ok(())
    }
}
