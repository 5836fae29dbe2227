use std::{iter::Enumerate, vec::IntoIter};

use id_tree::{NodeId, PreOrderTraversalIds};

use crate::{document::Document, element::DocNode, error::DocumentError};

/// A text leaf, its text at the time it was visited, and the index of the
/// sibling group it was reached through.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLeaf<'a> {
    pub id: NodeId,
    pub text: &'a str,
    pub group: usize,
}

impl TextLeaf<'_> {
    pub fn into_owned(self) -> (NodeId, String) {
        (self.id, self.text.to_string())
    }
}

/// Every text leaf beneath a node, in document order.
pub struct TextLeaves<'a> {
    doc: &'a Document,
    group: usize,
    nodes: PreOrderTraversalIds<'a, DocNode>,
}

impl<'a> Iterator for TextLeaves<'a> {
    type Item = TextLeaf<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc: &'a Document = self.doc;
        for id in self.nodes.by_ref() {
            if let Ok(DocNode::Text(text)) = doc.node(&id) {
                return Some(TextLeaf {
                    id,
                    text,
                    group: self.group,
                });
            }
        }
        None
    }
}

/// Text leaves of each block following a start node, group by group.
pub struct SiblingTextLeaves<'a> {
    doc: &'a Document,
    groups: Enumerate<IntoIter<NodeId>>,
    current: Option<TextLeaves<'a>>,
}

impl<'a> Iterator for SiblingTextLeaves<'a> {
    type Item = TextLeaf<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = self.current.as_mut().and_then(Iterator::next) {
                return Some(leaf);
            }
            let doc: &'a Document = self.doc;
            let (group, block) = self.groups.next()?;
            self.current = doc.leaves_in_group(&block, group).ok();
        }
    }
}

impl Document {
    /// Walks the text leaves under `root`. Each call starts a fresh walk.
    pub fn text_leaves(&self, root: &NodeId) -> Result<TextLeaves<'_>, DocumentError> {
        self.leaves_in_group(root, 0)
    }

    fn leaves_in_group(
        &self,
        root: &NodeId,
        group: usize,
    ) -> Result<TextLeaves<'_>, DocumentError> {
        Ok(TextLeaves {
            doc: self,
            group,
            nodes: self.tree.traverse_pre_order_ids(root)?,
        })
    }

    /// Walks the text leaves of every sibling following `start`, tagging each
    /// with the 0-based index of its sibling. When `start` is the last of its
    /// siblings, `start` itself is walked as group 0.
    pub fn sibling_text_leaves(
        &self,
        start: &NodeId,
    ) -> Result<SiblingTextLeaves<'_>, DocumentError> {
        let following = self.following_siblings(start)?;
        let groups = if following.is_empty() {
            vec![start.clone()]
        } else {
            following
        };
        Ok(SiblingTextLeaves {
            doc: self,
            groups: groups.into_iter().enumerate(),
            current: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(leaves: impl Iterator<Item = TextLeaf<'a>>) -> Vec<(usize, String)> {
        leaves.map(|leaf| (leaf.group, leaf.text.to_string())).collect()
    }

    fn expected(items: &[(usize, &str)]) -> Vec<(usize, String)> {
        items.iter().map(|(g, t)| (*g, t.to_string())).collect()
    }

    #[test]
    fn walks_leaves_in_document_order() {
        let mut doc = Document::from_runs([vec!["a", "b"], vec!["c"]]).unwrap();
        let first = doc.paragraphs()[0].clone();
        // runs without a text leaf are skipped
        doc.push_run(&first, None).unwrap();

        let body = doc.body().clone();
        let all = texts(doc.text_leaves(&body).unwrap());
        assert_eq!(all, expected(&[(0, "a"), (0, "b"), (0, "c")]));

        // walks restart from scratch
        assert_eq!(texts(doc.text_leaves(&body).unwrap()).len(), 3);
    }

    #[test]
    fn sibling_walk_skips_start_and_numbers_groups() {
        let doc = Document::from_runs([vec!["head"], vec!["x", "y"], vec!["z"]]).unwrap();
        let head = doc.paragraphs()[0].clone();

        let found = texts(doc.sibling_text_leaves(&head).unwrap());
        assert_eq!(found, expected(&[(0, "x"), (0, "y"), (1, "z")]));
    }

    #[test]
    fn sibling_walk_falls_back_to_start_itself() {
        let doc = Document::from_runs([vec!["head"], vec!["last <", "one>"]]).unwrap();
        let last = doc.paragraphs()[1].clone();

        let found = texts(doc.sibling_text_leaves(&last).unwrap());
        assert_eq!(found, expected(&[(0, "last <"), (0, "one>")]));

        // the body has no siblings, so it walks its own content
        let body = doc.body().clone();
        assert_eq!(texts(doc.sibling_text_leaves(&body).unwrap()).len(), 3);
    }
}
