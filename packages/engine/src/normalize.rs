use log::{debug, trace};
use tagfill_document::{Document, NodeId, TextLeaf};

use crate::error::{violation_at_leaf, RenderError, StructuralErrorKind};

const TAG_START: char = '[';
const TAG_END: char = ']';

/// Joins every `[...]` token the authoring tool split over several text
/// leaves back into the leaf holding its `[`.
///
/// Characters of the token found in later leaves are moved to the opening
/// leaf; a leaf lying wholly inside the token ends up empty. Returns how many
/// tokens were joined.
pub fn normalize(doc: &mut Document) -> Result<usize, RenderError> {
    let body = doc.body().clone();
    let leaves: Vec<(NodeId, String)> = doc.text_leaves(&body)?.map(TextLeaf::into_owned).collect();

    let mut chars = String::new();
    let mut open: Option<NodeId> = None;
    let mut joined = 0;

    for (leaf, text) in leaves {
        for (i, c) in text.char_indices() {
            if c == TAG_START {
                if open.is_some() {
                    return Err(violation_at_leaf(doc, &leaf, StructuralErrorKind::NestedTagOpen));
                }
                open = Some(leaf.clone());
                chars.clear();
            } else if c == TAG_END {
                let Some(start) = open.take() else {
                    return Err(violation_at_leaf(
                        doc,
                        &leaf,
                        StructuralErrorKind::UnmatchedTagClose,
                    ));
                };
                if start != leaf {
                    chars.push(c);
                    let merged = format!("{}{}", doc.text(&start)?, chars);
                    trace!("joined split tag into `{merged}`");
                    doc.set_text(&start, merged)?;
                    doc.set_text(&leaf, &text[i + c.len_utf8()..])?;
                    joined += 1;
                }
            } else if open.as_ref().is_some_and(|start| *start != leaf) {
                chars.push(c);
            }
        }

        // everything in here now lives in the opening leaf
        if open.as_ref().is_some_and(|start| *start != leaf) {
            doc.set_text(&leaf, "")?;
        }
    }

    if let Some(start) = open {
        return Err(violation_at_leaf(doc, &start, StructuralErrorKind::UnclosedTag));
    }

    debug!("normalized template, {joined} split tag(s) joined");
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use crate::error::StructuralError;

    use super::*;

    fn leaf_texts(doc: &Document) -> Vec<String> {
        doc.text_leaves(doc.body())
            .unwrap()
            .map(|leaf| leaf.text.to_string())
            .collect()
    }

    fn kind_of(err: RenderError) -> StructuralErrorKind {
        match err {
            RenderError::Structural(StructuralError { kind, .. }) => kind,
            other => panic!("expected a structural error, got {other}"),
        }
    }

    #[test]
    fn joins_tag_split_over_two_leaves() {
        let mut doc = Document::from_runs([vec!["[na", "me]"]]).unwrap();
        assert_eq!(normalize(&mut doc).unwrap(), 1);
        assert_eq!(leaf_texts(&doc), vec!["[name]", ""]);
    }

    #[test]
    fn middle_leaves_are_emptied_and_tail_text_stays() {
        let mut doc = Document::from_runs([vec!["Hi [Ex", "peri", "ence] and", " more"]]).unwrap();
        normalize(&mut doc).unwrap();
        assert_eq!(
            leaf_texts(&doc),
            vec!["Hi [Experience]", "", " and", " more"]
        );
    }

    #[test]
    fn joins_across_paragraphs() {
        let mut doc = Document::from_runs([vec!["[work"], vec![" history]"]]).unwrap();
        normalize(&mut doc).unwrap();
        assert_eq!(leaf_texts(&doc), vec!["[work history]", ""]);
    }

    #[test]
    fn tag_reopened_in_the_closing_leaf() {
        let mut doc = Document::from_runs([vec!["[a", "] x [b", "c]"]]).unwrap();
        assert_eq!(normalize(&mut doc).unwrap(), 2);
        assert_eq!(leaf_texts(&doc), vec!["[a]", " x [bc]", ""]);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let mut doc = Document::from_runs([
            vec!["[!sum", "mary]"],
            vec!["<[ti", "tle] — [", "years] yrs>"],
        ])
        .unwrap();
        normalize(&mut doc).unwrap();
        let once = leaf_texts(&doc);
        assert_eq!(normalize(&mut doc).unwrap(), 0);
        assert_eq!(leaf_texts(&doc), once);
    }

    #[test]
    fn rejects_malformed_brackets() {
        let mut nested = Document::from_runs([vec!["[a [b]"]]).unwrap();
        assert_eq!(
            kind_of(normalize(&mut nested).unwrap_err()),
            StructuralErrorKind::NestedTagOpen
        );

        let mut stray = Document::from_runs([vec!["a]"]]).unwrap();
        assert_eq!(
            kind_of(normalize(&mut stray).unwrap_err()),
            StructuralErrorKind::UnmatchedTagClose
        );

        let mut unclosed = Document::from_runs([vec!["[a", "b"]]).unwrap();
        assert_eq!(
            kind_of(normalize(&mut unclosed).unwrap_err()),
            StructuralErrorKind::UnclosedTag
        );
    }
}
