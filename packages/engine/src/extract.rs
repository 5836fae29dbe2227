use log::debug;
use tagfill_document::{Document, NodeId};

use crate::error::{
    paragraph_of, violation_at_leaf, Location, RenderError, StructuralError, StructuralErrorKind,
};

pub const LOOP_START: char = '<';
pub const LOOP_END: char = '>';

/// A loop body cut out of the document.
#[derive(Debug)]
pub struct LoopFragment {
    /// Block holding the loop start; instances are inserted right after it.
    pub anchor: NodeId,
    /// Copies of every block from `<` to `>`, in document order.
    pub template: Document,
    /// The blocks the template was copied from.
    pub originals: Vec<NodeId>,
}

impl LoopFragment {
    pub fn width(&self) -> usize {
        self.originals.len()
    }
}

/// Copies the loop following the paragraph of a section tag.
///
/// The walk covers the blocks after `paragraph` (or `paragraph` itself when
/// it is the last block). The first `<` opens the loop; each block met from
/// there on is copied once, up to the block holding the first `>`. That
/// closing block may not hold any further loop marker.
pub fn extract_loop(
    doc: &Document,
    section: &str,
    paragraph: &NodeId,
) -> Result<LoopFragment, RenderError> {
    let mut template = Document::new();
    let template_body = template.body().clone();
    let mut anchor: Option<NodeId> = None;
    let mut closed: Option<NodeId> = None;
    let mut previous: Option<NodeId> = None;
    let mut originals = Vec::new();
    let mut closing_group = 0;

    for leaf in doc.sibling_text_leaves(paragraph)? {
        let block = paragraph_of(doc, &leaf.id)
            .map_err(|err| in_section(err, section))?;
        if closed.as_ref().is_some_and(|end| *end != block) {
            break;
        }

        for c in leaf.text.chars() {
            let kind = match c {
                LOOP_START | LOOP_END if closed.is_some() => StructuralErrorKind::MultipleLoops,
                LOOP_START if anchor.is_some() => StructuralErrorKind::NestedLoop,
                LOOP_START => {
                    anchor = Some(block.clone());
                    continue;
                }
                LOOP_END if anchor.is_none() => StructuralErrorKind::LoopCloseBeforeOpen,
                LOOP_END => {
                    closed = Some(block.clone());
                    closing_group = leaf.group;
                    continue;
                }
                _ => continue,
            };
            return Err(in_section(violation_at_leaf(doc, &leaf.id, kind), section));
        }

        if anchor.is_some() && previous.as_ref() != Some(&block) {
            template.append_copy(&template_body, doc, &block)?;
            originals.push(block.clone());
            previous = Some(block);
        }
    }

    match (anchor, closed) {
        (Some(anchor), Some(_)) => {
            debug!(
                "loop for `{section}` spans {} block(s), closes in sibling #{closing_group}",
                originals.len()
            );
            Ok(LoopFragment {
                anchor,
                template,
                originals,
            })
        }
        (Some(anchor), None) => Err(StructuralError::new(
            StructuralErrorKind::UnclosedLoop,
            Location::of_block(doc, &anchor).in_section(section),
        )
        .into()),
        (None, _) => Err(StructuralError::new(
            StructuralErrorKind::LoopNotFound,
            Location::of_block(doc, paragraph).in_section(section),
        )
        .into()),
    }
}

fn in_section(err: RenderError, section: &str) -> RenderError {
    match err {
        RenderError::Structural(mut err) => {
            err.location.section = Some(section.to_string());
            err.into()
        }
        other => other,
    }
}
