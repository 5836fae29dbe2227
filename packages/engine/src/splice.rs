use log::debug;
use tagfill_document::{CopyMap, Document, DocumentError, ElementKind, NodeId};

use crate::{error::RenderError, extract::LoopFragment, instance::Instance, registry::TagRegistry};

/// Puts the instances into the document right after the loop anchor, in
/// order, then removes the template blocks. `header` is the paragraph of a
/// suppressed section tag; it is removed as well.
///
/// Returns the instances' nested tags, pointing at the inserted leaves.
pub fn splice_loop(
    doc: &mut Document,
    fragment: &LoopFragment,
    instances: &[Instance],
    header: Option<&NodeId>,
) -> Result<TagRegistry, RenderError> {
    let container = doc
        .parent(&fragment.anchor)?
        .ok_or(DocumentError::Detached {
            kind: ElementKind::Paragraph,
        })?;
    let mut index = doc.position(&fragment.anchor)? + 1;

    let mut nested = TagRegistry::new();
    let mut inserted = 0;
    for instance in instances {
        let mut copies = CopyMap::new();
        for block in instance.document.children(instance.document.body())? {
            copies.extend(doc.insert_copy(&container, index, &instance.document, &block)?);
            index += 1;
            inserted += 1;
        }
        nested.extend(instance.nested.remap(&copies));
    }
    debug!(
        "inserted {inserted} block(s) for {} instance(s)",
        instances.len()
    );

    for block in fragment.originals.iter().chain(header) {
        if doc.contains(block) {
            doc.remove(block)?;
        }
    }
    Ok(nested)
}

#[cfg(test)]
mod tests {
    use crate::{extract::extract_loop, instance::instance_loop, types::Dict};

    use super::*;

    fn jobs() -> Vec<Dict> {
        ["Engineer", "Lead", "Director"]
            .into_iter()
            .map(|title| [("title", title)].into_iter().collect())
            .collect()
    }

    #[test]
    fn instances_land_after_anchor_in_record_order() {
        let mut doc = Document::from_runs([
            vec!["Experience"],
            vec!["<[title]"],
            vec!["--->"],
            vec!["Education"],
        ])
        .unwrap();
        let header = doc.paragraphs()[0].clone();
        let fragment = extract_loop(&doc, "experience", &header).unwrap();

        let jobs = jobs();
        let records: Vec<&Dict> = jobs.iter().collect();
        let instances = instance_loop(&fragment.template, &records).unwrap();
        splice_loop(&mut doc, &fragment, &instances, None).unwrap();

        assert_eq!(
            doc.to_string(),
            "Experience\nEngineer\n---\nLead\n---\nDirector\n---\nEducation\n"
        );
        // 3 records x 2 blocks, plus the two blocks around the loop
        assert_eq!(doc.paragraphs().len(), 3 * fragment.width() + 2);
        for original in &fragment.originals {
            assert!(!doc.contains(original));
        }
    }

    #[test]
    fn suppressed_header_is_removed() {
        let mut doc = Document::from_runs([vec!["[!experience]"], vec!["<[title]>"]]).unwrap();
        let header = doc.paragraphs()[0].clone();
        let fragment = extract_loop(&doc, "experience", &header).unwrap();

        let jobs = jobs();
        let records: Vec<&Dict> = jobs.iter().take(1).collect();
        let instances = instance_loop(&fragment.template, &records).unwrap();
        splice_loop(&mut doc, &fragment, &instances, Some(&header)).unwrap();

        assert_eq!(doc.to_string(), "Engineer\n");
    }

    #[test]
    fn anchor_that_is_also_the_header_is_removed_once() {
        let mut doc = Document::from_runs([vec!["intro"], vec!["[!skills] <[name]>"]]).unwrap();
        let header = doc.paragraphs()[1].clone();
        let fragment = extract_loop(&doc, "skills", &header).unwrap();
        assert_eq!(fragment.anchor, header);

        let instances = instance_loop(&fragment.template, &[]).unwrap();
        splice_loop(&mut doc, &fragment, &instances, Some(&header)).unwrap();
        assert_eq!(doc.to_string(), "intro\n");
    }

    #[test]
    fn nested_tags_point_into_the_document() {
        let mut doc = Document::from_runs([vec!["S"], vec!["<[title] [more]>"]]).unwrap();
        let header = doc.paragraphs()[0].clone();
        let fragment = extract_loop(&doc, "s", &header).unwrap();

        let jobs = jobs();
        let records: Vec<&Dict> = jobs.iter().collect();
        let instances = instance_loop(&fragment.template, &records).unwrap();
        let nested = splice_loop(&mut doc, &fragment, &instances, None).unwrap();

        let hit = nested.get("more").unwrap();
        assert!(doc.contains(&hit.leaf));
        assert_eq!(doc.text(&hit.leaf).unwrap(), "Director [more]");
    }
}
