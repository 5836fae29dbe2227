use log::{debug, trace};
use tagfill_document::{token::scan_tags, Document, NodeId, TextLeaf};

use crate::{
    error::{paragraph_of, RenderError},
    registry::{TagHit, TagRegistry},
    types::{Dict, Value},
};

/// Outcome of resolving the top-level tags of a document.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Every tag naming a known section.
    pub tags: TagRegistry,
    /// Paragraphs of suppressed tags that have no data behind them.
    pub dropped: Vec<NodeId>,
}

/// Finds the tags naming a section of `sections` and rewrites them.
///
/// * list section: the token becomes its name, or the whole leaf becomes the
///   alternate text when one is given; a `[!name]` token is left alone for
///   the loop splice to remove.
/// * any other value: the token becomes the value's text, and a `[!name]`
///   token with a blank value drops its paragraph.
/// * unknown name: left untouched, except `[!name]` which drops its paragraph.
pub fn resolve_tags(doc: &mut Document, sections: &Dict) -> Result<Resolution, RenderError> {
    debug!(
        "looking for tags: {}",
        sections.keys().collect::<Vec<_>>().join(",")
    );

    let body = doc.body().clone();
    let leaves: Vec<(NodeId, String)> = doc.text_leaves(&body)?.map(TextLeaf::into_owned).collect();

    let mut resolution = Resolution::default();
    for (leaf, text) in leaves {
        for token in scan_tags(&text) {
            let key = token.key();
            let Some(value) = sections.get_ignore_case(&key) else {
                if token.suppress {
                    debug!("no data for suppressed `{key}`, dropping its paragraph");
                    resolution.dropped.push(paragraph_of(doc, &leaf)?);
                }
                continue;
            };
            trace!("found tag `{}` for section `{key}`", token.raw);
            resolution.tags.insert(
                key.as_str(),
                TagHit {
                    leaf: leaf.clone(),
                    suppress: token.suppress,
                },
            );

            let current = doc.text(&leaf)?;
            let updated = match value {
                Value::List(_) if token.suppress => continue,
                Value::List(_) => match &token.alt {
                    Some(alt) => alt.clone(),
                    None => current.replace(&token.raw, &token.name),
                },
                scalar if token.suppress && scalar.is_blank() => {
                    debug!("`{key}` is blank, dropping its paragraph");
                    resolution.dropped.push(paragraph_of(doc, &leaf)?);
                    continue;
                }
                scalar => current.replace(&token.raw, &scalar.to_string()),
            };
            doc.set_text(&leaf, updated)?;
        }
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dict {
        let mut data = Dict::new();
        data.insert("Experience", Value::List(vec![]));
        data.insert("skills", Value::List(vec![]));
        data.insert("name", "Ada Lovelace");
        data.insert("phone", "");
        data
    }

    #[test]
    fn list_sections_become_headings() {
        let mut doc = Document::from_runs([vec!["[EXPERIENCE]:"], vec!["[skills|What I do]"]])
            .unwrap();
        let resolution = resolve_tags(&mut doc, &data()).unwrap();

        assert_eq!(doc.to_string(), "EXPERIENCE:\nWhat I do\n");
        assert_eq!(
            resolution.tags.names().collect::<Vec<_>>(),
            vec!["experience", "skills"]
        );
        assert!(resolution.dropped.is_empty());
    }

    #[test]
    fn suppressed_list_section_is_left_for_the_splice() {
        let mut doc = Document::from_runs([vec!["[!skills]"]]).unwrap();
        let resolution = resolve_tags(&mut doc, &data()).unwrap();

        assert_eq!(doc.to_string(), "[!skills]\n");
        assert!(resolution.tags.get("skills").unwrap().suppress);
    }

    #[test]
    fn scalars_are_substituted() {
        let mut doc = Document::from_runs([vec!["Name: [name]", " / [!phone]"], vec!["[!Name]"]])
            .unwrap();
        let resolution = resolve_tags(&mut doc, &data()).unwrap();

        assert_eq!(doc.to_string(), "Name: Ada Lovelace / [!phone]\nAda Lovelace\n");
        assert_eq!(resolution.dropped, vec![doc.paragraphs()[0].clone()]);
    }

    #[test]
    fn unknown_tags_pass_through_unless_suppressed() {
        let mut doc = Document::from_runs([vec!["[hobbies]"], vec!["[!summary]"]]).unwrap();
        let resolution = resolve_tags(&mut doc, &data()).unwrap();

        assert_eq!(doc.to_string(), "[hobbies]\n[!summary]\n");
        assert!(resolution.tags.is_empty());
        assert_eq!(resolution.dropped, vec![doc.paragraphs()[1].clone()]);
    }

    #[test]
    fn later_duplicate_wins() {
        let mut doc = Document::from_runs([vec!["[skills]"], vec!["[Skills]"]]).unwrap();
        let resolution = resolve_tags(&mut doc, &data()).unwrap();

        let second = doc.text_leaves(&doc.paragraphs()[1]).unwrap().next().unwrap().id;
        assert_eq!(resolution.tags.len(), 1);
        assert_eq!(resolution.tags.get("skills").unwrap().leaf, second);
    }
}
