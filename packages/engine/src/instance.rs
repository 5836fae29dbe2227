use log::{debug, trace};
use tagfill_document::{token::scan_subtags, Document, NodeId, TextLeaf};

use crate::{
    error::RenderError,
    extract::{LOOP_END, LOOP_START},
    registry::{TagHit, TagRegistry},
    types::{Dict, Value},
};

/// One filled-in copy of a loop template.
#[derive(Debug)]
pub struct Instance {
    pub document: Document,
    /// Tags left in the text after substitution, for chaining.
    pub nested: TagRegistry,
}

/// Every field name used by any record, in the order first seen.
pub fn subtag_keys(records: &[&Dict]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Makes one copy of `template` per record and fills in its `[field]` tags.
///
/// Every field known to any record is substituted in every copy; a record
/// lacking the field gets the empty string, so all copies have the same shape.
/// Loop markers are stripped from the copies.
pub fn instance_loop(
    template: &Document,
    records: &[&Dict],
) -> Result<Vec<Instance>, RenderError> {
    let keys = subtag_keys(records);
    let mut instances = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        debug!("applying loop record #{index}: {record}");
        let mut document = template.deep_copy()?;
        let body = document.body().clone();
        let leaves: Vec<(NodeId, String)> = document
            .sibling_text_leaves(&body)?
            .map(TextLeaf::into_owned)
            .collect();

        let mut nested = TagRegistry::new();
        for (leaf, text) in leaves {
            let mut text = text.replace(|c: char| c == LOOP_START || c == LOOP_END, "");
            for key in &keys {
                let token = format!("[{key}]");
                if !text.contains(&token) {
                    continue;
                }
                let value = match record.get(key) {
                    Some(value) => value.to_string(),
                    None => {
                        trace!("record #{index} has no `{key}`, rendering it empty");
                        String::new()
                    }
                };
                text = text.replace(&token, &value);
            }
            for name in scan_subtags(&text) {
                nested.insert(
                    name,
                    TagHit {
                        leaf: leaf.clone(),
                        suppress: false,
                    },
                );
            }
            document.set_text(&leaf, text)?;
        }
        instances.push(Instance { document, nested });
    }
    Ok(instances)
}

/// Records of a list section, which must all be dicts.
pub fn records_of<'a>(section: &str, items: &'a [Value]) -> Result<Vec<&'a Dict>, RenderError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_dict().ok_or_else(|| RenderError::RecordShape {
                section: section.to_string(),
                index,
                value_type: item.value_name(),
            })
        })
        .collect()
}
