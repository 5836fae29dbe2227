//! Plain-text outline form of a document: one paragraph per line, the runs
//! of a paragraph separated by tabs.

use tagfill_document::{Document, DocumentError};

pub const RUN_SEPARATOR: char = '\t';

pub fn parse(source: &str) -> Result<Document, DocumentError> {
    let mut doc = Document::new();
    for line in source.lines() {
        let paragraph = doc.push_paragraph()?;
        if line.is_empty() {
            continue;
        }
        for run in line.split(RUN_SEPARATOR) {
            doc.push_run(&paragraph, Some(run))?;
        }
    }
    Ok(doc)
}

/// Writes `doc` back out. Runs left empty are dropped.
pub fn write(doc: &Document) -> Result<String, DocumentError> {
    let mut out = String::new();
    for paragraph in doc.paragraphs() {
        let mut runs = Vec::new();
        for run in doc.children(&paragraph)? {
            let text = doc.inner_text(&run)?;
            if !text.is_empty() {
                runs.push(text);
            }
        }
        out.push_str(&runs.join(&RUN_SEPARATOR.to_string()));
        out.push('\n');
    }
    Ok(out)
}
