use std::{
    fs::{create_dir_all, read_to_string},
    path::PathBuf,
};

use anyhow::Context;
use log::debug;
use tagfill_document::token::scan_tags;
use tagfill_engine::Renderer;

use crate::{data, outline, InspectArgs, RenderArgs};

pub struct RenderSummary {
    pub sections: Vec<String>,
    pub nested: Vec<String>,
    pub joined: usize,
    pub output: Option<String>,
}

pub fn render(args: &RenderArgs) -> anyhow::Result<RenderSummary> {
    let template = read_to_string(&args.template)
        .with_context(|| format!("cannot read template `{}`", args.template))?;
    let source = read_to_string(&args.data)
        .with_context(|| format!("cannot read data `{}`", args.data))?;

    let mut doc = outline::parse(&template)?;
    let data = data::load(&source)
        .with_context(|| format!("cannot load data `{}`", args.data))?;
    debug!("loaded {} section(s) from `{}`", data.len(), args.data);
    let report = Renderer::new().skip(args.skip).render(&mut doc, &data)?;
    let rendered = outline::write(&doc)?;

    match &args.out {
        Some(out) => {
            let path = PathBuf::from(out);
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                if !dir.is_dir() {
                    create_dir_all(dir)?;
                }
            }
            std::fs::write(&path, rendered)?;
        }
        None => print!("{rendered}"),
    }

    Ok(RenderSummary {
        sections: report.sections.names().map(str::to_string).collect(),
        nested: report.nested.names().map(str::to_string).collect(),
        joined: report.joined,
        output: args.out.clone(),
    })
}

pub struct TagListing {
    pub block: usize,
    pub raw: String,
    pub suppress: bool,
    pub alt: Option<String>,
}

/// Joins split tags, then lists every top-level tag token per block.
pub fn inspect(args: &InspectArgs) -> anyhow::Result<Vec<TagListing>> {
    let template = read_to_string(&args.template)
        .with_context(|| format!("cannot read template `{}`", args.template))?;
    let mut doc = outline::parse(&template)?;
    Renderer::new()
        .skip(true)
        .render(&mut doc, &Default::default())?;
    list_tags(&doc)
}

fn list_tags(doc: &tagfill_document::Document) -> anyhow::Result<Vec<TagListing>> {
    let mut tags = Vec::new();
    for (block, paragraph) in doc.paragraphs().iter().enumerate() {
        for leaf in doc.text_leaves(paragraph)? {
            for token in scan_tags(leaf.text) {
                tags.push(TagListing {
                    block,
                    raw: token.raw,
                    suppress: token.suppress,
                    alt: token.alt,
                });
            }
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_tags_after_joining_split_runs() {
        let mut doc = outline::parse("[!sum\tmary]\nplain\n[skills|Toolbox] <[name]>\n").unwrap();
        Renderer::new()
            .skip(true)
            .render(&mut doc, &Default::default())
            .unwrap();

        let tags = list_tags(&doc).unwrap();
        let raw: Vec<&str> = tags.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raw, vec!["[!summary]", "[skills|Toolbox]", "[name]"]);
        assert_eq!(tags[0].block, 0);
        assert!(tags[0].suppress);
        assert_eq!(tags[1].block, 2);
        assert_eq!(tags[1].alt.as_deref(), Some("Toolbox"));
    }
}
