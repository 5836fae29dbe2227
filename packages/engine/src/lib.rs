use log::{info, warn};
use tagfill_document::Document;

pub mod error;
pub mod extract;
pub mod instance;
pub mod normalize;
pub mod registry;
pub mod resolve;
pub mod splice;
pub mod types;

pub use error::{Location, RenderError, StructuralError, StructuralErrorKind};
pub use registry::{TagHit, TagRegistry};
pub use types::{Dict, Value};

use error::paragraph_of;
use extract::extract_loop;
use instance::{instance_loop, records_of};
use normalize::normalize;
use resolve::resolve_tags;
use splice::splice_loop;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Stop after normalization: split tags are joined, nothing is substituted.
    pub skip: bool,
}

/// What a render found, for the caller's reference. Leaf ids point into the
/// rendered document.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Top-level tags that named a known section.
    pub sections: TagRegistry,
    /// Tags still present inside expanded loops.
    pub nested: TagRegistry,
    /// How many split tags normalization joined.
    pub joined: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.options.skip = skip;
        self
    }

    /// Fills `doc` with `data`.
    ///
    /// The work happens on a copy that replaces `doc` only once everything
    /// succeeded: on error `doc` is untouched. Node ids taken from `doc`
    /// before the call do not carry over to the rendered document.
    pub fn render(&self, doc: &mut Document, data: &Dict) -> Result<Report, RenderError> {
        let mut working = doc.deep_copy()?;
        let report = self.render_in_place(&mut working, data)?;
        *doc = working;
        Ok(report)
    }

    fn render_in_place(&self, doc: &mut Document, data: &Dict) -> Result<Report, RenderError> {
        let mut report = Report {
            joined: normalize(doc)?,
            ..Default::default()
        };
        if self.options.skip {
            info!("skip set, tags are left unresolved");
            return Ok(report);
        }

        let resolution = resolve_tags(doc, data)?;
        for paragraph in &resolution.dropped {
            if doc.contains(paragraph) {
                doc.remove(paragraph)?;
            }
        }

        for (section, hit) in resolution.tags.iter() {
            let Some(Value::List(items)) = data.get_ignore_case(section) else {
                continue;
            };
            if !doc.contains(&hit.leaf) {
                warn!("tag of section `{section}` is no longer in the document, skipping it");
                continue;
            }
            let records = records_of(section, items)?;

            let paragraph = paragraph_of(doc, &hit.leaf)?;
            let fragment = extract_loop(doc, section, &paragraph)?;
            let instances = instance_loop(&fragment.template, &records)?;
            let header = hit.suppress.then_some(&paragraph);
            let nested = splice_loop(doc, &fragment, &instances, header)?;

            info!(
                "rendered section `{section}`: {} record(s) x {} block(s)",
                records.len(),
                fragment.width()
            );
            report.nested.extend(nested);
        }

        report.sections = resolution.tags;
        Ok(report)
    }
}

/// Renders with default options.
pub fn render(doc: &mut Document, data: &Dict) -> Result<Report, RenderError> {
    Renderer::new().render(doc, data)
}
