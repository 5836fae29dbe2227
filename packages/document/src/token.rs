use std::ops::Range;

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::opt,
    sequence::{delimited, pair},
    IResult,
};

/// A `[name]`, `[!name]` or `[name|alternate]` token found in some text.
#[derive(Debug, Clone, PartialEq)]
pub struct TagToken {
    /// The token as written, brackets included.
    pub raw: String,
    pub suppress: bool,
    /// Name as written, up to the first `|`.
    pub name: String,
    pub alt: Option<String>,
    /// Byte range of `raw` in the scanned text.
    pub span: Range<usize>,
}

impl TagToken {
    /// Lowercased name, the form registries are keyed by.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace()
}

fn top_level_tag(i: &str) -> IResult<&str, (Option<char>, &str)> {
    delimited(
        char('['),
        pair(
            opt(char('!')),
            take_while1(|c: char| is_name_char(c) || c == '|'),
        ),
        char(']'),
    )(i)
}

fn subtag(i: &str) -> IResult<&str, &str> {
    delimited(char('['), take_while1(is_name_char), char(']'))(i)
}

// tries `parser` at every `[`, leftmost first, never overlapping a match
fn scan<'a, O>(
    text: &'a str,
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> Vec<(Range<usize>, O)> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find('[') {
        let start = cursor + offset;
        match parser(&text[start..]) {
            Ok((rest, output)) => {
                let end = text.len() - rest.len();
                found.push((start..end, output));
                cursor = end;
            }
            Err(_) => cursor = start + 1,
        }
    }
    found
}

/// Every top-level tag token in `text`.
pub fn scan_tags(text: &str) -> Vec<TagToken> {
    scan(text, top_level_tag)
        .into_iter()
        .map(|(span, (bang, body))| {
            let mut parts = body.split('|');
            let name = parts.next().unwrap_or_default().to_string();
            let alt = parts.next().map(str::to_string);
            TagToken {
                raw: text[span.clone()].to_string(),
                suppress: bang.is_some(),
                name,
                alt,
                span,
            }
        })
        .collect()
}

/// Names of every loop subtag (`[name]`, no prefix or suffix) in `text`.
pub fn scan_subtags(text: &str) -> Vec<String> {
    scan(text, subtag)
        .into_iter()
        .map(|(_, name)| name.to_string())
        .collect()
}
