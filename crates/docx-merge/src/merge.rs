//! Keyword merge over the main document part
//!
//! The algorithm, per paragraph:
//! 1. Flatten the runs to plain text (`t`, `tab`, text-wrapping `br`, `cr`)
//! 2. For each keyword in map order, find the shortest run span whose joined
//!    text contains it, write the replaced text into the span's first run and
//!    blank the rest; searching resumes right after the inserted text, in the
//!    same run
//! 3. Split every run that received a replacement with line breaks: the first
//!    segment stays, every later segment becomes a new sibling paragraph
//!    carrying the original paragraph and run properties. Runs whose only
//!    breaks are soft `<w:br/>` from the template keep them.
//! 4. Give new paragraphs list styling from their leading `*` or `#`
//!
//! Paragraphs outside tables are processed first, then paragraphs inside
//! table cells. New paragraphs are never searched again.

use letter_types::SubstitutionMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MergeError;
use crate::package::Package;
use crate::xml::{Element, Node, XmlDocument};

/// Elements that can hold runs inside a paragraph
const RUN_CONTAINERS: &[&str] = &[
    "hyperlink",
    "ins",
    "smartTag",
    "fldSimple",
    "customXml",
    "sdt",
    "sdtContent",
];

/// Paragraph styles applied to list items created from line breaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub bullet_style: String,
    pub ordered_style: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            bullet_style: "ListBullet".to_string(),
            ordered_style: "ListParagraph".to_string(),
        }
    }
}

/// Running number for ordered list items within one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberingCounter {
    last: u32,
}

impl NumberingCounter {
    pub fn next(&mut self) -> u32 {
        self.last = self.last.saturating_add(1);
        self.last
    }

    /// Account for an existing item numbered `n`
    pub fn observe(&mut self, n: u32) {
        self.last = self.last.max(n);
    }

    pub fn last(&self) -> u32 {
        self.last
    }
}

/// Merge with default list styles
pub fn merge(bytes: &[u8], substitutions: &SubstitutionMap) -> Result<Vec<u8>, MergeError> {
    merge_with_options(bytes, substitutions, &MergeOptions::default())
}

/// Replace every keyword of `substitutions` in the document.
///
/// Returns the input bytes untouched when no paragraph changed.
pub fn merge_with_options(
    bytes: &[u8],
    substitutions: &SubstitutionMap,
    options: &MergeOptions,
) -> Result<Vec<u8>, MergeError> {
    let mut package = Package::read(bytes)?;
    let main_part = package.main_part_name()?;
    let mut document = XmlDocument::parse(package.part_text(&main_part)?)?;

    let body_index = document
        .root
        .child_index("body")
        .ok_or_else(|| MergeError::MalformedDocument(format!("{} has no body", main_part)))?;
    let body = document
        .root
        .element_at_mut(body_index)
        .ok_or_else(|| MergeError::MalformedDocument(format!("{} has no body", main_part)))?;

    let mut merger = Merger {
        substitutions,
        options,
        counter: NumberingCounter::default(),
        changed: 0,
        inserted: 0,
    };
    merger.walk(body, false, Pass::TopLevel);
    merger.walk(body, false, Pass::TableCells);

    if merger.changed == 0 {
        debug!(part = %main_part, "no keyword matched, document unchanged");
        return Ok(bytes.to_vec());
    }

    debug!(
        part = %main_part,
        paragraphs = merger.changed,
        inserted = merger.inserted,
        "keywords merged"
    );
    package.replace_part(&main_part, document.to_xml().into_bytes())?;
    package.write()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    TopLevel,
    TableCells,
}

struct Merger<'a> {
    substitutions: &'a SubstitutionMap,
    options: &'a MergeOptions,
    counter: NumberingCounter,
    changed: usize,
    inserted: usize,
}

impl Merger<'_> {
    fn walk(&mut self, container: &mut Element, in_cell: bool, pass: Pass) {
        let mut index = 0;
        while index < container.children.len() {
            let Some(child) = container.element_at_mut(index) else {
                index += 1;
                continue;
            };

            if child.is("p") {
                if in_cell == (pass == Pass::TableCells) {
                    let added = self.merge_paragraph(child);
                    let count = added.len();
                    container
                        .children
                        .splice(index + 1..index + 1, added.into_iter().map(Node::Element));
                    index += count;
                }
            } else {
                let in_cell = in_cell || child.is("tc");
                self.walk(child, in_cell, pass);
            }
            index += 1;
        }
    }

    /// Merge one paragraph in place; returns the paragraphs to insert after it
    fn merge_paragraph(&mut self, paragraph: &mut Element) -> Vec<Element> {
        let runs = run_paths(paragraph);
        let original: Vec<String> = runs
            .iter()
            .map(|path| paragraph.descend(path).map(run_text).unwrap_or_default())
            .collect();

        if self.has_ordered_style(paragraph.child("pPr")) {
            if let Some(n) = numeric_prefix(&original.concat()) {
                self.counter.observe(n);
            }
        }

        let mut texts = original.clone();
        // runs holding a replacement with line breaks
        let mut multiline: Vec<usize> = Vec::new();
        for (keyword, replacement) in self.substitutions.iter() {
            if keyword.is_empty() {
                continue;
            }
            let (mut from, mut offset) = (0, 0);
            while let Some((start, end, pos)) = find_span(&texts, from, offset, keyword) {
                let joined = texts[start..=end].concat();
                let mut merged = String::with_capacity(joined.len() + replacement.len());
                merged.push_str(&joined[..pos]);
                merged.push_str(replacement);
                merged.push_str(&joined[pos + keyword.len()..]);
                texts[start] = merged;
                for text in &mut texts[start + 1..=end] {
                    text.clear();
                }

                if has_line_break(replacement) || multiline.iter().any(|&i| i > start && i <= end)
                {
                    multiline.push(start);
                }
                from = start;
                offset = pos + replacement.len();
            }
        }

        multiline.sort_unstable();
        multiline.dedup();

        let mut added = Vec::new();
        for index in multiline {
            if !has_line_break(&texts[index]) {
                continue;
            }
            let mut segments = split_lines(&texts[index]).into_iter();
            texts[index] = segments.next().unwrap_or_default();

            let Some(run) = paragraph.descend(&runs[index]) else {
                continue;
            };
            for segment in segments {
                added.push(self.synthesize(paragraph, run, &segment));
            }
        }

        let prefix = paragraph.prefix().map(str::to_string);
        let mut touched = false;
        for (index, path) in runs.iter().enumerate() {
            if texts[index] == original[index] {
                continue;
            }
            if let Some(run) = paragraph.descend_mut(path) {
                set_run_text(run, prefix.as_deref(), &texts[index]);
                touched = true;
            }
        }

        if touched {
            self.changed += 1;
        }
        self.inserted += added.len();
        added
    }

    /// Build a new paragraph for one line of a multi-line replacement
    fn synthesize(&mut self, paragraph: &Element, run: &Element, segment: &str) -> Element {
        let prefix = paragraph.prefix();
        let mut properties = paragraph.child("pPr").cloned().map(|mut ppr| {
            ppr.children.retain(|n| {
                !matches!(n, Node::Element(e) if e.is("sectPr") || e.is("pPrChange"))
            });
            ppr
        });

        let (text, style) = if let Some(rest) = segment.strip_prefix('*') {
            (rest.trim_start().to_string(), Some(self.options.bullet_style.as_str()))
        } else if let Some(rest) = segment.strip_prefix('#') {
            let n = self.counter.next();
            (
                format!("{}. {}", n, rest.trim_start()),
                Some(self.options.ordered_style.as_str()),
            )
        } else {
            if self.has_ordered_style(properties.as_ref()) {
                if let Some(n) = numeric_prefix(segment) {
                    self.counter.observe(n);
                }
            }
            (segment.to_string(), None)
        };

        if let Some(style) = style {
            properties = Some(with_style(properties, prefix, style));
        }

        let mut new_run = Element::wml(prefix, "r");
        if let Some(rpr) = run.child("rPr") {
            new_run.children.push(Node::Element(rpr.clone()));
        }
        set_run_text(&mut new_run, prefix, &text);

        let mut new_paragraph = Element::wml(prefix, "p");
        if let Some(ppr) = properties {
            new_paragraph.children.push(Node::Element(ppr));
        }
        new_paragraph.children.push(Node::Element(new_run));
        new_paragraph
    }

    fn has_ordered_style(&self, properties: Option<&Element>) -> bool {
        paragraph_style(properties) == Some(self.options.ordered_style.as_str())
    }
}

/// Style id from a `pPr` element
pub fn paragraph_style(properties: Option<&Element>) -> Option<&str> {
    properties?.child("pStyle")?.attr("val")
}

/// Child-index paths of every run in a paragraph, in document order
fn run_paths(paragraph: &Element) -> Vec<Vec<usize>> {
    fn collect(element: &Element, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, child) in element.children.iter().enumerate() {
            let Node::Element(child) = child else {
                continue;
            };
            path.push(index);
            if child.is("r") {
                out.push(path.clone());
            } else if RUN_CONTAINERS.iter().any(|c| child.is(c)) {
                collect(child, path, out);
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    collect(paragraph, &mut Vec::new(), &mut out);
    out
}

/// Plain text of a run
pub fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in run.child_elements() {
        if child.is("t") {
            text.push_str(&child.text());
        } else if child.is("tab") {
            text.push('\t');
        } else if is_line_break(child) {
            text.push('\n');
        }
    }
    text
}

fn is_line_break(element: &Element) -> bool {
    element.is("cr")
        || (element.is("br") && matches!(element.attr("type"), None | Some("textWrapping")))
}

fn is_text_child(node: &Node) -> bool {
    matches!(node, Node::Element(e) if e.is("t") || e.is("tab") || is_line_break(e))
}

/// Replace a run's text content, keeping its properties and other children
fn set_run_text(run: &mut Element, prefix: Option<&str>, text: &str) {
    let insert_at = run
        .children
        .iter()
        .position(is_text_child)
        .unwrap_or(run.children.len());
    run.children.retain(|n| !is_text_child(n));

    let mut nodes = Vec::new();
    let mut pending = String::new();
    let flush = |pending: &mut String, nodes: &mut Vec<Node>| {
        if pending.is_empty() {
            return;
        }
        let mut t = Element::wml_with_attrs(prefix, "t", &[("xml:space", "preserve")]);
        t.children.push(Node::Text(std::mem::take(pending)));
        nodes.push(Node::Element(t));
    };
    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut pending, &mut nodes);
                nodes.push(Node::Element(Element::wml(prefix, "tab")));
            }
            '\n' => {
                flush(&mut pending, &mut nodes);
                nodes.push(Node::Element(Element::wml(prefix, "br")));
            }
            _ => pending.push(c),
        }
    }
    flush(&mut pending, &mut nodes);

    run.children.splice(insert_at..insert_at, nodes);
}

/// `pPr` carrying `style` as its first child, replacing any style or numbering
fn with_style(properties: Option<Element>, prefix: Option<&str>, style: &str) -> Element {
    let mut properties = properties.unwrap_or_else(|| Element::wml(prefix, "pPr"));
    properties
        .children
        .retain(|n| !matches!(n, Node::Element(e) if e.is("pStyle") || e.is("numPr")));
    properties.children.insert(
        0,
        Node::Element(Element::wml_with_attrs(prefix, "pStyle", &[("val", style)])),
    );
    properties
}

/// Shortest run span holding `keyword` at or after byte `offset` of run `from`.
///
/// Returns the span's first and last run and the keyword's byte position in
/// the span's joined text.
pub fn find_span(
    texts: &[String],
    from: usize,
    offset: usize,
    keyword: &str,
) -> Option<(usize, usize, usize)> {
    let mut joined = String::new();
    for end in from..texts.len() {
        let text = if end == from {
            texts[end].get(offset..)?
        } else {
            texts[end].as_str()
        };
        joined.push_str(text);
        let Some(found) = joined.find(keyword) else {
            continue;
        };

        // drop leading runs that end before the match
        let mut start = from;
        let mut skipped = 0;
        let mut len = texts[from].len() - offset;
        while start < end && skipped + len <= found {
            skipped += len;
            start += 1;
            len = texts[start].len();
        }
        let lead = if start == from { offset } else { 0 };
        return Some((start, end, found - skipped + lead));
    }
    None
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

/// Split on `\r\n`, `\n` or `\r`
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(str::to_string)
        .collect()
}

/// Number of an item written as `"12. text"`
pub fn numeric_prefix(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits == 0 || !text[digits..].starts_with('.') {
        return None;
    }
    text[..digits].parse().ok()
}
