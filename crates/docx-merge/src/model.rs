//! Read-only outline of a document's body

use serde::Serialize;

use crate::error::MergeError;
use crate::merge::{paragraph_style, run_text};
use crate::package::Package;
use crate::xml::{Element, XmlDocument};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<String>,
        text: String,
    },
    /// Rows of cells of blocks
    Table { rows: Vec<Vec<Vec<Block>>> },
}

/// Paragraphs and tables of the main document part, in document order
pub fn outline(bytes: &[u8]) -> Result<Vec<Block>, MergeError> {
    let package = Package::read(bytes)?;
    let main_part = package.main_part_name()?;
    let document = XmlDocument::parse(package.part_text(&main_part)?)?;
    let body = document
        .root
        .child("body")
        .ok_or_else(|| MergeError::MalformedDocument(format!("{} has no body", main_part)))?;
    Ok(blocks(body))
}

/// Text of every paragraph, tables flattened row by row
pub fn paragraph_texts(blocks: &[Block]) -> Vec<String> {
    let mut out = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph { text, .. } => out.push(text.clone()),
            Block::Table { rows } => {
                for cell in rows.iter().flatten() {
                    out.extend(paragraph_texts(cell));
                }
            }
        }
    }
    out
}

fn blocks(container: &Element) -> Vec<Block> {
    let mut out = Vec::new();
    for child in container.child_elements() {
        if child.is("p") {
            out.push(Block::Paragraph {
                style: paragraph_style(child.child("pPr")).map(str::to_string),
                text: paragraph_text(child),
            });
        } else if child.is("tbl") {
            let rows: Vec<Vec<Vec<Block>>> = child
                .child_elements()
                .filter(|e| e.is("tr"))
                .map(|row| {
                    row.child_elements()
                        .filter(|e| e.is("tc"))
                        .map(blocks)
                        .collect::<Vec<_>>()
                })
                .collect();
            out.push(Block::Table { rows });
        } else if child.is("sdt") || child.is("sdtContent") || child.is("customXml") {
            out.extend(blocks(child));
        }
    }
    out
}

fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    collect_text(paragraph, &mut text);
    text
}

fn collect_text(element: &Element, text: &mut String) {
    for child in element.child_elements() {
        if child.is("r") {
            text.push_str(&run_text(child));
        } else if !child.is("pPr") && !child.is("del") {
            collect_text(child, text);
        }
    }
}
