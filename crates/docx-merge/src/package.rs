//! OOXML package container
//!
//! A `.docx` is a ZIP archive of XML parts. `Package` keeps every entry in
//! archive order so an edited document can be written back with only the
//! changed part differing.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::MergeError;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

#[derive(Debug, Clone)]
struct PartEntry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// In-memory copy of a package's entries
#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<PartEntry>,
}

impl Package {
    /// Read every entry of a ZIP archive
    pub fn read(bytes: &[u8]) -> Result<Self, MergeError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| MergeError::malformed("not a ZIP package", e))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| MergeError::malformed("unreadable package entry", e))?;

            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)
                    .map_err(|e| MergeError::malformed(&format!("failed to read {}", file.name()), e))?;
            }

            entries.push(PartEntry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
                data,
            });
        }

        Ok(Self { entries })
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Part content as UTF-8 text
    pub fn part_text(&self, name: &str) -> Result<&str, MergeError> {
        let data = self
            .part(name)
            .ok_or_else(|| MergeError::MalformedDocument(format!("missing part {}", name)))?;
        std::str::from_utf8(data).map_err(|e| MergeError::malformed(name, e))
    }

    /// Replace the content of an existing part, keeping its position
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> Result<(), MergeError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| !e.is_dir && e.name == name)
            .ok_or_else(|| MergeError::MalformedDocument(format!("missing part {}", name)))?;
        entry.data = data;
        Ok(())
    }

    /// Path of the main document part.
    ///
    /// Follows the `officeDocument` relationship of the package when there
    /// is one; otherwise assumes `word/document.xml`.
    pub fn main_part_name(&self) -> Result<String, MergeError> {
        if let Some(rels) = self.part(PACKAGE_RELS) {
            let text = std::str::from_utf8(rels).map_err(|e| MergeError::malformed(PACKAGE_RELS, e))?;
            let doc = roxmltree::Document::parse(text)
                .map_err(|e| MergeError::malformed(PACKAGE_RELS, e))?;

            let target = doc
                .descendants()
                .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
                .find(|n| {
                    n.attribute("Type")
                        .map(|t| t.ends_with(OFFICE_DOCUMENT_REL))
                        .unwrap_or(false)
                })
                .and_then(|n| n.attribute("Target"));

            if let Some(target) = target {
                return Ok(target.trim_start_matches('/').to_string());
            }
        }

        Ok(DEFAULT_MAIN_PART.to_string())
    }

    /// Serialize back to a ZIP archive, entries in original order.
    ///
    /// Stored entries stay stored; everything else is deflated. Timestamps
    /// are fixed so equal content gives equal bytes.
    pub fn write(&self) -> Result<Vec<u8>, MergeError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default()
                .compression_method(method)
                .last_modified_time(DateTime::default());

            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(|e| MergeError::PackageWrite(e.to_string()))?;
                continue;
            }

            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| MergeError::PackageWrite(e.to_string()))?;
            writer
                .write_all(&entry.data)
                .map_err(|e| MergeError::PackageWrite(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| MergeError::PackageWrite(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
