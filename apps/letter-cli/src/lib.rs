//! Engagement letter command-line host
//!
//! Loads a JSON catalog and case, runs the generation workflow and writes
//! the merged `.docx`.

pub mod case;
pub mod config;

use anyhow::{anyhow, Context};
use docx_merge::{outline, Block};
use letter_engine::{FsTemplateStore, GeneratedLetter, LetterGenerator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use case::{load_catalog, CaseFile};
use config::Config;

/// Inputs of one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub catalog: PathBuf,
    pub case: PathBuf,
    /// Output file; defaults to the letter's file name in the output directory
    pub out: Option<PathBuf>,
}

/// Generate one letter and write it to disk; returns the letter and its path
pub fn run_generate(
    config: &Config,
    request: &GenerateRequest,
) -> anyhow::Result<(GeneratedLetter, PathBuf)> {
    let catalog = load_catalog(&request.catalog)?;
    let case = CaseFile::from_file(&request.case)?;

    let questionnaire = catalog
        .questionnaire(&case.questionnaire_id)
        .ok_or_else(|| anyhow!("Unknown questionnaire: {}", case.questionnaire_id))?;
    let answers = case.answers_for(questionnaire)?;

    let generator = LetterGenerator::new(FsTemplateStore::new(&config.templates.dir))
        .with_options(config.merge.clone());
    let letter = generator
        .generate(questionnaire, &catalog, &answers)
        .with_context(|| format!("Failed to generate letter for {}", request.case.display()))?;

    let out = request
        .out
        .clone()
        .unwrap_or_else(|| config.output.dir.join(&letter.file_name));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(&out, &letter.bytes)
        .with_context(|| format!("Failed to write letter: {}", out.display()))?;

    info!(path = %out.display(), template = %letter.template_name, "letter written");
    Ok((letter, out))
}

/// Paragraph and table outline of a `.docx` file
pub fn run_inspect(path: &Path) -> anyhow::Result<Vec<Block>> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read document: {}", path.display()))?;
    outline(&bytes).with_context(|| format!("Not a readable document: {}", path.display()))
}

/// Render blocks one paragraph per line, table cells indented
pub fn render_outline(blocks: &[Block]) -> String {
    fn render(blocks: &[Block], depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        for block in blocks {
            match block {
                Block::Paragraph { style, text } => {
                    out.push_str(&indent);
                    if let Some(style) = style {
                        out.push_str(&format!("[{}] ", style));
                    }
                    out.push_str(text);
                    out.push('\n');
                }
                Block::Table { rows } => {
                    for (r, row) in rows.iter().enumerate() {
                        for (c, cell) in row.iter().enumerate() {
                            out.push_str(&format!("{}| row {} cell {}\n", indent, r + 1, c + 1));
                            render(cell, depth + 1, out);
                        }
                    }
                }
            }
        }
    }

    let mut out = String::new();
    render(blocks, 0, &mut out);
    out
}
