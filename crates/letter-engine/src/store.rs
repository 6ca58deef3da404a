//! Template file access

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::GenerationError;

/// Source of template documents, keyed by a template's stored path
pub trait TemplateStore {
    /// Store identifier, for logs
    fn name(&self) -> &'static str;

    /// Template bytes, `None` when no template exists at `path`
    fn load(&self, path: &str) -> Result<Option<Vec<u8>>, GenerationError>;
}

/// Templates on disk below a root directory
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored path; rejects paths leaving the root
    pub fn resolve(&self, path: &str) -> Result<PathBuf, GenerationError> {
        let relative = Path::new(path.trim_start_matches(['/', '\\']));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(GenerationError::InvalidTemplatePath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl TemplateStore for FsTemplateStore {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn load(&self, path: &str) -> Result<Option<Vec<u8>>, GenerationError> {
        let full_path = self.resolve(path)?;
        match fs::read(&full_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(GenerationError::Io {
                path: full_path.display().to_string(),
                source,
            }),
        }
    }
}

/// Templates held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    templates: HashMap<String, Vec<u8>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.templates.insert(path.into(), bytes);
    }

    pub fn with_template(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self, path: &str) -> Result<Option<Vec<u8>>, GenerationError> {
        Ok(self.templates.get(path).cloned())
    }
}
