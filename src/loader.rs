//! Document loading and splitting.
//!
//! [`FolderLoader`] walks a documents folder, extracts plain text from each
//! matching file (PDF via `pdf-extract`, `.txt`/`.md` read as UTF-8), and
//! splits document content into overlapping chunks tagged with source
//! identity.
//!
//! A file that fails to load or extract is logged and skipped; one bad
//! document never blocks the rest of the folder.

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::chunk::split_text;
use crate::error::{Error, Result};
use crate::models::{Document, DocumentChunk};

/// Loads raw documents from a folder and splits them into chunks.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load every readable document under `folder`. Per-file failures are
    /// logged and skipped.
    async fn load(&self, folder: &Path) -> Result<Vec<Document>>;

    /// Split a document into chunks with deterministic
    /// `"{source}_chunk_{index}"` ids.
    fn split(&self, document: &Document) -> Vec<DocumentChunk>;
}

/// Filesystem loader for PDF and plain-text documents.
pub struct FolderLoader {
    chunk_size: usize,
    chunk_overlap: usize,
    include: GlobSet,
}

impl FolderLoader {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let include = build_globset(&["**/*.pdf", "**/*.txt", "**/*.md"])?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
            include,
        })
    }

    fn read_document(&self, path: &Path, name: &str) -> Result<Document> {
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        let content = if is_pdf {
            pdf_extract::extract_text(path)
                .map_err(|e| Error::Validation(format!("PDF extraction failed: {}", e)))?
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| Error::Validation(format!("failed to read file: {}", e)))?
        };

        Ok(Document {
            content,
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl DocumentLoader for FolderLoader {
    async fn load(&self, folder: &Path) -> Result<Vec<Document>> {
        if !folder.exists() {
            return Err(Error::Validation(format!(
                "documents folder does not exist: {}",
                folder.display()
            )));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(folder) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(folder).unwrap_or(path);
            let name = relative.to_string_lossy().to_string();

            if !self.include.is_match(&name) {
                continue;
            }

            match self.read_document(path, &name) {
                Ok(doc) => {
                    debug!(document = %name, bytes = doc.content.len(), "loaded document");
                    documents.push(doc);
                }
                Err(e) => {
                    warn!(document = %name, error = %e, "skipping document");
                }
            }
        }

        // Sort for deterministic ordering
        documents.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(documents)
    }

    fn split(&self, document: &Document) -> Vec<DocumentChunk> {
        split_text(&document.content, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| DocumentChunk::new(text, document.name.clone(), i))
            .collect()
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).map_err(|e| Error::Validation(format!("bad glob: {}", e)))?,
        );
    }
    builder
        .build()
        .map_err(|e| Error::Validation(format!("bad glob set: {}", e)))
}
