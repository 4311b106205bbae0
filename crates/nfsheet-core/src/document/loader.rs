//! Reading documents from an input directory.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, glob_with};
use tracing::{debug, warn};

use super::{ParsedDocument, decode_document, parse_document};
use crate::error::{DocumentError, NfsheetError};

/// Loads and parses named files from one directory.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    directory: PathBuf,
}

impl DocumentLoader {
    /// Create a loader rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The input directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of a named file.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Read, decode and parse a named file.
    pub fn load(&self, name: &str) -> Result<ParsedDocument, DocumentError> {
        let path = self.path_of(name);
        let bytes = fs::read(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        parse_document(&decode_document(&bytes)?)
    }

    /// List file names in the directory ending in `.<extension>`.
    ///
    /// The match is ASCII case-insensitive and the result is sorted by name.
    pub fn discover(&self, extension: &str) -> Result<Vec<String>, NfsheetError> {
        let directory = Pattern::escape(&self.directory.to_string_lossy());
        let pattern = format!("{directory}/*.{extension}");
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let entries = glob_with(&pattern, options)
            .map_err(|e| NfsheetError::Config(format!("invalid input pattern {pattern}: {e}")))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", e.path().display(), e.error());
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => names.push(name.to_string()),
                None => warn!("Skipping non UTF-8 file name {}", path.display()),
            }
        }
        names.sort();

        debug!(
            "Discovered {} .{} files in {}",
            names.len(),
            extension,
            self.directory.display()
        );
        Ok(names)
    }
}
