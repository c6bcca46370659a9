//! Open document state.
//!
//! Owns the text together with the encoding it was loaded from, the active
//! file and the dirty flag. Load and save go through a `FileProvider`;
//! conversion goes through `kernel::encoding`.

use crate::kernel::encoding::{self, CodecError, EncodingTag};
use crate::kernel::search::{self, MatchResult, SearchCursor, SearchQuery};
use crate::kernel::services::ports::file::{FileError, FileProvider};
use crate::models::TextBuffer;
use std::fmt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug)]
pub enum DocumentError {
    File(FileError),
    /// The bytes could not be decoded; the document was reset to empty.
    Decode(CodecError),
    Encode(CodecError),
    /// Save without a file; the host should ask for one (save as).
    NoActivePath,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::File(e) => write!(f, "{}", e),
            DocumentError::Decode(e) => write!(f, "Decode failed: {}", e),
            DocumentError::Encode(e) => write!(f, "Encode failed: {}", e),
            DocumentError::NoActivePath => write!(f, "No active file"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::File(e) => Some(e),
            DocumentError::Decode(e) | DocumentError::Encode(e) => Some(e),
            DocumentError::NoActivePath => None,
        }
    }
}

impl From<FileError> for DocumentError {
    fn from(e: FileError) -> Self {
        DocumentError::File(e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    text: TextBuffer,
    encoding: EncodingTag,
    path: Option<PathBuf>,
    dirty: bool,
    selection: SearchCursor,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// "New document": empty, unspecified encoding, no file.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn encoding(&self) -> EncodingTag {
        self.encoding
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selection(&self) -> SearchCursor {
        self.selection
    }

    pub fn set_text(&mut self, text: TextBuffer) {
        self.text = text;
        self.dirty = true;
        let len = self.text.len();
        self.selection = SearchCursor::new(
            self.selection.selection_start.min(len),
            self.selection.selection_end.min(len),
        );
    }

    pub fn set_selection(&mut self, selection: SearchCursor) {
        self.selection = selection;
    }

    /// Loads `path`. A decode failure still succeeds in leaving an empty,
    /// usable document behind, but it has no active file and an
    /// `Unspecified` encoding.
    pub fn open(&mut self, provider: &dyn FileProvider, path: &Path) -> Result<()> {
        self.path = None;
        let bytes = provider.read_file_bytes(path)?;

        match encoding::decode(&bytes) {
            Ok(decoded) => {
                self.text = decoded.text;
                self.encoding = decoded.encoding;
                self.path = Some(path.to_path_buf());
                self.dirty = false;
                self.selection = SearchCursor::default();
                tracing::info!(
                    scheme = provider.scheme(),
                    path = %path.display(),
                    encoding = %self.encoding,
                    units = self.text.len(),
                    "document opened"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "document could not be decoded");
                self.reset();
                Err(DocumentError::Decode(e))
            }
        }
    }

    /// Writes the text to the active file in the current encoding.
    pub fn save(&mut self, provider: &dyn FileProvider) -> Result<()> {
        let path = self.path.as_deref().ok_or(DocumentError::NoActivePath)?;
        let bytes = encoding::encode(&self.text, self.encoding).map_err(DocumentError::Encode)?;
        provider.write_file_bytes(path, &bytes)?;
        self.dirty = false;
        tracing::info!(
            path = %path.display(),
            encoding = %self.encoding,
            bytes = bytes.len(),
            "document saved"
        );
        Ok(())
    }

    /// Adopts `path` and `encoding`, then saves.
    pub fn save_as(
        &mut self,
        provider: &dyn FileProvider,
        path: &Path,
        encoding: EncodingTag,
    ) -> Result<()> {
        self.path = Some(path.to_path_buf());
        self.encoding = encoding;
        self.save(provider)
    }

    /// Finds from the current selection and selects the hit.
    pub fn find_next(&mut self, query: &SearchQuery) -> MatchResult {
        let result = search::find(self.text.as_units(), query, self.selection);
        if let Some(cursor) = result.cursor() {
            self.selection = cursor;
        }
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/document.rs"]
mod tests;
