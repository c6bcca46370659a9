//! Text buffer model
//!
//! The document text as UTF-16 code units:
//! - storage is `Vec<u16>`, offsets are code-unit offsets
//! - never contains U+0000 (every constructor stops at the first NUL)
//! - unpaired surrogates are kept verbatim, only lossy views replace them

use std::fmt;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TextBuffer {
    units: Vec<u16>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    pub fn from_units(mut units: Vec<u16>) -> Self {
        if let Some(nul) = units.iter().position(|&u| u == 0) {
            units.truncate(nul);
        }
        Self { units }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self {
            units: text.encode_utf16().take_while(|&u| u != 0).collect(),
        }
    }

    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Code units of `[start, start + len)`, clamped to the buffer.
    pub fn slice(&self, start: usize, len: usize) -> &[u16] {
        let start = start.min(self.units.len());
        let end = start.saturating_add(len).min(self.units.len());
        &self.units[start..end]
    }

    pub fn has_unpaired_surrogates(&self) -> bool {
        char::decode_utf16(self.units.iter().copied()).any(|c| c.is_err())
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::from_str(text)
    }
}

impl From<String> for TextBuffer {
    fn from(text: String) -> Self {
        Self::from_str(&text)
    }
}

impl AsRef<[u16]> for TextBuffer {
    fn as_ref(&self) -> &[u16] {
        &self.units
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.units.iter().copied()) {
            fmt::Write::write_char(f, c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextBuffer")
            .field(&self.to_string_lossy())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
