//! Encoding detection and conversion.
//!
//! Bytes on disk <-> UTF-16 code units in memory. Detection only looks at
//! the byte order mark; anything without one is treated as UTF-8.
//!
//! | tag       | header     | remainder                      |
//! |-----------|------------|--------------------------------|
//! | `Utf16Le` | `FF FE`    | little-endian 16-bit units     |
//! | `Utf16Be` | `FE FF`    | rejected                       |
//! | `Utf8Bom` | `EF BB BF` | UTF-8                          |
//! | `Utf8`    | none       | UTF-8 (covers 7-bit ANSI text) |

use crate::models::TextBuffer;
use encoding_rs::DecoderResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// UTF-16 big-endian BOM; there is no decoder for it.
    UnsupportedEncoding,
    /// Not valid UTF-8 after the first `valid_up_to` payload bytes.
    InvalidEncoding { valid_up_to: usize },
    /// A conversion buffer could not be sized or reserved.
    Allocation { requested: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnsupportedEncoding => write!(f, "Unsupported encoding: UTF-16 BE"),
            CodecError::InvalidEncoding { valid_up_to } => {
                write!(f, "Invalid UTF-8 after {} bytes", valid_up_to)
            }
            CodecError::Allocation { requested } => {
                write!(f, "Cannot allocate conversion buffer of {} elements", requested)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Encoding of a document, as detected on open or chosen on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EncodingTag {
    #[default]
    #[serde(rename = "unspecified")]
    Unspecified,
    #[serde(rename = "ansi")]
    Ansi,
    #[serde(rename = "utf8")]
    Utf8,
    #[serde(rename = "utf8-bom")]
    Utf8Bom,
    #[serde(rename = "utf16le")]
    Utf16Le,
    #[serde(rename = "utf16be")]
    Utf16Be,
}

impl EncodingTag {
    /// Encodings a document can be saved as, in save dialog order.
    /// The 1-based position of each entry equals its `id()`.
    pub const SAVE_CHOICES: [EncodingTag; 3] =
        [EncodingTag::Utf8, EncodingTag::Utf8Bom, EncodingTag::Utf16Le];

    pub fn id(self) -> i32 {
        match self {
            EncodingTag::Unspecified => -1,
            EncodingTag::Ansi => 0,
            EncodingTag::Utf8 => 1,
            EncodingTag::Utf8Bom => 2,
            EncodingTag::Utf16Le => 3,
            EncodingTag::Utf16Be => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            -1 => Some(EncodingTag::Unspecified),
            0 => Some(EncodingTag::Ansi),
            1 => Some(EncodingTag::Utf8),
            2 => Some(EncodingTag::Utf8Bom),
            3 => Some(EncodingTag::Utf16Le),
            4 => Some(EncodingTag::Utf16Be),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EncodingTag::Unspecified => "unspecified",
            EncodingTag::Ansi => "ansi",
            EncodingTag::Utf8 => "utf8",
            EncodingTag::Utf8Bom => "utf8-bom",
            EncodingTag::Utf16Le => "utf16le",
            EncodingTag::Utf16Be => "utf16be",
        }
    }

    /// Header bytes written in front of the payload by `encode`.
    pub fn bom(self) -> &'static [u8] {
        match self {
            EncodingTag::Utf8Bom => &UTF8_BOM,
            EncodingTag::Utf16Le => &UTF16_LE_BOM,
            EncodingTag::Utf16Be => &UTF16_BE_BOM,
            _ => &[],
        }
    }

    /// Zero-based entry of `SAVE_CHOICES` to preselect for this tag.
    pub fn save_choice_index(self) -> Option<usize> {
        Self::SAVE_CHOICES.iter().position(|&tag| tag == self)
    }

    /// `encode` writes exactly this encoding; other tags fall back to UTF-8.
    pub fn is_saveable(self) -> bool {
        self.save_choice_index().is_some()
    }
}

impl fmt::Display for EncodingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEncodingTagError(String);

impl fmt::Display for ParseEncodingTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown encoding: {}", self.0)
    }
}

impl std::error::Error for ParseEncodingTagError {}

impl FromStr for EncodingTag {
    type Err = ParseEncodingTagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(tag) = s.trim().parse::<i32>().ok().and_then(EncodingTag::from_id) {
            return Ok(tag);
        }
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let tag = match normalized.as_str() {
            "unspecified" => EncodingTag::Unspecified,
            "ansi" => EncodingTag::Ansi,
            "utf8" => EncodingTag::Utf8,
            "utf8bom" => EncodingTag::Utf8Bom,
            "utf16" | "utf16le" => EncodingTag::Utf16Le,
            "utf16be" => EncodingTag::Utf16Be,
            _ => return Err(ParseEncodingTagError(s.to_string())),
        };
        Ok(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: TextBuffer,
    pub encoding: EncodingTag,
}

/// Classifies `bytes` by their prefix. First match wins.
pub fn detect(bytes: &[u8]) -> EncodingTag {
    if bytes.starts_with(&UTF16_LE_BOM) {
        EncodingTag::Utf16Le
    } else if bytes.starts_with(&UTF16_BE_BOM) {
        EncodingTag::Utf16Be
    } else if bytes.starts_with(&UTF8_BOM) {
        EncodingTag::Utf8Bom
    } else {
        EncodingTag::Utf8
    }
}

pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    let encoding = detect(bytes);
    let text = match encoding {
        EncodingTag::Utf16Le => {
            tracing::debug!(len = bytes.len(), "UTF-16 LE detected");
            decode_utf16le(&bytes[UTF16_LE_BOM.len()..])?
        }
        EncodingTag::Utf16Be => {
            tracing::debug!("UTF-16 BE is not supported");
            return Err(CodecError::UnsupportedEncoding);
        }
        EncodingTag::Utf8Bom => {
            tracing::debug!(len = bytes.len(), "UTF-8 with BOM detected");
            decode_utf8(&bytes[UTF8_BOM.len()..])?
        }
        _ => {
            tracing::debug!(len = bytes.len(), "treating data as UTF-8 or ANSI");
            decode_utf8(bytes)?
        }
    };
    Ok(Decoded { text, encoding })
}

fn decode_utf16le(payload: &[u8]) -> Result<TextBuffer> {
    let count = payload.len().div_ceil(2);
    let mut units = reserve::<u16>(count)?;
    // an odd trailing byte becomes the low half of a final unit
    units.extend(payload.chunks(2).map(|pair| match *pair {
        [lo, hi] => u16::from_le_bytes([lo, hi]),
        [lo] => u16::from(lo),
        _ => 0,
    }));
    Ok(TextBuffer::from_units(units))
}

fn decode_utf8(payload: &[u8]) -> Result<TextBuffer> {
    let payload = match memchr::memchr(0, payload) {
        Some(nul) => &payload[..nul],
        None => payload,
    };

    let mut decoder = encoding_rs::UTF_8.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf16_buffer_length(payload.len())
        .ok_or(CodecError::Allocation {
            requested: usize::MAX,
        })?;
    let mut units = reserve::<u16>(capacity)?;
    units.resize(capacity, 0);

    let (result, read, written) =
        decoder.decode_to_utf16_without_replacement(payload, &mut units, true);
    match result {
        DecoderResult::InputEmpty => {
            units.truncate(written);
            Ok(TextBuffer::from_units(units))
        }
        DecoderResult::Malformed(bad, after) => Err(CodecError::InvalidEncoding {
            valid_up_to: read.saturating_sub(usize::from(bad) + usize::from(after)),
        }),
        DecoderResult::OutputFull => Err(CodecError::Allocation {
            requested: capacity,
        }),
    }
}

pub fn encode(text: &TextBuffer, encoding: EncodingTag) -> Result<Vec<u8>> {
    encode_units(text.as_units(), encoding)
}

/// Serializes code units for `encoding`. Tags other than `Utf16Le` and
/// `Utf8Bom` produce plain UTF-8.
pub fn encode_units(units: &[u16], encoding: EncodingTag) -> Result<Vec<u8>> {
    match encoding {
        EncodingTag::Utf16Le => {
            let len = units
                .len()
                .checked_mul(2)
                .and_then(|n| n.checked_add(UTF16_LE_BOM.len()))
                .ok_or(CodecError::Allocation {
                    requested: usize::MAX,
                })?;
            let mut out = reserve::<u8>(len)?;
            out.extend_from_slice(&UTF16_LE_BOM);
            for unit in units {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            Ok(out)
        }
        EncodingTag::Utf8Bom => encode_utf8(units, &UTF8_BOM),
        _ => encode_utf8(units, &[]),
    }
}

fn encode_utf8(units: &[u16], bom: &[u8]) -> Result<Vec<u8>> {
    let body = utf8_len(units);
    let len = body.checked_add(bom.len()).ok_or(CodecError::Allocation {
        requested: usize::MAX,
    })?;
    let mut out = reserve::<u8>(len)?;
    out.extend_from_slice(bom);
    out.resize(len, 0);

    let (read, written) =
        encoding_rs::mem::convert_utf16_to_utf8_partial(units, &mut out[bom.len()..]);
    if read != units.len() {
        return Err(CodecError::Allocation { requested: len });
    }
    out.truncate(bom.len() + written);
    Ok(out)
}

/// Exact UTF-8 length of `units`. Unpaired surrogates count as U+FFFD.
pub fn utf8_len(units: &[u16]) -> usize {
    char::decode_utf16(units.iter().copied())
        .map(|c| c.map_or(char::REPLACEMENT_CHARACTER.len_utf8(), char::len_utf8))
        .sum()
}

fn reserve<T>(capacity: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| CodecError::Allocation { requested: capacity })?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/encoding.rs"]
mod tests;
