//! Headless core: encoding conversion, find, document state.

pub mod document;
pub mod encoding;
pub mod search;
pub mod services;

pub use document::{Document, DocumentError};
pub use encoding::{decode, detect, encode, CodecError, Decoded, EncodingTag};
pub use search::{find, CaseFold, MatchResult, SearchCursor, SearchDirection, SearchQuery};
