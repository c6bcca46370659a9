use crate::kernel::encoding::EncodingTag;
use crate::kernel::search::CaseFold;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILTER: &str = "esnpad=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Encoding used when the host converts without an explicit choice.
    #[serde(default = "default_encoding")]
    pub default_encoding: EncodingTag,
    /// Fold used by case-insensitive find.
    #[serde(default)]
    pub case_fold: CaseFold,
    /// `tracing_subscriber::EnvFilter` directive, `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_encoding() -> EncodingTag {
    EncodingTag::Utf8
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Settings {
    /// `default_encoding` if it can be written as is, else UTF-8.
    pub fn save_encoding(&self) -> EncodingTag {
        if self.default_encoding.is_saveable() {
            self.default_encoding
        } else {
            EncodingTag::Utf8
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            case_fold: CaseFold::default(),
            log_filter: default_log_filter(),
        }
    }
}
