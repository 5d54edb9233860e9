//! dialogue_convert: converts game dialogue data into Dialogue Expander JSON.
//!
//! Two source encodings are understood:
//! - game files: a flat `key → text` object where the key packs conditions
//!   (`Mon`, `spring_15`, `eventSeen_100`, `AcceptGift_(O)128`, `Rainy_Day_4`, ...)
//! - content-patch files: `{ "Changes": [ ... ] }` whose `EditData` records on
//!   `Characters/Dialogue/*` carry a `When` guard block and `Entries`
//!
//! Both produce a [`DialogueDocument`]: lines grouped by affection tier (0-10),
//! each mapped to plain text, a condition set or a list of condition sets.
//!
//! ```
//! use dialogue_convert::{ConvertOptions, convert_str, to_pretty_json};
//!
//! let doc = convert_str(r#"{"Mon": "Hi!", "3": "Howdy"}"#, &ConvertOptions::default()).unwrap();
//! let json = to_pretty_json(&doc).unwrap();
//! assert!(json.contains(r#""date": "Mon""#));
//! ```

pub mod bucket;
pub mod builder;
pub mod calendar;
pub mod coerce;
pub mod config;
pub mod event;
pub mod game_file;
pub mod guard;
pub mod patch_file;
pub mod pattern;
pub mod sanitize;
pub mod session;

pub use builder::{Condition, ConditionParseError, add_line, collect_conditions};
pub use config::{ConfigError, ConverterConfig, load_config};
pub use event::add_event;
pub use game_file::convert_game_file;
pub use patch_file::{ChangeRecord, PatchFile, convert_patch_file};
pub use pattern::{KeyMatch, RuleKind, SourceKind, classify};
pub use sanitize::sanitize;
pub use session::{ConversionSession, Ticket};

pub use dialogue_data::{ConditionSet, DialogueDocument, EventDocument, LineValue};

use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Options for a single conversion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Copy date, event and gift entries into every tier instead of one.
    pub expand_all: bool,
}

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source text is not valid JSON.
    #[error("source is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    /// The source parsed, but its top level is not an object.
    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
    /// `Changes` is present but not a list of records.
    #[error("malformed patch file: {0}")]
    PatchShape(String),
    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A parsed source file, sniffed into one of the two encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    GameFile(Map<String, Value>),
    PatchFile(PatchFile),
}

impl SourceDocument {
    /// Parse source text and decide which encoding it uses.
    ///
    /// # Errors
    /// [`ConvertError::Parse`] on malformed JSON, [`ConvertError::NotAnObject`]
    /// when the top level is not an object and [`ConvertError::PatchShape`]
    /// when `Changes` is not a list.
    pub fn parse(text: &str) -> Result<Self, ConvertError> {
        let value: Value = serde_json::from_str(text).map_err(ConvertError::Parse)?;
        Self::from_value(value)
    }

    /// Sniff an already parsed value: an object with `Changes` is a patch file.
    ///
    /// # Errors
    /// See [`SourceDocument::parse`].
    pub fn from_value(value: Value) -> Result<Self, ConvertError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(ConvertError::NotAnObject(json_kind(&other))),
        };
        if !map.contains_key("Changes") {
            return Ok(SourceDocument::GameFile(map));
        }
        serde_json::from_value(Value::Object(map))
            .map(SourceDocument::PatchFile)
            .map_err(|e| ConvertError::PatchShape(e.to_string()))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDocument::GameFile(_) => SourceKind::GameFile,
            SourceDocument::PatchFile(_) => SourceKind::PatchFile,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Convert a sniffed source document.
pub fn convert_source(source: &SourceDocument, options: &ConvertOptions) -> DialogueDocument {
    info!("converting {:?} (expand_all: {})", source.kind(), options.expand_all);
    match source {
        SourceDocument::GameFile(entries) => convert_game_file(entries, options),
        SourceDocument::PatchFile(patch) => convert_patch_file(patch, options),
    }
}

/// Parse, sniff and convert source text in one call.
///
/// # Errors
/// Returns an error if the text cannot be parsed; see [`SourceDocument::parse`].
pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<DialogueDocument, ConvertError> {
    let source = SourceDocument::parse(text)?;
    Ok(convert_source(&source, options))
}

/// Serialize any document as JSON indented by two spaces.
///
/// # Errors
/// [`ConvertError::Serialize`] if serialization fails.
pub fn to_pretty_json<T: Serialize>(doc: &T) -> Result<String, ConvertError> {
    serde_json::to_string_pretty(doc).map_err(ConvertError::Serialize)
}
