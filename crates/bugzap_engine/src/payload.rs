use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

/// Field names the upload is attached under.
///
/// The receiving schema is not confirmed, so the same value goes out under
/// every alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub file: Vec<String>,
    pub engine: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            file: vec!["log".into(), "file".into(), "crash_log".into()],
            engine: vec!["engine".into(), "game_engine".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineHint {
    #[default]
    Unity,
    Unreal,
    /// Let the backend detect the engine.
    Auto,
}

impl EngineHint {
    /// Wire value; `Auto` is sent as an empty field.
    pub fn as_field_value(self) -> &'static str {
        match self {
            EngineHint::Unity => "unity",
            EngineHint::Unreal => "unreal",
            EngineHint::Auto => "",
        }
    }
}

impl fmt::Display for EngineHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineHint::Unity => write!(f, "Unity"),
            EngineHint::Unreal => write!(f, "Unreal"),
            EngineHint::Auto => write!(f, "Auto"),
        }
    }
}

impl FromStr for EngineHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unity" => Ok(EngineHint::Unity),
            "unreal" => Ok(EngineHint::Unreal),
            "auto" | "" => Ok(EngineHint::Auto),
            other => Err(format!("unknown engine {other:?} (expected unity, unreal or auto)")),
        }
    }
}

/// One crash log ready to be posted to any number of candidate routes.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Bytes,
    pub engine_hint: EngineHint,
}

impl UploadPayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>, engine_hint: EngineHint) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            engine_hint,
        }
    }

    /// Builds a fresh multipart form; a `Form` is consumed by each request.
    pub fn to_form(&self, aliases: &FieldAliases) -> Form {
        let mut form = Form::new();
        for name in &aliases.file {
            let part = Part::stream_with_length(self.bytes.clone(), self.bytes.len() as u64)
                .file_name(self.file_name.clone());
            form = form.part(name.clone(), part);
        }
        for name in &aliases.engine {
            form = form.text(name.clone(), self.engine_hint.as_field_value());
        }
        form
    }
}
