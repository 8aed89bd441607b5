//! Persisted user preferences (currently the selected model).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_MODEL;
use crate::errors::AppError;

/// Models offered in the settings picker, with their display labels.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gemini-2.0-flash", "Gemini 2.0 Flash (推荐)"),
    ("gemini-2.0-flash-exp", "Gemini 2.0 Flash Exp"),
    ("gemini-2.5-flash", "Gemini 2.5 Flash (最新)"),
    ("gemini-2.5-pro", "Gemini 2.5 Pro (最强)"),
    ("gemini-1.5-flash", "Gemini 1.5 Flash"),
    ("gemini-1.5-pro", "Gemini 1.5 Pro"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Known { name: &'static str, label: &'static str },
    Custom(String),
}

/// Whether `name` is one of [`KNOWN_MODELS`] or a custom entry.
pub fn classify_model(name: &str) -> ModelChoice {
    KNOWN_MODELS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(name, label)| ModelChoice::Known { name, label })
        .unwrap_or_else(|| ModelChoice::Custom(name.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self { model_name: default_model_name() }
    }
}

/// File-backed preferences: initialised from storage once, written back
/// whenever a value actually changes.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Preferences,
}

impl PreferenceStore {
    /// Opens the store; a missing or unreadable file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match Self::load(&path) {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!("Ignoring stored preferences: {e}");
                Preferences::default()
            }
        };
        Self { path, current }
    }

    /// Reads the file; `Ok(None)` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<Preferences>, AppError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AppError::PreferenceIo { path: path.display().to_string(), source })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| AppError::PreferenceFormat { path: path.display().to_string(), source })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preferences(&self) -> &Preferences {
        &self.current
    }

    pub fn model_name(&self) -> &str {
        &self.current.model_name
    }

    /// Selects a model. Returns whether anything changed (and was written).
    pub fn set_model(&mut self, name: &str) -> Result<bool, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyField { field_name: "modelName".to_string() });
        }
        if name == self.current.model_name {
            return Ok(false);
        }
        let mut next = self.current.clone();
        next.model_name = name.to_string();
        self.persist(&next)?;
        self.current = next;
        debug!(model = name, "Model preference saved");
        Ok(true)
    }

    fn persist(&self, prefs: &Preferences) -> Result<(), AppError> {
        let path = self.path.display().to_string();
        let io_err = |source: std::io::Error| AppError::PreferenceIo { path: path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(prefs)
            .map_err(|source| AppError::PreferenceFormat { path: path.clone(), source })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}
