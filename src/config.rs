//! Settings and credential resolution.
//!
//! Handles:
//! - Settings persistence (`~/.config/ink-ocr/settings.json`)
//! - `.env.local` / `.env` loading
//! - Engine selection (settings, overridable by the `ENGINE` env var)
//! - Cloud credential precedence (user settings → env → build-time)

use crate::engine::{LayoutMode, OcrOptions};
use crate::error::{RecognitionError, RecognitionResult};
use crate::raster::{RasterOptions, DEFAULT_PADDING, DEFAULT_THRESHOLD};
use crate::recognize::RecognizeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const APPLICATION_KEY_ENV: &str = "MYSCRIPT_APPLICATION_KEY";
pub const HMAC_KEY_ENV: &str = "MYSCRIPT_HMAC_KEY";
pub const ENGINE_ENV: &str = "ENGINE";
pub const DEFAULT_ENDPOINT: &str = "https://cloud.myscript.com/api/v4.0/iink/batch";

/// Which recognition backend handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Cloud ink service: strokes first, bitmap on fallback.
    #[default]
    Cloud,
    /// Local bitmap OCR.
    Local,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Cloud => "cloud",
            EngineKind::Local => "local",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloud" | "myscript" => Ok(EngineKind::Cloud),
            "local" | "ocr" | "tesseract" => Ok(EngineKind::Local),
            other => Err(format!("Unknown engine: {}. Use 'cloud' or 'local'.", other)),
        }
    }
}

/// Secret material for the cloud engine. Never stored with capture data.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CloudCredentials {
    pub application_key: String,
    /// Present → every request body is HMAC-signed.
    pub hmac_key: Option<String>,
}

impl CloudCredentials {
    pub fn new(application_key: impl Into<String>, hmac_key: Option<String>) -> Self {
        Self {
            application_key: application_key.into(),
            hmac_key: hmac_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.application_key.is_empty()
    }
}

// Keys stay out of logs and panic messages.
impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("application_key", &format!("<{} chars>", self.application_key.len()))
            .field("hmac_key", &self.hmac_key.as_ref().map(|k| format!("<{} chars>", k.len())))
            .finish()
    }
}

/// User settings as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub engine: EngineKind,
    /// Locale sent to the cloud engine, e.g. `en_US`.
    pub language: String,
    /// Language code for the local OCR engine, e.g. `eng`.
    pub ocr_language: String,
    pub handwriting: bool,
    pub fallback_to_bitmap: bool,
    pub application_key: String,
    pub hmac_key: String,
    pub endpoint: String,
    pub padding: u32,
    pub threshold: u8,
    pub pen_width: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineKind::Cloud,
            language: "en_US".to_string(),
            ocr_language: "eng".to_string(),
            handwriting: true,
            fallback_to_bitmap: true,
            application_key: String::new(),
            hmac_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            padding: DEFAULT_PADDING,
            threshold: DEFAULT_THRESHOLD,
            pen_width: 3.0,
        }
    }
}

impl Settings {
    /// Cloud credentials with user settings taking priority.
    ///
    /// Once the user has entered an application key, environment and
    /// build-time keys are ignored entirely, HMAC key included.
    pub fn cloud_credentials(&self) -> CloudCredentials {
        let runtime_key = std::env::var(APPLICATION_KEY_ENV).ok();
        let runtime_hmac = std::env::var(HMAC_KEY_ENV).ok();
        let user = KeySource::new(Some(&self.application_key), Some(&self.hmac_key));
        let runtime = KeySource::new(runtime_key.as_deref(), runtime_hmac.as_deref());

        let creds = resolve_credentials(user, runtime, build_time_keys());
        if !user.has_application_key() && creds.is_complete() {
            log::info!("[SETTINGS] Using fallback cloud credentials from environment");
        }
        creds
    }

    /// Engine to use, honouring the `ENGINE` env override.
    pub fn resolve_engine(&self) -> EngineKind {
        if let Ok(raw) = std::env::var(ENGINE_ENV) {
            match raw.parse::<EngineKind>() {
                Ok(kind) => {
                    log::info!("[SETTINGS] Engine override: {}", kind);
                    return kind;
                }
                Err(e) => log::warn!("[SETTINGS] Ignoring {}: {}", ENGINE_ENV, e),
            }
        }
        self.engine
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            padding: self.padding,
            threshold: self.threshold,
        }
    }

    pub fn recognize_options(&self) -> RecognizeOptions {
        RecognizeOptions {
            language: self.language.clone(),
            fallback_to_bitmap: self.fallback_to_bitmap,
            raster: self.raster_options(),
        }
    }

    pub fn ocr_options(&self) -> OcrOptions {
        OcrOptions {
            language: self.ocr_language.clone(),
            layout: LayoutMode::for_handwriting(self.handwriting),
        }
    }
}

/// One place cloud keys can come from. Unset and blank mean the same.
#[derive(Clone, Copy, Default)]
pub struct KeySource<'a> {
    pub application_key: Option<&'a str>,
    pub hmac_key: Option<&'a str>,
}

impl<'a> KeySource<'a> {
    pub fn new(application_key: Option<&'a str>, hmac_key: Option<&'a str>) -> Self {
        Self {
            application_key,
            hmac_key,
        }
    }

    fn has_application_key(&self) -> bool {
        self.application_key.is_some_and(|k| !k.trim().is_empty())
    }

    fn credentials(&self) -> CloudCredentials {
        CloudCredentials::new(
            self.application_key.unwrap_or_default().trim(),
            self.hmac_key.map(|k| k.trim().to_string()),
        )
    }
}

/// Pick the first source with an application key: user, runtime env, build env.
///
/// The HMAC key always comes from the same source as the application key.
/// No source with a key → unconfigured credentials.
pub fn resolve_credentials(
    user: KeySource<'_>,
    runtime: KeySource<'_>,
    build: KeySource<'_>,
) -> CloudCredentials {
    [user, runtime, build]
        .into_iter()
        .find(KeySource::has_application_key)
        .map(|source| source.credentials())
        .unwrap_or_default()
}

fn build_time_keys() -> KeySource<'static> {
    KeySource::new(
        option_env!("MYSCRIPT_APPLICATION_KEY"),
        option_env!("MYSCRIPT_HMAC_KEY"),
    )
}

/// Credentials from the runtime environment, then from build-time env.
pub fn fallback_credentials() -> CloudCredentials {
    let runtime_key = std::env::var(APPLICATION_KEY_ENV).ok();
    let runtime_hmac = std::env::var(HMAC_KEY_ENV).ok();
    resolve_credentials(
        KeySource::default(),
        KeySource::new(runtime_key.as_deref(), runtime_hmac.as_deref()),
        build_time_keys(),
    )
}

/// Directory where settings are stored.
fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ink-ocr")
}

/// Full path to the settings file.
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from the default location.
pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Load settings from `path`.
///
/// Returns defaults if the file doesn't exist or is invalid.
pub fn load_settings_from(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("[SETTINGS] Invalid {}: {} — using defaults", path.display(), e);
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

/// Persist settings to the default location.
pub fn save_settings(settings: &Settings) -> RecognitionResult<()> {
    save_settings_to(settings, &settings_path())
}

/// Persist settings to `path`, creating its directory if needed.
pub fn save_settings_to(settings: &Settings, path: &Path) -> RecognitionResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            RecognitionError::Configuration(format!("Failed to create config dir: {}", e))
        })?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| {
        RecognitionError::Configuration(format!("Failed to serialize settings: {}", e))
    })?;
    std::fs::write(path, json).map_err(|e| {
        RecognitionError::Configuration(format!("Failed to write settings: {}", e))
    })?;
    log::info!("[SETTINGS] Saved settings to {}", path.display());
    Ok(())
}

/// Load `.env.local`, else `.env`, from `dir`. First file found wins.
pub fn load_env(dir: &Path) -> Option<PathBuf> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => log::info!("[SETTINGS] Loaded {}", path.display()),
                Err(e) => log::warn!("[SETTINGS] Failed to load {}: {}", path.display(), e),
            }
            return Some(path);
        }
    }
    None
}
