//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Applica gli override dell'utente (`ConfigOverrides`) con merge campo per campo
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `input_dir`: Directory di input (default: "images")
//! - `output_dir`: Directory di output (default: "optimized")
//! - `quality`: Qualità WebP (1-100, default: 80)
//! - `resize`: Bounding box opzionale `{width?, height?}` (default: None)
//! - `accepted_extensions`: Estensioni accettate, case-insensitive
//! - `vector_density`: DPI per rasterizzare SVG (default: 300)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! ## Nessuna validazione:
//! Valori fuori range (es. quality > 100) sono accettati qui e producono
//! un fallimento per file durante la codifica.
//!
//! ## Esempio:
//! ```rust
//! use webp_batch_optimizer::{Config, ConfigOverrides, ResizeBounds};
//!
//! let mut config = Config::default();
//! config.update(ConfigOverrides {
//!     quality: Some(90),
//!     resize: Some(ResizeBounds { width: Some(500), height: None }),
//!     ..Default::default()
//! });
//! assert_eq!(config.quality, 90);
//! ```

use crate::error::OptimizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default WebP quality
pub const DEFAULT_QUALITY: u32 = 80;

/// Default rasterization density for SVG input
pub const DEFAULT_VECTOR_DENSITY: u32 = 300;

/// Input extensions recognized by default (lowercase, without the dot)
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg"];

/// Bounding box for fit-inside resizing. An omitted axis is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResizeBounds {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeBounds {
    /// `WxH` with `auto` for an open axis
    pub fn describe(&self) -> String {
        let axis = |v: Option<u32>| v.map_or_else(|| "auto".to_string(), |v| v.to_string());
        format!("{}x{}", axis(self.width), axis(self.height))
    }
}

/// Configuration for a conversion batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for images
    pub input_dir: PathBuf,
    /// Flat directory receiving the `.webp` files
    pub output_dir: PathBuf,
    /// WebP quality (1-100)
    pub quality: u32,
    /// Optional fit-inside bounding box
    pub resize: Option<ResizeBounds>,
    /// Accepted input extensions, compared case-insensitively
    pub accepted_extensions: Vec<String>,
    /// DPI used when rasterizing vector input
    pub vector_density: u32,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("optimized"),
            quality: DEFAULT_QUALITY,
            resize: None,
            accepted_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            vector_density: DEFAULT_VECTOR_DENSITY,
            json_output: false,
        }
    }
}

/// Partial configuration; every `Some` field overwrites the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub quality: Option<u32>,
    pub resize: Option<ResizeBounds>,
    pub accepted_extensions: Option<Vec<String>>,
    pub vector_density: Option<u32>,
    pub json_output: Option<bool>,
}

impl Config {
    /// Merge overrides field by field. `resize` is replaced wholesale.
    pub fn update(&mut self, overrides: ConfigOverrides) -> &Self {
        if let Some(input_dir) = overrides.input_dir {
            self.input_dir = input_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(quality) = overrides.quality {
            self.quality = quality;
        }
        if let Some(resize) = overrides.resize {
            self.resize = Some(resize);
        }
        if let Some(extensions) = overrides.accepted_extensions {
            self.accepted_extensions = extensions;
        }
        if let Some(density) = overrides.vector_density {
            self.vector_density = density;
        }
        if let Some(json_output) = overrides.json_output {
            self.json_output = json_output;
        }
        self
    }

    /// Case-insensitive membership test against `accepted_extensions`
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Multi-line description printed before the batch starts
    pub fn describe(&self) -> String {
        let resize = self
            .resize
            .map_or_else(|| "No".to_string(), |bounds| bounds.describe());
        format!(
            "Configuration:\n  Input directory: {}\n  Output directory: {}\n  WebP quality: {}%\n  Resize: {}",
            self.input_dir.display(),
            self.output_dir.display(),
            self.quality,
            resize
        )
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| OptimizeError::filesystem(path, e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| OptimizeError::Argument(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| OptimizeError::filesystem(path, e))?;
        Ok(())
    }
}
