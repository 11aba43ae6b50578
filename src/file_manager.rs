//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Preparazione delle directory di input e output
//! - Discovery ricorsiva dei file in directory (qualsiasi estensione)
//! - Estrazione estensioni normalizzate (lowercase)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Ordine della discovery:
//! Il walk è ordinato per nome file a ogni livello, quindi l'ordine è
//! deterministico tra esecuzioni successive sullo stesso albero.
//!
//! ## Filtraggio:
//! La discovery NON filtra per estensione: il filtro avviene per file
//! in `ImageProcessor::process_image`, che emette un avviso di skip.
//!
//! ## Esempio:
//! ```rust,ignore
//! FileManager::ensure_directories(&config).await?;
//! let files = FileManager::find_image_files(&config.input_dir)?;
//! ```

use crate::config::Config;
use crate::error::OptimizeError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Ensure both input and output directories exist, creating missing segments
    pub async fn ensure_directories(config: &Config) -> Result<(), OptimizeError> {
        for dir in [&config.input_dir, &config.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| OptimizeError::filesystem(dir, e))?;
        }

        info!(
            "Directories ready: {} and {}",
            config.input_dir.display(),
            config.output_dir.display()
        );
        Ok(())
    }

    /// Find every file below `input_dir` (symlinks followed), as absolute paths.
    ///
    /// An unreadable or missing `input_dir` is an error; unreadable entries
    /// deeper in the tree are logged and skipped.
    pub fn find_image_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let root = std::path::absolute(input_dir)
            .map_err(|e| OptimizeError::filesystem(input_dir, e))?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let message = e.to_string();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other(message));
                    return Err(OptimizeError::filesystem(&root, source).into());
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Lowercase extension of a path, if any
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
