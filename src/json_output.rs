//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per consumatori programmatici.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON strutturati (uno per riga su stdout)
//! - Riusa `FileOutcome` e `BatchSummary` come payload
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del batch
//! - `skipped`: File con estensione non supportata
//! - `file_complete`: Fine elaborazione di un file (successo o errore)
//! - `complete`: Fine batch con il riepilogo

use crate::image_processor::FileOutcome;
use crate::progress::BatchSummary;
use crate::Config;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del batch
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        quality: u32,
        resize: Option<String>,
    },

    /// File saltato
    Skipped { path: PathBuf },

    /// Fine elaborazione di un file specifico
    FileComplete {
        index: usize,
        total: usize,
        #[serde(flatten)]
        outcome: FileOutcome,
    },

    /// Batch completato
    Complete {
        #[serde(flatten)]
        summary: BatchSummary,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config, total_files: usize) -> Self {
        Self::Start {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            total_files,
            quality: config.quality,
            resize: config.resize.map(|bounds| bounds.describe()),
        }
    }

    pub fn skipped(path: PathBuf) -> Self {
        Self::Skipped { path }
    }

    pub fn file_complete(index: usize, total: usize, outcome: &FileOutcome) -> Self {
        Self::FileComplete {
            index,
            total,
            outcome: outcome.clone(),
        }
    }

    pub fn complete(summary: &BatchSummary, duration_seconds: f64) -> Self {
        Self::Complete {
            summary: summary.clone(),
            duration_seconds,
        }
    }
}
