//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e il riepilogo del batch.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Calcolo del riepilogo finale (`BatchSummary`) dagli outcome per file
//!
//! ## Statistiche tracciate:
//! - **discovered**: File trovati nella directory di input
//! - **succeeded**: File convertiti correttamente
//! - **failed**: File con errore di conversione
//! - **skipped**: File con estensione non supportata (né successi né errori)
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 30/50 (60%) photo.webp
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(files.len() as u64);
//! progress.update("photo.webp");
//! let summary = BatchSummary::from_outcomes(files.len(), &outcomes, &config.output_dir);
//! progress.finish(&summary.format_summary());
//! ```

use crate::image_processor::FileOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Manages progress reporting for a conversion batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON mode)
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Aggregate counts of one batch, derived from its outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub discovered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub output_dir: PathBuf,
}

impl BatchSummary {
    pub fn from_outcomes(discovered: usize, outcomes: &[FileOutcome], output_dir: &Path) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let failed = outcomes.len() - succeeded;

        Self {
            discovered,
            succeeded,
            failed,
            skipped: discovered.saturating_sub(outcomes.len()),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Found: {} files | Optimized: {} | Failed: {} | Skipped: {}",
            self.discovered, self.succeeded, self.failed, self.skipped
        )
    }
}
