//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path di output.
//!
//! L'output è piatto: `output_dir/<stem>.webp`, la struttura delle
//! sottodirectory di input non viene replicata. Due input con lo stesso
//! nome base in sottodirectory diverse collidono sullo stesso output;
//! `CollisionTracker` rileva il caso così che il batch possa segnalarlo.

use crate::error::OptimizeError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of every converted file
pub const OUTPUT_EXTENSION: &str = "webp";

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Calcola il path di output per un file dato
    pub fn get_output_path(input_path: &Path, output_dir: &Path) -> Result<PathBuf, OptimizeError> {
        let file_stem = input_path
            .file_stem()
            .ok_or_else(|| OptimizeError::Conversion(format!("Invalid file name: {}", input_path.display())))?;

        // OsString keeps non-UTF-8 stems byte for byte
        let mut filename = file_stem.to_os_string();
        filename.push(".");
        filename.push(OUTPUT_EXTENSION);

        let result = output_dir.join(filename);
        debug!("Resolved output path: {} -> {}", input_path.display(), result.display());
        Ok(result)
    }
}

/// Remembers which input produced each output path during one batch
#[derive(Debug, Default)]
pub struct CollisionTracker {
    written: HashMap<PathBuf, PathBuf>,
}

impl CollisionTracker {
    /// Records `output` as written by `input`. Returns the input that wrote
    /// the same output earlier in the batch, if any.
    pub fn register(&mut self, output: &Path, input: &Path) -> Option<PathBuf> {
        self.written.insert(output.to_path_buf(), input.to_path_buf())
    }
}
