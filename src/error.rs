//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Filesystem`: Creazione directory o lettura/scrittura file negata
//! - `UnsupportedFormat`: Estensione non riconosciuta (skip, non fallimento)
//! - `Image`: Decodifica/ridimensionamento immagini raster fallito
//! - `Svg`: Parsing SVG fallito
//! - `Encode`: Codifica WebP fallita (qualità non valida, memoria, etc.)
//! - `Conversion`: Altri errori della pipeline di conversione
//! - `Argument`: Input di configurazione malformato
//!
//! ## Propagazione:
//! - Errori di setup (directory) terminano il processo con exit code 1
//! - Errori per singolo file vengono catturati in `FileOutcome` e il batch continua
//!
//! ## Esempio:
//! ```rust,ignore
//! std::fs::create_dir_all(&dir).map_err(|source| OptimizeError::Filesystem {
//!     path: dir.clone(),
//!     source,
//! })?;
//! ```

use std::path::PathBuf;

/// Custom error types for image conversion
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("Filesystem error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("SVG rasterization error: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("WebP encoding error: {0}")]
    Encode(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

impl OptimizeError {
    /// Wraps an I/O error together with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
