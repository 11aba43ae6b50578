//! # WebP Batch Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione del batch e merge degli override
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Preparazione directory e discovery file
//! - `image_processor`: Conversione di una singola immagine in WebP
//! - `resize`: Ridimensionamento fit inside senza ingrandimento
//! - `optimizer`: Orchestratore del batch e risoluzione path
//! - `progress`: Progress bar e riepilogo finale
//! - `json_output`: Eventi JSON per consumatori programmatici
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use webp_batch_optimizer::{BatchOptimizer, Config, FileManager};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! FileManager::ensure_directories(&config).await?;
//! let outcomes = BatchOptimizer::new(config).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod progress;
pub mod resize;

pub use config::{Config, ConfigOverrides, ResizeBounds};
pub use error::OptimizeError;
pub use file_manager::FileManager;
pub use image_processor::{FileOutcome, ImageProcessor, SourceKind};
pub use optimizer::BatchOptimizer;
pub use progress::BatchSummary;
