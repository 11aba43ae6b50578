//! # WebP Batch Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della configurazione (default, file JSON, flag CLI)
//! - Preparazione directory e avvio del batch
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, quality, width, height)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Applica gli override alla configurazione e risolve i path assoluti
//! 4. Crea le directory mancanti (errore fatale, exit code 1)
//! 5. Converte tutte le immagini e stampa il riepilogo
//!
//! ## Flag `-h`:
//! `-h` è sempre l'help; l'altezza massima si imposta solo con `--height`.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! webp-optimizer                          # 'images/' -> 'optimized/'
//! webp-optimizer src/img dist/img         # Cartelle personalizzate
//! webp-optimizer assets/img web/img -q 90 # Qualità specifica
//! webp-optimizer img output -w 800        # Larghezza massima
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webp_batch_optimizer::config::DEFAULT_QUALITY;
use webp_batch_optimizer::{BatchOptimizer, Config, ConfigOverrides, FileManager, ResizeBounds};

#[derive(Parser, Debug)]
#[command(name = "webp-optimizer")]
#[command(about = "Convert a directory of images to optimized WebP")]
#[command(disable_help_flag = true)]
struct Args {
    /// Directory containing the images to convert [default: images]
    input_dir: Option<PathBuf>,

    /// Directory receiving the .webp files [default: optimized]
    output_dir: Option<PathBuf>,

    /// WebP quality (1-100, invalid values fall back to 80)
    #[arg(short, long, value_parser = parse_quality)]
    quality: Option<u32>,

    /// Maximum width in pixels
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Maximum height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// JSON configuration file applied before the command-line flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output progress and status as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(short = 'h', long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let resize = (self.width.is_some() || self.height.is_some()).then_some(ResizeBounds {
            width: self.width,
            height: self.height,
        });

        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            quality: self.quality,
            resize,
            json_output: self.json.then_some(true),
            ..Default::default()
        }
    }
}

/// Lenient quality parsing: leading digits are used, anything else (or 0) means the default
fn parse_quality(raw: &str) -> Result<u32, Infallible> {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    Ok(digits
        .parse::<u32>()
        .ok()
        .filter(|&quality| quality > 0)
        .unwrap_or(DEFAULT_QUALITY))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    config.update(args.overrides());

    config.input_dir = std::path::absolute(&config.input_dir)?;
    config.output_dir = std::path::absolute(&config.output_dir)?;

    for line in config.describe().lines() {
        info!("{}", line);
    }

    FileManager::ensure_directories(&config).await?;
    BatchOptimizer::new(config).run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quality_is_lenient() {
        assert_eq!(parse_quality("90"), Ok(90));
        assert_eq!(parse_quality("75abc"), Ok(75));
        assert_eq!(parse_quality("abc"), Ok(80));
        assert_eq!(parse_quality("0"), Ok(80));
        assert_eq!(parse_quality(""), Ok(80));
    }

    #[test]
    fn test_positionals_and_flags() {
        let args = Args::try_parse_from(["webp-optimizer", "src/img", "dist/img", "-q", "90", "-w", "800"]).unwrap();
        let overrides = args.overrides();

        assert_eq!(overrides.input_dir, Some(PathBuf::from("src/img")));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("dist/img")));
        assert_eq!(overrides.quality, Some(90));
        assert_eq!(overrides.resize, Some(ResizeBounds { width: Some(800), height: None }));
        assert_eq!(overrides.json_output, None);
    }

    #[test]
    fn test_no_args_keeps_defaults() {
        let args = Args::try_parse_from(["webp-optimizer"]).unwrap();
        let mut config = Config::default();
        config.update(args.overrides());

        assert_eq!(config.input_dir, PathBuf::from("images"));
        assert_eq!(config.output_dir, PathBuf::from("optimized"));
        assert_eq!(config.quality, 80);
        assert!(config.resize.is_none());
    }

    #[test]
    fn test_non_numeric_quality_falls_back() {
        let args = Args::try_parse_from(["webp-optimizer", "--quality", "high"]).unwrap();
        assert_eq!(args.quality, Some(80));
    }

    #[test]
    fn test_height_long_flag_only() {
        let args = Args::try_parse_from(["webp-optimizer", "--height", "600"]).unwrap();
        assert_eq!(args.overrides().resize, Some(ResizeBounds { width: None, height: Some(600) }));
    }

    #[test]
    fn test_short_h_is_help() {
        let err = Args::try_parse_from(["webp-optimizer", "-h", "600"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(Args::try_parse_from(["webp-optimizer", "-w", "0"]).is_err());
    }
}
