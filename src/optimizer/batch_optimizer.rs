//! # Batch Optimizer
//!
//! Orchestratore del batch: discovery una sola volta, conversione di un
//! file alla volta nell'ordine di discovery, riepilogo finale.
//!
//! ```text
//! Idle -> Discovering -> Converting(i = 1..n) -> Summarizing -> Done
//! ```
//!
//! Un errore su un file non interrompe mai i file successivi.

use crate::{
    config::Config,
    file_manager::FileManager,
    image_processor::{FileOutcome, ImageProcessor},
    json_output::JsonMessage,
    optimizer::path_resolver::CollisionTracker,
    progress::{BatchSummary, ProgressManager},
};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Orchestratore principale del batch
pub struct BatchOptimizer {
    processor: ImageProcessor,
}

impl BatchOptimizer {
    pub fn new(config: Config) -> Self {
        Self {
            processor: ImageProcessor::new(config),
        }
    }

    /// Usa un processore già configurato (es. con un resizer diverso)
    pub fn with_processor(processor: ImageProcessor) -> Self {
        Self { processor }
    }

    fn config(&self) -> &Config {
        self.processor.config()
    }

    /// Converte tutte le immagini di `input_dir` e restituisce gli outcome in ordine di discovery
    pub async fn run(&self) -> Result<Vec<FileOutcome>> {
        let start_time = Instant::now();
        let config = self.config();

        let files = FileManager::find_image_files(&config.input_dir)?;

        if files.is_empty() {
            self.handle_empty_directory(start_time);
            return Ok(Vec::new());
        }

        if config.json_output {
            JsonMessage::start(config, files.len()).emit();
        }
        info!("Found {} files to process", files.len());

        let progress = if config.json_output {
            ProgressManager::hidden(files.len() as u64)
        } else {
            ProgressManager::new(files.len() as u64)
        };

        let mut outcomes = Vec::with_capacity(files.len());
        let mut collisions = CollisionTracker::default();

        for (index, file) in files.iter().enumerate() {
            let Some(outcome) = self.processor.process_image(file).await else {
                if config.json_output {
                    JsonMessage::skipped(file.clone()).emit();
                }
                progress.update(&display_name(file));
                continue;
            };

            if let Some(output) = &outcome.output_path {
                if let Some(previous) = collisions.register(output, file) {
                    warn!(
                        "Output collision: {} overwrites the result of {} ({})",
                        file.display(),
                        previous.display(),
                        output.display()
                    );
                }
            }

            if config.json_output {
                JsonMessage::file_complete(index, files.len(), &outcome).emit();
            }
            progress.update(&display_name(file));
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(files.len(), &outcomes, &config.output_dir);
        progress.finish(&summary.format_summary());
        self.print_summary(&summary, start_time.elapsed().as_secs_f64());

        Ok(outcomes)
    }

    /// Gestisce directory vuota
    fn handle_empty_directory(&self, start_time: Instant) {
        let config = self.config();
        if config.json_output {
            let summary = BatchSummary::from_outcomes(0, &[], &config.output_dir);
            JsonMessage::complete(&summary, start_time.elapsed().as_secs_f64()).emit();
        }
        warn!("No images found in {}", config.input_dir.display());
    }

    fn print_summary(&self, summary: &BatchSummary, duration_seconds: f64) {
        if self.config().json_output {
            JsonMessage::complete(summary, duration_seconds).emit();
        }

        info!("Batch completed in {:.2}s:", duration_seconds);
        info!("  {} images optimized", summary.succeeded);
        info!("  {} images failed", summary.failed);
        if summary.skipped > 0 {
            info!("  {} files skipped (unsupported format)", summary.skipped);
        }
        info!("  Optimized images are in: {}", summary.output_dir.display());
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, ResizeBounds};
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn prepared_config(temp_dir: &TempDir, overrides: ConfigOverrides) -> Config {
        let mut config = Config::default();
        config.update(ConfigOverrides {
            input_dir: Some(temp_dir.path().join("images")),
            output_dir: Some(temp_dir.path().join("optimized")),
            json_output: Some(true),
            ..Default::default()
        });
        config.update(overrides);
        FileManager::ensure_directories(&config).await.unwrap();
        config
    }

    fn webp_size(path: &Path) -> (u32, u32) {
        let bytes = std::fs::read(path).unwrap();
        let decoded = webp::Decoder::new(&bytes).decode().expect("valid webp");
        (decoded.width(), decoded.height())
    }

    fn output_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_photo_and_icon_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(
            &temp_dir,
            ConfigOverrides {
                quality: Some(90),
                resize: Some(ResizeBounds { width: Some(500), height: None }),
                ..Default::default()
            },
        )
        .await;

        RgbImage::from_pixel(2000, 1000, Rgb([120, 80, 40]))
            .save(config.input_dir.join("photo.jpg"))
            .unwrap();
        RgbImage::from_pixel(50, 50, Rgb([0, 200, 0]))
            .save(config.input_dir.join("icon.png"))
            .unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
        // discovery order is by file name
        assert!(outcomes[0].input_path.ends_with("icon.png"));
        assert!(outcomes[1].input_path.ends_with("photo.jpg"));

        assert_eq!(webp_size(&config.output_dir.join("photo.webp")), (500, 250));
        assert_eq!(webp_size(&config.output_dir.join("icon.webp")), (50, 50));

        let summary = BatchSummary::from_outcomes(2, &outcomes, &config.output_dir);
        assert_eq!((summary.succeeded, summary.failed), (2, 0));
    }

    #[tokio::test]
    async fn test_empty_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert!(outcomes.is_empty());
        assert!(config.output_dir.is_dir());
        assert!(output_names(&config.output_dir).is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_does_not_abort_batch() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        std::fs::write(config.input_dir.join("a_broken.png"), b"garbage").unwrap();
        RgbImage::new(20, 10).save(config.input_dir.join("b_good.png")).unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].success);
        assert!(outcomes[1].success);
        assert_eq!(output_names(&config.output_dir), vec!["b_good.webp".to_string()]);
    }

    #[tokio::test]
    async fn test_only_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;
        std::fs::write(config.input_dir.join("broken.jpg"), b"garbage").unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();
        let summary = BatchSummary::from_outcomes(1, &outcomes, &config.output_dir);

        assert_eq!((summary.succeeded, summary.failed), (0, 1));
    }

    #[tokio::test]
    async fn test_unsupported_files_are_not_counted() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        std::fs::write(config.input_dir.join("notes.txt"), "hello").unwrap();
        std::fs::write(config.input_dir.join("already.webp"), b"RIFF").unwrap();
        RgbImage::new(8, 8).save(config.input_dir.join("pic.bmp")).unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        let summary = BatchSummary::from_outcomes(3, &outcomes, &config.output_dir);
        assert_eq!((summary.succeeded, summary.failed, summary.skipped), (1, 0, 2));
        assert_eq!(output_names(&config.output_dir), vec!["pic.webp".to_string()]);
    }

    #[tokio::test]
    async fn test_subdirectories_are_flattened() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        std::fs::create_dir_all(config.input_dir.join("nested/deeper")).unwrap();
        RgbImage::new(8, 8)
            .save(config.input_dir.join("nested/deeper/Banner.PNG"))
            .unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].output_path,
            Some(config.output_dir.join("Banner.webp"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_image_is_converted() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        let real = temp_dir.path().join("real.png");
        RgbImage::new(12, 6).save(&real).unwrap();
        std::os::unix::fs::symlink(&real, config.input_dir.join("linked.png")).unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(webp_size(&config.output_dir.join("linked.webp")), (12, 6));
    }

    #[tokio::test]
    async fn test_same_stem_collision_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        std::fs::create_dir_all(config.input_dir.join("a")).unwrap();
        std::fs::create_dir_all(config.input_dir.join("b")).unwrap();
        RgbImage::new(10, 10).save(config.input_dir.join("a/logo.png")).unwrap();
        RgbImage::new(30, 20).save(config.input_dir.join("b/logo.png")).unwrap();

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(output_names(&config.output_dir), vec!["logo.webp".to_string()]);
        assert_eq!(webp_size(&config.output_dir.join("logo.webp")), (30, 20));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        RgbImage::from_fn(64, 48, |x, y| Rgb([x as u8 * 3, y as u8 * 5, 77]))
            .save(config.input_dir.join("gradient.png"))
            .unwrap();
        std::fs::write(
            config.input_dir.join("shape.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="12" height="6"><circle cx="3" cy="3" r="3" fill="blue"/></svg>"#,
        )
        .unwrap();

        let optimizer = BatchOptimizer::new(config.clone());
        let first = optimizer.run().await.unwrap();
        let first_bytes: Vec<Vec<u8>> = ["gradient.webp", "shape.webp"]
            .iter()
            .map(|name| std::fs::read(config.output_dir.join(name)).unwrap())
            .collect();

        let second = optimizer.run().await.unwrap();
        let second_bytes: Vec<Vec<u8>> = ["gradient.webp", "shape.webp"]
            .iter()
            .map(|name| std::fs::read(config.output_dir.join(name)).unwrap())
            .collect();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn test_custom_resizer() {
        use crate::resize::{ImageResizer, ResizeAlgorithm};

        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(
            &temp_dir,
            ConfigOverrides {
                resize: Some(ResizeBounds { width: None, height: Some(5) }),
                ..Default::default()
            },
        )
        .await;
        RgbImage::new(40, 20).save(config.input_dir.join("strip.png")).unwrap();

        let processor = ImageProcessor::new(config.clone())
            .with_resizer(ImageResizer::new(ResizeAlgorithm::Nearest));
        let outcomes = BatchOptimizer::with_processor(processor).run().await.unwrap();

        assert!(outcomes[0].success);
        assert_eq!(webp_size(&config.output_dir.join("strip.webp")), (10, 5));
    }

    #[tokio::test]
    async fn test_outcomes_follow_discovery_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = prepared_config(&temp_dir, ConfigOverrides::default()).await;

        for name in ["c.png", "a.png", "b.gif"] {
            RgbImage::new(4, 4).save(config.input_dir.join(name)).unwrap();
        }

        let outcomes = BatchOptimizer::new(config.clone()).run().await.unwrap();
        let inputs: Vec<PathBuf> = outcomes
            .iter()
            .map(|o| PathBuf::from(o.input_path.file_name().unwrap()))
            .collect();

        assert_eq!(
            inputs,
            vec![PathBuf::from("a.png"), PathBuf::from("b.gif"), PathBuf::from("c.png")]
        );
    }
}
