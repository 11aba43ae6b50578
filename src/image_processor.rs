//! # Image Processing Module
//!
//! Questo modulo converte una singola immagine in WebP lossy.
//!
//! ## Formati Supportati
//!
//! | Formato | Tipo     | Decoder |
//! |---------|----------|---------|
//! | JPEG    | Raster   | `image` |
//! | PNG     | Raster   | `image` |
//! | GIF     | Raster   | `image` (primo frame) |
//! | BMP     | Raster   | `image` |
//! | TIFF    | Raster   | `image` |
//! | SVG     | Vector   | `resvg` (rasterizzato a `vector_density` DPI) |
//! | Altri   | skip     | nessuno, avviso e nessun outcome |
//!
//! ## Pipeline di Conversione
//!
//! 1. **Classificazione**: `SourceKind::Raster` o `SourceKind::Vector`, una sola volta
//! 2. **Calcolo path output**: `output_dir/<stem>.webp` (piatto)
//! 3. **Decodifica**: decoder nativo oppure rasterizzazione SVG su sfondo trasparente
//! 4. **Resize**: fit inside, senza ingrandimento (se configurato)
//! 5. **Codifica WebP**: lossy a `quality`, alpha quality 100 per SVG e 90 per raster
//! 6. **Scrittura**: crea o sovrascrive il file di output
//!
//! ## Error Handling
//!
//! Gli errori dei passi 3-6 non vengono mai propagati: finiscono in un
//! `FileOutcome` fallito e il batch prosegue col file successivo.
//!
//! ## Concorrenza
//!
//! - **tokio::fs**: lettura e scrittura asincrone
//! - **spawn_blocking**: decodifica, resize e codifica fuori dal runtime async
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new(config);
//! if let Some(outcome) = processor.process_image(Path::new("images/photo.jpg")).await {
//!     println!("{}", outcome.success);
//! }
//! ```

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::path_resolver::PathResolver;
use crate::resize::ImageResizer;
use image::{DynamicImage, ImageFormat, ImageReader};
use resvg::{tiny_skia, usvg};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Density at which SVG user units map 1:1 to pixels
pub const SVG_BASE_DENSITY: f32 = 72.0;

/// Alpha quality for vector-derived transparency
const VECTOR_ALPHA_QUALITY: i32 = 100;
/// Alpha quality for raster transparency
const RASTER_ALPHA_QUALITY: i32 = 90;

/// How a source file is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Raster,
    Vector,
}

impl SourceKind {
    /// Classify `path` against the accepted extensions. `None` means the file is skipped.
    pub fn classify(path: &Path, config: &Config) -> Option<Self> {
        let ext = FileManager::extension_of(path)?;
        if !config.accepts_extension(&ext) {
            return None;
        }
        if ext == "svg" {
            Some(Self::Vector)
        } else {
            Some(Self::Raster)
        }
    }

    /// WebP alpha-plane quality used for this kind of source
    pub fn alpha_quality(&self) -> i32 {
        match self {
            Self::Vector => VECTOR_ALPHA_QUALITY,
            Self::Raster => RASTER_ALPHA_QUALITY,
        }
    }
}

/// Result of one conversion attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub input_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn succeeded(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: Some(output_path.into()),
            success: true,
            error: None,
        }
    }

    pub fn failed(input_path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: None,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Converts single images to WebP according to a `Config`
pub struct ImageProcessor {
    config: Config,
    resizer: ImageResizer,
}

impl ImageProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resizer: ImageResizer::default(),
        }
    }

    pub fn with_resizer(mut self, resizer: ImageResizer) -> Self {
        self.resizer = resizer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one file. Returns `None` when the extension is not accepted.
    pub async fn process_image(&self, input_path: &Path) -> Option<FileOutcome> {
        let filename = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input_path.display().to_string());

        let Some(kind) = SourceKind::classify(input_path, &self.config) else {
            warn!("{}, skipping", OptimizeError::UnsupportedFormat(filename));
            return None;
        };

        info!("Processing: {}", filename);

        match self.convert(input_path, kind).await {
            Ok((output_path, size)) => {
                info!(
                    "Optimized: {} ({})",
                    output_path.file_name().unwrap_or_default().to_string_lossy(),
                    FileManager::format_size(size)
                );
                Some(FileOutcome::succeeded(input_path, output_path))
            }
            Err(e) => {
                error!("Failed to process {}: {}", input_path.display(), e);
                Some(FileOutcome::failed(input_path, e))
            }
        }
    }

    /// Decode, resize, encode and write. Returns the output path and its size in bytes.
    async fn convert(&self, input_path: &Path, kind: SourceKind) -> Result<(PathBuf, u64), OptimizeError> {
        let output_path = PathResolver::get_output_path(input_path, &self.config.output_dir)?;

        let data = tokio::fs::read(input_path)
            .await
            .map_err(|e| OptimizeError::filesystem(input_path, e))?;

        if kind == SourceKind::Vector {
            info!("Rasterizing SVG at {} DPI", self.config.vector_density);
        }

        let source = input_path.to_path_buf();
        let quality = self.config.quality;
        let density = self.config.vector_density;
        let resize = self.config.resize;
        let resizer = self.resizer;

        let encoded = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, OptimizeError> {
            let image = match kind {
                SourceKind::Vector => rasterize_svg(&data, &source, density)?,
                SourceKind::Raster => decode_raster(&data, &source)?,
            };
            debug!("Decoded {} ({}x{})", source.display(), image.width(), image.height());

            let image = match resize {
                Some(bounds) => resizer.apply(image, &bounds),
                None => image,
            };

            encode_webp(&image, quality, kind.alpha_quality())
        })
        .await
        .map_err(|e| OptimizeError::Conversion(format!("conversion task failed: {}", e)))??;

        tokio::fs::write(&output_path, &encoded)
            .await
            .map_err(|e| OptimizeError::filesystem(&output_path, e))?;

        Ok((output_path, encoded.len() as u64))
    }
}

/// Decode a raster image, sniffing the content first and falling back to the extension
fn decode_raster(data: &[u8], source: &Path) -> Result<DynamicImage, OptimizeError> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| OptimizeError::Conversion(format!("cannot read {}: {}", source.display(), e)))?;

    if reader.format().is_none() {
        if let Ok(format) = ImageFormat::from_path(source) {
            reader.set_format(format);
        }
    }

    Ok(reader.decode()?)
}

/// Render an SVG document at `density` DPI onto a transparent canvas
fn rasterize_svg(data: &[u8], source: &Path, density: u32) -> Result<DynamicImage, OptimizeError> {
    let mut options = usvg::Options {
        resources_dir: source.parent().map(Path::to_path_buf),
        ..Default::default()
    };
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(data, &options)?;

    let scale = density as f32 / SVG_BASE_DENSITY;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        OptimizeError::Conversion(format!("cannot allocate a {}x{} canvas", width, height))
    })?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let buffer = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        OptimizeError::Conversion(format!("rasterized buffer does not match {}x{}", width, height))
    })?;
    Ok(DynamicImage::ImageRgba8(buffer))
}

/// Lossy WebP encoding at `quality` with the given alpha-plane quality
fn encode_webp(image: &DynamicImage, quality: u32, alpha_quality: i32) -> Result<Vec<u8>, OptimizeError> {
    if quality > 100 {
        return Err(OptimizeError::Encode(format!("quality {} is outside 0-100", quality)));
    }

    let mut config = webp::WebPConfig::new()
        .map_err(|_| OptimizeError::Encode("cannot initialise encoder configuration".to_string()))?;
    config.lossless = 0;
    config.quality = quality as f32;
    config.alpha_quality = alpha_quality;

    let (width, height) = (image.width(), image.height());
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_advanced(&config)
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_advanced(&config)
    };
    let memory = encoded.map_err(|e| OptimizeError::Encode(format!("{:?}", e)))?;

    Ok(memory.to_vec())
}
