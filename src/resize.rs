//! # Image Resize Module
//!
//! Questo modulo gestisce il ridimensionamento "fit inside" delle immagini decodificate.
//!
//! ## Caratteristiche
//! - **Fit inside**: L'immagine viene ridotta per stare nel bounding box
//!   preservando l'aspect ratio
//! - **Nessun ingrandimento**: Immagini già più piccole del box restano invariate
//! - **Assi opzionali**: Un asse non specificato non è vincolato
//! - **Lanczos3**: Filtro di default, migliore qualità per downscaling
//!
//! ## Calcolo dimensioni
//! ```text
//! factor = min(W / w, H / h)     (solo sugli assi vincolati)
//! factor >= 1  -> dimensioni originali
//! factor <  1  -> asse vincolante = bound, l'altro = round(lato * factor)
//! ```
//!
//! ## Esempio
//! ```rust
//! use webp_batch_optimizer::{resize::fit_inside, ResizeBounds};
//!
//! let bounds = ResizeBounds { width: Some(500), height: None };
//! assert_eq!(fit_inside(2000, 1000, &bounds), (500, 250));
//! assert_eq!(fit_inside(50, 50, &bounds), (50, 50));
//! ```

use crate::config::ResizeBounds;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Algoritmi di resize disponibili
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeAlgorithm {
    /// Lanczos - Migliore qualità per downscaling
    #[default]
    Lanczos,
    /// Catrom - Catmull-Rom, buona qualità generale
    Catrom,
    /// Triangle - Veloce, qualità accettabile
    Triangle,
    /// Nearest - Pixel perfetto per pixel art
    Nearest,
}

impl ResizeAlgorithm {
    /// Converte l'algoritmo nel filtro del crate `image`
    pub fn to_filter(&self) -> FilterType {
        match self {
            ResizeAlgorithm::Lanczos => FilterType::Lanczos3,
            ResizeAlgorithm::Catrom => FilterType::CatmullRom,
            ResizeAlgorithm::Triangle => FilterType::Triangle,
            ResizeAlgorithm::Nearest => FilterType::Nearest,
        }
    }
}

/// Target dimensions for `width`x`height` under the fit-inside, no-enlargement policy.
///
/// A bound of zero is treated like an omitted axis.
pub fn fit_inside(width: u32, height: u32, bounds: &ResizeBounds) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let fx = bounds.width.filter(|&w| w > 0).map(|w| w as f64 / width as f64);
    let fy = bounds.height.filter(|&h| h > 0).map(|h| h as f64 / height as f64);

    let factor = match (fx, fy) {
        (Some(x), Some(y)) => x.min(y),
        (Some(x), None) => x,
        (None, Some(y)) => y,
        (None, None) => return (width, height),
    };

    if factor >= 1.0 {
        return (width, height);
    }

    let scaled = |side: u32| ((side as f64 * factor).round() as u32).max(1);

    match (bounds.width, bounds.height) {
        (Some(w), _) if fx == Some(factor) => (w, scaled(height)),
        (_, Some(h)) => (scaled(width), h),
        // unreachable in practice: factor always comes from a constrained axis
        _ => (scaled(width), scaled(height)),
    }
}

/// Applies fit-inside resizing to decoded images
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    algorithm: ResizeAlgorithm,
}

impl ImageResizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resize `image` to fit within `bounds`. Returns the image untouched
    /// when it already fits.
    pub fn apply(&self, image: DynamicImage, bounds: &ResizeBounds) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        let (target_w, target_h) = fit_inside(width, height, bounds);

        if (target_w, target_h) == (width, height) {
            debug!("No resize needed for {}x{} within {}", width, height, bounds.describe());
            return image;
        }

        debug!(
            "Resizing {}x{} -> {}x{} ({:?})",
            width, height, target_w, target_h, self.algorithm
        );
        image.resize_exact(target_w, target_h, self.algorithm.to_filter())
    }
}
