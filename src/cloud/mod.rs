//! Word-cloud rendering.
//!
//! - [`frequencies`]: word counting the way cloud renderers do it
//! - [`layout`]: font sizing and collision-free, seeded placement
//! - [`render`]: PNG output through `image`/`imageproc` with an `ab_glyph` font
//!
//! Callers depend on the [`CloudRenderer`] seam only.

pub mod frequencies;
pub mod layout;
pub mod render;

use crate::error::CloudError;
use std::path::{Path, PathBuf};

/// What a successful render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCloud {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub words_placed: usize,
}

/// Turns a space-joined keyword stream into an image file.
pub trait CloudRenderer {
    /// Render `keywords` and write the image to `output`.
    ///
    /// # Errors
    ///
    /// [`CloudError::InsufficientText`] when nothing plottable remains after
    /// the renderer's own filtering.
    fn render(&self, keywords: &str, output: &Path) -> Result<RenderedCloud, CloudError>;
}
