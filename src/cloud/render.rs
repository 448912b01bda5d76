//! Raster rendering of the word cloud to PNG.

use crate::cache::Memo;
use crate::cloud::frequencies::process_text;
use crate::cloud::layout::{layout, LayoutOptions, PlacedWord, TextMeasure};
use crate::cloud::{CloudRenderer, RenderedCloud};
use crate::config::CloudConfig;
use crate::error::{CloudError, ConfigError};
use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fonts tried when none is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONTS: Lazy<Memo<Option<PathBuf>, FontVec>> = Lazy::new(|| Memo::new("font"));

/// Load the configured font, or the first readable candidate, once per process.
pub fn load_font(configured: Option<&Path>) -> Result<Arc<FontVec>, ConfigError> {
    let key = configured.map(Path::to_path_buf);
    FONTS.get_or_try_init(&key, || {
        let candidates: Vec<PathBuf> = match configured {
            Some(path) => vec![path.to_path_buf()],
            None => FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };
        for path in &candidates {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    info!(path = %path.display(), "Loaded font");
                    return Ok(font);
                }
                Err(e) => debug!(path = %path.display(), error = %e, "Unusable font file"),
            }
        }
        Err(ConfigError::MissingFont { tried: candidates })
    })
}

struct GlyphMeasure<'a> {
    font: &'a FontVec,
}

impl TextMeasure for GlyphMeasure<'_> {
    fn measure(&self, word: &str, font_size: f32) -> (u32, u32) {
        text_size(PxScale::from(font_size), self.font, word)
    }
}

/// Word-cloud renderer drawing onto an RGB canvas.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    config: CloudConfig,
}

impl RasterRenderer {
    pub fn new(config: CloudConfig) -> Self {
        Self { config }
    }

    fn layout_options(&self) -> LayoutOptions {
        let c = &self.config;
        LayoutOptions {
            width: c.width,
            height: c.height,
            max_words: c.max_words,
            min_font_size: c.min_font_size,
            max_font_size: c.max_font_size.unwrap_or(c.height * 2 / 5),
            font_step: c.font_step,
            relative_scaling: c.relative_scaling,
            margin: c.margin,
            seed: c.seed,
        }
    }

    fn draw(&self, font: &FontVec, words: &[PlacedWord]) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.config.width, self.config.height, Rgb(self.config.background));
        for w in words {
            draw_text_mut(
                &mut canvas,
                Rgb(w.color),
                w.x as i32,
                w.y as i32,
                PxScale::from(w.font_size as f32),
                font,
                &w.word,
            );
        }
        canvas
    }
}

impl CloudRenderer for RasterRenderer {
    #[instrument(level = "info", skip_all, fields(output = %output.display()))]
    fn render(&self, keywords: &str, output: &Path) -> Result<RenderedCloud, CloudError> {
        let frequencies = process_text(keywords, self.config.normalize_plurals);
        if frequencies.is_empty() {
            return Err(CloudError::InsufficientText);
        }

        let font = load_font(self.config.font_path.as_deref())?;
        let placed = layout(&frequencies, &GlyphMeasure { font: &font }, &self.layout_options());
        if placed.is_empty() {
            return Err(CloudError::InsufficientText);
        }

        let canvas = self.draw(&font, &placed);
        canvas.save_with_format(output, ImageFormat::Png)?;
        info!(
            distinct = frequencies.len(),
            placed = placed.len(),
            "Wrote word cloud"
        );

        Ok(RenderedCloud {
            path: output.to_path_buf(),
            width: self.config.width,
            height: self.config.height,
            words_placed: placed.len(),
        })
    }
}
