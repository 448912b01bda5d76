//! Word placement for the cloud.
//!
//! Words are placed largest first. Each word's font size follows its
//! frequency relative to the previous word (`relative_scaling`), and when no
//! free spot is left for a box of that size the font shrinks by `font_step`
//! until it fits or falls below `min_font_size`, which ends the layout.
//!
//! Free space is tracked on a coarse occupancy grid with a summed-area table,
//! so "is this box empty" is four lookups. Among all free positions one is
//! drawn at random from a seeded generator: the same input and seed always
//! give the same picture.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Side, in pixels, of one occupancy cell.
const CELL: u32 = 4;

/// Measures the pixel box of `word` drawn at `font_size`.
pub trait TextMeasure {
    fn measure(&self, word: &str, font_size: f32) -> (u32, u32);
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
    pub font_step: u32,
    pub relative_scaling: f32,
    pub margin: u32,
    pub seed: u64,
}

/// One word placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: u32,
    /// Top-left corner of the word's box.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: [u8; 3],
}

/// Coarse occupancy grid with a summed-area table over it.
#[derive(Debug)]
struct Occupancy {
    cols: usize,
    rows: usize,
    filled: Vec<bool>,
    // (cols + 1) * (rows + 1), row-major, zero first row/column
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cols = (width / CELL) as usize;
        let rows = (height / CELL) as usize;
        Self {
            cols,
            rows,
            filled: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn box_sum(&self, col: usize, row: usize, w: usize, h: usize) -> u32 {
        let stride = self.cols + 1;
        let a = self.integral[row * stride + col];
        let b = self.integral[row * stride + col + w];
        let c = self.integral[(row + h) * stride + col];
        let d = self.integral[(row + h) * stride + col + w];
        d + a - b - c
    }

    /// Pick a random free top-left cell for a `w`×`h` cell box.
    fn sample_position(&self, w: usize, h: usize, rng: &mut StdRng) -> Option<(usize, usize)> {
        if w == 0 || h == 0 || w > self.cols || h > self.rows {
            return None;
        }
        let free = |col: usize, row: usize| self.box_sum(col, row, w, h) == 0;

        let mut hits = 0usize;
        for row in 0..=self.rows - h {
            for col in 0..=self.cols - w {
                if free(col, row) {
                    hits += 1;
                }
            }
        }
        if hits == 0 {
            return None;
        }

        let goal = rng.random_range(0..hits);
        let mut seen = 0usize;
        for row in 0..=self.rows - h {
            for col in 0..=self.cols - w {
                if free(col, row) {
                    if seen == goal {
                        return Some((col, row));
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    fn fill(&mut self, col: usize, row: usize, w: usize, h: usize) {
        for r in row..row + h {
            for c in col..col + w {
                self.filled[r * self.cols + c] = true;
            }
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let stride = self.cols + 1;
        for r in 0..self.rows {
            let mut row_sum = 0u32;
            for c in 0..self.cols {
                row_sum += u32::from(self.filled[r * self.cols + c]);
                self.integral[(r + 1) * stride + c + 1] = self.integral[r * stride + c + 1] + row_sum;
            }
        }
    }
}

/// Viridis colormap anchors at t = 0, 1/8, …, 1.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Viridis color at `t` in `[0, 1]`.
pub fn viridis(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f32;
    let lo = (t.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = t - lo as f32;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[lo + 1]);
    let mix = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * frac).round() as u8;
    [mix(0), mix(1), mix(2)]
}

fn cells(pixels: u32) -> usize {
    pixels.div_ceil(CELL) as usize
}

/// Place `frequencies` (most frequent first) on the canvas.
///
/// Returns the placed words in placement order. Words that no longer fit at
/// the minimum font size are left out, as is everything after them.
pub fn layout(
    frequencies: &[(String, usize)],
    measure: &dyn TextMeasure,
    options: &LayoutOptions,
) -> Vec<PlacedWord> {
    let mut placed = Vec::new();
    let Some(max_count) = frequencies.iter().map(|(_, c)| *c).max().filter(|c| *c > 0) else {
        return placed;
    };

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut grid = Occupancy::new(options.width, options.height);
    let rs = options.relative_scaling.clamp(0.0, 1.0);
    let step = options.font_step.max(1);

    let mut font_size = options.max_font_size as f32;
    let mut last_freq = 1.0f32;

    for (word, count) in frequencies.iter().take(options.max_words) {
        let freq = *count as f32 / max_count as f32;
        if rs > 0.0 {
            font_size = ((rs * freq / last_freq + (1.0 - rs)) * font_size).round();
        }

        let mut spot = None;
        while font_size >= options.min_font_size as f32 {
            let (w, h) = measure.measure(word, font_size);
            let (bw, bh) = (cells(w + options.margin), cells(h + options.margin));
            if let Some(pos) = grid.sample_position(bw, bh, &mut rng) {
                spot = Some((pos, (w, h), (bw, bh)));
                break;
            }
            font_size -= step as f32;
        }

        let Some(((col, row), (w, h), (bw, bh))) = spot else {
            break;
        };
        grid.fill(col, row, bw, bh);

        let half_margin = options.margin / 2;
        placed.push(PlacedWord {
            word: word.clone(),
            count: *count,
            font_size: font_size as u32,
            x: col as u32 * CELL + half_margin,
            y: row as u32 * CELL + half_margin,
            width: w,
            height: h,
            color: viridis(rng.random::<f32>()),
        });
        last_freq = freq;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace stand-in: 0.6 em per character, 1 em tall.
    struct Mono;

    impl TextMeasure for Mono {
        fn measure(&self, word: &str, font_size: f32) -> (u32, u32) {
            let w = (word.chars().count() as f32 * font_size * 0.6).ceil() as u32;
            (w, font_size.ceil() as u32)
        }
    }

    fn options() -> LayoutOptions {
        LayoutOptions {
            width: 800,
            height: 400,
            max_words: 200,
            min_font_size: 4,
            max_font_size: 120,
            font_step: 1,
            relative_scaling: 0.5,
            margin: 2,
            seed: 42,
        }
    }

    fn freqs(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn test_places_words_inside_canvas_without_overlap() {
        let f = freqs(&[("reforma", 9), ("imposto", 6), ("câmara", 4), ("orçamento", 3), ("voto", 2), ("plenário", 1)]);
        let placed = layout(&f, &Mono, &options());
        assert_eq!(placed.len(), 6);
        for w in &placed {
            assert!(w.x + w.width <= 800, "{w:?}");
            assert!(w.y + w.height <= 400, "{w:?}");
        }
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_more_frequent_words_are_not_smaller() {
        let f = freqs(&[("reforma", 10), ("imposto", 5), ("voto", 1)]);
        let placed = layout(&f, &Mono, &options());
        assert!(placed[0].font_size >= placed[1].font_size);
        assert!(placed[1].font_size >= placed[2].font_size);
        assert_eq!(placed[0].font_size, 120);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let f = freqs(&[("reforma", 3), ("imposto", 2), ("voto", 1)]);
        assert_eq!(layout(&f, &Mono, &options()), layout(&f, &Mono, &options()));
    }

    #[test]
    fn test_max_words_cap() {
        let f: Vec<(String, usize)> = (0..50).map(|i| (format!("w{i}"), 1)).collect();
        let opts = LayoutOptions {
            max_words: 10,
            ..options()
        };
        assert_eq!(layout(&f, &Mono, &opts).len(), 10);
    }

    #[test]
    fn test_shrinks_to_fit() {
        let f = freqs(&[("inconstitucionalissimamente", 1)]);
        let opts = LayoutOptions {
            width: 200,
            height: 100,
            max_font_size: 90,
            ..options()
        };
        let placed = layout(&f, &Mono, &opts);
        assert_eq!(placed.len(), 1);
        assert!(placed[0].font_size < 90);
        assert!(placed[0].x + placed[0].width <= 200);
    }

    #[test]
    fn test_nothing_fits() {
        let f = freqs(&[("palavra", 1)]);
        let opts = LayoutOptions {
            width: 8,
            height: 8,
            ..options()
        };
        assert!(layout(&f, &Mono, &opts).is_empty());
        assert!(layout(&[], &Mono, &options()).is_empty());
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), [68, 1, 84]);
        assert_eq!(viridis(1.0), [253, 231, 37]);
        assert_eq!(viridis(0.5), [33, 144, 141]);
    }
}
