use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed seed so the same photo always crystallizes the same way
const CRYSTAL_SEED: u64 = 0x1257_a1f7;

/// Voronoi cells roughly `radius` pixels across, each filled with the
/// source colour found at its seed point
pub fn crystallize(source: &RgbaImage, radius: f32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let grid = CrystalGrid::new(width, height, radius.max(1.0));

    let seed_colors: Vec<Rgba<u8>> = grid
        .seeds
        .iter()
        .map(|&(sx, sy)| {
            let px = (sx as u32).min(width - 1);
            let py = (sy as u32).min(height - 1);
            *source.get_pixel(px, py)
        })
        .collect();

    RgbaImage::from_fn(width, height, |x, y| {
        let color = seed_colors[grid.nearest(x as f32 + 0.5, y as f32 + 0.5)];
        let alpha = source.get_pixel(x, y)[3];
        Rgba([color[0], color[1], color[2], alpha])
    })
}

/// One jittered seed per `spacing`-sized grid cell
struct CrystalGrid {
    spacing: f32,
    cols: usize,
    rows: usize,
    seeds: Vec<(f32, f32)>,
}

impl CrystalGrid {
    fn new(width: u32, height: u32, spacing: f32) -> Self {
        let cols = ((width as f32 / spacing).ceil() as usize).max(1);
        let rows = ((height as f32 / spacing).ceil() as usize).max(1);

        let mut rng = StdRng::seed_from_u64(CRYSTAL_SEED);
        let mut seeds = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let sx = (col as f32 + rng.random::<f32>()) * spacing;
                let sy = (row as f32 + rng.random::<f32>()) * spacing;
                seeds.push((sx, sy));
            }
        }

        Self { spacing, cols, rows, seeds }
    }

    /// Index of the seed closest to `(fx, fy)`.
    ///
    /// The point's own seed is less than `spacing * sqrt(2)` away and any
    /// seed three or more cells over is at least `2 * spacing` away, so a
    /// 5x5 neighbourhood always contains the nearest seed.
    fn nearest(&self, fx: f32, fy: f32) -> usize {
        let col = (fx / self.spacing) as isize;
        let row = (fy / self.spacing) as isize;

        let mut best = f32::MAX;
        let mut nearest = 0;

        for r in (row - 2)..=(row + 2) {
            if r < 0 || r >= self.rows as isize {
                continue;
            }
            for c in (col - 2)..=(col + 2) {
                if c < 0 || c >= self.cols as isize {
                    continue;
                }
                let index = r as usize * self.cols + c as usize;
                let d = squared_distance(self.seeds[index], fx, fy);
                if d < best {
                    best = d;
                    nearest = index;
                }
            }
        }

        nearest
    }
}

fn squared_distance((sx, sy): (f32, f32), fx: f32, fy: f32) -> f32 {
    (sx - fx) * (sx - fx) + (sy - fy) * (sy - fy)
}

/// Per-channel Sobel gradient magnitude scaled by `intensity`.
/// Flat regions go black; edges light up in their own colour.
pub fn edges(source: &RgbaImage, intensity: f32) -> RgbaImage {
    const SOBEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
    const SOBEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

    let (width, height) = source.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    RgbaImage::from_fn(width, height, |x, y| {
        let mut gx = [0i32; 3];
        let mut gy = [0i32; 3];

        for ky in -1i64..=1 {
            for kx in -1i64..=1 {
                let px = (x as i64 + kx).clamp(0, max_x) as u32;
                let py = (y as i64 + ky).clamp(0, max_y) as u32;
                let pixel = source.get_pixel(px, py);
                let ki = ((ky + 1) * 3 + (kx + 1)) as usize;

                for c in 0..3 {
                    gx[c] += pixel[c] as i32 * SOBEL_X[ki];
                    gy[c] += pixel[c] as i32 * SOBEL_Y[ki];
                }
            }
        }

        let mut out = [0u8; 4];
        for c in 0..3 {
            let magnitude = ((gx[c] * gx[c] + gy[c] * gy[c]) as f32).sqrt();
            out[c] = (magnitude * intensity).round().clamp(0.0, 255.0) as u8;
        }
        out[3] = source.get_pixel(x, y)[3];
        Rgba(out)
    })
}

/// Square blocks `scale` pixels wide filled with their average colour.
/// The block grid is anchored at the image centre.
pub fn pixellate(source: &RgbaImage, scale: f32) -> RgbaImage {
    let block = scale.round().max(1.0) as i64;
    let mut output = source.clone();

    if block == 1 {
        return output;
    }

    let (width, height) = source.dimensions();
    let xs = block_spans(width, block);
    let ys = block_spans(height, block);

    for &(y0, y1) in &ys {
        for &(x0, x1) in &xs {
            let mut sums = [0u64; 3];
            let mut count = 0u64;

            for y in y0..y1 {
                for x in x0..x1 {
                    let pixel = source.get_pixel(x, y);
                    for c in 0..3 {
                        sums[c] += pixel[c] as u64;
                    }
                    count += 1;
                }
            }

            let average = sums.map(|s| ((s + count / 2) / count) as u8);

            for y in y0..y1 {
                for x in x0..x1 {
                    let pixel = output.get_pixel_mut(x, y);
                    pixel[0] = average[0];
                    pixel[1] = average[1];
                    pixel[2] = average[2];
                }
            }
        }
    }

    output
}

/// Half-open pixel ranges of `block`-wide spans covering `0..len`, with a
/// span boundary at `len / 2`
fn block_spans(len: u32, block: i64) -> Vec<(u32, u32)> {
    let len = len as i64;
    let center = len / 2;
    let mut start = center - ((center + block - 1) / block) * block;

    let mut spans = Vec::new();
    while start < len {
        let lo = start.max(0);
        let hi = (start + block).min(len);
        if hi > lo {
            spans.push((lo as u32, hi as u32));
        }
        start += block;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::effects::test_support::{gradient, solid};

    #[test]
    fn test_crystallize_is_deterministic() {
        let source = gradient(64, 48);
        assert_eq!(crystallize(&source, 8.0), crystallize(&source, 8.0));
    }

    #[test]
    fn test_crystal_cells_pick_the_nearest_seed() {
        for spacing in [1.0, 2.5, 6.0, 13.0] {
            let grid = CrystalGrid::new(41, 29, spacing);

            for y in 0..29 {
                for x in 0..41 {
                    let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
                    let closest = grid
                        .seeds
                        .iter()
                        .map(|&seed| squared_distance(seed, fx, fy))
                        .fold(f32::MAX, f32::min);

                    let found = squared_distance(grid.seeds[grid.nearest(fx, fy)], fx, fy);
                    assert_eq!(found, closest, "spacing {spacing} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_crystallize_uses_few_colours() {
        let source = gradient(64, 64);
        let output = crystallize(&source, 16.0);

        let colours: std::collections::HashSet<_> = output.pixels().map(|p| p.0).collect();
        // 4x4 grid of cells, one colour per cell at most
        assert!(colours.len() <= 16, "got {} colours", colours.len());
        assert!(colours.len() > 1);
    }

    #[test]
    fn test_crystallize_large_radius_on_small_image() {
        let source = gradient(10, 6);
        let output = crystallize(&source, 200.0);

        let first = output.get_pixel(0, 0);
        assert!(output.pixels().all(|p| p == first));
    }

    #[test]
    fn test_edges_flat_image_is_black() {
        let output = edges(&solid(12, 12, [180, 40, 90, 255]), 1.0);
        assert!(output.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_edges_highlight_boundary() {
        let source = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgba([0, 0, 0, 255]) } else { Rgba([100, 100, 100, 255]) }
        });

        let output = edges(&source, 1.0);

        assert!(output.get_pixel(5, 5)[0] > 0);
        assert_eq!(output.get_pixel(0, 5)[0], 0);
        assert_eq!(output.get_pixel(9, 5)[0], 0);
    }

    #[test]
    fn test_edges_zero_intensity_is_black() {
        let output = edges(&gradient(16, 16), 0.0);
        assert!(output.pixels().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
    }

    #[test]
    fn test_pixellate_small_scale_is_identity() {
        let source = gradient(9, 9);
        assert_eq!(pixellate(&source, 0.0), source);
        assert_eq!(pixellate(&source, 1.2), source);
    }

    #[test]
    fn test_pixellate_averages_blocks() {
        let source = RgbaImage::from_fn(4, 4, |x, y| {
            Rgba([if (x + y) % 2 == 0 { 0 } else { 100 }, 0, 0, 255])
        });

        let output = pixellate(&source, 2.0);

        assert!(output.pixels().all(|p| p[0] == 50));
    }

    #[test]
    fn test_block_spans_anchor_at_center() {
        assert_eq!(block_spans(4, 2), vec![(0, 2), (2, 4)]);
        assert_eq!(block_spans(5, 2), vec![(0, 2), (2, 4), (4, 5)]);
        assert_eq!(block_spans(6, 4), vec![(0, 3), (3, 6)]);
        assert_eq!(block_spans(3, 10), vec![(0, 1), (1, 3)]);
    }
}
