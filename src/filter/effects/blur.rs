use image::{Rgba, RgbaImage};

/// Number of box passes used to approximate a Gaussian
const PASSES: usize = 3;

/// Gaussian blur with standard deviation `sigma` (in pixels).
///
/// Approximated by three box blurs whose widths are chosen to match the
/// Gaussian's variance. Each box pass is a sliding window sum, so the cost
/// does not grow with the radius. Edges are clamped.
pub fn gaussian_blur(source: &RgbaImage, sigma: f32) -> RgbaImage {
    let width = source.width() as usize;
    let height = source.height() as usize;

    if sigma <= 0.0 || width == 0 || height == 0 {
        return source.clone();
    }

    let mut front = source.as_raw().clone();
    let mut back = vec![0u8; front.len()];

    for size in box_sizes_for_gauss(sigma) {
        let radius = size.saturating_sub(1) / 2;
        if radius == 0 {
            continue;
        }
        box_blur_horizontal(&front, &mut back, width, height, radius);
        box_blur_vertical(&back, &mut front, width, height, radius);
    }

    RgbaImage::from_raw(source.width(), source.height(), front)
        .unwrap_or_else(|| source.clone())
}

/// Sharpen by adding back the difference between the source and a blurred copy
pub fn unsharp_mask(source: &RgbaImage, radius: f32, amount: f32) -> RgbaImage {
    if radius <= 0.0 || amount <= 0.0 {
        return source.clone();
    }

    let blurred = gaussian_blur(source, radius);

    RgbaImage::from_fn(source.width(), source.height(), |x, y| {
        let original = source.get_pixel(x, y);
        let soft = blurred.get_pixel(x, y);

        let mut out = [0u8; 4];
        for c in 0..3 {
            let orig = original[c] as f32;
            let diff = orig - soft[c] as f32;
            out[c] = (orig + diff * amount).round().clamp(0.0, 255.0) as u8;
        }
        out[3] = original[3];
        Rgba(out)
    })
}

/// Box widths whose successive application approximates a Gaussian
fn box_sizes_for_gauss(sigma: f32) -> [usize; PASSES] {
    let sigma = sigma as f64;
    let n = PASSES as f64;

    let w_ideal = ((12.0 * sigma * sigma / n) + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wu = wl + 2;

    let wl_f = wl as f64;
    let m_ideal = (12.0 * sigma * sigma - n * wl_f * wl_f - 4.0 * n * wl_f - 3.0 * n)
        / (-4.0 * wl_f - 4.0);
    let m = m_ideal.round().clamp(0.0, n) as usize;

    let mut sizes = [wu.max(1) as usize; PASSES];
    for size in sizes.iter_mut().take(m) {
        *size = wl.max(1) as usize;
    }
    sizes
}

fn box_blur_horizontal(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (radius * 2 + 1) as u32;
    let half = window / 2;
    let last = width as isize - 1;

    for y in 0..height {
        let row = y * width * 4;
        let mut sums = [0u32; 4];

        for dx in -(radius as isize)..=(radius as isize) {
            let idx = row + dx.clamp(0, last) as usize * 4;
            for c in 0..4 {
                sums[c] += src[idx + c] as u32;
            }
        }

        for x in 0..width {
            let out = row + x * 4;
            for c in 0..4 {
                dst[out + c] = ((sums[c] + half) / window) as u8;
            }

            let remove = row + (x as isize - radius as isize).clamp(0, last) as usize * 4;
            let add = row + (x as isize + radius as isize + 1).clamp(0, last) as usize * 4;
            for c in 0..4 {
                sums[c] = sums[c] + src[add + c] as u32 - src[remove + c] as u32;
            }
        }
    }
}

fn box_blur_vertical(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (radius * 2 + 1) as u32;
    let half = window / 2;
    let last = height as isize - 1;

    for x in 0..width {
        let mut sums = [0u32; 4];

        for dy in -(radius as isize)..=(radius as isize) {
            let idx = (dy.clamp(0, last) as usize * width + x) * 4;
            for c in 0..4 {
                sums[c] += src[idx + c] as u32;
            }
        }

        for y in 0..height {
            let out = (y * width + x) * 4;
            for c in 0..4 {
                dst[out + c] = ((sums[c] + half) / window) as u8;
            }

            let remove = ((y as isize - radius as isize).clamp(0, last) as usize * width + x) * 4;
            let add = ((y as isize + radius as isize + 1).clamp(0, last) as usize * width + x) * 4;
            for c in 0..4 {
                sums[c] = sums[c] + src[add + c] as u32 - src[remove + c] as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::effects::test_support::{gradient, solid};

    #[test]
    fn test_zero_sigma_is_identity() {
        let source = gradient(20, 10);
        assert_eq!(gaussian_blur(&source, 0.0), source);
    }

    #[test]
    fn test_solid_color_is_unchanged() {
        let source = solid(25, 25, [90, 140, 30, 255]);
        assert_eq!(gaussian_blur(&source, 6.0), source);
        assert_eq!(unsharp_mask(&source, 6.0, 1.0), source);
    }

    #[test]
    fn test_blur_smooths_a_hard_edge() {
        let source = RgbaImage::from_fn(40, 4, |x, _| {
            if x < 20 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });

        let blurred = gaussian_blur(&source, 3.0);

        let left = blurred.get_pixel(19, 2)[0];
        let right = blurred.get_pixel(20, 2)[0];
        assert!(left > 0 && left < 255, "left of edge = {left}");
        assert!(right > 0 && right < 255, "right of edge = {right}");
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
        assert_eq!(blurred.get_pixel(39, 0)[0], 255);
    }

    #[test]
    fn test_huge_sigma_on_small_image() {
        // Radius far beyond the image size must not index out of bounds
        let source = gradient(5, 3);
        let blurred = gaussian_blur(&source, 200.0);
        assert_eq!(blurred.dimensions(), (5, 3));
    }

    #[test]
    fn test_unsharp_mask_increases_edge_contrast() {
        let source = RgbaImage::from_fn(40, 4, |x, _| {
            if x < 20 { Rgba([80, 80, 80, 255]) } else { Rgba([160, 160, 160, 255]) }
        });

        let sharpened = unsharp_mask(&source, 3.0, 1.0);

        assert!(sharpened.get_pixel(19, 1)[0] < 80);
        assert!(sharpened.get_pixel(20, 1)[0] > 160);
    }

    #[test]
    fn test_box_sizes_are_odd() {
        for sigma in [0.5_f32, 1.0, 2.5, 10.0, 100.0] {
            for size in box_sizes_for_gauss(sigma) {
                assert_eq!(size % 2, 1, "sigma {sigma} gave even box {size}");
            }
        }
    }
}
