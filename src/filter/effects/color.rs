use image::{Rgba, RgbaImage};

/// Sepia tone blended with the original by `intensity` (0 = original, 1 = full sepia)
pub fn sepia_tone(source: &RgbaImage, intensity: f32) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    let mut output = source.clone();

    for pixel in output.pixels_mut() {
        let r = pixel[0] as f32;
        let g = pixel[1] as f32;
        let b = pixel[2] as f32;

        let tr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
        let tg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
        let tb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);

        pixel[0] = mix(r, tr, intensity);
        pixel[1] = mix(g, tg, intensity);
        pixel[2] = mix(b, tb, intensity);
    }

    output
}

/// Darken towards the corners.
///
/// Pixels within `radius` pixels of the centre keep their brightness. Past
/// that the brightness eases down to `1 - intensity` at the corners.
pub fn vignette(source: &RgbaImage, intensity: f32, radius: f32) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    let mut output = source.clone();

    if intensity == 0.0 {
        return output;
    }

    let center_x = source.width() as f32 / 2.0;
    let center_y = source.height() as f32 / 2.0;
    let max_distance = (center_x * center_x + center_y * center_y).sqrt();
    let falloff = (max_distance - radius).max(f32::EPSILON);

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center_x;
        let dy = y as f32 + 0.5 - center_y;
        let distance = (dx * dx + dy * dy).sqrt();

        let t = ((distance - radius) / falloff).clamp(0.0, 1.0);
        let factor = 1.0 - intensity * smoothstep(t);

        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            (r as f32 * factor).round() as u8,
            (g as f32 * factor).round() as u8,
            (b as f32 * factor).round() as u8,
            a,
        ]);
    }

    output
}

fn mix(from: f32, to: f32, amount: f32) -> u8 {
    (from * (1.0 - amount) + to * amount).round().clamp(0.0, 255.0) as u8
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
