/// Filter rendering
///
/// Every filter takes an RGBA source and produces a new RGBA bitmap of the
/// same size. The source is never modified and alpha is carried through.
///
/// Architecture:
/// - `blur.rs` - Gaussian blur (box approximation) and unsharp mask
/// - `color.rs` - Sepia tone and vignette
/// - `stylize.rs` - Crystallize, edges and pixellate

pub mod blur;
pub mod color;
pub mod stylize;

use image::RgbaImage;

use super::{FilterError, FilterKind, FilterParameters, Parameter};

/// Render `kind` with `params` onto a copy of `source`
pub fn apply(
    kind: FilterKind,
    params: &FilterParameters,
    source: &RgbaImage,
) -> Result<RgbaImage, FilterError> {
    let value = |parameter: Parameter| effective(kind, params, parameter);

    if source.width() == 0 || source.height() == 0 {
        return Ok(source.clone());
    }

    let output = match kind {
        FilterKind::Crystallize => stylize::crystallize(source, value(Parameter::Radius)?),
        FilterKind::Edges => stylize::edges(source, value(Parameter::Intensity)?),
        FilterKind::GaussianBlur => blur::gaussian_blur(source, value(Parameter::Radius)?),
        FilterKind::Pixellate => stylize::pixellate(source, value(Parameter::Scale)?),
        FilterKind::SepiaTone => color::sepia_tone(source, value(Parameter::Intensity)?),
        FilterKind::UnsharpMask => blur::unsharp_mask(
            source,
            value(Parameter::Radius)?,
            value(Parameter::Intensity)?,
        ),
        FilterKind::Vignette => color::vignette(
            source,
            value(Parameter::Intensity)?,
            value(Parameter::Radius)?,
        ),
    };

    Ok(output)
}

/// Resolve a parameter and reject values no filter can render with
fn effective(
    kind: FilterKind,
    params: &FilterParameters,
    parameter: Parameter,
) -> Result<f32, FilterError> {
    let value = params.effective(kind, parameter);

    if !value.is_finite() || value < 0.0 {
        return Err(FilterError::Render {
            filter: kind,
            reason: format!("{parameter:?} must be a finite, non-negative number (got {value})"),
        });
    }

    Ok(value as f32)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgba, RgbaImage};

    /// Deterministic colourful test card
    pub fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) * 7 % 256) as u8,
                200,
            ])
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }
}
