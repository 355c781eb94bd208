/// Intensity slider to filter parameter mapping
///
/// The slider produces a single scalar in [0, 1]. Each filter only receives
/// the parameters it declares in its capability table:
/// - intensity ← slider value unchanged
/// - radius    ← slider value × 200
/// - scale     ← slider value × 10

use super::{FilterError, FilterKind, Parameter};

const RADIUS_FACTOR: f64 = 200.0;
const SCALE_FACTOR: f64 = 10.0;

/// User-controlled filter strength, always within 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Intensity(f64);

impl Intensity {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    /// Rejects values outside the slider range (and NaN)
    pub fn new(value: f64) -> Result<Self, FilterError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FilterError::IntensityOutOfRange(value))
        }
    }

    /// Clamp an arbitrary slider reading into range. NaN becomes 0.0.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Inputs handed to a filter. A field is `Some` only if the filter
/// supports that parameter and it was configured.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterParameters {
    pub intensity: Option<f64>,
    pub radius: Option<f64>,
    pub scale: Option<f64>,
}

impl FilterParameters {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Intensity => self.intensity,
            Parameter::Radius => self.radius,
            Parameter::Scale => self.scale,
        }
    }

    /// Configured value, or the filter's own default when unset
    pub fn effective(&self, kind: FilterKind, parameter: Parameter) -> f64 {
        self.get(parameter)
            .or_else(|| kind.default_value(parameter))
            .unwrap_or(0.0)
    }

    fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::Intensity => self.intensity = Some(value),
            Parameter::Radius => self.radius = Some(value),
            Parameter::Scale => self.scale = Some(value),
        }
    }
}

/// Derive the parameters for `kind` from the slider value.
/// Parameters the filter does not support are skipped, not rejected.
pub fn configure(kind: FilterKind, intensity: Intensity) -> FilterParameters {
    let mut params = FilterParameters::default();
    apply(kind, intensity, &mut params);
    params
}

/// Overwrite only the supported parameters of an existing set
pub fn apply(kind: FilterKind, intensity: Intensity, params: &mut FilterParameters) {
    let value = intensity.value();

    for &parameter in kind.supported_parameters() {
        let mapped = match parameter {
            Parameter::Intensity => value,
            Parameter::Radius => value * RADIUS_FACTOR,
            Parameter::Scale => value * SCALE_FACTOR,
        };
        params.set(parameter, mapped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 6] = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];

    #[test]
    fn test_gaussian_blur_at_half() {
        let params = configure(FilterKind::GaussianBlur, Intensity::new(0.5).unwrap());

        assert_eq!(params.radius, Some(100.0));
        assert_eq!(params.intensity, None);
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_only_supported_parameters_are_set() {
        for kind in FilterKind::ALL {
            for value in SAMPLES {
                let params = configure(kind, Intensity::new(value).unwrap());
                for parameter in [Parameter::Intensity, Parameter::Radius, Parameter::Scale] {
                    assert_eq!(
                        params.get(parameter).is_some(),
                        kind.supports(parameter),
                        "{kind} at {value}: {parameter:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_linear_scalings() {
        for kind in FilterKind::ALL {
            for value in SAMPLES {
                let params = configure(kind, Intensity::new(value).unwrap());
                if let Some(intensity) = params.intensity {
                    assert_eq!(intensity, value);
                }
                if let Some(radius) = params.radius {
                    assert_eq!(radius, value * 200.0);
                }
                if let Some(scale) = params.scale {
                    assert_eq!(scale, value * 10.0);
                }
            }
        }
    }

    #[test]
    fn test_unsupported_parameters_left_untouched() {
        let mut params = FilterParameters {
            intensity: Some(0.9),
            radius: None,
            scale: Some(3.0),
        };

        apply(FilterKind::Crystallize, Intensity::new(0.25).unwrap(), &mut params);

        assert_eq!(params.radius, Some(50.0));
        assert_eq!(params.intensity, Some(0.9));
        assert_eq!(params.scale, Some(3.0));
    }

    #[test]
    fn test_intensity_range() {
        assert!(Intensity::new(0.0).is_ok());
        assert!(Intensity::new(1.0).is_ok());
        assert_eq!(
            Intensity::new(1.5),
            Err(FilterError::IntensityOutOfRange(1.5))
        );
        assert!(Intensity::new(-0.01).is_err());
        assert!(Intensity::new(f64::NAN).is_err());
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Intensity::clamped(2.0).value(), 1.0);
        assert_eq!(Intensity::clamped(-3.0).value(), 0.0);
        assert_eq!(Intensity::clamped(f64::NAN).value(), 0.0);
        assert_eq!(Intensity::clamped(0.3).value(), 0.3);
    }

    #[test]
    fn test_effective_falls_back_to_filter_default() {
        let params = FilterParameters::default();
        assert_eq!(params.effective(FilterKind::Pixellate, Parameter::Scale), 8.0);

        let params = configure(FilterKind::Pixellate, Intensity::new(0.2).unwrap());
        assert_eq!(params.effective(FilterKind::Pixellate, Parameter::Scale), 2.0);
    }
}
