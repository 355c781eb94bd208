/// Image filter catalog
///
/// This module handles:
/// - The fixed set of filters offered in the "Change filter" menu
/// - The static capability table (which parameters each filter accepts)
/// - Mapping the intensity slider onto filter parameters (params.rs)
/// - Rendering a configured filter onto a bitmap (effects/)

pub mod effects;
pub mod params;

pub use params::{FilterParameters, Intensity};

/// Errors produced while configuring or rendering a filter
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("intensity {0} is outside 0.0..=1.0")]
    IntensityOutOfRange(f64),
    #[error("{filter} could not render: {reason}")]
    Render { filter: FilterKind, reason: String },
}

/// An adjustable numeric input of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Intensity,
    Radius,
    Scale,
}

/// The filters offered in the menu. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    Crystallize,
    Edges,
    GaussianBlur,
    Pixellate,
    #[default]
    SepiaTone,
    UnsharpMask,
    Vignette,
}

impl FilterKind {
    /// Menu order
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Crystallize,
        FilterKind::Edges,
        FilterKind::GaussianBlur,
        FilterKind::Pixellate,
        FilterKind::SepiaTone,
        FilterKind::UnsharpMask,
        FilterKind::Vignette,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Crystallize => "Crystallize",
            FilterKind::Edges => "Edges",
            FilterKind::GaussianBlur => "Gaussian Blur",
            FilterKind::Pixellate => "Pixellate",
            FilterKind::SepiaTone => "Sepia Tone",
            FilterKind::UnsharpMask => "Unsharp Mask",
            FilterKind::Vignette => "Vignette",
        }
    }

    /// Static capability table: the parameters this filter accepts
    pub fn supported_parameters(self) -> &'static [Parameter] {
        use Parameter::*;

        match self {
            FilterKind::Crystallize => &[Radius],
            FilterKind::Edges => &[Intensity],
            FilterKind::GaussianBlur => &[Radius],
            FilterKind::Pixellate => &[Scale],
            FilterKind::SepiaTone => &[Intensity],
            FilterKind::UnsharpMask => &[Intensity, Radius],
            FilterKind::Vignette => &[Intensity, Radius],
        }
    }

    pub fn supports(self, parameter: Parameter) -> bool {
        self.supported_parameters().contains(&parameter)
    }

    /// Value a filter falls back to when a parameter was never set.
    /// Returns None for parameters the filter does not accept.
    pub fn default_value(self, parameter: Parameter) -> Option<f64> {
        if !self.supports(parameter) {
            return None;
        }

        let value = match (self, parameter) {
            (FilterKind::Crystallize, Parameter::Radius) => 20.0,
            (FilterKind::Edges, Parameter::Intensity) => 1.0,
            (FilterKind::GaussianBlur, Parameter::Radius) => 10.0,
            (FilterKind::Pixellate, Parameter::Scale) => 8.0,
            (FilterKind::SepiaTone, Parameter::Intensity) => 1.0,
            (FilterKind::UnsharpMask, Parameter::Radius) => 2.5,
            (FilterKind::UnsharpMask, Parameter::Intensity) => 0.5,
            (FilterKind::Vignette, Parameter::Radius) => 1.0,
            (FilterKind::Vignette, Parameter::Intensity) => 0.0,
            _ => return None,
        };

        Some(value)
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sepia() {
        assert_eq!(FilterKind::default(), FilterKind::SepiaTone);
    }

    #[test]
    fn test_menu_lists_every_filter_once() {
        let labels: std::collections::HashSet<_> =
            FilterKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), 7);
        assert_eq!(FilterKind::ALL[0], FilterKind::Crystallize);
        assert_eq!(FilterKind::ALL[6], FilterKind::Vignette);
    }

    #[test]
    fn test_capability_table() {
        assert!(FilterKind::GaussianBlur.supports(Parameter::Radius));
        assert!(!FilterKind::GaussianBlur.supports(Parameter::Intensity));
        assert!(!FilterKind::GaussianBlur.supports(Parameter::Scale));

        assert!(FilterKind::Pixellate.supports(Parameter::Scale));
        assert_eq!(FilterKind::Pixellate.supported_parameters().len(), 1);

        assert!(FilterKind::UnsharpMask.supports(Parameter::Intensity));
        assert!(FilterKind::UnsharpMask.supports(Parameter::Radius));
        assert!(!FilterKind::UnsharpMask.supports(Parameter::Scale));
    }

    #[test]
    fn test_defaults_only_for_supported_parameters() {
        for kind in FilterKind::ALL {
            for parameter in [Parameter::Intensity, Parameter::Radius, Parameter::Scale] {
                assert_eq!(
                    kind.default_value(parameter).is_some(),
                    kind.supports(parameter),
                    "{kind} / {parameter:?}"
                );
            }
        }
    }
}
