use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fractal families exposed to callers.
///
/// The historical request payload carries these as lowercase strings
/// (`"mandelbrot"`, `"newton"`); anything else is a request error, not a
/// silent no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalFamily {
    Mandelbrot,
    Newton,
}

impl FractalFamily {
    pub fn from_name(value: &str) -> Result<Self, RenderError> {
        match value.trim().to_lowercase().as_str() {
            "mandelbrot" => Ok(FractalFamily::Mandelbrot),
            "newton" => Ok(FractalFamily::Newton),
            _ => Err(RenderError::UnknownFamily(value.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FractalFamily::Mandelbrot => "mandelbrot",
            FractalFamily::Newton => "newton",
        }
    }
}

/// The six registered Newton iteration functions.
///
/// Selection is a closed enumerator: the iterated `f`/`f'` pair and the
/// table of registered roots are fixed per variant, never user-supplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NewtonVariant {
    /// f(z) = z^4 - 1
    #[default]
    Quartic,
    /// f(z) = z^3 - 1
    Cubic,
    /// f(z) = sin(z)
    Sine,
    /// f(z) = ln(z)
    Logarithm,
    /// f(z) = z^3 - 2z + 2
    CubicMinusTwoZ,
    /// f(z) = cosh(z)
    HyperbolicCosine,
}

impl NewtonVariant {
    /// Parses a function name from the request payload.
    ///
    /// An unrecognized name falls back to the quartic, matching the
    /// behavior the historical frontend relies on; the fallback is logged
    /// so misspelled requests remain visible.
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "z^4-1" | "quartic" | "1" => NewtonVariant::Quartic,
            "z^3-1" | "cubic" | "2" => NewtonVariant::Cubic,
            "sin(z)" | "sin" | "3" => NewtonVariant::Sine,
            "ln(z)" | "ln" | "log" | "4" => NewtonVariant::Logarithm,
            "z^3-2z+2" | "5" => NewtonVariant::CubicMinusTwoZ,
            "cosh(z)" | "cosh" | "6" => NewtonVariant::HyperbolicCosine,
            other => {
                log::warn!("unknown newton function '{other}', falling back to z^4-1");
                NewtonVariant::Quartic
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NewtonVariant::Quartic => "z^4-1",
            NewtonVariant::Cubic => "z^3-1",
            NewtonVariant::Sine => "sin(z)",
            NewtonVariant::Logarithm => "ln(z)",
            NewtonVariant::CubicMinusTwoZ => "z^3-2z+2",
            NewtonVariant::HyperbolicCosine => "cosh(z)",
        }
    }

    pub fn all() -> &'static [NewtonVariant] {
        &[
            NewtonVariant::Quartic,
            NewtonVariant::Cubic,
            NewtonVariant::Sine,
            NewtonVariant::Logarithm,
            NewtonVariant::CubicMinusTwoZ,
            NewtonVariant::HyperbolicCosine,
        ]
    }
}

impl From<String> for NewtonVariant {
    fn from(value: String) -> Self {
        NewtonVariant::from_name(&value)
    }
}

impl From<NewtonVariant> for String {
    fn from(value: NewtonVariant) -> Self {
        value.name().to_string()
    }
}

/// Kernel chosen once per request from family, variant and precision mode.
///
/// `high_precision` only affects the Mandelbrot family; there is no
/// arbitrary-precision Newton path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelSelector {
    MandelbrotDouble,
    MandelbrotArbitrary { precision_bits: u32 },
    Newton(NewtonVariant),
}

impl KernelSelector {
    pub fn for_request(request: &ViewRequest) -> Self {
        match request.family {
            FractalFamily::Newton => KernelSelector::Newton(request.variant),
            FractalFamily::Mandelbrot if request.high_precision => {
                KernelSelector::MandelbrotArbitrary {
                    precision_bits: crate::fractal::gmp::precision_bits_for_zoom(request.zoom),
                }
            }
            FractalFamily::Mandelbrot => KernelSelector::MandelbrotDouble,
        }
    }

    /// Number of registered roots for basin coloring (1 outside Newton).
    pub fn root_count(&self) -> u8 {
        match self {
            KernelSelector::Newton(variant) => {
                crate::fractal::iterations::registered_roots(*variant).len() as u8
            }
            _ => 1,
        }
    }
}

/// Result of one kernel evaluation at a single coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointOutcome {
    /// Escape-time iteration left the radius-2 disk at this step.
    Escaped(u8),
    /// Newton iteration settled on the registered root at `root`.
    Converged { root: u8, step: u8 },
    /// Iteration cap reached without escape or convergence.
    Bounded,
}

/// One view request as decoded by the transport layer.
///
/// Field renames match the historical JSON payload so a transport layer can
/// deserialize requests unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewRequest {
    #[serde(rename = "x")]
    pub center_x: f64,
    #[serde(rename = "y")]
    pub center_y: f64,
    pub zoom: f64,
    #[serde(rename = "fractalType")]
    pub family: FractalFamily,
    #[serde(rename = "functionToUse", default)]
    pub variant: NewtonVariant,
    #[serde(default)]
    pub colorized: bool,
    #[serde(rename = "antiAliasing", default)]
    pub anti_aliasing: bool,
    #[serde(rename = "highPrecision", default)]
    pub high_precision: bool,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("zoom must be a strictly positive finite number, got {0}")]
    InvalidZoom(f64),
    #[error("unknown fractal family '{0}'")]
    UnknownFamily(String),
    #[error("width and height must be nonzero and even, got {width}x{height}")]
    OddDimensions { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_name() {
        assert_eq!(
            FractalFamily::from_name("mandelbrot").unwrap(),
            FractalFamily::Mandelbrot
        );
        assert_eq!(
            FractalFamily::from_name(" Newton ").unwrap(),
            FractalFamily::Newton
        );
        assert!(matches!(
            FractalFamily::from_name("julia"),
            Err(RenderError::UnknownFamily(_))
        ));
    }

    #[test]
    fn variant_name_roundtrip() {
        for variant in NewtonVariant::all() {
            assert_eq!(NewtonVariant::from_name(variant.name()), *variant);
        }
    }

    #[test]
    fn unknown_variant_falls_back_to_quartic() {
        assert_eq!(NewtonVariant::from_name("wibble"), NewtonVariant::Quartic);
        assert_eq!(NewtonVariant::from_name(""), NewtonVariant::Quartic);
    }

    #[test]
    fn request_deserializes_historical_payload() {
        let payload = r#"{
            "x": -0.5,
            "y": 0.1,
            "zoom": 2.0,
            "fractalType": "newton",
            "functionToUse": "z^3-1",
            "antiAliasing": true,
            "highPrecision": false,
            "colorized": true
        }"#;
        let request: ViewRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.center_x, -0.5);
        assert_eq!(request.center_y, 0.1);
        assert_eq!(request.family, FractalFamily::Newton);
        assert_eq!(request.variant, NewtonVariant::Cubic);
        assert!(request.anti_aliasing);
        assert!(request.colorized);
        assert!(!request.high_precision);
    }

    #[test]
    fn request_defaults_optional_fields() {
        let payload = r#"{"x": 0.0, "y": 0.0, "zoom": 1.0, "fractalType": "mandelbrot"}"#;
        let request: ViewRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.variant, NewtonVariant::Quartic);
        assert!(!request.colorized);
        assert!(!request.anti_aliasing);
        assert!(!request.high_precision);
    }

    #[test]
    fn unknown_family_fails_deserialization() {
        let payload = r#"{"x": 0.0, "y": 0.0, "zoom": 1.0, "fractalType": "julia"}"#;
        assert!(serde_json::from_str::<ViewRequest>(payload).is_err());
    }

    #[test]
    fn selector_ignores_high_precision_for_newton() {
        let request = ViewRequest {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            family: FractalFamily::Newton,
            variant: NewtonVariant::Sine,
            colorized: false,
            anti_aliasing: false,
            high_precision: true,
        };
        assert_eq!(
            KernelSelector::for_request(&request),
            KernelSelector::Newton(NewtonVariant::Sine)
        );
    }
}
