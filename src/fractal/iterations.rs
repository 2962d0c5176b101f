use num_complex::Complex64;

use crate::fractal::types::{KernelSelector, NewtonVariant, PointOutcome};

/// Iteration cap shared by every kernel; step counts fit in a u8.
pub const MAX_ITERATIONS: u8 = 100;

/// Escape radius for the Mandelbrot recurrence.
pub const ESCAPE_RADIUS: f64 = 2.0;

/// Squared step delta below which a Newton iteration counts as converged
/// (tolerance 1e-6, compared without the square root).
const CONVERGENCE_EPSILON_SQR: f64 = 1e-12;

/// Derivative magnitude below which the Newton step is considered degenerate.
const DERIVATIVE_EPSILON: f64 = 1e-12;

/// Evaluates the selected double-precision kernel at one coordinate.
pub fn iterate_point(selector: &KernelSelector, z_pixel: Complex64) -> PointOutcome {
    match selector {
        KernelSelector::MandelbrotDouble => mandelbrot(z_pixel),
        KernelSelector::MandelbrotArbitrary { .. } => {
            panic!("arbitrary-precision points must go through gmp::mandelbrot_arbitrary")
        }
        KernelSelector::Newton(variant) => newton(*variant, z_pixel),
    }
}

/// Mandelbrot recurrence: v_0 = 0, v_{n+1} = v_n^2 + z.
pub fn mandelbrot(z_pixel: Complex64) -> PointOutcome {
    let mut v = Complex64::new(0.0, 0.0);
    for n in 0..MAX_ITERATIONS {
        v = v * v + z_pixel;
        if v.norm() > ESCAPE_RADIUS {
            return PointOutcome::Escaped(n);
        }
    }
    PointOutcome::Bounded
}

/// Newton recurrence: z_{n+1} = z_n - f(z_n)/f'(z_n).
///
/// Converges when the step delta drops under the tolerance; the outcome
/// carries the registered root the final value is nearest to. A degenerate
/// derivative or a non-finite iterate ends the orbit without convergence.
pub fn newton(variant: NewtonVariant, z_pixel: Complex64) -> PointOutcome {
    let mut z = z_pixel;
    for step in 0..MAX_ITERATIONS {
        let derivative = newton_derivative(variant, z);
        if derivative.norm() < DERIVATIVE_EPSILON {
            return PointOutcome::Bounded;
        }
        let next = z - newton_value(variant, z) / derivative;
        if !next.re.is_finite() || !next.im.is_finite() {
            return PointOutcome::Bounded;
        }
        if (next - z).norm_sqr() < CONVERGENCE_EPSILON_SQR {
            return PointOutcome::Converged {
                root: nearest_root(variant, next),
                step,
            };
        }
        z = next;
    }
    PointOutcome::Bounded
}

fn newton_value(variant: NewtonVariant, z: Complex64) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    match variant {
        NewtonVariant::Quartic => {
            let z_sq = z * z;
            z_sq * z_sq - one
        }
        NewtonVariant::Cubic => z * z * z - one,
        NewtonVariant::Sine => z.sin(),
        NewtonVariant::Logarithm => z.ln(),
        NewtonVariant::CubicMinusTwoZ => z * z * z - z * 2.0 + Complex64::new(2.0, 0.0),
        NewtonVariant::HyperbolicCosine => z.cosh(),
    }
}

fn newton_derivative(variant: NewtonVariant, z: Complex64) -> Complex64 {
    match variant {
        NewtonVariant::Quartic => z * z * z * 4.0,
        NewtonVariant::Cubic => z * z * 3.0,
        NewtonVariant::Sine => z.cos(),
        NewtonVariant::Logarithm => Complex64::new(1.0, 0.0) / z,
        NewtonVariant::CubicMinusTwoZ => z * z * 3.0 - Complex64::new(2.0, 0.0),
        NewtonVariant::HyperbolicCosine => z.sinh(),
    }
}

const QUARTIC_ROOTS: [(f64, f64); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

const CUBIC_ROOTS: [(f64, f64); 3] = [
    (1.0, 0.0),
    (-0.5, 0.8660254037844386),
    (-0.5, -0.8660254037844386),
];

// sin(z) and cosh(z) have infinitely many zeros; the registered set covers
// the roots inside the default viewport.
const SINE_ROOTS: [(f64, f64); 5] = [
    (-6.283185307179586, 0.0),
    (-3.141592653589793, 0.0),
    (0.0, 0.0),
    (3.141592653589793, 0.0),
    (6.283185307179586, 0.0),
];

const LOGARITHM_ROOTS: [(f64, f64); 1] = [(1.0, 0.0)];

const CUBIC_MINUS_TWO_Z_ROOTS: [(f64, f64); 3] = [
    (-1.7692923542386314, 0.0),
    (0.8846461771193157, 0.5897428050222056),
    (0.8846461771193157, -0.5897428050222056),
];

const HYPERBOLIC_COSINE_ROOTS: [(f64, f64); 4] = [
    (0.0, -4.71238898038469),
    (0.0, -1.5707963267948966),
    (0.0, 1.5707963267948966),
    (0.0, 4.71238898038469),
];

/// Registered roots for a variant, in the index order basin coloring uses.
pub fn registered_roots(variant: NewtonVariant) -> &'static [(f64, f64)] {
    match variant {
        NewtonVariant::Quartic => &QUARTIC_ROOTS,
        NewtonVariant::Cubic => &CUBIC_ROOTS,
        NewtonVariant::Sine => &SINE_ROOTS,
        NewtonVariant::Logarithm => &LOGARITHM_ROOTS,
        NewtonVariant::CubicMinusTwoZ => &CUBIC_MINUS_TWO_Z_ROOTS,
        NewtonVariant::HyperbolicCosine => &HYPERBOLIC_COSINE_ROOTS,
    }
}

fn nearest_root(variant: NewtonVariant, z: Complex64) -> u8 {
    let mut best = 0usize;
    let mut best_distance = f64::INFINITY;
    for (index, (re, im)) in registered_roots(variant).iter().enumerate() {
        let distance = (z - Complex64::new(*re, *im)).norm_sqr();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best as u8
}
