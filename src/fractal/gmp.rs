use rug::Float;

use crate::fractal::iterations::MAX_ITERATIONS;
use crate::fractal::types::PointOutcome;

/// Significand bits needed to keep double-equivalent resolution at `zoom`.
///
/// A viewport half-width of 2/zoom leaves about 53 - log2(zoom) usable bits
/// in an f64; carrying log2(zoom) extra bits restores the full 53 at depth.
/// The floor of 64 matches the smallest precision worth paying MPFR for.
pub fn precision_bits_for_zoom(zoom: f64) -> u32 {
    let depth = zoom.log2().ceil();
    let extra = if depth > 0.0 { depth as u32 } else { 0 };
    (extra + 53).max(64)
}

/// Mandelbrot recurrence on separate real/imaginary `rug::Float` components.
///
/// Same recurrence as the double kernel, with the escape test restated as
/// re^2 + im^2 > 4 so no square root is taken inside the loop. Values stay
/// in arbitrary precision for the whole orbit; nothing is read back to f64.
pub fn mandelbrot_arbitrary(prec: u32, z_re: &Float, z_im: &Float) -> PointOutcome {
    let four = Float::with_val(prec, 4);
    let mut v_re = Float::with_val(prec, 0);
    let mut v_im = Float::with_val(prec, 0);
    for n in 0..MAX_ITERATIONS {
        // v = v^2 + z: (r + i)^2 = r^2 - i^2 + 2ri
        let mut next_re = v_re.clone();
        next_re *= &v_re;
        let mut im_sq = v_im.clone();
        im_sq *= &v_im;
        next_re -= &im_sq;
        next_re += z_re;

        let mut next_im = v_re.clone();
        next_im *= &v_im;
        next_im *= 2u32;
        next_im += z_im;

        v_re = next_re;
        v_im = next_im;

        let mut square_sum = v_re.clone();
        square_sum *= &v_re;
        let mut im_part = v_im.clone();
        im_part *= &v_im;
        square_sum += &im_part;
        if square_sum > four {
            return PointOutcome::Escaped(n);
        }
    }
    PointOutcome::Bounded
}
