use std::time::Instant;

use image::{imageops, Rgba, RgbaImage};
use num_complex::Complex64;
use rayon::prelude::*;
use rug::Float;

use crate::color::colorize::Colorizer;
use crate::fractal::gmp::mandelbrot_arbitrary;
use crate::fractal::iterations::iterate_point;
use crate::fractal::types::{KernelSelector, RenderError, ViewRequest};
use crate::render::viewport::{Frame, Region};

/// Finished render: the composited pixel buffer plus the resolved
/// (post-negation) viewport bounds reported back to the caller.
#[derive(Clone, Debug)]
pub struct RenderResult {
    pub pixels: RgbaImage,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub center_x: f64,
    pub center_y: f64,
}

/// Renders one view request into a width x height RGBA buffer.
///
/// The frame is split into four equal quadrants rendered as a fixed fan-out
/// of parallel tasks (sequential within each task) and merged into disjoint
/// rectangles of one destination buffer; the result exists only once all
/// four have completed. Dimensions must be even so the quadrants tile the
/// raster exactly.
pub fn render_view(
    request: &ViewRequest,
    width: u32,
    height: u32,
) -> Result<RenderResult, RenderError> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(RenderError::OddDimensions { width, height });
    }

    let start = Instant::now();
    let frame = Frame::from_center_zoom(request.center_x, request.center_y, request.zoom)?;
    let selector = KernelSelector::for_request(request);
    let colorizer = Colorizer::new(request.colorized, selector.root_count());

    log::info!(
        "rendering bounds ({}, {}), ({}, {})",
        frame.xmin,
        frame.ymin,
        frame.xmax,
        frame.ymax
    );

    let quadrant_width = width / 2;
    let quadrant_height = height / 2;
    let tiles: Vec<RgbaImage> = frame
        .quadrants()
        .par_iter()
        .map(|region| {
            render_tile(
                &selector,
                &colorizer,
                region,
                quadrant_width,
                quadrant_height,
                request.anti_aliasing,
            )
        })
        .collect();

    let mut pixels = RgbaImage::new(width, height);
    let anchors = [
        (0i64, 0i64),
        (quadrant_width as i64, 0),
        (0, quadrant_height as i64),
        (quadrant_width as i64, quadrant_height as i64),
    ];
    for (tile, (x, y)) in tiles.iter().zip(anchors) {
        imageops::replace(&mut pixels, tile, x, y);
    }

    log::info!("frame rendered in {:.3}s", start.elapsed().as_secs_f64());

    Ok(RenderResult {
        pixels,
        xmin: frame.xmin,
        xmax: frame.xmax,
        ymin: frame.ymin,
        ymax: frame.ymax,
        center_x: frame.center_x,
        center_y: frame.center_y,
    })
}

/// Rasterizes one region of the viewport with the selected kernel.
pub(crate) fn render_tile(
    selector: &KernelSelector,
    colorizer: &Colorizer,
    region: &Region,
    width: u32,
    height: u32,
    anti_aliasing: bool,
) -> RgbaImage {
    match selector {
        KernelSelector::MandelbrotArbitrary { precision_bits } => {
            render_tile_arbitrary(*precision_bits, colorizer, region, width, height, anti_aliasing)
        }
        _ => render_tile_f64(selector, colorizer, region, width, height, anti_aliasing),
    }
}

fn render_tile_f64(
    selector: &KernelSelector,
    colorizer: &Colorizer,
    region: &Region,
    width: u32,
    height: u32,
    anti_aliasing: bool,
) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    let step = region.pixel_step(width);
    for py in 0..height {
        for px in 0..width {
            let (x, y) = region.map_pixel(px, py, width, height);
            let color = if anti_aliasing {
                anti_aliased_color(selector, colorizer, x, y, step)
            } else {
                colorizer.color(iterate_point(selector, Complex64::new(x, y)))
            };
            img.put_pixel(px, py, color);
        }
    }
    img
}

/// Subpixel offsets of the 4-point box supersample, in units of the
/// per-pixel step.
const SUBPIXEL_OFFSETS: [(f64, f64); 4] = [(-0.5, -0.5), (0.5, 0.5), (0.5, -0.5), (-0.5, 0.5)];

fn anti_aliased_color(
    selector: &KernelSelector,
    colorizer: &Colorizer,
    x: f64,
    y: f64,
    step: f64,
) -> Rgba<u8> {
    let samples = SUBPIXEL_OFFSETS.map(|(dx, dy)| {
        let z = Complex64::new(x + dx * step, y + dy * step);
        colorizer.color(iterate_point(selector, z))
    });
    average_color(samples)
}

/// Channel-wise average of the 4 samples, truncating integer division;
/// alpha stays fully opaque.
fn average_color(samples: [Rgba<u8>; 4]) -> Rgba<u8> {
    let sum = samples.iter().fold([0u32; 3], |mut acc, sample| {
        acc[0] += sample.0[0] as u32;
        acc[1] += sample.0[1] as u32;
        acc[2] += sample.0[2] as u32;
        acc
    });
    Rgba([
        (sum[0] / 4) as u8,
        (sum[1] / 4) as u8,
        (sum[2] / 4) as u8,
        255,
    ])
}

fn render_tile_arbitrary(
    prec: u32,
    colorizer: &Colorizer,
    region: &Region,
    width: u32,
    height: u32,
    anti_aliasing: bool,
) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);

    let x0 = Float::with_val(prec, region.x0);
    let y0 = Float::with_val(prec, region.y0);
    let span_x = Float::with_val(prec, region.x1) - &x0;
    let span_y = Float::with_val(prec, region.y1) - &y0;
    let width_f = Float::with_val(prec, width);
    let height_f = Float::with_val(prec, height);

    let mut half_step = span_x.clone();
    half_step /= &width_f;
    half_step /= 2u32;

    for py in 0..height {
        let mut y = Float::with_val(prec, py);
        y /= &height_f;
        y *= &span_y;
        y += &y0;
        for px in 0..width {
            let mut x = Float::with_val(prec, px);
            x /= &width_f;
            x *= &span_x;
            x += &x0;
            let color = if anti_aliasing {
                anti_aliased_color_arbitrary(prec, colorizer, &x, &y, &half_step)
            } else {
                colorizer.color(mandelbrot_arbitrary(prec, &x, &y))
            };
            img.put_pixel(px, py, color);
        }
    }
    img
}

fn anti_aliased_color_arbitrary(
    prec: u32,
    colorizer: &Colorizer,
    x: &Float,
    y: &Float,
    half_step: &Float,
) -> Rgba<u8> {
    let samples = SUBPIXEL_OFFSETS.map(|(dx, dy)| {
        let mut sx = x.clone();
        if dx < 0.0 {
            sx -= half_step;
        } else {
            sx += half_step;
        }
        let mut sy = y.clone();
        if dy < 0.0 {
            sy -= half_step;
        } else {
            sy += half_step;
        }
        colorizer.color(mandelbrot_arbitrary(prec, &sx, &sy))
    });
    average_color(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::types::{FractalFamily, NewtonVariant, PointOutcome};

    fn base_request() -> ViewRequest {
        ViewRequest {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            family: FractalFamily::Mandelbrot,
            variant: NewtonVariant::Quartic,
            colorized: true,
            anti_aliasing: false,
            high_precision: false,
        }
    }

    #[test]
    fn rejects_odd_and_zero_dimensions() {
        let request = base_request();
        assert!(matches!(
            render_view(&request, 5, 4),
            Err(RenderError::OddDimensions { .. })
        ));
        assert!(matches!(
            render_view(&request, 4, 3),
            Err(RenderError::OddDimensions { .. })
        ));
        assert!(matches!(
            render_view(&request, 0, 4),
            Err(RenderError::OddDimensions { .. })
        ));
    }

    #[test]
    fn rejects_invalid_zoom_before_rendering() {
        let mut request = base_request();
        request.zoom = -1.0;
        assert!(matches!(
            render_view(&request, 4, 4),
            Err(RenderError::InvalidZoom(_))
        ));
    }

    #[test]
    fn reports_resolved_bounds() {
        let mut request = base_request();
        request.center_x = -0.5;
        request.center_y = 0.25;
        request.zoom = 2.0;
        let result = render_view(&request, 4, 4).unwrap();
        assert_eq!(result.xmin, -1.5);
        assert_eq!(result.xmax, 0.5);
        assert_eq!(result.ymin, -1.25);
        assert_eq!(result.ymax, 0.75);
        assert_eq!(result.center_x, -0.5);
        assert_eq!(result.center_y, -0.25);
    }

    #[test]
    fn composited_quadrants_match_a_single_region_render() {
        // Dyadic viewport so quadrant and full-frame pixel mappings agree
        // exactly, per the tiling property.
        for &(cx, cy, zoom) in &[(0.0, 0.0, 1.0), (-0.5, 0.25, 2.0), (0.125, -0.75, 4.0)] {
            let mut request = base_request();
            request.center_x = cx;
            request.center_y = cy;
            request.zoom = zoom;
            let composited = render_view(&request, 8, 8).unwrap();

            let frame = Frame::from_center_zoom(cx, cy, zoom).unwrap();
            let selector = KernelSelector::for_request(&request);
            let colorizer = Colorizer::new(request.colorized, selector.root_count());
            let whole = render_tile(&selector, &colorizer, &frame.full_region(), 8, 8, false);
            assert_eq!(
                composited.pixels.as_raw(),
                whole.as_raw(),
                "composite differs from single-region render at ({cx}, {cy}, {zoom})"
            );
        }
    }

    #[test]
    fn identical_requests_render_identical_bytes() {
        let mut request = base_request();
        request.center_x = -0.7435;
        request.center_y = 0.1314;
        request.zoom = 64.0;
        let first = render_view(&request, 8, 8).unwrap();
        let second = render_view(&request, 8, 8).unwrap();
        assert_eq!(first.pixels.as_raw(), second.pixels.as_raw());
    }

    #[test]
    fn golden_four_by_four_frame() {
        // center (0,0), zoom 1: pixel (px, py) maps to z = (px-2) + (py-2)i.
        // Outcomes and hues are reproducible by hand from the recurrence:
        // escape at step n colors HSV(15n, 50%, 100%).
        let request = base_request();
        let result = render_view(&request, 4, 4).unwrap();

        let e0 = Rgba([255u8, 127, 127, 255]); // hue 0
        let e1 = Rgba([255u8, 159, 127, 255]); // hue 15
        let e2 = Rgba([255u8, 191, 127, 255]); // hue 30
        let black = Rgba([0u8, 0, 0, 255]);

        let expected = [
            [e0, e0, e1, e0],
            [e0, e2, black, e1],
            [black, black, black, e2],
            [e0, e2, black, e1],
        ];
        for py in 0..4 {
            for px in 0..4 {
                assert_eq!(
                    *result.pixels.get_pixel(px, py),
                    expected[py as usize][px as usize],
                    "pixel ({px}, {py})"
                );
            }
        }
    }

    #[test]
    fn anti_aliased_pixel_is_the_truncating_average_of_its_samples() {
        let selector = KernelSelector::MandelbrotDouble;
        let colorizer = Colorizer::new(true, 1);
        let (x, y, step) = (-1.0, -1.0, 0.5);

        let expected = {
            let mut sums = [0u32; 3];
            for (dx, dy) in SUBPIXEL_OFFSETS {
                let z = Complex64::new(x + dx * step, y + dy * step);
                let sample = colorizer.color(iterate_point(&selector, z));
                sums[0] += sample.0[0] as u32;
                sums[1] += sample.0[1] as u32;
                sums[2] += sample.0[2] as u32;
            }
            Rgba([
                (sums[0] / 4) as u8,
                (sums[1] / 4) as u8,
                (sums[2] / 4) as u8,
                255,
            ])
        };
        assert_eq!(
            anti_aliased_color(&selector, &colorizer, x, y, step),
            expected
        );
    }

    #[test]
    fn anti_aliasing_keeps_interior_pixels_black() {
        let mut request = base_request();
        request.anti_aliasing = true;
        let smoothed = render_view(&request, 8, 8).unwrap();
        // Pixel (4, 4) is z = 0; all four subpixel samples at (±0.25, ±0.25)
        // lie inside the cardioid, so the average stays pure black.
        assert_eq!(*smoothed.pixels.get_pixel(4, 4), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn high_precision_agrees_with_double_at_shallow_zoom() {
        let request = base_request();
        let mut precise = base_request();
        precise.high_precision = true;
        let double = render_view(&request, 4, 4).unwrap();
        let arbitrary = render_view(&precise, 4, 4).unwrap();
        assert_eq!(double.pixels.as_raw(), arbitrary.pixels.as_raw());
    }

    #[test]
    fn newton_family_renders_basins() {
        let mut request = base_request();
        request.family = FractalFamily::Newton;
        request.variant = NewtonVariant::Quartic;
        let result = render_view(&request, 4, 4).unwrap();

        // Pixel (3, 2) sits at z = 1 exactly: root 0, step 0 -> hue 0 at
        // full value.
        let expected = {
            let colorizer = Colorizer::new(true, 4);
            colorizer.color(PointOutcome::Converged { root: 0, step: 0 })
        };
        assert_eq!(*result.pixels.get_pixel(3, 2), expected);
    }
}
