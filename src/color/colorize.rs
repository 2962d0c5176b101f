use image::Rgba;

use crate::color::color_models::{hsb_to_rgb, Hsb};
use crate::fractal::iterations::MAX_ITERATIONS;
use crate::fractal::types::PointOutcome;

/// Hue degrees per escape step.
const HUE_CONTRAST: f64 = 15.0;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Maps iteration outcomes to RGBA, built once per request.
///
/// In colorized mode escaped points cycle through hues by step and Newton
/// basins get one hue per registered root, shaded brighter the faster the
/// orbit converged. Monochrome mode keeps only the step count as a gray
/// level. Bounded points are black either way.
#[derive(Clone, Copy, Debug)]
pub struct Colorizer {
    colorized: bool,
    root_count: u8,
}

impl Colorizer {
    pub fn new(colorized: bool, root_count: u8) -> Self {
        Self {
            colorized,
            root_count: root_count.max(1),
        }
    }

    pub fn color(&self, outcome: PointOutcome) -> Rgba<u8> {
        if !self.colorized {
            return self.monochrome(outcome);
        }
        match outcome {
            PointOutcome::Bounded => BLACK,
            PointOutcome::Escaped(step) => {
                let hue = (HUE_CONTRAST * step as f64) % 360.0;
                let (r, g, b) = hsb_to_rgb(Hsb { h: hue, s: 0.5, b: 1.0 });
                Rgba([r, g, b, 255])
            }
            PointOutcome::Converged { root, step } => {
                let hue = root as f64 * (360.0 / self.root_count as f64);
                let value = 1.0 - step as f64 / MAX_ITERATIONS as f64;
                let (r, g, b) = hsb_to_rgb(Hsb { h: hue, s: 0.5, b: value });
                Rgba([r, g, b, 255])
            }
        }
    }

    fn monochrome(&self, outcome: PointOutcome) -> Rgba<u8> {
        let step = match outcome {
            PointOutcome::Bounded => return BLACK,
            PointOutcome::Escaped(step) => step,
            PointOutcome::Converged { step, .. } => step,
        };
        let gray = 255 - (step as u32 * 255 / MAX_ITERATIONS as u32) as u8;
        Rgba([gray, gray, gray, 255])
    }
}
