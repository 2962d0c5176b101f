use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use fractalheaven::io::{save_image, write_jpeg};
use fractalheaven::{render_view, FractalFamily, NewtonVariant, ViewRequest};

/// Renders one fractal frame from the command line.
///
/// Example:
///   fractalheaven --family mandelbrot --zoom 1 --colorized --output frame.png
///
/// Without --output the encoded JPEG is streamed to stdout, mirroring what
/// a transport layer would put on the wire.
#[derive(Parser, Debug)]
#[command(
    name = "fractalheaven",
    about = "Escape-time fractal renderer (Mandelbrot, Newton) with deep-zoom support",
    version
)]
struct Cli {
    /// Horizontal center of the viewport
    #[arg(long, default_value_t = 0.0)]
    center_x: f64,

    /// Vertical center of the viewport (image coordinates, top = row 0)
    #[arg(long, default_value_t = 0.0)]
    center_y: f64,

    /// Zoom factor (> 0); the viewport half-width is 2/zoom
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Fractal family: mandelbrot or newton
    #[arg(long, default_value = "mandelbrot")]
    family: String,

    /// Newton function (z^4-1, z^3-1, sin(z), ln(z), z^3-2z+2, cosh(z));
    /// ignored for mandelbrot
    #[arg(long)]
    function: Option<String>,

    /// Hue-based coloring instead of monochrome intensity
    #[arg(long)]
    colorized: bool,

    /// 4-point box supersampling
    #[arg(long)]
    anti_aliasing: bool,

    /// Arbitrary-precision Mandelbrot arithmetic for deep zooms
    #[arg(long)]
    high_precision: bool,

    /// Output width in pixels (must be even)
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Output height in pixels (must be even)
    #[arg(long, default_value_t = 1024)]
    height: u32,

    /// Output file (format by extension); omit to stream JPEG to stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let family = match FractalFamily::from_name(&cli.family) {
        Ok(family) => family,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let variant = cli
        .function
        .as_deref()
        .map(NewtonVariant::from_name)
        .unwrap_or_default();

    let request = ViewRequest {
        center_x: cli.center_x,
        center_y: cli.center_y,
        zoom: cli.zoom,
        family,
        variant,
        colorized: cli.colorized,
        anti_aliasing: cli.anti_aliasing,
        high_precision: cli.high_precision,
    };

    let result = match render_view(&request, cli.width, cli.height) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "resolved bounds ({}, {}), ({}, {})",
        result.xmin,
        result.ymin,
        result.xmax,
        result.ymax
    );

    match &cli.output {
        Some(path) => {
            if let Err(e) = save_image(&result, path) {
                eprintln!("failed to write {}: {e}", path.display());
                std::process::exit(1);
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            if let Err(e) = write_jpeg(&result, &mut handle) {
                eprintln!("failed to encode frame: {e}");
                std::process::exit(1);
            }
            if let Err(e) = handle.flush() {
                eprintln!("failed to flush stdout: {e}");
                std::process::exit(1);
            }
        }
    }
}
