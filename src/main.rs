use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;

use reading_mask::headless::{FrameSpec, HeadlessHost};
use reading_mask::logging;
use reading_mask::mask::{Point, ReadingMask, Size};
use reading_mask::settings::MaskSettings;

/// Renders the reading mask for a simulated page into a PNG.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Mask settings file; defaults are used when it is missing
    #[arg(short, long, value_name = "FILE_PATH", default_value = "mask_settings.json")]
    settings: String,

    /// Page viewport as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, default_value = "1280x720")]
    viewport: Size,

    /// Embedded frame viewport as WIDTHxHEIGHT, may be repeated
    #[arg(long, value_parser = parse_size)]
    frame: Vec<Size>,

    /// Pointer position as X,Y, replayed in order
    #[arg(short, long, value_parser = parse_point)]
    pointer: Vec<Point>,

    /// Pointer position as X,Y inside the first frame, replayed after the page path
    #[arg(long, value_parser = parse_point)]
    frame_pointer: Vec<Point>,

    /// Scroll offset as X,Y applied before rendering
    #[arg(long, value_parser = parse_point)]
    scroll: Option<Point>,

    /// Output image
    #[arg(short, long, value_name = "FILE_PATH", default_value = "reading_mask.png")]
    output: PathBuf,

    /// Write logs to a file instead of stderr
    #[arg(short, long, value_name = "FILE_PATH")]
    log_to: Option<PathBuf>,

    /// Show the mask even when the settings file leaves it disabled
    #[arg(long)]
    show: bool,

    #[arg(long)]
    debug: bool,
}

fn parse_pair(s: &str, sep: char) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(sep)
        .ok_or_else(|| format!("expected two numbers separated by '{sep}'"))?;
    let a = a.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

fn parse_size(s: &str) -> Result<Size, String> {
    parse_pair(s, 'x').map(|(w, h)| Size::new(w, h))
}

fn parse_point(s: &str) -> Result<Point, String> {
    parse_pair(s, ',').map(|(x, y)| Point::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = MaskSettings::load(&args.settings)
        .with_context(|| format!("reading settings from {}", args.settings))?;
    logging::init(args.debug || settings.debug_logging, args.log_to.clone());

    let host = Rc::new(HeadlessHost::new(args.viewport));
    let frames: Vec<_> = args
        .frame
        .iter()
        .map(|size| host.add_frame(FrameSpec::new(*size)))
        .collect();

    let mask = ReadingMask::new(host.clone());
    settings.apply(&mask);
    if args.show && !mask.is_active() {
        mask.initialize();
    }
    if !mask.is_active() {
        if settings.enabled || args.show {
            anyhow::bail!("reading mask failed to initialise");
        }
        tracing::info!("reading mask disabled in settings; rendering an empty overlay");
        let image = image::RgbaImage::new(
            args.viewport.width.max(0.0).round() as u32,
            args.viewport.height.max(0.0).round() as u32,
        );
        image
            .save(&args.output)
            .with_context(|| format!("writing {}", args.output.display()))?;
        return Ok(());
    }
    tracing::info!(frames = mask.tracked_frame_count(), "mask ready");

    for point in &args.pointer {
        host.move_pointer(*point);
    }
    if let Some(window) = frames.first() {
        for point in &args.frame_pointer {
            host.move_pointer_in_frame(*window, *point);
        }
    }
    if let Some(offset) = args.scroll {
        host.scroll_to(offset);
        host.run_animation_frames();
    }

    let surface = host.surface().context("mask has no drawing surface")?;
    let (width, height) = (surface.width(), surface.height());
    let image = image::RgbaImage::from_raw(width, height, surface.into_pixels())
        .context("surface buffer does not match its dimensions")?;
    image
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), width, height, "mask rendered");

    mask.remove_canvas();
    Ok(())
}
