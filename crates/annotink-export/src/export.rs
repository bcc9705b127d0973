//! Snapshot-to-PNG export.

use annotink_core::scene::Scene;
use annotink_core::selection::Selection;
use annotink_core::shapes::{ApproxTextMeasure, TextMeasure};
use annotink_core::snapshot;
use annotink_render::{Font, RenderContext, Renderer, SkiaRenderer};
use anyhow::{Context, bail};
use std::path::PathBuf;

/// Surface size used for an empty scene when no size is given.
pub const DEFAULT_SIZE: (u32, u32) = (800, 600);
/// Space left right of and below the scene's extent.
pub const MARGIN: f64 = 20.0;

const USAGE: &str =
    "usage: annotink-export <snapshot.json> <out.png> [--width W] [--height H] [--font path.ttf]";

/// Command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub snapshot: PathBuf,
    pub output: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font: Option<PathBuf>,
}

impl ExportOptions {
    /// Parse arguments (without the program name).
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut font = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" | "--height" | "--font" => {
                    let Some(value) = args.next() else {
                        bail!("{} needs a value\n{}", arg, USAGE);
                    };
                    match arg.as_str() {
                        "--width" => width = Some(parse_dimension(&arg, &value)?),
                        "--height" => height = Some(parse_dimension(&arg, &value)?),
                        _ => font = Some(PathBuf::from(value)),
                    }
                }
                "-h" | "--help" => bail!("{}", USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [snapshot, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected exactly two paths\n{}", USAGE))?;
        Ok(Self {
            snapshot,
            output,
            width,
            height,
            font,
        })
    }
}

fn parse_dimension(flag: &str, value: &str) -> anyhow::Result<u32> {
    let n: u32 = value
        .parse()
        .with_context(|| format!("{} expects a positive integer, got '{}'", flag, value))?;
    if n == 0 {
        bail!("{} must be greater than zero", flag);
    }
    Ok(n)
}

/// Smallest surface holding every element, plus a margin.
pub fn scene_extent(scene: &Scene, measure: &dyn TextMeasure) -> (u32, u32) {
    if scene.is_empty() {
        return DEFAULT_SIZE;
    }
    let (max_x, max_y) = scene
        .elements()
        .iter()
        .map(|e| e.bounds(measure))
        .fold((0.0f64, 0.0f64), |(x, y), b| (x.max(b.x1), y.max(b.y1)));
    let side = |v: f64| ((v + MARGIN).ceil().max(1.0)) as u32;
    (side(max_x), side(max_y))
}

/// Load the snapshot, render it and write the PNG.
pub fn run(options: &ExportOptions) -> anyhow::Result<()> {
    let blob = std::fs::read_to_string(&options.snapshot)
        .with_context(|| format!("reading {}", options.snapshot.display()))?;
    let scene = snapshot::deserialize(&blob)
        .with_context(|| format!("parsing {}", options.snapshot.display()))?
        .into_scene();
    log::info!("Loaded '{}' with {} elements", scene.name, scene.len());

    let font = options
        .font
        .as_ref()
        .map(Font::load)
        .transpose()
        .context("loading font")?;

    let (auto_w, auto_h) = match &font {
        Some(font) => scene_extent(&scene, &font.measure()),
        None => scene_extent(&scene, &ApproxTextMeasure),
    };
    let width = options.width.unwrap_or(auto_w);
    let height = options.height.unwrap_or(auto_h);

    let mut renderer = SkiaRenderer::new(width, height)?;
    if let Some(font) = font {
        renderer = renderer.with_font(font);
    }
    let selection = Selection::None;
    renderer.render(&RenderContext::new(&scene, &selection))?;

    let png = renderer.export_png()?;
    std::fs::write(&options.output, png)
        .with_context(|| format!("writing {}", options.output.display()))?;
    log::info!("Wrote {}x{} PNG to {}", width, height, options.output.display());
    Ok(())
}
