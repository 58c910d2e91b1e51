use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tilegrid::{
    Canvas, CpuBackend, EventScript, FrameRGBA, GridConfig, ImageSource, TileGrid,
};

#[derive(Parser, Debug)]
#[command(name = "tilegrid", version)]
struct Cli {
    /// Log at DEBUG level instead of INFO.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Play an event script and write every drawn frame as a numbered PNG.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Background image path or file:// URI.
    #[arg(long)]
    image: String,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Grid configuration JSON. Defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Event script to replay before capturing.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Clock time of the captured frame, in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Event script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<GridConfig> {
    let Some(path) = path else {
        return Ok(GridConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    GridConfig::from_json_str(&json).with_context(|| format!("parse config '{}'", path.display()))
}

fn read_script(path: &Path) -> anyhow::Result<EventScript> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read script '{}'", path.display()))?;
    EventScript::from_json_str(&json).with_context(|| format!("parse script '{}'", path.display()))
}

fn build_grid(args: &SurfaceArgs) -> anyhow::Result<TileGrid> {
    let config = read_config(args.config.as_deref())?;
    let source = ImageSource::parse(&args.image)?;
    let canvas = Canvas::new(args.width, args.height);
    TileGrid::load(config, &canvas, &source)
        .with_context(|| format!("load background image '{}'", args.image))
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut grid = build_grid(&args.surface)?;
    let mut backend = CpuBackend::new();

    if let Some(path) = &args.script {
        let script = read_script(path)?;
        script.dispatch_until(&mut grid, 0, args.at)?;
    }
    let frame = grid.frame_at(args.at.max(grid.now()), &mut backend)?;
    if frame.width == 0 || frame.height == 0 {
        anyhow::bail!("surface has no area; nothing to write");
    }

    write_png(&args.out, &frame)?;
    tracing::info!(out = %args.out.display(), at = grid.now(), "wrote frame");
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut grid = build_grid(&args.surface)?;
    let script = read_script(&args.script)?;
    let mut backend = CpuBackend::new();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let out_dir = args.out_dir.clone();
    let drawn = script.play(&mut grid, &mut backend, |index, frame| {
        if frame.width == 0 || frame.height == 0 {
            return Ok(());
        }
        let path = out_dir.join(format!("frame_{:05}.png", index.0));
        write_png(&path, frame).map_err(tilegrid::TileGridError::from)
    })?;

    tracing::info!(drawn, out_dir = %args.out_dir.display(), "playback finished");
    Ok(())
}
