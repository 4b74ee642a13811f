use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use sandtable::render::background::default_background;
use sandtable::track::expand::CLEANING_TURNS;
use sandtable::track::source::{normalize_track_name, read_batch_file};
use sandtable::{
    BackgroundChannel, BatchOpts, BatchRunner, ColorMode, Fps, RenderOptions, Simulation,
    SimulationParameters, load_background,
};

#[derive(Parser, Debug)]
#[command(name = "sandtable", version, about)]
struct Cli {
    /// Log debug detail.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll the ball along one or more `.thr` tracks and write an image per track.
    Render(RenderArgs),
    /// Sweep the table with the cleaning spiral and write `clean_<d>x<d>.png`.
    Clean(CleanArgs),
    /// Print the effective simulation parameters as JSON.
    Params(TableArgs),
}

#[derive(Args, Debug)]
struct TableArgs {
    /// JSON parameter file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Table size in pixels; the grid is SIZE x SIZE.
    #[arg(long = "table-size", value_name = "PIXELS")]
    table_size: Option<usize>,

    /// Ball radius in pixels.
    #[arg(long = "ball-radius", value_name = "PIXELS")]
    ball_radius: Option<usize>,

    /// Starting sand depth when no background is used.
    #[arg(long)]
    depth: Option<f64>,

    /// Run a second, mirrored ball.
    #[arg(long = "two-balls")]
    two_balls: bool,

    /// Feed waypoints to the ball without subdividing them.
    #[arg(long = "no-expand")]
    no_expand: bool,
}

impl TableArgs {
    fn params(&self) -> anyhow::Result<SimulationParameters> {
        let mut p = match &self.config {
            Some(path) => SimulationParameters::from_json_file(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => SimulationParameters::default(),
        };
        if let Some(size) = self.table_size {
            p.table_diameter = size;
        }
        if let Some(radius) = self.ball_radius {
            p.ball_radius = radius;
        }
        if let Some(depth) = self.depth {
            p.initial_sand_depth = depth;
        }
        if self.two_balls {
            p.use_second_ball = true;
        }
        if self.no_expand {
            p.expand_sequences = false;
        }
        p.validate().context("invalid simulation parameters")?;
        Ok(p)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChannelChoice {
    Red,
    Average,
}

impl From<ChannelChoice> for BackgroundChannel {
    fn from(c: ChannelChoice) -> Self {
        match c {
            ChannelChoice::Red => BackgroundChannel::Red,
            ChannelChoice::Average => BackgroundChannel::AveragedRgb,
        }
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Image seeding the sand heights.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Pixel channel holding the height in the background image.
    #[arg(long = "background-channel", value_enum, default_value_t = ChannelChoice::Red)]
    background_channel: ChannelChoice,

    /// Output image for a single track, or output directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render plain gray instead of the sand tint.
    #[arg(long)]
    gray: bool,

    /// Waypoints between animation frames.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
    skip: u64,

    /// Write a PNG frame sequence per track under this directory.
    #[arg(long = "frames-dir")]
    frames_dir: Option<PathBuf>,

    /// Write an MP4 per track into this directory (requires `ffmpeg` on PATH).
    #[arg(long)]
    mp4: Option<PathBuf>,

    /// Video frame rate.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
}

impl OutputArgs {
    fn render_options(&self) -> anyhow::Result<RenderOptions> {
        Ok(RenderOptions {
            color: if self.gray {
                ColorMode::Greyscale
            } else {
                ColorMode::Tinted
            },
            image_skip_count: usize::try_from(self.skip).context("--skip is too large")?,
            fps: Fps::new(self.fps, 1)?,
        })
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Track files; a missing `.thr` extension is added.
    tracks: Vec<String>,

    /// File listing tracks, one or more per line, comma separated.
    #[arg(long = "batch-file")]
    batch_file: Option<PathBuf>,

    /// Play tracks back to front.
    #[arg(long)]
    reversed: bool,

    /// Run the cleaning spiral before the first track.
    #[arg(long = "clean-first")]
    clean_first: bool,

    #[command(flatten)]
    table: TableArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Half turns of the cleaning spiral.
    #[arg(long, default_value_t = CLEANING_TURNS)]
    turns: u32,

    #[command(flatten)]
    table: TableArgs,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Clean(args) => cmd_clean(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn build_simulation(
    params: SimulationParameters,
    output: &OutputArgs,
    default_backdrop: bool,
) -> anyhow::Result<Simulation> {
    let background = match &output.background {
        Some(path) => Some(path.clone()),
        None if default_backdrop => default_background(Path::new("."), params.table_diameter),
        None => None,
    };
    let Some(path) = background else {
        return Ok(Simulation::new(params)?);
    };

    tracing::info!(background = %path.display(), "seeding sand from image");
    let field = load_background(
        &path,
        params.table_diameter,
        output.background_channel.into(),
    )
    .with_context(|| format!("load background '{}'", path.display()))?;
    Ok(Simulation::with_field(params, field)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let params = args.table.params()?;

    let mut tracks: Vec<PathBuf> = args
        .tracks
        .iter()
        .map(|t| normalize_track_name(t))
        .collect();
    if let Some(list) = &args.batch_file {
        tracks.extend(
            read_batch_file(list)
                .with_context(|| format!("read batch file '{}'", list.display()))?,
        );
    }
    if tracks.is_empty() {
        anyhow::bail!("no tracks given; pass track files or --batch-file");
    }

    let sim = build_simulation(params, &args.output, true)?;
    let opts = BatchOpts {
        reversed: args.reversed,
        clean_first: args.clean_first,
        out: args.output.out.clone(),
        frames_dir: args.output.frames_dir.clone(),
        video_dir: args.output.mp4.clone(),
        render: args.output.render_options()?,
        ..BatchOpts::default()
    };
    let mut runner = BatchRunner::new(sim, opts)?;
    let report = runner.run(&tracks)?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(_) => eprintln!("wrote {}", outcome.output.display()),
            Err(e) => eprintln!("failed {}: {e}", outcome.label),
        }
    }
    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} tracks failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> anyhow::Result<()> {
    let params = args.table.params()?;
    let sim = build_simulation(params, &args.output, false)?;
    let opts = BatchOpts {
        cleaning_turns: args.turns,
        out: args.output.out.clone(),
        frames_dir: args.output.frames_dir.clone(),
        video_dir: args.output.mp4.clone(),
        render: args.output.render_options()?,
        ..BatchOpts::default()
    };
    let mut runner = BatchRunner::new(sim, opts)?;
    let path = runner.clean()?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_params(args: TableArgs) -> anyhow::Result<()> {
    let params = args.params()?;
    let json = serde_json::to_string_pretty(&params).context("serialize parameters")?;
    println!("{json}");
    Ok(())
}
