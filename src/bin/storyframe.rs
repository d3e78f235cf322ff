use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose an image and write it as a JPEG.
    Render(RenderArgs),
    /// Print the default render parameters as JSON.
    Params,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image (any format the `image` crate decodes). Omit for a
    /// background-only story frame.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output JPEG path. An existing directory gets a generated file name.
    #[arg(long)]
    out: PathBuf,

    /// Render parameters JSON; flags below override its fields.
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    #[arg(long, value_enum)]
    layout: Option<LayoutChoice>,

    /// Image scale, clamped to 0.1..=3.0.
    #[arg(long)]
    scale: Option<f64>,

    /// Background color, `#rgb` or `#rrggbb`.
    #[arg(long)]
    bg: Option<String>,

    /// Film stock name (`portra`, `bw_high`, ...). Unknown names mean no filter.
    #[arg(long)]
    filter: Option<String>,

    #[arg(long)]
    grain: bool,

    #[arg(long)]
    leak: bool,

    #[arg(long)]
    prism: bool,

    /// Light-leak seed, strictly between 0 and 1.
    #[arg(long, value_parser = parse_seed)]
    leak_seed: Option<f64>,

    /// Prism seed, strictly between 0 and 1.
    #[arg(long, value_parser = parse_seed)]
    prism_seed: Option<f64>,

    /// JPEG quality, 1..=100.
    #[arg(long, default_value_t = storyframe::JPEG_QUALITY)]
    quality: u8,

    /// File naming used when `--out` is a directory.
    #[arg(long, value_enum, default_value_t = NamingChoice::InstaStory)]
    naming: NamingChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Story,
    Photo,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutChoice {
    Natural,
    Contain,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NamingChoice {
    InstaStory,
    StoryCanvas,
}

/// Seeds 0 and 1 (and anything wrapping onto them) freeze the generator at
/// state 0, so the CLI only takes values strictly inside the unit interval.
fn parse_seed(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("invalid seed '{s}': {e}"))?;
    if v > 0.0 && v < 1.0 {
        Ok(v)
    } else {
        Err(format!("seed must be in (0, 1), got {v}"))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Params => cmd_params(),
    }
}

fn cmd_params() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&storyframe::RenderParams::default())
        .context("serialize default params")?;
    println!("{json}");
    Ok(())
}

fn read_params_json(path: &Path) -> anyhow::Result<storyframe::RenderParams> {
    let f = File::open(path).with_context(|| format!("open params '{}'", path.display()))?;
    let params = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse params JSON '{}'", path.display()))?;
    Ok(params)
}

fn resolve_params(args: &RenderArgs) -> anyhow::Result<storyframe::RenderParams> {
    let mut params = match &args.params {
        Some(path) => read_params_json(path)?,
        None => storyframe::RenderParams::default(),
    };

    if let Some(mode) = args.mode {
        params.mode = match mode {
            ModeChoice::Story => storyframe::RenderMode::Story,
            ModeChoice::Photo => storyframe::RenderMode::Photo,
        };
    }
    if let Some(layout) = args.layout {
        params.layout = match layout {
            LayoutChoice::Natural => storyframe::LayoutStrategy::NaturalScale,
            LayoutChoice::Contain => storyframe::LayoutStrategy::ContainFitScale,
        };
    }
    if let Some(scale) = args.scale {
        params.scale = scale;
    }
    if let Some(bg) = &args.bg {
        params.background = bg
            .parse::<storyframe::Rgb8>()
            .with_context(|| format!("parse --bg '{bg}'"))?;
    }
    if let Some(name) = &args.filter {
        params.filter = storyframe::FilmFilter::from_name(name);
    }
    params.grain |= args.grain;
    params.leak |= args.leak;
    params.prism |= args.prism;
    if let Some(seed) = args.leak_seed {
        params.leak_seed = seed;
    }
    if let Some(seed) = args.prism_seed {
        params.prism_seed = seed;
    }
    for (name, seed) in [("leak_seed", params.leak_seed), ("prism_seed", params.prism_seed)] {
        if !(seed > 0.0 && seed < 1.0) {
            anyhow::bail!("{name} must be in (0, 1), got {seed}");
        }
    }
    Ok(params)
}

fn read_source(path: &Path) -> anyhow::Result<storyframe::SourceImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let src = storyframe::decode_image(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(src)
}

fn output_path(args: &RenderArgs) -> PathBuf {
    if !args.out.is_dir() {
        return args.out.clone();
    }
    let naming = match args.naming {
        NamingChoice::InstaStory => storyframe::ExportNaming::InstaStory,
        NamingChoice::StoryCanvas => storyframe::ExportNaming::StoryCanvas,
    };
    args.out
        .join(storyframe::export_file_name(naming, chrono::Utc::now()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let params = resolve_params(&args)?;
    let source = args.in_path.as_deref().map(read_source).transpose()?;

    let compositor = storyframe::Compositor::new();
    let output = compositor.render(source.as_ref(), &params)?;
    let Some(frame) = output.frame() else {
        anyhow::bail!("nothing to render: photo mode needs --in");
    };

    let bytes = storyframe::encode_jpeg(frame, args.quality)?;

    let out = output_path(&args);
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &bytes).with_context(|| format!("write jpeg '{}'", out.display()))?;

    tracing::info!(
        path = %out.display(),
        width = frame.width,
        height = frame.height,
        bytes = bytes.len(),
        "wrote"
    );
    eprintln!("wrote {}", out.display());
    Ok(())
}
