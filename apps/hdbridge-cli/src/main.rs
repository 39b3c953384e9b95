use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use hdbridge_command::{CommandFacade, CommandOutput};
use hdbridge_common::RendererId;
use hdbridge_image::{ImageBuffer, Metric, compare};
use hdbridge_registry::DelegateRegistry;
use hdbridge_render::{Camera, Scene, SoftwareHost, Viewport};
use hdbridge_snapshot::DEFAULT_TOLERANCE;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hdbridge", about = "Renderer bridge command line")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Extra directory of plugin manifests (repeatable)
    #[arg(long = "manifest-dir", global = true)]
    manifest_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Run one bridge command, e.g. `run -lr` or `run -r HdStormRendererPlugin -gn`
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        flags: Vec<String>,
    },
    /// Compare two PNG frames; exits non-zero when they differ too much
    Compare {
        actual: PathBuf,
        reference: PathBuf,
        /// Largest distance that still passes
        #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
        /// Require identical frames
        #[arg(long, conflicts_with = "tolerance")]
        exact: bool,
        #[arg(long, value_enum, default_value_t = MetricArg::MeanAbsolute)]
        metric: MetricArg,
    },
    /// Draw the flat-colored cube through the reference host
    Render {
        #[arg(short, long)]
        out: PathBuf,
        /// Render delegate to draw the editor with
        #[arg(short, long)]
        renderer: Option<String>,
        /// Cube color as `R,G,B` in [0, 1]
        #[arg(long, value_parser = parse_color, default_value = "0.75,0.5,0.25")]
        color: Vec3,
        #[arg(long, default_value_t = 400)]
        width: u32,
        #[arg(long, default_value_t = 400)]
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    MeanAbsolute,
    SumSquared,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::MeanAbsolute => Metric::MeanAbsolute,
            MetricArg::SumSquared => Metric::SumSquared,
        }
    }
}

fn parse_color(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [r, g, b] => Ok(Vec3::new(r, g, b)),
        _ => Err(format!("expected R,G,B, got {s:?}")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let registry = DelegateRegistry::discover(&cli.manifest_dirs)
        .context("failed to discover render delegates")?;

    match cli.command {
        Commands::Info => {
            println!("hdbridge v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", hdbridge_common::crate_info());
            println!("image: {}", hdbridge_image::crate_info());
            println!("snapshot: {}", hdbridge_snapshot::crate_info());
            println!("registry: {}", hdbridge_registry::crate_info());
            println!("viewport: {}", hdbridge_viewport::crate_info());
            println!("globals: {}", hdbridge_globals::crate_info());
            println!("command: {}", hdbridge_command::crate_info());
            println!("render: {}", hdbridge_render::crate_info());
            println!(
                "renderers: {}",
                registry
                    .renderer_ids()
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Commands::Run { flags } => {
            let mut bridge = CommandFacade::new(registry);
            match bridge.execute_args(&flags)? {
                CommandOutput::GlobalsCreated(created) => {
                    tracing::info!(created, "render globals ensured");
                    println!("{}", serde_json::to_string_pretty(bridge.globals())?);
                }
                output => print!("{output}"),
            }
        }
        Commands::Compare {
            actual,
            reference,
            tolerance,
            exact,
            metric,
        } => {
            let load = |path: &PathBuf| {
                ImageBuffer::load(path).with_context(|| format!("failed to load {}", path.display()))
            };
            let (mut a, mut r) = (load(&actual)?, load(&reference)?);
            if a.format() != r.format() {
                a = a.to_rgba8();
                r = r.to_rgba8();
            }
            let threshold = if exact { 0.0 } else { tolerance };
            let result = compare(&a, &r, threshold, metric.into())?;
            println!(
                "distance={} threshold={} identical={}",
                result.distance, result.threshold, result.identical
            );
            if !result.passed() {
                bail!(
                    "{} differs from {} by {} (threshold {})",
                    actual.display(),
                    reference.display(),
                    result.distance,
                    result.threshold
                );
            }
        }
        Commands::Render {
            out,
            renderer,
            color,
            width,
            height,
        } => {
            let mut bridge = CommandFacade::new(registry);
            let mut host = SoftwareHost::new(
                Scene::cube(color),
                Camera::default(),
                Viewport {
                    width,
                    height,
                    ..Viewport::default()
                },
            );
            let editor = host.active_editor().clone();
            if let Some(id) = renderer {
                let name = bridge.overrides().config().override_name(&RendererId::new(id));
                host.set_renderer_override_name(&editor, name)?;
            }
            let frame = host
                .refresh(bridge.overrides_mut())?
                .into_iter()
                .next()
                .context("host has no editors")?;
            frame.save_png(&out)?;
            tracing::info!(
                path = %out.display(),
                digest = %frame.digest(),
                renderer = host.editor(&editor)?.drawn_by.as_ref().map(RendererId::as_str).unwrap_or("default"),
                "frame written"
            );
        }
    }

    Ok(())
}
