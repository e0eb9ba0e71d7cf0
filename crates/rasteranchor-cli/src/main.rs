//! rasteranchor CLI: calibrate rasterized 3D plots for vector overlays.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use rasteranchor::{
    corner_classes, select_box_anchors, BoundingBox, CalibrationConfig, CalibrationExporter,
    CalibrationTarget, Calibrator, PgfplotsWriter, PrimitiveId, ResolvedRange, SoftScene,
    ViewTransform,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "rasteranchor")]
#[command(about = "Calibrate a rasterized 3D plot against its vector-graphics axes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a calibration pass on a scene and write raster, markup and JSON.
    Calibrate(CliCalibrateArgs),

    /// Show projected box-corner classes and the selected corners for a view.
    Corners {
        /// View azimuth in degrees.
        #[arg(long, default_value = "-37.5", allow_hyphen_values = true)]
        azimuth: f64,

        /// View elevation in degrees.
        #[arg(long, default_value = "30", allow_hyphen_values = true)]
        elevation: f64,

        /// Coincidence tolerance in unit-cube units.
        #[arg(long, default_value = "1e-9")]
        tolerance: f64,
    },
}

#[derive(Debug, Clone, Args)]
struct CliCalibrateArgs {
    /// Path to the scene description (JSON).
    #[arg(long)]
    scene: PathBuf,

    /// Directory receiving `<name>.png`, `<name>.tex` and `<name>.json`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Base name of the output files.
    #[arg(long, default_value = "plot")]
    name: String,

    /// Calibration config (JSON). Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen resolution in pixels per inch.
    #[arg(long)]
    screen_ppi: Option<f64>,

    /// Resolution of the exported raster.
    #[arg(long)]
    export_dpi: Option<f64>,

    /// Output unit in inches (default: one TeX point).
    #[arg(long)]
    unit_ratio: Option<f64>,

    /// Explicit box-corner indices, e.g. `0,3,5,6`.
    #[arg(long, value_delimiter = ',')]
    anchors: Option<Vec<usize>>,

    /// Calibrate against surface grid points; optionally name the surface id.
    #[arg(long, num_args = 0..=1)]
    surface: Option<Option<usize>>,

    /// Draw detected centroids on the exported raster.
    #[arg(long)]
    debug: bool,

    /// Decimal places in the markup (default: shortest exact form).
    #[arg(long)]
    precision: Option<usize>,
}

impl CliCalibrateArgs {
    fn to_config(&self) -> CliResult<CalibrationConfig> {
        let mut config = match &self.config {
            Some(path) => CalibrationConfig::from_json_file(path)?,
            None => CalibrationConfig::default(),
        };
        if let Some(v) = self.screen_ppi {
            config.screen_ppi = v;
        }
        if let Some(v) = self.export_dpi {
            config.export_dpi = v;
        }
        if let Some(v) = self.unit_ratio {
            config.unit_ratio = v;
        }
        if let Some(corners) = &self.anchors {
            config.anchor_override = Some(corners.clone());
        }
        if let Some(id) = self.surface {
            config.target = CalibrationTarget::Surface {
                id: id.map(PrimitiveId),
            };
        }
        config.debug |= self.debug;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Corners {
            azimuth,
            elevation,
            tolerance,
        } => run_corners(azimuth, elevation, tolerance),
    }
}

// ── calibrate ──────────────────────────────────────────────────────────

fn run_calibrate(args: &CliCalibrateArgs) -> CliResult<()> {
    tracing::info!("Loading scene: {}", args.scene.display());
    let scene = SoftScene::from_json_file(&args.scene).map_err(|e| -> CliError {
        format!("Failed to load scene {}: {}", args.scene.display(), e).into()
    })?;

    let config = args.to_config()?;
    let calibrator = Calibrator::with_config(config);
    let (result, raster) = calibrator.calibrate_with_raster(&scene)?;

    std::fs::create_dir_all(&args.out_dir)?;
    let png_name = format!("{}.png", args.name);
    let png_path = args.out_dir.join(&png_name);
    raster.save(&png_path)?;

    let writer = PgfplotsWriter {
        precision: args.precision,
        ..PgfplotsWriter::default()
    };
    let tex_path = args.out_dir.join(format!("{}.tex", args.name));
    writer.write_file(&result, &png_name, &tex_path)?;

    let json_path = args.out_dir.join(format!("{}.json", args.name));
    std::fs::write(&json_path, serde_json::to_string_pretty(&result)?)?;

    tracing::info!(
        "{} pairs ({:?}, ordering {:?}); raster {}x{}",
        result.pairs.len(),
        result.mode,
        result.ordering,
        raster.width(),
        raster.height()
    );
    tracing::info!("Wrote {}", png_path.display());
    tracing::info!("Wrote {}", tex_path.display());
    tracing::info!("Wrote {}", json_path.display());
    Ok(())
}

// ── corners ────────────────────────────────────────────────────────────

fn run_corners(azimuth: f64, elevation: f64, tolerance: f64) -> CliResult<()> {
    let view = ViewTransform::new(azimuth, elevation);
    let unit = ResolvedRange::new(0.0, 1.0);
    let bbox = BoundingBox::new(unit, unit, unit);
    let classes = corner_classes(&bbox, &view, tolerance);

    println!("view: azimuth {azimuth}°, elevation {elevation}°");
    println!("distinct projected corners: {}", classes.n_classes());
    for (class, members) in classes.members().iter().enumerate() {
        let uv = classes.position(members[0]);
        println!(
            "  class {class}: corners {members:?} at ({:+.4}, {:+.4})",
            uv.x, uv.y
        );
    }

    match select_box_anchors(&bbox, &view, None, tolerance) {
        Ok(sel) => println!("selected corners: {:?}", sel.corners),
        Err(e) => println!("no selection: {e}"),
    }
    Ok(())
}
