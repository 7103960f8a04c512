mod logger;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pack_async_runtime::{PackUpdate, spawn_worker};
use pack_engine::{
    ContainerSpec, Margin, PackRequest, PackingFactor, PackingOptions, RawImage,
    calculate_statistics, normalize_with_options,
};
use std::path::PathBuf;

use logger::StderrLogger;

#[derive(Parser)]
#[command(name = "packt", about = "Pack images onto printable pages", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a packing request from image files
    Normalize {
        /// Input image file(s)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output request JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Content width (page width net of margins)
        #[arg(long, default_value = "1190")]
        content_width: f64,

        /// Content height (page height net of margins)
        #[arg(long, default_value = "1684")]
        content_height: f64,

        /// Page margin (uniform on all sides)
        #[arg(long, default_value = "0")]
        margin: f64,

        /// Minimum gap between boxes
        #[arg(long, default_value = "5")]
        padding: f64,

        /// Initial box width as a fraction of the content width
        #[arg(long, default_value = "0.4")]
        fraction: f64,

        /// Packing preset stored in the request
        #[arg(long, default_value = "balanced", value_enum)]
        factor: FactorArg,
    },

    /// Pack a request into pages
    Pack {
        /// Request JSON file
        #[arg(short, long)]
        request: PathBuf,

        /// Output layout JSON file
        #[arg(short, long, required_unless_present = "stats_only")]
        output: Option<PathBuf>,

        /// Override the request's packing preset
        #[arg(long, value_enum)]
        factor: Option<FactorArg>,

        /// Never turn boxes 90°
        #[arg(long)]
        no_rotation: bool,

        /// Show statistics only, don't write the layout
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FactorArg {
    Draft,
    Balanced,
    Best,
}

impl From<FactorArg> for PackingFactor {
    fn from(arg: FactorArg) -> Self {
        match arg {
            FactorArg::Draft => Self::Draft,
            FactorArg::Balanced => Self::Balanced,
            FactorArg::Best => Self::Best,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(StderrLogger::level_for(cli.verbose)).init()?;

    match cli.command {
        Commands::Normalize {
            input,
            output,
            content_width,
            content_height,
            margin,
            padding,
            fraction,
            factor,
        } => {
            let container = ContainerSpec::new(content_width, content_height)
                .with_margin(Margin::uniform(margin))
                .with_padding(padding);
            let options = PackingOptions {
                packing_factor: factor.into(),
                initial_max_width_fraction: fraction,
                ..Default::default()
            };

            let raw = read_dimensions(input).await?;
            let boxes = normalize_with_options(&raw, &options, &container)?;
            let request = PackRequest::new(boxes, container, options);
            request.save(&output).await?;
            println!(
                "Normalized {} image(s) → {}",
                request.boxes.len(),
                output.display()
            );
        }

        Commands::Pack {
            request,
            output,
            factor,
            no_rotation,
            stats_only,
        } => {
            let mut request = PackRequest::load(&request)
                .await
                .with_context(|| format!("Failed to load request {}", request.display()))?;
            if let Some(factor) = factor {
                request.options.packing_factor = factor.into();
            }
            if no_rotation {
                request.options.allow_rotation = false;
            }
            let container = request.container;

            let layout = run_packing(request).await?;

            let stats = calculate_statistics(&layout, &container);
            println!("Packing Statistics:");
            println!("  Boxes: {}", stats.total_boxes);
            println!("  Placed: {}", stats.placed_boxes);
            println!("  Rotated: {}", stats.rotated_boxes);
            println!("  Unplaceable: {}", stats.unplaceable_boxes);
            println!("  Pages: {}", stats.pages);
            for (index, used) in stats.page_utilization.iter().enumerate() {
                println!("    Page {}: {:.1}% used", index + 1, used * 100.0);
            }
            println!("  Overall utilization: {:.1}%", stats.overall_utilization * 100.0);

            if stats_only {
                return Ok(());
            }

            if let Some(output) = output {
                layout.save(&output).await?;
                println!("Packed → {}", output.display());
            }
        }
    }

    Ok(())
}

/// Read pixel dimensions from image headers without decoding pixels
async fn read_dimensions(paths: Vec<PathBuf>) -> Result<Vec<RawImage>> {
    let raw = tokio::task::spawn_blocking(move || {
        paths
            .into_iter()
            .map(|path| {
                let (width, height) = image::image_dimensions(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let id = path.display().to_string();
                log::debug!("{}: {}x{} px", id, width, height);
                Ok(RawImage {
                    id: id.clone().into(),
                    pixel_width: width,
                    pixel_height: height,
                    asset: Some(id),
                })
            })
            .collect::<Result<Vec<_>>>()
    })
    .await??;

    Ok(raw)
}

/// Drive one run through the worker; Ctrl-C cancels it
async fn run_packing(request: PackRequest) -> Result<pack_engine::PackedLayout> {
    let mut handle = spawn_worker();
    let run = handle.start(request)?;
    let mut last_decile = 0;

    loop {
        tokio::select! {
            update = handle.next_update() => match update {
                Some(PackUpdate::Progress { fraction, .. }) => {
                    let decile = (fraction * 10.0).floor() as u32;
                    if decile > last_decile {
                        last_decile = decile;
                        log::info!("Packing {:.0}%", fraction * 100.0);
                    }
                }
                Some(PackUpdate::Complete { layout, .. }) => return Ok(layout),
                Some(PackUpdate::Failed { failure, .. }) => {
                    bail!("Packing failed ({}): {}", failure.error_kind, failure.message)
                }
                Some(PackUpdate::Cancelled { .. }) => bail!("Packing cancelled"),
                None => bail!("Packing worker stopped unexpectedly"),
            },
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted, cancelling");
                handle.cancel(run)?;
            }
        }
    }
}
