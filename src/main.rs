use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};

use page_capture::capture::grabber::ScreenGrabber;
use page_capture::capture::CaptureLoop;
use page_capture::config::{AppConfig, DEFAULT_CONFIG_PATH};
use page_capture::dpi::ensure_dpi_awareness;
use page_capture::error::{CaptureError, PickError};
use page_capture::geometry::{validate, Region, VirtualScreen};
use page_capture::input::{spawn_pointer_listener, SystemKeyboard};
use page_capture::picker::{pick_region, PickOutcome};
use page_capture::screen::{query_virtual_screen, DisplayGeometryProvider, SystemDisplays};

#[derive(Parser, Debug)]
#[command(
    name = "page-capture",
    version,
    about = "Pick a screen region with two clicks, then capture it page by page"
)]
struct Cli {
    /// Config file (.json or .toml)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Click two corners to print the capture region
    Pick {
        /// Store the picked region in the config file
        #[arg(long)]
        save: bool,
    },
    /// Press the page key and capture the region, once per page
    Capture(CaptureArgs),
    /// List displays and the combined virtual screen
    Screens,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Region as LEFT,TOP,WIDTH,HEIGHT in virtual-screen pixels
    #[arg(long, allow_hyphen_values = true)]
    region: Option<Region>,
    /// Number of pages to capture
    #[arg(long)]
    pages: Option<u32>,
    /// Key sent before each capture (pagedown, right, space, ...)
    #[arg(long)]
    key: Option<String>,
    /// Milliseconds to wait after the key press
    #[arg(long)]
    wait_ms: Option<u64>,
    /// Milliseconds to wait before the first page
    #[arg(long)]
    start_delay_ms: Option<u64>,
    /// Output directory; images go to <OUTPUT>/images
    #[arg(long)]
    output: Option<PathBuf>,
}

impl CaptureArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(region) = self.region {
            config.region = Some(region);
        }
        if let Some(pages) = self.pages {
            config.pages = pages;
        }
        if let Some(key) = self.key {
            config.page_key = key;
        }
        if let Some(wait_ms) = self.wait_ms {
            config.wait_ms = wait_ms;
        }
        if let Some(start_delay_ms) = self.start_delay_ms {
            config.start_delay_ms = start_delay_ms;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Pick { save } => run_pick(&cli.config, save),
        Commands::Capture(args) => run_capture(&cli.config, args),
        Commands::Screens => run_screens(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_pick(config_path: &Path, save: bool) -> Result<()> {
    ensure_dpi_awareness();

    println!("[pick] region selection");
    println!("Left-click two points: first top-left, then bottom-right (either order works).");

    let screen = query_virtual_screen(&SystemDisplays).map_err(PickError::DisplayQuery)?;
    println!("virtual_screen={}", screen);

    let mut listener = spawn_pointer_listener()?;
    let outcome = pick_region(listener.by_ref(), |point| println!("{}", point));
    if let Some(e) = listener.take_failure() {
        return Err(e.into());
    }

    let region = match outcome {
        PickOutcome::Picked { region, .. } => region,
        PickOutcome::Incomplete { points } => {
            log::debug!("pick ended with {} point(s)", points.len());
            println!("Could not capture two points. Please run again.");
            return Ok(());
        }
    };

    println!("\n--- RESULT ---");
    println!("REGION = {}", region);

    if let Err(e) = validate(region, screen) {
        log::warn!("{}", e);
        println!("This region cannot be captured as-is; pick again.");
        return Ok(());
    }

    if save {
        let mut config = AppConfig::load(config_path)?;
        config.region = Some(region);
        config.save(config_path)?;
        println!("Saved to {}.", config_path.display());
    } else {
        println!(
            "Pass it to capture with --region {},{},{},{} or rerun with --save.",
            region.left, region.top, region.width, region.height
        );
    }
    Ok(())
}

fn run_capture(config_path: &Path, args: CaptureArgs) -> Result<()> {
    ensure_dpi_awareness();

    let mut config = AppConfig::load(config_path)?;
    args.apply(&mut config);
    let session = config.capture_session()?;

    let screen = query_virtual_screen(&SystemDisplays).map_err(CaptureError::DisplayQuery)?;
    log::info!("virtual screen {}", screen);

    let mut capture = CaptureLoop::new(ScreenGrabber, SystemKeyboard);
    match capture.run(&session, screen) {
        Ok(report) => {
            println!(
                "Done: {} page(s) in {}",
                report.pages.len(),
                session.images_dir().display()
            );
            Ok(())
        }
        Err(e) => {
            if let Some(last) = e.last_completed() {
                log::warn!("pages 1..={} were written before the failure", last);
            }
            Err(e).context("capture stopped")
        }
    }
}

fn run_screens() -> Result<()> {
    ensure_dpi_awareness();

    let displays = SystemDisplays.displays()?;
    for (i, d) in displays.iter().enumerate() {
        println!(
            "#{} {} scale={}{}",
            i,
            d.as_region(),
            d.scale_factor,
            if d.is_primary { " primary" } else { "" }
        );
    }
    let screen = VirtualScreen::bounding(displays.iter().copied())
        .ok_or_else(|| anyhow!("no displays found"))?;
    println!("virtual_screen={}", screen);
    Ok(())
}
