use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use particle_field::{headless, window, FieldConfig, Rgb};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of particles
    #[arg(long)]
    count: Option<usize>,

    /// Link distance in pixels
    #[arg(long)]
    link_dist: Option<f32>,

    /// Pointer influence radius in pixels
    #[arg(long)]
    mouse_radius: Option<f32>,

    /// Initial velocity scale
    #[arg(long)]
    speed: Option<f32>,

    /// Particle color as r,g,b
    #[arg(long)]
    color: Option<Rgb>,

    /// Seed for reproducible particle placement
    #[arg(long)]
    seed: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this many frames without a window and print statistics
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Surface width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

impl Cli {
    fn field_config(&self) -> Result<FieldConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => FieldConfig::from_json_file(path)?,
            None => FieldConfig::new(),
        };

        if let Some(count) = self.count {
            config = config.with_count(count);
        }
        if let Some(link_dist) = self.link_dist {
            config = config.with_link_dist(link_dist);
        }
        if let Some(mouse_radius) = self.mouse_radius {
            config = config.with_mouse_radius(mouse_radius);
        }
        if let Some(speed) = self.speed {
            config = config.with_speed(speed);
        }
        if let Some(color) = self.color {
            config = config.with_color(color);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.field_config()?;
    let size = (cli.width, cli.height);
    log::debug!("Configuration: {:?}", config);

    match cli.headless {
        Some(frames) => {
            let report = headless::run(config, size, frames);
            log::info!(
                "{} frames in {:.2?} ({:.3?}/frame), {:.1} links/frame, {} points",
                report.frames,
                report.elapsed,
                report.frame_time(),
                report.links_per_frame(),
                report.points
            );
        }
        None => window::run(config, size)?,
    }

    Ok(())
}
