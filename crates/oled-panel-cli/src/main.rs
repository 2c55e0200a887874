//! OLED Panel Control Tool
//!
//! Renders drawing scenes to PNG previews and lists the built-in panels and
//! resources. With the `hid-bridge` feature it also plays scenes on a real
//! panel behind a USB-HID I2C bridge.

mod config;
mod render;
mod scene;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use oled_panel_hw::{resource, PRESETS};
use scene::Scene;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oledpanelctl")]
#[command(about = "Scene renderer and control tool for monochrome OLED panels")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to a PNG preview
    Render {
        /// Panel configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Scene file
        scene: PathBuf,
        /// Output PNG path
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
        /// Output pixels per panel pixel
        #[arg(long)]
        scale: Option<u32>,
    },
    /// List panel presets
    Panels,
    /// List built-in fonts and bitmaps
    Fonts,
    /// Play a scene on a panel behind the USB-HID I2C bridge
    #[cfg(feature = "hid-bridge")]
    Show {
        /// Panel configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Scene file
        scene: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Render {
            config,
            scene,
            output,
            scale,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(scale) = scale {
                config.render.scale = scale;
            }
            let scene = Scene::load(&scene)
                .with_context(|| format!("Failed to load scene from {}", scene.display()))?;
            let frame = render::render(&config, &scene)?;
            frame.save(&output)?;
            println!(
                "Rendered {}x{} preview to {}",
                frame.width,
                frame.height,
                output.display()
            );
            Ok(())
        }
        Commands::Panels => {
            println!(
                "{:<12} {:>5} {:>6} {:>8} {:>8}",
                "NAME", "WIDTH", "HEIGHT", "OFFSET", "ADDRESS"
            );
            for panel in PRESETS {
                println!(
                    "{:<12} {:>5} {:>6} {:>8} {:>8}",
                    panel.name,
                    panel.width,
                    panel.height,
                    format!("{},{}", panel.x_offset, panel.y_offset),
                    format!("0x{:02X}", panel.address)
                );
            }
            Ok(())
        }
        Commands::Fonts => {
            println!("Fonts:");
            for font in resource::FONTS.iter() {
                println!(
                    "  {} ({}x{}, {} glyphs from 0x{:02X})",
                    font.name, font.width, font.height, font.count, font.start
                );
            }
            println!("Bitmaps:");
            for bitmap in resource::BITMAPS.iter() {
                println!("  {} ({}x{})", bitmap.name, bitmap.width, bitmap.height);
            }
            Ok(())
        }
        #[cfg(feature = "hid-bridge")]
        Commands::Show { config, scene } => {
            let config = load_config(config.as_deref())?;
            let scene = Scene::load(&scene)
                .with_context(|| format!("Failed to load scene from {}", scene.display()))?;
            show::show(&config, &scene)?;
            println!("Scene played ({} ops)", scene.ops.len());
            Ok(())
        }
    }
}

#[cfg(feature = "hid-bridge")]
mod show {
    use crate::config::{Config, ControllerKind};
    use crate::scene::Scene;
    use anyhow::{Context, Result};
    use oled_panel_hw::{Ch1120, Controller, HidBridge, Oled, PanelDescriptor, Ssd1306};

    /// Plays `scene` on the bridged panel and flushes the result.
    pub fn show(config: &Config, scene: &Scene) -> Result<()> {
        let (panel, kind) = config.resolve()?;
        match kind {
            ControllerKind::Ssd1306 => run(config, scene, panel, Ssd1306),
            ControllerKind::Ch1120 => run(config, scene, panel, Ch1120::new()),
        }
    }

    fn run<C: Controller>(
        config: &Config,
        scene: &Scene,
        panel: PanelDescriptor,
        controller: C,
    ) -> Result<()> {
        let bridge = HidBridge::open().context("Failed to open I2C bridge")?;
        let mut oled = Oled::new(panel, controller)?.with_bus(bridge);
        if let Some(address) = config.address {
            oled.set_address(address);
        }
        oled.init().context("Failed to initialize panel")?;
        if let Some(contrast) = config.contrast {
            oled.set_contrast(contrast)?;
        }
        scene.apply(&mut oled)?;
        oled.display()?;
        Ok(())
    }
}
