//! Offline preview: plays a scene against a simulated controller and
//! encodes what the panel would show as a PNG.

use crate::config::{parse_hex_color, Config, ControllerKind};
use crate::scene::Scene;
use anyhow::{bail, Context, Result};
use oled_panel_hw::{Ch1120, Controller, Oled, PanelDescriptor, SimulatedPanel, Ssd1306};
use std::path::Path;
use tracing::info;

/// RGBA image of the visible panel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Encodes the frame as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.rgba)?;
        }
        Ok(png_data)
    }

    /// Writes the frame to a PNG file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let png_data = self.to_png()?;
        std::fs::write(path.as_ref(), png_data).context("Failed to write PNG file")?;
        Ok(())
    }
}

/// Renders `scene` on the configured panel.
pub fn render(config: &Config, scene: &Scene) -> Result<Frame> {
    let (panel, kind) = config.resolve()?;
    match kind {
        ControllerKind::Ssd1306 => run(config, scene, panel, Ssd1306, SimulatedPanel::ssd1306()),
        ControllerKind::Ch1120 => run(config, scene, panel, Ch1120::new(), SimulatedPanel::ch1120()),
    }
}

fn run<C: Controller>(
    config: &Config,
    scene: &Scene,
    panel: PanelDescriptor,
    controller: C,
    sim: SimulatedPanel,
) -> Result<Frame> {
    let mut oled = Oled::new(panel, controller)?.with_bus(sim);
    if let Some(address) = config.address {
        oled.set_address(address);
    }
    oled.init()?;
    if let Some(contrast) = config.contrast {
        oled.set_contrast(contrast)?;
    }
    scene.apply(&mut oled)?;
    oled.display()?;

    let viewport = oled.viewport();
    let Some(sim) = oled.bus() else {
        bail!("Simulated panel detached");
    };
    info!(
        "Rendered {} ops on {} ({}x{})",
        scene.ops.len(),
        oled.panel().name,
        viewport.width,
        viewport.height
    );

    let scale = config.render.scale.max(1);
    let foreground = parse_hex_color(&config.render.foreground)?;
    let background = parse_hex_color(&config.render.background)?;
    let width = u32::from(viewport.width) * scale;
    let height = u32::from(viewport.height) * scale;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for py in 0..height {
        let y = (py / scale) as u8;
        for px in 0..width {
            let x = (px / scale) as u8;
            let lit = sim.is_on() && sim.visible_pixel(x, y, &viewport);
            let [r, g, b] = if lit { foreground } else { background };
            rgba.extend_from_slice(&[r, g, b, 0xFF]);
        }
    }

    Ok(Frame {
        width,
        height,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawOp;

    fn lit(frame: &Frame, x: u32, y: u32) -> bool {
        let idx = ((y * frame.width + x) * 4) as usize;
        frame.rgba[idx] == 0xFF
    }

    #[test]
    fn test_render_scaled_pixel() {
        let config = Config {
            panel: "narrow".to_string(),
            ..Config::default()
        };
        let scene = Scene {
            ops: vec![DrawOp::Pixel {
                x: 3,
                y: 2,
                on: true,
            }],
        };
        let frame = render(&config, &scene).unwrap();
        assert_eq!((frame.width, frame.height), (512, 128));
        assert_eq!(frame.rgba.len(), 512 * 128 * 4);
        assert!(lit(&frame, 12, 8));
        assert!(lit(&frame, 15, 11));
        assert!(!lit(&frame, 16, 8));
        assert!(!lit(&frame, 0, 0));
    }

    #[test]
    fn test_render_inverted() {
        let mut config = Config::default();
        config.render.scale = 1;
        let scene = Scene {
            ops: vec![DrawOp::Invert { on: true }],
        };
        let frame = render(&config, &scene).unwrap();
        assert!(lit(&frame, 0, 0));
        assert!(lit(&frame, 127, 63));
    }

    #[test]
    fn test_render_power_off_is_dark() {
        let mut config = Config::default();
        config.render.scale = 1;
        let scene = Scene {
            ops: vec![
                DrawOp::RectFill {
                    x: 0,
                    y: 0,
                    width: 128,
                    height: 64,
                    on: true,
                },
                DrawOp::Power { on: false },
            ],
        };
        let frame = render(&config, &scene).unwrap();
        assert!(frame.rgba.chunks(4).all(|px| px == [0, 0, 0, 0xFF]));
    }

    #[test]
    fn test_render_follows_flips() {
        let mut config = Config::default();
        config.render.scale = 1;
        let scene = Scene {
            ops: vec![
                DrawOp::Pixel {
                    x: 0,
                    y: 0,
                    on: true,
                },
                DrawOp::Display,
                DrawOp::FlipHorizontal { on: true },
            ],
        };
        let frame = render(&config, &scene).unwrap();
        assert!(!lit(&frame, 0, 0));
        assert!(lit(&frame, 127, 0));

        let mut scene = scene;
        scene.ops.push(DrawOp::FlipVertical { on: true });
        let frame = render(&config, &scene).unwrap();
        assert!(lit(&frame, 127, 63));
        assert!(!lit(&frame, 127, 0));
    }

    #[test]
    fn test_render_ch1120_panel() {
        let mut config = Config {
            panel: "1in5".to_string(),
            ..Config::default()
        };
        config.render.scale = 1;
        let scene = Scene {
            ops: vec![DrawOp::Line {
                x0: 0,
                y0: 127,
                x1: 127,
                y1: 127,
                on: true,
            }],
        };
        let frame = render(&config, &scene).unwrap();
        assert_eq!((frame.width, frame.height), (128, 128));
        assert!(lit(&frame, 64, 127));
        assert!(!lit(&frame, 64, 126));
    }

    #[test]
    fn test_save_png() {
        let mut config = Config::default();
        config.render.scale = 1;
        let frame = render(&config, &Scene::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        frame.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 128);
        assert_eq!(reader.info().height, 64);
    }
}
