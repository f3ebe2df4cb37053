// src/render.rs
// Render surface: flattens the live pendulums into drawing primitives (lines and filled circles) in world coordinates,
// then rasterises them with plotters into an RGB buffer and encodes that as PNG with the image crate.
// The visible world is x ∈ [−aspect, aspect], y ∈ [−1, 1], so a 1 m rod spans half the frame height.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use plotters::prelude::*;

use crate::collection::PendulumCollection;
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::pendulum::PendulumKind;

pub const BOB_RADIUS: f64 = 0.03;
pub const TRAIL_DOT_RADIUS: f64 = 0.01;
pub const MAX_FRAME_EDGE: u32 = 4096;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

pub const BACKGROUND: Rgb = Rgb(26, 26, 26); // 0.1 grey.
pub const ROD: Rgb = Rgb(255, 255, 255);
pub const SINGLE_BOB: Rgb = Rgb(77, 77, 255);
pub const DOUBLE_BOB: Rgb = Rgb(255, 77, 77);
pub const TRAIL: Rgb = Rgb(51, 179, 51);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Line { from: Vec2, to: Vec2, color: Rgb },
    Circle { center: Vec2, radius: f64, color: Rgb },
}

/// Builds the draw list: per pendulum its rods, then its bobs, then its trail dots.
pub fn scene(pendulums: &PendulumCollection) -> Vec<Primitive> {
    let mut out = Vec::new();
    for p in pendulums.iter() {
        let bob_color = match p.kind() {
            PendulumKind::Single => SINGLE_BOB,
            PendulumKind::Double => DOUBLE_BOB,
        };
        let bobs = p.bobs();

        let mut from = p.pivot(); // Each rod starts where the previous one ended.
        for &to in bobs.iter() {
            out.push(Primitive::Line { from, to, color: ROD });
            from = to;
        }
        out.extend(bobs.iter().map(|&center| Primitive::Circle {
            center,
            radius: BOB_RADIUS,
            color: bob_color,
        }));
        out.extend(p.trail().iter().map(|&center| Primitive::Circle {
            center,
            radius: TRAIL_DOT_RADIUS,
            color: TRAIL,
        }));
    }
    out
}

fn render_error<E: std::fmt::Display>(e: E) -> SimError {
    SimError::Render(e.to_string())
}

/// Rasterises `primitives` into a `width` × `height` PNG.
pub fn render_png(primitives: &[Primitive], width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 || width > MAX_FRAME_EDGE || height > MAX_FRAME_EDGE {
        return Err(SimError::InvalidParameter(format!(
            "frame size must be within 1..={MAX_FRAME_EDGE} per edge, got {width}x{height}"
        )));
    }

    // RGB, 3 bytes per pixel.
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND.to_plotters()).map_err(render_error)?;

        let aspect = width as f64 / height as f64;
        let mut chart = ChartBuilder::on(&root)
            .margin(0)
            .build_cartesian_2d(-aspect..aspect, -1.0..1.0)
            .map_err(render_error)?;

        let px_per_metre = height as f64 / 2.0;
        for prim in primitives {
            match *prim {
                Primitive::Line { from, to, color } => {
                    chart
                        .draw_series(std::iter::once(PathElement::new(
                            vec![(from.x, from.y), (to.x, to.y)],
                            color.to_plotters().stroke_width(2),
                        )))
                        .map_err(render_error)?;
                }
                Primitive::Circle { center, radius, color } => {
                    let r = (radius * px_per_metre).round().max(1.0) as i32;
                    chart
                        .draw_series(std::iter::once(Circle::new(
                            (center.x, center.y),
                            r,
                            color.to_plotters().filled(),
                        )))
                        .map_err(render_error)?;
                }
            }
        }
        root.present().map_err(render_error)?;
    }

    let img = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| SimError::Render("pixel buffer does not match frame size".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(render_error)?;
    Ok(png.into_inner())
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}
