//! Headless wireframe rendering into an RGBA image.

use std::path::Path;

use cgmath::{Matrix4, Vector4};
use image::{ImageError, Rgba, RgbaImage};
use log::{debug, info};
use thiserror::Error;

use crate::{
    camera::{OrbitCamera, ProjectionSettings, Viewport},
    scene::Scene,
};

const BACKGROUND: Rgba<u8> = Rgba([242, 242, 242, 255]);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("viewport {0}x{1} has no pixels")]
    EmptyViewport(u32, u32),
    #[error("failed to write image: {0}")]
    Image(#[from] ImageError),
}

fn to_rgba(color: Vector4<f32>) -> Rgba<u8> {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        channel(color.x),
        channel(color.y),
        channel(color.z),
        channel(color.w),
    ])
}

// Liang-Barsky clip of a segment against [0, w] x [0, h].
fn clip_segment(
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    width: f32,
    height: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [(-dx, x0), (dx, width - x0), (-dy, y0), (dy, height - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

fn draw_line(image: &mut RgbaImage, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: Rgba<u8>) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let mut x0 = x0;
    let mut y0 = y0;
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        if (0..w).contains(&x0) && (0..h).contains(&y0) {
            image.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Projects a model-space point to pixel coordinates. Points behind the near
/// plane yield `None`.
fn project(mvp: &Matrix4<f32>, p: Vector4<f32>, viewport: Viewport) -> Option<(f32, f32)> {
    let clip = *mvp * p;
    if clip.w <= 0.0 || clip.z < -clip.w {
        return None;
    }
    let (nx, ny) = (clip.x / clip.w, clip.y / clip.w);
    Some((
        (nx + 1.0) * 0.5 * viewport.width as f32,
        (1.0 - ny) * 0.5 * viewport.height as f32,
    ))
}

/// Draws every triangle edge of the scene in its item's color.
pub fn render_wireframe(
    scene: &Scene,
    camera: &OrbitCamera,
    viewport: Viewport,
    projection: &ProjectionSettings,
) -> Result<RgbaImage, SnapshotError> {
    if viewport.width == 0 || viewport.height == 0 {
        return Err(SnapshotError::EmptyViewport(viewport.width, viewport.height));
    }
    let mut image = RgbaImage::from_pixel(viewport.width, viewport.height, BACKGROUND);
    let view_projection = camera.view_projection(viewport, projection);
    // Stay half a pixel inside the far edges so rounding never leaves the image.
    let (max_x, max_y) = (
        viewport.width as f32 - 0.5,
        viewport.height as f32 - 0.5,
    );

    for item in &scene.items {
        let mvp = view_projection * item.model;
        let color = to_rgba(item.color);
        let screen: Vec<Option<(f32, f32)>> = item
            .mesh
            .vertices()
            .iter()
            .map(|v| project(&mvp, v.extend(1.0), viewport))
            .collect();

        let mut drawn = 0usize;
        for edge in item.mesh.wire_indices().chunks_exact(2) {
            let (Some(a), Some(b)) = (screen[edge[0] as usize], screen[edge[1] as usize]) else {
                continue;
            };
            if let Some((a, b)) = clip_segment(a, b, max_x, max_y) {
                draw_line(
                    &mut image,
                    (a.0 as i32, a.1 as i32),
                    (b.0 as i32, b.1 as i32),
                    color,
                );
                drawn += 1;
            }
        }
        debug!("{}: drew {drawn} edges", item.label);
    }
    Ok(image)
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), SnapshotError> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    info!(
        "wrote {}x{} snapshot to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
