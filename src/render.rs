use std::path::Path;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use rayon::prelude::*;

use crate::profile::{CanyonProfile, SimulationResult};

// Water column palette, shallow to abyssal
const WATER_SHALLOW: [u8; 4] = [52, 100, 145, 255];
const WATER_MID: [u8; 4] = [32, 55, 92, 255];
const WATER_DEEP: [u8; 4] = [18, 36, 70, 255];
// Seabed below the canyon floor
const SEABED_TOP: [u8; 4] = [150, 130, 100, 255];
const SEABED_BOTTOM: [u8; 4] = [90, 75, 60, 255];
const FLOOR_LINE: [u8; 4] = [235, 225, 200, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Depth ramp for a normalised depth in [0, 1].
#[inline]
fn depth_color(t: f32) -> [u8; 4] {
    if t < 0.5 {
        lerp_color(WATER_SHALLOW, WATER_MID, t / 0.5)
    } else {
        lerp_color(WATER_MID, WATER_DEEP, (t - 0.5) / 0.5)
    }
}

/// Linear interpolation of depth at fraction `u` in [0, 1] of the axis.
fn depth_at(profile: &CanyonProfile, u: f64) -> f64 {
    let n = profile.len();
    match n {
        0 => 0.0,
        1 => profile.depth_m()[0],
        _ => {
            let pos = u.clamp(0.0, 1.0) * (n - 1) as f64;
            let i = (pos.floor() as usize).min(n - 2);
            let f = pos - i as f64;
            let d = profile.depth_m();
            d[i] * (1.0 - f) + d[i + 1] * f
        }
    }
}

/// Cross-section: depth grows downward, water above the canyon floor,
/// seabed below it. The vertical extent is `max_depth_m`.
pub fn render_profile(profile: &CanyonProfile, max_depth_m: f64, w: usize, h: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; w * h * 4];
    if w == 0 || h == 0 || max_depth_m <= 0.0 {
        return rgba;
    }

    let floor_row: Vec<usize> = (0..w)
        .map(|x| {
            let u = if w > 1 { x as f64 / (w - 1) as f64 } else { 0.5 };
            let t = (depth_at(profile, u) / max_depth_m).clamp(0.0, 1.0);
            ((t * (h - 1) as f64).round() as usize).min(h - 1)
        })
        .collect();

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let t = y as f32 / (h.max(2) - 1) as f32;
        for x in 0..w {
            let floor = floor_row[x];
            let color = if y == floor {
                FLOOR_LINE
            } else if y < floor {
                depth_color(t)
            } else {
                let below = (y - floor) as f32 / (h - floor).max(1) as f32;
                lerp_color(SEABED_TOP, SEABED_BOTTOM, below)
            };
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Time x distance heatmap: one band of rows per step (oldest at top),
/// colour by depth relative to the plate's depth ceiling.
pub fn render_heatmap(result: &SimulationResult, w: usize, h: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; w * h * 4];
    let steps = result.steps();
    let max_depth = result.plate().max_depth_m;
    if w == 0 || h == 0 || steps == 0 || max_depth <= 0.0 {
        return rgba;
    }

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let step = (y * steps / h).min(steps - 1);
        let profile = &result.profiles()[step];
        for x in 0..w {
            let u = if w > 1 { x as f64 / (w - 1) as f64 } else { 0.5 };
            let t = (depth_at(profile, u) / max_depth) as f32;
            row[x * 4..x * 4 + 4].copy_from_slice(&depth_color(t));
        }
    });

    rgba
}

pub fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    Ok(buf)
}

pub fn save_png(path: &Path, rgba: &[u8], w: usize, h: usize) -> Result<(), image::ImageError> {
    image::save_buffer(path, rgba, w as u32, h as u32, image::ColorType::Rgba8)
}
