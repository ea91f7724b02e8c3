use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use super::font::draw_text_centered;
use crate::core::Result;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const EDGE: Rgb<u8> = Rgb([0, 0, 0]);
const TEXT: Rgb<u8> = Rgb([0, 0, 0]);

/// First slice starts at twelve o'clock.
const START_DEG: f64 = 90.0;
/// Slice offset from the centre, as a fraction of the radius.
const EXPLODE: f64 = 0.01;
/// Percentage labels sit at this fraction of the radius.
const PCT_DISTANCE: f64 = 0.6;
/// Slice names sit at this fraction of the radius.
const LABEL_DISTANCE: f64 = 1.1;

/// One wedge of a pie chart. Angles are in degrees, counter-clockwise from
/// three o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: String,
    pub count: usize,
    pub fraction: f64,
    pub start_deg: f64,
    pub sweep_deg: f64,
    pub color: Rgb<u8>,
}

impl PieSlice {
    pub fn mid_deg(&self) -> f64 {
        self.start_deg + self.sweep_deg / 2.0
    }

    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }

    fn contains_angle(&self, deg: f64) -> bool {
        self.sweep_deg >= 360.0 || (deg - self.start_deg).rem_euclid(360.0) < self.sweep_deg
    }
}

/// A pie chart of category counts, rendered to PNG.
#[derive(Debug, Clone)]
pub struct PieChart {
    title: String,
    slices: Vec<PieSlice>,
    size: u32,
}

impl PieChart {
    /// Builds slices in the given order, skipping zero counts. Returns
    /// `None` when there is nothing to draw.
    pub fn new<I, S>(title: impl Into<String>, entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, usize, Rgb<u8>)>,
        S: Into<String>,
    {
        let entries: Vec<(String, usize, Rgb<u8>)> = entries
            .into_iter()
            .filter(|(_, count, _)| *count > 0)
            .map(|(name, count, color)| (name.into(), count, color))
            .collect();
        let total: usize = entries.iter().map(|(_, count, _)| count).sum();
        if total == 0 {
            return None;
        }

        let mut before = 0usize;
        let slices = entries
            .into_iter()
            .map(|(name, count, color)| {
                let slice = PieSlice {
                    name,
                    count,
                    fraction: count as f64 / total as f64,
                    start_deg: START_DEG + 360.0 * before as f64 / total as f64,
                    sweep_deg: 360.0 * count as f64 / total as f64,
                    color,
                };
                before += count;
                slice
            })
            .collect();

        Some(Self {
            title: title.into(),
            slices,
            size: 500,
        })
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slices(&self) -> &[PieSlice] {
        &self.slices
    }

    /// Centre and radius of the pie within the image.
    pub fn geometry(&self) -> (f64, f64, f64) {
        let size = f64::from(self.size);
        (size / 2.0, size * 0.54, size * 0.34)
    }

    pub fn render(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.size, self.size, BACKGROUND);
        let (cx, cy, radius) = self.geometry();
        let single = self.slices.len() == 1;

        // Exploded centre of each slice.
        let centres: Vec<(f64, f64)> = self
            .slices
            .iter()
            .map(|s| {
                if single {
                    return (cx, cy);
                }
                let mid = s.mid_deg().to_radians();
                (cx + EXPLODE * radius * mid.cos(), cy - EXPLODE * radius * mid.sin())
            })
            .collect();

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            for (slice, &(sx, sy)) in self.slices.iter().zip(&centres) {
                let dx = px - sx;
                let dy = sy - py;
                let r = dx.hypot(dy);
                if r > radius {
                    continue;
                }
                let deg = dy.atan2(dx).to_degrees().rem_euclid(360.0);
                if !slice.contains_angle(deg) {
                    continue;
                }
                *pixel = if r > radius - 1.0 || (!single && near_radial_edge(slice, dx, dy)) {
                    EDGE
                } else {
                    slice.color
                };
                break;
            }
        }

        let scale = (self.size / 250).max(1);
        draw_text_centered(
            &mut img,
            &self.title,
            cx as i64,
            i64::from(self.size) / 20 + 4,
            scale + 1,
            TEXT,
        );
        for slice in &self.slices {
            let mid = slice.mid_deg().to_radians();
            let (pct_x, pct_y) = (
                cx + PCT_DISTANCE * radius * mid.cos(),
                cy - PCT_DISTANCE * radius * mid.sin(),
            );
            draw_text_centered(&mut img, &slice.percent_label(), pct_x as i64, pct_y as i64, scale, TEXT);
            let (name_x, name_y) = (
                cx + LABEL_DISTANCE * radius * mid.cos(),
                cy - LABEL_DISTANCE * radius * mid.sin(),
            );
            draw_text_centered(&mut img, &slice.name, name_x as i64, name_y as i64, scale, TEXT);
        }

        img
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.render()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// True when `(dx, dy)` lies within a pixel of either straight edge of the slice.
fn near_radial_edge(slice: &PieSlice, dx: f64, dy: f64) -> bool {
    [slice.start_deg, slice.start_deg + slice.sweep_deg]
        .iter()
        .any(|deg| {
            let (sin, cos) = deg.to_radians().sin_cos();
            let along = dx * cos + dy * sin;
            along >= 0.0 && (dx * sin - dy * cos).abs() < 1.0
        })
}
