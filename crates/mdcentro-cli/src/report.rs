use crate::error::{CliError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use tracing::warn;

/// 7 x 6 inches at 300 DPI.
pub const PLOT_SIZE: (u32, u32) = (2100, 1800);

const COLORBAR_WIDTH: i32 = 300;
const PLOT_MARGIN: i32 = 60;
const POINT_RADIUS: i32 = 7;
const COLORBAR_STEPS: i32 = 256;

const FONT_FAMILY: &str = "sans-serif";
const TITLE_FONT_SIZE: i32 = 64;
const LABEL_FONT_SIZE: i32 = 48;
const TICK_FONT_SIZE: i32 = 40;
const TICK_GAP: i32 = 12;

pub const COLORBAR_LABEL: &str = "Frame in original replicate";

/// Samples of the viridis colour map at t = 0.0, 0.1, ..., 1.0.
const VIRIDIS: [(u8, u8, u8); 11] = [
    (68, 1, 84),
    (72, 36, 117),
    (65, 68, 135),
    (53, 95, 141),
    (42, 120, 142),
    (33, 145, 140),
    (34, 168, 132),
    (68, 191, 112),
    (122, 209, 81),
    (189, 223, 38),
    (253, 231, 37),
];

/// Viridis colour at `t`, clamped to `[0, 1]` and linearly interpolated between samples.
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lower as f64;

    let (r0, g0, b0) = VIRIDIS[lower];
    let (r1, g1, b1) = VIRIDIS[lower + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    let span = max - min;
    let pad = if span > f64::EPSILON { span * 0.05 } else { 1.0 };
    (min - pad)..(max + pad)
}

fn plot_error(path: &Path, e: impl std::fmt::Display) -> CliError {
    CliError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Pixel bounds of the colour bar inside its drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BarBounds {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl BarBounds {
    fn within(width: i32, height: i32) -> Self {
        Self {
            left: width / 4,
            right: width / 2,
            top: PLOT_MARGIN,
            bottom: height - PLOT_MARGIN,
        }
    }
}

/// Renders the 2-D projection as a scatter plot coloured by intra-replicate frame index,
/// titled with the system name and with a labelled colour bar on the right. Axes are omitted.
///
/// Text needs a system font. When none can be loaded the plot is still written,
/// without title and labels, and a warning is logged.
pub fn render_time_colored(
    path: &Path,
    title: &str,
    points: &[(f64, f64)],
    time_labels: &[usize],
) -> Result<()> {
    if points.len() != time_labels.len() {
        return Err(plot_error(
            path,
            format!(
                "{} points but {} time labels",
                points.len(),
                time_labels.len()
            ),
        ));
    }
    let max_label = time_labels.iter().copied().max().unwrap_or(0);
    let normalize = |label: usize| {
        if max_label == 0 {
            0.0
        } else {
            label as f64 / max_label as f64
        }
    };

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;
    let (body, with_text) = match root.titled(title, (FONT_FAMILY, TITLE_FONT_SIZE)) {
        Ok(body) => (body, true),
        Err(e) => {
            warn!("Plot text for {:?} is skipped: {}", path, e);
            (root.clone(), false)
        }
    };
    let (plot_area, bar_area) = body.split_horizontally(PLOT_SIZE.0 as i32 - COLORBAR_WIDTH);

    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(PLOT_MARGIN)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(points.iter().zip(time_labels.iter()).map(|(&(x, y), &label)| {
            Circle::new(
                (x, y),
                POINT_RADIUS,
                viridis(normalize(label)).mix(0.5).filled(),
            )
        }))
        .map_err(|e| plot_error(path, e))?;

    let bounds = draw_colorbar(&bar_area).map_err(|e| plot_error(path, e))?;
    if with_text {
        if let Err(e) = draw_colorbar_labels(&bar_area, bounds, max_label) {
            warn!("Colour bar labels for {:?} are skipped: {}", path, e);
        }
    }
    root.present().map_err(|e| plot_error(path, e))?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
) -> std::result::Result<BarBounds, DrawingAreaErrorKind<DB::ErrorType>> {
    let (width, height) = area.dim_in_pixel();
    let bounds = BarBounds::within(width as i32, height as i32);
    let BarBounds {
        left,
        right,
        top,
        bottom,
    } = bounds;
    let step = (bottom - top) as f64 / COLORBAR_STEPS as f64;

    for i in 0..COLORBAR_STEPS {
        let t = i as f64 / (COLORBAR_STEPS - 1) as f64;
        let y_low = bottom - (i as f64 * step).round() as i32;
        let y_high = bottom - ((i + 1) as f64 * step).round() as i32;
        area.draw(&Rectangle::new(
            [(left, y_high), (right, y_low)],
            viridis(t).filled(),
        ))?;
    }
    area.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(2)))?;
    Ok(bounds)
}

/// Tick labels at both ends of the bar (first and last frame index) and the axis label.
fn draw_colorbar_labels<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    bounds: BarBounds,
    max_label: usize,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let tick_style = (FONT_FAMILY, TICK_FONT_SIZE)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let x = bounds.right + TICK_GAP;
    area.draw_text("0", &tick_style, (x, bounds.bottom))?;
    area.draw_text(&max_label.to_string(), &tick_style, (x, bounds.top))?;

    let (width, _) = area.dim_in_pixel();
    let label_style = (FONT_FAMILY, LABEL_FONT_SIZE)
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw_text(
        COLORBAR_LABEL,
        &label_style,
        (width as i32 - PLOT_MARGIN, (bounds.top + bounds.bottom) / 2),
    )
}
