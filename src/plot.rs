//! Market cap vs. volume scatter plot for token summaries.
//!
//! Bubbles sit on log-log axes, sized by consistency count and coloured by
//! average price change on a diverging blue-white-red scale.

use anyhow::{Context, Result};
use plotters::coord::combinators::IntoLogRange;
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::types::TokenSummary;

pub const FIGURE_INCHES: (f64, f64) = (12.0, 8.0);
pub const DPI: f64 = 300.0;

const TITLE: &str = "Trending Tokens: Market Cap vs. Volume";
const SUBTITLE: &str = "(bubble size = consistency count, color = avg price change)";
const COLORBAR_LABEL: &str = "Average Price Change (%)";
const POINT_ALPHA: f64 = 0.8;
const LABEL_ALPHA: f64 = 0.75;
/// Bubble area in points² per unit of consistency count.
const AREA_PER_COUNT: f64 = 100.0;
const AXIS_PAD: f64 = 1.5;
const MISSING_COLOR: RGBColor = RGBColor(160, 160, 160);

/// Anchor colours of the diverging scale, from cold (0.0) to warm (1.0).
const COOLWARM: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (59, 76, 192)),
    (0.25, (141, 176, 254)),
    (0.5, (221, 220, 219)),
    (0.75, (244, 154, 123)),
    (1.0, (180, 4, 38)),
];

/// Result of a plot request.
#[derive(Debug, PartialEq, Eq)]
pub enum PlotOutcome {
    Written { points: usize },
    /// Nothing placeable; no image was written.
    Empty,
}

/// Converts typographic points to pixels at [`DPI`].
fn pt(points: f64) -> f64 {
    points * DPI / 72.0
}

pub fn canvas_size() -> (u32, u32) {
    (
        (FIGURE_INCHES.0 * DPI).round() as u32,
        (FIGURE_INCHES.1 * DPI).round() as u32,
    )
}

/// Samples the diverging scale at `t` in `[0, 1]` (clamped).
pub fn coolwarm(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

    let upper = COOLWARM
        .iter()
        .position(|(stop, _)| *stop >= t)
        .unwrap_or(COOLWARM.len() - 1)
        .max(1);
    let (t0, c0) = COOLWARM[upper - 1];
    let (t1, c1) = COOLWARM[upper];

    let f = (t - t0) / (t1 - t0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

/// Linear normalisation of price change onto the colour scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub lo: f64,
    pub hi: f64,
}

impl ColorScale {
    /// Spans the min..max of `values`. A single-valued domain is widened by ±1,
    /// and an empty one becomes -1..1.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if lo > hi {
            Self { lo: -1.0, hi: 1.0 }
        } else if lo == hi {
            Self { lo: lo - 1.0, hi: hi + 1.0 }
        } else {
            Self { lo, hi }
        }
    }

    pub fn color(&self, value: f64) -> RGBColor {
        coolwarm((value - self.lo) / (self.hi - self.lo))
    }
}

/// One drawable point.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    pub color: RGBColor,
    pub label: String,
}

/// Bubble radius in pixels for an area of `consistency_count × 100` points².
pub fn bubble_radius(consistency_count: usize) -> u32 {
    let area = consistency_count as f64 * AREA_PER_COUNT;
    pt((area / std::f64::consts::PI).sqrt()).round().max(1.0) as u32
}

/// Maps summaries onto bubbles. Summaries without a finite, positive market cap
/// and volume cannot sit on log axes and are skipped.
pub fn bubbles(summaries: &[TokenSummary], scale: &ColorScale) -> Vec<Bubble> {
    summaries
        .iter()
        .filter_map(|s| {
            let (x, y) = match (s.median_market_cap, s.avg_volume) {
                (Some(x), Some(y)) if x > 0.0 && y > 0.0 && x.is_finite() && y.is_finite() => (x, y),
                _ => {
                    warn!(address = %s.address, "Summary cannot be placed on log axes, skipping");
                    return None;
                }
            };
            Some(Bubble {
                x,
                y,
                radius: bubble_radius(s.consistency_count),
                color: s
                    .avg_price_change
                    .map(|c| scale.color(c))
                    .unwrap_or(MISSING_COLOR),
                label: s.symbol.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn log_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (lo / AXIS_PAD, hi * AXIS_PAD)
}

/// Renders the scatter plot as a PNG at `path`, overwriting any existing file.
#[tracing::instrument(skip_all, fields(path = %path.display(), rows = summaries.len()))]
pub fn render_scatter(path: &Path, summaries: &[TokenSummary]) -> Result<PlotOutcome> {
    let scale = ColorScale::from_values(summaries.iter().filter_map(|s| s.avg_price_change));
    let points = bubbles(summaries, &scale);
    if points.is_empty() {
        warn!("No summaries to plot, skipping image");
        return Ok(PlotOutcome::Empty);
    }

    draw(path, &points, &scale).with_context(|| format!("failed to render {}", path.display()))?;

    info!(points = points.len(), "Plot written");
    Ok(PlotOutcome::Written { points: points.len() })
}

fn draw(path: &Path, points: &[Bubble], scale: &ColorScale) -> Result<()> {
    let (width, height) = canvas_size();
    let colorbar_width = pt(110.0) as u32;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (plot_area, bar_area) = root.split_horizontally(width - colorbar_width);
    let plot_area = plot_area.titled(TITLE, ("sans-serif", pt(14.0)))?;

    let (x_lo, x_hi) = log_bounds(points.iter().map(|b| b.x));
    let (y_lo, y_hi) = log_bounds(points.iter().map(|b| b.y));
    debug!(x_lo, x_hi, y_lo, y_hi, "Axis bounds");

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(SUBTITLE, ("sans-serif", pt(11.0)))
        .margin(pt(10.0) as u32)
        .x_label_area_size(pt(40.0) as u32)
        .y_label_area_size(pt(60.0) as u32)
        .build_cartesian_2d((x_lo..x_hi).log_scale(), (y_lo..y_hi).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Median Market Cap")
        .y_desc("Average Volume")
        .label_style(("sans-serif", pt(9.0)))
        .axis_desc_style(("sans-serif", pt(11.0)))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|b| Circle::new((b.x, b.y), b.radius, b.color.mix(POINT_ALPHA).filled())),
    )?;

    let label_style = ("sans-serif", pt(8.0)).into_font().color(&BLACK.mix(LABEL_ALPHA));
    chart.draw_series(
        points
            .iter()
            .map(|b| Text::new(b.label.clone(), (b.x, b.y), label_style.clone())),
    )?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(pt(40.0) as u32)
        .margin_bottom(pt(50.0) as u32)
        .margin_right(pt(12.0) as u32)
        .y_label_area_size(pt(60.0) as u32)
        .build_cartesian_2d(0f64..1f64, scale.lo..scale.hi)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(COLORBAR_LABEL)
        .label_style(("sans-serif", pt(9.0)))
        .axis_desc_style(("sans-serif", pt(10.0)))
        .draw()?;

    const STEPS: usize = 256;
    let step = (scale.hi - scale.lo) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|i| {
        let v0 = scale.lo + step * i as f64;
        Rectangle::new([(0.0, v0), (1.0, v0 + step)], scale.color(v0 + step / 2.0).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Opens `path` in the platform image viewer when a display is available.
pub fn show(path: &Path) -> Result<()> {
    if !display_available() {
        info!("No display detected, not opening plot");
        return Ok(());
    }

    let viewer = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    std::process::Command::new(viewer)
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to launch {viewer}"))?;
    Ok(())
}

fn display_available() -> bool {
    cfg!(target_os = "macos")
        || cfg!(target_os = "windows")
        || std::env::var_os("DISPLAY").is_some()
        || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(symbol: &str, count: usize, volume: f64, cap: f64, change: Option<f64>) -> TokenSummary {
        TokenSummary {
            address: format!("addr-{symbol}"),
            id: None,
            chain: None,
            symbol: Some(symbol.to_string()),
            avg_price: None,
            avg_volume: Some(volume),
            median_market_cap: Some(cap),
            consistency_count: count,
            avg_price_change: change,
        }
    }

    #[test]
    fn test_canvas_is_300_dpi() {
        assert_eq!(canvas_size(), (3600, 2400));
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(0.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.5), RGBColor(221, 220, 219));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(-3.0), coolwarm(0.0));
        assert_eq!(coolwarm(7.0), coolwarm(1.0));
    }

    #[test]
    fn test_color_scale_domain() {
        let scale = ColorScale::from_values([-10.0, 30.0, 5.0]);
        assert_eq!(scale, ColorScale { lo: -10.0, hi: 30.0 });
        assert_eq!(scale.color(-10.0), coolwarm(0.0));
        assert_eq!(scale.color(30.0), coolwarm(1.0));

        assert_eq!(ColorScale::from_values([4.0]), ColorScale { lo: 3.0, hi: 5.0 });
        assert_eq!(ColorScale::from_values(Vec::<f64>::new()), ColorScale { lo: -1.0, hi: 1.0 });
    }

    #[test]
    fn test_bubble_area_scales_with_count() {
        let r3 = bubble_radius(3) as f64;
        let r5 = bubble_radius(5) as f64;
        let ratio = (r5 * r5) / (r3 * r3);
        assert!((ratio - 5.0 / 3.0).abs() < 0.05);
    }

    #[test]
    fn test_bubbles_skip_non_finite_coordinates() {
        let rows = vec![
            summary("INF", 3, f64::INFINITY, 20000.0, Some(1.0)),
            summary("NAN", 3, 2000.0, f64::NAN, Some(1.0)),
            summary("OK", 3, 2000.0, 20000.0, Some(1.0)),
        ];
        let scale = ColorScale::from_values([1.0]);

        let points = bubbles(&rows, &scale);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "OK");
    }

    #[test]
    fn test_bubbles_skip_unplaceable_and_grey_missing_change() {
        let rows = vec![
            summary("UP", 4, 2000.0, 20000.0, Some(50.0)),
            summary("NONE", 3, 1500.0, 15000.0, None),
            summary("BAD", 3, 1500.0, 0.0, Some(-5.0)),
        ];
        let scale = ColorScale::from_values(rows.iter().filter_map(|s| s.avg_price_change));

        let points = bubbles(&rows, &scale);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "UP");
        assert_eq!(points[0].x, 20000.0);
        assert_eq!(points[0].y, 2000.0);
        assert_eq!(points[1].color, MISSING_COLOR);
    }

    #[test]
    fn test_render_writes_300_dpi_png() {
        let path = std::env::temp_dir().join("trending_aggregator_test_render.png");
        let _ = std::fs::remove_file(&path);
        let rows = vec![
            summary("AAA", 5, 6000.0, 115000.0, Some(10.0)),
            summary("BBB", 3, 1500.0, 50000.0, Some(-2.0)),
            summary("FFF", 3, 2500.0, 20000.0, None),
        ];

        let outcome = render_scatter(&path, &rows).unwrap();

        assert_eq!(outcome, PlotOutcome::Written { points: 3 });
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        assert_eq!((width, height), (3600, 2400));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_empty_writes_nothing() {
        let path = std::env::temp_dir().join("trending_aggregator_test_empty_plot.png");
        let _ = std::fs::remove_file(&path);

        let outcome = render_scatter(&path, &[]).unwrap();

        assert_eq!(outcome, PlotOutcome::Empty);
        assert!(!path.exists());
    }
}
