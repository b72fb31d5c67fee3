//! Chart materialization: [`ChartSpec`] → image bytes.
//!
//! The report only needs encoded images, so the drawing library stays behind
//! the [`ChartRenderer`] trait. The default renderer draws SVG with Plotters,
//! which needs no system fonts.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::chart::{CartesianChart, ChartSpec, Mark, PieChart, Rgb};
use crate::error::{AnalysisError, Result};

/// Turns a chart specification into an encoded image.
pub trait ChartRenderer {
    fn render_to_image(&self, spec: &ChartSpec) -> Result<Vec<u8>>;

    /// File extension of the produced images (without the dot).
    fn extension(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render_to_image(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let svg = self
            .render_svg(spec)
            .map_err(|e| AnalysisError::ChartExport(format!("{}: {e}", spec.title())))?;
        Ok(svg.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

impl SvgChartRenderer {
    fn render_svg(&self, spec: &ChartSpec) -> DrawResult<String> {
        if self.width < 200 || self.height < 150 {
            return Err(format!("image size {}x{} is too small", self.width, self.height).into());
        }

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;
            match spec {
                ChartSpec::Pie(pie) => draw_pie(&root, pie)?,
                ChartSpec::Cartesian(chart) => draw_cartesian(&root, chart)?,
            }
            root.present()?;
        }
        Ok(svg)
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn draw_no_data<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let (w, h) = area.dim_in_pixel();
    let style = ("sans-serif", 18)
        .into_font()
        .color(&RGBColor(0x80, 0x80, 0x80))
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data for this period", (w as i32 / 2, h as i32 / 2), style))?;
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, pie: &PieChart) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(&pie.title, ("sans-serif", 22).into_font())?;
    let slices: Vec<_> = pie.slices.iter().filter(|s| s.value > 0.0).collect();
    if slices.is_empty() {
        return draw_no_data(&area);
    }

    let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let colors: Vec<RGBColor> = slices.iter().map(|s| rgb(s.color)).collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    // Pie ignores the area's translation, so the center is in canvas pixels.
    let (w, h) = area.dim_in_pixel();
    let (x0, y0) = area.get_base_pixel();
    let center = (x0 + w as i32 / 2, y0 + h as i32 / 2);
    // Room for the wedge labels outside the circle.
    let radius = (f64::from(w.min(h)) / 2.0 - 60.0).max(10.0);

    let mut wedges = Pie::new(&center, &radius, &sizes, &colors, &labels);
    // Start at 12 o'clock, going clockwise.
    wedges.start_angle(-90.0);
    wedges.label_style(("sans-serif", 15).into_font().color(&BLACK));
    wedges.label_offset(12.0);
    wedges.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&wedges)?;
    Ok(())
}

fn draw_cartesian<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &CartesianChart) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let n = chart.categories.len();
    let Some((lo, hi)) = chart.value_range() else {
        let area = root.titled(&chart.title, ("sans-serif", 22).into_font())?;
        return draw_no_data(&area);
    };
    let y0 = lo.min(0.0);
    let y1 = if hi > 0.0 { hi * 1.1 } else { 1.0 };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y0..y1)?;

    let categories = &chart.categories;
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_labels(n.clamp(2, 12))
        .y_labels(8)
        .x_label_formatter(&|x| category_label(categories, *x))
        .label_style(("sans-serif", 12).into_font())
        .draw()?;

    let bars: Vec<_> = chart.series.iter().filter(|s| s.mark == Mark::Bar).collect();
    let bar_width = 0.8 / bars.len().max(1) as f64;

    for series in &chart.series {
        let color = rgb(series.color);
        match series.mark {
            Mark::Bar => {
                let slot = bars.iter().position(|b| std::ptr::eq(*b, series)).unwrap_or(0);
                let offset = -0.4 + slot as f64 * bar_width;
                ctx.draw_series(series.values.iter().enumerate().filter_map(|(i, v)| {
                    let x = i as f64 + offset;
                    v.map(|v| Rectangle::new([(x, 0.0), (x + bar_width, v)], color.filled()))
                }))?
                .label(series.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
            }
            Mark::Line | Mark::LineWithMarkers | Mark::DashedLine => {
                let style = color.stroke_width(2);
                for run in contiguous_runs(&series.values) {
                    if series.mark == Mark::DashedLine {
                        ctx.draw_series(DashedLineSeries::new(run.clone(), 8, 6, style))?;
                    } else {
                        ctx.draw_series(std::iter::once(PathElement::new(run.clone(), style)))?;
                    }
                    if series.mark == Mark::LineWithMarkers {
                        ctx.draw_series(run.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
                    }
                }
                ctx.draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            }
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 13).into_font())
        .draw()?;
    Ok(())
}

/// Label of the category nearest to `x`; blank between categories.
fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Split a series at missing values into drawable polylines.
fn contiguous_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i as f64, *v)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
