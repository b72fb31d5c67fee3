//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, one glyph per source:
//! - grid: `G`
//! - genset: `E`
//! - solar: `S`
//! - installation load: `.`
//!
//! Series are drawn in that order; a cell keeps the first glyph drawn into it.

use chrono::{NaiveTime, Timelike};

use crate::aggregate::DayPowerSeries;
use crate::domain::Channel;

pub fn glyph(channel: Channel) -> char {
    match channel {
        Channel::Grid => 'G',
        Channel::Genset => 'E',
        Channel::Solar => 'S',
        Channel::Installation => '.',
    }
}

/// Render the power of every source over one day.
pub fn render_day_power_plot(series: &DayPowerSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((t_min, t_max)) = time_range(series) else {
        return format!("Plot: {} | no readings\n", series.date);
    };
    let (y_min, y_max) = power_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for channel in Channel::ALL {
        let points: Vec<Option<(f64, f64)>> = series
            .points
            .iter()
            .map(|p| p.power(channel).map(|v| (minutes(p.time), v)))
            .collect();
        draw_series(&mut grid, &points, glyph(channel), (t_min, t_max), (y_min, y_max));
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | time=[{}, {}] | power=[{y_min:.2}, {y_max:.2}] kW\n",
        series.date,
        clock(t_min),
        clock(t_max)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = Channel::ALL
        .iter()
        .map(|&c| format!("{}={}", glyph(c), c.label()))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn minutes(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / 60.0
}

fn clock(minutes: f64) -> String {
    let m = minutes.round() as u32;
    format!("{:02}:{:02}", m / 60, m % 60)
}

fn time_range(series: &DayPowerSeries) -> Option<(f64, f64)> {
    let first = minutes(series.points.first()?.time);
    let last = minutes(series.points.last()?.time);
    if last > first {
        Some((first, last))
    } else {
        Some((first, first + 10.0))
    }
}

fn power_range(series: &DayPowerSeries) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in series.points.iter().flat_map(|p| p.power.iter().flatten()) {
        min_y = min_y.min(*v);
        max_y = max_y.max(*v);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        None
    } else if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Connect consecutive present points; a missing value breaks the line.
fn draw_series(
    grid: &mut [Vec<char>],
    points: &[Option<(f64, f64)>],
    ch: char,
    (t_min, t_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for point in points {
        let Some((t, y)) = *point else {
            prev = None;
            continue;
        };
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => draw_line(grid, x, yy, x, yy, ch),
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DayPowerPoint;
    use chrono::NaiveDate;

    fn point(h: u32, m: u32, power: [Option<f64>; 4]) -> DayPowerPoint {
        DayPowerPoint {
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            power,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = DayPowerSeries {
            date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            points: vec![
                point(8, 0, [Some(10.0), None, Some(0.0), None]),
                point(8, 10, [Some(10.0), None, Some(5.0), None]),
                point(8, 20, [Some(10.0), None, Some(10.0), None]),
            ],
        };

        let txt = render_day_power_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: 2025-07-10 | time=[08:00, 08:20] | power=[-0.50, 10.50] kW\n",
            "GGGGGGGGGG\n",
            "      SS  \n",
            "    SS    \n",
            "  SS      \n",
            "SS        \n",
            "G=Grid  E=Genset  S=Solar  .=Installation\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_day_renders_a_notice() {
        let series = DayPowerSeries {
            date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            points: vec![],
        };
        assert_eq!(render_day_power_plot(&series, 20, 8), "Plot: 2025-07-10 | no readings\n");
    }
}
