//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for the analysis period and the report
//! contents, then renders the summary tables and a power/energy chart.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate, Timelike};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::{self, AppState, PeriodAnalysis, ReportRequest};
use crate::chart::{
    Rgb, SOLAR_COLOR, SvgChartRenderer, THEORETICAL_COLOR, channel_color,
};
use crate::cli::TuiArgs;
use crate::domain::{Channel, ReportConfig, StatusSynonyms};
use crate::error::{AnalysisError, AppError};
use crate::io::ingest::IngestOptions;

mod plotters_chart;

use plotters_chart::{ChartLine, SeriesChart, Stroke};

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_DAY: usize = 2;

/// Start the TUI.
pub fn run(args: TuiArgs, synonyms: StatusSynonyms) -> Result<(), AppError> {
    // Pick the file before the terminal switches to raw mode.
    let path = match args.file {
        Some(path) => path,
        None => crate::cli::picker::prompt_for_data_path(&IngestOptions {
            synonyms: synonyms.clone(),
        })?,
    };

    let mut state = AppState::new(args.site, synonyms);
    state.load(&path)?;
    let mut app = App::new(state, args.logo);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartMode {
    DayPower,
    HourlySolar,
}

struct App {
    state: AppState,
    logo: Option<PathBuf>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    day: Option<NaiveDate>,
    report_config: ReportConfig,
    chart_mode: ChartMode,
    date_input: String,
    selected_field: usize,
    editing_date: bool,
    status: String,
    analysis: Option<PeriodAnalysis>,
}

impl App {
    fn new(state: AppState, logo: Option<PathBuf>) -> Self {
        let (start, end) = match state.dataset() {
            Some(ds) => (ds.min_date(), ds.max_date()),
            None => (None, None),
        };
        let mut app = Self {
            state,
            logo,
            start,
            end,
            day: None,
            report_config: ReportConfig::default(),
            chart_mode: ChartMode::DayPower,
            date_input: String::new(),
            selected_field: FIELD_START,
            editing_date: false,
            status: String::new(),
            analysis: None,
        };
        app.recompute();
        if app.analysis.is_some() {
            app.status = "Ready.".to_string();
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_DAY {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                self.editing_date = true;
                self.date_input = self.field_value(self.selected_field).map(|d| d.to_string()).unwrap_or_default();
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('t') => {
                self.chart_mode = match self.chart_mode {
                    ChartMode::DayPower => ChartMode::HourlySolar,
                    ChartMode::HourlySolar => ChartMode::DayPower,
                };
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(on) = self.report_config.toggle(idx)
                    && let Some((label, _)) = self.report_config.flag(idx)
                {
                    let state = if on { "on" } else { "off" };
                    self.status = format!("{}: {state}", label.trim());
                }
            }
            KeyCode::Char('g') => self.generate_report(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn field_value(&self, field: usize) -> Option<NaiveDate> {
        match field {
            FIELD_START => self.start,
            FIELD_END => self.end,
            _ => self.day,
        }
    }

    fn set_field(&mut self, field: usize, value: Option<NaiveDate>) {
        match field {
            FIELD_START => self.start = value,
            FIELD_END => self.end = value,
            _ => self.day = value,
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        let next = if self.selected_field == FIELD_DAY {
            let days = self.analysis.as_ref().map(|a| a.days.as_slice()).unwrap_or_default();
            step_day(days, self.day, delta)
        } else {
            let Some(ds) = self.state.dataset() else {
                return;
            };
            let (Some(min), Some(max)) = (ds.min_date(), ds.max_date()) else {
                return;
            };
            self.field_value(self.selected_field)
                .map(|d| step_date(d, delta, min, max))
        };

        if next != self.field_value(self.selected_field) {
            self.set_field(self.selected_field, next);
            self.recompute();
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim();
        if trimmed.is_empty() {
            // An empty start/end falls back to the dataset bounds.
            self.set_field(self.selected_field, None);
        } else {
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => self.set_field(self.selected_field, Some(date)),
                Err(e) => {
                    self.status = format!("Invalid date '{trimmed}': {e}");
                    return;
                }
            }
        }
        self.recompute();
    }

    /// Re-run the analysis for the current selection.
    ///
    /// A reversed period leaves no analysis behind, so nothing stale is shown.
    fn recompute(&mut self) {
        let result = match pipeline::require_dataset(&self.state) {
            Ok(ds) => pipeline::analyze(ds, self.start, self.end, self.day),
            Err(e) => Err(e),
        };

        match result {
            Ok(analysis) => {
                self.start = Some(analysis.period.start());
                self.end = Some(analysis.period.end());
                self.day = analysis.day;
                self.status = format!(
                    "Period {} → {}: {} readings.",
                    analysis.period.start(),
                    analysis.period.end(),
                    analysis.aggregates.rows
                );
                self.analysis = Some(analysis);
            }
            Err(err @ AnalysisError::Period { .. }) => {
                warn!(%err, "period rejected");
                self.status = err.to_string();
                self.analysis = None;
            }
            Err(err) => {
                self.status = format!("Analysis failed: {err}");
                self.analysis = None;
            }
        }
    }

    fn generate_report(&mut self) {
        let Some(analysis) = &self.analysis else {
            self.status = "No analysis to report on; fix the period first.".to_string();
            return;
        };
        let request = ReportRequest {
            site: self.state.site.clone(),
            logo: self.logo.clone(),
            out: None,
            config: self.report_config,
        };
        self.status = match pipeline::generate_report(analysis, &request, &SvgChartRenderer::default()) {
            Ok(path) => {
                info!(path = %path.display(), "report generated from the TUI");
                format!("Report written to {}", path.display())
            }
            Err(err) => format!("Report failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("site-analyzer", Style::default().fg(Color::Cyan)),
            Span::raw(format!("  Analysis report {}", self.state.site)),
        ]));

        if let Some(data) = &self.state.data {
            lines.push(Line::from(Span::styled(
                format!(
                    "file: {} | rows: {} | import warnings: {}",
                    data.source,
                    data.rows_read,
                    data.warnings.len()
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let period = match &self.analysis {
            Some(a) => format!(
                "Analysis period: {} → {} | readings: {} | day: {}",
                a.period.start(),
                a.period.end(),
                a.aggregates.rows,
                a.day.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
            ),
            None => "Analysis period: -".to_string(),
        };
        lines.push(Line::from(Span::styled(period, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(11)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        self.draw_tables(frame, top[0]);
        self.draw_chart(frame, top[1]);
        self.draw_settings(frame, bottom[0]);
        self.draw_report_flags(frame, bottom[1]);
    }

    fn draw_tables(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Summary").borders(Borders::ALL);
        let text = match &self.analysis {
            Some(a) => {
                let mut text = crate::report::format_table("Energy production", &a.synthesis);
                text.push_str(&crate::report::format_table("Dominant status", &a.dominant));
                text.push_str(&crate::report::format_distribution(&a.aggregates.distribution));
                text
            }
            None => "No analysis for the selected period.".to_string(),
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (title, legend) = match self.chart_mode {
            ChartMode::DayPower => {
                let day = self.day.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
                let legend = Channel::ALL
                    .iter()
                    .map(|&c| (c.label(), channel_color(c)))
                    .collect::<Vec<_>>();
                (format!("Power by source on {day} "), legend)
            }
            ChartMode::HourlySolar => (
                "Solar energy by hour ".to_string(),
                vec![("Actual", SOLAR_COLOR), ("Theoretical", THEORETICAL_COLOR)],
            ),
        };
        let mut spans = vec![Span::raw(title)];
        for (label, color) in legend {
            spans.push(Span::styled(format!("■ {label} "), Style::default().fg(term_color(color))));
        }

        let block = Block::default().title(Line::from(spans)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(analysis) = &self.analysis else {
            let msg = Paragraph::new("No data for this period").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (lines, x_bounds, x_label, y_label) = match self.chart_mode {
            ChartMode::DayPower => (day_power_lines(analysis), [0.0, 24.0], "time (h)", "kW"),
            ChartMode::HourlySolar => (hourly_solar_lines(analysis), [-0.5, 23.5], "hour", "kWh"),
        };
        let Some(y_bounds) = value_bounds(&lines) else {
            let msg = Paragraph::new("No data for this period").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = SeriesChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            x_label,
            y_label,
            fmt_x: fmt_axis_hour,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let labels = ["Start", "End", "Day"];
        let items = labels
            .iter()
            .enumerate()
            .map(|(field, label)| {
                let value = if self.editing_date && field == self.selected_field {
                    format!("{}_", self.date_input)
                } else {
                    self.field_value(field).map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
                };
                ListItem::new(format!("{label}: {value}"))
            })
            .collect::<Vec<_>>();

        let list = List::new(items)
            .block(Block::default().title("Period").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_report_flags(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = (0..ReportConfig::FLAG_COUNT)
            .filter_map(|idx| self.report_config.flag(idx).map(|flag| (idx, flag)))
            .map(|(idx, (label, on))| {
                let mark = if on { "[x]" } else { "[ ]" };
                let style = if on {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(format!("{} {mark} {label}", idx + 1)).style(style)
            })
            .collect::<Vec<_>>();

        let list = List::new(items).block(Block::default().title("Report contents").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ ±1 day  Enter edit  t chart  1-9 report items  g report  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move `date` by `delta` days, staying within `[min, max]`.
fn step_date(date: NaiveDate, delta: i64, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    let moved = if delta >= 0 {
        date.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    moved.unwrap_or(date).clamp(min, max)
}

/// Neighbouring day with readings, staying on the first/last one.
fn step_day(days: &[NaiveDate], current: Option<NaiveDate>, delta: i64) -> Option<NaiveDate> {
    let last = days.len().checked_sub(1)?;
    let idx = current
        .and_then(|d| days.iter().position(|&x| x == d))
        .unwrap_or(0);
    let next = if delta >= 0 {
        (idx + delta.unsigned_abs() as usize).min(last)
    } else {
        idx.saturating_sub(delta.unsigned_abs() as usize)
    };
    days.get(next).copied()
}

fn day_power_lines(analysis: &PeriodAnalysis) -> Vec<ChartLine> {
    let Some(series) = &analysis.day_series else {
        return Vec::new();
    };
    Channel::ALL
        .iter()
        .map(|&c| ChartLine {
            points: series
                .points
                .iter()
                .filter_map(|p| {
                    let hours = p.time.num_seconds_from_midnight() as f64 / 3600.0;
                    p.power(c).map(|v| (hours, v))
                })
                .collect(),
            color: plot_color(channel_color(c)),
            stroke: Stroke::Line,
        })
        .filter(|line| !line.points.is_empty())
        .collect()
}

fn hourly_solar_lines(analysis: &PeriodAnalysis) -> Vec<ChartLine> {
    if analysis.hourly.is_empty() {
        return Vec::new();
    }
    vec![
        ChartLine {
            points: analysis.hourly.iter().map(|h| (h.hour as f64, h.actual)).collect(),
            color: plot_color(SOLAR_COLOR),
            stroke: Stroke::Bars,
        },
        ChartLine {
            points: analysis.hourly.iter().map(|h| (h.hour as f64, h.theoretical)).collect(),
            color: plot_color(THEORETICAL_COLOR),
            stroke: Stroke::Line,
        },
    ]
}

/// Y range covering every point and zero, padded by 5%.
fn value_bounds(lines: &[ChartLine]) -> Option<[f64; 2]> {
    let (mut y_min, mut y_max) = (0.0_f64, f64::NEG_INFINITY);
    for &(_, y) in lines.iter().flat_map(|l| l.points.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let pad = (y_max - y_min) * 0.05;
    Some([y_min - if y_min < 0.0 { pad } else { 0.0 }, y_max + pad])
}

fn plot_color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

fn fmt_axis_hour(v: f64) -> String {
    format!("{:02.0}h", v.max(0.0))
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example_csv;
    use crate::io::ingest::{IngestOptions, SourceFormat, parse_bytes};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn app() -> App {
        let csv = example_csv().unwrap();
        let data = parse_bytes(csv.as_bytes(), SourceFormat::Delimited, &IngestOptions::default()).unwrap();
        let mut state = AppState::new("Test site", StatusSynonyms::default());
        state.data = Some(data);
        App::new(state, None)
    }

    #[test]
    fn starts_on_the_full_dataset_range() {
        let app = app();
        let analysis = app.analysis.as_ref().unwrap();
        assert_eq!(analysis.aggregates.rows, 4);
        assert_eq!(app.start, Some(date("2025-07-10")));
        assert_eq!(app.day, Some(date("2025-07-10")));
    }

    #[test]
    fn arrow_keys_step_dates_within_the_dataset() {
        let mut app = app();
        app.handle_key(KeyCode::Left);
        assert_eq!(app.start, Some(date("2025-07-10")));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.start, Some(date("2025-07-11")));
        assert_eq!(app.analysis.as_ref().unwrap().aggregates.rows, 3);
    }

    #[test]
    fn reversed_period_clears_the_analysis() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.date_input = "2025-12-31".to_string();
        app.handle_key(KeyCode::Enter);
        assert!(app.analysis.is_none());
        assert!(app.status.contains("must be on or after"));
    }

    #[test]
    fn number_keys_toggle_report_items() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('4')));
        assert!(!app.report_config.operating_status);
        app.handle_key(KeyCode::Char('4'));
        assert!(app.report_config.operating_status);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn day_steps_through_days_with_readings() {
        let days = [date("2025-07-10"), date("2025-08-18"), date("2025-10-10")];
        assert_eq!(step_day(&days, Some(days[0]), 1), Some(days[1]));
        assert_eq!(step_day(&days, Some(days[2]), 1), Some(days[2]));
        assert_eq!(step_day(&days, Some(days[0]), -1), Some(days[0]));
        assert_eq!(step_day(&[], None, 1), None);
    }

    #[test]
    fn hourly_chart_lines_have_a_zero_based_range() {
        let app = app();
        let lines = hourly_solar_lines(app.analysis.as_ref().unwrap());
        assert_eq!(lines.len(), 2);
        let [lo, hi] = value_bounds(&lines).unwrap();
        assert_eq!(lo, 0.0);
        assert!(hi > 3.0);
    }
}
