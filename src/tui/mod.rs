//! Ratatui-based interactive form.
//!
//! The form collects an address, a summary length, the indicators to include
//! and the summary language(s). Generating runs the shared pipeline and switches
//! to a results view that pairs each indicator's chart with its paragraph(s),
//! followed by a page with the concluding paragraph(s).

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::pipeline::{self, SummaryRun};
use crate::cli::TuiArgs;
use crate::config::Settings;
use crate::data::{EurostatClient, GeocodeClient};
use crate::domain::{IndicatorKind, ObservationSeries, SummaryLanguages, SummaryRequest, WordCount};
use crate::error::AppError;
use crate::narrative::OpenAiClient;
use crate::report::format::{conclusion_heading, summary_heading};

mod plotters_chart;

use plotters_chart::SeriesPlottersChart;

/// Start the TUI.
pub fn run(settings: &Settings, args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(settings, args)?;

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

/// Form rows, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Address,
    Words,
    Indicator(IndicatorKind),
    Languages,
}

const FIELDS: [Field; 6] = [
    Field::Address,
    Field::Words,
    Field::Indicator(IndicatorKind::Hicp),
    Field::Indicator(IndicatorKind::Gdp),
    Field::Indicator(IndicatorKind::Unemployment),
    Field::Languages,
];

/// Editable form state (no I/O).
#[derive(Debug, Clone)]
struct Form {
    address: String,
    word_count: WordCount,
    selected: Vec<IndicatorKind>,
    languages: SummaryLanguages,
    field: usize,
    editing_address: bool,
}

impl Form {
    fn new(args: &TuiArgs) -> Self {
        Self {
            address: args.address.clone().unwrap_or_default(),
            word_count: WordCount::default(),
            selected: Vec::new(),
            languages: if args.bilingual {
                SummaryLanguages::Both
            } else {
                SummaryLanguages::English
            },
            field: 0,
            editing_address: false,
        }
    }

    fn current(&self) -> Field {
        FIELDS[self.field]
    }

    fn up(&mut self) {
        self.field = self.field.saturating_sub(1);
    }

    fn down(&mut self) {
        if self.field + 1 < FIELDS.len() {
            self.field += 1;
        }
    }

    fn adjust(&mut self, delta: i32) {
        match self.current() {
            Field::Words => {
                self.word_count = if delta >= 0 {
                    self.word_count.step_up()
                } else {
                    self.word_count.step_down()
                };
            }
            Field::Languages => {
                self.languages = if delta >= 0 {
                    self.languages.next()
                } else {
                    self.languages.prev()
                };
            }
            Field::Indicator(kind) => self.toggle(kind),
            Field::Address => {}
        }
    }

    fn toggle(&mut self, kind: IndicatorKind) {
        if let Some(pos) = self.selected.iter().position(|k| *k == kind) {
            self.selected.remove(pos);
        } else {
            self.selected.push(kind);
        }
    }

    fn is_selected(&self, kind: IndicatorKind) -> bool {
        self.selected.contains(&kind)
    }

    fn request(&self) -> Result<SummaryRequest, String> {
        SummaryRequest::new(self.address.clone(), self.word_count, &self.selected, self.languages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Form,
    /// Page `i < n` shows indicator `i`; page `n` shows the conclusions.
    Results(usize),
}

struct App {
    form: Form,
    view: View,
    status: String,
    pending_generate: bool,
    geocoder: GeocodeClient,
    source: EurostatClient,
    narrator: OpenAiClient,
    run: Option<SummaryRun>,
}

impl App {
    fn new(settings: &Settings, args: TuiArgs) -> Result<Self, AppError> {
        let narrator = OpenAiClient::new(settings)?;
        let status = if narrator.has_api_key() {
            "Fill in the form and press g to generate.".to_string()
        } else {
            "OPENAI_API_KEY is not set; generating will fail.".to_string()
        };
        Ok(Self {
            form: Form::new(&args),
            view: View::Form,
            status,
            pending_generate: false,
            geocoder: GeocodeClient::new(settings)?,
            source: EurostatClient::new(settings)?,
            narrator,
            run: None,
        })
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

            // Run after the "Generating..." status has been drawn.
            if self.pending_generate {
                self.pending_generate = false;
                self.generate();
                needs_redraw = true;
                continue;
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
        if self.form.editing_address {
            self.handle_address_edit(code);
            return false;
        }

        match self.view {
            View::Form => self.handle_form_key(code),
            View::Results(page) => self.handle_results_key(code, page),
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.form.up(),
            KeyCode::Down => self.form.down(),
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Char(' ') => {
                if let Field::Indicator(kind) = self.form.current() {
                    self.form.toggle(kind);
                }
            }
            KeyCode::Enter => match self.form.current() {
                Field::Address => {
                    self.form.editing_address = true;
                    self.status = "Editing address. Enter to apply, Esc to finish.".to_string();
                }
                Field::Indicator(kind) => self.form.toggle(kind),
                _ => {}
            },
            KeyCode::Char('g') => self.request_generate(),
            KeyCode::Tab => {
                if self.run.is_some() {
                    self.view = View::Results(0);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_results_key(&mut self, code: KeyCode, page: usize) -> bool {
        let last_page = self.run.as_ref().map(|r| r.series.len()).unwrap_or(0);
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Left | KeyCode::Up => self.view = View::Results(page.saturating_sub(1)),
            KeyCode::Right | KeyCode::Down => self.view = View::Results((page + 1).min(last_page)),
            KeyCode::Tab | KeyCode::Esc => self.view = View::Form,
            KeyCode::Char('g') => {
                self.view = View::Form;
                self.request_generate();
            }
            _ => {}
        }
        false
    }

    fn handle_address_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.form.editing_address = false;
                self.status = format!("address: {}", self.form.address.trim());
            }
            KeyCode::Backspace => {
                self.form.address.pop();
            }
            KeyCode::Char(c) => self.form.address.push(c),
            _ => {}
        }
    }

    fn request_generate(&mut self) {
        match self.form.request() {
            Ok(_) => {
                self.status = "Generating summary...".to_string();
                self.pending_generate = true;
            }
            Err(msg) => self.status = msg,
        }
    }

    fn generate(&mut self) {
        let request = match self.form.request() {
            Ok(r) => r,
            Err(msg) => {
                self.status = msg;
                return;
            }
        };

        let today = Local::now().date_naive();
        match pipeline::run_summary(&self.geocoder, &self.source, &self.narrator, &request, today) {
            Ok(run) => {
                self.status = format!("Summary ready for {}.", run.country);
                self.run = Some(run);
                self.view = View::Results(0);
            }
            Err(e) => {
                self.status = format!("❌ Error: {e}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Form => self.draw_form(frame, chunks[1]),
            View::Results(page) => self.draw_results(frame, chunks[1], page),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let country = self
            .run
            .as_ref()
            .map(|r| r.country.to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = Line::from(vec![
            Span::styled("Macroeconomic Summary Generator", Style::default().fg(Color::Cyan)),
            Span::raw(" (HICP + GDP + Unemployment)"),
            Span::styled(format!(" | country: {country}"), Style::default().fg(Color::Gray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FIELDS
            .iter()
            .map(|field| {
                let text = match *field {
                    Field::Address => {
                        let cursor = if self.form.editing_address { "▏" } else { "" };
                        format!("European address: {}{cursor}", self.form.address)
                    }
                    Field::Words => format!("Words in summary: ◂ {} ▸", self.form.word_count),
                    Field::Indicator(kind) => {
                        let mark = if self.form.is_selected(kind) { "[x]" } else { "[ ]" };
                        format!("{mark} {}", kind.display_name())
                    }
                    Field::Languages => {
                        format!("Summary language: ◂ {} ▸", self.form.languages.display_name())
                    }
                };
                ListItem::new(text)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.form.field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect, page: usize) {
        let Some(run) = &self.run else {
            let msg = Paragraph::new("No results yet.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, area);
            return;
        };

        let Some(series) = run.series.get(page) else {
            self.draw_conclusion(frame, area, run);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        self.draw_chart(frame, chunks[0], series);

        let kind = series.indicator;
        let mut lines: Vec<Line> = Vec::new();
        for narrative in &run.narratives {
            lines.push(Line::from(Span::styled(
                summary_heading(narrative.language),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(narrative.section(kind).unwrap_or("-").to_string()));
            lines.push(Line::default());
        }
        let title = format!("{} ({}/{})", kind.display_name(), page + 1, run.series.len());
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_conclusion(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &SummaryRun) {
        let mut lines: Vec<Line> = Vec::new();
        for narrative in &run.narratives {
            lines.push(Line::from(Span::styled(
                conclusion_heading(narrative.language),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(narrative.conclusion.clone()));
            lines.push(Line::default());
        }
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Final Conclusion").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, series: &ObservationSeries) {
        let spec = series.indicator.spec();
        let block = Block::default().title(spec.title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = chart_series(series) else {
            let msg = Paragraph::new("No observations in the last five years.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = SeriesPlottersChart {
            points: &data.points,
            periods: &data.periods,
            color: spec.chart_color,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            y_label: "value",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.view {
            View::Form => "↑/↓ select  ←/→ adjust  Enter edit/toggle  g generate  Tab results  q quit",
            View::Results(_) => "←/→ page  Tab form  g regenerate  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Prepared chart data for one series.
struct ChartData {
    points: Vec<(f64, f64)>,
    periods: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(series: &ObservationSeries) -> Option<ChartData> {
    let (y_min, y_max) = series.value_range()?;
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .filter(|(_, o)| o.value.is_finite())
        .map(|(i, o)| (i as f64, o.value))
        .collect();
    let periods = series.points.iter().map(|o| o.period.to_string()).collect();

    let x_max = (series.len().saturating_sub(1) as f64).max(1.0);
    let pad = ((y_max - y_min).abs() * 0.05).max(0.5);

    Some(ChartData {
        points,
        periods,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, PeriodLabel};

    #[test]
    fn form_navigation_and_adjustment() {
        let mut form = Form::new(&TuiArgs::default());
        assert_eq!(form.current(), Field::Address);
        form.up();
        assert_eq!(form.field, 0);

        form.down();
        form.adjust(1);
        form.adjust(1);
        assert_eq!(form.word_count.get(), 200);

        form.down();
        form.adjust(1);
        assert!(form.is_selected(IndicatorKind::Hicp));
        form.adjust(1);
        assert!(!form.is_selected(IndicatorKind::Hicp));

        for _ in 0..10 {
            form.down();
        }
        assert_eq!(form.current(), Field::Languages);
        form.adjust(1);
        assert_eq!(form.languages, SummaryLanguages::Spanish);
    }

    #[test]
    fn form_requires_address_and_indicator() {
        let mut form = Form::new(&TuiArgs {
            address: Some("Amsterdam, Netherlands".to_string()),
            bilingual: true,
        });
        assert!(form.request().is_err());

        form.toggle(IndicatorKind::Unemployment);
        form.toggle(IndicatorKind::Hicp);
        let req = form.request().unwrap();
        assert_eq!(req.indicators, vec![IndicatorKind::Hicp, IndicatorKind::Unemployment]);
        assert_eq!(req.languages, SummaryLanguages::Both);
    }

    #[test]
    fn chart_series_indexes_periods() {
        let series = ObservationSeries {
            indicator: IndicatorKind::Gdp,
            points: vec![
                Observation { period: PeriodLabel::quarter(2024, 1).unwrap(), value: 10.0 },
                Observation { period: PeriodLabel::quarter(2024, 2).unwrap(), value: 20.0 },
                Observation { period: PeriodLabel::quarter(2024, 3).unwrap(), value: 15.0 },
            ],
        };
        let data = chart_series(&series).unwrap();
        assert_eq!(data.points, vec![(0.0, 10.0), (1.0, 20.0), (2.0, 15.0)]);
        assert_eq!(data.periods[2], "2024-Q3");
        assert_eq!(data.x_bounds, [0.0, 2.0]);
        assert!(data.y_bounds[0] < 10.0 && data.y_bounds[1] > 20.0);

        let empty = ObservationSeries {
            indicator: IndicatorKind::Gdp,
            points: vec![],
        };
        assert!(chart_series(&empty).is_none());
    }
}
