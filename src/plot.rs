// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Scatter plot of screen power (x) against battery temperature (y)
//!
//! Rendered in the terminal with ratatui; [`show`] takes over the screen
//! until the user presses `q`, `Esc` or `Ctrl+C`.

use std::io;
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use crate::error::{Result, ScreenNoiseError};
use crate::pipeline::ScatterPoint;

pub const TITLE: &str = "Screen Power vs. Battery Temperature";

/// Axis range covering `values`, padded so edge points stay visible.
pub fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if min == max {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * 0.05;
    [min - pad, max + pad]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect()
}

/// Draw the scatter plot into `area`.
pub fn render_scatter(frame: &mut Frame, area: Rect, points: &[ScatterPoint]) {
    let [chart_area, help_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let data: Vec<(f64, f64)> = points.iter().map(|p| (p.screen, p.temperature)).collect();
    let x_bounds = axis_bounds(points.iter().map(|p| p.screen));
    let y_bounds = axis_bounds(points.iter().map(|p| p.temperature));

    let dataset = Dataset::default()
        .name(format!("{} groupings", points.len()))
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(TITLE).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Screen Power")
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("Temperature")
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    frame.render_widget(chart, chart_area);
    frame.render_widget(
        Paragraph::new("q/Esc: quit").style(Style::default().fg(Color::DarkGray)),
        help_area,
    );
}

/// Panic hook that restores the terminal, in place until dropped.
///
/// Dropping it reinstates whatever hook was active before.
struct RestoreHook {
    previous: Arc<PanicHook>,
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

impl RestoreHook {
    fn install() -> Self {
        let previous: Arc<PanicHook> = Arc::new(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            chained(panic_info);
        }));
        Self { previous }
    }
}

impl Drop for RestoreHook {
    fn drop(&mut self) {
        let previous = Arc::clone(&self.previous);
        let _ = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| previous(panic_info)));
    }
}

/// Show the plot until the user quits.
pub fn show(points: &[ScatterPoint]) -> Result<()> {
    let _hook = RestoreHook::install();

    enable_raw_mode()?;
    let mut terminal = match enter_screen() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let result = run_display(&mut terminal, points);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal
        .show_cursor()
        .map_err(|e| ScreenNoiseError::Tui(e.to_string()))?;

    result
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        ScreenNoiseError::Tui(e.to_string())
    })
}

fn run_display(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    points: &[ScatterPoint],
) -> Result<()> {
    loop {
        terminal
            .draw(|f| render_scatter(f, f.area(), points))
            .map_err(|e| ScreenNoiseError::Tui(e.to_string()))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let ctrl_c =
                    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
                if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    return Ok(());
                }
            }
        }
    }
}

/// Plain-text listing of the points, for non-interactive runs.
pub fn format_points(points: &[ScatterPoint]) -> String {
    let mut out = format!("{:>8}  {:>12}  {:>12}\n", "grouping", "screen_mAh", "temperature");
    for p in points {
        out.push_str(&format!(
            "{:>8}  {:>12.3}  {:>12.1}\n",
            p.index, p.screen, p.temperature
        ));
    }
    out
}
