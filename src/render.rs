//! Terminal rendering of month views and event lists.
use std::fmt::Write;

use console::style;

use crate::{format_time, Event, MonthView, WEEKDAY_NAMES};

const CELL_WIDTH: usize = 9;

/// Draws the month as a 7-column grid. Each day shows its number and, when
/// it has any, the number of events.
pub fn render_month(view: &MonthView) -> String {
    let width = CELL_WIDTH * 7;
    let mut out = String::new();

    let _ = writeln!(out, "{:^width$}", style(&view.label).bold(), width = width);

    let header: String = WEEKDAY_NAMES
        .iter()
        .map(|name| format!("{:^w$}", &name[..3], w = CELL_WIDTH))
        .collect();
    let _ = writeln!(out, "{}", style(header).dim());

    for row in view.cells.chunks(7) {
        let mut line = String::new();
        for cell in row {
            let Some(day) = cell.cell.day() else {
                line.push_str(&" ".repeat(CELL_WIDTH));
                continue;
            };

            let text = if cell.event_count > 0 {
                format!("{:>2} ({})", day, cell.event_count)
            } else {
                format!("{:>2}", day)
            };
            let padded = format!("{:^w$}", text, w = CELL_WIDTH);

            let styled = if cell.is_selected {
                style(padded).black().on_green()
            } else if cell.is_today {
                style(padded).white().on_blue()
            } else {
                style(padded)
            };
            let _ = write!(line, "{}", styled);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    out
}

/// Lists events, one block per event, colored by type.
pub fn render_events(events: &[&Event]) -> String {
    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);

    let mut out = String::new();
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out, "{}", "-".repeat(term_width.min(50)));
        }

        let _ = writeln!(
            out,
            "{} {}-{} [{}]",
            style(&event.name).bold(),
            format_time(event.start_time),
            format_time(event.end_time),
            style(event.event_type).fg(event.event_type.color())
        );
        let _ = writeln!(out, "Day: {} | ID: {}", event.day_label(), event.id);
        if !event.description.is_empty() {
            let _ = writeln!(out, "\n{}", event.description);
        }
    }

    out
}
