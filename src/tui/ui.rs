//! TUI rendering with ratatui.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, List, ListItem, Paragraph, Wrap,
    },
    Frame,
};

use super::app::TuiState;
use crate::feedback::{get_mascot, get_sparkle_char, get_spinner_frame, Level};
use crate::render::ResultImage;

/// Colours cycled across wheel segments.
const SEGMENT_COLORS: &[Color] = &[
    Color::LightRed,
    Color::LightCyan,
    Color::LightBlue,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightMagenta,
    Color::Cyan,
    Color::Yellow,
];

fn segment_color(index: usize) -> Color {
    SEGMENT_COLORS[index % SEGMENT_COLORS.len()]
}

fn rounded_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_set(symbols::border::ROUNDED)
}

/// Draw the entire TUI as it looks at `now`.
pub fn draw(f: &mut Frame, state: &TuiState, now: Instant) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(f, main_chunks[0], state, now);
    draw_body(f, main_chunks[1], state, now);
    draw_footer(f, main_chunks[2]);
}

fn draw_header(f: &mut Frame, area: Rect, state: &TuiState, now: Instant) {
    let animating = state.is_animating(now);
    let elapsed = state.elapsed_secs();
    let time_str = format!("{:02}:{:02}", (elapsed / 60.0) as u32, (elapsed % 60.0) as u32);
    let sep = Span::styled(" │ ", Style::default().fg(Color::DarkGray));

    let mut spans = vec![
        Span::styled(
            " ◉ ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "cat-roulette",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
    ];

    if animating {
        spans.push(Span::styled(
            format!("{} Spinning", get_spinner_frame("wheel", state.spinner_frame)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled("Ready", Style::default().fg(Color::Green)));
    }

    spans.push(sep.clone());
    spans.push(Span::styled(time_str, Style::default().fg(Color::Blue)));
    spans.push(sep);
    spans.push(Span::styled(
        state.stats.spins.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(" spins", Style::default().fg(Color::DarkGray)));

    if state.stats.errors > 0 {
        spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            format!("{} errors", state.stats.errors),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .border_set(symbols::border::ROUNDED),
    );
    f.render_widget(header, area);
}

fn draw_body(f: &mut Frame, area: Rect, state: &TuiState, now: Instant) {
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Wheel
            Constraint::Length(40), // Sidebar
        ])
        .split(area);

    draw_wheel(f, body_chunks[0], state, now);
    draw_sidebar(f, body_chunks[1], state, now);
}

/// Draw the wheel. Segment `i` is centred `angle + i * seg` degrees
/// clockwise from the top, where the pointer sits.
fn draw_wheel(f: &mut Frame, area: Rect, state: &TuiState, now: Instant) {
    let angle = state.display_angle(now);
    let count = state.labels.len();
    let highlighted = state.highlighted;

    let canvas = Canvas::default()
        .block(rounded_block(" Wheel "))
        .marker(symbols::Marker::Braille)
        .x_bounds([-1.3, 1.3])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
                color: Color::Gray,
            });
            if count == 0 {
                ctx.print(-0.3, 0.0, Span::styled("(empty)", Style::default().fg(Color::DarkGray)));
                return;
            }

            let seg = 360.0 / count as f64;
            for i in 0..count {
                let edge = (angle + i as f64 * seg - seg / 2.0).to_radians();
                ctx.draw(&CanvasLine::new(0.0, 0.0, edge.sin(), edge.cos(), Color::DarkGray));
            }
            ctx.layer();

            for i in 0..count {
                let centre = (angle + i as f64 * seg).to_radians();
                let mut style = Style::default().fg(segment_color(i));
                if highlighted == Some(i) {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(
                    0.7 * centre.sin(),
                    0.7 * centre.cos(),
                    Span::styled((i + 1).to_string(), style),
                );
            }
            ctx.print(
                0.0,
                1.18,
                Span::styled(
                    "▼",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            );
        });

    f.render_widget(canvas, area);
}

fn draw_sidebar(f: &mut Frame, area: Rect, state: &TuiState, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Result
            Constraint::Min(6),    // Segments
            Constraint::Length(8), // Log
        ])
        .split(area);

    draw_result_panel(f, chunks[0], state);
    draw_segments_panel(f, chunks[1], state, now);
    draw_log_panel(f, chunks[2], state);
}

fn draw_result_panel(f: &mut Frame, area: Rect, state: &TuiState) {
    let width = area.width.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = Vec::new();

    match &state.result {
        None => {
            for art in get_mascot("waiting").lines() {
                lines.push(Line::from(Span::styled(
                    art.to_string(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(Span::styled(
                "Press space to spin!",
                Style::default().fg(Color::White),
            )));
        }
        Some(result) => {
            let mascot = if result.has_real_image() {
                "winner"
            } else {
                "fallback"
            };
            for art in get_mascot(mascot).lines() {
                lines.push(Line::from(Span::styled(
                    art.to_string(),
                    Style::default().fg(Color::Magenta),
                )));
            }
            let sparkle = get_sparkle_char(state.spinner_frame);
            lines.push(Line::from(vec![
                Span::styled(format!("{sparkle} "), Style::default().fg(Color::Yellow)),
                Span::styled(
                    truncate_line(&format!("You got: {}", result.caption()), width),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            let (detail, color) = match &result.image {
                ResultImage::Loaded(handle) => (
                    format!("{} ({} bytes, {})", handle.location, handle.len(), handle.media_type),
                    Color::Green,
                ),
                ResultImage::Placeholder(_) => {
                    (format!("placeholder for {}", result.asset_ref), Color::Yellow)
                }
                ResultImage::TextOnly => ("no image".to_string(), Color::Red),
            };
            lines.push(Line::from(Span::styled(
                truncate_line(&detail, width),
                Style::default().fg(color),
            )));
        }
    }

    let panel = Paragraph::new(lines).block(rounded_block(" Result "));
    f.render_widget(panel, area);
}

fn draw_segments_panel(f: &mut Frame, area: Rect, state: &TuiState, now: Instant) {
    let width = area.width.saturating_sub(8) as usize;
    let under_pointer = state.pointer_index(now);

    let items: Vec<ListItem> = state
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let marker = if under_pointer == Some(i) { "▶" } else { " " };
            let mut style = Style::default().fg(segment_color(i));
            if state.highlighted == Some(i) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}{:>2} ", i + 1), Style::default().fg(Color::White)),
                Span::styled(truncate_line(label, width), style),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(rounded_block(" Segments ")), area);
}

fn draw_log_panel(f: &mut Frame, area: Rect, state: &TuiState) {
    let visible = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(4) as usize;

    let lines: Vec<Line> = state
        .log
        .iter()
        .skip(state.log.len().saturating_sub(visible))
        .map(|(level, message)| {
            let color = match level {
                Level::Error => Color::Red,
                Level::Warning => Color::Yellow,
                Level::Success => Color::Green,
                Level::Progress => Color::Cyan,
                Level::Info => Color::White,
            };
            Line::from(Span::styled(truncate_line(message, width), Style::default().fg(color)))
        })
        .collect();

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(rounded_block(" Log "));
    f.render_widget(panel, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::DarkGray);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" space", key),
        Span::styled(" spin  ", text),
        Span::styled("r", key),
        Span::styled(" retry images  ", text),
        Span::styled("q", key),
        Span::styled(" quit", text),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .border_set(symbols::border::ROUNDED),
    );
    f.render_widget(footer, area);
}

/// Truncate a line to fit within max width.
fn truncate_line(line: &str, max_width: usize) -> String {
    if line.chars().count() <= max_width {
        line.to_string()
    } else if max_width <= 3 {
        line.chars().take(max_width).collect()
    } else {
        let truncated: String = line.chars().take(max_width - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayedResult;
    use crate::tui::TuiEvent;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(state: &TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        let now = Instant::now();
        terminal.draw(|f| draw(f, state, now)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn state() -> TuiState {
        TuiState::new(vec!["Orange tabby".into(), "Teal cat".into(), "Persian".into()])
    }

    #[test]
    fn test_idle_screen_lists_segments_and_keys() {
        let text = screen(&state());
        assert!(text.contains("cat-roulette"));
        assert!(text.contains("Ready"));
        assert!(text.contains("Orange tabby"));
        assert!(text.contains("Persian"));
        assert!(text.contains("Press space to spin!"));
        assert!(text.contains("retry images"));
    }

    #[test]
    fn test_result_screen_shows_caption() {
        let mut state = state();
        state.apply(TuiEvent::Highlight(1));
        state.apply(TuiEvent::Result(DisplayedResult {
            item_id: 2,
            label: "Teal cat".into(),
            asset_ref: "cat2.svg".into(),
            image: ResultImage::TextOnly,
        }));

        let text = screen(&state);
        assert!(text.contains("You got: Teal cat (Image not"));
        assert!(text.contains("no image"));
        assert!(text.contains("1 spins"));
    }

    #[test]
    fn test_empty_wheel_draws() {
        let text = screen(&TuiState::new(Vec::new()));
        assert!(text.contains("(empty)"));
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("short", 10), "short");
        assert_eq!(truncate_line("a longer line", 8), "a lon...");
        assert_eq!(truncate_line("abcdef", 2), "ab");
    }
}
