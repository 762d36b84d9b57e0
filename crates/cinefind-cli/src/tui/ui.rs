//! TUI rendering logic for the movie browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use cinefind_api::tmdb::TmdbMovieDetails;

use super::state::{BrowserState, Focus, RequestState};

/// Number of cast members listed in the detail overlay.
const TOP_CAST: usize = 5;

/// Formats a vote average with one decimal, or `N/A` when unrated.
fn fmt_rating(vote_average: f64) -> String {
    if vote_average > 0.0 {
        format!("{vote_average:.1}")
    } else {
        String::from("N/A")
    }
}

/// Formats a runtime in minutes as `2h 28m`.
#[allow(clippy::arithmetic_side_effects)]
fn fmt_runtime(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut BrowserState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search box
            Constraint::Length(3), // trending strip
            Constraint::Min(5),    // movie list
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_search_box(frame, chunks[0], state);
    draw_trending(frame, chunks[1], state);
    draw_movie_list(frame, chunks[2], state);
    draw_footer(frame, chunks[3], state);

    if state.details_open() {
        let area = frame.area();
        draw_details(frame, area, state);
    }
}

/// Draws the search box with the spinner while anything is loading.
fn draw_search_box(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let focused = state.focus == Focus::Search && !state.details_open();
    let mut spans = vec![Span::raw(state.input.as_str())];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    }
    if state.input.is_empty() && !focused {
        spans = vec![Span::styled(
            "Search through thousands of movies",
            Style::default().fg(Color::DarkGray),
        )];
    }

    let title = if state.is_busy() {
        format!(" Search {} ", state.spinner())
    } else {
        String::from(" Search ")
    };

    let search = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style(focused)),
    );
    frame.render_widget(search, area);
}

/// Draws the trending strip as a single line of ranked terms.
fn draw_trending(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let focused = state.focus == Focus::Trending && !state.details_open();
    let line = match &state.trending {
        RequestState::Idle | RequestState::Loading => Line::from(Span::styled(
            format!("{} loading", state.spinner()),
            Style::default().fg(Color::DarkGray),
        )),
        RequestState::Loaded(entries) if entries.is_empty() => Line::from(Span::styled(
            "No trending searches yet",
            Style::default().fg(Color::DarkGray),
        )),
        RequestState::Loaded(entries) => {
            let mut spans = Vec::with_capacity(entries.len().saturating_mul(2));
            for (i, entry) in entries.iter().enumerate() {
                let style = if focused && i == state.trending_cursor {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Yellow)
                };
                spans.push(Span::styled(
                    format!(" {}. {} ", i.saturating_add(1), entry.title),
                    style,
                ));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        }
        RequestState::Failed(message) => Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )),
    };

    let trending = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Trending ")
            .border_style(border_style(focused)),
    );
    frame.render_widget(trending, area);
}

/// Draws the movie list (cards as table rows), or the list flow's status.
fn draw_movie_list(frame: &mut Frame, area: Rect, state: &mut BrowserState) {
    let focused = state.focus == Focus::Movies && !state.details_open();
    let title = if state.input.trim().is_empty() {
        String::from(" Popular ")
    } else {
        format!(" Results: {} ", state.input.trim())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(focused));

    let movies = match &state.movies {
        RequestState::Idle => {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        }
        RequestState::Loading => {
            let loading = Paragraph::new(format!("{} Loading movies...", state.spinner()))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(loading, area);
            return;
        }
        RequestState::Failed(message) => {
            let error = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(error, area);
            return;
        }
        RequestState::Loaded(movies) if movies.is_empty() => {
            let empty = Paragraph::new("No movies found.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
        RequestState::Loaded(movies) => movies,
    };

    let header = Row::new(vec!["Title", "Rating", "Lang", "Year"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = movies
        .iter()
        .map(|m| {
            Row::new(vec![
                m.title.clone(),
                format!("\u{2605} {}", fmt_rating(m.vote_average)),
                m.original_language.clone(),
                String::from(m.release_year().unwrap_or("N/A")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut state.movie_table_state);
}

/// Returns a rectangle of `percent_x` by `percent_y` centered in `area`.
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let margin_y = 100_u16.saturating_sub(percent_y) / 2;
    let margin_x = 100_u16.saturating_sub(percent_x) / 2;
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(margin_y),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(margin_y),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(margin_x),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(margin_x),
        ])
        .split(vertical[1])[1]
}

/// Draws the detail overlay above the list.
fn draw_details(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let overlay = centered_rect(80, 80, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &state.details {
        RequestState::Idle => return,
        RequestState::Loading => Paragraph::new(format!("{} Loading details...", state.spinner()))
            .style(Style::default().fg(Color::DarkGray))
            .block(block.title(" Details ")),
        RequestState::Failed(message) => Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .block(block.title(" Details ")),
        RequestState::Loaded(details) => Paragraph::new(detail_lines(details))
            .wrap(Wrap { trim: true })
            .block(block.title(format!(" {} ", details.title))),
    };
    frame.render_widget(paragraph, overlay);
}

/// Builds the text of the detail overlay.
fn detail_lines(details: &TmdbMovieDetails) -> Vec<Line<'_>> {
    let label = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(
            tagline,
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }

    let mut facts = vec![format!("\u{2605} {}", fmt_rating(details.vote_average))];
    if let Some(year) = details.release_year() {
        facts.push(String::from(year));
    }
    if let Some(runtime) = details.runtime.filter(|r| *r > 0) {
        facts.push(fmt_runtime(runtime));
    }
    if !details.original_language.is_empty() {
        facts.push(details.original_language.clone());
    }
    lines.push(Line::from(facts.join("  \u{2022}  ")));

    if !details.genres.is_empty() {
        let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(Line::from(vec![
            Span::styled("Genres: ", label),
            Span::raw(genres.join(", ")),
        ]));
    }

    let directors = details.directors();
    if !directors.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Director: ", label),
            Span::raw(directors.join(", ")),
        ]));
    }

    let cast: Vec<&str> = details
        .top_cast(TOP_CAST)
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();
    if !cast.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Cast: ", label),
            Span::raw(cast.join(", ")),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(
        details
            .overview
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("No overview available."),
    ));

    if let Some(url) = details.trailer().and_then(|v| v.watch_url()) {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("Trailer: ", label),
            Span::raw(url),
        ]));
    }

    lines
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let help_text = if state.details_open() {
        Line::from("Esc: close  t: open trailer  q: quit")
    } else {
        match state.focus {
            Focus::Search => Line::from(
                "Type to search  Tab: focus  \u{2193}/Enter: list  Esc: clear  Ctrl-C: quit",
            ),
            Focus::Movies => Line::from(vec![Span::raw(
                "Tab: focus  \u{2191}\u{2193}/j/k: move  Enter: details  /: search  q: quit",
            )]),
            Focus::Trending => Line::from(vec![Span::raw(
                "Tab: focus  \u{2190}\u{2192}/h/l: move  Enter: details  /: search  q: quit",
            )]),
        }
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::tui::state::{AppMessage, Command};

    fn render(state: &mut BrowserState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn list_generation(commands: &[Command]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                Command::ListMovies { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_fmt_runtime() {
        // Arrange & Act & Assert
        assert_eq!(fmt_runtime(148), "2h 28m");
        assert_eq!(fmt_runtime(120), "2h");
        assert_eq!(fmt_runtime(45), "45m");
    }

    #[test]
    fn test_fmt_rating() {
        // Arrange & Act & Assert
        assert_eq!(fmt_rating(8.367), "8.4");
        assert_eq!(fmt_rating(0.0), "N/A");
    }

    #[test]
    fn test_renders_list_error() {
        // Arrange
        let mut state = BrowserState::new(Duration::from_millis(500));
        let generation = list_generation(&state.start());
        state.apply(AppMessage::MoviesLoaded {
            generation,
            result: Err(String::from("Invalid API key")),
        });

        // Act
        let screen = render(&mut state);

        // Assert
        assert!(screen.contains("Invalid API key"));
        assert!(screen.contains("Popular"));
    }

    #[test]
    fn test_renders_movies_and_trending() {
        // Arrange
        let mut state = BrowserState::new(Duration::from_millis(500));
        let generation = list_generation(&state.start());
        let movie = serde_json::from_value(serde_json::json!({
            "id": 27205,
            "title": "Inception",
            "original_language": "en",
            "release_date": "2010-07-15",
            "vote_average": 8.4
        }))
        .unwrap();
        state.apply(AppMessage::MoviesLoaded {
            generation,
            result: Ok(vec![movie]),
        });
        state.apply(AppMessage::TrendingLoaded(vec![]));

        // Act
        let screen = render(&mut state);

        // Assert
        assert!(screen.contains("Inception"));
        assert!(screen.contains("2010"));
        assert!(screen.contains("No trending searches yet"));
    }
}
