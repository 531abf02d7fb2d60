use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{CollisionType, GameState, Phase, Position};
use crate::metrics::GameMetrics;

const OVERLAY_WIDTH: u16 = 36;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state, metrics);
        frame.render_widget(stats, chunks[0]);

        // Two columns per cell plus the border
        let grid_width = (state.grid_width as u16).saturating_mul(2).saturating_add(2);
        let grid_height = (state.grid_height as u16).saturating_add(2);
        let game_area = centered(chunks[1], grid_width, grid_height);

        frame.render_widget(self.render_grid(state), game_area);

        if let Some((overlay, height)) = self.render_overlay(state) {
            let area = centered(game_area, OVERLAY_WIDTH, height);
            frame.render_widget(Clear, area);
            frame.render_widget(overlay, area);
        }

        let controls = self.render_controls();
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(state.grid_height);
        let head = state.snake.head();

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    let color = if state.is_over() {
                        Color::Red
                    } else {
                        Color::Cyan
                    };
                    Span::styled("■ ", Style::default().fg(color).add_modifier(Modifier::BOLD))
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.high_score.max(state.score).to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    /// Panel for every phase but `Running`, with its height in rows
    fn render_overlay(&self, state: &GameState) -> Option<(Paragraph<'static>, u16)> {
        let hint = Style::default().fg(Color::Gray);
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };

        let (border, text) = match state.phase {
            Phase::Running => return None,
            Phase::NotStarted => (
                Color::Green,
                vec![
                    Line::styled(
                        "READY?",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Press an ", hint),
                        key("arrow key", Color::Cyan),
                        Span::styled(" to start", hint),
                    ]),
                ],
            ),
            Phase::Paused => (
                Color::Yellow,
                vec![
                    Line::styled(
                        "PAUSED",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Press ", hint),
                        key("Space", Color::Cyan),
                        Span::styled(" to resume", hint),
                    ]),
                ],
            ),
            Phase::GameOver => {
                let cause = match state.collision {
                    Some(CollisionType::Wall) => "You hit the wall",
                    Some(CollisionType::SelfCollision) => "You ran into yourself",
                    Some(CollisionType::BoardFull) => "The board is full!",
                    None => "",
                };
                (
                    Color::Red,
                    vec![
                        Line::styled(
                            "GAME OVER",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        Line::styled(cause, hint),
                        Line::from(""),
                        Line::from(vec![
                            Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                            Span::styled(
                                state.score.to_string(),
                                Style::default()
                                    .fg(Color::White)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ]),
                        Line::from(""),
                        Line::from(vec![
                            Span::styled("Press ", hint),
                            key("R", Color::Green),
                            Span::styled(" to restart or ", hint),
                            key("Q", Color::Red),
                            Span::styled(" to quit", hint),
                        ]),
                    ],
                )
            }
        };

        let height = text.len() as u16 + 2;
        let panel = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );

        Some((panel, height))
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" new game | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` rect in the middle of `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(column);
    rect
}
