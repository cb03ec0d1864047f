use ratatui::style::{Color, Modifier, Style};

/// All display styles, built once at startup and passed by reference.
pub struct Theme {
    pub artist: Style,
    pub title: Style,
    pub past: Style,
    pub current: Style,
    pub upcoming: Style,
    pub placeholder: Style,
    pub error: Style,
    pub progress: Style,
    pub time: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            artist: Style::default()
                .fg(Color::Indexed(69))
                .add_modifier(Modifier::BOLD),
            title: Style::default()
                .fg(Color::Indexed(212))
                .add_modifier(Modifier::BOLD),
            past: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC | Modifier::DIM),
            current: Style::default()
                .fg(Color::Indexed(229))
                .add_modifier(Modifier::BOLD),
            upcoming: Style::default().fg(Color::Indexed(241)),
            placeholder: Style::default()
                .fg(Color::Indexed(241))
                .add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::Red),
            progress: Style::default().fg(Color::Indexed(212)).bg(Color::Indexed(236)),
            time: Style::default().fg(Color::Indexed(245)),
        }
    }
}
