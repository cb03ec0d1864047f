//! Full-screen TUI mode.
//!
//! Shows artist and title, a fixed-width progress bar, the `MM:SS / MM:SS`
//! readout and a seven-line lyrics window that follows playback.
//!
//! The event loop uses `tokio::select!` to handle:
//! - State updates from the backend loop in `pool`
//! - User keyboard input (q/Esc/Ctrl+C to quit)
//! - SIGINT from outside the terminal

use crate::lyrics::SqliteLyricsStore;
use crate::pool;
use crate::state::Update;
use crate::ui::styles::Theme;
use crate::ui::view::{Emphasis, NowPlayingView, StyledLine, WAITING_TEXT};
use crossterm::{
    cursor::Show,
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};
use std::error::Error;
use std::io;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Width of the progress bar in cells.
pub const PROGRESS_WIDTH: u16 = 60;

/// UI state for the modern TUI mode
#[derive(Default)]
pub struct ModernUIState {
    pub last_update: Option<Update>,
    pub should_exit: bool,
}

/// Run the TUI until the user quits.
pub async fn display_lyrics_modern(
    store: SqliteLyricsStore,
    config: crate::Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (tx, rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let backend_loop = tokio::spawn(pool::listen(
        tx,
        shutdown_rx,
        store,
        config.status_command(),
        config.poll_interval(),
    ));

    let result = match enable_raw_mode() {
        Ok(()) => {
            let result = match setup_terminal() {
                Ok(mut terminal) => run_loop(&mut terminal, rx).await,
                Err(e) => Err(e.into()),
            };
            // restore the terminal on every path, even if drawing failed
            let restored = first_error([
                disable_raw_mode(),
                execute!(io::stdout(), LeaveAlternateScreen),
                execute!(io::stdout(), Show),
            ]);
            result.and(restored.map_err(Into::into))
        }
        Err(e) => Err(e.into()),
    };

    drop(shutdown_tx);
    if let Err(e) = backend_loop.await {
        tracing::warn!(error = %e, "Event loop task failed");
    }
    result
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Keeps the first failure of steps that have all already run.
fn first_error<const N: usize>(steps: [io::Result<()>; N]) -> io::Result<()> {
    steps.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    mut rx: mpsc::Receiver<Update>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let theme = Theme::default();
    let mut state = ModernUIState::default();
    let mut key_rx = spawn_input_thread();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    draw(terminal, &state, &theme)?;
    while !state.should_exit {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Some(update) => state.last_update = Some(update),
                    None => state.should_exit = true,
                }
            }
            maybe_event = key_rx.recv() => {
                match maybe_event {
                    Some(event) => process_event(event, &mut state),
                    None => state.should_exit = true,
                }
            }
            _ = &mut ctrl_c => {
                state.should_exit = true;
            }
        }
        if !state.should_exit {
            draw(terminal, &state, &theme)?;
        }
    }
    Ok(())
}

/// Single background thread polling crossterm events and forwarding them to
/// the async side. Exits once the receiver is gone.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (event_tx, event_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            if event_tx.is_closed() {
                break;
            }
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(ev) = crossterm::event::read()
                        && event_tx.blocking_send(ev).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {}
                Err(_) => thread::sleep(Duration::from_millis(100)),
            }
        }
    });
    event_rx
}

/// Handle user input events (keyboard)
fn process_event(event: Event, state: &mut ModernUIState) {
    if let Event::Key(key) = event
        && is_quit_key(&key)
    {
        state.should_exit = true;
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn draw<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &ModernUIState,
    theme: &Theme,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let view = NowPlayingView::from_update(&state.last_update.clone().unwrap_or_default());
    terminal.draw(|f| render(f, &view, theme))?;
    Ok(())
}

/// Lay out one frame from a derived view.
pub fn render(frame: &mut Frame, view: &NowPlayingView, theme: &Theme) {
    let area = frame.area();
    let error_height = u16::from(view.error.is_some());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // artist - title
            Constraint::Length(1),            // progress bar
            Constraint::Length(1),            // time
            Constraint::Length(1),            // spacing
            Constraint::Min(0),               // lyrics
            Constraint::Length(error_height), // error
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled(view.artist.as_str(), theme.artist),
        Span::raw(" - "),
        Span::styled(view.title.as_str(), theme.title),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    match view.progress {
        Some(ratio) => {
            let bar_area = Rect {
                width: rows[1].width.min(PROGRESS_WIDTH),
                ..rows[1]
            };
            let gauge = Gauge::default()
                .gauge_style(theme.progress)
                .ratio(ratio)
                .label("");
            frame.render_widget(gauge, bar_area);
            frame.render_widget(
                Paragraph::new(Span::styled(view.time.as_str(), theme.time)),
                rows[2],
            );
            let lyrics: Vec<Line> = view
                .lyrics
                .iter()
                .map(|l| styled_line(l, theme))
                .collect();
            frame.render_widget(Paragraph::new(lyrics), rows[4]);
        }
        None => {
            frame.render_widget(
                Paragraph::new(Span::styled(WAITING_TEXT, theme.placeholder)),
                rows[1],
            );
        }
    }

    if let Some(err) = &view.error {
        frame.render_widget(
            Paragraph::new(Span::styled(format!("Error: {}", err), theme.error)),
            rows[5],
        );
    }
}

fn styled_line<'a>(line: &'a StyledLine, theme: &Theme) -> Line<'a> {
    let style: Style = match line.emphasis {
        Emphasis::Past => theme.past,
        Emphasis::Current => theme.current,
        Emphasis::Upcoming => theme.upcoming,
        Emphasis::Placeholder => theme.placeholder,
        Emphasis::Error => theme.error,
    };
    Line::from(Span::styled(line.text.as_str(), style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResolvedLyrics;
    use crate::lyrics::{LyricsRecord, SyncedLine};
    use crate::player::TrackSnapshot;
    use crate::state::LyricsStatus;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn screen(update: &Update) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 14)).unwrap();
        let view = NowPlayingView::from_update(update);
        terminal.draw(|f| render(f, &view, &Theme::default())).unwrap();
        let buf = terminal.backend().buffer();
        let width = buf.area.width as usize;
        buf.content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn renders_track_time_and_lyrics() {
        let lines = vec![SyncedLine::new(1, "first line"), SyncedLine::new(30, "second line")];
        let update = Update {
            track: TrackSnapshot {
                artist: "Radiohead".into(),
                title: "Karma Police".into(),
                duration: 258,
                position: 42,
            },
            lyrics: LyricsStatus::Found(Arc::new(ResolvedLyrics {
                record: LyricsRecord {
                    id: 1,
                    name_lower: "karma police".into(),
                    duration_seconds: Some(258),
                    plain_lyrics: None,
                    synced_lyrics: None,
                },
                lines: Arc::new(lines),
            })),
            err: None,
            version: 3,
        };
        let rows = screen(&update);
        assert!(rows[0].starts_with("Radiohead - Karma Police"));
        assert!(rows[2].starts_with("00:42 / 04:18"));
        assert!(rows[4].starts_with("first line"));
        assert!(rows[5].starts_with("second line"));
    }

    #[test]
    fn renders_waiting_and_error() {
        let update = Update {
            err: Some("cmus-remote exited".into()),
            ..Default::default()
        };
        let rows = screen(&update);
        assert!(rows[1].starts_with(WAITING_TEXT));
        assert!(rows[13].starts_with("Error: cmus-remote exited"));
    }

    #[test]
    fn restore_reports_first_failure() {
        let broken = || io::Error::other("broken");
        assert!(first_error([Ok(()), Ok(()), Ok(())]).is_ok());
        let err = first_error([Ok(()), Err(broken()), Err(io::Error::other("later"))]).unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }

    #[test]
    fn quit_keys() {
        let key = KeyEvent::new;
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
