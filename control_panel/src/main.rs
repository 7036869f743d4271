// Interactive rover control panel with TUI
// Run with: cargo run -p control_panel
// Point it at the simulator: ARDUINO_BASE_URL=http://127.0.0.1:8080 cargo run -p control_panel

use arduino_ctl::client::DeviceClient;
use arduino_ctl::surface::{ControlSurface, FeedbackLevel, FeedbackLog, ToggleStates};
use arduino_ctl::{Channel, Direction as MoveDirection, MoveCommand, PanelConfig, StatsSnapshot};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Surface = ControlSurface<DeviceClient>;

/// What the last frame showed, refreshed from the surface before each draw.
struct AppState {
    config: PanelConfig,
    toggles: ToggleStates,
    busy: Option<MoveCommand>,
    feedback: FeedbackLog,
    stats: StatsSnapshot,
    polling: bool,
    should_quit: bool,
}

impl AppState {
    fn new(config: PanelConfig) -> Self {
        let feedback = FeedbackLog::new(config.feedback_capacity);
        Self {
            config,
            toggles: ToggleStates::default(),
            busy: None,
            feedback,
            stats: StatsSnapshot::default(),
            polling: false,
            should_quit: false,
        }
    }

    async fn refresh(&mut self, surface: &Surface) {
        self.toggles = surface.toggles().await;
        self.busy = surface.busy().await;
        self.feedback = surface.feedback().await;
        self.stats = surface.snapshot();
        self.polling = surface.is_polling().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The terminal belongs to the UI, so logs go to a file
    let log_dir = std::env::var("CONTROL_PANEL_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(rolling::daily(log_dir, "control_panel.log"))
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PanelConfig::load().map_err(|e| format!("Invalid configuration: {}", e))?;
    let client = DeviceClient::new(config.device.clone())
        .map_err(|e| format!("Failed to build device client: {}", e))?;
    info!("Controlling rover at {}", config.device.base_url);

    let surface = Arc::new(ControlSurface::mount(Arc::new(client), &config)?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, Arc::clone(&surface), AppState::new(config)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    surface.teardown().await;

    if let Err(err) = res {
        error!("Panel exited with error: {}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    surface: Arc<Surface>,
    mut state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        state.refresh(&surface).await;
        terminal.draw(|f| ui(f, &state))?;
        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(key.code, &surface, &mut state);
                }
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, state: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // Config panel
            Constraint::Min(10),    // Data panels
            Constraint::Length(8),  // Help panel
        ])
        .split(f.area());

    render_config_panel(f, main_chunks[0], state);

    let data_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),  // Toggles
            Constraint::Percentage(30),  // Stats
            Constraint::Percentage(45),  // Feedback
        ])
        .split(main_chunks[1]);

    render_toggles(f, data_chunks[0], state);
    render_stats(f, data_chunks[1], state);
    render_feedback(f, data_chunks[2], state);

    render_help_panel(f, main_chunks[2]);
}

fn render_config_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let config_text = vec![
        Line::from(vec![
            Span::styled("Device: ", Style::default().fg(Color::Cyan)),
            Span::raw(&state.config.device.base_url),
        ]),
        Line::from(vec![
            Span::styled("Movement: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "{}  (timeout {} ms)",
                state.config.device.movement, state.config.device.timeout_ms
            )),
        ]),
        Line::from(vec![
            Span::styled("Stats Poll: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                if state.polling {
                    format!("every {} ms", state.config.poll_interval_ms)
                } else {
                    "stopped".to_string()
                },
                Style::default().fg(if state.polling { Color::Green } else { Color::Red }),
            ),
        ]),
        Line::from(vec![
            Span::styled("In Flight: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                state.busy.map(|c| c.to_string()).unwrap_or_else(|| "None".to_string()),
                Style::default().fg(Color::Magenta),
            ),
        ]),
    ];

    let config_block = Paragraph::new(config_text)
        .block(Block::default().borders(Borders::ALL).title("Configuration"));
    f.render_widget(config_block, area);
}

fn render_toggles(f: &mut Frame, area: Rect, state: &AppState) {
    let items: Vec<ListItem> = state
        .toggles
        .iter()
        .map(|(channel, enabled)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", channel.index() + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<11}", channel.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    if enabled { "ON" } else { "OFF" },
                    Style::default()
                        .fg(if enabled { Color::Green } else { Color::Red })
                        .add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Sensors")
            .border_style(Style::default().fg(Color::Cyan))
    );
    f.render_widget(list, area);
}

fn render_stats(f: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = if state.stats.is_empty() {
        vec![Line::from("  No data")]
    } else {
        state.stats.lines().iter().map(|line| Line::from(line.as_str())).collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Stats")
            .border_style(Style::default().fg(Color::Yellow))
    );
    f.render_widget(paragraph, area);
}

fn render_feedback(f: &mut Frame, area: Rect, state: &AppState) {
    let items: Vec<ListItem> = state
        .feedback
        .iter()
        .rev() // Show newest first
        .map(|entry| {
            let elapsed = entry.timestamp.elapsed().unwrap_or(Duration::ZERO);
            let time_str = if elapsed.as_secs() < 60 {
                format!("{}s", elapsed.as_secs())
            } else {
                format!("{}m", elapsed.as_secs() / 60)
            };
            let (marker, color) = match entry.level {
                FeedbackLevel::Success => ("✓ ", Color::Green),
                FeedbackLevel::Error => ("⚠ ", Color::Red),
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", time_str),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(marker, Style::default().fg(color)),
                Span::raw(entry.message.as_str()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Feedback")
            .border_style(Style::default().fg(Color::Green))
    );
    f.render_widget(list, area);
}

fn render_help_panel(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled("Movement:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  ↑/k=Up  ↓/j=Down  ←/h=Left  →/l=Right  space/s=Stop"),
        Line::from(Span::styled("Sensors:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  1=Ultrasonic  2=Magnetic  3=Infrared  4=Radiowaves"),
        Line::from(Span::styled("Other:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  q=Quit"),
    ];

    let help_block = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help_block, area);
}

fn handle_key_event(key: KeyCode, surface: &Arc<Surface>, state: &mut AppState) {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.should_quit = true;
        }
        KeyCode::Up | KeyCode::Char('k') => send(surface, MoveDirection::Up.into()),
        KeyCode::Down | KeyCode::Char('j') => send(surface, MoveDirection::Down.into()),
        KeyCode::Left | KeyCode::Char('h') => send(surface, MoveDirection::Left.into()),
        KeyCode::Right | KeyCode::Char('l') => send(surface, MoveDirection::Right.into()),
        KeyCode::Char(' ') | KeyCode::Char('s') => send(surface, MoveCommand::Stop),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            toggle(surface, Channel::ALL[index]);
        }
        _ => {}
    }
}

// Requests run in the background so rendering never waits on the network.
// Outcomes land in the surface's feedback log.
fn send(surface: &Arc<Surface>, command: MoveCommand) {
    let surface = Arc::clone(surface);
    tokio::spawn(async move {
        let _ = surface.command(command).await;
    });
}

fn toggle(surface: &Arc<Surface>, channel: Channel) {
    let surface = Arc::clone(surface);
    tokio::spawn(async move {
        let _ = surface.toggle(channel).await;
    });
}
