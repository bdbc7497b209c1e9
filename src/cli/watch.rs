//! Watch command implementation - play a world in the terminal.

use super::output::element_name;
use super::{CliError, load_config, read_world, resolve_seed};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};
use zoo::board::{BOARD_HEIGHT, BOARD_WIDTH};
use zoo::engine::{Mode, Simulation};
use zoo::host::{Glyph, Host, Lcg, PlayerInput, TextWindow};
use zoo::world::LoadMode;

const LOG_LINES: usize = 200;

/// Host backed by the terminal: inputs come from the key loop, popups go to
/// a side log and sounds are only counted.
#[derive(Debug)]
struct TerminalHost {
    rng: Lcg,
    input: PlayerInput,
    status: String,
    log: Vec<String>,
    sounds: u64,
    confirm_quit: bool,
}

impl TerminalHost {
    fn new(seed: u32) -> Self {
        Self {
            rng: Lcg::new(seed),
            input: PlayerInput::default(),
            status: String::new(),
            log: Vec::new(),
            sounds: 0,
            confirm_quit: false,
        }
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_LINES {
            self.log.remove(0);
        }
    }
}

impl Host for TerminalHost {
    fn draw_tile(&mut self, _x: i16, _y: i16, _glyph: Glyph) {
        // The whole board is redrawn from `glyph_at` every frame.
    }

    fn queue_sound(&mut self, _priority: i16, _pattern: &[u8]) {
        self.sounds += 1;
    }

    fn display_message(&mut self, _ticks: i16, text: &str) {
        self.status = text.to_string();
        if !text.is_empty() {
            self.push_log(text.to_string());
        }
    }

    fn display_lines(&mut self, window: &TextWindow) -> Option<String> {
        self.push_log(format!("== {} ==", window.title));
        for line in &window.lines {
            self.push_log(line.clone());
        }
        None
    }

    fn random(&mut self, bound: i16) -> i16 {
        self.rng.next(bound)
    }

    fn prompt_yes_no(&mut self, _question: &str) -> bool {
        self.confirm_quit
    }

    fn prompt_line(&mut self, _prompt: &str) -> Option<String> {
        None
    }

    fn poll_input(&mut self) -> PlayerInput {
        std::mem::take(&mut self.input)
    }
}

/// App state for the TUI.
struct App {
    sim: Simulation<TerminalHost>,
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
    ticks: u64,
}

impl App {
    fn step(&mut self) {
        self.sim.tick();
        self.ticks += 1;
        self.last_step = Instant::now();
    }

    fn should_auto_step(&self) -> bool {
        !self.paused && !self.sim.is_game_over() && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }

    fn queue_move(&mut self, dx: i16, dy: i16, shoot: bool) {
        let mut input = PlayerInput::step(dx, dy);
        input.shoot = shoot;
        self.sim.host.input = input;
        // A paused game waits for the first move, so run it right away.
        if self.sim.is_paused() {
            self.step();
        }
    }
}

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the world cannot be loaded or the TUI fails.
pub(crate) fn execute(
    world_path: &Path,
    seed: Option<u32>,
    config_path: Option<&Path>,
    speed: Option<u64>,
) -> Result<(), CliError> {
    let world = read_world(world_path, LoadMode::Full)?;
    let config = load_config(config_path, seed)?;
    let seed = resolve_seed(&config);
    let speed_ms = speed.unwrap_or_else(|| u64::from(config.tick_duration().unsigned_abs()) * 10);

    let mut sim = Simulation::title(world, config, TerminalHost::new(seed));
    sim.enter_play();
    let app = App {
        sim,
        paused: false,
        speed_ms: speed_ms.max(10),
        last_step: Instant::now(),
        ticks: 0,
    };
    run_tui(app)
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    loop {
        terminal.draw(|f| ui(f, &app)).map_err(|e| CliError::new(e.to_string()))?;

        if app.sim.exit_requested() {
            break;
        }
        if app.should_auto_step() {
            app.step();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(10)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            let shoot = key.modifiers.contains(KeyModifiers::SHIFT);
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    app.sim.host.confirm_quit = true;
                    app.sim.request_end_play();
                }
                KeyCode::Up => app.queue_move(0, -1, shoot),
                KeyCode::Down => app.queue_move(0, 1, shoot),
                KeyCode::Left => app.queue_move(-1, 0, shoot),
                KeyCode::Right => app.queue_move(1, 0, shoot),
                KeyCode::Char('t') => app.sim.host.input.torch = true,
                KeyCode::Char('p') => app.paused = !app.paused,
                KeyCode::Char('+' | '=') => app.speed_ms = app.speed_ms.saturating_sub(20).max(10),
                KeyCode::Char('-') => app.speed_ms = (app.speed_ms + 20).min(1000),
                KeyCode::Char('.') if app.paused => app.step(),
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                      // Header
            Constraint::Length(BOARD_HEIGHT as u16 + 2), // Board
            Constraint::Min(3),                         // Status and log
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_WIDTH as u16 + 2), Constraint::Min(20)])
        .split(chunks[1]);
    render_board(f, main_chunks[0], app);
    render_sidebar(f, main_chunks[1], app);

    render_log(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let status = if app.sim.is_game_over() {
        "GAME OVER"
    } else if app.sim.is_paused() {
        "WAITING FOR MOVE"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };
    let mode = match app.sim.mode() {
        Mode::Title => "title",
        Mode::Play => "play",
    };
    let title = format!(
        " Zoo | {} | Board {} | Tick {} | {} ({mode}) | Speed: {}ms ",
        app.sim.world.info.name,
        app.sim.world.info.current_board,
        app.ticks,
        status,
        app.speed_ms
    );
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = (1..=BOARD_HEIGHT)
        .map(|y| {
            let spans: Vec<Span> = (1..=BOARD_WIDTH)
                .map(|x| {
                    let glyph = app.sim.glyph_at(x, y);
                    Span::styled(
                        cp437(glyph.character).to_string(),
                        Style::default()
                            .fg(vga_color(glyph.color & 0x0F))
                            .bg(vga_color((glyph.color >> 4) & 0x07)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.sim.world.board.name)),
    );
    f.render_widget(board, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let info = &app.sim.world.info;
    let keys: String = info
        .keys
        .iter()
        .enumerate()
        .map(|(i, &held)| if held { char::from(b'1' + i as u8) } else { '.' })
        .collect();
    let (px, py) = app.sim.world.board.player_pos();
    let under = app.sim.world.board.stats.player().under.element;
    let mut lines = vec![
        Line::from(format!(" Health: {}", info.health)),
        Line::from(format!(" Ammo:   {}", info.ammo)),
        Line::from(format!(" Torches:{}", info.torches)),
        Line::from(format!(" Gems:   {}", info.gems)),
        Line::from(format!(" Score:  {}", info.score)),
        Line::from(format!(" Keys:   {keys}")),
        Line::from(""),
        Line::from(format!(" At {px},{py} on {}", element_name(under))),
        Line::from(format!(" Stats: {}", app.sim.world.board.stats.len())),
        Line::from(format!(" Sounds: {}", app.sim.host.sounds)),
    ];
    if info.torch_ticks > 0 {
        lines.push(Line::from(format!(" Torch: {}", info.torch_ticks)));
    }
    if info.energizer_ticks > 0 {
        lines.push(Line::from(Span::styled(
            format!(" Energized: {}", info.energizer_ticks),
            Style::default().fg(Color::LightMagenta),
        )));
    }
    let sidebar = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Player "));
    f.render_widget(sidebar, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    let visible = usize::from(area.height.saturating_sub(3));
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!(" {}", app.sim.host.status),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];
    let log = &app.sim.host.log;
    lines.extend(
        log[log.len().saturating_sub(visible)..]
            .iter()
            .map(|l| Line::from(format!(" {l}"))),
    );
    let footer = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" [arrows] Move  [shift+arrows] Shoot  [t] Torch  [p] Pause  [.] Step  [+/-] Speed  [q] Quit "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(footer, area);
}

fn vga_color(nibble: u8) -> Color {
    match nibble {
        0x0 => Color::Black,
        0x1 => Color::Blue,
        0x2 => Color::Green,
        0x3 => Color::Cyan,
        0x4 => Color::Red,
        0x5 => Color::Magenta,
        0x6 => Color::Yellow,
        0x7 => Color::Gray,
        0x8 => Color::DarkGray,
        0x9 => Color::LightBlue,
        0xA => Color::LightGreen,
        0xB => Color::LightCyan,
        0xC => Color::LightRed,
        0xD => Color::LightMagenta,
        0xE => Color::LightYellow,
        _ => Color::White,
    }
}

/// Closest Unicode character for a code page 437 glyph.
fn cp437(ch: u8) -> char {
    match ch {
        0x02 => '☻',
        0x04 => '♦',
        0x05 => '♣',
        0x0A => '◙',
        0x0B => '♂',
        0x0C => '♀',
        0x10 => '►',
        0x11 => '◄',
        0x12 => '↕',
        0x18 => '↑',
        0x19 => '↓',
        0x1A => '→',
        0x1B => '←',
        0x1D => '↔',
        0x1E => '▲',
        0x1F => '▼',
        0x7F => '⌂',
        0x84 => 'ä',
        0x99 => 'Ö',
        0x9D => '¥',
        0xB0 => '░',
        0xB1 => '▒',
        0xB2 => '▓',
        0xB3 => '│',
        0xB5 => '╡',
        0xB9 => '╣',
        0xBA => '║',
        0xBB => '╗',
        0xBC => '╝',
        0xC4 => '─',
        0xC5 => '┼',
        0xC6 => '╞',
        0xC8 => '╚',
        0xC9 => '╔',
        0xCA => '╩',
        0xCB => '╦',
        0xCC => '╠',
        0xCD => '═',
        0xCE => '╬',
        0xD0 => '╨',
        0xD2 => '╥',
        0xDB => '█',
        0xE3 => 'π',
        0xE8 => 'Φ',
        0xE9 => 'Θ',
        0xEA => 'Ω',
        0xF0 => '≡',
        0xF8 => '°',
        0xF9 => '∙',
        0xFA => '·',
        0xFE => '■',
        0x20..=0x7E => char::from(ch),
        _ => '?',
    }
}
