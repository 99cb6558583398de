use std::io::{self, Stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::Show;
use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use tourney_terminal::cards::{Card, CardKind, CardList, Fade};
use tourney_terminal::config::{DashboardConfig, SourceKind};
use tourney_terminal::dashboard::Dashboard;
use tourney_terminal::demo_feed::DemoSource;
use tourney_terminal::logging;
use tourney_terminal::notify::{NotificationPhase, NotifyLevel};
use tourney_terminal::source::{DashboardSource, HttpSource, spawn_provider};
use tourney_terminal::state::{AppState, Counter, Delta, Screen};

const IDLE_TICK: Duration = Duration::from_millis(250);
const FRAME: Duration = Duration::from_millis(16);

/// Restores the terminal on every exit path.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, Terminal<CrosstermBackend<Stdout>>)> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let guard = TerminalGuard;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)
            .context("failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")?;
        Ok((guard, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen, Show);
    }
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = DashboardConfig::from_env();
    if let Some(path) = &config.log_file {
        logging::init_file_logging(path, "info")?;
    }

    let source: Box<dyn DashboardSource> = match config.source {
        SourceKind::Demo => Box::new(DemoSource::new()),
        SourceKind::Http => Box::new(HttpSource::new(&config.base_url, config.http_timeout)?),
    };
    let source_label = source.describe();
    tracing::info!(source = %source_label, "starting dashboard");

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_provider(source, tx, cmd_rx);

    let (_guard, mut terminal) = TerminalGuard::enter()?;
    let width = terminal.size().map(|r| r.width).unwrap_or(80);

    let mut dashboard = Dashboard::new(&config, Some(cmd_tx));
    dashboard.init(Instant::now(), width);
    let res = run_app(&mut terminal, &mut dashboard, rx, &source_label);
    dashboard.destroy();
    terminal.show_cursor().ok();
    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    rx: mpsc::Receiver<Delta>,
    source_label: &str,
) -> Result<()> {
    loop {
        let now = Instant::now();
        dashboard.drain_deltas(&rx, now);
        dashboard.tick(now);

        terminal.draw(|f| ui(f, &dashboard.state, now, source_label))?;

        let timeout = if dashboard.state.is_animating(now) {
            FRAME
        } else {
            IDLE_TICK
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    dashboard.on_key(key, Instant::now())
                }
                Event::FocusLost => dashboard.on_focus_lost(),
                Event::FocusGained => dashboard.on_focus_gained(Instant::now()),
                Event::Resize(width, _) => dashboard.on_resize(width),
                _ => {}
            }
        }

        if dashboard.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState, now: Instant, source_label: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_lines(state, source_label))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.screen.card_kind() {
        None => render_overview(frame, chunks[1], state, now),
        Some(kind) => render_card_screen(frame, chunks[1], state.cards(kind), state.compact),
    }

    let footer = Paragraph::new(footer_text(state.screen))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    render_notifications(frame, frame.size(), state, now);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_lines(state: &AppState, source_label: &str) -> Vec<Line<'static>> {
    let mut tabs = vec![Span::raw(" ")];
    for (idx, screen) in Screen::ALL.iter().enumerate() {
        let style = if *screen == state.screen {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        tabs.push(Span::styled(format!(" {} {} ", idx + 1, screen.label()), style));
        tabs.push(Span::raw(" "));
    }

    let refresh = &state.refresh;
    let control = if refresh.is_loading() {
        Span::styled("⟳ refreshing…", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("↻ refresh", Style::default().fg(Color::Green))
    };
    let auto = if refresh.auto_refresh.is_active() {
        format!("auto every {}s", refresh.interval.as_secs())
    } else {
        "auto paused".to_string()
    };
    let wall = refresh
        .last_success_wall
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    vec![
        Line::from(vec![
            Span::styled(" TOURNEY DASH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("| {source_label} | ")),
            control,
            Span::raw(format!(" | {auto}")),
        ]),
        Line::from(format!(
            " Last update: {} ({wall})",
            refresh.last_update_label
        )),
        Line::from(tabs),
    ]
}

fn footer_text(screen: Screen) -> String {
    match screen {
        Screen::Overview => {
            "1-4/Tab View | ←/→ Tile | Enter Pulse | r/F5/Ctrl+R Refresh | [/] Interval | x Dismiss | ? Help | q Quit".to_string()
        }
        Screen::Tournaments | Screen::Matches => {
            "1-4/Tab View | f/F Filter | j/k Move | r Refresh | x Dismiss | ? Help | q Quit".to_string()
        }
        Screen::Players => {
            "1-4/Tab View | s/S Sort | j/k Move | r Refresh | x Dismiss | ? Help | q Quit".to_string()
        }
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState, now: Instant) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(area);

    for (row_idx, row_area) in rows.iter().take(2).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(*row_area);
        for (col_idx, tile_area) in cols.iter().enumerate() {
            let idx = row_idx * 3 + col_idx;
            if let Some(counter) = state.counters.get(idx) {
                render_stat_tile(frame, *tile_area, counter, idx == state.stat_selected, now);
            }
        }
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);

    let leaders = Paragraph::new(top_players_text(&state.players))
        .block(Block::default().title("Top Players").borders(Borders::ALL));
    frame.render_widget(leaders, bottom[0]);

    let console_lines = bottom[1].height.saturating_sub(2) as usize;
    let console = Paragraph::new(console_text(state, console_lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, bottom[1]);
}

fn render_stat_tile(
    frame: &mut Frame,
    area: Rect,
    counter: &Counter,
    selected: bool,
    now: Instant,
) {
    let border = if counter.is_pulsing(now) {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(counter.key.label())
        .borders(Borders::ALL)
        .border_style(border);
    let value = Paragraph::new(counter.displayed(now).to_string())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(value, area);
}

fn top_players_text(players: &CardList) -> String {
    let shown = players.displayed();
    if shown.is_empty() {
        return if players.loaded {
            "No players yet".to_string()
        } else {
            "Loading players…".to_string()
        };
    }
    shown
        .iter()
        .take(5)
        .map(|p| {
            format!(
                "{} {}  {:.0}W",
                p.rank_badge().unwrap_or_default(),
                p.title,
                p.metric("wins")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn console_text(state: &AppState, lines: usize) -> Vec<Line<'static>> {
    if state.logs.is_empty() {
        return vec![Line::from("No activity yet")];
    }
    let skip = state.logs.len().saturating_sub(lines.max(1));
    state
        .logs
        .iter()
        .skip(skip)
        .map(|line| {
            let color = match NotifyLevel::from_log_line(line) {
                NotifyLevel::Info => Color::Reset,
                level => level_color(level),
            };
            Line::styled(line.clone(), Style::default().fg(color))
        })
        .collect()
}

fn render_card_screen(frame: &mut Frame, area: Rect, list: &CardList, compact: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    frame.render_widget(Paragraph::new(control_bar(list)), sections[0]);

    let list_area = sections[1];
    let shown = list.displayed();
    if shown.is_empty() {
        let text = if list.loaded {
            format!("No {} to show", list.kind.label())
        } else {
            format!("Loading {}…", list.kind.label())
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    const ROW_HEIGHT: u16 = 3;
    if list_area.height < ROW_HEIGHT {
        return;
    }

    let visible = (list_area.height / ROW_HEIGHT) as usize;
    let (start, end) = visible_range(list.selected, shown.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + (i as u16) * ROW_HEIGHT,
            width: list_area.width,
            height: ROW_HEIGHT,
        };
        render_card(frame, row_area, shown[idx], idx == list.selected, compact);
    }
}

fn control_bar(list: &CardList) -> Line<'static> {
    let mut spans = Vec::new();
    if list.kind == CardKind::Player {
        spans.push(Span::raw(" Sort by: "));
        let active = list.sorts.active_index();
        for (idx, key) in list.sorts.options().iter().enumerate() {
            spans.push(button_span(key.field(), active == Some(idx)));
        }
    } else {
        spans.push(Span::raw(" Filter: "));
        let active = list.filters.active_index();
        for (idx, filter) in list.filters.options().iter().enumerate() {
            spans.push(button_span(filter.label(), active == Some(idx)));
        }
    }
    Line::from(spans)
}

fn button_span(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(format!(" {label} "), style)
}

fn render_card(frame: &mut Frame, area: Rect, card: &Card, selected: bool, compact: bool) {
    let mut style = match card.fade {
        Fade::Visible => Style::default(),
        _ => Style::default().fg(Color::DarkGray),
    };
    if selected {
        style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        if card.fade.is_opaque() {
            style = style.fg(Color::White);
        }
    }

    let pointer = if compact { "› " } else { "" };
    let badge = card
        .rank_badge()
        .map(|b| format!("{b} "))
        .unwrap_or_default();
    let status = if card.status.is_empty() {
        String::new()
    } else {
        format!("  [{}]", card.status)
    };

    let text = vec![
        Line::from(format!("{pointer}{badge}{}{status}", card.title)),
        Line::from(format!("{pointer}  {}", card.subtitle)),
    ];
    let separator = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let widget = Paragraph::new(text).style(style).block(separator);
    frame.render_widget(widget, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_notifications(frame: &mut Frame, area: Rect, state: &AppState, now: Instant) {
    const WIDTH: u16 = 44;
    const HEIGHT: u16 = 3;
    if area.width < WIDTH + 2 {
        return;
    }

    let mut y = area.y + 1;
    for note in state.notifications.visible(now) {
        if y + HEIGHT > area.y + area.height {
            break;
        }
        let popup = Rect {
            x: area.x + area.width - WIDTH - 1,
            y,
            width: WIDTH,
            height: HEIGHT,
        };
        let color = level_color(note.level);
        let style = if note.phase(now) == NotificationPhase::Leaving {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(color)
        };
        frame.render_widget(Clear, popup);
        let toast = Paragraph::new(format!("{} {}", note.level.icon(), note.message))
            .style(style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title(note.level.label()),
            );
        frame.render_widget(toast, popup);
        y += HEIGHT;
    }
}

fn level_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Success => Color::Green,
        NotifyLevel::Error => Color::Red,
        NotifyLevel::Warning => Color::Yellow,
        NotifyLevel::Info => Color::Cyan,
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Tourney Dash - Help",
        "",
        "Global:",
        "  1-4 / Tab        Switch view",
        "  r / F5 / Ctrl+R  Refresh stats now",
        "  [ / ]            Refresh interval -/+ 5s",
        "  x                Dismiss notification",
        "  ?                Toggle help",
        "  q / Esc          Quit",
        "",
        "Overview:",
        "  ←/→ Enter        Select and pulse a tile",
        "",
        "Tournaments / Matches:",
        "  f / F            Next / previous status filter",
        "",
        "Players:",
        "  s / S            Next / previous sort key",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
