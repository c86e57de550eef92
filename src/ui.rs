use crate::app::{AppSnapshot, DieView};
use crate::face;
use crate::tray::DICE_COUNT;
use color_eyre::eyre::Result;
use crossterm::{
    event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{prelude::*, widgets::*};
use std::io::stdout;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    ToggleHold(usize),
    Roll,
    Redraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Die(usize),
    Trigger,
}

impl Focus {
    fn next(self) -> Focus {
        match self {
            Focus::Die(i) if i + 1 < DICE_COUNT => Focus::Die(i + 1),
            Focus::Die(_) => Focus::Trigger,
            Focus::Trigger => Focus::Die(0),
        }
    }

    fn prev(self) -> Focus {
        match self {
            Focus::Die(0) => Focus::Trigger,
            Focus::Die(i) => Focus::Die(i - 1),
            Focus::Trigger => Focus::Die(DICE_COUNT - 1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

#[derive(Debug)]
pub struct UiState {
    mode: Mode,
    focus: Focus,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
    // Last-drawn hit targets for mouse clicks.
    die_rects: [Rect; DICE_COUNT],
    trigger_rect: Rect,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            focus: Focus::Die(0),
            terminal: None,
            die_rects: [Rect::default(); DICE_COUNT],
            trigger_rect: Rect::default(),
        }
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Maps a raw terminal event to a semantic one, updating focus and modal
/// state on the way. Returns `None` for events the UI ignores.
pub fn interpret_event(state: &mut UiState, event: &Event) -> Option<UserEvent> {
    match event {
        Event::Key(k) => {
            if k.kind != KeyEventKind::Press {
                return None;
            }
            if state.mode == Mode::QuitModal {
                return match k.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        state.mode = Mode::Normal;
                        Some(UserEvent::Redraw)
                    }
                    _ => None,
                };
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                    state.focus = state.focus.prev();
                    Some(UserEvent::Redraw)
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                    state.focus = state.focus.next();
                    Some(UserEvent::Redraw)
                }
                // Space and Enter act on whatever has focus: hold a die,
                // or fire the trigger.
                KeyCode::Char(' ') | KeyCode::Enter => match state.focus {
                    Focus::Die(i) => Some(UserEvent::ToggleHold(i)),
                    Focus::Trigger => Some(UserEvent::Roll),
                },
                KeyCode::Char('r') => Some(UserEvent::Roll),
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let idx = c.to_digit(10)? as usize;
                    if (1..=DICE_COUNT).contains(&idx) {
                        state.focus = Focus::Die(idx - 1);
                        Some(UserEvent::ToggleHold(idx - 1))
                    } else {
                        None
                    }
                }
                _ => None,
            }
        }
        Event::Mouse(m) => interpret_mouse(state, m),
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        _ => None,
    }
}

fn interpret_mouse(state: &mut UiState, m: &MouseEvent) -> Option<UserEvent> {
    if state.mode != Mode::Normal {
        return None;
    }
    if m.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    if let Some(i) = state
        .die_rects
        .iter()
        .position(|r| rect_contains(r, m.column, m.row))
    {
        state.focus = Focus::Die(i);
        return Some(UserEvent::ToggleHold(i));
    }
    if rect_contains(&state.trigger_rect, m.column, m.row) {
        state.focus = Focus::Trigger;
        return Some(UserEvent::Roll);
    }
    None
}

fn rect_contains(r: &Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

fn ui(f: &mut Frame, state: &mut UiState, snap: &AppSnapshot) {
    // Clear the whole frame to avoid leftover fragments
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // status
            Constraint::Length(9), // dice row
            Constraint::Length(3), // sum
            Constraint::Length(3), // roll trigger
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_status(f, chunks[0], snap);
    draw_dice(f, state, chunks[1], snap);
    draw_sum(f, chunks[2], snap);
    draw_trigger(f, state, chunks[3], snap);
    draw_help(f, chunks[4]);
    draw_modals(f, state);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let style = if snap.trigger_enabled {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let widget = Paragraph::new(snap.status.clone())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Dice Tray"));
    f.render_widget(widget, area);
}

fn badge(die: &DieView) -> String {
    if die.rolling {
        String::from("…")
    } else {
        match die.value {
            Some(v) => v.to_string(),
            None => String::from("—"),
        }
    }
}

fn die_border_style(die: &DieView, focused: bool) -> Style {
    let mut style = if die.held {
        Style::default().fg(Color::Yellow)
    } else if die.rolling {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

fn draw_dice(f: &mut Frame, state: &mut UiState, area: Rect, snap: &AppSnapshot) {
    let cols = snap.dice.len() as u16;
    let col_w = if cols > 0 { area.width / cols } else { area.width };
    for (i, die) in snap.dice.iter().enumerate() {
        let rect = Rect::new(area.x + i as u16 * col_w, area.y, col_w, area.height);
        state.die_rects[i] = rect;

        let focused = state.focus == Focus::Die(i);
        let title = if die.held {
            format!(" {} HELD ", i + 1)
        } else {
            format!(" {} ", i + 1)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(die_border_style(die, focused))
            .title(title);

        // While rolling, show the transient flicker face; the old value
        // stays up until the first flicker tick lands.
        let shown = if die.rolling {
            die.flicker.or(die.value)
        } else {
            die.value
        };
        let mut lines = vec![Line::default()];
        lines.extend(face::face_lines(shown));
        lines.push(Line::default());
        lines.push(
            Line::from(badge(die))
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD)),
        );

        let inner = block.inner(rect);
        f.render_widget(block, rect);
        f.render_widget(Paragraph::new(lines), inner);
    }
}

fn draw_sum(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = match snap.sum {
        Some(total) => format!("Sum: {total}"),
        None => String::from("Sum: —"),
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Total"));
    f.render_widget(widget, area);
}

fn draw_trigger(f: &mut Frame, state: &mut UiState, area: Rect, snap: &AppSnapshot) {
    state.trigger_rect = area;
    let focused = state.focus == Focus::Trigger;
    let (label, mut style) = if snap.trigger_enabled {
        ("[ ROLL ]", Style::default().fg(Color::Green))
    } else {
        ("Rolling…", Style::default().fg(Color::DarkGray))
    };
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    let border_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let widget = Paragraph::new(label)
        .style(style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "←/→ focus | Space/Enter hold or roll | 1-5 hold die | r roll | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match state.mode {
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the dice tray? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(&block, area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}
