use crate::app::{App, Focus, Modal};
use crate::db::TransactionKind;
use crate::ledger::Ledger;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;

const TITLE: &str = "Personal Finance Tracker";

// Window palette
const GREEN: Color = Color::Rgb(68, 189, 50);
const RED: Color = Color::Rgb(232, 65, 24);
const NAVY: Color = Color::Rgb(39, 60, 117);

pub fn run_ui<L: Ledger>(app: &mut App<L>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal before any error reaches the user
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend, L: Ledger>(
    terminal: &mut Terminal<B>,
    app: &mut App<L>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            handle_key(app, key)?;
        }
    }

    Ok(())
}

// ============================================================================
// KEY DISPATCH
// ============================================================================

/// Route one key press. Storage faults come back as errors and end the
/// session; everything else is reflected in `app`.
pub fn handle_key<L: Ledger>(app: &mut App<L>, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Ok(());
    }

    // Dialogs take every key until answered
    if app.modal.is_some() {
        if matches!(app.modal, Some(Modal::Confirm { .. })) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.answer_confirm(true)?
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.answer_confirm(false)?
                }
                _ => {}
            }
        } else if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_modal();
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_previous(),
        KeyCode::Delete => app.request_delete(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        _ => match app.focus {
            Focus::Description | Focus::Amount => match key.code {
                KeyCode::Enter => app.submit()?,
                KeyCode::Backspace => {
                    if let Some(field) = app.focused_field_mut() {
                        field.pop();
                    }
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if let Some(field) = app.focused_field_mut() {
                        field.push(ch);
                    }
                }
                _ => {}
            },
            Focus::Kind => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => app.toggle_kind(),
                KeyCode::Enter => app.submit()?,
                _ => {}
            },
            Focus::List => match key.code {
                KeyCode::Char('j') => app.select_next(),
                KeyCode::Char('k') => app.select_previous(),
                KeyCode::Char('d') => app.request_delete(),
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                _ => {}
            },
        },
    }

    Ok(())
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn ui<L: Ledger>(f: &mut Frame, app: &App<L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Entry form
            Constraint::Length(3), // Balance
            Constraint::Min(0),    // Transaction list
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_form(f, chunks[1], app);
    render_balance(f, chunks[2], app);
    render_table(f, chunks[3], app);
    render_status_bar(f, chunks[4], app);

    if let Some(modal) = &app.modal {
        render_modal(f, f.size(), modal);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {title} "))
}

fn render_form<L: Ledger>(f: &mut Frame, area: Rect, app: &App<L>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Description
            Constraint::Percentage(20), // Amount
            Constraint::Percentage(17), // Type
            Constraint::Percentage(18), // Add
        ])
        .split(area);

    let description = Paragraph::new(app.form.description.as_str())
        .block(field_block("Description", app.focus == Focus::Description));
    f.render_widget(description, cols[0]);

    let amount = Paragraph::new(app.form.amount.as_str())
        .block(field_block("Amount", app.focus == Focus::Amount));
    f.render_widget(amount, cols[1]);

    let kind_color = match app.form.kind {
        TransactionKind::Income => GREEN,
        TransactionKind::Expense => RED,
    };
    let kind = Paragraph::new(Line::from(vec![
        Span::raw("◂ "),
        Span::styled(app.form.kind.label(), Style::default().fg(kind_color)),
        Span::raw(" ▸"),
    ]))
    .alignment(Alignment::Center)
    .block(field_block("Type", app.focus == Focus::Kind));
    f.render_widget(kind, cols[2]);

    let add = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Add", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(GREEN))
            .style(Style::default().bg(GREEN)),
    );
    f.render_widget(add, cols[3]);

    // Cursor at the end of the field being typed into
    if app.modal.is_none() {
        let target = match app.focus {
            Focus::Description => Some((cols[0], &app.form.description)),
            Focus::Amount => Some((cols[1], &app.form.amount)),
            Focus::Kind | Focus::List => None,
        };
        if let Some((rect, text)) = target {
            let max = rect.width.saturating_sub(2);
            let offset = (text.chars().count() as u16).min(max);
            f.set_cursor(rect.x + 1 + offset, rect.y + 1);
        }
    }
}

fn render_balance<L: Ledger>(f: &mut Frame, area: Rect, app: &App<L>) {
    let color = if app.balance_is_negative() { RED } else { GREEN };

    let balance = Paragraph::new(Line::from(vec![
        Span::styled(
            "Current Balance: ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            app.formatted_balance(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(NAVY)));

    f.render_widget(balance, area);
}

fn render_table<L: Ledger>(f: &mut Frame, area: Rect, app: &App<L>) {
    let header_cells = ["ID", "Date", "Type", "Description", "Amount"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.rows().into_iter().map(|row| {
        let color = if row.kind == TransactionKind::Income.label() {
            GREEN
        } else {
            RED
        };

        let cells = vec![
            Cell::from(row.id.to_string()),
            Cell::from(row.date),
            Cell::from(row.kind).style(Style::default().fg(color)),
            Cell::from(truncate(&row.description, 40)),
            Cell::from(Line::from(row.amount).alignment(Alignment::Right)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Min(20),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if app.focus == Focus::List {
                Color::Yellow
            } else {
                Color::White
            }))
            .title(" Transactions "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    let mut state = TableState::default();
    state.select(app.selected);
    f.render_stateful_widget(table, area, &mut state);

    let mut scroll = ScrollbarState::new(app.transactions.len()).position(app.selected.unwrap_or(0));
    f.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scroll,
    );
}

fn render_status_bar<L: Ledger>(f: &mut Frame, area: Rect, app: &App<L>) {
    let selected = app.selected.map(|i| i + 1).unwrap_or(0);
    let total = app.transactions.len();

    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, total),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Field | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Select | "),
        Span::styled("Del", Style::default().fg(RED)),
        Span::styled(" Delete Selected", Style::default().fg(RED).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_modal(f: &mut Frame, area: Rect, modal: &Modal) {
    let (color, hint) = match modal {
        Modal::Warning { .. } => (Color::Yellow, "Enter OK"),
        Modal::Error { .. } => (RED, "Enter OK"),
        Modal::Info { .. } => (Color::Cyan, "Enter OK"),
        Modal::Confirm { .. } => (Color::Yellow, "y Yes | n No"),
    };

    let popup = centered_rect(50, 7, area);

    let content = vec![
        Line::from(""),
        Line::from(modal.message()),
        Line::from(""),
        Line::from(Span::styled(
            hint,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let dialog = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", modal.title())),
        );

    f.render_widget(Clear, popup);
    f.render_widget(dialog, popup);
}

/// `percent_x` wide, `height` rows tall, centred in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
