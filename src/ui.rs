use crate::app::{App, Field};
use order_status_editor::{OrderStatusFacade, View};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

const HELP: &[(&str, &str)] = &[
    ("Up/Down j/k", "move row (crosses pages)"),
    ("PgDn/PgUp n/p", "next / previous page"),
    ("Enter v", "view selected"),
    ("e", "edit"),
    ("c", "create"),
    ("d", "delete"),
    ("r", "reload"),
    ("Esc l", "back to list"),
    ("Tab", "switch form field"),
    ("?", "toggle this help"),
    ("q", "quit"),
];

pub fn draw<F: OrderStatusFacade>(f: &mut Frame, app: &App<F>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(f.size());

    match app.view {
        View::List => draw_list(f, chunks[0], app),
        View::Detail => draw_detail(f, chunks[0], app),
        View::Create | View::Edit => draw_form(f, chunks[0], app),
    }
    draw_status(f, chunks[1], app);

    if app.show_help {
        draw_help(f, chunks[0]);
    }
}

fn draw_list<F: OrderStatusFacade>(f: &mut Frame, area: Rect, app: &App<F>) {
    let (page, pages) = app.page_position();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Order statuses ({page}/{pages})"));
    if app.rows.is_empty() {
        let p = Paragraph::new("No order statuses. Press c to create one.").block(block);
        f.render_widget(p, area);
        return;
    }

    let header = Row::new(["#", "Id", "Status", "Description"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let offset = app.controller().window().current_offset();
    let rows = app.rows.iter().enumerate().map(|(i, item)| {
        Row::new(vec![
            Cell::from((offset + i + 1).to_string()),
            Cell::from(item.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::from(item.status.as_str()),
            Cell::from(item.description.as_str()),
        ])
    });
    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(24),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::Black));

    let mut state = TableState::default();
    state.select(Some(app.sel_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_detail<F: OrderStatusFacade>(f: &mut Frame, area: Rect, app: &App<F>) {
    let item = app.selected();
    let position = app
        .controller()
        .selected_index()
        .map(|i| format!(" #{}", i + 1))
        .unwrap_or_default();
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled("Id:          ", label),
            Span::raw(item.id.map(|id| id.to_string()).unwrap_or_default()),
        ]),
        Line::from(vec![
            Span::styled("Status:      ", label),
            Span::raw(item.status.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Description: ", label),
            Span::raw(item.description.as_str()),
        ]),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Order status{position}")),
        );
    f.render_widget(p, area);
}

fn draw_form<F: OrderStatusFacade>(f: &mut Frame, area: Rect, app: &App<F>) {
    let title = if app.view == View::Create {
        "New order status"
    } else {
        "Edit order status"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let fields = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(inner);

    for (rect, field, name, value) in [
        (fields[0], Field::Status, "Status", &app.draft.status),
        (fields[1], Field::Description, "Description", &app.draft.description),
    ] {
        let active = app.field == field;
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let p = Paragraph::new(value.as_str())
            .block(Block::default().borders(Borders::ALL).title(name).border_style(style));
        f.render_widget(p, rect);
        if active {
            let col = value[..app.cursor.min(value.len())].chars().count() as u16;
            f.set_cursor(rect.x + 1 + col, rect.y + 1);
        }
    }
}

fn draw_status<F: OrderStatusFacade>(f: &mut Frame, area: Rect, app: &App<F>) {
    let mode = match app.view {
        View::List => "LIST",
        View::Detail => "VIEW",
        View::Create => "CREATE",
        View::Edit => "EDIT",
    };
    let text = Line::from(vec![
        Span::styled(
            format!("[{mode}] "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(&app.status),
    ]);
    let p = Paragraph::new(text).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = area.width.min(50);
    let height = area.height.min(HELP.len() as u16 + 2);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<14}"), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Keys")),
        popup,
    );
}
