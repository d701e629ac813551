use crate::api::TodoApi;
use crate::client::TaskListClient;
use crate::confirm::{Confirm, Intent};
use crate::error::Result;
use crate::task::{Field, Task};
use crate::task_list::{InputEvent, ListView, Outcome, TaskListState};
use async_trait::async_trait;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::warn;

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Form(Field),
}

/// Presentation-only state: focus and list selection.
#[derive(Debug, Clone, Default)]
pub struct Ui {
    pub focus: Focus,
    pub list: ListState,
}

impl Ui {
    fn selected_task<'a>(&self, state: &'a TaskListState) -> Option<&'a Task> {
        self.list.selected().and_then(|i| state.tasks().get(i))
    }

    /// Keep the selection inside the collection after it changes size.
    fn clamp_selection(&mut self, len: usize) {
        match (self.list.selected(), len) {
            (_, 0) => self.list.select(None),
            (None, _) => self.list.select(Some(0)),
            (Some(i), len) if i >= len => self.list.select(Some(len - 1)),
            _ => {}
        }
    }
}

enum Step {
    Outcome(Option<Outcome>),
    Event(Option<io::Result<Event>>),
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run_app<B: Backend, A: TodoApi + 'static>(
    terminal: &mut Terminal<B>,
    client: &mut TaskListClient<A>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ui = Ui::default();
    client.load();

    loop {
        ui.clamp_selection(client.state().tasks().len());
        terminal.draw(|f| draw(f, client.state(), &mut ui))?;

        let step = tokio::select! {
            outcome = client.next_outcome() => Step::Outcome(outcome),
            event = events.next() => Step::Event(event),
        };

        match step {
            Step::Outcome(Some(outcome)) => client.apply(outcome),
            Step::Outcome(None) => {}
            Step::Event(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                let flow = handle_key(key, terminal, &mut events, client, &mut ui).await?;
                if flow == Flow::Quit {
                    return Ok(());
                }
            }
            Step::Event(Some(Ok(_))) => {}
            Step::Event(Some(Err(err))) => return Err(err.into()),
            Step::Event(None) => return Ok(()),
        }
    }
}

async fn handle_key<B: Backend, A: TodoApi + 'static>(
    key: KeyEvent,
    terminal: &mut Terminal<B>,
    events: &mut EventStream,
    client: &mut TaskListClient<A>,
    ui: &mut Ui,
) -> Result<Flow> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Flow::Quit);
    }

    match ui.focus {
        Focus::List => match key.code {
            KeyCode::Char('q') => return Ok(Flow::Quit),
            KeyCode::Char('a') | KeyCode::Tab => ui.focus = Focus::Form(Field::Title),
            KeyCode::Char('r') => {
                client.load();
            }
            KeyCode::Up => {
                let i = ui.list.selected().unwrap_or(0);
                ui.list.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let last = client.state().tasks().len().saturating_sub(1);
                let i = ui.list.selected().map_or(0, |i| (i + 1).min(last));
                ui.list.select(Some(i));
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = ui.selected_task(client.state()).map(|t| t.id.clone()) {
                    client.toggle_complete(&id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = ui.selected_task(client.state()).map(|t| t.id.clone()) {
                    let mut dialog = DialogConfirm {
                        terminal,
                        events,
                        backdrop: client.state().clone(),
                        ui: ui.clone(),
                    };
                    client.delete(&id, &mut dialog).await;
                }
            }
            _ => {}
        },
        Focus::Form(field) => match key.code {
            KeyCode::Esc => ui.focus = Focus::List,
            KeyCode::Tab | KeyCode::BackTab => {
                ui.focus = Focus::Form(match field {
                    Field::Title => Field::Description,
                    Field::Description => Field::Title,
                });
            }
            KeyCode::Enter => {
                client.submit();
            }
            KeyCode::Backspace => client.input(InputEvent::Backspace(field)),
            _ => {
                if let Some(c) = typed_char(&key) {
                    client.input(InputEvent::Insert(field, c));
                }
            }
        },
    }
    Ok(Flow::Continue)
}

/// Printable character for `key`, ignoring Ctrl/Alt chords.
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

/// Modal yes/no popup drawn over a snapshot of the list.
struct DialogConfirm<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    events: &'a mut EventStream,
    backdrop: TaskListState,
    ui: Ui,
}

#[async_trait(?Send)]
impl<'a, B: Backend> Confirm for DialogConfirm<'a, B> {
    async fn confirm(&mut self, intent: &Intent) -> bool {
        loop {
            let drawn = self.terminal.draw(|f| {
                draw(f, &self.backdrop, &mut self.ui);
                draw_confirm(f, intent);
            });
            if let Err(err) = drawn {
                warn!(error = %err, "Could not draw confirmation dialog, treating as declined");
                return false;
            }

            if let Some(answer) = dialog_answer(self.events.next().await) {
                return answer;
            }
        }
    }
}

/// Answer carried by one terminal event while the dialog is open; `None`
/// keeps waiting. A broken or closed event stream counts as declined.
fn dialog_answer(event: Option<io::Result<Event>>) -> Option<bool> {
    match event {
        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            _ => None,
        },
        Some(Ok(_)) => None,
        Some(Err(err)) => {
            warn!(error = %err, "Terminal event error in confirmation dialog, treating as declined");
            Some(false)
        }
        None => {
            warn!("Terminal event stream closed in confirmation dialog, treating as declined");
            Some(false)
        }
    }
}

pub fn draw(f: &mut Frame, state: &TaskListState, ui: &mut Ui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(if state.error().is_some() { 3 } else { 0 }),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled("Task list", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("Tasks stored on the remote task service"),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    draw_input(f, chunks[1], state, ui.focus, Field::Title, "Task title");
    draw_input(f, chunks[2], state, ui.focus, Field::Description, "Description (optional)");

    if let Some(message) = state.error() {
        let banner = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Error"));
        f.render_widget(banner, chunks[3]);
    }

    draw_list(f, chunks[4], state, ui);

    let hint = match (state.is_busy(), ui.focus) {
        (true, _) => "Working...",
        (false, Focus::List) => "a: add  space: toggle  d: delete  r: reload  q: quit",
        (false, Focus::Form(_)) => "Enter: add task  Tab: next field  Esc: back to list",
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        chunks[5],
    );
}

fn draw_input(f: &mut Frame, area: Rect, state: &TaskListState, focus: Focus, field: Field, title: &str) {
    let style = if state.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else if focus == Focus::Form(field) {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(state.draft().field(field))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL).border_style(style));
    f.render_widget(input, area);
}

fn draw_list(f: &mut Frame, area: Rect, state: &TaskListState, ui: &mut Ui) {
    let block = Block::default()
        .title(format!("My tasks {}", state.count_label()))
        .borders(Borders::ALL)
        .border_style(if ui.focus == Focus::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    let tasks = match state.list_view() {
        ListView::Loading => {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        }
        ListView::Empty => {
            f.render_widget(Paragraph::new("No tasks yet. Create one!").block(block), area);
            return;
        }
        ListView::Tasks(tasks) => tasks,
    };

    let items: Vec<ListItem> = tasks.iter().map(task_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut ui.list);
}

fn task_item(task: &Task) -> ListItem<'_> {
    let (marker, title_style) = if task.completed {
        ("[x] ", Style::default().fg(Color::Green).add_modifier(Modifier::CROSSED_OUT))
    } else {
        ("[ ] ", Style::default().fg(Color::White))
    };
    let mut lines = vec![Line::from(vec![
        Span::raw(marker),
        Span::styled(task.title.as_str(), title_style),
    ])];
    if let Some(details) = task.details() {
        lines.push(Line::from(Span::raw(format!("    {}", details))));
    }
    if let Some(day) = task.created_on() {
        lines.push(Line::from(Span::styled(
            format!("    Created {}", day.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines)
}

fn draw_confirm(f: &mut Frame, intent: &Intent) {
    let area = centered_rect(50, 7, f.area());
    let popup = Paragraph::new(vec![
        Line::from(intent.prompt()),
        Line::from(Span::styled(intent.subject(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("y: confirm  n: cancel"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().title("Confirm").borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow)));
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
