use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use crate::board::TaskBoard;
use crate::editor::LineInput;
use crate::models::TaskItem;

/// One line of the task list. Holds no state of its own; everything comes
/// from the board.
pub struct TaskRow<'a> {
    task: &'a TaskItem,
    edit_buffer: Option<&'a LineInput>,
    elapsed: Option<String>,
}

impl<'a> TaskRow<'a> {
    pub fn new(board: &'a TaskBoard, task: &'a TaskItem) -> Self {
        let edit_buffer = board
            .editing()
            .filter(|session| session.id == task.id)
            .map(|session| &session.buffer);
        // Completed tasks suppress the elapsed-time label
        let elapsed = (!task.completed).then(|| board.time_passed(task.added_at));
        TaskRow {
            task,
            edit_buffer,
            elapsed,
        }
    }

    pub fn line(self) -> Line<'a> {
        let mut spans = Vec::new();

        let checkbox = if self.task.completed { "[x] " } else { "[ ] " };
        spans.push(Span::styled(checkbox, Style::default().fg(Color::Green)));

        match self.edit_buffer {
            Some(buffer) => spans.extend(edit_spans(buffer)),
            None => {
                let style = if self.task.completed {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::styled(self.task.text.clone(), style));
            }
        }

        if let Some(elapsed) = self.elapsed {
            spans.push(Span::styled(
                format!(" - {}", elapsed),
                Style::default().fg(Color::Cyan),
            ));
        }

        let action = if self.edit_buffer.is_some() { "Save" } else { "Edit" };
        spans.push(Span::styled(
            format!("  [Delete] [{}]", action),
            Style::default().fg(Color::DarkGray),
        ));

        Line::from(spans)
    }
}

impl<'a> From<TaskRow<'a>> for ListItem<'a> {
    fn from(row: TaskRow<'a>) -> Self {
        ListItem::new(row.line())
    }
}

/// Renders a line input with a block cursor.
pub fn edit_spans(buffer: &LineInput) -> Vec<Span<'static>> {
    let (before, at, after) = buffer.split_at_cursor();
    let text_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
    let cursor_style = Style::default().bg(Color::Cyan).fg(Color::Black);

    let mut spans = Vec::new();
    if !before.is_empty() {
        spans.push(Span::styled(before.to_string(), text_style));
    }
    let cursor_char = at.map(String::from).unwrap_or_else(|| " ".to_string());
    spans.push(Span::styled(cursor_char, cursor_style));
    if !after.is_empty() {
        spans.push(Span::styled(after.to_string(), text_style));
    }
    spans
}
