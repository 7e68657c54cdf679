use chrono::{DateTime, Local};
use std::fmt;

use crate::editor::LineInput;

/// Task identity, taken from the creation timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub added_at: DateTime<Local>,
}

/// The task currently being text-edited and its in-progress buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub id: TaskId,
    pub buffer: LineInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Tasks,
}
