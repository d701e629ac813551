use crate::error::Result;
use crate::task::{Draft, Field, Task, TaskId};

/// The four request kinds the client can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// User-facing message shown when this operation fails, whatever the cause.
    pub const fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load tasks",
            Operation::Create => "Failed to create task",
            Operation::Update => "Failed to update task",
            Operation::Delete => "Failed to delete task",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Resolution of one remote request.
#[derive(Debug)]
pub enum Outcome {
    Loaded(Result<Vec<Task>>),
    Created(Result<Task>),
    Updated(Result<Task>),
    Deleted { id: TaskId, result: Result<()> },
}

impl Outcome {
    pub const fn operation(&self) -> Operation {
        match self {
            Outcome::Loaded(_) => Operation::Load,
            Outcome::Created(_) => Operation::Create,
            Outcome::Updated(_) => Operation::Update,
            Outcome::Deleted { .. } => Operation::Delete,
        }
    }

    /// Underlying failure, if any.
    pub fn error(&self) -> Option<&crate::error::Error> {
        match self {
            Outcome::Loaded(r) => r.as_ref().err(),
            Outcome::Created(r) => r.as_ref().err(),
            Outcome::Updated(r) => r.as_ref().err(),
            Outcome::Deleted { result, .. } => result.as_ref().err(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Insert(Field, char),
    Backspace(Field),
}

#[derive(Debug)]
pub enum Msg {
    Input(InputEvent),
    Dispatched(Operation),
    Resolved(Outcome),
}

/// What the list area should show.
#[derive(Debug, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Tasks(&'a [Task]),
}

/// Client-side mirror of the remote collection plus the form and status flags.
///
/// The collection is a cache: it is only ever replaced or patched with task
/// bodies returned by the store, never with locally invented ids or timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListState {
    tasks: Vec<Task>,
    draft: Draft,
    busy: bool,
    error: Option<&'static str>,
}

impl TaskListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn list_view(&self) -> ListView<'_> {
        if self.busy && self.tasks.is_empty() {
            ListView::Loading
        } else if self.tasks.is_empty() {
            ListView::Empty
        } else {
            ListView::Tasks(&self.tasks)
        }
    }

    pub fn count_label(&self) -> String {
        format!("({})", self.tasks.len())
    }

    /// Single transition function: every change to the state goes through here.
    pub fn reduce(mut self, msg: Msg) -> Self {
        match msg {
            Msg::Input(_) if self.busy => {}
            Msg::Input(InputEvent::Insert(field, c)) => self.draft.field_mut(field).push(c),
            Msg::Input(InputEvent::Backspace(field)) => {
                self.draft.field_mut(field).pop();
            }
            Msg::Dispatched(_) => self.busy = true,
            Msg::Resolved(outcome) => {
                self.busy = false;
                let operation = outcome.operation();
                match self.resolve(outcome) {
                    Ok(()) => self.error = None,
                    Err(_) => self.error = Some(operation.failure_message()),
                }
            }
        }
        self
    }

    fn resolve(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Loaded(tasks) => self.tasks = tasks?,
            Outcome::Created(task) => {
                let task = task?;
                self.tasks.retain(|t| t.id != task.id);
                self.tasks.insert(0, task);
                self.draft = Draft::default();
            }
            Outcome::Updated(task) => {
                let task = task?;
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            Outcome::Deleted { id, result } => {
                result?;
                self.tasks.retain(|t| t.id != id);
            }
        }
        Ok(())
    }
}
