use async_trait::async_trait;

use crate::task::TaskId;

/// Something the user has to agree to before a request goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    DeleteTask { id: TaskId, title: String },
}

impl Intent {
    pub fn prompt(&self) -> &'static str {
        match self {
            Intent::DeleteTask { .. } => "Are you sure you want to delete this task?",
        }
    }

    /// What the intent is about, shown under the prompt.
    pub fn subject(&self) -> &str {
        match self {
            Intent::DeleteTask { title, .. } => title,
        }
    }
}

/// Confirmation capability: asks the user about an [`Intent`] and reports
/// whether it was accepted.
#[async_trait(?Send)]
pub trait Confirm {
    async fn confirm(&mut self, intent: &Intent) -> bool;
}

/// Plain functions work as confirmers, which is what tests use.
#[async_trait(?Send)]
impl<F> Confirm for F
where
    F: FnMut(&Intent) -> bool,
{
    async fn confirm(&mut self, intent: &Intent) -> bool {
        self(intent)
    }
}
