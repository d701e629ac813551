//! `TaskListClient` drives the task list: it turns user actions into remote
//! requests and folds their outcomes back into [`TaskListState`].
//!
//! Requests run as spawned tokio tasks and report back over a channel, so
//! the caller keeps drawing while they are in flight. A single busy flag
//! refuses new operations until the outstanding one resolves. There is no
//! cancellation and no ordering token: every resolution is applied.

use std::future::Future;
use std::mem;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::TodoApi;
use crate::confirm::{Confirm, Intent};
use crate::task::{TaskId, TaskPatch};
use crate::task_list::{InputEvent, Msg, Operation, Outcome, TaskListState};

pub struct TaskListClient<A> {
    api: Arc<A>,
    state: TaskListState,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl<A: TodoApi + 'static> TaskListClient<A> {
    pub fn new(api: A) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            state: TaskListState::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn input(&mut self, event: InputEvent) {
        self.transition(Msg::Input(event));
    }

    /// Fetch the whole collection. Also used for the initial load.
    pub fn load(&mut self) -> bool {
        self.dispatch(Operation::Load, |api| async move {
            Outcome::Loaded(api.list().await)
        })
    }

    /// Submit the draft. Blank titles are dropped without a request.
    pub fn submit(&mut self) -> bool {
        let Some(new_task) = self.state.draft().to_new_task() else {
            debug!("Ignoring submit with blank title");
            return false;
        };
        self.dispatch(Operation::Create, |api| async move {
            Outcome::Created(api.create(&new_task).await)
        })
    }

    /// Flip `completed` on the task with `id`. Local state only changes once
    /// the store answers.
    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.state.task(id) else {
            debug!(%id, "Ignoring toggle of unknown task");
            return false;
        };
        let id = task.id.clone();
        let patch = TaskPatch::completed(!task.completed);
        self.dispatch(Operation::Update, |api| async move {
            Outcome::Updated(api.update(&id, &patch).await)
        })
    }

    /// Delete the task with `id` once `confirm` accepts it.
    pub async fn delete(&mut self, id: &TaskId, confirm: &mut dyn Confirm) -> bool {
        if self.state.is_busy() {
            debug!(%id, "Ignoring delete while busy");
            return false;
        }
        let Some(task) = self.state.task(id) else {
            debug!(%id, "Ignoring delete of unknown task");
            return false;
        };
        let intent = Intent::DeleteTask {
            id: task.id.clone(),
            title: task.title.clone(),
        };
        if !confirm.confirm(&intent).await {
            info!(%id, "Delete declined");
            return false;
        }

        let id = id.clone();
        self.dispatch(Operation::Delete, |api| async move {
            let result = api.delete(&id).await;
            Outcome::Deleted { id, result }
        })
    }

    /// Wait for the next request to resolve.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        self.outcome_rx.recv().await
    }

    pub fn apply(&mut self, outcome: Outcome) {
        let operation = outcome.operation();
        match outcome.error() {
            Some(err) => error!(operation = operation.name(), error = %err, "Operation failed"),
            None => debug!(operation = operation.name(), "Operation succeeded"),
        }
        self.transition(Msg::Resolved(outcome));
    }

    /// Wait for the next resolution and apply it.
    pub async fn settle(&mut self) {
        if let Some(outcome) = self.next_outcome().await {
            self.apply(outcome);
        }
    }

    fn transition(&mut self, msg: Msg) {
        self.state = mem::take(&mut self.state).reduce(msg);
    }

    fn dispatch<F, Fut>(&mut self, operation: Operation, call: F) -> bool
    where
        F: FnOnce(Arc<A>) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        if self.state.is_busy() {
            debug!(operation = operation.name(), "Ignoring request while busy");
            return false;
        }
        self.transition(Msg::Dispatched(operation));
        info!(operation = operation.name(), "Dispatching request");

        let request = call(Arc::clone(&self.api));
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            // The receiver lives as long as the client; a send only fails during shutdown.
            let _ = outcome_tx.send(request.await);
        });
        true
    }
}
