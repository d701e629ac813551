use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tasklist::api::Health;
use tasklist::confirm::Intent;
use tasklist::task::{Field, NewTask, Task, TaskId, TaskPatch};
use tasklist::task_list::{InputEvent, ListView};
use tasklist::{Error, Result, TaskListClient, TodoApi};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    List,
    Create(NewTask),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
}

/// In-memory store that records every request it receives.
#[derive(Default)]
struct FakeStore {
    tasks: Vec<Task>,
    next_id: i64,
    fail: bool,
    requests: Vec<Request>,
}

#[derive(Clone, Default)]
struct FakeApi(Arc<Mutex<FakeStore>>);

impl FakeApi {
    fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.len() as i64 + 1;
        Self(Arc::new(Mutex::new(FakeStore {
            tasks,
            next_id,
            ..Default::default()
        })))
    }

    fn set_failing(&self, fail: bool) {
        self.0.lock().unwrap().fail = fail;
    }

    fn requests(&self) -> Vec<Request> {
        self.0.lock().unwrap().requests.clone()
    }

    fn record(&self, request: Request) -> Result<std::sync::MutexGuard<'_, FakeStore>> {
        let mut store = self.0.lock().unwrap();
        store.requests.push(request);
        if store.fail {
            return Err(Error::status(500, "store unavailable"));
        }
        Ok(store)
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn list(&self) -> Result<Vec<Task>> {
        let store = self.record(Request::List)?;
        Ok(store.tasks.clone())
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task> {
        let mut store = self.record(Request::Create(new_task.clone()))?;
        let task = Task {
            description: Some(new_task.description.clone()),
            ..task(store.next_id, &new_task.title, new_task.completed)
        };
        store.next_id += 1;
        store.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        let mut store = self.record(Request::Update(id.clone(), patch.clone()))?;
        let task = store
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::status(404, "not found"))?;
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let mut store = self.record(Request::Delete(id.clone()))?;
        store.tasks.retain(|t| &t.id != id);
        Ok(())
    }

    async fn health(&self) -> Result<Health> {
        Ok(Health {
            status: "healthy".to_string(),
            redis: false,
        })
    }
}

fn task(id: i64, title: &str, completed: bool) -> Task {
    Task {
        id: TaskId::Int(id),
        title: title.to_string(),
        description: Some(String::new()),
        completed,
        created_at: Some(format!("2024-01-0{id}T00:00:00Z")),
        updated_at: None,
    }
}

fn type_into<A: TodoApi + 'static>(client: &mut TaskListClient<A>, field: Field, text: &str) {
    for c in text.chars() {
        client.input(InputEvent::Insert(field, c));
    }
}

async fn loaded_client(api: &FakeApi) -> TaskListClient<FakeApi> {
    let mut client = TaskListClient::new(api.clone());
    assert!(client.load());
    client.settle().await;
    client
}

#[tokio::test]
async fn test_empty_store_then_create_buy_milk() {
    let api = FakeApi::with_tasks(Vec::new());
    let mut client = loaded_client(&api).await;
    assert_eq!(client.state().list_view(), ListView::Empty);
    assert_eq!(client.state().count_label(), "(0)");

    type_into(&mut client, Field::Title, "Buy milk");
    assert!(client.submit());
    client.settle().await;

    assert_eq!(
        api.requests(),
        vec![
            Request::List,
            Request::Create(NewTask {
                title: "Buy milk".into(),
                description: String::new(),
                completed: false,
            }),
        ]
    );
    assert_eq!(client.state().tasks(), &[task(1, "Buy milk", false)]);
    assert_eq!(client.state().count_label(), "(1)");
    assert!(client.state().draft().title.is_empty());
}

#[tokio::test]
async fn test_blank_title_issues_no_request() {
    let api = FakeApi::with_tasks(Vec::new());
    let mut client = loaded_client(&api).await;

    type_into(&mut client, Field::Title, "   ");
    type_into(&mut client, Field::Description, "some details");
    assert!(!client.submit());
    assert!(!client.state().is_busy());
    assert_eq!(client.state().error(), None);
    assert_eq!(api.requests(), vec![Request::List]);
}

#[tokio::test]
async fn test_create_trims_fields_and_prepends() {
    let api = FakeApi::with_tasks(vec![task(1, "old", false)]);
    let mut client = loaded_client(&api).await;

    type_into(&mut client, Field::Title, "  Walk dog ");
    type_into(&mut client, Field::Description, " around the block\n");
    client.submit();
    client.settle().await;

    assert_eq!(
        api.requests().last(),
        Some(&Request::Create(NewTask {
            title: "Walk dog".into(),
            description: "around the block".into(),
            completed: false,
        }))
    );
    let titles: Vec<&str> = client.state().tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Walk dog", "old"]);
}

#[tokio::test]
async fn test_toggle_flips_only_target() {
    let api = FakeApi::with_tasks(vec![task(1, "a", false), task(2, "b", true)]);
    let mut client = loaded_client(&api).await;

    assert!(client.toggle_complete(&TaskId::Int(2)));
    client.settle().await;

    assert_eq!(
        api.requests().last(),
        Some(&Request::Update(TaskId::Int(2), TaskPatch::completed(false)))
    );
    assert_eq!(client.state().tasks(), &[task(1, "a", false), task(2, "b", false)]);
}

#[tokio::test]
async fn test_toggle_failure_is_not_optimistic() {
    let api = FakeApi::with_tasks(vec![task(1, "a", false)]);
    let mut client = loaded_client(&api).await;
    api.set_failing(true);

    client.toggle_complete(&TaskId::Int(1));
    assert!(client.state().is_busy());
    assert!(!client.state().tasks()[0].completed);
    client.settle().await;

    assert!(!client.state().is_busy());
    assert!(!client.state().tasks()[0].completed);
    assert_eq!(client.state().error(), Some("Failed to update task"));
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let api = FakeApi::with_tasks(vec![task(1, "a", false), task(2, "b", false)]);
    let mut client = loaded_client(&api).await;
    let before = client.state().clone();

    let mut asked = Vec::new();
    let mut decline = |intent: &Intent| {
        asked.push(intent.clone());
        false
    };
    assert!(!client.delete(&TaskId::Int(1), &mut decline).await);
    assert_eq!(client.state(), &before);
    assert_eq!(api.requests(), vec![Request::List]);
    assert_eq!(
        asked,
        vec![Intent::DeleteTask {
            id: TaskId::Int(1),
            title: "a".into()
        }]
    );

    assert!(client.delete(&TaskId::Int(1), &mut |_: &Intent| true).await);
    client.settle().await;
    assert!(client.state().task(&TaskId::Int(1)).is_none());
    assert_eq!(client.state().tasks(), &[task(2, "b", false)]);
    assert_eq!(api.requests().last(), Some(&Request::Delete(TaskId::Int(1))));
}

#[tokio::test]
async fn test_busy_flag_serializes_operations() {
    let api = FakeApi::with_tasks(vec![task(1, "a", false)]);
    let mut client = loaded_client(&api).await;
    type_into(&mut client, Field::Title, "Buy milk");
    assert!(client.state().task(&TaskId::Int(1)).is_some());

    // A second load keeps the client busy until it is settled.
    assert!(client.load());
    assert!(client.state().is_busy());
    let before = client.state().clone();

    type_into(&mut client, Field::Title, " later");
    assert_eq!(client.state().draft().title, "Buy milk");
    assert!(!client.load());
    assert!(!client.submit());
    assert!(!client.toggle_complete(&TaskId::Int(1)));

    let mut asked = false;
    let mut confirm = |_: &Intent| {
        asked = true;
        true
    };
    assert!(!client.delete(&TaskId::Int(1), &mut confirm).await);
    assert!(!asked);
    assert_eq!(client.state(), &before);

    client.settle().await;
    assert!(!client.state().is_busy());
    assert_eq!(api.requests(), vec![Request::List, Request::List]);

    assert!(client.submit());
    client.settle().await;
    assert!(matches!(api.requests().last(), Some(Request::Create(_))));
}

#[tokio::test]
async fn test_failures_release_busy_and_replace_error() {
    let api = FakeApi::with_tasks(Vec::new());
    api.set_failing(true);
    let mut client = TaskListClient::new(api.clone());

    client.load();
    client.settle().await;
    assert!(!client.state().is_busy());
    assert!(client.state().tasks().is_empty());
    assert_eq!(client.state().error(), Some("Failed to load tasks"));

    type_into(&mut client, Field::Title, "x");
    client.submit();
    client.settle().await;
    assert!(!client.state().is_busy());
    assert_eq!(client.state().error(), Some("Failed to create task"));
    assert_eq!(client.state().draft().title, "x");

    api.set_failing(false);
    client.load();
    client.settle().await;
    assert_eq!(client.state().error(), None);
}
