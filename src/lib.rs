//! Terminal client for a remote task list service.
//!
//! Lists, creates, toggles and deletes tasks held by a REST store under
//! `{base}/todos`. The local collection is only a cache of what the store
//! returned.

pub mod api;
pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod logging;
pub mod task;
pub mod task_list;
pub mod ui;

pub use api::{HttpTodoApi, TodoApi};
pub use client::TaskListClient;
pub use config::Config;
pub use error::{Error, Result};
