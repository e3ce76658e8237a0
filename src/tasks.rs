//! Correlation ID propagation into background tasks.
//!
//! A request handler that hands work to a queue or spawns a task loses
//! its task-local context. [`TaskPropagator`] carries it across: on the
//! publishing side [`TaskPropagator::inject`] writes the current
//! correlation ID (and the publisher's own task ID) into the task's
//! header map; on the worker side [`TaskPropagator::run`] reads them back
//! and runs the task inside a fresh context scope, generating an ID when
//! the task was not published from a request.
//!
//! Every run also gets its own task ID, with the publisher's task ID kept
//! as parent, so chains of tasks can be followed in the logs.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::context;
use crate::id;
use crate::middleware::{Generator, Hook};

pub const DEFAULT_CORRELATION_KEY: &str = "CORRELATION_ID";
pub const DEFAULT_PARENT_KEY: &str = "TASK_PARENT_ID";

pub type TaskHeaders = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIds {
    /// Task ID of the publisher, `None` when published from a request.
    pub parent: Option<String>,
    pub current: String,
}

tokio::task_local! {
    static TASK_IDS: TaskIds;
}

/// Task IDs of the task currently running under [`TaskPropagator::run`].
#[must_use]
pub fn current_task_ids() -> Option<TaskIds> {
    TASK_IDS.try_with(Clone::clone).ok()
}

#[derive(Clone)]
pub struct TaskPropagator {
    correlation_key: String,
    parent_key: String,
    generator: Generator,
    hooks: Vec<Hook>,
    log_id_length: Option<usize>,
}

impl Default for TaskPropagator {
    fn default() -> Self {
        Self {
            correlation_key: DEFAULT_CORRELATION_KEY.to_string(),
            parent_key: DEFAULT_PARENT_KEY.to_string(),
            generator: Arc::new(id::uuid_hex),
            hooks: Vec::new(),
            log_id_length: None,
        }
    }
}

impl fmt::Debug for TaskPropagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPropagator")
            .field("correlation_key", &self.correlation_key)
            .field("parent_key", &self.parent_key)
            .field("hooks", &self.hooks.len())
            .field("log_id_length", &self.log_id_length)
            .finish_non_exhaustive()
    }
}

impl TaskPropagator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn correlation_key(mut self, key: impl Into<String>) -> Self {
        self.correlation_key = key.into();
        self
    }

    #[must_use]
    pub fn parent_key(mut self, key: impl Into<String>) -> Self {
        self.parent_key = key.into();
        self
    }

    #[must_use]
    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.generator = Arc::new(generator);
        self
    }

    /// Called with the task's correlation ID before the task body runs.
    #[must_use]
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Truncate the IDs recorded on the task span to `len` characters.
    #[must_use]
    pub fn log_id_length(mut self, len: Option<usize>) -> Self {
        self.log_id_length = len;
        self
    }

    /// Copy the current correlation ID and task ID into `headers`.
    /// Keys without a value in the current context are left untouched.
    pub fn inject(&self, headers: &mut TaskHeaders) {
        if let Some(cid) = context::correlation_id() {
            headers.insert(self.correlation_key.clone(), cid);
        }
        if let Some(ids) = current_task_ids() {
            headers.insert(self.parent_key.clone(), ids.current);
        }
    }

    /// Run `fut` as a task published with `headers`.
    ///
    /// `task_id` overrides the generated current task ID, for queues that
    /// already assign one. Both scopes end when `fut` completes, so the
    /// next task on the same worker starts clean.
    pub async fn run<F>(&self, headers: &TaskHeaders, task_id: Option<String>, fut: F) -> F::Output
    where
        F: Future,
    {
        let correlation_id = headers
            .get(&self.correlation_key)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| (self.generator)());
        let ids = TaskIds {
            parent: headers
                .get(&self.parent_key)
                .filter(|v| !v.is_empty())
                .cloned(),
            current: task_id.unwrap_or_else(|| (self.generator)()),
        };

        let len = self.log_id_length;
        let span = tracing::info_span!(
            "task",
            correlation_id = %id::truncate(&correlation_id, len),
            task_id = %id::truncate(&ids.current, len),
            parent_task_id = %id::truncate(ids.parent.as_deref().unwrap_or_default(), len),
        );

        context::scope(Some(correlation_id.clone()), async move {
            TASK_IDS
                .scope(ids, async move {
                    for hook in &self.hooks {
                        hook(&correlation_id);
                    }
                    fut.await
                })
                .await
        })
        .instrument(span)
        .await
    }

    /// Spawn `fut` on the Tokio runtime, propagating the caller's IDs.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let mut headers = TaskHeaders::new();
        self.inject(&mut headers);
        let propagator = self.clone();
        tokio::spawn(async move { propagator.run(&headers, None, fut).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn inject_outside_context_adds_nothing() {
        let mut headers = TaskHeaders::new();
        TaskPropagator::new().inject(&mut headers);
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn inject_copies_request_id() {
        let mut headers = TaskHeaders::new();
        context::scope(Some("abc".into()), async {
            TaskPropagator::new().inject(&mut headers);
        })
        .await;
        assert_eq!(headers.get(DEFAULT_CORRELATION_KEY).map(String::as_str), Some("abc"));
        assert!(!headers.contains_key(DEFAULT_PARENT_KEY));
    }

    #[tokio::test]
    async fn run_uses_published_id() {
        let propagator = TaskPropagator::new().correlation_key("CID");
        let headers = TaskHeaders::from([("CID".to_string(), "from-request".to_string())]);

        let seen = propagator
            .run(&headers, Some("task-1".into()), async {
                (context::correlation_id(), current_task_ids())
            })
            .await;

        assert_eq!(seen.0.as_deref(), Some("from-request"));
        assert_eq!(
            seen.1,
            Some(TaskIds {
                parent: None,
                current: "task-1".into()
            })
        );
        assert_eq!(context::correlation_id(), None);
        assert_eq!(current_task_ids(), None);
    }

    #[tokio::test]
    async fn run_generates_missing_id_and_calls_hooks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let propagator = TaskPropagator::new()
            .generator(|| "generated".to_string())
            .hook(move |id| recorded.lock().unwrap().push(id.to_string()));

        let cid = propagator
            .run(&TaskHeaders::new(), None, async { context::correlation_id() })
            .await;

        assert_eq!(cid.as_deref(), Some("generated"));
        assert_eq!(*seen.lock().unwrap(), ["generated"]);
    }

    #[tokio::test]
    async fn nested_tasks_record_parent() {
        let propagator = TaskPropagator::new();
        let outer = propagator.clone();

        let (outer_ids, inner_ids, inner_cid) = context::scope(Some("req".into()), async move {
            outer
                .clone()
                .spawn(async move {
                    let outer_ids = current_task_ids().unwrap();
                    let (inner_ids, inner_cid) = outer
                        .spawn(async { (current_task_ids().unwrap(), context::correlation_id()) })
                        .await
                        .unwrap();
                    (outer_ids, inner_ids, inner_cid)
                })
                .await
                .unwrap()
        })
        .await;

        assert_eq!(outer_ids.parent, None);
        assert_eq!(inner_ids.parent.as_deref(), Some(outer_ids.current.as_str()));
        assert_ne!(inner_ids.current, outer_ids.current);
        assert_eq!(inner_cid.as_deref(), Some("req"));
    }
}
