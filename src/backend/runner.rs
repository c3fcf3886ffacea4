//! Background execution of backend calls.
//!
//! Node actions and lazy getters run on the drawer's thread and must return
//! promptly. Anything that talks to the backend is spawned here instead.
//! Actions report completion through the continuation they were handed;
//! loads started from layout go through the runner's own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::drawer::Continuation;

pub type TaskId = u64;

#[derive(Debug)]
struct BackgroundTask {
    description: String,
    handle: JoinHandle<()>,
    started_at: Instant,
}

#[derive(Debug, Default)]
struct RunnerState {
    tasks: HashMap<TaskId, BackgroundTask>,
    next_task_id: TaskId,
}

/// Spawns backend operations and reports their outcome to the drawer.
///
/// Cloning is cheap; clones share the same task table.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    runtime: Handle,
    continuation: Continuation,
    state: Rc<RefCell<RunnerState>>,
}

impl TaskRunner {
    pub fn new(runtime: Handle, continuation: Continuation) -> Self {
        Self {
            runtime,
            continuation,
            state: Rc::new(RefCell::new(RunnerState::default())),
        }
    }

    /// Runner on the tokio runtime the caller is running in.
    pub fn current(continuation: Continuation) -> anyhow::Result<Self> {
        let runtime = Handle::try_current().context("Background tasks need a tokio runtime")?;
        Ok(Self::new(runtime, continuation))
    }

    /// Spawn a load that is not tied to an action; completion goes through the
    /// runner's continuation.
    pub fn fetch<Fut>(&self, description: impl Into<String>, node_id: impl Into<String>, operation: Fut) -> TaskId
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.spawn(description, node_id, self.continuation.clone(), operation)
    }

    /// Spawn `operation` and report to `done`. On success the drawer is asked
    /// to refresh; on failure the error is reported against `node_id` and the
    /// drawer still refreshes so state recorded by the operation shows up.
    pub fn spawn<Fut>(
        &self,
        description: impl Into<String>,
        node_id: impl Into<String>,
        done: Continuation,
        operation: Fut,
    ) -> TaskId
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.cleanup_finished();
        let description = description.into();
        let node_id = node_id.into();
        let task_description = description.clone();

        let handle = self.runtime.spawn(async move {
            match operation.await {
                Ok(()) => log::debug!("{} completed", task_description),
                Err(err) => {
                    log::error!("{} failed: {:#}", task_description, err);
                    done.fail(&node_id, &err);
                }
            }
            done.done();
        });

        let mut state = self.state.borrow_mut();
        state.next_task_id += 1;
        let task_id = state.next_task_id;
        log::debug!("spawned task {}: {}", task_id, description);
        state.tasks.insert(
            task_id,
            BackgroundTask {
                description,
                handle,
                started_at: Instant::now(),
            },
        );
        task_id
    }

    /// Drop finished tasks from the table.
    pub fn cleanup_finished(&self) {
        let mut state = self.state.borrow_mut();
        state.tasks.retain(|task_id, task| {
            if task.handle.is_finished() {
                log::debug!(
                    "task {} ({}) finished after {:?}",
                    task_id,
                    task.description,
                    task.started_at.elapsed()
                );
                false
            } else {
                true
            }
        });
    }

    /// Number of tasks still running.
    pub fn active_count(&self) -> usize {
        self.cleanup_finished();
        self.state.borrow().tasks.len()
    }

    /// Cancel every running task.
    pub fn abort_all(&self) {
        for (_, task) in self.state.borrow_mut().tasks.drain() {
            task.handle.abort();
        }
    }
}
