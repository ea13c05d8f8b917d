//! Failure injection and scripted answers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use todo_pubsub_components::{Confirm, ConfirmFuture};
use todo_pubsub_core::{ApiError, ApiFuture, DeleteAck, Todo, TodoApi, TodoId, TodoPatch};

/// The four record store operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiOp {
    /// [`TodoApi::list`]
    List,
    /// [`TodoApi::create`]
    Create,
    /// [`TodoApi::update`]
    Update,
    /// [`TodoApi::delete`]
    Delete,
}

impl ApiOp {
    const fn index(self) -> usize {
        match self {
            Self::List => 0,
            Self::Create => 1,
            Self::Update => 2,
            Self::Delete => 3,
        }
    }
}

/// Wraps a real [`TodoApi`], counting calls and failing selected operations.
///
/// A failing operation resolves to [`ApiError::Storage`] without reaching
/// the wrapped store.
pub struct FaultyApi {
    inner: Arc<dyn TodoApi>,
    failing: [AtomicBool; 4],
    calls: [AtomicUsize; 4],
}

impl FaultyApi {
    /// Wrap `inner`; nothing fails until [`Self::fail`] is called
    #[must_use]
    pub fn new(inner: Arc<dyn TodoApi>) -> Self {
        Self {
            inner,
            failing: Default::default(),
            calls: Default::default(),
        }
    }

    /// Make `op` fail (or succeed again) from now on
    pub fn fail(&self, op: ApiOp, failing: bool) {
        self.failing[op.index()].store(failing, Ordering::SeqCst);
    }

    /// How many times `op` was called, failed calls included
    #[must_use]
    pub fn calls(&self, op: ApiOp) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Total calls across every operation
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|count| count.load(Ordering::SeqCst)).sum()
    }

    fn enter(&self, op: ApiOp) -> Result<(), ApiError> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if self.failing[op.index()].load(Ordering::SeqCst) {
            tracing::debug!(?op, "Injected failure");
            return Err(ApiError::Storage(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FaultyApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyApi")
            .field("calls", &self.calls)
            .field("failing", &self.failing)
            .finish_non_exhaustive()
    }
}

impl TodoApi for FaultyApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.enter(ApiOp::List)?;
            self.inner.list().await
        })
    }

    fn create(&self, text: &str) -> ApiFuture<'_, Todo> {
        let text = text.to_string();
        Box::pin(async move {
            self.enter(ApiOp::Create)?;
            self.inner.create(&text).await
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.enter(ApiOp::Update)?;
            self.inner.update(id, patch).await
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, DeleteAck> {
        Box::pin(async move {
            self.enter(ApiOp::Delete)?;
            self.inner.delete(id).await
        })
    }
}

/// Answers confirmations from a queue and records every prompt.
///
/// Once the queue is empty every further answer is `fallback`.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    /// Answer with `answers` in order, then `false`
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer every prompt with `answer`
    #[must_use]
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::new(Vec::new())
        }
    }

    /// Every message asked so far
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm<'a>(&'a self, message: &'a str) -> ConfirmFuture<'a> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        let answer = self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback);
        Box::pin(async move { answer })
    }
}
