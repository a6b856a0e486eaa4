//! State containers shared by the view-models

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Load state of a screen
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState<T> {
    /// Waiting for the first (or a fresh) response
    #[default]
    Loading,
    /// Data is available
    Success(T),
    /// The load failed; the message is shown to the user
    Error(String),
}

impl<T> UiState<T> {
    /// Whether a load is in progress
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Loaded data, if any
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Error message, if the load failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Observable state cell backed by a `watch` channel.
///
/// Writes never fail, even when nobody is subscribed.
#[derive(Debug)]
pub struct StateCell<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> StateCell<T> {
    /// Cell holding `initial`
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify observers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify in place and notify observers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Modify in place when `f` returns true; observers are notified only then
    pub fn try_update(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Observe changes
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Read through a borrow without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }
}

impl<T: Clone> StateCell<UiState<T>> {
    /// Patch the data if the state is `Success`; other states are left alone.
    ///
    /// Returns whether a patch was applied.
    pub fn patch(&self, f: impl FnOnce(&mut T)) -> bool {
        self.try_update(|state| match state {
            UiState::Success(data) => {
                f(data);
                true
            }
            _ => false,
        })
    }
}

/// A user action that may be in flight
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    LikePost(i64),
    FavoritePost(i64),
    CoinPost(i64),
    DeletePost(i64),
    LikeComment(i64),
    CoinComment(i64),
    DeleteComment(i64),
    /// Comment or reply on a post
    AddComment(i64),
    CreateBoard,
    CreateFolder,
    Checkin,
    Logout,
    CoinApp(String),
    UploadImage,
    SubmitPost,
}

/// Actions currently in flight.
///
/// Counts are kept per action so overlapping identical actions each hold
/// their own mark.
#[derive(Debug, Clone)]
pub struct PendingActions {
    cell: StateCell<HashMap<Action, usize>>,
}

impl Default for PendingActions {
    fn default() -> Self {
        Self {
            cell: StateCell::new(HashMap::new()),
        }
    }
}

impl PendingActions {
    /// Mark `action` as in flight until the guard is dropped
    #[must_use = "the action is only pending while the guard lives"]
    pub fn begin(&self, action: Action) -> PendingGuard {
        self.cell.update(|map| *map.entry(action.clone()).or_default() += 1);
        PendingGuard {
            cell: self.cell.clone(),
            action,
        }
    }

    /// Whether `action` is in flight
    pub fn is_pending(&self, action: &Action) -> bool {
        self.cell.with(|map| map.contains_key(action))
    }

    /// Whether anything is in flight
    pub fn any(&self) -> bool {
        self.cell.with(|map| !map.is_empty())
    }

    /// Observe the pending set
    pub fn subscribe(&self) -> watch::Receiver<HashMap<Action, usize>> {
        self.cell.subscribe()
    }
}

/// Clears a pending mark on drop
#[derive(Debug)]
pub struct PendingGuard {
    cell: StateCell<HashMap<Action, usize>>,
    action: Action,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.cell.update(|map| {
            if let Some(count) = map.get_mut(&self.action) {
                *count -= 1;
                if *count == 0 {
                    map.remove(&self.action);
                }
            }
        });
    }
}

/// Tasks belonging to one screen; all are aborted when the scope is dropped
#[derive(Debug, Default)]
pub struct ViewScope {
    tasks: JoinSet<()>,
}

impl ViewScope {
    /// Empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` for as long as the scope lives
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Reap finished tasks so the set does not grow without bound
        while self.tasks.try_join_next().is_some() {}
        self.tasks.spawn(task);
    }

    /// Number of tasks not yet reaped
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are tracked
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every spawned task to finish
    pub async fn join(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result
                && e.is_panic()
            {
                tracing::error!("View task panicked: {}", e);
            }
        }
    }

    /// Abort all tasks now
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
    }
}
