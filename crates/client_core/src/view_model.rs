use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use futures::StreamExt;
use shared::{
    command::{dispatch, Command, CommandReceiver},
    state::UiState,
};
use storage::ItemRepository;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, trace, warn};

use crate::publisher::{SharingPolicy, StatePublisher, StateSubscription};

/// Owns the item list state for one screen and executes its commands.
pub struct ItemViewModel {
    repository: Arc<dyn ItemRepository>,
    state: StatePublisher<UiState>,
    runtime: Handle,
    pending_saves: Mutex<Vec<JoinHandle<()>>>,
}

impl ItemViewModel {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self::with_policy(repository, SharingPolicy::default())
    }

    pub fn with_policy(repository: Arc<dyn ItemRepository>, policy: SharingPolicy) -> Self {
        let source = Arc::clone(&repository);
        let state = StatePublisher::new(UiState::Loading, policy, move || {
            source.items().map(UiState::from_snapshot).boxed()
        });

        Self {
            repository,
            state,
            runtime: Handle::current(),
            pending_saves: Mutex::new(Vec::new()),
        }
    }

    pub fn ui_state(&self) -> StateSubscription<UiState> {
        self.state.subscribe()
    }

    pub fn state_publisher(&self) -> &StatePublisher<UiState> {
        &self.state
    }

    pub async fn save(&self, text: &str) -> Result<()> {
        save_item(self.repository.as_ref(), text).await
    }

    /// Waits for every save dispatched so far to reach the repository.
    pub async fn flush_saves(&self) {
        let pending = std::mem::take(
            &mut *self
                .pending_saves
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in pending {
            if let Err(err) = task.await {
                warn!(command = "save", "save task did not complete: {err}");
            }
        }
    }
}

async fn save_item(repository: &dyn ItemRepository, text: &str) -> Result<()> {
    repository
        .add(text)
        .await
        .with_context(|| format!("failed to save item '{text}'"))
}

impl CommandReceiver for ItemViewModel {
    fn on_add(&self) {
        trace!(command = "add", "add command");
    }

    fn on_text_update(&self, text: String) {
        trace!(command = "text_update", text_len = text.len(), "edit command");
    }

    fn on_delete(&self) {
        trace!(command = "delete", "delete command");
    }

    fn on_list(&self) {
        trace!(command = "list", "list command");
    }

    fn on_save(&self, text: String) {
        let repository = Arc::clone(&self.repository);
        let task = self.runtime.spawn(async move {
            if let Err(err) = save_item(repository.as_ref(), &text).await {
                warn!(command = "save", "{err:#}");
            }
        });

        let mut pending = self
            .pending_saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(task);
    }

    fn process_command(&self, command: Command) {
        debug!(command = command.name(), "processing ui command");
        dispatch(command, self);
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
