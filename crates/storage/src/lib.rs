use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use shared::error::SourceError;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// One emission of an item source: the full ordered list, or why it could not be read.
pub type ItemSnapshot = std::result::Result<Vec<String>, SourceError>;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Opens a fresh observation of the stored items.
    ///
    /// Every call queries the source independently; callers that want to
    /// share one observation must multiplex it themselves.
    fn items(&self) -> BoxStream<'static, ItemSnapshot>;

    async fn add(&self, name: &str) -> Result<()>;
}

/// Item list held in memory; observers see the latest list on every change.
#[derive(Clone)]
pub struct InMemoryItemRepository {
    items: Arc<watch::Sender<Vec<String>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::with_items(Vec::<String>::new())
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (tx, _) = watch::channel(items.into_iter().map(Into::into).collect());
        Self {
            items: Arc::new(tx),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.items.borrow().clone()
    }
}

impl Default for InMemoryItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    fn items(&self) -> BoxStream<'static, ItemSnapshot> {
        WatchStream::new(self.items.subscribe()).map(Ok).boxed()
    }

    async fn add(&self, name: &str) -> Result<()> {
        self.items.send_modify(|items| items.push(name.to_string()));
        debug!(
            item_count = self.items.borrow().len(),
            "appended item to in-memory repository"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
