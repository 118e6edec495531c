//! Transient status banners.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Banner>,
    /// Bumped on every show; a clear timer only fires for its own banner.
    generation: u64,
}

/// Holds at most one banner and clears it after a fixed delay.
#[derive(Debug, Clone)]
pub struct BannerBoard {
    slot: Arc<RwLock<Slot>>,
    clear_after: Duration,
}

impl BannerBoard {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot::default())),
            clear_after,
        }
    }

    /// Replace the current banner and schedule its removal.
    pub async fn show(&self, kind: BannerKind, message: impl Into<String>) {
        let generation = {
            let mut slot = self.slot.write().await;
            slot.generation += 1;
            slot.current = Some(Banner {
                kind,
                message: message.into(),
            });
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        let delay = self.clear_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = slot.write().await;
            if slot.generation == generation {
                slot.current = None;
            }
        });
    }

    pub async fn current(&self) -> Option<Banner> {
        self.slot.read().await.current.clone()
    }
}
