//! Polling watcher for out-of-process signal changes
//!
//! A language selection made in another process (or another tab sharing the
//! same store file) only shows up as a changed persisted value. The
//! [`SignalWatcher`] polls the store and pushes a storage-changed
//! notification through a [`SyncHandle`] whenever the value moves, which is
//! what lets two independent views converge on one language.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::LanguageCode;
use crate::signal::LanguageStore;
use crate::sync::SyncHandle;
use crate::utils::error::SyncError;

/// Watches the persisted signal and notifies the controller on change
pub struct SignalWatcher {
    store: Arc<dyn LanguageStore>,
    handle: SyncHandle,
    poll_interval: Duration,
    is_running: Arc<RwLock<bool>>,
    last_seen: Arc<RwLock<Option<LanguageCode>>>,
}

impl SignalWatcher {
    pub fn new(
        store: Arc<dyn LanguageStore>,
        handle: SyncHandle,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            handle,
            poll_interval,
            is_running: Arc::new(RwLock::new(false)),
            last_seen: Arc::new(RwLock::new(None)),
        }
    }

    /// Start the polling loop (runs until stopped)
    pub async fn start(&self) -> Result<(), SyncError> {
        if *self.is_running.read().await {
            return Err(SyncError::AlreadyRunning);
        }

        // Prime with the current value so startup never looks like a change.
        // This happens before the running flag flips: a caller that saw the
        // flag can then write the store without racing the prime.
        let initial = match self.store.load().await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Language store unreadable at watcher start");
                None
            }
        };
        *self.last_seen.write().await = initial;
        *self.is_running.write().await = true;

        debug!(
            store = %self.store.describe(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Signal watcher started"
        );

        while *self.is_running.read().await {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {
                    if !self.poll_once().await {
                        break;
                    }
                }
                _ = self.wait_for_stop() => {
                    break;
                }
            }
        }

        *self.is_running.write().await = false;
        debug!("Signal watcher stopped");
        Ok(())
    }

    /// Stop the polling loop
    pub async fn stop(&self) -> Result<(), SyncError> {
        if !*self.is_running.read().await {
            return Err(SyncError::NotRunning);
        }
        *self.is_running.write().await = false;
        Ok(())
    }

    /// Check if the watcher is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get watcher status
    pub async fn status(&self) -> WatcherStatus {
        WatcherStatus {
            is_running: *self.is_running.read().await,
            poll_interval_ms: self.poll_interval.as_millis() as u64,
            last_seen: self.last_seen.read().await.clone(),
            store: self.store.describe(),
        }
    }

    // Internal: one poll; returns false when the controller is gone
    async fn poll_once(&self) -> bool {
        let current = match self.store.load().await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Language store poll failed"
                );
                return true;
            }
        };

        let changed = {
            let last = self.last_seen.read().await;
            *last != current
        };
        if !changed {
            return true;
        }

        debug!(
            language = %current
                .as_ref()
                .map(LanguageCode::as_str)
                .unwrap_or("none"),
            "Persisted signal changed externally"
        );
        *self.last_seen.write().await = current;

        match self.handle.notify_storage_changed() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Controller gone; stopping signal watcher");
                false
            }
        }
    }

    // Internal: wait for stop signal
    async fn wait_for_stop(&self) {
        loop {
            if !*self.is_running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Watcher status information
#[derive(Debug, Clone)]
pub struct WatcherStatus {
    pub is_running: bool,
    pub poll_interval_ms: u64,
    pub last_seen: Option<LanguageCode>,
    pub store: String,
}

impl WatcherStatus {
    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = String::from("Watcher Status\n");
        output.push_str(&format!("{:-<40}\n", ""));
        output.push_str(&format!("Running: {}\n", self.is_running));
        output.push_str(&format!("Poll Interval: {}ms\n", self.poll_interval_ms));
        output.push_str(&format!(
            "Last Seen: {}\n",
            self.last_seen
                .as_ref()
                .map(LanguageCode::as_str)
                .unwrap_or("none")
        ));
        output.push_str(&format!("Store: {}\n", self.store));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogLoader, CatalogSource, StaticSource};
    use crate::config::Config;
    use crate::dom::Page;
    use crate::engine::Localizer;
    use crate::signal::MemoryStore;
    use crate::sync::{SyncController, SyncEvent, SyncHandle};
    use serde_json::json;
    use tokio::time::timeout;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn make_controller(
        store: Arc<dyn LanguageStore>,
    ) -> (SyncController, SyncHandle) {
        let page = Page::parse("<html><body><p>Welcome</p></body></html>");
        let source: Arc<dyn CatalogSource> =
            Arc::new(StaticSource::new().with(lang("hi"), json!({"Welcome": "स्वागत"})));
        let localizer = Localizer::new(Config::default().engine);
        SyncController::new(
            page,
            localizer,
            CatalogLoader::new(source),
            store,
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn test_watcher_lifecycle() {
        let store: Arc<dyn LanguageStore> = Arc::new(MemoryStore::new());
        let (_controller, handle) = make_controller(store.clone());
        let watcher = Arc::new(SignalWatcher::new(
            store,
            handle,
            Duration::from_millis(10),
        ));

        assert!(!watcher.is_running().await);
        assert!(matches!(
            watcher.stop().await.unwrap_err(),
            SyncError::NotRunning
        ));

        let background = watcher.clone();
        let task = tokio::spawn(async move { background.start().await });

        // Give the loop a moment to flip the running flag
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(watcher.is_running().await);
        assert!(matches!(
            watcher.start().await.unwrap_err(),
            SyncError::AlreadyRunning
        ));

        watcher.stop().await.unwrap();
        task.await.unwrap().unwrap();
        assert!(!watcher.is_running().await);
    }

    #[tokio::test]
    async fn test_watcher_drives_controller_on_external_write() {
        let store: Arc<dyn LanguageStore> = Arc::new(MemoryStore::with_language(lang("en")));
        let (mut controller, handle) = make_controller(store.clone());
        let mut events = controller.subscribe();

        let watcher = Arc::new(SignalWatcher::new(
            store.clone(),
            handle.clone(),
            Duration::from_millis(10),
        ));
        let background = watcher.clone();
        let watch_task = tokio::spawn(async move { background.start().await });

        let drive = async {
            // The watcher primes its last-seen value on startup; only a
            // write after that counts as an external change
            while !watcher.is_running().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            // Write the store directly, as another process would
            store.save(&lang("hi")).await.unwrap();
            loop {
                let event = timeout(Duration::from_secs(2), events.recv())
                    .await
                    .expect("timed out waiting for apply")
                    .unwrap();
                if matches!(event, SyncEvent::Applied { .. }) {
                    break;
                }
            }
            watcher.stop().await.unwrap();
            handle.shutdown();
        };

        let (stats, ()) = tokio::join!(controller.run(), drive);
        watch_task.await.unwrap().unwrap();

        assert_eq!(stats.applies, 1);
        assert!(controller.page().html().contains("स्वागत"));

        let status = watcher.status().await;
        assert!(!status.is_running);
        assert_eq!(status.last_seen, Some(lang("hi")));
        assert!(status.display().contains("Last Seen: hi"));
    }
}
