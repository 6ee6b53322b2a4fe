//! The synchronization controller
//!
//! [`SyncController`] keeps one parsed page consistent with the persisted
//! language signal across every trigger that can change what the page should
//! show: the initial mount, an in-process language change, an out-of-process
//! signal write noticed by the watcher, and a route change that mounts new
//! content into the tree.
//!
//! The controller is single-task by construction. It owns the page and the
//! snapshot side table outright and processes one notification at a time, so
//! rewrite and restore passes never interleave. [`SyncHandle`] is the
//! cross-task face: cheap to clone, `Send`, and limited to persisting the
//! signal and pushing notifications into the controller's queue.
//!
//! A language change that lands while a catalog fetch is in flight must win.
//! After every fetch the controller re-reads the persisted signal and, if the
//! value moved, discards the fetched catalog and resolves the newer language
//! instead. An explicit in-process selection is exempt from that guard: it is
//! newer than anything persisted and may not have persisted at all.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogLoader, CatalogSource, DirectorySource, HttpSource};
use crate::config::Config;
use crate::dom::Page;
use crate::engine::{Localizer, SnapshotStore};
use crate::models::{LanguageCode, RewriteReport, SyncState, SyncStats};
use crate::signal::{FileStore, LanguageStore};
use crate::utils::error::SyncError;

// ============================================================================
// Notifications and Events
// ============================================================================

/// Triggers that ask the controller to resynchronize the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The user picked a new language in this process
    LanguageChanged(LanguageCode),

    /// The persisted signal changed underneath us (another process or tab)
    StorageChanged,

    /// Navigation mounted new content into the tree
    RouteChanged,
}

/// Events emitted after the controller acts on a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The tree was rewritten into a language
    Applied {
        language: LanguageCode,
        report: RewriteReport,
    },

    /// The tree was restored to its base-language originals
    Restored { restored: usize },

    /// The catalog for a language came back empty; the tree was left as-is
    CatalogEmpty { language: LanguageCode },
}

// ============================================================================
// Synchronization Controller
// ============================================================================

/// Owns a page and keeps it in the language the persisted signal names
pub struct SyncController {
    page: Page,
    snapshots: SnapshotStore,
    localizer: Localizer,
    loader: CatalogLoader,
    store: Arc<dyn LanguageStore>,
    route_settle: Duration,
    current: LanguageCode,
    state: SyncState,
    stats: SyncStats,
    notifications: broadcast::Receiver<Notification>,
    events: broadcast::Sender<SyncEvent>,
    shutdown: watch::Receiver<bool>,
}

impl SyncController {
    /// Create a controller and the handle that feeds it
    pub fn new(
        page: Page,
        localizer: Localizer,
        loader: CatalogLoader,
        store: Arc<dyn LanguageStore>,
        route_settle: Duration,
    ) -> (Self, SyncHandle) {
        let (notifier, notifications) = broadcast::channel(100);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events, _) = broadcast::channel(100);

        let current = localizer.config().base_language.clone();
        let controller = Self {
            page,
            snapshots: SnapshotStore::new(),
            localizer,
            loader,
            store: store.clone(),
            route_settle,
            current,
            state: SyncState::Base,
            stats: SyncStats::default(),
            notifications,
            events,
            shutdown: shutdown_rx,
        };

        let handle = SyncHandle {
            notifier,
            store,
            shutdown: Arc::new(shutdown_tx),
        };

        (controller, handle)
    }

    /// Create a controller wired from configuration
    ///
    /// The catalog source is HTTP when a base URL is configured and the
    /// local directory otherwise; the signal lives in the configured file.
    pub fn from_config(config: &Config, page: Page) -> crate::error::Result<(Self, SyncHandle)> {
        let source: Arc<dyn CatalogSource> = match &config.catalog.base_url {
            Some(url) => Arc::new(HttpSource::new(url, config.request_timeout())?),
            None => Arc::new(DirectorySource::new(&config.catalog.directory)),
        };

        let loader = CatalogLoader::new(source);
        let localizer = Localizer::new(config.engine.clone());
        let store: Arc<dyn LanguageStore> =
            Arc::new(FileStore::new(config.signal.store_path.clone()));

        Ok(Self::new(
            page,
            localizer,
            loader,
            store,
            config.route_settle(),
        ))
    }

    /// Subscribe to synchronization events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Current visual state of the page
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// The owned page, for inspection
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable access to the page, for the owning app to mount new content
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Give the page back, consuming the controller
    pub fn into_page(self) -> Page {
        self.page
    }

    /// Read the persisted signal and bring the page in line with it
    ///
    /// This is the mount trigger. [`run`](Self::run) calls it first, so only
    /// call it directly when driving the controller step by step.
    pub async fn mount(&mut self) {
        self.current = self.read_persisted().await;
        info!(
            language = %self.current,
            store = %self.store.describe(),
            source = %self.loader.describe_source(),
            "Mounting synchronization controller"
        );
        self.synchronize(false).await;
    }

    /// Act on a single notification
    pub async fn process(&mut self, notification: Notification) {
        match notification {
            Notification::LanguageChanged(language) => {
                debug!(language = %language, "Language changed in-process");
                self.current = language;
                self.synchronize(true).await;
            }
            Notification::StorageChanged => {
                self.current = self.read_persisted().await;
                debug!(language = %self.current, "Persisted signal changed");
                self.synchronize(false).await;
            }
            Notification::RouteChanged => {
                // Give the freshly mounted content a moment to land before
                // re-walking the tree
                tokio::time::sleep(self.route_settle).await;
                debug!("Route changed; re-walking tree");
                self.synchronize(false).await;
            }
        }
    }

    /// Mount, then serve notifications until shutdown
    ///
    /// Returns the accumulated counters once the loop exits. The loop ends
    /// when the handle signals shutdown or every handle has been dropped.
    pub async fn run(&mut self) -> SyncStats {
        self.mount().await;

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                notification = self.notifications.recv() => match notification {
                    Ok(notification) => self.process(notification).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped triggers are safe to coalesce: one pass
                        // reaches the same end state
                        warn!(skipped, "Notification backlog lagged; resynchronizing");
                        self.current = self.read_persisted().await;
                        self.synchronize(false).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        info!(
            applies = self.stats.applies,
            restores = self.stats.restores,
            "Synchronization controller stopped"
        );
        self.stats.clone()
    }

    /// Current status snapshot
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            state: self.state.clone(),
            language: self.current.clone(),
            snapshots: self.snapshots.len(),
            applies: self.stats.applies,
            restores: self.stats.restores,
            empty_catalogs: self.stats.empty_catalogs,
        }
    }

    // Internal: resolve the current language against the page. `explicit`
    // marks a selection made in this process, which wins over the persisted
    // value even when persisting it failed.
    async fn synchronize(&mut self, explicit: bool) {
        loop {
            let target = self.current.clone();

            if self.localizer.is_base(&target) {
                let restored = self.localizer.restore_all(&mut self.page, &self.snapshots);
                self.state = SyncState::Base;
                self.stats.restores += 1;
                let _ = self.events.send(SyncEvent::Restored { restored });
                info!(restored, "Restored base language");
                return;
            }

            let catalog = self.loader.load(&target).await;

            // The signal may have moved while the fetch was in flight; a
            // stale catalog must never win over a newer selection. An
            // explicit in-process choice is newer than the store by
            // construction, so it skips the guard.
            if !explicit {
                if let Ok(Some(persisted)) = self.store.load().await {
                    if persisted != target {
                        debug!(
                            stale = %target,
                            current = %persisted,
                            "Discarding stale catalog load"
                        );
                        self.current = persisted;
                        continue;
                    }
                }
            }

            if catalog.is_empty() {
                self.stats.empty_catalogs += 1;
                let _ = self.events.send(SyncEvent::CatalogEmpty {
                    language: target.clone(),
                });
                info!(language = %target, "Catalog is empty; leaving tree as-is");
                return;
            }

            let report = self
                .localizer
                .apply(&mut self.page, &mut self.snapshots, &catalog);
            self.state = SyncState::Localized(target.clone());
            self.stats.applies += 1;
            self.stats.last_applied_at = Some(Utc::now());
            let _ = self.events.send(SyncEvent::Applied {
                language: target.clone(),
                report,
            });
            info!(
                language = %target,
                replaced = report.total(),
                misses = report.misses,
                "Applied localization"
            );
            return;
        }
    }

    // Internal: read the persisted signal, degrading to base when the store
    // is unreadable
    async fn read_persisted(&self) -> LanguageCode {
        match self.store.load().await {
            Ok(Some(language)) => language,
            Ok(None) => self.localizer.config().base_language.clone(),
            Err(e) => {
                warn!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Language store unreadable; using base language"
                );
                self.localizer.config().base_language.clone()
            }
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable, `Send` face of the controller for other tasks
#[derive(Clone)]
pub struct SyncHandle {
    notifier: broadcast::Sender<Notification>,
    store: Arc<dyn LanguageStore>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl SyncHandle {
    /// Persist a new language selection, then notify the controller
    ///
    /// Persisting first means the value is already durable when the
    /// controller (or any other process) resolves it. An unwritable store
    /// is warned and swallowed: the in-process notification still goes out,
    /// so this view changes language even when persistence is unavailable.
    pub async fn set_language(&self, language: LanguageCode) -> Result<(), SyncError> {
        if let Err(e) = self.store.save(&language).await {
            warn!(
                language = %language,
                store = %self.store.describe(),
                error = %e,
                "Could not persist language selection; applying in-process only"
            );
        }
        self.notifier
            .send(Notification::LanguageChanged(language))
            .map_err(|_| SyncError::ChannelClosed)?;
        Ok(())
    }

    /// Report an out-of-process change to the persisted signal
    pub fn notify_storage_changed(&self) -> Result<(), SyncError> {
        self.notifier
            .send(Notification::StorageChanged)
            .map_err(|_| SyncError::ChannelClosed)?;
        Ok(())
    }

    /// Report a navigation that mounted new content
    pub fn notify_route_changed(&self) -> Result<(), SyncError> {
        self.notifier
            .send(Notification::RouteChanged)
            .map_err(|_| SyncError::ChannelClosed)?;
        Ok(())
    }

    /// Ask the controller's run loop to exit
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Controller status snapshot
#[derive(Debug, Clone)]
pub struct SyncStatus {
    pub state: SyncState,
    pub language: LanguageCode,
    pub snapshots: usize,
    pub applies: u64,
    pub restores: u64,
    pub empty_catalogs: u64,
}

impl SyncStatus {
    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = String::from("Sync Status\n");
        output.push_str(&format!("{:-<40}\n", ""));
        output.push_str(&format!("State: {}\n", self.state));
        output.push_str(&format!("Language: {}\n", self.language));
        output.push_str(&format!("Snapshots: {}\n", self.snapshots));
        output.push_str(&format!("Applies: {}\n", self.applies));
        output.push_str(&format!("Restores: {}\n", self.restores));
        output.push_str(&format!("Empty Catalogs: {}\n", self.empty_catalogs));
        output
    }
}

// ============================================================================
// Tests
// ============================================================================
