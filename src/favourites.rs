//! The user's favourite restaurants and their persistence.
//!
//! The in-memory set is authoritative for the session. Every toggle queues a
//! write of the whole set to a background writer; the caller never waits on
//! it. The writer applies writes one by one in toggle order, so the value on
//! disk trails [`FavouritesStore::current`] but never goes back to an older
//! set, and a reset cannot be overtaken by a toggle scheduled before it.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};

use crate::data::RestaurantId;
use crate::storage::KeyValueStore;

/// Storage key the favourite set is kept under.
pub const FAVOURITES_KEY: &str = "userFavourites";

/// Set of favourite restaurant ids, serialized as a JSON array of numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavouriteSet(BTreeSet<RestaurantId>);

impl FavouriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: RestaurantId) -> bool {
        self.0.contains(&id)
    }

    /// Flip membership of `id`. Returns whether it is a member afterwards.
    pub fn toggle(&mut self, id: RestaurantId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<RestaurantId> for FavouriteSet {
    fn from_iter<I: IntoIterator<Item = RestaurantId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read the favourite set stored under `key`.
///
/// Never fails: a missing value is an empty set, and read or parse errors are
/// logged and also treated as an empty set. Duplicated ids collapse.
pub async fn load(storage: &dyn KeyValueStore, key: &str) -> FavouriteSet {
    let raw = match storage.get_item(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("no favourites stored under {key}");
            return FavouriteSet::new();
        }
        Err(e) => {
            tracing::error!("fail to read favourites from storage: {e:#}");
            return FavouriteSet::new();
        }
    };

    match serde_json::from_str::<FavouriteSet>(&raw) {
        Ok(favourites) => favourites,
        Err(e) => {
            tracing::error!("fail to parse stored favourites {raw:?}: {e}");
            FavouriteSet::new()
        }
    }
}

enum Write {
    Save(FavouriteSet),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Apply writes one at a time, in the order they were scheduled.
async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mut writes: mpsc::UnboundedReceiver<Write>,
) {
    while let Some(write) = writes.recv().await {
        match write {
            Write::Save(favourites) => {
                let value = match serde_json::to_string(&favourites) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!("fail to serialize favourites: {e}");
                        continue;
                    }
                };
                if let Err(e) = storage.set_item(&key, &value).await {
                    tracing::error!("fail to save favourites to storage: {e:#}");
                }
            }
            Write::Clear => {
                if let Err(e) = storage.remove_item(&key).await {
                    tracing::error!("fail to clear stored favourites: {e:#}");
                }
            }
            Write::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("favourites writer stopped");
}

/// Owner of the favourite set for one running app.
pub struct FavouritesStore {
    favourites: Mutex<FavouriteSet>,
    notifier: watch::Sender<FavouriteSet>,
    writer: mpsc::UnboundedSender<Write>,
}

impl FavouritesStore {
    /// Load the persisted set and take ownership of it.
    ///
    /// Writes run on a background task spawned on the current runtime. It
    /// drains what is still queued and stops once the store is dropped.
    pub async fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let favourites = load(storage.as_ref(), &key).await;
        tracing::info!("loaded {} favourite(s)", favourites.len());

        let (writer, writes) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(storage, key, writes));

        let (notifier, _) = watch::channel(favourites.clone());
        Self {
            favourites: Mutex::new(favourites),
            notifier,
            writer,
        }
    }

    pub fn current(&self) -> FavouriteSet {
        self.lock_favourites().clone()
    }

    pub fn is_favourite(&self, id: RestaurantId) -> bool {
        self.lock_favourites().contains(id)
    }

    /// Change notifications. The receiver always holds the latest set.
    pub fn subscribe(&self) -> watch::Receiver<FavouriteSet> {
        self.notifier.subscribe()
    }

    /// Add `id` if absent, remove it otherwise, and return the new set.
    ///
    /// Persistence is scheduled in the background and not awaited. A failed
    /// write is logged and the in-memory change stays.
    pub fn toggle(&self, id: RestaurantId) -> FavouriteSet {
        // notification and write scheduling happen under the lock so they
        // follow the order of the in-memory updates
        let mut favourites = self.lock_favourites();
        let added = favourites.toggle(id);
        let updated = favourites.clone();
        tracing::debug!(id, added, "toggled favourite");

        self.notifier.send_replace(updated.clone());
        self.schedule(Write::Save(updated.clone()));
        updated
    }

    /// Wait for every write scheduled so far to finish.
    pub async fn flush(&self) {
        let (done, finished) = oneshot::channel();
        self.schedule(Write::Flush(done));
        if finished.await.is_err() {
            tracing::error!("favourites writer is gone, pending writes are lost");
        }
    }

    /// Forget all favourites, in memory and in storage.
    pub async fn reset(&self) {
        {
            let mut favourites = self.lock_favourites();
            *favourites = FavouriteSet::new();
            self.notifier.send_replace(FavouriteSet::new());
            self.schedule(Write::Clear);
        }
        self.flush().await;
        tracing::info!("favourites cleared");
    }

    fn schedule(&self, write: Write) {
        if self.writer.send(write).is_err() {
            tracing::error!("favourites writer is gone, dropping write");
        }
    }

    fn lock_favourites(&self) -> MutexGuard<'_, FavouriteSet> {
        // the set is always left consistent, so a poisoned lock is still usable
        self.favourites
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
