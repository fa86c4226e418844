use log::{debug, error, warn};
use crate::models::CourseId;
use crate::utils::observer::{Observers, Subscription};
use crate::utils::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "favorites";

/// The user's favorited course ids, persisted under [`FAVORITES_KEY`].
///
/// Ids keep insertion order and never repeat. Every effective mutation writes
/// the whole set back to storage and then notifies observers; no-op mutations
/// do neither.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: S,
    ids: Vec<CourseId>,
    observers: Observers<[CourseId]>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn load(storage: S) -> Self {
        let ids = match storage.get(FAVORITES_KEY) {
            Some(raw) => parse_ids(&raw),
            None => Vec::new(),
        };
        debug!("Loaded {} favorite(s)", ids.len());
        Self { storage, ids, observers: Observers::default() }
    }

    pub fn is_favorite(&self, id: CourseId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[CourseId] {
        &self.ids
    }

    pub fn add(&mut self, id: CourseId) {
        if self.is_favorite(id) {
            return;
        }
        self.ids.push(id);
        self.changed();
    }

    pub fn remove(&mut self, id: CourseId) {
        let before = self.ids.len();
        self.ids.retain(|&f| f != id);
        if self.ids.len() != before {
            self.changed();
        }
    }

    // Returns whether the course is a favorite afterwards.
    pub fn toggle(&mut self, id: CourseId) -> bool {
        if self.is_favorite(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    pub fn subscribe<F>(&mut self, observer: F) -> Subscription
    where
        F: Fn(&[CourseId]) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    fn changed(&mut self) {
        self.persist();
        self.observers.notify(&self.ids);
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.ids) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(FAVORITES_KEY, &encoded) {
            error!("Failed to save favorites: {}", e);
        }
    }
}

// Anything that is not a JSON array of ids counts as no favorites.
fn parse_ids(raw: &str) -> Vec<CourseId> {
    match serde_json::from_str::<Vec<CourseId>>(raw) {
        Ok(parsed) => {
            let mut ids = Vec::with_capacity(parsed.len());
            for id in parsed {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        }
        Err(e) => {
            warn!("Failed to parse favorites, starting empty: {}", e);
            Vec::new()
        }
    }
}
