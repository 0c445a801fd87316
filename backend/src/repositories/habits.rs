//! Entry log and profile repository
//!
//! Holds the working copy of both records in memory and writes the full
//! snapshot of whichever record changed after every mutation. The
//! in-memory copy only changes once the write has succeeded, so a failed
//! write leaves memory and storage agreeing.

use std::sync::Arc;

use chrono::Utc;
use habit_coach_shared::{Encouragement, Entry, UserProfile};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::seed::demo_entries;
use crate::storage::{SnapshotStore, StoreError};

/// Storage keys for the two snapshots
#[derive(Debug, Clone)]
pub struct SnapshotKeys {
    pub entries: String,
    pub profile: String,
}

impl Default for SnapshotKeys {
    fn default() -> Self {
        Self {
            entries: "habit_log_v2".to_string(),
            profile: "user_profile".to_string(),
        }
    }
}

/// Late update applied to an existing entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryMerge {
    /// One-time calorie fill from analysis
    FillCalories(f64),
    AppendEncouragement(Encouragement),
}

/// Everything the application persists
#[derive(Debug, Clone, Default)]
pub struct HabitState {
    /// Newest first
    pub entries: Vec<Entry>,
    pub profile: Option<UserProfile>,
}

pub struct HabitRepository {
    store: Arc<dyn SnapshotStore>,
    keys: SnapshotKeys,
    state: Mutex<HabitState>,
}

impl HabitRepository {
    /// Load both snapshots from `store`
    ///
    /// A missing snapshot starts empty. A snapshot that does not parse is
    /// discarded with a warning and replaced by the empty default. With
    /// `seed_demo`, an empty entry log starts with the demo entries.
    pub async fn load(
        store: Arc<dyn SnapshotStore>,
        keys: SnapshotKeys,
        seed_demo: bool,
    ) -> Result<Self, StoreError> {
        let entries: Option<Vec<Entry>> = load_snapshot(store.as_ref(), &keys.entries).await?;
        let profile: Option<UserProfile> = load_snapshot(store.as_ref(), &keys.profile).await?;

        let entries = match entries {
            Some(entries) => entries,
            None if seed_demo => {
                info!("Seeding demo entries");
                demo_entries(Utc::now())
            }
            None => Vec::new(),
        };

        info!(
            backend = store.name(),
            entries = entries.len(),
            has_profile = profile.is_some(),
            "Habit state loaded"
        );

        Ok(Self {
            store,
            keys,
            state: Mutex::new(HabitState { entries, profile }),
        })
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> HabitState {
        self.state.lock().await.clone()
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.lock().await.profile.clone()
    }

    pub async fn entries(&self) -> Vec<Entry> {
        self.state.lock().await.entries.clone()
    }

    pub async fn find_entry(&self, id: Uuid) -> Option<Entry> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    /// Replace the stored profile
    pub async fn save_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let json = serde_json::to_string(&profile)?;
        self.store.save(&self.keys.profile, &json).await?;
        state.profile = Some(profile);
        Ok(())
    }

    /// Add `entry` at the head of the log
    ///
    /// Returns the log as it was before the entry was added.
    pub async fn prepend_entry(&self, entry: Entry) -> Result<Vec<Entry>, StoreError> {
        let mut state = self.state.lock().await;
        let previous = state.entries.clone();

        let mut entries = Vec::with_capacity(previous.len() + 1);
        entries.push(entry);
        entries.extend(previous.iter().cloned());

        self.write_entries(&entries).await?;
        state.entries = entries;
        Ok(previous)
    }

    /// Apply `merge` to the entry with `id`
    ///
    /// Returns the entry after the merge, or `None` without writing
    /// anything when no entry has that id.
    pub async fn apply(&self, id: Uuid, merge: EntryMerge) -> Result<Option<Entry>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(index) = state.entries.iter().position(|e| e.id() == id) else {
            debug!(entry_id = %id, "Merge target no longer exists");
            return Ok(None);
        };

        let mut entries = state.entries.clone();
        let changed = match merge {
            EntryMerge::FillCalories(kcal) => entries[index].fill_calories(kcal),
            EntryMerge::AppendEncouragement(encouragement) => {
                entries[index].add_encouragement(encouragement);
                true
            }
        };

        if changed {
            self.write_entries(&entries).await?;
            state.entries = entries;
        }
        Ok(state.entries.get(index).cloned())
    }

    /// Storage backend health
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    async fn write_entries(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        self.store.save(&self.keys.entries, &json).await
    }
}

async fn load_snapshot<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.load(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable snapshot");
            Ok(None)
        }
    }
}
