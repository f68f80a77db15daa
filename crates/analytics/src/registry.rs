use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

use crate::bet::Bet;
use crate::filters::{apply_filters, describe_filters, Predicate};

/// A named, reusable filter combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub filters: Vec<Predicate>,
}

pub type Clock = fn() -> DateTime<Utc>;

/// Process-lifetime store of saved filters. Construct once and share by
/// reference (or `Arc`); nothing is written to disk.
///
/// Callers only ever receive clones, never a handle into the map.
pub struct FilterRegistry {
    entries: RwLock<HashMap<String, SavedFilter>>,
    clock: Clock,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Insert or fully replace the entry at `id`. `created_at` survives a
    /// replace; `updated_at` is stamped on every call.
    pub fn save_filter(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        filters: Vec<Predicate>,
        description: Option<String>,
    ) -> SavedFilter {
        let id = id.into();
        let now = (self.clock)();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.get(&id).map(|existing| existing.created_at);
        let replaced = previous.is_some();
        let created_at = previous.unwrap_or(now);
        let entry = SavedFilter {
            id: id.clone(),
            name: name.into(),
            description,
            created_at,
            updated_at: now,
            filters,
        };
        entries.insert(id.clone(), entry.clone());
        drop(entries);

        info!(
            filter_id = %id,
            filter_count = entry.filters.len(),
            filters = %describe_filters(&entry.filters),
            replaced,
            "saved filter stored"
        );
        entry
    }

    pub fn load_filter(&self, id: &str) -> Option<SavedFilter> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Returns whether an entry existed.
    pub fn delete_filter(&self, id: &str) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            info!(filter_id = %id, "saved filter deleted");
        } else {
            debug!(filter_id = %id, "delete of unknown saved filter");
        }
        removed
    }

    /// All entries sorted by id. Callers must not rely on any particular order.
    pub fn list_saved_filters(&self) -> Vec<SavedFilter> {
        let mut all: Vec<SavedFilter> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Runs the saved combination over `bets`; `None` when `id` is unknown.
    pub fn apply_saved(&self, id: &str, bets: &[Bet]) -> Option<Vec<Bet>> {
        let saved = self.load_filter(id)?;
        Some(apply_filters(bets, &saved.filters))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
