//! Query catalog - the fixed operation-to-SQL mapping
//!
//! All eleven query texts are rendered once at construction from a
//! [`TableBinding`]. Only the validated table/column identifiers are ever
//! interpolated; every per-call value travels as a bound `?N` placeholder.

use crate::binding::TableBinding;

/// The pre-rendered query text for every store operation.
///
/// Built once, immutable, safely shared by any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    items_for_user: String,
    num_items: String,
    num_users: String,
    set_preference: String,
    remove_preference: String,
    all_user_item_pairs: String,
    all_items: String,
    item_exists: String,
    users_for_item: String,
    count_for_item: String,
    count_for_item_pair: String,
}

impl QueryCatalog {
    pub fn new(binding: &TableBinding) -> Self {
        let t = binding.table();
        let u = binding.user_column();
        let i = binding.item_column();
        Self {
            items_for_user: format!("SELECT {i} FROM {t} WHERE {u}=?1"),
            num_items: format!("SELECT COUNT(DISTINCT {i}) FROM {t}"),
            num_users: format!("SELECT COUNT(DISTINCT {u}) FROM {t}"),
            // Insert must be a no-op when the pair already exists; the
            // ON CONFLICT form is atomic on SQLite and PostgreSQL alike.
            set_preference: format!(
                "INSERT INTO {t} ({u},{i}) VALUES (?1,?2) ON CONFLICT({u},{i}) DO NOTHING"
            ),
            remove_preference: format!("DELETE FROM {t} WHERE {u}=?1 AND {i}=?2"),
            all_user_item_pairs: format!("SELECT {i}, {u} FROM {t} ORDER BY {u}"),
            all_items: format!("SELECT DISTINCT {i} FROM {t} ORDER BY {i}"),
            item_exists: format!("SELECT 1 FROM {t} WHERE {i}=?1"),
            users_for_item: format!("SELECT {u} FROM {t} WHERE {i}=?1 ORDER BY {u}"),
            count_for_item: format!("SELECT COUNT(1) FROM {t} WHERE {i}=?1"),
            count_for_item_pair: format!(
                "SELECT COUNT(1) FROM {t} tp1 INNER JOIN {t} tp2 ON (tp1.{u}=tp2.{u}) \
                 WHERE tp1.{i}=?1 AND tp2.{i}=?2"
            ),
        }
    }

    /// Item ids for one user; one placeholder (user id).
    pub fn items_for_user(&self) -> &str {
        &self.items_for_user
    }

    /// Count of distinct item ids; no placeholders.
    pub fn num_items(&self) -> &str {
        &self.num_items
    }

    /// Count of distinct user ids; no placeholders.
    pub fn num_users(&self) -> &str {
        &self.num_users
    }

    /// Idempotent pair insert; two placeholders (user id, item id).
    pub fn set_preference(&self) -> &str {
        &self.set_preference
    }

    /// Pair delete; two placeholders (user id, item id).
    pub fn remove_preference(&self) -> &str {
        &self.remove_preference
    }

    /// All (item id, user id) pairs ordered by user id; no placeholders.
    pub fn all_user_item_pairs(&self) -> &str {
        &self.all_user_item_pairs
    }

    /// Distinct item ids ordered ascending; no placeholders.
    pub fn all_items(&self) -> &str {
        &self.all_items
    }

    /// Any row for an item; one placeholder (item id).
    pub fn item_exists(&self) -> &str {
        &self.item_exists
    }

    /// User ids for one item ordered ascending; one placeholder (item id).
    pub fn users_for_item(&self) -> &str {
        &self.users_for_item
    }

    /// Row count for one item; one placeholder (item id).
    pub fn count_for_item(&self) -> &str {
        &self.count_for_item
    }

    /// Co-occurrence count for two items; two placeholders (item id, item id).
    pub fn count_for_item_pair(&self) -> &str {
        &self.count_for_item_pair
    }
}
