//! Boolean preference store - the fixed operation surface
//!
//! Eleven operations over one two-column table. Each call borrows a fresh
//! connection from the provider; scalar operations release it before
//! returning, lazy operations hand it to the returned [`RowCursor`], which
//! the caller must fully consume, close, or drop.

use std::collections::HashSet;

use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params};

use crate::binding::TableBinding;
use crate::catalog::QueryCatalog;
use crate::cursor::{CursorPolicy, RowCursor, SqliteCursorPolicy};
use crate::provider::ConnectionProvider;
use crate::{ItemId, Result, UserId, schema};

/// Data access over a user→item boolean preference table.
///
/// Immutable after construction; safe to share across threads. Two
/// concurrent calls never share a connection, statement, or cursor.
pub struct BooleanPrefStore<P, C = SqliteCursorPolicy> {
    provider: P,
    binding: TableBinding,
    catalog: QueryCatalog,
    policy: C,
}

impl<P: ConnectionProvider> BooleanPrefStore<P, SqliteCursorPolicy> {
    /// Store with the SQLite cursor policy (row-by-row streaming,
    /// fetch-and-discard advance).
    pub fn new(provider: P, binding: TableBinding) -> Self {
        Self::with_policy(provider, binding, SqliteCursorPolicy)
    }
}

impl<P: ConnectionProvider, C: CursorPolicy> BooleanPrefStore<P, C> {
    /// Store with an explicit per-engine cursor policy.
    pub fn with_policy(provider: P, binding: TableBinding, policy: C) -> Self {
        let catalog = QueryCatalog::new(&binding);
        Self {
            provider,
            binding,
            catalog,
            policy,
        }
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &C {
        &self.policy
    }

    /// Create the preference table and its indexes if they don't exist.
    pub fn initialize_schema(&self) -> Result<()> {
        let conn = self.provider.acquire()?;
        for stmt in schema::all_schema_statements(&self.binding) {
            conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    // ========== Scalar Operations ==========

    /// Item ids the user has a preference for, as an unordered set.
    pub fn items_for_user(&self, user: UserId) -> Result<HashSet<ItemId>> {
        let conn = self.provider.acquire()?;
        let mut stmt = conn.prepare(self.catalog.items_for_user())?;
        let items = stmt
            .query_map([user], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<ItemId>>>()?;
        Ok(items)
    }

    /// Count of distinct items with at least one preference.
    pub fn num_items(&self) -> Result<usize> {
        self.count(self.catalog.num_items(), params![])
    }

    /// Count of distinct users with at least one preference.
    pub fn num_users(&self) -> Result<usize> {
        self.count(self.catalog.num_users(), params![])
    }

    /// Record a preference. Idempotent: inserting an existing pair is a
    /// no-op, not an error, including under concurrent callers.
    pub fn set_preference(&self, user: UserId, item: ItemId) -> Result<()> {
        tracing::debug!("set preference ({user}, {item})");
        let conn = self.provider.acquire()?;
        conn.execute(self.catalog.set_preference(), params![user, item])?;
        Ok(())
    }

    /// Delete the (user, item) pair if present.
    pub fn remove_preference(&self, user: UserId, item: ItemId) -> Result<()> {
        tracing::debug!("remove preference ({user}, {item})");
        let conn = self.provider.acquire()?;
        conn.execute(self.catalog.remove_preference(), params![user, item])?;
        Ok(())
    }

    /// Whether any user has a preference for this item. Absence is a
    /// normal `false`, never an error.
    pub fn item_exists(&self, item: ItemId) -> Result<bool> {
        let conn = self.provider.acquire()?;
        let row: Option<i64> = conn
            .query_row(self.catalog.item_exists(), [item], |row| row.get(0))
            .optional()?;
        Ok(row.is_some())
    }

    /// Number of users with a preference for this item.
    pub fn count_for_item(&self, item: ItemId) -> Result<usize> {
        self.count(self.catalog.count_for_item(), params![item])
    }

    /// Co-occurrence count: users holding a preference for both items.
    pub fn count_for_item_pair(&self, item1: ItemId, item2: ItemId) -> Result<usize> {
        self.count(self.catalog.count_for_item_pair(), params![item1, item2])
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> Result<usize> {
        let conn = self.provider.acquire()?;
        let count: i64 = conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Lazy Operations ==========

    /// Every (item id, user id) pair, ordered ascending by user id.
    ///
    /// The cursor holds a connection until consumed, closed, or dropped.
    pub fn all_user_item_pairs(&self) -> Result<RowCursor<(ItemId, UserId)>> {
        let conn = self.provider.acquire()?;
        Ok(RowCursor::open(
            conn,
            self.catalog.all_user_item_pairs(),
            Vec::new(),
            self.policy.fetch_size(),
            |row| Ok((row.get(0)?, row.get(1)?)),
        ))
    }

    /// Distinct item ids, ordered ascending.
    ///
    /// The cursor holds a connection until consumed, closed, or dropped.
    pub fn all_items(&self) -> Result<RowCursor<ItemId>> {
        let conn = self.provider.acquire()?;
        Ok(RowCursor::open(
            conn,
            self.catalog.all_items(),
            Vec::new(),
            self.policy.fetch_size(),
            |row| row.get(0),
        ))
    }

    /// User ids with a preference for this item, ordered ascending.
    ///
    /// The cursor holds a connection until consumed, closed, or dropped.
    pub fn users_for_item(&self, item: ItemId) -> Result<RowCursor<UserId>> {
        let conn = self.provider.acquire()?;
        Ok(RowCursor::open(
            conn,
            self.catalog.users_for_item(),
            vec![Value::from(item)],
            self.policy.fetch_size(),
            |row| row.get(0),
        ))
    }

    /// Skip up to `n` rows of a cursor via this store's policy.
    pub fn advance<T>(&self, cursor: &mut RowCursor<T>, n: u64) -> Result<u64> {
        self.policy.advance(cursor, n)
    }
}
