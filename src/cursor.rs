//! Streaming cursor policy - bounded-memory iteration over large results
//!
//! Read operations that return a lazy sequence hand their connection to a
//! [`RowCursor`], which pulls rows in windows of at most the configured
//! fetch size. The [`CursorPolicy`] trait is the per-engine strategy point:
//! the fetch-size hint (with a row-by-row sentinel) and the forward-only
//! `advance` fallback, selected once at store construction.

use std::collections::VecDeque;

use rusqlite::types::Value;
use rusqlite::{Connection, Row, ToSql};

use crate::{Error, Result};

/// Window size used when a policy does not ask for row-by-row streaming.
pub const DEFAULT_FETCH_SIZE: usize = 1024;

/// How many rows a cursor may buffer client-side between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSize {
    /// Stream one row at a time; never buffer a full batch. The sentinel
    /// for engines whose drivers would otherwise buffer the entire result.
    RowByRow,
    /// Buffer at most this many rows per fetch.
    Rows(usize),
}

impl FetchSize {
    pub(crate) fn window(self) -> usize {
        match self {
            FetchSize::RowByRow => 1,
            FetchSize::Rows(n) => n.max(1),
        }
    }
}

/// Per-engine streaming strategy, selected at store construction.
///
/// Both hooks are independent: the fetch size bounds client-side buffering,
/// and `advance` positions a forward-only cursor when the engine cannot
/// reposition efficiently.
pub trait CursorPolicy: Send + Sync {
    /// Hint applied to every lazy read before execution.
    fn fetch_size(&self) -> FetchSize {
        FetchSize::Rows(DEFAULT_FETCH_SIZE)
    }

    /// Skip up to `n` rows, returning how many were actually skipped.
    ///
    /// The default fetches-and-discards one row at a time, which is always
    /// correct on a forward-only cursor, only slower. A cursor with fewer
    /// than `n` remaining rows is exhausted, not an error.
    fn advance<T>(&self, cursor: &mut RowCursor<T>, n: u64) -> Result<u64> {
        let mut skipped = 0;
        while skipped < n {
            match cursor.next() {
                Some(Ok(_)) => skipped += 1,
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }
        Ok(skipped)
    }
}

/// Policy for the SQLite binding: stream row-by-row and keep the
/// fetch-and-discard advance, since the cursor is forward-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCursorPolicy;

impl CursorPolicy for SqliteCursorPolicy {
    fn fetch_size(&self) -> FetchSize {
        FetchSize::RowByRow
    }
}

/// Maps one result row to a typed value.
pub type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// A lazy, forward-only sequence of typed rows.
///
/// Owns its connection for its entire lifetime: callers must fully consume
/// the cursor, call [`RowCursor::close`], or drop it to release the
/// connection. Rows are fetched in windows of at most the fetch size given
/// at open time, so memory stays bounded regardless of result size.
pub struct RowCursor<T> {
    conn: Option<Connection>,
    sql: String,
    params: Vec<Value>,
    mapper: RowMapper<T>,
    window: usize,
    offset: i64,
    batch: VecDeque<T>,
    exhausted: bool,
}

impl<T> RowCursor<T> {
    pub(crate) fn open(
        conn: Connection,
        sql: &str,
        params: Vec<Value>,
        fetch_size: FetchSize,
        mapper: RowMapper<T>,
    ) -> Self {
        // The catalog text is extended with a window clause; the window
        // bounds travel as trailing placeholders after the real parameters.
        let n = params.len();
        let sql = format!("{sql} LIMIT ?{} OFFSET ?{}", n + 1, n + 2);
        Self {
            conn: Some(conn),
            sql,
            params,
            mapper,
            window: fetch_size.window(),
            offset: 0,
            batch: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Rows currently held in client memory. Never exceeds the fetch size.
    pub fn buffered(&self) -> usize {
        self.batch.len()
    }

    /// Release the underlying connection explicitly, surfacing any close
    /// error. Dropping the cursor releases it silently.
    pub fn close(mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| Error::Store(e))?;
        }
        Ok(())
    }

    fn refill(&mut self) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        let Some(conn) = self.conn.as_ref() else {
            self.exhausted = true;
            return Ok(());
        };
        let mapper = self.mapper;
        let limit = self.window as i64;
        let mut fetched = Vec::with_capacity(self.window);
        {
            let mut stmt = conn.prepare_cached(&self.sql)?;
            let mut bound: Vec<&dyn ToSql> =
                self.params.iter().map(|v| v as &dyn ToSql).collect();
            bound.push(&limit);
            bound.push(&self.offset);
            let mut rows = stmt.query(&bound[..])?;
            while let Some(row) = rows.next()? {
                fetched.push(mapper(row)?);
            }
        }
        self.offset += fetched.len() as i64;
        if (fetched.len() as i64) < limit {
            self.exhausted = true;
        }
        self.batch.extend(fetched);
        Ok(())
    }

    fn release(&mut self) {
        self.exhausted = true;
        self.batch.clear();
        self.conn = None;
    }
}

impl<T> Iterator for RowCursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch.is_empty() {
            if let Err(e) = self.refill() {
                // Connection goes back on the error path too.
                self.release();
                return Some(Err(e));
            }
        }
        match self.batch.pop_front() {
            Some(value) => Some(Ok(value)),
            None => {
                self.release();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_connection(rows: i64) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE nums (n INTEGER PRIMARY KEY)", [])
            .unwrap();
        for n in 0..rows {
            conn.execute("INSERT INTO nums (n) VALUES (?1)", [n]).unwrap();
        }
        conn
    }

    fn cursor_over(rows: i64, fetch_size: FetchSize) -> RowCursor<i64> {
        RowCursor::open(
            seeded_connection(rows),
            "SELECT n FROM nums ORDER BY n",
            Vec::new(),
            fetch_size,
            |row| row.get(0),
        )
    }

    #[test]
    fn test_row_by_row_never_buffers_more_than_one_row() {
        let mut cursor = cursor_over(10_000, FetchSize::RowByRow);
        let mut count = 0i64;
        while let Some(value) = cursor.next() {
            assert_eq!(value.unwrap(), count);
            assert!(cursor.buffered() <= 1);
            count += 1;
        }
        assert_eq!(count, 10_000);
    }

    #[test]
    fn test_batched_cursor_yields_all_rows_in_order() {
        let cursor = cursor_over(2_500, FetchSize::Rows(64));
        let values: Vec<i64> = cursor.map(|r| r.unwrap()).collect();
        assert_eq!(values.len(), 2_500);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_batched_buffer_bounded_by_window() {
        let mut cursor = cursor_over(1_000, FetchSize::Rows(100));
        while let Some(value) = cursor.next() {
            value.unwrap();
            assert!(cursor.buffered() < 100);
        }
    }

    #[test]
    fn test_advance_past_end_exhausts_without_error() {
        let policy = SqliteCursorPolicy;
        let mut cursor = cursor_over(5, FetchSize::RowByRow);
        let skipped = policy.advance(&mut cursor, 10).unwrap();
        assert_eq!(skipped, 5);
        assert!(cursor.next().is_none());
        assert_eq!(policy.advance(&mut cursor, 3).unwrap(), 0);
    }

    #[test]
    fn test_advance_then_resume_iteration() {
        let policy = SqliteCursorPolicy;
        let mut cursor = cursor_over(10, FetchSize::RowByRow);
        assert_eq!(policy.advance(&mut cursor, 4).unwrap(), 4);
        assert_eq!(cursor.next().unwrap().unwrap(), 4);
    }

    #[test]
    fn test_close_releases_connection() {
        let cursor = cursor_over(5, FetchSize::RowByRow);
        cursor.close().unwrap();
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut cursor = cursor_over(0, FetchSize::Rows(16));
        assert!(cursor.next().is_none());
        assert_eq!(cursor.buffered(), 0);
    }

    #[test]
    fn test_fetch_size_window() {
        assert_eq!(FetchSize::RowByRow.window(), 1);
        assert_eq!(FetchSize::Rows(0).window(), 1);
        assert_eq!(FetchSize::Rows(500).window(), 500);
    }
}
