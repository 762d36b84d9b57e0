//! Trending counter CRUD operations.

use anyhow::{Context, Result};
use cinefind_api::trending::{TrendingEntry, TrendingSeed, normalize_term};
use rusqlite::Connection;

/// Increments the counter for `term`, inserting a seeded row on first use.
///
/// Returns the counter value after the update.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn increment_search(conn: &Connection, term: &str, seed: &TrendingSeed) -> Result<u64> {
    let term = normalize_term(term);
    conn.query_row(
        "INSERT INTO trending (search_term, tmdb_id, title, poster_url, count)
         VALUES (?1, ?2, ?3, ?4, 1)
         ON CONFLICT(search_term) DO UPDATE SET
             count = count + 1,
             updated_at = datetime('now')
         RETURNING count",
        rusqlite::params![term, seed.tmdb_id, seed.title, seed.poster_url],
        |row| row.get(0),
    )
    .with_context(|| format!("failed to increment trending term {term:?}"))
}

/// Loads up to `limit` entries, highest count first.
///
/// Ties keep insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_trending(conn: &Connection, limit: u32) -> Result<Vec<TrendingEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, search_term, tmdb_id, title, poster_url, count
             FROM trending
             ORDER BY count DESC, id
             LIMIT ?1",
        )
        .context("failed to prepare trending query")?;

    let rows = stmt
        .query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            Ok(TrendingEntry {
                id: id.to_string(),
                search_term: row.get(1)?,
                tmdb_id: row.get(2)?,
                title: row.get(3)?,
                poster_url: row.get(4)?,
                count: row.get(5)?,
            })
        })
        .context("failed to query trending")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read trending rows")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::migrations::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn seed(tmdb_id: u64, title: &str) -> TrendingSeed {
        TrendingSeed {
            tmdb_id,
            title: String::from(title),
            poster_url: None,
        }
    }

    #[test]
    fn test_first_search_inserts_with_count_one() {
        // Arrange
        let conn = setup_db();

        // Act
        let count = increment_search(&conn, "Inception", &seed(27_205, "Inception")).unwrap();

        // Assert
        assert_eq!(count, 1);
        let entries = load_trending(&conn, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].search_term, "inception");
        assert_eq!(entries[0].tmdb_id, 27_205);
    }

    #[test]
    fn test_repeat_search_increments_and_keeps_seed() {
        // Arrange
        let conn = setup_db();
        increment_search(&conn, "batman", &seed(414_906, "The Batman")).unwrap();

        // Act: normalized term matches; a different first hit does not reseed
        let count = increment_search(&conn, "  BATMAN ", &seed(268, "Batman")).unwrap();

        // Assert
        assert_eq!(count, 2);
        let entries = load_trending(&conn, 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tmdb_id, 414_906);
        assert_eq!(entries[0].title, "The Batman");
    }

    #[test]
    fn test_load_orders_by_count_then_insertion() {
        // Arrange
        let conn = setup_db();
        increment_search(&conn, "dune", &seed(693_134, "Dune: Part Two")).unwrap();
        increment_search(&conn, "alien", &seed(348, "Alien")).unwrap();
        increment_search(&conn, "inception", &seed(27_205, "Inception")).unwrap();
        increment_search(&conn, "inception", &seed(27_205, "Inception")).unwrap();

        // Act
        let entries = load_trending(&conn, 5).unwrap();

        // Assert
        let terms: Vec<&str> = entries.iter().map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, vec!["inception", "dune", "alien"]);
    }

    #[test]
    fn test_load_respects_limit() {
        // Arrange
        let conn = setup_db();
        for (i, term) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            increment_search(&conn, term, &seed(u64::try_from(i).unwrap(), term)).unwrap();
        }

        // Act
        let entries = load_trending(&conn, 5).unwrap();

        // Assert
        assert_eq!(entries.len(), 5);
    }
}
