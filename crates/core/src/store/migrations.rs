//! Schema migrations.
//!
//! The applied schema version lives in SQLite's `user_version` header field.
//! Each step runs in its own transaction together with the version bump, so a
//! failed step leaves the database at the previous version.

use tokio_rusqlite::Connection;

use super::Error;

/// Ordered schema steps. Step `n` (1-based) moves `user_version` to `n`.
const STEPS: &[(&str, &str)] = &[
    ("evaluations", include_str!("../../migrations/001_evaluations.sql")),
    ("servers", include_str!("../../migrations/002_servers.sql")),
];

/// Bring the schema up to the latest version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let latest = STEPS.len() as i64;
        if current > latest {
            return Err(Error::MigrationFailed(format!(
                "database schema version {current} is newer than supported version {latest}"
            )));
        }

        for (version, (name, sql)) in (1_i64..).zip(STEPS).skip(current as usize) {
            tracing::debug!(version, name, "applying schema step");

            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("{name}: {e}")))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EvaluationDb;

    async fn user_version(conn: &Connection) -> i64 {
        conn.call(|conn| conn.query_row("PRAGMA user_version", [], |row| row.get(0)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_reaches_latest_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        assert_eq!(user_version(&conn).await, STEPS.len() as i64);

        run(&conn).await.unwrap();
        assert_eq!(user_version(&conn).await, STEPS.len() as i64);
    }

    #[tokio::test]
    async fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| conn.pragma_update(None, "user_version", 99))
            .await
            .unwrap();

        let err = run(&conn).await.unwrap_err();
        assert!(matches!(err, Error::MigrationFailed(_)));
    }

    #[tokio::test]
    async fn test_deleting_evaluation_cascades_to_servers() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        let remaining: i64 = db
            .conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO evaluations (domain, evaluation_hour) VALUES ('a.com', '2016-01-01T13:00:00.000000000Z')",
                    [],
                )?;
                let id = conn.last_insert_rowid();
                conn.execute("INSERT INTO servers (evaluation_id, address) VALUES (?1, '10.0.0.1')", [id])?;
                conn.execute("INSERT INTO servers (evaluation_id, address) VALUES (?1, '10.0.0.2')", [id])?;
                conn.execute("DELETE FROM evaluations WHERE id = ?1", [id])?;
                conn.query_row("SELECT COUNT(*) FROM servers", [], |row| row.get(0))
            })
            .await
            .unwrap();

        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_server_requires_existing_evaluation() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        let result = db
            .conn
            .call(|conn| conn.execute("INSERT INTO servers (evaluation_id, address) VALUES (42, '10.0.0.1')", []))
            .await;

        assert!(result.is_err());
    }
}
