//! Server rows belonging to an evaluation.

use tokio_rusqlite::{params, rusqlite};

use super::connection::EvaluationDb;
use crate::Error;
use crate::model::{Evaluation, Server};

/// Insert `servers` under `evaluation_id` inside an open transaction.
///
/// Returns the new row ids in input order.
pub(crate) fn insert_servers(
    tx: &rusqlite::Transaction<'_>, evaluation_id: i64, servers: &[Server],
) -> Result<Vec<i64>, Error> {
    let mut stmt = tx.prepare(
        "INSERT INTO servers (evaluation_id, address, ssl_grade, country, owner)
        VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    let mut ids = Vec::with_capacity(servers.len());
    for server in servers {
        let id = stmt.insert(params![
            evaluation_id,
            &server.address,
            &server.ssl_grade,
            &server.country,
            &server.owner,
        ])?;
        ids.push(id);
    }
    Ok(ids)
}

fn server_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Server> {
    Ok(Server {
        id: row.get(0)?,
        address: row.get(1)?,
        ssl_grade: row.get(2)?,
        country: row.get(3)?,
        owner: row.get(4)?,
    })
}

impl EvaluationDb {
    /// Servers of an evaluation in insertion order.
    pub async fn load_servers(&self, evaluation_id: i64) -> Result<Vec<Server>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<Server>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, address, ssl_grade, country, owner FROM servers
                    WHERE evaluation_id = ?1 ORDER BY id ASC",
                )?;
                let rows = stmt.query_map(params![evaluation_id], server_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Attach the stored server list to `evaluation`.
    pub async fn with_servers(&self, mut evaluation: Evaluation) -> Result<Evaluation, Error> {
        evaluation.servers = self.load_servers(evaluation.id).await?;
        Ok(evaluation)
    }

    /// Update a single server's grade, country and owner by id.
    pub async fn update_server_details(&self, server: &Server) -> Result<(), Error> {
        let server = server.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let updated = conn.execute(
                    "UPDATE servers SET address = ?2, ssl_grade = ?3, country = ?4, owner = ?5 WHERE id = ?1",
                    params![server.id, &server.address, &server.ssl_grade, &server.country, &server.owner],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound(format!("server {}", server.id)));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
