//! Evaluation header operations.
//!
//! Writes that touch both the header and its servers run in one transaction,
//! so a reader never sees a header linked to a partial server set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio_rusqlite::{params, rusqlite};

use super::connection::EvaluationDb;
use super::servers::insert_servers;
use crate::Error;
use crate::model::{Evaluation, parse_timestamp};

const SELECT_EVALUATION: &str =
    "SELECT id, domain, evaluation_hour, in_progress, ssl_grade, logo, title, is_down FROM evaluations";

fn evaluation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Evaluation> {
    Ok(Evaluation {
        id: row.get(0)?,
        domain: row.get(1)?,
        evaluation_hour: row.get(2)?,
        in_progress: row.get::<_, i32>(3)? == 1,
        ssl_grade: row.get(4)?,
        logo: row.get(5)?,
        title: row.get(6)?,
        is_down: row.get::<_, i32>(7)? == 1,
        servers: Vec::new(),
    })
}

fn evaluation_label(id: i64) -> String {
    format!("evaluation {id}")
}

impl EvaluationDb {
    /// Insert an evaluation and all of its servers.
    ///
    /// The store-assigned ids are written back into `evaluation` and its
    /// servers. Returns the evaluation id.
    pub async fn create_evaluation(&self, evaluation: &mut Evaluation) -> Result<i64, Error> {
        parse_timestamp(&evaluation.evaluation_hour)?;
        let record = evaluation.clone();

        let (id, server_ids) = self
            .conn
            .call(move |conn| -> Result<(i64, Vec<i64>), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO evaluations (domain, evaluation_hour, in_progress, ssl_grade, logo, title, is_down)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        &record.domain,
                        &record.evaluation_hour,
                        record.in_progress as i32,
                        &record.ssl_grade,
                        &record.logo,
                        &record.title,
                        record.is_down as i32,
                    ],
                )?;
                let id = tx.last_insert_rowid();
                let server_ids = insert_servers(&tx, id, &record.servers)?;
                tx.commit()?;
                Ok((id, server_ids))
            })
            .await
            .map_err(Error::from)?;

        evaluation.id = id;
        for (server, server_id) in evaluation.servers.iter_mut().zip(server_ids) {
            server.id = server_id;
        }
        tracing::debug!(id, domain = %evaluation.domain, "created evaluation");
        Ok(id)
    }

    /// Overwrite every header field by id and replace the server list.
    ///
    /// Existing servers are deleted and the current list is reinserted; no
    /// partial diffing. New server ids are written back into `evaluation`.
    pub async fn update_evaluation(&self, evaluation: &mut Evaluation) -> Result<(), Error> {
        parse_timestamp(&evaluation.evaluation_hour)?;
        let record = evaluation.clone();

        let server_ids = self
            .conn
            .call(move |conn| -> Result<Vec<i64>, Error> {
                let tx = conn.transaction()?;
                let updated = tx.execute(
                    "UPDATE evaluations SET domain = ?2, evaluation_hour = ?3, in_progress = ?4,
                        ssl_grade = ?5, logo = ?6, title = ?7, is_down = ?8
                    WHERE id = ?1",
                    params![
                        record.id,
                        &record.domain,
                        &record.evaluation_hour,
                        record.in_progress as i32,
                        &record.ssl_grade,
                        &record.logo,
                        &record.title,
                        record.is_down as i32,
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound(evaluation_label(record.id)));
                }
                tx.execute("DELETE FROM servers WHERE evaluation_id = ?1", params![record.id])?;
                let server_ids = insert_servers(&tx, record.id, &record.servers)?;
                tx.commit()?;
                Ok(server_ids)
            })
            .await
            .map_err(Error::from)?;

        for (server, server_id) in evaluation.servers.iter_mut().zip(server_ids) {
            server.id = server_id;
        }
        Ok(())
    }

    /// Update only `evaluation_hour` for an existing record.
    pub async fn touch_evaluation_hour(&self, evaluation: &Evaluation) -> Result<(), Error> {
        parse_timestamp(&evaluation.evaluation_hour)?;
        let id = evaluation.id;
        let hour = evaluation.evaluation_hour.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let updated =
                    conn.execute("UPDATE evaluations SET evaluation_hour = ?2 WHERE id = ?1", params![id, hour])?;
                if updated == 0 {
                    return Err(Error::NotFound(evaluation_label(id)));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Move a pending evaluation's hour from `expected_hour` to `new_hour`.
    ///
    /// Succeeds only while the row is still in progress and still carries
    /// `expected_hour`, so of several callers that observed the same pending
    /// row exactly one wins. Returns whether this caller won.
    pub async fn claim_pending(&self, id: i64, expected_hour: &str, new_hour: &str) -> Result<bool, Error> {
        parse_timestamp(new_hour)?;
        let expected_hour = expected_hour.to_string();
        let new_hour = new_hour.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let updated = conn.execute(
                    "UPDATE evaluations SET evaluation_hour = ?3
                    WHERE id = ?1 AND evaluation_hour = ?2 AND in_progress = 1",
                    params![id, expected_hour, new_hour],
                )?;
                Ok(updated == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// Read one evaluation header by id. Missing rows are an error.
    pub async fn get_evaluation(&self, id: i64) -> Result<Evaluation, Error> {
        self.conn
            .call(move |conn| -> Result<Evaluation, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_EVALUATION} WHERE id = ?1"))?;
                match stmt.query_row(params![id], evaluation_from_row) {
                    Ok(e) => Ok(e),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(evaluation_label(id))),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Most recent evaluation for `domain` with the given progress flag whose
    /// hour is strictly before `before`.
    ///
    /// "Most recent" compares parsed timestamps, not ids; on equal hours the
    /// lower id wins. A stored hour that does not parse fails the whole lookup.
    /// The returned header has no servers loaded.
    pub async fn find_latest_evaluation(
        &self, domain: &str, in_progress: bool, before: DateTime<Utc>,
    ) -> Result<Option<Evaluation>, Error> {
        let domain = domain.to_string();
        let candidates = self
            .conn
            .call(move |conn| -> Result<Vec<Evaluation>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_EVALUATION} WHERE domain = ?1 AND in_progress = ?2 ORDER BY id ASC"
                ))?;
                let rows = stmt.query_map(params![domain, in_progress as i32], evaluation_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)?;

        let mut latest: Option<(DateTime<Utc>, Evaluation)> = None;
        for candidate in candidates {
            let hour = candidate.hour()?;
            if hour >= before {
                continue;
            }
            match &latest {
                Some((best, _)) if hour <= *best => {}
                _ => latest = Some((hour, candidate)),
            }
        }

        Ok(latest.map(|(_, e)| e))
    }

    /// Latest evaluation of every distinct domain, ordered by domain.
    pub async fn list_recent_evaluations(&self) -> Result<Vec<Evaluation>, Error> {
        let all = self
            .conn
            .call(move |conn| -> Result<Vec<Evaluation>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_EVALUATION} ORDER BY id ASC"))?;
                let rows = stmt.query_map([], evaluation_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)?;

        let mut by_domain: BTreeMap<String, (DateTime<Utc>, Evaluation)> = BTreeMap::new();
        for evaluation in all {
            let hour = evaluation.hour()?;
            match by_domain.get(&evaluation.domain) {
                Some((best, _)) if hour <= *best => {}
                _ => {
                    by_domain.insert(evaluation.domain.clone(), (hour, evaluation));
                }
            }
        }

        Ok(by_domain.into_values().map(|(_, e)| e).collect())
    }

    /// Update only the logo of an evaluation.
    pub async fn update_logo(&self, id: i64, logo: &str) -> Result<(), Error> {
        self.update_text_column(id, "logo", logo).await
    }

    /// Update only the title of an evaluation.
    pub async fn update_title(&self, id: i64, title: &str) -> Result<(), Error> {
        self.update_text_column(id, "title", title).await
    }

    async fn update_text_column(&self, id: i64, column: &'static str, value: &str) -> Result<(), Error> {
        let value = value.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let updated =
                    conn.execute(&format!("UPDATE evaluations SET {column} = ?2 WHERE id = ?1"), params![id, value])?;
                if updated == 0 {
                    return Err(Error::NotFound(evaluation_label(id)));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one evaluation and its servers.
    ///
    /// Administrative only. Returns false if the id did not exist.
    pub async fn delete_evaluation(&self, id: i64) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM servers WHERE evaluation_id = ?1", params![id])?;
                let deleted = tx.execute("DELETE FROM evaluations WHERE id = ?1", params![id])?;
                tx.commit()?;
                Ok(deleted == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every evaluation and server.
    ///
    /// Administrative only. Returns the number of deleted evaluations.
    pub async fn purge_evaluations(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM servers", [])?;
                let count = tx.execute("DELETE FROM evaluations", [])?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
