//! SQLite-backed repository for computed analysis records.
//!
//! The structured payload is stored as JSON TEXT; `schema_version` is a
//! separate column so readers can reject stale shapes without a JSON parse.

use sqlx::SqlitePool;

use crate::persistence::traits::AnalysisRepository;
use crate::persistence::{AnalysisRecord, StorageError};

/// Row type for analysis queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct AnalysisRow {
    game_uuid: String,
    username: String,
    schema_version: i64,
    analysis: String,
    created_at: i64,
}

impl AnalysisRow {
    fn into_record(self) -> Result<AnalysisRecord, StorageError> {
        Ok(AnalysisRecord {
            game_uuid: self.game_uuid,
            username: self.username,
            schema_version: self.schema_version as i32,
            analysis: serde_json::from_str(&self.analysis)?,
            created_at: self.created_at,
        })
    }
}

/// SQLite implementation of [`AnalysisRepository`].
pub struct SqliteAnalysisRepository {
    pool: SqlitePool,
}

impl SqliteAnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AnalysisRepository for SqliteAnalysisRepository {
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&record.analysis)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO game_analyses
                (game_uuid, username, schema_version, analysis, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.game_uuid)
        .bind(&record.username)
        .bind(record.schema_version as i64)
        .bind(payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_analysis(
        &self,
        game_uuid: &str,
        username: &str,
    ) -> Result<Option<AnalysisRecord>, StorageError> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT game_uuid, username, schema_version, analysis, created_at
            FROM game_analyses
            WHERE game_uuid = ? AND username = ?
            "#,
        )
        .bind(game_uuid)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AnalysisRow::into_record).transpose()
    }

    async fn load_analyses_bulk(
        &self,
        username: &str,
        game_uuids: &[String],
    ) -> Result<Vec<AnalysisRecord>, StorageError> {
        let mut records = Vec::with_capacity(game_uuids.len());
        for uuid in game_uuids {
            if let Some(record) = self.load_analysis(uuid, username).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn count_analyses(&self) -> Result<u64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM game_analyses")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    async fn delete_analyses(&self, username: Option<&str>) -> Result<(), StorageError> {
        match username {
            Some(user) => {
                sqlx::query("DELETE FROM game_analyses WHERE username = ?")
                    .bind(user)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM game_analyses")
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::Database;
    use crate::persistence::now_timestamp;
    use analysis::{aggregate_stats, GameAnalysis, ANALYSIS_SCHEMA_VERSION};

    async fn test_repo() -> (Database, SqliteAnalysisRepository) {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteAnalysisRepository::new(db.pool().clone());
        (db, repo)
    }

    fn sample_record(game_uuid: &str, username: &str) -> AnalysisRecord {
        AnalysisRecord {
            game_uuid: game_uuid.to_string(),
            username: username.to_string(),
            schema_version: ANALYSIS_SCHEMA_VERSION,
            analysis: GameAnalysis {
                moves: vec![],
                stats: aggregate_stats(&[]),
                mistakes: vec![],
                summary: "A clean game.".to_string(),
            },
            created_at: now_timestamp(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (_db, repo) = test_repo().await;
        let record = sample_record("g1", "alice");
        repo.save_analysis(&record).await.unwrap();
        let loaded = repo.load_analysis("g1", "alice").await.unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_keyed_per_player_perspective() {
        let (_db, repo) = test_repo().await;
        repo.save_analysis(&sample_record("g1", "alice")).await.unwrap();
        repo.save_analysis(&sample_record("g1", "bob")).await.unwrap();

        assert_eq!(repo.count_analyses().await.unwrap(), 2);
        assert!(repo.load_analysis("g1", "alice").await.unwrap().is_some());
        assert!(repo.load_analysis("g1", "bob").await.unwrap().is_some());
        assert!(repo.load_analysis("g1", "carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let (_db, repo) = test_repo().await;
        let mut record = sample_record("g1", "alice");
        repo.save_analysis(&record).await.unwrap();
        record.analysis.summary = "Updated".to_string();
        repo.save_analysis(&record).await.unwrap();

        assert_eq!(repo.count_analyses().await.unwrap(), 1);
        let loaded = repo.load_analysis("g1", "alice").await.unwrap().unwrap();
        assert_eq!(loaded.analysis.summary, "Updated");
    }

    #[tokio::test]
    async fn test_bulk_omits_absent_keys() {
        let (_db, repo) = test_repo().await;
        repo.save_analysis(&sample_record("g1", "alice")).await.unwrap();
        repo.save_analysis(&sample_record("g3", "alice")).await.unwrap();

        let uuids: Vec<String> = ["g1", "g2", "g3", "g4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let records = repo.load_analyses_bulk("alice", &uuids).await.unwrap();
        let found: Vec<&str> = records.iter().map(|r| r.game_uuid.as_str()).collect();
        assert_eq!(found, vec!["g1", "g3"]);
    }

    #[tokio::test]
    async fn test_delete_scoped() {
        let (_db, repo) = test_repo().await;
        repo.save_analysis(&sample_record("g1", "alice")).await.unwrap();
        repo.save_analysis(&sample_record("g2", "bob")).await.unwrap();

        repo.delete_analyses(Some("alice")).await.unwrap();
        assert!(repo.load_analysis("g1", "alice").await.unwrap().is_none());
        assert!(repo.load_analysis("g2", "bob").await.unwrap().is_some());

        repo.delete_analyses(None).await.unwrap();
        assert_eq!(repo.count_analyses().await.unwrap(), 0);
    }
}
