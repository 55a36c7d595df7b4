//! SQLite-backed repository for raw game records.

use sqlx::SqlitePool;

use archive::GameRecord;

use super::helpers::{decode_color, encode_color};
use crate::persistence::traits::GameRepository;
use crate::persistence::StorageError;

/// Row type for game queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct GameRow {
    uuid: String,
    username: String,
    year: i64,
    month: i64,
    end_time: i64,
    white: String,
    black: String,
    pgn: String,
    time_class: String,
    result: String,
    player_color: String,
}

impl From<GameRow> for GameRecord {
    fn from(r: GameRow) -> Self {
        Self {
            uuid: r.uuid,
            username: r.username,
            year: r.year as i32,
            month: r.month as u32,
            end_time: r.end_time,
            white: r.white,
            black: r.black,
            pgn: r.pgn,
            time_class: r.time_class,
            result: r.result,
            player_color: decode_color(&r.player_color),
        }
    }
}

/// SQLite implementation of [`GameRepository`].
pub struct SqliteGameRepository {
    pool: SqlitePool,
}

impl SqliteGameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl GameRepository for SqliteGameRepository {
    async fn save_game(&self, record: &GameRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO player_games
                (uuid, username, year, month, end_time, white, black,
                 pgn, time_class, result, player_color)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.uuid)
        .bind(&record.username)
        .bind(record.year as i64)
        .bind(record.month as i64)
        .bind(record.end_time)
        .bind(&record.white)
        .bind(&record.black)
        .bind(&record.pgn)
        .bind(&record.time_class)
        .bind(&record.result)
        .bind(encode_color(record.player_color))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_game(&self, uuid: &str) -> Result<Option<GameRecord>, StorageError> {
        let row: Option<GameRow> = sqlx::query_as(
            r#"
            SELECT uuid, username, year, month, end_time, white, black,
                   pgn, time_class, result, player_color
            FROM player_games
            WHERE uuid = ?
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GameRecord::from))
    }

    async fn count_games(&self) -> Result<u64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM player_games")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    async fn delete_games(&self, username: Option<&str>) -> Result<(), StorageError> {
        match username {
            Some(user) => {
                sqlx::query("DELETE FROM player_games WHERE username = ?")
                    .bind(user)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM player_games")
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
    use archive::Color;

    async fn test_repo() -> (Database, SqliteGameRepository) {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteGameRepository::new(db.pool().clone());
        (db, repo)
    }

    fn sample_game(uuid: &str, username: &str) -> GameRecord {
        GameRecord::new(
            uuid,
            username,
            1_710_504_000,
            username,
            "opponent",
            "1. e4 e5 1-0",
            "blitz",
            "win",
            Color::White,
        )
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (_db, repo) = test_repo().await;
        let game = sample_game("g1", "alice");
        repo.save_game(&game).await.unwrap();
        let loaded = repo.load_game("g1").await.unwrap();
        assert_eq!(loaded, Some(game));
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (_db, repo) = test_repo().await;
        assert_eq!(repo.load_game("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_twice_is_upsert() {
        let (_db, repo) = test_repo().await;
        let mut game = sample_game("g1", "alice");
        repo.save_game(&game).await.unwrap();
        game.result = "resigned".to_string();
        repo.save_game(&game).await.unwrap();

        assert_eq!(repo.count_games().await.unwrap(), 1);
        let loaded = repo.load_game("g1").await.unwrap().unwrap();
        assert_eq!(loaded.result, "resigned");
    }

    #[tokio::test]
    async fn test_delete_scoped_to_username() {
        let (_db, repo) = test_repo().await;
        repo.save_game(&sample_game("g1", "alice")).await.unwrap();
        repo.save_game(&sample_game("g2", "bob")).await.unwrap();

        repo.delete_games(Some("alice")).await.unwrap();
        assert_eq!(repo.load_game("g1").await.unwrap(), None);
        assert!(repo.load_game("g2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (_db, repo) = test_repo().await;
        repo.save_game(&sample_game("g1", "alice")).await.unwrap();
        repo.save_game(&sample_game("g2", "bob")).await.unwrap();

        repo.delete_games(None).await.unwrap();
        assert_eq!(repo.count_games().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_nothing_matching_is_ok() {
        let (_db, repo) = test_repo().await;
        repo.delete_games(Some("ghost")).await.unwrap();
        repo.delete_games(None).await.unwrap();
    }
}
