//! 基于 SQLite 的歌词缓存。
//!
//! 每个外部 ID 最多缓存一条 `MusicRelation`。每次操作都会打开一个新的连接，
//! 操作结束后立即关闭。

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::Utc;
use sqlx::{
    ConnectOptions, Connection,
    sqlite::{SqliteConnectOptions, SqliteConnection},
};
use tracing::{debug, info};

use crate::{
    error::{LyricsResolverError, Result},
    model::relation::MusicRelation,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS lyrics_relation (
        external_id    TEXT PRIMARY KEY,
        relation_id    TEXT NOT NULL,
        title          TEXT NOT NULL,
        artist         TEXT NOT NULL,
        lyrics_content TEXT NOT NULL,
        lyrics_trans   TEXT,
        source_name    TEXT NOT NULL,
        offset_ms      INTEGER NOT NULL DEFAULT 0,
        created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at     TEXT NOT NULL
    )
"#;

const SELECT_BY_EXTERNAL_ID: &str = r#"
    SELECT relation_id, title, artist, lyrics_content, lyrics_trans, source_name, offset_ms
    FROM lyrics_relation
    WHERE external_id = ?
"#;

const UPSERT_PRESERVING_OFFSET: &str = r#"
    INSERT INTO lyrics_relation
        (external_id, relation_id, title, artist, lyrics_content, lyrics_trans, source_name, offset_ms, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(external_id) DO UPDATE SET
        relation_id = excluded.relation_id,
        title = excluded.title,
        artist = excluded.artist,
        lyrics_content = excluded.lyrics_content,
        lyrics_trans = excluded.lyrics_trans,
        source_name = excluded.source_name,
        updated_at = excluded.updated_at
"#;

const UPSERT_REPLACING_OFFSET: &str = r#"
    INSERT INTO lyrics_relation
        (external_id, relation_id, title, artist, lyrics_content, lyrics_trans, source_name, offset_ms, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(external_id) DO UPDATE SET
        relation_id = excluded.relation_id,
        title = excluded.title,
        artist = excluded.artist,
        lyrics_content = excluded.lyrics_content,
        lyrics_trans = excluded.lyrics_trans,
        source_name = excluded.source_name,
        offset_ms = excluded.offset_ms,
        updated_at = excluded.updated_at
"#;

const UPDATE_OFFSET: &str = r#"
    UPDATE lyrics_relation
    SET offset_ms = ?, updated_at = ?
    WHERE external_id = ? AND relation_id = ?
"#;

type RelationRow = (String, String, String, String, Option<String>, String, i64);

/// 写入缓存时如何处理已有条目的偏移值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetWrite {
    /// 保留已有条目的偏移；新条目使用结果自带的偏移。
    #[default]
    Preserve,
    /// 用结果自带的偏移覆盖已有条目。
    Replace,
}

/// 歌词缓存的访问入口。
#[derive(Debug, Clone)]
pub struct CacheGateway {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl CacheGateway {
    /// 打开（必要时创建）缓存文件，并确保表结构存在。
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let gateway = Self { path, options };
        let mut conn = gateway.connect().await?;
        sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
        conn.close().await?;

        info!("歌词缓存已就绪: {}", gateway.path.display());
        Ok(gateway)
    }

    /// 缓存文件路径。
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        Ok(self.options.connect().await?)
    }

    /// 读取某个外部 ID 的缓存条目，不存在时返回空列表。
    pub async fn lookup(&self, external_id: &str) -> Result<Vec<MusicRelation>> {
        let mut conn = self.connect().await?;
        let rows: Vec<RelationRow> = sqlx::query_as(SELECT_BY_EXTERNAL_ID)
            .bind(external_id)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        debug!("缓存查询 [{}] 命中 {} 条", external_id, rows.len());

        Ok(rows
            .into_iter()
            .map(
                |(relation_id, title, artist, lyrics, trans, source_name, offset)| MusicRelation {
                    title,
                    artist,
                    external_id: external_id.to_string(),
                    provider_track_id: relation_id,
                    lyrics_body: lyrics,
                    translated_lyrics_body: trans,
                    source_name,
                    offset_millis: offset,
                },
            )
            .collect())
    }

    /// 以外部 ID 为键插入或替换一条缓存。
    pub async fn upsert(&self, relation: &MusicRelation, offset_write: OffsetWrite) -> Result<()> {
        let sql = match offset_write {
            OffsetWrite::Preserve => UPSERT_PRESERVING_OFFSET,
            OffsetWrite::Replace => UPSERT_REPLACING_OFFSET,
        };

        let mut conn = self.connect().await?;
        sqlx::query(sql)
            .bind(&relation.external_id)
            .bind(&relation.provider_track_id)
            .bind(&relation.title)
            .bind(&relation.artist)
            .bind(&relation.lyrics_body)
            .bind(&relation.translated_lyrics_body)
            .bind(&relation.source_name)
            .bind(relation.offset_millis)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        info!(
            "已缓存 [{}] -> [{}] ({})",
            relation.external_id, relation.provider_track_id, relation.source_name
        );
        Ok(())
    }

    /// 修改某条缓存的偏移值。
    ///
    /// 没有匹配 `(external_id, relation_id)` 的条目时返回
    /// [`LyricsResolverError::CacheEntryNotFound`]。
    pub async fn adjust_offset(
        &self,
        external_id: &str,
        relation_id: &str,
        offset: i64,
    ) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(UPDATE_OFFSET)
            .bind(offset)
            .bind(Utc::now().to_rfc3339())
            .bind(external_id)
            .bind(relation_id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        if result.rows_affected() == 0 {
            return Err(LyricsResolverError::CacheEntryNotFound {
                external_id: external_id.to_string(),
                relation_id: relation_id.to_string(),
            });
        }

        info!("已更新 [{}, {}] 的偏移为 {}ms", external_id, relation_id, offset);
        Ok(())
    }
}
