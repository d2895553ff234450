//! 此模块定义了所有用于反序列化网易云音乐 API 响应的数据结构。

use serde::Deserialize;

/// 搜索接口 (`/api/search/pc`) 的响应。
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// 状态码，`200` 表示成功。
    pub code: i32,
    /// 搜索结果，无结果时可能缺失。
    #[serde(default)]
    pub result: Option<SearchResultData>,
}

/// 搜索结果的数据部分。
#[derive(Debug, Deserialize)]
pub struct SearchResultData {
    /// 歌曲列表。
    #[serde(default)]
    pub songs: Vec<Song>,
    /// 歌曲总数。
    #[serde(default, rename = "songCount")]
    pub song_count: u32,
}

/// 单首歌曲。
#[derive(Debug, Deserialize)]
pub struct Song {
    /// 歌曲 ID。
    pub id: u64,
    /// 歌曲名。
    pub name: String,
    /// 歌手列表。
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl Song {
    /// 以 `/` 连接所有歌手名。
    pub fn joined_artists(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// 歌手信息。
#[derive(Debug, Deserialize)]
pub struct Artist {
    /// 歌手名。
    pub name: String,
}

impl SearchResponse {
    /// 取出歌曲列表，缺失时视为空。
    pub fn into_songs(self) -> Vec<Song> {
        self.result.map(|r| r.songs).unwrap_or_default()
    }
}

/// 歌词接口 (`/api/song/media`) 的响应。
#[derive(Debug, Deserialize)]
pub struct LyricResponse {
    /// 状态码，`200` 表示成功。
    pub code: i32,
    /// LRC 歌词文本，纯音乐或无歌词时为空。
    #[serde(default)]
    pub lyric: String,
}
