//! 此模块定义了所有用于反序列化酷狗音乐 API 响应的数据结构。

use serde::Deserialize;

// =================================================================
// 歌曲搜索接口 (`/api/v3/search/song`) 的模型
// =================================================================

/// 歌曲搜索 API 的顶层响应结构。
#[derive(Debug, Deserialize)]
pub struct SearchSongResponse {
    /// API 状态码，`1` 通常表示成功。
    #[serde(default)]
    pub status: i32,

    /// API 错误码，`0` 表示成功。
    pub errcode: i32,

    /// 错误的具体信息。
    #[serde(default)]
    pub error: String,

    /// 包含实际搜索结果的数据容器。
    #[serde(default)]
    pub data: Option<SearchSongData>,
}

/// 歌曲搜索结果的数据部分。
#[derive(Debug, Deserialize)]
pub struct SearchSongData {
    /// 搜索到的歌曲总数。
    #[serde(default)]
    pub total: u32,
    /// 歌曲列表。
    #[serde(default)]
    pub info: Vec<SongInfo>,
}

/// 一首歌曲的搜索结果。
#[derive(Debug, Deserialize)]
pub struct SongInfo {
    /// 歌曲的文件哈希，用于查询歌词候选项。
    pub hash: String,
    /// 歌曲名。
    pub songname: String,
    /// 歌手名。
    #[serde(default)]
    pub singername: String,
}

impl SearchSongResponse {
    /// 取出歌曲列表，缺失时视为空。
    pub fn into_songs(self) -> Vec<SongInfo> {
        self.data.map(|d| d.info).unwrap_or_default()
    }
}

// =================================================================
// 歌词候选项接口 (`krcs.kugou.com/search`) 的模型
// =================================================================

/// 歌词候选项接口的响应。
#[derive(Debug, Deserialize)]
pub struct LyricSearchResponse {
    /// 状态码，`200` 表示成功。
    pub status: i32,
    /// 错误信息。
    #[serde(default)]
    pub errmsg: String,
    /// 歌词候选项列表。
    #[serde(default)]
    pub candidates: Vec<LyricCandidate>,
}

/// 一个歌词候选项。
#[derive(Debug, Deserialize)]
pub struct LyricCandidate {
    /// 歌词 ID。
    pub id: String,
    /// 下载歌词所需的访问密钥。
    pub accesskey: String,
    /// 歌曲名。
    #[serde(default)]
    pub song: String,
    /// 歌手名。
    #[serde(default)]
    pub singer: String,
}

// =================================================================
// 歌词下载接口 (`/download`) 的模型
// =================================================================

/// 歌词下载接口的响应结构。
#[derive(Debug, Deserialize)]
pub struct LyricDownloadResponse {
    /// 状态码，`200` 表示成功。
    pub status: i32,
    /// 歌词格式，例如 `krc`。
    #[serde(default)]
    pub fmt: String,
    /// Base64 编码的加密歌词内容。
    #[serde(default)]
    pub content: String,
}
