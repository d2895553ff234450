//! 此模块定义了所有用于反序列化 QQ 音乐 API 响应的数据结构。

use serde::Deserialize;

// =================================================================
// 搜索接口 (`smartbox_new.fcg`) 的模型
// =================================================================

/// 搜索接口的顶层响应结构。
#[derive(Debug, Deserialize)]
pub struct SmartboxResponse {
    /// 业务状态码，`0` 表示成功。
    pub code: i32,
    /// 业务子状态码。
    #[serde(default)]
    pub subcode: i32,
    /// 搜索结果。
    #[serde(default)]
    pub data: Option<SmartboxData>,
}

/// 搜索结果按类型分组。
#[derive(Debug, Deserialize)]
pub struct SmartboxData {
    /// 歌曲分组。
    #[serde(default)]
    pub song: Option<SmartboxGroup>,
}

/// 某一类型的搜索结果。
#[derive(Debug, Deserialize)]
pub struct SmartboxGroup {
    /// 结果数量。
    #[serde(default)]
    pub count: u32,
    /// 结果列表。
    #[serde(default)]
    pub itemlist: Vec<SmartboxSong>,
}

/// 单首歌曲的搜索结果。
#[derive(Debug, Deserialize)]
pub struct SmartboxSong {
    /// 歌曲 MID，用于获取歌词。
    pub mid: String,
    /// 歌曲名。
    pub name: String,
    /// 歌手，多个歌手以 `/` 分隔。
    #[serde(default)]
    pub singer: String,
}

impl SmartboxResponse {
    /// 取出歌曲结果，缺失的字段视为空列表。
    pub fn into_songs(self) -> Vec<SmartboxSong> {
        self.data
            .and_then(|d| d.song)
            .map(|g| g.itemlist)
            .unwrap_or_default()
    }
}

// =================================================================
// 歌词接口 (`fcg_query_lyric_new.fcg`) 的模型
// =================================================================

/// 歌词接口的响应结构。
#[derive(Debug, Deserialize)]
pub struct LyricResponse {
    /// 业务状态码，`0` 表示成功。
    pub code: i32,
    /// Base64 编码的 LRC 歌词。
    #[serde(default)]
    pub lyric: String,
    /// Base64 编码的翻译歌词，可能为空。
    #[serde(default)]
    pub trans: String,
}
