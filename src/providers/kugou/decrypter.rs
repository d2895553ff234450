//! 酷狗 KRC 歌词解密。
//!
//! KRC 容器的结构：4 字节的 `krc1` 头部，之后是与固定 16 字节密钥循环异或、
//! 再经 zlib 压缩的歌词文本。
//!
//! ## 致谢
//!
//! 本模块的解密逻辑（包括固定的16字节密钥和异或算法）源于
//! `LyricDecoder` 项目。
//!
//! - Copyright (c) `SuJiKiNen` (`LyricDecoder` Project)
//! - Licensed under the MIT License.
//!
//! <https://github.com/SuJiKiNen/LyricDecoder>

use std::io::Read;

use base64::{Engine as _, engine::general_purpose};
use flate2::read::ZlibDecoder;

use crate::error::{LyricsResolverError, Result};

/// KRC 容器的头部标记。
const KRC_HEADER: &[u8; 4] = b"krc1";

/// 酷狗 KRC 歌词解密所使用的固定16字节密钥。
const KRC_DECRYPT_KEY: [u8; 16] = [
    0x40, 0x47, 0x61, 0x77, 0x5E, 0x32, 0x74, 0x47, 0x51, 0x36, 0x31, 0x2D, 0xCE, 0xD2, 0x6E, 0x69,
];

/// 解密酷狗音乐的 KRC 格式歌词。
///
/// # 参数
///
/// * `encrypted_krc_base64` - 下载接口返回的 Base64 编码的 KRC 容器。
///
/// # 错误
///
/// * `LyricsResolverError::Base64Decode` - 输入不是有效的 Base64。
/// * `LyricsResolverError::Decryption` - 缺少 `krc1` 头部。
/// * `LyricsResolverError::Io` - Zlib 解压缩失败。
/// * `LyricsResolverError::FromUtf8` - 解密后的数据不是有效的 UTF-8。
pub fn decrypt_krc(encrypted_krc_base64: &str) -> Result<String> {
    let mut data = general_purpose::STANDARD.decode(encrypted_krc_base64.as_bytes())?;

    if !data.starts_with(KRC_HEADER) {
        return Err(LyricsResolverError::Decryption(
            "KRC 数据缺少 krc1 头部".into(),
        ));
    }

    let payload = &mut data[KRC_HEADER.len()..];
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte ^= KRC_DECRYPT_KEY[i % KRC_DECRYPT_KEY.len()];
    }

    let mut decoder = ZlibDecoder::new(&*payload);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;

    Ok(String::from_utf8(decompressed)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use flate2::{Compression, write::ZlibEncoder};

    use super::*;

    /// 构造一个与酷狗下载接口格式一致的加密 KRC。
    pub(crate) fn encrypt_krc(plain: &str) -> String {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plain.as_bytes()).unwrap();
        let mut compressed = encoder.finish().unwrap();
        for (i, byte) in compressed.iter_mut().enumerate() {
            *byte ^= KRC_DECRYPT_KEY[i % KRC_DECRYPT_KEY.len()];
        }
        let mut container = KRC_HEADER.to_vec();
        container.extend(compressed);
        general_purpose::STANDARD.encode(container)
    }

    #[test]
    fn test_decrypt_krc() {
        let plain = "[ti:稻香]\n[0,2000]<0,500,0>还<500,500,0>记<1000,1000,0>得";
        let decrypted = decrypt_krc(&encrypt_krc(plain)).unwrap();
        assert_eq!(decrypted, plain);
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let encoded = general_purpose::STANDARD.encode(b"lrc1abcdef");
        assert!(matches!(
            decrypt_krc(&encoded),
            Err(LyricsResolverError::Decryption(_))
        ));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(matches!(
            decrypt_krc("not base64!"),
            Err(LyricsResolverError::Base64Decode(_))
        ));
    }

    #[test]
    fn test_corrupt_payload_is_rejected() {
        let mut container = KRC_HEADER.to_vec();
        container.extend_from_slice(&[0x00, 0x01, 0x02, 0x03]);
        let encoded = general_purpose::STANDARD.encode(container);
        assert!(matches!(decrypt_krc(&encoded), Err(LyricsResolverError::Io(_))));
    }
}
