// Copyright (c) 2026 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Read;
use thiserror::Error;

use crate::domain::models::capture::{CapturedTransaction, Compression, ContentEncoding};

/// 解码错误类型
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("base64解码失败: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("brotli解压失败: {0}")]
    Brotli(std::io::Error),

    #[error("UTF-8解码失败: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// 把捕获事务的响应体还原为明文
///
/// 依次处理：base64解码、brotli解压（按事务标记或
/// `content-encoding: br` 响应头判断）、UTF-8解码。
/// 失败由调用方记录日志并跳过该事务，绝不中断整批处理。
pub fn decode_transaction(txn: &CapturedTransaction) -> Result<String, DecodeError> {
    let mut bytes: Vec<u8> = match txn.encoding {
        ContentEncoding::Base64 => BASE64.decode(txn.body.trim())?,
        ContentEncoding::None => txn.body.clone().into_bytes(),
    };

    let brotli_compressed =
        txn.compression == Compression::Brotli || txn.header_contains("content-encoding", "br");
    if brotli_compressed {
        let mut decompressed = Vec::new();
        brotli::Decompressor::new(bytes.as_slice(), 4096)
            .read_to_end(&mut decompressed)
            .map_err(DecodeError::Brotli)?;
        bytes = decompressed;
    }

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::capture::CapturedHeader;
    use chrono::Utc;
    use std::io::Write;

    fn transaction(body: String, encoding: ContentEncoding, compression: Compression) -> CapturedTransaction {
        CapturedTransaction {
            request_url: "https://www.youtube.com/youtubei/v1/search".to_string(),
            method: "POST".to_string(),
            started_at: Utc::now(),
            body,
            encoding,
            compression,
            headers: Vec::new(),
        }
    }

    #[test]
    fn test_decode_plain_text() {
        let txn = transaction(
            r#"{"ok":true}"#.to_string(),
            ContentEncoding::None,
            Compression::None,
        );
        assert_eq!(decode_transaction(&txn).unwrap(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_decode_base64_brotli() {
        let payload = r#"{"onResponseReceivedCommands":[]}"#;
        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(payload.as_bytes()).unwrap();
        }
        let txn = transaction(
            BASE64.encode(&compressed),
            ContentEncoding::Base64,
            Compression::Brotli,
        );
        assert_eq!(decode_transaction(&txn).unwrap(), payload);
    }

    #[test]
    fn test_decode_brotli_flagged_by_header() {
        let payload = "hello";
        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(payload.as_bytes()).unwrap();
        }
        let mut txn = transaction(
            BASE64.encode(&compressed),
            ContentEncoding::Base64,
            Compression::None,
        );
        txn.headers.push(CapturedHeader {
            name: "Content-Encoding".to_string(),
            value: "br".to_string(),
        });
        assert_eq!(decode_transaction(&txn).unwrap(), payload);
    }

    #[test]
    fn test_decode_malformed_base64() {
        let txn = transaction(
            "!!not base64!!".to_string(),
            ContentEncoding::Base64,
            Compression::None,
        );
        assert!(matches!(
            decode_transaction(&txn),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let txn = transaction(
            BASE64.encode([0xffu8, 0xfe, 0xfd]),
            ContentEncoding::Base64,
            Compression::None,
        );
        assert!(matches!(decode_transaction(&txn), Err(DecodeError::Utf8(_))));
    }
}
