//! # 智能转码器
//!
//! 自动检测源编码并转换到目标编码。
//!
//! ## 检测顺序
//! 1. BOM 嗅探（置信度 1.0）
//! 2. 合法 UTF-8（置信度 1.0，纯 ASCII 也报告为 UTF-8）
//! 3. `chardetng` 统计猜测（可信时 0.9，否则 0.6）
//!
//! 解码出现非法序列或编码出现无法映射的字符时直接报错，从不输出有损结果。
//!
//! ## 依赖关系
//! - 被 `batch/pipeline.rs`, `commands/detect.rs` 使用
//! - 使用 `encoding_rs` 编解码表，`chardetng` 统计检测

use super::{Detection, TranscodeError, Transcoded, Transcoder};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

const CONFIDENCE_CERTAIN: f64 = 1.0;
const CONFIDENCE_LIKELY: f64 = 0.9;
const CONFIDENCE_GUESS: f64 = 0.6;

/// 默认转码器
#[derive(Debug, Default, Clone, Copy)]
pub struct SmartTranscoder;

impl SmartTranscoder {
    pub fn new() -> Self {
        SmartTranscoder
    }

    /// 返回 (源编码, 置信度, BOM 长度)
    fn sniff(bytes: &[u8]) -> (&'static Encoding, f64, usize) {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            return (encoding, CONFIDENCE_CERTAIN, bom_len);
        }

        if std::str::from_utf8(bytes).is_ok() {
            return (UTF_8, CONFIDENCE_CERTAIN, 0);
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let (encoding, confident) = detector.guess_assess(None, false);
        let confidence = if confident {
            CONFIDENCE_LIKELY
        } else {
            CONFIDENCE_GUESS
        };
        (encoding, confidence, 0)
    }

    fn resolve_target(target: &str) -> Result<&'static Encoding, TranscodeError> {
        let encoding = Encoding::for_label(target.trim().as_bytes())
            .ok_or_else(|| TranscodeError::UnsupportedEncoding(target.to_string()))?;

        // replacement / x-user-defined 之类的编码没有对应的编码器
        let encodable = encoding == UTF_16LE
            || encoding == UTF_16BE
            || encoding.output_encoding() == encoding;
        if !encodable {
            return Err(TranscodeError::UnsupportedEncoding(target.to_string()));
        }
        Ok(encoding)
    }

    fn encode(text: &str, target: &'static Encoding) -> Result<Vec<u8>, TranscodeError> {
        if target == UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if target == UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }

        let (bytes, _, had_errors) = target.encode(text);
        if had_errors {
            return Err(TranscodeError::Unmappable {
                encoding: target.name().to_string(),
            });
        }
        Ok(bytes.into_owned())
    }
}

impl Transcoder for SmartTranscoder {
    fn detect(&self, bytes: &[u8]) -> Result<Detection, TranscodeError> {
        let (encoding, confidence, bom_len) = Self::sniff(bytes);
        Ok(Detection {
            encoding: encoding.name().to_string(),
            confidence,
            has_bom: bom_len > 0,
        })
    }

    fn detect_and_convert(
        &self,
        bytes: &[u8],
        target: &str,
    ) -> Result<Transcoded, TranscodeError> {
        let target_encoding = Self::resolve_target(target)?;
        let (source, confidence, bom_len) = Self::sniff(bytes);

        let text = source
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .ok_or_else(|| {
                if bom_len > 0 {
                    TranscodeError::Malformed {
                        encoding: source.name().to_string(),
                    }
                } else {
                    TranscodeError::Undetectable
                }
            })?;

        let data = Self::encode(&text, target_encoding)?;

        Ok(Transcoded {
            source_encoding: source.name().to_string(),
            target_encoding: target_encoding.name().to_string(),
            confidence,
            data,
            bytes_processed: bytes.len() as u64,
        })
    }
}
