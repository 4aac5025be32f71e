//! H.264/AVC 码流解析器.
//!
//! 提供 H.264 NAL 单元类型识别和 avcC 配置记录的构建与解析.
//! 码流形态的转换 (长度前缀 ↔ Annex B) 见 [`crate::reframe`].

pub mod avcc;
pub mod nal;

pub use avcc::{AvccConfig, build_avcc_config, parse_avcc_config};
pub use nal::{NalUnit, NalUnitType};
