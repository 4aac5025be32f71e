//! # liu-codec
//!
//! Liu 视频码流处理库.
//!
//! - 长度前缀 ↔ Annex B 码流形态转换 ([`reframe`])
//! - H.264/H.265 NAL 单元类型识别与按类型提取 ([`parsers`])
//! - avcC 配置记录的构建与解析

pub mod parsers;
pub mod reframe;

pub use reframe::{
    ExtractedUnit, StartCodeRun, UnitHeader, VideoCodec, extract_units, extract_units_by_id,
    scan_start_codes, sort_by_offset, to_annex_b, to_annex_b_in_place, to_length_prefixed,
};
