//! H.265/HEVC 码流解析器.
//!
//! 提供 HEVC NAL 单元类型识别 (2 字节 NAL 头).
//!
//! # HEVC NAL 头部 (2 字节)
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ forbidden(1) | type(6) | layer_id(6) | tid(3) │
//! └───────────────────────────────────────────────┘
//! ```

pub mod nal;

pub use nal::{HevcNalUnit, HevcNalUnitType};
