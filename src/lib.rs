//! # Liu (流)
//!
//! 移动直播客户端的二进制协议编解码层.
//!
//! - **码流重组**: 长度前缀与 Annex B 两种 H.264/H.265 码流形态互转, 按类型提取 NAL 单元
//! - **控制消息**: 外接拍摄设备的帧格式编解码、命令目录与固定布局负载
//! - **基础设施**: 带游标的字节缓冲区、参数化 CRC、统一错误类型
//!
//! # 快速开始
//!
//! ```rust
//! use liu::codec::{to_annex_b, to_length_prefixed};
//!
//! let avcc = [0x00, 0x00, 0x00, 0x02, 0x09, 0xF0];
//! let annex_b = to_annex_b(&avcc).unwrap();
//! assert_eq!(annex_b, [0x00, 0x00, 0x00, 0x01, 0x09, 0xF0]);
//! assert_eq!(to_length_prefixed(&annex_b).unwrap(), avcc);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 错误类型, CRC, 字节缓冲区 |
//! | `liu-codec` | 码流重组, NAL 类型, avcC |
//! | `liu-accessory` | 控制消息帧, 命令与负载 |

/// 核心类型与工具
pub use liu_core as core;

/// 视频码流处理
pub use liu_codec as codec;

/// 外接设备控制消息
pub use liu_accessory as accessory;

pub mod config;
pub mod logging;

pub use config::LiuConfig;

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
