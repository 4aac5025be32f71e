//! # liu-core
//!
//! Liu 协议编解码层核心库, 提供错误类型、校验和计算和带游标的字节缓冲区.
//!
//! 本 crate 是码流重组 (`liu-codec`) 和控制消息帧 (`liu-accessory`) 的共同底层依赖.

pub mod byte_cursor;
pub mod crc;
pub mod error;

// 重导出常用类型
pub use byte_cursor::ByteCursor;
pub use byteorder::{BigEndian, ByteOrder, LittleEndian};
pub use error::{ChecksumKind, ErrorKind, LiuError, LiuResult};
