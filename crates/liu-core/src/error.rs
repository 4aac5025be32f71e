//! 统一错误类型定义.
//!
//! 所有 Liu crate 共用的错误类型, 支持跨模块传播.

use std::fmt;

use thiserror::Error;

/// 校验和类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// 帧头 CRC-8
    Header,
    /// 整帧 CRC-16
    Frame,
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "帧头 CRC-8"),
            Self::Frame => write!(f, "整帧 CRC-16"),
        }
    }
}

/// 错误大类
///
/// 调用方通常只关心错误属于哪一类, 而不关心具体字段.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 请求读取的字节数超过剩余数据
    BufferUnderrun,
    /// 长度字段或起始码与实际数据不一致
    MalformedFraming,
    /// 计算出的校验和与携带的校验和不一致
    ChecksumMismatch,
    /// 调用方传入的参数无法编码
    InvalidArgument,
}

/// Liu 统一错误类型
#[derive(Debug, Error)]
pub enum LiuError {
    /// 剩余数据不足
    #[error("数据不足: 需要 {requested} 字节, 剩余 {remaining} 字节")]
    BufferUnderrun { requested: usize, remaining: usize },

    /// 长度前缀指向缓冲区之外
    #[error("长度字段越界: offset={offset}, declared={declared}, remaining={remaining}")]
    LengthOutOfBounds {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// 应当出现起始码的位置没有起始码
    #[error("缺少起始码: offset={offset} 之前的数据不属于任何 NAL 单元")]
    MissingStartCode { offset: usize },

    /// NAL 单元短于其头部长度
    #[error("NAL 单元头部截断: offset={offset}, length={length}, required={required}")]
    TruncatedUnitHeader {
        offset: usize,
        length: usize,
        required: usize,
    },

    /// 帧起始字节错误
    #[error("帧起始字节错误: 0x{0:02X}")]
    BadLeadByte(u8),

    /// 协议版本错误
    #[error("不支持的协议版本: 0x{0:02X}")]
    BadVersion(u8),

    /// 帧长度字段与实际长度不一致
    #[error("帧长度不匹配: declared={declared}, actual={actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// 校验和不一致
    #[error("{kind} 校验失败: expected=0x{expected:04X}, computed=0x{computed:04X}")]
    ChecksumMismatch {
        kind: ChecksumKind,
        expected: u16,
        computed: u16,
    },

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),
}

impl LiuError {
    /// 获取错误大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BufferUnderrun { .. } => ErrorKind::BufferUnderrun,
            Self::LengthOutOfBounds { .. }
            | Self::MissingStartCode { .. }
            | Self::TruncatedUnitHeader { .. }
            | Self::BadLeadByte(_)
            | Self::BadVersion(_)
            | Self::LengthMismatch { .. }
            | Self::InvalidData(_) => ErrorKind::MalformedFraming,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// Liu 统一 Result 类型
pub type LiuResult<T> = Result<T, LiuError>;
