//! 控制消息帧编解码.
//!
//! # 帧布局 (多字节字段为小端)
//! ```text
//! offset size 字段
//! 0      1    起始字节 = 0x55
//! 1      1    总长度 = 13 + 负载长度
//! 2      1    版本 = 0x04
//! 3      1    帧头 CRC-8, 覆盖 [0, 3)
//! 4      2    目标地址
//! 6      2    消息 ID
//! 8      3    消息类型 (24 位)
//! 11     N    负载
//! 11+N   2    整帧 CRC-16, 覆盖 [0, 11+N)
//! ```
//!
//! 解码时先校验帧头 CRC, 再信任长度字段切分负载.

use liu_core::crc::{CRC8_FRAME_HEADER, CRC16_FRAME, crc8, crc16};
use liu_core::{ByteCursor, ChecksumKind, LiuError, LiuResult, LittleEndian};

/// 帧起始字节
pub const LEAD_BYTE: u8 = 0x55;

/// 协议版本
pub const VERSION: u8 = 0x04;

/// 负载之前的字节数
pub const HEADER_LEN: usize = 11;

/// 帧尾 CRC-16 的字节数
pub const TRAILER_LEN: usize = 2;

/// 除负载外的固定开销
pub const FRAME_OVERHEAD: usize = HEADER_LEN + TRAILER_LEN;

/// 单帧可携带的最大负载 (长度字段只有 1 字节)
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - FRAME_OVERHEAD;

/// 消息类型的最大值 (24 位)
pub const MAX_MESSAGE_TYPE: u32 = 0x00FF_FFFF;

/// 帧头 CRC-8 覆盖的字节数
const HEADER_CRC_SPAN: usize = 3;

/// 控制消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    /// 目标地址
    pub target: u16,
    /// 消息 ID (请求与应答相同)
    pub id: u16,
    /// 消息类型 (24 位)
    pub message_type: u32,
    /// 负载
    pub payload: Vec<u8>,
}

impl FramedMessage {
    /// 创建消息并校验字段范围
    pub fn new(target: u16, id: u16, message_type: u32, payload: Vec<u8>) -> LiuResult<Self> {
        let message = Self {
            target,
            id,
            message_type,
            payload,
        };
        message.validate()?;
        Ok(message)
    }

    /// 编码后的总长度
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// 编码为线上字节
    ///
    /// 两个校验和总是重新计算.
    pub fn encode(&self) -> LiuResult<Vec<u8>> {
        self.validate()?;

        let total = self.encoded_len();
        let mut frame = ByteCursor::with_capacity(total);
        frame
            .append_u8(LEAD_BYTE)
            .append_u8(total as u8)
            .append_u8(VERSION);
        let header_crc = crc8(frame.as_slice(), &CRC8_FRAME_HEADER);
        frame
            .append_u8(header_crc)
            .append_u16::<LittleEndian>(self.target)
            .append_u16::<LittleEndian>(self.id)
            .append_u24::<LittleEndian>(self.message_type)
            .append(&self.payload);
        let frame_crc = crc16(frame.as_slice(), &CRC16_FRAME);
        frame.append_u16::<LittleEndian>(frame_crc);

        Ok(frame.into_inner())
    }

    /// 从一个完整帧解码
    pub fn decode(data: &[u8]) -> LiuResult<Self> {
        let result = decode_frame(data);
        match &result {
            Ok(message) => log::debug!(
                "控制消息帧: target=0x{:04X}, id=0x{:04X}, type=0x{:06X}, payload={} 字节",
                message.target,
                message.id,
                message.message_type,
                message.payload.len()
            ),
            Err(err) => log::warn!("控制消息帧被拒绝: len={}, {}", data.len(), err),
        }
        result
    }

    fn validate(&self) -> LiuResult<()> {
        if self.message_type > MAX_MESSAGE_TYPE {
            return Err(LiuError::InvalidArgument(format!(
                "消息类型超过 24 位: 0x{:X}",
                self.message_type
            )));
        }
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(LiuError::InvalidArgument(format!(
                "负载过长: len={}, max={}",
                self.payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }
        Ok(())
    }
}

fn decode_frame(data: &[u8]) -> LiuResult<FramedMessage> {
    let mut cursor = ByteCursor::from(data);
    let lead = cursor.read_u8()?;
    let declared = usize::from(cursor.read_u8()?);
    let version = cursor.read_u8()?;
    let header_crc = cursor.read_u8()?;

    let computed = crc8(&data[..HEADER_CRC_SPAN], &CRC8_FRAME_HEADER);
    if header_crc != computed {
        return Err(LiuError::ChecksumMismatch {
            kind: ChecksumKind::Header,
            expected: u16::from(header_crc),
            computed: u16::from(computed),
        });
    }
    if lead != LEAD_BYTE {
        return Err(LiuError::BadLeadByte(lead));
    }
    if version != VERSION {
        return Err(LiuError::BadVersion(version));
    }
    if declared != data.len() {
        return Err(LiuError::LengthMismatch {
            declared,
            actual: data.len(),
        });
    }
    if data.len() < FRAME_OVERHEAD {
        return Err(LiuError::BufferUnderrun {
            requested: FRAME_OVERHEAD,
            remaining: data.len(),
        });
    }

    let body_end = data.len() - TRAILER_LEN;
    let expected = u16::from_le_bytes([data[body_end], data[body_end + 1]]);
    let computed = crc16(&data[..body_end], &CRC16_FRAME);
    if expected != computed {
        return Err(LiuError::ChecksumMismatch {
            kind: ChecksumKind::Frame,
            expected,
            computed,
        });
    }

    let target = cursor.read_u16::<LittleEndian>()?;
    let id = cursor.read_u16::<LittleEndian>()?;
    let message_type = cursor.read_u24::<LittleEndian>()?;
    let payload = cursor.read_bytes(body_end - cursor.position())?;

    Ok(FramedMessage {
        target,
        id,
        message_type,
        payload,
    })
}
