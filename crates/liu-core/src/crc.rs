//! CRC 校验和计算.
//!
//! 提供参数化的 CRC-8 和 CRC-16 计算 (Rocksoft 模型), 用于控制消息的帧头和帧尾校验.
//! 所有参数随调用传入, 不依赖任何全局状态.

/// CRC-8 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc8Params {
    /// 生成多项式 (不含最高位)
    pub poly: u8,
    /// 寄存器初始值
    pub init: u8,
    /// 输出异或值
    pub xor_out: u8,
    /// 输入字节是否按位反转
    pub reflect_in: bool,
    /// 输出是否按位反转
    pub reflect_out: bool,
}

/// CRC-16 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16Params {
    /// 生成多项式 (不含最高位)
    pub poly: u16,
    /// 寄存器初始值
    pub init: u16,
    /// 输出异或值
    pub xor_out: u16,
    /// 输入字节是否按位反转
    pub reflect_in: bool,
    /// 输出是否按位反转
    pub reflect_out: bool,
}

/// 控制消息帧头 CRC-8 (多项式 0x31, 初始值 0xEE, 输入输出反转)
pub const CRC8_FRAME_HEADER: Crc8Params = Crc8Params {
    poly: 0x31,
    init: 0xEE,
    xor_out: 0x00,
    reflect_in: true,
    reflect_out: true,
};

/// 控制消息整帧 CRC-16 (多项式 0x1021, 初始值 0x496C, 输入输出反转)
pub const CRC16_FRAME: Crc16Params = Crc16Params {
    poly: 0x1021,
    init: 0x496C,
    xor_out: 0x0000,
    reflect_in: true,
    reflect_out: true,
};

/// 计算 CRC-8
pub fn crc8(data: &[u8], params: &Crc8Params) -> u8 {
    let mut crc = params.init;
    for &byte in data {
        let byte = if params.reflect_in {
            byte.reverse_bits()
        } else {
            byte
        };
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ params.poly
            } else {
                crc << 1
            };
        }
    }
    if params.reflect_out {
        crc = crc.reverse_bits();
    }
    crc ^ params.xor_out
}

/// 计算 CRC-16
pub fn crc16(data: &[u8], params: &Crc16Params) -> u16 {
    let mut crc = params.init;
    for &byte in data {
        let byte = if params.reflect_in {
            byte.reverse_bits()
        } else {
            byte
        };
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ params.poly
            } else {
                crc << 1
            };
        }
    }
    if params.reflect_out {
        crc = crc.reverse_bits();
    }
    crc ^ params.xor_out
}
