//! 控制命令目录.
//!
//! 每条命令由固定的 (目标地址, 消息 ID, 消息类型) 三元组标识.
//! 设备应答沿用请求的消息 ID 和消息类型, 目标地址可能不同.

use std::fmt;

use liu_core::LiuResult;

use crate::message::FramedMessage;

/// 控制命令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    /// 名称, 仅用于日志
    pub name: &'static str,
    /// 目标地址
    pub target: u16,
    /// 消息 ID
    pub id: u16,
    /// 消息类型 (24 位)
    pub message_type: u32,
}

impl Command {
    /// 配对
    pub const PAIR: Self = Self::new("pair", 0x0702, 0x8092, 0x45_0740);
    /// 停止推流
    pub const STOP_STREAMING: Self = Self::new("stop_streaming", 0x0802, 0xEAC8, 0x8E_0240);
    /// 准备直播
    pub const PREPARING_TO_LIVESTREAM: Self =
        Self::new("preparing_to_livestream", 0x0802, 0x8C12, 0xE1_0240);
    /// 下发 Wi-Fi 凭据
    pub const SETUP_WIFI: Self = Self::new("setup_wifi", 0x0702, 0x8C19, 0x47_0740);
    /// 画面参数配置
    pub const CONFIGURE: Self = Self::new("configure", 0x0102, 0x8C2D, 0x8E_0240);
    /// 开始推流
    pub const START_STREAMING: Self = Self::new("start_streaming", 0x0802, 0x8C2C, 0x78_0840);

    /// 全部已知命令
    pub const ALL: [Self; 6] = [
        Self::PAIR,
        Self::STOP_STREAMING,
        Self::PREPARING_TO_LIVESTREAM,
        Self::SETUP_WIFI,
        Self::CONFIGURE,
        Self::START_STREAMING,
    ];

    const fn new(name: &'static str, target: u16, id: u16, message_type: u32) -> Self {
        Self {
            name,
            target,
            id,
            message_type,
        }
    }

    /// 以给定负载构造该命令的消息
    pub fn message(&self, payload: Vec<u8>) -> LiuResult<FramedMessage> {
        FramedMessage::new(self.target, self.id, self.message_type, payload)
    }

    /// 判断收到的消息是否为该命令的应答
    pub fn matches(&self, message: &FramedMessage) -> bool {
        message.id == self.id && message.message_type == self.message_type
    }

    /// 按消息 ID 与类型查找命令
    pub fn identify(message: &FramedMessage) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.matches(message))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(target=0x{:04X}, id=0x{:04X}, type=0x{:06X})",
            self.name, self.target, self.id, self.message_type
        )
    }
}
