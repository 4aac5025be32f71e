//! # liu-accessory
//!
//! 外接拍摄设备的控制消息帧编解码.
//!
//! - 帧格式: 起始字节, 长度, 版本, 帧头 CRC-8, 地址/ID/类型, 负载, 整帧 CRC-16 ([`message`])
//! - 命令目录与应答匹配 ([`command`])
//! - 配对、Wi-Fi、画面配置和推流控制的固定布局负载 ([`payload`])
//! - 可序列化的推流设置 ([`settings`])

pub mod command;
pub mod message;
pub mod payload;
pub mod settings;

pub use command::Command;
pub use message::{FramedMessage, MAX_PAYLOAD_LEN};
pub use payload::{
    AccessoryPayload, ConfigurePayload, DeviceModel, ImageStabilization, PairPayload,
    PreparingToLivestreamPayload, Resolution, SetupWifiPayload, StartStreamingPayload,
    StopStreamingPayload,
};
pub use settings::AccessorySettings;
