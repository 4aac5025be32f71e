//! 固定布局的命令负载.
//!
//! 布局中的标记字节来自设备协议, 含义未公开, 必须逐字节保持.
//! 字符串以 1 字节长度前缀打包, 推流地址以 2 字节小端长度前缀打包.

use liu_core::{ByteCursor, LittleEndian, LiuError, LiuResult};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::message::FramedMessage;

/// 配对请求的前导字节
pub const PAIR_PREFIX: u8 = 0x20;

/// 配对请求中的固定令牌
pub const PAIR_TOKEN: &[u8; 32] = b"284ae5b8d76b3375a04a6417ad71bea3";

/// 准备直播负载
pub const PREPARING_TO_LIVESTREAM_MARKER: [u8; 1] = [0x1A];

/// 停止推流负载
pub const STOP_STREAMING_MARKER: [u8; 6] = [0x01, 0x01, 0x1A, 0x00, 0x01, 0x02];

/// 命令负载
pub trait AccessoryPayload {
    /// 负载所属命令
    const COMMAND: Command;

    /// 编码负载字节
    fn encode(&self) -> LiuResult<Vec<u8>>;

    /// 编码并封装为控制消息
    fn to_message(&self) -> LiuResult<FramedMessage> {
        Self::COMMAND.message(self.encode()?)
    }
}

/// 设备型号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceModel {
    /// Osmo Action 2
    OsmoAction2,
    /// Osmo Action 3
    OsmoAction3,
    /// Osmo Action 4
    OsmoAction4,
    /// Osmo Action 5 Pro
    OsmoAction5Pro,
    /// Osmo Pocket 3
    OsmoPocket3,
    /// 未识别型号, 按旧布局处理
    #[default]
    Unknown,
}

impl DeviceModel {
    /// 是否使用新版负载布局
    pub fn uses_new_layout(self) -> bool {
        matches!(self, Self::OsmoAction5Pro)
    }
}

/// 推流分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    /// 854x480
    #[serde(rename = "480p")]
    R480p,
    /// 1280x720
    #[serde(rename = "720p")]
    R720p,
    /// 1920x1080
    #[default]
    #[serde(rename = "1080p")]
    R1080p,
}

impl Resolution {
    /// 协议中的分辨率编号
    pub fn marker(self) -> u8 {
        match self {
            Self::R480p => 0x47,
            Self::R720p => 0x04,
            Self::R1080p => 0x0A,
        }
    }
}

/// 防抖模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStabilization {
    /// 关闭
    #[default]
    Off,
    /// RockSteady
    RockSteady,
    /// HorizonSteady
    HorizonSteady,
    /// RockSteady+
    RockSteadyPlus,
    /// HorizonBalancing
    HorizonBalancing,
}

impl ImageStabilization {
    /// 协议中的防抖编号
    pub fn marker(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::RockSteady => 1,
            Self::HorizonSteady => 2,
            Self::RockSteadyPlus => 3,
            Self::HorizonBalancing => 4,
        }
    }
}

/// 配对请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPayload {
    /// 配对 PIN
    pub pin: String,
}

impl AccessoryPayload for PairPayload {
    const COMMAND: Command = Command::PAIR;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        let mut out = ByteCursor::new();
        out.append_u8(PAIR_PREFIX).append(PAIR_TOKEN);
        pack_string(&mut out, &self.pin)?;
        Ok(out.into_inner())
    }
}

/// 准备直播
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreparingToLivestreamPayload;

impl AccessoryPayload for PreparingToLivestreamPayload {
    const COMMAND: Command = Command::PREPARING_TO_LIVESTREAM;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        Ok(PREPARING_TO_LIVESTREAM_MARKER.to_vec())
    }
}

/// Wi-Fi 凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupWifiPayload {
    /// SSID
    pub ssid: String,
    /// 密码
    pub password: String,
}

impl AccessoryPayload for SetupWifiPayload {
    const COMMAND: Command = Command::SETUP_WIFI;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        let mut out = ByteCursor::new();
        pack_string(&mut out, &self.ssid)?;
        pack_string(&mut out, &self.password)?;
        Ok(out.into_inner())
    }
}

/// 开始推流
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartStreamingPayload {
    /// RTMP 推流地址
    pub rtmp_url: String,
    /// 分辨率
    pub resolution: Resolution,
    /// 帧率, 仅支持 25 和 30
    pub fps: u32,
    /// 码率 (kbps)
    pub bitrate_kbps: u16,
    /// 设备型号
    pub model: DeviceModel,
}

impl StartStreamingPayload {
    fn fps_marker(&self) -> LiuResult<u8> {
        match self.fps {
            25 => Ok(2),
            30 => Ok(3),
            fps => Err(LiuError::InvalidArgument(format!(
                "不支持的推流帧率: {}",
                fps
            ))),
        }
    }
}

impl AccessoryPayload for StartStreamingPayload {
    const COMMAND: Command = Command::START_STREAMING;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        let layout = if self.model.uses_new_layout() { 0x2A } else { 0x2E };
        let fps = self.fps_marker()?;

        let mut out = ByteCursor::new();
        out.append_u8(0x00)
            .append_u8(layout)
            .append_u8(0x00)
            .append_u8(self.resolution.marker())
            .append_u16::<LittleEndian>(self.bitrate_kbps)
            .append(&[0x02, 0x00])
            .append_u8(fps)
            .append(&[0x00, 0x00]);
        pack_url(&mut out, &self.rtmp_url)?;
        Ok(out.into_inner())
    }
}

/// 停止推流
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StopStreamingPayload;

impl AccessoryPayload for StopStreamingPayload {
    const COMMAND: Command = Command::STOP_STREAMING;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        Ok(STOP_STREAMING_MARKER.to_vec())
    }
}

/// 画面参数配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurePayload {
    /// 防抖模式
    pub image_stabilization: ImageStabilization,
    /// 设备型号
    pub model: DeviceModel,
}

impl AccessoryPayload for ConfigurePayload {
    const COMMAND: Command = Command::CONFIGURE;

    fn encode(&self) -> LiuResult<Vec<u8>> {
        let layout = if self.model.uses_new_layout() { 0x1A } else { 0x08 };
        let mut out = ByteCursor::with_capacity(6);
        out.append(&[0x01, 0x01])
            .append_u8(layout)
            .append(&[0x00, 0x01])
            .append_u8(self.image_stabilization.marker());
        Ok(out.into_inner())
    }
}

/// 以 1 字节长度前缀打包 UTF-8 字符串
pub fn pack_string(out: &mut ByteCursor, text: &str) -> LiuResult<()> {
    let len = u8::try_from(text.len()).map_err(|_| {
        LiuError::InvalidArgument(format!("字符串过长: len={}, max=255", text.len()))
    })?;
    out.append_u8(len).append_utf8(text);
    Ok(())
}

/// 以 2 字节小端长度前缀打包 UTF-8 地址
pub fn pack_url(out: &mut ByteCursor, url: &str) -> LiuResult<()> {
    let len = u16::try_from(url.len()).map_err(|_| {
        LiuError::InvalidArgument(format!("地址过长: len={}", url.len()))
    })?;
    out.append_u16::<LittleEndian>(len).append_utf8(url);
    Ok(())
}
