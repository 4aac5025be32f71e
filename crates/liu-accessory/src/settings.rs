//! 外接设备推流设置.

use liu_core::LiuResult;
use serde::{Deserialize, Serialize};

use crate::message::FramedMessage;
use crate::payload::{
    AccessoryPayload, ConfigurePayload, DeviceModel, ImageStabilization, PairPayload,
    PreparingToLivestreamPayload, Resolution, SetupWifiPayload, StartStreamingPayload,
    StopStreamingPayload,
};

fn default_pair_pin() -> String {
    "liu0".to_string()
}

fn default_fps() -> u32 {
    30
}

fn default_bitrate_kbps() -> u16 {
    6000
}

/// 外接设备推流设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySettings {
    /// 配对 PIN
    #[serde(default = "default_pair_pin")]
    pub pair_pin: String,
    /// Wi-Fi SSID
    pub wifi_ssid: String,
    /// Wi-Fi 密码
    pub wifi_password: String,
    /// RTMP 推流地址
    pub rtmp_url: String,
    /// 分辨率
    #[serde(default)]
    pub resolution: Resolution,
    /// 帧率
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// 码率 (kbps)
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u16,
    /// 防抖模式
    #[serde(default)]
    pub image_stabilization: ImageStabilization,
    /// 设备型号
    #[serde(default)]
    pub model: DeviceModel,
}

impl AccessorySettings {
    /// 配对请求
    pub fn pair_message(&self) -> LiuResult<FramedMessage> {
        PairPayload {
            pin: self.pair_pin.clone(),
        }
        .to_message()
    }

    /// 准备直播
    pub fn preparing_to_livestream_message(&self) -> LiuResult<FramedMessage> {
        PreparingToLivestreamPayload.to_message()
    }

    /// 下发 Wi-Fi 凭据
    pub fn setup_wifi_message(&self) -> LiuResult<FramedMessage> {
        SetupWifiPayload {
            ssid: self.wifi_ssid.clone(),
            password: self.wifi_password.clone(),
        }
        .to_message()
    }

    /// 画面参数配置
    pub fn configure_message(&self) -> LiuResult<FramedMessage> {
        ConfigurePayload {
            image_stabilization: self.image_stabilization,
            model: self.model,
        }
        .to_message()
    }

    /// 开始推流
    pub fn start_streaming_message(&self) -> LiuResult<FramedMessage> {
        StartStreamingPayload {
            rtmp_url: self.rtmp_url.clone(),
            resolution: self.resolution,
            fps: self.fps,
            bitrate_kbps: self.bitrate_kbps,
            model: self.model,
        }
        .to_message()
    }

    /// 停止推流
    pub fn stop_streaming_message(&self) -> LiuResult<FramedMessage> {
        StopStreamingPayload.to_message()
    }

    /// 按发送顺序生成推流启动所需的全部消息
    ///
    /// 顺序: 配对, 停止推流, 准备直播, Wi-Fi, 画面配置, 开始推流.
    pub fn startup_sequence(&self) -> LiuResult<Vec<FramedMessage>> {
        Ok(vec![
            self.pair_message()?,
            self.stop_streaming_message()?,
            self.preparing_to_livestream_message()?,
            self.setup_wifi_message()?,
            self.configure_message()?,
            self.start_streaming_message()?,
        ])
    }
}
