//! JSON 配置加载.
//!
//! ```json
//! {
//!   "logging": { "level": "liu_codec=debug,info", "directory": "logs" },
//!   "accessory": {
//!     "wifi_ssid": "studio",
//!     "wifi_password": "secret",
//!     "rtmp_url": "rtmp://192.168.1.2/live/cam",
//!     "resolution": "1080p",
//!     "model": "osmo_action4"
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::accessory::AccessorySettings;
use crate::logging::LoggingConfig;

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LiuConfig {
    /// 日志配置, 缺省时使用默认值
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 外接设备设置, 未配置设备时为空
    #[serde(default)]
    pub accessory: Option<AccessorySettings>,
}

impl LiuConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("解析 JSON 配置失败")?;
        config.logging.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("配置文件无效, path={}", path.display()))
    }

    /// 以格式化 JSON 输出
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("序列化配置失败")
    }
}
