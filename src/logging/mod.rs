//! 日志系统.
//!
//! 库 crate 只通过 `log` 门面输出诊断信息, 由这里安装的 tracing 订阅器统一收集:
//! - 控制台: 彩色单行输出, 级别由 `console_level` 决定
//! - 文件: `<directory>/<file_prefix>.<YYYY-MM-DD>.log`, 非阻塞写入, 跨天自动切换文件
//! - 后台维护: 删除过期日志, 压缩历史日志 (见 [`sweep_history`])

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod maintenance;

pub use maintenance::{LogFileName, SweepReport, parse_log_file_name, sweep_history};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 文件日志过滤表达式 (EnvFilter 语法)
    #[serde(default = "default_level")]
    pub level: String,
    /// 控制台日志过滤表达式
    #[serde(default = "default_console_level")]
    pub console_level: String,
    /// 日志目录
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// 日志文件名前缀
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// 保留天数
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// 是否压缩历史日志
    #[serde(default = "default_true")]
    pub compress_history: bool,
    /// 维护任务执行间隔 (秒)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_console_level() -> String {
    "warn".to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_prefix() -> String {
    "liu".to_string()
}

fn default_retention_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    3600
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_level: default_console_level(),
            directory: default_directory(),
            file_prefix: default_file_prefix(),
            retention_days: default_retention_days(),
            compress_history: default_true(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl LoggingConfig {
    /// 检查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            bail!("日志文件前缀不能为空");
        }
        if self.file_prefix.contains(['/', '\\']) {
            bail!("日志文件前缀不能包含路径分隔符: {}", self.file_prefix);
        }
        if self.cleanup_interval_seconds == 0 {
            bail!("日志维护间隔必须大于 0");
        }
        EnvFilter::try_new(&self.level)
            .with_context(|| format!("文件日志级别无效: {}", self.level))?;
        EnvFilter::try_new(&self.console_level)
            .with_context(|| format!("控制台日志级别无效: {}", self.console_level))?;
        Ok(())
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 安装全局日志订阅器
///
/// 每个进程只能成功调用一次. 调用时若处于 tokio 运行时中, 同时启动日志维护任务.
pub fn init(config: LoggingConfig) -> Result<()> {
    config.validate()?;
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!("创建日志目录失败, path={}", config.directory.display())
    })?;

    let writer = DailyFileWriter::open(&config.directory, &config.file_prefix)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .event_format(LineFormatter { ansi: true })
        .with_filter(EnvFilter::try_new(&config.console_level)?);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter { ansi: false })
        .with_filter(EnvFilter::try_new(&config.level)?);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("全局日志订阅器已安装")?;
    LOG_GUARD.set(guard).ok();

    match tokio::runtime::Handle::try_current() {
        Ok(_) => {
            maintenance::spawn(config);
        }
        Err(_) => tracing::warn!("当前没有 tokio 运行时, 日志维护任务未启动"),
    }

    Ok(())
}

/// 指定日期的日志文件路径
pub fn log_file_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

/// 按本地日期写入当天日志文件, 跨天后首次写入时切换到新文件
struct DailyFileWriter {
    directory: PathBuf,
    prefix: String,
    date: NaiveDate,
    file: File,
}

impl DailyFileWriter {
    fn open(directory: &Path, prefix: &str) -> Result<Self> {
        let date = Local::now().date_naive();
        let file = open_append(&log_file_path(directory, prefix, date))?;
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            date,
            file,
        })
    }

    fn switch_if_needed(&mut self) -> std::io::Result<()> {
        let today = Local::now().date_naive();
        if today == self.date {
            return Ok(());
        }
        self.file.flush()?;
        self.file = open_append(&log_file_path(&self.directory, &self.prefix, today))
            .map_err(std::io::Error::other)?;
        self.date = today;
        Ok(())
    }
}

impl Write for DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.switch_if_needed()?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

/// 单行格式: `[MM-DD hh:mm:ss.mmm] LEVEL target > 字段`
struct LineFormatter {
    ansi: bool,
}

impl LineFormatter {
    fn level_color(level: tracing::Level) -> &'static str {
        match level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis()
        )?;
        let level = meta.level().to_string();
        if self.ansi {
            write!(writer, "{}{:5}\x1b[0m ", Self::level_color(*meta.level()), level)?;
        } else {
            write!(writer, "{:5} ", level)?;
        }
        write!(writer, "{} > ", meta.target())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
