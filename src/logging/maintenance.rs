//! 日志目录维护: 删除过期日志, 压缩历史日志.

use super::LoggingConfig;
use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

/// 解析出的日志文件名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFileName {
    /// 文件名中的日期
    pub date: NaiveDate,
    /// 是否为 `.log.gz`
    pub compressed: bool,
}

/// 一次维护的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 删除的文件 (过期日志, 或已有压缩副本的未压缩日志)
    pub removed: Vec<PathBuf>,
    /// 新生成的压缩文件
    pub compressed: Vec<PathBuf>,
}

pub(super) fn spawn(config: LoggingConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds));
        loop {
            ticker.tick().await;
            let snapshot = config.clone();
            let result = tokio::task::spawn_blocking(move || {
                sweep_history(&snapshot, Local::now().date_naive())
            })
            .await;
            match result {
                Ok(Ok(report)) => debug!(
                    "日志维护完成: 删除 {} 个, 压缩 {} 个",
                    report.removed.len(),
                    report.compressed.len()
                ),
                Ok(Err(err)) => error!("日志维护失败: {:#}", err),
                Err(err) => error!("日志维护任务异常退出: {}", err),
            }
        }
    })
}

/// 以 `today` 为基准维护日志目录
///
/// - 日期早于 `today - retention_days` 的日志 (含压缩文件) 被删除
/// - 开启 `compress_history` 时, 早于 `today` 的未压缩日志被压缩为 `.log.gz`;
///   同名压缩文件已存在时只删除未压缩的副本, 计入 `removed`
/// - 与前缀不匹配的文件保持不动
pub fn sweep_history(config: &LoggingConfig, today: NaiveDate) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let directory = config.directory.as_path();
    if !directory.exists() {
        return Ok(report);
    }

    let cutoff = today
        .checked_sub_days(Days::new(u64::from(config.retention_days)))
        .unwrap_or(NaiveDate::MIN);

    let entries = fs::read_dir(directory)
        .with_context(|| format!("读取日志目录失败, path={}", directory.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(parsed) = file_name
            .to_str()
            .and_then(|name| parse_log_file_name(name, &config.file_prefix))
        else {
            continue;
        };
        let path = entry.path();

        if parsed.date < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(err) => error!("删除过期日志失败, path={}: {}", path.display(), err),
            }
            continue;
        }

        if config.compress_history && !parsed.compressed && parsed.date < today {
            match compress_file(&path) {
                Ok(Compressed::Created(gz_path)) => report.compressed.push(gz_path),
                Ok(Compressed::AlreadyPresent) => report.removed.push(path),
                Err(err) => error!("压缩历史日志失败: {:#}", err),
            }
        }
    }

    Ok(report)
}

/// 解析 `<prefix>.<YYYY-MM-DD>.log` 或 `<prefix>.<YYYY-MM-DD>.log.gz`
pub fn parse_log_file_name(file_name: &str, prefix: &str) -> Option<LogFileName> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('.')?;
    let (date_part, compressed) = match rest.strip_suffix(".log.gz") {
        Some(date_part) => (date_part, true),
        None => (rest.strip_suffix(".log")?, false),
    };
    if date_part.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(LogFileName { date, compressed })
}

enum Compressed {
    /// 新生成的压缩文件
    Created(PathBuf),
    /// 压缩文件已存在, 只删除了原文件
    AlreadyPresent,
}

/// 压缩为同名 `.gz` 文件并删除原文件
fn compress_file(path: &Path) -> Result<Compressed> {
    let mut gz_name = OsString::from(path.as_os_str());
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);
    if gz_path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("删除重复日志失败, path={}", path.display()))?;
        return Ok(Compressed::AlreadyPresent);
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    std::io::copy(&mut input, &mut encoder)
        .with_context(|| format!("写入压缩日志失败, path={}", gz_path.display()))?;
    encoder.finish()?;

    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(Compressed::Created(gz_path))
}
