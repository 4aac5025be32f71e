//! NAL 码流形态转换与按类型提取.
//!
//! # 长度前缀格式
//!
//! 硬件编码器输出的形态, 每个 NAL 单元前有 4 字节大端长度:
//! ```text
//! [length: 4 bytes BE] [NAL data: length bytes]
//! ```
//!
//! # Annex B 格式
//!
//! 下游 (TS/SRT/解码器) 需要的形态, 使用起始码分隔 NAL 单元:
//! - 3 字节起始码: `00 00 01`
//! - 4 字节起始码: `00 00 00 01`
//!
//! # 已知限制
//!
//! 不做 emulation prevention 转义. 负载中恰好出现的 `00 00 01`
//! 会被当作真实起始码切分, 因此只有不含该字节模式的负载才能无损往返.
//!
//! 所有函数都是无状态的单遍变换, 失败时调用方可见的数据保持不变.

use std::ops::Range;

use liu_core::{BigEndian, ByteCursor, LiuError, LiuResult};

use crate::parsers::h264::NalUnit;
use crate::parsers::h265::HevcNalUnit;

/// 规范 4 字节起始码
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// 3 字节起始码
pub const START_CODE_SHORT: [u8; 3] = [0x00, 0x00, 0x01];

/// 长度前缀大小 (字节)
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// 反向扫描中发现的一个起始码及其所属 NAL 单元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCodeRun {
    /// 起始码第一个字节的偏移
    pub offset: usize,
    /// 起始码长度 (3 或 4)
    pub code_len: usize,
    /// 起始码之后到下一个起始码 (或缓冲区末尾) 的字节数
    pub payload_len: usize,
}

impl StartCodeRun {
    /// NAL 数据 (含头部) 的起始偏移
    pub fn payload_start(&self) -> usize {
        self.offset + self.code_len
    }

    /// NAL 数据 (含头部) 在源缓冲区中的范围
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.payload_start();
        start..start + self.payload_len
    }
}

/// 从末尾向前扫描 Annex B 缓冲区中的所有起始码
///
/// 返回顺序为扫描顺序, 即码流顺序的逆序. 若 `00 00 01` 前一个字节也是 `00`,
/// 视为 4 字节起始码. 第一个起始码之前若还有数据, 返回 `MissingStartCode`.
pub fn scan_start_codes(data: &[u8]) -> LiuResult<Vec<StartCodeRun>> {
    let pattern_len = START_CODE_SHORT.len();
    let mut runs = Vec::new();
    let mut unit_end = data.len();
    let mut cursor = data.len();

    while cursor >= pattern_len {
        let pattern_start = cursor - pattern_len;
        if data[pattern_start..cursor] != START_CODE_SHORT[..] {
            cursor -= 1;
            continue;
        }

        let code_len = if pattern_start > 0 && data[pattern_start - 1] == 0x00 {
            START_CODE.len()
        } else {
            pattern_len
        };
        let offset = cursor - code_len;
        runs.push(StartCodeRun {
            offset,
            code_len,
            payload_len: unit_end - cursor,
        });
        unit_end = offset;
        cursor = offset;
    }

    if unit_end != 0 {
        return Err(LiuError::MissingStartCode { offset: unit_end });
    }
    Ok(runs)
}

/// 长度前缀 → Annex B (原地)
///
/// 先完整校验长度链, 校验通过后才把每个 4 字节长度覆盖为规范起始码.
/// 返回 NAL 单元数量. 游标位置保持不变.
pub fn to_annex_b_in_place(buffer: &mut ByteCursor) -> LiuResult<usize> {
    let saved = buffer.position();
    let walked = walk_length_prefixes(buffer);
    buffer.set_position(saved)?;
    let offsets = walked?;

    for &offset in &offsets {
        buffer.overwrite_at(offset, &START_CODE)?;
    }
    log::debug!(
        "长度前缀 → Annex B: {} 个 NAL 单元, {} 字节",
        offsets.len(),
        buffer.len()
    );
    Ok(offsets.len())
}

/// 长度前缀 → Annex B
///
/// 输出长度与输入相同.
pub fn to_annex_b(data: &[u8]) -> LiuResult<Vec<u8>> {
    let mut buffer = ByteCursor::from(data);
    to_annex_b_in_place(&mut buffer)?;
    Ok(buffer.into_inner())
}

/// Annex B → 长度前缀
///
/// 3 字节起始码的单元在输出中多占 1 字节, 长度前缀一律为 4 字节大端.
pub fn to_length_prefixed(data: &[u8]) -> LiuResult<Vec<u8>> {
    let runs = scan_start_codes(data)?;
    let total: usize = runs
        .iter()
        .map(|run| LENGTH_PREFIX_SIZE + run.payload_len)
        .sum();

    let mut out = ByteCursor::with_capacity(total);
    for run in runs.iter().rev() {
        let len = u32::try_from(run.payload_len).map_err(|_| {
            LiuError::InvalidArgument(format!(
                "NAL 单元过长, offset={}, len={}",
                run.offset, run.payload_len
            ))
        })?;
        out.append_u32::<BigEndian>(len)
            .append(&data[run.payload_range()]);
    }
    log::debug!(
        "Annex B → 长度前缀: {} 个 NAL 单元, {} → {} 字节",
        runs.len(),
        data.len(),
        out.len()
    );
    Ok(out.into_inner())
}

/// 可从 NAL 头部解码类型的单元
pub trait UnitHeader: Sized {
    /// 类型枚举
    type Kind: Copy + PartialEq;

    /// 头部长度 (字节)
    const HEADER_LEN: usize;

    /// 从头部字节解码类型, `header.len() >= HEADER_LEN`
    fn kind_of(header: &[u8]) -> Self::Kind;

    /// 从完整 NAL 数据构造, `unit.len() >= HEADER_LEN`
    fn from_unit(offset: usize, unit: &[u8]) -> Self;

    /// 单元类型
    fn kind(&self) -> Self::Kind;

    /// 头部在源缓冲区中的偏移
    fn offset(&self) -> usize;
}

/// 从 Annex B 缓冲区中提取类型属于 `filter` 的 NAL 单元
///
/// 返回顺序为扫描顺序 (码流逆序). 需要码流顺序时用 [`sort_by_offset`].
/// 短于头部长度的单元 (包括空单元) 没有类型, 直接跳过.
pub fn extract_units<U: UnitHeader>(data: &[u8], filter: &[U::Kind]) -> LiuResult<Vec<U>> {
    extract_matching(data, |kind| filter.contains(&kind))
}

/// 按偏移恢复码流顺序
pub fn sort_by_offset<U: UnitHeader>(units: &mut [U]) {
    units.sort_by_key(U::offset);
}

fn extract_matching<U, F>(data: &[u8], wanted: F) -> LiuResult<Vec<U>>
where
    U: UnitHeader,
    F: Fn(U::Kind) -> bool,
{
    let runs = scan_start_codes(data)?;
    let mut units = Vec::new();
    for run in &runs {
        let unit = &data[run.payload_range()];
        if unit.len() < U::HEADER_LEN {
            log::debug!(
                "跳过短于头部的 NAL 单元: offset={}, len={}",
                run.payload_start(),
                unit.len()
            );
            continue;
        }
        if wanted(U::kind_of(unit)) {
            units.push(U::from_unit(run.payload_start(), unit));
        }
    }
    log::debug!(
        "提取 NAL 单元: 扫描 {} 个, 选中 {} 个",
        runs.len(),
        units.len()
    );
    Ok(units)
}

/// 视频编码格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264/AVC
    H264,
    /// H.265/HEVC
    H265,
}

/// 运行时按编码格式提取出的 NAL 单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedUnit {
    H264(NalUnit),
    H265(HevcNalUnit),
}

impl ExtractedUnit {
    /// 类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::H264(unit) => unit.nal_type.type_id(),
            Self::H265(unit) => unit.nal_type.type_id(),
        }
    }

    /// 头部在源缓冲区中的偏移
    pub fn offset(&self) -> usize {
        match self {
            Self::H264(unit) => unit.offset,
            Self::H265(unit) => unit.offset,
        }
    }

    /// 头部之后的负载
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::H264(unit) => &unit.payload,
            Self::H265(unit) => &unit.payload,
        }
    }
}

/// 按类型编号提取 NAL 单元, 编码格式在运行时指定
pub fn extract_units_by_id(
    data: &[u8],
    filter: &[u8],
    codec: VideoCodec,
) -> LiuResult<Vec<ExtractedUnit>> {
    let units = match codec {
        VideoCodec::H264 => {
            extract_matching::<NalUnit, _>(data, |kind| filter.contains(&kind.type_id()))?
                .into_iter()
                .map(ExtractedUnit::H264)
                .collect()
        }
        VideoCodec::H265 => {
            extract_matching::<HevcNalUnit, _>(data, |kind| filter.contains(&kind.type_id()))?
                .into_iter()
                .map(ExtractedUnit::H265)
                .collect()
        }
    };
    Ok(units)
}

/// 从头遍历长度链, 返回每个长度字段的偏移
fn walk_length_prefixes(buffer: &mut ByteCursor) -> LiuResult<Vec<usize>> {
    buffer.set_position(0)?;
    let mut offsets = Vec::new();
    while buffer.remaining() > 0 {
        let offset = buffer.position();
        let declared = buffer.read_u32::<BigEndian>()? as usize;
        let remaining = buffer.remaining();
        if declared > remaining {
            return Err(LiuError::LengthOutOfBounds {
                offset,
                declared,
                remaining,
            });
        }
        buffer.skip(declared)?;
        offsets.push(offset);
    }
    Ok(offsets)
}
