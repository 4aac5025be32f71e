//! H.264 NAL (Network Abstraction Layer) 单元类型与头部解析.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```
//!
//! 提取时保留头部高 3 位 (forbidden_zero_bit 与 nal_ref_idc) 作为参考优先级,
//! 符合规范的码流中 forbidden_zero_bit 恒为 0, 该值即 nal_ref_idc.

use liu_core::{LiuError, LiuResult};

use crate::reframe::UnitHeader;

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// 数据分区 A (DPA)
    SliceDpa,
    /// 数据分区 B (DPB)
    SliceDpb,
    /// 数据分区 C (DPC)
    SliceDpc,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 序列结束
    EndOfSequence,
    /// 流结束
    EndOfStream,
    /// 填充数据
    FillerData,
    /// SPS 扩展
    SpsExtension,
    /// 未知类型
    Unknown(u8),
}

impl NalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            1 => Self::Slice,
            2 => Self::SliceDpa,
            3 => Self::SliceDpb,
            4 => Self::SliceDpc,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            10 => Self::EndOfSequence,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            13 => Self::SpsExtension,
            _ => Self::Unknown(type_id),
        }
    }

    /// 从头部字节解码 (低 5 位)
    pub fn from_header(header: u8) -> Self {
        Self::from_type_id(header & 0x1F)
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Slice => 1,
            Self::SliceDpa => 2,
            Self::SliceDpb => 3,
            Self::SliceDpc => 4,
            Self::SliceIdr => 5,
            Self::Sei => 6,
            Self::Sps => 7,
            Self::Pps => 8,
            Self::Aud => 9,
            Self::EndOfSequence => 10,
            Self::EndOfStream => 11,
            Self::FillerData => 12,
            Self::SpsExtension => 13,
            Self::Unknown(id) => *id,
        }
    }

    /// 是否为 VCL (Video Coding Layer) NAL
    pub fn is_vcl(&self) -> bool {
        matches!(
            self,
            Self::Slice | Self::SliceDpa | Self::SliceDpb | Self::SliceDpc | Self::SliceIdr
        )
    }

    /// 是否为关键帧 (IDR)
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::SliceIdr)
    }

    /// 是否为参数集 (SPS/PPS)
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::Sps | Self::Pps | Self::SpsExtension)
    }
}

impl std::fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slice => write!(f, "Slice"),
            Self::SliceDpa => write!(f, "SliceDPA"),
            Self::SliceDpb => write!(f, "SliceDPB"),
            Self::SliceDpc => write!(f, "SliceDPC"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::EndOfSequence => write!(f, "EndOfSeq"),
            Self::EndOfStream => write!(f, "EndOfStream"),
            Self::FillerData => write!(f, "Filler"),
            Self::SpsExtension => write!(f, "SPSExt"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

/// 从码流中提取出的 H.264 NAL 单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NalUnit {
    /// NAL 单元类型
    pub nal_type: NalUnitType,
    /// 头部高 3 位 (参考优先级)
    pub ref_idc: u8,
    /// 头部字节在源缓冲区中的偏移
    pub offset: usize,
    /// 头部之后的负载
    pub payload: Vec<u8>,
}

impl NalUnit {
    /// NAL 头部长度
    pub const HEADER_LEN: usize = 1;

    /// 从 NAL 数据 (含头部字节) 解析
    pub fn parse(offset: usize, unit: &[u8]) -> LiuResult<Self> {
        if unit.len() < Self::HEADER_LEN {
            return Err(LiuError::TruncatedUnitHeader {
                offset,
                length: unit.len(),
                required: Self::HEADER_LEN,
            });
        }
        Ok(<Self as UnitHeader>::from_unit(offset, unit))
    }

    /// 还原头部字节
    pub fn header(&self) -> u8 {
        (self.ref_idc << 5) | (self.nal_type.type_id() & 0x1F)
    }

    /// 还原完整 NAL 数据 (头部 + 负载, 不含起始码或长度前缀)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::HEADER_LEN + self.payload.len());
        out.push(self.header());
        out.extend_from_slice(&self.payload);
        out
    }
}

impl UnitHeader for NalUnit {
    type Kind = NalUnitType;

    const HEADER_LEN: usize = NalUnit::HEADER_LEN;

    fn kind_of(header: &[u8]) -> NalUnitType {
        NalUnitType::from_header(header[0])
    }

    fn from_unit(offset: usize, unit: &[u8]) -> Self {
        let header = unit[0];
        Self {
            nal_type: NalUnitType::from_header(header),
            ref_idc: header >> 5,
            offset,
            payload: unit[Self::HEADER_LEN..].to_vec(),
        }
    }

    fn kind(&self) -> NalUnitType {
        self.nal_type
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nal_type_create() {
        assert_eq!(NalUnitType::from_type_id(7), NalUnitType::Sps);
        assert_eq!(NalUnitType::from_type_id(8), NalUnitType::Pps);
        assert_eq!(NalUnitType::from_type_id(5), NalUnitType::SliceIdr);
        assert_eq!(NalUnitType::from_type_id(1), NalUnitType::Slice);
        assert_eq!(NalUnitType::from_type_id(9), NalUnitType::Aud);
        assert_eq!(NalUnitType::from_type_id(24), NalUnitType::Unknown(24));
    }

    #[test]
    fn test_nal_type_type_id() {
        for id in 0..=31 {
            assert_eq!(NalUnitType::from_type_id(id).type_id(), id);
        }
    }

    #[test]
    fn test_nal_type_property() {
        assert!(NalUnitType::SliceIdr.is_vcl());
        assert!(NalUnitType::SliceIdr.is_idr());
        assert!(!NalUnitType::Slice.is_idr());
        assert!(!NalUnitType::Sps.is_vcl());
        assert!(NalUnitType::Pps.is_parameter_set());
        assert_eq!(NalUnitType::Sps.to_string(), "SPS");
    }

    #[test]
    fn test_nal_unit_parse() {
        // forbidden=0, ref_idc=3, type=7 (SPS): 0b0_11_00111 = 0x67
        let nalu = NalUnit::parse(10, &[0x67, 0x42, 0x00, 0x1E]).unwrap();
        assert_eq!(nalu.nal_type, NalUnitType::Sps);
        assert_eq!(nalu.ref_idc, 3);
        assert_eq!(nalu.offset, 10);
        assert_eq!(nalu.payload, vec![0x42, 0x00, 0x1E]);
        assert_eq!(nalu.to_bytes(), vec![0x67, 0x42, 0x00, 0x1E]);
    }

    #[test]
    fn test_nal_unit_keeps_forbidden_bit_in_priority() {
        let nalu = NalUnit::parse(0, &[0xE5]).unwrap();
        assert_eq!(nalu.nal_type, NalUnitType::SliceIdr);
        assert_eq!(nalu.ref_idc, 7);
        assert_eq!(nalu.header(), 0xE5);
    }

    #[test]
    fn test_nal_unit_empty_data_error() {
        let err = NalUnit::parse(3, &[]).unwrap_err();
        assert!(matches!(
            err,
            LiuError::TruncatedUnitHeader {
                offset: 3,
                length: 0,
                required: 1
            }
        ));
    }
}
