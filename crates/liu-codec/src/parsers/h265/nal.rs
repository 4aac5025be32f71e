//! H.265/HEVC NAL (Network Abstraction Layer) 单元类型与头部解析.
//!
//! HEVC NAL 头部为 2 字节 (比 H.264 多一字节):
//! - 第 0 字节: forbidden_zero_bit (1 bit) | nal_unit_type (6 bits) | 层号最高位
//! - 第 1 字节: 低 6 位作为 temporal_id_plus1 字段提取

use liu_core::{LiuError, LiuResult};

use crate::reframe::UnitHeader;

/// HEVC NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HevcNalUnitType {
    /// TRAIL_N (非参考尾随图像)
    TrailN,
    /// TRAIL_R (参考尾随图像)
    TrailR,
    /// TSA_N
    TsaN,
    /// TSA_R
    TsaR,
    /// STSA_N
    StsaN,
    /// STSA_R
    StsaR,
    /// RADL_N
    RadlN,
    /// RADL_R
    RadlR,
    /// RASL_N
    RaslN,
    /// RASL_R
    RaslR,
    /// BLA_W_LP (Broken Link Access)
    BlaWLp,
    /// BLA_W_RADL
    BlaWRadl,
    /// BLA_N_LP
    BlaNLp,
    /// IDR_W_RADL (Instantaneous Decoding Refresh)
    IdrWRadl,
    /// IDR_N_LP
    IdrNLp,
    /// CRA_NUT (Clean Random Access)
    Cra,
    /// VPS (Video Parameter Set)
    Vps,
    /// SPS (Sequence Parameter Set)
    Sps,
    /// PPS (Picture Parameter Set)
    Pps,
    /// AUD (Access Unit Delimiter)
    Aud,
    /// EOS (End of Sequence)
    Eos,
    /// EOB (End of Bitstream)
    Eob,
    /// FD (Filler Data)
    FillerData,
    /// PREFIX_SEI
    PrefixSei,
    /// SUFFIX_SEI
    SuffixSei,
    /// 未知类型
    Unknown(u8),
}

impl HevcNalUnitType {
    /// 从类型编号创建
    pub fn from_type_id(id: u8) -> Self {
        match id {
            0 => Self::TrailN,
            1 => Self::TrailR,
            2 => Self::TsaN,
            3 => Self::TsaR,
            4 => Self::StsaN,
            5 => Self::StsaR,
            6 => Self::RadlN,
            7 => Self::RadlR,
            8 => Self::RaslN,
            9 => Self::RaslR,
            16 => Self::BlaWLp,
            17 => Self::BlaWRadl,
            18 => Self::BlaNLp,
            19 => Self::IdrWRadl,
            20 => Self::IdrNLp,
            21 => Self::Cra,
            32 => Self::Vps,
            33 => Self::Sps,
            34 => Self::Pps,
            35 => Self::Aud,
            36 => Self::Eos,
            37 => Self::Eob,
            38 => Self::FillerData,
            39 => Self::PrefixSei,
            40 => Self::SuffixSei,
            _ => Self::Unknown(id),
        }
    }

    /// 从第 0 个头部字节解码: `(byte0 & 0x7E) >> 1`
    pub fn from_header(byte0: u8) -> Self {
        Self::from_type_id((byte0 & 0x7E) >> 1)
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::TrailN => 0,
            Self::TrailR => 1,
            Self::TsaN => 2,
            Self::TsaR => 3,
            Self::StsaN => 4,
            Self::StsaR => 5,
            Self::RadlN => 6,
            Self::RadlR => 7,
            Self::RaslN => 8,
            Self::RaslR => 9,
            Self::BlaWLp => 16,
            Self::BlaWRadl => 17,
            Self::BlaNLp => 18,
            Self::IdrWRadl => 19,
            Self::IdrNLp => 20,
            Self::Cra => 21,
            Self::Vps => 32,
            Self::Sps => 33,
            Self::Pps => 34,
            Self::Aud => 35,
            Self::Eos => 36,
            Self::Eob => 37,
            Self::FillerData => 38,
            Self::PrefixSei => 39,
            Self::SuffixSei => 40,
            Self::Unknown(id) => *id,
        }
    }

    /// 是否为 VCL (Video Coding Layer) NAL
    pub fn is_vcl(&self) -> bool {
        self.type_id() < 32
    }

    /// 是否为 IRAP (Intra Random Access Point) NAL
    pub fn is_irap(&self) -> bool {
        matches!(self.type_id(), 16..=21)
    }

    /// 是否为 IDR NAL
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::IdrWRadl | Self::IdrNLp)
    }

    /// 是否为参数集 (VPS/SPS/PPS)
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::Vps | Self::Sps | Self::Pps)
    }
}

impl std::fmt::Display for HevcNalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vps => write!(f, "VPS"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::PrefixSei => write!(f, "PrefixSEI"),
            Self::SuffixSei => write!(f, "SuffixSEI"),
            Self::IdrWRadl | Self::IdrNLp => write!(f, "IDR({})", self.type_id()),
            Self::Cra => write!(f, "CRA"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
            other => write!(f, "NAL({})", other.type_id()),
        }
    }
}

/// 从码流中提取出的 HEVC NAL 单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HevcNalUnit {
    /// NAL 类型
    pub nal_type: HevcNalUnitType,
    /// 第 1 个头部字节的低 6 位
    pub temporal_id_plus1: u8,
    /// 头部第 0 字节在源缓冲区中的偏移
    pub offset: usize,
    /// 2 字节头部之后的负载
    pub payload: Vec<u8>,
}

impl HevcNalUnit {
    /// NAL 头部长度
    pub const HEADER_LEN: usize = 2;

    /// 从原始 NAL 数据 (含 2 字节头) 解析
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
}

impl UnitHeader for HevcNalUnit {
    type Kind = HevcNalUnitType;

    const HEADER_LEN: usize = HevcNalUnit::HEADER_LEN;

    fn kind_of(header: &[u8]) -> HevcNalUnitType {
        HevcNalUnitType::from_header(header[0])
    }

    fn from_unit(offset: usize, unit: &[u8]) -> Self {
        Self {
            nal_type: HevcNalUnitType::from_header(unit[0]),
            temporal_id_plus1: unit[1] & 0x3F,
            offset,
            payload: unit[Self::HEADER_LEN..].to_vec(),
        }
    }

    fn kind(&self) -> HevcNalUnitType {
        self.nal_type
    }

    fn offset(&self) -> usize {
        self.offset
    }
}
