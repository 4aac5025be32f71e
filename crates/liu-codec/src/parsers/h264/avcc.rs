//! AVCDecoderConfigurationRecord (avcC) 构建与解析.
//!
//! RTMP/FLV 的序列头和 MP4 的 avcC box 都使用该结构描述 SPS/PPS
//! 以及长度前缀的字节数.
//!
//! ```text
//! Bits | 字段
//! ---- | ----
//! 8    | configurationVersion (= 1)
//! 8    | AVCProfileIndication
//! 8    | profile_compatibility
//! 8    | AVCLevelIndication
//! 6+2  | reserved (111111) | lengthSizeMinusOne
//! 3+5  | reserved (111) | numOfSequenceParameterSets
//! 16   | sequenceParameterSetLength, 随后为 SPS
//! 8    | numOfPictureParameterSets
//! 16   | pictureParameterSetLength, 随后为 PPS
//! ```

use liu_core::{BigEndian, ByteCursor, LiuError, LiuResult};

/// avcC 配置解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvccConfig {
    /// AVCProfileIndication
    pub profile_indication: u8,
    /// profile_compatibility
    pub profile_compatibility: u8,
    /// AVCLevelIndication
    pub level_indication: u8,
    /// NAL 长度前缀大小 (字节)
    pub length_size: usize,
    /// SPS 列表 (含 NAL 头部字节)
    pub sps_list: Vec<Vec<u8>>,
    /// PPS 列表 (含 NAL 头部字节)
    pub pps_list: Vec<Vec<u8>>,
}

/// 构建 AVCDecoderConfigurationRecord
///
/// `sps_list`/`pps_list` 中的每一项都是含头部字节的完整 NAL 单元.
pub fn build_avcc_config(
    sps_list: &[Vec<u8>],
    pps_list: &[Vec<u8>],
    length_size: usize,
) -> LiuResult<Vec<u8>> {
    if !(1..=4).contains(&length_size) {
        return Err(LiuError::InvalidArgument(format!(
            "H.264: avcC 长度前缀大小非法, length_size={}",
            length_size
        )));
    }
    let sps0 = match sps_list.first() {
        Some(sps) => sps,
        None => {
            return Err(LiuError::InvalidArgument(
                "H.264: 构建 avcC 需要至少一个 SPS".into(),
            ));
        }
    };
    if sps0.len() < 4 {
        return Err(LiuError::InvalidArgument(format!(
            "H.264: SPS 数据太短, len={}",
            sps0.len()
        )));
    }
    if sps_list.len() > 0x1F || pps_list.len() > 0xFF {
        return Err(LiuError::InvalidArgument(format!(
            "H.264: 参数集数量超出上限, sps={}, pps={}",
            sps_list.len(),
            pps_list.len()
        )));
    }

    let mut out = ByteCursor::new();
    out.append_u8(1)
        .append(&sps0[1..4])
        .append_u8(0xFC | (length_size as u8 - 1))
        .append_u8(0xE0 | sps_list.len() as u8);
    for sps in sps_list {
        append_parameter_set(&mut out, sps)?;
    }
    out.append_u8(pps_list.len() as u8);
    for pps in pps_list {
        append_parameter_set(&mut out, pps)?;
    }

    Ok(out.into_inner())
}

/// 解析 AVCDecoderConfigurationRecord
pub fn parse_avcc_config(data: &[u8]) -> LiuResult<AvccConfig> {
    let mut cursor = ByteCursor::from(data);

    let version = cursor.read_u8()?;
    if version != 1 {
        return Err(LiuError::InvalidData(format!(
            "H.264: avcC 版本不支持, version={}",
            version
        )));
    }
    let profile_indication = cursor.read_u8()?;
    let profile_compatibility = cursor.read_u8()?;
    let level_indication = cursor.read_u8()?;
    let length_size = usize::from(cursor.read_u8()? & 0x03) + 1;

    let num_sps = usize::from(cursor.read_u8()? & 0x1F);
    let sps_list = read_parameter_sets(&mut cursor, num_sps, "SPS")?;

    let num_pps = usize::from(cursor.read_u8()?);
    let pps_list = read_parameter_sets(&mut cursor, num_pps, "PPS")?;

    Ok(AvccConfig {
        profile_indication,
        profile_compatibility,
        level_indication,
        length_size,
        sps_list,
        pps_list,
    })
}

fn append_parameter_set(out: &mut ByteCursor, set: &[u8]) -> LiuResult<()> {
    let len = u16::try_from(set.len()).map_err(|_| {
        LiuError::InvalidArgument(format!("H.264: 参数集过长, len={}", set.len()))
    })?;
    out.append_u16::<BigEndian>(len).append(set);
    Ok(())
}

fn read_parameter_sets(
    cursor: &mut ByteCursor,
    count: usize,
    name: &str,
) -> LiuResult<Vec<Vec<u8>>> {
    let mut sets = Vec::with_capacity(count);
    for index in 0..count {
        let len = usize::from(cursor.read_u16::<BigEndian>()?);
        if len == 0 {
            return Err(LiuError::InvalidData(format!(
                "H.264: avcC {} 长度非法, index={}, len=0",
                name, index
            )));
        }
        let remaining = cursor.remaining();
        if len > remaining {
            return Err(LiuError::LengthOutOfBounds {
                offset: cursor.position() - 2,
                declared: len,
                remaining,
            });
        }
        sets.push(cursor.read_bytes(len)?);
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liu_core::ErrorKind;

    #[test]
    fn test_avcc_config_roundtrip() {
        let sps = vec![0x67, 0x42, 0x00, 0x1E, 0xAB];
        let pps = vec![0x68, 0xCE, 0x38, 0x80];

        let config =
            build_avcc_config(std::slice::from_ref(&sps), std::slice::from_ref(&pps), 4).unwrap();
        assert_eq!(&config[..6], &[0x01, 0x42, 0x00, 0x1E, 0xFF, 0xE1]);

        let parsed = parse_avcc_config(&config).unwrap();
        assert_eq!(parsed.length_size, 4);
        assert_eq!(parsed.profile_indication, 0x42);
        assert_eq!(parsed.level_indication, 0x1E);
        assert_eq!(parsed.sps_list, vec![sps]);
        assert_eq!(parsed.pps_list, vec![pps]);
    }

    #[test]
    fn test_avcc_config_no_sps_error() {
        assert!(build_avcc_config(&[], &[], 4).is_err());
    }

    #[test]
    fn test_avcc_config_bad_length_size() {
        let sps = vec![0x67, 0x42, 0x00, 0x1E];
        assert!(build_avcc_config(std::slice::from_ref(&sps), &[], 0).is_err());
        assert!(build_avcc_config(std::slice::from_ref(&sps), &[], 5).is_err());
    }

    #[test]
    fn test_parse_avcc_config_reject_truncated_sps_length_field() {
        // num_sps=1, 但 SPS 长度字段只有 1 字节.
        let data = [0x01, 0x64, 0x00, 0x1E, 0xFF, 0xE1, 0x00];
        let err = parse_avcc_config(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferUnderrun);
    }

    #[test]
    fn test_parse_avcc_config_reject_truncated_sps_payload() {
        // num_sps=1, declared_len=4, 实际仅 2 字节.
        let data = [0x01, 0x64, 0x00, 0x1E, 0xFF, 0xE1, 0x00, 0x04, 0x67, 0x64];
        let err = parse_avcc_config(&data).unwrap_err();
        assert!(matches!(
            err,
            LiuError::LengthOutOfBounds {
                offset: 6,
                declared: 4,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_parse_avcc_config_reject_missing_num_pps_field() {
        let data = [0x01, 0x64, 0x00, 0x1E, 0xFF, 0xE1, 0x00, 0x01, 0x67];
        let err = parse_avcc_config(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferUnderrun);
    }

    #[test]
    fn test_parse_avcc_config_reject_bad_version() {
        let data = [0x02, 0x64, 0x00, 0x1E, 0xFF, 0xE0, 0x00];
        let err = parse_avcc_config(&data).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("版本"), "错误信息应包含版本, actual={}", msg);
    }
}
