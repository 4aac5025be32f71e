//! 码流重组集成测试.
//!
//! 覆盖长度前缀 ↔ Annex B 往返、按类型提取参数集并生成 avcC.

use liu::codec::parsers::h264::{NalUnit, NalUnitType, build_avcc_config, parse_avcc_config};
use liu::codec::parsers::h265::HevcNalUnitType;
use liu::codec::{
    VideoCodec, extract_units, extract_units_by_id, scan_start_codes, sort_by_offset, to_annex_b,
    to_annex_b_in_place, to_length_prefixed,
};
use liu::core::{ByteCursor, ErrorKind};

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 拼接长度前缀码流
fn length_prefixed(units: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        out.extend_from_slice(&(unit.len() as u32).to_be_bytes());
        out.extend_from_slice(unit);
    }
    out
}

/// 生成不含 0 字节的伪随机单元, 避免出现起始码样式
fn pseudo_unit(seed: u32, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ((state >> 16) % 255) as u8 + 1
        })
        .collect()
}

const SPS: &[u8] = &[0x67, 0x42, 0x00, 0x1E, 0xAB, 0x40, 0x50];
const PPS: &[u8] = &[0x68, 0xCE, 0x38, 0x80];
const IDR: &[u8] = &[0x65, 0x88, 0x84, 0x21, 0xA0];
const SLICE: &[u8] = &[0x41, 0x9A, 0x02];

#[test]
fn test_gop_roundtrip() {
    init_test_logger();
    let avcc = length_prefixed(&[SPS, PPS, IDR, SLICE, SLICE]);

    let annex_b = to_annex_b(&avcc).unwrap();
    assert_eq!(annex_b.len(), avcc.len(), "4 字节长度与 4 字节起始码等长");
    assert_eq!(&annex_b[..4], &[0x00, 0x00, 0x00, 0x01]);

    let runs = scan_start_codes(&annex_b).unwrap();
    assert_eq!(runs.len(), 5);
    assert!(runs.iter().all(|run| run.code_len == 4));

    assert_eq!(to_length_prefixed(&annex_b).unwrap(), avcc, "往返后应逐字节一致");
}

#[test]
fn test_roundtrip_many_shapes() {
    for seed in 0..32u32 {
        let count = (seed % 6) as usize + 1;
        let units: Vec<Vec<u8>> = (0..count)
            .map(|i| pseudo_unit(seed * 31 + i as u32, (seed as usize * 7 + i * 13) % 200 + 1))
            .collect();
        let refs: Vec<&[u8]> = units.iter().map(Vec::as_slice).collect();
        let avcc = length_prefixed(&refs);

        let annex_b = to_annex_b(&avcc).unwrap();
        assert_eq!(
            to_length_prefixed(&annex_b).unwrap(),
            avcc,
            "seed={} 往返失败",
            seed
        );
    }
}

#[test]
fn test_in_place_matches_copying_conversion() {
    let avcc = length_prefixed(&[SPS, PPS, IDR]);
    let mut cursor = ByteCursor::from(avcc.clone());
    let count = to_annex_b_in_place(&mut cursor).unwrap();
    assert_eq!(count, 3);
    assert_eq!(cursor.as_slice(), to_annex_b(&avcc).unwrap().as_slice());
}

#[test]
fn test_parameter_sets_to_avcc_record() {
    init_test_logger();
    // 从摄像头得到的 Annex B 码流, PPS 前使用 3 字节起始码
    let mut annex_b = vec![0x00, 0x00, 0x00, 0x01];
    annex_b.extend_from_slice(SPS);
    annex_b.extend_from_slice(&[0x00, 0x00, 0x01]);
    annex_b.extend_from_slice(PPS);
    annex_b.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
    annex_b.extend_from_slice(IDR);

    let mut units =
        extract_units::<NalUnit>(&annex_b, &[NalUnitType::Sps, NalUnitType::Pps]).unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].nal_type, NalUnitType::Pps, "提取结果按扫描顺序 (从后往前)");

    sort_by_offset(&mut units);
    assert_eq!(units[0].nal_type, NalUnitType::Sps);
    assert_eq!(units[0].offset, 4);
    assert_eq!(units[0].payload, SPS[1..].to_vec());
    assert_eq!(units[1].to_bytes(), PPS.to_vec());

    let sps = vec![units[0].to_bytes()];
    let pps = vec![units[1].to_bytes()];
    let record = build_avcc_config(&sps, &pps, 4).unwrap();
    let parsed = parse_avcc_config(&record).unwrap();
    assert_eq!(parsed.profile_indication, 0x42);
    assert_eq!(parsed.level_indication, 0x1E);
    assert_eq!(parsed.sps_list, sps);
    assert_eq!(parsed.pps_list, pps);
}

#[test]
fn test_hevc_extraction_by_id() {
    let mut annex_b = Vec::new();
    for unit in [
        &[0x40, 0x01, 0x0C][..],
        &[0x42, 0x01, 0x01, 0x60][..],
        &[0x44, 0x01, 0xC1][..],
        &[0x26, 0x01, 0xAF][..],
    ] {
        annex_b.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        annex_b.extend_from_slice(unit);
    }

    let units = extract_units_by_id(&annex_b, &[32, 33, 34], VideoCodec::H265).unwrap();
    let ids: Vec<u8> = units.iter().map(|unit| unit.type_id()).collect();
    assert_eq!(ids, vec![34, 33, 32]);
    assert_eq!(units[1].payload(), &[0x01, 0x60]);
    assert_eq!(
        HevcNalUnitType::from_type_id(units[2].type_id()),
        HevcNalUnitType::Vps
    );
}

#[test]
fn test_reframe_errors_are_classified() {
    // 长度字段超出剩余字节
    let err = to_annex_b(&[0x00, 0x00, 0x00, 0x09, 0x67]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedFraming);

    // 不足 4 字节的长度字段
    let err = to_annex_b(&[0x00, 0x00, 0x01]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferUnderrun);

    // Annex B 开头没有起始码
    let err = to_length_prefixed(&[0x67, 0x42, 0x00, 0x00, 0x01, 0x68]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedFraming);

    assert!(to_length_prefixed(&[]).unwrap().is_empty());
}
