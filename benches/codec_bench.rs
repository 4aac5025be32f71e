//! Liu 编解码层性能基准测试.
//!
//! 覆盖码流形态转换、NAL 提取、CRC 和控制消息帧编解码.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use liu::accessory::{AccessorySettings, FramedMessage};
use liu::codec::parsers::h264::{NalUnit, NalUnitType};
use liu::codec::{extract_units, to_annex_b, to_length_prefixed};
use liu::core::crc::{CRC16_FRAME, crc16};

/// 构造一个约 1MB 的长度前缀 GOP: SPS, PPS, IDR, 其余为 P 切片
fn make_length_prefixed_gop() -> Vec<u8> {
    let mut units: Vec<Vec<u8>> = vec![
        vec![0x67, 0x64, 0x00, 0x28, 0xAC, 0xD9, 0x40],
        vec![0x68, 0xEB, 0xE3, 0xCB],
    ];
    let mut idr = vec![0x65];
    idr.extend((0..200_000u32).map(|i| (i % 251) as u8 + 1));
    units.push(idr);
    for n in 0..29u32 {
        let mut slice = vec![0x41];
        slice.extend((0..28_000u32).map(|i| ((i + n) % 253) as u8 + 1));
        units.push(slice);
    }

    let mut out = Vec::new();
    for unit in &units {
        out.extend_from_slice(&(unit.len() as u32).to_be_bytes());
        out.extend_from_slice(unit);
    }
    out
}

fn bench_to_annex_b(c: &mut Criterion) {
    let gop = make_length_prefixed_gop();
    let mut group = c.benchmark_group("reframe");
    group.throughput(Throughput::Bytes(gop.len() as u64));
    group.bench_function("to_annex_b_gop", |b| {
        b.iter(|| {
            let out = to_annex_b(black_box(&gop)).unwrap();
            black_box(out);
        });
    });

    let annex_b = to_annex_b(&gop).unwrap();
    group.bench_function("to_length_prefixed_gop", |b| {
        b.iter(|| {
            let out = to_length_prefixed(black_box(&annex_b)).unwrap();
            black_box(out);
        });
    });
    group.bench_function("extract_parameter_sets_gop", |b| {
        b.iter(|| {
            let units = extract_units::<NalUnit>(
                black_box(&annex_b),
                &[NalUnitType::Sps, NalUnitType::Pps],
            )
            .unwrap();
            black_box(units);
        });
    });
    group.finish();
}

fn bench_crc16(c: &mut Criterion) {
    let data: Vec<u8> = (0..240u32).map(|i| i as u8).collect();
    c.bench_function("crc16_frame_240", |b| {
        b.iter(|| black_box(crc16(black_box(&data), &CRC16_FRAME)));
    });
}

fn bench_frame_codec(c: &mut Criterion) {
    let settings = AccessorySettings {
        pair_pin: "0000".to_string(),
        wifi_ssid: "studio".to_string(),
        wifi_password: "secret".to_string(),
        rtmp_url: "rtmp://192.168.1.2/live/cam".to_string(),
        resolution: Default::default(),
        fps: 30,
        bitrate_kbps: 6000,
        image_stabilization: Default::default(),
        model: Default::default(),
    };
    let message = settings.start_streaming_message().unwrap();
    let frame = message.encode().unwrap();

    c.bench_function("frame_encode_start_streaming", |b| {
        b.iter(|| black_box(black_box(&message).encode().unwrap()));
    });
    c.bench_function("frame_decode_start_streaming", |b| {
        b.iter(|| black_box(FramedMessage::decode(black_box(&frame)).unwrap()));
    });
}

criterion_group!(benches, bench_to_annex_b, bench_crc16, bench_frame_codec);
criterion_main!(benches);
