use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wall_scanner::analysis::SurfaceAnalyzer;
use wall_scanner::capture::Frame;
use wall_scanner::detection::{non_max_suppression, DecoderConfig, DetectionDecoder};
use wall_scanner::encoding::{FrameEncoder, Tensor};

/// 8400 candidate rows in the usual YOLO layout; roughly one in six clears
/// the confidence threshold, clustered around a few fixtures.
fn candidate_tensor() -> Tensor {
    let mut state = 0x2545_f491_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 10_000) as f32 / 10_000.0
    };

    let centers = [(120.0, 400.0), (320.0, 200.0), (500.0, 420.0), (560.0, 120.0)];
    let records: Vec<Vec<f32>> = (0..8400)
        .map(|i| {
            let (cx, cy) = centers[i % centers.len()];
            let confidence = if i % 6 == 0 { 0.5 + next() * 0.5 } else { next() * 0.5 };
            let mut record = vec![
                cx + next() * 24.0,
                cy + next() * 24.0,
                30.0 + next() * 20.0,
                40.0 + next() * 20.0,
                confidence,
            ];
            record.extend((0..4).map(|_| next()));
            record
        })
        .collect();

    Tensor::from_records(&records).expect("records share one length")
}

fn bench_decode(c: &mut Criterion) {
    let tensor = candidate_tensor();
    let decoder = DetectionDecoder::new(DecoderConfig::default());

    c.bench_function("decode_8400_candidates", |b| {
        b.iter(|| black_box(decoder.decode(Some(black_box(&tensor)))))
    });

    let candidates = decoder
        .parse_candidates(&tensor)
        .expect("fixture tensor is well formed");
    c.bench_function("nms_only", |b| {
        b.iter(|| black_box(non_max_suppression(black_box(candidates.clone()), 0.4)))
    });
}

fn bench_frame_path(c: &mut Criterion) {
    let frame = Frame::from_fn(640, 640, 1, |x, y| {
        let v = ((x * 7 + y * 3) % 256) as u8;
        [v, v / 2, 255 - v, 255]
    });
    let encoder = FrameEncoder::new(640);
    let analyzer = SurfaceAnalyzer::new();

    c.bench_function("encode_640", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&frame))))
    });
    c.bench_function("analyze_640", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&frame))))
    });
}

criterion_group!(benches, bench_decode, bench_frame_path);
criterion_main!(benches);
