//! Benchmark: validate vs full decode vs decode + CSV rendering of one kt-classic frame.
//! The frame is synthetic: ramped histogram channels, fixed analyte digits.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ktframe::dump::write_record_csv;
use ktframe::{decode_frame, validate_frame, FieldDecoder, Model, Schema};

fn sample_frame(schema: &Schema) -> Vec<u8> {
    let mut bytes = vec![b'0'; schema.frame_len()];
    for f in schema.fields() {
        let raw: String = match &f.decoder {
            FieldDecoder::Marker { literal } => literal.clone(),
            FieldDecoder::Timestamp { .. } => "20230615143000".to_string(),
            FieldDecoder::Groups { width: 3, count: None } => (0..f.range.len() / 3)
                .map(|i| format!("{:03}", (i * 13) % 1000))
                .collect(),
            FieldDecoder::ImpliedDecimal { .. } | FieldDecoder::Percent { .. } => "1234567".chars().take(f.range.len()).collect(),
            _ => continue,
        };
        bytes[f.range.start..f.range.start + raw.len()].copy_from_slice(raw.as_bytes());
    }
    bytes
}

fn bench_decode(c: &mut Criterion) {
    let schema = Model::KtClassic.schema().expect("kt-classic");
    let frame = sample_frame(&schema);
    decode_frame(&schema, &frame).expect("sample frame decodes");

    c.bench_function("validate", |b| {
        b.iter(|| validate_frame(black_box(&schema), black_box(&frame)))
    });
    c.bench_function("decode", |b| {
        b.iter(|| decode_frame(black_box(&schema), black_box(&frame)))
    });
    c.bench_function("decode+csv", |b| {
        let mut out = Vec::with_capacity(64 * 1024);
        b.iter(|| {
            out.clear();
            let record = decode_frame(black_box(&schema), black_box(&frame)).expect("decode");
            write_record_csv(&mut out, &record).expect("csv");
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
