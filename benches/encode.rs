//! Criterion benchmarks for the encoder hot path.
//!
//! The injection loop touches every pixel of every frame; a checkerboard
//! that inverts each frame is the worst case, since every pixel toggles on
//! every frame and nothing is saved by delta encoding.
//!
//! Run with: cargo bench --bench encode

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{GrayImage, Luma};
use std::path::Path;

use logicreel::config::EncodeSettings;
use logicreel::encode::{Encoder, BOARD_TYPE, DELAYER_TYPE, PEG_TYPE, SOCKET_TYPE};
use logicreel::frames::FrameSequence;
use logicreel::save::{ComponentType, SaveFile};

const WIDTH: u32 = 32;
const HEIGHT: u32 = 24;

fn template_save() -> SaveFile {
    let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
    for (numeric_id, text_id) in [
        (1u16, BOARD_TYPE),
        (2, DELAYER_TYPE),
        (3, PEG_TYPE),
        (4, SOCKET_TYPE),
    ] {
        save.component_types.push(ComponentType {
            numeric_id,
            text_id: text_id.to_string(),
        });
    }
    save
}

fn write_checkerboard_frames(dir: &Path, count: usize) {
    for index in 0..count {
        let img = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
            let phase = (x + y + index as u32) % 2;
            Luma([if phase == 0 { 255 } else { 0 }])
        });
        img.save(dir.join(format!("frame_{index:05}.png"))).unwrap();
    }
}

fn encode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_inject");

    for frame_count in [30usize, 120] {
        let dir = tempfile::tempdir().unwrap();
        write_checkerboard_frames(dir.path(), frame_count);
        let frames = FrameSequence::scan(dir.path(), 127).unwrap();

        group.throughput(Throughput::Elements(frame_count as u64));
        group.bench_with_input(
            BenchmarkId::new("checkerboard", frame_count),
            &frames,
            |b, frames| {
                b.iter(|| {
                    let mut save = template_save();
                    Encoder::new(&EncodeSettings::default())
                        .inject(&mut save, frames)
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, encode_throughput);
criterion_main!(benches);
