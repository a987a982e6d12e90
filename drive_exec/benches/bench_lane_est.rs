//! # Lane Estimation Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::Luma;

use drive_lib::lane_est::{EdgeImage, HoughLines, LaneEst, LineDetector};

fn lane_est_benchmark(c: &mut Criterion) {
    // ---- Build a frame with two lane boundaries ----

    let mut edge = EdgeImage::new(640, 400);
    for y in 0..400u32 {
        let left = 50 + (400 - y) * 70 / 300;
        let right = 600 - (400 - y) * 80 / 300;

        for dx in 0..3 {
            edge.put_pixel(left + dx, y, Luma([255]));
            edge.put_pixel(right + dx, y, Luma([255]));
        }
    }

    let hough = HoughLines::default();
    let lane_est = LaneEst::default();

    c.bench_function("hough_lines", |b| b.iter(|| hough.detect(black_box(&edge))));

    let lines = hough.detect(&edge);
    c.bench_function("lane_est", |b| {
        b.iter(|| lane_est.estimate(black_box(&lines), 640, 400))
    });
}

criterion_group!(benches, lane_est_benchmark);
criterion_main!(benches);
