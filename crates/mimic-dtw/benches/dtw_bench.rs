//! Criterion benchmarks for mimic-dtw: sliding-window alignment and motion scoring.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mimic_dtw::{AlignmentMode, GlobalWindow, MotionComparison, Signal, SlidingDtw};

fn make_helix(n: usize, phase: f64) -> Signal {
    let samples: Vec<[f64; 3]> = (0..n)
        .map(|i| {
            let t = i as f64 * 0.05 + phase;
            [t.cos(), t.sin(), 0.1 * t]
        })
        .collect();
    Signal::from_samples(&samples).unwrap()
}

fn bench_sliding_dtw(c: &mut Criterion) {
    let lengths = [120usize, 360, 720];
    let windows: &[(GlobalWindow, &str)] = &[
        (GlobalWindow::None, "unconstrained"),
        (GlobalWindow::sakoe_chiba(30.0), "band_f30"),
        (GlobalWindow::sakoe_chiba(300.0), "band_f300"),
    ];

    let mut group = c.benchmark_group("sliding_dtw");
    group.sample_size(10);

    for &len in &lengths {
        for &(window, label) in windows {
            let id = BenchmarkId::new(format!("len{len}"), label);
            let a = make_helix(len, 0.0);
            let b = make_helix(len, 0.3);
            let dtw = SlidingDtw::new(12).unwrap().with_global_window(window);

            group.bench_with_input(id, &(a, b, dtw), |bencher, (a, b, dtw)| {
                bencher.iter(|| dtw.align(a, b).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_motion_dot(c: &mut Criterion) {
    let a = make_helix(720, 0.0);
    let b = make_helix(650, 0.2);
    let comparison = MotionComparison::new(AlignmentMode::DtwCalc);

    c.bench_function("motion_dot_dtw_calc_720x650", |bencher| {
        bencher.iter(|| comparison.dot_product(&a, &b, None).unwrap());
    });
}

criterion_group!(benches, bench_sliding_dtw, bench_motion_dot);
criterion_main!(benches);
