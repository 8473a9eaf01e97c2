use brewscale_core::{DisplayHysteresis, StepDetector, TrimmedMovingAverage};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

// Synthetic weight trace: a cup placed at one third, noise throughout.
fn synth_trace(n: usize, noise_amp: f32, seed: u32) -> Vec<f32> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x as f32) / (u32::MAX as f32 + 1.0)
    };
    (0..n)
        .map(|i| {
            let load = if i > n / 3 { 250.0 } else { 0.0 };
            load + (next_f32() * 2.0 - 1.0) * noise_amp
        })
        .collect()
}

fn run_pipeline(trace: &[f32], window: usize) -> f32 {
    let mut filter = TrimmedMovingAverage::new(window);
    let mut step = StepDetector::default();
    let mut display = DisplayHysteresis::default();
    let mut shown = 0.0;
    for &g in trace {
        if step.check(g, filter.value()) {
            filter.prefill(g, 6);
        }
        shown = display.decide(filter.push(g));
    }
    shown
}

pub fn bench_pipeline(c: &mut Criterion) {
    let mut g = c.benchmark_group("filter_pipeline");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p brewscale_core --bench filter
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(10));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let trace = synth_trace(20_000, 0.3, 0xC0FFEE);

    for &window in &[8usize, 16, 64] {
        g.bench_function(format!("window_{window}"), |b| {
            b.iter_batched(
                || trace.clone(),
                |t| {
                    let y = run_pipeline(black_box(&t), black_box(window));
                    black_box(y);
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(filter, bench_pipeline);
criterion_main!(filter);
