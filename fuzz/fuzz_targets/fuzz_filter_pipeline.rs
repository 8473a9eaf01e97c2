#![no_main]
use brewscale_core::{DisplayHysteresis, StepDetector, TrimmedMovingAverage};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    window: u8,
    prefill_cycles: u8,
    samples: Vec<i16>,
}

fuzz_target!(|input: Input| {
    let mut filter = TrimmedMovingAverage::new(usize::from(input.window));
    let mut step = StepDetector::default();
    let mut display = DisplayHysteresis::default();

    for raw in input.samples {
        // decigrams keep the values finite and in the scale's range
        let g = f32::from(raw) / 10.0;
        if step.check(g, filter.value()) {
            filter.prefill(g, u32::from(input.prefill_cycles));
        }
        let filtered = filter.push(g);
        assert!(filtered.is_finite());
        assert!(filter.len() <= filter.capacity());
        let (lo, hi) = filter
            .samples()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));
        assert!(filtered >= lo - 1e-2 && filtered <= hi + 1e-2);
        display.decide(filtered);
    }
});
