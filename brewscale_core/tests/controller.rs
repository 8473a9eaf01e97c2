//! Buttons, timer and tare through `ScaleController::step`, on a manual clock.

use brewscale_core::mocks::{ManualClock, ScriptedScale};
use brewscale_core::{
    BuildError, FilterCfg, Frame, SamplingCfg, ScaleController, TimerCfg, TimerEvent,
    is_sensor_timeout,
};
use brewscale_hardware::SimulatedButton;
use rstest::rstest;

struct Rig {
    clock: ManualClock,
    tare: SimulatedButton,
    timer: SimulatedButton,
    ctl: ScaleController<ScriptedScale>,
}

impl Rig {
    fn new(timer_cfg: TimerCfg) -> Self {
        let clock = ManualClock::new();
        let tare = SimulatedButton::new();
        let timer = SimulatedButton::new();
        let mut ctl = ScaleController::builder()
            .with_scale(ScriptedScale::holding(0))
            .with_tare_button(tare.clone())
            .with_timer_button(timer.clone())
            .with_timer(timer_cfg)
            .with_clock(Box::new(clock.clone()))
            .build()
            .unwrap();
        ctl.begin().unwrap();
        Self {
            clock,
            tare,
            timer,
            ctl,
        }
    }

    /// Step `ms / 10` times, 10 ms apart, collecting the frames.
    fn run_ms(&mut self, ms: u64) -> Vec<Frame> {
        let mut frames = Vec::new();
        for _ in 0..ms / 10 {
            self.clock.advance_ms(10);
            frames.push(self.ctl.step().unwrap());
        }
        frames
    }

    /// Step `ms / 10` times while every read times out.
    fn run_stalled_ms(&mut self, ms: u64) {
        self.ctl.scale_mut().set_hold(None);
        for _ in 0..ms / 10 {
            self.clock.advance_ms(10);
            let err = self.ctl.step().expect_err("stalled scale must fail");
            assert!(is_sensor_timeout(&err), "unexpected error: {err:#}");
        }
    }
}

fn events(frames: &[Frame]) -> Vec<TimerEvent> {
    frames.iter().filter_map(|f| f.timer_event).collect()
}

#[test]
fn short_press_starts_the_timer_and_time_accumulates() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.run_ms(100);

    rig.timer.press();
    let mut frames = rig.run_ms(300);
    rig.timer.release();
    frames.extend(rig.run_ms(50));
    assert_eq!(events(&frames), vec![TimerEvent::Started]);
    assert!(rig.ctl.timer().is_running());

    let frames = rig.run_ms(2_000);
    let last = frames.last().unwrap();
    assert!(last.timer_running);
    assert!(last.elapsed_ms >= 2_000, "elapsed {}", last.elapsed_ms);
    assert_eq!(last.time_text, "0:02");
}

#[test]
fn second_short_press_freezes_elapsed_time() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.timer.press();
    rig.run_ms(200);
    rig.timer.release();
    rig.run_ms(1_000);

    rig.timer.press();
    rig.run_ms(200);
    rig.timer.release();
    let frames = rig.run_ms(50);
    assert_eq!(events(&frames), vec![TimerEvent::Stopped]);

    let frozen = rig.ctl.timer().elapsed_ms();
    rig.run_ms(3_000);
    assert_eq!(rig.ctl.timer().elapsed_ms(), frozen);
}

#[test]
fn long_press_resets_once_and_re_zeroes_the_scale() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.timer.press();
    rig.run_ms(100);
    rig.timer.release();
    rig.run_ms(5_000);
    assert!(rig.ctl.timer().elapsed_ms() > 4_000);

    rig.timer.press();
    let mut frames = rig.run_ms(2_500);
    rig.timer.release();
    frames.extend(rig.run_ms(100));

    assert_eq!(events(&frames), vec![TimerEvent::Reset]);
    let resets: Vec<_> = frames
        .iter()
        .filter(|f| f.timer_event == Some(TimerEvent::Reset))
        .collect();
    assert!(resets[0].tared);
    assert_eq!(frames.iter().filter(|f| f.tared).count(), 1);

    let last = frames.last().unwrap();
    assert!(!last.timer_running);
    assert_eq!(last.elapsed_ms, 0);
    assert_eq!(last.time_text, "0:00");
}

#[test]
fn long_press_leaves_offset_alone_when_reset_tares_is_off() {
    let mut rig = Rig::new(TimerCfg {
        reset_tares: false,
        ..TimerCfg::default()
    });
    rig.timer.press();
    let frames = rig.run_ms(2_000);
    assert_eq!(events(&frames), vec![TimerEvent::Reset]);
    assert!(frames.iter().all(|f| !f.tared));
}

#[test]
fn holding_tare_re_zeroes_once_per_press() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.tare.press();
    let frames = rig.run_ms(1_000);
    rig.tare.release();
    assert_eq!(frames.iter().filter(|f| f.tared).count(), 1);

    rig.run_ms(100);
    rig.tare.press();
    let frames = rig.run_ms(100);
    assert_eq!(frames.iter().filter(|f| f.tared).count(), 1);
}

#[test]
fn tare_button_bounce_is_ignored() {
    let mut rig = Rig::new(TimerCfg::default());
    let mut tared = 0;
    for _ in 0..5 {
        rig.tare.press();
        tared += rig.run_ms(10).iter().filter(|f| f.tared).count();
        rig.tare.release();
        tared += rig.run_ms(10).iter().filter(|f| f.tared).count();
    }
    assert_eq!(tared, 0);
}

#[test]
fn tare_pressed_during_a_sensor_stall_is_retried_once_reads_recover() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.run_ms(100);

    rig.tare.press();
    rig.run_stalled_ms(50);
    rig.tare.release();
    assert!(rig.ctl.tare_pending());
    assert_eq!(rig.ctl.calibrator().offset(), 0);

    rig.ctl.scale_mut().set_hold(Some(5_000));
    let frames = rig.run_ms(200);
    assert!(frames[0].tared);
    assert_eq!(frames.iter().filter(|f| f.tared).count(), 1);
    assert!(!rig.ctl.tare_pending());
    assert_eq!(rig.ctl.calibrator().offset(), 5_000);
    assert_eq!(frames.last().unwrap().weight_text, "0.0g");
}

#[test]
fn long_press_reset_during_a_sensor_stall_is_reported_on_recovery() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.timer.press();
    rig.run_stalled_ms(2_000);
    rig.timer.release();
    rig.run_stalled_ms(50);
    assert!(rig.ctl.tare_pending());

    rig.ctl.scale_mut().set_hold(Some(-800));
    let frames = rig.run_ms(50);
    assert_eq!(frames[0].timer_event, Some(TimerEvent::Reset));
    assert!(frames[0].tared);
    assert_eq!(events(&frames), vec![TimerEvent::Reset]);
    assert_eq!(rig.ctl.calibrator().offset(), -800);
}

#[test]
fn tare_clears_filter_history() {
    let mut rig = Rig::new(TimerCfg::default());
    rig.run_ms(100);
    assert!(!rig.ctl.filter().is_empty());
    rig.ctl.tare().unwrap();
    assert!(rig.ctl.filter().is_empty());
    assert_eq!(rig.ctl.displayed(), None);
}

#[test]
fn missing_scale_is_a_build_error() {
    let err = ScaleController::<ScriptedScale>::builder().build().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingScale)
    ));
}

#[rstest]
#[case(FilterCfg { window: 3, ..FilterCfg::default() }, SamplingCfg::default())]
#[case(FilterCfg { step_threshold_g: 0.0, ..FilterCfg::default() }, SamplingCfg::default())]
#[case(FilterCfg { display_hysteresis_g: -0.1, ..FilterCfg::default() }, SamplingCfg::default())]
#[case(FilterCfg::default(), SamplingCfg { tare_samples: 0, ..SamplingCfg::default() })]
#[case(FilterCfg::default(), SamplingCfg { read_timeout_ms: 0, ..SamplingCfg::default() })]
fn invalid_tuning_is_rejected(#[case] filter: FilterCfg, #[case] sampling: SamplingCfg) {
    let err = ScaleController::builder()
        .with_scale(ScriptedScale::holding(0))
        .with_filter(filter)
        .with_sampling(sampling)
        .build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}
