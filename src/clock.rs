use crate::app::App;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::{error, info, warn};
use std::time::{Duration, Instant};

/// Periodic driver for `App::update`. Stopping it is the only way to cancel
/// playback; the timeline keeps whatever state it last had.
pub struct Clock {
    interval: Duration,
    token: Option<RegistrationToken>,
}

/// Next deadline on a fixed grid from the previous one. If the loop has
/// fallen a whole period behind, restart the grid from `now` instead of
/// firing a burst of catch-up ticks.
fn next_deadline(deadline: Instant, interval: Duration, now: Instant) -> Instant {
    let next = deadline + interval;
    if next <= now {
        now + interval
    } else {
        next
    }
}

impl Clock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            token: None,
        }
    }

    pub fn start(&mut self, handle: &LoopHandle<'static, App>) -> anyhow::Result<()> {
        if self.token.is_some() {
            return Ok(());
        }
        let interval = self.interval;
        let token = handle
            .insert_source(Timer::from_duration(interval), move |deadline, _, app: &mut App| {
                if let Err(e) = app.update() {
                    error!("Render failed: {:#}", e);
                    app.running = false;
                    return TimeoutAction::Drop;
                }
                let now = Instant::now();
                let next = next_deadline(deadline, interval, now);
                if next != deadline + interval {
                    warn!("Clock fell behind by {:?}", now - deadline);
                }
                TimeoutAction::ToInstant(next)
            })
            .map_err(|e| anyhow::anyhow!("Failed to start clock: {}", e.error))?;
        self.token = Some(token);
        info!("Clock started, ticking every {:?}", interval);
        Ok(())
    }

    pub fn stop(&mut self, handle: &LoopHandle<'static, App>) {
        if let Some(token) = self.token.take() {
            handle.remove(token);
            info!("Clock stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderSink;
    use crate::roster::Roster;
    use crate::timeline::{Frame, LegendEntry, SpeedLimits, TimelineController};
    use calloop::EventLoop;

    struct NullSink;

    impl RenderSink for NullSink {
        fn present(&mut self, _frame: &Frame, _legend: &[LegendEntry]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn app() -> App {
        let timeline = TimelineController::new(Roster::builtin().unwrap(), SpeedLimits::default());
        App::new(timeline, Box::new(NullSink))
    }

    fn run_until_ticked(event_loop: &mut EventLoop<'static, App>, app: &mut App, ticks: u64) {
        for _ in 0..100 {
            if app.frames_rendered() >= ticks {
                return;
            }
            event_loop.dispatch(Duration::from_millis(50), app).unwrap();
        }
        panic!("clock only ticked {} times", app.frames_rendered());
    }

    #[test]
    fn stop_halts_ticks_and_keeps_time() {
        let mut event_loop: EventLoop<'static, App> = EventLoop::try_new().unwrap();
        let handle = event_loop.handle();
        let mut app = app();
        let mut clock = Clock::new(Duration::from_millis(5));

        clock.start(&handle).unwrap();
        run_until_ticked(&mut event_loop, &mut app, 3);
        assert!(app.timeline.time() > 0.0);

        clock.stop(&handle);
        let time = app.timeline.time();
        let frames = app.frames_rendered();
        event_loop.dispatch(Duration::from_millis(30), &mut app).unwrap();
        assert_eq!(app.timeline.time(), time);
        assert_eq!(app.frames_rendered(), frames);
    }

    #[test]
    fn second_start_registers_no_extra_timer() {
        let mut event_loop: EventLoop<'static, App> = EventLoop::try_new().unwrap();
        let handle = event_loop.handle();
        let mut app = app();
        let mut clock = Clock::new(Duration::from_millis(5));

        clock.start(&handle).unwrap();
        clock.start(&handle).unwrap();
        run_until_ticked(&mut event_loop, &mut app, 2);

        // A leaked second timer would keep ticking after stop.
        clock.stop(&handle);
        let time = app.timeline.time();
        event_loop.dispatch(Duration::from_millis(30), &mut app).unwrap();
        assert_eq!(app.timeline.time(), time);
    }

    #[test]
    fn deadlines_stay_on_a_fixed_grid() {
        let start = Instant::now();
        let interval = Duration::from_millis(500);
        let late_render = start + Duration::from_millis(120);
        assert_eq!(next_deadline(start, interval, late_render), start + interval);
    }

    #[test]
    fn missed_periods_are_skipped_not_replayed() {
        let start = Instant::now();
        let interval = Duration::from_millis(500);
        let stalled = start + Duration::from_millis(1700);
        assert_eq!(next_deadline(start, interval, stalled), stalled + interval);
    }
}
