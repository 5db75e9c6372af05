//! The memorization countdown.
//!
//! [`StudyTimer`] is a plain state machine with reducer-style transitions.
//! [`Countdown`] drives it from a one-second tokio interval and owns the
//! only handle to that ticking task, so the task ends whenever the timer
//! pauses, completes, or is dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Something observable that a transition caused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Started,
    Ticked { remaining: u32 },
    Paused,
    Resumed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyTimer {
    duration: u32,
    remaining: u32,
    phase: TimerPhase,
}

impl StudyTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            phase: TimerPhase::Idle,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds studied so far.
    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == TimerPhase::Completed
    }

    /// Share of the duration already spent, 0–100.
    pub fn progress_percent(&self) -> f64 {
        if self.duration == 0 {
            return 100.0;
        }
        f64::from(self.elapsed()) / f64::from(self.duration) * 100.0
    }

    /// Begin counting. Valid from idle or paused with time left.
    pub fn start(&mut self) -> Option<TimerEvent> {
        if !matches!(self.phase, TimerPhase::Idle | TimerPhase::Paused) || self.remaining == 0 {
            return None;
        }
        self.phase = TimerPhase::Running;
        Some(TimerEvent::Started)
    }

    /// Advance one second. Reaching zero completes the timer.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.phase = TimerPhase::Completed;
            return Some(TimerEvent::Completed);
        }
        self.remaining -= 1;
        Some(TimerEvent::Ticked {
            remaining: self.remaining,
        })
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.phase = TimerPhase::Paused;
        Some(TimerEvent::Paused)
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Paused || self.remaining == 0 {
            return None;
        }
        self.phase = TimerPhase::Running;
        Some(TimerEvent::Resumed)
    }

    /// Finish early, e.g. when the trainee moves on before time is up.
    pub fn complete(&mut self) -> Option<TimerEvent> {
        if self.phase == TimerPhase::Completed {
            return None;
        }
        self.phase = TimerPhase::Completed;
        Some(TimerEvent::Completed)
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Background task that sends one message per second until aborted.
struct Ticker {
    handle: JoinHandle<()>,
    ticks: mpsc::Receiver<()>,
}

impl Ticker {
    fn spawn() -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { handle, ticks }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A [`StudyTimer`] driven by real time.
///
/// Must be used inside a tokio runtime.
pub struct Countdown {
    timer: StudyTimer,
    ticker: Option<Ticker>,
}

impl Countdown {
    pub fn new(timer: StudyTimer) -> Self {
        Self {
            timer,
            ticker: None,
        }
    }

    pub fn timer(&self) -> &StudyTimer {
        &self.timer
    }

    /// Whether a ticking task is currently alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn start(&mut self) -> Option<TimerEvent> {
        let event = self.timer.start()?;
        self.ticker = Some(Ticker::spawn());
        Some(event)
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        let event = self.timer.pause()?;
        self.ticker = None;
        Some(event)
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        let event = self.timer.resume()?;
        self.ticker = Some(Ticker::spawn());
        Some(event)
    }

    pub fn complete(&mut self) -> Option<TimerEvent> {
        self.ticker = None;
        self.timer.complete()
    }

    /// Wait for the next second and apply it.
    ///
    /// Returns `None` when the countdown is not running.
    pub async fn next_tick(&mut self) -> Option<TimerEvent> {
        let ticker = self.ticker.as_mut()?;
        ticker.ticks.recv().await?;
        let event = self.timer.tick();
        if self.timer.is_completed() {
            self.ticker = None;
        }
        event
    }

    /// Stop ticking and hand back the timer state.
    pub fn into_timer(self) -> StudyTimer {
        self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_down_to_completion() {
        let mut timer = StudyTimer::new(3);
        assert_eq!(timer.start(), Some(TimerEvent::Started));
        assert_eq!(timer.tick(), Some(TimerEvent::Ticked { remaining: 2 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Ticked { remaining: 1 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Completed));
        assert_eq!(timer.remaining(), 0);
        assert!(timer.is_completed());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed(), 3);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let mut timer = StudyTimer::new(60);
        timer.start();
        assert_eq!(timer.start(), None);
    }

    #[test]
    fn pause_and_resume() {
        let mut timer = StudyTimer::new(60);
        assert_eq!(timer.pause(), None);
        timer.start();
        timer.tick();
        assert_eq!(timer.pause(), Some(TimerEvent::Paused));
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 59);
        assert_eq!(timer.resume(), Some(TimerEvent::Resumed));
        assert!(timer.is_running());
    }

    #[test]
    fn start_from_paused_restarts_counting() {
        let mut timer = StudyTimer::new(60);
        timer.start();
        timer.tick();
        timer.pause();
        assert_eq!(timer.start(), Some(TimerEvent::Started));
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.remaining(), 59);
        assert_eq!(timer.tick(), Some(TimerEvent::Ticked { remaining: 58 }));
    }

    #[test]
    fn manual_completion() {
        let mut timer = StudyTimer::new(60);
        timer.start();
        assert_eq!(timer.complete(), Some(TimerEvent::Completed));
        assert_eq!(timer.complete(), None);
        assert_eq!(timer.resume(), None);
    }

    #[test]
    fn zero_duration_never_starts() {
        let mut timer = StudyTimer::new(0);
        assert_eq!(timer.start(), None);
        assert_eq!(timer.progress_percent(), 100.0);
    }

    #[test]
    fn progress_and_clock() {
        let mut timer = StudyTimer::new(60);
        timer.start();
        for _ in 0..15 {
            timer.tick();
        }
        assert_eq!(timer.progress_percent(), 25.0);
        assert_eq!(format_clock(timer.remaining()), "0:45");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_each_second_until_done() {
        let mut countdown = Countdown::new(StudyTimer::new(3));
        countdown.start();
        assert!(countdown.is_ticking());

        assert_eq!(
            countdown.next_tick().await,
            Some(TimerEvent::Ticked { remaining: 2 })
        );
        assert_eq!(
            countdown.next_tick().await,
            Some(TimerEvent::Ticked { remaining: 1 })
        );
        assert_eq!(countdown.next_tick().await, Some(TimerEvent::Completed));
        assert!(!countdown.is_ticking());
        assert_eq!(countdown.next_tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_releases_the_ticker() {
        let mut countdown = Countdown::new(StudyTimer::new(10));
        countdown.start();
        countdown.next_tick().await;
        countdown.pause();
        assert!(!countdown.is_ticking());
        assert_eq!(countdown.next_tick().await, None);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(countdown.timer().remaining(), 9);

        countdown.resume();
        assert!(countdown.is_ticking());
        assert_eq!(
            countdown.next_tick().await,
            Some(TimerEvent::Ticked { remaining: 8 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_after_pause_spawns_a_fresh_ticker() {
        let mut countdown = Countdown::new(StudyTimer::new(10));
        countdown.start();
        countdown.next_tick().await;
        countdown.pause();
        assert_eq!(countdown.start(), Some(TimerEvent::Started));
        assert!(countdown.is_ticking());
        assert_eq!(
            countdown.next_tick().await,
            Some(TimerEvent::Ticked { remaining: 8 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn complete_releases_the_ticker() {
        let mut countdown = Countdown::new(StudyTimer::new(10));
        countdown.start();
        assert_eq!(countdown.complete(), Some(TimerEvent::Completed));
        assert!(!countdown.is_ticking());
        assert!(countdown.into_timer().is_completed());
    }
}
