//! The seam between the scheduler and whatever drives it.
//!
//! A host owns the clock and the wake-ups. The scheduler arms a [`Wake`],
//! the host later reports it through `BatchScheduler::on_wake` with the
//! handle it returned from [`ScheduleHost::arm`].

use std::time::Duration;

/// Identifies one armed wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What the scheduler asks to be woken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// When the host is idle, or after `timeout` at the latest.
    Idle { timeout: Duration },
    /// At the next frame.
    Frame,
    /// After a fixed pause.
    Delay(Duration),
}

/// Time the host grants an idle wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleDeadline {
    /// Host clock reading at which the idle period ends.
    pub ends_at: Duration,
    /// The wake-up was forced by its timeout rather than by idleness.
    pub did_timeout: bool,
}

impl IdleDeadline {
    pub fn time_remaining(&self, now: Duration) -> Duration {
        self.ends_at.saturating_sub(now)
    }
}

/// How an armed wake-up was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    Idle(IdleDeadline),
    Frame,
    Timer,
}

pub trait ScheduleHost {
    /// Whether [`Wake::Idle`] can be armed.
    fn supports_idle(&self) -> bool;

    fn arm(&mut self, wake: Wake) -> ScheduleHandle;

    /// Cancel an armed wake-up. Unknown handles are ignored.
    fn disarm(&mut self, handle: ScheduleHandle);

    /// Monotonic clock reading.
    fn now(&self) -> Duration;
}

/// Receives the revealed count after every batch.
pub trait RenderConsumer {
    fn settle(&mut self, revealed_count: usize);
}

impl RenderConsumer for () {
    fn settle(&mut self, _revealed_count: usize) {}
}

impl<F: FnMut(usize)> RenderConsumer for F {
    fn settle(&mut self, revealed_count: usize) {
        self(revealed_count)
    }
}

/// How follow-up batches are paced, fixed when the scheduler is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingStrategy {
    /// Fill idle periods with as many batches as fit.
    Idle,
    /// One batch per frame, followed by the configured delay.
    FrameThenDelay,
}

impl PacingStrategy {
    pub fn detect<H: ScheduleHost + ?Sized>(host: &H) -> Self {
        if host.supports_idle() {
            PacingStrategy::Idle
        } else {
            PacingStrategy::FrameThenDelay
        }
    }
}
