//! Wall-clock schedule host for the terminal event loop.
//!
//! The terminal has no notion of idle time, so the scheduler paces itself
//! one batch per frame followed by its configured delay. Armed wake-ups are
//! kept here until the event loop collects the ones that are due.

use std::time::{Duration, Instant};

use markdown_reveal_engine::scheduler::IdleDeadline;
use markdown_reveal_engine::{Fired, ScheduleHandle, ScheduleHost, Wake};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug)]
struct Armed {
    handle: ScheduleHandle,
    wake: Wake,
    due: Instant,
}

#[derive(Debug)]
pub struct TerminalHost {
    started: Instant,
    next_id: u64,
    armed: Vec<Armed>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            next_id: 0,
            armed: Vec::new(),
        }
    }

    /// How long the event loop may block before a wake-up is due.
    pub fn time_to_next_wake(&self, now: Instant) -> Option<Duration> {
        self.armed
            .iter()
            .map(|armed| armed.due.saturating_duration_since(now))
            .min()
    }

    /// Remove and return every wake-up due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(ScheduleHandle, Fired)> {
        let (mut due, pending): (Vec<Armed>, Vec<Armed>) = std::mem::take(&mut self.armed)
            .into_iter()
            .partition(|armed| armed.due <= now);
        self.armed = pending;
        due.sort_by_key(|armed| armed.due);

        due.into_iter()
            .map(|armed| {
                let fired = match armed.wake {
                    Wake::Frame => Fired::Frame,
                    Wake::Delay(_) => Fired::Timer,
                    Wake::Idle { .. } => Fired::Idle(IdleDeadline {
                        ends_at: self.started.elapsed(),
                        did_timeout: true,
                    }),
                };
                (armed.handle, fired)
            })
            .collect()
    }

    pub fn is_armed(&self) -> bool {
        !self.armed.is_empty()
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleHost for TerminalHost {
    fn supports_idle(&self) -> bool {
        false
    }

    fn arm(&mut self, wake: Wake) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle::new(self.next_id);
        let wait = match wake {
            Wake::Frame => FRAME_INTERVAL,
            Wake::Delay(delay) => delay,
            Wake::Idle { timeout } => timeout,
        };
        self.armed.push(Armed {
            handle,
            wake,
            due: Instant::now() + wait,
        });
        handle
    }

    fn disarm(&mut self, handle: ScheduleHandle) {
        self.armed.retain(|armed| armed.handle != handle);
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}
