//! A deterministic host with a virtual clock.
//!
//! Nothing fires on its own: [`BatchScheduler::step`] delivers the earliest
//! armed wake-up and moves the clock forward to its due time. Clones share
//! the same clock and queue, so a clone can observe or advance a host that
//! a scheduler owns.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::batch::BatchScheduler;
use crate::scheduler::host::{
    Fired, IdleDeadline, RenderConsumer, ScheduleHandle, ScheduleHost, Wake,
};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

const MAX_TURNS: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
struct Armed {
    handle: ScheduleHandle,
    wake: Wake,
    due: Duration,
}

#[derive(Debug)]
struct State {
    now: Duration,
    next_id: u64,
    frame_interval: Duration,
    /// `None` when idle wake-ups are unsupported. Zero means the host is
    /// never idle, so idle wake-ups only fire on their timeout.
    idle_period: Option<Duration>,
    armed: Vec<Armed>,
}

#[derive(Debug, Clone)]
pub struct ManualHost {
    state: Rc<RefCell<State>>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// A host with frames and timers but no idle wake-ups.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                now: Duration::ZERO,
                next_id: 1,
                frame_interval: DEFAULT_FRAME_INTERVAL,
                idle_period: None,
                armed: Vec::new(),
            })),
        }
    }

    /// A host that grants `idle_period` of idle time per idle wake-up.
    pub fn with_idle(idle_period: Duration) -> Self {
        let host = Self::new();
        host.state.borrow_mut().idle_period = Some(idle_period);
        host
    }

    pub fn advance(&self, by: Duration) {
        self.state.borrow_mut().now += by;
    }

    /// Armed wake-ups in the order they were armed.
    pub fn armed(&self) -> Vec<Wake> {
        self.state.borrow().armed.iter().map(|a| a.wake).collect()
    }

    /// Remove the earliest armed wake-up, moving the clock to its due time.
    pub fn next_due(&self) -> Option<(ScheduleHandle, Fired)> {
        let mut state = self.state.borrow_mut();
        let position = state
            .armed
            .iter()
            .enumerate()
            .min_by_key(|(_, armed)| (armed.due, armed.handle))
            .map(|(position, _)| position)?;
        let armed = state.armed.remove(position);
        state.now = state.now.max(armed.due);

        let fired = match armed.wake {
            Wake::Frame => Fired::Frame,
            Wake::Delay(_) => Fired::Timer,
            Wake::Idle { .. } => match state.idle_period {
                Some(period) if !period.is_zero() => Fired::Idle(IdleDeadline {
                    ends_at: state.now + period,
                    did_timeout: false,
                }),
                _ => Fired::Idle(IdleDeadline {
                    ends_at: state.now,
                    did_timeout: true,
                }),
            },
        };
        Some((armed.handle, fired))
    }
}

impl ScheduleHost for ManualHost {
    fn supports_idle(&self) -> bool {
        self.state.borrow().idle_period.is_some()
    }

    fn arm(&mut self, wake: Wake) -> ScheduleHandle {
        let mut state = self.state.borrow_mut();
        let handle = ScheduleHandle::new(state.next_id);
        state.next_id += 1;

        let wait = match wake {
            Wake::Frame => state.frame_interval,
            Wake::Delay(delay) => delay,
            Wake::Idle { timeout } => match state.idle_period {
                Some(period) if !period.is_zero() => state.frame_interval.min(timeout),
                _ => timeout,
            },
        };
        let due = state.now + wait;
        state.armed.push(Armed { handle, wake, due });
        handle
    }

    fn disarm(&mut self, handle: ScheduleHandle) {
        self.state.borrow_mut().armed.retain(|a| a.handle != handle);
    }

    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

impl BatchScheduler<ManualHost> {
    /// Deliver the earliest armed wake-up. Returns false when none is armed.
    pub fn step<C>(&mut self, consumer: &mut C) -> bool
    where
        C: RenderConsumer + ?Sized,
    {
        let Some((handle, fired)) = self.host().next_due() else {
            return false;
        };
        self.on_wake(handle, fired, consumer);
        true
    }

    /// Deliver wake-ups until none is armed. Returns how many were delivered.
    pub fn run_until_idle<C>(&mut self, consumer: &mut C) -> usize
    where
        C: RenderConsumer + ?Sized,
    {
        let mut turns = 0;
        while self.step(consumer) {
            turns += 1;
            if turns == MAX_TURNS {
                log::warn!("stopped after {MAX_TURNS} wake-ups with work still armed");
                break;
            }
        }
        turns
    }
}
