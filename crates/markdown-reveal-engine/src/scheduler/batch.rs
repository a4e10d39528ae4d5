use std::fmt;
use std::time::Duration;

use crate::scheduler::config::BatchConfig;
use crate::scheduler::host::{
    Fired, IdleDeadline, PacingStrategy, RenderConsumer, ScheduleHandle, ScheduleHost, Wake,
};

const SHRINK_RATIO: f64 = 1.5;
const GROW_RATIO: f64 = 0.6;
const SHRINK_FACTOR: f64 = 0.75;
const GROW_FACTOR: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No chain is active.
    Idle,
    /// A wake-up is armed.
    Scheduled,
    /// Batches are running inside a wake-up.
    Executing,
}

/// Reported whenever the adaptive batch size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSizeChange {
    pub previous: usize,
    pub current: usize,
    /// Cost of the batch that caused the change, `None` on reset.
    pub elapsed: Option<Duration>,
}

type SizeListener = Box<dyn FnMut(&BatchSizeChange)>;

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: ScheduleHandle,
    wake: Wake,
    batch_size: usize,
}

/// Reveals a growing prefix of `total` nodes in adaptively sized batches.
///
/// The first batch is revealed synchronously when a document is observed.
/// The rest follow from wake-ups armed on the host, one wake-up pending at
/// a time. Each batch is timed and the batch size is shrunk or grown to
/// keep its cost close to the configured budget.
pub struct BatchScheduler<H: ScheduleHost> {
    host: H,
    config: BatchConfig,
    strategy: PacingStrategy,
    total: usize,
    last_total: Option<usize>,
    revealed_count: usize,
    phase: Phase,
    adaptive_batch_size: usize,
    pending: Option<Pending>,
    listeners: Vec<SizeListener>,
}

impl<H: ScheduleHost> BatchScheduler<H> {
    pub fn new(host: H, config: BatchConfig) -> Self {
        let strategy = PacingStrategy::detect(&host);
        Self::with_strategy(host, config, strategy)
    }

    pub fn with_strategy(host: H, config: BatchConfig, strategy: PacingStrategy) -> Self {
        log::debug!("batch scheduler created: {strategy:?}, {config:?}");
        Self {
            host,
            config,
            strategy,
            total: 0,
            last_total: None,
            revealed_count: 0,
            phase: Phase::Idle,
            adaptive_batch_size: config.batch_size,
            pending: None,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn strategy(&self) -> PacingStrategy {
        self.strategy
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a chain of batches is active.
    pub fn is_scheduling(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn adaptive_batch_size(&self) -> usize {
        self.adaptive_batch_size
    }

    /// Handle of the armed wake-up, if any.
    pub fn pending_handle(&self) -> Option<ScheduleHandle> {
        self.pending.map(|pending| pending.handle)
    }

    /// Fraction of the document revealed, in `[0, 1]`. Zero for an empty document.
    pub fn render_progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.revealed_count as f64 / self.total as f64).min(1.0)
    }

    pub fn on_batch_size_change<F>(&mut self, listener: F)
    where
        F: FnMut(&BatchSizeChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// React to the document's top-level node count.
    ///
    /// Growth keeps what is revealed and continues the chain. Shrinking,
    /// or the first observation, starts over. An empty document resets.
    pub fn observe_total(&mut self, total: usize) {
        let previous = self.last_total.replace(total);
        self.total = total;
        if previous == Some(total) {
            return;
        }

        if total == 0 {
            self.reset();
            return;
        }

        match previous {
            Some(previous) if total > previous => {
                log::trace!("document grew {previous} -> {total}");
                if !self.config.enabled {
                    self.revealed_count = total;
                } else if !self.is_scheduling() && self.revealed_count < total {
                    self.schedule_next();
                }
            }
            _ => {
                log::trace!("document replaced, {total} nodes");
                self.reset();
                self.initialize();
            }
        }
    }

    /// Reveal the initial batch and start the chain if more remains.
    pub fn initialize(&mut self) {
        if !self.config.enabled {
            self.revealed_count = self.total;
            return;
        }
        if self.total == 0 {
            self.revealed_count = 0;
            return;
        }

        self.revealed_count = self.config.initial_batch_size.min(self.total);
        if self.revealed_count < self.total && !self.is_scheduling() {
            self.schedule_next();
        }
    }

    /// Ask for the next batch now, outside of the regular chain.
    ///
    /// Ignored while a chain is active or when everything is revealed.
    pub fn render_next_batch(&mut self) {
        if !self.config.enabled {
            self.revealed_count = self.total;
            return;
        }
        if self.revealed_count >= self.total {
            return;
        }
        if self.is_scheduling() {
            log::trace!("render_next_batch ignored, chain already active");
            return;
        }
        self.schedule_next();
    }

    /// Cancel any pending wake-up and hide everything.
    pub fn reset(&mut self) {
        self.cancel_schedule();
        self.revealed_count = 0;
        self.set_batch_size(self.config.batch_size, None);
    }

    /// Cancel any pending wake-up. Revealed state is kept.
    pub fn cancel_schedule(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::trace!("disarming {:?}", pending.handle);
            self.host.disarm(pending.handle);
        }
        self.phase = Phase::Idle;
    }

    /// Reveal up to `size` more nodes, then adapt the batch size to the
    /// time it took. Returns that time.
    pub fn execute_batch<C>(&mut self, size: usize, consumer: &mut C) -> Duration
    where
        C: RenderConsumer + ?Sized,
    {
        let started = self.host.now();
        let step = size.min(self.total.saturating_sub(self.revealed_count));
        self.revealed_count += step;
        consumer.settle(self.revealed_count);
        let elapsed = self.host.now().saturating_sub(started);
        self.adapt(elapsed);
        elapsed
    }

    /// Deliver a wake-up. Returns false when `handle` is not the pending
    /// one, in which case nothing changes.
    pub fn on_wake<C>(&mut self, handle: ScheduleHandle, fired: Fired, consumer: &mut C) -> bool
    where
        C: RenderConsumer + ?Sized,
    {
        let Some(pending) = self.pending else {
            log::trace!("stale wake {handle:?} ignored");
            return false;
        };
        if pending.handle != handle {
            log::trace!("stale wake {handle:?} ignored, pending {:?}", pending.handle);
            return false;
        }
        self.pending = None;

        match pending.wake {
            Wake::Idle { .. } => {
                let deadline = match fired {
                    Fired::Idle(deadline) => deadline,
                    Fired::Frame | Fired::Timer => IdleDeadline {
                        ends_at: self.host.now(),
                        did_timeout: true,
                    },
                };
                self.run_idle(deadline, pending.batch_size, consumer);
                self.schedule_next();
            }
            Wake::Frame if !self.config.batch_delay.is_zero() => {
                self.arm(Wake::Delay(self.config.batch_delay), pending.batch_size);
            }
            Wake::Frame | Wake::Delay(_) => {
                self.phase = Phase::Executing;
                self.execute_batch(pending.batch_size, consumer);
                self.schedule_next();
            }
        }
        true
    }

    fn run_idle<C>(&mut self, deadline: IdleDeadline, batch_size: usize, consumer: &mut C)
    where
        C: RenderConsumer + ?Sized,
    {
        self.phase = Phase::Executing;
        let half_budget = self.config.batch_budget / 2;
        while self.revealed_count < self.total
            && (deadline.did_timeout || deadline.time_remaining(self.host.now()) > half_budget)
        {
            self.execute_batch(batch_size, consumer);
        }
    }

    fn schedule_next(&mut self) {
        if self.revealed_count >= self.total {
            log::debug!("all {} nodes revealed", self.total);
            self.phase = Phase::Idle;
            return;
        }

        let wake = match self.strategy {
            PacingStrategy::Idle => Wake::Idle {
                timeout: self.config.idle_timeout,
            },
            PacingStrategy::FrameThenDelay => Wake::Frame,
        };
        self.arm(wake, self.adaptive_batch_size.max(1));
    }

    fn arm(&mut self, wake: Wake, batch_size: usize) {
        let handle = self.host.arm(wake);
        log::trace!("armed {wake:?} as {handle:?}, batch of {batch_size}");
        self.pending = Some(Pending {
            handle,
            wake,
            batch_size,
        });
        self.phase = Phase::Scheduled;
    }

    fn adapt(&mut self, elapsed: Duration) {
        let budget = self.config.batch_budget.as_secs_f64();
        let ratio = elapsed.as_secs_f64() / budget;
        let current = self.adaptive_batch_size;

        if ratio > SHRINK_RATIO {
            let shrunk = (current as f64 * SHRINK_FACTOR).floor() as usize;
            self.set_batch_size(shrunk.max(self.config.min_batch_size()), Some(elapsed));
        } else if ratio < GROW_RATIO && current < self.config.batch_size {
            let grown = (current as f64 * GROW_FACTOR).ceil() as usize;
            self.set_batch_size(grown.min(self.config.batch_size), Some(elapsed));
        }
    }

    fn set_batch_size(&mut self, size: usize, elapsed: Option<Duration>) {
        let previous = self.adaptive_batch_size;
        if previous == size {
            return;
        }
        self.adaptive_batch_size = size;
        log::debug!("batch size {previous} -> {size}");

        let change = BatchSizeChange {
            previous,
            current: size,
            elapsed,
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

impl<H: ScheduleHost> Drop for BatchScheduler<H> {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}

impl<H: ScheduleHost + fmt::Debug> fmt::Debug for BatchScheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("host", &self.host)
            .field("strategy", &self.strategy)
            .field("total", &self.total)
            .field("revealed_count", &self.revealed_count)
            .field("phase", &self.phase)
            .field("adaptive_batch_size", &self.adaptive_batch_size)
            .field("pending", &self.pending.map(|p| p.handle))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::config::BatchOptions;
    use crate::scheduler::manual::ManualHost;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn frame_host() -> ManualHost {
        ManualHost::new()
    }

    fn options(initial: i64, batch: i64) -> BatchConfig {
        BatchConfig::from(BatchOptions {
            initial_batch_size: Some(initial),
            batch_size: Some(batch),
            ..Default::default()
        })
    }

    #[test]
    fn first_observation_reveals_initial_batch() {
        let mut scheduler = BatchScheduler::new(frame_host(), BatchConfig::default());
        scheduler.observe_total(100);

        assert_eq!(scheduler.revealed_count(), 40);
        assert_eq!(scheduler.phase(), Phase::Scheduled);
        assert_eq!(scheduler.strategy(), PacingStrategy::FrameThenDelay);
        assert_eq!(scheduler.host().armed(), vec![Wake::Frame]);
    }

    #[test]
    fn small_document_is_revealed_without_scheduling() {
        let mut scheduler = BatchScheduler::new(frame_host(), BatchConfig::default());
        scheduler.observe_total(10);

        assert_eq!(scheduler.revealed_count(), 10);
        assert!(!scheduler.is_scheduling());
        assert!(scheduler.host().armed().is_empty());
    }

    #[test]
    fn frame_wake_arms_delay_before_executing() {
        let mut scheduler = BatchScheduler::new(frame_host(), options(10, 10));
        scheduler.observe_total(50);

        assert!(scheduler.step(&mut ()));
        assert_eq!(scheduler.revealed_count(), 10);
        assert_eq!(
            scheduler.host().armed(),
            vec![Wake::Delay(Duration::from_millis(16))]
        );

        assert!(scheduler.step(&mut ()));
        assert_eq!(scheduler.revealed_count(), 20);
        assert_eq!(scheduler.host().armed(), vec![Wake::Frame]);
    }

    #[test]
    fn zero_delay_executes_on_the_frame() {
        let config = BatchConfig::from(BatchOptions {
            initial_batch_size: Some(10),
            batch_size: Some(10),
            batch_delay_ms: Some(0.0),
            ..Default::default()
        });
        let mut scheduler = BatchScheduler::new(frame_host(), config);
        scheduler.observe_total(30);

        assert!(scheduler.step(&mut ()));
        assert_eq!(scheduler.revealed_count(), 20);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut scheduler = BatchScheduler::new(frame_host(), options(10, 10));
        scheduler.observe_total(50);
        let stale = scheduler.pending_handle().unwrap();
        scheduler.cancel_schedule();
        scheduler.render_next_batch();

        assert!(!scheduler.on_wake(stale, Fired::Frame, &mut ()));
        assert_eq!(scheduler.revealed_count(), 10);
        assert_ne!(scheduler.pending_handle(), Some(stale));
    }

    #[test]
    fn render_next_batch_is_ignored_while_scheduled() {
        let mut scheduler = BatchScheduler::new(frame_host(), options(10, 10));
        scheduler.observe_total(50);
        let handle = scheduler.pending_handle();

        scheduler.render_next_batch();
        assert_eq!(scheduler.pending_handle(), handle);
        assert_eq!(scheduler.host().armed().len(), 1);
    }

    #[test]
    fn cancel_leaves_no_pending_wake_and_keeps_state() {
        let mut scheduler = BatchScheduler::new(frame_host(), options(10, 10));
        scheduler.observe_total(50);
        scheduler.cancel_schedule();

        assert!(scheduler.host().armed().is_empty());
        assert_eq!(scheduler.revealed_count(), 10);
        assert!(!scheduler.is_scheduling());

        scheduler.host_mut().advance(Duration::from_secs(1));
        assert!(!scheduler.step(&mut ()));
        assert_eq!(scheduler.revealed_count(), 10);
    }

    #[test]
    fn slow_batches_shrink_to_the_floor() {
        let host = frame_host();
        let clock = host.clone();
        let mut scheduler = BatchScheduler::new(host, options(10, 80));
        scheduler.observe_total(1000);

        let mut slow = |_: usize| clock.advance(Duration::from_millis(20));
        scheduler.run_until_idle(&mut slow);

        assert_eq!(scheduler.revealed_count(), 1000);
        assert_eq!(scheduler.adaptive_batch_size(), 20);
    }

    #[test]
    fn fast_batches_grow_back_to_the_maximum() {
        let host = frame_host();
        let clock = host.clone();
        let mut scheduler = BatchScheduler::new(host, options(10, 80));
        scheduler.observe_total(5000);

        let mut slow = |_: usize| clock.advance(Duration::from_millis(20));
        for _ in 0..10 {
            scheduler.step(&mut slow);
        }
        assert!(scheduler.adaptive_batch_size() < 80);

        scheduler.run_until_idle(&mut ());
        assert_eq!(scheduler.adaptive_batch_size(), 80);
    }

    #[test]
    fn batch_size_changes_are_reported() {
        let host = frame_host();
        let clock = host.clone();
        let mut scheduler = BatchScheduler::new(host, options(10, 80));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        scheduler.on_batch_size_change(move |change| sink.borrow_mut().push(*change));
        scheduler.observe_total(200);

        let mut slow = |_: usize| clock.advance(Duration::from_millis(10));
        scheduler.step(&mut slow);
        scheduler.step(&mut slow);

        assert_eq!(
            changes.borrow().as_slice(),
            &[BatchSizeChange {
                previous: 80,
                current: 60,
                elapsed: Some(Duration::from_millis(10)),
            }]
        );
    }

    #[test]
    fn idle_wake_fills_the_idle_period() {
        let host = ManualHost::with_idle(Duration::from_millis(50));
        let clock = host.clone();
        let mut scheduler = BatchScheduler::new(host, options(10, 10));
        scheduler.observe_total(100);
        assert_eq!(scheduler.strategy(), PacingStrategy::Idle);

        // 10ms per batch, run while more than 3ms of the 50ms period remain.
        let mut cost = |_: usize| clock.advance(Duration::from_millis(10));
        scheduler.step(&mut cost);

        assert_eq!(scheduler.revealed_count(), 60);
        assert!(matches!(
            scheduler.host().armed().as_slice(),
            [Wake::Idle { .. }]
        ));
    }

    #[test]
    fn forced_idle_wake_runs_to_completion() {
        let host = ManualHost::with_idle(Duration::ZERO);
        let mut scheduler = BatchScheduler::new(host, options(10, 10));
        scheduler.observe_total(100);

        scheduler.step(&mut ());
        assert_eq!(scheduler.revealed_count(), 100);
        assert!(!scheduler.is_scheduling());
    }

    #[test]
    fn disabled_reveals_everything_at_once() {
        let config = BatchConfig::from(BatchOptions {
            enabled: Some(false),
            ..Default::default()
        });
        let mut scheduler = BatchScheduler::new(frame_host(), config);
        scheduler.observe_total(500);
        assert_eq!(scheduler.revealed_count(), 500);

        scheduler.observe_total(800);
        assert_eq!(scheduler.revealed_count(), 800);
        assert!(scheduler.host().armed().is_empty());
    }

    #[test]
    fn empty_document_has_zero_progress() {
        let mut scheduler = BatchScheduler::new(frame_host(), BatchConfig::default());
        scheduler.observe_total(0);
        assert_eq!(scheduler.revealed_count(), 0);
        assert_eq!(scheduler.render_progress(), 0.0);
    }

    #[test]
    fn dropping_the_scheduler_disarms_its_wake() {
        let host = frame_host();
        let observer = host.clone();
        let mut scheduler = BatchScheduler::new(host, options(10, 10));
        scheduler.observe_total(50);
        assert_eq!(observer.armed().len(), 1);

        drop(scheduler);
        assert!(observer.armed().is_empty());
    }
}
