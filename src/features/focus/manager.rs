//! The session manager.
//!
//! `FocusSessionManager` owns a `SessionMachine` behind a mutex and runs a
//! single tokio drive loop per countdown. Every state change happens under
//! the lock; persistence and listener dispatch happen after it is released,
//! so a listener may call back into the manager.
//!
//! Notifications carry the epoch they were raised under. One that is
//! delivered after a later start or stop is dropped, except
//! `SessionCompleted`, which always arrives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::dispatch::{Dispatcher, InlineDispatcher};
use super::events::{EventKind, FocusEvent, Listeners, SubscriptionId};
use super::machine::{SessionMachine, TimerSnapshot};
use super::policy::{DurationPolicy, PolicyConfig, RestRule, TffBounds};
use super::session::{Distraction, SessionRecord, TimerMode};
use super::timer::TimerPhase;
use crate::error::FocusError;
use crate::storage::{SessionLog, SettingsStore, UserSettings};

/// Default drive loop period.
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(200);

/// Default Pomodoro rest used by `start_work` in Pomodoro mode.
pub const DEFAULT_POMODORO_REST_MINUTES: i64 = 5;

struct Shared {
    machine: SessionMachine,
    rng: StdRng,
    policy: PolicyConfig,
    user: UserSettings,
}

struct Inner {
    state: Mutex<Shared>,
    log: Arc<dyn SessionLog>,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<dyn Dispatcher>,
    listeners: Listeners,
    ticker: Mutex<Option<JoinHandle<()>>>,
    runtime: Option<Handle>,
    poll_interval: std::time::Duration,
    pomodoro_rest: Duration,
}

/// Builder for `FocusSessionManager`.
pub struct ManagerBuilder {
    log: Arc<dyn SessionLog>,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<dyn Dispatcher>,
    runtime: Option<Handle>,
    poll_interval: std::time::Duration,
    pomodoro_rest: Duration,
    seed: Option<u64>,
}

impl ManagerBuilder {
    /// Use `clock` instead of the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deliver notifications through `dispatcher`.
    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Drive loop period.
    #[must_use]
    pub const fn poll_interval(mut self, interval: std::time::Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Rest that follows `start_work` in Pomodoro mode.
    #[must_use]
    pub const fn pomodoro_rest(mut self, rest: Duration) -> Self {
        self.pomodoro_rest = rest;
        self
    }

    /// Runtime for the drive loop. With none, call `tick()` to advance.
    #[must_use]
    pub fn runtime(mut self, runtime: Option<Handle>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Seed the random source for reproducible draws.
    #[must_use]
    pub const fn rng_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load settings and build the manager.
    #[must_use]
    pub fn build(self) -> FocusSessionManager {
        let policy = self.settings.load_policy();
        let user = self.settings.load_user();
        let rng = self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        debug!(?policy, last_mode = %user.mode(), "focus manager ready");

        FocusSessionManager {
            inner: Arc::new(Inner {
                state: Mutex::new(Shared {
                    machine: SessionMachine::new(),
                    rng,
                    policy,
                    user,
                }),
                log: self.log,
                settings: self.settings,
                clock: self.clock,
                dispatcher: self.dispatcher,
                listeners: Listeners::default(),
                ticker: Mutex::new(None),
                runtime: self.runtime,
                poll_interval: self.poll_interval,
                pomodoro_rest: self.pomodoro_rest,
            }),
        }
    }
}

/// Session timing and state-transition engine.
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct FocusSessionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FocusSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSessionManager")
            .field("snapshot", &self.snapshot())
            .field("listeners", &self.inner.listeners)
            .finish_non_exhaustive()
    }
}

impl FocusSessionManager {
    /// Manager with the system clock, inline dispatch and the ambient runtime.
    #[must_use]
    pub fn new(log: Arc<dyn SessionLog>, settings: Arc<dyn SettingsStore>) -> Self {
        Self::builder(log, settings).build()
    }

    /// Start configuring a manager over the given stores.
    #[must_use]
    pub fn builder(log: Arc<dyn SessionLog>, settings: Arc<dyn SettingsStore>) -> ManagerBuilder {
        ManagerBuilder {
            log,
            settings,
            clock: Arc::new(SystemClock),
            dispatcher: Arc::new(InlineDispatcher),
            runtime: Handle::try_current().ok(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            pomodoro_rest: Duration::minutes(DEFAULT_POMODORO_REST_MINUTES),
            seed: None,
        }
    }

    // === Configuration ===

    /// Current Time Free Focus configuration.
    #[must_use]
    pub fn policy(&self) -> PolicyConfig {
        self.inner.lock_state().policy
    }

    /// Replace the Time Free Focus bounds with uniform work and rest ranges.
    pub fn configure_tff(&self, bounds: TffBounds) {
        self.inner.replace_policy(bounds.into());
    }

    /// Switch Time Free Focus rest to a percentage of the work length.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Validation` for percentages outside 5..=20.
    pub fn configure_rest_percent(&self, percent: u32) -> Result<(), FocusError> {
        let rest = RestRule::percent(percent)?;
        let mut policy = self.policy();
        policy.rest = rest;
        self.inner.replace_policy(policy);
        Ok(())
    }

    /// Mode selected last, persisted across runs.
    #[must_use]
    pub fn last_mode(&self) -> TimerMode {
        self.inner.lock_state().user.mode()
    }

    /// Remember `mode` as the last selected one.
    pub fn set_last_mode(&self, mode: TimerMode) {
        let user = {
            let mut state = self.inner.lock_state();
            state.user = UserSettings::with_mode(mode);
            state.user
        };
        if let Err(e) = self.inner.settings.save_user(&user) {
            warn!(error = %e, "failed to save user settings");
        }
    }

    // === Lifecycle ===

    /// Begin Work for `duration`.
    ///
    /// A session already in progress is discarded without being logged.
    /// The following Rest is the configured Pomodoro rest in Pomodoro mode
    /// or drawn from the Time Free Focus policy otherwise.
    pub fn start_work(&self, duration: Duration, mode: TimerMode) {
        let policy = match mode {
            TimerMode::Pomodoro => DurationPolicy::Fixed {
                work: duration,
                rest: self.inner.pomodoro_rest,
            },
            TimerMode::TimeFreeFocus => DurationPolicy::Randomized(self.policy()),
        };
        self.inner.begin(|state, now| {
            state.machine.start_work(now, duration, mode, policy)
        });
    }

    /// Begin a Pomodoro session with fixed lengths, discarding any session
    /// in progress.
    pub fn start_pomodoro(&self, work: Duration, rest: Duration) {
        let policy = DurationPolicy::Fixed { work, rest };
        self.inner.begin(|state, now| {
            state
                .machine
                .start_work(now, work, TimerMode::Pomodoro, policy)
        });
    }

    /// Begin a Time Free Focus session with work drawn from the bounds,
    /// discarding any session in progress.
    ///
    /// Returns the drawn work length.
    pub fn start_random_tff_work(&self) -> Duration {
        let mut drawn = Duration::zero();
        self.inner.begin(|state, now| {
            let policy = DurationPolicy::Randomized(state.policy);
            drawn = policy.sample_work(&mut state.rng);
            state
                .machine
                .start_work(now, drawn, TimerMode::TimeFreeFocus, policy)
        });
        drawn
    }

    /// Begin Rest for `duration`, replacing any countdown in progress.
    pub fn start_rest(&self, duration: Duration) {
        self.inner
            .begin(|state, now| state.machine.start_rest(now, duration));
    }

    /// Record a distraction. Only accepted during Work.
    pub fn add_distraction(&self, distraction: Distraction) -> bool {
        let accepted = self.inner.lock_state().machine.add_distraction(distraction);
        if !accepted {
            debug!("distraction ignored outside work phase");
        }
        accepted
    }

    /// Stop the session in progress and seal it as manually stopped.
    ///
    /// Returns the sealed record, or `None` if nothing was running.
    pub fn stop(&self) -> Option<SessionRecord> {
        let (stopped, epoch) = {
            let mut state = self.inner.lock_state();
            let now = self.inner.clock.now();
            let stopped = state.machine.stop(now)?;
            self.inner.cancel_ticker();
            (stopped, state.machine.epoch())
        };

        self.inner.persist(&stopped.record);
        self.inner.emit(epoch, stopped.events);
        Some(stopped.record)
    }

    /// Poll the machine once.
    pub fn tick(&self) {
        self.inner.drive(None);
    }

    // === Views ===

    /// Read-only view of the session.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        self.inner.lock_state().machine.snapshot()
    }

    /// Active phase.
    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.inner.lock_state().machine.phase()
    }

    /// Distractions captured in the current session, in order.
    #[must_use]
    pub fn distractions(&self) -> Vec<Distraction> {
        self.inner.lock_state().machine.distractions().to_vec()
    }

    // === Notifications ===

    /// Register a listener for every event.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FocusEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(None, Arc::new(listener))
    }

    /// Register a listener for one kind of event.
    pub fn subscribe_to<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&FocusEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(Some(kind), Arc::new(listener))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, Shared> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_policy(&self, policy: PolicyConfig) {
        self.lock_state().policy = policy;
        debug!(?policy, "time free focus policy updated");
        if let Err(e) = self.settings.save_policy(&policy) {
            warn!(error = %e, "failed to save time free focus settings");
        }
    }

    /// Apply an explicit start and replace the drive loop.
    fn begin<F>(self: &Arc<Self>, start: F)
    where
        F: FnOnce(&mut Shared, chrono::DateTime<chrono::Utc>) -> Vec<FocusEvent>,
    {
        let (events, epoch) = {
            let mut state = self.lock_state();
            let now = self.clock.now();
            let replaced = state.machine.phase();
            if replaced.is_active() {
                warn!(
                    phase = %replaced,
                    mode = %state.machine.mode(),
                    distractions = state.machine.distractions().len(),
                    "session in progress replaced without being logged"
                );
            }
            let events = start(&mut *state, now);
            let epoch = state.machine.epoch();
            // Spawned under the state lock so concurrent starts install
            // their loops in epoch order.
            self.spawn_ticker(epoch);
            (events, epoch)
        };
        self.emit(epoch, events);
    }

    fn spawn_ticker(self: &Arc<Self>, epoch: u64) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = ticker.take() {
            previous.abort();
        }

        let Some(runtime) = &self.runtime else {
            debug!("no runtime attached; timer advances only on tick()");
            return;
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.poll_interval;
        *ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !inner.drive(Some(epoch)) {
                    break;
                }
            }
            debug!(epoch, "drive loop exited");
        }));
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Poll once. Returns whether a loop holding `epoch` should keep going.
    fn drive(self: &Arc<Self>, epoch: Option<u64>) -> bool {
        let (poll, active, current) = {
            let mut guard = self.lock_state();
            let current = guard.machine.epoch();
            if epoch.is_some_and(|e| e != current) {
                return false;
            }
            let now = self.clock.now();
            let state = &mut *guard;
            let poll = state.machine.poll(now, &mut state.rng);
            (poll, state.machine.phase().is_active(), current)
        };

        if let Some(record) = &poll.sealed {
            self.persist(record);
        }
        self.emit(current, poll.events);
        active
    }

    fn persist(&self, record: &SessionRecord) {
        info!(
            mode = %record.mode,
            work_secs = record.work_duration.num_seconds(),
            rest_secs = record.rest_duration.num_seconds(),
            stopped_manually = record.stopped_manually,
            distractions = record.distractions.len(),
            "session sealed"
        );
        if let Err(e) = self.log.append(record) {
            warn!(error = %e, "failed to append session to log");
        }
    }

    /// Dispatch `events` raised under `epoch`.
    fn emit(self: &Arc<Self>, epoch: u64, events: Vec<FocusEvent>) {
        for event in events {
            if let FocusEvent::PhaseChanged { phase, remaining } = &event {
                debug!(%phase, remaining_secs = remaining.num_seconds(), "phase changed");
            }

            let listeners = self.listeners.matching(&event);
            if listeners.is_empty() {
                continue;
            }
            let always = matches!(event, FocusEvent::SessionCompleted(_));
            let event = Arc::new(event);
            for listener in listeners {
                let event = Arc::clone(&event);
                let weak = Arc::downgrade(self);
                self.dispatcher.dispatch(Box::new(move || {
                    if !always && weak.upgrade().is_some_and(|inner| inner.is_stale(epoch)) {
                        debug!(epoch, "dropping notification from an ended countdown");
                        return;
                    }
                    listener(&event);
                }));
            }
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.lock_state().machine.epoch() != epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::focus::clock::ManualClock;
    use crate::features::focus::dispatch::ChannelDispatcher;
    use crate::storage::{MemorySessionLog, MemorySettingsStore, MockSessionLog, MockSettingsStore};
    use chrono::{TimeZone, Utc};

    struct Fixture {
        manager: FocusSessionManager,
        clock: Arc<ManualClock>,
        log: Arc<MemorySessionLog>,
        settings: Arc<MemorySettingsStore>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let log = Arc::new(MemorySessionLog::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let manager = FocusSessionManager::builder(log.clone(), settings.clone())
            .clock(clock.clone())
            .runtime(None)
            .rng_seed(42)
            .build();
        Fixture {
            manager,
            clock,
            log,
            settings,
        }
    }

    fn recorder(manager: &FocusSessionManager) -> Arc<Mutex<Vec<FocusEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    #[test]
    fn test_tff_scenario_bounds() {
        let f = fixture();
        f.manager.configure_tff(TffBounds::new(20, 45, 8, 10).unwrap());

        let work = f.manager.start_random_tff_work();
        assert!(work >= Duration::minutes(20) && work <= Duration::minutes(45));
        assert_eq!(f.manager.phase(), TimerPhase::Work);

        f.clock.advance(work);
        f.manager.tick();

        let snapshot = f.manager.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Rest);
        assert!(snapshot.remaining >= Duration::minutes(8));
        assert!(snapshot.remaining <= Duration::minutes(10));
        assert_eq!(snapshot.mode, TimerMode::TimeFreeFocus);
    }

    #[test]
    fn test_pomodoro_manual_stop_scenario() {
        let f = fixture();
        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        f.clock.advance(Duration::minutes(10));
        f.manager.tick();

        let record = f.manager.stop().unwrap();

        assert_eq!(record.work_duration, Duration::minutes(25));
        assert_eq!(record.rest_duration, Duration::zero());
        assert!(record.stopped_manually);
        assert_eq!(f.log.load(), vec![record]);
        assert_eq!(f.manager.phase(), TimerPhase::Idle);
    }

    #[test]
    fn test_natural_completion_logs_once() {
        let f = fixture();
        let seen = recorder(&f.manager);
        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));

        f.clock.advance(Duration::minutes(25));
        f.manager.tick();
        f.clock.advance(Duration::minutes(5));
        f.manager.tick();
        f.manager.tick();

        assert_eq!(f.log.len(), 1);
        assert!(!f.log.load()[0].stopped_manually);
        assert!(f.manager.stop().is_none());
        assert_eq!(f.log.len(), 1);

        let completions = seen
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == EventKind::SessionCompleted)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_phase_change_notifications_in_order() {
        let f = fixture();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();
        f.manager.subscribe_to(EventKind::PhaseChanged, move |event| {
            if let FocusEvent::PhaseChanged { phase, .. } = event {
                sink.lock().unwrap().push(*phase);
            }
        });

        f.manager
            .start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        f.clock.advance(Duration::minutes(1));
        f.manager.tick();
        f.clock.advance(Duration::minutes(1));
        f.manager.tick();

        assert_eq!(
            *phases.lock().unwrap(),
            vec![TimerPhase::Work, TimerPhase::Rest, TimerPhase::Idle]
        );
    }

    #[test]
    fn test_ticks_carry_non_increasing_remaining() {
        let f = fixture();
        let remaining = Arc::new(Mutex::new(Vec::new()));
        let sink = remaining.clone();
        f.manager.subscribe_to(EventKind::Tick, move |event| {
            if let FocusEvent::Tick { remaining, .. } = event {
                sink.lock().unwrap().push(*remaining);
            }
        });

        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        for _ in 0..5 {
            f.clock.advance(Duration::seconds(90));
            f.manager.tick();
        }

        let remaining = remaining.lock().unwrap();
        assert_eq!(remaining.len(), 5);
        assert!(remaining.windows(2).all(|w| w[0] >= w[1]));
        assert!(remaining.iter().all(|r| *r >= Duration::zero()));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(0usize));
        let sink = seen.clone();
        let id = f.manager.subscribe(move |_| *sink.lock().unwrap() += 1);

        f.manager
            .start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        let after_start = *seen.lock().unwrap();
        assert!(after_start > 0);

        assert!(f.manager.unsubscribe(id));
        assert!(!f.manager.unsubscribe(id));
        f.manager.tick();
        assert_eq!(*seen.lock().unwrap(), after_start);
    }

    #[test]
    fn test_distractions_snapshot() {
        let f = fixture();
        assert!(!f.manager.add_distraction(Distraction::new("a", "b", "c", "d")));

        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        assert!(f.manager.add_distraction(Distraction::new("writing", "phone", "guilty", "silence it")));
        assert!(f.manager.add_distraction(Distraction::new("writing", "chat", "tempted", "later")));

        let list = f.manager.distractions();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].cause, "phone");

        let record = f.manager.stop().unwrap();
        assert_eq!(record.distractions, list);

        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        assert!(f.manager.distractions().is_empty());
    }

    #[test]
    fn test_start_work_uses_mode_policy() {
        let f = fixture();
        f.manager.start_work(Duration::minutes(10), TimerMode::Pomodoro);
        f.clock.advance(Duration::minutes(10));
        f.manager.tick();
        assert_eq!(f.manager.snapshot().remaining, Duration::minutes(5));

        f.manager.configure_rest_percent(20).unwrap();
        f.manager.start_work(Duration::minutes(30), TimerMode::TimeFreeFocus);
        f.clock.advance(Duration::minutes(30));
        f.manager.tick();
        assert_eq!(f.manager.snapshot().remaining, Duration::minutes(6));
    }

    #[test]
    fn test_start_rest_from_idle_completes() {
        let f = fixture();
        f.manager.start_rest(Duration::minutes(2));
        assert_eq!(f.manager.phase(), TimerPhase::Rest);

        f.clock.advance(Duration::minutes(2));
        f.manager.tick();

        let records = f.log.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].work_duration, Duration::zero());
    }

    #[test]
    fn test_configuration_is_persisted() {
        let f = fixture();
        let bounds = TffBounds::new(30, 40, 5, 6).unwrap();
        f.manager.configure_tff(bounds);
        assert_eq!(f.settings.load_policy(), PolicyConfig::from(bounds));

        assert!(f.manager.configure_rest_percent(50).unwrap_err().is_validation());
        assert_eq!(f.manager.policy(), PolicyConfig::from(bounds));

        f.manager.set_last_mode(TimerMode::TimeFreeFocus);
        assert_eq!(f.settings.load_user().mode(), TimerMode::TimeFreeFocus);
        assert_eq!(f.manager.last_mode(), TimerMode::TimeFreeFocus);
    }

    #[test]
    fn test_settings_loaded_once_at_build() {
        let mut settings = MockSettingsStore::new();
        let stored: PolicyConfig = TffBounds::new(25, 25, 3, 3).unwrap().into();
        settings.expect_load_policy().times(1).return_const(stored);
        settings
            .expect_load_user()
            .times(1)
            .return_const(UserSettings::with_mode(TimerMode::TimeFreeFocus));

        let manager = FocusSessionManager::builder(Arc::new(MemorySessionLog::new()), Arc::new(settings))
            .runtime(None)
            .build();

        assert_eq!(manager.policy(), stored);
        assert_eq!(manager.policy(), stored);
        assert_eq!(manager.last_mode(), TimerMode::TimeFreeFocus);
    }

    #[test]
    fn test_failing_log_does_not_block_transition() {
        let mut log = MockSessionLog::new();
        log.expect_append()
            .times(1)
            .returning(|_| Err(FocusError::Storage("disk full".to_string())));

        let mut settings = MockSettingsStore::new();
        settings.expect_load_policy().return_const(PolicyConfig::default());
        settings.expect_load_user().return_const(UserSettings::default());
        settings
            .expect_save_policy()
            .returning(|_| Err(FocusError::Storage("read-only".to_string())));

        let clock = Arc::new(ManualClock::default());
        let manager = FocusSessionManager::builder(Arc::new(log), Arc::new(settings))
            .clock(clock.clone())
            .runtime(None)
            .build();
        let seen = recorder(&manager);

        manager.configure_tff(TffBounds::new(20, 45, 2, 10).unwrap());
        manager.start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        let record = manager.stop();

        assert!(record.is_some());
        assert_eq!(manager.phase(), TimerPhase::Idle);
        assert!(matches!(
            seen.lock().unwrap().last(),
            Some(FocusEvent::SessionCompleted(_))
        ));
    }

    #[test]
    fn test_stop_racing_expiry_seals_once() {
        let f = fixture();
        f.manager
            .start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        f.clock.advance(Duration::minutes(1));
        f.manager.tick();
        assert_eq!(f.manager.phase(), TimerPhase::Rest);
        f.clock.advance(Duration::minutes(1));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let manager = f.manager.clone();
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        manager.tick();
                        None
                    } else {
                        manager.stop()
                    }
                })
            })
            .collect();
        let stopped = workers
            .into_iter()
            .filter_map(|w| w.join().unwrap())
            .count();

        assert!(stopped <= 1);
        assert_eq!(f.log.len(), 1);
    }

    #[test]
    fn test_channel_dispatcher_marshals_to_owner() {
        let (dispatcher, queue) = ChannelDispatcher::for_current_thread();
        let clock = Arc::new(ManualClock::default());
        let manager = FocusSessionManager::builder(
            Arc::new(MemorySessionLog::new()),
            Arc::new(MemorySettingsStore::new()),
        )
        .clock(clock.clone())
        .dispatcher(Arc::new(dispatcher))
        .runtime(None)
        .build();

        let owner = std::thread::current().id();
        let threads = Arc::new(Mutex::new(Vec::new()));
        let sink = threads.clone();
        manager.subscribe(move |_| sink.lock().unwrap().push(std::thread::current().id()));

        manager.start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        let remote = manager.clone();
        std::thread::spawn(move || remote.tick()).join().unwrap();

        assert_eq!(queue.run_pending(), 1);
        let threads = threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id == owner));
    }

    #[test]
    fn test_queued_notifications_from_before_stop_are_dropped() {
        let (dispatcher, queue) = ChannelDispatcher::for_current_thread();
        let clock = Arc::new(ManualClock::default());
        let manager = FocusSessionManager::builder(
            Arc::new(MemorySessionLog::new()),
            Arc::new(MemorySettingsStore::new()),
        )
        .clock(clock.clone())
        .dispatcher(Arc::new(dispatcher))
        .runtime(None)
        .build();
        let seen = recorder(&manager);

        manager.start_pomodoro(Duration::minutes(1), Duration::minutes(1));
        clock.advance(Duration::minutes(1));
        let remote = manager.clone();
        std::thread::spawn(move || remote.tick()).join().unwrap();
        assert_eq!(manager.phase(), TimerPhase::Rest);

        let record = manager.stop().unwrap();
        // Tick and PhaseChanged(Rest) queued by the remote poll
        assert_eq!(queue.run_pending(), 2);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3, "{seen:?}");
        assert!(matches!(
            seen[0],
            FocusEvent::PhaseChanged { phase: TimerPhase::Work, .. }
        ));
        assert!(matches!(
            seen[1],
            FocusEvent::PhaseChanged { phase: TimerPhase::Idle, .. }
        ));
        assert_eq!(seen[2], FocusEvent::SessionCompleted(record));
    }

    #[test]
    fn test_completion_is_delivered_after_a_restart() {
        let (dispatcher, queue) = ChannelDispatcher::for_current_thread();
        let clock = Arc::new(ManualClock::default());
        let manager = FocusSessionManager::builder(
            Arc::new(MemorySessionLog::new()),
            Arc::new(MemorySettingsStore::new()),
        )
        .clock(clock.clone())
        .dispatcher(Arc::new(dispatcher))
        .runtime(None)
        .build();
        let completed = Arc::new(Mutex::new(Vec::new()));
        let sink = completed.clone();
        manager.subscribe_to(EventKind::SessionCompleted, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        manager.start_rest(Duration::minutes(1));
        clock.advance(Duration::minutes(1));
        let remote = manager.clone();
        std::thread::spawn(move || remote.tick()).join().unwrap();
        manager.start_pomodoro(Duration::minutes(25), Duration::minutes(5));

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(completed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_restart_discards_session_in_progress() {
        let f = fixture();
        f.manager
            .start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        f.manager.add_distraction(Distraction::new("coding", "chat", "", ""));
        f.clock.advance(Duration::minutes(10));

        f.manager.start_work(Duration::minutes(30), TimerMode::Pomodoro);

        assert!(f.log.is_empty());
        let snapshot = f.manager.snapshot();
        assert_eq!(snapshot.remaining, Duration::minutes(30));
        assert!(snapshot.distractions.is_empty());

        f.clock.advance(Duration::minutes(30));
        f.manager.tick();
        f.clock.advance(Duration::minutes(5));
        f.manager.tick();
        let records = f.log.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].work_duration, Duration::minutes(30));
        assert_eq!(
            records[0].start_time,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 10, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_drive_loop_runs_session_to_completion() {
        let log = Arc::new(MemorySessionLog::new());
        let manager = FocusSessionManager::builder(log.clone(), Arc::new(MemorySettingsStore::new()))
            .poll_interval(std::time::Duration::from_millis(5))
            .build();

        manager.start_pomodoro(Duration::milliseconds(30), Duration::milliseconds(30));

        for _ in 0..200 {
            if manager.phase() == TimerPhase::Idle {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(manager.phase(), TimerPhase::Idle);
        assert_eq!(log.len(), 1);
        assert!(!log.load()[0].stopped_manually);
    }

    #[tokio::test]
    async fn test_restart_replaces_drive_loop() {
        let log = Arc::new(MemorySessionLog::new());
        let manager = FocusSessionManager::builder(log.clone(), Arc::new(MemorySettingsStore::new()))
            .poll_interval(std::time::Duration::from_millis(5))
            .build();

        manager.start_pomodoro(Duration::milliseconds(20), Duration::milliseconds(20));
        manager.start_pomodoro(Duration::minutes(25), Duration::minutes(5));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(manager.phase(), TimerPhase::Work);
        assert!(log.is_empty());

        assert!(manager.stop().is_some());
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(log.len(), 1);
    }
}
