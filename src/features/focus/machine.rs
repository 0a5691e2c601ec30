//! The Idle → Work → Rest → Idle state machine.
//!
//! `SessionMachine` is synchronous and clock-free: every operation takes
//! `now` explicitly and returns the events it produced. Remaining time is
//! always recomputed as `target_end - now`, never decremented.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::events::FocusEvent;
use super::policy::DurationPolicy;
use super::session::{Distraction, SessionRecord, TimerMode};
use super::timer::{remaining_until, TimerPhase};

/// Result of one poll of the machine.
#[derive(Debug, Default)]
pub struct Poll {
    /// Events to deliver, in order
    pub events: Vec<FocusEvent>,
    /// Session sealed by this poll (Rest expired)
    pub sealed: Option<SessionRecord>,
}

/// Result of a manual stop of an active session.
#[derive(Debug)]
pub struct Stopped {
    /// Events to deliver, in order
    pub events: Vec<FocusEvent>,
    /// The sealed session
    pub record: SessionRecord,
}

/// Read-only view of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Active phase
    pub phase: TimerPhase,
    /// Mode of the current (or last) session
    pub mode: TimerMode,
    /// Time left in the phase
    pub remaining: Duration,
    /// Full length of the phase
    pub phase_length: Duration,
    /// Distractions captured so far in this session
    pub distractions: Vec<Distraction>,
}

/// Session state machine.
#[derive(Debug)]
pub struct SessionMachine {
    phase: TimerPhase,
    mode: TimerMode,
    policy: Option<DurationPolicy>,
    target_end: Option<DateTime<Utc>>,
    remaining: Duration,
    phase_length: Duration,
    session_start: DateTime<Utc>,
    work_duration: Duration,
    rest_duration: Duration,
    distractions: Vec<Distraction>,
    epoch: u64,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    /// Create an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            mode: TimerMode::default(),
            policy: None,
            target_end: None,
            remaining: Duration::zero(),
            phase_length: Duration::zero(),
            session_start: DateTime::<Utc>::UNIX_EPOCH,
            work_duration: Duration::zero(),
            rest_duration: Duration::zero(),
            distractions: Vec::new(),
            epoch: 0,
        }
    }

    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Time left in the phase as of the last poll.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Mode of the current (or last) session.
    #[must_use]
    pub const fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Incremented every time a countdown is explicitly started or stopped.
    ///
    /// A drive loop holding a stale epoch must exit.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Distractions captured in the current session.
    #[must_use]
    pub fn distractions(&self) -> &[Distraction] {
        &self.distractions
    }

    /// Read-only view.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            mode: self.mode,
            remaining: self.remaining,
            phase_length: self.phase_length,
            distractions: self.distractions.clone(),
        }
    }

    /// Begin a Work phase, replacing any session in progress.
    ///
    /// The replaced session is dropped without a record; callers that want
    /// it logged must `stop` first. `policy` decides the Rest that follows.
    pub fn start_work(
        &mut self,
        now: DateTime<Utc>,
        duration: Duration,
        mode: TimerMode,
        policy: DurationPolicy,
    ) -> Vec<FocusEvent> {
        self.mode = mode;
        self.policy = Some(policy);
        self.session_start = now;
        self.work_duration = duration;
        self.rest_duration = Duration::zero();
        self.distractions.clear();
        self.epoch += 1;
        self.arm(TimerPhase::Work, now, duration)
    }

    /// Begin a Rest phase directly.
    ///
    /// From Idle this opens a session with zero work time.
    pub fn start_rest(&mut self, now: DateTime<Utc>, duration: Duration) -> Vec<FocusEvent> {
        if self.phase == TimerPhase::Idle {
            self.session_start = now;
            self.work_duration = Duration::zero();
            self.distractions.clear();
        }
        self.rest_duration = duration;
        self.epoch += 1;
        self.arm(TimerPhase::Rest, now, duration)
    }

    /// Record a distraction. Only accepted during Work.
    pub fn add_distraction(&mut self, distraction: Distraction) -> bool {
        if self.phase == TimerPhase::Work {
            self.distractions.push(distraction);
            true
        } else {
            false
        }
    }

    /// Recompute remaining time and fire any due transition.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Poll {
        let Some(target_end) = self.target_end else {
            return Poll::default();
        };
        if !self.phase.is_active() {
            return Poll::default();
        }

        // Never let a backwards clock step make the countdown grow.
        self.remaining = self.remaining.min(remaining_until(target_end, now));

        let mut poll = Poll {
            events: vec![FocusEvent::Tick {
                phase: self.phase,
                remaining: self.remaining,
            }],
            sealed: None,
        };

        if self.remaining > Duration::zero() {
            return poll;
        }

        match self.phase {
            TimerPhase::Work => {
                let rest = self
                    .policy
                    .map_or_else(Duration::zero, |policy| policy.rest_for(self.work_duration, rng));
                self.rest_duration = rest;
                poll.events.extend(self.arm(TimerPhase::Rest, now, rest));
            }
            TimerPhase::Rest => {
                let record = self.seal(now, false);
                poll.events.extend(self.disarm());
                poll.events.push(FocusEvent::SessionCompleted(record.clone()));
                poll.sealed = Some(record);
            }
            TimerPhase::Idle => {}
        }

        poll
    }

    /// Stop the session in progress. Returns `None` if already Idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Stopped> {
        if !self.phase.is_active() {
            return None;
        }

        self.epoch += 1;
        let record = self.seal(now, true);
        let mut events = self.disarm();
        events.push(FocusEvent::SessionCompleted(record.clone()));
        Some(Stopped { events, record })
    }

    fn arm(&mut self, phase: TimerPhase, now: DateTime<Utc>, duration: Duration) -> Vec<FocusEvent> {
        let duration = duration.max(Duration::zero());
        self.phase = phase;
        self.target_end = Some(now + duration);
        self.remaining = duration;
        self.phase_length = duration;
        vec![FocusEvent::PhaseChanged {
            phase,
            remaining: duration,
        }]
    }

    fn disarm(&mut self) -> Vec<FocusEvent> {
        self.phase = TimerPhase::Idle;
        self.target_end = None;
        self.policy = None;
        vec![FocusEvent::PhaseChanged {
            phase: TimerPhase::Idle,
            remaining: self.remaining,
        }]
    }

    fn seal(&self, now: DateTime<Utc>, stopped_manually: bool) -> SessionRecord {
        SessionRecord {
            start_time: self.session_start,
            end_time: now,
            work_duration: self.work_duration,
            rest_duration: self.rest_duration,
            stopped_manually,
            mode: self.mode,
            distractions: self.distractions.clone(),
        }
    }
}
