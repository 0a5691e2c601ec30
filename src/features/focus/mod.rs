//! Focus sessions: Pomodoro and Time Free Focus.
//!
//! Provides the session timing and state-transition engine:
//! - Idle → Work → Rest → Idle lifecycle with a single drive loop
//! - Fixed and randomized duration policies
//! - Distraction capture during Work
//! - Lifecycle notifications marshaled onto a chosen thread
//! - Session history summaries

pub mod clock;
pub mod dispatch;
pub mod events;
pub mod machine;
pub mod manager;
pub mod policy;
pub mod report;
pub mod session;
pub mod timer;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{ChannelDispatcher, DispatchQueue, Dispatcher, InlineDispatcher};
pub use events::{EventKind, FocusEvent, Listener, SubscriptionId};
pub use machine::{SessionMachine, TimerSnapshot};
pub use manager::{FocusSessionManager, ManagerBuilder};
pub use policy::{DurationPolicy, MinuteRange, PolicyConfig, RestRule, TffBounds};
pub use report::{recent_sessions, ReportPeriod, SessionSummary};
pub use session::{Distraction, SessionRecord, TimerMode};
pub use timer::{format_duration, format_duration_mmss, TimerPhase};
