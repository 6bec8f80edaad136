//! Periodic drift detection for a fixed watch-list.
//!
//! A watch cycle resolves every watched username, diffs follower count and
//! bio against the state persisted from the previous cycle, and reports the
//! changes. Persistence is injected in and handed back out — the cycle holds
//! no state of its own, so the loop restarts trivially after a crash.

mod cycle;
mod state;

pub use cycle::{run_cycle, ChangeEvent, CycleOutcome, FollowerDelta};
pub use state::{load_state, save_state, StateError, WatchEntry, WatchState};
