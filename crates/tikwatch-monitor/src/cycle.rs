//! One watch cycle: resolve, diff, report.

use std::collections::HashMap;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use tikwatch_core::WatchUser;
use tikwatch_profile::{Count, LookupError, ProfileClient, ProfileRecord};

use crate::state::{WatchEntry, WatchState};

/// Follower count moving from `old` to `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerDelta {
    pub old: Count,
    pub new: Count,
}

/// Drift detected for one watched username. At least one of `followers` /
/// `bio_changed` is set; equal values never produce an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub username: String,
    pub followers: Option<FollowerDelta>,
    pub bio_changed: bool,
}

/// Everything one cycle produced: events in watch-list order, the state to
/// persist, and the usernames whose lookups failed this round.
#[derive(Debug)]
pub struct CycleOutcome {
    pub events: Vec<ChangeEvent>,
    pub state: WatchState,
    pub failed: Vec<String>,
}

/// Run one watch cycle over `watch_list`.
///
/// Lookups are issued concurrently (at most `max_concurrent` in flight), then
/// folded in watch-list order so event ordering and the state merge are
/// deterministic — each username only ever writes its own key.
///
/// Failure isolation: a [`LookupError`] for one username is logged and skips
/// only that username. Its prior entry, when present, is carried into the new
/// state unchanged, so a transient failure can never mask a real change on
/// the next successful cycle, and recovery never fires a spurious baseline.
///
/// A username with no prior entry establishes its baseline silently: the
/// observed values are recorded and no event is emitted.
pub async fn run_cycle(
    client: &ProfileClient,
    watch_list: &[WatchUser],
    prior: &WatchState,
    max_concurrent: usize,
) -> CycleOutcome {
    let max_concurrent = max_concurrent.max(1);

    let usernames: Vec<String> = watch_list.iter().map(|u| u.username.clone()).collect();
    let mut resolved: HashMap<String, Result<ProfileRecord, LookupError>> =
        stream::iter(usernames)
            .map(|username| async move {
                let record = client.lookup(&username).await;
                (username, record)
            })
            .buffer_unordered(max_concurrent)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

    let mut events = Vec::new();
    let mut state = WatchState::new();
    let mut failed = Vec::new();

    for user in watch_list {
        match resolved.remove(&user.username) {
            Some(Ok(record)) => {
                if let Some(event) = diff(&user.username, prior.get(&user.username), &record) {
                    events.push(event);
                }
                state.insert(
                    user.username.clone(),
                    WatchEntry {
                        followers_count: record.follower_count,
                        bio: record.bio,
                        checked_at: Utc::now(),
                    },
                );
            }
            Some(Err(err)) => {
                tracing::warn!(
                    username = %user.username,
                    error = %err,
                    "watch cycle: lookup failed, retaining previous state"
                );
                if let Some(previous) = prior.get(&user.username) {
                    state.insert(user.username.clone(), previous.clone());
                }
                failed.push(user.username.clone());
            }
            // Duplicates are rejected at watch-list load; nothing to do here.
            None => {}
        }
    }

    CycleOutcome {
        events,
        state,
        failed,
    }
}

/// Compare a fresh record against the prior entry. `None` prior means this is
/// the baseline cycle for the username — record, don't report.
fn diff(username: &str, prior: Option<&WatchEntry>, record: &ProfileRecord) -> Option<ChangeEvent> {
    let prior = prior?;

    let followers = (prior.followers_count != record.follower_count).then(|| FollowerDelta {
        old: prior.followers_count.clone(),
        new: record.follower_count.clone(),
    });
    let bio_changed = prior.bio != record.bio;

    if followers.is_none() && !bio_changed {
        return None;
    }

    Some(ChangeEvent {
        username: username.to_string(),
        followers,
        bio_changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(followers: Count, bio: &str) -> ProfileRecord {
        ProfileRecord {
            username: "someone".to_string(),
            nickname: "N/A".to_string(),
            region: "N/A".to_string(),
            follower_count: followers,
            following_count: Count::Exact(0),
            bio: bio.to_string(),
            is_private: false,
            avatar_url: None,
        }
    }

    fn entry(followers: Count, bio: &str) -> WatchEntry {
        WatchEntry {
            followers_count: followers,
            bio: bio.to_string(),
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn diff_without_prior_is_baseline() {
        assert_eq!(diff("a", None, &record(Count::Exact(100), "hi")), None);
    }

    #[test]
    fn diff_equal_values_emits_nothing() {
        let prior = entry(Count::Exact(100), "hi");
        assert_eq!(
            diff("a", Some(&prior), &record(Count::Exact(100), "hi")),
            None
        );
    }

    #[test]
    fn diff_follower_change_carries_old_and_new() {
        let prior = entry(Count::Exact(100), "hi");
        let event = diff("a", Some(&prior), &record(Count::Exact(150), "hi"))
            .expect("follower drift should emit");
        assert_eq!(
            event.followers,
            Some(FollowerDelta {
                old: Count::Exact(100),
                new: Count::Exact(150),
            })
        );
        assert!(!event.bio_changed);
    }

    #[test]
    fn diff_bio_change_alone_emits() {
        let prior = entry(Count::Exact(100), "old bio");
        let event = diff("a", Some(&prior), &record(Count::Exact(100), "new bio"))
            .expect("bio drift should emit");
        assert!(event.followers.is_none());
        assert!(event.bio_changed);
    }

    #[test]
    fn diff_raw_to_exact_recovery_counts_as_drift() {
        let prior = entry(Count::Raw("N/A".to_string()), "hi");
        let event = diff("a", Some(&prior), &record(Count::Exact(5), "hi"))
            .expect("representation change should emit");
        assert_eq!(
            event.followers,
            Some(FollowerDelta {
                old: Count::Raw("N/A".to_string()),
                new: Count::Exact(5),
            })
        );
    }
}
