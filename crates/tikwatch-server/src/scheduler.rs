//! Background watch job.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring watch cycle. The handle must be kept alive for the lifetime of
//! the process — dropping it shuts down the job.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use tikwatch_core::{AppConfig, WatchUser};
use tikwatch_monitor::{load_state, run_cycle, save_state};
use tikwatch_notify::Notifier;
use tikwatch_profile::ProfileClient;

/// Everything a watch cycle needs, shared into the scheduler closure.
pub struct WatchContext {
    pub config: Arc<AppConfig>,
    pub profile: Arc<ProfileClient>,
    pub notifier: Arc<Notifier>,
    pub watch_list: Arc<Vec<WatchUser>>,
    /// Guards the state file against overlapping cycles when one run
    /// outlasts the interval. Ticks that find it held are skipped.
    gate: Mutex<()>,
}

impl WatchContext {
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        profile: Arc<ProfileClient>,
        notifier: Arc<Notifier>,
        watch_list: Arc<Vec<WatchUser>>,
    ) -> Self {
        Self {
            config,
            profile,
            notifier,
            watch_list,
            gate: Mutex::new(()),
        }
    }
}

/// Builds and starts the background job scheduler with the watch job
/// registered at the configured interval.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(ctx: Arc<WatchContext>) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let interval = Duration::from_secs(ctx.config.watch_interval_secs.max(1));
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let ctx = Arc::clone(&ctx);
        Box::pin(async move {
            run_watch_job(&ctx).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// One guarded watch run: load state, cycle, persist, notify.
///
/// Never returns an error — every failure inside a tick is logged and the
/// next tick starts from whatever state was last persisted.
pub async fn run_watch_job(ctx: &WatchContext) {
    let Ok(_guard) = ctx.gate.try_lock() else {
        tracing::warn!("watch job: previous cycle still running, skipping this tick");
        return;
    };

    if ctx.watch_list.is_empty() {
        tracing::debug!("watch job: watch-list is empty, nothing to do");
        return;
    }

    let prior = match load_state(&ctx.config.state_path) {
        Ok(state) => state,
        Err(err) => {
            // A corrupt state file must not silently become a baseline cycle;
            // the operator has to look at it.
            tracing::error!(error = %err, "watch job: cannot load state, skipping cycle");
            return;
        }
    };

    let outcome = run_cycle(
        &ctx.profile,
        &ctx.watch_list,
        &prior,
        ctx.config.max_concurrent_lookups,
    )
    .await;

    if let Err(err) = save_state(&ctx.config.state_path, &outcome.state) {
        tracing::error!(error = %err, "watch job: failed to persist state");
    }

    tracing::info!(
        watched = ctx.watch_list.len(),
        changed = outcome.events.len(),
        failed = outcome.failed.len(),
        "watch cycle complete"
    );

    let Some(chat_id) = ctx.config.notify_chat_id else {
        if !outcome.events.is_empty() {
            tracing::warn!(
                events = outcome.events.len(),
                "watch job: drift detected but TIKWATCH_NOTIFY_CHAT_ID is unset"
            );
        }
        return;
    };

    for event in &outcome.events {
        if let Err(err) = ctx.notifier.deliver_event(chat_id, event).await {
            tracing::error!(
                username = %event.username,
                error = %err,
                "watch job: failed to deliver change notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_context(
        profile_base: &str,
        telegram_base: &str,
        state_path: std::path::PathBuf,
        watch: &[&str],
    ) -> WatchContext {
        let config = AppConfig {
            env: tikwatch_core::Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            api_base_url: profile_base.to_string(),
            api_key: "test-key".to_string(),
            telegram_bot_token: Some("123:abc".to_string()),
            notify_chat_id: Some(-100),
            watchlist_path: "./config/watchlist.yaml".into(),
            state_path,
            request_timeout_secs: 5,
            user_agent: "tikwatch-test".to_string(),
            watch_interval_secs: 300,
            max_concurrent_lookups: 4,
        };
        let profile = ProfileClient::with_base_url("test-key", 5, profile_base, "tikwatch-test")
            .expect("profile client");
        let notifier = Notifier::with_base_url("123:abc", 5, telegram_base).expect("notifier");
        let watch_list: Vec<WatchUser> = watch
            .iter()
            .map(|u| WatchUser {
                username: (*u).to_string(),
                label: None,
            })
            .collect();
        WatchContext::new(
            Arc::new(config),
            Arc::new(profile),
            Arc::new(notifier),
            Arc::new(watch_list),
        )
    }

    async fn mount_profile(server: &MockServer, username: &str, followers: i64) {
        Mock::given(method("GET"))
            .and(query_param("user", username))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "username": username,
                "followers_count": followers,
                "bio": "steady"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn baseline_then_drift_persists_state_and_notifies_once() {
        let upstream = MockServer::start().await;
        let telegram = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let state_path = dir.path().join("watch_state.json");

        let ctx = test_context(&upstream.uri(), &telegram.uri(), state_path.clone(), &["a"]);

        // Cycle 1: baseline. State is written, nothing is sent.
        mount_profile(&upstream, "a", 100).await;
        run_watch_job(&ctx).await;
        assert!(state_path.exists(), "baseline cycle must persist state");
        assert_eq!(telegram.received_requests().await.unwrap().len(), 0);

        // Cycle 2: follower count moved; exactly one alert goes out.
        upstream.reset().await;
        mount_profile(&upstream, "a", 150).await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({"chat_id": -100})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&telegram)
            .await;

        run_watch_job(&ctx).await;

        // Cycle 3: no further change, no further alert (the .expect(1) above
        // is verified on telegram's drop).
        upstream.reset().await;
        mount_profile(&upstream, "a", 150).await;
        run_watch_job(&ctx).await;
    }

    #[tokio::test]
    async fn failed_lookup_keeps_state_for_next_tick() {
        let upstream = MockServer::start().await;
        let telegram = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let state_path = dir.path().join("watch_state.json");

        let ctx = test_context(&upstream.uri(), &telegram.uri(), state_path.clone(), &["a"]);

        mount_profile(&upstream, "a", 100).await;
        run_watch_job(&ctx).await;

        // Upstream falls over; the persisted entry must survive untouched.
        upstream.reset().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;
        run_watch_job(&ctx).await;

        let state = load_state(&state_path).expect("state should load");
        assert_eq!(
            state["a"].followers_count,
            tikwatch_profile::Count::Exact(100)
        );
        assert_eq!(telegram.received_requests().await.unwrap().len(), 0);
    }
}
