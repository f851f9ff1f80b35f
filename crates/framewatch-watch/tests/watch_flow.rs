//! End-to-end watch flow tests.
//!
//! These tests drive a real [`RenderWatcher`] against a temp directory and
//! a mock webhook endpoint, covering:
//! - The full card lifecycle: one create, throttled edits, final edit,
//!   all against a single stable message id
//! - Write-stability gating on the final frame
//! - Idle cancellation with the canceled card and alert
//! - Completion despite a dead webhook endpoint
//!
//! Instants are synthetic (base + offset) so no test sleeps through the
//! intervals it exercises; only the files on disk are real.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use framewatch_core::Config;
use framewatch_notify::MockNotifier;
use framewatch_watch::{
    ArmRequest, RenderWatcher, TickOutcome, WatchMode, WatchOutcome, WatchState,
};

// ============================================================
// Full lifecycle with Discord reporting
// ============================================================

#[tokio::test]
async fn test_card_lifecycle_uses_one_stable_message() {
    let server = MockServer::start().await;

    // Exactly one card create, carrying the start stage.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("wait", "true"))
        .and(body_string_contains("Render starting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "555"})))
        .expect(1)
        .mount(&server)
        .await;

    // One throttled progress edit plus the final edit, both to the same id.
    Mock::given(method("PATCH"))
        .and(path("/messages/555"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    // One plain-text completion alert.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("✅ Render complete"))
        .and(body_string_contains("3/3 (100.0%)"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut watcher, mock) = discord_watcher(&server);
    let base = Instant::now();
    arm_past(&mut watcher, animation_request(&dir, 1, 3), base);

    // Nothing rendered yet: no traffic, keep waiting.
    assert_eq!(
        watcher.tick(base).await,
        TickOutcome::Reschedule(Duration::from_secs(1))
    );
    assert_eq!(watcher.state(), WatchState::Waiting);

    // First frame lands: the start card is created, and the create also
    // stamps the throttle clock so no progress edit follows this tick.
    fs::write(dir.path().join("frame_0001.png"), b"pixels").unwrap();
    watcher.tick(base + secs(1)).await;
    assert_eq!(watcher.state(), WatchState::InProgress);

    // Second frame at +3s: inside the 5s update interval, so no edit yet.
    fs::write(dir.path().join("frame_0002.png"), b"pixels").unwrap();
    watcher.tick(base + secs(3)).await;

    // +7s: the update interval has passed, one progress edit goes out.
    watcher.tick(base + secs(7)).await;

    // Final frame: present but its write-stability clock starts now.
    fs::write(dir.path().join("frame_0003.png"), b"all pixels").unwrap();
    assert_eq!(
        watcher.tick(base + secs(8)).await,
        TickOutcome::Reschedule(Duration::from_secs(1))
    );

    // Size has held still past the stable delay: done.
    assert_eq!(watcher.tick(base + secs(10)).await, TickOutcome::Stop);
    assert_eq!(watcher.outcome(), Some(WatchOutcome::Completed));
    assert_eq!(mock.sound_count(), 1);
    assert_eq!(mock.toast_messages(), vec!["Render complete".to_string()]);
}

// ============================================================
// Stability gating on the final frame
// ============================================================

#[tokio::test]
async fn test_growing_final_frame_defers_completion() {
    let dir = TempDir::new().unwrap();
    let (mut watcher, mock) = local_watcher(Config::default().disable_discord());
    let base = Instant::now();
    arm_past(&mut watcher, animation_request(&dir, 1, 2), base);

    fs::write(dir.path().join("frame_0001.png"), b"pixels").unwrap();
    fs::write(dir.path().join("frame_0002.png"), b"partial").unwrap();

    // All frames exist, but the last one has only just been sampled.
    watcher.tick(base).await;
    assert!(watcher.is_armed());

    // The renderer is still writing: growth restarts the quiet period,
    // even though more than stable_delay has passed since arming.
    fs::write(dir.path().join("frame_0002.png"), b"partial but longer").unwrap();
    watcher.tick(base + secs(2)).await;
    assert!(watcher.is_armed(), "growing file must hold off completion");

    // Still inside the fresh quiet period.
    watcher.tick(base + secs(3)).await;
    assert!(watcher.is_armed());

    // Quiet long enough: now it completes.
    assert_eq!(watcher.tick(base + secs(4)).await, TickOutcome::Stop);
    assert_eq!(watcher.outcome(), Some(WatchOutcome::Completed));
    assert_eq!(mock.toast_messages(), vec!["Render complete".to_string()]);
}

// ============================================================
// Idle cancellation
// ============================================================

#[tokio::test]
async fn test_stalled_render_cancels_card_and_alerts_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("wait", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "900"})))
        .expect(1)
        .mount(&server)
        .await;

    // The only edit is the canceled card; cancellation runs before any
    // progress edit could go out on the same tick.
    Mock::given(method("PATCH"))
        .and(path("/messages/900"))
        .and(body_string_contains("Render canceled"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("⛔ Render canceled"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = Config::default()
        .with_webhook_url(server.uri())
        .with_idle(5.0, 2.0);
    let mock = Arc::new(MockNotifier::new());
    let mut watcher = RenderWatcher::new(config, mock.clone()).unwrap();
    let base = Instant::now();
    arm_past(&mut watcher, animation_request(&dir, 1, 4), base);

    fs::write(dir.path().join("frame_0001.png"), b"pixels").unwrap();
    fs::write(dir.path().join("frame_0002.png"), b"pixels").unwrap();
    watcher.tick(base).await;
    assert_eq!(watcher.state(), WatchState::InProgress);

    // Halfway to the idle floor: still just watching.
    assert_eq!(
        watcher.tick(base + secs(3)).await,
        TickOutcome::Reschedule(Duration::from_secs(1))
    );

    // Past the floor with frames 3 and 4 never arriving.
    assert_eq!(watcher.tick(base + secs(5)).await, TickOutcome::Stop);
    assert_eq!(watcher.outcome(), Some(WatchOutcome::Canceled));
    assert_eq!(watcher.state(), WatchState::Canceled);
    assert_eq!(mock.sound_count(), 1);
    assert_eq!(mock.toast_messages(), vec!["Render canceled".to_string()]);

    // Terminal is terminal: extra ticks produce no further traffic, which
    // the exact expectations above verify when the server shuts down.
    assert_eq!(watcher.tick(base + secs(6)).await, TickOutcome::Stop);
    assert_eq!(watcher.tick(base + secs(60)).await, TickOutcome::Stop);
    assert_eq!(mock.sound_count(), 1);
}

// ============================================================
// Webhook failures never block the watch
// ============================================================

#[tokio::test]
async fn test_dead_webhook_does_not_stop_completion() {
    let server = MockServer::start().await;

    // Every request fails; the watch must not care.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut watcher, mock) = discord_watcher(&server);
    let base = Instant::now();
    arm_past(&mut watcher, animation_request(&dir, 1, 1), base);

    fs::write(dir.path().join("frame_0001.png"), b"pixels").unwrap();
    watcher.tick(base).await;
    assert!(watcher.is_armed());

    assert_eq!(watcher.tick(base + secs(2)).await, TickOutcome::Stop);
    assert_eq!(watcher.outcome(), Some(WatchOutcome::Completed));
    assert_eq!(mock.sound_count(), 1, "local sinks still fire");
}

// ============================================================
// Helpers
// ============================================================

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn animation_request(dir: &TempDir, first: i64, last: i64) -> ArmRequest {
    ArmRequest {
        template: dir.path().join("frame_####.png"),
        mode: WatchMode::Animation { first, last },
        label: None,
    }
}

fn local_watcher(config: Config) -> (RenderWatcher, Arc<MockNotifier>) {
    let mock = Arc::new(MockNotifier::new());
    let watcher = RenderWatcher::new(config, mock.clone()).unwrap();
    (watcher, mock)
}

fn discord_watcher(server: &MockServer) -> (RenderWatcher, Arc<MockNotifier>) {
    local_watcher(Config::default().with_webhook_url(server.uri()))
}

/// Arm with the stale-file cutoff in the past so files written by the test
/// always count as fresh.
fn arm_past(watcher: &mut RenderWatcher, request: ArmRequest, base: Instant) {
    watcher
        .arm_at(request, SystemTime::now() - secs(60), base)
        .unwrap();
}
