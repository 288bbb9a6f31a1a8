//! Device status stream feeding the watchdog timer.
//!
//! Socket traffic runs on the real clock; the clock is paused only while
//! checking timer deadlines, since a paused runtime idling on IO jumps
//! straight to the next timer.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::time::{self, sleep};
use tokio_tungstenite::tungstenite::Message;

use switch_watchdog::events::{EventSubscriber, StatusEventFilter};
use switch_watchdog::health::Watchdog;
use switch_watchdog::lifecycle::Shutdown;
use switch_watchdog::switch::ModeReconciler;

mod common;
use common::{probe_config, start_mock_event_device, FakeSwitches, ScriptedProbe};

const SRC: &str = "switch-watchdog-test";

fn notify_status(switch0: Value) -> Message {
    let frame = json!({
        "src": "shellyplus2pm-a8032ab12345",
        "dst": SRC,
        "method": "NotifyStatus",
        "params": { "ts": 1700000000.25, "switch:0": switch0 }
    });
    Message::text(frame.to_string())
}

#[tokio::test]
async fn test_local_toggle_over_websocket_replaces_timer() {
    let mut device = start_mock_event_device().await;
    let probe = ScriptedProbe::default();
    let switches = FakeSwitches::with_modes(&[(0, "detached"), (1, "detached")]);
    let (watchdog, rearm) = Watchdog::new(
        &probe_config(&["http://hub/"], 3),
        probe.clone(),
        ModeReconciler::new(switches),
    )
    .unwrap();
    let subscriber =
        EventSubscriber::new(&device.address(), SRC, StatusEventFilter::new(rearm)).unwrap();

    let shutdown = Shutdown::new();
    let watchdog_task = tokio::spawn(watchdog.run(shutdown.subscribe()));
    let subscriber_task = tokio::spawn(subscriber.run(shutdown.subscribe()));

    let hello = device.next_hello().await;
    assert_eq!(hello["method"], "Shelly.GetStatus");
    assert_eq!(hello["src"], SRC);

    // 6s into the first 10s interval.
    time::pause();
    time::advance(Duration::from_secs(6)).await;
    time::resume();

    device
        .push
        .send(notify_status(json!({ "id": 0, "source": "button", "output": true })))
        .unwrap();
    device
        .push
        .send(notify_status(json!({ "id": 0, "source": "timer", "output": true })))
        .unwrap();
    device.push.send(Message::Close(None)).unwrap();

    // Frames are handled in order, so a reconnect means the toggle was seen.
    let hello = device.next_hello().await;
    assert_eq!(hello["src"], SRC);

    time::pause();

    // Past the first deadline (t=10), short of the replaced one (toggle + 10s).
    sleep(Duration::from_secs(4)).await;
    assert!(probe.calls().is_empty());

    sleep(Duration::from_secs(6)).await;
    assert_eq!(probe.calls().len(), 1);

    shutdown.trigger();
    watchdog_task.await.unwrap();
    subscriber_task.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_reconnecting_subscriber() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let switches = FakeSwitches::with_modes(&[]);
    let (_watchdog, rearm) = Watchdog::new(
        &probe_config(&["http://hub/"], 3),
        ScriptedProbe::default(),
        ModeReconciler::new(switches),
    )
    .unwrap();
    let subscriber = EventSubscriber::new(
        &format!("http://{}", addr),
        SRC,
        StatusEventFilter::new(rearm),
    )
    .unwrap();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(subscriber.run(shutdown.subscribe()));

    // First connect is refused; the subscriber is now waiting to retry.
    sleep(Duration::from_millis(200)).await;
    assert!(!task.is_finished());

    shutdown.trigger();
    time::timeout(Duration::from_secs(5), task)
        .await
        .expect("subscriber kept running after shutdown")
        .unwrap();
}
