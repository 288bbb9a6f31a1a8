//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use switch_watchdog::config::{ProbeConfig, ProbeVia};
use switch_watchdog::health::{ProbeOutcome, ProbeTransport};
use switch_watchdog::switch::{InputMode, SetConfigResult, SwitchConfig, SwitchControl, SwitchError};

pub fn probe_config(endpoints: &[&str], failure_threshold: u32) -> ProbeConfig {
    ProbeConfig {
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
        failure_threshold,
        timeout_secs: 1,
        interval_secs: 10,
        via: ProbeVia::Local,
    }
}

#[derive(Default)]
struct Script {
    outcomes: VecDeque<ProbeOutcome>,
    calls: Vec<String>,
}

/// Probe transport returning queued outcomes, then `Success` once the queue is empty.
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProbe {
    pub fn with_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let probe = Self::default();
        probe.push(outcomes);
        probe
    }

    pub fn push(&self, outcomes: &[ProbeOutcome]) {
        self.script.lock().unwrap().outcomes.extend(outcomes.iter().copied());
    }

    /// Endpoints probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }
}

impl ProbeTransport for ScriptedProbe {
    async fn http_get(&self, url: &str, _timeout: Duration) -> ProbeOutcome {
        let mut script = self.script.lock().unwrap();
        script.calls.push(url.to_string());
        script.outcomes.pop_front().unwrap_or(ProbeOutcome::Success)
    }
}

/// In-memory switch channels recording every read and write.
#[derive(Default)]
pub struct FakeSwitches {
    modes: Mutex<HashMap<u8, InputMode>>,
    writes: Mutex<Vec<(u8, InputMode)>>,
    reads: AtomicUsize,
}

impl FakeSwitches {
    pub fn with_modes(modes: &[(u8, &str)]) -> Arc<Self> {
        let fake = Self::default();
        {
            let mut map = fake.modes.lock().unwrap();
            for (channel, mode) in modes {
                map.insert(*channel, InputMode::from(*mode));
            }
        }
        Arc::new(fake)
    }

    pub fn mode(&self, channel: u8) -> InputMode {
        self.modes.lock().unwrap()[&channel].clone()
    }

    pub fn writes(&self) -> Vec<(u8, InputMode)> {
        let mut writes = self.writes.lock().unwrap().clone();
        writes.sort_by_key(|(channel, _)| *channel);
        writes
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SwitchControl for FakeSwitches {
    async fn get_config(&self, channel: u8) -> Result<SwitchConfig, SwitchError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.modes.lock().unwrap().get(&channel) {
            Some(mode) => Ok(SwitchConfig::new(channel, mode.clone())),
            None => Err(SwitchError::Read {
                channel,
                reason: "no such channel".into(),
            }),
        }
    }

    async fn set_input_mode(
        &self,
        channel: u8,
        mode: InputMode,
    ) -> Result<SetConfigResult, SwitchError> {
        self.writes.lock().unwrap().push((channel, mode.clone()));
        self.modes.lock().unwrap().insert(channel, mode);
        Ok(SetConfigResult::default())
    }
}

/// Start a mock device answering every request with `handler(body)`.
///
/// Requests without a body reach the handler as `Value::Null`.
pub async fn start_mock_device<F>(handler: F) -> SocketAddr
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_json_request(&mut socket).await else {
                            return;
                        };
                        let body = handler(request).to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_json_request(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    if content_length == 0 {
        return Some(Value::Null);
    }

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    serde_json::from_slice(&buf[body_start..body_start + content_length]).ok()
}

/// Mock device status socket.
///
/// Each accepted connection reports its first text frame on `hellos`, then
/// forwards frames queued on `push` until a `Close` frame is pushed.
pub struct MockEventDevice {
    pub addr: SocketAddr,
    pub hellos: mpsc::UnboundedReceiver<Value>,
    pub push: mpsc::UnboundedSender<Message>,
}

impl MockEventDevice {
    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn next_hello(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(5), self.hellos.recv())
            .await
            .expect("no client connected")
            .expect("mock device stopped")
    }
}

pub async fn start_mock_event_device() -> MockEventDevice {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (hello_tx, hellos) = mpsc::unbounded_channel();
    let (push, mut push_rx) = mpsc::unbounded_channel::<Message>();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let Ok(mut socket) = accept_async(stream).await else {
                continue;
            };
            let Some(Ok(Message::Text(hello))) = socket.next().await else {
                continue;
            };
            let hello = serde_json::from_str(hello.as_str()).unwrap_or(Value::Null);
            if hello_tx.send(hello).is_err() {
                return;
            }

            while let Some(frame) = push_rx.recv().await {
                let close = matches!(frame, Message::Close(_));
                if socket.send(frame).await.is_err() || close {
                    break;
                }
            }
        }
    });

    MockEventDevice { addr, hellos, push }
}
