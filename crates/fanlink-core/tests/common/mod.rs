// Shared test doubles for the core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{Notify, mpsc};

use fanlink_core::{
    BridgeConfig, Console, DatagramSource, Feedback, Key, Screen, TelemetryLine,
};

/// Everything a [`RecordingScreen`] was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    DeviceFound(SocketAddr),
    Telemetry(String),
    Replay(String),
    Feedback(Feedback),
    Notice(String),
}

#[derive(Debug, Default)]
pub struct RecordingScreen {
    shown: Mutex<Vec<Shown>>,
}

impl RecordingScreen {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn telemetry(&self) -> Vec<String> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Telemetry(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn replays(&self) -> Vec<String> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Replay(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn feedback(&self) -> Vec<Feedback> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::Feedback(feedback) => Some(feedback),
                _ => None,
            })
            .collect()
    }

    pub fn devices_found(&self) -> Vec<SocketAddr> {
        self.shown()
            .into_iter()
            .filter_map(|s| match s {
                Shown::DeviceFound(addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    fn push(&self, shown: Shown) {
        self.shown.lock().unwrap().push(shown);
    }
}

impl Screen for RecordingScreen {
    fn device_found(&self, addr: SocketAddr) {
        self.push(Shown::DeviceFound(addr));
    }

    fn telemetry(&self, line: &TelemetryLine) {
        self.push(Shown::Telemetry(line.text.clone()));
    }

    fn replay(&self, line: &TelemetryLine) {
        self.push(Shown::Replay(line.text.clone()));
    }

    fn feedback(&self, feedback: &Feedback) {
        self.push(Shown::Feedback(feedback.clone()));
    }

    fn notice(&self, text: &str) {
        self.push(Shown::Notice(text.to_owned()));
    }
}

/// Console driven from the test body: keys are polled without blocking,
/// lines are awaited. Dropping the line sender means end of input.
pub struct ScriptedConsole {
    keys: mpsc::UnboundedReceiver<Key>,
    lines: mpsc::UnboundedReceiver<String>,
}

pub struct ConsoleScript {
    pub keys: mpsc::UnboundedSender<Key>,
    pub lines: mpsc::UnboundedSender<String>,
}

impl ConsoleScript {
    pub fn key(&self, key: char) {
        self.keys.send(Key::Char(key)).unwrap();
    }

    pub fn line(&self, line: &str) {
        self.lines.send(line.to_owned()).unwrap();
    }
}

pub fn scripted_console() -> (ScriptedConsole, ConsoleScript) {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    (
        ScriptedConsole {
            keys: key_rx,
            lines: line_rx,
        },
        ConsoleScript {
            keys: key_tx,
            lines: line_tx,
        },
    )
}

impl Console for ScriptedConsole {
    fn poll_key(&mut self) -> std::io::Result<Option<Key>> {
        Ok(self.keys.try_recv().ok())
    }

    async fn read_line(&mut self, _prompt: &str) -> std::io::Result<Option<String>> {
        Ok(self.lines.recv().await)
    }
}

/// Bridge settings bound to an ephemeral loopback port with a fast poll.
pub fn loopback_config() -> BridgeConfig {
    BridgeConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        poll_interval: Duration::from_millis(5),
        ..BridgeConfig::default()
    }
}

/// A socket standing in for the fan controller.
pub async fn fake_device() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.unwrap()
}

/// Receive one datagram as text, failing the test after a second.
pub async fn recv_text(device: &UdpSocket) -> String {
    let mut buf = [0u8; 1024];
    let (len, _) = tokio::time::timeout(Duration::from_secs(1), device.recv_from(&mut buf))
        .await
        .expect("device received nothing")
        .unwrap();
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

/// Poll `check` until it holds, failing the test after a second.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Datagram feed whose receive fails once `fail` is notified, as when the
/// network interface disappears under the socket.
#[derive(Clone, Default)]
pub struct FailingSource {
    pub fail: Arc<Notify>,
}

impl DatagramSource for FailingSource {
    async fn recv(&self, _buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.fail.notified().await;
        Err(std::io::Error::new(
            std::io::ErrorKind::NetworkDown,
            "interface went down",
        ))
    }
}
