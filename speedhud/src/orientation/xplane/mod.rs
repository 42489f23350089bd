//! X-Plane telemetry orientation source.
//!
//! Listens for UDP packets from X-Plane and turns them into orientation
//! events.
//!
//! # Supported Protocols
//!
//! - **ForeFlight** (XGPS2/XATT2) - Recommended for X-Plane 12
//! - **Legacy DATA** - Binary format for older X-Plane versions (indices 3 and 17)
//!
//! # Setup
//!
//! In X-Plane: Settings → Network → "Send position to ForeFlight"

mod protocol;

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket as StdUdpSocket};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{ListenerSet, OrientationError, OrientationListener, OrientationSource};
pub use protocol::{parse_packet, TelemetryUpdate};

/// ForeFlight broadcast port.
pub const DEFAULT_TELEMETRY_PORT: u16 = 49002;

/// Maximum packet size we expect.
const MAX_PACKET_SIZE: usize = 1024;

/// How long `stop` waits for the receive task to release its socket.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(1);

/// Seconds between "waiting for telemetry" reminders.
const WAITING_LOG_INTERVAL_SECS: u64 = 10;

/// Logs the "waiting" reminder once per interval boundary, however many
/// receive timeouts fall inside that second.
#[derive(Debug, Default)]
struct WaitingLog {
    next_secs: u64,
}

impl WaitingLog {
    fn due(&mut self, waited_secs: u64) -> bool {
        if waited_secs < self.next_secs {
            return false;
        }
        self.next_secs =
            waited_secs - waited_secs % WAITING_LOG_INTERVAL_SECS + WAITING_LOG_INTERVAL_SECS;
        true
    }
}

/// X-Plane source configuration.
#[derive(Debug, Clone)]
pub struct XPlaneSourceConfig {
    /// Address to bind (default: all interfaces).
    pub bind_address: IpAddr,

    /// UDP port to listen on. 0 picks a free port.
    pub port: u16,

    /// How long to wait for a packet before logging that none arrived.
    pub recv_timeout: Duration,
}

impl Default for XPlaneSourceConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_TELEMETRY_PORT,
            recv_timeout: Duration::from_millis(500),
        }
    }
}

impl XPlaneSourceConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }
}

/// Orientation source fed by X-Plane UDP telemetry.
///
/// The receive loop runs as a task on the supplied tokio runtime. The
/// socket is bound synchronously in [`start`](OrientationSource::start) so
/// bind failures reach the caller, and [`stop`](OrientationSource::stop)
/// waits for the task to close it so the port can be bound again at once.
pub struct XPlaneOrientationSource {
    config: XPlaneSourceConfig,
    runtime: Handle,
    listeners: ListenerSet,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    released: Option<Receiver<()>>,
    local_addr: Option<SocketAddr>,
}

impl XPlaneOrientationSource {
    pub fn new(config: XPlaneSourceConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            listeners: ListenerSet::new(),
            cancel: None,
            task: None,
            released: None,
            local_addr: None,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(runtime: Handle) -> Self {
        Self::new(XPlaneSourceConfig::default(), runtime)
    }

    /// Get the configured port.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Address the socket is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    async fn run(
        socket: StdUdpSocket,
        listeners: ListenerSet,
        cancel: CancellationToken,
        recv_timeout: Duration,
        released: Sender<()>,
    ) {
        match UdpSocket::from_std(socket) {
            Ok(socket) => {
                Self::receive(&socket, &listeners, &cancel, recv_timeout).await;
                drop(socket);
            }
            Err(e) => warn!(error = %e, "Failed to register telemetry socket"),
        }
        // Socket is closed; the port is free again
        let _ = released.send(());
    }

    async fn receive(
        socket: &UdpSocket,
        listeners: &ListenerSet,
        cancel: &CancellationToken,
        recv_timeout: Duration,
    ) {
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let mut packets_received: u64 = 0;
        let mut events_sent: u64 = 0;
        let mut last_pitch = 0.0f32;
        let started = Instant::now();
        let mut waiting_log = WaitingLog::default();

        loop {
            let recv_result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = tokio::time::timeout(recv_timeout, socket.recv(&mut buffer)) => result,
            };

            match recv_result {
                Ok(Ok(len)) => {
                    packets_received += 1;
                    Self::log_first_packet(packets_received, &buffer[..len]);

                    let Some(update) = parse_packet(&buffer[..len]) else {
                        if packets_received <= 5 {
                            let preview = String::from_utf8_lossy(&buffer[..len.min(50)]);
                            debug!(packet_num = packets_received, preview = %preview, "Failed to parse packet");
                        }
                        continue;
                    };

                    // Nothing is delivered once stop has been requested
                    if cancel.is_cancelled() {
                        break;
                    }

                    if let Some(pitch) = update.pitch {
                        last_pitch = pitch;
                    }
                    for event in update.events(last_pitch) {
                        events_sent += 1;
                        listeners.dispatch(&event);
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "UDP receive error");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Err(_) => {
                    let waited = started.elapsed().as_secs();
                    if packets_received == 0 && waiting_log.due(waited) {
                        info!(elapsed_secs = waited, "Waiting for telemetry data...");
                    }
                    trace!("No telemetry data received (timeout)");
                }
            }
        }

        info!(packets_received, events_sent, "Telemetry receiver stopped");
    }

    fn log_first_packet(packets_received: u64, data: &[u8]) {
        if packets_received == 1 {
            let header = if data.len() >= 4 {
                String::from_utf8_lossy(&data[..4]).to_string()
            } else {
                format!("{:?}", data)
            };
            info!(header = %header, len = data.len(), "Received first telemetry packet");
        }
    }
}

impl OrientationSource for XPlaneOrientationSource {
    fn add_listener(&self, listener: Arc<dyn OrientationListener>) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn OrientationListener>) {
        self.listeners.remove(listener);
    }

    fn start(&mut self) -> Result<(), OrientationError> {
        if self.is_running() {
            return Ok(());
        }

        let port = self.config.port;
        let socket = StdUdpSocket::bind(SocketAddr::new(self.config.bind_address, port))
            .map_err(|e| OrientationError::SocketBind { port, source: e })?;
        socket
            .set_nonblocking(true)
            .map_err(|e| OrientationError::SocketBind { port, source: e })?;
        let local_addr = socket.local_addr().ok();

        let cancel = CancellationToken::new();
        let (released_tx, released_rx) = mpsc::channel();
        let task = self.runtime.spawn(Self::run(
            socket,
            self.listeners.clone(),
            cancel.clone(),
            self.config.recv_timeout,
            released_tx,
        ));

        info!(port, local_addr = ?local_addr, "Telemetry receiver started");

        self.local_addr = local_addr;
        self.cancel = Some(cancel);
        self.task = Some(task);
        self.released = Some(released_rx);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
            debug!("Telemetry receiver stop requested");
        }
        if let Some(released) = self.released.take() {
            wait_for_release(&released);
        }
        self.task = None;
        self.local_addr = None;
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

/// Block until the receive task has closed its socket.
///
/// A current-thread runtime cannot make progress while its only thread is
/// blocked here, so on such a thread the socket closes once the caller
/// yields back to the runtime instead.
fn wait_for_release(released: &Receiver<()>) {
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            debug!("Stopped on a current-thread runtime, not waiting for socket release");
            return;
        }
    }

    match released.recv_timeout(RELEASE_TIMEOUT) {
        // Disconnected: the task was dropped along with its socket
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                timeout_ms = RELEASE_TIMEOUT.as_millis() as u64,
                "Telemetry receiver did not release its socket in time"
            );
        }
    }
}

impl Drop for XPlaneOrientationSource {
    fn drop(&mut self) {
        self.stop();
    }
}
