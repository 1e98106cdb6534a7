//! Tick driver
//!
//! The monitor and its sample source live on a dedicated thread running a
//! current-thread Tokio runtime. Ticks are strictly sequential: a probe is
//! issued, folded into the monitor, and only then is the next one scheduled.
//! Everything else talks to the thread through [`MonitorHandle`].

use anyhow::anyhow;
use pingmon_core::monitor::{MonitorConfig, MonitorSnapshot, MonitorState};
use pingmon_core::probe::{ProbeError, SampleSource, TickSchedule};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Commands sent to the driver thread
pub enum MonitorCommand {
    Snapshot {
        reply: oneshot::Sender<MonitorSnapshot>,
    },
    GetStatus {
        reply: oneshot::Sender<DriverStatus>,
    },
    SetWindowWidth {
        value: String,
        reply: oneshot::Sender<bool>,
    },
    SetInterval {
        value: String,
        reply: oneshot::Sender<bool>,
    },
    SetRunning {
        enabled: bool,
    },
    InjectFailure,
}

/// Driver status snapshot (safe to send between threads)
#[derive(Clone, Debug)]
pub struct DriverStatus {
    pub running: bool,
    pub target: String,
    pub interval_ms: u64,
    pub backoff_ms: u64,
    pub window_width: u32,
    pub index: u64,
    /// Probe faults since start
    pub faults: u64,
}

/// Options for spawning the driver
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverOptions {
    pub monitor: MonitorConfig,
    pub schedule: TickSchedule,
    /// Start ticking immediately
    pub autostart: bool,
    /// Render snapshots with the short freshness view
    pub short_view: bool,
}

/// Handle to communicate with the driver thread
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<MonitorCommand>,
    events: broadcast::Sender<Arc<MonitorSnapshot>>,
}

impl MonitorHandle {
    /// Spawn the driver on a dedicated thread and return a handle
    pub fn spawn(
        source: Box<dyn SampleSource + Send>,
        options: DriverOptions,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<MonitorCommand>(32);
        let (events, _) = broadcast::channel(64);

        let driver = Driver {
            monitor: MonitorState::new(options.monitor),
            source,
            schedule: options.schedule,
            running: options.autostart,
            short_view: options.short_view,
            next_tick: Instant::now(),
            faults: 0,
            events: events.clone(),
        };

        std::thread::Builder::new()
            .name("pingmon-driver".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create driver runtime: {}", e);
                        return;
                    }
                };
                rt.block_on(driver.run(rx));
            })?;

        Ok(Self { tx, events })
    }

    /// Receive a snapshot after every processed tick
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<MonitorSnapshot>> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> anyhow::Result<MonitorSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| anyhow!("Monitor thread died"))
    }

    pub async fn get_status(&self) -> anyhow::Result<DriverStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::GetStatus { reply }).await?;
        rx.await.map_err(|_| anyhow!("Monitor thread died"))
    }

    /// Apply a window width selection
    ///
    /// Returns `false` when the value was rejected and the width kept.
    pub async fn set_window_width(&self, value: String) -> anyhow::Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::SetWindowWidth { value, reply })
            .await?;
        rx.await.map_err(|_| anyhow!("Monitor thread died"))
    }

    /// Apply a tick interval selection in milliseconds
    pub async fn set_interval(&self, value: String) -> anyhow::Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::SetInterval { value, reply }).await?;
        rx.await.map_err(|_| anyhow!("Monitor thread died"))
    }

    pub async fn set_running(&self, enabled: bool) -> anyhow::Result<()> {
        self.send(MonitorCommand::SetRunning { enabled }).await
    }

    pub async fn inject_failure(&self) -> anyhow::Result<()> {
        self.send(MonitorCommand::InjectFailure).await
    }

    async fn send(&self, cmd: MonitorCommand) -> anyhow::Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow!("Monitor thread died"))
    }
}

struct Driver {
    monitor: MonitorState,
    source: Box<dyn SampleSource + Send>,
    schedule: TickSchedule,
    running: bool,
    short_view: bool,
    next_tick: Instant,
    faults: u64,
    events: broadcast::Sender<Arc<MonitorSnapshot>>,
}

impl Driver {
    async fn run(mut self, mut rx: mpsc::Receiver<MonitorCommand>) {
        info!(probe = %self.source.target(), running = self.running, "Monitor driver started");

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = tokio::time::sleep_until(self.next_tick), if self.running => {
                    // The probe blocks this thread; commands queue behind it
                    let outcome = self.tick();
                    self.next_tick = Instant::now() + self.schedule.next_delay(&outcome);
                }
            }
        }

        info!("Monitor driver stopped");
    }

    fn tick(&mut self) -> Result<(), ProbeError> {
        match self.source.probe() {
            Ok(reply) => {
                let outcome = self.monitor.process(reply);
                debug!(
                    index = outcome.index,
                    failed = outcome.failed,
                    median = outcome.median_recomputed,
                    "Tick processed"
                );
                self.publish();
                Ok(())
            }
            Err(e) => {
                self.faults += 1;
                warn!(
                    error = %e,
                    backoff_ms = self.schedule.backoff().as_millis() as u64,
                    "Probe fault, backing off"
                );
                Err(e)
            }
        }
    }

    fn publish(&self) {
        if self.events.receiver_count() == 0 {
            return;
        }
        let snapshot = self.monitor.snapshot(chrono::Utc::now(), self.short_view);
        let _ = self.events.send(Arc::new(snapshot));
    }

    fn handle(&mut self, cmd: MonitorCommand) {
        match cmd {
            MonitorCommand::Snapshot { reply } => {
                let _ = reply.send(self.monitor.snapshot(chrono::Utc::now(), self.short_view));
            }
            MonitorCommand::GetStatus { reply } => {
                let _ = reply.send(self.status());
            }
            MonitorCommand::SetWindowWidth { value, reply } => {
                let applied = self.monitor.apply_width_selection(&value);
                if applied {
                    self.publish();
                }
                let _ = reply.send(applied);
            }
            MonitorCommand::SetInterval { value, reply } => {
                let applied = self.schedule.apply_interval_selection(&value);
                if applied {
                    info!(interval_ms = self.schedule.interval().as_millis() as u64, "Interval changed");
                }
                let _ = reply.send(applied);
            }
            MonitorCommand::SetRunning { enabled } => {
                if enabled && !self.running {
                    self.next_tick = Instant::now();
                }
                if enabled != self.running {
                    info!(enabled, "Monitoring toggled");
                }
                self.running = enabled;
            }
            MonitorCommand::InjectFailure => {
                self.monitor.inject_failure();
                self.publish();
            }
        }
    }

    fn status(&self) -> DriverStatus {
        DriverStatus {
            running: self.running,
            target: self.source.target(),
            interval_ms: self.schedule.interval().as_millis() as u64,
            backoff_ms: self.schedule.backoff().as_millis() as u64,
            window_width: self.monitor.width(),
            index: self.monitor.current_index(),
            faults: self.faults,
        }
    }
}
