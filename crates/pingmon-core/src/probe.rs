//! Sample sources and tick scheduling
//!
//! A [`SampleSource`] produces one [`ProbeReply`] per tick. A timeout or an
//! unreachable host is a normal, failed reply. Only faults that prevent
//! probing at all (for example name resolution) are a [`ProbeError`]; the
//! driver then waits the [`TickSchedule`] back-off before trying again.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Default probe target (Google public DNS over TCP)
pub const DEFAULT_HOST: &str = "8.8.8.8";

/// Default probe port
pub const DEFAULT_PORT: u16 = 53;

/// Default connect timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Largest tick interval accepted from a selection string
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Faults that prevent a probe from being issued
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No address found for {0}")]
    NoAddress(String),

    #[error("Sample source exhausted")]
    Exhausted,

    #[error("Scripted fault")]
    Scripted,
}

/// Result of one probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReply {
    /// Whether the target answered
    pub ok: bool,
    /// Measured round-trip time, present when `ok`
    pub rtt: Option<Duration>,
    /// When the probe completed
    pub timestamp: DateTime<Utc>,
}

impl ProbeReply {
    /// Successful reply completing now
    pub fn success(rtt: Duration) -> Self {
        Self::success_at(rtt, Utc::now())
    }

    pub fn success_at(rtt: Duration, timestamp: DateTime<Utc>) -> Self {
        Self {
            ok: true,
            rtt: Some(rtt),
            timestamp,
        }
    }

    /// Failed reply completing now
    pub fn failure() -> Self {
        Self::failure_at(Utc::now())
    }

    pub fn failure_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            ok: false,
            rtt: None,
            timestamp,
        }
    }

    /// RTT that counts as a measurement
    ///
    /// None unless `ok`. A zero RTT is the failure marker and is None too.
    pub fn measured_rtt(&self) -> Option<Duration> {
        self.rtt.filter(|rtt| self.ok && !rtt.is_zero())
    }

    /// RTT in whole milliseconds, absent for failures
    pub fn rtt_millis(&self) -> Option<u32> {
        self.measured_rtt()
            .map(|d| u32::try_from(d.as_millis()).unwrap_or(u32::MAX))
    }
}

/// Anything that can be probed once per tick
pub trait SampleSource {
    /// Issue one probe
    fn probe(&mut self) -> Result<ProbeReply, ProbeError>;

    /// Human-readable target description
    fn target(&self) -> String;
}

/// Times a TCP connect to `host:port`
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
    resolved: Option<SocketAddr>,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            resolved: None,
        }
    }

    /// Resolve once and cache the first address
    fn address(&mut self) -> Result<SocketAddr, ProbeError> {
        if let Some(addr) = self.resolved {
            return Ok(addr);
        }
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| ProbeError::Resolve {
                host: self.host.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ProbeError::NoAddress(self.host.clone()))?;
        debug!(host = %self.host, %addr, "Resolved probe target");
        self.resolved = Some(addr);
        Ok(addr)
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_PORT,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }
}

impl SampleSource for TcpProbe {
    fn probe(&mut self) -> Result<ProbeReply, ProbeError> {
        let addr = self.address()?;
        let started = Instant::now();
        match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(_stream) => Ok(ProbeReply::success(started.elapsed())),
            Err(e) => {
                debug!(%addr, error = %e, "Probe failed");
                Ok(ProbeReply::failure())
            }
        }
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One scripted step of a [`ReplaySource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// Reply with this RTT in milliseconds, `None` for a failure
    Reply(Option<u64>),
    /// Fail to probe at all
    Fault,
}

/// Replays a fixed script of replies
#[derive(Debug, Clone)]
pub struct ReplaySource {
    script: VecDeque<ReplayStep>,
    looping: bool,
}

impl ReplaySource {
    /// Replay RTTs in milliseconds (`None` = failed probe)
    pub fn new(rtts: impl IntoIterator<Item = Option<u64>>) -> Self {
        Self::from_steps(rtts.into_iter().map(ReplayStep::Reply))
    }

    pub fn from_steps(steps: impl IntoIterator<Item = ReplayStep>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            looping: false,
        }
    }

    /// Restart from the top when the script runs out
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SampleSource for ReplaySource {
    fn probe(&mut self) -> Result<ProbeReply, ProbeError> {
        let step = self.script.pop_front().ok_or(ProbeError::Exhausted)?;
        if self.looping {
            self.script.push_back(step);
        }
        match step {
            ReplayStep::Reply(Some(ms)) => Ok(ProbeReply::success(Duration::from_millis(ms))),
            ReplayStep::Reply(None) => Ok(ProbeReply::failure()),
            ReplayStep::Fault => Err(ProbeError::Scripted),
        }
    }

    fn target(&self) -> String {
        "replay".to_string()
    }
}

/// Tick interval and fault back-off, owned by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    interval: Duration,
    backoff: Duration,
}

impl TickSchedule {
    pub fn new(interval: Duration, backoff: Duration) -> Self {
        Self { interval, backoff }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Delay before the next probe given the outcome of this one
    pub fn next_delay<T>(&self, outcome: &Result<T, ProbeError>) -> Duration {
        match outcome {
            Ok(_) => self.interval,
            Err(_) => self.backoff,
        }
    }

    /// Apply an interval selection in milliseconds
    ///
    /// Unparsable or out-of-range values are ignored and the current
    /// interval is kept.
    ///
    /// # Returns
    /// `true` if the interval changed
    pub fn apply_interval_selection(&mut self, value: &str) -> bool {
        match value.trim().parse::<u64>() {
            Ok(ms) if (1..=MAX_INTERVAL_MS).contains(&ms) => {
                self.interval = Duration::from_millis(ms);
                true
            }
            _ => {
                debug!(value, "Ignoring invalid interval selection");
                false
            }
        }
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(crate::DEFAULT_INTERVAL_MS),
            Duration::from_millis(crate::DEFAULT_BACKOFF_MS),
        )
    }
}
