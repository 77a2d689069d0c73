use crate::encoder::{Payload, PayloadEncoder};
use crate::geometry::PlatformGeometry;
use crate::kinematics::{self, ActuatorLengths};
use crate::limiter::RateLimiter;
use crate::pose::select_pose;
use crate::sensor::{HandFrame, SensorEvent};
use crate::transport::Transport;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Counters for one sensor session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames delivered by the sensor
    pub frames: u64,
    /// Frames skipped (no hand, several hands, or invalid hand)
    pub skipped: u64,
    /// Frames that went through the solver
    pub solved: u64,
    /// Payloads handed to the transport
    pub emitted: u64,
}

/// Per-session frame handler
///
/// Owns the rate limiter and the transport; created when the session starts
/// and consumed by [`Listener::on_exit`], which releases the transport.
pub struct Listener<'g, T: Transport> {
    geometry: &'g PlatformGeometry,
    encoder: PayloadEncoder,
    limiter: RateLimiter,
    transport: T,
    stats: SessionStats,
    connected: bool,
    last_lengths: Option<ActuatorLengths>,
}

impl<'g, T: Transport> Listener<'g, T> {
    /// Start a session
    pub fn on_init(
        geometry: &'g PlatformGeometry,
        encoder: PayloadEncoder,
        threshold: u32,
        transport: T,
    ) -> Self {
        info!(transport = %transport.describe(), threshold, "initializing listener");
        Self {
            geometry,
            encoder,
            limiter: RateLimiter::new(threshold),
            transport,
            stats: SessionStats::default(),
            connected: false,
            last_lengths: None,
        }
    }

    pub fn on_connect(&mut self) {
        self.connected = true;
        info!("sensor connected");
    }

    pub fn on_disconnect(&mut self) {
        self.connected = false;
        warn!("sensor disconnected");
    }

    /// Process one frame; returns the payload if one was sent
    ///
    /// Transport errors are returned to the caller without retry.
    pub fn on_frame(&mut self, frame: &HandFrame) -> Result<Option<Payload>> {
        self.stats.frames += 1;

        let Some(pose) = select_pose(frame) else {
            self.stats.skipped += 1;
            return Ok(None);
        };

        let lengths = kinematics::solve(&pose, self.geometry);
        self.stats.solved += 1;
        self.last_lengths = Some(lengths);

        if !self.limiter.tick() {
            return Ok(None);
        }

        let payload = self.encoder.encode(&lengths);
        debug!(?lengths, payload = %payload, "emitting");
        self.transport
            .send(&payload)
            .context("Failed to send actuator payload")?;
        self.stats.emitted += 1;

        Ok(Some(payload))
    }

    /// Dispatch a sensor event to the matching callback
    pub fn handle(&mut self, event: &SensorEvent) -> Result<Option<Payload>> {
        match event {
            SensorEvent::Connected => {
                self.on_connect();
                Ok(None)
            }
            SensorEvent::Disconnected => {
                self.on_disconnect();
                Ok(None)
            }
            SensorEvent::Frame(frame) => self.on_frame(frame),
        }
    }

    /// End the session, releasing the transport
    pub fn on_exit(self) -> SessionStats {
        info!(
            frames = self.stats.frames,
            skipped = self.stats.skipped,
            emitted = self.stats.emitted,
            "listener exited"
        );
        self.stats
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Lengths computed for the most recent valid frame
    pub fn last_lengths(&self) -> Option<ActuatorLengths> {
        self.last_lengths
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
