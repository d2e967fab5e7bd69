//! Link driver
//!
//! Owns one [`Engine`] and serializes its three input sources into one
//! ordered stream: bytes from the transport, the reply deadline, and
//! application send requests. Each step waits for whichever comes first,
//! feeds it to the engine and carries out the returned effects before
//! accepting anything else.

use core::future::pending;

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::{Read, Write};

use f56_core::{ConfigError, DeadlineToken, Effect, Effects, Engine, EngineConfig};
use f56_protocol::{translate, translator::line_error, Checksum};

use crate::channels::{LinkChannels, LinkOutput};

/// Buffer size for transport reads
const RX_BUF_SIZE: usize = 64;

/// Transport failure that stops the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Writing to the transport failed
    Write(E),
    /// The transport reported end of stream
    Closed,
}

/// The deadline as seen by the timer
#[derive(Debug, Clone, Copy)]
struct ArmedDeadline {
    token: DeadlineToken,
    at: Instant,
}

/// Runs an engine over a byte transport
pub struct LinkDriver<'a, M: RawMutex, R, W, C: Checksum> {
    engine: Engine<C>,
    rx: R,
    tx: W,
    channels: &'a LinkChannels<M>,
    reply_timeout: Duration,
    armed: Option<ArmedDeadline>,
    buf: [u8; RX_BUF_SIZE],
}

impl<'a, M, R, W, C> LinkDriver<'a, M, R, W, C>
where
    M: RawMutex,
    R: Read,
    W: Write,
    C: Checksum,
{
    /// Create a driver with an idle engine
    pub fn new(
        config: EngineConfig,
        checksum: C,
        rx: R,
        tx: W,
        channels: &'a LinkChannels<M>,
    ) -> Result<Self, ConfigError> {
        let engine = Engine::new(config, checksum)?;
        Ok(Self {
            engine,
            rx,
            tx,
            channels,
            reply_timeout: Duration::from_millis(u64::from(config.reply_timeout_ms)),
            armed: None,
            buf: [0; RX_BUF_SIZE],
        })
    }

    /// Create a driver from a postcard-serialized [`EngineConfig`]
    pub fn from_stored_config(
        bytes: &[u8],
        checksum: C,
        rx: R,
        tx: W,
        channels: &'a LinkChannels<M>,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig::from_bytes(bytes)?;
        Self::new(config, checksum, rx, tx, channels)
    }

    /// The engine, for inspecting state and statistics
    pub fn engine(&self) -> &Engine<C> {
        &self.engine
    }

    /// Drive the link forever
    ///
    /// Returns only when the transport is closed or can no longer be written.
    pub async fn run(&mut self) -> Result<(), LinkError<W::Error>> {
        info!("Link driver started");
        loop {
            self.step().await?;
        }
    }

    /// Wait for one input and process it to completion
    pub async fn step(&mut self) -> Result<(), LinkError<W::Error>> {
        let armed = self.armed;
        let idle = self.engine.is_idle();
        let channels = self.channels;

        let input = select3(
            self.rx.read(&mut self.buf),
            async move {
                match armed {
                    Some(deadline) => {
                        Timer::at(deadline.at).await;
                        deadline.token
                    }
                    None => pending().await,
                }
            },
            async move {
                // New sends are taken only while the line is free
                if idle {
                    channels.requests.receive().await
                } else {
                    pending().await
                }
            },
        )
        .await;

        match input {
            Either3::First(Ok(0)) => {
                warn!("Transport closed");
                return Err(LinkError::Closed);
            }
            Either3::First(Ok(n)) => {
                trace!("RX: {} bytes", n);
                let buf = self.buf;
                for &byte in &buf[..n] {
                    let effects = self.engine.handle_event(translate(byte, self.engine.rx_mode()));
                    self.apply(effects).await?;
                }
            }
            Either3::First(Err(_)) => {
                warn!("Transport read error");
                let effects = self.engine.handle_event(line_error());
                self.apply(effects).await?;
            }
            Either3::Second(token) => {
                let effects = self.engine.handle_timeout(token);
                self.apply(effects).await?;
            }
            Either3::Third(request) => match self.engine.send(&request) {
                Ok(effects) => self.apply(effects).await?,
                Err(e) => warn!("Send rejected: {:?}", e),
            },
        }

        Ok(())
    }

    /// Carry out effects in order, then follow the engine's deadline
    async fn apply(&mut self, effects: Effects) -> Result<(), LinkError<W::Error>> {
        for effect in effects {
            match effect {
                Effect::Send(bytes) => {
                    trace!("TX: {} bytes", bytes.len());
                    self.tx.write_all(&bytes).await.map_err(LinkError::Write)?;
                    self.tx.flush().await.map_err(LinkError::Write)?;
                }
                Effect::Frame(payload) => {
                    self.channels.outputs.send(LinkOutput::Frame(payload)).await;
                }
                Effect::Status(status) => {
                    self.channels.outputs.send(LinkOutput::Status(status)).await;
                }
            }
        }

        self.follow_deadline();
        Ok(())
    }

    /// Start the timer for a newly armed token, drop it once disarmed
    fn follow_deadline(&mut self) {
        match (self.engine.deadline(), self.armed) {
            (None, _) => self.armed = None,
            (Some(token), Some(armed)) if armed.token == token => {}
            (Some(token), _) => {
                self.armed = Some(ArmedDeadline {
                    token,
                    at: Instant::now() + self.reply_timeout,
                })
            }
        }
    }
}
