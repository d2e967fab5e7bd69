//! Async link driver for the F56 bisync link
//!
//! Connects one [`f56_core::Engine`] to a serial transport:
//!
//! - Bytes read from an [`embedded_io_async::Read`] are translated and fed
//!   to the engine
//! - Send effects are written to an [`embedded_io_async::Write`]
//! - The reply deadline runs on an `embassy-time` timer
//! - Application requests and results pass through [`LinkChannels`]
//!
//! ```ignore
//! static CHANNELS: LinkChannels<CriticalSectionRawMutex> = LinkChannels::new();
//!
//! #[embassy_executor::task]
//! async fn link_task(rx: BufferedUartRx, tx: BufferedUartTx) {
//!     let mut driver =
//!         LinkDriver::new(EngineConfig::default(), Crc16, rx, tx, &CHANNELS).unwrap();
//!     if let Err(e) = driver.run().await {
//!         error!("Link stopped: {:?}", e);
//!     }
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod channels;
pub mod driver;

pub use channels::{LinkChannels, LinkOutput, Request};
pub use driver::{LinkDriver, LinkError};
