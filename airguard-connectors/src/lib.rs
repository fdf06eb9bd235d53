//! Host-Side Connectors for AirGuard
//!
//! ## Overview
//!
//! `airguard-core` stops at a compensated reading and an IAQ score. This
//! crate provides the plumbing a host needs around it:
//!
//! - [`SamplerWorker`]: runs one engine on a dedicated thread and publishes
//!   each cycle's outcome to a single-slot mailbox
//! - [`JsonLinesSink`]: a [`TelemetrySink`](airguard_core::TelemetrySink)
//!   writing newline-delimited JSON
//! - [`forward`]: async bridge from the mailbox to any sink
//!
//! ## Threading Model
//!
//! The engine is not `Sync` and never needs to be. It is moved onto the
//! sampler thread whole, together with its transport and baseline; other
//! tasks only ever see copies of finished samples.
//!
//! ```text
//! ┌──────────────┐  request_sample()  ┌──────────────────┐
//! │ scheduler    │ ─────────────────▶ │ sampler thread   │
//! │ (any timer)  │                    │ AirQualityEngine │
//! └──────────────┘                    └────────┬─────────┘
//!                                              │ send_replace
//!                                              ▼
//!                  ┌─────────────┐   watch   ┌─────────┐
//!                  │ forward()   │ ◀──────── │ mailbox │
//!                  │ → sink      │           └─────────┘
//!                  └─────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use airguard_connectors::{forward, JsonLinesSink, SamplerWorker, ThreadDelay};
//! use airguard_core::{AirQualityEngine, EngineConfig, SimulatedSensor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AirQualityEngine::new(SimulatedSensor::default(), EngineConfig::default(), &mut ThreadDelay)?;
//! let worker = SamplerWorker::spawn(engine, ThreadDelay)?;
//!
//! let mailbox = worker.subscribe();
//! let publisher = tokio::spawn(async move {
//!     let mut sink = JsonLinesSink::new(std::io::stdout());
//!     forward(mailbox, &mut sink).await
//! });
//!
//! worker.request_sample()?;
//! let _engine = worker.shutdown()?;
//! let _published = publisher.await?;
//! # Ok(())
//! # }
//! ```

pub mod sink;
pub mod worker;

pub use sink::{JsonLinesSink, SinkError, SinkStats};
pub use worker::{forward, CycleOutcome, Mailbox, SamplerWorker, ThreadDelay, WorkerError};
