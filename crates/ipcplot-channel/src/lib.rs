//! Channel client for the ipcplot helper protocol.
//!
//! One [`ChannelClient`] call is one cycle: connect (retrying while the
//! endpoint is busy), transfer a fixed sequence of records, close.
//!
//! - [`ChannelClient::retrieve_data`]: header, samples, labels, then an
//!   acknowledgement status.
//! - [`ChannelClient::send_status`]: a single status record.
//!
//! Each call runs on its own worker thread and blocks the caller until the
//! cycle is finished. On Unix, [`ChannelHost`] provides the host side.

pub mod client;
pub mod config;
pub mod connector;
pub mod cycle;
pub mod error;

#[cfg(unix)]
pub mod host;

pub use client::{ChannelClient, Transfer};
pub use config::{ClientConfig, RetryPolicy, DEFAULT_BACKOFF};
pub use connector::{Connector, SystemConnector};
pub use cycle::{CycleKind, CycleState};
pub use error::{ChannelError, Result};

#[cfg(unix)]
pub use host::ChannelHost;

pub use ipcplot_transport::{Endpoint, EndpointFault};
pub use ipcplot_wire::{StatusCode, StatusRecord, WireLayout};
