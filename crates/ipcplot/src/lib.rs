//! Client for the ipcplot helper channel.
//!
//! A host process publishes a dataset on a per-process channel; this crate
//! connects, decodes the fixed-layout records, reshapes the samples into
//! labelled columns and hands them to a [`PresentationSink`]. After the sink
//! returns, a completion status tells the host it may tear the channel down.
//!
//! # Crate Structure
//!
//! - [`transport`]: channel endpoints (named pipes, Unix domain sockets)
//! - [`wire`]: binary record layouts and stream codecs
//! - [`channel`]: cycle client with busy retry, plus the Unix host side
//! - [`dataset`]: column-major assembly and the presentation seam
//! - [`pipeline`]: retrieve, assemble, present, complete

pub mod pipeline;

/// Re-export transport types.
pub mod transport {
    pub use ipcplot_transport::*;
}

/// Re-export record types.
pub mod wire {
    pub use ipcplot_wire::*;
}

/// Re-export channel client types.
pub mod channel {
    pub use ipcplot_channel::*;
}

/// Re-export dataset types.
pub mod dataset {
    pub use ipcplot_dataset::*;
}

pub use ipcplot_channel::{ChannelClient, ChannelError, ClientConfig, RetryPolicy};
pub use ipcplot_dataset::{Dataset, PlotData, PresentationSink};
pub use pipeline::{run, Outcome, PipelineError};
