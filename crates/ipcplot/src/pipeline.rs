//! One complete client session against a host.
//!
//! ```text
//! retrieve ──► assemble ──► present ──► completion status
//!    │             │            │
//!    │             │            └─ failed: error status, then Err
//!    │             └─ failed: Err (host gets no status)
//!    └─ not found: Outcome::NothingToPlot
//! ```

use ipcplot_channel::{ChannelClient, ChannelError, Connector, Transfer};
use ipcplot_dataset::{DatasetError, PlotData, PresentationSink};
use ipcplot_wire::{StatusCode, StatusRecord};
use tracing::{info, warn};

/// How a session ended when nothing went wrong on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No host was listening.
    NothingToPlot,
    /// The dataset reached the sink.
    Plotted {
        columns: usize,
        rows: usize,
        /// False when the completion status could not be delivered. The
        /// plot is still valid.
        status_delivered: bool,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("retrieve failed: {0}")]
    Channel(#[from] ChannelError),

    #[error("cannot assemble dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// The sink rejected the dataset. The host was sent
    /// `PRESENTATION_FAILED` when `status_delivered` is true.
    #[error("presentation failed: {source}")]
    Presentation {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        status_delivered: bool,
    },
}

/// Run one session: retrieve, assemble, present, then send `COMPLETE`.
pub fn run<C, S>(client: &ChannelClient<C>, sink: &mut S) -> Result<Outcome, PipelineError>
where
    C: Connector,
    S: PresentationSink + ?Sized,
{
    let transfer = match client.retrieve_data() {
        Ok(transfer) => transfer,
        Err(err) if err.is_benign() => {
            info!(endpoint = %client.config().endpoint, "no host listening, nothing to plot");
            return Ok(Outcome::NothingToPlot);
        }
        Err(err) => return Err(err.into()),
    };

    let plot = assemble(transfer)?;
    let presented = sink.present(&plot);
    finish(plot, presented, |status| client.send_status(status))
}

/// Async variant of [`run`]. The sink still runs on the calling task.
#[cfg(feature = "async")]
pub async fn run_async<C, S>(
    client: &ChannelClient<C>,
    sink: &mut S,
) -> Result<Outcome, PipelineError>
where
    C: Connector,
    S: PresentationSink + ?Sized,
{
    let transfer = match client.retrieve_data_async().await {
        Ok(transfer) => transfer,
        Err(err) if err.is_benign() => {
            info!(endpoint = %client.config().endpoint, "no host listening, nothing to plot");
            return Ok(Outcome::NothingToPlot);
        }
        Err(err) => return Err(err.into()),
    };

    let plot = assemble(transfer)?;
    let presented = sink.present(&plot);
    let status = completion_status(&presented);
    let delivered = client.send_status_async(status).await;
    settle(plot, presented, delivered)
}

fn assemble(transfer: Transfer) -> Result<PlotData, PipelineError> {
    let (columns, rows, samples, labels) = transfer.into_parts();
    let plot = PlotData::assemble(columns as usize, rows as usize, samples, labels)?;
    info!(columns, rows, "dataset assembled");
    Ok(plot)
}

fn completion_status<E: std::fmt::Display>(presented: &Result<(), E>) -> StatusRecord {
    match presented {
        Ok(()) => StatusRecord::complete(),
        Err(err) => {
            StatusRecord::from_code(StatusCode::PRESENTATION_FAILED).with_context(err.to_string())
        }
    }
}

fn finish<E, F>(
    plot: PlotData,
    presented: Result<(), E>,
    send: F,
) -> Result<Outcome, PipelineError>
where
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce(StatusRecord) -> Result<(), ChannelError>,
{
    let delivered = send(completion_status(&presented));
    settle(plot, presented, delivered)
}

fn settle<E>(
    plot: PlotData,
    presented: Result<(), E>,
    delivered: Result<(), ChannelError>,
) -> Result<Outcome, PipelineError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status_delivered = match delivered {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "could not deliver final status to host");
            false
        }
    };

    match presented {
        Ok(()) => Ok(Outcome::Plotted {
            columns: plot.dataset().column_count(),
            rows: plot.dataset().row_count(),
            status_delivered,
        }),
        Err(err) => Err(PipelineError::Presentation {
            source: Box::new(err),
            status_delivered,
        }),
    }
}
