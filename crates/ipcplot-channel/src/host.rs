use std::path::Path;

use ipcplot_transport::{Endpoint, UnixDomainSocket};
use ipcplot_wire::{
    HeaderRecord, RecordReader, RecordWriter, StatusCode, StatusRecord, WireLayout,
};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Host side of the helper channel over a Unix domain socket.
///
/// Each cycle accepts exactly one client. A data cycle writes the header,
/// sample block and labels, then reads the client's status; a status cycle
/// only reads a status.
pub struct ChannelHost {
    socket: UnixDomainSocket,
    layout: WireLayout,
}

impl ChannelHost {
    /// Bind the endpoint's socket. A stale socket file is replaced.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let socket = UnixDomainSocket::bind_endpoint(endpoint)?;
        Ok(Self {
            socket,
            layout: WireLayout::default(),
        })
    }

    pub fn with_layout(mut self, layout: WireLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn path(&self) -> &Path {
        self.socket.path()
    }

    /// Serve one data cycle and return the status the client sent back.
    ///
    /// Input the host cannot describe is refused before accepting: a
    /// sample or label count that disagrees with the shape yields
    /// `INPUT_PTR_NULL`, a block over capacity yields `BUFFER_OVERFLOW`.
    /// Neither touches the socket.
    pub fn serve_data<S: AsRef<str>>(
        &self,
        column_count: u32,
        row_count: u32,
        samples: &[f64],
        labels: &[S],
    ) -> Result<StatusRecord> {
        if let Some(refusal) = self.check_input(column_count, row_count, samples, labels.len()) {
            warn!(code = %refusal.code, "refusing to serve data");
            return Ok(refusal);
        }

        let mut stream = self.socket.accept()?;
        debug!(
            columns = column_count,
            rows = row_count,
            "serving data cycle"
        );

        let mut writer = RecordWriter::with_layout(&mut stream, self.layout);
        writer.write_header(&HeaderRecord::new(column_count, row_count))?;
        writer.write_samples(samples)?;
        writer.write_labels(labels)?;

        let status = RecordReader::with_layout(&mut stream, self.layout).read_status()?;
        info!(code = %status.code, "data cycle acknowledged");
        Ok(status)
    }

    /// Serve one status-only cycle.
    pub fn await_status(&self) -> Result<StatusRecord> {
        let mut stream = self.socket.accept()?;
        let status = RecordReader::with_layout(&mut stream, self.layout).read_status()?;
        info!(code = %status.code, "status received");
        Ok(status)
    }

    /// Serve a data cycle, then wait for the completion status.
    ///
    /// A failing status on the data cycle ends the session early and is
    /// returned as is.
    pub fn run_session<S: AsRef<str>>(
        &self,
        column_count: u32,
        row_count: u32,
        samples: &[f64],
        labels: &[S],
    ) -> Result<StatusRecord> {
        let ack = self.serve_data(column_count, row_count, samples, labels)?;
        if !ack.is_success() {
            return Ok(ack);
        }
        self.await_status()
    }

    fn check_input(
        &self,
        column_count: u32,
        row_count: u32,
        samples: &[f64],
        label_count: usize,
    ) -> Option<StatusRecord> {
        let declared = HeaderRecord::new(column_count, row_count).sample_count().ok();
        if declared != Some(samples.len()) || label_count != column_count as usize {
            return Some(StatusRecord::from_code(StatusCode::INPUT_PTR_NULL).with_context(
                format!(
                    "{} samples and {label_count} labels for {column_count}x{row_count}",
                    samples.len()
                ),
            ));
        }
        if self.layout.sample_block_len(samples.len()).is_err() {
            return Some(StatusRecord::from_code(StatusCode::BUFFER_OVERFLOW));
        }
        None
    }
}
