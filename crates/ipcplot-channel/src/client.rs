use std::sync::Arc;
use std::thread;

use ipcplot_transport::{EndpointFault, TransportError};
use ipcplot_wire::{RecordReader, RecordWriter, StatusRecord};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::connector::{Connector, SystemConnector};
use crate::cycle::{Cycle, CycleKind, CycleState};
use crate::error::{ChannelError, Result};

/// Decoded result of one data cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub column_count: u32,
    pub row_count: u32,
    /// Column-major, exactly `column_count * row_count` values.
    pub samples: Vec<f64>,
    /// One per column, padding stripped.
    pub labels: Vec<String>,
}

impl Transfer {
    pub fn into_parts(self) -> (u32, u32, Vec<f64>, Vec<String>) {
        (self.column_count, self.row_count, self.samples, self.labels)
    }
}

/// Client side of the helper channel.
///
/// Holds no connection between calls: every operation opens a fresh
/// channel, runs one cycle on a dedicated worker thread, and closes it.
pub struct ChannelClient<C = SystemConnector> {
    config: Arc<ClientConfig>,
    connector: Arc<C>,
}

impl ChannelClient<SystemConnector> {
    /// Client using the platform transport.
    pub fn new(config: ClientConfig) -> Self {
        let connector = SystemConnector::new(config.io_timeout);
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> ChannelClient<C> {
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            config: Arc::new(config),
            connector: Arc::new(connector),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a data cycle: header, samples, labels, then acknowledge.
    ///
    /// Blocks until the cycle worker finishes.
    pub fn retrieve_data(&self) -> Result<Transfer> {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);
        run_on_worker(CycleKind::Retrieve, move || {
            retrieve_cycle(connector.as_ref(), &config)
        })
    }

    /// Run a status-only cycle carrying `status`.
    ///
    /// Blocks until the cycle worker finishes.
    pub fn send_status(&self, status: StatusRecord) -> Result<()> {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);
        run_on_worker(CycleKind::Status, move || {
            status_cycle(connector.as_ref(), &config, &status)
        })
    }

    /// Async variant of [`retrieve_data`](Self::retrieve_data).
    #[cfg(feature = "async")]
    pub async fn retrieve_data_async(&self) -> Result<Transfer> {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);
        tokio::task::spawn_blocking(move || retrieve_cycle(connector.as_ref(), &config))
            .await
            .map_err(|_| ChannelError::WorkerPanicked)?
    }

    /// Async variant of [`send_status`](Self::send_status).
    #[cfg(feature = "async")]
    pub async fn send_status_async(&self, status: StatusRecord) -> Result<()> {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);
        tokio::task::spawn_blocking(move || status_cycle(connector.as_ref(), &config, &status))
            .await
            .map_err(|_| ChannelError::WorkerPanicked)?
    }
}

fn run_on_worker<T, F>(kind: CycleKind, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("ipcplot-{kind}"))
        .spawn(work)
        .map_err(ChannelError::WorkerSpawn)?;
    handle.join().map_err(|_| ChannelError::WorkerPanicked)?
}

fn retrieve_cycle<C: Connector>(connector: &C, config: &ClientConfig) -> Result<Transfer> {
    run_cycle(connector, config, CycleKind::Retrieve, |stream| {
        let mut reader = RecordReader::with_layout(&mut *stream, config.layout);
        let header = reader.read_header()?;
        let samples = reader.read_samples(&header)?;
        let labels = reader.read_labels(&header)?;
        if reader.buffered() > 0 {
            warn!(
                bytes = reader.buffered(),
                "ignoring bytes after label block"
            );
        }

        RecordWriter::with_layout(&mut *stream, config.layout)
            .write_status(&StatusRecord::ack())?;

        Ok(Transfer {
            column_count: header.column_count,
            row_count: header.row_count,
            samples,
            labels,
        })
    })
}

fn status_cycle<C: Connector>(
    connector: &C,
    config: &ClientConfig,
    status: &StatusRecord,
) -> Result<()> {
    run_cycle(connector, config, CycleKind::Status, |stream| {
        debug!(code = %status.code, "writing status");
        RecordWriter::with_layout(stream, config.layout).write_status(status)?;
        Ok(())
    })
}

/// Connect (retrying while busy), run `transfer`, and close.
fn run_cycle<C, T, F>(
    connector: &C,
    config: &ClientConfig,
    kind: CycleKind,
    transfer: F,
) -> Result<T>
where
    C: Connector,
    F: FnOnce(&mut C::Stream) -> Result<T>,
{
    let endpoint = &config.endpoint;
    let mut cycle = Cycle::new(kind);

    let mut stream = loop {
        cycle.advance(CycleState::Connecting);
        let err = match connector.connect(endpoint) {
            Ok(stream) => break stream,
            Err(err) => err,
        };

        match err.fault() {
            EndpointFault::Busy if config.retry.allows_retry_after(cycle.attempts()) => {
                warn!(
                    cycle = %kind,
                    %endpoint,
                    attempt = cycle.attempts(),
                    backoff_ms = config.retry.backoff.as_millis() as u64,
                    "channel busy, retrying"
                );
                cycle.advance(CycleState::Retrying);
                thread::sleep(config.retry.backoff);
            }
            EndpointFault::Busy => {
                cycle.advance(CycleState::Failed);
                warn!(
                    cycle = %kind,
                    %endpoint,
                    attempts = cycle.attempts(),
                    "channel busy, giving up"
                );
                return Err(ChannelError::EndpointBusy {
                    endpoint: endpoint.path().to_path_buf(),
                    attempts: cycle.attempts(),
                });
            }
            EndpointFault::NotFound => {
                cycle.advance(CycleState::Failed);
                warn!(cycle = %kind, %endpoint, "channel not found, nothing to do");
                return Err(ChannelError::EndpointNotFound {
                    endpoint: endpoint.path().to_path_buf(),
                });
            }
            EndpointFault::Severed => {
                cycle.advance(CycleState::Failed);
                warn!(cycle = %kind, %endpoint, error = %err, "channel severed while connecting");
                return Err(match err {
                    TransportError::Connect { source, .. } | TransportError::Io(source) => {
                        ChannelError::EndpointSevered(source)
                    }
                    other => ChannelError::TransportOther(other),
                });
            }
            EndpointFault::Other => {
                cycle.advance(CycleState::Failed);
                warn!(cycle = %kind, %endpoint, error = %err, "channel connect failed");
                return Err(ChannelError::TransportOther(err));
            }
        }
    };

    cycle.advance(CycleState::Transferring);
    match transfer(&mut stream) {
        Ok(value) => {
            cycle.advance(CycleState::Completed);
            info!(cycle = %kind, %endpoint, attempts = cycle.attempts(), "channel cycle complete");
            Ok(value)
        }
        Err(err) => {
            cycle.advance(CycleState::Failed);
            warn!(cycle = %kind, %endpoint, error = %err, "channel cycle failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::{Cursor, Read, Write};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use ipcplot_transport::Endpoint;
    use ipcplot_wire::{HeaderRecord, StatusCode, WireLayout};

    use super::*;
    use crate::config::RetryPolicy;

    /// Byte image of a host data transfer.
    fn wire_for(columns: u32, rows: u32, samples: &[f64], labels: &[&str]) -> Vec<u8> {
        let mut writer = RecordWriter::with_layout(Vec::new(), WireLayout::exact());
        writer.write_header(&HeaderRecord::new(columns, rows)).unwrap();
        writer.write_samples(samples).unwrap();
        writer.write_labels(labels).unwrap();
        writer.into_inner()
    }

    enum Step {
        Fault(EndpointFault),
        Stream { input: Vec<u8>, fail_writes: bool },
    }

    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Arc<Mutex<Vec<u8>>>,
        fail_writes: bool,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.fail_writes {
                return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
            }
            self.output.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedConnector {
        script: Mutex<VecDeque<Step>>,
        attempts: AtomicU32,
        output: Arc<Mutex<Vec<u8>>>,
    }

    impl ScriptedConnector {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
                ..Self::default()
            })
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }

        fn written(&self) -> Vec<u8> {
            self.output.lock().unwrap().clone()
        }
    }

    impl Connector for ScriptedConnector {
        type Stream = MockStream;

        fn connect(&self, endpoint: &Endpoint) -> std::result::Result<MockStream, TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(Step::Stream { input, fail_writes }) => Ok(MockStream {
                    input: Cursor::new(input),
                    output: Arc::clone(&self.output),
                    fail_writes,
                }),
                Some(Step::Fault(fault)) => Err(fault_error(endpoint, fault)),
                None => Err(fault_error(endpoint, EndpointFault::NotFound)),
            }
        }
    }

    fn fault_error(endpoint: &Endpoint, fault: EndpointFault) -> TransportError {
        let kind = match fault {
            EndpointFault::NotFound => std::io::ErrorKind::NotFound,
            EndpointFault::Busy => std::io::ErrorKind::WouldBlock,
            EndpointFault::Severed => std::io::ErrorKind::BrokenPipe,
            EndpointFault::Other => std::io::ErrorKind::PermissionDenied,
        };
        TransportError::Connect {
            path: endpoint.path().to_path_buf(),
            fault,
            source: std::io::Error::from(kind),
        }
    }

    fn config(retry: RetryPolicy) -> ClientConfig {
        ClientConfig::new(Endpoint::new("4242"))
            .with_layout(WireLayout::exact())
            .with_retry(retry)
    }

    fn default_client(
        connector: &Arc<ScriptedConnector>,
    ) -> ChannelClient<Arc<ScriptedConnector>> {
        ChannelClient::with_connector(config(RetryPolicy::default()), Arc::clone(connector))
    }

    fn stream(input: Vec<u8>) -> Step {
        Step::Stream {
            input,
            fail_writes: false,
        }
    }

    #[test]
    fn retrieve_decodes_and_acknowledges() {
        let wire = wire_for(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["A", "B"]);
        let connector = ScriptedConnector::new(vec![stream(wire)]);
        let client = default_client(&connector);

        let transfer = client.retrieve_data().unwrap();
        assert_eq!(transfer.column_count, 2);
        assert_eq!(transfer.row_count, 3);
        assert_eq!(transfer.samples, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(transfer.labels, vec!["A", "B"]);
        assert_eq!(connector.attempts(), 1);

        let written = connector.written();
        assert_eq!(written.len(), StatusRecord::WIRE_SIZE);
        let status = StatusRecord::decode(&written).unwrap();
        assert_eq!(status.code, StatusCode::ACK);
    }

    #[test]
    fn send_status_writes_single_record() {
        let connector = ScriptedConnector::new(vec![stream(Vec::new())]);
        let client = default_client(&connector);

        client
            .send_status(StatusRecord::complete().with_context("plot finished"))
            .unwrap();

        let status = StatusRecord::decode(&connector.written()).unwrap();
        assert_eq!(status.code, StatusCode::COMPLETE);
        assert_eq!(status.context, "plot finished");
    }

    #[test]
    fn busy_retries_once_per_response_with_backoff() {
        let backoff = Duration::from_millis(20);
        let connector = ScriptedConnector::new(vec![
            Step::Fault(EndpointFault::Busy),
            Step::Fault(EndpointFault::Busy),
            Step::Fault(EndpointFault::Busy),
            stream(Vec::new()),
        ]);
        let client = ChannelClient::with_connector(
            config(RetryPolicy::unbounded(backoff)),
            Arc::clone(&connector),
        );

        let started = Instant::now();
        client.send_status(StatusRecord::complete()).unwrap();
        assert_eq!(connector.attempts(), 4);
        assert!(started.elapsed() >= backoff * 3);
    }

    #[test]
    fn busy_ceiling_surfaces_endpoint_busy() {
        let connector = ScriptedConnector::new(vec![
            Step::Fault(EndpointFault::Busy),
            Step::Fault(EndpointFault::Busy),
            Step::Fault(EndpointFault::Busy),
            stream(Vec::new()),
        ]);
        let client = ChannelClient::with_connector(
            config(RetryPolicy::bounded(Duration::from_millis(1), 2)),
            Arc::clone(&connector),
        );

        let err = client.send_status(StatusRecord::complete()).unwrap_err();
        assert!(matches!(err, ChannelError::EndpointBusy { attempts: 2, .. }));
        assert_eq!(connector.attempts(), 2);
    }

    #[test]
    fn not_found_stops_after_one_attempt() {
        let connector = ScriptedConnector::new(vec![Step::Fault(EndpointFault::NotFound)]);
        let client = default_client(&connector);

        let err = client.retrieve_data().unwrap_err();
        assert!(err.is_benign());
        let expected = Endpoint::new("4242");
        assert!(matches!(
            err,
            ChannelError::EndpointNotFound { ref endpoint } if endpoint.as_path() == expected.path()
        ));
        assert_eq!(connector.attempts(), 1);
    }

    #[test]
    fn severed_on_connect_stops_after_one_attempt() {
        let connector = ScriptedConnector::new(vec![
            Step::Fault(EndpointFault::Severed),
            stream(Vec::new()),
        ]);
        let client = default_client(&connector);

        let err = client.retrieve_data().unwrap_err();
        assert!(matches!(err, ChannelError::EndpointSevered(_)));
        assert_eq!(connector.attempts(), 1);
    }

    #[test]
    fn severed_during_status_write_is_not_retried() {
        let connector = ScriptedConnector::new(vec![
            Step::Stream {
                input: Vec::new(),
                fail_writes: true,
            },
            stream(Vec::new()),
        ]);
        let client = default_client(&connector);

        let err = client.send_status(StatusRecord::complete()).unwrap_err();
        assert!(matches!(err, ChannelError::EndpointSevered(_)));
        assert_eq!(connector.attempts(), 1);
    }

    #[test]
    fn other_connect_errors_are_not_retried() {
        let connector = ScriptedConnector::new(vec![Step::Fault(EndpointFault::Other)]);
        let client = default_client(&connector);

        let err = client.send_status(StatusRecord::complete()).unwrap_err();
        assert!(matches!(err, ChannelError::TransportOther(_)));
        assert_eq!(connector.attempts(), 1);
    }

    #[test]
    fn short_sample_block_is_decode_incomplete_and_not_acknowledged() {
        let mut wire = wire_for(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["A", "B"]);
        wire.truncate(24 + 5 * 8);
        let connector = ScriptedConnector::new(vec![stream(wire)]);
        let client = default_client(&connector);

        let err = client.retrieve_data().unwrap_err();
        assert!(matches!(err, ChannelError::DecodeIncomplete(_)));
        assert!(connector.written().is_empty(), "no status after a failed decode");
    }

    #[test]
    fn huge_declared_label_count_is_decode_incomplete() {
        let mut writer = RecordWriter::with_layout(Vec::new(), WireLayout::exact());
        writer.write_header(&HeaderRecord::new(u32::MAX, 0)).unwrap();
        let connector = ScriptedConnector::new(vec![stream(writer.into_inner())]);
        let client = default_client(&connector);

        let err = client.retrieve_data().unwrap_err();
        assert!(matches!(err, ChannelError::DecodeIncomplete(_)));
        assert!(connector.written().is_empty());
    }

    #[test]
    fn missing_label_is_decode_incomplete() {
        let mut wire = wire_for(2, 1, &[1.0, 2.0], &["A", "B"]);
        wire.truncate(wire.len() - 128);
        let connector = ScriptedConnector::new(vec![stream(wire)]);
        let client = default_client(&connector);

        let err = client.retrieve_data().unwrap_err();
        assert!(matches!(err, ChannelError::DecodeIncomplete(_)));
    }

    #[test]
    fn padded_block_over_capacity_is_malformed() {
        let layout = WireLayout {
            sample_capacity: Some(4),
            ..WireLayout::default()
        };
        let mut writer = RecordWriter::with_layout(Vec::new(), layout);
        writer
            .write_header(&HeaderRecord::new(5, 1))
            .unwrap();
        let connector = ScriptedConnector::new(vec![stream(writer.into_inner())]);
        let client = ChannelClient::with_connector(
            config(RetryPolicy::default()).with_layout(layout),
            Arc::clone(&connector),
        );

        let err = client.retrieve_data().unwrap_err();
        assert!(matches!(err, ChannelError::Wire(_)));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_retrieve_matches_blocking() {
        let wire = wire_for(1, 2, &[0.5, 1.5], &["T"]);
        let connector = ScriptedConnector::new(vec![stream(wire), stream(Vec::new())]);
        let client = default_client(&connector);

        let transfer = client.retrieve_data_async().await.unwrap();
        assert_eq!(transfer.into_parts(), (1, 2, vec![0.5, 1.5], vec!["T".to_string()]));
        client.send_status_async(StatusRecord::complete()).await.unwrap();
        assert_eq!(connector.attempts(), 2);
    }
}
