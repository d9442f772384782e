use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use ipcplot::transport::Endpoint;
use ipcplot::wire::{PointerWidth, StatusCode, WireLayout, DEFAULT_SAMPLE_CAPACITY};
use ipcplot::{ClientConfig, RetryPolicy};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod host;
pub mod plot;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Retrieve the host's dataset, print it, and send the completion status.
    Plot(PlotArgs),
    /// Send a single status record to the host.
    Status(StatusArgs),
    /// Serve a dataset to helper sessions (unix; for testing helpers).
    Host(HostArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Plot(args) => plot::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Host(args) => host::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutMode {
    /// Sample block padded to the host buffer capacity.
    Padded,
    /// Sample block of exactly columns x rows values.
    Exact,
}

/// Where the channel lives and how the record stream is laid out.
#[derive(Args, Debug, Clone)]
pub struct ChannelArgs {
    /// Channel identifier. Default: this process's PID, which the host
    /// learns when it spawns the helper.
    #[arg(long, value_name = "ID", conflicts_with = "pid")]
    pub id: Option<String>,
    /// Host process ID naming the channel.
    #[arg(long)]
    pub pid: Option<u32>,
    /// Directory holding channel sockets (unix).
    #[arg(long, value_name = "DIR", env = "IPCPLOT_CHANNEL_DIR")]
    pub channel_dir: Option<PathBuf>,
    /// Sample block layout.
    #[arg(long, value_enum, default_value = "padded")]
    pub layout: LayoutMode,
    /// Host buffer capacity in samples (padded layout).
    #[arg(long, default_value_t = DEFAULT_SAMPLE_CAPACITY)]
    pub capacity: usize,
    /// Host pointer width in bits.
    #[arg(long, default_value = "64", value_parser = ["32", "64"])]
    pub pointer_width: String,
}

impl ChannelArgs {
    pub fn endpoint(&self) -> Endpoint {
        let endpoint = match (&self.id, self.pid) {
            (Some(id), _) => Endpoint::new(id.clone()),
            (None, Some(pid)) => Endpoint::for_process(pid),
            (None, None) => Endpoint::for_current_process(),
        };
        match &self.channel_dir {
            Some(dir) => endpoint.with_directory(dir),
            None => endpoint,
        }
    }

    pub fn layout(&self) -> WireLayout {
        let pointer_width = if self.pointer_width == "32" {
            PointerWidth::Bits32
        } else {
            PointerWidth::Bits64
        };
        WireLayout {
            pointer_width,
            sample_capacity: match self.layout {
                LayoutMode::Padded => Some(self.capacity),
                LayoutMode::Exact => None,
            },
        }
    }
}

/// Busy-retry and stream timeout settings for client commands.
#[derive(Args, Debug, Clone)]
pub struct RetryArgs {
    /// Pause between attempts while the channel is busy (e.g. 500ms, 1s).
    #[arg(long, default_value = "500ms")]
    pub backoff: String,
    /// Give up after this many busy attempts. 0 retries forever.
    #[arg(long, default_value_t = 120)]
    pub max_busy_retries: u32,
    /// Per read/write timeout once connected (e.g. 30s). Omit to block.
    #[arg(long)]
    pub io_timeout: Option<String>,
}

impl RetryArgs {
    pub fn client_config(&self, channel: &ChannelArgs) -> CliResult<ClientConfig> {
        let backoff = parse_duration(&self.backoff)?;
        let retry = match self.max_busy_retries {
            0 => RetryPolicy::unbounded(backoff),
            max => RetryPolicy::bounded(backoff, max),
        };
        let io_timeout = self.io_timeout.as_deref().map(parse_duration).transpose()?;

        Ok(ClientConfig::new(channel.endpoint())
            .with_retry(retry)
            .with_layout(channel.layout())
            .with_io_timeout(io_timeout))
    }
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    #[command(flatten)]
    pub channel: ChannelArgs,
    #[command(flatten)]
    pub retry: RetryArgs,
    /// Write the dataset to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub channel: ChannelArgs,
    #[command(flatten)]
    pub retry: RetryArgs,
    /// Status code: a name (COMPLETE, BUFFER_OVERFLOW, ...) or a number.
    #[arg(long, default_value = "COMPLETE")]
    pub code: StatusCode,
    /// Message text. Default: the code's canonical message.
    #[arg(long)]
    pub message: Option<String>,
    /// Help text. Default: the code's canonical help.
    #[arg(long = "help-text")]
    pub help_text: Option<String>,
    /// Free-form context.
    #[arg(long, default_value = "")]
    pub context: String,
}

#[derive(Args, Debug)]
pub struct HostArgs {
    #[command(flatten)]
    pub channel: ChannelArgs,
    /// One column as LABEL=v1,v2,... (repeat per column, all the same length).
    #[arg(long = "series", value_name = "LABEL=VALUES", required = true)]
    pub series: Vec<String>,
    /// Serve this many sessions, then exit. 0 serves until interrupted.
    #[arg(long, default_value_t = 1)]
    pub sessions: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
