use crate::cmd::HostArgs;
use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

/// Column-major samples and one label per column.
#[derive(Debug, PartialEq)]
#[cfg_attr(not(unix), allow(dead_code))]
struct Series {
    columns: u32,
    rows: u32,
    samples: Vec<f64>,
    labels: Vec<String>,
}

#[cfg(not(unix))]
pub fn run(_args: HostArgs, _format: OutputFormat) -> CliResult<i32> {
    Err(CliError::new(
        USAGE,
        "host requires unix domain sockets on this platform",
    ))
}

#[cfg(unix)]
pub fn run(args: HostArgs, format: OutputFormat) -> CliResult<i32> {
    use ipcplot::channel::ChannelHost;
    use tracing::info;

    use crate::exit::{channel_error, HOST_REPORTED_ERROR, SUCCESS};
    use crate::output::print_status;

    let series = parse_series(&args.series)?;
    let endpoint = args.channel.endpoint();
    let host = ChannelHost::bind(&endpoint)
        .map_err(|err| channel_error("bind failed", err))?
        .with_layout(args.channel.layout());
    install_ctrlc_handler(host.path().to_path_buf())?;

    let mut served = 0usize;
    let mut exit_code = SUCCESS;
    while args.sessions == 0 || served < args.sessions {
        let ack = host
            .serve_data(series.columns, series.rows, &series.samples, &series.labels)
            .map_err(|err| channel_error("data cycle failed", err))?;
        print_status("data", &ack, format);

        if ack.is_success() {
            let completion = host
                .await_status()
                .map_err(|err| channel_error("status cycle failed", err))?;
            print_status("completion", &completion, format);
            if !completion.is_success() {
                exit_code = HOST_REPORTED_ERROR;
            }
        } else {
            exit_code = HOST_REPORTED_ERROR;
        }

        served += 1;
        info!(served, "session finished");
    }

    Ok(exit_code)
}

#[cfg_attr(not(unix), allow(dead_code))]
fn parse_series(specs: &[String]) -> CliResult<Series> {
    let mut labels = Vec::with_capacity(specs.len());
    let mut samples = Vec::new();
    let mut rows = None;

    for spec in specs {
        let (label, values) = spec.split_once('=').ok_or_else(|| {
            CliError::new(USAGE, format!("series must be LABEL=VALUES, got {spec:?}"))
        })?;
        let column = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    CliError::new(USAGE, format!("invalid sample {value:?} in series {label:?}"))
                })
            })
            .collect::<CliResult<Vec<_>>>()?;

        match rows {
            None => rows = Some(column.len()),
            Some(expected) if expected != column.len() => {
                return Err(CliError::new(
                    USAGE,
                    format!(
                        "series {label:?} has {} values, expected {expected}",
                        column.len()
                    ),
                ));
            }
            Some(_) => {}
        }
        labels.push(label.to_string());
        samples.extend(column);
    }

    let too_large = |what: &str| CliError::new(USAGE, format!("too many {what}"));
    Ok(Series {
        columns: u32::try_from(labels.len()).map_err(|_| too_large("series"))?,
        rows: u32::try_from(rows.unwrap_or(0)).map_err(|_| too_large("rows"))?,
        samples,
        labels,
    })
}

/// Remove the socket on Ctrl-C; `accept` cannot be interrupted otherwise.
#[cfg(unix)]
fn install_ctrlc_handler(socket: std::path::PathBuf) -> CliResult<()> {
    ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&socket);
        std::process::exit(130);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
