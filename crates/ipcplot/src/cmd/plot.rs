use ipcplot::pipeline::{self, Outcome};
use ipcplot::{ChannelClient, PlotData};
use tracing::{info, warn};

use crate::cmd::PlotArgs;
use crate::exit::{pipeline_error, CliResult, SUCCESS};
use crate::output::{emit_plot, OutputFormat};

pub fn run(args: PlotArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.retry.client_config(&args.channel)?;
    let client = ChannelClient::new(config);
    let dest = args.output.as_deref();

    let mut sink = |plot: &PlotData| emit_plot(plot, format, dest);
    let outcome =
        pipeline::run(&client, &mut sink).map_err(|err| pipeline_error("plot failed", err))?;

    match outcome {
        Outcome::NothingToPlot => {
            info!(endpoint = %client.config().endpoint, "no host data, exiting");
        }
        Outcome::Plotted {
            columns,
            rows,
            status_delivered,
        } => {
            if !status_delivered {
                warn!("host did not receive the completion status");
            }
            info!(columns, rows, output = ?dest, "plot done");
        }
    }
    Ok(SUCCESS)
}
