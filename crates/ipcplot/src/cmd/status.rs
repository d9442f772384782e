use ipcplot::wire::StatusRecord;
use ipcplot::ChannelClient;

use crate::cmd::StatusArgs;
use crate::exit::{channel_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.retry.client_config(&args.channel)?;
    let status = build_status(&args);

    ChannelClient::new(config)
        .send_status(status.clone())
        .map_err(|err| channel_error("status failed", err))?;

    print_status("status", &status, format);
    Ok(SUCCESS)
}

fn build_status(args: &StatusArgs) -> StatusRecord {
    let canonical = StatusRecord::from_code(args.code);
    StatusRecord::new(
        args.code,
        args.message.clone().unwrap_or(canonical.message),
        args.help_text.clone().unwrap_or(canonical.help),
        args.context.clone(),
    )
}
