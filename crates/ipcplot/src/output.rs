use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ipcplot::wire::StatusRecord;
use ipcplot::PlotData;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Csv,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SeriesOutput<'a> {
    label: &'a str,
    values: &'a [f64],
}

#[derive(Serialize)]
struct PlotOutput<'a> {
    columns: usize,
    rows: usize,
    series: Vec<SeriesOutput<'a>>,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    cycle: &'a str,
    code: u32,
    name: Option<&'static str>,
    message: &'a str,
    help: &'a str,
    context: &'a str,
    success: bool,
}

/// Render an assembled dataset.
pub fn render_plot(plot: &PlotData, format: OutputFormat) -> String {
    let dataset = plot.dataset();
    match format {
        OutputFormat::Json => {
            let out = PlotOutput {
                columns: dataset.column_count(),
                rows: dataset.row_count(),
                series: plot
                    .series()
                    .map(|(label, values)| SeriesOutput { label, values })
                    .collect(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(plot.labels().to_vec());
            for row in dataset.rows() {
                table.add_row(row.iter().map(f64::to_string).collect::<Vec<_>>());
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            let mut out = format!(
                "{} columns x {} rows",
                dataset.column_count(),
                dataset.row_count()
            );
            for (label, values) in plot.series() {
                let _ = write!(out, "\n{label}: {values:?}");
            }
            out
        }
        OutputFormat::Csv => {
            let mut out = csv_line(plot.labels().iter().map(String::as_str));
            for row in dataset.rows() {
                out.push('\n');
                out.push_str(&csv_line(row.iter().map(f64::to_string)));
            }
            out
        }
    }
}

/// Print the dataset to stdout, or write it to `dest` when given.
pub fn emit_plot(plot: &PlotData, format: OutputFormat, dest: Option<&Path>) -> std::io::Result<()> {
    let rendered = render_plot(plot, format);
    match dest {
        Some(path) => std::fs::write(path, rendered + "\n"),
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{rendered}")?;
            out.flush()
        }
    }
}

pub fn print_status(cycle: &str, status: &StatusRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                cycle,
                code: status.code.as_u32(),
                name: status.code.name(),
                message: &status.message,
                help: &status.help,
                context: &status.context,
                success: status.is_success(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CYCLE", "CODE", "MESSAGE", "CONTEXT"])
                .add_row(vec![
                    cycle.to_string(),
                    status.code.to_string(),
                    status.message.clone(),
                    status.context.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "cycle={} code={} message={:?} context={:?}",
                cycle, status.code, status.message, status.context
            );
        }
        OutputFormat::Csv => {
            println!(
                "{}",
                csv_line([
                    cycle.to_string(),
                    format!("0x{:08X}", status.code.as_u32()),
                    status.message.clone(),
                    status.context.clone(),
                ])
            );
        }
    }
}

fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| csv_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plot() -> PlotData {
        PlotData::assemble(
            2,
            3,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec!["A".to_string(), "B, volts".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn csv_is_row_major_with_quoted_labels() {
        let csv = render_plot(&sample_plot(), OutputFormat::Csv);
        assert_eq!(csv, "A,\"B, volts\"\n1,4\n2,5\n3,6");
    }

    #[test]
    fn json_lists_series_in_column_order() {
        let json = render_plot(&sample_plot(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["columns"], 2);
        assert_eq!(value["rows"], 3);
        assert_eq!(value["series"][1]["label"], "B, volts");
        assert_eq!(value["series"][1]["values"][2], 6.0);
    }

    #[test]
    fn table_has_one_row_per_sample_row() {
        let table = render_plot(&sample_plot(), OutputFormat::Table);
        assert!(table.contains("B, volts"));
        assert!(table.contains('6'));
    }

    #[test]
    fn emit_plot_writes_file() {
        let path = std::env::temp_dir().join(format!("ipcplot-emit-{}.csv", std::process::id()));
        emit_plot(&sample_plot(), OutputFormat::Csv, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("A,"));
        assert!(written.ends_with("3,6\n"));
        let _ = std::fs::remove_file(&path);
    }
}
