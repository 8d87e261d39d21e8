use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use scorepipe_peer::{SessionEnd, SessionReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct MessageOutput<'a> {
    index: usize,
    count: usize,
    values: &'a [String],
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    turns: u64,
    unknown: u64,
    end: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Print decoded messages, one row per message.
pub fn print_messages(messages: &[Vec<String>], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (index, values) in messages.iter().enumerate() {
                let out = MessageOutput {
                    index,
                    count: values.len(),
                    values,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let width = messages.iter().map(Vec::len).max().unwrap_or(0);
            let mut header = vec!["#".to_string()];
            header.extend((0..width).map(|i| format!("VALUE {i}")));

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header);
            for (index, values) in messages.iter().enumerate() {
                let mut row = vec![index.to_string()];
                row.extend(values.iter().cloned());
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, values) in messages.iter().enumerate() {
                let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
                println!("{index}: [{}]", quoted.join(", "));
            }
        }
        OutputFormat::Raw => {
            for values in messages {
                println!("{}", values.join("\t"));
            }
        }
    }
}

pub fn print_session(report: &SessionReport, format: OutputFormat) {
    let (end, reason) = match &report.end {
        SessionEnd::Closed => ("closed", None),
        SessionEnd::Desync(reason) => ("desync", Some(reason.as_str())),
    };

    match format {
        OutputFormat::Json => {
            let out = SessionOutput {
                turns: report.turns,
                unknown: report.unknown,
                end,
                reason,
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
                .set_header(vec!["TURNS", "UNKNOWN", "END", "REASON"])
                .add_row(vec![
                    report.turns.to_string(),
                    report.unknown.to_string(),
                    end.to_string(),
                    reason.unwrap_or_default().to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => match reason {
            Some(reason) => println!(
                "turns={} unknown={} end={end} reason={reason}",
                report.turns, report.unknown
            ),
            None => println!("turns={} unknown={} end={end}", report.turns, report.unknown),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
