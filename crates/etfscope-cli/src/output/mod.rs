pub mod chart;
pub mod dashboard;

use std::io::{self, Write};

use etfscope_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Finished command: the envelope plus optional human-readable body lines.
#[derive(Debug)]
pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub table: Vec<String>,
}

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    write_output(&mut writer, output, format, pretty)?;
    writer.flush()?;
    Ok(())
}

pub fn write_output<W: Write>(
    writer: &mut W,
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&output.envelope)?
            } else {
                serde_json::to_string(&output.envelope)?
            };
            writeln!(writer, "{payload}")?;
        }
        OutputFormat::Table => write_table(writer, output)?,
    }

    Ok(())
}

fn write_table<W: Write>(writer: &mut W, output: &CommandOutput) -> Result<(), CliError> {
    let envelope = &output.envelope;
    writeln!(writer, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(writer, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(
        writer,
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|source| source.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    writeln!(writer, "latency_ms  : {}", envelope.meta.latency_ms)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(writer, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(writer, "  - {warning}")?;
        }
    }

    writeln!(writer)?;
    if output.table.is_empty() {
        for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
            writeln!(writer, "{line}")?;
        }
    } else {
        for line in &output.table {
            writeln!(writer, "{line}")?;
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "errors:")?;
        for error in &envelope.errors {
            writeln!(writer, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use etfscope_core::{EnvelopeError, EnvelopeMeta, SourceId};
    use serde_json::json;

    use super::*;

    fn output(table: Vec<String>) -> CommandOutput {
        let meta = EnvelopeMeta::new("request-12345", vec![SourceId::File, SourceId::Api], 7)
            .expect("valid meta");
        let envelope = Envelope::with_errors(
            meta,
            json!({ "nav": 10.0 }),
            vec![EnvelopeError::not_found("Gamma")],
        )
        .expect("valid envelope");
        CommandOutput { envelope, table }
    }

    fn written(output: &CommandOutput, format: OutputFormat, pretty: bool) -> String {
        let mut buffer = Vec::new();
        write_output(&mut buffer, output, format, pretty).expect("writes");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn json_output_is_a_single_envelope_line() {
        let text = written(&output(Vec::new()), OutputFormat::Json, false);

        assert_eq!(text.lines().count(), 1);
        let value: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["meta"]["source_chain"], json!(["file", "api"]));
        assert_eq!(value["errors"][0]["code"], "lookup.not_found");
    }

    #[test]
    fn table_prefers_rendered_lines_over_data() {
        let text = written(
            &output(vec![String::from("== Alpha ETF (000001) ==")]),
            OutputFormat::Table,
            false,
        );

        assert!(text.contains("sources     : file,api"));
        assert!(text.contains("== Alpha ETF (000001) =="));
        assert!(!text.contains("\"nav\""));
        assert!(text.contains("  - lookup.not_found: no ETF matches 'Gamma'"));
    }

    #[test]
    fn table_falls_back_to_pretty_data() {
        let text = written(&output(Vec::new()), OutputFormat::Table, false);
        assert!(text.contains("\"nav\": 10.0"));
    }
}
