use serde::Serialize;

use etfscope_core::{SourceConfig, SourceId};

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceEntry {
    role: &'static str,
    id: SourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    mock: bool,
    timeout_ms: u64,
    authenticated: bool,
    sources: Vec<SourceEntry>,
}

pub fn run(config: &SourceConfig) -> Result<CommandResult, CliError> {
    let sources = if config.is_mock() {
        ["reference", "market_data", "returns"]
            .into_iter()
            .map(|role| SourceEntry {
                role,
                id: SourceId::Fixture,
                location: None,
            })
            .collect()
    } else {
        let mut sources = Vec::with_capacity(3);
        if let Some(reference) = config.reference() {
            sources.push(SourceEntry {
                role: "reference",
                id: reference.source_id(),
                location: Some(reference.to_string()),
            });
        }
        for role in ["market_data", "returns"] {
            sources.push(SourceEntry {
                role,
                id: SourceId::Api,
                location: Some(config.api_base_url().to_owned()),
            });
        }
        sources
    };

    let table = sources
        .iter()
        .map(|entry| {
            format!(
                "{:<12} {:<8} {}",
                entry.role,
                entry.id.as_str(),
                entry.location.as_deref().unwrap_or("built-in")
            )
        })
        .collect();

    let data = serde_json::to_value(SourcesResponseData {
        mock: config.is_mock(),
        timeout_ms: config.timeout_ms(),
        authenticated: config.has_api_key(),
        sources,
    })?;

    let mut result = CommandResult::ok(data, config.source_chain()).with_table(table);
    if !config.is_mock() && config.reference().is_none() {
        result = result.with_warning(
            "no reference data configured; lookup needs --reference, ETFSCOPE_REFERENCE or --mock",
        );
    }
    Ok(result)
}
