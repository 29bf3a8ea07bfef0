//! Version 1 of the configuration file format.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use query_engine_metadata::metadata;

use crate::connection_settings::{AgentSettings, DatabaseConnectionSettings, ModelConnectionSettings};
use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};

pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
pub enum Version {
    #[serde(rename = "1")]
    This,
}

/// The configuration as it is written on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    /// Which version of the configuration format are we using
    pub version: Version,
    /// Pointer to the JSON schema of this file, for editors.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default = "DatabaseConnectionSettings::empty")]
    pub connection_settings: DatabaseConnectionSettings,
    #[serde(default = "ModelConnectionSettings::empty")]
    pub model: ModelConnectionSettings,
    #[serde(default, skip_serializing_if = "AgentSettings::is_default")]
    pub agent: AgentSettings,
    #[serde(default)]
    pub metadata: metadata::Metadata,
}

impl ParsedConfiguration {
    pub fn initial() -> Self {
        ParsedConfiguration::empty()
    }

    pub fn empty() -> Self {
        Self {
            version: Version::This,
            schema: Some(CONFIGURATION_JSONSCHEMA_FILENAME.to_string()),
            connection_settings: DatabaseConnectionSettings::empty(),
            model: ModelConnectionSettings::empty(),
            agent: AgentSettings::default(),
            metadata: metadata::Metadata::default(),
        }
    }
}

/// Parse the configuration file found in `configuration_dir`. A directory without
/// a configuration file yields the initial configuration.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents = match fs::read_to_string(&configuration_file).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(
                file = %configuration_file.display(),
                "no configuration file found, using the initial configuration"
            );
            return Ok(ParsedConfiguration::initial());
        }
        Err(source) => {
            return Err(ParseConfigurationError::IoError {
                file_path: configuration_file,
                source,
            })
        }
    };

    serde_json::from_str(&configuration_file_contents).map_err(|error| {
        ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        }
    })
}

/// Write the parsed configuration, and the JSON schema describing it, into a
/// directory on disk.
pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().join(CONFIGURATION_FILENAME);
    let schema_file = out_dir.as_ref().join(CONFIGURATION_JSONSCHEMA_FILENAME);
    fs::create_dir_all(out_dir.as_ref()).await?;

    fs::write(
        configuration_file,
        serde_json::to_string_pretty(&parsed_config)? + "\n",
    )
    .await?;

    fs::write(
        schema_file,
        serde_json::to_string_pretty(&crate::configuration::generate_latest_schema())? + "\n",
    )
    .await?;

    Ok(())
}
