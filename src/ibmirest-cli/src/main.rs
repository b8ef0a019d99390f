use anyhow::{Context, Result};
use clap::Parser;
use ibmirest_core::{ConnectionConfig, CsvOptions, Table};
use ibmirest_rs::Client;
use std::path::Path;

mod args;
mod telemetry;

use args::{Cli, Command, Format, OutputArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = telemetry::init_telemetry(cli.log_dir.as_deref())?;

    let config = build_config(&cli)?;
    tracing::debug!(
        "Connecting to {} (http_auth={}, base64={}, insecure={}, timeout_ms={})",
        config.base_url,
        config.use_http_credentials,
        config.base64_encode_auth,
        config.allow_invalid_cert,
        config.timeout_ms
    );

    let mut client = Client::new(config).context("Invalid connection settings")?;

    match cli.command {
        Command::Sql { query, output } => {
            let table = client.execute_query(&query).await?;
            tracing::info!("{} rows, {} columns", table.row_count(), table.column_count());
            emit(table, &output)?;
        }
        Command::Exec { statement } => {
            client.execute_non_query(&statement).await?;
            println!("{}", client.last_json_response());
        }
        Command::Cl { command } => {
            client.execute_command(&command).await?;
            println!("{}", client.last_json_response());
        }
        Command::Qsh { command } => {
            client.execute_qsh(&command).await?;
            println!("{}", client.last_json_response());
        }
        Command::DqSend {
            library,
            object,
            data,
        } => {
            client.send_data_queue(&library, &object, &data).await?;
            tracing::info!("Sent {} bytes to {}/{}", data.len(), library, object);
        }
        Command::DqPop { library, object } => {
            match client.pop_data_queue(&library, &object).await? {
                Some(value) => println!("{}", value),
                None => tracing::info!("Data queue {}/{} is empty", library, object),
            }
        }
        Command::Call { endpoint, body } => {
            let body: serde_json::Value =
                serde_json::from_str(&body).context("Request body must be valid JSON")?;
            let text = client.execute_endpoint(&endpoint, &body).await?;
            println!("{}", text);
        }
    }

    Ok(())
}

/// Config file (if present) with command-line overrides on top. A config
/// file that exists but cannot be loaded is an error.
fn build_config(cli: &Cli) -> Result<ConnectionConfig> {
    let mut config = if Path::new(&cli.config).exists() {
        ConnectionConfig::load(&cli.config)
            .with_context(|| format!("Failed to load config file {}", cli.config))?
    } else {
        tracing::warn!("{} not found, using defaults", cli.config);
        ConnectionConfig::default()
    };

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.user = user.clone();
    }
    if let Some(password) = &cli.password {
        config.password = password.clone();
    }
    if cli.http_auth {
        config.use_http_credentials = true;
    }
    if cli.raw_auth {
        config.base64_encode_auth = false;
    }
    if cli.insecure {
        config.allow_invalid_cert = true;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    Ok(config)
}

fn render(table: &Table, output: &OutputArgs) -> Result<String> {
    let text = match output.format {
        Format::Csv => table.to_csv(&csv_options(output)),
        Format::Xml => table.to_xml(&output.table_name, output.schema),
        Format::Json => table.to_json(output.pretty)?,
        Format::List => {
            let mut text = String::new();
            for row in table.rows_as_list(!output.no_header) {
                text.push_str(&serde_json::to_string(&row)?);
                text.push('\n');
            }
            text
        }
    };
    Ok(text)
}

fn emit(table: &Table, output: &OutputArgs) -> Result<()> {
    let Some(path) = &output.output else {
        print!("{}", render(table, output)?);
        return Ok(());
    };

    match output.format {
        Format::Csv => table.write_csv(path, &csv_options(output), output.replace)?,
        Format::Xml => table.write_xml(path, &output.table_name, output.schema, output.replace)?,
        Format::Json => table.write_json(path, output.pretty, output.replace)?,
        Format::List => ibmirest_core::export::write_output(path, &render(table, output)?, output.replace)?,
    }
    tracing::info!("Wrote {:?}", path);
    Ok(())
}

fn csv_options(output: &OutputArgs) -> CsvOptions {
    CsvOptions {
        separator: output.separator.clone(),
        quote: output.quote.clone(),
        include_header: !output.no_header,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_config(path: &Path, extra: &[&str]) -> Cli {
        let mut argv = vec!["ibmirest", "--config", path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["cl", "DSPLIB QGPL"]);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli_with_config(&dir.path().join("absent.json"), &["--timeout-ms", "500"]);

        let config = build_config(&cli).unwrap();
        assert_eq!(config.base_url, "http://localhost:3030");
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, "{ not json").unwrap();
        assert!(build_config(&cli_with_config(&malformed, &[])).is_err());

        let bad_url = dir.path().join("bad_url.json");
        std::fs::write(&bad_url, r#"{"base_url": "ftp://ibmi"}"#).unwrap();
        assert!(build_config(&cli_with_config(&bad_url, &[])).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "https://ibmi:3030", "user": "DEV"}"#).unwrap();

        let cli = cli_with_config(&path, &["--user", "PROD", "--insecure", "--raw-auth"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.base_url, "https://ibmi:3030");
        assert_eq!(config.user, "PROD");
        assert!(config.allow_invalid_cert);
        assert!(!config.base64_encode_auth);
    }
}
