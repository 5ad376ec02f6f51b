mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;

use addrforge_core::{CountryCatalog, SubdivisionKind};
use addrforge_data::{CountryResolver, DataError, FsReferenceStore, ReferenceStore};
use addrforge_generate::{AddressGenerator, GenerationError, GenerationRequest};
use config::{ConfigError, Settings, load_settings};
use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "addrforge", version, about = "Fictitious postal address generator")]
struct Cli {
    /// Settings file; defaults to ./addrforge.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate addresses.
    Generate(GenerateArgs),
    /// List canonical country keys and their aliases.
    Countries(StoreArgs),
    /// Print the JSON Schema of a country catalog.
    CatalogSchema,
}

#[derive(Args, Debug, Default)]
struct StoreArgs {
    /// Reference data root holding `common/` and `countries/`.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Number of addresses; must be a positive integer.
    #[arg(long, short = 'n', allow_hyphen_values = true)]
    count: String,
    #[arg(long)]
    country: Option<String>,
    /// residential, industrial or corporate.
    #[arg(long = "type", value_name = "ADDRESS_TYPE")]
    address_type: Option<String>,
    /// Comma-separated field tags, or `all`.
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
    /// Subdivision key to draw from; repeatable.
    #[arg(long, value_name = "KEY")]
    subdivision: Vec<String>,
    #[arg(long)]
    city: Option<String>,
    /// json, csv or text.
    #[arg(long)]
    format: Option<String>,
    #[arg(long)]
    separator: Option<String>,
    /// Extra `KEY=VALUE` pair added to every record; repeatable.
    #[arg(long, value_name = "KEY=VALUE")]
    addon: Vec<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(flatten)]
    store: StoreArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings.log_filter, cli.log_json).map_err(CliError::Logging)?;

    match cli.command {
        Command::Generate(args) => run_generate(args, &settings).await,
        Command::Countries(args) => run_countries(args, &settings).await,
        Command::CatalogSchema => {
            let schema = schemars::schema_for!(CountryCatalog);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_generate(args: GenerateArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let timer = Instant::now();
    let store = open_store(args.store.data_dir.as_deref(), settings)?;
    let generator = AddressGenerator::new(store);

    let count = count_value(&args.count);
    let options = build_options(&args, settings)?;
    let result = match GenerationRequest::from_options(&count, &options) {
        Ok(request) => generator.generate_output(&request).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            tracing::debug!(duration_ms = timer.elapsed().as_millis() as u64, "output written");
            Ok(ExitCode::SUCCESS)
        }
        Err(
            err @ (GenerationError::InvalidCount
            | GenerationError::CatalogNotFound { .. }
            | GenerationError::UnsupportedFormat(_)),
        ) => {
            println!("{err}");
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_countries(args: StoreArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let store = open_store(args.data_dir.as_deref(), settings)?;
    let common = store.load_common_pools().await?;
    for (key, aliases) in CountryResolver::new(&common.country_map).entries() {
        println!("{key}: {}", aliases.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

/// An explicit data directory must exist; the configured one falls back to
/// the bundled datasets when missing.
fn open_store(explicit: Option<&Path>, settings: &Settings) -> Result<FsReferenceStore, CliError> {
    if let Some(dir) = explicit {
        if !dir.is_dir() {
            return Err(CliError::InvalidConfig(format!(
                "data directory {} does not exist",
                dir.display()
            )));
        }
        return Ok(FsReferenceStore::new(dir));
    }
    if settings.data_dir.is_dir() {
        return Ok(FsReferenceStore::new(&settings.data_dir));
    }
    tracing::debug!(
        data_dir = %settings.data_dir.display(),
        "configured data directory missing; using bundled datasets"
    );
    Ok(FsReferenceStore::bundled())
}

/// Numbers pass through as JSON numbers so non-numeric input reaches count
/// validation unchanged.
fn count_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw.trim())
        .ok()
        .filter(Value::is_number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn build_options(args: &GenerateArgs, settings: &Settings) -> Result<Value, CliError> {
    let mut options = Map::new();
    let country = args.country.as_ref().unwrap_or(&settings.default_country);
    options.insert("country".to_string(), Value::from(country.as_str()));
    if let Some(address_type) = &args.address_type {
        options.insert("addressType".to_string(), Value::from(address_type.as_str()));
    }
    if !args.fields.is_empty() {
        options.insert("addressFormat".to_string(), Value::from(args.fields.clone()));
    }
    if !args.subdivision.is_empty() {
        // The catalog decides which option name applies.
        for key in SubdivisionKind::NAMED.into_iter().filter_map(SubdivisionKind::option_key) {
            options.insert(key.to_string(), Value::from(args.subdivision.clone()));
        }
    }
    if let Some(city) = &args.city {
        options.insert("city".to_string(), Value::from(city.as_str()));
    }
    let format = args.format.as_ref().unwrap_or(&settings.default_format);
    options.insert("format".to_string(), Value::from(format.as_str()));
    let separator = args.separator.as_ref().unwrap_or(&settings.separator);
    options.insert("separator".to_string(), Value::from(separator.as_str()));
    if !args.addon.is_empty() {
        let mut addon = Map::new();
        for pair in &args.addon {
            let (key, value) = parse_addon(pair)?;
            addon.insert(key, value);
        }
        options.insert("addon".to_string(), Value::Object(addon));
    }
    if let Some(seed) = args.seed.or(settings.seed) {
        options.insert("seed".to_string(), Value::from(seed));
    }
    Ok(Value::Object(options))
}

/// Splits `KEY=VALUE`; values that parse as JSON keep their JSON type.
fn parse_addon(pair: &str) -> Result<(String, Value), CliError> {
    let (key, raw) = pair
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| CliError::InvalidConfig(format!("addon '{pair}' must be KEY=VALUE")))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_keeps_non_numbers_as_text() {
        assert_eq!(count_value("3"), json!(3));
        assert_eq!(count_value("-5"), json!(-5));
        assert_eq!(count_value("two"), json!("two"));
        assert_eq!(count_value("[1]"), json!("[1]"));
    }

    #[test]
    fn addon_values_keep_json_types() {
        assert_eq!(parse_addon("batch=7").expect("addon"), ("batch".to_string(), json!(7)));
        assert_eq!(
            parse_addon("source=fixture").expect("addon"),
            ("source".to_string(), json!("fixture"))
        );
        assert!(parse_addon("novalue").is_err());
        assert!(parse_addon("=7").is_err());
    }

    #[test]
    fn options_merge_flags_over_settings() {
        let settings = Settings {
            default_country: "Canada".to_string(),
            seed: Some(11),
            ..Settings::default()
        };
        let args = GenerateArgs {
            count: "2".to_string(),
            fields: vec!["city".to_string(), "province".to_string()],
            subdivision: vec!["Ontario".to_string()],
            format: Some("csv".to_string()),
            addon: vec!["batch=7".to_string()],
            ..GenerateArgs::default()
        };
        let options = build_options(&args, &settings).expect("options");
        assert_eq!(options["country"], json!("Canada"));
        assert_eq!(options["format"], json!("csv"));
        assert_eq!(options["separator"], json!(","));
        assert_eq!(options["provinces"], json!(["Ontario"]));
        assert_eq!(options["states"], json!(["Ontario"]));
        assert_eq!(options["addon"], json!({"batch": 7}));
        assert_eq!(options["seed"], json!(11));

        let request = GenerationRequest::from_options(&count_value(&args.count), &options)
            .expect("request");
        assert_eq!(request.count, 2);
        assert_eq!(request.seed, Some(11));
    }

    #[test]
    fn negative_count_reaches_count_validation() {
        let cli = Cli::try_parse_from(["addrforge", "generate", "--count", "-5"]).expect("parse");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.count, "-5");
        let options = build_options(&args, &Settings::default()).expect("options");
        let err = GenerationRequest::from_options(&count_value(&args.count), &options)
            .expect_err("negative count");
        assert!(matches!(err, GenerationError::InvalidCount));
        assert_eq!(err.to_string(), "Provide a valid count.");
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "addrforge",
            "generate",
            "-n",
            "3",
            "--fields",
            "city,state,zipCode",
            "--subdivision",
            "NY",
            "--subdivision",
            "CA",
            "--type",
            "corporate",
        ])
        .expect("parse");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.fields, vec!["city", "state", "zipCode"]);
        assert_eq!(args.subdivision, vec!["NY", "CA"]);
        assert_eq!(args.address_type.as_deref(), Some("corporate"));
    }
}
