use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use compensator::{batch, logging, BatchError, Compensator};
use mturk_requester::{ClientSettings, Credentials, Requester};
use tracing::{error, info};

/// Approves assignments and gives bonuses on mturk.
///
/// For information on AWS access keys, see
/// docs.aws.amazon.com/IAM/latest/UserGuide/id_credentials_access-keys.html
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// csv file with columns worker_id, assignment_id, bonus
    csv: PathBuf,

    /// AWS access key id (default: $AWS_ACCESS_KEY_ID)
    #[arg(long = "id")]
    aws_access_key_id: Option<String>,

    /// AWS secret access key (default: $AWS_SECRET_ACCESS_KEY)
    #[arg(long = "secret")]
    aws_secret_access_key: Option<String>,

    /// 2 (or more)=log all actions;  1=log errors only;  0=no logging
    #[arg(long, default_value_t = 2)]
    verbose: u8,

    /// Use the sandbox marketplace
    #[arg(long, default_value_t = false)]
    sandbox: bool,

    /// Skip TLS certificate verification
    #[arg(long, default_value_t = false)]
    no_verify_ssl: bool,

    /// Grant bonuses even for assignments that were already bonused
    #[arg(long, default_value_t = false)]
    repeat: bool,

    /// TOML file with client settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the batch summary as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn settings(&self) -> Result<ClientSettings> {
        let mut settings = match &self.config {
            Some(path) => ClientSettings::from_toml_file(path)?,
            None => ClientSettings::default(),
        };
        if self.sandbox {
            settings.sandbox = true;
        }
        if self.no_verify_ssl {
            settings.verify_ssl = false;
        }
        Ok(settings)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let rows = match batch::load_rows(&args.csv) {
        Ok(rows) => rows,
        Err(BatchError::MissingColumn(column)) => {
            eprintln!("Error: csv has no column \"{column}\".");
            return Ok(ExitCode::from(1));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", args.csv.display()))
        }
    };

    let settings = args.settings()?;
    let credentials = Credentials::resolve(
        args.aws_access_key_id.clone(),
        args.aws_secret_access_key.clone(),
    )?;
    info!(
        endpoint = %settings.endpoint(),
        rows = rows.len(),
        repeat = args.repeat,
        "Compensator starting"
    );

    let requester = Requester::new(credentials, settings).context("Failed to build client")?;
    let compensator = Compensator::new(requester);

    let summary = batch::run(&compensator, &rows, args.repeat)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["compensator", "rows.csv"]).unwrap();
        assert_eq!(args.csv, PathBuf::from("rows.csv"));
        assert_eq!(args.verbose, 2);
        assert!(!args.repeat);
        let settings = args.settings().unwrap();
        assert!(!settings.sandbox);
        assert!(settings.verify_ssl);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::try_parse_from([
            "compensator",
            "rows.csv",
            "--id",
            "AKID",
            "--secret",
            "s3cr3t",
            "--verbose",
            "1",
            "--sandbox",
            "--no-verify-ssl",
            "--repeat",
        ])
        .unwrap();
        assert_eq!(args.aws_access_key_id.as_deref(), Some("AKID"));
        assert_eq!(args.aws_secret_access_key.as_deref(), Some("s3cr3t"));
        assert_eq!(args.verbose, 1);
        assert!(args.repeat);
        let settings = args.settings().unwrap();
        assert!(settings.sandbox);
        assert!(!settings.verify_ssl);
    }

    #[test]
    fn test_cli_accepts_verbosity_above_two() {
        let args = Args::try_parse_from(["compensator", "rows.csv", "--verbose", "3"]).unwrap();
        assert_eq!(args.verbose, 3);
        assert_eq!(logging::directive(args.verbose), "info");
        assert!(Args::try_parse_from(["compensator", "rows.csv", "--verbose", "-1"]).is_err());
    }
}
