//! Bundle sealing utility (lms-seal)
//!
//! Encrypts catalog credentials and a dataset file into the TOML bundle that
//! lms-space unlocks at runtime.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::RngCore;
use serde::Deserialize;
use tracing::info;

use lms_common::config::LoggingConfig;
use lms_common::logging::init_tracing;
use lms_common::vault::{SealedBundle, UnsealedPayload, KDF_ITERATIONS, SALT_LEN};

/// Command-line arguments for lms-seal
#[derive(Parser, Debug)]
#[command(name = "lms-seal")]
#[command(about = "Seal catalog credentials and a dataset for Lab Music Space")]
#[command(version)]
struct Args {
    /// File whose first line is the passphrase
    #[arg(long)]
    passphrase_file: PathBuf,

    /// YAML file with `id` and `secret` keys
    #[arg(long)]
    secrets: PathBuf,

    /// Dataset CSV (lab, member, uri)
    #[arg(long)]
    dataset: PathBuf,

    /// Output bundle path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PBKDF2 iteration count
    #[arg(long, default_value_t = KDF_ITERATIONS)]
    iterations: u32,
}

/// Catalog client credentials
#[derive(Debug, Deserialize)]
struct Secrets {
    id: String,
    secret: String,
}

fn read_passphrase(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read passphrase file {}", path.display()))?;
    let passphrase = content
        .lines()
        .next()
        .unwrap_or_default()
        .trim_end_matches('\r')
        .to_string();
    if passphrase.is_empty() {
        bail!("Passphrase file {} has an empty first line", path.display());
    }
    Ok(passphrase)
}

fn read_secrets(path: &Path) -> Result<Secrets> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secrets file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse secrets file {}", path.display()))
}

fn seal(args: &Args) -> Result<SealedBundle> {
    if args.iterations == 0 {
        bail!("Iteration count must be positive");
    }

    let passphrase = read_passphrase(&args.passphrase_file)?;
    let secrets = read_secrets(&args.secrets)?;
    let dataset = std::fs::read_to_string(&args.dataset)
        .with_context(|| format!("Failed to read dataset {}", args.dataset.display()))?;

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    info!(
        iterations = args.iterations,
        dataset_bytes = dataset.len(),
        "Sealing bundle"
    );

    let payload = UnsealedPayload {
        service_id: secrets.id,
        service_secret: secrets.secret,
        dataset,
    };
    Ok(SealedBundle::seal(&passphrase, &salt, args.iterations, &payload))
}

fn main() -> Result<()> {
    init_tracing(&LoggingConfig::default());
    let args = Args::parse();

    let bundle = seal(&args)?;

    match &args.output {
        Some(path) => {
            bundle
                .save(path)
                .with_context(|| format!("Failed to write bundle {}", path.display()))?;
            info!(path = %path.display(), "Bundle written");
        }
        None => print!("{}", bundle.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(dir: &Path, passphrase: &str) -> Args {
        Args {
            passphrase_file: write(dir, "key", passphrase),
            secrets: write(dir, "secret.yml", "id: abc123\nsecret: s3cr3t\n"),
            dataset: write(
                dir,
                "data.csv",
                "lab,member,uri\nCai Lab,ann,spotify:track:4uLU6hMCjMI75M1A2tKUQC\n",
            ),
            output: None,
            iterations: 100,
        }
    }

    #[test]
    fn test_passphrase_newline_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = seal(&args(dir.path(), "open sesame\nignored\n")).unwrap();

        let payload = bundle.unseal("open sesame").unwrap();
        assert_eq!(payload.service_id, "abc123");
        assert_eq!(payload.service_secret, "s3cr3t");
        assert!(payload.dataset.starts_with("lab,member,uri\n"));
        assert!(bundle.unseal("open sesame\n").is_err());
    }

    #[test]
    fn test_windows_line_ending() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = seal(&args(dir.path(), "pw\r\n")).unwrap();
        assert!(bundle.unseal("pw").is_ok());
    }

    #[test]
    fn test_fresh_salt_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let a = seal(&args(dir.path(), "pw")).unwrap();
        let b = seal(&args(dir.path(), "pw")).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_eq!(a.iterations, 100);
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(seal(&args(dir.path(), "\nsecond line")).is_err());
    }

    #[test]
    fn test_secrets_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), "pw");
        args.secrets = write(dir.path(), "bad.yml", "id: only-id\n");
        assert!(seal(&args).is_err());
    }

    #[test]
    fn test_written_bundle_loads() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = seal(&args(dir.path(), "pw")).unwrap();
        let path = dir.path().join("bundle.toml");
        bundle.save(&path).unwrap();

        assert_eq!(SealedBundle::load(&path).unwrap(), bundle);
    }

    #[test]
    fn test_cli_parses() {
        let args = Args::try_parse_from([
            "lms-seal",
            "--passphrase-file",
            "key",
            "--secrets",
            "secret.yml",
            "--dataset",
            "data.csv",
        ])
        .unwrap();
        assert_eq!(args.iterations, KDF_ITERATIONS);
        assert!(args.output.is_none());
    }
}
