// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! stegcore CLI: hide encrypted payloads in PNG/BMP images and 16-bit WAV
//! audio.
//!
//! Exit codes: 0 success; 2 input-validation error (format, size, depth);
//! 3 capacity exceeded; 4 decrypt/auth failure or no hidden data;
//! 5 I/O error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use stegcore::{
    analyze_capacity, classify_format, decode, encode, CarrierKind, DecodeOptions, EncodeOptions,
    PayloadInput, PayloadKind, Platform, StegoError,
};

#[derive(Parser)]
#[command(
    name = "stegcore",
    version,
    about = "LSB steganography with password-based encryption for PNG, BMP and 16-bit WAV carriers",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a payload and embed it into a carrier
    Encode {
        /// Path to the carrier file (PNG, BMP or 16-bit WAV)
        #[arg(long = "in", value_name = "CARRIER")]
        input: PathBuf,

        /// Text payload (mutually exclusive with --file)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File payload (mutually exclusive with --text)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output path for the stego carrier
        #[arg(long)]
        out: PathBuf,

        /// Environment variable holding the password (prompts if absent)
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,

        /// LSB depth 1-4 (above 1 requires --expert)
        #[arg(long, default_value_t = 1)]
        depth: u8,

        /// Use the 310,000-iteration KDF work factor
        #[arg(long)]
        high_security: bool,

        /// Skip gzip compression of the payload
        #[arg(long)]
        no_compress: bool,

        /// Allow LSB depths above 1
        #[arg(long)]
        expert: bool,

        /// Apply the tighter mobile size ceilings and depth policy
        #[arg(long)]
        mobile: bool,
    },

    /// Extract and decrypt a payload from a stego carrier
    Decode {
        /// Path to the stego carrier
        #[arg(long = "in", value_name = "STEGO")]
        input: PathBuf,

        /// Output path for the recovered payload
        #[arg(long)]
        out: PathBuf,

        /// Environment variable holding the password (prompts if absent)
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,

        /// LSB depth the carrier was encoded with
        #[arg(long, default_value_t = 1)]
        depth: u8,

        /// Allow LSB depths above 1
        #[arg(long)]
        expert: bool,

        /// Apply the tighter mobile size ceilings and depth policy
        #[arg(long)]
        mobile: bool,
    },

    /// Report a carrier's embedding capacity
    Capacity {
        /// Path to the carrier file
        #[arg(long = "in", value_name = "CARRIER")]
        input: PathBuf,

        /// LSB depth 1-4
        #[arg(long, default_value_t = 1)]
        depth: u8,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Encode {
            input,
            text,
            file,
            out,
            password_env,
            depth,
            high_security,
            no_compress,
            expert,
            mobile,
        } => {
            let kind = kind_of(&input)?;
            let carrier = std::fs::read(&input)
                .with_context(|| format!("reading carrier {}", input.display()))?;

            let payload = match (text, file) {
                (Some(t), None) => PayloadInput::Text(t),
                (None, Some(path)) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("reading payload {}", path.display()))?;
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    PayloadInput::File {
                        bytes,
                        name,
                        mime: String::new(),
                    }
                }
                _ => bail!("exactly one of --text or --file is required"),
            };

            let options = EncodeOptions {
                lsb_depth: depth,
                high_security,
                compress: !no_compress,
                platform: platform_of(mobile),
                expert,
            };
            let password = resolve_password(password_env.as_deref(), "Password: ")?;

            let output = encode(&carrier, kind, &payload, &password, &options)?;
            for warning in &output.warnings {
                eprintln!("warning: {warning}");
            }
            std::fs::write(&out, &output.bytes)
                .with_context(|| format!("writing stego carrier {}", out.display()))?;
            eprintln!(
                "embedded {} payload bytes into {} ({} kind)",
                payload.len(),
                out.display(),
                output.kind
            );
            Ok(())
        }

        Commands::Decode {
            input,
            out,
            password_env,
            depth,
            expert,
            mobile,
        } => {
            let kind = kind_of(&input)?;
            let stego = std::fs::read(&input)
                .with_context(|| format!("reading stego carrier {}", input.display()))?;

            let options = DecodeOptions {
                lsb_depth: depth,
                platform: platform_of(mobile),
                expert,
            };
            let password = resolve_password(password_env.as_deref(), "Password: ")?;

            let recovered = decode(&stego, kind, &password, &options)?;
            std::fs::write(&out, &recovered.bytes)
                .with_context(|| format!("writing payload {}", out.display()))?;

            match recovered.meta.kind {
                PayloadKind::Text => eprintln!(
                    "recovered {} bytes of text to {}",
                    recovered.bytes.len(),
                    out.display()
                ),
                PayloadKind::File => eprintln!(
                    "recovered file '{}' ({} bytes{}) to {}",
                    recovered.meta.name.as_deref().unwrap_or("unnamed"),
                    recovered.bytes.len(),
                    recovered
                        .meta
                        .mime_type
                        .as_deref()
                        .map(|m| format!(", {m}"))
                        .unwrap_or_default(),
                    out.display()
                ),
            }
            Ok(())
        }

        Commands::Capacity { input, depth } => {
            let kind = kind_of(&input)?;
            let carrier = std::fs::read(&input)
                .with_context(|| format!("reading carrier {}", input.display()))?;
            let report = analyze_capacity(&carrier, kind, depth)?;
            println!("{}", report.total_bytes);
            Ok(())
        }
    }
}

/// Classify the carrier format from the file extension.
fn kind_of(path: &Path) -> Result<CarrierKind, StegoError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    classify_format(&ext)
}

fn platform_of(mobile: bool) -> Platform {
    if mobile {
        Platform::Mobile
    } else {
        Platform::Desktop
    }
}

/// Read the password from the named environment variable, or prompt.
fn resolve_password(env_var: Option<&str>, prompt: &str) -> Result<String> {
    match env_var {
        Some(var) => {
            std::env::var(var).with_context(|| format!("environment variable {var} is not set"))
        }
        None => {
            let p = rpassword::prompt_password(prompt)?;
            if p.is_empty() {
                bail!("empty password");
            }
            Ok(p)
        }
    }
}

/// Map an error chain onto the CLI exit-code contract.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(stego) = err.downcast_ref::<StegoError>() {
        return match stego {
            StegoError::UnsupportedFormat(_)
            | StegoError::CarrierCorrupt(_)
            | StegoError::DepthPolicy(_) => 2,
            StegoError::CapacityExceeded { .. } => 3,
            StegoError::NoHiddenData | StegoError::DecryptFailure => 4,
            StegoError::Cancelled => 1,
        };
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return 5;
    }
    2
}
