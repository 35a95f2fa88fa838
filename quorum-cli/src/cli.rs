// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Threshold-authorized root credential generation")]
#[command(version)]
pub(crate) struct Cli {
    #[arg(short, long, global = true, help = "Data directory (overrides config)")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate a master key and split it into shares
    Init {
        #[arg(short, long)]
        threshold: u8,
        #[arg(short, long)]
        shares: u8,
        #[arg(long, default_value = "32")]
        key_len: usize,
    },
    /// Print a fresh one-time pad
    GenerateOtp,
    /// Generate a recipient keypair for public-key delivery
    Keygen {
        #[arg(short, long, help = "Where to write the private key")]
        out: PathBuf,
    },
    /// Run a root generation ceremony
    GenerateRoot {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Recover a credential id from an OTP-encoded token
    Decode {
        #[arg(long)]
        otp: String,
        #[arg(long)]
        encoded: String,
    },
    /// Recover a credential id from a public-key encoded token
    Decrypt {
        #[arg(short, long, help = "Private key file written by keygen")]
        key: PathBuf,
        #[arg(long)]
        encoded: String,
    },
    /// List stored credentials
    Tokens,
    /// Revoke a credential by accessor
    Revoke {
        #[arg(short, long)]
        accessor: String,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub(crate) struct OutputArgs {
    #[arg(long, help = "Base64 one-time pad")]
    pub otp: Option<String>,
    #[arg(long, help = "Armored recipient public key file")]
    pub pgp_key: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    Show,
    Path,
}
