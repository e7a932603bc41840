use std::{fmt, fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vietqr_payload::{
    crc, generate_payload, sanitize_content, tlv, verify_checksum, BeneficiaryAccount,
};

#[derive(Parser)]
#[command(
    name = "vietqr-tools",
    about = "Utility commands for VietQR payment payloads"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a payload from beneficiary details.
    Generate(GenerateArgs),
    /// Decode a payload into its TLV fields and verify the checksum.
    Decode(DecodeArgs),
    /// Print the CRC-16/CCITT-FALSE of the argument.
    Checksum(ChecksumArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Bank identification number (6 digits). Overrides the config file.
    #[arg(long)]
    bin: Option<String>,
    /// Beneficiary account number. Overrides the config file.
    #[arg(long)]
    account: Option<String>,
    /// JSON file with beneficiary configuration ({"bin", "number", "holder"?}).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Purpose-of-transaction text. Sanitized to ASCII before encoding.
    #[arg(long)]
    content: Option<String>,
    /// Transfer amount in VND. Makes the QR dynamic.
    #[arg(long)]
    amount: Option<u64>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DecodeArgs {
    /// The payload string, as scanned or generated.
    payload: String,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChecksumArgs {
    /// Input text, checksummed byte for byte.
    input: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vietqr_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Decode(args) => decode(args),
        Commands::Checksum(args) => checksum(args),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = args
        .config
        .as_deref()
        .map(|path| -> Result<BeneficiaryAccount> {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))
        })
        .transpose()?;

    let (bin, account) = match (&args.bin, &args.account, &config) {
        (Some(bin), Some(account), _) => (bin.clone(), account.clone()),
        (bin, account, Some(config)) => (
            bin.clone().unwrap_or_else(|| config.bin.clone()),
            account.clone().unwrap_or_else(|| config.number.clone()),
        ),
        _ => bail!("provide --bin and --account, or --config"),
    };

    tracing::debug!(%bin, %account, "generating payload");
    let payload = generate_payload(
        &bin,
        &account,
        args.content.as_deref(),
        args.amount,
    )?;

    let summary = GenerateSummary {
        bin,
        account,
        content: args.content.as_deref().map(sanitize_content).filter(|c| !c.is_empty()),
        amount: args.amount,
        payload,
    };
    output_summary(&summary, args.json)
}

fn decode(args: DecodeArgs) -> Result<()> {
    verify_checksum(&args.payload)?;
    let fields = expand_fields(&args.payload)?;
    let summary = DecodeSummary {
        checksum_valid: true,
        fields,
    };
    output_summary(&summary, args.json)
}

fn checksum(args: ChecksumArgs) -> Result<()> {
    println!("{}", crc::checksum_hex(&args.input));
    Ok(())
}

/// Template fields whose values are themselves TLV-encoded.
const TEMPLATE_TAGS: [u8; 2] = [38, 62];

#[derive(Serialize)]
struct DecodedField {
    tag: u8,
    value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DecodedField>,
}

fn expand_fields(payload: &str) -> Result<Vec<DecodedField>> {
    let fields = tlv::parse(payload)?;
    let mut decoded = Vec::with_capacity(fields.len());
    for field in fields {
        let children = if TEMPLATE_TAGS.contains(&field.tag) {
            expand_fields(&field.value)?
        } else {
            Vec::new()
        };
        decoded.push(DecodedField {
            tag: field.tag,
            value: field.value,
            children,
        });
    }
    Ok(decoded)
}

fn output_summary<T>(summary: &T, json: bool) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

#[derive(Serialize)]
struct GenerateSummary {
    bin: String,
    account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<u64>,
    payload: String,
}

impl fmt::Display for GenerateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Beneficiary: {} / {}", self.bin, self.account)?;
        if let Some(content) = &self.content {
            writeln!(f, "Content:     {}", content)?;
        }
        if let Some(amount) = self.amount {
            writeln!(f, "Amount:      {} VND", amount)?;
        }
        write!(f, "Payload:     {}", self.payload)
    }
}

#[derive(Serialize)]
struct DecodeSummary {
    checksum_valid: bool,
    fields: Vec<DecodedField>,
}

impl fmt::Display for DecodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checksum: OK")?;
        fmt_fields(f, &self.fields, 0)
    }
}

fn fmt_fields(f: &mut fmt::Formatter<'_>, fields: &[DecodedField], depth: usize) -> fmt::Result {
    for field in fields {
        write!(f, "{:indent$}{:02}", "", field.tag, indent = depth * 2)?;
        if field.children.is_empty() {
            writeln!(f, " {}", field.value)?;
        } else {
            writeln!(f)?;
            fmt_fields(f, &field.children, depth + 1)?;
        }
    }
    Ok(())
}
