use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use vartiq_client::signature;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Webhook signing secret.
    #[arg(long, env = "VARTIQ_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,
    /// Payload file; reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Webhook signing secret.
    #[arg(long, env = "VARTIQ_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,
    /// Hex signature from the delivery header.
    #[arg(long, default_value = "")]
    pub signature: String,
    /// Payload file; reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Read the payload bytes exactly as stored, without any decoding.
fn read_payload(file: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn sign(args: &SignArgs) -> anyhow::Result<()> {
    let payload = read_payload(args.file.as_ref())?;
    println!("{}", signature::sign(&payload, args.secret.as_bytes())?);
    Ok(())
}

pub fn verify(args: &VerifyArgs) -> anyhow::Result<()> {
    let payload = read_payload(args.file.as_ref())?;
    match signature::verify(&payload, &args.signature, args.secret.as_bytes()) {
        Ok(verified) => {
            tracing::debug!(bytes = verified.len(), "signature verified");
            std::io::stdout().write_all(verified)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("Rejected payload: {e}");
            std::process::exit(1);
        }
    }
}
