//! Keygen command - encryption key generation.

use anyhow::{Result, bail};
use clap::Args;

use super::Context;

/// Arguments for the keygen command.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key length in bytes: 16 (AES-128) or 32 (AES-256)
    #[arg(long, default_value_t = 16)]
    pub bytes: usize,
}

/// Run the keygen command.
pub async fn run(args: KeygenArgs, ctx: &Context) -> Result<()> {
    if args.bytes != 16 && args.bytes != 32 {
        bail!("--bytes must be 16 or 32, got {}", args.bytes);
    }

    let key = cachet_config::generate_encoded_key(args.bytes);

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "key": key, "bytes": args.bytes, "env_var": cachet_config::KEY_ENV_VAR })
        );
    } else {
        println!("{}", key);
        if ctx.verbose {
            eprintln!(
                "Export it as {}=<key> or set [session] encryption_key.",
                cachet_config::KEY_ENV_VAR
            );
        }
    }

    Ok(())
}
