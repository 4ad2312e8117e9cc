//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show resolved session store configuration
    Show,

    /// Show which config files are checked and their precedence
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./cachet.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx).await,
        ConfigCommand::Path => cmd_path().await,
        ConfigCommand::Init { local } => cmd_init(local).await,
    }
}

async fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = cachet_config::load_config(None)?;
    let session = &loaded.config.session;
    let key_source = match cachet_config::resolve_encryption_key(session)? {
        Some((_, source)) => source.to_string(),
        None => cachet_config::KeySource::Generated.to_string(),
    };

    if ctx.json_output {
        let out = serde_json::json!({
            "prefix": session.prefix,
            "timeout_secs": session.timeout_secs(),
            "max_entries": session.max_entries(),
            "key_source": key_source,
            "sources": loaded.loaded_from(),
            "warnings": loaded.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("# Cachet Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    println!("Session:");
    println!("  prefix:      {}", session.prefix.as_deref().unwrap_or("(none)"));
    println!("  timeout:     {}s", session.timeout_secs());
    println!("  max entries: {}", session.max_entries());
    println!("  key:         {}", key_source);
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        let mut redacted = loaded.config.clone();
        if redacted.session.encryption_key.is_some() {
            redacted.session.encryption_key = Some("<redacted>".to_string());
        }
        println!("---\nRaw config:\n");
        println!("{}", redacted.to_toml()?);
    }

    Ok(())
}

async fn cmd_path() -> Result<()> {
    let loaded = cachet_config::load_config(None)?;

    println!("Config file search order (later overrides earlier):\n");

    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} [{}] {}", status, source.scope, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'cachet config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

async fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(cachet_config::PROJECT_CONFIG_FILE)
    } else {
        cachet_config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    if !cachet_config::init_config(&path)? {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    println!("✓ Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  cachet keygen                  # generate an encryption key");
    println!("  cachet config show             # verify configuration");
    println!("  cachet check                   # exercise a session round trip");

    Ok(())
}
