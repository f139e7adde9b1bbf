//! Trellis CLI - Command-line interface for Trellis policies
//!
//! Usage:
//!   trellis                                   - Start interactive mode
//!   trellis init [dir]                        - Write a starter policy
//!   trellis policy check --role <role> <priv> - Check privileges
//!   trellis policy explain <priv>             - Show how a privilege resolves
//!   trellis policy roles|resources|rules      - Inspect the loaded policy

use clap::{Parser, Subcommand};
use cli::commands::{load_acl, InitCommand, PolicyCommand};
use cli::interactive::InteractiveCli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis - Hierarchical role/resource access control")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Policy file, directory or glob pattern
    #[arg(short, long, global = true, default_value = "trellis.yaml")]
    policy: PathBuf,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new policy file
    Init(InitCommand),
    /// Query a policy
    Policy(PolicyCommand),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init(cmd)) => cmd.run(),
        Some(Commands::Policy(cmd)) => cmd.run(&cli.policy, cli.json),
        None => {
            let acl = load_acl(&cli.policy)?;
            let mut interactive = InteractiveCli::new(acl, &cli.policy.display().to_string());
            interactive.run()
        }
    }
}
