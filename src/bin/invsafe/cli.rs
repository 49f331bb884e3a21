use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI для архива инвентаря InvSafe (player files: JSON-описание живого игрока)
#[derive(Parser, Debug)]
#[command(name = "invsafe", version, about = "InvSafe inventory backup CLI")]
pub struct Cli {
    /// Archive root (overrides INVSAFE_ROOT)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Whose archive: either a player file (its uuid) or a raw owner id.
#[derive(Args, Debug, Clone)]
pub struct Who {
    #[arg(long, conflicts_with = "owner")]
    pub player: Option<PathBuf>,
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Snapshot the player file into its archive (empty / duplicate states are skipped)
    Snapshot {
        #[arg(long)]
        player: PathBuf,
        /// Apply the per-owner cooldown gate (event-driven trigger)
        #[arg(long)]
        cooldown: bool,
        #[arg(long)]
        json: bool,
    },
    /// List backups, oldest first, with display indices
    List {
        #[command(flatten)]
        who: Who,
        #[arg(long)]
        json: bool,
    },
    /// Show every item record of one backup
    Inspect {
        #[command(flatten)]
        who: Who,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        json: bool,
    },
    /// Restore backup #index onto the player file
    Restore {
        #[arg(long)]
        player: PathBuf,
        #[arg(long)]
        index: usize,
        /// Write the restored player here instead of overwriting --player
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Delete backup #index
    Delete {
        #[command(flatten)]
        who: Who,
        #[arg(long)]
        index: usize,
    },
    /// Number of listed backups
    Count {
        #[command(flatten)]
        who: Who,
    },
    /// Walk every owner archive and print per-owner counts plus process counters
    Metrics {
        #[arg(long)]
        json: bool,
    },
}
