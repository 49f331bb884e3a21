use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_snapshot;
mod cmd_list;
mod cmd_inspect;
mod cmd_restore;
mod cmd_delete;
mod cmd_count;
mod cmd_metrics;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт: info.
    // Пример: RUST_LOG=debug ./invsafe list --owner <uuid>
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    let root = cli.root;
    match cli.cmd {
        cli::Cmd::Snapshot { player, cooldown, json } =>
            cmd_snapshot::exec(root, player, cooldown, json),

        cli::Cmd::List { who, json } =>
            cmd_list::exec(root, who, json),

        cli::Cmd::Inspect { who, index, json } =>
            cmd_inspect::exec(root, who, index, json),

        cli::Cmd::Restore { player, index, out, json } =>
            cmd_restore::exec(root, player, index, out, json),

        cli::Cmd::Delete { who, index } =>
            cmd_delete::exec(root, who, index),

        cli::Cmd::Count { who } =>
            cmd_count::exec(root, who),

        cli::Cmd::Metrics { json } =>
            cmd_metrics::exec(root, json),
    }
}
