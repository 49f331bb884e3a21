use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::util::{load_player, open_safe, save_player};

pub fn exec(
    root: Option<PathBuf>,
    player: PathBuf,
    index: usize,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let safe = open_safe(root)?;
    let mut p = load_player(&player)?;

    let report = match safe.restore_by_index_report(&mut p, index) {
        Some(r) => r?,
        None => return Err(anyhow!("{} has no backup #{}", p.uuid, index)),
    };

    let target = out.unwrap_or(player);
    save_player(&target, &p)?;

    if json {
        let obj = serde_json::json!({
            "owner": p.uuid,
            "index": index,
            "written": target.display().to_string(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
    } else {
        println!(
            "Restored backup #{} for {} -> {} (placed={}, dropped={}, equipped={}, spilled={}, lost={}, degraded={})",
            index,
            p.name,
            target.display(),
            report.placed,
            report.dropped,
            report.equipped_exact + report.equipped_fallback,
            report.spilled,
            report.lost,
            report.degraded
        );
    }
    Ok(())
}
