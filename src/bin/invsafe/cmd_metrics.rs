use anyhow::Result;
use std::path::PathBuf;

use InvSafe::metrics;

use crate::util::open_safe;

pub fn exec(root: Option<PathBuf>, json: bool) -> Result<()> {
    let safe = open_safe(root)?;

    // Listing every archive also counts corrupt files into the process metrics.
    let owners = safe.store().owners()?;
    let counts: Vec<(String, usize)> = owners
        .into_iter()
        .map(|o| {
            let n = safe.count(&o);
            (o, n)
        })
        .collect();
    let m = metrics::snapshot();

    if json {
        let per_owner: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(o, n)| (o.clone(), serde_json::json!(n)))
            .collect();
        let obj = serde_json::json!({
            "root": safe.store().root().display().to_string(),
            "max_backups": safe.store().max_backups(),
            "owners": per_owner,
            "metrics": m,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("Archive root: {}", safe.store().root().display());
    println!("  {}", safe.config());
    println!("Owners: {}", counts.len());
    for (o, n) in &counts {
        println!("  {}: {} backup(s)", o, n);
    }
    println!("Counters:");
    println!("  corrupt_files_skipped = {}", m.corrupt_files_skipped);
    println!("  backups_created       = {}", m.backups_created);
    println!("  restores_ok/failed    = {}/{}", m.restores_ok, m.restores_failed);
    Ok(())
}
