use anyhow::Result;
use std::path::PathBuf;

use crate::cli::Who;
use crate::util::{open_safe, resolve_owner};

pub fn exec(root: Option<PathBuf>, who: Who, json: bool) -> Result<()> {
    let safe = open_safe(root)?;
    let owner = resolve_owner(&who)?;
    let entries = safe.store().entries(&owner);

    if json {
        let arr: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "index": e.index,
                    "storage_key": e.snapshot.storage_key,
                    "timestamp": e.snapshot.created_at.format(InvSafe::consts::TIMESTAMP_FORMAT).to_string(),
                    "items": e.snapshot.primary_items.len(),
                    "trinket_items": e.snapshot.secondary_items.len(),
                    "experience": e.snapshot.experience_level,
                    "dimension": e.snapshot.location.dimension,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&arr)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No backups for {}", owner);
        return Ok(());
    }
    println!("Backups for {} ({}):", owner, entries.len());
    for e in &entries {
        println!("  {}: {}", e.index, e.snapshot.summary());
    }
    Ok(())
}
