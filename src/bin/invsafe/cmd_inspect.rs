use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::cli::Who;
use crate::util::{open_safe, print_record, resolve_owner};

pub fn exec(root: Option<PathBuf>, who: Who, index: usize, json: bool) -> Result<()> {
    let safe = open_safe(root)?;
    let owner = resolve_owner(&who)?;
    let snap = safe
        .get(&owner, index)
        .ok_or_else(|| anyhow!("{} has no backup #{}", owner, index))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }

    println!("Backup #{} of {}: {}", index, owner, snap.storage_key);
    println!("  {}", snap.summary());
    println!(
        "  location: {} ({:.1}, {:.1}, {:.1})",
        snap.location.dimension, snap.location.x, snap.location.y, snap.location.z
    );
    for (i, rec) in snap.primary_items.iter().enumerate() {
        print_record("inv    ", i, rec);
    }
    for (i, rec) in snap.secondary_items.iter().enumerate() {
        print_record("trinket", i, rec);
    }
    Ok(())
}
