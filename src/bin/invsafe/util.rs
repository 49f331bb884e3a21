use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use InvSafe::{InvSafeConfig, InventorySafe, ItemRecord, MemoryPlayer};

use crate::cli::Who;

/// Config from INVSAFE_* with an optional --root override.
pub fn open_safe(root: Option<PathBuf>) -> Result<InventorySafe> {
    let mut cfg = InvSafeConfig::from_env();
    if let Some(r) = root {
        cfg = cfg.with_archive_root(r);
    }
    InventorySafe::open(cfg)
}

pub fn load_player(path: &Path) -> Result<MemoryPlayer> {
    let bytes = fs::read(path).with_context(|| format!("read player file {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse player file {}", path.display()))
}

/// tmp + rename, как и для снапшотов.
pub fn save_player(path: &Path, player: &MemoryPlayer) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(player)?;
    {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(&data)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

pub fn resolve_owner(who: &Who) -> Result<String> {
    if let Some(o) = &who.owner {
        return Ok(o.clone());
    }
    if let Some(p) = &who.player {
        return Ok(load_player(p)?.uuid);
    }
    Err(anyhow!("either --player or --owner is required"))
}

pub fn print_record(kind: &str, pos: usize, rec: &ItemRecord) {
    let slot = rec.origin_slot_id().map(|s| format!(" [{}]", s)).unwrap_or_default();
    let payload = if rec.encoded_payload.is_some() { "" } else { " (no payload)" };
    println!("  {} #{:<3} {} x{}{}{}", kind, pos, rec.type_id, rec.quantity, slot, payload);
}
