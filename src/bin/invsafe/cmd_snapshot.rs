use anyhow::{anyhow, Result};
use std::path::PathBuf;

use InvSafe::BackupOutcome;

use crate::util::{load_player, open_safe};

pub fn exec(root: Option<PathBuf>, player: PathBuf, cooldown: bool, json: bool) -> Result<()> {
    let safe = open_safe(root)?;
    let p = load_player(&player)?;

    let outcome = if cooldown {
        safe.trigger_backup(&p)
    } else {
        safe.create_backup(&p)
    };

    let (status, key) = match &outcome {
        BackupOutcome::Created(s) => ("created", Some(s.storage_key.clone())),
        BackupOutcome::Empty => ("empty", None),
        BackupOutcome::Duplicate => ("duplicate", None),
        BackupOutcome::CoolingDown(_) => ("cooling_down", None),
        BackupOutcome::Failed(_) => ("failed", None),
    };

    if json {
        let obj = serde_json::json!({
            "owner": p.uuid,
            "status": status,
            "storage_key": key,
            "count": safe.count(&p.uuid),
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
    } else {
        match &outcome {
            BackupOutcome::Created(s) => println!("Backup created: {} {}", s.storage_key, s.summary()),
            BackupOutcome::Empty => println!("Nothing to back up (empty inventory, 0 levels)"),
            BackupOutcome::Duplicate => println!("Skipped: identical to the latest backup"),
            BackupOutcome::CoolingDown(left) => {
                println!("Skipped: cooling down, {} ms left", left.as_millis())
            }
            BackupOutcome::Failed(_) => {}
        }
    }

    if let BackupOutcome::Failed(cause) = outcome {
        return Err(anyhow!("backup failed: {}", cause));
    }
    Ok(())
}
