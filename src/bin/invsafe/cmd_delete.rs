use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::cli::Who;
use crate::util::{open_safe, resolve_owner};

pub fn exec(root: Option<PathBuf>, who: Who, index: usize) -> Result<()> {
    let safe = open_safe(root)?;
    let owner = resolve_owner(&who)?;
    if !safe.delete_by_index(&owner, index) {
        return Err(anyhow!("could not delete backup #{} of {}", index, owner));
    }
    println!("Deleted backup #{} of {} ({} left)", index, owner, safe.count(&owner));
    Ok(())
}
