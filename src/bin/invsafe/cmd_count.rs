use anyhow::Result;
use std::path::PathBuf;

use crate::cli::Who;
use crate::util::{open_safe, resolve_owner};

pub fn exec(root: Option<PathBuf>, who: Who) -> Result<()> {
    let safe = open_safe(root)?;
    let owner = resolve_owner(&who)?;
    println!("{}", safe.count(&owner));
    Ok(())
}
