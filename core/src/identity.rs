//! Per-installation identity used as the login credential.
//!
//! A stable identifier is read from the local data directory; when
//! none exists (first run, or a platform without durable storage
//! semantics) a random one is minted once and persisted.

use crate::error::GameResult;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const ID_FILE: &str = "device_id";

/// Load the persisted installation id, minting and persisting a fresh
/// one if absent.
pub fn device_id(data_dir: &Path) -> GameResult<String> {
    let path = data_dir.join(ID_FILE);
    if let Ok(contents) = fs::read_to_string(&path) {
        let id = contents.trim();
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }
    let id = mint_id();
    fs::create_dir_all(data_dir)?;
    fs::write(&path, &id)?;
    log::info!("minted new installation id");
    Ok(id)
}

/// A throwaway identity that is never persisted. Tests and the
/// headless runner use this.
pub fn ephemeral_id() -> String {
    mint_id()
}

fn mint_id() -> String {
    format!("player-{}", Uuid::new_v4().simple())
}
