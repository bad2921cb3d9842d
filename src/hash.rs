//! Hash-of-file collaborator (spec.md §1: "the hash function itself" is
//! deliberately a collaborator, not part of the core's reconciliation
//! logic). Grounded on `install_toolchains.rs::compute_file_sha256`.

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Hash `path`'s content with the algorithm named by `hash_algo`, returning
/// lowercase hex. `"sha256"` is the only algorithm implemented; anything
/// else is a config-validation error (`IndexerConfig::new`), not a silent
/// fallback, so this never has to guess.
pub fn hash_file(path: &Path, hash_algo: &str) -> Result<String> {
    match hash_algo {
        "sha256" => hash_file_sha256(path),
        other => bail!("unsupported hash_algo '{other}'"),
    }
}

fn hash_file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
