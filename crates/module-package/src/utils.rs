use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

use crate::archive::PackageArchive;

/// SHA-256 over every entry (name and bytes, in entry order), hex encoded.
///
/// Two packages with the same digest hold the same units and resources, which
/// is how a runtime tells whether a re-deployed module actually changed.
pub fn package_digest(archive: &dyn PackageArchive) -> Result<String> {
    let mut hasher = Sha256::new();
    for name in archive.entry_names() {
        let bytes = archive
            .read_entry(&name)?
            .ok_or_else(|| anyhow!("entry {} vanished from {}", name, archive.location()))?;
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(hex::encode(hasher.finalize()))
}
