use crate::{CHECKSUMS_FILE, MANIFEST_FILE, SCORES_FILE};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempora_core::{AppError, AppResult};

const REQUIRED_FILES: [&str; 2] = [MANIFEST_FILE, SCORES_FILE];

pub fn write_checksums(score_dir: &Path, files: &[&str]) -> AppResult<()> {
    let mut entries = BTreeMap::new();
    for name in files {
        validate_name(name)?;
        entries.insert(name.to_string(), hash_file(&score_dir.join(name))?);
    }

    let lines: Vec<String> = entries
        .into_iter()
        .map(|(name, hash)| format!("{hash}  {name}"))
        .collect();
    fs::write(score_dir.join(CHECKSUMS_FILE), lines.join("\n") + "\n")
        .map_err(|e| AppError::internal(format!("write checksums failed: {e}")))
}

pub fn verify_checksums(score_dir: &Path) -> AppResult<()> {
    let content = fs::read_to_string(score_dir.join(CHECKSUMS_FILE))
        .map_err(|e| AppError::validation(format!("missing {CHECKSUMS_FILE}: {e}")))?;

    let mut entries = BTreeMap::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (hash, name) = line
            .split_once("  ")
            .ok_or_else(|| AppError::validation("invalid checksums line"))?;
        let name = name.trim();
        validate_name(name)?;
        if entries
            .insert(name.to_string(), hash.trim().to_string())
            .is_some()
        {
            return Err(AppError::validation("duplicate checksums entry"));
        }
    }

    let present: BTreeSet<&str> = entries.keys().map(String::as_str).collect();
    for required in REQUIRED_FILES {
        if !present.contains(required) {
            return Err(AppError::validation(format!(
                "checksums missing required entry {required}"
            )));
        }
    }

    for (name, expected) in &entries {
        let actual = hash_file(&score_dir.join(name))?;
        if &actual != expected {
            return Err(AppError::validation(format!("checksum mismatch for {name}")));
        }
    }
    Ok(())
}

pub(crate) fn hash_file(path: &Path) -> AppResult<String> {
    let mut file = fs::File::open(path)
        .map_err(|e| AppError::validation(format!("missing file {}: {e}", path.display())))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| AppError::validation(format!("read error {}: {e}", path.display())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(AppError::validation("invalid checksums filename"));
    }
    Ok(())
}
