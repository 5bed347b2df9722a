use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::DsigError;

/// SHA-256 of a file, streamed so large documents are never held in memory.
pub fn file_digest(path: &Path) -> Result<[u8; 32]> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(hasher.finalize().into())
}

/// Parses 64 hex characters, optionally prefixed with `sha256:` as container registries print
/// them.
pub fn parse_digest_hex(input: &str) -> Result<[u8; 32]> {
    let trimmed = input.trim();
    let hex_part = trimmed.strip_prefix("sha256:").unwrap_or(trimmed);
    let bytes = hex::decode(hex_part).map_err(|e| DsigError::InvalidDigest(e.to_string()))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        DsigError::InvalidDigest(format!("expected 32 bytes, got {}", bytes.len())).into()
    })
}

pub fn format_digest(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use digital_signatures_contract::ledger::digest_message;

    #[test]
    fn file_digest_matches_in_memory_digest() {
        let path = std::env::temp_dir().join(format!("dsig-digest-{}.txt", std::process::id()));
        std::fs::write(&path, b"I agree to the terms").unwrap();

        let digest = file_digest(&path).unwrap();
        assert_eq!(digest, digest_message(b"I agree to the terms"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn parse_accepts_prefixed_and_bare_hex() {
        let digest = digest_message(b"abc");
        let hex = format_digest(&digest);
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        assert_eq!(parse_digest_hex(&hex).unwrap(), digest);
        assert_eq!(parse_digest_hex(&format!("sha256:{hex}")).unwrap(), digest);
    }

    #[test]
    fn parse_rejects_wrong_length_and_bad_hex() {
        assert!(parse_digest_hex("abcd").is_err());
        assert!(parse_digest_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(file_digest(Path::new("/definitely/not/here.pdf")).is_err());
    }
}
