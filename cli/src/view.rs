use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use digital_signatures_contract::state::{RegistryRecord, RegistryState, SignatureEntry};
use serde::Serialize;

use crate::digest::format_digest;

/// Printable form of a registry account, used for both the table and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryView {
    pub address: String,
    pub state: &'static str,
    pub id: u64,
    pub name: String,
    pub authority: String,
    pub capacity: usize,
    pub signatures: Vec<EntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub sequence: u64,
    pub signer: String,
    /// Hex.
    pub message_digest: String,
    /// Base64 in JSON, base58 in the table (the form Solana tools print).
    pub signature: String,
    pub recorded_at: u64,
    #[serde(skip)]
    signature_b58: String,
}

impl RegistryView {
    pub fn new(address: impl ToString, record: &RegistryRecord) -> Self {
        Self {
            address: address.to_string(),
            state: match record.state() {
                RegistryState::Uninitialized => "uninitialized",
                RegistryState::Initialized => "initialized",
            },
            id: record.id(),
            name: record.name().to_string(),
            authority: record.authority().to_string(),
            capacity: record.capacity(),
            signatures: record.signatures().iter().map(EntryView::from).collect(),
        }
    }
}

impl From<&SignatureEntry> for EntryView {
    fn from(entry: &SignatureEntry) -> Self {
        Self {
            sequence: entry.sequence,
            signer: entry.signer.to_string(),
            message_digest: format_digest(&entry.message_digest),
            signature: STANDARD.encode(entry.signature),
            recorded_at: entry.recorded_at,
            signature_b58: bs58::encode(entry.signature).into_string(),
        }
    }
}

impl fmt::Display for RegistryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "address={}", self.address)?;
        writeln!(f, "state={}", self.state)?;
        writeln!(f, "id={}", self.id)?;
        writeln!(f, "name={}", self.name)?;
        writeln!(f, "authority={}", self.authority)?;
        write!(f, "signatures={}/{}", self.signatures.len(), self.capacity)?;
        for entry in &self.signatures {
            write!(
                f,
                "\n#{} slot={} signer={} digest={} signature={}",
                entry.sequence,
                entry.recorded_at,
                entry.signer,
                entry.message_digest,
                entry.signature_b58
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::prelude::Pubkey;
    use digital_signatures_contract::{
        ledger::{append, digest_message, PendingSignature},
        state::initialize,
    };

    fn record() -> RegistryRecord {
        let record = initialize(&RegistryRecord::blank(2), 1, "Test", Pubkey::new_unique()).unwrap();
        append(
            &record,
            PendingSignature {
                signer: Pubkey::new_unique(),
                message_digest: digest_message(b"abc"),
                signature: [1u8; 64],
                recorded_at: 12,
            },
        )
        .unwrap()
    }

    #[test]
    fn json_shape() {
        let view = RegistryView::new(Pubkey::new_unique(), &record());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["state"], "initialized");
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Test");
        assert_eq!(json["capacity"], 2);
        let entry = &json["signatures"][0];
        assert_eq!(entry["sequence"], 0);
        assert_eq!(entry["recorded_at"], 12);
        assert_eq!(
            entry["message_digest"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(entry["signature"], STANDARD.encode([1u8; 64]));
        assert!(entry.get("signature_b58").is_none());
    }

    #[test]
    fn table_lists_entries() {
        let text = RegistryView::new("Addr111", &record()).to_string();
        assert!(text.starts_with("address=Addr111\nstate=initialized\n"));
        assert!(text.contains("signatures=1/2"));
        assert!(text.contains("#0 slot=12"));
    }
}
