use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

use crate::{
    error::LedgerError,
    state::{RegistryRecord, SignatureEntry},
};

/// An entry as submitted, before the ledger assigns its sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSignature {
    pub signer: Pubkey,
    pub message_digest: [u8; 32],
    pub signature: [u8; 64],
    pub recorded_at: u64,
}

/// Signature scheme used to check ledger entries. Verification happens off-chain, so the
/// program only defines the seam.
pub trait SignatureVerifier {
    fn verify(&self, signer: &Pubkey, message: &[u8], signature: &[u8; 64]) -> bool;
}

/// SHA-256 of a payload, the digest form the ledger stores.
pub fn digest_message(payload: &[u8]) -> [u8; 32] {
    Sha256::digest(payload).into()
}

pub fn append(
    record: &RegistryRecord,
    pending: PendingSignature,
) -> std::result::Result<RegistryRecord, LedgerError> {
    if !record.is_initialized() {
        return Err(LedgerError::NotInitialized);
    }
    if record.remaining_capacity() == 0 {
        return Err(LedgerError::CapacityExceeded);
    }
    if let Some(last) = record.signatures.last() {
        if pending.recorded_at < last.recorded_at {
            return Err(LedgerError::NonMonotonicTime);
        }
    }

    let mut next = record.clone();
    next.signatures.push(SignatureEntry {
        sequence: record.signatures.len() as u64,
        signer: pending.signer,
        message_digest: pending.message_digest,
        signature: pending.signature,
        recorded_at: pending.recorded_at,
    });
    Ok(next)
}

/// Checks `entry.signature` over the stored digest with the entry's signer key.
pub fn verify(entry: &SignatureEntry, verifier: &impl SignatureVerifier) -> bool {
    verifier.verify(&entry.signer, &entry.message_digest, &entry.signature)
}
