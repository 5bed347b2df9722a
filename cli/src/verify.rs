use anchor_lang::prelude::Pubkey;
use digital_signatures_contract::{
    ledger::{self, SignatureVerifier},
    state::{RegistryRecord, SignatureEntry},
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::Serialize;

/// Ed25519 over the raw digest bytes, which is what a Solana keypair produces with
/// `sign_message`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, signer: &Pubkey, message: &[u8], signature: &[u8; 64]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&signer.to_bytes()) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(signature)).is_ok()
    }
}

/// Which ledger entries to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Digest([u8; 32]),
    Sequence(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub sequence: u64,
    pub signer: String,
    pub valid: bool,
}

impl Outcome {
    fn of(entry: &SignatureEntry, verifier: &impl SignatureVerifier) -> Self {
        Self {
            sequence: entry.sequence,
            signer: entry.signer.to_string(),
            valid: ledger::verify(entry, verifier),
        }
    }
}

pub fn verify_entries(
    record: &RegistryRecord,
    selection: Selection,
    verifier: &impl SignatureVerifier,
) -> Vec<Outcome> {
    match selection {
        Selection::All => record
            .signatures()
            .iter()
            .map(|entry| Outcome::of(entry, verifier))
            .collect(),
        Selection::Digest(digest) => record
            .find_by_digest(&digest)
            .map(|entry| Outcome::of(entry, verifier))
            .collect(),
        Selection::Sequence(sequence) => record
            .entry(sequence)
            .map(|entry| Outcome::of(entry, verifier))
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digital_signatures_contract::{
        codec,
        instructions::{apply_append_signature, apply_initialize, AppendSignatureArgs, InitializeArgs},
        ledger::digest_message,
    };
    use ed25519_dalek::{Signer, SigningKey};

    fn signed(key: &SigningKey, payload: &[u8]) -> AppendSignatureArgs {
        let message_digest = digest_message(payload);
        AppendSignatureArgs {
            signer: Pubkey::new_from_array(key.verifying_key().to_bytes()),
            message_digest,
            signature: key.sign(&message_digest).to_bytes(),
        }
    }

    fn registry_with(entries: &[AppendSignatureArgs]) -> RegistryRecord {
        let authority = Pubkey::new_unique();
        let mut data = vec![0u8; codec::account_size(4)];
        let init = InitializeArgs {
            id: 7,
            name_storage: "leases".to_string(),
        };
        apply_initialize(&mut data, &authority, true, &init).unwrap();
        for (slot, args) in entries.iter().enumerate() {
            apply_append_signature(&mut data, &authority, true, args, slot as u64).unwrap();
        }
        codec::decode(&data).unwrap()
    }

    #[test]
    fn genuine_signature_verifies() {
        let key = SigningKey::from_bytes(&[11u8; 32]);
        let record = registry_with(&[signed(&key, b"lease.pdf")]);

        let outcomes = verify_entries(&record, Selection::All, &Ed25519Verifier);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].valid);
    }

    #[test]
    fn forged_signature_fails() {
        let alice = SigningKey::from_bytes(&[1u8; 32]);
        let mallory = SigningKey::from_bytes(&[2u8; 32]);
        let mut forged = signed(&mallory, b"lease.pdf");
        forged.signer = Pubkey::new_from_array(alice.verifying_key().to_bytes());

        let record = registry_with(&[signed(&alice, b"nda.pdf"), forged]);
        let outcomes = verify_entries(&record, Selection::All, &Ed25519Verifier);
        assert_eq!(
            outcomes.iter().map(|o| o.valid).collect::<Vec<_>>(),
            vec![true, false]
        );
    }

    #[test]
    fn selection_by_digest_and_sequence() {
        let key = SigningKey::from_bytes(&[5u8; 32]);
        let record = registry_with(&[
            signed(&key, b"a"),
            signed(&key, b"b"),
            signed(&key, b"a"),
        ]);

        let by_digest = verify_entries(&record, Selection::Digest(digest_message(b"a")), &Ed25519Verifier);
        assert_eq!(
            by_digest.iter().map(|o| o.sequence).collect::<Vec<_>>(),
            vec![0, 2]
        );

        let by_sequence = verify_entries(&record, Selection::Sequence(1), &Ed25519Verifier);
        assert_eq!(by_sequence.len(), 1);
        assert_eq!(by_sequence[0].sequence, 1);

        assert!(verify_entries(&record, Selection::Sequence(9), &Ed25519Verifier).is_empty());
    }
}
