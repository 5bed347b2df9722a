use anchor_lang::prelude::*;

use crate::error::InitError;

/// Longest name a registry accepts, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Lifecycle flag, persisted as the first byte of the account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RegistryState {
    #[default]
    Uninitialized = 0,
    Initialized = 1,
}

impl RegistryState {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Initialized),
            _ => None,
        }
    }
}

/// UTF-8 label of at most [`MAX_NAME_LEN`] bytes. Longer input is rejected, never truncated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordName(String);

impl RecordName {
    pub fn new(name: impl Into<String>) -> std::result::Result<Self, InitError> {
        let name = name.into();
        if name.len() > MAX_NAME_LEN {
            return Err(InitError::InvalidName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEntry {
    pub sequence: u64,
    pub signer: Pubkey,
    /// Digest of the signed payload, never the payload itself.
    pub message_digest: [u8; 32],
    pub signature: [u8; 64],
    /// Slot at which the entry was recorded.
    pub recorded_at: u64,
}

/// Decoded view of one registry account.
///
/// Records are only advanced through [`initialize`] and [`crate::ledger::append`], which is what
/// keeps the lifecycle and sequence invariants intact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryRecord {
    pub(crate) state: RegistryState,
    pub(crate) id: u64,
    pub(crate) name: RecordName,
    pub(crate) authority: Pubkey,
    pub(crate) signatures: Vec<SignatureEntry>,
    pub(crate) capacity: usize,
}

impl RegistryRecord {
    /// An uninitialized record backed by an account with `capacity` signature slots.
    pub fn blank(capacity: usize) -> Self {
        Self {
            state: RegistryState::Uninitialized,
            id: 0,
            name: RecordName::default(),
            authority: Pubkey::default(),
            signatures: Vec::new(),
            capacity,
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == RegistryState::Initialized
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    pub fn signatures(&self) -> &[SignatureEntry] {
        &self.signatures
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.signatures.len())
    }

    pub fn entry(&self, sequence: u64) -> Option<&SignatureEntry> {
        usize::try_from(sequence)
            .ok()
            .and_then(|index| self.signatures.get(index))
    }

    /// Every entry recorded for `digest`, oldest first.
    pub fn find_by_digest<'a>(
        &'a self,
        digest: &'a [u8; 32],
    ) -> impl Iterator<Item = &'a SignatureEntry> + 'a {
        self.signatures
            .iter()
            .filter(move |entry| &entry.message_digest == digest)
    }
}

/// Moves a blank record to `Initialized`.
///
/// The returned record keeps the account's capacity and starts with an empty ledger.
pub fn initialize(
    record: &RegistryRecord,
    id: u64,
    name: &str,
    authority: Pubkey,
) -> std::result::Result<RegistryRecord, InitError> {
    if record.is_initialized() {
        return Err(InitError::AlreadyInitialized);
    }
    let name = RecordName::new(name)?;

    Ok(RegistryRecord {
        state: RegistryState::Initialized,
        id,
        name,
        authority,
        signatures: Vec::new(),
        capacity: record.capacity,
    })
}
