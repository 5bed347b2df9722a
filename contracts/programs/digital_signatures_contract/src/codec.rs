//! Fixed layout of a registry account.
//!
//! ```text
//! state u8 | id u64 LE | name_len u8 | name [u8; 32] | authority [u8; 32] | slot * capacity
//! slot = tag u8 | sequence u64 LE | signer [u8; 32] | digest [u8; 32] | signature [u8; 64] | recorded_at u64 LE
//! ```
//!
//! Occupied slots have tag 1 and come first; the ledger ends at the first slot with tag 0.

use anchor_lang::prelude::*;

use crate::{
    error::DecodeError,
    state::{RecordName, RegistryRecord, RegistryState, SignatureEntry, MAX_NAME_LEN},
};

pub const HEADER_LEN: usize = 1 + 8 + 1 + MAX_NAME_LEN + 32;
pub const ENTRY_LEN: usize = 1 + 8 + 32 + 32 + 64 + 8;

const SLOT_EMPTY: u8 = 0;
const SLOT_USED: u8 = 1;

/// Bytes an account needs to hold `capacity` signatures.
pub const fn account_size(capacity: usize) -> usize {
    HEADER_LEN + capacity * ENTRY_LEN
}

/// Number of whole signature slots that fit in a buffer of `len` bytes.
pub const fn capacity_for(len: usize) -> usize {
    if len < HEADER_LEN {
        0
    } else {
        (len - HEADER_LEN) / ENTRY_LEN
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    // Callers only read within a length they have already checked.
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }
}

pub fn decode(data: &[u8]) -> std::result::Result<RegistryRecord, DecodeError> {
    if data.len() < HEADER_LEN {
        return Err(DecodeError::TooShort);
    }
    let capacity = capacity_for(data.len());
    let mut reader = Reader::new(data);

    let state = RegistryState::from_byte(reader.u8()).ok_or(DecodeError::InvalidState)?;
    if state == RegistryState::Uninitialized {
        return Ok(RegistryRecord::blank(capacity));
    }

    let id = reader.u64();
    let name_len = reader.u8() as usize;
    let name_bytes = reader.take::<MAX_NAME_LEN>();
    if name_len > MAX_NAME_LEN {
        return Err(DecodeError::NameTooLong);
    }
    let name = std::str::from_utf8(&name_bytes[..name_len])
        .map_err(|_| DecodeError::InvalidName)?
        .to_owned();
    let authority = Pubkey::new_from_array(reader.take());

    let mut signatures = Vec::new();
    let mut ended = false;
    for index in 0..capacity {
        match reader.u8() {
            SLOT_EMPTY => {
                ended = true;
                reader.offset += ENTRY_LEN - 1;
            }
            SLOT_USED if !ended => {
                let entry = SignatureEntry {
                    sequence: reader.u64(),
                    signer: Pubkey::new_from_array(reader.take()),
                    message_digest: reader.take(),
                    signature: reader.take(),
                    recorded_at: reader.u64(),
                };
                if entry.sequence != index as u64 {
                    return Err(DecodeError::CorruptLedger);
                }
                signatures.push(entry);
            }
            _ => return Err(DecodeError::CorruptLedger),
        }
    }

    Ok(RegistryRecord {
        state,
        id,
        // Length was checked above, so this cannot fail.
        name: RecordName::new(name).map_err(|_| DecodeError::NameTooLong)?,
        authority,
        signatures,
        capacity,
    })
}

pub fn encode(record: &RegistryRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(account_size(record.capacity));

    out.push(record.state as u8);
    out.extend_from_slice(&record.id.to_le_bytes());
    let name = record.name.as_str().as_bytes();
    out.push(name.len() as u8);
    out.extend_from_slice(name);
    out.resize(1 + 8 + 1 + MAX_NAME_LEN, 0);
    out.extend_from_slice(record.authority.as_ref());

    for entry in &record.signatures {
        out.push(SLOT_USED);
        out.extend_from_slice(&entry.sequence.to_le_bytes());
        out.extend_from_slice(entry.signer.as_ref());
        out.extend_from_slice(&entry.message_digest);
        out.extend_from_slice(&entry.signature);
        out.extend_from_slice(&entry.recorded_at.to_le_bytes());
    }
    out.resize(account_size(record.capacity), SLOT_EMPTY);
    out
}

/// Writes `record` over the front of an account buffer. Trailing bytes that do not make up a
/// whole slot are zeroed.
pub fn write_to(record: &RegistryRecord, dst: &mut [u8]) -> std::result::Result<(), DecodeError> {
    let encoded = encode(record);
    if dst.len() < encoded.len() {
        return Err(DecodeError::TooShort);
    }
    let (head, tail) = dst.split_at_mut(encoded.len());
    head.copy_from_slice(&encoded);
    tail.fill(0);
    Ok(())
}
