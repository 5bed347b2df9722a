use anchor_lang::prelude::*;

// Each family gets its own offset so a client can tell them apart by code alone.

#[error_code(offset = 6000)]
pub enum DecodeError {
    #[msg("Account data is shorter than the registry header")]
    TooShort,
    #[msg("Unrecognized registry state byte")]
    InvalidState,
    #[msg("Stored name is longer than 32 bytes")]
    NameTooLong,
    #[msg("Stored name is not valid UTF-8")]
    InvalidName,
    #[msg("Signature ledger slots are corrupt")]
    CorruptLedger,
}

#[error_code(offset = 6100)]
pub enum InitError {
    #[msg("Registry account is already initialized")]
    AlreadyInitialized,
    #[msg("Name must be at most 32 bytes of UTF-8")]
    InvalidName,
    #[msg("Storage account is owned by another program")]
    ForeignAccount,
}

#[error_code(offset = 6200)]
pub enum AuthError {
    #[msg("Authority did not sign the transaction")]
    NotSigner,
    #[msg("Signer is not the registry authority")]
    MismatchedAuthority,
}

#[error_code(offset = 6300)]
pub enum LedgerError {
    #[msg("Registry account is not initialized")]
    NotInitialized,
    #[msg("Signature ledger is full")]
    CapacityExceeded,
    #[msg("Entry time is earlier than the previous entry")]
    NonMonotonicTime,
}
