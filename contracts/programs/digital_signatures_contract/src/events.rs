use anchor_lang::prelude::*;

#[event]
pub struct RegistryInitialized {
    pub storage: Pubkey,
    pub authority: Pubkey,
    pub id: u64,
    pub capacity: u32,
}

#[event]
pub struct SignatureAppended {
    pub storage: Pubkey,
    pub sequence: u64,
    pub signer: Pubkey,
    pub message_digest: [u8; 32],
    pub recorded_at: u64,
}
