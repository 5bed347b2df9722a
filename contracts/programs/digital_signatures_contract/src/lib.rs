#![allow(deprecated)]
// Temporary: Anchor macro emits a deprecated realloc; safe to ignore here
use anchor_lang::prelude::*;

pub mod authority;
pub mod codec;
pub mod error;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod state;

pub use instructions::*;

declare_id!("HihBXbXfk1N6gucytEDMcCEVzvs3NgePrgsTRCq7Sdzz");

/// Seed prefix of registry storage PDAs: `[STORAGE_SEED, authority, id (u64 LE)]`.
pub const STORAGE_SEED: &[u8] = b"storage";

/// Signature slots allocated for every new registry account.
pub const SIGNATURE_CAPACITY: usize = 16;

#[program]
pub mod digital_signatures_contract {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
        instructions::initialize::handle_initialize(ctx, args)
    }

    pub fn append_signature(
        ctx: Context<AppendSignature>,
        args: AppendSignatureArgs,
    ) -> Result<()> {
        instructions::append_signature::handle_append_signature(ctx, args)
    }
}

/// Address of the registry account `authority` owns under `id`.
pub fn storage_address(authority: &Pubkey, id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[STORAGE_SEED, authority.as_ref(), &id.to_le_bytes()],
        &crate::ID,
    )
}
