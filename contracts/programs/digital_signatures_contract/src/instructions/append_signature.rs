use anchor_lang::prelude::*;

use crate::{
    authority::authorize,
    codec,
    events::SignatureAppended,
    ledger::{self, PendingSignature},
    state::RegistryRecord,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct AppendSignatureArgs {
    pub signer: Pubkey,
    pub message_digest: [u8; 32],
    pub signature: [u8; 64],
}

#[derive(Accounts)]
pub struct AppendSignature<'info> {
    /// CHECK: signer flag and identity are checked against the stored authority in the handler
    pub authority: UncheckedAccount<'info>,
    /// CHECK: decoded by the handler; ownership pins it to a registry this program created
    #[account(mut, owner = crate::ID)]
    pub storage: UncheckedAccount<'info>,
}

pub fn handle_append_signature(
    ctx: Context<AppendSignature>,
    args: AppendSignatureArgs,
) -> Result<()> {
    let authority = &ctx.accounts.authority;
    let storage = &ctx.accounts.storage;
    let slot = Clock::get()?.slot;

    let record = {
        let mut data = storage.try_borrow_mut_data()?;
        apply_append_signature(&mut data, &authority.key(), authority.is_signer, &args, slot)?
    };
    let Some(entry) = record.signatures().last() else {
        return Ok(());
    };

    msg!(
        "Signature #{} recorded on {} by {}",
        entry.sequence,
        storage.key(),
        entry.signer
    );
    emit!(SignatureAppended {
        storage: storage.key(),
        sequence: entry.sequence,
        signer: entry.signer,
        message_digest: entry.message_digest,
        recorded_at: entry.recorded_at,
    });
    Ok(())
}

/// Appends one entry to the ledger held in `data`, stamped with `slot`.
pub fn apply_append_signature(
    data: &mut [u8],
    authority: &Pubkey,
    is_signer: bool,
    args: &AppendSignatureArgs,
    slot: u64,
) -> Result<RegistryRecord> {
    let current = codec::decode(data)?;
    authorize(&current, authority, is_signer)?;
    let next = ledger::append(
        &current,
        PendingSignature {
            signer: args.signer,
            message_digest: args.message_digest,
            signature: args.signature,
            recorded_at: slot,
        },
    )?;
    codec::write_to(&next, data)?;
    Ok(next)
}
