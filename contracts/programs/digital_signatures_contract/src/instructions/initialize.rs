use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::{
    authority::authorize,
    codec::{self, account_size},
    error::InitError,
    events::RegistryInitialized,
    state::{self, RegistryRecord},
    SIGNATURE_CAPACITY, STORAGE_SEED,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeArgs {
    pub id: u64,
    pub name_storage: String,
}

// init storage account for a registry of signed agreements, one per (authority, id)
#[derive(Accounts)]
#[instruction(args: InitializeArgs)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,
    /// CHECK: created by the handler when empty; its bytes are decoded and validated there
    #[account(
        mut,
        seeds = [STORAGE_SEED, authority.key().as_ref(), &args.id.to_le_bytes()],
        bump
    )]
    pub init_storage: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handle_initialize(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
    let authority = &ctx.accounts.authority;
    let storage = &ctx.accounts.init_storage;

    if storage.data_is_empty() {
        let authority_key = authority.key();
        let id_bytes = args.id.to_le_bytes();
        let bump = [ctx.bumps.init_storage];
        let seeds: &[&[u8]] = &[STORAGE_SEED, authority_key.as_ref(), &id_bytes, &bump];
        create_storage(
            authority,
            storage,
            &ctx.accounts.system_program,
            &[seeds],
            account_size(SIGNATURE_CAPACITY),
        )?;
    } else if storage.owner != &crate::ID {
        return Err(InitError::ForeignAccount.into());
    }

    let record = {
        let mut data = storage.try_borrow_mut_data()?;
        apply_initialize(&mut data, &authority.key(), authority.is_signer, &args)?
    };

    msg!(
        "Registry {} initialized: id={} name={} capacity={}",
        storage.key(),
        record.id(),
        record.name(),
        record.capacity()
    );
    emit!(RegistryInitialized {
        storage: storage.key(),
        authority: *record.authority(),
        id: record.id(),
        capacity: record.capacity() as u32,
    });
    Ok(())
}

/// Runs the initialize transition over raw account bytes. `data` is only written once every
/// check has passed.
pub fn apply_initialize(
    data: &mut [u8],
    authority: &Pubkey,
    is_signer: bool,
    args: &InitializeArgs,
) -> Result<RegistryRecord> {
    let current = codec::decode(data)?;
    authorize(&current, authority, is_signer)?;
    let next = state::initialize(&current, args.id, &args.name_storage, *authority)?;
    codec::write_to(&next, data)?;
    Ok(next)
}

// Mirrors what Anchor's `init` does for a PDA, including the case where someone already sent
// lamports to the address.
fn create_storage<'info>(
    payer: &Signer<'info>,
    storage: &UncheckedAccount<'info>,
    system: &Program<'info, System>,
    signer_seeds: &[&[&[u8]]],
    space: usize,
) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(space);
    let current_lamports = storage.lamports();

    if current_lamports == 0 {
        return system_program::create_account(
            CpiContext::new_with_signer(
                system.to_account_info(),
                CreateAccount {
                    from: payer.to_account_info(),
                    to: storage.to_account_info(),
                },
                signer_seeds,
            ),
            rent,
            space as u64,
            &crate::ID,
        );
    }

    let top_up = rent.max(1).saturating_sub(current_lamports);
    if top_up > 0 {
        system_program::transfer(
            CpiContext::new(
                system.to_account_info(),
                Transfer {
                    from: payer.to_account_info(),
                    to: storage.to_account_info(),
                },
            ),
            top_up,
        )?;
    }
    system_program::allocate(
        CpiContext::new_with_signer(
            system.to_account_info(),
            Allocate {
                account_to_allocate: storage.to_account_info(),
            },
            signer_seeds,
        ),
        space as u64,
    )?;
    system_program::assign(
        CpiContext::new_with_signer(
            system.to_account_info(),
            Assign {
                account_to_assign: storage.to_account_info(),
            },
            signer_seeds,
        ),
        &crate::ID,
    )
}
