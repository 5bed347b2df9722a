use anchor_lang::prelude::*;

use crate::{error::AuthError, state::RegistryRecord};

/// Checks that `claimed_authority` may mutate `record`.
///
/// A blank record accepts any signer, since initialization is what binds the authority. Once
/// initialized, only the stored authority passes.
pub fn authorize(
    record: &RegistryRecord,
    claimed_authority: &Pubkey,
    is_signer: bool,
) -> std::result::Result<(), AuthError> {
    if !is_signer {
        return Err(AuthError::NotSigner);
    }
    if record.is_initialized() && record.authority() != claimed_authority {
        return Err(AuthError::MismatchedAuthority);
    }
    Ok(())
}
