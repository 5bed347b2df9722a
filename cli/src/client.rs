use std::rc::Rc;
use std::str::FromStr;

use anchor_client::solana_client::rpc_client::RpcClient;
use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature, Signer},
    system_program,
};
use anchor_client::{Client, Cluster, Program};
use anyhow::{anyhow, Context, Result};
use digital_signatures_contract::{
    accounts, codec, instruction,
    state::{RecordName, RegistryRecord},
    AppendSignatureArgs, InitializeArgs, STORAGE_SEED,
};
use tracing::{debug, info};

use crate::{websocket_url, DsigConfig, DsigError};

/// Registry account address for `authority` and `id` under `program_id`.
pub fn storage_address(program_id: &Pubkey, authority: &Pubkey, id: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[STORAGE_SEED, authority.as_ref(), &id.to_le_bytes()],
        program_id,
    )
    .0
}

pub fn load_keypair(path: &std::path::Path) -> Result<Keypair> {
    read_keypair_file(path).map_err(|e| anyhow!("read keypair at {}: {}", path.display(), e))
}

fn commitment(cfg: &DsigConfig) -> Result<CommitmentConfig> {
    CommitmentConfig::from_str(&cfg.commitment)
        .map_err(|_| anyhow!("unknown commitment level {}", cfg.commitment))
}

/// Fetches and decodes a registry account without needing a wallet.
pub fn fetch_registry(cfg: &DsigConfig, address: &Pubkey) -> Result<RegistryRecord> {
    let rpc = RpcClient::new_with_commitment(cfg.rpc_url.clone(), commitment(cfg)?);
    let account = rpc
        .get_account_with_commitment(address, rpc.commitment())
        .with_context(|| format!("fetch account {address}"))?
        .value
        .ok_or(DsigError::RegistryNotFound(*address))?;

    let program_id = cfg.program_id()?;
    if account.owner != program_id {
        return Err(DsigError::ForeignAccount {
            address: *address,
            owner: account.owner,
        }
        .into());
    }
    debug!(%address, len = account.data.len(), "decoding registry account");
    codec::decode(&account.data).map_err(|e| anyhow!("decode registry {address}: {e}"))
}

/// Wallet-backed access to the registry program. The wallet pays for and signs every
/// transaction and is the authority of the registries it creates.
pub struct RegistryClient {
    program: Program<Rc<Keypair>>,
    wallet: Rc<Keypair>,
}

impl RegistryClient {
    pub fn connect(cfg: &DsigConfig) -> Result<Self> {
        let wallet = Rc::new(load_keypair(&cfg.keypair_path)?);
        let cluster = Cluster::Custom(cfg.rpc_url.clone(), websocket_url(&cfg.rpc_url));
        let client = Client::new_with_options(cluster, wallet.clone(), commitment(cfg)?);
        let program = client
            .program(cfg.program_id()?)
            .context("load registry program")?;
        Ok(Self { program, wallet })
    }

    pub fn authority(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    pub fn wallet(&self) -> &Keypair {
        &self.wallet
    }

    pub fn storage_address(&self, id: u64) -> Pubkey {
        storage_address(&self.program.id(), &self.authority(), id)
    }

    pub fn initialize(&self, id: u64, name: &str) -> Result<(Pubkey, Signature)> {
        // Same bound the program enforces; failing here saves a transaction fee.
        RecordName::new(name).map_err(|e| anyhow!("name {name:?}: {e}"))?;

        let storage = self.storage_address(id);
        let signature = self
            .program
            .request()
            .accounts(accounts::Initialize {
                authority: self.authority(),
                init_storage: storage,
                system_program: system_program::ID,
            })
            .args(instruction::Initialize {
                args: InitializeArgs {
                    id,
                    name_storage: name.to_string(),
                },
            })
            .send()
            .context("send initialize transaction")?;
        info!(%storage, %signature, id, "registry initialized");
        Ok((storage, signature))
    }

    /// Signs `message_digest` with `signer` and records the result in registry `id`.
    pub fn append_signature(
        &self,
        id: u64,
        signer: &Keypair,
        message_digest: [u8; 32],
    ) -> Result<Signature> {
        let storage = self.storage_address(id);
        let signed = signer.sign_message(&message_digest);
        let signature_bytes: [u8; 64] = signed
            .as_ref()
            .try_into()
            .context("ed25519 signature length")?;

        let signature = self
            .program
            .request()
            .accounts(accounts::AppendSignature {
                authority: self.authority(),
                storage,
            })
            .args(instruction::AppendSignature {
                args: AppendSignatureArgs {
                    signer: signer.pubkey(),
                    message_digest,
                    signature: signature_bytes,
                },
            })
            .send()
            .context("send append_signature transaction")?;
        info!(%storage, %signature, signer = %signer.pubkey(), "signature appended");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_address_matches_program_derivation() {
        let authority = Pubkey::new_unique();
        assert_eq!(
            storage_address(&digital_signatures_contract::ID, &authority, 1),
            digital_signatures_contract::storage_address(&authority, 1).0
        );
        assert_ne!(
            storage_address(&Pubkey::new_unique(), &authority, 1),
            storage_address(&digital_signatures_contract::ID, &authority, 1)
        );
    }
}
