use anchor_client::{
    solana_client::rpc_client::RpcClient,
    solana_sdk::{
        commitment_config::CommitmentConfig,
        native_token::LAMPORTS_PER_SOL,
        pubkey::Pubkey,
        signature::Keypair,
        signer::Signer,
        system_program,
    },
    Client, Cluster,
};
use digital_signatures_contract::{
    accounts, codec, instruction, AppendSignatureArgs, InitializeArgs, STORAGE_SEED,
};
use sha2::{Digest, Sha256};
use std::rc::Rc;

fn decode(data: &[u8]) -> anyhow::Result<digital_signatures_contract::state::RegistryRecord> {
    codec::decode(data).map_err(|e| anyhow::anyhow!("decode registry: {e}"))
}

fn airdrop(connection: &RpcClient, to: &Pubkey) -> anyhow::Result<()> {
    let signature = connection.request_airdrop(to, 2 * LAMPORTS_PER_SOL)?;
    while !connection.confirm_transaction(&signature)? {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🚀 Starting digital signatures registry test");

    let connection = RpcClient::new_with_commitment(
        "http://127.0.0.1:8899", // Local validator URL
        CommitmentConfig::confirmed(),
    );

    let authority = Keypair::new();
    let intruder = Keypair::new();
    println!("Generated Keypairs:");
    println!("   Authority: {}", authority.pubkey());
    println!("   Intruder: {}", intruder.pubkey());

    println!("\n💰 Requesting airdrops");
    airdrop(&connection, &authority.pubkey())?;
    airdrop(&connection, &intruder.pubkey())?;
    println!("   ✅ Airdrops confirmed!");

    let authority_key = authority.pubkey();
    let provider = Client::new_with_options(
        Cluster::Localnet,
        Rc::new(authority),
        CommitmentConfig::confirmed(),
    );
    let program = provider.program(digital_signatures_contract::ID)?;

    let id = 1u64;
    let (storage, _bump) = Pubkey::find_program_address(
        &[STORAGE_SEED, authority_key.as_ref(), &id.to_le_bytes()],
        &program.id(),
    );
    println!("\n📝 Test 1: initialize registry {id} at {storage}");

    let initialize = || {
        program
            .request()
            .accounts(accounts::Initialize {
                authority: authority_key,
                init_storage: storage,
                system_program: system_program::ID,
            })
            .args(instruction::Initialize {
                args: InitializeArgs {
                    id,
                    name_storage: "Test".to_string(),
                },
            })
    };
    let signature = initialize().send().await?;
    println!("   ✅ Transaction confirmed: {}", signature);

    let record = decode(&connection.get_account_data(&storage)?)?;
    assert!(record.is_initialized());
    assert_eq!(record.id(), 1);
    assert_eq!(record.name(), "Test");
    assert!(record.signatures().is_empty());
    println!("   ✅ Registry initialized with {} free slots", record.capacity());

    println!("\n🔄 Test 2: second initialize (should fail)");
    let before = connection.get_account_data(&storage)?;
    match initialize().send().await {
        Ok(_) => println!("   ❌ ERROR: re-initialization should have failed!"),
        Err(e) => {
            println!("   ✅ Re-initialization correctly rejected!");
            println!("   Error: {}", e);
        }
    }
    assert_eq!(connection.get_account_data(&storage)?, before);

    println!("\n✍️  Test 3: append a signature");
    let signer = Keypair::new();
    let digest: [u8; 32] = Sha256::digest(b"lease agreement v1").into();
    let signed: [u8; 64] = signer.sign_message(&digest).as_ref().try_into()?;
    let signature = program
        .request()
        .accounts(accounts::AppendSignature {
            authority: authority_key,
            storage,
        })
        .args(instruction::AppendSignature {
            args: AppendSignatureArgs {
                signer: signer.pubkey(),
                message_digest: digest,
                signature: signed,
            },
        })
        .send()
        .await?;
    println!("   ✅ Transaction confirmed: {}", signature);

    let record = decode(&connection.get_account_data(&storage)?)?;
    let entry = &record.signatures()[0];
    assert_eq!(entry.sequence, 0);
    assert_eq!(entry.signer, signer.pubkey());
    assert_eq!(entry.message_digest, digest);
    println!("   ✅ Entry #0 recorded at slot {}", entry.recorded_at);

    println!("\n🚫 Test 4: append by a non-authority (should fail)");
    let intruder_key = intruder.pubkey();
    let intruder_client = Client::new_with_options(
        Cluster::Localnet,
        Rc::new(intruder),
        CommitmentConfig::confirmed(),
    );
    let intruder_program = intruder_client.program(digital_signatures_contract::ID)?;
    let before = connection.get_account_data(&storage)?;
    let result = intruder_program
        .request()
        .accounts(accounts::AppendSignature {
            authority: intruder_key,
            storage,
        })
        .args(instruction::AppendSignature {
            args: AppendSignatureArgs {
                signer: intruder_key,
                message_digest: digest,
                signature: [0u8; 64],
            },
        })
        .send()
        .await;
    match result {
        Ok(_) => println!("   ❌ ERROR: non-authority append should have failed!"),
        Err(e) => {
            println!("   ✅ Non-authority append correctly rejected!");
            println!("   Error: {}", e);
        }
    }
    assert_eq!(connection.get_account_data(&storage)?, before);

    println!("\n🎉 All tests passed successfully!");
    println!("   - Registry initialization works");
    println!("   - Re-initialization is rejected");
    println!("   - Authority can append signatures");
    println!("   - Other wallets cannot append");

    Ok(())
}
