use std::path::Path;

use anyhow::Result;
use dsig::{
    client::RegistryClient, digest::file_digest, load_config_with_overrides, ConfigOverrides,
};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_config_with_overrides(ConfigOverrides::default())?;
    let client = RegistryClient::connect(&config)?;

    // Example: record a signature over a contract document in registry 1
    let document = Path::new("Cargo.toml");
    let digest = file_digest(document)?;
    println!("Signing {} with {}", document.display(), client.authority());

    match client.append_signature(1, client.wallet(), digest) {
        Ok(signature) => {
            println!("✅ Document signed!");
            println!("Transaction signature: {}", signature);
            println!("Registry account: {}", client.storage_address(1));
        }
        Err(e) => {
            println!("❌ Failed to sign document: {}", e);
            println!("Make sure:");
            println!("1. Registry 1 exists (dsig init 1 <name>)");
            println!("2. The wallet is its authority");
            println!("3. Solana configuration is correct");
        }
    }

    Ok(())
}
