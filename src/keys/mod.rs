use anyhow::{Result, anyhow};
use bip39::Mnemonic;
use rand::RngCore;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::wallets::models::WalletKeys;

/// Recovery phrase length used for every wallet in the fleet
pub const DEFAULT_WORD_COUNT: usize = 24;

/// All wallets live on the base workchain
pub const WORKCHAIN: i32 = 0;

/// Hex-encoded key pair derived from a mnemonic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Key derivation capability consumed by the registry and batch generator
pub trait KeyProvider {
    async fn generate_mnemonic(&self, word_count: usize) -> Result<Vec<String>>;

    async fn derive_key_pair(&self, mnemonic: &[String]) -> Result<KeyPair>;

    async fn compute_address(&self, workchain: i32, public_key: &str) -> Result<String>;
}

/// Run the full mnemonic -> key pair -> address pipeline for one wallet
pub async fn generate_wallet_keys<K: KeyProvider>(
    provider: &K,
    word_count: usize,
) -> Result<WalletKeys> {
    let mnemonic = provider.generate_mnemonic(word_count).await?;
    let pair = provider.derive_key_pair(&mnemonic).await?;
    let address = provider.compute_address(WORKCHAIN, &pair.public_key).await?;

    Ok(WalletKeys {
        address,
        mnemonic,
        public_key: pair.public_key,
        private_key: pair.private_key,
        workchain: WORKCHAIN,
    })
}

/// BIP-39 mnemonics with secp256k1 keys.
///
/// The secret key is the SHA-256 of the BIP-39 seed (empty passphrase) and the
/// address is `<workchain>:<hex(sha256(compressed public key))>`.
#[derive(Debug, Clone)]
pub struct Bip39KeyProvider {
    secp: Secp256k1<All>,
}

impl Bip39KeyProvider {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }
}

impl Default for Bip39KeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for Bip39KeyProvider {
    async fn generate_mnemonic(&self, word_count: usize) -> Result<Vec<String>> {
        if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
            return Err(anyhow!(
                "Unsupported mnemonic length {} (expected 12, 15, 18, 21 or 24)",
                word_count
            ));
        }

        let mut entropy = vec![0u8; word_count / 3 * 4];
        rand::thread_rng().fill_bytes(&mut entropy);

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| anyhow!("Failed to build mnemonic: {}", e))?;

        Ok(mnemonic
            .to_string()
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }

    async fn derive_key_pair(&self, mnemonic: &[String]) -> Result<KeyPair> {
        let phrase = mnemonic.join(" ");
        let mnemonic =
            Mnemonic::parse(&phrase).map_err(|e| anyhow!("Invalid mnemonic: {}", e))?;

        let seed = mnemonic.to_seed("");
        let digest = Sha256::digest(seed);
        let secret = SecretKey::from_slice(&digest)
            .map_err(|e| anyhow!("Seed does not yield a valid secret key: {}", e))?;
        let public = PublicKey::from_secret_key(&self.secp, &secret);

        Ok(KeyPair {
            public_key: hex::encode(public.serialize()),
            private_key: hex::encode(secret.secret_bytes()),
        })
    }

    async fn compute_address(&self, workchain: i32, public_key: &str) -> Result<String> {
        let bytes =
            hex::decode(public_key).map_err(|e| anyhow!("Public key is not hex: {}", e))?;
        let hash = Sha256::digest(bytes);
        Ok(format!("{}:{}", workchain, hex::encode(hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_mnemonic_word_count() -> Result<()> {
        let provider = Bip39KeyProvider::new();

        assert_eq!(provider.generate_mnemonic(24).await?.len(), 24);
        assert_eq!(provider.generate_mnemonic(12).await?.len(), 12);
        assert!(provider.generate_mnemonic(13).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_derivation_is_deterministic() -> Result<()> {
        let provider = Bip39KeyProvider::new();
        let words = provider.generate_mnemonic(DEFAULT_WORD_COUNT).await?;

        let first = provider.derive_key_pair(&words).await?;
        let second = provider.derive_key_pair(&words).await?;

        assert_eq!(first, second);
        assert_eq!(first.private_key.len(), 64);
        assert_eq!(first.public_key.len(), 66);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_mnemonic_rejected() {
        let provider = Bip39KeyProvider::new();
        let words = vec!["not".to_string(), "a".to_string(), "phrase".to_string()];

        assert!(provider.derive_key_pair(&words).await.is_err());
    }

    #[tokio::test]
    async fn test_generated_wallet_keys() -> Result<()> {
        let provider = Bip39KeyProvider::new();
        let keys = generate_wallet_keys(&provider, DEFAULT_WORD_COUNT).await?;

        assert_eq!(keys.workchain, WORKCHAIN);
        assert_eq!(keys.mnemonic.len(), DEFAULT_WORD_COUNT);
        assert!(keys.address.starts_with("0:"));
        assert_eq!(keys.address.len(), 2 + 64);
        Ok(())
    }
}
