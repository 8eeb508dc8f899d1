//! Deposit byte layouts: withdrawal credentials, deposit data roots and the
//! packed key/signature buffers batch deposit calls take

use alloy::primitives::{Address, Bytes, B256};
use anyhow::{ensure, Result};
use sha2::{Digest, Sha256};

pub const PUBKEY_LENGTH: usize = 48;
pub const SIGNATURE_LENGTH: usize = 96;

const BLS_WITHDRAWAL_PREFIX: u8 = 0x00;
const ETH1_ADDRESS_WITHDRAWAL_PREFIX: u8 = 0x01;

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// `0x00 ++ sha256(pubkey)[1..]`
pub fn bls_withdrawal_credentials(pubkey: &[u8]) -> Result<B256> {
    ensure!(
        pubkey.len() == PUBKEY_LENGTH,
        "BLS pubkey must be {} bytes, got {}",
        PUBKEY_LENGTH,
        pubkey.len()
    );
    let mut credentials = sha256(&[pubkey]);
    credentials[0] = BLS_WITHDRAWAL_PREFIX;
    Ok(B256::from(credentials))
}

/// `0x01 ++ 11 zero bytes ++ address`
pub fn eth1_withdrawal_credentials(address: Address) -> B256 {
    let mut credentials = [0u8; 32];
    credentials[0] = ETH1_ADDRESS_WITHDRAWAL_PREFIX;
    credentials[12..].copy_from_slice(address.as_slice());
    B256::from(credentials)
}

/// SSZ hash tree root of a `DepositData`, as checked by the beacon deposit
/// contract. `amount_gwei` is little-endian in the tree.
pub fn deposit_data_root(
    pubkey: &[u8],
    withdrawal_credentials: B256,
    signature: &[u8],
    amount_gwei: u64,
) -> Result<B256> {
    ensure!(
        pubkey.len() == PUBKEY_LENGTH,
        "pubkey must be {} bytes, got {}",
        PUBKEY_LENGTH,
        pubkey.len()
    );
    ensure!(
        signature.len() == SIGNATURE_LENGTH,
        "signature must be {} bytes, got {}",
        SIGNATURE_LENGTH,
        signature.len()
    );

    let zero = [0u8; 32];
    let pubkey_root = sha256(&[pubkey, &zero[..16]]);
    let signature_root = sha256(&[
        &sha256(&[&signature[..64]]),
        &sha256(&[&signature[64..], &zero]),
    ]);
    let amount = amount_gwei.to_le_bytes();

    let node = sha256(&[
        &sha256(&[&pubkey_root, withdrawal_credentials.as_slice()]),
        &sha256(&[&amount, &zero[..24], &signature_root]),
    ]);
    Ok(B256::from(node))
}

/// One validator deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositData {
    pub pubkey: Bytes,
    pub withdrawal_credentials: B256,
    pub signature: Bytes,
    pub amount_gwei: u64,
}

impl DepositData {
    pub fn new(
        pubkey: impl Into<Bytes>,
        withdrawal_credentials: B256,
        signature: impl Into<Bytes>,
        amount_gwei: u64,
    ) -> Result<Self> {
        let data = Self {
            pubkey: pubkey.into(),
            withdrawal_credentials,
            signature: signature.into(),
            amount_gwei,
        };
        // validates both lengths
        data.root()?;
        Ok(data)
    }

    pub fn root(&self) -> Result<B256> {
        deposit_data_root(
            &self.pubkey,
            self.withdrawal_credentials,
            &self.signature,
            self.amount_gwei,
        )
    }
}

/// Deposits packed the way batch entry points expect them: all pubkeys
/// back to back, all signatures back to back, roots in the same order
#[derive(Debug, Clone, Default)]
pub struct DepositBatch {
    deposits: Vec<DepositData>,
}

impl DepositBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, deposit: DepositData) -> &mut Self {
        self.deposits.push(deposit);
        self
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    pub fn pubkeys(&self) -> Bytes {
        self.deposits
            .iter()
            .flat_map(|d| d.pubkey.iter().copied())
            .collect::<Vec<u8>>()
            .into()
    }

    pub fn signatures(&self) -> Bytes {
        self.deposits
            .iter()
            .flat_map(|d| d.signature.iter().copied())
            .collect::<Vec<u8>>()
            .into()
    }

    pub fn roots(&self) -> Result<Vec<B256>> {
        self.deposits.iter().map(DepositData::root).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn test_eth1_credentials_layout() {
        let addr = address!("1234567890123456789012345678901234567890");
        let credentials = eth1_withdrawal_credentials(addr);
        assert_eq!(
            credentials,
            b256!("0100000000000000000000001234567890123456789012345678901234567890")
        );
    }

    #[test]
    fn test_bls_credentials_prefix() {
        let pubkey = [0xaa; PUBKEY_LENGTH];
        let credentials = bls_withdrawal_credentials(&pubkey).unwrap();
        let digest = sha256(&[&pubkey]);

        assert_eq!(credentials[0], 0x00);
        assert_eq!(&credentials[1..], &digest[1..]);
    }

    #[test]
    fn test_bad_lengths_rejected() {
        assert!(bls_withdrawal_credentials(&[0u8; 47]).is_err());
        assert!(deposit_data_root(&[0u8; 48], B256::ZERO, &[0u8; 95], 1).is_err());
        assert!(deposit_data_root(&[0u8; 49], B256::ZERO, &[0u8; 96], 1).is_err());
    }

    #[test]
    fn test_deposit_root_depends_on_every_field() {
        let pubkey = [1u8; 48];
        let signature = [2u8; 96];
        let credentials = eth1_withdrawal_credentials(Address::repeat_byte(3));
        let base = deposit_data_root(&pubkey, credentials, &signature, 32_000_000_000).unwrap();

        assert_ne!(
            base,
            deposit_data_root(&[9u8; 48], credentials, &signature, 32_000_000_000).unwrap()
        );
        assert_ne!(
            base,
            deposit_data_root(&pubkey, B256::ZERO, &signature, 32_000_000_000).unwrap()
        );
        assert_ne!(
            base,
            deposit_data_root(&pubkey, credentials, &[9u8; 96], 32_000_000_000).unwrap()
        );
        assert_ne!(
            base,
            deposit_data_root(&pubkey, credentials, &signature, 1_000_000_000).unwrap()
        );
    }

    #[test]
    fn test_deposit_root_known_answer() {
        let pubkey: Vec<u8> = (0u8..48).collect();
        let signature: Vec<u8> = (100u8..196).collect();
        let credentials =
            eth1_withdrawal_credentials(address!("d8da6bf26964af9d7eed9e03e53415d37aa96045"));

        assert_eq!(
            deposit_data_root(&pubkey, credentials, &signature, 32_000_000_000).unwrap(),
            b256!("4088a550a833e60cabd9c3f3b30f0925f0f183f2950d52ca3f81cf5bae50e223")
        );
        assert_eq!(
            deposit_data_root(
                &[0x11; 48],
                B256::repeat_byte(0x33),
                &[0x22; 96],
                32_000_000_000
            )
            .unwrap(),
            b256!("f2978728c62d83d268d773ab83fdae2600a627804d96f7abfe792a31a37771f0")
        );
    }

    #[test]
    fn test_batch_packing() {
        let first = DepositData::new(vec![1u8; 48], B256::ZERO, vec![2u8; 96], 1).unwrap();
        let second = DepositData::new(vec![3u8; 48], B256::ZERO, vec![4u8; 96], 1).unwrap();

        let mut batch = DepositBatch::new();
        batch.push(first.clone()).push(second.clone());

        assert_eq!(batch.len(), 2);
        let pubkeys = batch.pubkeys();
        assert_eq!(pubkeys.len(), 96);
        assert_eq!(&pubkeys[..48], &[1u8; 48]);
        assert_eq!(&pubkeys[48..], &[3u8; 48]);
        assert_eq!(batch.signatures().len(), 192);
        assert_eq!(
            batch.roots().unwrap(),
            vec![first.root().unwrap(), second.root().unwrap()]
        );
    }

    #[test]
    fn test_deposit_data_validates_lengths() {
        assert!(DepositData::new(vec![0u8; 10], B256::ZERO, vec![0u8; 96], 1).is_err());
    }
}
