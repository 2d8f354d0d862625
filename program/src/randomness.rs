// Random word handling for provider callbacks
use borsh::BorshDeserialize;
use solana_program::{keccak, msg, pubkey::Pubkey};

use crate::{constants::MAX_RANDOM_WORDS, error::HubError};

/// A 256-bit random word as delivered by the provider, big-endian
pub type RandomWord = [u8; 32];

/// How a callback payload is laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callback {
    /// Exactly one 32-byte word
    Single,
    /// A borsh encoded `Vec<[u8; 32]>`
    Multiple,
}

/// First four bytes of keccak256 over a human readable callback signature
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak::hash(signature.as_bytes()).to_bytes();
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Opaque request id bound to every party of the request and to the request counter
pub fn derive_request_id(
    requester: &Pubkey,
    consumer: &Pubkey,
    provider: &Pubkey,
    request_index: u64,
    endpoint_id: &[u8; 32],
) -> [u8; 32] {
    keccak::hashv(&[
        requester.as_ref(),
        consumer.as_ref(),
        provider.as_ref(),
        &request_index.to_le_bytes(),
        endpoint_id,
    ])
    .to_bytes()
}

/// Decodes a fulfillment payload according to the callback that fired
pub fn decode_words(callback: Callback, data: &[u8]) -> Result<Vec<RandomWord>, HubError> {
    match callback {
        Callback::Single => {
            if data.len() != 32 {
                msg!("Single word payload must be 32 bytes, got {}", data.len());
                return Err(HubError::InvalidParameter);
            }
            let mut word = [0u8; 32];
            word.copy_from_slice(data);
            Ok(vec![word])
        }
        Callback::Multiple => {
            let words = Vec::<RandomWord>::try_from_slice(data).map_err(|_| {
                msg!("Malformed multi word payload");
                HubError::InvalidParameter
            })?;
            if words.is_empty() || words.len() > MAX_RANDOM_WORDS {
                return Err(HubError::InvalidParameter);
            }
            Ok(words)
        }
    }
}

/// Reduces a full 256-bit word modulo `modulus`
pub fn reduce(word: &RandomWord, modulus: u64) -> Result<u64, HubError> {
    if modulus == 0 {
        return Err(HubError::InvalidParameter);
    }
    let modulus = modulus as u128;
    let mut acc: u128 = 0;
    for byte in word.iter() {
        acc = ((acc << 8) | *byte as u128) % modulus;
    }
    Ok(acc as u64)
}
