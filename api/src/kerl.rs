//! Kerl sponge (Keccak-384 over ternary blocks) and the address checksum
//! built on it.

use num_bigint::BigInt;
use num_bigint::Sign;
use num_traits::ToPrimitive;
use num_traits::Zero;
use sha3::Digest;
use sha3::Keccak384;

use crate::trytes;
use crate::trytes::TrytesError;
use crate::trytes::HASH_TRYTES;

/// Trits absorbed or squeezed per Kerl block.
pub const HASH_TRITS: usize = 243;

const HASH_BYTES: usize = 48;

/// Number of trytes in an address checksum.
pub const CHECKSUM_TRYTES: usize = 9;

pub struct Kerl {
    keccak: Keccak384,
}

impl Default for Kerl {
    fn default() -> Self {
        Self::new()
    }
}

impl Kerl {
    pub fn new() -> Self {
        Self {
            keccak: Keccak384::new(),
        }
    }

    /// Absorbs whole 243-trit blocks.
    pub fn absorb(&mut self, trits: &[i8]) -> Result<(), TrytesError> {
        if trits.len() % HASH_TRITS != 0 {
            return Err(TrytesError::InvalidLength {
                expected: trits.len().next_multiple_of(HASH_TRITS),
                found: trits.len(),
            });
        }
        for block in trits.chunks(HASH_TRITS) {
            self.keccak.update(trits_to_bytes(block));
        }
        Ok(())
    }

    /// Squeezes `blocks` blocks of 243 trits.
    pub fn squeeze(&mut self, blocks: usize) -> Vec<i8> {
        let mut trits = Vec::with_capacity(blocks * HASH_TRITS);
        for _ in 0..blocks {
            let digest = self.keccak.finalize_reset();
            trits.extend(bytes_to_trits(&digest));
            let flipped: Vec<u8> = digest.iter().map(|b| !b).collect();
            self.keccak.update(flipped);
        }
        trits
    }
}

/// Converts one block to a 384-bit two's complement big-endian integer.
/// The last trit of the block is ignored.
fn trits_to_bytes(block: &[i8]) -> [u8; HASH_BYTES] {
    let three = BigInt::from(3u8);
    let mut value = BigInt::zero();
    for &trit in block[..HASH_TRITS - 1].iter().rev() {
        value = value * &three + BigInt::from(trit);
    }

    let raw = value.to_signed_bytes_be();
    let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
    let mut bytes = [fill; HASH_BYTES];
    bytes[HASH_BYTES - raw.len()..].copy_from_slice(&raw);
    bytes
}

/// Inverse of [`trits_to_bytes`]: the integer is reduced modulo 3^242 into
/// balanced form and the 243rd trit is zero.
fn bytes_to_trits(bytes: &[u8]) -> Vec<i8> {
    let three = BigInt::from(3u8);
    let modulus = three.pow(HASH_TRITS as u32 - 1);
    let half = (&modulus - BigInt::from(1u8)) / BigInt::from(2u8);

    let value = BigInt::from_signed_bytes_be(bytes);
    let mut rest = ((value + &half) % &modulus + &modulus) % &modulus;

    let mut trits = Vec::with_capacity(HASH_TRITS);
    for _ in 0..HASH_TRITS - 1 {
        let digit = (&rest % &three).to_i8().unwrap_or_default();
        trits.push(digit - 1);
        rest /= &three;
    }
    trits.push(0);
    trits
}

/// Kerl hash of a sequence of whole trytes blocks, as trytes.
pub fn hash_trytes(input: &str) -> Result<String, TrytesError> {
    let mut kerl = Kerl::new();
    kerl.absorb(&trytes::trytes_to_trits(input)?)?;
    trytes::trits_to_trytes(&kerl.squeeze(1))
}

/// The 9-tryte checksum of an address. A checksum already present on a
/// 90-tryte address is ignored and recomputed.
pub fn address_checksum(address: &str) -> Result<String, TrytesError> {
    let address = strip_checksum(address)?;
    let digest = hash_trytes(address)?;
    Ok(digest[HASH_TRYTES - CHECKSUM_TRYTES..].to_string())
}

pub fn add_checksum(address: &str) -> Result<String, TrytesError> {
    let checksum = address_checksum(address)?;
    Ok(format!("{}{}", strip_checksum(address)?, checksum))
}

/// The 81-tryte address without its checksum.
pub fn strip_checksum(address: &str) -> Result<&str, TrytesError> {
    if !trytes::is_hash(address) {
        return Err(TrytesError::InvalidLength {
            expected: HASH_TRYTES,
            found: address.len(),
        });
    }
    Ok(&address[..HASH_TRYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_conversion_round_trips_in_range() {
        let mut block = vec![0i8; HASH_TRITS];
        for (i, trit) in block.iter_mut().enumerate().take(HASH_TRITS - 1) {
            *trit = [1, -1, 0, 1, 1, -1][i % 6];
        }
        let bytes = trits_to_bytes(&block);
        assert_eq!(bytes_to_trits(&bytes), block);
    }

    #[test]
    fn negative_values_are_sign_extended() {
        let mut block = vec![0i8; HASH_TRITS];
        block[0] = -1;
        let bytes = trits_to_bytes(&block);
        assert!(bytes.iter().all(|b| *b == 0xff));
        assert_eq!(bytes_to_trits(&bytes), block);
    }

    #[test]
    fn last_trit_is_ignored() {
        let mut a = vec![1i8; HASH_TRITS];
        let mut b = a.clone();
        a[HASH_TRITS - 1] = 1;
        b[HASH_TRITS - 1] = -1;
        assert_eq!(trits_to_bytes(&a), trits_to_bytes(&b));
    }

    #[test]
    fn checksum_is_nine_trytes_and_deterministic() {
        let address = "A".repeat(81);
        let checksum = address_checksum(&address).unwrap();
        assert_eq!(checksum.len(), CHECKSUM_TRYTES);
        assert!(trytes::is_trytes(&checksum));
        assert_eq!(address_checksum(&address).unwrap(), checksum);

        let with_checksum = add_checksum(&address).unwrap();
        assert_eq!(with_checksum.len(), 90);
        assert_eq!(address_checksum(&with_checksum).unwrap(), checksum);
        assert_ne!(address_checksum(&"B".repeat(81)).unwrap(), checksum);
    }

    const KERL_INPUT: &str =
        "GYOMKVTSNHVJNCNFBBAH9AAMXLPLLLROQY99QN9DLSJUHDPBLCFFAIQXZA9BKMBJCYSFHFPXAHDWZFEIZ";
    const KERL_DIGEST: &str =
        "OXJCNFHUNAHWDLKKPELTBFUCVW9KLXKOGWERKTJXQMXTKFKNWNNXYD9DMJJABSEIONOSJTTEVKVDQEWTW";

    #[test]
    fn hash_matches_reference_vector() {
        assert_eq!(hash_trytes(KERL_INPUT).unwrap(), KERL_DIGEST);
    }

    #[test]
    fn checksum_matches_reference_vector() {
        assert_eq!(address_checksum(KERL_INPUT).unwrap(), "VKVDQEWTW");
        let with_checksum = add_checksum(KERL_INPUT).unwrap();
        assert_eq!(with_checksum, format!("{}VKVDQEWTW", KERL_INPUT));
        assert_eq!(strip_checksum(&with_checksum).unwrap(), KERL_INPUT);
    }

    #[test]
    fn checksum_rejects_bad_lengths() {
        assert!(address_checksum("ABC").is_err());
        assert!(address_checksum(&"a".repeat(81)).is_err());
    }

    #[test]
    fn absorb_requires_whole_blocks() {
        let mut kerl = Kerl::new();
        assert!(kerl.absorb(&[0; 10]).is_err());
        assert!(kerl.absorb(&[0; HASH_TRITS * 2]).is_ok());
        assert_eq!(kerl.squeeze(2).len(), HASH_TRITS * 2);
    }
}
