//! Curl-P-81, the ternary sponge that names transactions.

use crate::trytes;
use crate::trytes::TrytesError;

const HASH_LENGTH: usize = 243;
const STATE_LENGTH: usize = 3 * HASH_LENGTH;
const NUMBER_OF_ROUNDS: usize = 81;
const TRUTH_TABLE: [i8; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

pub struct Curl {
    state: [i8; STATE_LENGTH],
}

impl Default for Curl {
    fn default() -> Self {
        Self::new()
    }
}

impl Curl {
    pub fn new() -> Self {
        Self {
            state: [0; STATE_LENGTH],
        }
    }

    /// Absorbs trits in 243-trit blocks; a short final block is absorbed as is.
    pub fn absorb(&mut self, trits: &[i8]) {
        for block in trits.chunks(HASH_LENGTH) {
            self.state[..block.len()].copy_from_slice(block);
            self.transform();
        }
    }

    pub fn squeeze(&mut self) -> Vec<i8> {
        let out = self.state[..HASH_LENGTH].to_vec();
        self.transform();
        out
    }

    fn transform(&mut self) {
        let mut copy = [0i8; STATE_LENGTH];
        let mut index = 0usize;
        for _ in 0..NUMBER_OF_ROUNDS {
            copy.copy_from_slice(&self.state);
            for trit in self.state.iter_mut() {
                let previous = index;
                index = if index < 365 { index + 364 } else { index - 365 };
                let lookup = copy[previous] + (copy[index] << 2) + 5;
                *trit = TRUTH_TABLE[lookup as usize];
            }
        }
    }
}

/// Hash of a transaction, given its full trytes.
pub fn transaction_hash(transaction_trytes: &str) -> Result<String, TrytesError> {
    let mut curl = Curl::new();
    curl.absorb(&trytes::trytes_to_trits(transaction_trytes)?);
    trytes::trits_to_trytes(&curl.squeeze())
}
