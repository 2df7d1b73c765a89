//! Cryptographic primitives for the Agora deposit locker.
//!
//! - **Blake2b-256** for receipt identities and transaction ids
//! - **Blake2b-224** for script hashes (policy ids, validator hashes)
//! - Bech32 encoding of enterprise script addresses and network detection

pub mod address;
pub mod hash;

pub use address::{
    decode_script_address, encode_script_address, is_hex_address, network_from_address,
    AddressError,
};
pub use hash::{blake2b_224, blake2b_224_multi, blake2b_256, blake2b_256_multi};
