//! Utility functions for identifiers

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Transaction id for a write to `key`: hex sha256 over a fresh uuid7 and the key.
pub fn new_tx_id(key: &str) -> String {
    let mut preimage = uuid7().as_bytes().to_vec();
    preimage.extend_from_slice(key.as_bytes());
    sha256::digest(&preimage)
}
