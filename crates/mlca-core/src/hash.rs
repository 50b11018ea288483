use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::LcaError;
use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 of the canonical JSON form; used for scenario inputs, results
/// and table snapshots so reruns can be compared byte for byte.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, LcaError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn hash_ignores_map_insertion_order() {
        let mut a = HashMap::new();
        a.insert("coal", 70.2);
        a.insert("hydro", 12.4);
        let mut b = BTreeMap::new();
        b.insert("hydro", 12.4);
        b.insert("coal", 70.2);
        assert_eq!(
            stable_hash_string(&a).expect("hash a"),
            stable_hash_string(&b).expect("hash b")
        );
    }
}
