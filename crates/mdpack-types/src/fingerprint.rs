use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::TypeError;

/// Content fingerprint of a single artifact.
///
/// A `Fingerprint` is the BLAKE3 hash of the artifact's raw bytes and nothing
/// else: paths, timestamps and permissions never influence it. Identical
/// content always yields the same fingerprint.
///
/// Serialized as a 64-character lowercase hex string so fingerprint files stay
/// a flat `path -> digest` JSON object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Fingerprint a file by streaming its contents.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; 8192];
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Create a `Fingerprint` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn of_is_deterministic() {
        let a = Fingerprint::of(b"public class Foo {}");
        let b = Fingerprint::of(b"public class Foo {}");
        assert_eq!(a, b);
    }

    #[test]
    fn of_file_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.cls");
        let data = vec![0x5Au8; 20_000];
        std::fs::write(&path, &data).unwrap();

        assert_eq!(Fingerprint::of_file(&path).unwrap(), Fingerprint::of(&data));
    }

    #[test]
    fn of_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Fingerprint::of_file(&dir.path().join("absent.cls")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn hex_roundtrip() {
        let fp = Fingerprint::of(b"test");
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
    }

    #[test]
    fn from_hex_rejects_short_digest() {
        let err = Fingerprint::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Fingerprint::from_hex("not-hex"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let fp = Fingerprint::of(b"serde");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.to_hex()));
        let parsed: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fp);
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(Fingerprint::of(b"x").short_hex().len(), 8);
    }

    proptest! {
        #[test]
        fn identical_bytes_identical_fingerprint(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(Fingerprint::of(&data), Fingerprint::of(&data.clone()));
        }

        #[test]
        fn single_byte_change_changes_fingerprint(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            idx in any::<prop::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let mut changed = data.clone();
            let i = idx.index(changed.len());
            changed[i] = changed[i].wrapping_add(delta);
            prop_assert_ne!(Fingerprint::of(&data), Fingerprint::of(&changed));
        }
    }
}
