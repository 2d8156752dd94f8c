//! Content hashing for change detection.
//!
//! A [`ContentHash`] is the SHA-256 digest of the compact JSON encoding of a
//! record's canonical field set, truncated to 16 bytes and rendered as 32
//! lowercase hex characters. Struct fields serialise in declaration order and
//! `serde_json::Value` objects serialise with sorted keys, so identical
//! logical content always hashes identically, run after run.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Number of hex characters in a rendered hash.
pub const HASH_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
  /// Hash the canonical JSON encoding of `value`.
  pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
    let encoded = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&encoded);
    Ok(Self(hex::encode(&digest[..HASH_LEN / 2])))
  }

  /// Accept a hash read back from storage.
  pub fn parse(s: &str) -> Result<Self> {
    if s.len() == HASH_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::invalid(format!("malformed content hash: {s:?}")))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ContentHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ContentHash {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<ContentHash> for String {
  fn from(h: ContentHash) -> Self { h.0 }
}
