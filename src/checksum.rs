//! Checksum engine
//!
//! One-shot and streaming digests over MD5, SHA-1, SHA-256 and SHA-512,
//! rendered as lowercase hex.

use crate::error::{Error, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;
use std::path::Path;

/// Whole-file checksums are always MD5, whatever the per-frame algorithm.
pub const FILE_CHECKSUM_ALGORITHM: ChecksumAlgorithm = ChecksumAlgorithm::Md5;

/// Read size used when hashing a file
const FILE_CHUNK_SIZE: usize = 64 * 8192;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 4] = [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Sha512,
    ];

    /// Get human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha1 => "SHA-1",
            ChecksumAlgorithm::Sha256 => "SHA-256",
            ChecksumAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Length of the hex digest
    pub fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 32,
            ChecksumAlgorithm::Sha1 => 40,
            ChecksumAlgorithm::Sha256 => 64,
            ChecksumAlgorithm::Sha512 => 128,
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(ChecksumAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(ChecksumAlgorithm::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

enum Hasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

/// Incremental digest computation
pub struct ChecksumStream {
    algorithm: ChecksumAlgorithm,
    hasher: Hasher,
}

impl ChecksumStream {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        let hasher = match algorithm {
            ChecksumAlgorithm::Md5 => Hasher::Md5(Md5::new()),
            ChecksumAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            ChecksumAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        };
        Self { algorithm, hasher }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.hasher {
            Hasher::Md5(h) => h.update(data),
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    /// Consume the stream and return the hex digest
    pub fn finalize(self) -> String {
        match self.hasher {
            Hasher::Md5(h) => hex::encode(h.finalize()),
            Hasher::Sha1(h) => hex::encode(h.finalize()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
            Hasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

impl std::fmt::Debug for ChecksumStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumStream")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Compute the hex digest of `data`
pub fn digest(algorithm: ChecksumAlgorithm, data: &[u8]) -> String {
    let mut stream = ChecksumStream::new(algorithm);
    stream.update(data);
    stream.finalize()
}

/// Compute the hex digest of everything `reader` yields
pub fn digest_reader<R: Read>(algorithm: ChecksumAlgorithm, mut reader: R) -> Result<String> {
    let mut stream = ChecksumStream::new(algorithm);
    let mut buf = vec![0u8; FILE_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => stream.update(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(stream.finalize())
}

/// Compute the hex digest of a file on disk
pub fn digest_file(algorithm: ChecksumAlgorithm, path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    digest_reader(algorithm, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(digest(ChecksumAlgorithm::Md5, b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            digest(ChecksumAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            digest(ChecksumAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            digest(ChecksumAlgorithm::Sha512, b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_deterministic_lowercase_hex() {
        let data: Vec<u8> = (0..=255).cycle().take(4096).collect();
        for algorithm in ChecksumAlgorithm::ALL {
            let a = digest(algorithm, &data);
            let b = digest(algorithm, &data);
            assert_eq!(a, b);
            assert_eq!(a.len(), algorithm.hex_len());
            assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7) as u8).collect();
        for algorithm in ChecksumAlgorithm::ALL {
            let mut stream = ChecksumStream::new(algorithm);
            for chunk in data.chunks(33) {
                stream.update(chunk);
            }
            assert_eq!(stream.finalize(), digest(algorithm, &data));
        }
    }

    #[test]
    fn test_digest_reader() {
        let data = vec![0x5au8; FILE_CHUNK_SIZE + 17];
        let from_reader = digest_reader(ChecksumAlgorithm::Md5, data.as_slice()).unwrap();
        assert_eq!(from_reader, digest(ChecksumAlgorithm::Md5, &data));
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("MD5".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Md5);
        assert_eq!("sha-256".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Sha256);
        assert!(matches!(
            "crc32".parse::<ChecksumAlgorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
