//! Content hashing primitives for stratafs.
//!
//! Adapters with a native hash capability and the software fallback in the
//! hash plugin both go through [`HashAlgorithm`], so a digest computed
//! backend-side and one computed from streamed content always agree.

use sha2::Digest as _;

/// Supported digest algorithms.
///
/// String conversion is lowercase (`"sha256"`, `"sha512"`, `"blake3"`), which
/// is the form accepted in configuration and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// Digest output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Blake3 => 32,
        }
    }
}

/// One-shot digest of a byte slice.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// One-shot digest, hex-encoded (lowercase).
pub fn digest_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    hex::encode(digest(algorithm, data))
}

/// Incremental hasher for streaming content that does not fit in memory.
pub struct Hasher {
    inner: Inner,
}

enum Inner {
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let inner = match algorithm {
            HashAlgorithm::Sha256 => Inner::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha512 => Inner::Sha512(sha2::Sha512::new()),
            HashAlgorithm::Blake3 => Inner::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { inner }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.inner {
            Inner::Sha256(h) => h.update(data),
            Inner::Sha512(h) => h.update(data),
            Inner::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self.inner {
            Inner::Sha256(h) => h.finalize().to_vec(),
            Inner::Sha512(h) => h.finalize().to_vec(),
            Inner::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
