use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored credential: only the SHA-256 digest of the secret is kept.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password {
    digest: String,
}

impl Password {
    /// Hash a plain secret. An absent secret yields an empty digest, which
    /// never verifies.
    pub fn from_plain<'a>(secret: impl Into<Option<&'a str>>) -> Self {
        let digest = secret.into().map(hash).unwrap_or_default();
        Self { digest }
    }

    /// Wrap a digest loaded from storage.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn is_set(&self) -> bool {
        !self.digest.is_empty()
    }

    pub fn verify(&self, candidate: &str) -> bool {
        self.is_set() && hash(candidate) == self.digest
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password").field("digest", &"<redacted>").finish()
    }
}

fn hash(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
