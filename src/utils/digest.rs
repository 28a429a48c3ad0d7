use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine as _,
};
use sha2::{Digest, Sha256};

/// SHA-256 of a rendered document, base64 without padding.
///
/// Rendering is deterministic, so equal digests mean byte-identical documents.
pub fn document_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    STANDARD_NO_PAD.encode(digest)
}

/// Padded base64 for handing document bytes across the JSON command boundary.
pub fn encode_document(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
