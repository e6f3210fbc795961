//! Stable hashing for catalog fingerprints

use crate::domain::Course;
use sha2::{Digest, Sha256};

/// Fingerprint of the text the content model is fitted on.
///
/// Courses are hashed in code order so the fingerprint does not depend on
/// the order the store returned them in.
pub fn catalog_fingerprint(courses: &[Course]) -> String {
    let mut sorted: Vec<&Course> = courses.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    let mut hasher = Sha256::new();
    for course in sorted {
        hasher.update(course.code.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(course.document_text().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Short form for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
