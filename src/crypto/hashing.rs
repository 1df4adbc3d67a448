// Prepared-statement ids.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the query text. Surrounding whitespace is not significant.
pub fn statement_id(query: &str) -> String {
    hex::encode(Sha256::digest(query.trim().as_bytes()))
}
