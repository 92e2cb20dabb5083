//! Canonical JSON for hashing and signing (RFC 8785 JCS).
//!
//! Payload hashes, policy fingerprints, and token signatures must be
//! byte-for-byte reproducible across processes, so everything hashed or
//! signed goes through this one serialization: object keys sorted
//! lexicographically, no insignificant whitespace, canonical numbers.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize a JSON value canonically.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_canonical(value, &mut buf);
    buf
}

/// Hex-encoded SHA-256 digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Canonical hash of a JSON value in one step.
pub fn hash_value(value: &Value) -> String {
    sha256_hex(&canonical_bytes(value))
}

fn write_canonical(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                buf.extend_from_slice(format!("{i}").as_bytes());
            } else if let Some(u) = n.as_u64() {
                buf.extend_from_slice(format!("{u}").as_bytes());
            } else if let Some(f) = n.as_f64() {
                buf.extend_from_slice(format!("{f}").as_bytes());
            } else {
                buf.extend_from_slice(n.to_string().as_bytes());
            }
        }
        Value::String(_) => {
            // Standard JSON string escaping is canonical for our payloads.
            buf.extend_from_slice(&serde_json::to_vec(value).expect("string serializes"));
        }
        Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_canonical(item, buf);
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                let key_json =
                    serde_json::to_vec(&Value::String((*key).clone())).expect("key serializes");
                buf.extend_from_slice(&key_json);
                buf.push(b':');
                write_canonical(&map[*key], buf);
            }
            buf.push(b'}');
        }
    }
}
