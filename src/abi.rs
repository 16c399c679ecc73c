//! Keccak-256 hashing, name-tree node derivation and the minimal subset
//! of contract-call encoding the chain adapter emits. Nothing here is a
//! general ABI library; it covers exactly the call shapes this crate
//! produces.

use crate::types::Address;
use tiny_keccak::{Hasher, Keccak};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Recursive node hash of a dot-separated name; the empty name is the
/// zero node.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&node);
        combined[32..].copy_from_slice(&label_hash);
        node = keccak256(&combined);
    }
    node
}

/// Node of an address's reverse record: `{hex-address}.addr.reverse`.
pub fn reverse_node(address: Address) -> [u8; 32] {
    namehash(&format!("{}.addr.reverse", hex::encode(address.0)))
}

/// First four bytes of the Keccak-256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// One encodable argument.
#[derive(Debug, Clone)]
pub enum AbiValue {
    Address(Address),
    Uint(u64),
    Bool(bool),
    FixedBytes([u8; 32]),
    String(String),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    fn is_dynamic(&self) -> bool {
        matches!(self, AbiValue::String(_) | AbiValue::Array(_))
    }

    fn encode_static(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            AbiValue::Address(addr) => word[12..].copy_from_slice(&addr.0),
            AbiValue::Uint(v) => word[24..].copy_from_slice(&v.to_be_bytes()),
            AbiValue::Bool(b) => word[31] = *b as u8,
            AbiValue::FixedBytes(bytes) => word.copy_from_slice(bytes),
            AbiValue::String(_) | AbiValue::Array(_) => unreachable!("dynamic value"),
        }
        word
    }

    fn encode_tail(&self) -> Vec<u8> {
        match self {
            AbiValue::String(s) => {
                let mut out = Vec::new();
                out.extend_from_slice(&AbiValue::Uint(s.len() as u64).encode_static());
                out.extend_from_slice(s.as_bytes());
                // Pad to a word boundary.
                let rem = s.len() % 32;
                if rem != 0 {
                    out.extend(std::iter::repeat(0u8).take(32 - rem));
                }
                out
            }
            AbiValue::Array(items) => {
                let mut out = Vec::new();
                out.extend_from_slice(&AbiValue::Uint(items.len() as u64).encode_static());
                out.extend_from_slice(&encode_tokens(items));
                out
            }
            _ => unreachable!("static value"),
        }
    }
}

/// Standard head/tail layout: static values and dynamic-offset words
/// first, dynamic tails after, offsets relative to the start of the
/// token block.
pub fn encode_tokens(values: &[AbiValue]) -> Vec<u8> {
    let head_len = 32 * values.len();
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for value in values {
        if value.is_dynamic() {
            let offset = head_len + tail.len();
            head.extend_from_slice(&AbiValue::Uint(offset as u64).encode_static());
            tail.extend_from_slice(&value.encode_tail());
        } else {
            head.extend_from_slice(&value.encode_static());
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Selector plus encoded arguments: complete calldata.
pub fn encode_call(signature: &str, values: &[AbiValue]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&encode_tokens(values));
    out
}
