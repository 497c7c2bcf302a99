//! Core library for `KeyHaven`.
//!
//! Contains the envelope cipher (sealed AES-256-GCM format plus the legacy
//! AES-256-CBC codec kept for migration), the master key provider, signed
//! session tokens, the k-anonymity breach oracle client, and the password
//! generator. This crate knows nothing about HTTP or storage.

pub mod breach;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod generate;
pub mod session;
