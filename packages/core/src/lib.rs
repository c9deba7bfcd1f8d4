// Cryptlib Core
// Backend-agnostic key exchange, signatures and AEAD with a conformance harness

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod config;
pub mod conformance;
pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports для удобства
pub use conformance::{Check, ConformanceHarness, ConformanceReport};
pub use crypto::{
    AeadAlgorithm, CryptoProvider, DefaultProvider, HashAlgorithm, KeyExchangeAlgorithm,
    KeyExchangeContext, NativeProvider, StubProvider,
};
pub use error::{CryptoError, ErrorKind, Result};
