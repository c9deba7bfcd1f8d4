//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Caller / ConformanceHarness<P>                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (backend selection)             │
//! │  - new_context → KeyExchangeContext                         │
//! │  - aead_encrypt / aead_decrypt                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   NativeProvider          │  │  StubProvider            │
//! │  - FFDHE2048              │  │  - всё Unsupported       │
//! │  - SECP256R1 / SM2        │  │                          │
//! │  - X25519                 │  │                          │
//! │  - ChaCha20 / AES-GCM     │  │                          │
//! └───────────────────────────┘  └──────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! ### Core Traits
//! - [`provider`]: CryptoProvider и KeyExchangeContext
//! - [`algorithms`]: Каталог алгоритмов и их размеров
//! - [`random`]: Источник случайности
//!
//! ### Implementations
//! - [`key_exchange`]: FFDHE, ECDH, SM2, X25519 + подписи
//! - [`aead`]: AEAD с отдельным тегом
//! - [`suites`]: Backend'ы (Native, Stub)

// ============================================================================
// Core Traits
// ============================================================================

/// CryptoProvider trait для backend-agility
pub mod provider;

pub mod algorithms;

pub mod random;

// ============================================================================
// Implementations
// ============================================================================

pub mod key_exchange;

pub mod aead;

/// Backend'ы (Native, Stub)
pub mod suites;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use algorithms::{AeadAlgorithm, AlgorithmFamily, HashAlgorithm, KeyExchangeAlgorithm};
pub use provider::{CryptoProvider, KeyExchangeContext};
pub use random::{OsRandom, RandomSource};
pub use suites::native::NativeProvider;
pub use suites::stub::StubProvider;

/// Backend, выбранный при сборке (feature `native`).
#[cfg(feature = "native")]
pub type DefaultProvider = NativeProvider;

/// Backend, выбранный при сборке (без feature `native`).
#[cfg(not(feature = "native"))]
pub type DefaultProvider = StubProvider;
