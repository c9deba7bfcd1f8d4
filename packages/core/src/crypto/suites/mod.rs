//! Криптографические backend'ы
//!
//! Этот модуль содержит реализации CryptoProvider trait.
//!
//! ## Доступные backend'ы
//!
//! ### Native (по умолчанию)
//! - **Key exchange**: FFDHE2048, SECP256R1, SM2, X25519
//! - **Signatures**: ECDSA P-256 (SHA-2), SM2 (SM3)
//! - **AEAD**: ChaCha20-Poly1305, AES-128-GCM, AES-256-GCM
//!
//! ### Stub
//! - Каждая операция возвращает `CryptoError::Unsupported`
//! - Используется на платформах без нужных примитивов
//!
//! ## Выбор backend'а
//!
//! ```rust
//! use cryptlib_core::crypto::suites::native::NativeProvider;
//! use cryptlib_core::crypto::provider::{CryptoProvider, KeyExchangeContext};
//! use cryptlib_core::crypto::algorithms::KeyExchangeAlgorithm;
//!
//! type Backend = NativeProvider;
//!
//! let mut ctx = Backend::new_context(KeyExchangeAlgorithm::X25519)?;
//! let mut public = [0u8; 32];
//! ctx.generate_key(&mut public)?;
//! # Ok::<(), cryptlib_core::error::CryptoError>(())
//! ```

pub mod native;
pub mod stub;
