//! Централизованная конфигурация для cryptlib-core
//!
//! Все настраиваемые параметры провайдеров и conformance harness определены здесь,
//! чтобы избежать хардкода по всему проекту. Размеры ключей, nonce и тегов
//! зафиксированы алгоритмами и живут в [`crate::crypto::algorithms`].

use crate::crypto::algorithms::{AeadAlgorithm, KeyExchangeAlgorithm};
use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================

    /// Размер приватной экспоненты FFDHE (в байтах)
    pub ffdhe_private_key_bytes: usize,

    /// Максимальное число попыток выбрать скаляр в диапазоне [1, n-1]
    pub max_scalar_attempts: usize,

    /// Distinguishing ID для подписи SM2
    pub sm2_distinguishing_id: String,

    // ============================================
    // CONFORMANCE HARNESS
    // ============================================

    /// Открытый текст для AEAD round-trip
    pub harness_plaintext: Vec<u8>,

    /// Алгоритмы обмена ключами, проверяемые по умолчанию
    pub harness_key_exchange_algorithms: Vec<KeyExchangeAlgorithm>,

    /// AEAD алгоритмы, проверяемые по умолчанию
    pub harness_aead_algorithms: Vec<AeadAlgorithm>,

    /// Алгоритмы подписи, проверяемые по умолчанию
    pub harness_signature_algorithms: Vec<KeyExchangeAlgorithm>,
}

impl Config {
    /// Создать конфигурацию с дефолтными значениями
    pub fn default() -> Self {
        Self {
            // Криптография
            ffdhe_private_key_bytes: 32,
            max_scalar_attempts: 16,
            sm2_distinguishing_id: "1234567812345678".to_string(),

            // Harness
            harness_plaintext: b"test".to_vec(),
            harness_key_exchange_algorithms: vec![
                KeyExchangeAlgorithm::Ffdhe2048,
                KeyExchangeAlgorithm::Secp256r1,
                KeyExchangeAlgorithm::Sm2P256,
                KeyExchangeAlgorithm::X25519,
            ],
            harness_aead_algorithms: vec![
                AeadAlgorithm::ChaCha20Poly1305,
                AeadAlgorithm::Aes128Gcm,
                AeadAlgorithm::Aes256Gcm,
            ],
            harness_signature_algorithms: vec![
                KeyExchangeAlgorithm::Secp256r1,
                KeyExchangeAlgorithm::Sm2P256,
            ],
        }
    }

    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Переопределяем значения из env, если они заданы
        if let Ok(val) = std::env::var("CRYPTLIB_FFDHE_PRIVATE_KEY_BYTES") {
            if let Ok(parsed) = val.parse() {
                config.ffdhe_private_key_bytes = parsed;
            }
        }

        if let Ok(val) = std::env::var("CRYPTLIB_MAX_SCALAR_ATTEMPTS") {
            if let Ok(parsed) = val.parse() {
                config.max_scalar_attempts = parsed;
            }
        }

        if let Ok(val) = std::env::var("CRYPTLIB_SM2_ID") {
            if !val.is_empty() {
                config.sm2_distinguishing_id = val;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}
