//! Session cookie settings read from the environment.
//!
//! Release builds insist on every toggle being present and valid. Debug builds
//! log a warning and fall back to a development-friendly default instead, so a
//! bare `cargo run` still produces a working dashboard.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub mod fingerprint;

pub use fingerprint::key_fingerprint;

/// Fallback location of the signing key when `SESSION_KEY_FILE` is unset.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key length accepted by release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;

pub(crate) const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// How strictly the environment is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or malformed toggles fall back to defaults with a warning.
    Debug,
    /// Missing or malformed toggles are fatal.
    Release,
}

impl BuildMode {
    /// Pick the mode matching `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashboard::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Settings applied to the session middleware.
pub struct SessionSettings {
    /// Signing and encryption key for the cookie store.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy of the cookie.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Read settings from `env`, validated according to `mode`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashboard::inbound::http::session_config::{BuildMode, SessionSettings};
    /// use mockable::MockEnv;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let key_path = std::env::temp_dir().join("dashboard_session_key_example");
    /// std::fs::write(&key_path, vec![b'k'; 64])?;
    /// let key_file = key_path.to_string_lossy().into_owned();
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(move |name| match name {
    ///     "SESSION_KEY_FILE" => Some(key_file.clone()),
    ///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
    ///     "SESSION_SAMESITE" => Some("Lax".to_owned()),
    ///     "SESSION_ALLOW_EPHEMERAL" => Some("0".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let settings = SessionSettings::from_env(&env, BuildMode::Release)?;
    /// assert!(settings.cookie_secure);
    /// assert_eq!(settings.fingerprint().len(), 16);
    ///
    /// std::fs::remove_file(&key_path)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let reader = EnvReader { env, mode };
        let cookie_secure = reader.flag(COOKIE_SECURE_ENV, true)?;
        let same_site = reader.same_site(cookie_secure)?;
        let allow_ephemeral = reader.flag(ALLOW_EPHEMERAL_ENV, false)?;
        if allow_ephemeral && !mode.is_debug() {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        let key = reader.key(allow_ephemeral)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// Short, non-reversible identifier of the active key for startup logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Reasons the session settings could not be built.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

struct EnvReader<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> EnvReader<'_, E> {
    /// Return `fallback` in debug builds (after `note`), otherwise `error`.
    fn tolerate<T>(
        &self,
        fallback: T,
        error: SessionConfigError,
        note: impl FnOnce(),
    ) -> Result<T, SessionConfigError> {
        if self.mode.is_debug() {
            note();
            Ok(fallback)
        } else {
            Err(error)
        }
    }

    fn flag(&self, name: &'static str, fallback: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name }, || {
                warn!(variable = name, fallback, "session toggle not set; using default");
            });
        };
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value: value.clone(),
                    expected: BOOL_EXPECTED,
                },
                || warn!(variable = name, %value, fallback, "invalid session toggle; using default"),
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let default = if self.mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.env.string(SAMESITE_ENV) else {
            return self.tolerate(
                default,
                SessionConfigError::MissingEnv { name: SAMESITE_ENV },
                || warn!("SESSION_SAMESITE not set; using {default:?}"),
            );
        };
        match value.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone, || {
                warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
            }),
            _ => self.tolerate(
                default,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: value.clone(),
                    expected: SAMESITE_EXPECTED,
                },
                || warn!(%value, "invalid SESSION_SAMESITE; using {default:?}"),
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
        );
        match std::fs::read(&path) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                let length = bytes.len();
                if !self.mode.is_debug() && length < SESSION_KEY_MIN_LEN {
                    return Err(SessionConfigError::KeyTooShort {
                        path,
                        length,
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                Ok(Key::derive_from(&bytes))
            }
            Err(source) if self.mode.is_debug() || allow_ephemeral => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "session key unreadable; generating a temporary key"
                );
                Ok(Key::generate())
            }
            Err(source) => Err(SessionConfigError::KeyRead { path, source }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
