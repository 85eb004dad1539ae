//! Credentials used to sign in.

use std::{str::FromStr, sync::LazyLock};

use argon2::{
    password_hash::{
        PasswordHash as Phc, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::rngs::OsRng;
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::Serialize;

/// Unique login of an account.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Login`] invariants:
        /// - Must contain only letters, digits, `_`, `.` or `-`;
        /// - Must be between 2 and 100 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}_.\-]{2,100}$").expect("valid regex")
        });

        REGEX.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Plain password of an account.
///
/// Never stored, only its [`PasswordHash`] is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2] hash of a [`Password`] in the [PHC string format].
///
/// [Argon2]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a random salt.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn new(password: &Password) -> Self {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .expect("default `Argon2` params accept any `Password`");
        Self(hash.to_string())
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    ///
    /// Malformed hashes match nothing.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        Phc::new(&self.0).is_ok_and(|phc| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &phc)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod spec {
    use super::{Login, Password, PasswordHash};

    #[test]
    fn login_format() {
        for login in ["owner9", "hotel.admin", "ivan-petrov", "иван_2"] {
            assert!(Login::new(login).is_some(), "`{login}` is rejected");
        }
        for login in ["", "a", "with space", "semi;colon"] {
            assert!(Login::new(login).is_none(), "`{login}` is accepted");
        }
    }

    #[test]
    fn single_char_password_is_allowed() {
        assert!(Password::new("x").is_some());
        assert!(Password::new("").is_none());
        assert!(Password::new("x".repeat(129)).is_none());
    }

    #[test]
    fn verifies_hashed_password() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password);

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("battery staple").unwrap()));
        assert_ne!(hash.to_string(), "correct horse");
    }

    #[test]
    fn salts_every_hash() {
        let password = Password::new("x").unwrap();

        assert_ne!(PasswordHash::new(&password), PasswordHash::new(&password));
    }

    #[test]
    fn malformed_hash_matches_nothing() {
        let hash = PasswordHash("plaintext".into());

        assert!(!hash.verify(&Password::new("plaintext").unwrap()));
    }
}
