use std::fmt;
use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Kind, Meta};

pub const OP_LOGIN: &str = "login";
pub const OP_AUTHORIZATION: &str = "middleware.authorization";

/// Lifetime of an issued bearer token
pub const TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;
const GENERATED_KEY_LEN: usize = 64;

/// Shared HMAC secret used to sign and verify bearer tokens
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Returns `None` for an empty secret
    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Random key for development use only
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.0)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<{} bytes>)", self.0.len())
    }
}

/// Identity payload embedded in a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Sign a token for `username` valid until `now + ttl`.
pub fn issue(
    username: &str,
    key: &SigningKey,
    now: i64,
    ttl: Duration,
    meta: Meta,
) -> Result<IssuedToken, Error> {
    let claims = Claims {
        username: username.to_string(),
        expires_at: now + ttl.as_secs() as i64,
    };

    let token = encode(&Header::new(ALGORITHM), &claims, &key.encoding_key())
        .map_err(|e| Error::new(OP_LOGIN, Kind::InternalError, e, meta))?;

    Ok(IssuedToken { token, claims })
}

/// Validate `token` against `key` at time `now` and return its claims.
///
/// Structural and algorithm failures are `BadRequest`; a bad signature or an
/// expired token is `InvalidToken`.
pub fn verify(token: &str, key: &SigningKey, now: i64, meta: Meta) -> Result<Claims, Error> {
    let mut validation = Validation::new(ALGORITHM);
    // Expiry is checked against the caller's clock below, without leeway
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<Claims>(token, &key.decoding_key(), &validation).map_err(|e| {
        let kind = match e.kind() {
            ErrorKind::InvalidSignature => Kind::InvalidToken,
            _ => Kind::BadRequest,
        };
        Error::new(OP_AUTHORIZATION, kind, e, meta.clone())
    })?;

    if data.claims.expires_at <= now {
        return Err(Error::from_message(
            OP_AUTHORIZATION,
            Kind::InvalidToken,
            "token has expired",
            meta,
        ));
    }

    Ok(data.claims)
}
