use anyhow::{anyhow, bail, Context};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Subject claim for the single operator account.
const SESSION_SUBJECT: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the stateless bearer tokens minted at login.
///
/// There is no server-side session state: the signed token is the only
/// artifact, and verification is purely local.
#[derive(Clone)]
pub struct JwtSessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl JwtSessionService {
    pub fn new(secret: &str, ttl_hours: i64) -> anyhow::Result<Self> {
        if secret.len() < 32 {
            bail!("jwt secret must be at least 32 characters long");
        }
        if ttl_hours <= 0 {
            bail!("token ttl must be positive");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds: ttl_hours * 3600,
        })
    }

    pub fn issue(&self) -> anyhow::Result<String> {
        self.issue_at(current_unix_timestamp()?)
    }

    fn issue_at(&self, issued_at: i64) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: SESSION_SUBJECT.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to encode session token")
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<()> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .context("failed to decode session token")?
            .claims;

        if claims.sub != SESSION_SUBJECT {
            bail!("session token subject '{}' is not recognized", claims.sub);
        }

        Ok(())
    }
}

fn current_unix_timestamp() -> anyhow::Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|error| anyhow!("system clock is before unix epoch: {error}"))?;

    i64::try_from(duration.as_secs()).context("unix timestamp overflow")
}
