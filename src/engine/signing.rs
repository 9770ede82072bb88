//! Request authentication for the cloud engine.
//!
//! With only an application key, requests carry the key header. With an
//! HMAC key as well, each body is signed with HMAC-SHA-512 keyed by
//! `applicationKey + hmacKey`, hex-encoded into the `hmac` header.

use crate::config::CloudCredentials;
use crate::error::{RecognitionError, RecognitionResult};
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

pub const APPLICATION_KEY_HEADER: &str = "applicationKey";
pub const HMAC_HEADER: &str = "hmac";

#[derive(Clone, PartialEq, Eq)]
pub enum RequestSigner {
    ApplicationKey { application_key: String },
    Hmac { application_key: String, hmac_key: String },
}

impl RequestSigner {
    /// Pick the signing strategy from which credentials are present.
    pub fn for_credentials(credentials: &CloudCredentials) -> Self {
        match &credentials.hmac_key {
            Some(hmac_key) if !hmac_key.is_empty() => RequestSigner::Hmac {
                application_key: credentials.application_key.clone(),
                hmac_key: hmac_key.clone(),
            },
            _ => RequestSigner::ApplicationKey {
                application_key: credentials.application_key.clone(),
            },
        }
    }

    pub fn is_signing(&self) -> bool {
        matches!(self, RequestSigner::Hmac { .. })
    }

    /// Auth headers for a request with this exact body.
    pub fn headers(&self, body: &[u8]) -> RecognitionResult<Vec<(&'static str, String)>> {
        match self {
            RequestSigner::ApplicationKey { application_key } => {
                Ok(vec![(APPLICATION_KEY_HEADER, application_key.clone())])
            }
            RequestSigner::Hmac {
                application_key,
                hmac_key,
            } => Ok(vec![
                (APPLICATION_KEY_HEADER, application_key.clone()),
                (HMAC_HEADER, sign(application_key, hmac_key, body)?),
            ]),
        }
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestSigner::ApplicationKey { .. } => f.write_str("RequestSigner::ApplicationKey"),
            RequestSigner::Hmac { .. } => f.write_str("RequestSigner::Hmac"),
        }
    }
}

/// Lowercase hex HMAC-SHA-512 of `body`.
pub fn sign(application_key: &str, hmac_key: &str, body: &[u8]) -> RecognitionResult<String> {
    let key = format!("{}{}", application_key, hmac_key);
    let mut mac = HmacSha512::new_from_slice(key.as_bytes())
        .map_err(|e| RecognitionError::Configuration(format!("Unusable HMAC key: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
