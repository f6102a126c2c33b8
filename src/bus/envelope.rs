use crate::types::{AppError, ProgressKind, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Outer wire shape of every bus message, inbound and outbound:
/// a signed token plus the routing tag duplicated in clear for consumers
/// that route without verifying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

/// Claims carried by an inbound task envelope. All fields are optional at
/// the codec layer; presence is checked by the bridge so that a missing
/// field is a validation drop, not a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskClaims {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
}

/// Claims carried by an outbound event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub output: String,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// HS256 signer/verifier over the shared bus secret.
///
/// Task and event payloads carry no registered claims, so expiry
/// validation is disabled; a token is trusted purely on its signature.
pub struct EnvelopeCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl EnvelopeCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), payload, &self.encoding)
            .map_err(|e| AppError::Envelope(format!("Failed to sign payload: {}", e)))
    }

    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        decode::<T>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Envelope(format!("Invalid envelope: {}", e)))
    }
}
