// License - Verify signed licenses and derive the plan tier
//
// A license is base64 JSON `{"payload": b64(json), "sig": b64(signature)}`.
// The payload `{"tier","max_sites","exp","name"}` is signed with Ed25519 and
// checked against the vendor public key (base64, 32 bytes).

use super::gate::PlanTier;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, NaiveDate, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Site cap when a pro license does not set one
pub const DEFAULT_PRO_MAX_SITES: u32 = 100;

/// Reasons a license is not honoured
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("license is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("license JSON is malformed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("license public key is invalid: {0}")]
    PublicKey(String),

    #[error("license signature is invalid")]
    Signature,

    #[error("license expiry '{0}' is not a valid timestamp")]
    Expiry(String),
}

#[derive(Debug, Deserialize)]
struct LicenseEnvelope {
    payload: String,
    sig: String,
}

/// Signed license contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub max_sites: Option<i64>,
    #[serde(default)]
    pub exp: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl LicensePayload {
    /// Parsed expiry; see [`parse_expiry`]
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>, LicenseError> {
        let Some(raw) = self.exp.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        parse_expiry(raw)
            .map(Some)
            .ok_or_else(|| LicenseError::Expiry(raw.to_string()))
    }

    fn is_pro(&self) -> bool {
        self.tier
            .as_deref()
            .map(|t| t.trim().eq_ignore_ascii_case("pro"))
            .unwrap_or(true)
    }

    fn max_sites(&self) -> u32 {
        match self.max_sites {
            Some(n) if n < 1 => 1,
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
            None => DEFAULT_PRO_MAX_SITES,
        }
    }
}

/// Parse a license expiry: RFC 3339, or a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Verifies licenses against one vendor key
#[derive(Debug, Clone)]
pub struct LicenseVerifier {
    key: VerifyingKey,
}

impl LicenseVerifier {
    /// Build from a base64-encoded Ed25519 public key
    pub fn from_base64(public_key: &str) -> Result<Self, LicenseError> {
        let bytes = BASE64.decode(public_key.trim())?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            LicenseError::PublicKey(format!("expected 32 bytes, got {}", b.len()))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| LicenseError::PublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Check the signature and return the payload
    pub fn verify(&self, license: &str) -> Result<LicensePayload, LicenseError> {
        let envelope: LicenseEnvelope = serde_json::from_slice(&BASE64.decode(license.trim())?)?;

        let payload_bytes = BASE64.decode(envelope.payload.trim())?;
        let sig_bytes = BASE64.decode(envelope.sig.trim())?;

        let signature = Signature::from_slice(&sig_bytes).map_err(|_| LicenseError::Signature)?;
        self.key
            .verify(&payload_bytes, &signature)
            .map_err(|_| LicenseError::Signature)?;

        Ok(serde_json::from_slice(&payload_bytes)?)
    }

    /// Tier granted by `license` at `now`
    ///
    /// Invalid, expired and non-pro licenses all grant the free tier.
    pub fn tier_for(&self, license: &str, now: DateTime<Utc>) -> PlanTier {
        match self.try_tier(license, now) {
            Ok(tier) => tier,
            Err(e) => {
                tracing::warn!("Ignoring license: {}", e);
                PlanTier::Free
            }
        }
    }

    fn try_tier(&self, license: &str, now: DateTime<Utc>) -> Result<PlanTier, LicenseError> {
        let payload = self.verify(license)?;
        let expires_at = payload.expires_at()?;

        if let Some(expires_at) = expires_at
            && now > expires_at
        {
            tracing::info!("License expired at {}, using free tier", expires_at);
            return Ok(PlanTier::Free);
        }

        if !payload.is_pro() {
            return Ok(PlanTier::Free);
        }

        Ok(PlanTier::Pro {
            license_expires_at: expires_at,
            max_sites: payload.max_sites(),
        })
    }
}

/// Tier for an optional license and public key; either missing means free
pub fn resolve_tier(
    license: Option<&str>,
    public_key: Option<&str>,
    now: DateTime<Utc>,
) -> PlanTier {
    let license = license.map(str::trim).filter(|s| !s.is_empty());
    let public_key = public_key.map(str::trim).filter(|s| !s.is_empty());

    let (Some(license), Some(public_key)) = (license, public_key) else {
        return PlanTier::Free;
    };

    match LicenseVerifier::from_base64(public_key) {
        Ok(verifier) => verifier.tier_for(license, now),
        Err(e) => {
            tracing::warn!("Ignoring license: {}", e);
            PlanTier::Free
        }
    }
}
