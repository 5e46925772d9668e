// TLS Probe - Fetch the leaf certificate a server presents during handshake

use super::CertificateFact;
use crate::Result;
use crate::error::WardenError;
use crate::utils::network;
use chrono::{DateTime, Utc};
use rustls::ClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::prelude::*;

/// Default probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// Default TLS port
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Accepts whatever chain the server presents.
///
/// Trust is not evaluated: an expired or self-signed certificate is exactly
/// what the probe needs to observe. Handshake signatures are still checked so
/// the peer must hold the key for the certificate it sent.
#[derive(Debug)]
struct ObserveOnlyVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for ObserveOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Single-shot TLS certificate probe
///
/// Each call to [`TlsProbe::probe`] makes exactly one attempt. Resolution,
/// TCP connect and handshake share one timeout; dropping the returned future
/// cancels the probe and closes the socket.
#[derive(Debug, Clone)]
pub struct TlsProbe {
    timeout: Duration,
    overrides: HashMap<String, IpAddr>,
}

impl TlsProbe {
    /// Create new probe with the given overall timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            overrides: HashMap::new(),
        }
    }

    /// Connect to `ip` whenever `hostname` is probed, skipping DNS.
    /// SNI still carries `hostname`.
    pub fn with_resolve(mut self, hostname: &str, ip: IpAddr) -> Self {
        self.overrides.insert(hostname.to_ascii_lowercase(), ip);
        self
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `hostname:port` and return the leaf certificate fact
    pub async fn probe(&self, hostname: &str, port: u16) -> Result<CertificateFact> {
        match tokio::time::timeout(self.timeout, self.probe_once(hostname, port)).await {
            Ok(result) => result,
            Err(_) => Err(WardenError::ConnectionTimeout {
                host: hostname.to_string(),
                port,
                duration: self.timeout,
            }),
        }
    }

    async fn probe_once(&self, hostname: &str, port: u16) -> Result<CertificateFact> {
        let ip = match self.overrides.get(&hostname.to_ascii_lowercase()) {
            Some(ip) => *ip,
            None => network::resolve_hostname(hostname, port).await?[0],
        };
        let addr = SocketAddr::new(ip, port);

        debug!("Probing {}:{} via {}", hostname, port, addr);

        let stream = network::connect(hostname, addr).await?;

        let server_name = ServerName::try_from(hostname.to_string()).map_err(|e| {
            WardenError::Connection {
                host: hostname.to_string(),
                port,
                details: format!("Invalid server name: {}", e),
            }
        })?;

        let connector = TlsConnector::from(Arc::new(client_config()?));
        let tls_stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| WardenError::Connection {
                host: hostname.to_string(),
                port,
                details: format!("TLS handshake failed: {}", e),
            })?;

        let (_io, connection) = tls_stream.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| WardenError::NoCertificate {
                host: hostname.to_string(),
                port,
            })?;

        let fact = fact_from_der(hostname, leaf.as_ref(), Utc::now())?;

        debug!(
            "Leaf certificate for {}: CN={} notAfter={}",
            hostname, fact.common_name, fact.not_after
        );

        Ok(fact)
    }
}

impl Default for TlsProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

/// Build the client configuration used by every probe
fn client_config() -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| WardenError::Connection {
            host: String::new(),
            port: 0,
            details: format!("TLS configuration error: {}", e),
        })?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(ObserveOnlyVerifier { provider }))
        .with_no_client_auth();

    Ok(config)
}

/// Build a [`CertificateFact`] from a DER-encoded leaf certificate
///
/// The common name falls back to `domain` when the subject has no CN.
pub fn fact_from_der(
    domain: &str,
    der_bytes: &[u8],
    observed_at: DateTime<Utc>,
) -> Result<CertificateFact> {
    let (_, cert) = X509Certificate::from_der(der_bytes).map_err(|e| {
        WardenError::CertificateParse {
            details: format!("Failed to parse leaf certificate: {}", e),
        }
    })?;

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::trim)
        .filter(|cn| !cn.is_empty())
        .unwrap_or(domain)
        .to_string();

    let validity = cert.validity();

    Ok(CertificateFact {
        domain: domain.to_string(),
        common_name,
        not_before: asn1_to_utc(&validity.not_before)?,
        not_after: asn1_to_utc(&validity.not_after)?,
        observed_at,
    })
}

fn asn1_to_utc(time: &ASN1Time) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.timestamp(), 0).ok_or_else(|| {
        WardenError::CertificateParse {
            details: format!("Validity timestamp out of range: {}", time),
        }
    })
}
