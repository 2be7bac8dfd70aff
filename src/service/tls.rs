//! TLS certificate inspection.
//!
//! Completes a real handshake against `host:443` and reads the leaf
//! certificate's notAfter. The webpki root store is used for verification,
//! so an already-expired or untrusted chain surfaces as a handshake error.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rustls_pki_types::ServerName;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use x509_parser::prelude::FromDer;
use x509_parser::certificate::X509Certificate;

fn connector() -> &'static TlsConnector {
    static CONNECTOR: OnceLock<TlsConnector> = OnceLock::new();
    CONNECTOR.get_or_init(|| {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        TlsConnector::from(Arc::new(config))
    })
}

/// Handshake with `host:port` and return whole days until the leaf
/// certificate expires (negative once past notAfter).
pub async fn certificate_days_remaining(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<i64> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| anyhow!("invalid TLS server name: {host}"))?;

    let tcp = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .with_context(|| format!("TCP connect to {host}:{port} timed out"))?
        .with_context(|| format!("TCP connect to {host}:{port} failed"))?;

    let tls = tokio::time::timeout(timeout, connector().connect(server_name, tcp))
        .await
        .with_context(|| format!("TLS handshake with {host} timed out"))?
        .with_context(|| format!("TLS handshake with {host} failed"))?;

    let (_, session) = tls.get_ref();
    let leaf = session
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| anyhow!("{host} presented no certificate"))?;

    let (_, cert) = X509Certificate::from_der(leaf.as_ref())
        .map_err(|e| anyhow!("failed to parse certificate from {host}: {e}"))?;

    let not_after = cert.validity().not_after.timestamp();
    Ok((not_after - Utc::now().timestamp()) / 86_400)
}
