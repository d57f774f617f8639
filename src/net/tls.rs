//! TLS configuration and certificate loading.
//!
//! Produces the acceptor that performs the handshake and ALPN negotiation;
//! the negotiated protocol is read back by the server to pick a codec.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::net::protocol::Protocol;

/// Error type for TLS setup.
#[derive(Debug)]
pub enum TlsError {
    /// Certificate or key file could not be read.
    Io(std::path::PathBuf, std::io::Error),
    /// File contained no usable certificate or key.
    Empty(std::path::PathBuf),
    /// rustls rejected the certificate/key pair.
    Rustls(rustls::Error),
}

impl std::fmt::Display for TlsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsError::Io(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            TlsError::Empty(path) => write!(f, "No PEM items found in {:?}", path),
            TlsError::Rustls(e) => write!(f, "Invalid TLS configuration: {}", e),
        }
    }
}

impl std::error::Error for TlsError {}

/// Load a certificate chain and private key and build an acceptor that
/// offers `h2` and `http/1.1`, preferring `h2`.
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(TlsError::Rustls)?;
    config.alpn_protocols = vec![
        Protocol::Http2.alpn_id().to_vec(),
        Protocol::Http1.alpn_id().to_vec(),
    ];

    tracing::info!(cert = ?cert_path, "TLS configured");
    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::Io(path.to_path_buf(), e))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::Io(path.to_path_buf(), e))?;
    if certs.is_empty() {
        return Err(TlsError::Empty(path.to_path_buf()));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::Io(path.to_path_buf(), e))?;
    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|e| TlsError::Io(path.to_path_buf(), e))?
        .ok_or_else(|| TlsError::Empty(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_io_errors() {
        let err = load_tls_acceptor(
            Path::new("/nonexistent/cert.pem"),
            Path::new("/nonexistent/key.pem"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TlsError::Io(..)));
    }

    #[test]
    fn generated_pair_loads() {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let dir = std::env::temp_dir();
        let cert_path = dir.join(format!("xrpc-pair-{}-cert.pem", std::process::id()));
        let key_path = dir.join(format!("xrpc-pair-{}-key.pem", std::process::id()));
        std::fs::write(&cert_path, cert.pem()).unwrap();
        std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();

        assert!(load_tls_acceptor(&cert_path, &key_path).is_ok());

        std::fs::remove_file(&cert_path).unwrap();
        std::fs::remove_file(&key_path).unwrap();
    }

    #[test]
    fn file_without_pem_items_is_empty() {
        let path = std::env::temp_dir().join(format!("xrpc-empty-{}.pem", std::process::id()));
        std::fs::write(&path, "not a certificate\n").unwrap();

        let err = load_tls_acceptor(&path, &path).err().unwrap();
        assert!(matches!(err, TlsError::Empty(_)));

        std::fs::remove_file(&path).unwrap();
    }
}
