//! TLS settings for the STARTTLS upgrade.
//!
//! [`TlsSettings::derive`] is a pure function of the security policy; nothing
//! touches the network until the transport asks for a
//! [`ClientConfig`](rustls::ClientConfig).

use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;

/// How the server certificate is checked.
#[derive(Debug, Clone)]
pub enum Verification {
    /// Any certificate is accepted.
    Disabled,
    /// Only chains anchored in this store are trusted.
    Pinned(RootCertStore),
    /// The bundled Mozilla root set.
    SystemRoots,
}

/// TLS parameters derived from a sender's policy.
#[derive(Debug, Clone)]
pub struct TlsSettings {
    server_name: String,
    verification: Verification,
}

impl TlsSettings {
    /// Derives the settings for `host`.
    ///
    /// `skip_validation` wins over `ca_cert`. A CA certificate that does not
    /// parse yields an empty trust store rather than an error, so the failure
    /// surfaces at handshake time.
    #[must_use]
    pub fn derive(host: &str, skip_validation: bool, ca_cert: Option<&str>) -> Self {
        let verification = if skip_validation {
            Verification::Disabled
        } else if let Some(pem) = ca_cert.filter(|pem| !pem.is_empty()) {
            Verification::Pinned(pinned_store(pem))
        } else {
            Verification::SystemRoots
        };

        Self {
            server_name: host.to_string(),
            verification,
        }
    }

    /// Name used for SNI and certificate hostname checks.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// The verification policy.
    #[must_use]
    pub const fn verification(&self) -> &Verification {
        &self.verification
    }

    /// Returns true when certificate verification is turned off.
    #[must_use]
    pub const fn skips_verification(&self) -> bool {
        matches!(self.verification, Verification::Disabled)
    }

    /// Number of trust anchors in a pinned store, `None` otherwise.
    #[must_use]
    pub fn pinned_roots(&self) -> Option<usize> {
        match &self.verification {
            Verification::Pinned(store) => Some(store.len()),
            _ => None,
        }
    }

    /// Builds the rustls configuration for the handshake.
    #[must_use]
    pub fn client_config(&self) -> Arc<ClientConfig> {
        let config = match &self.verification {
            Verification::Disabled => ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(danger::AcceptAnyCertificate::new()))
                .with_no_client_auth(),
            Verification::Pinned(store) => ClientConfig::builder()
                .with_root_certificates(store.clone())
                .with_no_client_auth(),
            Verification::SystemRoots => ClientConfig::builder()
                .with_root_certificates(RootCertStore {
                    roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
                })
                .with_no_client_auth(),
        };
        Arc::new(config)
    }
}

fn pinned_store(pem: &str) -> RootCertStore {
    let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(pem.as_bytes())
        .map_while(Result::ok)
        .collect();

    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(certs);
    if ignored > 0 || added == 0 {
        tracing::trace!(added, ignored, "CA certificate yielded unusable entries");
    }
    store
}

mod danger {
    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::{
        CryptoProvider, WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature,
    };
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, Error, SignatureScheme};

    /// Accepts any server certificate but still checks that the handshake
    /// was signed by the key in it.
    #[derive(Debug)]
    pub struct AcceptAnyCertificate {
        algorithms: WebPkiSupportedAlgorithms,
    }

    impl AcceptAnyCertificate {
        pub fn new() -> Self {
            let algorithms = CryptoProvider::get_default().map_or_else(
                || {
                    rustls::crypto::aws_lc_rs::default_provider()
                        .signature_verification_algorithms
                },
                |provider| provider.signature_verification_algorithms,
            );
            Self { algorithms }
        }
    }

    impl ServerCertVerifier for AcceptAnyCertificate {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls12_signature(message, cert, dss, &self.algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            verify_tls13_signature(message, cert, dss, &self.algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.algorithms.supported_schemes()
        }
    }
}
