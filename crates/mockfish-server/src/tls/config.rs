//! Listener TLS mode.

use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;
use mockfish_core::config::TlsSettings;
use tracing::info;

use super::certs::{CertError, generate_dev_bundle, write_dev_certs};

const DEV_SERVER_NAMES: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Plaintext HTTP.
    Disabled,
    /// Generate a self-signed certificate into `cert_dir` at startup.
    DevSelfSigned { cert_dir: PathBuf },
    /// PEM certificate and key supplied by the operator.
    Custom { cert_path: PathBuf, key_path: PathBuf },
}

impl TlsMode {
    pub fn from_settings(settings: &TlsSettings) -> Self {
        if !settings.enabled {
            Self::Disabled
        } else if settings.dev_self_signed {
            Self::DevSelfSigned {
                cert_dir: settings.dev_cert_dir.clone(),
            }
        } else {
            Self::Custom {
                cert_path: settings.cert_file.clone(),
                key_path: settings.key_file.clone(),
            }
        }
    }

    /// Build the rustls listener config. Returns `None` when TLS is disabled.
    pub async fn to_rustls_config(&self) -> Result<Option<RustlsConfig>, TlsConfigError> {
        match self {
            Self::Disabled => Ok(None),
            Self::DevSelfSigned { cert_dir } => {
                info!("Generating dev TLS certificates");
                let bundle = generate_dev_bundle(DEV_SERVER_NAMES)?;
                write_dev_certs(cert_dir, &bundle)?;
                let config = RustlsConfig::from_pem(
                    bundle.server_cert_pem.into_bytes(),
                    bundle.server_key_pem.into_bytes(),
                )
                .await
                .map_err(|e| TlsConfigError::CertGeneration(e.to_string()))?;
                info!(cert_dir = %cert_dir.display(), "Dev TLS enabled");
                Ok(Some(config))
            }
            Self::Custom {
                cert_path,
                key_path,
            } => {
                for path in [cert_path, key_path] {
                    if !path.exists() {
                        return Err(TlsConfigError::FileRead(format!(
                            "{} does not exist",
                            path.display()
                        )));
                    }
                }
                let config = RustlsConfig::from_pem_file(cert_path, key_path)
                    .await
                    .map_err(|e| {
                        TlsConfigError::FileRead(format!(
                            "Failed to load {} / {}: {e}",
                            cert_path.display(),
                            key_path.display()
                        ))
                    })?;
                info!(
                    cert = %cert_path.display(),
                    key = %key_path.display(),
                    "Custom TLS enabled"
                );
                Ok(Some(config))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    #[error("Certificate generation error: {0}")]
    CertGeneration(String),

    #[error("File read error: {0}")]
    FileRead(String),
}

impl From<CertError> for TlsConfigError {
    fn from(e: CertError) -> Self {
        Self::CertGeneration(e.to_string())
    }
}
