//! Development certificate generation using rcgen.
//!
//! Produces a throwaway CA and a server certificate it signs. For local
//! development only.

use std::path::Path;

use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair,
    KeyUsagePurpose,
};
use tracing::info;

/// PEM-encoded development certificates.
pub struct CertBundle {
    pub ca_cert_pem: String,
    pub server_cert_pem: String,
    pub server_key_pem: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CertError {
    #[error("Certificate generation error: {0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(String),
}

fn generation(e: rcgen::Error) -> CertError {
    CertError::Generation(e.to_string())
}

/// Generate a CA and a server certificate valid for `server_names`.
pub fn generate_dev_bundle(server_names: &[&str]) -> Result<CertBundle, CertError> {
    let mut ca_params = CertificateParams::default();
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "mockfish Dev CA");
    ca_params.key_usages.push(KeyUsagePurpose::KeyCertSign);
    ca_params.key_usages.push(KeyUsagePurpose::CrlSign);
    let ca_key = KeyPair::generate().map_err(generation)?;
    let ca_cert = ca_params.self_signed(&ca_key).map_err(generation)?;
    let issuer = Issuer::from_params(&ca_params, &ca_key);

    let mut params = CertificateParams::new(
        server_names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    )
    .map_err(generation)?;
    params
        .distinguished_name
        .push(DnType::CommonName, "mockfish Redfish Service");
    params
        .extended_key_usages
        .push(ExtendedKeyUsagePurpose::ServerAuth);
    let server_key = KeyPair::generate().map_err(generation)?;
    let server_cert = params.signed_by(&server_key, &issuer).map_err(generation)?;

    Ok(CertBundle {
        ca_cert_pem: ca_cert.pem(),
        server_cert_pem: server_cert.pem(),
        server_key_pem: server_key.serialize_pem(),
    })
}

/// Write `bundle` as `ca.pem`, `server.pem` and `server-key.pem` under `dir`.
pub fn write_dev_certs(dir: &Path, bundle: &CertBundle) -> Result<(), CertError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CertError::Io(format!("Failed to create cert dir: {e}")))?;

    let files = [
        ("ca.pem", &bundle.ca_cert_pem),
        ("server.pem", &bundle.server_cert_pem),
        ("server-key.pem", &bundle.server_key_pem),
    ];
    for (name, pem) in files {
        std::fs::write(dir.join(name), pem)
            .map_err(|e| CertError::Io(format!("Failed to write {name}: {e}")))?;
    }

    info!(dir = %dir.display(), "Dev certificates written");
    Ok(())
}
