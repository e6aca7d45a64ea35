//! PEM preamble registry and DER <-> PEM helpers.

use crate::error::Error;

/// Identifies the semantic content of a PEM block by its label.
///
/// Each preamble maps one-to-one to a decoding strategy; private-key
/// preambles map many-to-one onto key algorithms (a PKCS#8 block can hold
/// any of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemPreamble {
    /// `RSA PRIVATE KEY` (PKCS#1)
    PrivateKeyRsa,
    /// `EC PRIVATE KEY` (SEC1)
    PrivateKeyEc,
    /// `PRIVATE KEY` (PKCS#8)
    PrivateKeyPkcs8,
    /// `OPENSSH PRIVATE KEY` (OpenSSH container)
    PrivateKeyOpenSsh,
    /// `PUBLIC KEY` (PKIX SubjectPublicKeyInfo)
    PublicKey,
    /// `CERTIFICATE`
    Certificate,
    /// `CERTIFICATE REQUEST` (PKCS#10)
    CertificateRequest,
}

impl PemPreamble {
    /// The textual PEM block label for this preamble.
    pub fn label(&self) -> &'static str {
        match self {
            PemPreamble::PrivateKeyRsa => "RSA PRIVATE KEY",
            PemPreamble::PrivateKeyEc => "EC PRIVATE KEY",
            PemPreamble::PrivateKeyPkcs8 => "PRIVATE KEY",
            PemPreamble::PrivateKeyOpenSsh => "OPENSSH PRIVATE KEY",
            PemPreamble::PublicKey => "PUBLIC KEY",
            PemPreamble::Certificate => "CERTIFICATE",
            PemPreamble::CertificateRequest => "CERTIFICATE REQUEST",
        }
    }

    /// Looks up the preamble for a PEM block label.
    pub fn from_label(label: &str) -> Result<Self, Error> {
        match label {
            "RSA PRIVATE KEY" => Ok(PemPreamble::PrivateKeyRsa),
            "EC PRIVATE KEY" => Ok(PemPreamble::PrivateKeyEc),
            "PRIVATE KEY" => Ok(PemPreamble::PrivateKeyPkcs8),
            "OPENSSH PRIVATE KEY" => Ok(PemPreamble::PrivateKeyOpenSsh),
            "PUBLIC KEY" => Ok(PemPreamble::PublicKey),
            "CERTIFICATE" => Ok(PemPreamble::Certificate),
            "CERTIFICATE REQUEST" => Ok(PemPreamble::CertificateRequest),
            other => Err(Error::UnknownPreamble(other.to_string())),
        }
    }
}

impl std::fmt::Display for PemPreamble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert DER-encoded data into a PEM-encoded string with the given preamble.
pub fn der_to_pem(der: &[u8], preamble: PemPreamble) -> String {
    let block = pem::Pem::new(preamble.label(), der);
    pem::encode_config(
        &block,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Decode a single PEM block from the input, returning its preamble and
/// DER payload.
pub fn decode_pem_block(pem_bytes: &[u8]) -> Result<(PemPreamble, Vec<u8>), Error> {
    let block = pem::parse(pem_bytes).map_err(|e| {
        Error::Decode(format!("{} ({} input bytes undecoded)", e, pem_bytes.len()))
    })?;
    let preamble = PemPreamble::from_label(block.tag())?;
    Ok((preamble, block.into_contents()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        for preamble in [
            PemPreamble::PrivateKeyRsa,
            PemPreamble::PrivateKeyEc,
            PemPreamble::PrivateKeyPkcs8,
            PemPreamble::PrivateKeyOpenSsh,
            PemPreamble::PublicKey,
            PemPreamble::Certificate,
            PemPreamble::CertificateRequest,
        ] {
            assert_eq!(PemPreamble::from_label(preamble.label()).unwrap(), preamble);
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = PemPreamble::from_label("SSH2 ENCRYPTED PRIVATE KEY").unwrap_err();
        assert!(err.to_string().contains("SSH2 ENCRYPTED PRIVATE KEY"));
    }

    #[test]
    fn decode_requires_a_block() {
        let err = decode_pem_block(b"not pem at all").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn encode_decode_round_trip() {
        let pem = der_to_pem(&[0x30, 0x00], PemPreamble::Certificate);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        let (preamble, der) = decode_pem_block(pem.as_bytes()).unwrap();
        assert_eq!(preamble, PemPreamble::Certificate);
        assert_eq!(der, vec![0x30, 0x00]);
    }
}
