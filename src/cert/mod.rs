pub mod extensions;
pub mod params;

use der::{DecodePem, Encode, EncodePem};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::RdnSequence;

use crate::error::Error;
use crate::issuer::{Issuer, SelfIssuer};
use crate::key::KeyPair;
use params::CertificateSpec;

/// Signature schemes this crate signs certificates with.
///
/// ECDSA pairs the digest to the curve; each variant maps to its RFC 5912 /
/// RFC 8410 OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// PKCS#1 v1.5 with SHA-256.
    Sha256WithRsa,
    /// ECDSA with SHA-224 (P-224).
    EcdsaWithSha224,
    /// ECDSA with SHA-256 (P-256).
    EcdsaWithSha256,
    /// ECDSA with SHA-384 (P-384).
    EcdsaWithSha384,
    /// ECDSA with SHA-512 (P-521).
    EcdsaWithSha512,
    /// Pure Ed25519.
    Ed25519,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    fn from(value: SignatureAlgorithm) -> Self {
        let oid = match value {
            SignatureAlgorithm::Sha256WithRsa => {
                const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION
            }
            SignatureAlgorithm::EcdsaWithSha224 => const_oid::db::rfc5912::ECDSA_WITH_SHA_224,
            SignatureAlgorithm::EcdsaWithSha256 => const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::EcdsaWithSha384 => const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
            SignatureAlgorithm::EcdsaWithSha512 => const_oid::db::rfc5912::ECDSA_WITH_SHA_512,
            SignatureAlgorithm::Ed25519 => const_oid::db::rfc8410::ID_ED_25519,
        };
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid,
            parameters: None,
        }
    }
}

/// An issued X.509 certificate.
///
/// Immutable once issued; the issuer holds no reference after returning it.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Issues a self-signed certificate: the subject key signs its own
    /// certificate and the issuer name is the spec's subject.
    ///
    /// `now` becomes the certificate's NotBefore; it is passed in rather
    /// than read from the clock so issuance is deterministic under test.
    pub fn new_self_signed(
        spec: &CertificateSpec,
        key: &KeyPair,
        now: OffsetDateTime,
    ) -> Result<Self, Error> {
        SelfIssuer {
            key,
            subject: &spec.subject,
        }
        .issue(spec, &key.public_key(), now)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.inner.to_der()?)
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String, Error> {
        Ok(self.inner.to_pem(pkcs8::LineEnding::LF)?)
    }

    /// Decodes a certificate from a `CERTIFICATE` PEM block.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, Error> {
        let inner = CertificateInner::from_pem(pem_bytes)
            .map_err(|e| Error::Decode(e.to_string()))?;
        Ok(Certificate { inner })
    }

    /// The certificate's subject distinguished name.
    pub fn subject(&self) -> &RdnSequence {
        &self.inner.tbs_certificate.subject
    }
}

/// A certificate bundled with the private key that can sign on its behalf,
/// used as the issuing CA for non-self-signed issuance.
#[derive(Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issuer for CertificateWithPrivateKey {
    /// The issuer name of a CA-signed certificate is the CA's subject.
    fn issuer_name(&self) -> Result<RdnSequence, Error> {
        Ok(self.cert.subject().clone())
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }
}
