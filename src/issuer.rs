//! Certificate issuance.

use rand_core::{OsRng, RngCore};
use sha1::{Digest, Sha1};
use time::{Duration, OffsetDateTime};
use x509_cert::certificate::CertificateInner;
use x509_cert::name::RdnSequence;

use crate::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtensionParam, KeyUsage, KeyUsages, SubjectAltName,
    SubjectKeyIdentifier,
};
use crate::cert::params::{CertificateSpec, Subject};
use crate::cert::Certificate;
use crate::error::Error;
use crate::key::{KeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// The distinguished name recorded as the certificate's issuer.
    fn issuer_name(&self) -> Result<RdnSequence, Error>;

    /// The key that signs issued certificates.
    fn signing_key(&self) -> &KeyPair;

    /// Issues a certificate for `subject_public_key` according to `spec`.
    ///
    /// `now` becomes NotBefore; NotAfter is `now + spec.validity_hours`.
    /// The serial number is a fresh 128-bit random value per issuance, so
    /// re-issuing with identical parameters yields a distinguishable
    /// certificate. Parameters are validated before any cryptographic work;
    /// a failed issuance yields no artifact.
    fn issue(
        &self,
        spec: &CertificateSpec,
        subject_public_key: &PublicKey,
        now: OffsetDateTime,
    ) -> Result<Certificate, Error> {
        spec.validate()?;

        let not_before = now;
        let not_after = now
            .checked_add(Duration::hours(spec.validity_hours))
            .ok_or_else(|| {
                Error::Validation(
                    "validity window extends beyond the representable time range".to_string(),
                )
            })?;

        let mut extensions = vec![ExtensionParam::from_extension(
            &BasicConstraints {
                is_ca: spec.is_ca,
                max_path_length: None,
            },
            true,
        )?];

        let mut key_usage = spec.key_usage;
        if spec.is_ca {
            key_usage |= KeyUsages::KeyCertSign;
        }
        if !key_usage.is_empty() {
            extensions.push(ExtensionParam::from_extension(&KeyUsage(key_usage), true)?);
        }

        if !spec.ext_key_usage.is_empty() {
            let eku = ExtendedKeyUsage {
                usage: spec.ext_key_usage.clone(),
            };
            extensions.push(ExtensionParam::from_extension(&eku, false)?);
        }

        let san = SubjectAltName {
            dns_names: spec.dns_names.clone(),
            ip_addresses: spec.ip_addresses.clone(),
            uris: spec.uris.clone(),
        };
        if !san.is_empty() {
            extensions.push(ExtensionParam::from_extension(&san, false)?);
        }

        if spec.set_subject_key_id {
            let spki_der = subject_public_key.to_pkix_der()?;
            let key_id = SubjectKeyIdentifier(Sha1::digest(&spki_der).to_vec());
            extensions.push(ExtensionParam::from_extension(&key_id, false)?);
        }

        let signature_algorithm = self.signing_key().signature_algorithm();

        let tbs_cert = TbsCertificate {
            serial_number: random_serial_number(),
            signature_algorithm,
            issuer: self.issuer_name()?,
            not_before,
            not_after,
            subject: spec.subject.to_rdn_sequence()?,
            subject_public_key: subject_public_key.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert.to_der()?;
        let signature = self.signing_key().sign_data(&tbs_der)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algorithm.into(),
            signature: der::asn1::BitString::from_bytes(&signature)
                .map_err(|e| Error::Signing(e.to_string()))?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Issues self-signed certificates: the subject key signs and the issuer
/// name is the subject itself.
pub struct SelfIssuer<'a> {
    pub key: &'a KeyPair,
    pub subject: &'a Subject,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> Result<RdnSequence, Error> {
        self.subject.to_rdn_sequence()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

/// A 128-bit random serial, positive and non-zero so it survives DER
/// INTEGER normalization.
fn random_serial_number() -> Vec<u8> {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes[0] = (bytes[0] & 0x7f) | 0x01;
    bytes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_numbers_are_positive_and_full_width() {
        for _ in 0..64 {
            let serial = random_serial_number();
            assert_eq!(serial.len(), 16);
            assert_eq!(serial[0] & 0x80, 0);
            assert_ne!(serial[0], 0);
        }
    }
}
