//! Assembly of the "To Be Signed" portion of an X.509 certificate.

use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use der::Encode;
use time::OffsetDateTime;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::RdnSequence;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::Time;
use x509_cert::Version;

use crate::cert::extensions::ExtensionParam;
use crate::cert::SignatureAlgorithm;
use crate::error::Error;
use crate::key::PublicKey;

/// The fields that go under the signature of an X.509 certificate.
pub struct TbsCertificate {
    /// Certificate serial number, a positive big-endian integer
    pub serial_number: Vec<u8>,
    /// Signature algorithm the issuer will sign with
    pub signature_algorithm: SignatureAlgorithm,
    /// Issuer distinguished name
    pub issuer: RdnSequence,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    /// Subject distinguished name
    pub subject: RdnSequence,
    /// Subject's public key
    pub subject_public_key: PublicKey,
    /// Certificate extensions
    pub extensions: Vec<ExtensionParam>,
}

/// Encodes a timestamp as UTCTime when it fits (years up to 2049) and as
/// GeneralizedTime beyond, per RFC 5280.
fn to_x509_time(timestamp: OffsetDateTime) -> Result<Time, Error> {
    let system_time: std::time::SystemTime = timestamp.into();
    if let Ok(utc) = UtcTime::from_system_time(system_time) {
        return Ok(Time::UtcTime(utc));
    }
    let general = GeneralizedTime::from_system_time(system_time)
        .map_err(|e| Error::Encoding(format!("certificate validity time out of range: {e}")))?;
    Ok(Time::GeneralTime(general))
}

impl TbsCertificate {
    /// Converts into the x509-cert structure used for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner, Error> {
        let algorithm_id: x509_cert::spki::AlgorithmIdentifierOwned =
            self.signature_algorithm.into();

        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>, der::Error>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())
            .map_err(|e| Error::Encoding(format!("invalid serial number: {e}")))?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm_id,
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Encodes the TBS structure into DER, the byte string that gets signed.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_tbs_certificate_inner()?.to_der()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn utc_time_is_used_until_2049() {
        let time = to_x509_time(datetime!(2049-12-31 23:59:59 UTC)).unwrap();
        assert!(matches!(time, Time::UtcTime(_)));
    }

    #[test]
    fn generalized_time_is_used_past_2049() {
        let time = to_x509_time(datetime!(2050-01-01 00:00:00 UTC)).unwrap();
        assert!(matches!(time, Time::GeneralTime(_)));
    }
}
