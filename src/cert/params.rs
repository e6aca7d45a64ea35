//! Subject and certificate-request parameters.

use std::net::IpAddr;

use bon::Builder;
use const_oid::db::rfc4519;
use const_oid::ObjectIdentifier;
use der::asn1::{SetOfVec, Utf8StringRef};
use der::Any;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

pub use crate::cert::extensions::{ExtendedKeyUsageOption, FlagSet, KeyUsages};
use crate::error::Error;

/// Subject distinguished-name attributes.
///
/// All fields are optional; organization, organizational unit, and street
/// address may carry multiple values, as the underlying standard allows.
#[derive(Clone, Debug, Default, Builder)]
pub struct Subject {
    pub common_name: Option<String>,
    #[builder(default)]
    pub organization: Vec<String>,
    #[builder(default)]
    pub organizational_unit: Vec<String>,
    #[builder(default)]
    pub street_address: Vec<String>,
    pub locality: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub serial_number: Option<String>,
}

impl Subject {
    /// Builds the X.509 RDN sequence, one RDN per value, preserving the
    /// conventional attribute order. Absent fields are omitted, not
    /// defaulted. Values are encoded as UTF8String, so no RFC 4514 string
    /// escaping is involved.
    pub fn to_rdn_sequence(&self) -> Result<RdnSequence, Error> {
        let mut rdns: Vec<RelativeDistinguishedName> = Vec::new();

        let mut push = |oid: ObjectIdentifier, value: &str| -> Result<(), Error> {
            let value = Any::encode_from(&Utf8StringRef::new(value)?)?;
            let set = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])?;
            rdns.push(RelativeDistinguishedName(set));
            Ok(())
        };

        if let Some(country) = &self.country {
            push(rfc4519::C, country)?;
        }
        for organization in &self.organization {
            push(rfc4519::O, organization)?;
        }
        for unit in &self.organizational_unit {
            push(rfc4519::OU, unit)?;
        }
        if let Some(locality) = &self.locality {
            push(rfc4519::L, locality)?;
        }
        if let Some(province) = &self.province {
            push(rfc4519::ST, province)?;
        }
        for street in &self.street_address {
            push(rfc4519::STREET, street)?;
        }
        if let Some(postal_code) = &self.postal_code {
            push(rfc4519::POSTAL_CODE, postal_code)?;
        }
        if let Some(serial_number) = &self.serial_number {
            push(rfc4519::SERIAL_NUMBER, serial_number)?;
        }
        if let Some(common_name) = &self.common_name {
            push(rfc4519::CN, common_name)?;
        }

        Ok(RdnSequence(rdns))
    }
}

/// Parameters for issuing an X.509 certificate.
///
/// `validity_hours` and `early_renewal_hours` must be non-negative;
/// `early_renewal_hours >= validity_hours` is permitted and yields a
/// certificate that is due for renewal immediately after issuance.
#[derive(Clone, Debug, Builder)]
pub struct CertificateSpec {
    pub subject: Subject,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub ip_addresses: Vec<IpAddr>,
    #[builder(default)]
    pub uris: Vec<String>,
    #[builder(default)]
    pub key_usage: FlagSet<KeyUsages>,
    #[builder(default)]
    pub ext_key_usage: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub set_subject_key_id: bool,
    pub validity_hours: i64,
    #[builder(default)]
    pub early_renewal_hours: i64,
}

/// Upper bound on the hour fields: one thousand years. Keeps every validity
/// window representable in the underlying time arithmetic.
pub const MAX_VALIDITY_HOURS: i64 = 1_000 * 365 * 24;

impl CertificateSpec {
    /// Checks the spec invariants. Runs before any cryptographic work.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("validity_hours", self.validity_hours),
            ("early_renewal_hours", self.early_renewal_hours),
        ] {
            if value < 0 {
                return Err(Error::Validation(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
            if value > MAX_VALIDITY_HOURS {
                return Err(Error::Validation(format!(
                    "{name} must be <= {MAX_VALIDITY_HOURS}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_subject_fields_are_omitted() {
        let subject = Subject::builder().build();
        assert!(subject.to_rdn_sequence().unwrap().0.is_empty());
    }

    #[test]
    fn multi_valued_attributes_become_separate_rdns() {
        let subject = Subject::builder()
            .common_name("example.com".to_string())
            .organization(vec!["Example, Inc".to_string(), "Example Labs".to_string()])
            .country("US".to_string())
            .build();
        let rdns = subject.to_rdn_sequence().unwrap();
        // C, O, O, CN
        assert_eq!(rdns.0.len(), 4);
    }

    #[test]
    fn negative_hours_are_rejected_naming_the_field() {
        let spec = CertificateSpec::builder()
            .subject(Subject::default())
            .validity_hours(-1)
            .build();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("validity_hours"));

        let spec = CertificateSpec::builder()
            .subject(Subject::default())
            .validity_hours(1)
            .early_renewal_hours(-3)
            .build();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("early_renewal_hours"));
    }

    #[test]
    fn oversized_hours_are_rejected_naming_the_field() {
        let spec = CertificateSpec::builder()
            .subject(Subject::default())
            .validity_hours(MAX_VALIDITY_HOURS + 1)
            .build();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("validity_hours"));

        let spec = CertificateSpec::builder()
            .subject(Subject::default())
            .validity_hours(1)
            .early_renewal_hours(i64::MAX)
            .build();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("early_renewal_hours"));
    }

    #[test]
    fn degenerate_early_renewal_is_not_a_validation_error() {
        let spec = CertificateSpec::builder()
            .subject(Subject::default())
            .validity_hours(1)
            .early_renewal_hours(5)
            .build();
        assert!(spec.validate().is_ok());
    }
}
