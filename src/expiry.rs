//! Certificate expiry and early-renewal policy.
//!
//! Pure functions of their inputs: the caller supplies both the issuance
//! time and the "as of" time, so the policy never reads the system clock.

use time::{Duration, OffsetDateTime};

use crate::cert::params::CertificateSpec;

/// The instant a certificate becomes due for renewal:
/// `issued_at + validity_hours - early_renewal_hours`.
///
/// Recomputed from the spec every time, never cached, so raising the
/// early-renewal window on an already-issued certificate takes effect
/// against the stored issuance time.
pub fn renewal_deadline(issued_at: OffsetDateTime, spec: &CertificateSpec) -> OffsetDateTime {
    // Saturates at the datetime range limits rather than panicking for
    // issuance times near them.
    issued_at
        .saturating_add(Duration::hours(spec.validity_hours))
        .saturating_sub(Duration::hours(spec.early_renewal_hours))
}

/// Whether a certificate issued at `issued_at` is still usable at `as_of`,
/// i.e. `as_of` is strictly before the renewal deadline.
///
/// With `early_renewal_hours == 0` the certificate is current until its
/// literal expiry. With `early_renewal_hours >= validity_hours` the deadline
/// is at or before `issued_at`, so the certificate is due for renewal
/// immediately; that configuration is degenerate but permitted.
pub fn is_current(issued_at: OffsetDateTime, spec: &CertificateSpec, as_of: OffsetDateTime) -> bool {
    as_of < renewal_deadline(issued_at, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::params::Subject;
    use time::macros::datetime;

    fn spec(validity_hours: i64, early_renewal_hours: i64) -> CertificateSpec {
        CertificateSpec::builder()
            .subject(Subject::builder().common_name("example.com".to_string()).build())
            .validity_hours(validity_hours)
            .early_renewal_hours(early_renewal_hours)
            .build()
    }

    const ISSUED: OffsetDateTime = datetime!(2024-03-01 00:00:00 UTC);

    #[test]
    fn deadline_subtracts_the_early_renewal_window() {
        assert_eq!(
            renewal_deadline(ISSUED, &spec(10, 2)),
            ISSUED + Duration::hours(8)
        );
    }

    #[test]
    fn current_until_the_deadline() {
        let spec = spec(10, 2);
        assert!(is_current(ISSUED, &spec, ISSUED));
        assert!(is_current(ISSUED, &spec, ISSUED + Duration::hours(7)));
        assert!(!is_current(ISSUED, &spec, ISSUED + Duration::hours(8)));
        assert!(!is_current(ISSUED, &spec, ISSUED + Duration::hours(9)));
    }

    #[test]
    fn zero_early_renewal_means_current_until_expiry() {
        let spec = spec(10, 0);
        assert!(is_current(ISSUED, &spec, ISSUED + Duration::hours(9)));
        assert!(!is_current(ISSUED, &spec, ISSUED + Duration::hours(10)));
    }

    #[test]
    fn raising_early_renewal_is_evaluated_against_stored_issuance() {
        // Raising from 2 to 3 hours keeps the cert current at T+4h.
        assert!(is_current(ISSUED, &spec(10, 3), ISSUED + Duration::hours(4)));
        // Raising to 9 hours moves the deadline to T+1h, already past.
        assert!(!is_current(ISSUED, &spec(10, 9), ISSUED + Duration::hours(4)));
    }

    #[test]
    fn deadline_saturates_near_the_datetime_range_limit() {
        use crate::cert::params::MAX_VALIDITY_HOURS;

        let near_max = datetime!(9999-12-31 00:00:00 UTC);
        let wide = spec(MAX_VALIDITY_HOURS, 0);
        // Clamps instead of panicking; the certificate stays current.
        assert!(renewal_deadline(near_max, &wide) > near_max);
        assert!(is_current(near_max, &wide, near_max));
    }

    #[test]
    fn early_renewal_at_or_beyond_validity_is_immediately_due() {
        assert!(!is_current(ISSUED, &spec(10, 10), ISSUED));
        assert!(!is_current(ISSUED, &spec(10, 12), ISSUED));
    }
}
