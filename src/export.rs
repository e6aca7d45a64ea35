//! Public-key artifact export: PKIX PEM, SSH authorized-key lines,
//! fingerprints, and the stable key identity hash.

use md5::Md5;
use sha1::{Digest, Sha1};
use ssh_key::public::{Ed25519PublicKey, KeyData};
use ssh_key::HashAlg;

use crate::error::Error;
use crate::key::{KeyPair, PublicKey};

/// SSH-format artifacts for a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPublicKey {
    /// A single OpenSSH `authorized_keys` line, newline-terminated.
    pub authorized_key: String,
    /// Legacy fingerprint: lowercase colon-separated MD5 hex pairs.
    pub fingerprint_md5: String,
    /// `SHA256:` followed by the unpadded base64 digest.
    pub fingerprint_sha256: String,
}

/// Everything derivable from a private key's public counterpart.
///
/// `ssh` is `None` when the key has no SSH wire-format representation
/// (ECDSA P-224); the PKIX PEM is still produced for such keys.
#[derive(Debug, Clone)]
pub struct PublicKeyArtifacts {
    pub public_key_pem: String,
    pub ssh: Option<SshPublicKey>,
}

/// Derives the public-key artifacts for a private key.
///
/// Fails only if public-key derivation or DER marshaling fails; the SSH
/// fields are best-effort and degrade to `None` instead.
pub fn export_artifacts(key: &KeyPair) -> Result<PublicKeyArtifacts, Error> {
    let public = key.public_key();
    let public_key_pem = public.to_pkix_pem()?;
    let ssh = match ssh_public_key(&public)? {
        Some(ssh_key) => Some(ssh_artifacts(&ssh_key)?),
        None => None,
    };
    Ok(PublicKeyArtifacts {
        public_key_pem,
        ssh,
    })
}

/// Converts a public key into its SSH representation, or `None` if the
/// algorithm/curve combination has none.
pub fn ssh_public_key(public: &PublicKey) -> Result<Option<ssh_key::PublicKey>, Error> {
    let encoding_err = |e: &dyn std::fmt::Display| Error::Encoding(e.to_string());
    let key_data = match public {
        PublicKey::Rsa(public) => KeyData::Rsa(
            ssh_key::public::RsaPublicKey::try_from(public).map_err(|e| encoding_err(&e))?,
        ),
        // P-224 has no SSH wire format; callers degrade instead of failing.
        PublicKey::EcdsaP224(_) => return Ok(None),
        PublicKey::EcdsaP256(verifying_key) => KeyData::Ecdsa(
            ssh_key::public::EcdsaPublicKey::from_sec1_bytes(
                verifying_key.to_encoded_point(false).as_bytes(),
            )
            .map_err(|e| encoding_err(&e))?,
        ),
        PublicKey::EcdsaP384(verifying_key) => KeyData::Ecdsa(
            ssh_key::public::EcdsaPublicKey::from_sec1_bytes(
                verifying_key.to_encoded_point(false).as_bytes(),
            )
            .map_err(|e| encoding_err(&e))?,
        ),
        PublicKey::EcdsaP521(public_key) => {
            use p521::elliptic_curve::sec1::ToEncodedPoint;

            KeyData::Ecdsa(
                ssh_key::public::EcdsaPublicKey::from_sec1_bytes(
                    public_key.to_encoded_point(false).as_bytes(),
                )
                .map_err(|e| encoding_err(&e))?,
            )
        }
        PublicKey::Ed25519(verifying_key) => {
            KeyData::Ed25519(Ed25519PublicKey(verifying_key.to_bytes()))
        }
    };
    Ok(Some(ssh_key::PublicKey::from(key_data)))
}

fn ssh_artifacts(ssh_key: &ssh_key::PublicKey) -> Result<SshPublicKey, Error> {
    let authorized_key = ssh_key
        .to_openssh()
        .map_err(|e| Error::Encoding(e.to_string()))?
        + "\n";

    let wire_bytes = ssh_key
        .to_bytes()
        .map_err(|e| Error::Encoding(e.to_string()))?;
    let md5_digest = Md5::digest(&wire_bytes);
    let fingerprint_md5 = md5_digest
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":");

    let fingerprint_sha256 = ssh_key.fingerprint(HashAlg::Sha256).to_string();

    Ok(SshPublicKey {
        authorized_key,
        fingerprint_md5,
        fingerprint_sha256,
    })
}

/// A stable identifier for a key: lowercase-hex SHA-1 over the public key's
/// PKIX DER encoding. Deterministic given the same public key.
pub fn key_identity(public: &PublicKey) -> Result<String, Error> {
    let der = public.to_pkix_der()?;
    let digest = Sha1::digest(&der);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::key::EcdsaCurve;

    const RSA_PKCS1_PEM: &str = include_str!("../tests/fixtures/rsa_pkcs1.pem");
    const RSA_PUBLIC_PEM: &str = include_str!("../tests/fixtures/rsa_pub.pem");
    const EC_P256_SEC1_PEM: &str = include_str!("../tests/fixtures/ec_p256.pem");
    const EC_P256_PUBLIC_PEM: &str = include_str!("../tests/fixtures/ec_pub.pem");
    const ED25519_PKCS8_PEM: &str = include_str!("../tests/fixtures/ed25519_pkcs8.pem");
    const ED25519_PUBLIC_PEM: &str = include_str!("../tests/fixtures/ed25519_pub.pem");
    const ED25519_OPENSSH_PEM: &str = include_str!("../tests/fixtures/openssh_ed25519");
    const ED25519_AUTHORIZED_KEY: &str = include_str!("../tests/fixtures/openssh_ed25519.pub");

    #[test]
    fn pkix_pem_matches_openssl_output() {
        for (private_pem, public_pem) in [
            (RSA_PKCS1_PEM, RSA_PUBLIC_PEM),
            (EC_P256_SEC1_PEM, EC_P256_PUBLIC_PEM),
            (ED25519_PKCS8_PEM, ED25519_PUBLIC_PEM),
        ] {
            let (key, _) = codec::parse_private_key_pem(private_pem.as_bytes()).unwrap();
            let artifacts = export_artifacts(&key).unwrap();
            assert_eq!(artifacts.public_key_pem, public_pem);
        }
    }

    #[test]
    fn ssh_artifacts_match_ssh_keygen() {
        let (key, _) = codec::parse_private_key_openssh(ED25519_OPENSSH_PEM.as_bytes()).unwrap();
        let ssh = export_artifacts(&key).unwrap().ssh.unwrap();
        // ssh-keygen appends an empty comment; the authorized line itself is
        // algorithm + blob.
        assert_eq!(ssh.authorized_key, ED25519_AUTHORIZED_KEY.trim_end().to_string() + "\n");
        assert_eq!(
            ssh.fingerprint_sha256,
            "SHA256:xW5D08zG5FMp7ExKAGWU8hIZSIwJHGiKrsK6mCEyQ80"
        );
        assert_eq!(
            ssh.fingerprint_md5,
            "7e:14:51:66:7e:12:66:1c:58:c7:75:04:4f:37:0a:65"
        );
    }

    #[test]
    fn p224_degrades_to_pem_only() {
        let key = KeyPair::generate_ecdsa(EcdsaCurve::P224);
        let artifacts = export_artifacts(&key).unwrap();
        assert!(!artifacts.public_key_pem.is_empty());
        assert!(artifacts.ssh.is_none());
    }

    #[test]
    fn other_curves_have_ssh_representations() {
        for curve in [EcdsaCurve::P256, EcdsaCurve::P384, EcdsaCurve::P521] {
            let key = KeyPair::generate_ecdsa(curve);
            let artifacts = export_artifacts(&key).unwrap();
            let ssh = artifacts.ssh.expect("curve has an SSH form");
            assert!(ssh.authorized_key.starts_with("ecdsa-sha2-nistp"));
            assert!(ssh.authorized_key.ends_with('\n'));
            assert!(ssh.fingerprint_sha256.starts_with("SHA256:"));
        }
    }

    #[test]
    fn key_identity_is_stable() {
        let (key, _) = codec::parse_private_key_pem(ED25519_PKCS8_PEM.as_bytes()).unwrap();
        assert_eq!(
            key_identity(&key.public_key()).unwrap(),
            "2a222f8f728a14303908fdc1ee0b5acce2455c2d"
        );
    }
}
