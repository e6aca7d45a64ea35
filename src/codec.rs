//! Private-key decoding from PEM (RFC 1421) and OpenSSH container formats.

use der::Decode;
use pkcs8::DecodePrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use ssh_key::private::{EcdsaKeypair, KeypairData};

use crate::error::Error;
use crate::key::{Algorithm, KeyPair};
use crate::pem_utils::{self, PemPreamble};

/// Parses a private key from a PEM-encoded input and identifies its
/// algorithm.
///
/// The block label selects the parser (PKCS#1, SEC1, or PKCS#8), and the
/// algorithm tag is read back off the parsed key's variant.
pub fn parse_private_key_pem(pem_bytes: &[u8]) -> Result<(KeyPair, Algorithm), Error> {
    let (preamble, der) = pem_utils::decode_pem_block(pem_bytes)?;

    let key = match preamble {
        PemPreamble::PrivateKeyRsa => parse_pkcs1(&der)?,
        PemPreamble::PrivateKeyEc => parse_sec1(&der)?,
        PemPreamble::PrivateKeyPkcs8 => parse_pkcs8(&der)?,
        other => return Err(Error::UnknownPreamble(other.label().to_string())),
    };

    let algorithm = key.algorithm();
    Ok((key, algorithm))
}

/// Parses a private key from the OpenSSH private-key container format
/// (RFC 4716-style) and identifies its algorithm.
pub fn parse_private_key_openssh(openssh_bytes: &[u8]) -> Result<(KeyPair, Algorithm), Error> {
    let ssh_key = ssh_key::private::PrivateKey::from_openssh(openssh_bytes)
        .map_err(|e| Error::Parse(format!("failed to parse OpenSSH private key: {e}")))?;

    let key = match ssh_key.key_data() {
        KeypairData::Rsa(keypair) => {
            let private = RsaPrivateKey::try_from(keypair)
                .map_err(|e| Error::Parse(format!("invalid OpenSSH RSA key: {e}")))?;
            let public = rsa::RsaPublicKey::from(&private);
            KeyPair::Rsa {
                private: Box::new(private),
                public,
            }
        }
        KeypairData::Ecdsa(keypair) => parse_openssh_ecdsa(keypair)?,
        KeypairData::Ed25519(keypair) => {
            let signing_key = ed25519_dalek::SigningKey::try_from(keypair)
                .map_err(|_| Error::Parse("invalid OpenSSH Ed25519 key".to_string()))?;
            KeyPair::Ed25519 { signing_key }
        }
        other => {
            return Err(Error::UnsupportedKeyType(format!(
                "OpenSSH key algorithm {}",
                other
                    .algorithm()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| "unknown".to_string())
            )));
        }
    };

    let algorithm = key.algorithm();
    Ok((key, algorithm))
}

fn parse_openssh_ecdsa(keypair: &EcdsaKeypair) -> Result<KeyPair, Error> {
    let parse_err = |e: &dyn std::fmt::Display| Error::Parse(format!("invalid OpenSSH ECDSA key: {e}"));
    match keypair {
        EcdsaKeypair::NistP256 { private, .. } => {
            let signing_key =
                p256::ecdsa::SigningKey::from_slice(private.as_slice()).map_err(|e| parse_err(&e))?;
            let verifying_key = signing_key.verifying_key().to_owned();
            Ok(KeyPair::EcdsaP256 {
                signing_key,
                verifying_key,
            })
        }
        EcdsaKeypair::NistP384 { private, .. } => {
            let signing_key =
                p384::ecdsa::SigningKey::from_slice(private.as_slice()).map_err(|e| parse_err(&e))?;
            let verifying_key = signing_key.verifying_key().to_owned();
            Ok(KeyPair::EcdsaP384 {
                signing_key,
                verifying_key,
            })
        }
        EcdsaKeypair::NistP521 { private, .. } => {
            let signing_key =
                p521::ecdsa::SigningKey::from_slice(private.as_slice()).map_err(|e| parse_err(&e))?;
            let public_key = p521::PublicKey::from_secret_scalar(signing_key.as_nonzero_scalar());
            Ok(KeyPair::EcdsaP521 {
                signing_key,
                public_key,
            })
        }
    }
}

fn parse_pkcs1(der: &[u8]) -> Result<KeyPair, Error> {
    let private = RsaPrivateKey::from_pkcs1_der(der)
        .map_err(|e| Error::Parse(format!("invalid PKCS#1 RSA key: {e}")))?;
    let public = rsa::RsaPublicKey::from(&private);
    Ok(KeyPair::Rsa {
        private: Box::new(private),
        public,
    })
}

/// SEC1 EC private keys carry a named-curve OID in their parameters field;
/// that OID selects the concrete curve type.
fn parse_sec1(der: &[u8]) -> Result<KeyPair, Error> {
    let ec_key = sec1::EcPrivateKey::from_der(der)
        .map_err(|e| Error::Parse(format!("invalid SEC1 EC key: {e}")))?;

    let curve_oid = match ec_key.parameters {
        Some(sec1::EcParameters::NamedCurve(oid)) => oid,
        _ => {
            return Err(Error::Parse(
                "SEC1 EC key is missing its named-curve parameters".to_string(),
            ));
        }
    };

    let parse_err = |e: &dyn std::fmt::Display| Error::Parse(format!("invalid SEC1 EC key: {e}"));
    match curve_oid {
        const_oid::db::rfc5912::SECP_224_R_1 => {
            let signing_key =
                p224::ecdsa::SigningKey::from_slice(ec_key.private_key).map_err(|e| parse_err(&e))?;
            let verifying_key = signing_key.verifying_key().to_owned();
            Ok(KeyPair::EcdsaP224 {
                signing_key,
                verifying_key,
            })
        }
        const_oid::db::rfc5912::SECP_256_R_1 => {
            let signing_key =
                p256::ecdsa::SigningKey::from_slice(ec_key.private_key).map_err(|e| parse_err(&e))?;
            let verifying_key = signing_key.verifying_key().to_owned();
            Ok(KeyPair::EcdsaP256 {
                signing_key,
                verifying_key,
            })
        }
        const_oid::db::rfc5912::SECP_384_R_1 => {
            let signing_key =
                p384::ecdsa::SigningKey::from_slice(ec_key.private_key).map_err(|e| parse_err(&e))?;
            let verifying_key = signing_key.verifying_key().to_owned();
            Ok(KeyPair::EcdsaP384 {
                signing_key,
                verifying_key,
            })
        }
        const_oid::db::rfc5912::SECP_521_R_1 => {
            let signing_key =
                p521::ecdsa::SigningKey::from_slice(ec_key.private_key).map_err(|e| parse_err(&e))?;
            let public_key = p521::PublicKey::from_secret_scalar(signing_key.as_nonzero_scalar());
            Ok(KeyPair::EcdsaP521 {
                signing_key,
                public_key,
            })
        }
        other => Err(Error::Parse(format!("unsupported EC named curve {other}"))),
    }
}

/// PKCS#8 blocks carry their own algorithm identifier; dispatch on it.
fn parse_pkcs8(der: &[u8]) -> Result<KeyPair, Error> {
    let info = pkcs8::PrivateKeyInfo::try_from(der)
        .map_err(|e| Error::Parse(format!("invalid PKCS#8 key: {e}")))?;
    let parse_err = |e: &dyn std::fmt::Display| Error::Parse(format!("invalid PKCS#8 key: {e}"));

    match info.algorithm.oid {
        const_oid::db::rfc5912::RSA_ENCRYPTION => {
            let private = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
            let public = rsa::RsaPublicKey::from(&private);
            Ok(KeyPair::Rsa {
                private: Box::new(private),
                public,
            })
        }
        const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
            let curve_oid = info
                .algorithm
                .parameters_oid()
                .map_err(|e| parse_err(&e))?;
            match curve_oid {
                const_oid::db::rfc5912::SECP_224_R_1 => {
                    let secret = p224::SecretKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
                    let signing_key = p224::ecdsa::SigningKey::from(&secret);
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP224 {
                        signing_key,
                        verifying_key,
                    })
                }
                const_oid::db::rfc5912::SECP_256_R_1 => {
                    let secret = p256::SecretKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
                    let signing_key = p256::ecdsa::SigningKey::from(&secret);
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP256 {
                        signing_key,
                        verifying_key,
                    })
                }
                const_oid::db::rfc5912::SECP_384_R_1 => {
                    let secret = p384::SecretKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
                    let signing_key = p384::ecdsa::SigningKey::from(&secret);
                    let verifying_key = signing_key.verifying_key().to_owned();
                    Ok(KeyPair::EcdsaP384 {
                        signing_key,
                        verifying_key,
                    })
                }
                const_oid::db::rfc5912::SECP_521_R_1 => {
                    let secret = p521::SecretKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
                    let signing_key =
                        p521::ecdsa::SigningKey::from(ecdsa::SigningKey::from(&secret));
                    let public_key = secret.public_key();
                    Ok(KeyPair::EcdsaP521 {
                        signing_key,
                        public_key,
                    })
                }
                other => Err(Error::Parse(format!("unsupported EC named curve {other}"))),
            }
        }
        const_oid::db::rfc8410::ID_ED_25519 => {
            let signing_key =
                ed25519_dalek::SigningKey::from_pkcs8_der(der).map_err(|e| parse_err(&e))?;
            Ok(KeyPair::Ed25519 { signing_key })
        }
        other => Err(Error::Parse(format!(
            "unsupported PKCS#8 key algorithm {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_PKCS1_PEM: &str = include_str!("../tests/fixtures/rsa_pkcs1.pem");
    const EC_P256_SEC1_PEM: &str = include_str!("../tests/fixtures/ec_p256.pem");
    const ED25519_PKCS8_PEM: &str = include_str!("../tests/fixtures/ed25519_pkcs8.pem");
    const ED25519_OPENSSH_PEM: &str = include_str!("../tests/fixtures/openssh_ed25519");

    #[test]
    fn parses_pkcs1_rsa_pem() {
        let (key, algorithm) = parse_private_key_pem(RSA_PKCS1_PEM.as_bytes()).unwrap();
        assert_eq!(algorithm, Algorithm::Rsa);
        assert_eq!(key.algorithm(), Algorithm::Rsa);
    }

    #[test]
    fn parses_sec1_ec_pem() {
        let (key, algorithm) = parse_private_key_pem(EC_P256_SEC1_PEM.as_bytes()).unwrap();
        assert_eq!(algorithm, Algorithm::Ecdsa);
        assert_eq!(key.curve(), Some(crate::key::EcdsaCurve::P256));
    }

    #[test]
    fn parses_pkcs8_ed25519_pem() {
        let (_, algorithm) = parse_private_key_pem(ED25519_PKCS8_PEM.as_bytes()).unwrap();
        assert_eq!(algorithm, Algorithm::Ed25519);
    }

    #[test]
    fn parses_openssh_ed25519() {
        let (key, algorithm) = parse_private_key_openssh(ED25519_OPENSSH_PEM.as_bytes()).unwrap();
        assert_eq!(algorithm, Algorithm::Ed25519);
        assert_eq!(key.algorithm(), Algorithm::Ed25519);
    }

    // KeyPair has no Debug impl, so error cases are destructured rather
    // than unwrapped.
    #[test]
    fn rejects_input_without_a_pem_block() {
        let Err(err) = parse_private_key_pem(b"definitely not a key") else {
            panic!("non-PEM input was accepted");
        };
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn rejects_unregistered_preambles() {
        let pem = pem_utils::der_to_pem(&[0x30, 0x00], PemPreamble::Certificate);
        let Err(err) = parse_private_key_pem(pem.as_bytes()) else {
            panic!("certificate block was accepted as a private key");
        };
        assert!(matches!(err, Error::UnknownPreamble(_)));
    }

    #[test]
    fn rejects_payload_mismatching_its_preamble() {
        // An Ed25519 PKCS#8 payload framed as a PKCS#1 RSA block.
        let (_, pkcs8_der) = pem_utils::decode_pem_block(ED25519_PKCS8_PEM.as_bytes()).unwrap();
        let mislabeled = pem_utils::der_to_pem(&pkcs8_der, PemPreamble::PrivateKeyRsa);
        let Err(err) = parse_private_key_pem(mislabeled.as_bytes()) else {
            panic!("mislabeled payload was accepted");
        };
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn keys_round_trip_through_pem() {
        // The RSA key comes from the fixture rather than fresh generation,
        // which is slow enough to dominate the whole test run.
        let (rsa, _) = parse_private_key_pem(RSA_PKCS1_PEM.as_bytes()).unwrap();
        let keys = [
            rsa,
            KeyPair::generate_ecdsa(crate::key::EcdsaCurve::P384),
            KeyPair::generate_ecdsa(crate::key::EcdsaCurve::P521),
            KeyPair::generate_ed25519(),
        ];
        for original in keys {
            let pem = original.to_pem().unwrap();
            let (parsed, algorithm) = parse_private_key_pem(pem.as_bytes()).unwrap();
            assert_eq!(algorithm, original.algorithm());
            assert_eq!(
                parsed.public_key().to_pkix_der().unwrap(),
                original.public_key().to_pkix_der().unwrap()
            );
        }
    }
}
