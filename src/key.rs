//! Key algorithms, generation, signing, and private-key PEM export.

use std::str::FromStr;

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use p224::ecdsa::{SigningKey as P224SigningKey, VerifyingKey as P224VerifyingKey};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use p521::ecdsa::SigningKey as P521SigningKey;
use pkcs8::LineEnding;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use zeroize::Zeroizing;

use crate::cert::SignatureAlgorithm;
use crate::error::Error;
use crate::pem_utils::{self, PemPreamble};

/// Supported key algorithms. The tag is fixed at key creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rsa,
    Ecdsa,
    Ed25519,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Algorithm::Rsa => "RSA",
            Algorithm::Ecdsa => "ECDSA",
            Algorithm::Ed25519 => "ED25519",
        })
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "RSA" => Ok(Algorithm::Rsa),
            "ECDSA" => Ok(Algorithm::Ecdsa),
            "ED25519" => Ok(Algorithm::Ed25519),
            other => Err(Error::Validation(format!(
                "invalid key algorithm {other:?}; supported values are: RSA, ECDSA, ED25519"
            ))),
        }
    }
}

/// Elliptic curves supported for ECDSA key generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcdsaCurve {
    P224,
    P256,
    P384,
    P521,
}

impl EcdsaCurve {
    /// All curves this crate can generate and parse.
    pub fn supported() -> &'static [EcdsaCurve] {
        &[
            EcdsaCurve::P224,
            EcdsaCurve::P256,
            EcdsaCurve::P384,
            EcdsaCurve::P521,
        ]
    }
}

impl std::fmt::Display for EcdsaCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EcdsaCurve::P224 => "P224",
            EcdsaCurve::P256 => "P256",
            EcdsaCurve::P384 => "P384",
            EcdsaCurve::P521 => "P521",
        })
    }
}

impl FromStr for EcdsaCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "P224" => Ok(EcdsaCurve::P224),
            "P256" => Ok(EcdsaCurve::P256),
            "P384" => Ok(EcdsaCurve::P384),
            "P521" => Ok(EcdsaCurve::P521),
            other => Err(Error::Validation(format!(
                "invalid ECDSA curve {other:?}; supported values are: P224, P256, P384, P521"
            ))),
        }
    }
}

/// Algorithm selection plus the algorithm-specific generation parameters.
///
/// Exactly one generation strategy exists per variant; dispatch happens by
/// pattern matching in [`KeyPair::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    Rsa { bits: usize },
    Ecdsa { curve: EcdsaCurve },
    Ed25519,
}

impl KeySpec {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            KeySpec::Rsa { .. } => Algorithm::Rsa,
            KeySpec::Ecdsa { .. } => Algorithm::Ecdsa,
            KeySpec::Ed25519 => Algorithm::Ed25519,
        }
    }
}

/// An algorithm-tagged private key with its public counterpart.
///
/// The secret material is owned by this value and is never serialized
/// outside the explicit [`KeyPair::to_pem`] export path.
#[derive(Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP224 {
        signing_key: P224SigningKey,
        verifying_key: P224VerifyingKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
    // p521's ECDSA verifying type lacks the encoding traits the rest of the
    // crate needs, so the public half is held as the curve-level key.
    EcdsaP521 {
        signing_key: P521SigningKey,
        public_key: p521::PublicKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl KeyPair {
    /// Generate a new key pair for the given spec.
    pub fn generate(spec: &KeySpec) -> Result<Self, Error> {
        match spec {
            KeySpec::Rsa { bits } => Self::generate_rsa(*bits),
            KeySpec::Ecdsa { curve } => Ok(Self::generate_ecdsa(*curve)),
            KeySpec::Ed25519 => Ok(Self::generate_ed25519()),
        }
    }

    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self, Error> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| Error::KeyGeneration(format!("failed to generate RSA key: {e}")))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA key pair on the given curve.
    pub fn generate_ecdsa(curve: EcdsaCurve) -> Self {
        let mut rng = rand_core::OsRng;
        match curve {
            EcdsaCurve::P224 => {
                let signing_key = P224SigningKey::random(&mut rng);
                let verifying_key = signing_key.verifying_key().to_owned();
                KeyPair::EcdsaP224 {
                    signing_key,
                    verifying_key,
                }
            }
            EcdsaCurve::P256 => {
                let signing_key = P256SigningKey::random(&mut rng);
                let verifying_key = signing_key.verifying_key().to_owned();
                KeyPair::EcdsaP256 {
                    signing_key,
                    verifying_key,
                }
            }
            EcdsaCurve::P384 => {
                let signing_key = P384SigningKey::random(&mut rng);
                let verifying_key = signing_key.verifying_key().to_owned();
                KeyPair::EcdsaP384 {
                    signing_key,
                    verifying_key,
                }
            }
            EcdsaCurve::P521 => {
                let signing_key = P521SigningKey::random(&mut rng);
                let public_key =
                    p521::PublicKey::from_secret_scalar(signing_key.as_nonzero_scalar());
                KeyPair::EcdsaP521 {
                    signing_key,
                    public_key,
                }
            }
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = Ed25519SigningKey::generate(&mut rng);
        KeyPair::Ed25519 { signing_key }
    }

    /// The algorithm tag embedded in this key's variant.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            KeyPair::Rsa { .. } => Algorithm::Rsa,
            KeyPair::EcdsaP224 { .. }
            | KeyPair::EcdsaP256 { .. }
            | KeyPair::EcdsaP384 { .. }
            | KeyPair::EcdsaP521 { .. } => Algorithm::Ecdsa,
            KeyPair::Ed25519 { .. } => Algorithm::Ed25519,
        }
    }

    /// The curve of an ECDSA key, `None` for other algorithms.
    pub fn curve(&self) -> Option<EcdsaCurve> {
        match self {
            KeyPair::EcdsaP224 { .. } => Some(EcdsaCurve::P224),
            KeyPair::EcdsaP256 { .. } => Some(EcdsaCurve::P256),
            KeyPair::EcdsaP384 { .. } => Some(EcdsaCurve::P384),
            KeyPair::EcdsaP521 { .. } => Some(EcdsaCurve::P521),
            _ => None,
        }
    }

    /// Derives the public counterpart of this key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP224 { verifying_key, .. } => PublicKey::EcdsaP224(*verifying_key),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
            KeyPair::EcdsaP521 { public_key, .. } => PublicKey::EcdsaP521(*public_key),
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    /// The signature scheme certificates signed by this key carry.
    ///
    /// ECDSA pairs the hash to the curve; RSA uses PKCS#1 v1.5 with SHA-256.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Sha256WithRsa,
            KeyPair::EcdsaP224 { .. } => SignatureAlgorithm::EcdsaWithSha224,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::EcdsaWithSha256,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::EcdsaWithSha384,
            KeyPair::EcdsaP521 { .. } => SignatureAlgorithm::EcdsaWithSha512,
            KeyPair::Ed25519 { .. } => SignatureAlgorithm::Ed25519,
        }
    }

    /// Signs `data` with the scheme from [`KeyPair::signature_algorithm`].
    /// ECDSA signatures are DER-encoded as X.509 requires.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            KeyPair::Rsa { private, .. } => {
                let signing_key =
                    rsa::pkcs1v15::SigningKey::<Sha256>::new((**private).clone());
                let signature = signing_key
                    .try_sign(data)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_vec())
            }
            KeyPair::EcdsaP224 { signing_key, .. } => {
                let signature: p224::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP521 { signing_key, .. } => {
                let signature: p521::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::Ed25519 { signing_key } => Ok(signing_key.sign(data).to_bytes().to_vec()),
        }
    }

    /// Exports the private key in its conventional PEM form: PKCS#1 for RSA,
    /// SEC1 for ECDSA, PKCS#8 for Ed25519. The returned string is zeroized
    /// on drop.
    pub fn to_pem(&self) -> Result<Zeroizing<String>, Error> {
        let encoding_err = |e: &dyn std::fmt::Display| Error::Encoding(e.to_string());
        match self {
            KeyPair::Rsa { private, .. } => {
                private.to_pkcs1_pem(LineEnding::LF).map_err(|e| encoding_err(&e))
            }
            KeyPair::EcdsaP224 { signing_key, .. } => {
                let secret = p224::SecretKey::from(signing_key.as_nonzero_scalar());
                let sec1_der = secret.to_sec1_der().map_err(|e| encoding_err(&e))?;
                sec1_private_pem(&sec1_der, const_oid::db::rfc5912::SECP_224_R_1)
            }
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let secret = p256::SecretKey::from(signing_key.as_nonzero_scalar());
                let sec1_der = secret.to_sec1_der().map_err(|e| encoding_err(&e))?;
                sec1_private_pem(&sec1_der, const_oid::db::rfc5912::SECP_256_R_1)
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let secret = p384::SecretKey::from(signing_key.as_nonzero_scalar());
                let sec1_der = secret.to_sec1_der().map_err(|e| encoding_err(&e))?;
                sec1_private_pem(&sec1_der, const_oid::db::rfc5912::SECP_384_R_1)
            }
            KeyPair::EcdsaP521 { signing_key, .. } => {
                let secret = p521::SecretKey::from(signing_key.as_nonzero_scalar());
                let sec1_der = secret.to_sec1_der().map_err(|e| encoding_err(&e))?;
                sec1_private_pem(&sec1_der, const_oid::db::rfc5912::SECP_521_R_1)
            }
            KeyPair::Ed25519 { signing_key } => {
                use ed25519_dalek::pkcs8::EncodePrivateKey;
                signing_key.to_pkcs8_pem(LineEnding::LF).map_err(|e| encoding_err(&e))
            }
        }
    }
}

/// Wraps a SEC1 `EcPrivateKey` in an `EC PRIVATE KEY` PEM block with the
/// named-curve OID filled in. `SecretKey::to_sec1_der` leaves the parameters
/// field empty, but interoperating tools (and this crate's own parser)
/// require the curve to be named in the block.
fn sec1_private_pem(
    sec1_der: &[u8],
    curve_oid: const_oid::ObjectIdentifier,
) -> Result<Zeroizing<String>, Error> {
    use der::{Decode, Encode};

    let mut ec_key = sec1::EcPrivateKey::from_der(sec1_der)?;
    ec_key.parameters = Some(sec1::EcParameters::NamedCurve(curve_oid));
    let der = Zeroizing::new(ec_key.to_der()?);
    Ok(Zeroizing::new(pem_utils::der_to_pem(
        &der,
        PemPreamble::PrivateKeyEc,
    )))
}

/// The non-secret counterpart of a [`KeyPair`], re-derivable at any time.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP224(P224VerifyingKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    EcdsaP521(p521::PublicKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key: &KeyPair) -> Self {
        key.public_key()
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            PublicKey::Rsa(_) => Algorithm::Rsa,
            PublicKey::EcdsaP224(_)
            | PublicKey::EcdsaP256(_)
            | PublicKey::EcdsaP384(_)
            | PublicKey::EcdsaP521(_) => Algorithm::Ecdsa,
            PublicKey::Ed25519(_) => Algorithm::Ed25519,
        }
    }

    /// Encodes the key as a PKIX `SubjectPublicKeyInfo` structure.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned, Error> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone())?,
            PublicKey::EcdsaP224(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::EcdsaP521(public_key) => SubjectPublicKeyInfoOwned::from_key(*public_key)?,
            PublicKey::Ed25519(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
        };
        Ok(spki)
    }

    /// DER bytes of the PKIX `SubjectPublicKeyInfo` encoding.
    pub fn to_pkix_der(&self) -> Result<Vec<u8>, Error> {
        use der::Encode;
        Ok(self.to_spki()?.to_der()?)
    }

    /// PKIX DER wrapped in a `PUBLIC KEY` PEM block.
    pub fn to_pkix_pem(&self) -> Result<String, Error> {
        Ok(pem_utils::der_to_pem(
            &self.to_pkix_der()?,
            PemPreamble::PublicKey,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for algorithm in [Algorithm::Rsa, Algorithm::Ecdsa, Algorithm::Ed25519] {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn unknown_curve_lists_supported_values() {
        let err = "P999".parse::<EcdsaCurve>().unwrap_err();
        assert!(err.to_string().contains("P224, P256, P384, P521"));
    }

    #[test]
    fn generated_ecdsa_keys_carry_their_curve() {
        for curve in EcdsaCurve::supported() {
            let key = KeyPair::generate_ecdsa(*curve);
            assert_eq!(key.algorithm(), Algorithm::Ecdsa);
            assert_eq!(key.curve(), Some(*curve));
        }
    }

    #[test]
    fn ecdsa_private_pem_embeds_the_named_curve() {
        use der::Decode;

        for curve in EcdsaCurve::supported() {
            let key = KeyPair::generate_ecdsa(*curve);
            let pem = key.to_pem().unwrap();
            let (preamble, der) = pem_utils::decode_pem_block(pem.as_bytes()).unwrap();
            assert_eq!(preamble, PemPreamble::PrivateKeyEc);
            let ec_key = sec1::EcPrivateKey::from_der(&der).unwrap();
            assert!(
                matches!(ec_key.parameters, Some(sec1::EcParameters::NamedCurve(_))),
                "exported SEC1 block for {curve} names no curve"
            );
        }
    }

    #[test]
    fn public_key_derivation_is_deterministic() {
        let key = KeyPair::generate_ed25519();
        let a = key.public_key().to_pkix_der().unwrap();
        let b = key.public_key().to_pkix_der().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ed25519_signatures_verify() {
        use ed25519_dalek::Verifier;
        let key = KeyPair::generate_ed25519();
        let signature = key.sign_data(b"tbs bytes").unwrap();
        let PublicKey::Ed25519(verifying_key) = key.public_key() else {
            panic!("wrong variant");
        };
        let signature = ed25519_dalek::Signature::from_slice(&signature).unwrap();
        verifying_key.verify(b"tbs bytes", &signature).unwrap();
    }
}
