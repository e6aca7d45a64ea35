//! # CertMint - Key and Certificate Minting with Pure Rust
//!
//! CertMint generates private keys, derives their public-key artifacts, and
//! issues X.509 certificates, built entirely with rustcrypto libraries and
//! without dependencies on ring or openssl. Certificates can be self-signed
//! or signed by a locally held CA, and renewal timing is computed without
//! ever touching a global clock.
//!
//! ## Supported Key Types
//!
//! - **RSA**: caller-chosen modulus size (2048 bits is the usual choice)
//! - **ECDSA**: P-224, P-256, P-384, and P-521 curves
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Key Features
//!
//! - **Key generation and parsing**: PKCS#1, SEC 1, PKCS#8, and OpenSSH
//!   private keys in and out
//! - **Public-key artifacts**: PKIX PEM, OpenSSH authorized-key lines, and
//!   MD5/SHA-256 fingerprints from a single call
//! - **Self-signed and CA-signed issuance**: the [`issuer::Issuer`] trait
//!   covers both
//! - **Explicit time**: issuance and renewal checks take the current time as
//!   an argument, so behavior is reproducible under test
//!
//! ## Quick Start
//!
//! ### Generating a Self-Signed Certificate
//!
//! ```rust,no_run
//! use certmint::{
//!     cert::{params::{CertificateSpec, Subject}, Certificate},
//!     key::{EcdsaCurve, KeyPair, KeySpec},
//! };
//! use time::OffsetDateTime;
//!
//! # fn main() -> Result<(), certmint::error::Error> {
//! let key = KeyPair::generate(&KeySpec::Ecdsa { curve: EcdsaCurve::P256 })?;
//!
//! let spec = CertificateSpec::builder()
//!     .subject(
//!         Subject::builder()
//!             .common_name("example.com".to_string())
//!             .organization(vec!["Example Corp".to_string()])
//!             .build(),
//!     )
//!     .dns_names(vec!["example.com".to_string()])
//!     .validity_hours(24 * 365)
//!     .build();
//!
//! let cert = Certificate::new_self_signed(&spec, &key, OffsetDateTime::now_utc())?;
//! println!("{}", cert.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Parsing a Key and Exporting Its Public Artifacts
//!
//! ```rust,no_run
//! use certmint::{codec, export};
//!
//! # fn main() -> Result<(), certmint::error::Error> {
//! let pem = std::fs::read("key.pem").unwrap();
//! let (key, algorithm) = codec::parse_private_key_pem(&pem)?;
//! println!("algorithm: {algorithm}");
//!
//! let artifacts = export::export_artifacts(&key)?;
//! println!("{}", artifacts.public_key_pem);
//! if let Some(ssh) = artifacts.ssh {
//!     println!("{}", ssh.authorized_key);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cert;
pub mod codec;
pub mod error;
pub mod expiry;
pub mod export;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod tbs_certificate;
