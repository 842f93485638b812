//! The `Crypto` contract: p7m decryption and public-key / thumbprint
//! extraction.
//!
//! The only contract the certificates pipeline relies on is that
//! `pubkey_from_prv` and `pubkey_from_crt` agree whenever the underlying
//! key pair matches. The concrete implementation (over the `openssl`
//! crate) lives in the agent binary crate.

use crate::errors::CryptoError;
use std::path::Path;

pub trait Crypto {
    /// Decrypt the PKCS#7 MIME envelope at `p7m_path` using the transport
    /// private key and certificate, writing a concatenation of PEM records
    /// to `out_pem_path`.
    fn decrypt_p7m(
        &self,
        p7m_path: &Path,
        transport_prv_path: &Path,
        transport_cert_path: &Path,
        out_pem_path: &Path,
    ) -> Result<(), CryptoError>;

    /// Canonical public-key representation of a private key file, used
    /// only for equality against `pubkey_from_crt`.
    fn pubkey_from_prv(&self, path: &Path) -> Result<String, CryptoError>;

    /// Canonical public-key representation of a certificate file.
    fn pubkey_from_crt(&self, path: &Path) -> Result<String, CryptoError>;

    /// Uppercase-hex thumbprint of a certificate file, used as a filename
    /// stem.
    fn thumbprint_from_crt(&self, path: &Path) -> Result<String, CryptoError>;
}
