//! An `openssl`-backed implementation of the `Crypto` façade.
//!
//! The only contract the certificates pipeline depends on is that
//! `pubkey_from_prv`/`pubkey_from_crt` agree whenever the key pair matches;
//! the DER-encoded `SubjectPublicKeyInfo`, base64-rendered for use as a
//! plain `String`, satisfies that regardless of which side produced it.

use goalstate_protocol::errors::CErrKind;
use goalstate_protocol::{Crypto, CryptoError};
use openssl::hash::MessageDigest;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::PKey;
use openssl::x509::X509;
use std::fs;
use std::path::Path;

pub struct OpensslCrypto;

impl OpensslCrypto {
    pub fn new() -> OpensslCrypto {
        OpensslCrypto
    }
}

impl Default for OpensslCrypto {
    fn default() -> Self {
        OpensslCrypto::new()
    }
}

impl Crypto for OpensslCrypto {
    fn decrypt_p7m(
        &self,
        p7m_path: &Path,
        transport_prv_path: &Path,
        transport_cert_path: &Path,
        out_pem_path: &Path,
    ) -> Result<(), CryptoError> {
        let mime = fs::read_to_string(p7m_path)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", p7m_path.display(), e)))?;

        // The blob is a MIME envelope; the PKCS#7 body is everything after
        // the blank line separating headers from content.
        let base64_body: String = mime
            .splitn(2, "\n\n")
            .nth(1)
            .unwrap_or(&mime)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let der = base64::decode(&base64_body).map_err(|e| CErrKind::Decrypt(format!("{}: {}", p7m_path.display(), e)))?;

        let pkcs7 = Pkcs7::from_der(&der).map_err(|e| CErrKind::Decrypt(format!("{}: {}", p7m_path.display(), e)))?;

        let prv_pem = fs::read(transport_prv_path)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", transport_prv_path.display(), e)))?;
        let cert_pem = fs::read(transport_cert_path)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", transport_cert_path.display(), e)))?;
        let pkey = PKey::private_key_from_pem(&prv_pem)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", transport_prv_path.display(), e)))?;
        let cert = X509::from_pem(&cert_pem)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", transport_cert_path.display(), e)))?;

        let decrypted = pkcs7
            .decrypt(&pkey, &cert, Pkcs7Flags::empty())
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", p7m_path.display(), e)))?;

        fs::write(out_pem_path, decrypted)
            .map_err(|e| CErrKind::Decrypt(format!("{}: {}", out_pem_path.display(), e)))?;
        Ok(())
    }

    fn pubkey_from_prv(&self, path: &Path) -> Result<String, CryptoError> {
        let pem = fs::read(path).map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        let pkey =
            PKey::private_key_from_pem(&pem).map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        let der = pkey.public_key_to_der().map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        Ok(base64::encode(&der))
    }

    fn pubkey_from_crt(&self, path: &Path) -> Result<String, CryptoError> {
        let pem = fs::read(path).map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        let cert = X509::from_pem(&pem).map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        let pkey = cert.public_key().map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        let der = pkey.public_key_to_der().map_err(|e| CErrKind::Pubkey(format!("{}: {}", path.display(), e)))?;
        Ok(base64::encode(&der))
    }

    fn thumbprint_from_crt(&self, path: &Path) -> Result<String, CryptoError> {
        let pem = fs::read(path).map_err(|e| CErrKind::Thumbprint(format!("{}: {}", path.display(), e)))?;
        let cert = X509::from_pem(&pem).map_err(|e| CErrKind::Thumbprint(format!("{}: {}", path.display(), e)))?;
        let digest = cert
            .digest(MessageDigest::sha1())
            .map_err(|e| CErrKind::Thumbprint(format!("{}: {}", path.display(), e)))?;
        Ok(digest.iter().map(|b| format!("{:02X}", b)).collect())
    }
}
