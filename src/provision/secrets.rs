//! Sealed-box encryption of Actions secrets.
//!
//! GitHub decrypts with the repository's private key; the CLI only ever
//! holds the public half.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crypto_box::PublicKey;
use crypto_box::aead::OsRng;

use crate::errors::ProvisionError;
use crate::github::types::{EncryptedSecret, PublicKey as RepoPublicKey};

/// Seal `plaintext` for the repository key and wrap it for the secrets API.
pub fn encrypt_secret(
    key: &RepoPublicKey,
    name: &str,
    plaintext: &str,
) -> Result<EncryptedSecret, ProvisionError> {
    let encryption = |reason: String| ProvisionError::Encryption {
        name: name.to_string(),
        reason,
    };

    let raw = STANDARD
        .decode(key.key.trim())
        .map_err(|e| encryption(format!("public key is not base64: {e}")))?;
    let bytes: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| encryption(format!("public key has {} bytes, expected 32", raw.len())))?;

    let sealed = PublicKey::from(bytes)
        .seal(&mut OsRng, plaintext.as_bytes())
        .map_err(|e| encryption(e.to_string()))?;

    Ok(EncryptedSecret {
        encrypted_value: STANDARD.encode(sealed),
        key_id: key.key_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_box::SecretKey;

    fn repo_key(secret: &SecretKey) -> RepoPublicKey {
        RepoPublicKey {
            key_id: "568250167242549743".to_string(),
            key: STANDARD.encode(secret.public_key().as_bytes()),
        }
    }

    #[test]
    fn sealed_value_opens_with_private_key() {
        let secret = SecretKey::generate(&mut OsRng);
        let encrypted = encrypt_secret(&repo_key(&secret), "HUBSPOT_PORTAL_ID", "123456").unwrap();

        assert_eq!(encrypted.key_id, "568250167242549743");
        let sealed = STANDARD.decode(&encrypted.encrypted_value).unwrap();
        assert_eq!(secret.unseal(&sealed).unwrap(), b"123456");
    }

    #[test]
    fn sealing_is_randomised() {
        let secret = SecretKey::generate(&mut OsRng);
        let key = repo_key(&secret);
        let a = encrypt_secret(&key, "X", "same").unwrap();
        let b = encrypt_secret(&key, "X", "same").unwrap();
        assert_ne!(a.encrypted_value, b.encrypted_value);
    }

    #[test]
    fn rejects_malformed_public_key() {
        let key = RepoPublicKey {
            key_id: "1".into(),
            key: "not base64!".into(),
        };
        let err = encrypt_secret(&key, "HUBSPOT_PORTAL_ID", "1").unwrap_err();
        assert!(matches!(err, ProvisionError::Encryption { ref name, .. } if name == "HUBSPOT_PORTAL_ID"));

        let short = RepoPublicKey {
            key_id: "1".into(),
            key: STANDARD.encode([0u8; 16]),
        };
        let err = encrypt_secret(&short, "K", "1").unwrap_err();
        assert!(err.to_string().contains("expected 32"));
    }
}
