use alloy::signers::local::PrivateKeySigner;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::ui::input::{input_text, input_yes_no, Prompter};

use super::SignerError;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to read key file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid private key in {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error("Failed to decrypt keystore {path}: {reason}")]
    Decrypt { path: String, reason: String },
}

/// Load a private key from `path`.
///
/// Plain key files hold the key as hex, with or without `0x`. Encrypted files
/// are JSON keystores unlocked with `password`.
pub fn parse_key(
    path: &Path,
    encrypted: bool,
    password: &str,
) -> Result<PrivateKeySigner, KeyError> {
    let shown = path.display().to_string();

    if encrypted {
        return PrivateKeySigner::decrypt_keystore(path, password).map_err(|e| {
            KeyError::Decrypt {
                path: shown,
                reason: e.to_string(),
            }
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| KeyError::Read {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    let hex = content.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    PrivateKeySigner::from_str(hex).map_err(|e| KeyError::Invalid {
        path: shown,
        reason: e.to_string(),
    })
}

/// Ask for a key file, whether it is encrypted and its password.
pub fn prompt_key(prompter: &mut dyn Prompter) -> Result<PrivateKeySigner, SignerError> {
    let path = loop {
        let answer = input_text(prompter, "key file: ")?;
        let answer = answer.trim();
        if !answer.is_empty() {
            break PathBuf::from(answer);
        }
    };

    let encrypted = input_yes_no(prompter, "encrypted? (no): ", false)?;
    let password = if encrypted {
        prompter.read_password("password: ")?
    } else {
        String::new()
    };

    Ok(parse_key(&path, encrypted, &password)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::input::tests::ScriptedPrompter;
    use alloy::primitives::address;
    use std::io::Write;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn key_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_plain_key_with_prefix_and_whitespace() {
        let file = key_file(&format!("  0x{}  ", DEV_KEY));
        let signer = parse_key(file.path(), false, "").unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_garbage_key_rejected() {
        let file = key_file("not a key");
        assert!(matches!(
            parse_key(file.path(), false, ""),
            Err(KeyError::Invalid { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_key(Path::new("/nonexistent/key"), false, ""),
            Err(KeyError::Read { .. })
        ));
    }

    #[test]
    fn test_encrypted_garbage_fails_to_decrypt() {
        let file = key_file(DEV_KEY);
        assert!(matches!(
            parse_key(file.path(), true, "secret"),
            Err(KeyError::Decrypt { .. })
        ));
    }

    #[test]
    fn test_prompt_key_plain() {
        let file = key_file(DEV_KEY);
        let path = file.path().display().to_string();
        let mut prompter = ScriptedPrompter::new(&["", &path, ""]);
        let signer = prompt_key(&mut prompter).unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(prompter.prompts[2], "encrypted? (no): ");
    }
}
