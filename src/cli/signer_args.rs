//! Signer and gas flags shared by the console and deploy commands.

use alloy::primitives::{Address, U256};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::args::{GasArgs, SignerArgs};
use crate::signer::hardware::{find_account, WalletHub};
use crate::signer::{parse_key, HardwareSigner, KeyError, SignerHandle, WalletError};

#[derive(Debug, Error)]
pub enum SignerArgsError {
    #[error("{0} and {1} are mutually exclusive")]
    MutuallyExclusive(&'static str, &'static str),

    #[error("signer arguments missing")]
    Missing,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid {flag}: {value}")]
    InvalidNumber { flag: &'static str, value: String },

    #[error("{flag} can't be negative")]
    Negative { flag: &'static str },

    #[error("can't read password: {0}")]
    Password(String),

    #[error("more than one hardware wallet detected")]
    MultipleWallets,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Where the startup signer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    None,
    Key {
        path: PathBuf,
        encrypted: bool,
        password: Option<String>,
    },
    Ledger {
        template: String,
        address: Option<Address>,
    },
}

impl SignerArgs {
    /// Validate the flag combination. `default_template` applies when `-d`
    /// is not given.
    pub fn source(&self, default_template: &str) -> Result<SignerSource, SignerArgsError> {
        if self.ledger {
            if self.key.is_some() {
                return Err(SignerArgsError::MutuallyExclusive("-w", "-k"));
            }
            if self.encrypted_key.is_some() {
                return Err(SignerArgsError::MutuallyExclusive("-w", "-e"));
            }
            if self.password.is_some() {
                return Err(SignerArgsError::MutuallyExclusive("-w", "-P"));
            }

            let address = match self.ledger_address.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(text) => Some(
                    Address::from_str(text)
                        .map_err(|_| SignerArgsError::InvalidAddress(text.to_string()))?,
                ),
            };
            let template = self
                .derivation_path
                .clone()
                .unwrap_or_else(|| default_template.to_string());
            return Ok(SignerSource::Ledger { template, address });
        }

        match (&self.key, &self.encrypted_key) {
            (Some(_), Some(_)) => Err(SignerArgsError::MutuallyExclusive("-e", "-k")),
            (Some(path), None) => Ok(SignerSource::Key {
                path: path.clone(),
                encrypted: false,
                password: None,
            }),
            (None, Some(path)) => Ok(SignerSource::Key {
                path: path.clone(),
                encrypted: true,
                password: self.password.clone(),
            }),
            (None, None) => Ok(SignerSource::None),
        }
    }
}

impl SignerSource {
    /// Open the signer. Asks for the keystore password when it was not given.
    pub async fn resolve(&self, hub: &dyn WalletHub) -> Result<SignerHandle, SignerArgsError> {
        match self {
            SignerSource::None => Ok(SignerHandle::None),
            SignerSource::Key {
                path,
                encrypted,
                password,
            } => {
                let password = match (encrypted, password) {
                    (false, _) => String::new(),
                    (true, Some(password)) => password.clone(),
                    (true, None) => rpassword::prompt_password("password: ")
                        .map_err(|e| SignerArgsError::Password(e.to_string()))?,
                };
                Ok(SignerHandle::Keyed(parse_key(path, *encrypted, &password)?))
            }
            SignerSource::Ledger { template, address } => {
                let mut wallets = hub.wallets().await?;
                let wallet = match wallets.len() {
                    0 => return Err(WalletError::NotFound.into()),
                    1 => wallets.remove(0),
                    _ => return Err(SignerArgsError::MultipleWallets),
                };
                wallet.open().await?;
                match find_account(wallet.as_ref(), template, *address).await {
                    Ok(account) => Ok(SignerHandle::Hardware(HardwareSigner { wallet, account })),
                    Err(e) => {
                        let _ = wallet.close().await;
                        Err(e.into())
                    }
                }
            }
        }
    }
}

/// Validated gas and value overrides, `None` meaning network default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    pub value: Option<U256>,
}

impl GasArgs {
    pub fn settings(&self) -> Result<GasSettings, SignerArgsError> {
        Ok(GasSettings {
            gas_price: parse_amount::<u128>("gas price", self.gas_price.as_deref())?,
            gas_limit: parse_amount::<u64>("gas limit", self.gas_limit.as_deref())?,
            value: parse_amount::<U256>("value", self.value.as_deref())?,
        })
    }
}

fn parse_amount<T>(flag: &'static str, text: Option<&str>) -> Result<Option<T>, SignerArgsError>
where
    T: FromStr + Default + PartialEq,
{
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.starts_with('-') {
        return Err(SignerArgsError::Negative { flag });
    }
    let amount = text.parse::<T>().map_err(|_| SignerArgsError::InvalidNumber {
        flag,
        value: text.to_string(),
    })?;
    Ok((amount != T::default()).then_some(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::hardware::{UnavailableHub, LEDGER_LIVE_TEMPLATE};
    use crate::signer::SignerKind;

    #[test]
    fn test_no_flags() {
        assert_eq!(SignerArgs::default().source(LEDGER_LIVE_TEMPLATE).unwrap(), SignerSource::None);
    }

    #[test]
    fn test_key_flags_exclusive() {
        let args = SignerArgs {
            key: Some("a".into()),
            encrypted_key: Some("b".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.source(LEDGER_LIVE_TEMPLATE),
            Err(SignerArgsError::MutuallyExclusive("-e", "-k"))
        ));
    }

    #[test]
    fn test_ledger_excludes_key_material() {
        let with_password = SignerArgs {
            ledger: true,
            password: Some("pw".into()),
            ..Default::default()
        };
        assert!(matches!(
            with_password.source(LEDGER_LIVE_TEMPLATE),
            Err(SignerArgsError::MutuallyExclusive("-w", "-P"))
        ));

        let with_key = SignerArgs {
            ledger: true,
            key: Some("k".into()),
            ..Default::default()
        };
        assert!(matches!(
            with_key.source(LEDGER_LIVE_TEMPLATE),
            Err(SignerArgsError::MutuallyExclusive("-w", "-k"))
        ));
    }

    #[test]
    fn test_ledger_defaults() {
        let args = SignerArgs {
            ledger: true,
            ..Default::default()
        };
        assert_eq!(
            args.source(LEDGER_LIVE_TEMPLATE).unwrap(),
            SignerSource::Ledger {
                template: "m/44'/60'/x'/0/0".to_string(),
                address: None
            }
        );

        let bad = SignerArgs {
            ledger: true,
            ledger_address: Some("0x12".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad.source(LEDGER_LIVE_TEMPLATE),
            Err(SignerArgsError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_encrypted_key_keeps_password() {
        let args = SignerArgs {
            encrypted_key: Some("ks.json".into()),
            password: Some("pw".into()),
            ..Default::default()
        };
        assert_eq!(
            args.source(LEDGER_LIVE_TEMPLATE).unwrap(),
            SignerSource::Key {
                path: "ks.json".into(),
                encrypted: true,
                password: Some("pw".into())
            }
        );
    }

    #[test]
    fn test_gas_settings() {
        let gas = GasArgs {
            gas_price: Some("0".into()),
            gas_limit: Some("300000".into()),
            value: Some("1000000000000000000".into()),
        };
        let settings = gas.settings().unwrap();
        assert_eq!(settings.gas_price, None);
        assert_eq!(settings.gas_limit, Some(300_000));
        assert_eq!(settings.value, Some(U256::from(10u64).pow(U256::from(18u64))));
    }

    #[test]
    fn test_gas_settings_rejects_bad_numbers() {
        let negative = GasArgs {
            value: Some("-1".into()),
            ..Default::default()
        };
        assert!(matches!(
            negative.settings(),
            Err(SignerArgsError::Negative { flag: "value" })
        ));

        let garbage = GasArgs {
            gas_limit: Some("lots".into()),
            ..Default::default()
        };
        assert!(matches!(
            garbage.settings(),
            Err(SignerArgsError::InvalidNumber { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_ledger_without_support() {
        let source = SignerSource::Ledger {
            template: LEDGER_LIVE_TEMPLATE.to_string(),
            address: None,
        };
        assert!(matches!(
            source.resolve(&UnavailableHub).await,
            Err(SignerArgsError::Wallet(WalletError::Unsupported))
        ));
        let none = SignerSource::None.resolve(&UnavailableHub).await.unwrap();
        assert_eq!(none.kind(), SignerKind::None);
    }
}
