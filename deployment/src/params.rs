//! Role holders and network settings consumed by the deployment module.
//!
//! Any network other than `mainnet` deploys with the development account 0
//! (`//Alice`) holding every role. On `mainnet` the holders are read from the
//! environment, after loading a `.env` file when one exists.

use std::fmt;

use ink::primitives::AccountId;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ADMIN_VAR: &str = "DEFAULT_ADMIN_ADDRESS";
pub const MINTER_VAR: &str = "MINTER_ADDRESS";
pub const BURNER_VAR: &str = "BURNER_ADDRESS";
pub const RPC_URL_VAR: &str = "MAINNET_RPC_URL";
pub const SIGNER_VAR: &str = "WALLET_PRIVATE_KEY";

pub const LOCAL_ENDPOINT: &str = "ws://127.0.0.1:9944";

/// Public key of `//Alice`.
pub const DEV_ACCOUNT: [u8; 32] = [
    0xd4, 0x35, 0x93, 0xc7, 0x15, 0xfd, 0xd3, 0x1c, 0x61, 0x14, 0x1a, 0xbd, 0x04, 0xa9, 0x9f, 0xd6,
    0x82, 0x2c, 0x85, 0x58, 0x85, 0x4c, 0xcd, 0xe3, 0x9a, 0x56, 0x84, 0xe7, 0xa5, 0x6d, 0xa2, 0x7d,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("{0} must be set when deploying to mainnet")]
    Missing(&'static str),

    #[error("{var} is not a 0x-prefixed 32-byte account: {reason}")]
    InvalidAccount { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Development,
    Production,
}

impl Network {
    pub const PRODUCTION_NAME: &'static str = "mainnet";

    pub fn from_name(name: &str) -> Self {
        if name == Self::PRODUCTION_NAME {
            Network::Production
        } else {
            Network::Development
        }
    }
}

/// Initial holders of the token's three roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParams {
    pub default_admin: AccountId,
    pub minter: AccountId,
    pub burner: AccountId,
}

impl DeploymentParams {
    pub fn development() -> Self {
        let dev = AccountId::from(DEV_ACCOUNT);
        Self {
            default_admin: dev,
            minter: dev,
            burner: dev,
        }
    }

    /// Resolves the holders for `network`, reading variables through `lookup`.
    pub fn resolve<F>(network: Network, lookup: F) -> Result<Self, ParamsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match network {
            Network::Development => {
                debug!("development network, account 0 holds every role");
                Ok(Self::development())
            }
            Network::Production => Ok(Self {
                default_admin: required_account(&lookup, DEFAULT_ADMIN_VAR)?,
                minter: required_account(&lookup, MINTER_VAR)?,
                burner: required_account(&lookup, BURNER_VAR)?,
            }),
        }
    }

    pub fn from_env(network: Network) -> Result<Self, ParamsError> {
        dotenvy::dotenv().ok();
        Self::resolve(network, |var| std::env::var(var).ok())
    }
}

/// Where the plan is submitted and with which credential.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub endpoint: String,
    signer: Option<String>,
}

impl NetworkConfig {
    pub fn resolve<F>(network: Network, lookup: F) -> Result<Self, ParamsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match network {
            Network::Development => Ok(Self {
                network,
                endpoint: LOCAL_ENDPOINT.to_string(),
                signer: None,
            }),
            Network::Production => Ok(Self {
                network,
                endpoint: non_empty(&lookup, RPC_URL_VAR).ok_or(ParamsError::Missing(RPC_URL_VAR))?,
                // an absent key leaves signing to the operator, as with no accounts configured
                signer: non_empty(&lookup, SIGNER_VAR),
            }),
        }
    }

    pub fn from_env(network: Network) -> Result<Self, ParamsError> {
        dotenvy::dotenv().ok();
        Self::resolve(network, |var| std::env::var(var).ok())
    }

    pub fn signer(&self) -> Option<&str> {
        self.signer.as_deref()
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("network", &self.network)
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parses a `0x`-prefixed hex encoding of a 32-byte account.
pub fn parse_account(var: &'static str, value: &str) -> Result<AccountId, ParamsError> {
    let invalid = |reason: String| ParamsError::InvalidAccount { var, reason };

    let digits = value
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix".to_string()))?;
    let bytes = hex::decode(digits).map_err(|err| invalid(err.to_string()))?;
    let raw: [u8; 32] = bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| invalid(format!("expected 32 bytes, got {}", bytes.len())))?;
    Ok(AccountId::from(raw))
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).filter(|value| !value.trim().is_empty())
}

fn required_account<F>(lookup: &F, var: &'static str) -> Result<AccountId, ParamsError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = non_empty(lookup, var).ok_or(ParamsError::Missing(var))?;
    parse_account(var, &value)
}
