//! Declarative plan for the upgradeable token: upload the ledger logic,
//! instantiate the upgrade admin, then instantiate the proxy with the
//! encoded initializer so the token is initialized in the same step.

use std::fmt;

use ink::primitives::AccountId;
use scale::Encode;

use crate::params::DeploymentParams;

pub const MODULE_ID: &str = "TestERC20Module";

pub const TOKEN_CONTRACT: &str = "test_erc20";
pub const PROXY_CONTRACT: &str = "token_proxy";
pub const PROXY_ADMIN_CONTRACT: &str = "proxy_admin";

pub const IMPLEMENTATION_ID: &str = "TestERC20";
pub const PROXY_ADMIN_ID: &str = "ProxyAdmin";
pub const PROXY_ID: &str = "TransparentUpgradeableProxy";
pub const TOKEN_AT_PROXY_ID: &str = "TestERC20Proxy";

/// A value that only exists once the step with the given id has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Future {
    CodeHash(&'static str),
    Account(&'static str),
}

impl Future {
    pub fn step_id(&self) -> &'static str {
        match self {
            Future::CodeHash(id) | Future::Account(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Account(AccountId),
    Future(Future),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Upload {
        id: &'static str,
        contract: &'static str,
    },
    Instantiate {
        id: &'static str,
        contract: &'static str,
        constructor: &'static str,
        args: Vec<Argument>,
    },
    /// Addresses an existing account through another contract's interface.
    ContractAt {
        id: &'static str,
        contract: &'static str,
        address: Future,
    },
}

impl Step {
    pub fn id(&self) -> &'static str {
        match self {
            Step::Upload { id, .. } | Step::Instantiate { id, .. } | Step::ContractAt { id, .. } => *id,
        }
    }

    /// Futures this step consumes.
    pub fn dependencies(&self) -> Vec<&Future> {
        match self {
            Step::Upload { .. } => Vec::new(),
            Step::Instantiate { args, .. } => args
                .iter()
                .filter_map(|arg| match arg {
                    Argument::Future(future) => Some(future),
                    _ => None,
                })
                .collect(),
            Step::ContractAt { address, .. } => vec![address],
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentModule {
    params: DeploymentParams,
}

impl DeploymentModule {
    pub fn new(params: DeploymentParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DeploymentParams {
        &self.params
    }

    /// Call data the proxy runs against its own storage when instantiated.
    pub fn initializer(&self) -> Vec<u8> {
        encode_initialize(self.params.default_admin, self.params.minter, self.params.burner)
    }

    pub fn steps(&self) -> Vec<Step> {
        vec![
            Step::Upload {
                id: IMPLEMENTATION_ID,
                contract: TOKEN_CONTRACT,
            },
            Step::Instantiate {
                id: PROXY_ADMIN_ID,
                contract: PROXY_ADMIN_CONTRACT,
                constructor: "new",
                args: vec![Argument::Account(self.params.default_admin)],
            },
            Step::Instantiate {
                id: PROXY_ID,
                contract: PROXY_CONTRACT,
                constructor: "new",
                args: vec![
                    Argument::Future(Future::CodeHash(IMPLEMENTATION_ID)),
                    Argument::Future(Future::Account(PROXY_ADMIN_ID)),
                    Argument::Bytes(self.initializer()),
                ],
            },
            Step::ContractAt {
                id: TOKEN_AT_PROXY_ID,
                contract: TOKEN_CONTRACT,
                address: Future::Account(PROXY_ID),
            },
        ]
    }
}

/// Selector of the ledger's `initialize` message followed by its
/// SCALE-encoded arguments.
pub fn encode_initialize(admin: AccountId, minter: AccountId, burner: AccountId) -> Vec<u8> {
    let mut call_data = ink::selector_bytes!("initialize").to_vec();
    (admin, minter, burner).encode_to(&mut call_data);
    call_data
}

fn account_hex(account: &AccountId) -> String {
    let raw: &[u8] = account.as_ref();
    format!("0x{}", hex::encode(raw))
}

impl fmt::Display for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Future::CodeHash(id) => write!(f, "code_hash({id})"),
            Future::Account(id) => write!(f, "account({id})"),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Account(account) => f.write_str(&account_hex(account)),
            Argument::Future(future) => write!(f, "{future}"),
            Argument::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Upload { id, contract } => write!(f, "{id}: upload {contract}"),
            Step::Instantiate {
                id,
                contract,
                constructor,
                args,
            } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{id}: instantiate {contract}::{constructor}({})", args.join(", "))
            }
            Step::ContractAt { id, contract, address } => {
                write!(f, "{id}: {contract} at {address}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale::Decode;

    fn account(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    fn module() -> DeploymentModule {
        DeploymentModule::new(DeploymentParams {
            default_admin: account(1),
            minter: account(2),
            burner: account(3),
        })
    }

    #[test]
    fn initializer_is_selector_then_arguments() {
        let call_data = module().initializer();
        assert_eq!(call_data.len(), 4 + 3 * 32);
        assert_eq!(call_data[..4], ink::selector_bytes!("initialize"));

        let args = <(AccountId, AccountId, AccountId)>::decode(&mut &call_data[4..])
            .expect("three encoded accounts");
        assert_eq!(args, (account(1), account(2), account(3)));
    }

    #[test]
    fn steps_follow_deployment_order() {
        let ids: Vec<_> = module().steps().iter().map(Step::id).collect();
        assert_eq!(ids, [IMPLEMENTATION_ID, PROXY_ADMIN_ID, PROXY_ID, TOKEN_AT_PROXY_ID]);
    }

    #[test]
    fn every_future_points_at_an_earlier_step() {
        let steps = module().steps();
        for (index, step) in steps.iter().enumerate() {
            for future in step.dependencies() {
                assert!(
                    steps[..index].iter().any(|earlier| earlier.id() == future.step_id()),
                    "{} depends on {} before it exists",
                    step.id(),
                    future
                );
            }
        }
    }

    #[test]
    fn proxy_admin_is_owned_by_default_admin() {
        let steps = module().steps();
        match &steps[1] {
            Step::Instantiate { contract, args, .. } => {
                assert_eq!(*contract, PROXY_ADMIN_CONTRACT);
                assert_eq!(args, &[Argument::Account(account(1))]);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn proxy_receives_logic_admin_and_initializer() {
        let module = module();
        let steps = module.steps();
        match &steps[2] {
            Step::Instantiate { contract, args, .. } => {
                assert_eq!(*contract, PROXY_CONTRACT);
                assert_eq!(
                    args,
                    &[
                        Argument::Future(Future::CodeHash(IMPLEMENTATION_ID)),
                        Argument::Future(Future::Account(PROXY_ADMIN_ID)),
                        Argument::Bytes(module.initializer()),
                    ]
                );
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn steps_render_for_operators() {
        let steps = module().steps();
        assert_eq!(steps[0].to_string(), "TestERC20: upload test_erc20");
        assert_eq!(
            steps[3].to_string(),
            "TestERC20Proxy: test_erc20 at account(TransparentUpgradeableProxy)"
        );
        assert!(steps[1]
            .to_string()
            .ends_with(&format!("proxy_admin::new(0x{})", "01".repeat(32))));
    }
}
