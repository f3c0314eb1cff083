//! Deployment description of the upgradeable TestERC20 token: which contracts
//! are uploaded and instantiated, in which order, with which parameters.

pub mod module;
pub mod params;

pub use module::{encode_initialize, Argument, DeploymentModule, Future, Step, MODULE_ID};
pub use params::{DeploymentParams, Network, NetworkConfig, ParamsError};
