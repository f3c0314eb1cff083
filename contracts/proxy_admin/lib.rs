#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub use self::proxy_admin::{Error, ProxyAdmin, ProxyAdminRef};

#[ink::contract]
mod proxy_admin {
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::env::DefaultEnvironment;
    use ink::prelude::vec::Vec;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        NotOwner,
        InvalidOwner,
        UpgradeFailed,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous_owner_acc: Option<AccountId>,
        #[ink(topic)]
        new_owner_acc: Option<AccountId>,
    }

    /// Selector `token_proxy` reserves for its admin entry (`selector = @`).
    const PROXY_ADMIN_SELECTOR: [u8; 4] = [0x9B, 0xAE, 0x9D, 0x5E];

    /// Encoding of the proxy's admin request; only the upgrade variant is
    /// ever sent from here.
    #[derive(scale::Encode)]
    enum ProxyCall {
        #[codec(index = 0)]
        UpgradeToAndCall {
            new_implementation: Hash,
            data: Vec<u8>,
        },
    }

    /// Reply the proxy sends for a successful upgrade.
    #[derive(scale::Decode, Debug, PartialEq, Eq)]
    enum ProxyReply {
        #[codec(index = 0)]
        Upgraded,
    }

    /// Holds the right to upgrade proxies that name this contract as admin.
    #[ink(storage)]
    pub struct ProxyAdmin {
        owner_acc: Option<AccountId>,
    }

    fn null_account() -> AccountId {
        AccountId::from([0u8; 32])
    }

    impl ProxyAdmin {
        #[ink(constructor)]
        pub fn new(initial_owner_acc: AccountId) -> Result<Self> {
            if initial_owner_acc == null_account() {
                return Err(Error::InvalidOwner)
            }
            let admin = Self {
                owner_acc: Some(initial_owner_acc),
            };
            admin.env().emit_event(OwnershipTransferred {
                previous_owner_acc: None,
                new_owner_acc: Some(initial_owner_acc),
            });
            Ok(admin)
        }

        // -------- modifiers (helpers) --------

        fn only_owner(&self) -> Result<()> {
            if self.owner_acc != Some(self.env().caller()) {
                return Err(Error::NotOwner)
            }
            Ok(())
        }

        // -------- ownership --------

        #[ink(message)]
        pub fn owner(&self) -> Option<AccountId> {
            self.owner_acc
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner_acc: AccountId) -> Result<()> {
            self.only_owner()?;
            if new_owner_acc == null_account() {
                return Err(Error::InvalidOwner)
            }
            self.set_owner(Some(new_owner_acc));
            Ok(())
        }

        /// Leaves every managed proxy without an upgrade path.
        #[ink(message)]
        pub fn renounce_ownership(&mut self) -> Result<()> {
            self.only_owner()?;
            self.set_owner(None);
            Ok(())
        }

        // -------- upgrades --------

        /// Sends an upgrade request to the proxy's admin entry; the proxy
        /// sees this contract as the caller.
        #[ink(message)]
        pub fn upgrade_and_call(
            &mut self,
            proxy_acc: AccountId,
            implementation: Hash,
            data: Vec<u8>,
        ) -> Result<()> {
            self.only_owner()?;
            let request = ProxyCall::UpgradeToAndCall {
                new_implementation: implementation,
                data,
            };
            // proxy errors are fieldless, one byte on the wire
            let outcome = build_call::<DefaultEnvironment>()
                .call(proxy_acc)
                .exec_input(ExecutionInput::new(Selector::new(PROXY_ADMIN_SELECTOR)).push_arg(request))
                .returns::<core::result::Result<ProxyReply, u8>>()
                .try_invoke();

            match outcome {
                Ok(Ok(Ok(ProxyReply::Upgraded))) => Ok(()),
                _ => {
                    ink::env::debug_println!("upgrade of {:?} failed", proxy_acc);
                    Err(Error::UpgradeFailed)
                }
            }
        }

        // ---- internals ----

        fn set_owner(&mut self, new_owner_acc: Option<AccountId>) {
            let previous_owner_acc = self.owner_acc;
            self.owner_acc = new_owner_acc;
            self.env().emit_event(OwnershipTransferred {
                previous_owner_acc,
                new_owner_acc,
            });
        }
    }

}
