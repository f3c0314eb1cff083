#![cfg_attr(not(feature = "std"), no_std, no_main)]

mod roles;

pub use self::roles::Role;
pub use self::test_erc20::{Error, TestErc20, TestErc20Ref};

#[ink::contract]
mod test_erc20 {
    use crate::roles::Role;
    use ink::prelude::string::String;
    use ink::storage::traits::ManualKey;
    use ink::storage::{Lazy, Mapping};

    pub const TOKEN_NAME: &str = "TestERC20";
    pub const TOKEN_SYMBOL: &str = "TE20";
    pub const TOKEN_DECIMALS: u8 = 18;

    /// Reported by `Initialized`; bumped when a future logic version needs a
    /// migration initializer.
    pub const INITIALIZER_VERSION: u64 = 1;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        AlreadyInitialized,
        Unauthorized {
            account_acc: AccountId,
            role: Role,
        },
        BadConfirmation,
        InvalidReceiver(AccountId),
        InvalidSender(AccountId),
        InvalidSpender(AccountId),
        InsufficientBalance {
            account_acc: AccountId,
            available: Balance,
            requested: Balance,
        },
        InsufficientAllowance {
            spender_acc: AccountId,
            available: Balance,
            requested: Balance,
        },
        Overflow,
    }

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from_acc: AccountId,
        #[ink(topic)]
        to_acc: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner_acc: AccountId,
        #[ink(topic)]
        spender_acc: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct RoleGranted {
        #[ink(topic)]
        role: Role,
        #[ink(topic)]
        account_acc: AccountId,
        sender_acc: AccountId,
    }

    #[ink(event)]
    pub struct RoleRevoked {
        #[ink(topic)]
        role: Role,
        #[ink(topic)]
        account_acc: AccountId,
        sender_acc: AccountId,
    }

    #[ink(event)]
    pub struct Initialized {
        version: u64,
    }

    /// Every field sits behind its own manual key and the root cell stays
    /// empty, which lets `token_proxy` run this code against its own storage.
    #[ink(storage)]
    pub struct TestErc20 {
        initialized: Lazy<bool, ManualKey<0x7E20_0001>>,
        total_supply: Lazy<Balance, ManualKey<0x7E20_0002>>,
        balances: Mapping<AccountId, Balance, ManualKey<0x7E20_0003>>,
        allowances: Mapping<(AccountId, AccountId), Balance, ManualKey<0x7E20_0004>>,
        role_members: Mapping<(Role, AccountId), bool, ManualKey<0x7E20_0005>>,
    }

    /// Sink of burns and source of mints; never a valid counterparty.
    pub fn null_account() -> AccountId {
        AccountId::from([0u8; 32])
    }

    impl TestErc20 {
        #[ink(constructor)]
        pub fn new() -> Self {
            Self {
                initialized: Lazy::default(),
                total_supply: Lazy::default(),
                balances: Mapping::default(),
                allowances: Mapping::default(),
                role_members: Mapping::default(),
            }
        }

        /// One-shot setup of the initial role holders. They may coincide.
        #[ink(message)]
        pub fn initialize(
            &mut self,
            admin: AccountId,
            minter: AccountId,
            burner: AccountId,
        ) -> Result<()> {
            if self.initialized.get().unwrap_or(false) {
                return Err(Error::AlreadyInitialized)
            }
            self.initialized.set(&true);

            self.grant_role_internal(Role::Admin, admin);
            self.grant_role_internal(Role::Minter, minter);
            self.grant_role_internal(Role::Burner, burner);

            self.env().emit_event(Initialized {
                version: INITIALIZER_VERSION,
            });
            Ok(())
        }

        // ---- metadata ----

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            TOKEN_DECIMALS
        }

        // ---- read API ----

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply.get().unwrap_or(0)
        }

        #[ink(message)]
        pub fn balance_of(&self, owner_acc: AccountId) -> Balance {
            self.balances.get(owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner_acc: AccountId, spender_acc: AccountId) -> Balance {
            self.allowances.get((owner_acc, spender_acc)).unwrap_or(0)
        }

        // ---- access control ----

        #[ink(message)]
        pub fn has_role(&self, role: Role, account_acc: AccountId) -> bool {
            self.role_members.get((role, account_acc)).unwrap_or(false)
        }

        #[ink(message)]
        pub fn get_role_admin(&self, role: Role) -> Role {
            role.admin_role()
        }

        #[ink(message)]
        pub fn grant_role(&mut self, role: Role, account_acc: AccountId) -> Result<()> {
            self.ensure_role(role.admin_role(), self.env().caller())?;
            self.grant_role_internal(role, account_acc);
            Ok(())
        }

        #[ink(message)]
        pub fn revoke_role(&mut self, role: Role, account_acc: AccountId) -> Result<()> {
            self.ensure_role(role.admin_role(), self.env().caller())?;
            self.revoke_role_internal(role, account_acc);
            Ok(())
        }

        /// Drops one of the caller's own roles. `caller_confirmation` must
        /// repeat the caller's account.
        #[ink(message)]
        pub fn renounce_role(&mut self, role: Role, caller_confirmation: AccountId) -> Result<()> {
            if caller_confirmation != self.env().caller() {
                return Err(Error::BadConfirmation)
            }
            self.revoke_role_internal(role, caller_confirmation);
            Ok(())
        }

        // ---- write API ----

        #[ink(message)]
        pub fn mint(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            self.ensure_role(Role::Minter, self.env().caller())?;
            if to_acc == null_account() {
                return Err(Error::InvalidReceiver(to_acc))
            }
            self.mint_internal(to_acc, amount)
        }

        /// Burns from the caller's own balance.
        #[ink(message)]
        pub fn burn(&mut self, amount: Balance) -> Result<()> {
            let caller_acc = self.env().caller();
            self.burn_internal(caller_acc, amount)
        }

        /// Burns from any account; caller must hold `Burner`.
        #[ink(message)]
        pub fn burn_as_burner(&mut self, account_acc: AccountId, amount: Balance) -> Result<()> {
            self.ensure_role(Role::Burner, self.env().caller())?;
            if account_acc == null_account() {
                return Err(Error::InvalidSender(account_acc))
            }
            self.burn_internal(account_acc, amount)
        }

        #[ink(message)]
        pub fn burn_from(&mut self, account_acc: AccountId, amount: Balance) -> Result<()> {
            let spender_acc = self.env().caller();
            let remaining = self.remaining_allowance(account_acc, spender_acc, amount)?;
            if account_acc == null_account() {
                return Err(Error::InvalidSender(account_acc))
            }
            let new_balance = self.balance_after_debit(account_acc, amount)?;
            let new_supply = self
                .total_supply()
                .checked_sub(amount)
                .ok_or(Error::Overflow)?;

            self.allowances.insert((account_acc, spender_acc), &remaining);
            self.balances.insert(account_acc, &new_balance);
            self.total_supply.set(&new_supply);

            self.env().emit_event(Transfer {
                from_acc: account_acc,
                to_acc: null_account(),
                value: amount,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            let from_acc = self.env().caller();
            if to_acc == null_account() {
                return Err(Error::InvalidReceiver(to_acc))
            }
            self.move_balance(from_acc, to_acc, amount)
        }

        /// Sets the allowance outright; it does not add to a previous one.
        #[ink(message)]
        pub fn approve(&mut self, spender_acc: AccountId, amount: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            if spender_acc == null_account() {
                return Err(Error::InvalidSpender(spender_acc))
            }
            self.allowances.insert((owner_acc, spender_acc), &amount);
            self.env().emit_event(Approval {
                owner_acc,
                spender_acc,
                value: amount,
            });
            Ok(())
        }

        /// Checks allowance, then sender, then receiver, then balance; the
        /// first failure is the one reported.
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount: Balance,
        ) -> Result<()> {
            let spender_acc = self.env().caller();
            let remaining = self.remaining_allowance(from_acc, spender_acc, amount)?;
            if from_acc == null_account() {
                return Err(Error::InvalidSender(from_acc))
            }
            if to_acc == null_account() {
                return Err(Error::InvalidReceiver(to_acc))
            }
            self.move_balance(from_acc, to_acc, amount)?;
            self.allowances.insert((from_acc, spender_acc), &remaining);
            Ok(())
        }

        // ---- internals ----

        fn ensure_role(&self, role: Role, account_acc: AccountId) -> Result<()> {
            if !self.has_role(role, account_acc) {
                ink::env::debug_println!("{:?} lacks {:?}", account_acc, role);
                return Err(Error::Unauthorized { account_acc, role })
            }
            Ok(())
        }

        fn grant_role_internal(&mut self, role: Role, account_acc: AccountId) {
            if self.has_role(role, account_acc) {
                return
            }
            self.role_members.insert((role, account_acc), &true);
            self.env().emit_event(RoleGranted {
                role,
                account_acc,
                sender_acc: self.env().caller(),
            });
        }

        fn revoke_role_internal(&mut self, role: Role, account_acc: AccountId) {
            if !self.has_role(role, account_acc) {
                return
            }
            self.role_members.remove((role, account_acc));
            self.env().emit_event(RoleRevoked {
                role,
                account_acc,
                sender_acc: self.env().caller(),
            });
        }

        fn remaining_allowance(
            &self,
            owner_acc: AccountId,
            spender_acc: AccountId,
            amount: Balance,
        ) -> Result<Balance> {
            let available = self.allowance(owner_acc, spender_acc);
            if available < amount {
                return Err(Error::InsufficientAllowance {
                    spender_acc,
                    available,
                    requested: amount,
                })
            }
            available.checked_sub(amount).ok_or(Error::Overflow)
        }

        fn balance_after_debit(&self, account_acc: AccountId, amount: Balance) -> Result<Balance> {
            let available = self.balance_of(account_acc);
            if available < amount {
                return Err(Error::InsufficientBalance {
                    account_acc,
                    available,
                    requested: amount,
                })
            }
            available.checked_sub(amount).ok_or(Error::Overflow)
        }

        fn mint_internal(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            let new_supply = self
                .total_supply()
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            let new_balance = self
                .balance_of(to_acc)
                .checked_add(amount)
                .ok_or(Error::Overflow)?;

            self.total_supply.set(&new_supply);
            self.balances.insert(to_acc, &new_balance);

            self.env().emit_event(Transfer {
                from_acc: null_account(),
                to_acc,
                value: amount,
            });
            Ok(())
        }

        fn burn_internal(&mut self, account_acc: AccountId, amount: Balance) -> Result<()> {
            let new_balance = self.balance_after_debit(account_acc, amount)?;
            let new_supply = self
                .total_supply()
                .checked_sub(amount)
                .ok_or(Error::Overflow)?;

            self.balances.insert(account_acc, &new_balance);
            self.total_supply.set(&new_supply);

            self.env().emit_event(Transfer {
                from_acc: account_acc,
                to_acc: null_account(),
                value: amount,
            });
            Ok(())
        }

        fn move_balance(&mut self, from_acc: AccountId, to_acc: AccountId, amount: Balance) -> Result<()> {
            let new_from = self.balance_after_debit(from_acc, amount)?;
            if from_acc != to_acc {
                let new_to = self
                    .balance_of(to_acc)
                    .checked_add(amount)
                    .ok_or(Error::Overflow)?;
                self.balances.insert(from_acc, &new_from);
                self.balances.insert(to_acc, &new_to);
            }

            self.env().emit_event(Transfer {
                from_acc,
                to_acc,
                value: amount,
            });
            Ok(())
        }
    }


}
