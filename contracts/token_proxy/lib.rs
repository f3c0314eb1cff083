#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub use self::token_proxy::{AdminCall, AdminReply, Error, TokenProxy, TokenProxyRef};

/// Transparent proxy: a stable account whose storage holds the token state
/// while the logic lives behind a swappable code hash.
#[ink::contract]
mod token_proxy {
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::env::{CallFlags, DefaultEnvironment};
    use ink::prelude::vec::Vec;
    use ink::storage::traits::{ManualKey, StorageKey};
    use ink::storage::Lazy;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        Unauthorized,
        AdminCannotFallback,
        MissingImplementation,
        MalformedCallData,
        DelegateCallFailed,
    }

    /// Requests understood by the admin entry. Variant indices are part of
    /// the wire format `proxy_admin` encodes against.
    #[derive(scale::Encode, scale::Decode, Debug, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum AdminCall {
        /// Admin only. Swaps the logic code hash, then runs `data` through it
        /// when given.
        #[codec(index = 0)]
        UpgradeToAndCall {
            new_implementation: Hash,
            data: Vec<u8>,
        },
        #[codec(index = 1)]
        Implementation,
        #[codec(index = 2)]
        ProxyAdmin,
    }

    #[derive(scale::Encode, scale::Decode, Debug, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum AdminReply {
        #[codec(index = 0)]
        Upgraded,
        #[codec(index = 1)]
        Implementation(Option<Hash>),
        #[codec(index = 2)]
        ProxyAdmin(Option<AccountId>),
    }

    #[ink(event)]
    pub struct Upgraded {
        #[ink(topic)]
        implementation: Hash,
    }

    #[ink(event)]
    pub struct AdminChanged {
        previous_admin_acc: Option<AccountId>,
        new_admin_acc: AccountId,
    }

    /// Keys are disjoint from the logic contract's so both layouts share one
    /// storage without collisions.
    #[ink(storage)]
    pub struct TokenProxy {
        implementation: Lazy<Hash, ManualKey<0x5052_0001>>,
        admin_acc: Lazy<AccountId, ManualKey<0x5052_0002>>,
    }

    /// Call arguments that are already SCALE-encoded; written verbatim.
    struct EncodedArgs<'a>(&'a [u8]);

    impl scale::Encode for EncodedArgs<'_> {
        fn size_hint(&self) -> usize {
            self.0.len()
        }

        fn encode_to<T: scale::Output + ?Sized>(&self, dest: &mut T) {
            dest.write(self.0);
        }
    }

    impl TokenProxy {
        /// Points the proxy at `implementation`, hands upgrade rights to
        /// `admin_acc` and, when `init_data` is non-empty, runs it against
        /// the proxy storage within the same instantiation.
        #[ink(constructor)]
        pub fn new(implementation: Hash, admin_acc: AccountId, init_data: Vec<u8>) -> Result<Self> {
            // message dispatch of the logic decodes the root cell before running
            ink::env::set_contract_storage(&<Self as StorageKey>::KEY, &());

            let mut proxy = Self {
                implementation: Lazy::default(),
                admin_acc: Lazy::default(),
            };
            proxy.implementation.set(&implementation);
            proxy.admin_acc.set(&admin_acc);

            proxy.env().emit_event(Upgraded { implementation });
            proxy.env().emit_event(AdminChanged {
                previous_admin_acc: None,
                new_admin_acc: admin_acc,
            });

            if !init_data.is_empty() {
                Self::delegate(implementation, &init_data)?;
            }
            Ok(proxy)
        }

        /// The only selector the proxy answers itself. Views are open to
        /// every caller; upgrades are reserved to the admin.
        #[ink(message, selector = @)]
        pub fn admin_call(&mut self, call: AdminCall) -> Result<AdminReply> {
            match call {
                AdminCall::Implementation => Ok(AdminReply::Implementation(self.implementation.get())),
                AdminCall::ProxyAdmin => Ok(AdminReply::ProxyAdmin(self.admin_acc.get())),
                AdminCall::UpgradeToAndCall {
                    new_implementation,
                    data,
                } => {
                    self.upgrade_to_and_call(new_implementation, &data)?;
                    Ok(AdminReply::Upgraded)
                }
            }
        }

        /// Every selector the proxy does not know lands here and is executed
        /// by the current implementation in this contract's storage.
        #[ink(message, selector = _)]
        pub fn forward(&self) -> Result<()> {
            let code_hash = self.forward_target(self.env().caller())?;

            build_call::<DefaultEnvironment>()
                .delegate(code_hash)
                .call_flags(CallFlags::FORWARD_INPUT | CallFlags::TAIL_CALL)
                .invoke();
            unreachable!("a tail call hands the output straight back to the caller")
        }

        // ---- internals ----

        fn is_admin(&self, account_acc: AccountId) -> bool {
            self.admin_acc.get() == Some(account_acc)
        }

        fn upgrade_to_and_call(&mut self, new_implementation: Hash, data: &[u8]) -> Result<()> {
            let caller_acc = self.env().caller();
            if !self.is_admin(caller_acc) {
                ink::env::debug_println!("upgrade refused for {:?}", caller_acc);
                return Err(Error::Unauthorized)
            }
            self.implementation.set(&new_implementation);
            self.env().emit_event(Upgraded {
                implementation: new_implementation,
            });

            if !data.is_empty() {
                Self::delegate(new_implementation, data)?;
            }
            Ok(())
        }

        /// Code hash a fallback call from `caller_acc` is delegated to.
        fn forward_target(&self, caller_acc: AccountId) -> Result<Hash> {
            if self.is_admin(caller_acc) {
                return Err(Error::AdminCannotFallback)
            }
            self.implementation.get().ok_or(Error::MissingImplementation)
        }

        /// `call_data` is a 4-byte selector followed by encoded arguments.
        fn delegate(code_hash: Hash, call_data: &[u8]) -> Result<()> {
            let (selector, args) = split_call_data(call_data)?;
            let outcome = build_call::<DefaultEnvironment>()
                .delegate(code_hash)
                .exec_input(ExecutionInput::new(Selector::new(selector)).push_arg(EncodedArgs(args)))
                .returns::<core::result::Result<(), ()>>()
                .try_invoke();

            match outcome {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::DelegateCallFailed),
            }
        }
    }

    fn split_call_data(call_data: &[u8]) -> Result<([u8; 4], &[u8])> {
        if call_data.len() < 4 {
            return Err(Error::MalformedCallData)
        }
        let (head, args) = call_data.split_at(4);
        let selector: [u8; 4] = head.try_into().map_err(|_| Error::MalformedCallData)?;
        Ok((selector, args))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use ink::env::test::{self, DefaultAccounts};

        type Env = DefaultEnvironment;

        fn accounts() -> DefaultAccounts<Env> {
            test::default_accounts::<Env>()
        }

        fn set_caller(account_acc: AccountId) {
            test::set_caller::<Env>(account_acc);
        }

        fn logic_v1() -> Hash {
            Hash::from([0x11; 32])
        }

        fn logic_v2() -> Hash {
            Hash::from([0x22; 32])
        }

        fn deploy() -> TokenProxy {
            let accs = accounts();
            set_caller(accs.alice);
            TokenProxy::new(logic_v1(), accs.frank, Vec::new()).expect("empty init data")
        }

        fn upgrade(to: Hash) -> AdminCall {
            AdminCall::UpgradeToAndCall {
                new_implementation: to,
                data: Vec::new(),
            }
        }

        #[ink::test]
        fn constructor_records_implementation_and_admin() {
            let mut proxy = deploy();
            assert_eq!(
                proxy.admin_call(AdminCall::Implementation),
                Ok(AdminReply::Implementation(Some(logic_v1())))
            );
            assert_eq!(
                proxy.admin_call(AdminCall::ProxyAdmin),
                Ok(AdminReply::ProxyAdmin(Some(accounts().frank)))
            );
            assert_eq!(test::recorded_events().count(), 2);
        }

        #[ink::test]
        fn constructor_rejects_truncated_call_data() {
            let accs = accounts();
            let result = TokenProxy::new(logic_v1(), accs.frank, vec![0xde, 0xad, 0xbe]);
            assert_eq!(result.err(), Some(Error::MalformedCallData));
        }

        #[ink::test]
        #[should_panic]
        fn constructor_delegates_init_data_to_implementation() {
            let accs = accounts();
            let mut init_data = ink::selector_bytes!("initialize").to_vec();
            scale::Encode::encode_to(&(accs.alice, accs.bob, accs.charlie), &mut init_data);
            // the off-chain engine has no code to delegate into
            let _ = TokenProxy::new(logic_v1(), accs.frank, init_data);
        }

        #[ink::test]
        fn admin_upgrades_implementation() {
            let mut proxy = deploy();
            set_caller(accounts().frank);
            assert_eq!(proxy.admin_call(upgrade(logic_v2())), Ok(AdminReply::Upgraded));
            assert_eq!(
                proxy.admin_call(AdminCall::Implementation),
                Ok(AdminReply::Implementation(Some(logic_v2())))
            );

            let events: Vec<_> = test::recorded_events().collect();
            let upgraded = <Upgraded as scale::Decode>::decode(&mut &events[2].data[..])
                .expect("third event is Upgraded");
            assert_eq!(upgraded.implementation, logic_v2());
        }

        #[ink::test]
        fn upgrade_rejects_truncated_call_data() {
            let mut proxy = deploy();
            set_caller(accounts().frank);
            let call = AdminCall::UpgradeToAndCall {
                new_implementation: logic_v2(),
                data: vec![0x01],
            };
            assert_eq!(proxy.admin_call(call), Err(Error::MalformedCallData));
        }

        #[ink::test]
        fn others_cannot_upgrade() {
            let mut proxy = deploy();
            set_caller(accounts().alice);
            assert_eq!(proxy.admin_call(upgrade(logic_v2())), Err(Error::Unauthorized));
            assert_eq!(
                proxy.admin_call(AdminCall::Implementation),
                Ok(AdminReply::Implementation(Some(logic_v1())))
            );
        }

        #[ink::test]
        fn admin_calls_are_not_forwarded() {
            let proxy = deploy();
            set_caller(accounts().frank);
            assert_eq!(proxy.forward(), Err(Error::AdminCannotFallback));
        }

        #[ink::test]
        fn other_callers_are_forwarded_to_current_implementation() {
            let mut proxy = deploy();
            let accs = accounts();
            assert_eq!(proxy.forward_target(accs.bob), Ok(logic_v1()));

            set_caller(accs.frank);
            proxy.admin_call(upgrade(logic_v2())).expect("admin upgrades");
            assert_eq!(proxy.forward_target(accs.bob), Ok(logic_v2()));
        }

        #[ink::test]
        fn forward_without_implementation_fails() {
            let proxy = TokenProxy {
                implementation: Lazy::default(),
                admin_acc: Lazy::default(),
            };
            set_caller(accounts().bob);
            assert_eq!(proxy.forward(), Err(Error::MissingImplementation));
        }

        #[ink::test]
        #[should_panic]
        fn non_admin_forward_reaches_delegate_call() {
            let proxy = deploy();
            set_caller(accounts().bob);
            let _ = proxy.forward();
        }

        #[ink::test]
        fn admin_wire_format_is_stable() {
            let encoded = scale::Encode::encode(&upgrade(logic_v2()));
            assert_eq!(encoded[0], 0);
            assert_eq!(&encoded[1..33], logic_v2().as_ref());
            assert_eq!(scale::Encode::encode(&AdminCall::ProxyAdmin), vec![2u8]);
            assert_eq!(scale::Encode::encode(&AdminReply::Upgraded), vec![0u8]);
        }

        #[ink::test]
        fn call_data_splits_into_selector_and_args() {
            let (selector, args) = split_call_data(&[1, 2, 3, 4, 5, 6]).expect("long enough");
            assert_eq!(selector, [1, 2, 3, 4]);
            assert_eq!(args, &[5, 6]);

            let (_, args) = split_call_data(&[9, 9, 9, 9]).expect("selector only");
            assert!(args.is_empty());
        }
    }

}
