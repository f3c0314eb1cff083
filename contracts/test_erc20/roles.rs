/// Permission buckets gating privileged ledger mutations.
///
/// Membership is kept as a flat `(Role, AccountId) -> bool` table, so an
/// account may hold any combination of roles at once.
#[derive(scale::Encode, scale::Decode, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Role {
    /// Grants and revokes every role, itself included.
    Admin,
    Minter,
    Burner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Minter, Role::Burner];

    /// Role whose holders may grant or revoke `self`.
    pub fn admin_role(self) -> Role {
        Role::Admin
    }
}
