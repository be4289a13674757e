//! Access control for the user resource.
//!
//! A static decision table: each action maps to the capability it
//! requires, and object-level access is staff-or-self. Cart and cart
//! item endpoints do not go through this table; their access control is
//! ownership scoping in the repositories (and there is deliberately no
//! staff override for carts).

use tradewind_core::UserId;

use crate::models::user::AuthUser;

/// Actions on the user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Create an account.
    Register,
    /// Exchange credentials for a token.
    Login,
    /// List all users.
    List,
    /// Read a specific user.
    Retrieve,
    /// Update a specific user's profile.
    Update,
    /// Delete a specific user.
    Delete,
    /// Change one's own password.
    ChangePassword,
    /// Read one's own username.
    ReadOwnUsername,
}

/// Capability an action requires of the requesting principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    /// No authentication required.
    Anyone,
    /// Any authenticated user.
    Authenticated,
    /// Authenticated, and additionally staff-or-self at the object level.
    StaffOrSelf,
    /// Staff only.
    Staff,
}

/// The decision table itself.
const fn required_capability(action: UserAction) -> Capability {
    match action {
        UserAction::Register | UserAction::Login => Capability::Anyone,
        UserAction::List => Capability::Staff,
        UserAction::Retrieve | UserAction::Update | UserAction::Delete => Capability::StaffOrSelf,
        UserAction::ChangePassword | UserAction::ReadOwnUsername => Capability::Authenticated,
    }
}

/// Whether the principal may perform the action at all.
///
/// Object-level checks (staff-or-self against a target row) happen
/// separately in [`permits_object`]; this gate only rules out requests
/// that can never succeed for this principal.
#[must_use]
pub fn permits_action(principal: Option<&AuthUser>, action: UserAction) -> bool {
    match required_capability(action) {
        Capability::Anyone => true,
        Capability::Authenticated | Capability::StaffOrSelf => principal.is_some(),
        Capability::Staff => principal.is_some_and(|p| p.is_staff),
    }
}

/// Whether the principal may act on the given target user.
///
/// Permit iff the requester is staff or is the target. A denial here is
/// an explicit authorization failure (403), not a not-found: user rows
/// are not hidden the way carts are.
#[must_use]
pub fn permits_object(requester: &AuthUser, target: UserId) -> bool {
    requester.is_staff || requester.id == target
}
