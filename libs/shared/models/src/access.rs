//! Authorization gate: pure yes/no decisions over the caller's resolved
//! identity and role. No lookups, no side effects; handlers translate a
//! `false` into `AppError::Forbidden`.

use uuid::Uuid;

use crate::auth::Caller;

pub fn is_admin(caller: &Caller) -> bool {
    caller.is_admin()
}

/// A booking is visible to the admin, the booked client, and the owning user
/// of the booked professional.
pub fn can_view_appointment(
    caller: &Caller,
    client_id: Uuid,
    professional_owner_id: Uuid,
) -> bool {
    is_admin(caller) || caller.user_id == client_id || caller.user_id == professional_owner_id
}

/// Creating a booking on behalf of a client: the client themself or an admin.
pub fn can_act_for_client(caller: &Caller, client_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == client_id
}

/// Editing a scheduled booking: the owning client or an admin.
pub fn can_update_appointment(caller: &Caller, client_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == client_id
}

/// Cancelling: client, professional's owner, or admin.
pub fn can_cancel_appointment(
    caller: &Caller,
    client_id: Uuid,
    professional_owner_id: Uuid,
) -> bool {
    is_admin(caller) || caller.user_id == client_id || caller.user_id == professional_owner_id
}

/// Completing or otherwise moving status: professional's owner or admin only.
pub fn can_set_status(caller: &Caller, professional_owner_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == professional_owner_id
}

pub fn can_list_for_user(caller: &Caller, target_user_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == target_user_id
}

pub fn can_list_for_professional(caller: &Caller, professional_owner_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == professional_owner_id
}

/// Availability-window mutation: the owning professional or an admin.
pub fn can_manage_calendar(caller: &Caller, professional_owner_id: Uuid) -> bool {
    is_admin(caller) || caller.user_id == professional_owner_id
}
