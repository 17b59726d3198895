//! Per-request visibility rules for workouts
//!
//! A workout may be listed when it is public or the requester manages it.
//! Its exercises are exposed only when it is free or the requester manages
//! it. The listing rule is also enforced in SQL through [`list_scope`].

use crate::identity::Requester;
use store_object::{ListScope, WorkoutRecord};

pub fn can_list(requester: &Requester, workout: &WorkoutRecord) -> bool {
    !workout.is_private || requester.may_manage(workout.owner_id)
}

pub fn can_view_details(requester: &Requester, workout: &WorkoutRecord) -> bool {
    workout.is_free() || requester.may_manage(workout.owner_id)
}

/// Copying needs a public free workout, or one the requester owns
pub fn can_copy(requester: &Requester, workout: &WorkoutRecord) -> bool {
    (!workout.is_private && workout.is_free()) || requester.owns(workout.owner_id)
}

pub fn list_scope(requester: &Requester) -> ListScope {
    if requester.is_admin {
        ListScope::Everything
    } else {
        ListScope::VisibleTo(requester.id)
    }
}
