//! Ownership check applied before every task mutation.

use shared::Task;

use crate::auth::Caller;
use crate::error::ApiError;

/// Allow a mutation iff the caller owns the task or is an admin.
///
/// Called identically before update and delete, and only after the task
/// has been found — so a denied caller still learns the task exists,
/// but a 403 is never conflated with a 404.
pub fn authorize_mutation(caller: &Caller, task: &Task) -> Result<(), ApiError> {
    if task.owner == caller.id || caller.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not authorized".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;
    use uuid::Uuid;

    #[test]
    fn owner_is_allowed() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        let task = Task::new("t".into(), caller.id);
        assert!(authorize_mutation(&caller, &task).is_ok());
    }

    #[test]
    fn admin_bypasses_ownership() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let task = Task::new("t".into(), Uuid::new_v4());
        assert!(authorize_mutation(&caller, &task).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        let task = Task::new("t".into(), Uuid::new_v4());
        let err = authorize_mutation(&caller, &task).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
