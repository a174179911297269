/// Ownership and visibility policies
///
/// Every rule here is a pure function of the loaded records and the caller's
/// id, so handlers fetch what they need and then ask a policy for an
/// [`Access`] verdict.
///
/// # Verdicts
///
/// - `Allowed`: proceed
/// - `Denied`: the caller may know the resource exists but may not act (403)
/// - `Concealed`: answer as if the resource did not exist (404)
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use tasklane_shared::auth::authorization::{project_deletion, Access};
/// use tasklane_shared::models::project::Project;
///
/// let project = Project {
///     id: 1,
///     owner_id: 7,
///     name: "Launch".to_string(),
///     tasks_order: vec![],
///     is_shared: false,
///     is_deleted: false,
///     created_at: Utc::now(),
/// };
///
/// assert_eq!(project_deletion(&project, 7), Access::Allowed);
/// assert_eq!(project_deletion(&project, 8), Access::Concealed);
/// ```

use crate::models::{project::Project, task::Task};

/// Message for owner-only operations attempted by someone else
pub const NOT_OWNER: &str = "You should be owner of the project.";

/// Message for task deletion by someone who neither created the task nor owns the project
pub const NOT_TASK_CREATOR: &str = "You should be creator of the task or owner of the project.";

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Resource is hidden from the caller
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// Caller may not perform the operation
    #[error("{0}")]
    Forbidden(&'static str),
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
    Concealed,
}

impl Access {
    /// Converts the verdict into a result
    ///
    /// `resource` names the entity for `NotFound` ("Project"), `reason` is
    /// the message for `Forbidden`.
    pub fn require(self, resource: &'static str, reason: &'static str) -> Result<(), AuthzError> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied => Err(AuthzError::Forbidden(reason)),
            Access::Concealed => Err(AuthzError::NotFound(resource)),
        }
    }
}

/// Which project fields an update may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every schema field, `is_deleted` included
    Full,

    /// Everything except `is_deleted`, which is silently dropped
    WithoutDeletion,
}

impl UpdateScope {
    /// Fields removed from the payload before merging
    pub fn excluded_fields(self) -> &'static [&'static str] {
        match self {
            UpdateScope::Full => &[],
            UpdateScope::WithoutDeletion => &["is_deleted"],
        }
    }
}

/// Whether the caller takes part in the project
pub fn is_participant(project: &Project, user_id: i64, is_collaborator: bool) -> bool {
    project.is_owned_by(user_id) || is_collaborator
}

/// Listing rule: non-deleted projects the caller owns or collaborates on
pub fn project_visibility(project: &Project, user_id: i64, is_collaborator: bool) -> Access {
    if !project.is_deleted && is_participant(project, user_id, is_collaborator) {
        Access::Allowed
    } else {
        Access::Concealed
    }
}

/// Update scope for the caller; only the owner may change `is_deleted`
pub fn project_update_scope(project: &Project, user_id: i64) -> UpdateScope {
    if project.is_owned_by(user_id) {
        UpdateScope::Full
    } else {
        UpdateScope::WithoutDeletion
    }
}

/// Deletion is owner-only, and a non-owner cannot tell the project exists
pub fn project_deletion(project: &Project, user_id: i64) -> Access {
    if project.is_owned_by(user_id) {
        Access::Allowed
    } else {
        Access::Concealed
    }
}

/// Owner-only management: removing collaborators and sending invites
pub fn project_management(project: &Project, user_id: i64) -> Access {
    if project.is_owned_by(user_id) {
        Access::Allowed
    } else {
        Access::Denied
    }
}

/// Task deletion: the task's creator or the project owner
pub fn task_deletion(task: &Task, project: &Project, user_id: i64, is_collaborator: bool) -> Access {
    if project_visibility(project, user_id, is_collaborator) != Access::Allowed {
        return Access::Concealed;
    }

    if task.creator_id == user_id || project.is_owned_by(user_id) {
        Access::Allowed
    } else {
        Access::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const OWNER: i64 = 1;
    const MEMBER: i64 = 2;
    const STRANGER: i64 = 3;

    fn project(is_deleted: bool) -> Project {
        Project {
            id: 10,
            owner_id: OWNER,
            name: "Launch".to_string(),
            tasks_order: vec![],
            is_shared: false,
            is_deleted,
            created_at: Utc::now(),
        }
    }

    fn task(creator_id: i64) -> Task {
        Task {
            id: 100,
            creator_id,
            project_id: 10,
            body: "Ship it".to_string(),
            note: None,
            notification_date: None,
            is_completed: false,
            completion_date: None,
            completed_by_user_id: None,
            assigned_to_user_id: None,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_visibility() {
        let p = project(false);
        assert_eq!(project_visibility(&p, OWNER, false), Access::Allowed);
        assert_eq!(project_visibility(&p, MEMBER, true), Access::Allowed);
        assert_eq!(project_visibility(&p, STRANGER, false), Access::Concealed);
        assert_eq!(project_visibility(&project(true), OWNER, false), Access::Concealed);
    }

    #[test]
    fn test_update_scope() {
        let p = project(false);
        assert_eq!(project_update_scope(&p, OWNER), UpdateScope::Full);
        assert_eq!(project_update_scope(&p, STRANGER), UpdateScope::WithoutDeletion);
        assert_eq!(UpdateScope::WithoutDeletion.excluded_fields(), &["is_deleted"]);
        assert!(UpdateScope::Full.excluded_fields().is_empty());
    }

    #[test]
    fn test_deletion_conceals_for_non_owner() {
        let p = project(false);
        assert_eq!(project_deletion(&p, OWNER), Access::Allowed);
        assert_eq!(project_deletion(&p, MEMBER), Access::Concealed);
    }

    #[test]
    fn test_management_denies_non_owner() {
        let p = project(false);
        assert_eq!(project_management(&p, OWNER), Access::Allowed);
        assert_eq!(project_management(&p, MEMBER), Access::Denied);
        assert_eq!(project_management(&project(true), OWNER), Access::Allowed);
    }

    #[test]
    fn test_task_deletion() {
        let p = project(false);
        assert_eq!(task_deletion(&task(MEMBER), &p, MEMBER, true), Access::Allowed);
        assert_eq!(task_deletion(&task(MEMBER), &p, OWNER, false), Access::Allowed);
        assert_eq!(task_deletion(&task(OWNER), &p, MEMBER, true), Access::Denied);
        assert_eq!(task_deletion(&task(OWNER), &p, STRANGER, false), Access::Concealed);
    }

    #[test]
    fn test_require() {
        assert_eq!(Access::Allowed.require("Project", NOT_OWNER), Ok(()));
        assert_eq!(
            Access::Denied.require("Project", NOT_OWNER),
            Err(AuthzError::Forbidden(NOT_OWNER))
        );

        let err = Access::Concealed.require("Project", NOT_OWNER).unwrap_err();
        assert_eq!(err.to_string(), "Project not found.");
    }
}
