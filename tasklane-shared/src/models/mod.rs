/// Database models for Tasklane
///
/// Each model carries its row type, creation input and the queries that touch
/// its table. Handlers normally reach them through [`crate::store::Store`].
///
/// # Models
///
/// - `user`: Accounts, credentials and token cut-off time
/// - `file`: Stored file metadata (avatars)
/// - `project`: Owned projects with soft delete
/// - `collaborator`: Project ↔ non-owner user association
/// - `invite`: Redeemable project invitations
/// - `task`: Project tasks with completion tracking
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::models::project::{NewProject, Project};
/// use tasklane_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let mut draft = NewProject::owned_by(1);
/// draft.name = "Launch".to_string();
///
/// let project = Project::create(&pool, draft).await?;
/// # Ok(())
/// # }
/// ```

pub mod collaborator;
pub mod file;
pub mod invite;
pub mod project;
pub mod task;
pub mod user;
