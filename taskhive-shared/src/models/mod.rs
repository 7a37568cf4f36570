//! Database models.
//!
//! Each model owns its CRUD operations as inherent async methods taking a
//! `PgPool`. Multi-row invariants (the project/task index, collaborator
//! membership) are enforced inside the model layer with transactions and
//! conditional updates, not left to callers.
//!
//! # Models
//!
//! - [`user`]: accounts, confirmation and password-reset token handling
//! - [`project`]: projects and their collaborator/task membership sets
//! - [`task`]: tasks nested under a project, including the state toggle
//!
//! # Example
//!
//! ```no_run
//! use taskhive_shared::models::project::{Project, CreateProject};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, creator: Uuid) -> Result<(), sqlx::Error> {
//! let project = Project::create(
//!     &pool,
//!     creator,
//!     CreateProject {
//!         name: "Website".to_string(),
//!         description: "Marketing site".to_string(),
//!         client: "Acme".to_string(),
//!         deadline: None,
//!     },
//! )
//! .await?;
//!
//! let visible = Project::list_visible_to(&pool, creator).await?;
//! assert!(visible.iter().any(|p| p.id == project.id));
//! # Ok(())
//! # }
//! ```

pub mod project;
pub mod task;
pub mod user;
