//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//!
//! Every mutating method is one atomic unit: an implementation must commit
//! all rows it writes together or none of them. Implementations must not
//! cache rows between calls, because another process may write the same
//! store at any time.

use std::future::Future;

use crate::db::{
    Comment, CreatedProject, DbResult, Entity, EntityKind, Id, NewComment, NewEntity, NewProject,
    NewStage, NewTask, Project, ProjectDetails, ProjectStatus, ProjectUpdate, Stage, StageUpdate,
    Task, TaskLog, TaskQuery, TaskUpdate,
};

/// Repository for Entity operations.
pub trait EntityRepository: Send + Sync {
    /// Register a new entity and generate its API key.
    fn register(&self, entity: &NewEntity) -> impl Future<Output = DbResult<Entity>> + Send;

    /// Get an entity by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Entity>> + Send;

    /// Resolve an active entity from its API key.
    fn get_by_api_key(&self, api_key: &str)
    -> impl Future<Output = DbResult<Option<Entity>>> + Send;

    /// List active entities, optionally by kind.
    fn list(&self, kind: Option<EntityKind>)
    -> impl Future<Output = DbResult<Vec<Entity>>> + Send;
}

/// Repository for Project operations.
pub trait ProjectRepository: Send + Sync {
    /// Create a pending project, its default stages, and any listed tasks.
    fn create(&self, project: &NewProject)
    -> impl Future<Output = DbResult<CreatedProject>> + Send;

    /// Get a project summary by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Project>> + Send;

    /// Get a project with its ordered stages and their tasks.
    fn details(&self, id: Id) -> impl Future<Output = DbResult<ProjectDetails>> + Send;

    /// List projects in insertion order, optionally by status.
    fn list(
        &self,
        status: Option<ProjectStatus>,
    ) -> impl Future<Output = DbResult<Vec<Project>>> + Send;

    /// Move a pending project to `decision`, recording the reviewer.
    ///
    /// Fails with `InvalidState` unless the project is pending at the moment
    /// the write lock is held.
    fn review(
        &self,
        id: Id,
        reviewer_id: Id,
        decision: ProjectStatus,
    ) -> impl Future<Output = DbResult<Project>> + Send;

    /// Change name or description. Status only moves through `review`.
    fn update(
        &self,
        id: Id,
        update: &ProjectUpdate,
    ) -> impl Future<Output = DbResult<Project>> + Send;

    /// Delete a project with its stages, tasks, and comments.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for Stage operations.
pub trait StageRepository: Send + Sync {
    /// List a project's stages by position.
    fn list(&self, project_id: Id) -> impl Future<Output = DbResult<Vec<Stage>>> + Send;

    /// Append a stage after the project's last one.
    fn create(
        &self,
        project_id: Id,
        stage: &NewStage,
    ) -> impl Future<Output = DbResult<Stage>> + Send;

    /// Rename or redescribe a stage.
    fn update(&self, id: Id, update: &StageUpdate)
    -> impl Future<Output = DbResult<Stage>> + Send;

    /// Delete an empty stage. A project always keeps at least one stage.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for Task operations.
pub trait TaskRepository: Send + Sync {
    /// Create a task in the project's first stage.
    fn create(&self, task: &NewTask) -> impl Future<Output = DbResult<Task>> + Send;

    /// Get a task by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Task>> + Send;

    /// List tasks matching every given filter, by ID.
    fn list(&self, query: &TaskQuery) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Open work across all projects: pending or in progress, highest
    /// priority first.
    fn available(&self) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Activity log of a task, newest first.
    fn logs(&self, task_id: Id) -> impl Future<Output = DbResult<Vec<TaskLog>>> + Send;

    /// Apply a partial update, checking stage and assignee references.
    fn update(&self, id: Id, update: &TaskUpdate)
    -> impl Future<Output = DbResult<Task>> + Send;

    /// Delete a task by ID.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for Comment operations.
pub trait CommentRepository: Send + Sync {
    /// Append a comment to a task.
    fn create(&self, comment: &NewComment) -> impl Future<Output = DbResult<Comment>> + Send;

    /// List a task's comments oldest first.
    fn list(&self, task_id: Id) -> impl Future<Output = DbResult<Vec<Comment>>> + Send;
}

/// Combined database interface.
///
/// Uses associated types so callers stay generic without dynamic dispatch.
pub trait Database: Send + Sync {
    type Entities<'a>: EntityRepository
    where
        Self: 'a;
    type Projects<'a>: ProjectRepository
    where
        Self: 'a;
    type Stages<'a>: StageRepository
    where
        Self: 'a;
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;
    type Comments<'a>: CommentRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the entity repository.
    fn entities(&self) -> Self::Entities<'_>;

    /// Get the project repository.
    fn projects(&self) -> Self::Projects<'_>;

    /// Get the stage repository.
    fn stages(&self) -> Self::Stages<'_>;

    /// Get the task repository.
    fn tasks(&self) -> Self::Tasks<'_>;

    /// Get the comment repository.
    fn comments(&self) -> Self::Comments<'_>;
}
