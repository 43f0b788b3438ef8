//! Member persistence port

use async_trait::async_trait;
use memberdesk_domain::Member;

use crate::ApplicationResult;

/// Opens units of work against the member store.
pub trait SessionFactory: Send + Sync {
    /// Opens a session that can read and write.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    fn create_session(&self) -> ApplicationResult<Box<dyn MemberSession>>;

    /// Opens a session that rejects writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    fn create_read_only_session(&self) -> ApplicationResult<Box<dyn MemberSession>>;
}

/// A unit of work over the member table.
#[async_trait]
pub trait MemberSession: Send + Sync {
    /// Creates the schema if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    async fn initialize(&self) -> ApplicationResult<()>;

    /// Returns every member ordered by sequence id.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    async fn list_all(&self) -> ApplicationResult<Vec<Member>>;

    /// Returns the member with the given id, if any.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    async fn get(&self, id: &str) -> ApplicationResult<Option<Member>>;

    /// Inserts a member and returns it with its assigned sequence id.
    ///
    /// # Errors
    /// Returns `ApplicationError::Conflict` if the id is taken.
    async fn insert(&self, member: &Member) -> ApplicationResult<Member>;

    /// Replaces the stored member with the same id.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` if no such member exists.
    async fn update(&self, member: &Member) -> ApplicationResult<Member>;

    /// Deletes a member. Returns `false` if it did not exist.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    async fn delete(&self, id: &str) -> ApplicationResult<bool>;

    /// Removes every member.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    async fn clear(&self) -> ApplicationResult<()>;
}
