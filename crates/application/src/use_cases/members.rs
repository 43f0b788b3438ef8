//! Member use cases.
//!
//! Creation and modification stamp audit fields from the injected [`Clock`]
//! and the calling user.

use std::sync::Arc;

use memberdesk_domain::{Member, MemberUpdate, NewMember, generate_id};

use crate::ports::{Clock, SessionFactory};
use crate::{ApplicationError, ApplicationResult};

/// Input for creating a member.
#[derive(Debug, Clone)]
pub struct CreateMemberInput {
    /// The member payload.
    pub member: NewMember,
    /// The calling user, recorded as `createdBy`.
    pub caller: Option<String>,
}

/// Input for updating a member.
#[derive(Debug, Clone)]
pub struct UpdateMemberInput {
    /// Id of the member to update.
    pub id: String,
    /// Fields to change.
    pub changes: MemberUpdate,
    /// The calling user, recorded as `changedBy`.
    pub caller: Option<String>,
}

/// Member CRUD over a [`SessionFactory`].
#[derive(Clone)]
pub struct MemberService {
    sessions: Arc<dyn SessionFactory>,
    clock: Arc<dyn Clock>,
}

impl MemberService {
    /// Creates a new `MemberService`.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionFactory>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// Lists members ordered by sequence id, optionally restricted to `ids`.
    ///
    /// An empty filter returns every member.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn list(&self, ids: &[String]) -> ApplicationResult<Vec<Member>> {
        let session = self.sessions.create_read_only_session()?;
        let members = session.list_all().await?;
        if ids.is_empty() {
            return Ok(members);
        }
        Ok(members
            .into_iter()
            .filter(|member| ids.contains(&member.id))
            .collect())
    }

    /// Fetches a single member.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` if no member has the id.
    pub async fn get(&self, id: &str) -> ApplicationResult<Member> {
        let session = self.sessions.create_read_only_session()?;
        session
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("member '{id}'")))
    }

    /// Creates a member, generating an id when none is given.
    ///
    /// # Errors
    /// - Returns `ApplicationError::Conflict` if the id is already taken
    /// - Returns an error if the store cannot be written
    pub async fn create(&self, input: CreateMemberInput) -> ApplicationResult<Member> {
        let id = input
            .member
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_id);

        let member = Member {
            id,
            name: input.member.name,
            age: input.member.age,
            sequence_id: 0,
            created_at: self.clock.now().fixed_offset(),
            created_by: input.caller,
            changed_at: None,
            changed_by: None,
            email: input.member.email,
        };

        let session = self.sessions.create_session()?;
        let stored = session.insert(&member).await?;
        tracing::debug!(id = %stored.id, sequence_id = stored.sequence_id, "member created");
        Ok(stored)
    }

    /// Applies the given changes to an existing member.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` if no member has the id.
    pub async fn update(&self, input: UpdateMemberInput) -> ApplicationResult<Member> {
        let session = self.sessions.create_session()?;
        let mut member = session
            .get(&input.id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("member '{}'", input.id)))?;

        if let Some(name) = input.changes.name {
            member.name = Some(name);
        }
        if let Some(age) = input.changes.age {
            member.age = Some(age);
        }
        if let Some(email) = input.changes.email {
            member.email = Some(email);
        }
        member.changed_at = Some(self.clock.now().fixed_offset());
        member.changed_by = input.caller;

        session.update(&member).await
    }

    /// Deletes a member.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` if no member has the id.
    pub async fn delete(&self, id: &str) -> ApplicationResult<()> {
        let session = self.sessions.create_session()?;
        if session.delete(id).await? {
            Ok(())
        } else {
            Err(ApplicationError::NotFound(format!("member '{id}'")))
        }
    }
}
