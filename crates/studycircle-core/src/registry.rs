//! The group registry: group creation and the membership / join-request
//! state machine.
//!
//! Per (group, user) pair there are four states: none, requested, member,
//! and creator (a permanent sub-state of member).  Transitions:
//!
//! ```text
//! none ──request_join──────▶ requested
//! none ──add_member────────▶ member
//! requested ──accept───────▶ member
//! requested ──reject/cancel▶ none
//! member ──remove_member───▶ none        (never for the creator)
//! ```
//!
//! A member never also holds a pending request: `members` and
//! `join_requests` are disjoint at all times.  Every mutation loads the
//! affected collections, mutates, and persists through a single store
//! commit, so the reciprocal `User::joined_groups` view can never drift
//! from `Group::members`.

use studycircle_store::{Group, GroupId, MeetingSchedule, Store, User, UserId, Visibility};
use tracing::{info, warn};

use crate::error::{CircleError, Result};

/// Caller-supplied fields for [`Registry::create_group`].
#[derive(Debug, Clone)]
pub struct CreateGroupParams {
    pub subject: String,
    pub course: String,
    pub description: String,
    pub max_size: u32,
    pub visibility: Visibility,
    pub meeting_schedule: MeetingSchedule,
}

/// A user's relationship to a group, as derived from the group record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// No membership and no pending request.
    None,
    /// A join request is pending.
    Requested,
    /// A member, but not the creator.
    Member,
    /// The group's creator.
    Creator,
}

/// Membership and join-request operations over the persisted group set.
pub struct Registry<'a> {
    store: &'a Store,
}

impl<'a> Registry<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a group with `creator` as its first member.
    ///
    /// The new group record and the creator's updated `joined_groups` /
    /// `created_groups` are persisted in one commit, so either both sides
    /// of the relation land or neither does.
    pub fn create_group(&self, creator_id: UserId, params: CreateGroupParams) -> Result<Group> {
        validate_params(&params)?;

        let mut users = self.store.load_users()?;
        let mut groups = self.store.load_groups()?;

        let creator = users
            .iter_mut()
            .find(|u| u.id == creator_id)
            .ok_or(CircleError::UserNotFound)?;

        let group = Group {
            id: GroupId::new(),
            creator_id,
            subject: params.subject,
            course: params.course,
            description: params.description,
            max_size: params.max_size,
            visibility: params.visibility,
            meeting_schedule: params.meeting_schedule,
            members: vec![creator_id],
            join_requests: vec![],
            announcements: vec![],
            resources: vec![],
            chat_messages: vec![],
        };

        creator.joined_groups.push(group.id);
        creator.created_groups.push(group.id);
        groups.push(group.clone());

        self.store.commit(&users, &groups)?;

        info!(group_id = %group.id, creator = %creator_id, "group created");
        Ok(group)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Add `user_id` to the group's members, and the group to the user's
    /// `joined_groups`, in one commit.
    ///
    /// Capacity is enforced here: joining a group that already has
    /// `max_size` members fails with [`CircleError::GroupFull`].
    pub fn add_member(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        let mut users = self.store.load_users()?;
        let mut groups = self.store.load_groups()?;

        let group = find_group_mut(&mut groups, group_id)?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(CircleError::UserNotFound)?;

        insert_member(group, user)?;

        self.store.commit(&users, &groups)?;
        info!(%group_id, %user_id, "member added");
        Ok(())
    }

    /// Remove `user_id` from the group, symmetrically updating the user's
    /// `joined_groups`.
    ///
    /// The creator cannot leave their own group; a group always keeps its
    /// creator as a member.
    pub fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        let mut users = self.store.load_users()?;
        let mut groups = self.store.load_groups()?;

        let group = find_group_mut(&mut groups, group_id)?;
        if user_id == group.creator_id {
            warn!(%group_id, %user_id, "creator attempted to leave own group");
            return Err(CircleError::CreatorCannotLeave);
        }
        if !group.members.contains(&user_id) {
            warn!(%group_id, %user_id, "remove_member: not a member");
            return Err(CircleError::NotMember);
        }

        group.members.retain(|id| *id != user_id);
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.joined_groups.retain(|id| *id != group_id);
        }

        self.store.commit(&users, &groups)?;
        info!(%group_id, %user_id, "member removed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Join requests
    // ------------------------------------------------------------------

    /// File a join request for `user_id`.
    ///
    /// Offered by the UI for private groups only, but valid for any group.
    pub fn request_join(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        let mut groups = self.store.load_groups()?;

        let group = find_group_mut(&mut groups, group_id)?;
        if group.members.contains(&user_id) || group.join_requests.contains(&user_id) {
            warn!(%group_id, %user_id, "request_join: already a member or requested");
            return Err(CircleError::AlreadyMemberOrRequested);
        }

        group.join_requests.push(user_id);
        self.store.save_groups(&groups)?;

        info!(%group_id, %user_id, "join request filed");
        Ok(())
    }

    /// Withdraw a pending join request.  A second call for the same pair
    /// fails with [`CircleError::NoSuchRequest`] and changes nothing.
    pub fn cancel_join_request(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        self.drop_request(group_id, user_id, "join request cancelled")
    }

    /// Reject a pending join request.  Grants nothing.
    pub fn reject_join_request(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        self.drop_request(group_id, user_id, "join request rejected")
    }

    fn drop_request(&self, group_id: GroupId, user_id: UserId, outcome: &str) -> Result<()> {
        let mut groups = self.store.load_groups()?;

        let group = find_group_mut(&mut groups, group_id)?;
        if !group.join_requests.contains(&user_id) {
            warn!(%group_id, %user_id, "no pending join request");
            return Err(CircleError::NoSuchRequest);
        }

        group.join_requests.retain(|id| *id != user_id);
        self.store.save_groups(&groups)?;

        info!(%group_id, %user_id, outcome);
        Ok(())
    }

    /// Accept a pending join request, granting membership.
    ///
    /// Request removal and member addition happen in one commit: if the
    /// add path fails (unknown user, group at capacity) the request stays
    /// pending, so a request can never silently vanish without membership
    /// being granted.
    pub fn accept_join_request(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        let mut users = self.store.load_users()?;
        let mut groups = self.store.load_groups()?;

        let group = find_group_mut(&mut groups, group_id)?;
        if !group.join_requests.contains(&user_id) {
            warn!(%group_id, %user_id, "accept: no pending join request");
            return Err(CircleError::NoSuchRequest);
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(CircleError::UserNotFound)?;

        // Checks happen before any mutation, so an error here leaves the
        // request pending.
        insert_member(group, user)?;
        group.join_requests.retain(|id| *id != user_id);

        self.store.commit(&users, &groups)?;
        info!(%group_id, %user_id, "join request accepted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Fetch a single group by id.
    pub fn find_by_id(&self, group_id: GroupId) -> Result<Group> {
        self.store
            .load_groups()?
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or(CircleError::GroupNotFound)
    }

    /// List all groups.
    pub fn list(&self) -> Result<Vec<Group>> {
        Ok(self.store.load_groups()?)
    }

    /// Groups the user belongs to.
    pub fn joined_by(&self, user_id: UserId) -> Result<Vec<Group>> {
        Ok(self
            .store
            .load_groups()?
            .into_iter()
            .filter(|g| g.members.contains(&user_id))
            .collect())
    }

    /// Groups the user created.
    pub fn created_by(&self, user_id: UserId) -> Result<Vec<Group>> {
        Ok(self
            .store
            .load_groups()?
            .into_iter()
            .filter(|g| g.creator_id == user_id)
            .collect())
    }

    /// Pending join requests for a group, in request order.
    pub fn pending_requests(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        Ok(self.find_by_id(group_id)?.join_requests)
    }

    /// The user's relationship to the group.
    pub fn membership(&self, group_id: GroupId, user_id: UserId) -> Result<Membership> {
        let group = self.find_by_id(group_id)?;
        Ok(if group.creator_id == user_id {
            Membership::Creator
        } else if group.members.contains(&user_id) {
            Membership::Member
        } else if group.join_requests.contains(&user_id) {
            Membership::Requested
        } else {
            Membership::None
        })
    }
}

/// Shared add-member path for direct joins and accepted requests.
///
/// Validates conflict and capacity, then updates both sides of the
/// relation in memory.  The caller persists.
fn insert_member(group: &mut Group, user: &mut User) -> Result<()> {
    if group.members.contains(&user.id) {
        warn!(group_id = %group.id, user_id = %user.id, "already a member");
        return Err(CircleError::AlreadyMember);
    }
    if group.members.len() as u32 >= group.max_size {
        warn!(group_id = %group.id, user_id = %user.id, "group full");
        return Err(CircleError::GroupFull);
    }

    group.members.push(user.id);
    if !user.joined_groups.contains(&group.id) {
        user.joined_groups.push(group.id);
    }
    Ok(())
}

fn find_group_mut(groups: &mut [Group], group_id: GroupId) -> Result<&mut Group> {
    groups
        .iter_mut()
        .find(|g| g.id == group_id)
        .ok_or(CircleError::GroupNotFound)
}

fn validate_params(params: &CreateGroupParams) -> Result<()> {
    if params.subject.trim().is_empty() {
        return Err(CircleError::InvalidGroupParams("subject must not be empty"));
    }
    if params.course.trim().is_empty() {
        return Err(CircleError::InvalidGroupParams("course must not be empty"));
    }
    if params.description.trim().is_empty() {
        return Err(CircleError::InvalidGroupParams(
            "description must not be empty",
        ));
    }
    if params.max_size < 2 {
        return Err(CircleError::InvalidGroupParams("max size must be at least 2"));
    }
    if params.meeting_schedule.days_of_week.is_empty() {
        return Err(CircleError::InvalidGroupParams(
            "at least one meeting day is required",
        ));
    }
    if params.meeting_schedule.end_time <= params.meeting_schedule.start_time {
        return Err(CircleError::InvalidGroupParams(
            "end time must be after start time",
        ));
    }
    Ok(())
}
