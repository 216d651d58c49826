//! User repository: CRUD plus reads that attach roles and profile.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{Role, User, UserProfile, UserRole};
use crate::domain::value_objects::{AssignedRole, UserDetails};
use crate::errors::StoreError;
use crate::repositories::generic::{Queryable, Repository};
use crate::repositories::unit_of_work::{Staged, UnitOfWork};
use crate::store::{Entity, Filter, Table};

pub struct UserRepository<'u> {
    uow: &'u mut UnitOfWork,
}

impl<'u> UserRepository<'u> {
    pub(crate) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self { uow }
    }

    fn base(&mut self) -> Repository<'_, User> {
        Repository::new(self.uow)
    }

    /// Bare users, no related rows
    pub async fn get_all(&mut self) -> Result<Vec<User>, StoreError> {
        self.base().get_all().await
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<UserDetails>, StoreError> {
        let user = self.base().get_by_id(id).await?;
        self.attach_one(user).await
    }

    pub fn add(&mut self, user: User) -> Result<Staged<User>, StoreError> {
        self.base().add(user)
    }

    pub fn update(&mut self, user: User) -> Result<User, StoreError> {
        self.base().update(user)
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().delete(id).await
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().exists(id).await
    }

    pub fn query(&mut self) -> Queryable<'_, User> {
        Queryable::new(self.uow)
    }

    /// Exact, case-sensitive match
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDetails>, StoreError> {
        let user = self.query().filter(Filter::eq("email", email)).first().await?;
        self.attach_one(user).await
    }

    pub async fn get_active_users(&mut self) -> Result<Vec<UserDetails>, StoreError> {
        let users = self
            .query()
            .filter(Filter::eq("is_active", true))
            .fetch_all()
            .await?;
        self.attach(users).await
    }

    /// Users holding an active assignment to the named role
    pub async fn get_users_by_role(&mut self, role_name: &str) -> Result<Vec<UserDetails>, StoreError> {
        let role = Queryable::<Role>::new(self.uow)
            .filter(Filter::eq("name", role_name))
            .first()
            .await?;
        let Some(role) = role else {
            return Ok(Vec::new());
        };

        let assignments = Queryable::<UserRole>::new(self.uow)
            .filter(Filter::eq("role_id", role.id))
            .filter(Filter::eq("is_active", true))
            .fetch_all()
            .await?;
        let user_ids: BTreeSet<i64> = assignments.iter().map(|a| a.user_id).collect();

        let users = self
            .query()
            .filter(Filter::in_list("id", user_ids))
            .fetch_all()
            .await?;
        self.attach(users).await
    }

    /// Stages a user and role assignments for it in the same batch. The
    /// assignments pick up the user's id when the batch is applied.
    pub fn add_with_roles(&mut self, user: User, role_ids: &[i64]) -> Result<Staged<User>, StoreError> {
        let position = self.uow.next_position();
        let staged = self.add(user)?;
        for role_id in role_ids {
            let mut record = UserRole::new(0, *role_id).to_record();
            record.id = None;
            self.uow.stage_child(record, position, "user_id")?;
        }
        Ok(staged)
    }

    async fn attach_one(&mut self, user: Option<User>) -> Result<Option<UserDetails>, StoreError> {
        match user {
            Some(user) => Ok(self.attach(vec![user]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Loads roles and profiles for all users in three queries
    async fn attach(&mut self, users: Vec<User>) -> Result<Vec<UserDetails>, StoreError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();

        let assignments = Queryable::<UserRole>::new(self.uow)
            .filter(Filter::in_list("user_id", user_ids.iter().copied()))
            .fetch_all()
            .await?;
        let role_ids: BTreeSet<i64> = assignments.iter().map(|a| a.role_id).collect();
        let roles: HashMap<i64, Role> = Queryable::<Role>::new(self.uow)
            .filter(Filter::in_list("id", role_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|role| (role.id, role))
            .collect();
        let mut profiles: HashMap<i64, UserProfile> = Queryable::<UserProfile>::new(self.uow)
            .filter(Filter::in_list("user_id", user_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();

        let mut by_user: HashMap<i64, Vec<AssignedRole>> = HashMap::new();
        for assignment in assignments {
            let role = roles
                .get(&assignment.role_id)
                .cloned()
                .ok_or(StoreError::MissingRow {
                    table: Table::Roles,
                    id: assignment.role_id,
                })?;
            by_user
                .entry(assignment.user_id)
                .or_default()
                .push(AssignedRole { assignment, role });
        }

        Ok(users
            .into_iter()
            .map(|user| UserDetails {
                roles: by_user.remove(&user.id).unwrap_or_default(),
                profile: profiles.remove(&user.id),
                user,
            })
            .collect())
    }
}
