//! User aggregation service over the student and teacher collections.
//!
//! # Responsibility
//! - Present students and teachers as one `User` collection.
//! - Route edits and deletes to the collection a user was found in.
//! - Guard the SSN natural key per kind on create and edit.
//!
//! # Invariants
//! - `list_users` yields every teacher before any student.
//! - Bare-id lookups resolve teachers first; a student sharing the id is
//!   only reachable through `UserRef`.
//! - Callers never name the concrete kind for bare-id edits or deletes.

use crate::model::person::{PersonProfile, User, UserId, UserKind, UserRef};
use crate::repo::person_repo::PersonRepository;
use crate::repo::store::{Collection, RecordRef, RepoError, RepoResult};
use crate::service::classroom_service::log_write_failure;
use crate::service::error::{Conflict, ServiceError, ServiceResult};
use crate::service::uniqueness::{UniquenessCheck, UniquenessValidator};
use log::{info, warn};

/// Lookup order for bare user ids.
const LOOKUP_ORDER: [UserKind; 2] = [UserKind::Teacher, UserKind::Student];

/// Per-kind record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub teachers: usize,
    pub students: usize,
}

impl UserCounts {
    pub fn total(&self) -> usize {
        self.teachers + self.students
    }
}

/// User aggregator facade over a person repository.
pub struct UserService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all teachers followed by all students, each in store order.
    pub fn list_users(&self) -> ServiceResult<Vec<User>> {
        let mut users = Vec::new();
        for kind in LOOKUP_ORDER {
            users.extend(self.repo.list_people(kind)?);
        }
        Ok(users)
    }

    /// Counts teachers and students.
    pub fn count_users(&self) -> ServiceResult<UserCounts> {
        Ok(UserCounts {
            teachers: self.repo.count_people(UserKind::Teacher)?,
            students: self.repo.count_people(UserKind::Student)?,
        })
    }

    /// Gets the first user with `id` in aggregation order (teachers first).
    pub fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.find_user(id)?
            .ok_or(ServiceError::NotFound(RecordRef::AnyUser(id)))
    }

    /// Gets exactly the user addressed by `user_ref`.
    pub fn get_user_by_ref(&self, user_ref: UserRef) -> ServiceResult<User> {
        self.repo
            .get_person(user_ref.kind, user_ref.id)?
            .ok_or(ServiceError::NotFound(RecordRef::User(user_ref)))
    }

    /// Creates a student after validating fields and SSN uniqueness among
    /// students.
    pub fn create_student(&self, candidate: &PersonProfile) -> ServiceResult<UserId> {
        self.create_person(UserKind::Student, candidate)
    }

    /// Creates a teacher after validating fields and SSN uniqueness among
    /// teachers.
    pub fn create_teacher(&self, candidate: &PersonProfile) -> ServiceResult<UserId> {
        self.create_person(UserKind::Teacher, candidate)
    }

    /// Overwrites the shared profile of the user found by `get_user(id)` and
    /// writes it back to that user's collection.
    pub fn update_user(&self, id: UserId, fields: &PersonProfile) -> ServiceResult<User> {
        let updated = self.repo.atomically(|| {
            let user = self
                .find_user(id)?
                .ok_or(ServiceError::NotFound(RecordRef::AnyUser(id)))?;
            self.overwrite_profile(user, fields)
        });
        log_user_write("user_update", &updated);
        updated
    }

    /// Overwrites the shared profile of exactly the user addressed by
    /// `user_ref`.
    pub fn update_user_by_ref(
        &self,
        user_ref: UserRef,
        fields: &PersonProfile,
    ) -> ServiceResult<User> {
        let updated = self.repo.atomically(|| {
            let user = self.get_user_by_ref(user_ref)?;
            self.overwrite_profile(user, fields)
        });
        log_user_write("user_update", &updated);
        updated
    }

    /// Deletes the user found by `get_user(id)` and returns which record was
    /// removed.
    pub fn delete_user(&self, id: UserId) -> ServiceResult<UserRef> {
        let deleted = self.repo.atomically(|| {
            let user = self
                .find_user(id)?
                .ok_or(ServiceError::NotFound(RecordRef::AnyUser(id)))?;
            self.remove(&user)
        });
        log_user_delete(&deleted);
        deleted
    }

    /// Deletes exactly the user addressed by `user_ref`.
    pub fn delete_user_by_ref(&self, user_ref: UserRef) -> ServiceResult<()> {
        let deleted = self.repo.atomically(|| {
            let user = self.get_user_by_ref(user_ref)?;
            self.remove(&user)
        });
        log_user_delete(&deleted);
        deleted.map(|_| ())
    }

    fn create_person(&self, kind: UserKind, candidate: &PersonProfile) -> ServiceResult<UserId> {
        let created = candidate.validate().map_err(ServiceError::from).and_then(|()| {
            self.repo.atomically(|| {
                self.ensure_ssn_unique(kind, &candidate.social_security_number, None)?;
                self.repo
                    .create_person(kind, candidate)
                    .map_err(|err| self.lift_write_error(kind, err, None))
            })
        });

        match &created {
            Ok(id) => info!(
                "event=user_create module=service status=ok kind={kind} user_id={id}"
            ),
            Err(err) => log_write_failure("user_create", err),
        }
        created
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut matches = Vec::new();
        for kind in LOOKUP_ORDER {
            if let Some(user) = self.repo.get_person(kind, id)? {
                matches.push(user);
            }
        }

        if matches.len() > 1 {
            warn!(
                "event=user_lookup module=service status=ambiguous user_id={id} matches={} resolved={}",
                matches.len(),
                matches[0].kind()
            );
        }
        Ok(matches.into_iter().next())
    }

    fn overwrite_profile(&self, mut user: User, fields: &PersonProfile) -> ServiceResult<User> {
        fields.validate()?;
        self.ensure_ssn_unique(
            user.kind(),
            &fields.social_security_number,
            Some(user.user_id()),
        )?;
        *user.profile_mut() = fields.clone();

        let (kind, id) = (user.kind(), user.user_id());
        let written = match &user {
            User::Teacher(teacher) => {
                self.repo
                    .update_person(UserKind::Teacher, teacher.user_id, &teacher.profile)
            }
            User::Student(student) => {
                self.repo
                    .update_person(UserKind::Student, student.user_id, &student.profile)
            }
        };
        written.map_err(|err| self.lift_write_error(kind, err, Some(id)))?;
        Ok(user)
    }

    fn remove(&self, user: &User) -> ServiceResult<UserRef> {
        match user {
            User::Teacher(teacher) => self.repo.delete_person(UserKind::Teacher, teacher.user_id)?,
            User::Student(student) => self.repo.delete_person(UserKind::Student, student.user_id)?,
        }
        Ok(user.user_ref())
    }

    // Index rejections carry only the normalized key; report the stored SSN.
    fn lift_write_error(
        &self,
        kind: UserKind,
        err: RepoError,
        exclude: Option<UserId>,
    ) -> ServiceError {
        if let RepoError::UniqueViolation { key, .. } = &err {
            if let Ok(Some(existing)) = self.repo.find_person_by_ssn_key(kind, key, exclude) {
                return ServiceError::Conflict(Conflict::on(
                    Collection::from(kind),
                    existing.profile().social_security_number.clone(),
                ));
            }
        }
        err.into()
    }

    fn ensure_ssn_unique(
        &self,
        kind: UserKind,
        ssn: &str,
        exclude: Option<UserId>,
    ) -> ServiceResult<()> {
        match UniquenessValidator::new(&self.repo).check_person_ssn_unique(kind, ssn, exclude)? {
            UniquenessCheck::Unique => Ok(()),
            UniquenessCheck::Conflict { existing } => Err(ServiceError::Conflict(Conflict::on(
                Collection::from(kind),
                existing,
            ))),
        }
    }
}

fn log_user_write(event: &str, result: &ServiceResult<User>) {
    match result {
        Ok(user) => info!(
            "event={event} module=service status=ok target={}",
            user.user_ref()
        ),
        Err(err) => log_write_failure(event, err),
    }
}

fn log_user_delete(result: &ServiceResult<UserRef>) {
    match result {
        Ok(user_ref) => info!("event=user_delete module=service status=ok target={user_ref}"),
        Err(err) => log_write_failure("user_delete", err),
    }
}
