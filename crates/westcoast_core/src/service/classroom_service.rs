//! Classroom use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/edit/delete for classrooms.
//! - Guard the title natural key on create and edit.
//!
//! # Invariants
//! - Each write runs its uniqueness read and its write in one unit of work.
//! - Edits replace only `name`, `title`, `start` and `end`; descriptive
//!   fields keep their stored values.

use crate::model::classroom::{Classroom, ClassroomDetails, ClassroomId};
use crate::repo::classroom_repo::ClassroomRepository;
use crate::repo::store::{Collection, RecordRef, RepoError};
use crate::service::error::{Conflict, ServiceError, ServiceResult};
use crate::service::uniqueness::{UniquenessCheck, UniquenessValidator};
use log::{info, warn};

/// Classroom service facade over repository implementations.
pub struct ClassroomService<R: ClassroomRepository> {
    repo: R,
}

impl<R: ClassroomRepository> ClassroomService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every classroom in store order.
    pub fn list_classrooms(&self) -> ServiceResult<Vec<Classroom>> {
        Ok(self.repo.list_classrooms()?)
    }

    /// Read-only catalogue view: classrooms ordered by start, then id.
    pub fn classroom_catalogue(&self) -> ServiceResult<Vec<Classroom>> {
        let mut classrooms = self.repo.list_classrooms()?;
        classrooms.sort_by_key(|classroom| (classroom.details.start, classroom.classroom_id));
        Ok(classrooms)
    }

    /// Gets one classroom by id.
    pub fn get_classroom(&self, id: ClassroomId) -> ServiceResult<Classroom> {
        self.repo
            .get_classroom(id)?
            .ok_or(ServiceError::NotFound(RecordRef::Classroom(id)))
    }

    /// Creates a classroom after validating fields and title uniqueness.
    pub fn create_classroom(&self, candidate: &ClassroomDetails) -> ServiceResult<ClassroomId> {
        candidate.validate()?;

        let id = self.repo.atomically(|| {
            self.ensure_title_unique(&candidate.title, None)?;
            self.repo
                .create_classroom(candidate)
                .map_err(|err| self.lift_write_error(err, None))
        });

        match &id {
            Ok(id) => info!("event=classroom_create module=service status=ok classroom_id={id}"),
            Err(err) => log_write_failure("classroom_create", err),
        }
        id
    }

    /// Edits `name`, `title`, `start` and `end` of an existing classroom and
    /// returns the stored result.
    pub fn update_classroom(
        &self,
        id: ClassroomId,
        edit: &ClassroomDetails,
    ) -> ServiceResult<Classroom> {
        let updated = self.repo.atomically(|| {
            let mut details = self.get_classroom(id)?.details;
            details.apply_edit(edit);
            details.validate()?;
            self.ensure_title_unique(&details.title, Some(id))?;
            self.repo
                .update_classroom(id, &details)
                .map_err(|err| self.lift_write_error(err, Some(id)))?;
            Ok::<_, ServiceError>(Classroom {
                classroom_id: id,
                details,
            })
        });

        match &updated {
            Ok(_) => info!("event=classroom_update module=service status=ok classroom_id={id}"),
            Err(err) => log_write_failure("classroom_update", err),
        }
        updated
    }

    /// Deletes a classroom permanently.
    pub fn delete_classroom(&self, id: ClassroomId) -> ServiceResult<()> {
        let deleted = self
            .repo
            .atomically(|| Ok::<_, ServiceError>(self.repo.delete_classroom(id)?));

        match &deleted {
            Ok(()) => info!("event=classroom_delete module=service status=ok classroom_id={id}"),
            Err(err) => log_write_failure("classroom_delete", err),
        }
        deleted
    }

    // Index rejections carry only the normalized key; report the stored title.
    fn lift_write_error(&self, err: RepoError, exclude: Option<ClassroomId>) -> ServiceError {
        if let RepoError::UniqueViolation { key, .. } = &err {
            if let Ok(Some(existing)) = self.repo.find_classroom_by_title_key(key, exclude) {
                return ServiceError::Conflict(Conflict::on(
                    Collection::Classrooms,
                    existing.details.title,
                ));
            }
        }
        err.into()
    }

    fn ensure_title_unique(&self, title: &str, exclude: Option<ClassroomId>) -> ServiceResult<()> {
        match UniquenessValidator::new(&self.repo).check_classroom_title_unique(title, exclude)? {
            UniquenessCheck::Unique => Ok(()),
            UniquenessCheck::Conflict { existing } => Err(ServiceError::Conflict(Conflict::on(
                Collection::Classrooms,
                existing,
            ))),
        }
    }
}

pub(crate) fn log_write_failure(event: &str, err: &ServiceError) {
    match err {
        ServiceError::Validation(_) => {
            info!("event={event} module=service status=rejected reason=validation")
        }
        ServiceError::Conflict(conflict) => warn!(
            "event={event} module=service status=rejected reason=conflict collection={}",
            conflict.collection
        ),
        ServiceError::NotFound(record) => {
            info!("event={event} module=service status=not_found target={record}")
        }
        ServiceError::Repo(err) => warn!("event={event} module=service status=error error={err}"),
    }
}
