//! Services on top of [`Repository`].
//!
//! [`CrudService`] supplies the standard operations through default methods;
//! a concrete service only has to hand over its repository and can add
//! queries of its own.

mod score;

pub use score::ScoreService;

use crate::entity::{Entity, Student, Subject};
use crate::repository::Repository;
use crate::store::Database;
use anyhow::Result;

pub trait CrudService<'db> {
    type Entity: Entity;

    fn repository(&self) -> &Repository<'db, Self::Entity>;

    fn save(&self, entity: &Self::Entity) -> Result<()> {
        self.repository().insert(entity)
    }

    fn save_batch(&self, entities: &[Self::Entity]) -> Result<usize> {
        self.repository().insert_batch(entities)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Self::Entity>> {
        self.repository().select_by_id(id)
    }

    fn list(&self) -> Result<Vec<Self::Entity>> {
        self.repository().select_list()
    }

    fn update_by_id(&self, entity: &Self::Entity) -> Result<bool> {
        self.repository().update_by_id(entity)
    }

    fn remove_by_id(&self, id: i64) -> Result<bool> {
        self.repository().delete_by_id(id)
    }

    fn count(&self) -> Result<i64> {
        self.repository().count()
    }
}

pub struct StudentService<'db> {
    repo: Repository<'db, Student>,
}

impl<'db> StudentService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self {
            repo: Repository::new(db),
        }
    }
}

impl<'db> CrudService<'db> for StudentService<'db> {
    type Entity = Student;

    fn repository(&self) -> &Repository<'db, Student> {
        &self.repo
    }
}

pub struct SubjectService<'db> {
    repo: Repository<'db, Subject>,
}

impl<'db> SubjectService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self {
            repo: Repository::new(db),
        }
    }
}

impl<'db> CrudService<'db> for SubjectService<'db> {
    type Entity = Subject;

    fn repository(&self) -> &Repository<'db, Subject> {
        &self.repo
    }
}
