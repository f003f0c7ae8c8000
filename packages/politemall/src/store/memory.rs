//! In-memory store for the CLI and tests. Data is lost on exit.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{PolitemallError, Result};
use crate::types::{Module, School, Semester, User};

/// A write referenced a record that is not stored.
#[derive(Debug, Error)]
#[error("{kind} {id:?} does not exist")]
pub struct MissingReference {
    pub kind: &'static str,
    pub id: String,
}

fn missing(kind: &'static str, id: &str) -> PolitemallError {
    PolitemallError::Store(Box::new(MissingReference {
        kind,
        id: id.to_string(),
    }))
}

#[derive(Default)]
struct Tables {
    schools: HashMap<String, School>,
    users: HashMap<String, User>,
    semesters: HashMap<String, Semester>,
    modules: HashMap<String, Module>,
    user_modules: HashMap<String, BTreeSet<String>>,
}

/// Upserts overwrite by ID; a user's school must exist before the user.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn school(&self, id: &str) -> Option<School> {
        self.tables.read().await.schools.get(id).cloned()
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.tables.read().await.users.get(id).cloned()
    }

    pub async fn semester_count(&self) -> usize {
        self.tables.read().await.semesters.len()
    }

    pub async fn module_count(&self) -> usize {
        self.tables.read().await.modules.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_school(&self, school: &School) -> Result<()> {
        self.tables
            .write()
            .await
            .schools
            .insert(school.id.clone(), school.clone());
        Ok(())
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.schools.contains_key(&user.school) {
            return Err(missing("school", &user.school));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn upsert_semesters(&self, semesters: &[Semester]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for semester in semesters {
            tables.semesters.insert(semester.id.clone(), semester.clone());
        }
        Ok(())
    }

    async fn upsert_modules(&self, modules: &[Module]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for module in modules {
            tables.modules.insert(module.id.clone(), module.clone());
        }
        Ok(())
    }

    async fn upsert_user_modules(&self, user_id: &str, modules: &[Module]) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(user_id) {
            return Err(missing("user", user_id));
        }

        for module in modules {
            tables.modules.insert(module.id.clone(), module.clone());
        }
        tables
            .user_modules
            .entry(user_id.to_string())
            .or_default()
            .extend(modules.iter().map(|m| m.id.clone()));
        Ok(())
    }

    async fn get_user_modules(&self, user_id: &str) -> Result<Vec<Module>> {
        let tables = self.tables.read().await;
        let Some(ids) = tables.user_modules.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| tables.modules.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    fn school() -> School {
        School {
            id: "6606".into(),
            name: "Ngee Ann Polytechnic".into(),
        }
    }

    fn user() -> User {
        User {
            id: "490586".into(),
            name: "JOHN DOE".into(),
            school: "6606".into(),
        }
    }

    fn module(id: &str, name: &str) -> Module {
        Module {
            id: id.into(),
            name: name.into(),
            code: format!("C{id}"),
            semester_id: "6656".into(),
        }
    }

    #[tokio::test]
    async fn test_user_requires_school() {
        let store = MemoryStore::new();

        let err = store.upsert_user(&user()).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.to_string(), "store error: school \"6606\" does not exist");

        store.upsert_school(&school()).await.unwrap();
        store.upsert_user(&user()).await.unwrap();
        assert_eq!(store.user("490586").await, Some(user()));
    }

    #[tokio::test]
    async fn test_user_modules() {
        let store = MemoryStore::new();
        store.upsert_school(&school()).await.unwrap();
        store.upsert_user(&user()).await.unwrap();

        assert!(store.get_user_modules("490586").await.unwrap().is_empty());

        store
            .upsert_user_modules("490586", &[module("2", "Two"), module("1", "One")])
            .await
            .unwrap();
        let ids: Vec<_> = store
            .get_user_modules("490586")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = MemoryStore::new();
        store.upsert_school(&school()).await.unwrap();
        store.upsert_user(&user()).await.unwrap();

        store
            .upsert_user_modules("490586", &[module("1", "Old")])
            .await
            .unwrap();
        store
            .upsert_user_modules("490586", &[module("1", "New")])
            .await
            .unwrap();

        let modules = store.get_user_modules("490586").await.unwrap();
        assert_eq!(modules, vec![module("1", "New")]);
        assert_eq!(store.module_count().await, 1);
    }

    #[tokio::test]
    async fn test_user_modules_require_user() {
        let store = MemoryStore::new();
        assert!(store
            .upsert_user_modules("490586", &[module("1", "One")])
            .await
            .is_err());
    }
}
