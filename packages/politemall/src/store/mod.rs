//! Persistence seam for crawled records.
//!
//! The crawler never writes anywhere itself; callers hand its output to a
//! [`Store`]. Every write is an upsert keyed by ID.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Module, School, Semester, User};

#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_school(&self, school: &School) -> Result<()>;

    /// The user's school must already be stored.
    async fn upsert_user(&self, user: &User) -> Result<()>;

    async fn upsert_semesters(&self, semesters: &[Semester]) -> Result<()>;

    async fn upsert_modules(&self, modules: &[Module]) -> Result<()>;

    /// Upsert `modules` and associate each with the user.
    async fn upsert_user_modules(&self, user_id: &str, modules: &[Module]) -> Result<()>;

    /// Modules already associated with the user, empty if none.
    async fn get_user_modules(&self, user_id: &str) -> Result<Vec<Module>>;
}
