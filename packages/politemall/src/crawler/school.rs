use siren::Entity;
use tracing::{info, warn};

use super::ids::linked_id;
use super::Crawler;
use crate::api::LmsApi;
use crate::endpoints::REL_ORGANIZATION;
use crate::error::{DocumentContext, Result};
use crate::types::{School, User};

impl<A: LmsApi + ?Sized> Crawler<'_, A> {
    /// The crawled user together with their school.
    ///
    /// The school is the organization linked from the user's enrollment root;
    /// the user's name comes from the site's whoami endpoint. The user is always
    /// keyed on the verified ID, never on the whoami identifier.
    pub async fn user_and_school(&self) -> Result<(User, School)> {
        let enrollments = self.api.fetch_entity(&self.enrollments_url()).await?;
        let organization = enrollments
            .link(&[REL_ORGANIZATION])
            .in_document("user enrollment entity")?;

        let school_entity = self.api.fetch_entity(&organization.href).await?;
        let school = parse_school(&school_entity)?;

        let who = self.api.who_am_i().await?;
        if who.identifier != self.user_id.as_str() {
            warn!(
                user_id = %self.user_id,
                whoami = %who.identifier,
                "whoami identifier differs from verified user"
            );
        }

        let user = User {
            id: self.user_id.as_str().to_string(),
            name: who.first_name,
            school: school.id.clone(),
        };
        info!(user_id = %user.id, school_id = %school.id, "Fetched user and school");
        Ok((user, school))
    }
}

/// A school from its organization entity.
pub fn parse_school(entity: &Entity) -> Result<School> {
    let name = entity
        .require_str("name")
        .in_document("school organization entity")?;
    let id = linked_id(entity, &["self"], "school organization entity")?;

    Ok(School {
        id,
        name: name.to_string(),
    })
}
