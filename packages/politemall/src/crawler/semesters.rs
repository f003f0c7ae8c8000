use siren::Entity;
use tracing::{info, warn};
use url::Url;

use super::Crawler;
use crate::api::LmsApi;
use crate::endpoints::semester_search_url;
use crate::error::{PolitemallError, Result};
use crate::types::Semester;

/// Semesters visible to the user, plus the tenant their actions point at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemesterListing {
    pub semesters: Vec<Semester>,
    /// Tenant ID taken from the host of the first semester action, if any.
    pub discovered_tenant_id: Option<String>,
}

impl<A: LmsApi + ?Sized> Crawler<'_, A> {
    pub async fn semesters(&self) -> Result<SemesterListing> {
        let url = semester_search_url(self.api.site_url(), self.user_id.as_str())?;
        let search = self.api.fetch_entity(&url).await?;

        let listing = parse_semesters(&search);
        if let Some(discovered) = listing.discovered_tenant_id.as_deref() {
            if discovered != self.tenant_id {
                warn!(
                    tenant_id = self.tenant_id,
                    discovered, "Semester actions point at a different tenant"
                );
            }
        }

        info!(semesters = listing.semesters.len(), "Fetched semesters");
        Ok(listing)
    }
}

/// Each action of the search document is one semester (not its links).
pub fn parse_semesters(search: &Entity) -> SemesterListing {
    let semesters = search
        .actions
        .iter()
        .map(|action| Semester {
            id: action.name.clone(),
            name: action.title.trim().to_string(),
        })
        .collect();

    let discovered_tenant_id = search
        .actions
        .first()
        .and_then(|action| tenant_from_href(&action.href).ok());

    SemesterListing {
        semesters,
        discovered_tenant_id,
    }
}

/// First label of the host, e.g. `746e9230` from
/// `https://746e9230.organizations.api.brightspace.com/332340`.
pub fn tenant_from_href(href: &str) -> Result<String> {
    let url = Url::parse(href).map_err(|source| PolitemallError::InvalidUrl {
        url: href.to_string(),
        source,
    })?;

    url.host_str()
        .and_then(|host| host.split('.').next())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PolitemallError::InvalidId {
            href: href.to_string(),
            reason: "URL has no host",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerifiedUserId;
    use crate::endpoints::Endpoints;
    use crate::testing::MockApi;
    use serde_json::json;

    const SEARCH: &str =
        "https://nplms.polite.edu.sg/d2l/api/le/manageCourses/courses-searches/490586/BySemester?desc=1";

    fn search_document() -> serde_json::Value {
        json!({
            "actions": [
                {
                    "name": "6656",
                    "title": "  AY2024/25 Semester 1",
                    "method": "GET",
                    "href": "https://746e9230.organizations.api.brightspace.com/6656/search"
                },
                {
                    "name": "6657",
                    "title": "AY2024/25 Semester 2 ",
                    "method": "GET",
                    "href": "https://746e9230.organizations.api.brightspace.com/6657/search"
                }
            ],
            "links": [{ "rel": ["self"], "href": SEARCH }]
        })
    }

    #[test]
    fn test_parse_semesters() {
        let entity: Entity = serde_json::from_value(search_document()).unwrap();
        let listing = parse_semesters(&entity);

        assert_eq!(
            listing.semesters,
            vec![
                Semester {
                    id: "6656".into(),
                    name: "AY2024/25 Semester 1".into()
                },
                Semester {
                    id: "6657".into(),
                    name: "AY2024/25 Semester 2".into()
                },
            ]
        );
        assert_eq!(listing.discovered_tenant_id.as_deref(), Some("746e9230"));
    }

    #[test]
    fn test_links_are_not_semesters() {
        let entity: Entity = serde_json::from_value(json!({
            "links": [{ "rel": ["self"], "href": SEARCH }]
        }))
        .unwrap();
        let listing = parse_semesters(&entity);

        assert!(listing.semesters.is_empty());
        assert_eq!(listing.discovered_tenant_id, None);
    }

    #[test]
    fn test_tenant_from_href() {
        assert_eq!(
            tenant_from_href("https://746e9230-82d6.enrollments.api.brightspace.com/users/1").unwrap(),
            "746e9230-82d6"
        );
        assert!(tenant_from_href("not a url").is_err());
    }

    #[tokio::test]
    async fn test_semesters_fetches_site_search() {
        let api = MockApi::new(Url::parse("https://nplms.polite.edu.sg/").unwrap())
            .with_entity(SEARCH, search_document());
        let endpoints = Endpoints::default();
        let user_id = VerifiedUserId::new("490586");
        let crawler = Crawler::new(&api, &endpoints, "746e9230", &user_id);

        let listing = crawler.semesters().await.unwrap();
        assert_eq!(listing.semesters.len(), 2);
    }
}
