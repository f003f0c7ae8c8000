//! URL construction for the two APIs POLITEMall is built on.
//!
//! `*.polite.edu.sg` (the "site") authenticates with the `d2lSessionVal` /
//! `d2lSecureSessionVal` cookies, while `*.api.brightspace.com` (hypermedia)
//! authenticates with a bearer JWT and is partitioned by tenant subdomain.

use url::Url;

use crate::error::{PolitemallError, Result};

pub const DEFAULT_SITE_URL_TEMPLATE: &str = "https://{subdomain}.polite.edu.sg/";
pub const DEFAULT_BRIGHTSPACE_DOMAIN: &str = "api.brightspace.com";

/// Link relation of an enrollment / user pointing at its organization.
pub const REL_ORGANIZATION: &str = "https://api.brightspace.com/rels/organization";
/// Link relation of a course organization pointing at its semester.
pub const REL_PARENT_SEMESTER: &str = "https://api.brightspace.com/rels/parent-semester";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    site_url_template: String,
    brightspace_domain: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL_TEMPLATE, DEFAULT_BRIGHTSPACE_DOMAIN)
    }
}

impl Endpoints {
    pub fn new(site_url_template: impl Into<String>, brightspace_domain: impl Into<String>) -> Self {
        Self {
            site_url_template: site_url_template.into(),
            brightspace_domain: brightspace_domain.into(),
        }
    }

    pub fn site_url_template(&self) -> &str {
        &self.site_url_template
    }

    pub fn brightspace_domain(&self) -> &str {
        &self.brightspace_domain
    }

    /// Base URL of the POLITEMall site for a subdomain such as `nplms`.
    ///
    /// The session cookies are scoped to exactly this URL.
    pub fn site_base_url(&self, subdomain: &str) -> Result<Url> {
        let valid = !subdomain.is_empty()
            && subdomain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(PolitemallError::InvalidSubdomain {
                subdomain: subdomain.to_string(),
            });
        }

        let mut raw = self.site_url_template.replace("{subdomain}", subdomain);
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|_| PolitemallError::InvalidSubdomain {
            subdomain: subdomain.to_string(),
        })
    }

    /// Enrollment root of a user; its sub-entities are the user's enrollments.
    pub fn enrollments_url(&self, tenant_id: &str, user_id: &str) -> String {
        format!(
            "https://{}.enrollments.{}/users/{}",
            tenant_id, self.brightspace_domain, user_id
        )
    }

    /// Sequence document of a module with units, lessons and activities embedded.
    pub fn sequence_url(&self, tenant_id: &str, module_id: &str) -> String {
        format!(
            "https://{}.sequences.{}/{}?deepEmbedEntities=1&embedDepth=1&filterOnDatesAndDepth=0",
            tenant_id, self.brightspace_domain, module_id
        )
    }
}

/// Semester search document on the site; one action per semester.
pub fn semester_search_url(site_base: &Url, user_id: &str) -> Result<String> {
    let path = format!(
        "d2l/api/le/manageCourses/courses-searches/{}/BySemester?desc=1",
        user_id
    );
    site_base
        .join(&path)
        .map(String::from)
        .map_err(|source| PolitemallError::InvalidUrl { url: path, source })
}
