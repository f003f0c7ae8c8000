use siren::Entity;
use url::Url;

use crate::error::{DocumentContext, PolitemallError, Result};

/// Last path segment of a URL, ignoring query and trailing slashes.
///
/// `https://x.api.brightspace.com/000/activity/123?q=0` → `123`.
pub fn last_path_segment(href: &str) -> Result<String> {
    let url = Url::parse(href).map_err(|source| PolitemallError::InvalidUrl {
        url: href.to_string(),
        source,
    })?;

    url.path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PolitemallError::InvalidId {
            href: href.to_string(),
            reason: "URL has no path segments",
        })
}

/// ID from the link with exactly `rels`, e.g. `["self", "describes"]`.
pub(crate) fn linked_id(entity: &Entity, rels: &[&str], context: &str) -> Result<String> {
    let link = entity.link(rels).in_document(context)?;
    last_path_segment(&link.href)
}
