//! Declarative route tables in TOML.
//!
//! A manifest names handlers instead of holding them, so the route table can
//! live next to the deployment config while the code keeps an explicit
//! name → handler registry:
//!
//! ```toml
//! [[route]]
//! method = "GET"
//! path = "/api/users/{id:int}"
//! handler = "get_user"
//!
//! [[route]]
//! path = "/assets/{*file}"   # no method: any
//! handler = "assets"
//! ```
//!
//! Routes register in document order, so document order is also the final
//! precedence tie-break.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::method::MethodFilter;
use crate::router::Router;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RouteManifest {
    #[serde(rename = "route", default)]
    pub routes: Vec<RouteEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteEntry {
    /// `GET`, `POST`, ... or `*` / `ANY`.
    #[serde(default = "any_method")]
    pub method: String,
    pub path: String,
    pub handler: String,
}

fn any_method() -> String {
    "*".to_owned()
}

impl RouteManifest {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Compile the manifest into a router, resolving each handler name through `lookup`.
    ///
    /// Fails on the first entry with an unknown method, an unknown handler
    /// name or an invalid template.
    pub fn build_router<H>(
        &self,
        mut lookup: impl FnMut(&str) -> Option<H>,
    ) -> Result<Router<H>, Error> {
        let mut router = Router::new();
        for entry in &self.routes {
            let method: MethodFilter = entry.method.parse()?;
            let handler = lookup(&entry.handler)
                .ok_or_else(|| Error::UnknownHandler(entry.handler.clone()))?;
            router.register(method, &entry.path, handler)?;
        }

        debug!(routes = router.len(), "route manifest compiled");
        Ok(router)
    }
}
