//! Navigation boundary: the harness consumes routers only through `replace`
//! plus a read of the current location for route-derived state. `MemoryRouter`
//! is the default collaborator installed by the app builder.
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::context::SetupContext;
use crate::error::{Result, TestkitError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLocation {
    path: String,
    query: Vec<(String, String)>,
}

impl RouteLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new("/")
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let mut out = self.path.clone();
        for (i, (k, v)) in self.query.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        out
    }
}

impl Default for RouteLocation {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for RouteLocation {
    fn from(raw: &str) -> Self {
        let (path, query_str) = match raw.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (raw, None),
        };
        let mut loc = RouteLocation::new(if path.is_empty() { "/" } else { path });
        if let Some(q) = query_str {
            for pair in q.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((k, v)) => loc.query.push((k.to_string(), v.to_string())),
                    None => loc.query.push((pair.to_string(), String::new())),
                }
            }
        }
        loc
    }
}

impl From<String> for RouteLocation {
    fn from(raw: String) -> Self {
        RouteLocation::from(raw.as_str())
    }
}

#[async_trait]
pub trait Router: Send + Sync {
    /// Full navigation replace; resolves once route-derived state is current.
    async fn replace(&self, to: RouteLocation) -> anyhow::Result<()>;

    fn current(&self) -> RouteLocation;
}

/// Shared router handle stored in the injected-service container.
#[derive(Clone)]
pub struct RouterHandle(Arc<dyn Router>);

impl RouterHandle {
    pub fn new<R: Router + 'static>(router: R) -> Self {
        Self(Arc::new(router))
    }

    pub fn from_arc(router: Arc<dyn Router>) -> Self {
        Self(router)
    }

    pub async fn replace(&self, to: impl Into<RouteLocation>) -> anyhow::Result<()> {
        self.0.replace(to.into()).await
    }

    pub fn current(&self) -> RouteLocation {
        self.0.current()
    }
}

/// Auto-import-style accessor: the router comes from the ambient service
/// container, never from mount arguments.
pub fn use_router(ctx: &SetupContext) -> Result<RouterHandle> {
    ctx.inject::<RouterHandle>()
        .map(|h| (*h).clone())
        .ok_or(TestkitError::MissingService("router"))
}

/// In-memory router: `replace` commits after one cooperative yield, modelling
/// the navigation's own asynchronous resolution.
pub struct MemoryRouter {
    current: RwLock<RouteLocation>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(RouteLocation::root()),
        }
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Router for MemoryRouter {
    async fn replace(&self, to: RouteLocation) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        *self.current.write() = to;
        Ok(())
    }

    fn current(&self) -> RouteLocation {
        self.current.read().clone()
    }
}
