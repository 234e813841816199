//! The handle returned to test code once a mount has resolved: queries over
//! the rendered tree plus typed access to the component's exposed API.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::app::App;
use crate::context::ExposedRegistry;
use crate::options::JsonMap;
use crate::router::RouteLocation;
use crate::vnode::VNode;

/// Constructed only by the orchestrator, after the suspense gate has settled,
/// the flush has run, and the exposed buffer has drained.
pub struct MountedWrapper {
    app: Arc<App>,
    root: VNode,
    exposed: Arc<ExposedRegistry>,
    route: RouteLocation,
    raw_options: JsonMap,
}

impl fmt::Debug for MountedWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedWrapper")
            .field("root", &self.root)
            .field("route", &self.route)
            .field("raw_options", &self.raw_options)
            .finish_non_exhaustive()
    }
}

impl MountedWrapper {
    pub(crate) fn new(
        app: Arc<App>,
        root: VNode,
        exposed: Arc<ExposedRegistry>,
        route: RouteLocation,
        raw_options: JsonMap,
    ) -> Self {
        Self {
            app,
            root,
            exposed,
            route,
            raw_options,
        }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn root(&self) -> &VNode {
        &self.root
    }

    pub fn html(&self) -> String {
        self.root.html()
    }

    pub fn text(&self) -> String {
        self.root.text_content()
    }

    pub fn find(&self, tag: &str) -> Option<&VNode> {
        self.root.find(tag)
    }

    pub fn find_all(&self, tag: &str) -> Vec<&VNode> {
        self.root.find_all(tag)
    }

    /// Typed exposed-API lookup; late `expose` calls show up here immediately.
    pub fn exposed<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.exposed.get::<T>()
    }

    /// Every exposed entry, in call order.
    pub fn exposed_values(&self) -> Vec<Arc<dyn Any + Send + Sync>> {
        self.exposed.snapshot()
    }

    /// The route the mount navigated to before setup ran.
    pub fn route(&self) -> &RouteLocation {
        &self.route
    }

    /// Raw mounting options the caller passed through unmodified.
    pub fn raw_options(&self) -> &JsonMap {
        &self.raw_options
    }
}
