use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::component::{Component, Props, RenderFn};
use crate::context::SetupContext;
use crate::error::{Result, TestkitError};
use crate::router::{MemoryRouter, RouterHandle};
use crate::vnode::VNode;

/// Well-known registry key under which a test environment installs its app.
pub const APP_KEY: &str = "loft-app";

// Process-wide application registry. Keyed so parallel test environments can
// coexist; read-only lookups during mounts, writes only at install/teardown.
static APPS: RwLock<BTreeMap<&'static str, Arc<App>>> = RwLock::new(BTreeMap::new());

/// Frozen injected-service container: typed entries, read-only after build.
#[derive(Clone)]
pub struct Provides {
    inner: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Provides {
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(HashMap::new()),
        }
    }

    pub(crate) fn from_frozen_map(map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let tid = TypeId::of::<T>();
        self.inner
            .get(&tid)
            .and_then(|v| v.clone().downcast::<T>().ok())
    }

    /// A new container with the overlay entries layered on top. Used for
    /// per-mount `provide` overrides; the base stays untouched.
    pub(crate) fn extended(
        &self,
        overlay: &HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    ) -> Provides {
        if overlay.is_empty() {
            return self.clone();
        }
        let mut map = (*self.inner).clone();
        for (tid, value) in overlay {
            map.insert(*tid, value.clone());
        }
        Provides::from_frozen_map(map)
    }
}

/// The application instance backing every mount of a test run: service
/// container, global properties, app-level component registrations, and the
/// application-root component. Referenced by mounts, never mutated by them.
pub struct App {
    id: Uuid,
    provides: Provides,
    global_properties: serde_json::Map<String, serde_json::Value>,
    components: HashMap<String, Arc<dyn Component>>,
    root: Arc<dyn Component>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provides(&self) -> &Provides {
        &self.provides
    }

    pub fn global_properties(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.global_properties
    }

    pub fn components(&self) -> &HashMap<String, Arc<dyn Component>> {
        &self.components
    }

    pub fn root_component(&self) -> Arc<dyn Component> {
        Arc::clone(&self.root)
    }
}

#[derive(Default)]
pub struct AppBuilder {
    provide: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    global_properties: serde_json::Map<String, serde_json::Value>,
    components: HashMap<String, Arc<dyn Component>>,
    root: Option<Arc<dyn Component>>,
}

impl AppBuilder {
    /// Register a typed service; one entry per type, last write wins.
    pub fn provide<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        let tid = TypeId::of::<T>();
        if self.provide.contains_key(&tid) {
            tracing::warn!(service = %std::any::type_name::<T>(), "service provided twice; overriding");
        }
        self.provide
            .insert(tid, Arc::new(value) as Arc<dyn Any + Send + Sync>);
        self
    }

    pub fn global_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.global_properties.insert(key.into(), value.into());
        self
    }

    /// App-level by-name component registration, resolvable from any mount.
    pub fn component(mut self, name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        self.components.insert(name.into(), component);
        self
    }

    /// Override the application-root component; defaults to a slot
    /// passthrough.
    pub fn root_component(mut self, root: Arc<dyn Component>) -> Self {
        self.root = Some(root);
        self
    }

    pub fn build(mut self) -> Arc<App> {
        // every app carries a router; install the in-memory one unless the
        // environment provided its own
        let router_tid = TypeId::of::<RouterHandle>();
        if !self.provide.contains_key(&router_tid) {
            self.provide.insert(
                router_tid,
                Arc::new(RouterHandle::new(MemoryRouter::new())) as Arc<dyn Any + Send + Sync>,
            );
        }
        Arc::new(App {
            id: Uuid::new_v4(),
            provides: Provides::from_frozen_map(self.provide),
            global_properties: self.global_properties,
            components: self.components,
            root: self.root.unwrap_or_else(|| Arc::new(AppRoot)),
        })
    }
}

/// Default application root: delegates rendering to the default slot, which
/// the orchestrator fills with the suspended child's output.
struct AppRoot;

#[async_trait]
impl Component for AppRoot {
    fn name(&self) -> &'static str {
        "AppRoot"
    }

    async fn setup(&self, _props: Props, _ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
        Ok(Some(Box::new(|render_ctx| {
            render_ctx
                .default_slot()
                .cloned()
                .unwrap_or_else(VNode::empty)
        })))
    }
}

/// Synchronous lookup of the application installed under `key`. A missing
/// entry is a fatal precondition failure, never retried.
pub fn current_app(key: &str) -> Result<Arc<App>> {
    APPS.read().get(key).cloned().ok_or(TestkitError::NoApplication)
}

/// Explicit test-environment handle: installs the app into the process-wide
/// registry on creation and removes it again on drop (teardown). Mounting
/// through the handle never consults ambient state.
pub struct TestEnvironment {
    key: &'static str,
    app: Arc<App>,
}

impl TestEnvironment {
    /// Install under the well-known default key.
    pub fn install(app: Arc<App>) -> Self {
        Self::install_as(APP_KEY, app)
    }

    /// Install under a caller-chosen key so parallel environments in one
    /// process stay independent.
    pub fn install_as(key: &'static str, app: Arc<App>) -> Self {
        let previous = APPS.write().insert(key, Arc::clone(&app));
        if previous.is_some() {
            tracing::warn!(key, "replacing an application already installed under this key");
        }
        Self { key, app }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub async fn mount_suspended<C: Component>(
        &self,
        component: C,
        options: crate::options::MountOptions,
    ) -> Result<crate::wrapper::MountedWrapper> {
        crate::mount::mount_in(Arc::clone(&self.app), Arc::new(component), options).await
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        let mut apps = APPS.write();
        // only uninstall our own app; a replacement installed meanwhile stays
        if let Some(existing) = apps.get(self.key) {
            if Arc::ptr_eq(existing, &self.app) {
                apps.remove(self.key);
            }
        }
    }
}
