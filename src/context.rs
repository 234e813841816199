//! Setup contexts and the exposure machinery.
//!
//! Two contexts exist per mount: the mount-level (root) context whose exposed
//! set backs the wrapper, and the bridged child context derived from it. The
//! child's `expose` routes through a two-state buffer because the child
//! initializes before the wrapper's delegation target is finalized; the
//! orchestrator drains the buffer exactly once when the gate resolves, after
//! which calls pass straight to the root registry.
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::app::{App, Provides};
use crate::component::{Props, Slots};
use crate::suspense::SuspenseGate;
use crate::vnode::VNode;

type Entry = Arc<dyn Any + Send + Sync>;

/// Ordered exposed-API registry backing a wrapper handle.
#[derive(Default)]
pub struct ExposedRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl ExposedRegistry {
    pub(crate) fn push(&self, entry: Entry) {
        self.entries.lock().push(entry);
    }

    /// Typed lookup; the latest exposed value of the type wins.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let entries = self.entries.lock();
        entries
            .iter()
            .rev()
            .find_map(|e| e.clone().downcast::<T>().ok())
    }

    /// Every exposed entry, in call order.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Buffering-vs-forwarding state for the child's `expose`. The transition is
/// one-way and happens at most once.
pub(crate) struct ExposeShared {
    buffer: Mutex<Option<SmallVec<[Entry; 2]>>>,
    root: Arc<ExposedRegistry>,
}

impl ExposeShared {
    pub(crate) fn new(root: Arc<ExposedRegistry>) -> Self {
        Self {
            buffer: Mutex::new(Some(SmallVec::new())),
            root,
        }
    }

    fn expose(&self, entry: Entry) {
        let mut buffer = self.buffer.lock();
        match buffer.as_mut() {
            Some(buf) => buf.push(entry),
            None => self.root.push(entry),
        }
    }

    /// Drain buffered entries into the root registry in insertion order and
    /// close the buffer. Later calls are no-ops.
    pub(crate) fn drain_and_close(&self) {
        let drained = self.buffer.lock().take();
        if let Some(buf) = drained {
            for entry in buf {
                self.root.push(entry);
            }
        }
    }
}

#[derive(Clone)]
pub(crate) enum Exposer {
    /// Mount-level context: straight into the wrapper's registry.
    Direct(Arc<ExposedRegistry>),
    /// Bridged child context: through the two-state buffer.
    Proxied(Arc<ExposeShared>),
    /// The application root's own exposure is irrelevant and discarded.
    Suppressed,
}

/// The object handed to a component's `setup`. Cheap to clone; clones share
/// the same exposure target and suspense gate.
#[derive(Clone)]
pub struct SetupContext {
    app: Arc<App>,
    attrs: Props,
    slots: Slots,
    properties: serde_json::Map<String, serde_json::Value>,
    provides: Provides,
    exposer: Exposer,
    gate: Arc<SuspenseGate>,
}

impl SetupContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        app: Arc<App>,
        attrs: Props,
        slots: Slots,
        properties: serde_json::Map<String, serde_json::Value>,
        provides: Provides,
        exposer: Exposer,
        gate: Arc<SuspenseGate>,
    ) -> Self {
        Self {
            app,
            attrs,
            slots,
            properties,
            provides,
            exposer,
            gate,
        }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn attrs(&self) -> &Props {
        &self.attrs
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&VNode> {
        self.slots.get(name)
    }

    /// Merged global properties visible to this mounted tree (caller overrides
    /// deep-merged over the application's).
    pub fn global_properties(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.properties
    }

    pub fn global_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Typed read from the injected-service container (application provides
    /// plus per-mount overlay).
    pub fn inject<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.provides.get::<T>()
    }

    /// Register a value on the component's public API surface.
    pub fn expose<T: Send + Sync + 'static>(&self, value: T) {
        self.expose_entry(Arc::new(value));
    }

    pub fn expose_entry(&self, entry: Entry) {
        match &self.exposer {
            Exposer::Direct(registry) => registry.push(entry),
            Exposer::Proxied(shared) => shared.expose(entry),
            Exposer::Suppressed => {
                tracing::trace!("expose call on application root discarded");
            }
        }
    }

    /// Track additional async setup work on the suspense gate. The mount does
    /// not resolve until every deferred task has settled; a failing task
    /// rejects the mount as a setup error.
    pub fn defer<F>(&self, work: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.gate.spawn_tracked(work);
    }

    /// Derived child context: everything forwarded unchanged except `expose`,
    /// which routes through the given buffer.
    pub(crate) fn bridged(&self, shared: Arc<ExposeShared>) -> Self {
        Self {
            exposer: Exposer::Proxied(shared),
            ..self.clone()
        }
    }

    /// Same context with exposure discarded, for the application root.
    pub(crate) fn suppressed(&self) -> Self {
        Self {
            exposer: Exposer::Suppressed,
            ..self.clone()
        }
    }
}
