use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::SetupContext;
use crate::vnode::VNode;

/// Dynamic props/attrs mapping, JSON-valued like the rest of the option surface.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Named slot content; the unnamed slot lives under `"default"`.
pub type Slots = HashMap<String, VNode>;

pub const DEFAULT_SLOT: &str = "default";

/// What an async setup hands back: a render closure run once the suspense
/// gate has settled.
pub type RenderFn = Box<dyn Fn(&RenderContext) -> VNode + Send + Sync>;

/// Ambient data a render closure sees. The mounted child renders against the
/// root's context so wrapper queries walk straight through to its output.
#[derive(Clone, Default)]
pub struct RenderContext {
    pub props: Props,
    pub attrs: Props,
    pub slots: Slots,
}

impl RenderContext {
    pub fn prop(&self, name: &str) -> Option<&serde_json::Value> {
        self.props.get(name)
    }

    pub fn slot(&self, name: &str) -> Option<&VNode> {
        self.slots.get(name)
    }

    pub fn default_slot(&self) -> Option<&VNode> {
        self.slots.get(DEFAULT_SLOT)
    }
}

/// A mountable component. Both capabilities are optional: `setup` may return
/// its own render closure, and `render` covers template-only components.
/// A component providing neither mounts as an empty fragment.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Async initialization. Runs inside the suspense boundary; returning an
    /// error rejects the whole mount.
    async fn setup(
        &self,
        _props: Props,
        _ctx: SetupContext,
    ) -> anyhow::Result<Option<RenderFn>> {
        Ok(None)
    }

    /// Synchronous template render, used when `setup` yields no closure.
    /// Stub components registered by name must render through this path.
    fn render(&self, _ctx: &RenderContext) -> Option<VNode> {
        None
    }
}

/// Explicit delegation shim around a mounted component: runs `setup` under the
/// bridged context when present, otherwise falls back to a closure over the
/// component's `render` capability. The caller decides which render context
/// the resulting closure executes in.
pub struct ComponentAdapter {
    inner: Arc<dyn Component>,
}

impl ComponentAdapter {
    pub fn new(inner: Arc<dyn Component>) -> Self {
        Self { inner }
    }

    pub fn component_name(&self) -> &'static str {
        self.inner.name()
    }

    pub async fn initialize(&self, props: Props, ctx: SetupContext) -> anyhow::Result<RenderFn> {
        if let Some(render) = self.inner.setup(props, ctx).await? {
            return Ok(render);
        }
        let inner = Arc::clone(&self.inner);
        Ok(Box::new(move |render_ctx| {
            inner.render(render_ctx).unwrap_or_else(VNode::empty)
        }))
    }
}
