//! Globally registered stub components, collected via `inventory` so built-in
//! stubs are discoverable without wiring. Per-app and per-mount registrations
//! shadow these by name.
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::{Component, RenderContext};
use crate::vnode::{json_to_attr, VNode};

/// A named stub registration discovered at link time.
pub struct RegisteredStub {
    pub name: &'static str,
    pub create: fn() -> Arc<dyn Component>,
}

inventory::collect!(RegisteredStub);

pub(crate) fn builtin_stubs() -> HashMap<String, Arc<dyn Component>> {
    let mut out = HashMap::new();
    for stub in inventory::iter::<RegisteredStub> {
        out.insert(stub.name.to_string(), (stub.create)());
    }
    out
}

/// Presentational stand-in for route links: renders a plain anchor with the
/// `to` location as its target and the default slot as content, so link
/// components render without a router view tree.
pub struct RouterLink;

impl Component for RouterLink {
    fn name(&self) -> &'static str {
        "RouterLink"
    }

    fn render(&self, ctx: &RenderContext) -> Option<VNode> {
        let to = ctx
            .prop("to")
            .map(json_to_attr)
            .unwrap_or_else(|| "#".to_string());
        Some(
            VNode::element("a")
                .attr("href", to)
                .child(ctx.default_slot().cloned().unwrap_or_else(VNode::empty)),
        )
    }
}

fn router_link_stub() -> Arc<dyn Component> {
    Arc::new(RouterLink)
}

inventory::submit! {
    RegisteredStub { name: "RouterLink", create: router_link_stub }
}
