//! Mount orchestration: composes the root provider, context bridge, route
//! initializer, and suspense gate into the single `mount_suspended` surface.
//!
//! Resolution order is fixed: navigation replace, child setup, transitive
//! deferred work, one scheduler-turn flush, exposed-buffer drain, render.
//! Every failure before the gate settles rejects the returned future; there
//! is no timeout and no cancellation.
use std::collections::HashMap;
use std::sync::Arc;

use crate::app::{current_app, App, APP_KEY};
use crate::component::{Component, ComponentAdapter, Props, RenderContext, Slots, DEFAULT_SLOT};
use crate::context::{ExposeShared, ExposedRegistry, Exposer, SetupContext};
use crate::error::{Result, TestkitError};
use crate::options::MountOptions;
use crate::router::use_router;
use crate::suspense::SuspenseGate;
use crate::vnode::{json_to_attr, VNode};
use crate::wrapper::MountedWrapper;

const MAX_RESOLVE_DEPTH: usize = 32;

/// Mount `component` inside the ambient application (the one installed under
/// [`APP_KEY`]), resolve all asynchronous setup, and hand back the wrapper.
///
/// Prefer [`crate::app::TestEnvironment::mount_suspended`] where the
/// environment handle is in scope; this free function exists for call sites
/// that only know the process-wide registry.
pub async fn mount_suspended<C: Component>(
    component: C,
    options: MountOptions,
) -> Result<MountedWrapper> {
    let app = current_app(APP_KEY)?;
    mount_in(app, Arc::new(component), options).await
}

pub(crate) async fn mount_in(
    app: Arc<App>,
    component: Arc<dyn Component>,
    options: MountOptions,
) -> Result<MountedWrapper> {
    let merged = options.merged(&app);
    let gate = SuspenseGate::new();
    let root_exposed = Arc::new(ExposedRegistry::default());
    let shared = Arc::new(ExposeShared::new(Arc::clone(&root_exposed)));

    tracing::debug!(
        app = %app.id(),
        component = component.name(),
        route = %merged.route,
        "mounting under suspense"
    );

    // Mount-level context: its exposed set is what the wrapper surfaces.
    let root_ctx = SetupContext::new(
        Arc::clone(&app),
        merged.attrs.clone(),
        merged.slots.clone(),
        merged.properties.clone(),
        merged.provides.clone(),
        Exposer::Direct(Arc::clone(&root_exposed)),
        Arc::clone(&gate),
    );

    // The synthetic root delegates to the application root with its own
    // exposure suppressed; root exposure is irrelevant to the wrapper.
    let root_adapter = ComponentAdapter::new(app.root_component());
    let root_render = root_adapter
        .initialize(merged.props.clone(), root_ctx.suppressed())
        .await
        .map_err(TestkitError::Setup)?;

    // Child producer under the gate: navigation replace completes strictly
    // before the child's setup body runs.
    let guard = gate.register();
    let bridged = root_ctx.bridged(Arc::clone(&shared));
    let adapter = ComponentAdapter::new(component);
    let produced = async {
        let router = use_router(&bridged)?;
        router
            .replace(merged.route.clone())
            .await
            .map_err(TestkitError::Navigation)?;
        adapter
            .initialize(merged.props.clone(), bridged.clone())
            .await
            .map_err(TestkitError::Setup)
    }
    .await;

    let child_render = match produced {
        Ok(render) => {
            guard.complete();
            render
        }
        Err(e) => {
            tracing::debug!(error = %e, "mount rejected before the gate settled");
            return Err(e);
        }
    };

    // Wait out transitively registered setup work, then the single
    // scheduler-turn flush, then finalize exposure: drain once and switch the
    // bridge to direct pass-through.
    gate.settled().await?;
    tokio::task::yield_now().await;
    shared.drain_and_close();

    // Render only now that async work has committed: the child against the
    // root's render context, then the root tree around its output.
    let render_ctx = RenderContext {
        props: merged.props.clone(),
        attrs: merged.attrs.clone(),
        slots: merged.slots.clone(),
    };
    let child_tree = resolve_widgets(child_render(&render_ctx), &merged.components, 0);
    let mut root_render_ctx = render_ctx;
    root_render_ctx
        .slots
        .insert(DEFAULT_SLOT.to_string(), child_tree);
    let tree = resolve_widgets(root_render(&root_render_ctx), &merged.components, 0);

    tracing::debug!(app = %app.id(), exposed = root_exposed.len(), "mount resolved");
    Ok(MountedWrapper::new(
        app,
        tree,
        root_exposed,
        merged.route,
        merged.raw,
    ))
}

/// Replace by-name component references with the registered component's
/// rendered output, recursively. Unknown names degrade to plain elements so
/// the markup stays inspectable.
fn resolve_widgets(
    node: VNode,
    components: &HashMap<String, Arc<dyn Component>>,
    depth: usize,
) -> VNode {
    if depth > MAX_RESOLVE_DEPTH {
        tracing::warn!("component resolution depth exceeded; truncating subtree");
        return VNode::empty();
    }
    match node {
        VNode::Text(_) => node,
        VNode::Element { tag, attrs, children } => VNode::Element {
            tag,
            attrs,
            children: children
                .into_iter()
                .map(|c| resolve_widgets(c, components, depth + 1))
                .collect(),
        },
        VNode::Fragment(children) => VNode::Fragment(
            children
                .into_iter()
                .map(|c| resolve_widgets(c, components, depth + 1))
                .collect(),
        ),
        VNode::Widget { name, props, children } => {
            let children: Vec<VNode> = children
                .into_iter()
                .map(|c| resolve_widgets(c, components, depth + 1))
                .collect();
            match components.get(&name) {
                Some(stub) => {
                    let mut slots = Slots::new();
                    slots.insert(DEFAULT_SLOT.to_string(), VNode::Fragment(children.clone()));
                    let rc = RenderContext {
                        props,
                        attrs: Props::new(),
                        slots,
                    };
                    match stub.render(&rc) {
                        Some(out) => resolve_widgets(out, components, depth + 1),
                        None => {
                            tracing::warn!(
                                component = %name,
                                "registered component has no synchronous render; using slot content"
                            );
                            VNode::Fragment(children)
                        }
                    }
                }
                None => {
                    tracing::warn!(component = %name, "unresolved component reference");
                    VNode::Element {
                        tag: name,
                        attrs: props.iter().map(|(k, v)| (k.clone(), json_to_attr(v))).collect(),
                        children,
                    }
                }
            }
        }
    }
}
