//! Mount options and the merge policy against application defaults.
//!
//! Caller-supplied values win; defaults are layered underneath: deep-merge
//! for global properties, by-name union for component stubs (caller over
//! app-level over built-ins), overlay for typed provides. The service
//! container itself is inherited read-only from the app.
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::app::{App, Provides};
use crate::component::{Component, Props, Slots, DEFAULT_SLOT};
use crate::router::RouteLocation;
use crate::stubs::builtin_stubs;
use crate::vnode::VNode;

pub type JsonMap = serde_json::Map<String, serde_json::Value>;

#[derive(Default, Clone)]
pub struct MountOptions {
    pub props: Props,
    pub attrs: Props,
    pub slots: Slots,
    /// Target of the pre-setup navigation replace; `/` when unset.
    pub route: Option<RouteLocation>,
    pub global: GlobalOptions,
    /// Arbitrary framework mounting options, passed through unmodified.
    pub raw: JsonMap,
}

#[derive(Default, Clone)]
pub struct GlobalOptions {
    pub components: HashMap<String, Arc<dyn Component>>,
    pub properties: JsonMap,
    pub provide: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn slot(mut self, name: impl Into<String>, content: VNode) -> Self {
        self.slots.insert(name.into(), content);
        self
    }

    pub fn default_slot(self, content: VNode) -> Self {
        self.slot(DEFAULT_SLOT, content)
    }

    pub fn route(mut self, to: impl Into<RouteLocation>) -> Self {
        self.route = Some(to.into());
        self
    }

    /// Per-mount by-name component registration; shadows app-level and
    /// built-in stubs of the same name.
    pub fn component(mut self, name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        self.global.components.insert(name.into(), component);
        self
    }

    pub fn global_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.global.properties.insert(key.into(), value.into());
        self
    }

    /// Per-mount typed service overlay on the app's container.
    pub fn provide<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.global
            .provide
            .insert(TypeId::of::<T>(), Arc::new(value) as Arc<dyn Any + Send + Sync>);
        self
    }

    pub fn raw_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.raw.insert(key.into(), value.into());
        self
    }

    pub(crate) fn merged(self, app: &App) -> MergedMount {
        let mut components = builtin_stubs();
        components.extend(app.components().clone());
        components.extend(self.global.components);

        MergedMount {
            props: self.props,
            attrs: self.attrs,
            slots: self.slots,
            route: self.route.unwrap_or_default(),
            properties: defu(&self.global.properties, app.global_properties()),
            components,
            provides: app.provides().extended(&self.global.provide),
            raw: self.raw,
        }
    }
}

/// Fully merged inputs for one mount.
pub(crate) struct MergedMount {
    pub props: Props,
    pub attrs: Props,
    pub slots: Slots,
    pub route: RouteLocation,
    pub properties: JsonMap,
    pub components: HashMap<String, Arc<dyn Component>>,
    pub provides: Provides,
    pub raw: JsonMap,
}

/// Recursive defaults merge: `overrides` wins, nested objects merge key-wise,
/// anything else replaces wholesale.
pub fn defu(overrides: &JsonMap, defaults: &JsonMap) -> JsonMap {
    let mut out = defaults.clone();
    for (key, value) in overrides {
        let merged = match (value, out.get(key)) {
            (serde_json::Value::Object(o), Some(serde_json::Value::Object(d))) => {
                serde_json::Value::Object(defu(o, d))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: serde_json::Value) -> JsonMap {
        match value {
            serde_json::Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn defu_deep_merges_nested_objects() {
        let defaults = as_map(json!({"config": {"a": 1, "b": 2}, "keep": true}));
        let overrides = as_map(json!({"config": {"b": 3, "c": 4}}));
        let merged = defu(&overrides, &defaults);
        assert_eq!(
            serde_json::Value::Object(merged),
            json!({"config": {"a": 1, "b": 3, "c": 4}, "keep": true})
        );
    }

    #[test]
    fn defu_replaces_non_object_values() {
        let defaults = as_map(json!({"list": [1, 2], "n": 1}));
        let overrides = as_map(json!({"list": [3], "n": 2}));
        let merged = defu(&overrides, &defaults);
        assert_eq!(serde_json::Value::Object(merged), json!({"list": [3], "n": 2}));
    }

    #[test]
    fn caller_route_wins_over_default() {
        let opts = MountOptions::new().route("/test");
        assert_eq!(opts.route.unwrap().path(), "/test");
        assert_eq!(MountOptions::new().route.unwrap_or_default().path(), "/");
    }
}
