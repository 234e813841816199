//! loft-testkit
//!
//! Test-time component mounting for Loft applications. `mount_suspended`
//! mounts a component inside a synthetic application root, forwards the
//! app's injected services and global properties to it, performs the
//! requested navigation before its setup runs, waits for every piece of
//! asynchronous setup work to settle, and resolves to a wrapper exposing the
//! rendered output and the component's exposed API.
//!
//! The harness never retries and never times out: failures reject the mount
//! future, and setup work that never settles leaves it pending.
pub mod app;
pub mod component;
pub mod context;
pub mod error;
pub mod mount;
pub mod options;
pub mod router;
pub mod stubs;
pub mod suspense;
pub mod vnode;
pub mod wrapper;

pub mod prelude {
    pub use crate::app::{App, AppBuilder, TestEnvironment, APP_KEY};
    pub use crate::component::{Component, Props, RenderContext, RenderFn, Slots};
    pub use crate::context::SetupContext;
    pub use crate::error::{Result, TestkitError};
    pub use crate::mount::mount_suspended;
    pub use crate::options::MountOptions;
    pub use crate::router::{use_router, MemoryRouter, RouteLocation, Router, RouterHandle};
    pub use crate::vnode::VNode;
    pub use crate::wrapper::MountedWrapper;

    pub use async_trait::async_trait;
}
