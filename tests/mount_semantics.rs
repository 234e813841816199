use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use loft_testkit::prelude::*;

struct Greeting;
impl Component for Greeting {
    fn render(&self, _ctx: &RenderContext) -> Option<VNode> {
        Some(VNode::element("div").child(VNode::text("hello")))
    }
}

struct Ready;
#[async_trait]
impl Component for Ready {
    async fn setup(&self, _props: Props, _ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
        // async setup that awaits already-resolved work before rendering
        tokio::task::yield_now().await;
        Ok(Some(Box::new(|_ctx| {
            VNode::element("div").child(VNode::text("ready"))
        })))
    }
}

struct ExplodesEarly;
#[async_trait]
impl Component for ExplodesEarly {
    async fn setup(&self, _props: Props, _ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
        anyhow::bail!("setup exploded")
    }
}

struct ExplodesLate;
#[async_trait]
impl Component for ExplodesLate {
    async fn setup(&self, _props: Props, _ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        anyhow::bail!("async setup exploded")
    }
}

struct Hollow;
impl Component for Hollow {}

#[tokio::test(flavor = "multi_thread")]
async fn sync_component_resolves_promptly() {
    let env = TestEnvironment::install_as("mount-sync", App::builder().build());
    let wrapper = tokio::time::timeout(
        Duration::from_millis(250),
        env.mount_suspended(Greeting, MountOptions::new()),
    )
    .await
    .expect("mount did not resolve promptly")
    .expect("mount failed");
    assert_eq!(wrapper.text(), "hello");
    assert_eq!(wrapper.html(), "<div>hello</div>");
}

#[tokio::test(flavor = "multi_thread")]
async fn async_setup_renders_only_after_it_settles() {
    let env = TestEnvironment::install_as("mount-async", App::builder().build());
    let wrapper = env
        .mount_suspended(Ready, MountOptions::new())
        .await
        .expect("mount failed");
    assert_eq!(wrapper.text(), "ready");
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_setup_failure_rejects_the_mount() {
    let env = TestEnvironment::install_as("mount-fail-sync", App::builder().build());
    let err = env
        .mount_suspended(ExplodesEarly, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::Setup(_)));
    assert!(err.to_string().contains("setup exploded"));
}

#[tokio::test(flavor = "multi_thread")]
async fn async_setup_failure_rejects_the_mount() {
    let env = TestEnvironment::install_as("mount-fail-async", App::builder().build());
    let err = env
        .mount_suspended(ExplodesLate, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::Setup(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn navigation_failure_rejects_the_mount() {
    struct BrokenRouter;
    #[async_trait]
    impl Router for BrokenRouter {
        async fn replace(&self, _to: RouteLocation) -> anyhow::Result<()> {
            anyhow::bail!("navigation refused")
        }
        fn current(&self) -> RouteLocation {
            RouteLocation::root()
        }
    }

    let app = App::builder()
        .provide(RouterHandle::new(BrokenRouter))
        .build();
    let env = TestEnvironment::install_as("mount-nav-fail", app);
    let err = env
        .mount_suspended(Greeting, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::Navigation(_)));
}

static DEFERRED_DONE: AtomicBool = AtomicBool::new(false);

#[tokio::test(flavor = "multi_thread")]
async fn mount_waits_for_deferred_setup_work() {
    struct Deferring;
    #[async_trait]
    impl Component for Deferring {
        async fn setup(&self, _props: Props, ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
            ctx.defer(async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                DEFERRED_DONE.store(true, Ordering::SeqCst);
                Ok(())
            });
            Ok(Some(Box::new(|_ctx| VNode::text("done"))))
        }
    }

    let env = TestEnvironment::install_as("mount-deferred", App::builder().build());
    let wrapper = env
        .mount_suspended(Deferring, MountOptions::new())
        .await
        .expect("mount failed");
    assert_eq!(wrapper.text(), "done");
    assert!(DEFERRED_DONE.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_deferred_work_rejects_the_mount() {
    struct DeferFail;
    #[async_trait]
    impl Component for DeferFail {
        async fn setup(&self, _props: Props, ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
            ctx.defer(async { anyhow::bail!("background setup failed") });
            Ok(Some(Box::new(|_ctx| VNode::text("never observed"))))
        }
    }

    let env = TestEnvironment::install_as("mount-deferred-fail", App::builder().build());
    let err = env
        .mount_suspended(DeferFail, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::Setup(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn component_without_capabilities_mounts_empty() {
    let env = TestEnvironment::install_as("mount-hollow", App::builder().build());
    let wrapper = env
        .mount_suspended(Hollow, MountOptions::new())
        .await
        .expect("mount failed");
    assert_eq!(wrapper.html(), "");
    assert!(wrapper.exposed_values().is_empty());
}
