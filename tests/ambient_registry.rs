use loft_testkit::prelude::*;

struct Greeting;
impl Component for Greeting {
    fn render(&self, _ctx: &RenderContext) -> Option<VNode> {
        Some(VNode::element("div").child(VNode::text("hello")))
    }
}

// One sequential test: the ambient surface shares a process-wide key, so the
// no-app, installed, and torn-down phases must be observed in order.
#[tokio::test(flavor = "multi_thread")]
async fn ambient_mounting_follows_the_environment_lifecycle() {
    let err = mount_suspended(Greeting, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::NoApplication));

    {
        let _env = TestEnvironment::install(App::builder().build());
        let wrapper = mount_suspended(Greeting, MountOptions::new())
            .await
            .expect("ambient mount failed");
        assert_eq!(wrapper.text(), "hello");
    }

    // teardown removed the app from the registry again
    let err = mount_suspended(Greeting, MountOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TestkitError::NoApplication));
}
