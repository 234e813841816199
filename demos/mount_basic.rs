//! Minimal walkthrough: build an app, install a test environment, mount a
//! component with async setup and a route, inspect the wrapper.
use std::time::Duration;

use loft_testkit::prelude::*;

#[derive(Debug)]
struct Greeter {
    salutation: &'static str,
}

struct Welcome;
#[async_trait]
impl Component for Welcome {
    async fn setup(&self, props: Props, ctx: SetupContext) -> anyhow::Result<Option<RenderFn>> {
        // injected service from the app container
        let greeter = ctx
            .inject::<Greeter>()
            .map(|g| g.salutation)
            .unwrap_or("hello");
        let who = props
            .get("who")
            .and_then(|v| v.as_str())
            .unwrap_or("world")
            .to_string();
        let path = use_router(&ctx)?.current().path().to_string();

        // simulated data fetch; the mount resolves only after this settles
        tokio::time::sleep(Duration::from_millis(25)).await;

        ctx.expose(MountedAt(path.clone()));
        let line = format!("{greeter}, {who}!");
        Ok(Some(Box::new(move |_ctx| {
            VNode::fragment(vec![
                VNode::element("h1").child(VNode::text(line.clone())),
                VNode::widget("RouterLink")
                    .prop("to", path.clone())
                    .child(VNode::text("back here")),
            ])
        })))
    }
}

#[derive(Debug)]
struct MountedAt(String);

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let app = App::builder()
        .provide(Greeter { salutation: "ahoy" })
        .global_property("release", "1.0.0")
        .build();
    let env = TestEnvironment::install(app);

    let wrapper = env
        .mount_suspended(
            Welcome,
            MountOptions::new().prop("who", "sailor").route("/deck"),
        )
        .await?;

    println!("html:    {}", wrapper.html());
    println!("text:    {}", wrapper.text());
    println!("route:   {}", wrapper.route());
    if let Some(at) = wrapper.exposed::<MountedAt>() {
        println!("exposed: mounted at {}", at.0);
    }
    Ok(())
}
