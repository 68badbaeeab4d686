//! Integration tests driving the full bridge: controller half against an
//! in-process page runtime.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;

use stagerpc::TypeRef;
use stagerpc::mounted_selector;

use stagerun::bridge::Bridge;
use stagerun::bridge::BridgeConfig;
use stagerun::bridge::Error;
use stagerun::component::ComponentRef;
use stagerun::component::MountOptions;
use stagerun::context::RemoteContext;
use stagerun::inproc::InProcessPage;
use stagerun::page::PageComponent;
use stagerun::page::framework::Framework;
use stagerun::page::framework::StubFramework;
use stagerun::page::registry::ComponentRegistry;
use stagerun::page::root::RootNode;
use stagerun::session::MountHandle;
use stagerun::value::Prop;

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn config() -> BridgeConfig {
    BridgeConfig::new().bootstrap("about:stage")
}

/// Framework decorator that counts lifecycle calls.
#[derive(Clone)]
struct CountingFramework {
    inner: StubFramework,
    mounts: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
    unmounts: Arc<AtomicUsize>,
}

impl CountingFramework {
    fn new() -> Self {
        Self {
            inner: StubFramework::new(),
            mounts: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(AtomicUsize::new(0)),
            unmounts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Framework for CountingFramework {
    fn mount(
        &self,
        root: &mut RootNode,
        component: PageComponent,
        hooks_config: Option<Value>,
    ) -> stagerun::page::framework::Result<()> {
        self.mounts.fetch_add(1, Ordering::SeqCst);
        self.inner.mount(root, component, hooks_config)
    }

    fn update(
        &self,
        root: &mut RootNode,
        component: PageComponent,
    ) -> stagerun::page::framework::Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(root, component)
    }

    fn unmount(&self, root: &mut RootNode) -> stagerun::page::framework::Result<()> {
        self.unmounts.fetch_add(1, Ordering::SeqCst);
        self.inner.unmount(root)
    }
}

struct Harness {
    page: InProcessPage,
    bridge: Bridge,
    framework: CountingFramework,
}

async fn prepare_harness(register: &[(&str, &str)]) -> Harness {
    trace_init();

    let framework = CountingFramework::new();
    let registry = Arc::new(ComponentRegistry::new());
    for (module, export) in register {
        registry.register(*module, *export);
    }

    let page = InProcessPage::new(Arc::new(framework.clone()), registry);
    let context: Arc<dyn RemoteContext> = Arc::new(page.clone());
    let bridge = Bridge::prepare(context, &config()).await.expect("prepare failed");

    Harness {
        page,
        bridge,
        framework,
    }
}

// --- Counter scenario ---

#[tokio::test]
async fn test_counter_mount_click_dispatches_once() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let clicks = Arc::new(AtomicUsize::new(0));
    let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let counted = Arc::clone(&clicks);
    let captured = Arc::clone(&received);

    let handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new()
            .prop("count", 0)
            .prop(
                "onClick",
                Prop::callback(move |args| {
                    counted.fetch_add(1, Ordering::SeqCst);
                    captured.lock().unwrap().extend(args);
                }),
            ),
    )
    .await
    .expect("mount failed");

    assert_eq!(handle.selector(), mounted_selector());

    // The wire descriptor carried a token, and the page resolved the type.
    let resolved = harness
        .page
        .inspect(|runtime| {
            let root = runtime.root().expect("root must exist");
            let component = root.component().expect("component must be mounted");
            match component {
                PageComponent::Object { ty, .. } => ty.type_ref().clone(),
                PageComponent::Declarative(_) => panic!("expected object component"),
            }
        })
        .await
        .expect("page must have a document");
    assert_eq!(resolved, TypeRef::new("Counter", "Counter"));

    // Clicking in the page delivers (0, []) and invokes the original fn once.
    harness.page.trigger("onClick", vec![]).await.expect("trigger failed");
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_preserves_argument_order_and_values() {
    let harness = prepare_harness(&[("Input", "Input")]).await;

    let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&received);

    let _handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Input", "Input")),
        MountOptions::new().on(
            "change",
            Prop::callback(move |args| {
                captured.lock().unwrap().extend(args);
            }),
        ),
    )
    .await
    .expect("mount failed");

    harness
        .page
        .trigger("change", vec![json!("text"), json!(42), json!({ "k": [1, 2] })])
        .await
        .expect("trigger failed");

    assert_eq!(
        *received.lock().unwrap(),
        vec![json!("text"), json!(42), json!({ "k": [1, 2] })]
    );
}

// --- Root node lifecycle ---

#[tokio::test]
async fn test_updates_reuse_the_single_root_node() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let mut handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new().prop("count", 0),
    )
    .await
    .expect("mount failed");

    handle.update(MountOptions::new().prop("count", 1)).await.expect("update 1 failed");
    handle.update(MountOptions::new().prop("count", 2)).await.expect("update 2 failed");

    let roots = harness.page.inspect(|runtime| runtime.roots_created()).await;
    assert_eq!(roots, Some(1));
    assert_eq!(harness.framework.mounts.load(Ordering::SeqCst), 1);
    assert_eq!(harness.framework.updates.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_update_can_swap_in_a_new_component() {
    let harness = prepare_harness(&[("Counter", "Counter"), ("Timer", "Timer")]).await;

    let mut handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount failed");

    handle
        .update((
            ComponentRef::Type(TypeRef::new("Timer", "Timer")),
            MountOptions::new().prop("interval", 100),
        ))
        .await
        .expect("update failed");

    let resolved = harness
        .page
        .inspect(|runtime| {
            let component = runtime.root().unwrap().component().unwrap();
            match component {
                PageComponent::Object { ty, .. } => ty.type_ref().clone(),
                PageComponent::Declarative(_) => panic!("expected object component"),
            }
        })
        .await
        .unwrap();
    assert_eq!(resolved, TypeRef::new("Timer", "Timer"));
    assert_eq!(harness.page.inspect(|r| r.roots_created()).await, Some(1));
}

#[tokio::test]
async fn test_update_remarshal_appends_fresh_ordinals() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let first_clicks = Arc::new(AtomicUsize::new(0));
    let second_clicks = Arc::new(AtomicUsize::new(0));

    let counted = Arc::clone(&first_clicks);
    let mut handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new().prop(
            "onClick",
            Prop::callback(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        ),
    )
    .await
    .expect("mount failed");

    let counted = Arc::clone(&second_clicks);
    handle
        .update(MountOptions::new().prop(
            "onClick",
            Prop::callback(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        ))
        .await
        .expect("update failed");

    // The handler now mounted is the update's callback, under a new ordinal.
    harness.page.trigger("onClick", vec![]).await.expect("trigger failed");
    assert_eq!(first_clicks.load(Ordering::SeqCst), 0);
    assert_eq!(second_clicks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unmount_detaches_root_and_terminates_session() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount failed");

    handle.unmount().await.expect("unmount failed");

    assert_eq!(harness.framework.unmounts.load(Ordering::SeqCst), 1);
    let has_root = harness.page.inspect(|runtime| runtime.root().is_some()).await;
    assert_eq!(has_root, Some(false));
}

#[tokio::test]
async fn test_remount_after_unmount_creates_a_fresh_root() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount failed");
    handle.unmount().await.expect("unmount failed");

    let _handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("second mount failed");

    assert_eq!(harness.page.inspect(|r| r.roots_created()).await, Some(2));
}

// --- Declarative components ---

#[tokio::test]
async fn test_declarative_mount_transfers_tree_and_handlers() {
    let harness = prepare_harness(&[]).await;

    let presses = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&presses);
    let tree = Prop::map([
        ("tag", Prop::from("button")),
        ("label", Prop::from("Go")),
        (
            "onPress",
            Prop::callback(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        ),
    ]);

    let handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Declarative(tree),
        // Options are ignored for declarative components.
        MountOptions::new().prop("ignored", true),
    )
    .await
    .expect("mount failed");
    assert_eq!(handle.selector(), mounted_selector());

    harness.page.trigger("onPress", vec![]).await.expect("trigger failed");
    assert_eq!(presses.load(Ordering::SeqCst), 1);
}

// --- Hooks configuration ---

#[tokio::test]
async fn test_hooks_config_reaches_the_framework_at_mount() {
    let harness = prepare_harness(&[("App", "App")]).await;

    let _handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("App", "App")),
        MountOptions::new().hooks_config(json!({ "routing": "hash" })),
    )
    .await
    .expect("mount failed");

    let hooks = harness
        .page
        .inspect(|runtime| runtime.root().unwrap().hooks_config().cloned())
        .await
        .unwrap();
    assert_eq!(hooks, Some(json!({ "routing": "hash" })));
}

// --- Failure taxonomy ---

#[tokio::test]
async fn test_missing_bootstrap_config_fails_before_remote_interaction() {
    trace_init();
    let page = InProcessPage::new(
        Arc::new(StubFramework::new()),
        Arc::new(ComponentRegistry::new()),
    );
    let context: Arc<dyn RemoteContext> = Arc::new(page);

    let err = Bridge::prepare(context, &BridgeConfig::new()).await.unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("bootstrap"), "message not actionable: {}", msg),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_type_reference_is_a_resolution_failure() {
    let harness = prepare_harness(&[]).await;

    let err = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Missing", "Missing")),
        MountOptions::new(),
    )
    .await
    .unwrap_err();

    match err {
        Error::Resolution(msg) => assert!(msg.contains("Missing"), "unhelpful message: {}", msg),
        other => panic!("expected Resolution error, got {:?}", other),
    }

    // No partial mount is left addressable.
    assert_eq!(harness.page.inspect(|r| r.root().is_some()).await, Some(false));
    assert_eq!(harness.framework.mounts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_closed_context_is_distinct_from_resolution_failure() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let mut handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount failed");

    harness.page.close().await;

    let err = handle.update(MountOptions::new().prop("count", 1)).await.unwrap_err();
    match err {
        Error::Context(stagerun::context::Error::Unavailable(_)) => {}
        other => panic!("expected Context(Unavailable), got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_against_detached_root_reports_root_missing() {
    let harness = prepare_harness(&[("Counter", "Counter")]).await;

    let mut handle = MountHandle::mount(
        &harness.bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount failed");

    // The page re-bootstraps behind the controller's back: the document is
    // alive again but the session's root node is gone.
    harness.page.goto("about:stage").await.expect("re-navigation failed");

    let err = handle.update(MountOptions::new().prop("count", 1)).await.unwrap_err();
    match err {
        Error::RootMissing(_) => {}
        other => panic!("expected RootMissing error, got {:?}", other),
    }
}

// --- Readiness ---

#[tokio::test]
async fn test_mount_waits_for_late_booting_context() {
    trace_init();

    let registry = Arc::new(ComponentRegistry::new());
    registry.register("Counter", "Counter");
    let page = InProcessPage::new(Arc::new(StubFramework::new()), registry)
        .with_boot_delay(Duration::from_millis(50));
    let context: Arc<dyn RemoteContext> = Arc::new(page);

    let bridge = Bridge::prepare(context, &config()).await.expect("prepare failed");
    let handle = MountHandle::mount(
        &bridge,
        ComponentRef::Type(TypeRef::new("Counter", "Counter")),
        MountOptions::new(),
    )
    .await
    .expect("mount must wait out the boot delay");

    assert_eq!(handle.selector(), mounted_selector());
}
