mod common;

use std::sync::Arc;
use std::time::Duration;

use common::within;
use serde_json::{json, Value};
use statebridge::app::console::{self, Command};
use statebridge::app::OwnerRuntime;
use statebridge::bridge::ViewBridge;
use statebridge::config::Config;
use statebridge::effects::ViewSurface;
use statebridge::protocol::WireIntent;
use statebridge::reducers::{Action, AppState, VisibleId};
use statebridge::shutdown::ShutdownManager;

/// Poll `condition` until it holds.
async fn eventually<F: Fn() -> bool>(condition: F) {
    within(async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}

fn started() -> (OwnerRuntime, Arc<ShutdownManager>) {
    let shutdown = Arc::new(ShutdownManager::new());
    let mut runtime = OwnerRuntime::new(&Config::default());
    runtime.start(Arc::clone(&shutdown));
    (runtime, shutdown)
}

/// Startup materializes exactly the default visible set.
#[tokio::test]
async fn test_startup_materializes_default_surfaces() {
    let (runtime, shutdown) = started();

    let index = runtime.window(VisibleId::Index).unwrap();
    assert!(index.is_visible());
    assert_eq!(index.path(), "index.html");
    assert!(runtime.tray().is_visible());
    assert_eq!(
        runtime.tray().tooltip().as_deref(),
        Some("counter: 0, to-dos: 0/0")
    );
    assert!(!runtime.window(VisibleId::AddToDoVanilla).unwrap().is_visible());

    runtime.stop(&shutdown).await;
}

/// A view toggling a window drives the window's lifecycle through state.
#[tokio::test]
async fn test_view_toggle_creates_and_destroys_window() {
    let (runtime, shutdown) = started();
    let view = ViewBridge::<AppState, Action>::new(runtime.endpoint());
    let window = runtime.window(VisibleId::AddToDoSvelte).unwrap();

    view.dispatch_wire(WireIntent::with_payload(
        "SETTINGS:TOGGLE_VISIBLE",
        json!("add-to-do/svelte"),
    ));
    let state = within(view.get_state()).await.unwrap().state;
    assert!(state.settings.is_visible(VisibleId::AddToDoSvelte));
    assert!(window.is_visible());

    view.dispatch_wire(WireIntent::with_payload(
        "SETTINGS:TOGGLE_VISIBLE",
        json!("add-to-do/svelte"),
    ));
    let state = within(view.get_state()).await.unwrap().state;
    assert!(!state.settings.is_visible(VisibleId::AddToDoSvelte));
    assert!(!window.is_visible());

    runtime.stop(&shutdown).await;
}

/// Adding an already visible window focuses it instead of creating another.
#[tokio::test]
async fn test_adding_visible_window_focuses_it() {
    let (runtime, shutdown) = started();
    let view = ViewBridge::<AppState, Action>::new(runtime.endpoint());
    let index = runtime.window(VisibleId::Index).unwrap();

    view.dispatch_wire(WireIntent::with_payload("SETTINGS:ADD_VISIBLE", json!("index")));
    within(view.get_state()).await.unwrap();

    assert_eq!(index.focus_count(), 1);
    assert!(index.is_visible());

    runtime.stop(&shutdown).await;
}

/// A user closing a window updates the visible set without re-creating it.
#[tokio::test]
async fn test_user_close_updates_state() {
    let (runtime, shutdown) = started();
    let index = runtime.window(VisibleId::Index).unwrap();

    assert_eq!(
        runtime.execute(console::parse("close index").unwrap(), &shutdown),
        None
    );
    assert!(!index.is_visible());
    eventually(|| !runtime.store().get_state().settings.is_visible(VisibleId::Index)).await;
    assert!(!index.is_visible());

    runtime.stop(&shutdown).await;
}

/// The tray tooltip follows every commit.
#[tokio::test]
async fn test_tray_follows_state() {
    let (runtime, shutdown) = started();
    let dispatcher = runtime.dispatcher();

    dispatcher.dispatch(WireIntent::with_payload("INCREASE_BY", json!(4)));
    dispatcher.dispatch(WireIntent::with_payload("TO_DO:ADD", json!("walk the dog")));

    let tray = runtime.tray();
    eventually(|| tray.tooltip().as_deref() == Some("counter: 4, to-dos: 0/1")).await;

    runtime.stop(&shutdown).await;
}

/// Console commands dispatch, delay and report state.
#[tokio::test]
async fn test_console_commands() {
    let (runtime, shutdown) = started();

    runtime.execute(console::parse("INCREMENT").unwrap(), &shutdown);
    runtime.execute(console::parse("after 10 INCREASE_BY 5").unwrap(), &shutdown);
    eventually(|| runtime.store().get_state().counter == 6).await;

    let printed = runtime.execute(Command::State, &shutdown).unwrap();
    let printed: Value = serde_json::from_str(&printed).unwrap();
    assert_eq!(printed["state"]["counter"], json!(6));
    assert_eq!(printed["revision"], json!(runtime.store().revision()));

    runtime.execute(Command::Quit, &shutdown);
    assert!(shutdown.is_shutting_down());
    runtime.stop(&shutdown).await;
}

/// Console input is read line by line until quit.
#[tokio::test]
async fn test_console_reader_stops_on_quit() {
    let (runtime, shutdown) = started();
    let input: &[u8] = b"INCREMENT\n\nbogus-close\nINCREMENT\nquit\nINCREMENT\n";

    within(runtime.run_console(input, &shutdown)).await.unwrap();
    assert!(shutdown.is_shutting_down());

    // Unknown commands are dispatched as unknown intents: two increments
    // and one identity commit, but nothing after quit.
    eventually(|| runtime.store().revision() >= 3).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(runtime.store().get_state().counter, 2);

    runtime.stop(&shutdown).await;
}

/// Stopping tears down every materialized surface.
#[tokio::test]
async fn test_stop_tears_down_surfaces() {
    let (runtime, shutdown) = started();
    let index = runtime.window(VisibleId::Index).unwrap();
    let tray = runtime.tray();

    runtime.stop(&shutdown).await;

    assert!(!index.is_visible());
    assert!(!tray.is_visible());
}

/// The startup visible set comes from configuration.
#[tokio::test]
async fn test_startup_visible_set_from_config() {
    let shutdown = Arc::new(ShutdownManager::new());
    let mut config = Config::default();
    config.startup.visible = vec![VisibleId::AddToDoVanilla];

    let mut runtime = OwnerRuntime::new(&config);
    runtime.start(Arc::clone(&shutdown));

    assert!(runtime.window(VisibleId::AddToDoVanilla).unwrap().is_visible());
    assert!(!runtime.window(VisibleId::Index).unwrap().is_visible());
    assert!(!runtime.tray().is_visible());

    runtime.stop(&shutdown).await;
}

/// Removing and re-adding a window back to back leaves state and window in
/// agreement.
#[tokio::test]
async fn test_remove_then_add_keeps_window_and_state_in_sync() {
    let (runtime, shutdown) = started();
    let view = ViewBridge::<AppState, Action>::new(runtime.endpoint());
    let index = runtime.window(VisibleId::Index).unwrap();

    view.dispatch_wire(WireIntent::with_payload("SETTINGS:REMOVE_VISIBLE", json!("index")));
    view.dispatch_wire(WireIntent::with_payload("SETTINGS:ADD_VISIBLE", json!("index")));
    let state = within(view.get_state()).await.unwrap().state;

    assert!(state.settings.is_visible(VisibleId::Index));
    assert!(index.is_visible());

    // The next toggle still closes the window rather than focusing it.
    view.dispatch_wire(WireIntent::with_payload("SETTINGS:TOGGLE_VISIBLE", json!("index")));
    let state = within(view.get_state()).await.unwrap().state;
    assert!(!state.settings.is_visible(VisibleId::Index));
    assert!(!index.is_visible());
    assert_eq!(index.focus_count(), 0);

    runtime.stop(&shutdown).await;
}

/// A close that races an earlier re-add does not remove the re-created
/// window from state.
#[tokio::test]
async fn test_close_racing_add_keeps_window_and_state_in_sync() {
    let (runtime, shutdown) = started();
    let view = ViewBridge::<AppState, Action>::new(runtime.endpoint());
    let index = runtime.window(VisibleId::Index).unwrap();

    view.dispatch_wire(WireIntent::with_payload("SETTINGS:ADD_VISIBLE", json!("index")));
    index.close();
    let state = within(view.get_state()).await.unwrap().state;

    assert_eq!(state.settings.is_visible(VisibleId::Index), index.is_visible());
    assert!(index.is_visible());

    runtime.stop(&shutdown).await;
}
