mod common;

use common::{app_store, spawn_owner, within};
use serde_json::{json, Value};
use statebridge::app::console::parse_intent;
use statebridge::app::viewer::{run_viewer, ViewerOptions};
use statebridge::bridge::{stream, BridgeSettings};
use statebridge::shutdown::ShutdownManager;
use statebridge::view_store::BootstrapMode;

fn printed_lines(out: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(out)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// `--once` prints a single state that already includes the dispatches.
#[tokio::test]
async fn test_once_prints_state_after_dispatches() {
    let owner = spawn_owner(app_store(), BridgeSettings::default());
    let (owner_io, view_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(stream::serve_connection(owner_io, owner.endpoint.clone()));

    let options = ViewerOptions {
        dispatch: vec![
            parse_intent("INCREASE_BY 3").unwrap(),
            parse_intent(r#"TO_DO:ADD {"id":"x","title":"stretch"}"#).unwrap(),
        ],
        once: true,
        ..ViewerOptions::default()
    };
    let mut out = Vec::new();
    within(run_viewer(view_io, options, &mut out, &ShutdownManager::new()))
        .await
        .unwrap();

    let lines = printed_lines(&out);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["revision"], json!(2));
    assert_eq!(lines[0]["state"]["counter"], json!(3));
    assert_eq!(lines[0]["state"]["toDos"]["items"][0]["title"], json!("stretch"));
}

/// Without `--once` the viewer prints every state until shutdown.
#[tokio::test]
async fn test_follow_prints_until_shutdown() {
    let owner = spawn_owner(app_store(), BridgeSettings::default());
    let (owner_io, view_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(stream::serve_connection(owner_io, owner.endpoint.clone()));

    let shutdown = std::sync::Arc::new(ShutdownManager::new());
    let options = ViewerOptions {
        bootstrap: BootstrapMode::SentinelDispatch,
        dispatch: vec![parse_intent("INCREMENT").unwrap()],
        ..ViewerOptions::default()
    };

    let viewer = {
        let shutdown = std::sync::Arc::clone(&shutdown);
        tokio::spawn(async move {
            let mut out = Vec::new();
            run_viewer(view_io, options, &mut out, &shutdown).await.map(|_| out)
        })
    };

    within(async {
        while owner.store.get_state().counter != 1 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    shutdown.signal();

    let out = within(viewer).await.unwrap().unwrap();
    let lines = printed_lines(&out);
    let last = lines.last().unwrap();
    assert_eq!(last["state"]["counter"], json!(1));
    assert_eq!(last["revision"], json!(2));
}
