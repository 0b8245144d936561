use std::{sync::Arc, time::Duration};

use client_core::{ItemViewModel, SharingPolicy};
use shared::{
    command::{dispatch, Command, CommandReceiver},
    state::UiState,
};
use storage::InMemoryItemRepository;

#[tokio::test]
async fn commands_from_the_ui_boundary_reach_the_repository() {
    let repo = InMemoryItemRepository::with_items(["Compose"]);
    let view_model = ItemViewModel::with_policy(
        Arc::new(repo.clone()),
        SharingPolicy::while_subscribed(Duration::from_millis(50)),
    );
    let mut state = view_model.ui_state();

    let receiver: &dyn CommandReceiver = &view_model;
    for command in [
        Command::TextUpdate("Room".to_string()),
        Command::Save("Room".to_string()),
        Command::List,
    ] {
        dispatch(command, receiver);
    }

    let expected = UiState::Success(vec!["Compose".to_string(), "Room".to_string()]);
    let reached = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if state.current() == expected {
                return;
            }
            if state.changed().await.is_none() {
                return;
            }
        }
    })
    .await;

    assert!(reached.is_ok(), "state never reached {expected:?}");
    assert_eq!(state.current(), expected);
    assert_eq!(repo.snapshot(), vec!["Compose", "Room"]);
}

#[tokio::test]
async fn observers_of_one_view_model_see_the_same_state() {
    let repo = InMemoryItemRepository::with_items(["One", "Two", "Three"]);
    let view_model = ItemViewModel::new(Arc::new(repo));

    let mut first = view_model.ui_state();
    let mut second = view_model.ui_state();

    let a = tokio::time::timeout(Duration::from_secs(1), first.changed())
        .await
        .expect("first observer updated");
    let b = tokio::time::timeout(Duration::from_secs(1), second.changed())
        .await
        .expect("second observer updated");

    assert_eq!(a, b);
    assert_eq!(
        view_model.state_publisher().upstream_starts(),
        1,
        "observers share a single repository query"
    );
}
