//! One console session: commands read from a line source, states written out.

use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use client_core::{ItemViewModel, SharingPolicy};
use futures::{Stream, StreamExt};
use shared::{command::CommandReceiver, state::UiState};
use storage::InMemoryItemRepository;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::oneshot,
};
use tracing::{debug, info};

use crate::{
    config::Settings,
    input::{Draft, Input},
    render::render_state,
};

/// Runs until `quit` or end of input, then waits for pending saves to show up
/// in the rendered output before returning.
pub async fn run_session<R, W>(input: R, settings: &Settings, json: bool, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let repository = Arc::new(InMemoryItemRepository::with_items(
        settings.seed_items.clone(),
    ));
    let view_model = ItemViewModel::with_policy(
        repository.clone(),
        SharingPolicy::while_subscribed(settings.grace_period()),
    );
    info!(
        grace_period_ms = settings.grace_period_ms,
        seed_items = settings.seed_items.len(),
        "item console ready"
    );

    let states = view_model.ui_state().into_stream();
    let (final_tx, final_rx) = oneshot::channel();
    let draft = Draft::new(settings.default_text.clone());

    let view_model = &view_model;
    let repository = &repository;
    let intake = async move {
        let read = read_commands(input, view_model, draft).await;
        view_model.flush_saves().await;
        let _ = final_tx.send(UiState::Success(repository.snapshot()));
        read
    };

    let (read, rendered) = tokio::join!(intake, render_states(states, final_rx, json, out));
    read?;
    rendered
}

async fn read_commands<R>(input: R, view_model: &ItemViewModel, mut draft: Draft) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        match draft.parse_line(&line) {
            Input::Dispatch(command) => {
                view_model.process_command(command);
                debug!(draft = draft.text(), "command dispatched");
            }
            Input::Quit => break,
            Input::Empty => {}
            Input::Unknown(raw) => {
                eprintln!(
                    "unknown command '{raw}'; expected add, edit <text>, delete, list, save [text] or quit"
                );
            }
        }
    }
    Ok(())
}

/// Writes every state until the one announced on `last` has been written.
async fn render_states<S, W>(
    states: S,
    mut last: oneshot::Receiver<UiState>,
    json: bool,
    out: &mut W,
) -> Result<()>
where
    S: Stream<Item = UiState>,
    W: Write,
{
    let mut states = Box::pin(states);
    let mut written: Option<UiState> = None;
    let mut target: Option<UiState> = None;

    loop {
        if target.is_some() && target == written {
            return Ok(());
        }

        tokio::select! {
            next = states.next() => {
                let Some(state) = next else {
                    return Ok(());
                };
                writeln!(out, "{}", render_state(&state, json)?)
                    .context("failed to write state")?;
                written = Some(state);
            }
            announced = &mut last, if target.is_none() => {
                match announced {
                    Ok(state) => target = Some(state),
                    Err(_) => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
