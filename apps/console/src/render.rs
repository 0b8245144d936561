use anyhow::Result;
use shared::state::UiState;

pub fn render_state(state: &UiState, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(state)?);
    }

    if let Some(cause) = state.error() {
        return Ok(format!("error: {cause}"));
    }

    Ok(match state.items() {
        None => "loading".to_string(),
        Some([]) => "no saved items".to_string(),
        Some(items) => items
            .iter()
            .map(|item| format!("Saved item: {item}"))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::SourceError;

    #[test]
    fn success_lists_items_in_order() {
        let state = UiState::Success(vec!["Compose".into(), "Room".into()]);
        assert_eq!(
            render_state(&state, false).expect("render"),
            "Saved item: Compose\nSaved item: Room"
        );
    }

    #[test]
    fn error_shows_cause() {
        let state = UiState::Error(SourceError::unavailable("locked"));
        assert_eq!(
            render_state(&state, false).expect("render"),
            "error: Unavailable: locked"
        );
    }

    #[test]
    fn json_output_is_tagged() {
        let rendered = render_state(&UiState::Loading, true).expect("render");
        assert_eq!(rendered, r#"{"state":"loading"}"#);
    }
}
