//! Plain-text rendering for the terminal

use crate::backend::{all_models, default_model};
use crate::controller::ViewModel;
use crate::session::{Message, Role, SessionSummary};
use chrono::Local;
use std::fmt::Write;

const PLACEHOLDER: &str = "…";
const LOADING_STATUS: &str = "sending…";

/// One transcript line, continuation lines indented under the prefix
pub fn render_message(message: &Message) -> String {
    let prefix = match message.role {
        Role::User => "you> ",
        Role::Assistant => "ai>  ",
    };
    if message.pending {
        return format!("{prefix}{PLACEHOLDER}");
    }

    let mut out = String::new();
    for (i, line) in message.text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str("     ");
        } else {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out.push_str(prefix.trim_end());
    }
    out
}

fn render_status(view: &ViewModel, out: &mut String) {
    if view.loading {
        let _ = writeln!(out, "   [{LOADING_STATUS}]");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "!! {error}");
    }
}

/// Full transcript of the active session
pub fn render_transcript(view: &ViewModel) -> String {
    let mut out = String::new();
    let id = view.active_id.as_ref().map_or("-", |id| id.as_str());
    let _ = writeln!(out, "=== chat {id} ===");
    for message in &view.messages {
        let _ = writeln!(out, "{}", render_message(message));
    }
    render_status(view, &mut out);
    out
}

/// Output needed to move the terminal from `prev` to `next`.
///
/// A session change reprints the whole transcript. Otherwise only settled
/// messages past the shared prefix are printed, plus status changes.
pub fn render_update(prev: &ViewModel, next: &ViewModel) -> String {
    if prev.active_id != next.active_id {
        return render_transcript(next);
    }

    let settled = |view: &ViewModel| -> Vec<Message> {
        view.messages.iter().filter(|m| !m.pending).cloned().collect()
    };
    let before = settled(prev);
    let after = settled(next);
    let shared = before
        .iter()
        .zip(&after)
        .take_while(|(a, b)| a == b)
        .count();
    if shared < before.len() {
        // History changed underneath us
        return render_transcript(next);
    }

    let mut out = String::new();
    for message in &after[shared..] {
        let _ = writeln!(out, "{}", render_message(message));
    }
    if next.loading && !prev.loading {
        let _ = writeln!(out, "   [{LOADING_STATUS}]");
    }
    if next.error != prev.error {
        if let Some(error) = &next.error {
            let _ = writeln!(out, "!! {error}");
        }
    }
    out
}

/// Session list with local creation time, message count, and the active marker
pub fn render_sessions(view: &ViewModel) -> String {
    let mut out = String::new();
    for summary in &view.sessions {
        let _ = writeln!(out, "{}", render_summary(summary, view));
    }
    out
}

fn render_summary(summary: &SessionSummary, view: &ViewModel) -> String {
    let marker = if view.active_id.as_ref() == Some(&summary.id) {
        '*'
    } else {
        ' '
    };
    let created = summary.created_at.map_or_else(
        || "unknown time".to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    let noun = if summary.message_count == 1 {
        "message"
    } else {
        "messages"
    };
    format!(
        "{marker} {}  {created}  {} {noun}",
        summary.id, summary.message_count
    )
}

/// Model catalog with the selection marked
pub fn render_models(selected: Option<&str>) -> String {
    let selected = selected.unwrap_or(default_model().id);
    let mut out = String::new();
    for model in all_models() {
        let marker = if model.id == selected { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {}  {}", model.id, model.description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    fn view(messages: Vec<Message>) -> ViewModel {
        ViewModel {
            active_id: Some(SessionId::from_millis(1_700_000_000_000)),
            messages,
            ..ViewModel::default()
        }
    }

    #[test]
    fn test_render_message() {
        assert_eq!(render_message(&Message::user("Hello")), "you> Hello");
        assert_eq!(render_message(&Message::assistant("Hi")), "ai>  Hi");
        assert_eq!(render_message(&Message::placeholder()), "ai>  …");
        assert_eq!(
            render_message(&Message::assistant("one\ntwo")),
            "ai>  one\n     two"
        );
    }

    #[test]
    fn test_transcript_shows_placeholder_and_status() {
        let mut v = view(vec![Message::user("Hello"), Message::placeholder()]);
        v.loading = true;
        assert_eq!(
            render_transcript(&v),
            "=== chat 1700000000000 ===\nyou> Hello\nai>  …\n   [sending…]\n"
        );
    }

    #[test]
    fn test_update_prints_only_new_settled_messages() {
        let mut sending = view(vec![Message::user("Hello"), Message::placeholder()]);
        sending.loading = true;
        let idle = view(vec![]);
        assert_eq!(render_update(&idle, &sending), "you> Hello\n   [sending…]\n");

        let done = view(vec![Message::user("Hello"), Message::assistant("Hi")]);
        assert_eq!(render_update(&sending, &done), "ai>  Hi\n");
    }

    #[test]
    fn test_update_prints_new_error_once() {
        let sending = view(vec![Message::user("Hello"), Message::placeholder()]);
        let mut failed = view(vec![Message::user("Hello")]);
        failed.error = Some("Request cancelled.".to_string());
        assert_eq!(render_update(&sending, &failed), "!! Request cancelled.\n");
        assert_eq!(render_update(&failed, &failed), "");
    }

    #[test]
    fn test_update_on_switch_reprints_transcript() {
        let prev = view(vec![Message::user("Hello")]);
        let mut next = view(vec![]);
        next.active_id = Some(SessionId::from_millis(1_700_000_000_001));
        assert_eq!(render_update(&prev, &next), "=== chat 1700000000001 ===\n");
    }

    #[test]
    fn test_sessions_list_marks_active() {
        let active = SessionId::from_millis(1_700_000_000_001);
        let v = ViewModel {
            active_id: Some(active.clone()),
            sessions: vec![
                SessionSummary {
                    id: SessionId::new("legacy"),
                    created_at: None,
                    message_count: 1,
                },
                SessionSummary {
                    id: active.clone(),
                    created_at: active.created_at(),
                    message_count: 2,
                },
            ],
            ..ViewModel::default()
        };
        let lines: Vec<String> = render_sessions(&v).lines().map(String::from).collect();
        assert_eq!(lines[0], "  legacy  unknown time  1 message");
        assert!(lines[1].starts_with("* 1700000000001  "));
        assert!(lines[1].ends_with("  2 messages"));
    }

    #[test]
    fn test_models_marks_default_when_unset() {
        let out = render_models(None);
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("* meta-llama/Llama-3.2-1B-Instruct"));
        assert_eq!(out.lines().filter(|l| l.starts_with('*')).count(), 1);
    }
}
