//! Property-based tests for the controller
//!
//! These tests verify key invariants hold across arbitrary operation sequences.

use super::*;
use crate::backend::BackendError;
use crate::session::{MemoryStore, Role, SessionStore};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Send(String),
    Resolve { pick: usize, ok: bool },
    NewChat,
    Switch(usize),
    Clear(usize),
}

struct Harness {
    backend: Arc<MemoryStore>,
    controller: ConversationController,
    outstanding: Vec<TurnTicket>,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(MemoryStore::new());
        let controller = ConversationController::new(SessionStore::open(backend.clone()));
        Self {
            backend,
            controller,
            outstanding: vec![],
        }
    }

    fn session_at(&self, index: usize) -> crate::session::SessionId {
        let sessions = self.controller.store().list_sessions();
        sessions[index % sessions.len()].id.clone()
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Send(text) => {
                if let Ok(ticket) = self.controller.send(&text) {
                    self.outstanding.push(ticket);
                }
            }
            Op::Resolve { pick, ok } => {
                if self.outstanding.is_empty() {
                    return;
                }
                let ticket = self.outstanding.remove(pick % self.outstanding.len());
                let result = if ok {
                    Ok(format!("answer to {}", ticket.request.message))
                } else {
                    Err(BackendError::network("down"))
                };
                self.controller.resolve(&ticket, result);
            }
            Op::NewChat => {
                self.controller.new_chat();
            }
            Op::Switch(index) => {
                let id = self.session_at(index);
                self.controller.switch_session(&id).unwrap();
            }
            Op::Clear(index) => {
                let id = self.session_at(index);
                self.controller.clear_session(&id).unwrap();
            }
        }
    }

    fn check_invariants(&self) {
        let store = self.controller.store();
        assert!(!store.is_empty());
        let active = store.active_id().expect("a session is always active");
        assert!(store.get(active).is_some());

        for summary in store.list_sessions() {
            let session = store.get(&summary.id).unwrap();
            let pending: Vec<_> = session
                .messages
                .iter()
                .enumerate()
                .filter(|(_, m)| m.pending)
                .collect();
            assert!(pending.len() <= 1, "more than one placeholder");
            if let Some((index, message)) = pending.first() {
                assert_eq!(*index, session.messages.len() - 1);
                assert_eq!(message.role, Role::Assistant);
            }
        }

        let active_session = store.active().unwrap();
        assert_eq!(self.controller.loading(), active_session.has_pending());
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z][a-zA-Z ]{0,20}",
        1 => "[ \t\n]{0,5}",
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => arb_text().prop_map(Op::Send),
        4 => (any::<usize>(), any::<bool>()).prop_map(|(pick, ok)| Op::Resolve { pick, ok }),
        1 => Just(Op::NewChat),
        2 => any::<usize>().prop_map(Op::Switch),
        1 => any::<usize>().prop_map(Op::Clear),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_invariants_hold_for_any_sequence(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut harness = Harness::new();
        harness.check_invariants();
        for op in ops {
            harness.apply(op);
            harness.check_invariants();
        }
    }

    #[test]
    fn prop_whitespace_send_is_noop(text in "[ \t\n\r]{0,10}") {
        let mut harness = Harness::new();
        let before = harness.controller.view();
        prop_assert_eq!(harness.controller.send(&text), Err(TransitionError::EmptyMessage));
        prop_assert_eq!(harness.controller.view(), before);
    }

    #[test]
    fn prop_turn_adds_one_user_and_at_most_one_assistant(
        text in "[a-zA-Z][a-zA-Z ]{0,20}",
        ok in any::<bool>(),
    ) {
        let mut harness = Harness::new();
        let ticket = harness.controller.send(&text).unwrap();
        harness.controller.resolve(&ticket, if ok {
            Ok("reply".to_string())
        } else {
            Err(BackendError::empty_completion())
        });

        let messages = harness.controller.view().messages;
        let users = messages.iter().filter(|m| m.role == Role::User).count();
        let assistants = messages.iter().filter(|m| m.role == Role::Assistant).count();
        prop_assert_eq!(users, 1);
        prop_assert_eq!(assistants, usize::from(ok));
        prop_assert!(messages.iter().all(|m| !m.pending));
        prop_assert_eq!(harness.controller.error().is_some(), !ok);
    }

    #[test]
    fn prop_second_send_rejected_while_pending(first in "[a-z]{1,10}", second in "[a-z]{1,10}") {
        let mut harness = Harness::new();
        harness.controller.send(&first).unwrap();
        let before = harness.controller.view();
        prop_assert_eq!(harness.controller.send(&second), Err(TransitionError::TurnInFlight));
        prop_assert_eq!(harness.controller.view(), before);
    }

    #[test]
    fn prop_completion_only_grows_originating_session(
        detours in proptest::collection::vec(prop_oneof![Just(Op::NewChat), any::<usize>().prop_map(Op::Switch)], 1..6),
    ) {
        let mut harness = Harness::new();
        let ticket = harness.controller.send("Hello").unwrap();

        for op in detours {
            harness.apply(op);
        }
        let before: Vec<_> = harness
            .controller
            .store()
            .list_sessions()
            .into_iter()
            .map(|s| (s.id.clone(), harness.controller.store().get(&s.id).unwrap().messages.clone()))
            .collect();

        harness.controller.resolve(&ticket, Ok("Answer".to_string()));

        for (id, messages) in before {
            let after = &harness.controller.store().get(&id).unwrap().messages;
            if id == ticket.session_id {
                prop_assert_eq!(after.len(), messages.len());
                prop_assert_eq!(after.last().map(|m| m.text.as_str()), Some("Answer"));
            } else {
                prop_assert_eq!(after, &messages);
            }
        }
    }

    #[test]
    fn prop_save_reload_round_trip(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut harness = Harness::new();
        for op in ops {
            harness.apply(op);
        }
        let store = harness.controller.store();
        store.save();

        let reloaded = SessionStore::load(harness.backend.as_ref());
        let expected: Vec<_> = store
            .list_sessions()
            .into_iter()
            .map(|s| {
                let session = store.get(&s.id).unwrap();
                (s.id.clone(), session.persisted_messages().cloned().collect::<Vec<_>>())
            })
            .collect();
        let actual: Vec<_> = reloaded.into_iter().map(|s| (s.id, s.messages)).collect();
        prop_assert_eq!(actual, expected);
    }
}
