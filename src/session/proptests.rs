//! Property-based tests for the session state machine
//!
//! Random operation sequences are applied to a session coupled to a
//! conversation log the way the controller couples them, and the core
//! invariants are checked after every step.

use super::state::*;
use crate::conversation::{ConversationLog, Turn};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Upload(String),
    SelectMode(AgentMode),
    BeginExchange,
    FinishExchange,
    AppendUser(String),
    AppendBot(String),
    Reset,
}

fn arb_agent_mode() -> impl Strategy<Value = AgentMode> {
    prop_oneof![
        Just(AgentMode::Auto),
        Just(AgentMode::Qa),
        Just(AgentMode::Summarize),
        Just(AgentMode::Ppt),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,8}\\.pdf".prop_map(Op::Upload),
        arb_agent_mode().prop_map(Op::SelectMode),
        Just(Op::BeginExchange),
        Just(Op::FinishExchange),
        "[a-z ]{1,20}".prop_map(Op::AppendUser),
        "[a-z ]{1,20}".prop_map(Op::AppendBot),
        Just(Op::Reset),
    ]
}

// ============================================================================
// Test Harness
// ============================================================================

/// Apply one operation with the controller's session/log coupling.
/// Returns whether the log was cleared by this step.
fn apply(op: &Op, session: &mut Session, log: &mut ConversationLog) -> bool {
    match op {
        Op::Upload(filename) => {
            if session.begin_upload().is_ok() {
                log.clear();
                session
                    .complete_upload(Document::new(filename.clone()))
                    .expect("upload guard passed");
                return true;
            }
            false
        }
        Op::SelectMode(mode) => {
            let _ = session.select_agent_mode(*mode);
            false
        }
        Op::BeginExchange => {
            let _ = session.begin_exchange();
            false
        }
        Op::FinishExchange => {
            session.finish_exchange();
            false
        }
        Op::AppendUser(text) => {
            // Turns are only reachable with a document attached
            if session.status() != SessionStatus::Empty {
                log.append_user(text.clone());
            }
            false
        }
        Op::AppendBot(text) => {
            if session.status() != SessionStatus::Empty {
                log.append_bot(text.clone(), None, None);
            }
            false
        }
        Op::Reset => {
            if session.reset().is_ok() {
                log.clear();
                return true;
            }
            false
        }
    }
}

fn check_invariants(session: &Session, log: &ConversationLog) -> Result<(), TestCaseError> {
    // Document present iff not Empty
    prop_assert_eq!(
        session.document().is_some(),
        session.status() != SessionStatus::Empty,
        "document/status invariant violated: {:?}",
        session
    );
    // Busy implies a document is attached
    if session.is_busy() {
        prop_assert_eq!(session.status(), SessionStatus::Busy);
        prop_assert!(session.document().is_some());
    }
    // Ordinals are contiguous from zero
    for (i, turn) in log.turns().iter().enumerate() {
        prop_assert_eq!(turn.ordinal, i, "non-contiguous ordinal at {}", i);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: session/log invariants hold after any operation sequence
    #[test]
    fn prop_ops_preserve_invariants(ops in proptest::collection::vec(arb_op(), 0..50)) {
        let mut session = Session::new();
        let mut log = ConversationLog::new();

        for op in &ops {
            apply(op, &mut session, &mut log);
            check_invariants(&session, &log)?;
        }
    }

    // Invariant 2: appends are monotonic between clears - the log observed
    // earlier is a prefix of the log observed later
    #[test]
    fn prop_log_is_monotonic_between_clears(ops in proptest::collection::vec(arb_op(), 0..50)) {
        let mut session = Session::new();
        let mut log = ConversationLog::new();
        let mut snapshot: Vec<Turn> = Vec::new();

        for op in &ops {
            let cleared = apply(op, &mut session, &mut log);
            if cleared {
                snapshot.clear();
            }
            prop_assert!(log.len() >= snapshot.len());
            prop_assert_eq!(&log.turns()[..snapshot.len()], snapshot.as_slice());
            snapshot = log.turns().to_vec();
        }
    }

    // Invariant 3: a successful reset always restores the initial state
    #[test]
    fn prop_reset_restores_initial_state(ops in proptest::collection::vec(arb_op(), 0..50)) {
        let mut session = Session::new();
        let mut log = ConversationLog::new();

        for op in &ops {
            apply(op, &mut session, &mut log);
        }

        if session.reset().is_ok() {
            log.clear();
            prop_assert_eq!(session.status(), SessionStatus::Empty);
            prop_assert!(session.document().is_none());
            prop_assert_eq!(session.agent_mode(), AgentMode::Auto);
            prop_assert!(!session.is_busy());
            prop_assert_eq!(log.len(), 0);
        } else {
            // Reset only fails when there is nothing to reset
            prop_assert_eq!(session.status(), SessionStatus::Empty);
        }
    }

    // Invariant 4: every transition into Ready starts from the default mode
    #[test]
    fn prop_fresh_ready_defaults_to_auto(
        mode in arb_agent_mode(),
        filename in "[a-z]{1,8}\\.pdf",
    ) {
        let mut session = Session::new();
        session.complete_upload(Document::new("first.pdf")).unwrap();
        session.select_agent_mode(mode).unwrap();
        session.reset().unwrap();
        session.complete_upload(Document::new(filename)).unwrap();
        prop_assert_eq!(session.agent_mode(), AgentMode::Auto);
    }
}
