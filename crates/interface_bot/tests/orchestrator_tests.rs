//! Conversation scenarios driven through the orchestrator with recording fakes

use std::sync::Arc;
use std::time::Duration;

use core_kernel::{Clock, InboundEvent, UserId};
use domain_claims::ports::mock::MockClaimStore;
use domain_claims::{ClaimFlow, ClaimStore, Network};
use interface_bot::messages;
use interface_bot::{Orchestrator, OrchestratorSettings, ProgressReport, SessionStore};
use test_utils::{
    assert_last_buttons, assert_last_text, assert_silent, ClaimRecordBuilder, GatedClock,
    IdFixtures, InstantClock, RecordingNotifier, RecordingTransport,
};

struct Harness {
    orchestrator: Orchestrator,
    store: Arc<MockClaimStore>,
    transport: Arc<RecordingTransport>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self::build(Arc::new(MockClaimStore::new()), Arc::new(InstantClock::new()))
    }

    fn with_store(store: MockClaimStore) -> Self {
        Self::build(Arc::new(store), Arc::new(InstantClock::new()))
    }

    fn build(store: Arc<MockClaimStore>, clock: Arc<dyn Clock>) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = Orchestrator::new(
            ClaimFlow::new(store.clone()),
            Arc::new(SessionStore::new()),
            transport.clone(),
            notifier.clone(),
            clock,
            OrchestratorSettings {
                operator: IdFixtures::operator(),
                progress_delay: Duration::from_millis(1200),
            },
        );
        Self {
            orchestrator,
            store,
            transport,
            notifier,
        }
    }

    async fn command(&self, user: UserId, command: &str) {
        self.orchestrator.handle(InboundEvent::command(command, user)).await;
    }

    async fn button(&self, user: UserId, data: &str) {
        self.orchestrator.handle(InboundEvent::button(data, user)).await;
    }

    async fn text(&self, user: UserId, text: &str) {
        self.orchestrator.handle(InboundEvent::text(text, user)).await;
    }

    async fn walk_to_wallet(&self, user: UserId) {
        self.button(user, messages::CLAIM_BUTTON_DATA).await;
        self.text(user, "player1").await;
        self.button(user, "ETH").await;
    }
}

// ============================================================================
// Happy Path
// ============================================================================

mod happy_path_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_claim_conversation() {
        let h = Harness::new();
        let alice = IdFixtures::alice();

        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        assert_last_text(&h.transport, alice, messages::ASK_HANDLE);

        h.text(alice, "player1").await;
        assert_last_text(&h.transport, alice, messages::ASK_NETWORK);
        assert_last_buttons(&h.transport, alice, &["SOL", "ETH", "BTC"]);

        h.button(alice, "ETH").await;
        assert_last_text(&h.transport, alice, "📩 Envoie ton adresse ETH :");

        h.text(alice, "0xABC").await;
        assert_eq!(
            h.orchestrator.finish_progress(alice).await,
            Some(ProgressReport::Finished)
        );

        let progress = h
            .transport
            .message_with_text(alice, messages::PROGRESS_START)
            .expect("verification message");
        assert_eq!(h.transport.edits_of(progress), messages::PROGRESS_STEPS.to_vec());
        assert_last_text(&h.transport, alice, messages::SUBMITTED);

        let record = h.store.get(alice).await.expect("stored claim");
        assert_eq!(record.handle, "player1");
        assert_eq!(record.network, Network::Eth);
        assert_eq!(record.wallet_address, "0xABC");
        assert_eq!(record.status.as_str(), "PENDING");

        assert_eq!(
            h.notifier.notifications(),
            vec![(
                IdFixtures::operator(),
                "🆕 Nouvelle demande\n\n👤 User: player1\n🌐 Network: ETH\n💳 Wallet: 0xABC"
                    .to_string()
            )]
        );
        assert_eq!(h.orchestrator.sessions().open_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_start_shows_welcome_button() {
        let h = Harness::new();
        let alice = IdFixtures::alice();

        h.command(alice, "start").await;

        assert_last_text(&h.transport, alice, messages::WELCOME);
        assert_last_buttons(&h.transport, alice, &[messages::CLAIM_BUTTON_DATA]);
    }

    #[tokio::test]
    async fn test_lowercase_network_payload_is_accepted() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        h.text(alice, "player1").await;

        h.button(alice, "sol").await;

        assert_last_text(&h.transport, alice, "📩 Envoie ton adresse SOL :");
    }
}

// ============================================================================
// Duplicate Guard
// ============================================================================

mod duplicate_tests {
    use super::*;

    #[tokio::test]
    async fn test_repeated_claim_intent_reports_pending() {
        let alice = IdFixtures::alice();
        let h = Harness::with_store(
            MockClaimStore::with_claims(vec![ClaimRecordBuilder::new().with_user(alice).build()])
                .await,
        );

        h.button(alice, messages::CLAIM_BUTTON_DATA).await;

        assert_last_text(&h.transport, alice, messages::ALREADY_PENDING);
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.orchestrator.sessions().open_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_start_with_record_reports_pending() {
        let alice = IdFixtures::alice();
        let h = Harness::with_store(
            MockClaimStore::with_claims(vec![ClaimRecordBuilder::new().with_user(alice).build()])
                .await,
        );

        h.command(alice, "start").await;

        assert_eq!(h.transport.sent_to(alice), vec![messages::ALREADY_PENDING]);
    }

    #[tokio::test]
    async fn test_second_conversation_after_filing_is_refused() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;
        h.text(alice, "0xABC").await;
        h.orchestrator.finish_progress(alice).await;

        h.button(alice, messages::CLAIM_BUTTON_DATA).await;

        assert_last_text(&h.transport, alice, messages::ALREADY_PENDING);
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_race_keeps_first_record_and_skips_notification() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.store
            .insert(
                &ClaimRecordBuilder::new()
                    .with_user(alice)
                    .with_handle("first")
                    .with_network(Network::Btc)
                    .with_wallet("bc1first")
                    .build(),
            )
            .await
            .unwrap();
        h.text(alice, "0xABC").await;
        h.orchestrator.finish_progress(alice).await;

        assert_last_text(&h.transport, alice, messages::SUBMITTED);
        assert_eq!(h.store.get(alice).await.unwrap().wallet_address, "bc1first");
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert!(h.notifier.notifications().is_empty());
    }
}

// ============================================================================
// Re-prompts and Ignored Input
// ============================================================================

mod reprompt_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_network_reprompts() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        h.text(alice, "player1").await;
        h.transport.clear();

        h.button(alice, "DOGE").await;

        assert_eq!(h.transport.sent_to(alice), vec![messages::ASK_NETWORK]);
        assert_last_buttons(&h.transport, alice, &["SOL", "ETH", "BTC"]);

        h.button(alice, "BTC").await;
        assert_last_text(&h.transport, alice, "📩 Envoie ton adresse BTC :");
    }

    #[tokio::test]
    async fn test_text_while_choosing_network_reprompts() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        h.text(alice, "player1").await;

        h.text(alice, "ETH").await;

        assert_last_text(&h.transport, alice, messages::ASK_NETWORK);
        assert!(h.store.get(alice).await.is_none());
    }

    #[tokio::test]
    async fn test_blank_handle_reprompts() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;

        h.text(alice, "   ").await;

        assert_eq!(
            h.transport.sent_to(alice),
            vec![messages::ASK_HANDLE, messages::ASK_HANDLE]
        );
    }

    #[tokio::test]
    async fn test_start_mid_flow_reprompts_current_step() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.command(alice, "start").await;

        assert_last_text(&h.transport, alice, "📩 Envoie ton adresse ETH :");
    }

    #[tokio::test]
    async fn test_claim_button_mid_flow_reprompts() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;

        h.button(alice, messages::CLAIM_BUTTON_DATA).await;

        assert_eq!(
            h.transport.sent_to(alice),
            vec![messages::ASK_HANDLE, messages::ASK_HANDLE]
        );
    }

    #[tokio::test]
    async fn test_text_without_conversation_is_ignored() {
        let h = Harness::new();
        let alice = IdFixtures::alice();

        h.text(alice, "hello").await;
        h.button(alice, "ETH").await;
        h.command(alice, "help").await;

        assert_silent(&h.transport, alice);
    }
}

// ============================================================================
// Cancellation
// ============================================================================

mod cancel_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_mid_flow_discards_answers() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.command(alice, "cancel").await;
        assert_last_text(&h.transport, alice, messages::CANCELLED);

        h.text(alice, "0xABC").await;
        assert_last_text(&h.transport, alice, messages::CANCELLED);
        assert_eq!(h.store.count().await.unwrap(), 0);
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_then_restart() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        h.command(alice, "cancel").await;

        h.command(alice, "start").await;
        assert_last_text(&h.transport, alice, messages::WELCOME);

        h.walk_to_wallet(alice).await;
        h.text(alice, "0xDEF").await;
        h.orchestrator.finish_progress(alice).await;
        assert_eq!(h.store.get(alice).await.unwrap().wallet_address, "0xDEF");
    }

    #[tokio::test]
    async fn test_cancel_without_conversation_is_silent() {
        let h = Harness::new();
        let alice = IdFixtures::alice();

        h.command(alice, "cancel").await;

        assert_silent(&h.transport, alice);
    }

    #[tokio::test]
    async fn test_cancel_stops_verification_sequence() {
        let clock = Arc::new(GatedClock::new());
        let h = Harness::build(Arc::new(MockClaimStore::new()), clock.clone());
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;
        h.text(alice, "0xABC").await;

        clock.wait_for_sleepers(1).await;
        h.command(alice, "cancel").await;

        assert_eq!(
            h.orchestrator.finish_progress(alice).await,
            Some(ProgressReport::Aborted { steps_shown: 0 })
        );
        assert_last_text(&h.transport, alice, messages::PROGRESS_START);
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.notifier.notifications().len(), 1);
    }
}

// ============================================================================
// Operator Command
// ============================================================================

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_operator_gets_total() {
        let h = Harness::with_store(
            MockClaimStore::with_claims(ClaimRecordBuilder::for_users(
                (1..=3).map(UserId::new),
            ))
            .await,
        );
        let operator = IdFixtures::operator();

        h.command(operator, "admin").await;

        assert_eq!(h.transport.sent_to(operator), vec!["📊 Total demandes : 3"]);
    }

    #[tokio::test]
    async fn test_non_operator_gets_nothing() {
        let h = Harness::with_store(
            MockClaimStore::with_claims(ClaimRecordBuilder::for_users([UserId::new(1)])).await,
        );
        let bob = IdFixtures::bob();

        h.command(bob, "admin").await;

        assert_silent(&h.transport, bob);
        assert!(h.transport.outbound().is_empty());
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_failure_at_wallet_keeps_step() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.store.set_unavailable(true);
        h.text(alice, "0xABC").await;
        assert_last_text(&h.transport, alice, messages::TEMPORARY_ERROR);
        assert!(h.notifier.notifications().is_empty());

        h.store.set_unavailable(false);
        h.text(alice, "0xABC").await;
        h.orchestrator.finish_progress(alice).await;

        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_at_claim_intent() {
        let h = Harness::new();
        let alice = IdFixtures::alice();

        h.store.set_unavailable(true);
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        assert_eq!(h.transport.sent_to(alice), vec![messages::TEMPORARY_ERROR]);

        h.text(alice, "player1").await;
        assert_eq!(h.transport.sent_to(alice).len(), 1);

        h.store.set_unavailable(false);
        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        assert_last_text(&h.transport, alice, messages::ASK_HANDLE);
    }

    #[tokio::test]
    async fn test_store_failure_on_admin() {
        let h = Harness::new();
        let operator = IdFixtures::operator();
        h.store.set_unavailable(true);

        h.command(operator, "admin").await;

        assert_eq!(h.transport.sent_to(operator), vec![messages::TEMPORARY_ERROR]);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_undo_claim() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.transport.set_failing(true);
        h.text(alice, "0xABC").await;
        h.orchestrator.finish_progress(alice).await;

        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_is_tolerated() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        h.walk_to_wallet(alice).await;

        h.notifier.set_failing(true);
        h.text(alice, "0xABC").await;

        assert_eq!(
            h.orchestrator.finish_progress(alice).await,
            Some(ProgressReport::Finished)
        );
        assert_last_text(&h.transport, alice, messages::SUBMITTED);
    }
}

// ============================================================================
// Isolation Between Users
// ============================================================================

mod isolation_tests {
    use super::*;

    #[tokio::test]
    async fn test_interleaved_users_keep_separate_answers() {
        let h = Harness::new();
        let alice = IdFixtures::alice();
        let bob = IdFixtures::bob();

        h.button(alice, messages::CLAIM_BUTTON_DATA).await;
        h.button(bob, messages::CLAIM_BUTTON_DATA).await;
        h.text(bob, "bob_handle").await;
        h.text(alice, "alice_handle").await;
        h.button(alice, "SOL").await;
        h.button(bob, "BTC").await;
        h.text(bob, "bc1bob").await;
        h.text(alice, "So1alice").await;
        h.orchestrator.drain_progress().await;

        let a = h.store.get(alice).await.unwrap();
        let b = h.store.get(bob).await.unwrap();
        assert_eq!((a.handle.as_str(), a.network), ("alice_handle", Network::Sol));
        assert_eq!((b.handle.as_str(), b.network), ("bob_handle", Network::Btc));
        assert_eq!(h.notifier.notifications().len(), 2);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::event_strategy;

    fn replay(events: Vec<InboundEvent>) -> (u64, usize, usize) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let h = Harness::new();
            for event in events {
                h.orchestrator.handle(event).await;
            }
            h.orchestrator.drain_progress().await;
            (
                h.store.count().await.unwrap(),
                h.notifier.notifications().len(),
                h.orchestrator.sessions().open_sessions().await,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_at_most_one_claim_and_one_notice(
            events in prop::collection::vec(event_strategy(IdFixtures::alice()), 0..30)
        ) {
            let (claims, notices, open) = replay(events);
            prop_assert!(claims <= 1);
            prop_assert_eq!(notices as u64, claims);
            prop_assert!(open <= 1);
        }
    }
}
