//! Recording Fakes for the Chat Ports
//!
//! In-memory implementations of `Transport`, `Notifier` and `Clock` that
//! record every call, so conversation tests can assert on the exact
//! transcript the user and the operator would have seen.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

use core_kernel::{
    ChoiceButtons, Clock, DomainPort, MessageId, MessageRef, Notifier, PortError, Transport,
    UserId,
};

/// One outbound call seen by the fake transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Sent {
        to: UserId,
        text: String,
        buttons: Option<ChoiceButtons>,
        message: MessageRef,
    },
    Edited {
        message: MessageRef,
        text: String,
    },
}

impl Outbound {
    pub fn text(&self) -> &str {
        match self {
            Outbound::Sent { text, .. } | Outbound::Edited { text, .. } => text,
        }
    }

    pub fn chat(&self) -> UserId {
        match self {
            Outbound::Sent { to, .. } => *to,
            Outbound::Edited { message, .. } => message.chat,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Transport fake that keeps a transcript of everything sent or edited
#[derive(Debug, Default)]
pub struct RecordingTransport {
    log: Mutex<Vec<Outbound>>,
    next_message_id: AtomicI64,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail without being recorded
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Full transcript, in call order
    pub fn outbound(&self) -> Vec<Outbound> {
        lock(&self.log).clone()
    }

    /// Texts of new messages sent to a chat, in order
    pub fn sent_to(&self, user: UserId) -> Vec<String> {
        lock(&self.log)
            .iter()
            .filter_map(|call| match call {
                Outbound::Sent { to, text, .. } if *to == user => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last new message sent to a chat, with its buttons
    pub fn last_sent_to(&self, user: UserId) -> Option<(String, Option<ChoiceButtons>)> {
        lock(&self.log).iter().rev().find_map(|call| match call {
            Outbound::Sent {
                to, text, buttons, ..
            } if *to == user => Some((text.clone(), buttons.clone())),
            _ => None,
        })
    }

    /// Texts a given message was edited to, in order
    pub fn edits_of(&self, message: MessageRef) -> Vec<String> {
        lock(&self.log)
            .iter()
            .filter_map(|call| match call {
                Outbound::Edited { message: m, text } if *m == message => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Reference of the first message in a chat whose text matches
    pub fn message_with_text(&self, user: UserId, text: &str) -> Option<MessageRef> {
        lock(&self.log).iter().find_map(|call| match call {
            Outbound::Sent {
                to, text: t, message, ..
            } if *to == user && t == text => Some(*message),
            _ => None,
        })
    }

    /// Number of calls addressed to a chat
    pub fn calls_to(&self, user: UserId) -> usize {
        lock(&self.log).iter().filter(|call| call.chat() == user).count()
    }

    pub fn clear(&self) {
        lock(&self.log).clear();
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PortError::ServiceUnavailable {
                service: "recording transport".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl DomainPort for RecordingTransport {}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        to: UserId,
        text: &str,
        buttons: Option<&ChoiceButtons>,
    ) -> Result<MessageRef, PortError> {
        self.check_available()?;
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        let message = MessageRef::new(to, MessageId::new(id));
        lock(&self.log).push(Outbound::Sent {
            to,
            text: text.to_string(),
            buttons: buttons.cloned(),
            message,
        });
        Ok(message)
    }

    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<(), PortError> {
        self.check_available()?;
        lock(&self.log).push(Outbound::Edited {
            message: *message,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Notifier fake that keeps every operator notification
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<(UserId, String)> {
        lock(&self.sent).clone()
    }
}

impl DomainPort for RecordingNotifier {}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, operator: UserId, text: &str) -> Result<(), PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::ServiceUnavailable {
                service: "recording notifier".to_string(),
            });
        }
        lock(&self.sent).push((operator, text.to_string()));
        Ok(())
    }
}

/// Clock that returns immediately and remembers the requested delays
#[derive(Debug, Default)]
pub struct InstantClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
}

impl DomainPort for InstantClock {}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        tokio::task::yield_now().await;
    }
}

/// Clock whose sleeps block until the gate is opened
///
/// Lets a test hold a timed sequence at a known point, act on it, and then
/// release it.
#[derive(Debug)]
pub struct GatedClock {
    gate: watch::Sender<bool>,
    parked: watch::Sender<usize>,
}

impl Default for GatedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedClock {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        let (parked, _) = watch::channel(0);
        Self { gate, parked }
    }

    /// Releases every current and future sleep
    pub fn open(&self) {
        self.gate.send_replace(true);
    }

    /// Waits until at least `count` sleeps have started
    pub async fn wait_for_sleepers(&self, count: usize) {
        let mut rx = self.parked.subscribe();
        let _ = rx.wait_for(|started| *started >= count).await;
    }
}

impl DomainPort for GatedClock {}

#[async_trait]
impl Clock for GatedClock {
    async fn sleep(&self, _duration: Duration) {
        let mut rx = self.gate.subscribe();
        self.parked.send_modify(|started| *started += 1);
        let _ = rx.wait_for(|open| *open).await;
    }
}
