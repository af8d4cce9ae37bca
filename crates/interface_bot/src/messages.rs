//! User-facing texts and keyboards
//!
//! The bot speaks French; every string the user or the operator can see is
//! defined here.

use core_kernel::{ChoiceButton, ChoiceButtons};
use domain_claims::{ClaimRecord, Network};

/// Callback payload of the welcome button
pub const CLAIM_BUTTON_DATA: &str = "claim";

pub const WELCOME: &str = "🎁 Clique ci-dessous pour commencer la réclamation.";
pub const CLAIM_BUTTON_LABEL: &str = "🚀 Réclamer mes 20€";
pub const ALREADY_PENDING: &str = "⚠️ Tu as déjà une demande en cours.";
pub const ASK_HANDLE: &str = "📝 Envoie ton pseudo Stake :";
pub const ASK_NETWORK: &str = "💳 Choisis ton réseau :";
pub const CANCELLED: &str = "❌ Demande annulée.";
pub const TEMPORARY_ERROR: &str = "⚠️ Erreur temporaire, réessaie plus tard.";

/// First text of the verification animation
pub const PROGRESS_START: &str = "🔍 Vérification du wallet...";

/// Texts the verification message is edited to, one per delay
pub const PROGRESS_STEPS: [&str; 4] = [
    "🔍 Recherche du wallet...",
    "🧠 Analyse...",
    "📡 Vérification...",
    "✅ Wallet valide.",
];

pub const SUBMITTED: &str = "✅ **Demande envoyée.**\n\n\
💸 Paiement sous 24h si tout est valide.\n\n\
⚠️ Problèmes possibles :\n\
• Double compte\n\
• Wager insuffisant\n\
• Wallet invalide\n\
• Activité suspecte";

pub fn ask_wallet(network: Network) -> String {
    format!("📩 Envoie ton adresse {} :", network.code())
}

pub fn admin_total(total: u64) -> String {
    format!("📊 Total demandes : {total}")
}

/// Operator notification for a newly filed claim
pub fn new_claim_notice(record: &ClaimRecord) -> String {
    format!(
        "🆕 Nouvelle demande\n\n👤 User: {}\n🌐 Network: {}\n💳 Wallet: {}",
        record.handle,
        record.network.code(),
        record.wallet_address
    )
}

pub fn welcome_buttons() -> ChoiceButtons {
    ChoiceButtons::row(vec![ChoiceButton::new(CLAIM_BUTTON_LABEL, CLAIM_BUTTON_DATA)])
}

/// One button per network, labelled for humans, payload in uppercase
pub fn network_buttons() -> ChoiceButtons {
    ChoiceButtons::row(
        Network::ALL
            .into_iter()
            .map(|n| ChoiceButton::new(n.label(), n.code()))
            .collect(),
    )
}
