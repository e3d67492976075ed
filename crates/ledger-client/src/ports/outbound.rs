//! # Outbound Port
//!
//! The wallet-session dependency: who is connected, and whether the signer
//! approves a given request. The session owns nothing beyond the connected
//! account; disconnection invalidates every flow built on top of it.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Account, RequestKind};
use std::collections::HashSet;

/// Wallet session - outbound port.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The currently connected account, if any.
    fn account(&self) -> Option<Account>;

    /// Ask the signer to approve a request of the given kind.
    ///
    /// `false` means the user declined; the request must not be submitted.
    async fn approve(&self, kind: RequestKind) -> bool;
}

/// Scriptable wallet session for tests and local runs.
pub struct StaticWallet {
    account: RwLock<Option<Account>>,
    rejecting: RwLock<HashSet<RequestKind>>,
}

impl StaticWallet {
    /// Create a session with no connected account.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            account: RwLock::new(None),
            rejecting: RwLock::new(HashSet::new()),
        }
    }

    /// Create a session already connected as `account`.
    #[must_use]
    pub fn connected(account: Account) -> Self {
        let wallet = Self::disconnected();
        wallet.connect(account);
        wallet
    }

    /// Connect as `account`.
    pub fn connect(&self, account: Account) {
        *self.account.write() = Some(account);
    }

    /// Drop the session.
    pub fn disconnect(&self) {
        *self.account.write() = None;
    }

    /// Make the signer decline all future requests of `kind`.
    pub fn reject_kind(&self, kind: RequestKind) {
        self.rejecting.write().insert(kind);
    }

    /// Clear all rejection rules.
    pub fn approve_all(&self) {
        self.rejecting.write().clear();
    }
}

#[async_trait]
impl WalletSession for StaticWallet {
    fn account(&self) -> Option<Account> {
        *self.account.read()
    }

    async fn approve(&self, kind: RequestKind) -> bool {
        !self.rejecting.read().contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disconnected_wallet_has_no_account() {
        let wallet = StaticWallet::disconnected();
        assert!(wallet.account().is_none());
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let wallet = StaticWallet::disconnected();
        let account = Account::new([7u8; 20]);

        wallet.connect(account);
        assert_eq!(wallet.account(), Some(account));

        wallet.disconnect();
        assert!(wallet.account().is_none());
    }

    #[tokio::test]
    async fn test_rejection_is_per_kind() {
        let wallet = StaticWallet::connected(Account::new([7u8; 20]));
        wallet.reject_kind(RequestKind::Purchase);

        assert!(!wallet.approve(RequestKind::Purchase).await);
        assert!(wallet.approve(RequestKind::Claim).await);

        wallet.approve_all();
        assert!(wallet.approve(RequestKind::Purchase).await);
    }
}
