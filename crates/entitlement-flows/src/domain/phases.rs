//! # Flow Phase Machines
//!
//! One phase enum per controller. Each carries its own transition matrix;
//! `Failed` is reachable from every non-terminal phase, and both terminal
//! phases return to `Idle` only through an explicit reset.

use serde::{Deserialize, Serialize};

/// Purchase flow phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchasePhase {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Reading the current allowance.
    CheckingAllowance,
    /// Allowance is short; waiting for the approval signature.
    AwaitingApproval,
    /// Approval submitted, awaiting settlement.
    Approving,
    /// Reading the payment-token balance.
    CheckingBalance,
    /// Waiting for the purchase signature.
    AwaitingPurchase,
    /// Purchase submitted, awaiting settlement.
    Purchasing,
    /// Purchase settled successfully.
    Confirmed,
    /// The flow failed; see the controller's recorded error.
    Failed,
}

impl PurchasePhase {
    /// Check if transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: PurchasePhase) -> bool {
        if next == Self::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Self::Idle, Self::CheckingAllowance)
                | (Self::CheckingAllowance, Self::AwaitingApproval)
                | (Self::CheckingAllowance, Self::CheckingBalance)
                | (Self::AwaitingApproval, Self::Approving)
                | (Self::Approving, Self::CheckingBalance)
                | (Self::CheckingBalance, Self::AwaitingPurchase)
                | (Self::AwaitingPurchase, Self::Purchasing)
                | (Self::Purchasing, Self::Confirmed)
                | (Self::Confirmed, Self::Idle)
                | (Self::Failed, Self::Idle)
        )
    }

    /// Check if terminal phase.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Human-readable progress label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "ready",
            Self::CheckingAllowance => "checking spending cap",
            Self::AwaitingApproval => "waiting for approval signature",
            Self::Approving => "approving payment token",
            Self::CheckingBalance => "checking balance",
            Self::AwaitingPurchase => "waiting for purchase signature",
            Self::Purchasing => "purchasing credits",
            Self::Confirmed => "purchase complete",
            Self::Failed => "purchase failed",
        }
    }
}

/// Claim flow phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimPhase {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Claim submitted, awaiting settlement.
    Submitting,
    /// Claim settled successfully.
    Confirmed,
    /// The flow failed; see the controller's recorded error.
    Failed,
}

impl ClaimPhase {
    /// Check if transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: ClaimPhase) -> bool {
        if next == Self::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Self::Idle, Self::Submitting)
                | (Self::Submitting, Self::Confirmed)
                | (Self::Confirmed, Self::Idle)
                | (Self::Failed, Self::Idle)
        )
    }

    /// Check if terminal phase.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Human-readable progress label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "ready",
            Self::Submitting => "claiming free credits",
            Self::Confirmed => "free credits claimed",
            Self::Failed => "claim failed",
        }
    }
}

/// Mint flow phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintPhase {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Mint submitted, awaiting settlement.
    Submitting,
    /// Mint settled successfully.
    Confirmed,
    /// The flow failed; see the controller's recorded error.
    Failed,
}

impl MintPhase {
    /// Check if transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: MintPhase) -> bool {
        if next == Self::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Self::Idle, Self::Submitting)
                | (Self::Submitting, Self::Confirmed)
                | (Self::Confirmed, Self::Idle)
                | (Self::Failed, Self::Idle)
        )
    }

    /// Check if terminal phase.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Human-readable progress label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "ready",
            Self::Submitting => "minting routine record",
            Self::Confirmed => "record minted",
            Self::Failed => "mint failed",
        }
    }
}
