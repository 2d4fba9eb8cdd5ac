//! Image asset slots and their display order.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::FilenameBase;

/// Lifecycle of one image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Generation request in flight
    #[default]
    Pending,
    /// Image generated and fetchable
    Ready,
    /// Request or retrieval failed; retry allowed
    Failed,
}

impl AssetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Pending => "pending",
            AssetState::Ready => "ready",
            AssetState::Failed => "failed",
        }
    }

    /// Whether the slot has settled (no request in flight).
    pub fn is_settled(&self) -> bool {
        matches!(self, AssetState::Ready | AssetState::Failed)
    }
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a slot failed. Both kinds look the same to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetFailureKind {
    /// The generation call itself failed (non-2xx or network)
    Request,
    /// The call succeeded but the image never became fetchable
    Retrieval,
}

impl AssetFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetFailureKind::Request => "request",
            AssetFailureKind::Retrieval => "retrieval",
        }
    }
}

/// Diagnostic detail of a failed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetFailure {
    pub kind: AssetFailureKind,
    pub message: String,
}

impl AssetFailure {
    pub fn request(message: impl Into<String>) -> Self {
        Self {
            kind: AssetFailureKind::Request,
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self {
            kind: AssetFailureKind::Retrieval,
            message: message.into(),
        }
    }
}

/// One prompt/image pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Asset {
    /// 0-based slot index
    pub slot: usize,
    /// Prompt the current request was issued with
    pub prompt: String,
    /// Stable across regenerations of this slot
    pub filename_base: FilenameBase,
    pub state: AssetState,
    /// Set only while `Ready`
    pub source_url: Option<String>,
    /// Set only while `Failed`
    pub failure: Option<AssetFailure>,
    /// Bumped on every request issued for this slot
    pub generation: u64,
}

impl Asset {
    /// A slot whose first request is about to be issued.
    pub fn pending(slot: usize, prompt: impl Into<String>, filename_base: FilenameBase) -> Self {
        Self {
            slot,
            prompt: prompt.into(),
            filename_base,
            state: AssetState::Pending,
            source_url: None,
            failure: None,
            generation: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == AssetState::Ready
    }

    /// Re-drive the slot to `Pending` and return the new generation.
    pub fn restart(&mut self) -> u64 {
        self.generation += 1;
        self.state = AssetState::Pending;
        self.source_url = None;
        self.failure = None;
        self.generation
    }

    pub fn mark_ready(&mut self, source_url: impl Into<String>) {
        self.state = AssetState::Ready;
        self.source_url = Some(source_url.into());
        self.failure = None;
    }

    pub fn mark_failed(&mut self, failure: AssetFailure) {
        self.state = AssetState::Failed;
        self.source_url = None;
        self.failure = Some(failure);
    }
}

/// Errors raised when validating a display order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("expected {expected} positions, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("slot {0} is out of range")]
    OutOfRange(usize),

    #[error("slot {0} appears more than once")]
    Duplicate(usize),
}

/// Visual order of slots: `order[i]` is the slot shown at position `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DisplayOrder(Vec<usize>);

impl DisplayOrder {
    /// Natural order `0..len`.
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Validate that `order` is a permutation of `0..len`.
    pub fn from_permutation(order: Vec<usize>, len: usize) -> Result<Self, OrderError> {
        if order.len() != len {
            return Err(OrderError::WrongLength {
                expected: len,
                actual: order.len(),
            });
        }
        let mut seen = vec![false; len];
        for &slot in &order {
            if slot >= len {
                return Err(OrderError::OutOfRange(slot));
            }
            if seen[slot] {
                return Err(OrderError::Duplicate(slot));
            }
            seen[slot] = true;
        }
        Ok(Self(order))
    }

    pub fn slots(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionId;

    fn asset() -> Asset {
        let session = SessionId::from_string("Gen10000");
        Asset::pending(0, "a waterfall", FilenameBase::with_salt(&session, "abcdef", 0))
    }

    #[test]
    fn test_restart_keeps_filename_and_bumps_generation() {
        let mut a = asset();
        a.mark_failed(AssetFailure::request("boom"));
        let name = a.filename_base.clone();

        assert_eq!(a.restart(), 1);
        assert_eq!(a.state, AssetState::Pending);
        assert!(a.failure.is_none());
        assert_eq!(a.filename_base, name);
    }

    #[test]
    fn test_ready_and_failed_are_exclusive() {
        let mut a = asset();
        a.mark_ready("http://x/a.png");
        assert!(a.is_ready());
        assert!(a.failure.is_none());

        a.mark_failed(AssetFailure::retrieval("missing"));
        assert!(a.source_url.is_none());
        assert_eq!(a.failure.as_ref().map(|f| f.kind), Some(AssetFailureKind::Retrieval));
    }

    #[test]
    fn test_display_order_validation() {
        assert!(DisplayOrder::from_permutation(vec![2, 0, 1], 3).is_ok());
        assert_eq!(
            DisplayOrder::from_permutation(vec![0, 1], 3),
            Err(OrderError::WrongLength { expected: 3, actual: 2 })
        );
        assert_eq!(
            DisplayOrder::from_permutation(vec![0, 3, 1], 3),
            Err(OrderError::OutOfRange(3))
        );
        assert_eq!(
            DisplayOrder::from_permutation(vec![0, 0, 1], 3),
            Err(OrderError::Duplicate(0))
        );
    }

    #[test]
    fn test_settled_states() {
        assert!(!AssetState::Pending.is_settled());
        assert!(AssetState::Ready.is_settled());
        assert!(AssetState::Failed.is_settled());
    }
}
