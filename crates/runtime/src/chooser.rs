//! Ancestor chooser gateway
//!
//! "Ask the user to pick a parent record" as a single async call. The
//! controller only consumes the yielded item; the selection UI is the
//! frontend's business.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use peb_core::{PortfolioItem, PortfolioItemType};

use crate::source::Result;

/// The chooser gateway. `Ok(None)` means the user cancelled; the controller
/// changes nothing in that case.
#[async_trait]
pub trait AncestorChooser: Send + Sync {
    /// Let the user choose an ancestor item, constrained to `constraint`
    /// when the current type has a parent type.
    async fn choose(
        &self,
        constraint: Option<&PortfolioItemType>,
    ) -> Result<Option<PortfolioItem>>;
}

/// Chooser that yields a fixed answer. Used where the interaction has
/// already been resolved, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticChooser {
    choice: Option<PortfolioItem>,
}

impl StaticChooser {
    /// A chooser whose dialog is always dismissed.
    pub fn cancelled() -> Self {
        Self { choice: None }
    }

    /// A chooser that always picks `item`.
    pub fn choosing(item: PortfolioItem) -> Self {
        Self { choice: Some(item) }
    }
}

#[async_trait]
impl AncestorChooser for StaticChooser {
    async fn choose(
        &self,
        _constraint: Option<&PortfolioItemType>,
    ) -> Result<Option<PortfolioItem>> {
        Ok(self.choice.clone())
    }
}

/// A chooser request travelling to an interactive frontend: the constraint
/// plus a one-shot channel for the answer.
#[derive(Debug)]
pub struct ChooserRequest {
    pub constraint: Option<PortfolioItemType>,
    pub response_tx: oneshot::Sender<Option<PortfolioItem>>,
}

/// Chooser that forwards each request over a channel and awaits the reply.
///
/// Frontends receive `ChooserRequest`s on the paired receiver, run their own
/// selection UI and answer on `response_tx`. A dropped request counts as a
/// cancellation.
#[derive(Debug, Clone)]
pub struct ChannelChooser {
    tx: mpsc::UnboundedSender<ChooserRequest>,
}

impl ChannelChooser {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChooserRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AncestorChooser for ChannelChooser {
    async fn choose(
        &self,
        constraint: Option<&PortfolioItemType>,
    ) -> Result<Option<PortfolioItem>> {
        let (response_tx, response_rx) = oneshot::channel();
        let request = ChooserRequest {
            constraint: constraint.cloned(),
            response_tx,
        };
        if self.tx.send(request).is_err() {
            tracing::debug!("chooser frontend gone, treating as cancel");
            return Ok(None);
        }
        Ok(response_rx.await.unwrap_or(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peb_core::TypeId;

    #[tokio::test]
    async fn test_static_chooser_cancel() {
        let chooser = StaticChooser::cancelled();
        let picked = chooser.choose(None).await.unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_static_chooser_pick() {
        let item = PortfolioItem::new("Customer Retention", TypeId::new());
        let chooser = StaticChooser::choosing(item.clone());
        let picked = chooser.choose(None).await.unwrap();
        assert_eq!(picked, Some(item));
    }

    #[tokio::test]
    async fn test_channel_chooser_round_trip() {
        let (chooser, mut rx) = ChannelChooser::new();
        let theme = PortfolioItemType::new("Theme", 3);
        let theme_id = theme.id;
        let answer = PortfolioItem::new("Customer Retention", theme_id);

        let frontend = {
            let answer = answer.clone();
            tokio::spawn(async move {
                let request = rx.recv().await.expect("request");
                assert_eq!(request.constraint.as_ref().map(|t| t.id), Some(theme_id));
                let _ = request.response_tx.send(Some(answer));
            })
        };

        let picked = chooser.choose(Some(&theme)).await.unwrap();
        assert_eq!(picked, Some(answer));
        frontend.await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_chooser_dropped_request_is_cancel() {
        let (chooser, mut rx) = ChannelChooser::new();
        tokio::spawn(async move {
            let request = rx.recv().await.expect("request");
            drop(request);
        });

        let picked = chooser.choose(None).await.unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_channel_chooser_closed_receiver_is_cancel() {
        let (chooser, rx) = ChannelChooser::new();
        drop(rx);
        let picked = chooser.choose(None).await.unwrap();
        assert!(picked.is_none());
    }
}
