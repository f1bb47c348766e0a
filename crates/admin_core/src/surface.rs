//! Capabilities the controller needs from whatever presents it.

use async_trait::async_trait;

/// A presentation container hosting the create/edit form.
pub trait ModalSurface: Send {
    fn show(&mut self, title: &str);
    fn hide(&mut self);
}

/// Builds a fresh [`ModalSurface`] for each open trigger.
pub trait ModalFactory: Send + Sync {
    fn build(&self) -> Box<dyn ModalSurface>;
}

/// Explicit consent step gating destructive calls.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}
