use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// The action signature a refresh control knows about: async, no input, no
/// output.
///
/// Implementations handle their own failures. `cancel` is whatever token the
/// caller decided to hand down; a handler never sees the control's token
/// unless it was launched as a direct child.
#[async_trait]
pub trait RefreshHandler: Send + Sync {
    async fn refresh(&self, cancel: CancellationToken);
}
