use async_trait::async_trait;

/// A unit of background work.
///
/// Jobs own everything they need. Nothing borrowed from the submitting
/// request may outlive the submission.
#[async_trait]
pub trait Job: Send + 'static {
    fn name(&self) -> &str;

    async fn run(self: Box<Self>) -> anyhow::Result<()>;
}
