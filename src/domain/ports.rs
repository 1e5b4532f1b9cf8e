use crate::domain::model::{DrawResult, Rendered};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Returns the location the data was written to.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Where winning numbers come from.
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// `None` asks for the most recent draw.
    async fn fetch(&self, round: Option<u32>) -> Result<DrawResult>;
}

/// One interactive page: compute from the collected inputs, then render.
#[async_trait]
pub trait Page: Send + Sync {
    type Output: Send + Sync;

    fn name(&self) -> &str;
    async fn compute(&self) -> Result<Self::Output>;
    fn render(&self, output: &Self::Output) -> Result<Rendered>;
}
