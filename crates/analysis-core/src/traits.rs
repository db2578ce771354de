use crate::{AnalysisError, FilingReport, RawFiling};
use async_trait::async_trait;

/// Trait for filing analysis engines
#[async_trait]
pub trait FilingAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        filing: &RawFiling,
        stock_price: Option<&str>,
    ) -> Result<FilingReport, AnalysisError>;
}
