use crate::core::Storage;
use crate::domain::model::Rendered;
use crate::domain::ports::Page;
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PageOutcome {
    pub page: String,
    #[serde(flatten)]
    pub rendered: Rendered,
    pub saved_files: Vec<String>,
}

pub struct PageEngine<S: Storage> {
    storage: S,
}

impl<S: Storage> PageEngine<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Compute, render, then persist whatever chart artifacts the page produced.
    pub async fn run<P: Page>(&self, page: &P) -> Result<PageOutcome> {
        tracing::info!("Running page: {}", page.name());

        let output = page.compute().await?;
        tracing::debug!("Computed page '{}'", page.name());

        let rendered = page.render(&output)?;
        for warning in &rendered.warnings {
            tracing::warn!("{}", warning);
        }

        let mut saved_files = Vec::new();
        if let Some(svg) = &rendered.chart_svg {
            let path = self
                .storage
                .write_file(&format!("{}.svg", page.name()), svg.as_bytes())
                .await?;
            tracing::info!("Chart saved to: {}", path);
            saved_files.push(path);
        }
        if let Some(csv) = &rendered.samples_csv {
            let path = self
                .storage
                .write_file(&format!("{}_samples.csv", page.name()), csv.as_bytes())
                .await?;
            tracing::info!("Samples saved to: {}", path);
            saved_files.push(path);
        }

        Ok(PageOutcome {
            page: page.name().to_string(),
            rendered,
            saved_files,
        })
    }
}
