//! List → detail → back traversal.
//!
//! Each catalog position gets exactly one open/extract/close cycle, strictly
//! in order. A failing entry is recorded and skipped; a failed return to the
//! list is logged and counted, and traversal moves on regardless. Later
//! entries may then fail too; that cascade is accepted rather than retried.

use tracing::{info, warn};

use crate::catalog::CatalogView;
use crate::error::{EntryError, NavigationError, SurfaceError};
use crate::extractor::FieldExtractor;
use crate::traits::surface::{Locator, Surface};
use crate::types::config::{CatalogSelectors, TraversalConfig};
use crate::types::outcome::{ExtractionResult, TraversalReport};
use crate::types::record::CourseRecord;

/// Number of positions to visit: `min(entry_count, max)` when capped.
///
/// A cap of zero counts as no cap.
pub fn visit_limit(entry_count: usize, max_courses: Option<usize>) -> usize {
    match max_courses {
        Some(max) if max > 0 => entry_count.min(max),
        _ => entry_count,
    }
}

/// Drives a surface through the catalog, one entry at a time.
pub struct TraversalEngine<S> {
    surface: S,
    extractor: FieldExtractor,
    config: TraversalConfig,
}

impl<S: Surface> TraversalEngine<S> {
    pub fn new(surface: S, extractor: FieldExtractor, config: TraversalConfig) -> Self {
        Self {
            surface,
            extractor,
            config,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Give the surface back, e.g. to close the browser session.
    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    fn selectors(&self) -> &CatalogSelectors {
        self.extractor.selectors()
    }

    /// Open the catalog and count the listed entries.
    ///
    /// Failing here is fatal for the run: there is nothing to traverse.
    pub async fn open_catalog(&self) -> Result<usize, NavigationError> {
        let selectors = self.selectors();
        info!(url = %self.config.catalog_url, surface = self.surface.name(), "Opening catalog");

        self.surface
            .navigate(&self.config.catalog_url)
            .await
            .map_err(NavigationError::CatalogUnavailable)?;

        if let Some(button) = &selectors.search_button {
            self.surface
                .click(&Locator::css(button))
                .await
                .map_err(NavigationError::CatalogUnavailable)?;
        }

        self.surface
            .wait_for(&selectors.list_entries(), self.config.list_timeout)
            .await
            .map_err(NavigationError::CatalogUnavailable)?;

        let count = CatalogView::new(&self.surface, selectors)
            .count()
            .await
            .map_err(NavigationError::CatalogUnavailable)?;

        info!("Found {} courses.", count);
        Ok(count)
    }

    /// Visit the first `visit_limit(entry_count, max_courses)` entries.
    pub async fn traverse(&self, entry_count: usize) -> TraversalReport {
        let limit = visit_limit(entry_count, self.config.max_courses);
        let mut report = TraversalReport::new(entry_count);

        for index in 0..limit {
            let outcome = self.visit(index).await;
            match &outcome {
                ExtractionResult::Success(record) => {
                    info!("Scraped {}/{}: {}", index + 1, entry_count, record.id());
                }
                ExtractionResult::Failure { reason, .. } => {
                    warn!("Error scraping course {}: {}", index + 1, reason);
                }
            }
            report.record(outcome);

            if let Err(e) = self.return_to_list().await {
                warn!("Error clicking back after course {}: {}", index + 1, e);
                report.recovery_faults += 1;
            }
        }

        info!(
            visited = report.visited,
            scraped = report.records.len(),
            failed = report.failed_count(),
            recovery_faults = report.recovery_faults,
            "Traversal complete"
        );
        report
    }

    /// Open the catalog, then traverse it.
    pub async fn run(&self) -> Result<TraversalReport, NavigationError> {
        let entry_count = self.open_catalog().await?;
        Ok(self.traverse(entry_count).await)
    }

    async fn visit(&self, index: usize) -> ExtractionResult {
        match self.open_and_extract(index).await {
            Ok(record) => ExtractionResult::Success(record),
            Err(reason) => ExtractionResult::Failure { index, reason },
        }
    }

    async fn open_and_extract(&self, index: usize) -> Result<CourseRecord, EntryError> {
        // Re-resolved every cycle: the list is rebuilt after each detail visit.
        let entry = CatalogView::new(&self.surface, self.selectors()).entry_at(index);

        self.surface
            .scroll_into_view(&entry.locator)
            .await
            .map_err(EntryError::Interaction)?;
        self.surface
            .click(&entry.locator)
            .await
            .map_err(EntryError::Interaction)?;
        self.settle().await;

        self.await_detail().await?;
        Ok(self.extractor.extract(&self.surface).await?)
    }

    async fn await_detail(&self) -> Result<(), EntryError> {
        let signature = self.selectors().detail_signature();
        match self
            .surface
            .wait_for(&signature, self.config.detail_timeout)
            .await
        {
            Ok(()) => Ok(()),
            Err(SurfaceError::Timeout { locator, timeout }) => Err(EntryError::NavigationTimeout(
                NavigationError::Timeout { locator, timeout },
            )),
            Err(e) => Err(EntryError::Interaction(e)),
        }
    }

    /// Close the detail panel and wait for the list to come back.
    async fn return_to_list(&self) -> Result<(), NavigationError> {
        let selectors = self.selectors();

        self.surface
            .wait_for(&selectors.open_panel(), self.config.list_timeout)
            .await
            .map_err(NavigationError::RecoveryFault)?;
        self.surface
            .click(&selectors.back_control())
            .await
            .map_err(NavigationError::RecoveryFault)?;
        self.settle().await;
        self.surface
            .wait_for(&selectors.list_entries(), self.config.list_timeout)
            .await
            .map_err(NavigationError::RecoveryFault)?;

        Ok(())
    }

    async fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::testing::{FakeCatalog, FakeCourse};
    use std::time::Duration;

    fn engine(catalog: FakeCatalog, max_courses: Option<usize>) -> TraversalEngine<FakeCatalog> {
        let config = TraversalConfig::new("https://catalog.test/")
            .with_max_courses(max_courses)
            .with_settle_delay(Duration::ZERO);
        TraversalEngine::new(catalog, FieldExtractor::with_defaults().unwrap(), config)
    }

    fn catalog(courses: Vec<FakeCourse>) -> FakeCatalog {
        FakeCatalog::new(CatalogSelectors::default()).with_courses(courses)
    }

    fn ids(report: &TraversalReport) -> Vec<&str> {
        report.records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_visit_limit() {
        assert_eq!(visit_limit(10, None), 10);
        assert_eq!(visit_limit(10, Some(3)), 3);
        assert_eq!(visit_limit(2, Some(3)), 2);
        assert_eq!(visit_limit(10, Some(0)), 10);
    }

    #[tokio::test]
    async fn test_open_catalog_counts_entries() {
        let engine = engine(
            catalog(vec![
                FakeCourse::new("CSCI 0150", "A", "a"),
                FakeCourse::new("CSCI 0160", "B", "b"),
            ]),
            None,
        );

        assert_eq!(engine.open_catalog().await.unwrap(), 2);
        assert_eq!(engine.surface().navigations(), vec!["https://catalog.test/"]);
    }

    #[tokio::test]
    async fn test_timeout_is_isolated() {
        let engine = engine(
            catalog(vec![
                FakeCourse::new("CSCI 0150", "A", "a"),
                FakeCourse::new("CSCI 0160", "B", "b").never_renders(),
                FakeCourse::new("CSCI 0170", "C", "c"),
            ]),
            None,
        );

        let report = engine.run().await.unwrap();

        assert_eq!(ids(&report), vec!["CSCI 0150", "CSCI 0170"]);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(matches!(
            report.failures[0].reason,
            EntryError::NavigationTimeout(NavigationError::Timeout { .. })
        ));
        assert_eq!(report.recovery_faults, 0);
        assert_eq!(engine.surface().back_clicks(), 3);
    }

    #[tokio::test]
    async fn test_missing_required_field_not_emitted() {
        let engine = engine(
            catalog(vec![
                FakeCourse::new("CSCI 0150", "A", "a").without_description(),
                FakeCourse::new("CSCI 0160", "B", "b"),
            ]),
            None,
        );

        let report = engine.run().await.unwrap();

        assert_eq!(ids(&report), vec!["CSCI 0160"]);
        assert!(matches!(
            report.failures[0].reason,
            EntryError::Extraction(ExtractionError::MissingRequiredField {
                field: "description"
            })
        ));
    }

    #[tokio::test]
    async fn test_cap_limits_visits() {
        let courses = (0..5)
            .map(|i| FakeCourse::new(format!("CSCI 0{}00", i + 1), "T", "D"))
            .collect();
        let engine = engine(catalog(courses), Some(2));

        let report = engine.run().await.unwrap();

        assert_eq!(report.entry_count, 5);
        assert_eq!(report.visited, 2);
        assert_eq!(engine.surface().opened(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_recovery_fault_cascades_without_abort() {
        let engine = engine(
            catalog(vec![
                FakeCourse::new("CSCI 0150", "A", "a"),
                FakeCourse::new("CSCI 0160", "B", "b"),
                FakeCourse::new("CSCI 0170", "C", "c"),
            ])
            .with_broken_back(),
            None,
        );

        let report = engine.run().await.unwrap();

        // First entry scrapes; the panel never closes, so later entries cannot be reached.
        assert_eq!(ids(&report), vec!["CSCI 0150"]);
        assert_eq!(report.visited, 3);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.recovery_faults, 3);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.reason, EntryError::Interaction(_))));
    }

    #[tokio::test]
    async fn test_catalog_without_list_is_fatal() {
        let engine = engine(catalog(vec![]), None);

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, NavigationError::CatalogUnavailable(_)));
    }
}
