//! Field extraction from an open detail view.
//!
//! Required fields (code, title, description) are read from dedicated
//! elements and must be non-empty. Enrollment figures go through a strategy
//! chain: the dedicated field first, then pattern matching over free text,
//! then absent. Prerequisites degrade to an empty string on any fault.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{ConfigError, ExtractionError, SurfaceError};
use crate::traits::surface::{Locator, Surface};
use crate::types::config::{CatalogSelectors, EnrollmentPatterns};
use crate::types::record::CourseRecord;

/// Builds a [`CourseRecord`] from the detail view currently on screen.
pub struct FieldExtractor {
    selectors: CatalogSelectors,
    max_enrollment: Vec<Regex>,
    seats_available: Vec<Regex>,
}

impl FieldExtractor {
    /// Create an extractor, compiling the free-text patterns.
    pub fn new(
        selectors: CatalogSelectors,
        patterns: &EnrollmentPatterns,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors,
            max_enrollment: compile(&patterns.max_enrollment)?,
            seats_available: compile(&patterns.seats_available)?,
        })
    }

    /// Create an extractor with the default selectors and patterns.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(CatalogSelectors::default(), &EnrollmentPatterns::default())
    }

    pub fn selectors(&self) -> &CatalogSelectors {
        &self.selectors
    }

    /// Read every field from the open detail view.
    ///
    /// Only reads from `surface`; never navigates.
    pub async fn extract<S: Surface + ?Sized>(
        &self,
        surface: &S,
    ) -> Result<CourseRecord, ExtractionError> {
        let id = required(surface, "id", &Locator::css(&self.selectors.course_code)).await?;
        let title = required(surface, "title", &Locator::css(&self.selectors.title)).await?;
        let description = required(
            surface,
            "description",
            &Locator::css(&self.selectors.description),
        )
        .await?;

        let prerequisites = optional_text(surface, &self.selectors.prerequisites())
            .await
            .unwrap_or_default();
        let (max_enrollment, seats_available) = self.enrollment(surface).await;

        Ok(CourseRecord::new(id, title, description)?
            .with_prerequisites(prerequisites)
            .with_max_enrollment(max_enrollment)
            .with_seats_available(seats_available))
    }

    async fn enrollment<S: Surface + ?Sized>(&self, surface: &S) -> (Option<u32>, Option<u32>) {
        let mut max_enrollment =
            optional_text(surface, &Locator::css(&self.selectors.max_enrollment_field))
                .await
                .and_then(|text| first_number(&text));
        let mut seats_available =
            optional_text(surface, &Locator::css(&self.selectors.seats_available_field))
                .await
                .and_then(|text| first_number(&text));

        if max_enrollment.is_some() && seats_available.is_some() {
            return (max_enrollment, seats_available);
        }

        if let Some(text) = self.free_text(surface).await {
            if max_enrollment.is_none() {
                max_enrollment = first_capture(&self.max_enrollment, &text);
            }
            if seats_available.is_none() {
                seats_available = first_capture(&self.seats_available, &text);
            }
        }

        (max_enrollment, seats_available)
    }

    /// The enrollment section if present, else the whole open panel.
    async fn free_text<S: Surface + ?Sized>(&self, surface: &S) -> Option<String> {
        match optional_text(surface, &Locator::css(&self.selectors.enrollment_section)).await {
            Some(section) => Some(section),
            None => optional_text(surface, &self.selectors.open_panel()).await,
        }
    }
}

async fn required<S: Surface + ?Sized>(
    surface: &S,
    field: &'static str,
    locator: &Locator,
) -> Result<String, ExtractionError> {
    match surface.read_text(locator).await {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) | Err(SurfaceError::NotFound { .. }) => {
            Err(ExtractionError::MissingRequiredField { field })
        }
        Err(e) => Err(ExtractionError::Surface(e)),
    }
}

async fn optional_text<S: Surface + ?Sized>(surface: &S, locator: &Locator) -> Option<String> {
    match surface.read_text(locator).await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) | Err(SurfaceError::NotFound { .. }) => None,
        Err(e) => {
            debug!(locator = %locator, error = %e, "Optional field lookup failed");
            None
        }
    }
}

/// First contiguous digit run in `text`, if it fits in a `u32`.
pub fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, FakeCourse};
    use proptest::prelude::*;

    fn open(course: FakeCourse) -> FakeCatalog {
        let catalog = FakeCatalog::new(CatalogSelectors::default()).with_course(course);
        catalog.show_detail(0);
        catalog
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("42 seats"), Some(42));
        assert_eq!(first_number("Seats: 7 of 30"), Some(7));
        assert_eq!(first_number("none"), None);
        assert_eq!(first_number("99999999999999"), None);
    }

    proptest! {
        #[test]
        fn first_number_reads_any_u32(n in any::<u32>(), prefix in "[a-zA-Z :]{0,12}") {
            let text = format!("{}{} seats", prefix, n);
            prop_assert_eq!(first_number(&text), Some(n));
        }
    }

    #[tokio::test]
    async fn test_required_fields() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(FakeCourse::new("CSCI 0150", "Intro", "Objects first."));

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.id(), "CSCI 0150");
        assert_eq!(record.department(), "CSCI");
        assert_eq!(record.title(), "Intro");
        assert_eq!(record.description(), "Objects first.");
        assert_eq!(record.prerequisites(), "");
        assert_eq!(record.max_enrollment(), None);
        assert_eq!(record.seats_available(), None);
    }

    #[tokio::test]
    async fn test_missing_title_is_hard_error() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(FakeCourse::new("CSCI 0150", "Intro", "Desc").without_title());

        let err = extractor.extract(&catalog).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingRequiredField { field: "title" }
        ));
    }

    #[tokio::test]
    async fn test_empty_description_is_hard_error() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(FakeCourse::new("CSCI 0150", "Intro", "   "));

        let err = extractor.extract(&catalog).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingRequiredField { field: "description" }
        ));
    }

    #[tokio::test]
    async fn test_exact_field_wins() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(
            FakeCourse::new("CSCI 0150", "Intro", "Desc")
                .with_seats_field("42 seats")
                .with_max_enrollment_field("Max 60")
                .with_enrollment_section("Maximum Enrollment: 30 / Seats available: 3"),
        );

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.seats_available(), Some(42));
        assert_eq!(record.max_enrollment(), Some(60));
    }

    #[tokio::test]
    async fn test_section_fallback() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(
            FakeCourse::new("CSCI 0150", "Intro", "Desc")
                .with_max_enrollment_field("")
                .with_enrollment_section("Maximum Enrollment: 30\nSeats Remaining: 12"),
        );

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.max_enrollment(), Some(30));
        assert_eq!(record.seats_available(), Some(12));
    }

    #[tokio::test]
    async fn test_panel_text_fallback() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(
            FakeCourse::new("CSCI 0150", "Intro", "Desc")
                .with_panel_text("CSCI 0150 Intro ... MAX ENROLLMENT 45 ... 8 seats left"),
        );

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.max_enrollment(), Some(45));
        assert_eq!(record.seats_available(), Some(8));
    }

    #[tokio::test]
    async fn test_unparseable_field_falls_through_to_absent() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(
            FakeCourse::new("CSCI 0150", "Intro", "Desc")
                .with_max_enrollment_field("TBD")
                .with_seats_field("see instructor"),
        );

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.max_enrollment(), None);
        assert_eq!(record.seats_available(), None);
    }

    #[tokio::test]
    async fn test_prerequisites_scoped_to_registration_section() {
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = open(
            FakeCourse::new("CSCI 1230", "Graphics", "Desc")
                .with_prerequisites("CSCI 0160 or CSCI 0180"),
        );

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.prerequisites(), "CSCI 0160 or CSCI 0180");
    }

    #[tokio::test]
    async fn test_optional_read_faults_degrade() {
        let selectors = CatalogSelectors::default();
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = FakeCatalog::new(selectors.clone())
            .with_course(
                FakeCourse::new("CSCI 1230", "Graphics", "Desc")
                    .with_prerequisites("CSCI 0160")
                    .with_seats_field("42 seats")
                    .with_enrollment_section("Maximum Enrollment: 30"),
            )
            .with_read_fault(selectors.prerequisites_field.clone())
            .with_read_fault(selectors.seats_available_field.clone());
        catalog.show_detail(0);

        let record = extractor.extract(&catalog).await.unwrap();
        assert_eq!(record.prerequisites(), "");
        assert_eq!(record.seats_available(), None);
        assert_eq!(record.max_enrollment(), Some(30));
    }

    #[tokio::test]
    async fn test_required_read_fault_is_surface_error() {
        let selectors = CatalogSelectors::default();
        let extractor = FieldExtractor::with_defaults().unwrap();
        let catalog = FakeCatalog::new(selectors.clone())
            .with_course(FakeCourse::new("CSCI 0150", "Intro", "Desc"))
            .with_read_fault(selectors.title.clone());
        catalog.show_detail(0);

        let err = extractor.extract(&catalog).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Surface(SurfaceError::Driver(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let patterns = EnrollmentPatterns {
            max_enrollment: vec!["(unclosed".to_string()],
            seats_available: vec![],
        };
        let result = FieldExtractor::new(CatalogSelectors::default(), &patterns);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
