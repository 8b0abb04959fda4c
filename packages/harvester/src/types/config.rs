//! Configuration types for traversal and extraction.

use std::time::Duration;

use crate::traits::surface::Locator;

/// CSS selectors describing the catalog markup.
///
/// Defaults target the Courses@Brown catalog; every selector can be
/// overridden when the markup changes.
#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    /// Control that populates the result list (None if the list loads itself)
    pub search_button: Option<String>,

    /// One row in the result list
    pub list_entry: String,

    /// Element whose presence means the detail view has rendered
    pub detail_signature: String,

    pub course_code: String,
    pub title: String,
    pub description: String,

    /// Detail panel container; the last match is the open panel
    pub detail_panel: String,

    /// Back control inside the detail panel
    pub back_control: String,

    pub max_enrollment_field: String,
    pub seats_available_field: String,

    /// Free-text section describing enrollment figures
    pub enrollment_section: String,

    /// Section holding registration restrictions
    pub registration_section: String,

    /// Prerequisites sub-field inside the registration section
    pub prerequisites_field: String,
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        Self {
            search_button: Some("#search-button".to_string()),
            list_entry: ".result__link".to_string(),
            detail_signature: ".dtl-course-code".to_string(),
            course_code: ".dtl-course-code".to_string(),
            title: ".detail-title".to_string(),
            description: ".section--description .section__content".to_string(),
            detail_panel: ".panel__content".to_string(),
            back_control: ".panel__back".to_string(),
            max_enrollment_field: ".detail-max_enroll".to_string(),
            seats_available_field: ".detail-seats_avail".to_string(),
            enrollment_section: ".section--enrollment .section__content".to_string(),
            registration_section: ".section--registration_restrictions".to_string(),
            prerequisites_field: ".prereq".to_string(),
        }
    }
}

impl CatalogSelectors {
    pub fn list_entries(&self) -> Locator {
        Locator::css(&self.list_entry)
    }

    pub fn detail_signature(&self) -> Locator {
        Locator::css(&self.detail_signature)
    }

    /// The most recently opened detail panel.
    pub fn open_panel(&self) -> Locator {
        Locator::css(&self.detail_panel).last()
    }

    pub fn back_control(&self) -> Locator {
        self.open_panel().child(&self.back_control)
    }

    pub fn prerequisites(&self) -> Locator {
        Locator::css(&self.registration_section).child(&self.prerequisites_field)
    }
}

/// Case-insensitive patterns for enrollment figures in free text.
///
/// Each pattern must capture the number in its first group. Patterns are
/// tried in order; the first one that yields a parsable number wins.
#[derive(Debug, Clone)]
pub struct EnrollmentPatterns {
    pub max_enrollment: Vec<String>,
    pub seats_available: Vec<String>,
}

impl Default for EnrollmentPatterns {
    fn default() -> Self {
        Self {
            max_enrollment: vec![
                r"max(?:imum)?\.?\s+enroll(?:ment)?\s*[:\-]?\s*(\d+)".to_string(),
                r"enrollment\s+(?:cap|limit)\s*[:\-]?\s*(\d+)".to_string(),
            ],
            seats_available: vec![
                r"seats?\s+(?:available|remaining|avail\.?)\s*[:\-]?\s*(\d+)".to_string(),
                r"(\d+)\s+seats?\s+(?:available|remaining|left)".to_string(),
            ],
        }
    }
}

/// Traversal timing and limits.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Catalog page to open
    pub catalog_url: String,

    /// Optional cap on entries visited (0 means no cap)
    pub max_courses: Option<usize>,

    /// Pause after each navigation action
    pub settle_delay: Duration,

    /// Bound on waiting for a detail view to render
    pub detail_timeout: Duration,

    /// Bound on waiting for the list view or panel container
    pub list_timeout: Duration,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            catalog_url: "https://cab.brown.edu/".to_string(),
            max_courses: None,
            settle_delay: Duration::from_millis(50),
            detail_timeout: Duration::from_secs(10),
            list_timeout: Duration::from_secs(30),
        }
    }
}

impl TraversalConfig {
    pub fn new(catalog_url: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_courses(mut self, max: Option<usize>) -> Self {
        self.max_courses = max;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_detail_timeout(mut self, timeout: Duration) -> Self {
        self.detail_timeout = timeout;
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_config_builder() {
        let config = TraversalConfig::new("https://catalog.test/")
            .with_max_courses(Some(25))
            .with_settle_delay(Duration::ZERO)
            .with_detail_timeout(Duration::from_secs(2));

        assert_eq!(config.catalog_url, "https://catalog.test/");
        assert_eq!(config.max_courses, Some(25));
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.detail_timeout, Duration::from_secs(2));
        assert_eq!(config.list_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_default_timings() {
        let config = TraversalConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(50));
        assert_eq!(config.detail_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_back_control_scoped_to_last_panel() {
        let selectors = CatalogSelectors::default();
        assert_eq!(
            selectors.back_control().to_string(),
            ".panel__content:last >> .panel__back"
        );
    }
}
