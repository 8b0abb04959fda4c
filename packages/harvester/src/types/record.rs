//! The course record produced by one detail-view visit.

use serde::Serialize;

use crate::error::ExtractionError;

/// One scraped course.
///
/// Built once by the field extractor and never mutated afterwards: fields are
/// private and `department` is always derived from `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    id: String,
    department: String,
    title: String,
    description: String,
    prerequisites: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_enrollment: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seats_available: Option<u32>,
}

impl CourseRecord {
    /// Create a record from its required fields.
    ///
    /// Each value is trimmed; an empty result is a
    /// [`ExtractionError::MissingRequiredField`].
    pub fn new(
        id: impl AsRef<str>,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Result<Self, ExtractionError> {
        let id = required("id", id.as_ref())?;
        let title = required("title", title.as_ref())?;
        let description = required("description", description.as_ref())?;

        Ok(Self {
            department: department_of(&id).to_string(),
            id,
            title,
            description,
            prerequisites: String::new(),
            max_enrollment: None,
            seats_available: None,
        })
    }

    /// Set the prerequisites text.
    pub fn with_prerequisites(mut self, prerequisites: impl AsRef<str>) -> Self {
        self.prerequisites = prerequisites.as_ref().trim().to_string();
        self
    }

    /// Set the maximum enrollment.
    pub fn with_max_enrollment(mut self, value: Option<u32>) -> Self {
        self.max_enrollment = value;
        self
    }

    /// Set the number of open seats.
    pub fn with_seats_available(mut self, value: Option<u32>) -> Self {
        self.seats_available = value;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Prerequisites text, empty when the course lists none.
    pub fn prerequisites(&self) -> &str {
        &self.prerequisites
    }

    pub fn max_enrollment(&self) -> Option<u32> {
        self.max_enrollment
    }

    pub fn seats_available(&self) -> Option<u32> {
        self.seats_available
    }

    /// Numeric part of the course code (`"APMA 0350A"` → 350).
    pub fn course_number(&self) -> Option<u32> {
        let number = self.id.split_whitespace().nth(1)?;
        let digits: String = number.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    /// Thousand-wide level band used for filtering (`"1000-1999"`).
    pub fn level_band(&self) -> Option<String> {
        self.course_number().map(level_band)
    }
}

/// First whitespace-delimited token of a course code.
pub fn department_of(id: &str) -> &str {
    id.split_whitespace().next().unwrap_or_default()
}

/// Band label for a course number.
pub fn level_band(number: u32) -> String {
    let low = number / 1000 * 1000;
    format!("{}-{}", low, low + 999)
}

fn required(field: &'static str, value: &str) -> Result<String, ExtractionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::MissingRequiredField { field });
    }
    Ok(trimmed.to_string())
}
