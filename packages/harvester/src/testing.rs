//! Testing utilities including fake and mock implementations.
//!
//! These let applications exercise traversal, embedding and indexing without
//! a browser, network calls or a live index.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{
    CredentialResult, EmbeddingError, EmbeddingResult, SurfaceError, SurfaceResult, UpsertError,
    UpsertResult,
};
use crate::security::AccessToken;
use crate::traits::{
    credentials::CredentialProvider,
    embedder::EmbeddingClient,
    index::{Metadata, VectorIndex},
    surface::{Locator, Pick, Surface},
};
use crate::types::config::CatalogSelectors;

// =============================================================================
// Fake catalog surface
// =============================================================================

/// One scripted course behind a list entry.
#[derive(Debug, Clone)]
pub struct FakeCourse {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub prerequisites: Option<String>,
    pub max_enrollment_field: Option<String>,
    pub seats_field: Option<String>,
    pub enrollment_section: Option<String>,
    pub panel_text: Option<String>,

    /// Whether the detail view ever renders after a click
    pub renders: bool,
}

impl FakeCourse {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            description: Some(description.into()),
            prerequisites: None,
            max_enrollment_field: None,
            seats_field: None,
            enrollment_section: None,
            panel_text: None,
            renders: true,
        }
    }

    /// Detail view never appears (simulated timeout).
    pub fn never_renders(mut self) -> Self {
        self.renders = false;
        self
    }

    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }

    pub fn with_prerequisites(mut self, text: impl Into<String>) -> Self {
        self.prerequisites = Some(text.into());
        self
    }

    pub fn with_max_enrollment_field(mut self, text: impl Into<String>) -> Self {
        self.max_enrollment_field = Some(text.into());
        self
    }

    pub fn with_seats_field(mut self, text: impl Into<String>) -> Self {
        self.seats_field = Some(text.into());
        self
    }

    pub fn with_enrollment_section(mut self, text: impl Into<String>) -> Self {
        self.enrollment_section = Some(text.into());
        self
    }

    pub fn with_panel_text(mut self, text: impl Into<String>) -> Self {
        self.panel_text = Some(text.into());
        self
    }

    fn panel(&self) -> String {
        if let Some(text) = &self.panel_text {
            return text.clone();
        }
        [
            Some(&self.id),
            self.title.as_ref(),
            self.description.as_ref(),
            self.prerequisites.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Blank,
    List,
    Detail { index: usize, rendered: bool },
}

#[derive(Debug)]
struct FakeState {
    view: View,
    opened: Vec<usize>,
    navigations: Vec<String>,
    back_clicks: usize,
}

/// A scripted catalog that behaves like the list/detail surface.
///
/// Clicking an entry opens its detail panel (which may never render), the
/// back control returns to the list, and list rows only exist while the list
/// is showing. Reads are answered from the [`FakeCourse`] of the open panel.
#[derive(Clone)]
pub struct FakeCatalog {
    selectors: CatalogSelectors,
    courses: Arc<Vec<FakeCourse>>,
    state: Arc<Mutex<FakeState>>,
    back_broken: bool,
    read_faults: Vec<String>,
}

impl FakeCatalog {
    pub fn new(selectors: CatalogSelectors) -> Self {
        Self {
            selectors,
            courses: Arc::new(Vec::new()),
            state: Arc::new(Mutex::new(FakeState {
                view: View::Blank,
                opened: Vec::new(),
                navigations: Vec::new(),
                back_clicks: 0,
            })),
            back_broken: false,
            read_faults: Vec::new(),
        }
    }

    /// Append a course to the list (builder pattern).
    pub fn with_course(mut self, course: FakeCourse) -> Self {
        Arc::make_mut(&mut self.courses).push(course);
        self
    }

    pub fn with_courses(self, courses: impl IntoIterator<Item = FakeCourse>) -> Self {
        courses.into_iter().fold(self, |catalog, course| catalog.with_course(course))
    }

    /// Make the back control fail, leaving the detail panel on screen.
    pub fn with_broken_back(mut self) -> Self {
        self.back_broken = true;
        self
    }

    /// Make reads of `selector` fail with a driver error.
    pub fn with_read_fault(mut self, selector: impl Into<String>) -> Self {
        self.read_faults.push(selector.into());
        self
    }

    /// Put the list view on screen.
    pub fn show_list(&self) {
        self.state.lock().unwrap().view = View::List;
    }

    /// Put a rendered detail view on screen.
    pub fn show_detail(&self, index: usize) {
        self.state.lock().unwrap().view = View::Detail {
            index,
            rendered: true,
        };
    }

    /// Entry indices clicked open, in order.
    pub fn opened(&self) -> Vec<usize> {
        self.state.lock().unwrap().opened.clone()
    }

    /// URLs navigated to.
    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn back_clicks(&self) -> usize {
        self.state.lock().unwrap().back_clicks
    }

    fn view(&self) -> View {
        self.state.lock().unwrap().view
    }

    fn not_found(locator: &Locator) -> SurfaceError {
        SurfaceError::NotFound {
            locator: locator.to_string(),
        }
    }

    fn is_list_entry(&self, locator: &Locator) -> bool {
        locator.steps().len() == 1 && locator.selector() == self.selectors.list_entry
    }

    fn entry_index(&self, locator: &Locator) -> Option<usize> {
        let len = self.courses.len();
        let index = match locator.steps().first()?.pick {
            Pick::First => 0,
            Pick::Nth(n) => n,
            Pick::Last => len.checked_sub(1)?,
        };
        (index < len).then_some(index)
    }

    fn is_back_control(&self, locator: &Locator) -> bool {
        matches!(locator.steps(), [panel, back]
            if panel.selector == self.selectors.detail_panel
                && back.selector == self.selectors.back_control)
    }

    fn present(&self, locator: &Locator) -> bool {
        let view = self.view();
        if self.is_list_entry(locator) {
            return view == View::List && self.entry_index(locator).is_some();
        }
        if locator.steps().len() == 1 && locator.selector() == self.selectors.detail_signature {
            return matches!(view, View::Detail { rendered: true, .. });
        }
        if locator.steps().len() == 1 && locator.selector() == self.selectors.detail_panel {
            return matches!(view, View::Detail { .. });
        }
        self.lookup(locator).is_some()
    }

    fn lookup(&self, locator: &Locator) -> Option<String> {
        let View::Detail {
            index,
            rendered: true,
        } = self.view()
        else {
            return None;
        };
        let course = self.courses.get(index)?;
        let s = &self.selectors;
        let selector = locator.selector();

        if locator.steps().len() == 2 {
            let scope = &locator.steps()[0].selector;
            if *scope == s.registration_section && selector == s.prerequisites_field {
                return course.prerequisites.clone();
            }
            return None;
        }

        if selector == s.course_code {
            Some(course.id.clone())
        } else if selector == s.title {
            course.title.clone()
        } else if selector == s.description {
            course.description.clone()
        } else if selector == s.max_enrollment_field {
            course.max_enrollment_field.clone()
        } else if selector == s.seats_available_field {
            course.seats_field.clone()
        } else if selector == s.enrollment_section {
            course.enrollment_section.clone()
        } else if selector == s.detail_panel {
            Some(course.panel())
        } else {
            None
        }
    }
}

#[async_trait]
impl Surface for FakeCatalog {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.view = if self.selectors.search_button.is_some() {
            View::Blank
        } else {
            View::List
        };
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> SurfaceResult<()> {
        if self.selectors.search_button.as_deref() == Some(locator.selector()) {
            self.show_list();
            return Ok(());
        }

        if self.is_list_entry(locator) {
            let index = self
                .entry_index(locator)
                .filter(|_| self.view() == View::List)
                .ok_or_else(|| Self::not_found(locator))?;
            let mut state = self.state.lock().unwrap();
            state.opened.push(index);
            state.view = View::Detail {
                index,
                rendered: self.courses[index].renders,
            };
            return Ok(());
        }

        if self.is_back_control(locator) {
            if !matches!(self.view(), View::Detail { .. }) {
                return Err(Self::not_found(locator));
            }
            if self.back_broken {
                return Err(SurfaceError::Driver("back control is not interactable".into()));
            }
            let mut state = self.state.lock().unwrap();
            state.back_clicks += 1;
            state.view = View::List;
            return Ok(());
        }

        Err(Self::not_found(locator))
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> SurfaceResult<()> {
        if self.present(locator) {
            Ok(())
        } else {
            Err(SurfaceError::Timeout {
                locator: locator.to_string(),
                timeout,
            })
        }
    }

    async fn read_text(&self, locator: &Locator) -> SurfaceResult<String> {
        if self.read_faults.iter().any(|f| f == locator.selector()) {
            return Err(SurfaceError::Driver(
                format!("stale node while reading {}", locator).into(),
            ));
        }
        self.lookup(locator).ok_or_else(|| Self::not_found(locator))
    }

    async fn count(&self, locator: &Locator) -> SurfaceResult<usize> {
        if self.selectors.list_entry == locator.selector() && self.view() == View::List {
            Ok(self.courses.len())
        } else {
            Ok(0)
        }
    }

    async fn scroll_into_view(&self, locator: &Locator) -> SurfaceResult<()> {
        if self.present(locator) {
            Ok(())
        } else {
            Err(Self::not_found(locator))
        }
    }

    fn name(&self) -> &str {
        "fake-catalog"
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Credential provider that mints numbered tokens with a fixed lifetime.
#[derive(Clone)]
pub struct StaticCredentials {
    issued_at: DateTime<Utc>,
    lifetime: ChronoDuration,
    refreshes: Arc<Mutex<usize>>,
}

impl StaticCredentials {
    pub fn new(issued_at: DateTime<Utc>, lifetime: ChronoDuration) -> Self {
        Self {
            issued_at,
            lifetime,
            refreshes: Arc::new(Mutex::new(0)),
        }
    }

    /// Tokens valid for an hour from now.
    pub fn hourly() -> Self {
        Self::new(Utc::now(), ChronoDuration::hours(1))
    }

    pub fn refresh_count(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn refresh(&self) -> CredentialResult<AccessToken> {
        let mut refreshes = self.refreshes.lock().unwrap();
        *refreshes += 1;
        Ok(AccessToken::new(
            format!("static-token-{}", *refreshes),
            self.issued_at + self.lifetime,
        ))
    }
}

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding client returning deterministic, hash-seeded vectors.
pub struct DeterministicEmbedder {
    dimension: usize,
    failing_texts: RwLock<Vec<String>>,
    calls: RwLock<Vec<String>>,
}

impl Default for DeterministicEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl DeterministicEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            failing_texts: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Fail any request whose text contains `needle`.
    pub fn failing_on(self, needle: impl Into<String>) -> Self {
        self.failing_texts.write().unwrap().push(needle.into());
        self
    }

    /// Texts submitted so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// The vector this client returns for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let hash = Sha256::digest(text.as_bytes());
        (0..self.dimension)
            .map(|i| (hash[i % 32] as f32 / 127.5) - 1.0)
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for DeterministicEmbedder {
    async fn predict(&self, _access_token: &str, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.calls.write().unwrap().push(text.to_string());
        let fails = self
            .failing_texts
            .read()
            .unwrap()
            .iter()
            .any(|needle| text.contains(needle.as_str()));
        if fails {
            return Err(EmbeddingError::Provider("provider returned 500".into()));
        }
        Ok(self.vector_for(text))
    }
}

// =============================================================================
// Vector index
// =============================================================================

/// A stored vector and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVector {
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

/// In-memory vector index keyed by id.
#[derive(Default)]
pub struct MemoryIndex {
    vectors: RwLock<HashMap<String, StoredVector>>,
    rejected_ids: RwLock<Vec<String>>,
    upserts: RwLock<usize>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject upserts for `id`.
    pub fn rejecting(self, id: impl Into<String>) -> Self {
        self.rejected_ids.write().unwrap().push(id.into());
        self
    }

    pub fn get(&self, id: &str) -> Option<StoredVector> {
        self.vectors.read().unwrap().get(id).cloned()
    }

    /// Number of distinct ids stored.
    pub fn len(&self) -> usize {
        self.vectors.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful upsert calls, including overwrites.
    pub fn upsert_count(&self) -> usize {
        *self.upserts.read().unwrap()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, id: &str, vector: &[f32], metadata: &Metadata) -> UpsertResult<()> {
        if self.rejected_ids.read().unwrap().iter().any(|r| r == id) {
            return Err(UpsertError::Rejected {
                id: id.to_string(),
                reason: "rejected by test index".to_string(),
            });
        }
        self.vectors.write().unwrap().insert(
            id.to_string(),
            StoredVector {
                values: vector.to_vec(),
                metadata: metadata.clone(),
            },
        );
        *self.upserts.write().unwrap() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
