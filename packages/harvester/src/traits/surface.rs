//! Rendering surface abstraction.
//!
//! A `Surface` is the live, stateful page the catalog is rendered into. The
//! traversal engine owns it exclusively for a run and never drives it
//! concurrently.
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::traits::surface::{Locator, Surface};
//!
//! surface.navigate("https://cab.brown.edu/").await?;
//! surface.click(&Locator::css("#search-button")).await?;
//! let rows = surface.count(&Locator::css(".result__link")).await?;
//! ```

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::error::SurfaceResult;

/// Which match of a selector a locator step refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pick {
    First,
    Nth(usize),
    Last,
}

/// One CSS selector plus the match it picks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatorStep {
    pub selector: String,
    pub pick: Pick,
}

/// A chain of CSS lookups, each scoped to the element found by the previous step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    steps: Vec<LocatorStep>,
}

impl Locator {
    /// Locate the first element matching `selector` in the document.
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            steps: vec![LocatorStep {
                selector: selector.into(),
                pick: Pick::First,
            }],
        }
    }

    /// Pick the `index`-th match of the innermost step.
    pub fn nth(self, index: usize) -> Self {
        self.with_pick(Pick::Nth(index))
    }

    /// Pick the last match of the innermost step.
    pub fn last(self) -> Self {
        self.with_pick(Pick::Last)
    }

    /// Narrow to a descendant of the currently located element.
    pub fn child(mut self, selector: impl Into<String>) -> Self {
        self.steps.push(LocatorStep {
            selector: selector.into(),
            pick: Pick::First,
        });
        self
    }

    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// Selector of the innermost step.
    pub fn selector(&self) -> &str {
        self.steps
            .last()
            .map(|step| step.selector.as_str())
            .unwrap_or_default()
    }

    fn with_pick(mut self, pick: Pick) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.pick = pick;
        }
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            f.write_str(&step.selector)?;
            match step.pick {
                Pick::First => {}
                Pick::Nth(n) => write!(f, ":nth({})", n)?,
                Pick::Last => f.write_str(":last")?,
            }
        }
        Ok(())
    }
}

/// Capabilities consumed from the rendering/navigation collaborator.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Load a URL.
    async fn navigate(&self, url: &str) -> SurfaceResult<()>;

    /// Click the located element.
    async fn click(&self, locator: &Locator) -> SurfaceResult<()>;

    /// Wait until the located element exists, or fail with `SurfaceError::Timeout`.
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> SurfaceResult<()>;

    /// Visible text of the located element, `SurfaceError::NotFound` if absent.
    async fn read_text(&self, locator: &Locator) -> SurfaceResult<String>;

    /// Number of elements matching the innermost step.
    async fn count(&self, locator: &Locator) -> SurfaceResult<usize>;

    /// Bring the located element into an interactable position.
    async fn scroll_into_view(&self, locator: &Locator) -> SurfaceResult<()>;

    /// Get the surface name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_chain() {
        let locator = Locator::css(".panel__content").last().child(".panel__back");

        assert_eq!(locator.steps().len(), 2);
        assert_eq!(locator.steps()[0].pick, Pick::Last);
        assert_eq!(locator.steps()[1].pick, Pick::First);
        assert_eq!(locator.selector(), ".panel__back");
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::css(".result__link").nth(4).to_string(), ".result__link:nth(4)");
        assert_eq!(Locator::css(".title").to_string(), ".title");
    }
}
