//! Locator synthesis
//!
//! A script collects an element's ancestry in the page; the locator is built
//! from it here. Elements with an `id` get the `id("...")` shortcut, everything
//! else gets an absolute path where each level is `tag` or `tag[n]`, `n` being
//! the 1-based position among same-tag siblings. The path survives attribute
//! churn but changes when same-tag siblings are reordered.

use autotest_common::Locator;
use serde::Deserialize;

use crate::driver::BrowserDriver;
use crate::error::{EngineError, EngineResult};

/// Collects `{ id, attached, path: [{ tag, ordinal }] }` for `arguments[0]`
pub const ANCESTRY_SCRIPT: &str = r#"
var element = arguments[0];
var path = [];
var node = element;
while (node && node.nodeType === Node.ELEMENT_NODE) {
    var ordinal = 1;
    var sibling = node.previousElementSibling;
    while (sibling) {
        if (sibling.tagName === node.tagName) {
            ordinal++;
        }
        sibling = sibling.previousElementSibling;
    }
    path.unshift({ tag: node.tagName.toLowerCase(), ordinal: ordinal });
    node = node.parentNode;
}
return { id: element.id || "", attached: node === document, path: path };
"#;

/// One level of an element's ancestry, root first
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathStep {
    pub tag: String,
    pub ordinal: u32,
}

impl PathStep {
    pub fn new(tag: impl Into<String>, ordinal: u32) -> Self {
        Self {
            tag: tag.into(),
            ordinal,
        }
    }
}

/// Structural facts about an element, as reported by [`ANCESTRY_SCRIPT`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElementAncestry {
    #[serde(default)]
    pub id: String,
    pub attached: bool,
    pub path: Vec<PathStep>,
}

impl ElementAncestry {
    /// Build the locator for this element
    pub fn to_locator(&self) -> EngineResult<Locator> {
        if !self.attached {
            return Err(EngineError::Locator(
                "element is detached from the document".to_string(),
            ));
        }

        // An id with a double quote cannot be written inside id("...")
        if !self.id.is_empty() && !self.id.contains('"') {
            return Ok(Locator::for_id(&self.id));
        }

        if self.path.is_empty() {
            return Err(EngineError::Locator("element has no ancestry".to_string()));
        }

        let mut segments = Vec::with_capacity(self.path.len());
        for step in &self.path {
            if step.tag.is_empty() || step.ordinal == 0 {
                return Err(EngineError::Locator(format!(
                    "malformed path step {:?}",
                    step
                )));
            }
            if step.ordinal > 1 {
                segments.push(format!("{}[{}]", step.tag, step.ordinal));
            } else {
                segments.push(step.tag.clone());
            }
        }

        Ok(Locator::new(format!("/{}", segments.join("/"))))
    }
}

/// Synthesize a locator for `element` on the driver's current page.
///
/// Fails with [`EngineError::Locator`] when the element is detached or the
/// page refuses the script (stale handle, cross-origin frame).
pub async fn synthesize<D: BrowserDriver>(driver: &D, element: &D::Element) -> EngineResult<Locator> {
    let value = driver
        .execute_with(ANCESTRY_SCRIPT, element)
        .await
        .map_err(|e| EngineError::Locator(e.to_string()))?;

    let ancestry: ElementAncestry = serde_json::from_value(value)
        .map_err(|e| EngineError::Locator(format!("unexpected ancestry: {}", e)))?;

    ancestry.to_locator()
}
