//! Page-load enhancements: tooltips, popovers and alert auto-dismissal.

use std::time::Duration;

/// Delay before a non-permanent alert closes itself.
pub const ALERT_DISMISS: Duration = Duration::from_secs(5);

/// Page being enhanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Any page other than user administration.
    Standard,
    /// Admin users page; every element with a `title` gets a tooltip.
    AdminUsers,
}

/// Attributes of an element relevant to enhancement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// Value of `data-bs-toggle`.
    pub toggle: Option<String>,
    /// Whether the element has a `title` attribute.
    pub has_title: bool,
    /// CSS classes.
    pub classes: Vec<String>,
}

impl ElementInfo {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }
}

/// Enhancement to attach to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    /// Hover tooltip.
    Tooltip,
    /// Click popover.
    Popover,
    /// Close the alert after the delay.
    AutoDismiss {
        /// Delay before closing.
        after: Duration,
    },
}

/// Plan enhancements for the elements of a page, as `(index, enhancement)`
/// pairs in element order.
#[must_use]
pub fn plan_enhancements(page: PageKind, elements: &[ElementInfo]) -> Vec<(usize, Enhancement)> {
    let mut plan = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let toggle = element.toggle.as_deref();
        let tooltip = toggle == Some("tooltip")
            || (page == PageKind::AdminUsers && element.has_title);
        if tooltip {
            plan.push((index, Enhancement::Tooltip));
        }
        if toggle == Some("popover") {
            plan.push((index, Enhancement::Popover));
        }
        if element.has_class("alert") && !element.has_class("alert-permanent") {
            plan.push((
                index,
                Enhancement::AutoDismiss {
                    after: ALERT_DISMISS,
                },
            ));
        }
    }
    plan
}
