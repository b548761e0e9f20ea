//! Detail overlay for a single entry, with page scroll locking.

use serde::{Deserialize, Serialize};

use crate::models::Recommendation;

/// Page overflow as applied to the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
}

impl Overflow {
    pub fn as_css(&self) -> &'static str {
        match self {
            Overflow::Visible => "visible",
            Overflow::Hidden => "hidden",
        }
    }
}

/// Inline style the view applies to the page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStyle {
    pub padding_right: String,
    pub overflow: Overflow,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            padding_right: "0".to_string(),
            overflow: Overflow::Visible,
        }
    }
}

/// Window measurements reported by the page when opening the modal.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportMetrics {
    /// `window.innerWidth`
    pub window_width: u32,
    /// `document.documentElement.clientWidth`
    pub client_width: u32,
}

impl ViewportMetrics {
    pub fn scrollbar_width(&self) -> u32 {
        self.window_width.saturating_sub(self.client_width)
    }
}

/// Where a click inside the overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickTarget {
    Inside,
    Outside,
}

#[derive(Debug, Clone, Default)]
pub struct DetailModal {
    selected: Option<Recommendation>,
}

impl DetailModal {
    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&Recommendation> {
        self.selected.as_ref()
    }

    /// Select `entry` and lock scrolling, padding the page by the scrollbar
    /// width so the content does not shift when the scrollbar disappears.
    pub fn open(&mut self, entry: Recommendation, metrics: ViewportMetrics, page: &mut PageStyle) {
        page.padding_right = format!("{}px", metrics.scrollbar_width());
        page.overflow = Overflow::Hidden;
        self.selected = Some(entry);
    }

    pub fn close(&mut self, page: &mut PageStyle) {
        page.padding_right = "0".to_string();
        page.overflow = Overflow::Visible;
        self.selected = None;
    }

    /// Clicks on the backdrop close the modal; clicks on its content do nothing.
    pub fn click(&mut self, target: ClickTarget, page: &mut PageStyle) {
        if target == ClickTarget::Outside {
            self.close(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_recommendations;

    fn nineteen_eighty_four() -> Recommendation {
        sample_recommendations()
            .into_iter()
            .find(|r| r.title == "1984")
            .unwrap()
    }

    #[test]
    fn test_open_compensates_for_scrollbar() {
        let mut modal = DetailModal::default();
        let mut page = PageStyle::default();
        let metrics = ViewportMetrics {
            window_width: 1280,
            client_width: 1265,
        };

        modal.open(nineteen_eighty_four(), metrics, &mut page);

        assert!(modal.is_open());
        assert_eq!(page.padding_right, "15px");
        assert_eq!(page.overflow, Overflow::Hidden);
        assert_eq!(modal.selected().unwrap().tag_labels(), vec!["dystopian"]);
    }

    #[test]
    fn test_close_always_restores_page() {
        let mut modal = DetailModal::default();
        let mut page = PageStyle::default();

        modal.open(nineteen_eighty_four(), ViewportMetrics::default(), &mut page);
        assert_eq!(page.padding_right, "0px");
        modal.close(&mut page);
        assert_eq!(page, PageStyle::default());

        // Closing an already closed modal still resets the page.
        page.padding_right = "17px".to_string();
        page.overflow = Overflow::Hidden;
        modal.close(&mut page);
        assert_eq!(page.padding_right, "0");
        assert_eq!(page.overflow, Overflow::Visible);
    }

    #[test]
    fn test_inside_click_keeps_modal_open() {
        let mut modal = DetailModal::default();
        let mut page = PageStyle::default();
        modal.open(nineteen_eighty_four(), ViewportMetrics::default(), &mut page);

        modal.click(ClickTarget::Inside, &mut page);
        assert!(modal.is_open());

        modal.click(ClickTarget::Outside, &mut page);
        assert!(!modal.is_open());
        assert_eq!(page, PageStyle::default());
    }

    #[test]
    fn test_scrollbar_width_never_negative() {
        let metrics = ViewportMetrics {
            window_width: 800,
            client_width: 820,
        };
        assert_eq!(metrics.scrollbar_width(), 0);
    }
}
