//! Orientation and ordering options.

/// Options for estimating page orientation.
#[derive(Debug, Clone)]
pub struct OrientationOptions {
    /// How per-word angles are combined
    pub method: OrientationMethod,

    /// Minimum number of words with a usable angle (at least 1)
    pub min_words: usize,
}

impl OrientationOptions {
    /// Create new orientation options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the combination method.
    pub fn with_method(mut self, method: OrientationMethod) -> Self {
        self.method = method;
        self
    }

    /// Use quadrant bucketing instead of the circular mean.
    pub fn bucketed(mut self) -> Self {
        self.method = OrientationMethod::QuadrantBucket;
        self
    }

    /// Set the minimum number of usable words.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words.max(1);
        self
    }
}

impl Default for OrientationOptions {
    fn default() -> Self {
        Self {
            method: OrientationMethod::CircularMean,
            min_words: 1,
        }
    }
}

/// Central tendency used for per-word angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationMethod {
    /// Angle of the averaged unit vector
    #[default]
    CircularMean,
    /// Most populated of {0, 90, 180, 270} plus the mean residual inside it
    QuadrantBucket,
}

/// Options for resolving reading order.
#[derive(Debug, Clone)]
pub struct OrderOptions {
    /// Minimum vertical overlap, as a fraction of the shorter block's
    /// height, for two blocks to share a row band
    pub row_overlap_ratio: f64,

    /// Blocks whose tops differ by at most this much share a row band
    pub top_tolerance: f64,

    /// Whether to chain tables marked as continuing across pages
    pub merge_multi_page_tables: bool,
}

impl OrderOptions {
    /// Create new order options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row overlap ratio (clamped to `[0, 1]`).
    pub fn with_row_overlap_ratio(mut self, ratio: f64) -> Self {
        self.row_overlap_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the top-coordinate tolerance.
    pub fn with_top_tolerance(mut self, tolerance: f64) -> Self {
        self.top_tolerance = tolerance.max(0.0);
        self
    }

    /// Enable or disable multi-page table chaining.
    pub fn with_table_merging(mut self, merge: bool) -> Self {
        self.merge_multi_page_tables = merge;
        self
    }
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            row_overlap_ratio: 0.5,
            top_tolerance: 0.005,
            merge_multi_page_tables: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_options_builder() {
        let options = OrientationOptions::new().bucketed().with_min_words(0);
        assert_eq!(options.method, OrientationMethod::QuadrantBucket);
        assert_eq!(options.min_words, 1);
    }

    #[test]
    fn test_order_options_builder() {
        let options = OrderOptions::new()
            .with_row_overlap_ratio(1.7)
            .with_top_tolerance(-1.0)
            .with_table_merging(false);

        assert_eq!(options.row_overlap_ratio, 1.0);
        assert_eq!(options.top_tolerance, 0.0);
        assert!(!options.merge_multi_page_tables);
    }

    #[test]
    fn test_default_options() {
        let options = OrderOptions::default();
        assert_eq!(options.row_overlap_ratio, 0.5);
        assert!(options.merge_multi_page_tables);
        assert_eq!(OrientationOptions::default().method, OrientationMethod::CircularMean);
    }
}
