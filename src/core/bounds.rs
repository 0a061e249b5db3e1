use serde::{Deserialize, Serialize};

use crate::core::{CategoryData, Segment};

/// Observed value range of the data feeding a scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

impl ValueBounds {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Replaces either end with an explicit override.
    #[must_use]
    pub fn with_overrides(self, graph_min: Option<f64>, graph_max: Option<f64>) -> Self {
        Self {
            min: graph_min.filter(|v| v.is_finite()).unwrap_or(self.min),
            max: graph_max.filter(|v| v.is_finite()).unwrap_or(self.max),
        }
    }

    fn include(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }
}

fn fold_bounds(values: impl Iterator<Item = f64>) -> Option<ValueBounds> {
    // Infinite sentinels: all-negative data must still produce a negative max.
    let bounds = values
        .filter(|value| value.is_finite())
        .fold(ValueBounds::new(f64::INFINITY, f64::NEG_INFINITY), ValueBounds::include);
    (bounds.min <= bounds.max).then_some(bounds)
}

/// Min/max across every value of every dataset.
#[must_use]
pub fn series_bounds(data: &CategoryData) -> Option<ValueBounds> {
    fold_bounds(
        data.datasets
            .iter()
            .flat_map(|dataset| dataset.data.iter().copied().flatten()),
    )
}

/// Bounds of stacked charts: positive values stack upwards and negative
/// values stack downwards from zero, per category.
#[must_use]
pub fn stacked_bounds(data: &CategoryData) -> Option<ValueBounds> {
    let categories = data.category_count();
    let mut any = false;
    let mut bounds = ValueBounds::new(0.0, 0.0);

    for index in 0..categories {
        let mut positive = 0.0;
        let mut negative = 0.0;
        for dataset in &data.datasets {
            match dataset.value(index) {
                Some(value) if value >= 0.0 => positive += value,
                Some(value) => negative += value,
                None => continue,
            }
            any = true;
        }
        bounds = bounds.include(positive).include(negative);
    }

    any.then_some(bounds)
}

/// Running stack totals per category, split by sign.
#[derive(Debug, Clone, PartialEq)]
pub struct StackAccumulator {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl StackAccumulator {
    #[must_use]
    pub fn new(categories: usize) -> Self {
        Self {
            positive: vec![0.0; categories],
            negative: vec![0.0; categories],
        }
    }

    /// Pushes `value` onto the stack of `index`, returning `(base, top)`.
    pub fn push(&mut self, index: usize, value: f64) -> (f64, f64) {
        let slot = if value >= 0.0 {
            &mut self.positive[index]
        } else {
            &mut self.negative[index]
        };
        let base = *slot;
        *slot += value;
        (base, *slot)
    }

    #[must_use]
    pub fn total(&self, index: usize) -> f64 {
        self.positive[index] + self.negative[index]
    }
}

/// Min/max of drawable segment values (polar area radial scale).
#[must_use]
pub fn segment_bounds(segments: &[Segment]) -> Option<ValueBounds> {
    fold_bounds(
        segments
            .iter()
            .filter(|segment| segment.is_drawable())
            .map(|segment| segment.value),
    )
}

#[cfg(test)]
mod tests {
    use super::{StackAccumulator, series_bounds, stacked_bounds};
    use crate::core::{CategoryData, Dataset};

    #[test]
    fn all_negative_data_keeps_negative_max() {
        let data = CategoryData::new(["a", "b"]).with_dataset(Dataset::new("s", [-5.0, -2.0]));
        let bounds = series_bounds(&data).expect("bounds");
        assert_eq!(bounds.min, -5.0);
        assert_eq!(bounds.max, -2.0);
    }

    #[test]
    fn missing_values_are_ignored() {
        let mut dataset = Dataset::new("s", [3.0, 1.0]);
        dataset.data.push(None);
        let data = CategoryData::new(["a", "b", "c"]).with_dataset(dataset);
        let bounds = series_bounds(&data).expect("bounds");
        assert_eq!((bounds.min, bounds.max), (1.0, 3.0));

        let empty = CategoryData::new(["a"]).with_dataset(Dataset {
            data: vec![None],
            ..Dataset::new("s", [])
        });
        assert!(series_bounds(&empty).is_none());
    }

    #[test]
    fn stacked_max_is_largest_category_total() {
        let data = CategoryData::new(["a", "b"])
            .with_dataset(Dataset::new("s1", [1.0, 5.0]))
            .with_dataset(Dataset::new("s2", [9.0, 2.0]));
        let bounds = stacked_bounds(&data).expect("bounds");
        assert_eq!(bounds.max, 10.0);
        assert_eq!(bounds.min, 0.0);
    }

    #[test]
    fn accumulator_stacks_signs_separately() {
        let mut stack = StackAccumulator::new(1);
        assert_eq!(stack.push(0, 3.0), (0.0, 3.0));
        assert_eq!(stack.push(0, -2.0), (0.0, -2.0));
        assert_eq!(stack.push(0, 4.0), (3.0, 7.0));
        assert_eq!(stack.total(0), 5.0);
    }
}
