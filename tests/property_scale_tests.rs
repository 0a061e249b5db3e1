use chartkit::ChartError;
use chartkit::core::{
    NumberFormat, Rounding, ScaleLabelFormat, ScaleRequest, StepWindow, ValueBounds,
    calculate_offset, calculate_scale, format_number, unformat,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_steps_fit_window_and_cover_bounds(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        pixel_budget in 50.0f64..2_000.0,
    ) {
        let max = min + span;
        let window = StepWindow::from_pixel_budget(pixel_budget, 12.0);
        let request = ScaleRequest::new(ValueBounds::new(min, max), window);
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");

        prop_assert!(window.contains(scale.steps), "steps {} outside {:?}", scale.steps, window);
        prop_assert!(scale.step_value > 0.0);
        prop_assert!(scale.graph_min <= min);
        prop_assert!(scale.graph_max() >= max - scale.step_value * 1e-6);
        prop_assert_eq!(scale.labels.len(), scale.steps + 1);
    }

    #[test]
    fn degenerate_ranges_still_produce_a_positive_step(value in -1_000.0f64..1_000.0) {
        let request = ScaleRequest::new(ValueBounds::new(value, value), StepWindow::new(2, 10));
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        prop_assert!(scale.step_value > 0.0);
        prop_assert!(scale.graph_min <= value);
        prop_assert!(scale.graph_max() >= value);
    }

    #[test]
    fn extreme_ranges_fail_cleanly_or_stay_finite(
        min in -1.0e308f64..1.0e308,
        max in -1.0e308f64..1.0e308,
        pixel_budget in 20.0f64..2_000.0,
    ) {
        let window = StepWindow::from_pixel_budget(pixel_budget, 12.0);
        let request = ScaleRequest::new(ValueBounds::new(min, max), window);
        match calculate_scale(&request, &ScaleLabelFormat::default()) {
            Ok(scale) => {
                prop_assert!(scale.step_value.is_finite() && scale.step_value > 0.0);
                prop_assert!(scale.graph_min.is_finite());
                prop_assert!(scale.graph_max().is_finite());
                for label in &scale.labels {
                    prop_assert!(!label.contains("NaN") && !label.contains("inf"), "label {}", label);
                }
            }
            Err(error) => prop_assert!(matches!(error, ChartError::InvalidData(_)), "{:?}", error),
        }
    }

    #[test]
    fn offsets_are_monotonic_and_stay_on_the_axis(
        min in -500.0f64..500.0,
        span in 1.0f64..1_000.0,
        a in -2_000.0f64..2_000.0,
        b in -2_000.0f64..2_000.0,
    ) {
        let request = ScaleRequest::new(ValueBounds::new(min, min + span), StepWindow::new(3, 10));
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        let hop = 25.0;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_offset = calculate_offset(low, &scale, hop);
        let high_offset = calculate_offset(high, &scale, hop);

        prop_assert!(low_offset <= high_offset);
        prop_assert!(low_offset >= 0.0);
        prop_assert!(high_offset <= hop * scale.steps as f64 + 1e-9);
    }

    #[test]
    fn formatted_numbers_parse_back(value in -1.0e9f64..1.0e9) {
        let format = NumberFormat::default()
            .with_separators(",", " ")
            .with_rounding(Rounding::Decimals(2));
        let text = format_number(value, &format);
        let parsed = unformat(&text, &format).expect("parse");
        prop_assert!((parsed - value).abs() <= 0.005 + value.abs() * 1e-12);
    }
}
