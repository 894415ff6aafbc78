// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

//! Property tests for layout construction and queries.

use proptest::prelude::*;
use softboard_layout::{
    build_layout, resolve_dimension_or_fraction, AttrValue, Attributes, DescriptionEvent,
    ElementKind, Key, Layout, LayoutParams, NoIcons, RowTemplate, ShiftState, KEYCODE_MODE_CHANGE,
    KEYCODE_SHIFT, MAX_KEYS_PER_MINI_ROW, ROW_PADDING,
};

fn shift_state_strategy() -> impl Strategy<Value = ShiftState> {
    prop::sample::select(vec![ShiftState::Off, ShiftState::OneChar, ShiftState::Permanent])
}

fn row_events(keys: usize) -> Vec<Result<DescriptionEvent, softboard_layout::LayoutError>> {
    let mut events = vec![Ok(DescriptionEvent::start(ElementKind::Row, Attributes::new()))];
    for _ in 0..keys {
        let mut attrs = Attributes::new();
        attrs.insert("keyLabel", AttrValue::Text("k".to_string()));
        events.push(Ok(DescriptionEvent::start(ElementKind::Key, attrs)));
        events.push(Ok(DescriptionEvent::End(ElementKind::Key)));
    }
    events.push(Ok(DescriptionEvent::End(ElementKind::Row)));
    events
}

proptest! {
    /// Fractions resolve to round(f * base) whatever the default; absent values give the default.
    #[test]
    fn prop_fraction_resolution(f in 0.0f64..2.0, base in 0i32..4000, default in -500i32..500) {
        let expected = (f * base as f64 + 0.5).floor() as i32;
        prop_assert_eq!(resolve_dimension_or_fraction(Some(&AttrValue::Fraction(f)), base, default), expected);
        prop_assert_eq!(resolve_dimension_or_fraction(None, base, default), default);
    }

    /// A non-empty label's first code point replaces any code but shift and mode-change.
    #[test]
    fn prop_label_overrides_code(
        code in any::<i32>().prop_filter("structural keys keep their code", |c| *c != KEYCODE_SHIFT && *c != KEYCODE_MODE_CHANGE),
        first in any::<char>(),
        rest in "[a-z]{0,4}",
    ) {
        let label = format!("{}{}", first, rest);
        let mut attrs = Attributes::new();
        attrs.insert("codes", AttrValue::Integer(code));
        attrs.insert("keyLabel", AttrValue::Text(label));

        let template = RowTemplate { default_width: 40, default_height: 60, default_horizontal_gap: 0 };
        let key = Key::from_description(&template, 0, 0, &attrs, 400, &NoIcons);
        prop_assert_eq!(key.code, first as i32);
    }

    /// Total height is the sum of the row heights when nothing truncates.
    #[test]
    fn prop_total_height_sums_rows(
        keys_per_row in prop::collection::vec(0usize..12, 0..8),
        base_height in 10i32..120,
        multiplier in 0.5f32..2.0,
    ) {
        let params = LayoutParams::default()
            .with_base_key_height(base_height)
            .with_height_multiplier(multiplier);
        let events: Vec<_> = keys_per_row.iter().flat_map(|&n| row_events(n)).collect();

        let built = build_layout(events, &params, &NoIcons).unwrap();
        prop_assert!(!built.is_truncated());

        let sum: i32 = built.layout.rows().iter().map(|r| r.default_height()).sum();
        prop_assert_eq!(built.layout.total_height(), sum);
        prop_assert_eq!(built.layout.rows().len(), keys_per_row.len());
        prop_assert!(built.layout.rows().iter().all(|r| r.default_height() > ROW_PADDING));
    }

    /// The grid builder emits ceil(M / 9) rows, all full except possibly the last.
    #[test]
    fn prop_grid_row_count(chars in prop::collection::vec(any::<char>(), 0..60), key_width in 1i32..80) {
        let layout = Layout::from_characters(chars.iter().copied(), key_width, &LayoutParams::default());
        let rows = layout.rows();

        prop_assert_eq!(rows.len(), chars.len().div_ceil(MAX_KEYS_PER_MINI_ROW));
        if let Some((last, full)) = rows.split_last() {
            prop_assert!(full.iter().all(|r| r.len() == MAX_KEYS_PER_MINI_ROW));
            prop_assert!(!last.is_empty() && last.len() <= MAX_KEYS_PER_MINI_ROW);
        }
        prop_assert_eq!(layout.keys().len(), chars.len());
    }

    /// set_shift_state reports true exactly when the state differs.
    #[test]
    fn prop_shift_state_change_reporting(states in prop::collection::vec(shift_state_strategy(), 1..30)) {
        let mut layout = Layout::new(&LayoutParams::default());
        let mut previous = ShiftState::Off;

        for state in states {
            prop_assert_eq!(layout.set_shift_state(state), state != previous);
            prop_assert!(!layout.set_shift_state(state));
            previous = state;
        }
    }
}
