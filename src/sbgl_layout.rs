// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Keyboard Layout Model
///
/// The aggregate owning all rows and keys for one display-width context.
/// Geometry is fixed once built; only the shift state and per-key transient
/// flags change afterwards. A different display width needs a new build.

use crate::sbga_attrs::round_half_up;
use crate::sbgc_config::LayoutParams;
use crate::sbgk_key::Key;
use crate::sbgr_row::{Row, RowContext, RowTemplate};
use crate::sbgt_types::{EnterKeyBehavior, ShiftState, KEYCODE_SHIFT};

/// Proximity search radius, in default key widths
const SEARCH_DISTANCE: f32 = 1.8;

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    params: LayoutParams,
    default_width: i32,
    default_height: i32,
    default_horizontal_gap: i32,
    /// Unscaled key height the rows multiply by `height_multiplier`
    base_key_height: i32,
    shift_state: ShiftState,
    shift_key: Option<usize>,
    total_height: i32,
    min_width: i32,
    rows: Vec<Row>,
    keys: Vec<Key>,
}

impl Layout {
    /// Empty layout with defaults derived from the construction context
    pub fn new(params: &LayoutParams) -> Self {
        let base_key_height = params.base_key_height;
        Layout {
            params: params.clone(),
            default_width: params.display_width / 10,
            default_height: scale_height(base_key_height, params.height_multiplier),
            default_horizontal_gap: 0,
            base_key_height,
            shift_state: ShiftState::Off,
            shift_key: None,
            total_height: 0,
            min_width: 0,
            rows: Vec::new(),
            keys: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------------

    /// All keys in insertion order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Keys of one row, left to right
    pub fn row_keys<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a Key> + 'a {
        row.key_indices().iter().filter_map(move |&i| self.keys.get(i))
    }

    /// Mutable access for the input dispatcher's pressed/focused/on flags
    pub fn key_mut(&mut self, index: usize) -> Option<&mut Key> {
        self.keys.get_mut(index)
    }

    /// First key containing the point, in insertion order
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&Key> {
        self.hit_test_index(x, y).map(|i| &self.keys[i])
    }

    pub fn hit_test_index(&self, x: i32, y: i32) -> Option<usize> {
        self.keys.iter().position(|k| k.is_inside(x, y))
    }

    /// Indices of keys near the point: inside it, or centred within the
    /// proximity threshold. Insertion order.
    pub fn nearest_keys(&self, x: i32, y: i32) -> Vec<usize> {
        let threshold = self.proximity_threshold();
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_inside(x, y) || k.squared_distance_from(x, y) < threshold)
            .map(|(i, _)| i)
            .collect()
    }

    fn proximity_threshold(&self) -> i64 {
        let radius = (self.default_width as f32 * SEARCH_DISTANCE) as i64;
        radius * radius
    }

    /// Returns whether the state actually changed
    pub fn set_shift_state(&mut self, state: ShiftState) -> bool {
        if let Some(key) = self.shift_key.and_then(|i| self.keys.get_mut(i)) {
            key.on = state != ShiftState::Off;
        }
        if self.shift_state == state {
            return false;
        }
        self.shift_state = state;
        true
    }

    pub fn shift_state(&self) -> ShiftState {
        self.shift_state
    }

    pub fn is_shifted(&self) -> bool {
        self.shift_state != ShiftState::Off
    }

    /// Index of the first shift key, if the layout has one
    pub fn shift_key_index(&self) -> Option<usize> {
        self.shift_key
    }

    /// Mini keyboard for a key's popup characters, one key per character
    pub fn popup_for(&self, key_index: usize) -> Option<Layout> {
        let chars = self.keys.get(key_index)?.popup_characters.as_deref()?;
        if chars.is_empty() {
            return None;
        }
        Some(Layout::from_characters(chars.chars(), self.default_width, &self.params))
    }

    pub fn total_height(&self) -> i32 {
        self.total_height
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    pub fn display_width(&self) -> i32 {
        self.params.display_width
    }

    pub fn height_multiplier(&self) -> f32 {
        self.params.height_multiplier
    }

    pub fn enter_key_behavior(&self) -> EnterKeyBehavior {
        self.params.enter_key_behavior
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn default_width(&self) -> i32 {
        self.default_width
    }

    pub fn default_height(&self) -> i32 {
        self.default_height
    }

    pub fn default_horizontal_gap(&self) -> i32 {
        self.default_horizontal_gap
    }

    // ------------------------------------------------------------------------
    // Construction helpers (builder and grid)
    // ------------------------------------------------------------------------

    pub(crate) fn set_defaults(&mut self, width: i32, base_key_height: i32, gap: i32) {
        self.default_width = width;
        self.base_key_height = base_key_height;
        self.default_height = scale_height(base_key_height, self.params.height_multiplier);
        self.default_horizontal_gap = gap;
    }

    pub(crate) fn template(&self) -> RowTemplate {
        RowTemplate {
            default_width: self.default_width,
            default_height: self.default_height,
            default_horizontal_gap: self.default_horizontal_gap,
        }
    }

    pub(crate) fn row_context(&self) -> RowContext {
        RowContext {
            display_width: self.params.display_width,
            default_width: self.default_width,
            default_horizontal_gap: self.default_horizontal_gap,
            base_key_height: self.base_key_height,
            height_multiplier: self.params.height_multiplier,
        }
    }

    /// Append a row and return its index
    pub(crate) fn push_row(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Append a key to the flat list and to row `row_index`; returns the key index
    pub(crate) fn push_key(&mut self, row_index: usize, key: Key) -> usize {
        let index = self.keys.len();
        if key.code == KEYCODE_SHIFT && self.shift_key.is_none() {
            self.shift_key = Some(index);
        }
        self.keys.push(key);
        if let Some(row) = self.rows.get_mut(row_index) {
            row.push_key_index(index);
        }
        index
    }

    pub(crate) fn note_width(&mut self, x: i32) {
        self.min_width = self.min_width.max(x);
    }

    pub(crate) fn set_total_height(&mut self, height: i32) {
        self.total_height = height;
    }
}

fn scale_height(base: i32, multiplier: f32) -> i32 {
    round_half_up(base as f64 * multiplier as f64)
}
