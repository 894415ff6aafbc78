// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Keyboard Row Model
///
/// A row is a horizontal band of keys sharing default geometry. Rows hold
/// indices into the owning layout's flat key list; the layout owns the keys.

use crate::sbga_attrs::{round_half_up, Attributes};

/// Added to every described row's height to leave room for the visual gap
/// between key caps. Keys subtract it back out.
pub const ROW_PADDING: i32 = 10;

/// Default geometry a row hands to its keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowTemplate {
    pub default_width: i32,
    pub default_height: i32,
    pub default_horizontal_gap: i32,
}

/// Layout-wide values a described row resolves against
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RowContext {
    pub(crate) display_width: i32,
    pub(crate) default_width: i32,
    pub(crate) default_horizontal_gap: i32,
    pub(crate) base_key_height: i32,
    pub(crate) height_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    template: RowTemplate,
    mode: Option<String>,
    keys: Vec<usize>,
}

impl Row {
    /// Programmatic row with explicit defaults (ad-hoc popups, character grids)
    pub fn new(template: RowTemplate) -> Self {
        Row { template, mode: None, keys: Vec::new() }
    }

    /// Row read from a description element
    pub(crate) fn from_description(attrs: &Attributes, ctx: &RowContext) -> Self {
        let default_width = attrs.dimension_or_fraction("keyWidth", ctx.display_width, ctx.default_width);
        let default_horizontal_gap =
            attrs.dimension_or_fraction("horizontalGap", ctx.display_width, ctx.default_horizontal_gap);
        let default_height = round_half_up(ctx.base_key_height as f64 * ctx.height_multiplier as f64)
            .saturating_add(ROW_PADDING);

        Row {
            template: RowTemplate { default_width, default_height, default_horizontal_gap },
            mode: row_mode(attrs),
            keys: Vec::new(),
        }
    }

    pub fn template(&self) -> RowTemplate {
        self.template
    }

    pub fn default_width(&self) -> i32 {
        self.template.default_width
    }

    pub fn default_height(&self) -> i32 {
        self.template.default_height
    }

    pub fn default_horizontal_gap(&self) -> i32 {
        self.template.default_horizontal_gap
    }

    /// Keyboard mode tag this row is restricted to, if any
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// Indices into the layout's flat key list, left to right
    pub fn key_indices(&self) -> &[usize] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn push_key_index(&mut self, index: usize) {
        self.keys.push(index);
    }
}

/// Mode tag of a row element; empty text counts as untagged
pub(crate) fn row_mode(attrs: &Attributes) -> Option<String> {
    attrs
        .text("keyboardMode")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// A row is built only when it is untagged or its tag equals the active mode
pub(crate) fn row_matches_mode(row_mode: Option<&str>, active: Option<&str>) -> bool {
    match row_mode {
        None => true,
        Some(tag) => active == Some(tag),
    }
}
