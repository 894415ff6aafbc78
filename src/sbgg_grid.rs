// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Character Grid Builder
/// Lays out a flat character sequence as a wrapped grid of single-character
/// keys (popup mini keyboards, ad-hoc pickers).
///
/// Every emitted row gets its own key list; the geometry template is copied
/// into each row rather than shared.

use log::debug;

use crate::sbgc_config::LayoutParams;
use crate::sbgk_key::Key;
use crate::sbgl_layout::Layout;
use crate::sbgr_row::{Row, RowTemplate};

pub const MAX_KEYS_PER_MINI_ROW: usize = 9;

impl Layout {
    /// One key per character, `key_width` wide, wrapping after
    /// `MAX_KEYS_PER_MINI_ROW` columns. A key's code is its character's code point.
    pub fn from_characters<I>(characters: I, key_width: i32, params: &LayoutParams) -> Layout
    where
        I: IntoIterator<Item = char>,
    {
        let mut layout = Layout::new(params);
        let template = RowTemplate {
            default_width: key_width,
            ..layout.template()
        };

        let mut x: i32 = 0;
        let mut y: i32 = 0;
        let mut column = 0;
        let mut current_row: Option<usize> = None;

        for c in characters {
            if column >= MAX_KEYS_PER_MINI_ROW {
                x = 0;
                y = y.saturating_add(template.default_height);
                column = 0;
                current_row = None;
            }

            let row_index = match current_row {
                Some(i) => i,
                None => {
                    let i = layout.push_row(Row::new(template));
                    current_row = Some(i);
                    i
                }
            };

            let mut key = Key::new_default(&template);
            key.x = x;
            key.y = y;
            key.code = c as i32;
            key.label = Some(c.to_string());

            column += 1;
            x = x.saturating_add(key.width).saturating_add(key.gap);
            layout.push_key(row_index, key);
            layout.note_width(x);
        }

        if current_row.is_some() {
            layout.set_total_height(y.saturating_add(template.default_height));
        }

        debug!(
            "KEYBOARD: grid of {} keys in {} rows ({}x{})",
            layout.keys().len(),
            layout.rows().len(),
            layout.min_width(),
            layout.total_height()
        );

        layout
    }
}
