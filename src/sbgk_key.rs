// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Keyboard Key Model
///
/// This module handles:
/// - Key construction from a row template or from a description element
/// - Code inference from labels
/// - Edge-anchored hit-testing
/// - Transient press/focus state driven by the input dispatcher

use crate::sbga_attrs::Attributes;
use crate::sbgr_row::{RowTemplate, ROW_PADDING};
use crate::sbgt_types::{EdgeFlags, Icon, IconResolver, ResourceRef, KEYCODE_MODE_CHANGE, KEYCODE_SHIFT};

#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Action or character produced; negative values are reserved functions
    pub code: i32,
    pub label: Option<String>,
    pub top_small_number: String,
    /// Drawn instead of the label when present
    pub icon: Option<Icon>,
    pub output_text: Option<String>,

    pub width: i32,
    pub height: i32,
    /// Leading horizontal space before the key
    pub gap: i32,
    pub x: i32,
    pub y: i32,

    pub edge_flags: EdgeFlags,
    pub popup_characters: Option<String>,
    pub popup_layout: Option<ResourceRef>,
    pub repeatable: bool,
    pub modifier: bool,
    pub sticky: bool,

    pub pressed: bool,
    pub focused: bool,
    /// Latched state of sticky keys (shift lock, alt)
    pub on: bool,
}

impl Key {
    /// Key with the row's defaults verbatim, at the origin
    pub fn new_default(template: &RowTemplate) -> Self {
        Self::with_geometry(template.default_width, template.default_height, template.default_horizontal_gap)
    }

    /// Key read from a description element whose pre-gap top-left is `(x, y)`.
    ///
    /// `display_width` is the base for fraction-valued width and gap.
    pub fn from_description(
        template: &RowTemplate,
        x: i32,
        y: i32,
        attrs: &Attributes,
        display_width: i32,
        icons: &dyn IconResolver,
    ) -> Self {
        let width = attrs.dimension_or_fraction("keyWidth", display_width, template.default_width);
        let height = template.default_height.saturating_sub(ROW_PADDING);
        let gap = attrs.dimension_or_fraction("horizontalGap", display_width, template.default_horizontal_gap);

        let mut key = Self::with_geometry(width, height, gap);
        key.x = x.saturating_add(key.gap);
        key.y = y;

        key.code = attrs.integer("codes", 0);
        key.popup_characters = attrs.text("popupCharacters").map(str::to_string);
        key.popup_layout = attrs.reference("popupKeyboard");
        key.repeatable = attrs.boolean("isRepeatable", false);
        key.modifier = attrs.boolean("isModifier", false);
        key.sticky = attrs.boolean("isSticky", false);
        key.edge_flags = attrs.edge_flags("keyEdgeFlags");
        key.icon = attrs
            .reference("keyIcon")
            .and_then(|r| icons.resolve_icon(&r))
            .map(Icon::with_natural_bounds);
        key.label = attrs.text("keyLabel").map(str::to_string);
        key.top_small_number = attrs.text("topSmallNumber").unwrap_or_default().to_string();
        key.output_text = attrs.text("keyOutputText").map(str::to_string);

        key.infer_code_from_label();
        key
    }

    /// Shared field initialization for both construction paths
    fn with_geometry(width: i32, height: i32, gap: i32) -> Self {
        Key {
            code: 0,
            label: None,
            top_small_number: String::new(),
            icon: None,
            output_text: None,
            width: width.max(0),
            height: height.max(0),
            gap: gap.max(0),
            x: 0,
            y: 0,
            edge_flags: EdgeFlags::empty(),
            popup_characters: None,
            popup_layout: None,
            repeatable: false,
            modifier: false,
            sticky: false,
            pressed: false,
            focused: false,
            on: false,
        }
    }

    /// A non-empty label's first character wins over the numeric code,
    /// except on the shift and mode-change keys.
    fn infer_code_from_label(&mut self) {
        if self.code == KEYCODE_MODE_CHANGE || self.code == KEYCODE_SHIFT {
            return;
        }
        if let Some(first) = self.label.as_deref().and_then(|l| l.chars().next()) {
            self.code = first as i32;
        }
    }

    /// Replace the icon, setting its paint bounds to its natural size
    pub fn set_icon(&mut self, icon: Icon) {
        self.icon = Some(icon.with_natural_bounds());
    }

    /// Vertical extent is the half-open `[y, y+height)`; only horizontal
    /// edges get anchoring tolerance.
    pub fn is_inside(&self, px: i32, py: i32) -> bool {
        let left_edge = self.edge_flags.contains(EdgeFlags::LEFT);
        let right_edge = self.edge_flags.contains(EdgeFlags::RIGHT);

        let (px, py) = (px as i64, py as i64);
        let (x, y) = (self.x as i64, self.y as i64);
        let (right, bottom) = (x + self.width as i64, y + self.height as i64);

        let inside_x = (px >= x || (left_edge && px <= right)) && (px < right || (right_edge && px >= x));
        let inside_y = (py >= y && py <= bottom) && (py < bottom && py >= y);

        inside_x && inside_y
    }

    /// Squared distance from the key's centre
    pub fn squared_distance_from(&self, px: i32, py: i32) -> i64 {
        let dx = self.x as i64 + (self.width / 2) as i64 - px as i64;
        let dy = self.y as i64 + (self.height / 2) as i64 - py as i64;
        dx * dx + dy * dy
    }

    pub fn on_pressed(&mut self) {
        self.pressed = true;
    }

    /// Sticky keys toggle their latch when released over themselves
    pub fn on_released(&mut self, inside: bool) {
        self.pressed = false;
        if self.sticky && inside {
            self.on = !self.on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbgt_types::{Bounds, IconTable, NoIcons, KEYCODE_DELETE};

    fn template() -> RowTemplate {
        RowTemplate { default_width: 48, default_height: 60, default_horizontal_gap: 0 }
    }

    fn key_at(x: i32, y: i32, width: i32, height: i32, flags: EdgeFlags) -> Key {
        let mut key = Key::new_default(&template());
        key.x = x;
        key.y = y;
        key.width = width;
        key.height = height;
        key.edge_flags = flags;
        key
    }

    #[test]
    fn test_default_key_copies_template() {
        let key = Key::new_default(&template());
        assert_eq!((key.width, key.height, key.gap), (48, 60, 0));
        assert_eq!(key.code, 0);
        assert!(key.label.is_none());
    }

    #[test]
    fn test_described_key_geometry() {
        let attrs = Attributes::from_raw([("keyWidth", "15%p"), ("horizontalGap", "5%p")], 1.0);
        let key = Key::from_description(&template(), 100, 5, &attrs, 480, &NoIcons);

        assert_eq!(key.width, 72);
        assert_eq!(key.gap, 24);
        assert_eq!(key.height, 50);
        assert_eq!(key.x, 124);
        assert_eq!(key.y, 5);
    }

    #[test]
    fn test_label_overrides_code() {
        let attrs = Attributes::from_raw([("codes", "113"), ("keyLabel", "w")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.code, 'w' as i32);

        let attrs = Attributes::from_raw([("codes", "-5"), ("keyLabel", "DEL")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.code, 'D' as i32);
        assert_ne!(key.code, KEYCODE_DELETE);
    }

    #[test]
    fn test_shift_and_mode_change_keep_code() {
        let attrs = Attributes::from_raw([("codes", "-1"), ("keyLabel", "SHIFT")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.code, KEYCODE_SHIFT);

        let attrs = Attributes::from_raw([("codes", "mode_change"), ("keyLabel", "?123")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.code, KEYCODE_MODE_CHANGE);
    }

    #[test]
    fn test_empty_label_keeps_code() {
        let attrs = Attributes::from_raw([("codes", "-5"), ("keyLabel", "")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.code, KEYCODE_DELETE);
    }

    #[test]
    fn test_behavior_attributes() {
        let attrs = Attributes::from_raw(
            [
                ("codes", "-5"),
                ("keyIcon", "@drawable/sym_keyboard_delete"),
                ("isRepeatable", "true"),
                ("keyEdgeFlags", "right"),
                ("popupCharacters", "éè"),
                ("popupKeyboard", "@xml/kbd_popup_template"),
                ("topSmallNumber", "0"),
            ],
            1.0,
        );
        let mut icons = IconTable::new();
        icons.insert("@drawable/sym_keyboard_delete", 30, 22);

        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &icons);
        assert!(key.repeatable);
        assert_eq!(key.edge_flags, EdgeFlags::RIGHT);
        assert_eq!(key.popup_characters.as_deref(), Some("éè"));
        assert_eq!(key.popup_layout, Some(ResourceRef::new("@xml/kbd_popup_template")));
        assert_eq!(key.top_small_number, "0");
        let icon = key.icon.unwrap();
        assert_eq!(icon.bounds, Bounds { left: 0, top: 0, right: 30, bottom: 22 });
    }

    #[test]
    fn test_missing_behavior_attributes_default() {
        let key = Key::from_description(&template(), 0, 0, &Attributes::new(), 480, &NoIcons);
        assert_eq!(key.code, 0);
        assert!(!key.repeatable);
        assert!(key.popup_layout.is_none());
        assert!(key.popup_characters.is_none());
        assert_eq!(key.top_small_number, "");
        assert_eq!(key.edge_flags, EdgeFlags::empty());
    }

    #[test]
    fn test_negative_dimensions_clamped() {
        let attrs = Attributes::from_raw([("keyWidth", "-20px"), ("horizontalGap", "-3px")], 1.0);
        let key = Key::from_description(&template(), 0, 0, &attrs, 480, &NoIcons);
        assert_eq!(key.width, 0);
        assert_eq!(key.gap, 0);
    }

    #[test]
    fn test_hit_test_boundaries() {
        let key = key_at(0, 0, 50, 40, EdgeFlags::empty());
        assert!(key.is_inside(0, 0));
        assert!(key.is_inside(49, 39));
        assert!(!key.is_inside(50, 0));
        assert!(!key.is_inside(0, 40));
        assert!(!key.is_inside(-1, 0));
    }

    #[test]
    fn test_hit_test_left_edge_tolerance() {
        let key = key_at(10, 0, 50, 40, EdgeFlags::LEFT);
        assert!(key.is_inside(0, 5));
        assert!(key.is_inside(-100, 5));
        assert!(key.is_inside(59, 5));
        assert!(!key.is_inside(60, 5));
        // No vertical tolerance
        assert!(!key.is_inside(0, 40));
    }

    #[test]
    fn test_hit_test_right_edge_tolerance() {
        let key = key_at(400, 0, 80, 40, EdgeFlags::RIGHT);
        assert!(key.is_inside(480, 10));
        assert!(key.is_inside(10_000, 10));
        assert!(!key.is_inside(399, 10));
    }

    #[test]
    fn test_hit_test_near_coordinate_limit() {
        let key = key_at(i32::MAX - 10, i32::MAX - 10, 100, 100, EdgeFlags::empty());
        assert!(key.is_inside(i32::MAX, i32::MAX));
        assert!(!key.is_inside(i32::MAX - 11, i32::MAX));
        assert!(key.squared_distance_from(i32::MIN, 0) > 0);
    }

    #[test]
    fn test_sticky_release_toggles_latch() {
        let mut key = Key::new_default(&template());
        key.sticky = true;

        key.on_pressed();
        assert!(key.pressed);
        key.on_released(true);
        assert!(!key.pressed);
        assert!(key.on);

        key.on_pressed();
        key.on_released(false);
        assert!(key.on);
    }

    #[test]
    fn test_squared_distance() {
        let key = key_at(0, 0, 40, 20, EdgeFlags::empty());
        assert_eq!(key.squared_distance_from(20, 10), 0);
        assert_eq!(key.squared_distance_from(23, 14), 25);
    }
}
