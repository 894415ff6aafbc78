// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Keyboard Model Shared Types
///
/// Reserved key codes, edge flags, shift state, enter-key behavior and the
/// icon seam shared by the key, row and layout modules.

use std::collections::HashMap;

// ============================================================================
// Reserved key codes
// ============================================================================

pub const KEYCODE_SHIFT: i32 = -1;
pub const KEYCODE_MODE_CHANGE: i32 = -2;
pub const KEYCODE_CANCEL: i32 = -3;
pub const KEYCODE_ENTER: i32 = -4;
pub const KEYCODE_DELETE: i32 = -5;
pub const KEYCODE_ALT: i32 = -6;
pub const KEYCODE_EMOJI: i32 = -7;

/// Map a symbolic code name used in descriptions to its reserved code
pub fn code_for_name(name: &str) -> Option<i32> {
    match name.trim().to_ascii_lowercase().as_str() {
        "shift" => Some(KEYCODE_SHIFT),
        "mode_change" => Some(KEYCODE_MODE_CHANGE),
        "cancel" => Some(KEYCODE_CANCEL),
        "enter" => Some(KEYCODE_ENTER),
        "delete" => Some(KEYCODE_DELETE),
        "alt" => Some(KEYCODE_ALT),
        "emoji" => Some(KEYCODE_EMOJI),
        _ => None,
    }
}

// ============================================================================
// Edge flags
// ============================================================================

bitflags::bitflags! {
    /// Layout edges a key is anchored to for hit-testing tolerance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EdgeFlags: u32 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        EdgeFlags::empty()
    }
}

impl EdgeFlags {
    /// Parse "left", "right" or "left|right"; unknown names are ignored
    pub fn parse(s: &str) -> Self {
        s.split('|').fold(EdgeFlags::empty(), |flags, part| {
            match part.trim().to_ascii_lowercase().as_str() {
                "left" => flags | EdgeFlags::LEFT,
                "right" => flags | EdgeFlags::RIGHT,
                _ => flags,
            }
        })
    }
}

// ============================================================================
// Shift state and enter-key behavior
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    #[default]
    Off,
    OneChar,
    Permanent,
}

/// Which affordance the Enter key shows, chosen by the caller's editor context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterKeyBehavior {
    #[default]
    Generic,
    Search,
    NextOrGo,
    Send,
}

impl EnterKeyBehavior {
    pub fn icon_ref(&self) -> ResourceRef {
        let name = match self {
            EnterKeyBehavior::Generic => "@drawable/sym_keyboard_return",
            EnterKeyBehavior::Search => "@drawable/sym_keyboard_search",
            EnterKeyBehavior::NextOrGo => "@drawable/sym_keyboard_next",
            EnterKeyBehavior::Send => "@drawable/sym_keyboard_send",
        };
        ResourceRef::new(name)
    }
}

// ============================================================================
// Resource references and icons
// ============================================================================

/// Opaque resource reference as written in a description, e.g. "@drawable/sym_keyboard_shift"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceRef(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// "none" and "@null" both mean "no resource"
    pub fn is_none(&self) -> bool {
        self.0 == "none" || self.0 == "@null" || self.0.is_empty()
    }
}

/// Paint bounds in icon-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Drawable handle returned by the host's icon resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub resource: ResourceRef,
    pub intrinsic_width: i32,
    pub intrinsic_height: i32,
    pub bounds: Bounds,
}

impl Icon {
    pub fn new(resource: ResourceRef, intrinsic_width: i32, intrinsic_height: i32) -> Self {
        Icon { resource, intrinsic_width, intrinsic_height, bounds: Bounds::default() }
    }

    /// Set paint bounds to the natural size at origin
    pub(crate) fn with_natural_bounds(mut self) -> Self {
        self.bounds = Bounds {
            left: 0,
            top: 0,
            right: self.intrinsic_width,
            bottom: self.intrinsic_height,
        };
        self
    }
}

/// Icon asset lookup supplied by the host toolkit
pub trait IconResolver {
    fn resolve_icon(&self, resource: &ResourceRef) -> Option<Icon>;
}

/// Resolver for hosts without icon assets
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconResolver for NoIcons {
    fn resolve_icon(&self, _resource: &ResourceRef) -> Option<Icon> {
        None
    }
}

/// In-memory resolver: resource name → intrinsic (width, height)
#[derive(Debug, Clone, Default)]
pub struct IconTable {
    sizes: HashMap<String, (i32, i32)>,
}

impl IconTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, width: i32, height: i32) -> &mut Self {
        self.sizes.insert(name.into(), (width, height));
        self
    }
}

impl IconResolver for IconTable {
    fn resolve_icon(&self, resource: &ResourceRef) -> Option<Icon> {
        let &(w, h) = self.sizes.get(resource.as_str())?;
        Some(Icon::new(resource.clone(), w, h))
    }
}
