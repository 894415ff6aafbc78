// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Layout Configuration
/// Construction parameters and description loading
///
/// Responsibilities:
/// - Construction context for a layout (display width, multiplier, enter behavior, mode)
/// - Registry of embedded default descriptions
/// - User override path resolution (~/.config/softboard/layouts/<name>.xml)
/// - Loading a named description with fallback to the embedded default

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};

use crate::sbge_error::LayoutError;
use crate::sbgp_parse::{build_layout_from_xml, PartialLayout};
use crate::sbgt_types::{EnterKeyBehavior, IconResolver};

// ============================================================================
// SECTION 1: Construction parameters
// ============================================================================

/// Everything a layout build needs from the host besides the description
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Pixel width of the drawing surface; base for fraction dimensions
    pub display_width: i32,
    pub height_multiplier: f32,
    pub enter_key_behavior: EnterKeyBehavior,
    /// Active keyboard mode; rows tagged with another mode are skipped
    pub keyboard_mode: Option<String>,
    /// Density-derived key height metric, in pixels
    pub base_key_height: i32,
    /// Pixels per dp
    pub density: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            display_width: 480,
            height_multiplier: 1.0,
            enter_key_behavior: EnterKeyBehavior::Generic,
            keyboard_mode: None,
            base_key_height: 50,
            density: 1.0,
        }
    }
}

impl LayoutParams {
    pub fn new(display_width: i32) -> Self {
        LayoutParams { display_width, ..Self::default() }
    }

    pub fn with_height_multiplier(mut self, multiplier: f32) -> Self {
        self.height_multiplier = multiplier;
        self
    }

    pub fn with_enter_key_behavior(mut self, behavior: EnterKeyBehavior) -> Self {
        self.enter_key_behavior = behavior;
        self
    }

    pub fn with_keyboard_mode(mut self, mode: impl Into<String>) -> Self {
        self.keyboard_mode = Some(mode.into());
        self
    }

    pub fn with_base_key_height(mut self, px: i32) -> Self {
        self.base_key_height = px;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }
}

// ============================================================================
// SECTION 2: Embedded descriptions
// ============================================================================

const QWERTY_XML: &str = include_str!("../layouts/qwerty.default.xml");
const SYMBOLS_XML: &str = include_str!("../layouts/symbols.default.xml");

lazy_static! {
    static ref EMBEDDED_LAYOUTS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("qwerty", QWERTY_XML);
        map.insert("symbols", SYMBOLS_XML);
        map
    };
}

/// Embedded description by name
pub fn embedded_layout(name: &str) -> Option<&'static str> {
    EMBEDDED_LAYOUTS.get(name).copied()
}

/// Names of all embedded descriptions, sorted
pub fn embedded_layout_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = EMBEDDED_LAYOUTS.keys().copied().collect();
    names.sort_unstable();
    names
}

// ============================================================================
// SECTION 3: Path resolution and loading
// ============================================================================

/// Directory holding user override descriptions
pub fn user_layouts_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("softboard");
    path.push("layouts");
    path
}

/// Resolve the user override path for a named description
pub fn user_layout_path(name: &str) -> PathBuf {
    layout_path_in(&user_layouts_dir(), name)
}

fn layout_path_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.xml", name))
}

/// Description text for `name`: the user file when readable, else the embedded default
pub fn load_description(name: &str) -> Result<String, LayoutError> {
    load_description_in(&user_layouts_dir(), name)
}

/// Same as `load_description`, with overrides looked up in `dir`
pub fn load_description_in(dir: &Path, name: &str) -> Result<String, LayoutError> {
    let path = layout_path_in(dir, name);

    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(xml) => {
                info!("CONFIG: using user layout {}", path.display());
                return Ok(xml);
            }
            Err(source) => {
                let err = LayoutError::Io { path, source };
                match embedded_layout(name) {
                    Some(_) => warn!("CONFIG: {}, reverting to embedded default", err),
                    None => return Err(err),
                }
            }
        }
    }

    embedded_layout(name)
        .map(str::to_string)
        .ok_or_else(|| LayoutError::UnknownLayout(name.to_string()))
}

/// Load and build a named layout
pub fn load_named_layout(
    name: &str,
    params: &LayoutParams,
    icons: &dyn IconResolver,
) -> Result<PartialLayout, LayoutError> {
    load_named_layout_in(&user_layouts_dir(), name, params, icons)
}

/// Load and build a named layout, with overrides looked up in `dir`
pub fn load_named_layout_in(
    dir: &Path,
    name: &str,
    params: &LayoutParams,
    icons: &dyn IconResolver,
) -> Result<PartialLayout, LayoutError> {
    let xml = load_description_in(dir, name)?;
    build_layout_from_xml(&xml, params, icons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbgt_types::NoIcons;

    #[test]
    fn test_params_builder() {
        let params = LayoutParams::new(720)
            .with_height_multiplier(1.5)
            .with_enter_key_behavior(EnterKeyBehavior::Send)
            .with_keyboard_mode("email");

        assert_eq!(params.display_width, 720);
        assert_eq!(params.height_multiplier, 1.5);
        assert_eq!(params.enter_key_behavior, EnterKeyBehavior::Send);
        assert_eq!(params.keyboard_mode.as_deref(), Some("email"));
        assert_eq!(params.base_key_height, 50);
    }

    #[test]
    fn test_embedded_registry() {
        assert_eq!(embedded_layout_names(), vec!["qwerty", "symbols"]);
        assert!(embedded_layout("qwerty").is_some());
        assert!(embedded_layout("dvorak").is_none());
    }

    #[test]
    fn test_user_path_shape() {
        let path = user_layout_path("qwerty");
        assert!(path.ends_with(".config/softboard/layouts/qwerty.xml"));
    }

    #[test]
    fn test_embedded_layouts_build_cleanly() {
        for name in embedded_layout_names() {
            let xml = embedded_layout(name).unwrap();
            let built = build_layout_from_xml(xml, &LayoutParams::default(), &NoIcons).unwrap();
            assert!(!built.is_truncated(), "{} truncated", name);
            assert!(!built.layout.keys().is_empty());
        }
    }

    const ONE_KEY: &str = r#"<Keyboard><Row><Key keyLabel="z" keyWidth="50%p"/></Row></Keyboard>"#;

    #[test]
    fn test_user_file_overrides_embedded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("qwerty.xml"), ONE_KEY).unwrap();

        let built = load_named_layout_in(dir.path(), "qwerty", &LayoutParams::new(480), &NoIcons).unwrap();
        let keys = built.layout.keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].code, 'z' as i32);
        assert_eq!(keys[0].width, 240);
    }

    #[test]
    fn test_user_file_for_new_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.xml"), ONE_KEY).unwrap();

        let xml = load_description_in(dir.path(), "tiny").unwrap();
        assert_eq!(xml, ONE_KEY);
    }

    #[test]
    fn test_missing_user_file_uses_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let xml = load_description_in(dir.path(), "symbols").unwrap();
        assert_eq!(Some(xml.as_str()), embedded_layout("symbols"));
    }

    #[test]
    fn test_unreadable_user_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text
        fs::create_dir(dir.path().join("qwerty.xml")).unwrap();

        let built = load_named_layout_in(dir.path(), "qwerty", &LayoutParams::new(480), &NoIcons).unwrap();
        assert_eq!(built.layout.rows().len(), 4);
    }

    #[test]
    fn test_unreadable_user_file_without_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("tiny.xml")).unwrap();

        let err = load_description_in(dir.path(), "tiny").unwrap_err();
        match err {
            LayoutError::Io { path, .. } => assert!(path.ends_with("tiny.xml")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_layout() {
        let err = load_named_layout("no-such-layout-xyz", &LayoutParams::default(), &NoIcons).unwrap_err();
        assert!(matches!(err, LayoutError::UnknownLayout(_)));
    }
}
