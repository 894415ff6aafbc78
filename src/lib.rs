// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

//! Soft-keyboard layout engine.
//!
//! Parses a declarative keyboard description into rows and keys with
//! absolute pixel geometry for a given surface width, and answers which key
//! lies under a point.
//!
//! ```
//! use softboard_layout::{build_layout_from_xml, LayoutParams, NoIcons};
//!
//! let xml = r#"<Keyboard keyWidth="50%p"><Row><Key keyLabel="a"/><Key keyLabel="b"/></Row></Keyboard>"#;
//! let built = build_layout_from_xml(xml, &LayoutParams::new(200), &NoIcons).unwrap();
//! assert_eq!(built.layout.hit_test(150, 20).map(|k| k.code), Some('b' as i32));
//! ```

// Generic modules
mod sbgt_types;
mod sbga_attrs;
mod sbge_error;
mod sbgr_row;
mod sbgk_key;
mod sbgl_layout;
mod sbgg_grid;
mod sbgp_parse;
mod sbgc_config;

pub use sbga_attrs::{
    classify, resolve_dimension_or_fraction, AttrValue, Attribute, Attributes, MAX_DIMENSION,
};
pub use sbgc_config::{
    embedded_layout, embedded_layout_names, load_description, load_description_in, load_named_layout,
    load_named_layout_in, user_layout_path, user_layouts_dir, LayoutParams,
};
pub use sbge_error::LayoutError;
pub use sbgg_grid::MAX_KEYS_PER_MINI_ROW;
pub use sbgk_key::Key;
pub use sbgl_layout::Layout;
pub use sbgp_parse::{
    build_layout, build_layout_from_xml, DescriptionEvent, ElementKind, PartialLayout, XmlDescription,
    KEY_TOP_PADDING,
};
pub use sbgr_row::{Row, RowTemplate, ROW_PADDING};
pub use sbgt_types::{
    code_for_name, Bounds, EdgeFlags, EnterKeyBehavior, Icon, IconResolver, IconTable, NoIcons,
    ResourceRef, ShiftState, KEYCODE_ALT, KEYCODE_CANCEL, KEYCODE_DELETE, KEYCODE_EMOJI,
    KEYCODE_ENTER, KEYCODE_MODE_CHANGE, KEYCODE_SHIFT,
};
