// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Layout Description Parser
///
/// This module contains:
/// - The element event stream a description is read as (start/end per element)
/// - An XML event source using quick_xml
/// - The builder state machine that turns events into a positioned Layout
///
/// Builder states: idle → in row → in key → in row → idle. Rows whose mode tag
/// does not match the active keyboard mode are skipped without building
/// anything. A stream error stops the build and keeps what was built so far;
/// a structural error (key outside a row, nested rows) aborts it.

use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::sbga_attrs::Attributes;
use crate::sbgc_config::LayoutParams;
use crate::sbge_error::LayoutError;
use crate::sbgk_key::Key;
use crate::sbgl_layout::Layout;
use crate::sbgr_row::{row_matches_mode, row_mode, Row};
use crate::sbgt_types::{IconResolver, KEYCODE_ENTER};

/// Added to the running y for every key's top edge
pub const KEY_TOP_PADDING: i32 = 5;

// ============================================================================
// SECTION 1: Description events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Layout-wide attributes (the document root)
    Keyboard,
    Row,
    Key,
    Other(String),
}

impl ElementKind {
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"Keyboard" => ElementKind::Keyboard,
            b"Row" => ElementKind::Row,
            b"Key" => ElementKind::Key,
            other => ElementKind::Other(String::from_utf8_lossy(other).to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionEvent {
    Start { kind: ElementKind, attrs: Attributes },
    End(ElementKind),
}

impl DescriptionEvent {
    pub fn start(kind: ElementKind, attrs: Attributes) -> Self {
        DescriptionEvent::Start { kind, attrs }
    }
}

// ============================================================================
// SECTION 2: XML event source
// ============================================================================

/// Streams description events out of XML text. Self-closing elements yield a
/// start immediately followed by an end. Iteration stops after the first error.
pub struct XmlDescription<'a> {
    reader: Reader<&'a [u8]>,
    density: f64,
    pending_end: Option<ElementKind>,
    done: bool,
}

impl<'a> XmlDescription<'a> {
    pub fn new(xml: &'a str, density: f64) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        XmlDescription { reader, density, pending_end: None, done: false }
    }

    fn fail(&mut self, message: String) -> LayoutError {
        self.done = true;
        LayoutError::Xml { position: self.reader.buffer_position(), message }
    }
}

fn element_attributes(e: &BytesStart, density: f64) -> Result<Attributes, String> {
    let mut attrs = Attributes::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| format!("attribute error: {}", e))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("attribute error in {}: {}", name, e))?;
        attrs.push_raw(&name, &value, density);
    }

    Ok(attrs)
}

impl Iterator for XmlDescription<'_> {
    type Item = Result<DescriptionEvent, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(kind) = self.pending_end.take() {
            return Some(Ok(DescriptionEvent::End(kind)));
        }
        if self.done {
            return None;
        }

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let kind = ElementKind::from_name(e.local_name().as_ref());
                    return Some(match element_attributes(e, self.density) {
                        Ok(attrs) => Ok(DescriptionEvent::start(kind, attrs)),
                        Err(message) => Err(self.fail(message)),
                    });
                }
                Ok(Event::Empty(ref e)) => {
                    let kind = ElementKind::from_name(e.local_name().as_ref());
                    return Some(match element_attributes(e, self.density) {
                        Ok(attrs) => {
                            self.pending_end = Some(kind.clone());
                            Ok(DescriptionEvent::start(kind, attrs))
                        }
                        Err(message) => Err(self.fail(message)),
                    });
                }
                Ok(Event::End(ref e)) => {
                    let kind = ElementKind::from_name(e.local_name().as_ref());
                    return Some(Ok(DescriptionEvent::End(kind)));
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }
                Err(e) => return Some(Err(self.fail(e.to_string()))),
                _ => {} // declarations, comments, text
            }
        }
    }
}

// ============================================================================
// SECTION 3: Builder
// ============================================================================

/// A built layout plus the stream error that cut it short, if any
#[derive(Debug)]
pub struct PartialLayout {
    pub layout: Layout,
    pub truncation: Option<LayoutError>,
}

impl PartialLayout {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn into_layout(self) -> Layout {
        self.layout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Idle,
    InRow { row: usize },
    InKey { row: usize, key: usize },
    /// Inside a row excluded by mode; everything up to its end is ignored
    SkippingRow,
}

struct LayoutBuilder<'i> {
    layout: Layout,
    icons: &'i dyn IconResolver,
    state: BuildState,
    x: i32,
    y: i32,
    rows_seen: usize,
}

impl<'i> LayoutBuilder<'i> {
    fn new(params: &LayoutParams, icons: &'i dyn IconResolver) -> Self {
        LayoutBuilder {
            layout: Layout::new(params),
            icons,
            state: BuildState::Idle,
            x: 0,
            y: 0,
            rows_seen: 0,
        }
    }

    fn handle(&mut self, event: DescriptionEvent) -> Result<(), LayoutError> {
        match event {
            DescriptionEvent::Start { kind, attrs } => match kind {
                ElementKind::Keyboard => self.start_keyboard(&attrs),
                ElementKind::Row => self.start_row(&attrs),
                ElementKind::Key => self.start_key(&attrs),
                ElementKind::Other(name) => {
                    debug!("LAYOUT: ignoring element <{}>", name);
                    Ok(())
                }
            },
            DescriptionEvent::End(kind) => match kind {
                ElementKind::Keyboard => self.end_keyboard(),
                ElementKind::Row => self.end_row(),
                ElementKind::Key => self.end_key(),
                ElementKind::Other(_) => Ok(()),
            },
        }
    }

    fn start_keyboard(&mut self, attrs: &Attributes) -> Result<(), LayoutError> {
        if self.state != BuildState::Idle || self.rows_seen > 0 {
            return Err(structure("layout attributes must precede all rows"));
        }

        let params = self.layout.params();
        let display_width = params.display_width;
        let width = attrs.dimension_or_fraction("keyWidth", display_width, display_width / 10);
        let base_height = attrs.dimension_or_fraction("keyHeight", display_width, params.base_key_height);
        let gap = attrs.dimension_or_fraction("horizontalGap", display_width, 0);

        self.layout.set_defaults(width, base_height, gap);
        debug!("LAYOUT: defaults width={} height={} gap={}", width, self.layout.default_height(), gap);
        Ok(())
    }

    fn end_keyboard(&mut self) -> Result<(), LayoutError> {
        match self.state {
            BuildState::Idle => Ok(()),
            _ => Err(structure("layout ended inside a row")),
        }
    }

    fn start_row(&mut self, attrs: &Attributes) -> Result<(), LayoutError> {
        if self.state != BuildState::Idle {
            return Err(structure("row nested inside another row"));
        }
        self.rows_seen += 1;

        let mode = row_mode(attrs);
        let active = self.layout.params().keyboard_mode.as_deref();
        if !row_matches_mode(mode.as_deref(), active) {
            debug!("LAYOUT: skipping row {} (mode {:?}, active {:?})", self.rows_seen, mode, active);
            self.state = BuildState::SkippingRow;
            return Ok(());
        }

        self.x = 0;
        let row = Row::from_description(attrs, &self.layout.row_context());
        let row = self.layout.push_row(row);
        self.state = BuildState::InRow { row };
        Ok(())
    }

    fn end_row(&mut self) -> Result<(), LayoutError> {
        match self.state {
            BuildState::InRow { row } => {
                self.y = self.y.saturating_add(self.layout.rows()[row].default_height());
                self.state = BuildState::Idle;
                Ok(())
            }
            BuildState::SkippingRow => {
                self.state = BuildState::Idle;
                Ok(())
            }
            BuildState::InKey { .. } => Err(structure("row ended inside a key")),
            BuildState::Idle => Err(structure("row end without a row")),
        }
    }

    fn start_key(&mut self, attrs: &Attributes) -> Result<(), LayoutError> {
        let row = match self.state {
            BuildState::InRow { row } => row,
            BuildState::SkippingRow => return Ok(()),
            BuildState::InKey { .. } => return Err(structure("key nested inside another key")),
            BuildState::Idle => return Err(structure("key outside of any row")),
        };

        let template = self.layout.rows()[row].template();
        let display_width = self.layout.display_width();
        let mut key = Key::from_description(
            &template,
            self.x,
            self.y.saturating_add(KEY_TOP_PADDING),
            attrs,
            display_width,
            self.icons,
        );

        if key.code == KEYCODE_ENTER {
            let behavior = self.layout.enter_key_behavior();
            if let Some(icon) = self.icons.resolve_icon(&behavior.icon_ref()) {
                key.set_icon(icon);
            }
        }

        let key = self.layout.push_key(row, key);
        self.state = BuildState::InKey { row, key };
        Ok(())
    }

    fn end_key(&mut self) -> Result<(), LayoutError> {
        match self.state {
            BuildState::InKey { row, key } => {
                let k = &self.layout.keys()[key];
                self.x = self.x.saturating_add(k.gap).saturating_add(k.width);
                let x = self.x;
                self.layout.note_width(x);
                self.state = BuildState::InRow { row };
                Ok(())
            }
            BuildState::SkippingRow => Ok(()),
            _ => Err(structure("key end without a key")),
        }
    }

    fn finish(mut self, mut truncation: Option<LayoutError>) -> PartialLayout {
        if truncation.is_none() && self.state != BuildState::Idle {
            truncation = Some(LayoutError::UnexpectedEof("description ended inside a row".to_string()));
        }
        self.layout.set_total_height(self.y);

        match &truncation {
            Some(err) => warn!(
                "LAYOUT: truncated after {} rows / {} keys: {}",
                self.layout.rows().len(),
                self.layout.keys().len(),
                err
            ),
            None => info!(
                "LAYOUT: built {} rows / {} keys ({}x{})",
                self.layout.rows().len(),
                self.layout.keys().len(),
                self.layout.min_width(),
                self.layout.total_height()
            ),
        }

        PartialLayout { layout: self.layout, truncation }
    }
}

fn structure(message: &str) -> LayoutError {
    LayoutError::InvalidStructure(message.to_string())
}

/// Build a layout from a description event stream.
///
/// Stream errors end the build early and are reported in
/// `PartialLayout::truncation`; structural errors are returned as `Err`.
pub fn build_layout<I>(
    events: I,
    params: &LayoutParams,
    icons: &dyn IconResolver,
) -> Result<PartialLayout, LayoutError>
where
    I: IntoIterator<Item = Result<DescriptionEvent, LayoutError>>,
{
    let mut builder = LayoutBuilder::new(params, icons);
    let mut truncation = None;

    for event in events {
        match event {
            Ok(event) => builder.handle(event)?,
            Err(e) if e.is_stream_error() => {
                truncation = Some(e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(builder.finish(truncation))
}

/// Build a layout from XML description text
pub fn build_layout_from_xml(
    xml: &str,
    params: &LayoutParams,
    icons: &dyn IconResolver,
) -> Result<PartialLayout, LayoutError> {
    build_layout(XmlDescription::new(xml, params.density), params, icons)
}
