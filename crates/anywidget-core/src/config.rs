//! Widget configuration records.
//!
//! One [`WidgetConfig`] per widget, persisted as an element of the JSON array
//! held by a [`ConfigStore`](crate::storage::ConfigStore). A missing field is
//! never an error: every field has a documented default, applied when the
//! record is decoded.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Smallest width/height a widget may take, in pixels.
pub const MIN_WIDGET_SIZE: f64 = 50.0;

pub const DEFAULT_NAME: &str = "Untitled";
pub const DEFAULT_POSITION: i64 = 100;
pub const DEFAULT_SIZE: i64 = 200;
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgba(0,0,0,0.5)";
pub const DEFAULT_BORDER_COLOR: &str = "rgba(255,255,255,0.2)";
pub const DEFAULT_SHADOW_COLOR: &str = "rgba(0,0,0,0.5)";
pub const DEFAULT_CORNER_RADIUS: u32 = 12;
pub const DEFAULT_BLUR_RADIUS: u32 = 30;
pub const DEFAULT_TRANSPARENCY: u8 = 100;

/// Where a widget's content comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// `loader_source` is the content source itself.
    #[default]
    Code,
    /// `loader_source` is a path, read at reload time.
    File,
}

impl LoaderKind {
    fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("file") => Self::File,
            _ => Self::Code,
        }
    }
}

/// Content descriptor: the part of a config that decides what is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDescriptor {
    pub kind: LoaderKind,
    pub source: String,
}

/// A single persisted widget record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct WidgetConfig {
    pub id: String,
    pub name: String,
    pub enabled: bool,

    // Geometry
    #[serde(rename = "widget_position_x")]
    pub x: i64,
    #[serde(rename = "widget_position_y")]
    pub y: i64,
    pub width: i64,
    pub height: i64,

    // Style
    pub background_color: String,
    pub corner_radius: u32,
    pub border_width: u32,
    pub border_color: String,
    pub shadow_blur: u32,
    pub shadow_color: String,
    pub background_blur: bool,
    pub blur_radius: u32,
    /// Opacity percentage, 0..=100.
    pub transparency: u8,

    // Behavior
    pub always_on_top: bool,
    pub click_through: bool,
    pub hover_scale: bool,

    // Content
    pub loader_type: LoaderKind,
    pub loader_source: String,

    /// Fields this crate does not know about, kept so rewrites never drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WidgetConfig {
    /// A record with every field at its default.
    pub fn new(id: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(id.into()));
        map.into()
    }

    /// A record with a freshly generated id.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Size clamped to [`MIN_WIDGET_SIZE`] in both axes.
    pub fn size(&self) -> Size {
        Size::new(
            (self.width as f64).max(MIN_WIDGET_SIZE),
            (self.height as f64).max(MIN_WIDGET_SIZE),
        )
    }

    /// Clamped geometry as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    /// Overwrite only the geometry fields, rounding to whole pixels.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.x = rect.x0.round() as i64;
        self.y = rect.y0.round() as i64;
        self.width = rect.width().round() as i64;
        self.height = rect.height().round() as i64;
    }

    pub fn content_descriptor(&self) -> ContentDescriptor {
        ContentDescriptor {
            kind: self.loader_type,
            source: self.loader_source.clone(),
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn take_number(map: &mut Map<String, Value>, key: &str) -> Option<f64> {
    map.remove(key)?.as_f64().filter(|v| v.is_finite())
}

fn take_bool(map: &mut Map<String, Value>, key: &str) -> Option<bool> {
    map.remove(key)?.as_bool()
}

fn to_int(value: Option<f64>, default: i64) -> i64 {
    value.map_or(default, |v| v.round() as i64)
}

fn to_unsigned(value: Option<f64>, default: u32) -> u32 {
    value.map_or(default, |v| v.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// Fields are read one at a time: a missing or wrong-typed field takes its
/// default, the rest of the record is kept. Unknown keys land in `extra`.
impl From<Map<String, Value>> for WidgetConfig {
    fn from(mut map: Map<String, Value>) -> Self {
        // Legacy records carry `x`/`y`; the current keys win when both exist.
        let legacy_x = take_number(&mut map, "x");
        let legacy_y = take_number(&mut map, "y");
        let x = take_number(&mut map, "widget_position_x").or(legacy_x);
        let y = take_number(&mut map, "widget_position_y").or(legacy_y);

        let transparency = take_number(&mut map, "transparency")
            .map_or(DEFAULT_TRANSPARENCY, |v| v.round().clamp(0.0, 100.0) as u8);

        Self {
            id: take_string(&mut map, "id").unwrap_or_default(),
            name: take_string(&mut map, "name").unwrap_or_else(|| DEFAULT_NAME.to_string()),
            enabled: take_bool(&mut map, "enabled").unwrap_or(true),
            x: to_int(x, DEFAULT_POSITION),
            y: to_int(y, DEFAULT_POSITION),
            width: to_int(take_number(&mut map, "width"), DEFAULT_SIZE),
            height: to_int(take_number(&mut map, "height"), DEFAULT_SIZE),
            background_color: take_string(&mut map, "background_color")
                .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
            corner_radius: to_unsigned(take_number(&mut map, "corner_radius"), DEFAULT_CORNER_RADIUS),
            border_width: to_unsigned(take_number(&mut map, "border_width"), 0),
            border_color: take_string(&mut map, "border_color")
                .unwrap_or_else(|| DEFAULT_BORDER_COLOR.to_string()),
            shadow_blur: to_unsigned(take_number(&mut map, "shadow_blur"), 0),
            shadow_color: take_string(&mut map, "shadow_color")
                .unwrap_or_else(|| DEFAULT_SHADOW_COLOR.to_string()),
            background_blur: take_bool(&mut map, "background_blur").unwrap_or(false),
            blur_radius: to_unsigned(take_number(&mut map, "blur_radius"), DEFAULT_BLUR_RADIUS),
            transparency,
            always_on_top: take_bool(&mut map, "always_on_top").unwrap_or(false),
            click_through: take_bool(&mut map, "click_through").unwrap_or(false),
            hover_scale: take_bool(&mut map, "hover_scale").unwrap_or(false),
            loader_type: LoaderKind::from_wire(take_string(&mut map, "loader_type").as_deref()),
            loader_source: take_string(&mut map, "loader_source").unwrap_or_default(),
            extra: map,
        }
    }
}

/// Decode a store blob. A blob that is not a JSON array yields `Err`; callers
/// decide whether to fail soft. Elements that are not objects are skipped.
pub fn decode_list(blob: &str) -> Result<Vec<WidgetConfig>, serde_json::Error> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    let values: Vec<Value> = serde_json::from_str(blob)?;
    let list = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match value {
            Value::Object(map) => Some(WidgetConfig::from(map)),
            other => {
                log::warn!("Skipping widget record {}: expected an object, got {}", index, other);
                None
            }
        })
        .collect();
    Ok(list)
}

/// Encode a list into the store blob.
pub fn encode_list(list: &[WidgetConfig]) -> Result<String, serde_json::Error> {
    serde_json::to_string(list)
}
