//! Design specification documents.
//!
//! A specification is a YAML mapping of component name to attribute
//! values, plus an optional reserved `palette` key:
//!
//! ```yaml
//! post_opportunity_button:
//!   height: "48px"
//!   background: "#004AAD"
//!   border_radius: "6px"
//! message_bubble:
//!   max_width: "70%"
//! palette:
//!   primary:
//!     blue: "#004AAD"
//! ```
//!
//! Attribute names and value kinds are checked when the document loads,
//! so a typo fails fast instead of silently skipping a check.

use crate::color::Color;
use crate::result::{ProofError, ProofResult};
use serde_yaml_ng::Value;
use std::fmt;
use std::path::Path;

/// Reserved top-level key holding the color palette
pub const PALETTE_KEY: &str = "palette";

/// What kind of value an attribute takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A length (`48px`) or percentage (`70%`)
    Dimension,
    /// One or more pixel lengths on the spacing grid (`8px 16px`)
    Spacing,
    /// A `#RRGGBB` color
    Color,
    /// A numeric font weight
    Weight,
}

/// A design attribute a component may specify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Rendered width
    Width,
    /// Rendered height
    Height,
    /// `min-height`
    MinHeight,
    /// `max-width`
    MaxWidth,
    /// `border-radius`
    BorderRadius,
    /// `border-width`
    BorderWidth,
    /// `padding`
    Padding,
    /// `margin`
    Margin,
    /// `gap`
    Gap,
    /// Rendered width and height of a square element such as an avatar
    Size,
    /// `font-size`
    FontSize,
    /// `font-weight`
    FontWeight,
    /// `background-color`
    Background,
    /// Text `color`
    TextColor,
    /// Foreground `color`
    Color,
    /// `border-color`
    BorderColor,
}

impl Attribute {
    /// Every attribute
    pub const ALL: [Self; 16] = [
        Self::Width,
        Self::Height,
        Self::MinHeight,
        Self::MaxWidth,
        Self::BorderRadius,
        Self::BorderWidth,
        Self::Padding,
        Self::Margin,
        Self::Gap,
        Self::Size,
        Self::FontSize,
        Self::FontWeight,
        Self::Background,
        Self::TextColor,
        Self::Color,
        Self::BorderColor,
    ];

    /// Key used in specification documents
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::MinHeight => "min_height",
            Self::MaxWidth => "max_width",
            Self::BorderRadius => "border_radius",
            Self::BorderWidth => "border_width",
            Self::Padding => "padding",
            Self::Margin => "margin",
            Self::Gap => "gap",
            Self::Size => "size",
            Self::FontSize => "font_size",
            Self::FontWeight => "font_weight",
            Self::Background => "background",
            Self::TextColor => "text_color",
            Self::Color => "color",
            Self::BorderColor => "border_color",
        }
    }

    /// Parse a document key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.key() == key)
    }

    /// Value kind the attribute accepts
    #[must_use]
    pub const fn kind(self) -> AttributeKind {
        match self {
            Self::Width
            | Self::Height
            | Self::MinHeight
            | Self::MaxWidth
            | Self::BorderRadius
            | Self::BorderWidth
            | Self::Size
            | Self::FontSize => AttributeKind::Dimension,
            Self::Padding | Self::Margin | Self::Gap => AttributeKind::Spacing,
            Self::Background | Self::TextColor | Self::Color | Self::BorderColor => {
                AttributeKind::Color
            }
            Self::FontWeight => AttributeKind::Weight,
        }
    }

    /// Computed-style property to read, or `None` for geometry measured
    /// from the element's bounding box
    #[must_use]
    pub const fn css_property(self) -> Option<&'static str> {
        match self {
            Self::Width | Self::Height | Self::Size => None,
            Self::MinHeight => Some("min-height"),
            Self::MaxWidth => Some("max-width"),
            Self::BorderRadius => Some("border-radius"),
            Self::BorderWidth => Some("border-width"),
            Self::Padding => Some("padding"),
            Self::Margin => Some("margin"),
            Self::Gap => Some("gap"),
            Self::FontSize => Some("font-size"),
            Self::FontWeight => Some("font-weight"),
            Self::Background => Some("background-color"),
            Self::TextColor | Self::Color => Some("color"),
            Self::BorderColor => Some("border-color"),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A typed specification value
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    /// Pixel length
    Dimension(f64),
    /// Percentage
    Percent(f64),
    /// Several pixel lengths, as in `padding: 8px 16px`
    Spacing(Vec<f64>),
    /// Color
    Color(Color),
    /// Unitless number such as a font weight
    Number(f64),
}

impl SpecValue {
    /// Parse a raw string for an attribute of the given kind
    pub fn parse(raw: &str, kind: AttributeKind) -> ProofResult<Self> {
        let raw = raw.trim();
        match kind {
            AttributeKind::Color => Color::from_hex(raw).map(Self::Color),
            AttributeKind::Dimension => {
                if let Some(percent) = raw.strip_suffix('%') {
                    parse_number(percent, raw).map(Self::Percent)
                } else {
                    parse_px(raw).map(Self::Dimension)
                }
            }
            AttributeKind::Spacing => {
                let values = raw
                    .split_whitespace()
                    .map(parse_px)
                    .collect::<ProofResult<Vec<_>>>()?;
                match values.as_slice() {
                    [] => Err(ProofError::spec("empty spacing value")),
                    [single] => Ok(Self::Dimension(*single)),
                    _ => Ok(Self::Spacing(values)),
                }
            }
            AttributeKind::Weight => parse_number(raw, raw).map(Self::Number),
        }
    }
}

fn parse_px(raw: &str) -> ProofResult<f64> {
    let number = raw
        .strip_suffix("px")
        .ok_or_else(|| ProofError::spec(format!("{raw:?} must be a pixel length like \"48px\"")))?;
    parse_number(number, raw)
}

fn parse_number(number: &str, raw: &str) -> ProofResult<f64> {
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ProofError::spec(format!("{raw:?} is not a number")))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ProofError::spec(format!("{raw:?} must be a non-negative number")))
    }
}

/// Format a pixel value without a trailing `.0`
#[must_use]
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension(px) => write!(f, "{}px", format_number(*px)),
            Self::Percent(pct) => write!(f, "{}%", format_number(*pct)),
            Self::Spacing(values) => {
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| format!("{}px", format_number(*v)))
                    .collect();
                f.write_str(&parts.join(" "))
            }
            Self::Color(color) => write!(f, "{color}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

/// Attributes specified for one component
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    /// Component name as written in the document
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(Attribute, SpecValue)>,
}

impl ComponentSpec {
    /// Value of one attribute
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<&SpecValue> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == attribute)
            .map(|(_, value)| value)
    }
}

/// One palette color with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Category, e.g. `primary`
    pub category: String,
    /// Name within the category
    pub name: String,
    /// Color
    pub color: Color,
}

/// Parsed specification document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignSpecification {
    components: Vec<ComponentSpec>,
    palette: Vec<PaletteEntry>,
}

impl DesignSpecification {
    /// Load and validate a YAML document from disk
    pub fn load(path: &Path) -> ProofResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let spec = Self::from_yaml_str(&text)
            .map_err(|e| ProofError::spec(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            components = spec.components.len(),
            palette = spec.palette.len(),
            "loaded design specification"
        );
        Ok(spec)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(text: &str) -> ProofResult<Self> {
        let root: Value = serde_yaml_ng::from_str(text)?;
        let mapping = match root {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(Self::default()),
            _ => return Err(ProofError::spec("document must be a mapping of components")),
        };

        let mut spec = Self::default();
        for (key, value) in &mapping {
            let name = key
                .as_str()
                .ok_or_else(|| ProofError::spec("component names must be strings"))?;
            if name == PALETTE_KEY {
                spec.palette = parse_palette(value)?;
            } else {
                spec.components.push(parse_component(name, value)?);
            }
        }
        Ok(spec)
    }

    /// Components in document order
    #[must_use]
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    /// Look up a component
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Palette entries in document order
    #[must_use]
    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    /// Palette colors only
    #[must_use]
    pub fn palette_colors(&self) -> Vec<Color> {
        self.palette.iter().map(|entry| entry.color).collect()
    }

    /// `(attribute, value)` pairs for a component, for review checklists
    #[must_use]
    pub fn check_entries(&self, component: &str) -> Vec<(String, String)> {
        self.component(component)
            .map(|spec| {
                spec.attributes
                    .iter()
                    .map(|(attr, value)| (attr.key().to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_component(name: &str, value: &Value) -> ProofResult<ComponentSpec> {
    let Value::Mapping(attrs) = value else {
        return Err(ProofError::spec(format!(
            "component {name:?} must map attribute names to values"
        )));
    };

    let mut attributes = Vec::with_capacity(attrs.len());
    for (key, raw) in attrs {
        let key = key
            .as_str()
            .ok_or_else(|| ProofError::spec(format!("{name}: attribute names must be strings")))?;
        let attribute = Attribute::from_key(key)
            .ok_or_else(|| ProofError::spec(format!("{name}: unknown attribute {key:?}")))?;
        let text = scalar_text(raw)
            .ok_or_else(|| ProofError::spec(format!("{name}.{key}: value must be a scalar")))?;
        let parsed = SpecValue::parse(&text, attribute.kind())
            .map_err(|e| ProofError::spec(format!("{name}.{key}: {e}")))?;
        attributes.push((attribute, parsed));
    }

    Ok(ComponentSpec {
        name: name.to_string(),
        attributes,
    })
}

fn parse_palette(value: &Value) -> ProofResult<Vec<PaletteEntry>> {
    let Value::Mapping(categories) = value else {
        return Err(ProofError::spec("palette must map categories to colors"));
    };

    let mut entries = Vec::new();
    for (category, colors) in categories {
        let category = category
            .as_str()
            .ok_or_else(|| ProofError::spec("palette categories must be strings"))?;
        match colors {
            Value::Mapping(named) => {
                for (name, hex) in named {
                    let name = name.as_str().ok_or_else(|| {
                        ProofError::spec(format!("palette.{category}: names must be strings"))
                    })?;
                    let hex = hex.as_str().ok_or_else(|| {
                        ProofError::spec(format!("palette.{category}.{name}: expected a color"))
                    })?;
                    entries.push(PaletteEntry {
                        category: category.to_string(),
                        name: name.to_string(),
                        color: Color::from_hex(hex)?,
                    });
                }
            }
            Value::String(hex) => entries.push(PaletteEntry {
                category: category.to_string(),
                name: category.to_string(),
                color: Color::from_hex(hex)?,
            }),
            _ => {
                return Err(ProofError::spec(format!(
                    "palette.{category}: expected a color or a map of colors"
                )))
            }
        }
    }
    Ok(entries)
}
