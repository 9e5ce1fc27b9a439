//! Checks of live page values against a design specification.
//!
//! Each specified attribute of a component becomes one check with one of
//! three outcomes: passed, failed (the implementation is wrong) or
//! skipped (the element is not on the page yet). Missing features are
//! never reported as failures.

use crate::color::{Color, DEFAULT_TOLERANCE, PALETTE_TOLERANCE};
use crate::design_spec::{format_number, Attribute, AttributeKind, DesignSpecification, SpecValue};
use crate::driver::{ElementHandle, Locator, PageDriver};
use crate::result::{ProofError, ProofResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Pixel tolerance for dimensions
pub const DEFAULT_DIMENSION_TOLERANCE: f64 = 5.0;
/// Percentage-point tolerance for percentage dimensions
pub const DEFAULT_PERCENT_TOLERANCE: f64 = 2.0;
/// Spacing grid unit in pixels
pub const DEFAULT_GRID: u32 = 4;

/// Tolerances applied when comparing live values to the specification
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances {
    /// ± pixels for lengths
    pub dimension_px: f64,
    /// ± percentage points for percentages
    pub percent: f64,
    /// ± per channel for colors
    pub color: u8,
    /// Spacing grid unit
    pub grid: u32,
    /// Small spacing values allowed off-grid (hairlines)
    pub grid_exceptions: Vec<u32>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            dimension_px: DEFAULT_DIMENSION_TOLERANCE,
            percent: DEFAULT_PERCENT_TOLERANCE,
            color: DEFAULT_TOLERANCE,
            grid: DEFAULT_GRID,
            grid_exceptions: vec![1, 2],
        }
    }
}

impl Tolerances {
    /// Set the pixel tolerance
    #[must_use]
    pub const fn with_dimension_px(mut self, px: f64) -> Self {
        self.dimension_px = px;
        self
    }

    /// Set the color tolerance
    #[must_use]
    pub const fn with_color(mut self, tolerance: u8) -> Self {
        self.color = tolerance;
        self
    }

    /// Whether a spacing value sits on the grid or is an allowed exception
    #[must_use]
    pub fn on_grid(&self, px: f64) -> bool {
        if px <= 0.0 {
            return true;
        }
        let rounded = px.round();
        if (px - rounded).abs() > 0.01 {
            return false;
        }
        let whole = rounded as u32;
        self.grid == 0 || whole % self.grid == 0 || self.grid_exceptions.contains(&whole)
    }
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum CheckOutcome {
    /// Within tolerance
    Passed,
    /// Outside tolerance, with a message naming expected and actual
    Failed(String),
    /// Could not be evaluated, with the reason
    Skipped(String),
}

impl CheckOutcome {
    /// Whether this is a failure
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One attribute check of one component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeCheck {
    /// Component name
    pub component: String,
    /// Attribute key
    pub attribute: String,
    /// Specified value
    pub expected: String,
    /// Observed value, when one was read
    pub actual: Option<String>,
    /// Outcome
    pub outcome: CheckOutcome,
}

/// All checks for one component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    /// Component name
    pub component: String,
    /// Locator used to find the component
    pub locator: String,
    /// Checks in specification order
    pub checks: Vec<AttributeCheck>,
}

impl ComponentReport {
    /// Passed checks
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Passed))
    }

    /// Failed checks
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(CheckOutcome::is_failure)
    }

    /// Skipped checks
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Skipped(_)))
    }

    /// No failures
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Failure messages
    #[must_use]
    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter_map(|c| match &c.outcome {
                CheckOutcome::Failed(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.outcome)).count()
    }
}

impl fmt::Display for ComponentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} passed, {} failed, {} skipped",
            self.component,
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Default locator for a component: its name in kebab-case as a class
#[must_use]
pub fn default_locator(component: &str) -> Locator {
    Locator::class(component.trim().to_lowercase().replace(['_', ' '], "-"))
}

/// Evaluates specification attributes against a live page
#[derive(Debug, Clone)]
pub struct SpecAssertor<'a> {
    spec: &'a DesignSpecification,
    tolerances: Tolerances,
    selectors: HashMap<String, Locator>,
}

impl<'a> SpecAssertor<'a> {
    /// Assertor with default tolerances
    #[must_use]
    pub fn new(spec: &'a DesignSpecification) -> Self {
        Self {
            spec,
            tolerances: Tolerances::default(),
            selectors: HashMap::new(),
        }
    }

    /// Override tolerances
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Locate `component` with `locator` instead of its default class
    #[must_use]
    pub fn with_selector(mut self, component: impl Into<String>, locator: Locator) -> Self {
        self.selectors.insert(component.into(), locator);
        self
    }

    /// Tolerances in use
    #[must_use]
    pub const fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Locator for a component
    #[must_use]
    pub fn locator_for(&self, component: &str) -> Locator {
        self.selectors
            .get(component)
            .cloned()
            .unwrap_or_else(|| default_locator(component))
    }

    /// Evaluate every specified attribute of `component`
    pub fn check_component<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        component: &str,
    ) -> ProofResult<ComponentReport> {
        let spec = self
            .spec
            .component(component)
            .ok_or_else(|| ProofError::spec(format!("no specification for component {component:?}")))?;
        let locator = self.locator_for(component);
        let element = driver.find_element(&locator)?;

        let checks = spec
            .attributes
            .iter()
            .map(|(attribute, expected)| {
                let (actual, outcome) = match &element {
                    Some(el) => self.evaluate(driver, el, component, *attribute, expected),
                    None => (
                        None,
                        CheckOutcome::Skipped(format!("{locator} not found on page")),
                    ),
                };
                AttributeCheck {
                    component: component.to_string(),
                    attribute: attribute.key().to_string(),
                    expected: expected.to_string(),
                    actual,
                    outcome,
                }
            })
            .collect();

        let report = ComponentReport {
            component: component.to_string(),
            locator: locator.to_string(),
            checks,
        };
        tracing::debug!(%report, "checked component against specification");
        Ok(report)
    }

    /// Like [`Self::check_component`] but fails on any failed check
    pub fn assert_component<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        component: &str,
    ) -> ProofResult<ComponentReport> {
        let report = self.check_component(driver, component)?;
        if report.is_success() {
            Ok(report)
        } else {
            Err(ProofError::Validation {
                message: report.failures().join("; "),
            })
        }
    }

    /// Evaluate every component in the specification
    pub fn check_all<D: PageDriver + ?Sized>(&self, driver: &D) -> ProofResult<Vec<ComponentReport>> {
        self.spec
            .components()
            .iter()
            .map(|c| self.check_component(driver, &c.name))
            .collect()
    }

    fn evaluate<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        element: &ElementHandle,
        component: &str,
        attribute: Attribute,
        expected: &SpecValue,
    ) -> (Option<String>, CheckOutcome) {
        let raw = match attribute.css_property() {
            None if matches!(expected, SpecValue::Percent(_)) => {
                return (
                    None,
                    CheckOutcome::Skipped(format!(
                        "{component} {attribute}: {expected} depends on the container size"
                    )),
                )
            }
            None => {
                let px = match attribute {
                    Attribute::Height => element.rect.height,
                    _ => element.rect.width,
                };
                format_number(px)
            }
            Some(property) => match driver.css_value(element, property) {
                Ok(value) => value,
                Err(e) if e.is_skip() => return (None, CheckOutcome::Skipped(e.to_string())),
                Err(e) => {
                    return (
                        None,
                        CheckOutcome::Failed(format!("{component} {attribute}: {e}")),
                    )
                }
            },
        };

        let outcome = match attribute.kind() {
            AttributeKind::Dimension => self.check_dimension(component, attribute, expected, &raw),
            AttributeKind::Spacing => self.check_spacing(component, attribute, expected, &raw),
            AttributeKind::Color => self.check_color(component, attribute, expected, &raw),
            AttributeKind::Weight => check_weight(component, attribute, expected, &raw),
        };
        (Some(raw), outcome)
    }

    fn check_dimension(
        &self,
        component: &str,
        attribute: Attribute,
        expected: &SpecValue,
        raw: &str,
    ) -> CheckOutcome {
        let (target, tolerance, unit) = match expected {
            SpecValue::Dimension(px) => (*px, self.tolerances.dimension_px, "px"),
            SpecValue::Percent(pct) => (*pct, self.tolerances.percent, "%"),
            other => return mismatch(component, attribute, other, raw),
        };

        let Some(actual) = leading_number(raw, unit) else {
            return CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {expected} (±{}{unit}), got {raw:?}",
                format_number(tolerance)
            ));
        };

        if (actual - target).abs() <= tolerance {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {expected} (±{}{unit}), got {}",
                format_number(tolerance),
                format_number(actual)
            ))
        }
    }

    fn check_spacing(
        &self,
        component: &str,
        attribute: Attribute,
        expected: &SpecValue,
        raw: &str,
    ) -> CheckOutcome {
        let actual: Vec<f64> = raw
            .split_whitespace()
            .filter_map(|token| leading_number(token, "px"))
            .collect();
        if actual.is_empty() {
            return CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {expected}, got {raw:?}"
            ));
        }

        let off_grid: Vec<String> = actual
            .iter()
            .filter(|px| !self.tolerances.on_grid(**px))
            .map(|px| format!("{}px", format_number(*px)))
            .collect();
        if !off_grid.is_empty() {
            return CheckOutcome::Failed(format!(
                "{component} {attribute}: {} not on the {}px grid",
                off_grid.join(", "),
                self.tolerances.grid
            ));
        }

        let targets: Vec<f64> = match expected {
            SpecValue::Dimension(px) => vec![*px],
            SpecValue::Spacing(values) => values.clone(),
            other => return mismatch(component, attribute, other, raw),
        };
        let (Some(targets), Some(actual)) = (
            expand_sides(attribute, &targets),
            expand_sides(attribute, &actual),
        ) else {
            return CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {expected}, got {raw:?}"
            ));
        };
        let within = targets
            .iter()
            .zip(&actual)
            .all(|(t, a)| (t - a).abs() <= self.tolerances.dimension_px);
        if within {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {expected} (±{}px), got {raw}",
                format_number(self.tolerances.dimension_px)
            ))
        }
    }

    fn check_color(
        &self,
        component: &str,
        attribute: Attribute,
        expected: &SpecValue,
        raw: &str,
    ) -> CheckOutcome {
        let SpecValue::Color(target) = expected else {
            return mismatch(component, attribute, expected, raw);
        };
        match Color::from_css(raw) {
            Some(actual) if actual.matches(*target, self.tolerances.color) => CheckOutcome::Passed,
            Some(actual) => CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {target} (±{}), got {actual}",
                self.tolerances.color
            )),
            None => CheckOutcome::Failed(format!(
                "{component} {attribute}: expected {target}, got {raw:?}"
            )),
        }
    }
}

fn check_weight(component: &str, attribute: Attribute, expected: &SpecValue, raw: &str) -> CheckOutcome {
    let SpecValue::Number(target) = expected else {
        return mismatch(component, attribute, expected, raw);
    };
    let actual = match raw.trim() {
        "normal" => Some(400.0),
        "bold" => Some(700.0),
        other => other.parse::<f64>().ok(),
    };
    match actual {
        Some(weight) if (weight - target).abs() < f64::EPSILON => CheckOutcome::Passed,
        _ => CheckOutcome::Failed(format!(
            "{component} {attribute}: expected {expected}, got {raw:?}"
        )),
    }
}

/// Expand CSS shorthand to every side: top, right, bottom, left for
/// padding and margin, row and column for gap
fn expand_sides(attribute: Attribute, values: &[f64]) -> Option<Vec<f64>> {
    match (attribute, values) {
        (Attribute::Gap, [both]) => Some(vec![*both, *both]),
        (Attribute::Gap, [row, column]) => Some(vec![*row, *column]),
        (Attribute::Gap, _) => None,
        (_, [all]) => Some(vec![*all; 4]),
        (_, [vertical, horizontal]) => Some(vec![*vertical, *horizontal, *vertical, *horizontal]),
        (_, [top, horizontal, bottom]) => Some(vec![*top, *horizontal, *bottom, *horizontal]),
        (_, [top, right, bottom, left]) => Some(vec![*top, *right, *bottom, *left]),
        _ => None,
    }
}

fn mismatch(component: &str, attribute: Attribute, expected: &SpecValue, raw: &str) -> CheckOutcome {
    CheckOutcome::Failed(format!(
        "{component} {attribute}: cannot compare {expected} with {raw:?}"
    ))
}

/// Number at the start of `raw` with an optional `unit` suffix
fn leading_number(raw: &str, unit: &str) -> Option<f64> {
    let raw = raw.trim();
    let number = raw.strip_suffix(unit).unwrap_or(raw);
    number.trim().parse().ok()
}

/// Computed colors that match no palette entry within `tolerance`.
///
/// Black, white and grays are always allowed. Values that are not
/// `rgb()`/`rgba()` (keywords such as `currentcolor`) and transparent
/// values are not judged.
#[must_use]
pub fn check_palette(spec: &DesignSpecification, css_colors: &[String], tolerance: u8) -> Vec<String> {
    let palette = spec.palette_colors();
    css_colors
        .iter()
        .filter(|css| !crate::color::is_transparent_css(css))
        .filter(|css| match Color::from_css(css) {
            Some(color) if color.is_grayscale() => false,
            Some(color) => !palette.iter().any(|p| p.matches(color, tolerance)),
            None => false,
        })
        .cloned()
        .collect()
}

/// [`check_palette`] with the default palette tolerance
#[must_use]
pub fn check_palette_default(spec: &DesignSpecification, css_colors: &[String]) -> Vec<String> {
    check_palette(spec, css_colors, PALETTE_TOLERANCE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    const DOC: &str = r##"
post_opportunity_button:
  height: "48px"
  width: "160px"
  background: "#004AAD"
  border_radius: "6px"
  font_weight: 600
message_bubble:
  max_width: "70%"
  padding: "8px 16px"
chat_header:
  height: "64px"
palette:
  primary:
    blue: "#004AAD"
    white: "#FFFFFF"
"##;

    fn spec() -> DesignSpecification {
        DesignSpecification::from_yaml_str(DOC).unwrap()
    }

    fn button(height: f64) -> MockElement {
        MockElement::new(Locator::class("post-opportunity-button"), "button")
            .with_size(160.0, height)
            .with_css("background-color", "rgb(0, 74, 173)")
            .with_css("border-radius", "6px")
            .with_css("font-weight", "600")
    }

    #[test]
    fn test_default_locator_is_kebab_class() {
        assert_eq!(
            default_locator("post_opportunity_button"),
            Locator::class("post-opportunity-button")
        );
    }

    #[test]
    fn test_button_within_tolerance_passes() {
        let spec = spec();
        for height in [45.0, 48.0, 51.0, 53.0] {
            let driver = MockDriver::new().with_element(button(height));
            let report = SpecAssertor::new(&spec)
                .check_component(&driver, "post_opportunity_button")
                .unwrap();
            assert!(report.is_success(), "{height}: {:?}", report.failures());
            assert_eq!(report.passed(), 5);
        }
    }

    #[test]
    fn test_button_too_tall_fails_with_values() {
        let spec = spec();
        let driver = MockDriver::new().with_element(button(60.0));
        let err = SpecAssertor::new(&spec)
            .assert_component(&driver, "post_opportunity_button")
            .unwrap_err();
        let ProofError::Validation { message } = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("48px"), "{message}");
        assert!(message.contains("60"), "{message}");
    }

    #[test]
    fn test_missing_element_skips_every_attribute() {
        let spec = spec();
        let driver = MockDriver::new();
        let report = SpecAssertor::new(&spec)
            .assert_component(&driver, "post_opportunity_button")
            .unwrap();
        assert_eq!(report.skipped(), 5);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_unknown_component_is_spec_error() {
        let spec = spec();
        let err = SpecAssertor::new(&spec)
            .check_component(&MockDriver::new(), "nope")
            .unwrap_err();
        assert!(matches!(err, ProofError::Spec { .. }));
    }

    #[test]
    fn test_color_outside_tolerance() {
        let spec = spec();
        let driver = MockDriver::new().with_element(
            button(48.0).with_css("background-color", "rgb(20, 74, 173)"),
        );
        let report = SpecAssertor::new(&spec)
            .check_component(&driver, "post_opportunity_button")
            .unwrap();
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("#004AAD"));
        assert!(failures[0].contains("#144AAD"));
    }

    #[test]
    fn test_transparent_background_fails() {
        let spec = spec();
        let driver =
            MockDriver::new().with_element(button(48.0).with_css("background-color", "transparent"));
        let report = SpecAssertor::new(&spec)
            .check_component(&driver, "post_opportunity_button")
            .unwrap();
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_spacing_grid_and_percent() {
        let spec = spec();
        let bubble = |padding: &str| {
            MockDriver::new().with_element(
                MockElement::new(Locator::class("message-bubble"), "div")
                    .with_css("max-width", "70%")
                    .with_css("padding", padding),
            )
        };

        let report = SpecAssertor::new(&spec)
            .check_component(&bubble("8px 16px"), "message_bubble")
            .unwrap();
        assert!(report.is_success(), "{:?}", report.failures());

        let report = SpecAssertor::new(&spec)
            .check_component(&bubble("7px 16px"), "message_bubble")
            .unwrap();
        assert_eq!(report.failed(), 1);
        assert!(report.failures()[0].contains("grid"));
    }

    #[test]
    fn test_spacing_shorthand_covers_every_side() {
        let spec = DesignSpecification::from_yaml_str(
            "inbox:\n  padding: \"8px\"\nthread:\n  padding: \"8px 16px 4px\"\n  gap: \"8px\"\n",
        )
        .unwrap();
        let inbox = |padding: &str| {
            MockDriver::new().with_element(
                MockElement::new(Locator::class("inbox"), "div").with_css("padding", padding),
            )
        };

        let report = SpecAssertor::new(&spec)
            .check_component(&inbox("8px 24px"), "inbox")
            .unwrap();
        assert_eq!(report.failed(), 1);
        assert!(report.failures()[0].contains("8px 24px"), "{:?}", report.failures());

        let report = SpecAssertor::new(&spec)
            .check_component(&inbox("8px 8px 8px 8px"), "inbox")
            .unwrap();
        assert!(report.is_success(), "{:?}", report.failures());

        let thread = |padding: &str, gap: &str| {
            MockDriver::new().with_element(
                MockElement::new(Locator::class("thread"), "div")
                    .with_css("padding", padding)
                    .with_css("gap", gap),
            )
        };
        let report = SpecAssertor::new(&spec)
            .check_component(&thread("8px 16px 4px 16px", "8px 8px"), "thread")
            .unwrap();
        assert!(report.is_success(), "{:?}", report.failures());

        let report = SpecAssertor::new(&spec)
            .check_component(&thread("8px 16px 4px 24px", "8px 16px"), "thread")
            .unwrap();
        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn test_percent_geometry_is_skipped() {
        let spec = DesignSpecification::from_yaml_str(
            "chat_panel:\n  width: \"100%\"\n  height: \"64px\"\n",
        )
        .unwrap();
        let driver = MockDriver::new().with_element(
            MockElement::new(Locator::class("chat-panel"), "section").with_size(1280.0, 64.0),
        );
        let report = SpecAssertor::new(&spec)
            .check_component(&driver, "chat_panel")
            .unwrap();
        assert_eq!(report.failed(), 0);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.passed(), 1);
        assert!(report.checks[0].actual.is_none());
    }

    #[test]
    fn test_custom_selector() {
        let spec = spec();
        let driver = MockDriver::new().with_element(
            MockElement::new(Locator::css("header.chat"), "header").with_size(800.0, 64.0),
        );
        let report = SpecAssertor::new(&spec)
            .with_selector("chat_header", Locator::css("header.chat"))
            .check_component(&driver, "chat_header")
            .unwrap();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.locator, "css=header.chat");
    }

    #[test]
    fn test_check_all() {
        let spec = spec();
        let driver = MockDriver::new().with_element(button(48.0));
        let reports = SpecAssertor::new(&spec).check_all(&driver).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(ComponentReport::is_success));
        assert_eq!(reports[1].skipped(), 2);
    }

    #[test]
    fn test_grid() {
        let tolerances = Tolerances::default();
        for ok in [0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 24.0] {
            assert!(tolerances.on_grid(ok), "{ok}");
        }
        for bad in [3.0, 5.0, 7.0, 7.5, 10.0] {
            assert!(!tolerances.on_grid(bad), "{bad}");
        }
    }

    #[test]
    fn test_palette() {
        let spec = spec();
        let colors = vec![
            "rgb(0, 74, 173)".to_string(),
            "rgb(250, 250, 250)".to_string(),
            "rgba(0, 0, 0, 0)".to_string(),
            "rgb(255, 0, 0)".to_string(),
        ];
        assert_eq!(check_palette_default(&spec, &colors), vec!["rgb(255, 0, 0)"]);
        assert_eq!(check_palette(&spec, &colors, 0), vec!["rgb(255, 0, 0)"]);
        assert_eq!(
            check_palette(&spec, &["rgb(10, 80, 173)".to_string()], 0),
            vec!["rgb(10, 80, 173)"]
        );
    }

    #[test]
    fn test_palette_allows_grays_and_keywords() {
        let spec = spec();
        let colors: Vec<String> = ["rgb(51, 51, 51)", "rgb(0, 0, 0)", "currentcolor", "inherit"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        assert!(check_palette_default(&spec, &colors).is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(CheckOutcome::Failed("x".into())).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["detail"], "x");
    }
}
