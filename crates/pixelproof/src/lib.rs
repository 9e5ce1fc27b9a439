//! Pixelproof: design compliance and visual review for web UIs.
//!
//! Pixelproof checks a running page against a YAML design specification,
//! scores screenshots against approved baselines, and manages the human
//! review cycle that promotes new screenshots to baselines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PIXELPROOF Architecture                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Design     │    │ Spec       │    │ PageDriver │            │
//! │   │ spec (YAML)│───►│ Assertor   │───►│ (chromium/ │            │
//! │   │            │    │            │    │  mock)     │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │ screenshots       │
//! │   ┌────────────┐    ┌────────────┐    ┌─────▼──────┐            │
//! │   │ Baseline   │◄───│ Review     │◄───│ Similarity │            │
//! │   │ Store      │    │ Manager    │    │ Comparator │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pixelproof::{DesignSpecification, Locator, MockDriver, MockElement, SpecAssertor};
//!
//! let spec = DesignSpecification::from_yaml_str(
//!     "post_opportunity_button:\n  height: \"48px\"\n",
//! )?;
//! let driver = MockDriver::new().with_element(
//!     MockElement::new(Locator::class("post-opportunity-button"), "button").with_size(180.0, 50.0),
//! );
//! let report = SpecAssertor::new(&spec).assert_component(&driver, "post_opportunity_button")?;
//! assert!(report.is_success());
//! # Ok::<(), pixelproof::ProofError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod archive;
pub mod assertion;
pub mod baseline;
pub mod checklist;
#[cfg(feature = "browser")]
pub mod chromium;
pub mod color;
pub mod compare;
pub mod compose;
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod design_spec;
pub mod driver;
pub mod font;
pub mod lock;
#[allow(clippy::missing_errors_doc)]
pub mod rasterize;
pub mod reporter;
mod result;
#[allow(clippy::missing_errors_doc)]
pub mod review;
#[allow(clippy::missing_errors_doc)]
pub mod runner;
pub mod wait;

pub use assertion::{
    check_palette, check_palette_default, AttributeCheck, CheckOutcome, ComponentReport,
    SpecAssertor, Tolerances,
};
pub use baseline::{normalize_component_name, BaselineStore};
pub use checklist::{CheckItem, CheckStatus, ChecklistStore, ReviewChecklist, ReviewStatus};
#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;
pub use color::Color;
pub use compare::{CompareConfig, ComparisonResult, SimilarityComparator};
pub use config::{Layout, RunConfig};
pub use design_spec::{Attribute, ComponentSpec, DesignSpecification, SpecValue};
pub use driver::{
    capture_screenshot, DriverSession, ElementHandle, Locator, MockDriver, MockElement,
    PageDriver, Rect,
};
pub use rasterize::{RasterizerChain, VectorRasterizer};
pub use reporter::{Reporter, TestResultEntry, TestStatus};
pub use result::{ProofError, ProofResult};
pub use review::{ReviewManager, ReviewPaths};
pub use runner::{RunPlan, RunSelection, RunSummary};
pub use wait::{wait_for_element, wait_until, WaitOptions};
