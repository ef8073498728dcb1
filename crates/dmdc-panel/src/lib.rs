//! dmdc-panel: in-memory observation table for per-entity estimation.
//!
//! Provides:
//! - Named, equal-length columns (Panel, Column)
//! - Incremental panel builder with validation
//! - First-appearance entity indexing over an id column
//!
//! # Example
//!
//! ```
//! use dmdc_panel::{EntityIndex, PanelBuilder};
//!
//! let panel = PanelBuilder::new()
//!     .column("entity", vec!["a", "b", "a"])
//!     .column("x", vec![1.0, 2.0, 3.0])
//!     .build()
//!     .unwrap();
//!
//! let index = EntityIndex::from_panel(&panel, "entity").unwrap();
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.rows(&"a".into()), Some(&[0, 2][..]));
//! ```

pub mod builder;
pub mod column;
pub mod error;
pub mod index;
pub mod panel;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::PanelBuilder;
pub use column::Column;
pub use error::{PanelError, PanelResult};
pub use index::EntityIndex;
pub use panel::Panel;
