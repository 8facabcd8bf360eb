//! Report rendering and artifact export.

pub mod artifacts;
pub mod context;
pub mod html;
pub mod index;

pub use artifacts::{ArtifactManager, ArtifactPaths};
pub use context::{ChartLinks, ReportContext};
pub use html::HtmlReportGenerator;
pub use index::{IndexEntry, IndexPage};
