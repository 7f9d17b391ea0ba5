pub mod diagnostic;
pub mod file;
pub mod metadata;
pub mod navigation;
pub mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use file::FilePath;
pub use metadata::{RawMetadata, TocMetadata};
pub use navigation::NavigationModel;
pub use sink::ErrorSink;
