pub mod annotator;
pub mod error;
pub mod frame;
pub mod indent;
pub mod pipeline;
pub mod sequence;
pub mod settings;

pub use annotator::{AnnotatedIndent, Annotations, Page, annotate, annotate_page};
pub use error::{Fault, FaultKind, Status};
pub use indent::{IndentMap, IndentRecord};
pub use pipeline::{AnnotationSink, Report, check_scope, run};
pub use sequence::{Validation, validate};
pub use settings::{Settings, WrapperPair};
