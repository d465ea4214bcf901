use log::debug;
use wrapper_tags::block::{Block, has_visible_groups};
use wrapper_tags::source::{ParentScope, SequenceSource};

use crate::annotator::{Annotations, Page, annotate_page};
use crate::error::Status;
use crate::sequence::{Validation, validate};
use crate::settings::Settings;

/// Receives the outcome of a check, typically the host's list view.
pub trait AnnotationSink {
    /// Called once with the status to display, or `None` when nothing is shown.
    fn status(&mut self, status: Option<&Status>);

    fn annotations(&mut self, annotations: &Annotations);
}

/// Everything one check produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The status to show to the editor. `None` when hidden by the settings
    /// or when the scope has no published tag groups.
    pub displayed: Option<Status>,
    pub validation: Validation,
    pub annotations: Annotations,
}

/// Validate and annotate an already ordered sequence.
pub fn run(blocks: &[Block], settings: &Settings, page: Option<Page>) -> Report {
    let validation = validate(blocks);
    let annotations = annotate_page(&validation.indents, settings.colorize, page);

    let displayed = if settings.hide_validation_status {
        debug!("validation status hidden by settings");
        None
    } else if !has_visible_groups(blocks) {
        debug!("no published tag groups, nothing to report");
        None
    } else {
        Some(validation.status.clone())
    };

    Report {
        displayed,
        validation,
        annotations,
    }
}

/// Fetch a scope from `source`, run the check and hand the result to `sink`.
pub fn check_scope<S: SequenceSource>(
    source: &S,
    scope: &ParentScope,
    settings: &Settings,
    page: Option<Page>,
    sink: &mut impl AnnotationSink,
) -> Result<Report, S::Error> {
    let blocks = source.fetch(scope)?;
    debug!("checking {} block(s) of {}", blocks.len(), scope);

    let report = run(&blocks, settings, page);
    sink.status(report.displayed.as_ref());
    sink.annotations(&report.annotations);
    Ok(report)
}
