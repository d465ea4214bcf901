use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wrapper_tags::block::BlockId;

/// A pairing problem found in a block sequence.
///
/// Only the first one of a pass is kept; the remaining blocks are still
/// walked so that indentation stays complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("the tag data of element (id {block}) is corrupted: {reason}")]
    CorruptData { block: BlockId, reason: String },

    #[error("the opening tag <{tag}> (id {opening}) has no closing tag")]
    OpeningWithNoClosing { tag: String, opening: BlockId },

    #[error("the closing tag </{tag}> (id {closing}) has no opening tag")]
    ClosingWithNoOpening { tag: String, closing: BlockId },

    #[error(
        "the opening tag <{tag}> (id {opening}) is paired with \"{element}\" (id {stop}) instead of closing tags"
    )]
    StopPairedWithGroupInstead {
        tag: String,
        opening: BlockId,
        element: String,
        stop: BlockId,
    },

    #[error(
        "the closing tag </{tag}> (id {closing}) is paired with \"{element}\" (id {start}) instead of opening tags"
    )]
    ClosingPairedWithSingletonInstead {
        tag: String,
        closing: BlockId,
        element: String,
        start: BlockId,
    },

    #[error(
        "the opening tag <{opening_tag}> (id {opening}) is paired with the closing tag </{closing_tag}> (id {closing})"
    )]
    TagNamePairingMismatch {
        opening_tag: String,
        opening: BlockId,
        closing_tag: String,
        closing: BlockId,
    },

    #[error(
        "the closing tags (id {closing}) end inside the opening tags (id {opening}); split the closing element"
    )]
    ClosingNeedsSplit { closing: BlockId, opening: BlockId },
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::CorruptData { .. } => FaultKind::CorruptData,
            Fault::OpeningWithNoClosing { .. } => FaultKind::OpeningWithNoClosing,
            Fault::ClosingWithNoOpening { .. } => FaultKind::ClosingWithNoOpening,
            Fault::StopPairedWithGroupInstead { .. } => FaultKind::StopPairedWithGroupInstead,
            Fault::ClosingPairedWithSingletonInstead { .. } => {
                FaultKind::ClosingPairedWithSingletonInstead
            }
            Fault::TagNamePairingMismatch { .. } => FaultKind::TagNamePairingMismatch,
            Fault::ClosingNeedsSplit { .. } => FaultKind::ClosingNeedsSplit,
        }
    }

    /// The block where the fault was detected, followed by the block it was
    /// paired against, if any.
    pub fn blocks(&self) -> (BlockId, Option<BlockId>) {
        match self {
            Fault::CorruptData { block, .. } => (*block, None),
            Fault::OpeningWithNoClosing { opening, .. } => (*opening, None),
            Fault::ClosingWithNoOpening { closing, .. } => (*closing, None),
            Fault::StopPairedWithGroupInstead { opening, stop, .. } => (*stop, Some(*opening)),
            Fault::ClosingPairedWithSingletonInstead { closing, start, .. } => {
                (*closing, Some(*start))
            }
            Fault::TagNamePairingMismatch {
                opening, closing, ..
            } => (*closing, Some(*opening)),
            Fault::ClosingNeedsSplit { closing, opening } => (*closing, Some(*opening)),
        }
    }

    /// Convert to a codespan-reporting Diagnostic, labelling every block
    /// `locate` can find in the file.
    pub fn to_diagnostic(
        &self,
        file_id: usize,
        locate: impl Fn(BlockId) -> Option<Range<usize>>,
    ) -> Diagnostic<usize> {
        let (detected, paired) = self.blocks();
        let mut labels = Vec::new();
        if let Some(span) = locate(detected) {
            labels.push(Label::primary(file_id, span).with_message("detected here"));
        }
        if let Some(span) = paired.and_then(&locate) {
            labels.push(Label::secondary(file_id, span).with_message("paired with this element"));
        }
        Diagnostic::new(Severity::Error)
            .with_code(self.kind().to_string())
            .with_message(self.to_string())
            .with_labels(labels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultKind {
    CorruptData,
    OpeningWithNoClosing,
    ClosingWithNoOpening,
    StopPairedWithGroupInstead,
    ClosingPairedWithSingletonInstead,
    TagNamePairingMismatch,
    ClosingNeedsSplit,
}

impl FaultKind {
    pub const ALL: [FaultKind; 7] = [
        FaultKind::CorruptData,
        FaultKind::OpeningWithNoClosing,
        FaultKind::ClosingWithNoOpening,
        FaultKind::StopPairedWithGroupInstead,
        FaultKind::ClosingPairedWithSingletonInstead,
        FaultKind::TagNamePairingMismatch,
        FaultKind::ClosingNeedsSplit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaultKind::CorruptData => "corrupt-data",
            FaultKind::OpeningWithNoClosing => "opening-with-no-closing",
            FaultKind::ClosingWithNoOpening => "closing-with-no-opening",
            FaultKind::StopPairedWithGroupInstead => "stop-paired-with-group-instead",
            FaultKind::ClosingPairedWithSingletonInstead => {
                "closing-paired-with-singleton-instead"
            }
            FaultKind::TagNamePairingMismatch => "tag-name-pairing-mismatch",
            FaultKind::ClosingNeedsSplit => "closing-needs-split",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown fault kind: {}", s))
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Fault(Fault),
}

impl Status {
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Status::Ok => None,
            Status::Fault(fault) => Some(fault),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "all wrapper tags are paired"),
            Status::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in FaultKind::ALL {
            assert_eq!(kind.to_string().parse::<FaultKind>(), Ok(kind));
        }
        assert!("no-such-fault".parse::<FaultKind>().is_err());
    }

    #[test]
    fn mismatch_message_names_both_tags() {
        let fault = Fault::TagNamePairingMismatch {
            opening_tag: "div".into(),
            opening: BlockId(3),
            closing_tag: "span".into(),
            closing: BlockId(9),
        };
        assert_eq!(
            fault.to_string(),
            "the opening tag <div> (id 3) is paired with the closing tag </span> (id 9)"
        );
    }

    #[test]
    fn diagnostic_labels_detected_and_paired_blocks() {
        let fault = Fault::ClosingNeedsSplit {
            closing: BlockId(5),
            opening: BlockId(2),
        };
        let diagnostic = fault.to_diagnostic(0, |id| Some(id.0 as usize * 10..id.0 as usize * 10 + 1));
        assert_eq!(diagnostic.labels.len(), 2);
        assert_eq!(diagnostic.labels[0].range, 50..51);
        assert_eq!(diagnostic.labels[1].range, 20..21);
        assert_eq!(diagnostic.code.as_deref(), Some("closing-needs-split"));
    }

    #[test]
    fn diagnostic_skips_unknown_blocks() {
        let fault = Fault::OpeningWithNoClosing {
            tag: "div".into(),
            opening: BlockId(1),
        };
        assert!(fault.to_diagnostic(0, |_| None).labels.is_empty());
    }
}
