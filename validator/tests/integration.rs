use pretty_assertions::assert_eq;
use validator::{
    AnnotationSink, Annotations, Fault, FaultKind, Page, Settings, Status, check_scope, run,
    validate,
};
use wrapper_tags::block::{Block, BlockId, Role};
use wrapper_tags::source::{MemoryStore, ParentScope};
use wrapper_tags::tag::{TagPayload, TagToken};

fn tokens(names: &[&str]) -> TagPayload {
    TagPayload::from(names.iter().map(|n| TagToken::new(*n)).collect::<Vec<_>>())
}

fn open(id: u64, names: &[&str]) -> Block {
    Block::new(id, "openingTags", Role::OpeningGroup(tokens(names)))
}

fn close(id: u64, names: &[&str]) -> Block {
    Block::new(id, "closingTags", Role::ClosingGroup(tokens(names)))
}

fn start(id: u64) -> Block {
    Block::new(id, "accordionStart", Role::WrapperStart)
}

fn stop(id: u64) -> Block {
    Block::new(id, "accordionStop", Role::WrapperStop)
}

fn text(id: u64) -> Block {
    Block::new(id, "text", Role::Plain)
}

fn levels(blocks: &[Block]) -> Vec<usize> {
    validate(blocks).indents.levels()
}

fn fault_kind(blocks: &[Block]) -> Option<FaultKind> {
    validate(blocks).status.fault().map(Fault::kind)
}

#[test]
fn plain_sequence_is_flat() {
    let blocks = vec![text(1), text(2), text(3)];
    let validation = validate(&blocks);
    assert_eq!(validation.status, Status::Ok);
    assert_eq!(validation.indents.levels(), vec![0, 0, 0]);
}

#[test]
fn singleton_pair_indents_its_content() {
    assert_eq!(levels(&[start(1), stop(2)]), vec![0, 0]);
    let blocks = vec![start(1), text(2), text(3), stop(4), text(5)];
    assert_eq!(validate(&blocks).status, Status::Ok);
    assert_eq!(levels(&blocks), vec![0, 1, 1, 0, 0]);
}

#[test]
fn full_group_match_restores_level() {
    let blocks = vec![open(1, &["a", "b", "c"]), text(2), close(3, &["c", "b", "a"]), text(4)];
    assert_eq!(validate(&blocks).status, Status::Ok);
    assert_eq!(levels(&blocks), vec![0, 1, 0, 0]);
}

#[test]
fn full_group_mismatch_names_the_pair() {
    let blocks = vec![open(1, &["a", "b", "c"]), close(2, &["c", "b", "x"])];
    assert_eq!(
        validate(&blocks).status,
        Status::Fault(Fault::TagNamePairingMismatch {
            opening_tag: "a".into(),
            opening: BlockId(1),
            closing_tag: "x".into(),
            closing: BlockId(2),
        })
    );
}

#[test]
fn one_opening_closed_by_several_closings() {
    let blocks = vec![
        open(1, &["a", "b", "c"]),
        text(2),
        close(3, &["c"]),
        text(4),
        close(5, &["b", "a"]),
        text(6),
    ];
    let validation = validate(&blocks);
    assert_eq!(validation.status, Status::Ok);
    assert_eq!(validation.indents.levels(), vec![0, 1, 0, 1, 0, 0]);
    assert!(validation.indents.get(BlockId(3)).unwrap().middle);
    assert!(!validation.indents.get(BlockId(5)).unwrap().middle);
}

#[test]
fn several_openings_closed_by_one_closing() {
    let blocks = vec![open(1, &["a"]), open(2, &["b"]), close(3, &["b", "a"])];
    let validation = validate(&blocks);
    assert_eq!(validation.status, Status::Ok);
    assert_eq!(validation.indents.levels(), vec![0, 0, 0]);
}

#[test]
fn many_to_one_relevels_enclosed_content() {
    let blocks = vec![
        open(1, &["div"]),
        text(2),
        open(3, &["span"]),
        text(4),
        close(5, &["span", "div"]),
        text(6),
    ];
    let validation = validate(&blocks);
    assert_eq!(validation.status, Status::Ok);
    assert_eq!(validation.indents.levels(), vec![0, 1, 0, 1, 0, 0]);
}

#[test]
fn closing_that_ends_mid_frame_needs_split() {
    let blocks = vec![open(1, &["a", "b"]), open(2, &["c"]), close(3, &["c", "a"])];
    assert_eq!(
        validate(&blocks).status,
        Status::Fault(Fault::ClosingNeedsSplit {
            closing: BlockId(3),
            opening: BlockId(1),
        })
    );
}

#[test]
fn unclosed_opening_is_reported() {
    assert_eq!(
        validate(&[open(1, &["a"])]).status,
        Status::Fault(Fault::OpeningWithNoClosing {
            tag: "a".into(),
            opening: BlockId(1),
        })
    );
}

#[test]
fn hidden_start_opens_nothing() {
    let blocks = vec![start(1).hidden(), text(2), close(3, &["div"])];
    let validation = validate(&blocks);
    assert_eq!(
        validation.status,
        Status::Fault(Fault::ClosingWithNoOpening {
            tag: "div".into(),
            closing: BlockId(3),
        })
    );
    assert_eq!(validation.indents.levels(), vec![0, 0, 0]);

    let blocks = vec![open(1, &["div"]), start(2).hidden(), text(3), close(4, &["div"])];
    assert_eq!(validate(&blocks).status, Status::Ok);
    assert_eq!(levels(&blocks), vec![0, 1, 1, 0]);
}

#[test]
fn hidden_groups_keep_depth() {
    let blocks = vec![
        open(1, &["div"]),
        close(2, &["div"]).hidden(),
        text(3),
        open(4, &["p"]).hidden(),
        close(5, &["div"]),
    ];
    assert_eq!(validate(&blocks).status, Status::Ok);
    assert_eq!(levels(&blocks), vec![0, 1, 1, 1, 0]);
}

#[test]
fn hidden_stop_closes_nothing() {
    let blocks = vec![start(1), stop(2).hidden(), text(3), stop(4)];
    assert_eq!(levels(&blocks), vec![0, 1, 1, 0]);
}

#[test]
fn singleton_inside_group() {
    let blocks = vec![open(1, &["section"]), start(2), text(3), stop(4), close(5, &["section"])];
    assert_eq!(validate(&blocks).status, Status::Ok);
    assert_eq!(levels(&blocks), vec![0, 1, 2, 1, 0]);
}

#[test]
fn first_fault_is_kept_and_indentation_completes() {
    let blocks = vec![
        open(1, &["div"]),
        close(2, &["span"]),
        close(3, &["p"]),
        text(4),
    ];
    let validation = validate(&blocks);
    assert_eq!(
        validation.status.fault().map(Fault::kind),
        Some(FaultKind::TagNamePairingMismatch)
    );
    assert_eq!(validation.indents.len(), 4);
}

#[test]
fn corrupt_payload_is_reported() {
    let broken = Block::new(
        2,
        "closingTags",
        Role::ClosingGroup(TagPayload::Corrupt("missing tag list".into())),
    );
    assert_eq!(
        fault_kind(&[open(1, &["div"]), broken, close(3, &["div"])]),
        Some(FaultKind::CorruptData)
    );
}

#[test]
fn validation_is_repeatable() {
    let blocks = vec![
        open(1, &["a", "b"]),
        open(2, &["c"]),
        text(3),
        close(4, &["c", "b"]),
        close(5, &["a"]),
    ];
    assert_eq!(validate(&blocks), validate(&blocks));
}

#[test]
fn run_hides_status_but_still_indents() {
    let blocks = vec![open(1, &["a"]), text(2)];
    let settings = Settings {
        hide_validation_status: true,
        ..Settings::default()
    };
    let report = run(&blocks, &settings, None);
    assert_eq!(report.displayed, None);
    assert_eq!(report.validation.status.fault().map(Fault::kind), Some(FaultKind::OpeningWithNoClosing));
    assert_eq!(report.annotations.values(), vec![1, 1]);
}

#[test]
fn run_with_unbounded_page_size() {
    let report = run(
        &[text(1), text(2)],
        &Settings::default(),
        Some(Page::new(1, usize::MAX)),
    );
    assert_eq!(report.annotations.values(), vec![0]);
    assert_eq!(report.annotations.rows[0].0, BlockId(2));
}

#[test]
fn empty_opening_group_does_not_indent() {
    let blocks = vec![
        Block::new(1, "openingTags", Role::OpeningGroup(TagPayload::Tags(Vec::new()))),
        text(2),
        text(3),
    ];
    assert_eq!(fault_kind(&blocks), Some(FaultKind::CorruptData));
    assert_eq!(levels(&blocks), vec![0, 0, 0]);
}

#[test]
fn run_without_groups_displays_nothing() {
    let report = run(&[start(1), text(2), stop(3)], &Settings::default(), None);
    assert_eq!(report.displayed, None);
    assert_eq!(report.annotations.values(), vec![1, 0, 0]);
}

#[test]
fn run_annotates_one_block_late() {
    let blocks = vec![open(1, &["a", "b"]), text(2), close(3, &["b"]), text(4), close(5, &["a"])];
    let settings = Settings {
        colorize: true,
        ..Settings::default()
    };
    let report = run(&blocks, &settings, None);
    assert_eq!(report.displayed, Some(Status::Ok));
    assert_eq!(report.annotations.values(), vec![1, 0, 1, 0, 0]);

    let middle = report.annotations.get(BlockId(3)).unwrap();
    assert!(middle.middle);
    assert_eq!(
        middle.css_class(),
        "clear-indent wrapper-tag indent indent_1 indent-tags-closing-middle colorize-wrapper-tags"
    );
}

#[derive(Default)]
struct RecordingSink {
    status: Option<Option<Status>>,
    annotations: Option<Annotations>,
}

impl AnnotationSink for RecordingSink {
    fn status(&mut self, status: Option<&Status>) {
        self.status = Some(status.cloned());
    }

    fn annotations(&mut self, annotations: &Annotations) {
        self.annotations = Some(annotations.clone());
    }
}

#[test]
fn check_scope_reads_source_in_sorting_order() {
    let scope = ParentScope::new(3, "tl_article");
    let mut store = MemoryStore::new();
    store.insert(scope.clone(), 384, close(3, &["div"]));
    store.insert(scope.clone(), 128, open(1, &["div"]));
    store.insert(scope.clone(), 256, text(2));

    let mut sink = RecordingSink::default();
    let report = check_scope(&store, &scope, &Settings::default(), Some(Page::new(1, 10)), &mut sink)
        .unwrap();

    assert_eq!(report.validation.indents.levels(), vec![0, 1, 0]);
    assert_eq!(sink.status, Some(Some(Status::Ok)));
    let annotations = sink.annotations.unwrap();
    assert_eq!(annotations.rows.len(), 2);
    assert_eq!(annotations.leading.map(|a| a.value), Some(1));
}
