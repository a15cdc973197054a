use trapbook::import::{ImportError, ImportRequest};
use trapbook::rules::{RulesEngine, StandardChess};
use trapbook::{LibraryError, PositionKey, Side, SourceTag, TrapLibrary};

fn import(
    lib: &TrapLibrary,
    name: &str,
    source: &str,
    pgn: &str,
) -> Result<trapbook::import::ImportReport, LibraryError> {
    lib.import_batch(ImportRequest {
        line_name: name,
        intended_side: Side::White,
        source,
        pgn,
    })
}

fn key_after(moves: &[&str]) -> PositionKey {
    let rules = StandardChess;
    let mut board = rules.starting_position();
    for m in moves {
        board = rules.apply_move(&board, m).unwrap().board;
    }
    rules.position_key(&board)
}

const HALLOWEEN: &str = "1. e4 e5 2. Nf3 Nc6 3. Nc3 Nf6 4. Nxe5\n\n\
1. e4 e5 2. Nf3 Nc6 3. Nc3 Nf6 4. Nxe5 Nxe5 5. d4\n\n\
1. e4 e5 2. Nf3 Nc6 3. Nc3 Nf6 4. Nxe5 Nxe5 5. d4 Ng6 6. e5";

#[test]
fn reimporting_a_batch_is_idempotent() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "Halloween", "traps", HALLOWEEN).unwrap();
    let once = lib.snapshot();

    import(&lib, "Halloween", "traps", HALLOWEEN).unwrap();
    let twice = lib.snapshot();

    assert_eq!(*once, *twice);
    for (_, bucket) in twice.iter() {
        let mut seen = std::collections::HashSet::new();
        for r in bucket {
            assert!(seen.insert(r), "duplicate record {r:?}");
        }
    }
}

#[test]
fn batch_segments_get_numbered_names() {
    let lib = TrapLibrary::in_memory();
    let report = import(&lib, "Halloween", "traps", HALLOWEEN).unwrap();
    assert_eq!(report.segments_saved, 3);
    assert_eq!(
        report.line_names,
        vec!["Halloween 1", "Halloween 2", "Halloween 3"]
    );
    assert_eq!(
        report.message,
        "Batch of 3 variations for 'Halloween' saved successfully."
    );

    let report = import(&lib, "Vienna", "traps", "1. e4 e5 2. Nc3").unwrap();
    assert_eq!(report.line_names, vec!["Vienna"]);
    assert_eq!(report.message, "Trap 'Vienna' saved successfully.");

    let names: Vec<String> = lib.list_lines().into_iter().map(|l| l.name).collect();
    assert_eq!(
        names,
        vec!["Halloween 1", "Halloween 2", "Halloween 3", "Vienna"]
    );
}

#[test]
fn resubmitting_a_line_replaces_its_old_path() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "X", "traps", "1. e4 e5").unwrap();
    let report = import(&lib, "X", "traps", "1. d4 d5").unwrap();
    assert_eq!(report.records_replaced, 2);

    assert!(lib
        .query_moves(&key_after(&["e4"]))
        .iter()
        .all(|r| r.line_name != "X"));
    let at_start: Vec<_> = lib
        .query_moves(&PositionKey::starting())
        .into_iter()
        .map(|r| r.mv)
        .collect();
    assert_eq!(at_start, vec!["d4"]);
    assert_eq!(lib.query_moves(&key_after(&["d4"]))[0].mv, "d5");
}

#[test]
fn illegal_move_fails_and_writes_nothing() {
    let lib = TrapLibrary::in_memory();
    let err = import(&lib, "Broken", "traps", "1. e4 e5 2. Zz9").unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Import(ImportError::IllegalMove { ref notation, segment: 0 }) if notation == "Zz9"
    ));
    assert!(lib.snapshot().is_empty());
}

#[test]
fn a_failing_segment_rolls_back_the_whole_batch() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "Halloween", "traps", HALLOWEEN).unwrap();
    let before = lib.snapshot();

    let err = import(
        &lib,
        "Halloween",
        "traps",
        "1. e4 e5 2. Nf3\n\n1. e4 e5 2. Ke3",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Import(ImportError::IllegalMove { segment: 1, .. })
    ));
    assert_eq!(*before, *lib.snapshot());
}

#[test]
fn rejected_requests_do_not_touch_any_store() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "Keep", "myGames", "1. d4").unwrap();
    let before = lib.snapshot();

    assert!(matches!(
        import(&lib, "X", "tournament", "1. e4"),
        Err(LibraryError::Import(ImportError::UnknownSource(s))) if s == "tournament"
    ));
    assert!(matches!(
        import(&lib, "X", "traps", "\n  \n"),
        Err(LibraryError::Import(ImportError::EmptyBatch))
    ));
    assert!(matches!(
        import(&lib, "X", "traps", "1. e4 (1. d4"),
        Err(LibraryError::Import(ImportError::MalformedInput { segment: 0, .. }))
    ));
    assert_eq!(*before, *lib.snapshot());
}

#[test]
fn writes_to_one_source_leave_others_alone() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "Shared", "myGames", "1. e4 e5 2. Nf3").unwrap();
    let mine = lib.store(SourceTag::MyGames);

    import(&lib, "Shared", "traps", "1. e4 c5").unwrap();
    import(&lib, "Shared", "traps", "1. d4").unwrap();
    lib.reset_source(SourceTag::Traps).unwrap();

    assert_eq!(*mine, *lib.store(SourceTag::MyGames));
    assert_eq!(
        lib.snapshot().records_from(SourceTag::MyGames).count(),
        mine.record_count()
    );
    assert!(lib.store(SourceTag::Traps).is_empty());
}

#[test]
fn delete_by_variation_pattern_removes_siblings_only() {
    use trapbook::store::LinePattern;

    let lib = TrapLibrary::in_memory();
    import(&lib, "Halloween", "traps", HALLOWEEN).unwrap();
    import(&lib, "Halloween Gambit Declined", "traps", "1. e4 e5 2. Nf3 Nc6 3. Nc3 Nf6 4. Nxe5 Nxe5 5. d4 Nc6").unwrap();
    import(&lib, "Halloween", "myGames", "1. e4").unwrap();

    let removed = lib
        .delete_lines(
            SourceTag::Traps,
            &LinePattern::Variations("Halloween".to_string()),
        )
        .unwrap();
    assert_eq!(removed, 7 + 9 + 11);

    let names: Vec<_> = lib
        .list_lines()
        .into_iter()
        .map(|l| (l.name, l.source))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Halloween".to_string(), SourceTag::MyGames),
            ("Halloween Gambit Declined".to_string(), SourceTag::Traps),
        ]
    );
}

#[test]
fn reset_all_empties_the_index() {
    let lib = TrapLibrary::in_memory();
    import(&lib, "A", "traps", "1. e4").unwrap();
    import(&lib, "B", "proGames", "1. d4").unwrap();
    lib.reset_all().unwrap();
    assert!(lib.snapshot().is_empty());
    assert!(lib.list_lines().is_empty());
}

#[test]
fn header_blocks_join_the_following_movetext() {
    let lib = TrapLibrary::in_memory();
    let raw = "[Event \"x\"]\n\n1. e4 e5 *\n\n[Event \"y\"]\n\n1. d4 *";
    let report = import(&lib, "B", "traps", raw).unwrap();

    assert_eq!(report.segments_saved, 2);
    assert_eq!(report.line_names, vec!["B 1", "B 2"]);
    let names: Vec<_> = lib.list_lines().into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["B 1", "B 2"]);
    assert_eq!(lib.line_details("B 2").len(), 1);
}

#[test]
fn annotated_games_import_without_glyphs() {
    let lib = TrapLibrary::in_memory();
    let report = import(&lib, "Annotated", "traps", "1. e4 += e5 2. Nf3 +/- *").unwrap();
    assert_eq!(report.records_written, 3);
    let moves: Vec<_> = lib
        .query_moves(&key_after(&["e4", "e5"]))
        .into_iter()
        .map(|r| r.mv)
        .collect();
    assert_eq!(moves, vec!["Nf3"]);
}
