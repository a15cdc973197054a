use trapbook::explorer::{ExplorerError, ExplorerSession};
use trapbook::import::ImportRequest;
use trapbook::rules::StandardChess;
use trapbook::{LineId, PositionKey, Side, SourceTag, TrapLibrary};

fn import(lib: &TrapLibrary, name: &str, source: &str, pgn: &str) {
    lib.import_batch(ImportRequest {
        line_name: name,
        intended_side: Side::White,
        source,
        pgn,
    })
    .unwrap();
}

fn library() -> TrapLibrary {
    let lib = TrapLibrary::in_memory();
    import(&lib, "Italian", "traps", "1. e4 e5 2. Nf3 Nc6 3. Bc4");
    import(&lib, "Vienna Gambit", "traps", "1. e4 e5 2. Nc3 Nf6 3. f4");
    import(&lib, "Vienna Sidestep", "myGames", "1. e4 e5 2. Nc3 Nc6");
    import(&lib, "Vienna Accepted", "myGames", "1. e4 e5 2. Nc3 Nf6 3. f4 exf4");
    lib
}

fn candidate_index(session: &ExplorerSession<StandardChess, &TrapLibrary>, line: &str) -> usize {
    session
        .candidates()
        .iter()
        .position(|c| c.line_name == line)
        .unwrap()
}

#[test]
fn starts_at_the_initial_position_without_preference() {
    let lib = library();
    let session = lib.explorer();
    assert_eq!(*session.current_key(), PositionKey::starting());
    assert_eq!(session.ply_count(), 0);
    assert!(session.preferred_line().is_none());
    assert_eq!(session.candidates().len(), 4);
    assert_eq!(session.suggested_move(), Some("e4"));
}

#[test]
fn preferred_line_sticks_until_it_runs_out() {
    let lib = library();
    let mut session = lib.explorer();

    let vienna = candidate_index(&session, "Vienna Gambit");
    session.select(vienna).unwrap();
    assert_eq!(
        session.preferred_line(),
        Some(&LineId::new(SourceTag::Traps, "Vienna Gambit"))
    );

    assert_eq!(session.auto_advance().unwrap().as_deref(), Some("e5"));
    // Italian (Nf3) is first in index order; the preferred line wins.
    assert_eq!(session.candidates()[0].mv, "Nf3");
    assert_eq!(session.suggested_move(), Some("Nc3"));
    session.auto_advance().unwrap();

    // Both myGames lines are known here as well.
    assert_eq!(session.candidates().len(), 3);
    assert_eq!(session.suggested_move(), Some("Nf6"));
    session.auto_advance().unwrap();
    assert_eq!(session.auto_advance().unwrap().as_deref(), Some("f4"));

    // Only the myGames continuation is known: fall back to the first candidate.
    assert_eq!(session.candidates().len(), 1);
    assert!(session.preferred_line().is_some());
    assert_eq!(session.suggested_move(), Some("exf4"));
    session.auto_advance().unwrap();

    assert!(session.candidates().is_empty());
    assert_eq!(session.suggested_move(), None);
    assert_eq!(session.auto_advance(), Ok(None));

    let history: Vec<&str> = session.history().collect();
    assert_eq!(history, vec!["e4", "e5", "Nc3", "Nf6", "f4", "exf4"]);
}

#[test]
fn manual_moves_leave_the_preferred_line() {
    let lib = library();
    let mut session = lib.explorer();
    let vienna = candidate_index(&session, "Vienna Gambit");
    session.select(vienna).unwrap();

    assert_eq!(session.play("e5").unwrap(), "e5");
    assert!(session.preferred_line().is_none());
    assert_eq!(session.suggested_move(), Some("Nf3"));
}

#[test]
fn illegal_manual_move_changes_nothing() {
    let lib = library();
    let mut session = lib.explorer();
    session.play("d4").unwrap();
    let key = session.current_key().clone();

    assert_eq!(
        session.play("Qh5"),
        Err(ExplorerError::IllegalMove("Qh5".to_string()))
    );
    assert_eq!(*session.current_key(), key);
    assert_eq!(session.ply_count(), 1);
}

#[test]
fn undo_and_reset() {
    let lib = library();
    let mut session = lib.explorer();
    assert_eq!(session.undo(), Err(ExplorerError::NothingToUndo));

    let italian = candidate_index(&session, "Italian");
    session.select(italian).unwrap();
    session.auto_advance().unwrap();
    assert_eq!(session.undo().unwrap(), "e5");
    assert!(session.preferred_line().is_none());
    assert_eq!(session.ply_count(), 1);

    session.play("c5").unwrap();
    assert!(session.candidates().is_empty());
    session.reset();
    assert_eq!(*session.current_key(), PositionKey::starting());
    assert_eq!(session.ply_count(), 0);
    assert_eq!(session.suggested_move(), Some("e4"));
}

#[test]
fn unknown_candidate_is_reported() {
    let lib = library();
    let mut session = lib.explorer();
    assert_eq!(session.select(9), Err(ExplorerError::UnknownCandidate(9)));
}

#[test]
fn refresh_picks_up_new_imports() {
    let lib = TrapLibrary::in_memory();
    let mut session = lib.explorer();
    assert_eq!(session.suggested_move(), None);

    import(&lib, "London", "proGames", "1. d4 d5 2. Bf4");
    session.refresh();
    assert_eq!(session.suggested_move(), Some("d4"));
}

#[test]
fn line_replay_steps_through_one_line() {
    let lib = library();
    let (summary, mut replay) = lib.line_session("Vienna Gambit").unwrap();
    assert_eq!(summary.source, SourceTag::Traps);
    assert_eq!(summary.intended_side, Side::White);

    let mut moves = Vec::new();
    while let Some(mv) = replay.auto_advance().unwrap() {
        moves.push(mv);
    }
    assert_eq!(moves, vec!["e4", "e5", "Nc3", "Nf6", "f4"]);

    replay.undo().unwrap();
    assert_eq!(replay.suggested_move(), Some("f4"));
    assert!(lib.line_session("No Such Line").is_none());
}
