//! Seam to the game text format: batch splitting and PGN movetext.
//!
//! The importer only needs ordered SAN lists. Headers, comments, NAGs, annotation glyphs and
//! nested variations are skipped; only the main line of each game is returned.

/// Errors from [`parse_games`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PgnError {
    #[error("unterminated {what}")]
    Unterminated { what: &'static str },
    #[error("unbalanced ')' outside a variation")]
    UnbalancedVariation,
    #[error("no moves found")]
    NoMoves,
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Split a raw batch into game segments.
///
/// Segments are separated by blank lines. A segment made only of tag pairs is joined to the
/// segment after it, so a header block separated from its movetext stays one game.
pub fn split_batch(raw: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let mut out: Vec<String> = Vec::new();
    let mut pending_headers: Option<String> = None;
    for block in blocks {
        let text = block.join("\n");
        let headers_only = block.iter().all(|l| l.trim_start().starts_with('['));
        let text = match pending_headers.take() {
            Some(h) => format!("{h}\n{text}"),
            None => text,
        };
        if headers_only {
            pending_headers = Some(text);
        } else {
            out.push(text);
        }
    }
    if let Some(h) = pending_headers {
        out.push(h);
    }
    out
}

/// Parse movetext into games, each an ordered list of SAN tokens.
///
/// A game ends at a result token (`1-0`, `0-1`, `1/2-1/2`, `*`), at a tag pair following
/// movetext, or at the end of input.
pub fn parse_games(text: &str) -> Result<Vec<Vec<String>>, PgnError> {
    let mut games: Vec<Vec<String>> = Vec::new();
    let mut moves: Vec<String> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut word = String::new();

    let flush = |word: &mut String, moves: &mut Vec<String>, games: &mut Vec<Vec<String>>| {
        if word.is_empty() {
            return;
        }
        let token = std::mem::take(word);
        if RESULTS.contains(&token.as_str()) {
            if !moves.is_empty() {
                games.push(std::mem::take(moves));
            }
        } else if let Some(mv) = move_token(&token) {
            moves.push(mv);
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '[' => {
                flush(&mut word, &mut moves, &mut games);
                if !moves.is_empty() {
                    games.push(std::mem::take(&mut moves));
                }
                skip_tag_pair(&mut chars)?;
            }
            '{' => {
                flush(&mut word, &mut moves, &mut games);
                skip_until(&mut chars, '}', "comment")?;
            }
            ';' => {
                flush(&mut word, &mut moves, &mut games);
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                flush(&mut word, &mut moves, &mut games);
                skip_variation(&mut chars)?;
            }
            ')' => return Err(PgnError::UnbalancedVariation),
            '$' => {
                flush(&mut word, &mut moves, &mut games);
                while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    chars.next();
                }
            }
            c if c.is_whitespace() => flush(&mut word, &mut moves, &mut games),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut moves, &mut games);
    if !moves.is_empty() {
        games.push(moves);
    }

    if games.is_empty() {
        return Err(PgnError::NoMoves);
    }
    Ok(games)
}

/// Strip move numbers and annotation glyphs; `None` if nothing is left.
fn move_token(token: &str) -> Option<String> {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = if rest.len() < token.len() && rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        token
    };
    let rest = rest.trim_end_matches(['!', '?']);
    // Evaluation glyphs (`+=`, `+/-`, `=`, `∞`, ...) and anything else without a square or piece.
    if !rest.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    // Zero-style castling.
    let mv = match rest.trim_end_matches(['+', '#']) {
        "0-0" | "0-0-0" => rest.replace('0', "O"),
        _ => rest.to_string(),
    };
    Some(mv)
}

fn skip_tag_pair<I: Iterator<Item = char>>(chars: &mut I) -> Result<(), PgnError> {
    let mut in_string = false;
    let mut escaped = false;
    for c in chars.by_ref() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ']' if !in_string => return Ok(()),
            _ => {}
        }
    }
    Err(PgnError::Unterminated { what: "tag pair" })
}

fn skip_until<I: Iterator<Item = char>>(
    chars: &mut I,
    end: char,
    what: &'static str,
) -> Result<(), PgnError> {
    if chars.any(|c| c == end) {
        Ok(())
    } else {
        Err(PgnError::Unterminated { what })
    }
}

fn skip_variation<I: Iterator<Item = char>>(chars: &mut I) -> Result<(), PgnError> {
    let mut depth = 1usize;
    while let Some(c) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            '{' => skip_until(chars, '}', "comment")?,
            _ => {}
        }
    }
    Err(PgnError::Unterminated { what: "variation" })
}
