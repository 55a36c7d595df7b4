//! SAN formatting, parsing, and movetext replay over `cozy-chess`.
//!
//! Parsing works by rendering every legal move to SAN and matching against
//! the input token, which sidesteps a hand-written SAN grammar and is fast
//! enough for replaying archived games.
//!
//! Note: cozy-chess represents castling as king-takes-rook (e.g. `e1h1` for
//! kingside), which is handled explicitly when rendering `O-O`/`O-O-O`.

use cozy_chess::{Board, GameStatus, Move, Piece, Square};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SanError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("No legal move matches: {0}")]
    NoLegalMove(String),

    #[error("Ambiguous SAN: {0}")]
    AmbiguousMove(String),

    #[error("Empty movetext")]
    EmptyMovetext,
}

/// One replayed ply with the positions on either side of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedMove {
    /// 1-indexed ply (odd = White).
    pub ply: u32,
    pub san: String,
    pub fen_before: String,
    pub fen_after: String,
    /// Pieces on the board before the move, kings included.
    pub pieces_before: u32,
}

fn square_str(sq: Square) -> String {
    let file = (b'a' + sq.file() as u8) as char;
    let rank = sq.rank() as u8 + 1;
    format!("{}{}", file, rank)
}

fn piece_letter(piece: Piece) -> Option<char> {
    match piece {
        Piece::Pawn => None,
        Piece::Knight => Some('N'),
        Piece::Bishop => Some('B'),
        Piece::Rook => Some('R'),
        Piece::Queen => Some('Q'),
        Piece::King => Some('K'),
    }
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        for mv in piece_moves {
            moves.push(mv);
        }
        false
    });
    moves
}

/// True if `mv` is castling in cozy-chess's king-takes-rook encoding.
fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
        && board.piece_on(mv.to) == Some(Piece::Rook)
}

/// Render `mv` as SAN without the check/mate suffix.
fn san_base(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        return if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    let is_capture = board.piece_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    let mut san = String::new();

    match piece_letter(piece) {
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(board, mv, piece));
        }
        None => {
            if is_capture {
                san.push((b'a' + mv.from.file() as u8) as char);
            }
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&square_str(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        if let Some(letter) = piece_letter(promo) {
            san.push(letter);
        }
    }

    san
}

/// Minimal departure-square disambiguation for non-pawn moves.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Move> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to && other.from != mv.from && board.piece_on(other.from) == Some(piece)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let file_unique = rivals.iter().all(|other| other.from.file() != mv.from.file());
    let rank_unique = rivals.iter().all(|other| other.from.rank() != mv.from.rank());

    if file_unique {
        ((b'a' + mv.from.file() as u8) as char).to_string()
    } else if rank_unique {
        (mv.from.rank() as u8 + 1).to_string()
    } else {
        square_str(mv.from)
    }
}

/// Format a legal move as SAN, including `+`/`#` suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = san_base(board, mv);
    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won { '#' } else { '+' });
    }
    san
}

/// Strip annotations a SAN token may carry (`+`, `#`, `!`, `?`).
fn strip_suffix(token: &str) -> &str {
    token.trim_end_matches(['+', '#', '!', '?'])
}

/// Resolve a SAN token against the legal moves of `board`.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    // Tolerate zeroes in castling notation ("0-0").
    let wanted = strip_suffix(san).replace('0', "O");

    let mut matches = Vec::new();
    for mv in legal_moves(board) {
        if san_base(board, mv) == wanted {
            matches.push(mv);
        }
    }

    match matches.len() {
        1 => Ok(matches[0]),
        0 => Err(SanError::NoLegalMove(san.to_string())),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Extract the movetext section from a full PGN payload (tag pairs skipped).
fn movetext_of(pgn: &str) -> String {
    pgn.lines()
        .filter(|line| !line.trim_start().starts_with('['))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `{...}` comments and `(...)` variations from movetext.
fn strip_annotations(movetext: &str) -> String {
    let mut out = String::with_capacity(movetext.len());
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;
    for c in movetext.chars() {
        match c {
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' if brace_depth == 0 => paren_depth += 1,
            ')' if brace_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

fn is_move_number(token: &str) -> bool {
    token
        .trim_end_matches('.')
        .chars()
        .all(|c| c.is_ascii_digit())
        && token.contains('.')
        || token.chars().all(|c| c.is_ascii_digit())
}

/// Replay a full PGN payload from the standard starting position.
///
/// Returns one [`ReplayedMove`] per ply. Any token that fails to resolve to
/// a legal move fails the whole game — the caller treats that game as
/// skipped, not the batch.
pub fn replay_movetext(pgn: &str) -> Result<Vec<ReplayedMove>, SanError> {
    let text = strip_annotations(&movetext_of(pgn));
    let mut board = Board::default();
    let mut replayed = Vec::new();
    let mut ply = 0u32;

    for raw in text.split_whitespace() {
        if is_result_token(raw) || is_move_number(raw) || raw.starts_with('$') {
            continue;
        }
        // Tokens like "3.Nf3" carry the number glued to the SAN.
        let token = raw.rsplit('.').next().unwrap_or(raw);
        if token.is_empty() {
            continue;
        }

        let mv = parse_san(&board, token)?;
        ply += 1;
        let fen_before = board.to_string();
        let pieces_before = board.occupied().len();
        let san = format_san(&board, mv);
        board.play_unchecked(mv);
        replayed.push(ReplayedMove {
            ply,
            san,
            fen_before,
            fen_after: board.to_string(),
            pieces_before,
        });
    }

    if replayed.is_empty() {
        return Err(SanError::EmptyMovetext);
    }
    Ok(replayed)
}
