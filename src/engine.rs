use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in a fixed order callers can rely on.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Map a line-relative `(travel, line)` index pair to a grid `(row, col)`.
    ///
    /// `travel` counts cells along a line starting from the wall tiles slide
    /// toward; `line` selects which of the four rows or columns is meant.
    #[inline]
    pub fn cell(self, travel: usize, line: usize) -> (usize, usize) {
        match self {
            Move::Up => (travel, line),
            Move::Down => (3 - travel, line),
            Move::Left => (line, travel),
            Move::Right => (line, 3 - travel),
        }
    }
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

/// Precomputed per-line results for all possible 4-tile lines.
///
/// Shifting/merging a row or column depends only on its 4 nibbles, so every
/// outcome is tabulated once: the replacement line for each direction family,
/// the score produced by the merges in that line, and a bitmask of which
/// output slots (in travel order) hold a freshly merged tile. The merge score
/// is the same for both travel orientations; the merged slots are not.
struct Stores {
    shift_left: Box<[u64]>,
    shift_right: Box<[u64]>,
    shift_up: Box<[u64]>,
    shift_down: Box<[u64]>,
    merge_score: Box<[Score]>,
    merge_fwd: Box<[u8]>,
    merge_rev: Box<[u8]>,
}

type BoardRaw = u64;
type Line = u64;
type Tile = u64;
type Score = u64;

/// Packed 4x4 2048 board as 16 4-bit tile exponents in a `u64`.
///
/// A nibble of 0 is an empty cell; a nibble of `k` is the tile `2^k`, so the
/// representation caps tiles at 32768. Public methods provide ergonomic, safe
/// operations while preserving an escape hatch to the raw packed
/// representation for advanced use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board(BoardRaw);

/// Result of sliding a board in one direction.
///
/// `changed == false` means the board is bit-for-bit identical to the input;
/// callers must not spawn, score, or emit feedback cues for such an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutcome {
    /// Board after the slide (equal to the input when `changed` is false).
    pub board: Board,
    pub changed: bool,
    /// Sum of the values of every tile created by a merge in this slide.
    pub score_delta: u64,
    /// Grid `(row, col)` of each cell a merged tile landed in.
    pub merged: Vec<(usize, usize)>,
}

/// One tile placed by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u16,
}

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Return the board resulting from sliding/merging tiles in `dir`,
    /// without outcome bookkeeping. Cheapest way to probe move legality.
    ///
    /// Example
    /// ```
    /// use twenty48_core::engine::{self as GameEngine, Board, Move};
    /// GameEngine::new();
    /// let b = Board::EMPTY;
    /// assert_eq!(b.shift(Move::Left), b);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        shift(self, dir)
    }

    /// Slide/merge tiles in `dir` and report what happened: the new board,
    /// whether anything moved, the score produced by merges, and the grid
    /// coordinates the merged tiles landed in.
    ///
    /// ```
    /// use twenty48_core::engine::{self as GameEngine, Board, Move};
    /// GameEngine::new();
    /// // Top row [2, 0, 2, 4], everything else empty.
    /// let b = Board::from_raw(0x1012_0000_0000_0000);
    /// let out = b.slide(Move::Left);
    /// assert!(out.changed);
    /// assert_eq!(out.score_delta, 4);
    /// assert_eq!(out.merged, vec![(0, 0)]);
    /// ```
    #[inline]
    pub fn slide(self, dir: Move) -> SlideOutcome {
        slide(self, dir)
    }

    /// Place up to `count` random tiles (2 with p=0.9, 4 with p=0.1) on
    /// uniformly chosen empty cells, without replacement. Placing fewer than
    /// `count` tiles because the board filled up is a no-op, not an error.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let (b, spawns) = Board::EMPTY.spawn_tiles(2, &mut rng);
    /// assert_eq!(spawns.len(), 2);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn spawn_tiles<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> (Self, Vec<Spawn>) {
        spawn_tiles(self, count, rng)
    }

    /// Insert a single random 2 (90%) or 4 (10%) tile, using the provided RNG.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.spawn_tiles(1, rng).0
    }

    /// Convenience: like `with_random_tile` but uses thread-local RNG.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::EMPTY.with_random_tile_thread();
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    #[inline]
    pub fn with_random_tile_thread(self) -> Self {
        let mut rng = rand::thread_rng();
        self.with_random_tile(&mut rng)
    }

    /// Perform a move then insert a random tile if the move changed the
    /// board, using the provided RNG.
    ///
    /// ```
    /// use twenty48_core::engine::{self as GameEngine, Board, Move};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// GameEngine::new();
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// let _b1 = b0.make_move(Move::Up, &mut rng);
    /// ```
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, direction: Move, rng: &mut R) -> Self {
        let moved = self.shift(direction);
        if moved != self {
            moved.with_random_tile(rng)
        } else {
            self
        }
    }

    /// Return true if no legal move remains: every cell is occupied and no
    /// two orthogonally adjacent cells hold equal values.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// // Any empty cell means the game continues.
    /// assert!(!Board::from_raw(0x1000_0000_0000_0000).is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool {
        is_game_over(self)
    }

    /// Return the highest tile value (e.g., 2048) present, or 0 when empty.
    #[inline]
    pub fn highest_tile(self) -> u16 {
        get_highest_tile_val(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        count_empty(self)
    }

    /// Get the actual value at index (0 if empty, else 2^exponent).
    ///
    /// Index runs 0..16 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u16 {
        get_tile_val(self, idx)
    }

    /// Snapshot the board as rows of actual tile values, for renderers and
    /// other collaborators that want plain data.
    pub fn rows(self) -> [[u16; 4]; 4] {
        let mut out = [[0u16; 4]; 4];
        for idx in 0..16 {
            out[idx / 4][idx % 4] = get_tile_val(self, idx);
        }
        out
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board: Vec<_> = to_vec(*self).iter().map(format_val).collect();
        write!(
            f,
            "\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n--------------------------------\n{}|{}|{}|{}\n",
            board[0], board[1], board[2], board[3],
            board[4], board[5], board[6], board[7],
            board[8], board[9], board[10], board[11],
            board[12], board[13], board[14], board[15]
        )
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

/// Initialize internal lookup tables on first use. Safe to call multiple times.
pub fn new() {
    STORES.get_or_init(create_stores);
}

/// Slide/merge tiles in the given direction. No outcome bookkeeping.
pub fn shift(board: Board, direction: Move) -> Board {
    match direction {
        Move::Left | Move::Right => shift_rows(board, direction),
        Move::Up | Move::Down => shift_cols(board, direction),
    }
}

/// Slide/merge tiles in the given direction, reporting the full outcome.
///
/// One line algorithm serves all four directions; only the packing (rows vs
/// transposed columns) and the `Move::cell` coordinate transform differ.
pub fn slide(board: Board, direction: Move) -> SlideOutcome {
    let s = stores();
    let mut score_delta = 0;
    let mut merged = Vec::new();
    let raw = board.0;

    let new = match direction {
        Move::Left | Move::Right => {
            let (table, masks) = match direction {
                Move::Left => (&s.shift_left, &s.merge_fwd),
                _ => (&s.shift_right, &s.merge_rev),
            };
            let mut acc = 0;
            for row_idx in 0..4 {
                let row_val = extract_line(raw, row_idx) as u16;
                score_delta += get_score_entry(&s.merge_score, row_val);
                push_merged(&mut merged, get_mask_entry(masks, row_val), direction, row_idx as usize);
                acc |= get_line_entry(table, row_val) << (48 - (16 * row_idx));
            }
            acc
        }
        Move::Up | Move::Down => {
            let transpose_board = transpose(raw);
            let (table, masks) = match direction {
                Move::Up => (&s.shift_up, &s.merge_fwd),
                _ => (&s.shift_down, &s.merge_rev),
            };
            let mut acc = 0;
            for col_idx in 0..4 {
                let col_val = extract_line(transpose_board, col_idx) as u16;
                score_delta += get_score_entry(&s.merge_score, col_val);
                push_merged(&mut merged, get_mask_entry(masks, col_val), direction, col_idx as usize);
                acc |= get_line_entry(table, col_val) << (12 - (4 * col_idx));
            }
            acc
        }
    };

    SlideOutcome {
        board: Board(new),
        changed: new != raw,
        score_delta,
        merged,
    }
}

fn push_merged(out: &mut Vec<(usize, usize)>, mask: u8, direction: Move, line_idx: usize) {
    for travel in 0..4 {
        if mask & (1 << travel) != 0 {
            out.push(direction.cell(travel, line_idx));
        }
    }
}

/// Place up to `count` random tiles on uniformly chosen empty cells, without
/// replacement within this call. Stops silently once no empty cell remains.
pub fn spawn_tiles<R: Rng + ?Sized>(board: Board, count: usize, rng: &mut R) -> (Board, Vec<Spawn>) {
    let mut raw = board.0;
    let mut empties: Vec<usize> = (0..16)
        .filter(|&idx| (raw >> ((15 - idx) * 4)) & 0xf == 0)
        .collect();
    let mut spawns = Vec::new();
    for _ in 0..count {
        if empties.is_empty() {
            break;
        }
        let pick = rng.gen_range(0..empties.len());
        let idx = empties.swap_remove(pick);
        let tile = generate_random_tile(rng);
        raw |= tile << ((15 - idx) * 4);
        spawns.push(Spawn {
            row: idx / 4,
            col: idx % 4,
            value: 2_u16.pow(tile as u32),
        });
    }
    (Board(raw), spawns)
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        1
    } else {
        2
    }
}

/// True if the board is full and no orthogonally adjacent pair of cells holds
/// equal values. Both axes are swept: rows directly, columns via transpose.
pub fn is_game_over(board: Board) -> bool {
    if count_empty(board) != 0 {
        return false;
    }
    !has_equal_neighbors(board.0) && !has_equal_neighbors(transpose(board.0))
}

/// Scan every row for two horizontally adjacent equal nibbles.
/// Assumes a full board; a zero nibble would read as a matching empty pair.
fn has_equal_neighbors(raw: BoardRaw) -> bool {
    (0..4).any(|line_idx| {
        let line = extract_line(raw, line_idx);
        let x = line ^ (line >> 4);
        (x & 0x000f) == 0 || (x & 0x00f0) == 0 || (x & 0x0f00) == 0
    })
}

// Credit to Nneonneo
fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub fn get_tile_val(board: Board, idx: usize) -> u16 {
    let raw_val = (board.0 >> (60 - (4 * idx))) & 0xf;
    if raw_val == 0 {
        0
    } else {
        2_u16.pow(raw_val as u32)
    }
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

/// Return the highest tile value present on the board, or 0 when empty.
pub fn get_highest_tile_val(board: Board) -> u16 {
    let max_exp = (0..16)
        .map(|idx| extract_tile(board, idx))
        .max()
        .unwrap_or(0);
    if max_exp == 0 {
        0
    } else {
        2_u16.pow(max_exp as u32)
    }
}

fn extract_tile(board: Board, idx: usize) -> Tile {
    (board.0 >> ((15 - idx) * 4)) & 0xf
}

static STORES: OnceLock<Stores> = OnceLock::new();

fn create_stores() -> Stores {
    // Allocate on the heap to avoid large stack frames
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut merge_score = vec![0u64; LINE_TABLE_SIZE];
    let mut merge_fwd = vec![0u8; LINE_TABLE_SIZE];
    let mut merge_rev = vec![0u8; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let tiles = line_tiles(val as Line);
        let (fwd, fwd_score, fwd_mask) = merge_line_fwd(tiles);
        let (rev, rev_score, rev_mask) = merge_line_rev(tiles);
        // A run of k equal tiles yields floor(k/2) merges from either end.
        debug_assert_eq!(fwd_score, rev_score);

        shift_left[val] = pack_row(fwd);
        shift_right[val] = pack_row(rev);
        shift_up[val] = pack_col(fwd);
        shift_down[val] = pack_col(rev);
        merge_score[val] = fwd_score;
        merge_fwd[val] = fwd_mask;
        merge_rev[val] = rev_mask;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        merge_score: merge_score.into_boxed_slice(),
        merge_fwd: merge_fwd.into_boxed_slice(),
        merge_rev: merge_rev.into_boxed_slice(),
    }
}

#[inline(always)]
fn stores() -> &'static Stores {
    STORES
        .get()
        .expect("Engine stores not initialized; call engine::new() first")
}

#[inline(always)]
fn get_line_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

#[inline(always)]
fn get_score_entry(table: &[Score], idx: u16) -> Score {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

#[inline(always)]
fn get_mask_entry(table: &[u8], idx: u16) -> u8 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}

fn line_tiles(line: Line) -> [Tile; 4] {
    [
        (line >> 12) & 0xf,
        (line >> 8) & 0xf,
        (line >> 4) & 0xf,
        line & 0xf,
    ]
}

fn pack_row(tiles: [Tile; 4]) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn pack_col(tiles: [Tile; 4]) -> u64 {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

/// Compact non-zero tiles toward index 0 and merge equal neighbors in a
/// single pass, at most once per output slot: a tile produced by a merge
/// never merges again within the same move.
///
/// Returns the output slots, the score produced (sum of new merged values),
/// and a bitmask of the slots holding merged tiles.
fn merge_line_fwd(tiles: [Tile; 4]) -> ([Tile; 4], Score, u8) {
    let mut out = [0u64; 4];
    let mut mask = 0u8;
    let mut score = 0;
    let mut len = 0usize;
    for tile in tiles.into_iter().filter(|&t| t != 0) {
        if len > 0 && out[len - 1] == tile && mask & (1 << (len - 1)) == 0 {
            let exp = (tile + 1).min(15); // nibble representation caps at 2^15
            out[len - 1] = exp;
            mask |= 1 << (len - 1);
            score += 1 << exp;
        } else {
            out[len] = tile;
            len += 1;
        }
    }
    (out, score, mask)
}

/// Same merge, travelling toward index 3. The returned mask stays in
/// travel-index space (bit 0 is the slot at index 3).
fn merge_line_rev(tiles: [Tile; 4]) -> ([Tile; 4], Score, u8) {
    let mut rev = tiles;
    rev.reverse();
    let (mut out, score, mask) = merge_line_fwd(rev);
    out.reverse();
    (out, score, mask)
}

fn shift_rows(board: Board, move_dir: Move) -> Board {
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Left => &s.shift_left,
        Move::Right => &s.shift_right,
        _ => panic!("Trying to move up or down in shift rows"),
    };
    let res = (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = get_line_entry(table, row_val);
        new_board | (new_row_val << (48 - (16 * row_idx)))
    });
    Board(res)
}

fn shift_cols(board: Board, move_dir: Move) -> Board {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Up => &s.shift_up,
        Move::Down => &s.shift_down,
        _ => panic!("Trying to move left or right in shift cols"),
    };
    let res = (0..4).fold(0, |new_board, col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = get_line_entry(table, col_val);
        new_board | (new_col_val << (12 - (4 * col_idx)))
    });
    Board(res)
}

fn to_vec(board: Board) -> Vec<u8> {
    (0..16).fold(Vec::new(), |mut vec, idx| {
        vec.push(extract_tile(board, idx) as u8);
        vec
    })
}

fn format_val(val: &u8) -> String {
    match val {
        0 => String::from("       "),
        &x => {
            let mut x = (2_i32.pow(x as u32)).to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board_from_exps(exps: [[u64; 4]; 4]) -> Board {
        let mut raw = 0u64;
        for row in exps {
            for exp in row {
                raw = (raw << 4) | exp;
            }
        }
        Board::from_raw(raw)
    }

    fn nonzero_count(board: Board) -> usize {
        (0..16).filter(|&idx| extract_tile(board, idx) != 0).count()
    }

    #[test]
    fn it_merge_line_fwd() {
        assert_eq!(merge_line_fwd([0, 0, 0, 0]), ([0, 0, 0, 0], 0, 0));
        assert_eq!(merge_line_fwd([1, 2, 1, 2]), ([1, 2, 1, 2], 0, 0));
        assert_eq!(merge_line_fwd([1, 1, 2, 2]), ([2, 3, 0, 0], 4 + 8, 0b11));
        assert_eq!(merge_line_fwd([1, 0, 0, 1]), ([2, 0, 0, 0], 4, 0b1));
        // A tile produced by a merge never merges again in the same pass.
        assert_eq!(merge_line_fwd([1, 1, 2, 0]), ([2, 2, 0, 0], 4, 0b01));
        assert_eq!(merge_line_fwd([1, 1, 1, 1]), ([2, 2, 0, 0], 8, 0b11));
        assert_eq!(merge_line_fwd([1, 1, 1, 0]), ([2, 1, 0, 0], 4, 0b01));
    }

    #[test]
    fn it_merge_line_rev() {
        assert_eq!(merge_line_rev([0, 0, 0, 0]), ([0, 0, 0, 0], 0, 0));
        assert_eq!(merge_line_rev([1, 2, 1, 2]), ([1, 2, 1, 2], 0, 0));
        assert_eq!(merge_line_rev([1, 1, 2, 2]), ([0, 0, 2, 3], 12, 0b11));
        assert_eq!(merge_line_rev([5, 0, 0, 5]), ([0, 0, 0, 6], 64, 0b1));
        assert_eq!(merge_line_rev([0, 1, 1, 1]), ([0, 0, 1, 2], 4, 0b01));
    }

    #[test]
    fn test_shift_left() {
        new();
        assert_eq!(shift(Board::from_raw(0x0000), Move::Left), Board::from_raw(0x0000));
        assert_eq!(shift(Board::from_raw(0x0002), Move::Left), Board::from_raw(0x2000));
        assert_eq!(shift(Board::from_raw(0x2020), Move::Left), Board::from_raw(0x3000));
        assert_eq!(shift(Board::from_raw(0x1332), Move::Left), Board::from_raw(0x1420));
        assert_eq!(shift(Board::from_raw(0x1234), Move::Left), Board::from_raw(0x1234));
        assert_eq!(shift(Board::from_raw(0x1002), Move::Left), Board::from_raw(0x1200));
        assert_ne!(shift(Board::from_raw(0x1210), Move::Left), Board::from_raw(0x2200));
    }

    #[test]
    fn test_shift_right() {
        new();
        assert_eq!(shift(Board::from_raw(0x0000), Move::Right), Board::from_raw(0x0000));
        assert_eq!(shift(Board::from_raw(0x2000), Move::Right), Board::from_raw(0x0002));
        assert_eq!(shift(Board::from_raw(0x2020), Move::Right), Board::from_raw(0x0003));
        assert_eq!(shift(Board::from_raw(0x1332), Move::Right), Board::from_raw(0x0142));
        assert_eq!(shift(Board::from_raw(0x1234), Move::Right), Board::from_raw(0x1234));
        assert_eq!(shift(Board::from_raw(0x1002), Move::Right), Board::from_raw(0x0012));
    }

    #[test]
    fn test_move_left() {
        new();
        let game = Board::from_raw(0x1234133220021002);
        let game = shift(game, Move::Left);
        assert_eq!(game, Board::from_raw(0x1234142030001200));
    }

    #[test]
    fn test_move_up() {
        new();
        let game = Board::from_raw(0x1121230033004222);
        let game = shift(game, Move::Up);
        assert_eq!(game, Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        new();
        let game = Board::from_raw(0x1234133220021002);
        let game = shift(game, Move::Right);
        assert_eq!(game, Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        new();
        let game = Board::from_raw(0x1121230033004222);
        let game = shift(game, Move::Down);
        assert_eq!(game, Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn slide_reports_scenario_row_left() {
        new();
        // Top row [2, 0, 2, 4]: slides to [4, 4, 0, 0], merge lands at (0,0).
        let board = board_from_exps([[1, 0, 1, 2], [0; 4], [0; 4], [0; 4]]);
        let out = slide(board, Move::Left);
        assert!(out.changed);
        assert_eq!(out.score_delta, 4);
        assert_eq!(out.merged, vec![(0, 0)]);
        assert_eq!(out.board, board_from_exps([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn slide_reports_scenario_row_right() {
        new();
        // Top row [2, 2, 2, 2] slid right: [0, 0, 4, 4], rightmost pair first.
        let board = board_from_exps([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
        let out = slide(board, Move::Right);
        assert!(out.changed);
        assert_eq!(out.score_delta, 8);
        assert_eq!(out.merged, vec![(0, 3), (0, 2)]);
        assert_eq!(out.board, board_from_exps([[0, 0, 2, 2], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn slide_scores_both_merges() {
        new();
        // [2, 2, 4, 4] -> [4, 8, 0, 0], delta 4 + 8.
        let board = board_from_exps([[1, 1, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let out = slide(board, Move::Left);
        assert_eq!(out.score_delta, 12);
        assert_eq!(out.merged, vec![(0, 0), (0, 1)]);
        assert_eq!(out.board, board_from_exps([[2, 3, 0, 0], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn slide_reports_column_merges() {
        new();
        // Column 0 holds [2, 0, 2, 4] top to bottom; sliding down merges the
        // pair of 2s into a 4 landing at row 2, above the slid 4.
        let board = board_from_exps([[1, 0, 0, 0], [0; 4], [1, 0, 0, 0], [2, 0, 0, 0]]);
        let out = slide(board, Move::Down);
        assert!(out.changed);
        assert_eq!(out.score_delta, 4);
        assert_eq!(out.merged, vec![(2, 0)]);
        assert_eq!(
            out.board,
            board_from_exps([[0; 4], [0; 4], [2, 0, 0, 0], [2, 0, 0, 0]])
        );
    }

    #[test]
    fn slide_unchanged_is_inert() {
        new();
        let board = board_from_exps([[1, 2, 3, 4], [0; 4], [0; 4], [0; 4]]);
        let out = slide(board, Move::Left);
        assert!(!out.changed);
        assert_eq!(out.board, board);
        assert_eq!(out.score_delta, 0);
        assert!(out.merged.is_empty());
    }

    #[test]
    fn slide_twice_is_idempotent_without_merges() {
        new();
        // Compaction is idempotent: once tiles are packed toward the wall and
        // nothing merged, repeating the direction is a no-op.
        let board = board_from_exps([[1, 0, 2, 0], [0, 3, 0, 4], [0; 4], [0; 4]]);
        let first = slide(board, Move::Left);
        assert!(first.changed);
        assert!(first.merged.is_empty());
        let second = slide(first.board, Move::Left);
        assert!(!second.changed);
        assert_eq!(second.board, first.board);
        assert_eq!(second.score_delta, 0);
    }

    #[test]
    fn slide_matches_shift_in_all_directions() {
        new();
        let mut rng = StdRng::seed_from_u64(17);
        let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        for step in 0..200 {
            let dir = Move::ALL[step % 4];
            let out = slide(board, dir);
            assert_eq!(out.board, shift(board, dir));
            assert_eq!(out.changed, out.board != board);
            board = if out.changed {
                out.board.with_random_tile(&mut rng)
            } else {
                board
            };
        }
    }

    #[test]
    fn slide_conserves_tiles_minus_merges() {
        new();
        let mut rng = StdRng::seed_from_u64(23);
        let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        for step in 0..200 {
            let dir = Move::ALL[(step * 7 + 1) % 4];
            let before = nonzero_count(board);
            let out = slide(board, dir);
            assert_eq!(nonzero_count(out.board), before - out.merged.len());
            board = if out.changed {
                out.board.with_random_tile(&mut rng)
            } else {
                board
            };
        }
    }

    #[test]
    fn slide_direction_symmetry() {
        new();
        // Up on a board equals Left on its transpose, with coordinates
        // swapped; the four directions are one algorithm under transform.
        let board = Board::from_raw(0x1121230033004222);
        let up = slide(board, Move::Up);
        let left = slide(Board::from_raw(transpose(board.0)), Move::Left);
        assert_eq!(up.board.0, transpose(left.board.0));
        assert_eq!(up.score_delta, left.score_delta);
        let swapped: Vec<_> = left.merged.iter().map(|&(r, c)| (c, r)).collect();
        assert_eq!(up.merged, swapped);
    }

    #[test]
    fn it_spawn_on_empty_board() {
        let mut rng = StdRng::seed_from_u64(5);
        let (board, spawns) = spawn_tiles(Board::EMPTY, 2, &mut rng);
        assert_eq!(spawns.len(), 2);
        assert_eq!(count_empty(board), 14);
        assert_ne!((spawns[0].row, spawns[0].col), (spawns[1].row, spawns[1].col));
        for s in &spawns {
            assert!(s.value == 2 || s.value == 4);
            assert_eq!(board.tile_value(s.row * 4 + s.col), s.value);
        }
    }

    #[test]
    fn it_spawn_exhausts_then_noops() {
        let mut rng = StdRng::seed_from_u64(9);
        let (board, spawns) = spawn_tiles(Board::EMPTY, 20, &mut rng);
        assert_eq!(spawns.len(), 16);
        assert_eq!(count_empty(board), 0);
        let (same, none) = spawn_tiles(board, 1, &mut rng);
        assert_eq!(same, board);
        assert!(none.is_empty());
    }

    #[test]
    fn it_spawn_distribution_is_ninety_ten() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut twos = 0;
        let mut fours = 0;
        for _ in 0..500 {
            let (_, spawns) = spawn_tiles(Board::EMPTY, 1, &mut rng);
            match spawns[0].value {
                2 => twos += 1,
                4 => fours += 1,
                v => panic!("unexpected spawn value {v}"),
            }
        }
        assert!(twos > fours);
        assert!(fours > 0);
    }

    #[test]
    fn game_over_needs_full_board() {
        assert!(!is_game_over(Board::EMPTY));
        assert!(!is_game_over(Board::from_raw(0x1000_0000_0000_0000)));
        // Full minus one cell, otherwise unmergeable.
        let board = board_from_exps([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 0]]);
        assert!(!is_game_over(board));
    }

    #[test]
    fn game_over_on_full_unmergeable_board() {
        let board = board_from_exps([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]]);
        assert!(is_game_over(board));
    }

    #[test]
    fn full_board_with_horizontal_pair_continues() {
        let board = board_from_exps([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 3, 3]]);
        assert!(!is_game_over(board));
    }

    #[test]
    fn full_board_with_vertical_pair_continues() {
        let board = board_from_exps([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 3], [2, 1, 2, 3]]);
        assert!(!is_game_over(board));
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(count_empty(game), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(count_empty(game), 14);
    }

    #[test]
    fn it_get_tile_val() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(get_tile_val(game, 0), 0);
        assert_eq!(get_tile_val(game, 3), 8);
        assert_eq!(get_tile_val(game, 10), 1024);
        assert_eq!(get_tile_val(game, 15), 32768);
    }

    #[test]
    fn it_highest_tile() {
        assert_eq!(get_highest_tile_val(Board::EMPTY), 0);
        assert_eq!(get_highest_tile_val(Board::from_raw(0x1134000000000000)), 16);
    }

    #[test]
    fn it_rows_snapshot() {
        let board = board_from_exps([[1, 0, 1, 2], [0; 4], [0; 4], [0, 0, 0, 5]]);
        let rows = board.rows();
        assert_eq!(rows[0], [2, 0, 2, 4]);
        assert_eq!(rows[1], [0, 0, 0, 0]);
        assert_eq!(rows[3], [0, 0, 0, 32]);
    }

    #[test]
    fn move_cell_transform() {
        assert_eq!(Move::Up.cell(1, 2), (1, 2));
        assert_eq!(Move::Down.cell(1, 2), (2, 2));
        assert_eq!(Move::Left.cell(1, 2), (2, 1));
        assert_eq!(Move::Right.cell(1, 2), (2, 2));
    }
}
