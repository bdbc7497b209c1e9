//! Error types for the board/world codec and the script interpreter.

use std::io;

use thiserror::Error;

/// Errors raised while decoding or encoding board and world data.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The underlying reader or writer failed, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored board count is negative and is not the extended-count marker.
    #[error("incompatible world version (board count {0})")]
    IncompatibleVersion(i16),

    /// The RLE stream ended before every playable cell was filled.
    #[error("tile stream ended after {filled} of {expected} cells")]
    TruncatedTiles {
        /// Cells written before the stream ran out.
        filled: usize,
        /// Cells the grid requires.
        expected: usize,
    },

    /// An RLE run with a count of zero.
    #[error("zero-length tile run at cell {0}")]
    ZeroLengthRun(usize),

    /// The stored stat count is negative or above the table capacity.
    #[error("invalid stat count {0}")]
    StatCount(i16),

    /// A stat record aliases a script owned by a stat that is not decoded yet.
    #[error("stat {index} aliases the script of stat {target}")]
    BadScriptAlias {
        /// Index of the aliasing stat.
        index: usize,
        /// Index it points at.
        target: i16,
    },

    /// More boards than the world format can address.
    #[error("too many boards")]
    TooManyBoards,

    /// A script or board blob does not fit its length field.
    #[error("data too long for its length field ({0} bytes)")]
    TooLong(usize),

    /// A board id that the world does not contain.
    #[error("no board with id {0}")]
    NoSuchBoard(i16),
}

/// Errors raised by a running script. Each one halts only the offending stat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// A direction word that is not recognised.
    #[error("Bad direction")]
    BadDirection,

    /// An `ANY` condition with an unknown tile description.
    #[error("Bad object kind")]
    BadObjectKind,

    /// `#BECOME` with an unknown tile description.
    #[error("Bad #BECOME")]
    BadBecome,

    /// `#PUT` with an idle direction or an unknown tile description.
    #[error("Bad #PUT")]
    BadPut,

    /// `#CHANGE` with an unknown tile description.
    #[error("Bad #CHANGE")]
    BadChange,

    /// A command word that is neither a command nor a reachable label.
    #[error("Bad command {0}")]
    BadCommand(String),
}

/// Errors raised while loading an engine configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid configuration JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for codec operations.
pub type FormatResult<T> = Result<T, FormatError>;
