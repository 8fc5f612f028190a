//! CLI Exit Code Registry
//!
//! Single source of truth for `twin` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad args; also clap's own code)    |
//! | 3    | Settings file unreadable or invalid             |
//! | 4    | Roster file unreadable or unsupported           |
//! | 5    | Student store unreadable or not writable        |
//! | 6    | Report export failed                            |
//! | 7    | Preference rejected (self, unknown student)     |
//! | 8    | `import --check` found pending changes          |

use twin_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_CONFIG: u8 = 3;

pub const EXIT_ROSTER: u8 = 4;

pub const EXIT_STORE: u8 = 5;

pub const EXIT_EXPORT: u8 = 6;

/// Self-preference or a student number the store does not know.
pub const EXIT_PREFERENCE: u8 = 7;

/// Like `diff(1)` for rosters: the store is behind the roster.
pub const EXIT_PENDING: u8 = 8;

/// Map an IO error to its exit code. Engine rejections always map to
/// [`EXIT_PREFERENCE`]; everything else to the caller's `fallback`.
pub fn io_exit_code(err: &IoError, fallback: u8) -> u8 {
    match err {
        IoError::Engine(_) => EXIT_PREFERENCE,
        _ => fallback,
    }
}
