//! Default values shared across modules.

/// Prefix of the side file holding staged edits (`dir/<prefix>name.ext`).
pub const DEFAULT_STAGING_PREFIX: &str = ".temp-annotated.";

/// Command-line token meaning "the last document a mutating command touched".
pub const DEFAULT_LAST_FILE_TOKEN: &str = "@";

/// Session file recording the last touched document, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".sff-notes-session";

/// Connect and read timeout for resolver lookups, in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 20;

/// Directory under the platform config dir holding the user configuration.
pub const CONFIG_DIR_NAME: &str = "sff-notes";

/// User configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";
