//! Centralized constants for the managed account and utility exit codes.

/// Username of the managed account.
pub const TARGET_USERNAME: &str = "deck";

/// Numeric user id the managed account must carry.
pub const TARGET_UID: u32 = 1000;

/// Supplementary groups the managed account must belong to.
/// The gid next to each name is informational only and never verified.
pub const REQUIRED_GROUPS: &[(&str, u32)] = &[("wheel", 998)];

/// Comment (GECOS) written for accounts created by this tool.
pub const ACCOUNT_COMMENT: &str = "Steam Deck User";

/// Login shell for accounts created by this tool.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Directory under which canonical home directories live.
pub const DEFAULT_HOME_ROOT: &str = "/home";

/// `useradd`/`usermod`: uid already in use.
pub const EXIT_UID_IN_USE: i32 = 4;

/// `useradd`/`usermod`: account or group name already in use.
pub const EXIT_NAME_IN_USE: i32 = 9;

/// `passwd -u`: unlocking would leave the account without a password.
pub const EXIT_PASSWD_NO_PASSWORD: i32 = 3;

/// Password field marker used to temporarily lock a passwordless account.
pub const LOCKED_PASSWORD_MARKER: &str = "*";

/// Tag used when forwarding run outcomes to journald.
pub const JOURNALD_TAG: &str = "steamos-ensure-deck-user";
