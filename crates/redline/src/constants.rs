//! Review-layer constants.

use std::time::Duration;

/// How long an accepted insertion keeps its cosmetic highlight pulse.
pub const ACCEPT_FLASH: Duration = Duration::from_millis(600);

/// Upper bound on simulated users in one session.
pub const MAX_USERS: usize = 5;

/// Color of the pre-seeded default user.
pub const DEFAULT_USER_COLOR: &str = "hsl(210, 65%, 50%)";

/// Length of the random base36 suffix on suggestion and user ids.
pub const ID_SUFFIX_LEN: usize = 7;
