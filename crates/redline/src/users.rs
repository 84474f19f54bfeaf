//! Simulated user registry.
//!
//! A session holds a small set of users who take turns authoring
//! suggestions.  Each user gets a sequential display name and a random
//! mid-saturation HSL color that doubles as the author color on their
//! suggestion spans.

use rand::Rng;
use redline_core::Author;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_USER_COLOR, ID_SUFFIX_LEN, MAX_USERS};
use crate::id::{base36_suffix, unix_millis};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl User {
    /// The provenance value stamped onto this user's suggestion spans.
    pub fn author(&self) -> Author {
        Author::new(self.id.clone(), self.color.clone())
    }
}

/// A random `hsl(h, 60%, 48%)` author color.
pub fn random_color() -> String {
    let hue: u16 = rand::thread_rng().gen_range(0..360);
    format!("hsl({hue}, 60%, 48%)")
}

/// Initials for an avatar badge: first letters of up to two words,
/// skipping purely numeric words, uppercased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

fn display_name(index: usize) -> String {
    format!("User {}", index + 1)
}

/// Session-scoped user set, seeded with one default user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRegistry {
    pub fn new() -> Self {
        Self { users: vec![Self::default_user()] }
    }

    pub fn default_user() -> User {
        User {
            id: "user-default".to_string(),
            name: display_name(0),
            color: DEFAULT_USER_COLOR.to_string(),
        }
    }

    /// Add another user, up to [`MAX_USERS`].  Returns `None` when the
    /// session is full.
    pub fn create_user(&mut self) -> Option<&User> {
        if self.users.len() >= MAX_USERS {
            return None;
        }
        let user = User {
            id: format!("user-{}-{}", unix_millis(), base36_suffix(ID_SUFFIX_LEN)),
            name: display_name(self.users.len()),
            color: random_color(),
        };
        self.users.push(user);
        self.users.last()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_with_the_default_user() {
        let reg = UserRegistry::new();
        assert_eq!(reg.users().len(), 1);
        assert_eq!(reg.users()[0].id, "user-default");
        assert_eq!(reg.users()[0].name, "User 1");
    }

    #[test]
    fn users_get_sequential_names_up_to_the_cap() {
        let mut reg = UserRegistry::new();
        for expected in ["User 2", "User 3", "User 4", "User 5"] {
            let user = reg.create_user().unwrap();
            assert_eq!(user.name, expected);
        }
        assert!(reg.create_user().is_none());
        assert_eq!(reg.users().len(), MAX_USERS);
    }

    #[test]
    fn created_user_ids_are_distinct_and_findable() {
        let mut reg = UserRegistry::new();
        let id = reg.create_user().unwrap().id.clone();
        assert_ne!(id, "user-default");
        assert!(reg.get(&id).is_some());
        assert!(reg.get("user-nope").is_none());
    }

    #[test]
    fn colors_are_mid_saturation_hsl() {
        let color = random_color();
        assert!(color.starts_with("hsl("));
        assert!(color.ends_with(", 60%, 48%)"));
    }

    #[test]
    fn initials_skip_numbers_and_cap_at_two() {
        assert_eq!(initials("User 1"), "U");
        assert_eq!(initials("ada lovelace"), "AL");
        assert_eq!(initials("Ada Byron Lovelace"), "AB");
        assert_eq!(initials("42"), "");
        assert_eq!(initials("  "), "");
    }
}
