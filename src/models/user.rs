//! User model and related types

use std::collections::HashSet;

use crate::search::Identifiable;

/// User role, serialized as a string tag in the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Regular => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Role {
    /// Unknown role strings load as regular users
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Regular
        }
    }
}

/// A patron with per-book lending state
///
/// `borrowed` and `history` keep insertion order for display; the companion
/// id-sets give O(1) membership checks. A book id is never in both at once,
/// and an id that reached `history` stays there.
#[derive(Debug, Clone)]
pub struct User {
    id: String,
    name: String,
    role: Role,
    borrowed: Vec<String>,
    borrowed_ids: HashSet<String>,
    history: Vec<String>,
    history_ids: HashSet<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            borrowed: Vec::new(),
            borrowed_ids: HashSet::new(),
            history: Vec::new(),
            history_ids: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Book ids currently checked out, in borrow order
    pub fn borrowed(&self) -> &[String] {
        &self.borrowed
    }

    /// Book ids ever returned, in return order
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn has_borrowed(&self, book_id: &str) -> bool {
        self.borrowed_ids.contains(book_id)
    }

    pub fn has_returned(&self, book_id: &str) -> bool {
        self.history_ids.contains(book_id)
    }

    /// Append to the borrowed list; duplicates are ignored
    pub(crate) fn record_borrow(&mut self, book_id: &str) {
        if self.borrowed_ids.insert(book_id.to_string()) {
            self.borrowed.push(book_id.to_string());
        }
    }

    /// Append straight to history, used when reloading trusted state
    pub(crate) fn record_history(&mut self, book_id: &str) {
        if self.history_ids.insert(book_id.to_string()) {
            self.history.push(book_id.to_string());
        }
    }

    /// Move a book from borrowed to history on return
    pub(crate) fn move_to_history(&mut self, book_id: &str) {
        if self.borrowed_ids.remove(book_id) {
            self.borrowed.retain(|id| id != book_id);
        }
        self.record_history(book_id);
    }

    /// Drop a book from both lists, used when the book is deleted
    pub(crate) fn scrub_book(&mut self, book_id: &str) {
        if self.borrowed_ids.remove(book_id) {
            self.borrowed.retain(|id| id != book_id);
        }
        if self.history_ids.remove(book_id) {
            self.history.retain(|id| id != book_id);
        }
    }
}

impl Identifiable for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from("user"), Role::Regular);
        assert_eq!(Role::from("whatever"), Role::Regular);
    }

    #[test]
    fn test_borrow_then_return_membership() {
        let mut user = User::new("u1", "Ada", Role::Regular);
        user.record_borrow("b1");
        assert!(user.has_borrowed("b1"));
        assert!(!user.has_returned("b1"));

        user.move_to_history("b1");
        assert!(!user.has_borrowed("b1"));
        assert!(user.has_returned("b1"));
        assert_eq!(user.history(), ["b1"]);
    }

    #[test]
    fn test_duplicate_borrow_recorded_once() {
        let mut user = User::new("u1", "Ada", Role::Regular);
        user.record_borrow("b1");
        user.record_borrow("b1");
        assert_eq!(user.borrowed(), ["b1"]);
    }

    #[test]
    fn test_scrub_removes_from_both_lists() {
        let mut user = User::new("u1", "Ada", Role::Regular);
        user.record_borrow("b1");
        user.record_history("b2");
        user.scrub_book("b1");
        user.scrub_book("b2");
        assert!(user.borrowed().is_empty());
        assert!(user.history().is_empty());
    }

    #[test]
    fn test_lists_keep_insertion_order() {
        let mut user = User::new("u1", "Ada", Role::Regular);
        user.record_borrow("b2");
        user.record_borrow("b1");
        user.record_borrow("b3");
        assert_eq!(user.borrowed(), ["b2", "b1", "b3"]);
    }
}
