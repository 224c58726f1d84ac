//! In-memory registry of books and users
//!
//! The registry is the sole mutation surface: the console and the
//! persistence layer both go through it. Books and users live in
//! insertion-ordered maps so the catalog displays in the order entries
//! were added; the genre set is derived and always equals the set of
//! genres among currently registered books.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, user::User},
};

/// Optional field edits applied through [`Registry::update_book`]
#[derive(Debug, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub available_copies: Option<i64>,
}

#[derive(Debug, Default)]
pub struct Registry {
    books: IndexMap<String, Book>,
    users: IndexMap<String, User>,
    genres: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // Catalog

    pub fn add_book(&mut self, book: Book) -> AppResult<()> {
        if self.books.contains_key(book.id()) {
            return Err(AppError::AlreadyExists(format!("book {}", book.id())));
        }
        tracing::debug!(id = %book.id(), title = %book.title(), "book added");
        self.genres.insert(book.genre().to_string());
        self.books.insert(book.id().to_string(), book);
        Ok(())
    }

    /// Remove a book and scrub it from every user's lists
    ///
    /// No copies are restored: the book itself is gone.
    pub fn remove_book(&mut self, book_id: &str) -> AppResult<()> {
        let book = self
            .books
            .shift_remove(book_id)
            .ok_or_else(|| AppError::NotFound(format!("book {book_id}")))?;
        self.prune_genre(book.genre());
        for user in self.users.values_mut() {
            user.scrub_book(book_id);
        }
        tracing::debug!(id = %book_id, "book removed");
        Ok(())
    }

    /// Apply field edits, keeping the genre set consistent
    ///
    /// The copy count is validated before anything is touched, so a bad
    /// update leaves the book unchanged.
    pub fn update_book(&mut self, book_id: &str, update: BookUpdate) -> AppResult<()> {
        if let Some(copies) = update.available_copies {
            Book::validate_copies(copies)?;
        }
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| AppError::NotFound(format!("book {book_id}")))?;

        if let Some(title) = update.title {
            book.set_title(title);
        }
        if let Some(author) = update.author {
            book.set_author(author);
        }
        if let Some(copies) = update.available_copies {
            book.set_available_copies(copies)?;
        }
        if let Some(genre) = update.genre {
            let old_genre = book.genre().to_string();
            book.set_genre(genre.clone());
            self.genres.insert(genre);
            self.prune_genre(&old_genre);
        }
        Ok(())
    }

    /// Drop a genre from the set when no registered book has it anymore
    fn prune_genre(&mut self, genre: &str) {
        if !self.books.values().any(|book| book.genre() == genre) {
            self.genres.remove(genre);
        }
    }

    pub fn find_book(&self, book_id: &str) -> Option<&Book> {
        self.books.get(book_id)
    }

    pub fn has_book(&self, book_id: &str) -> bool {
        self.books.contains_key(book_id)
    }

    /// Books in insertion order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Distinct genres among currently registered books
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(String::as_str)
    }

    // Patrons

    pub fn add_user(&mut self, user: User) -> AppResult<()> {
        if self.users.contains_key(user.id()) {
            return Err(AppError::AlreadyExists(format!("user {}", user.id())));
        }
        tracing::debug!(id = %user.id(), role = %user.role(), "user added");
        self.users.insert(user.id().to_string(), user);
        Ok(())
    }

    /// Remove a user, restoring one copy for each book they held
    pub fn remove_user(&mut self, user_id: &str) -> AppResult<()> {
        let user = self
            .users
            .shift_remove(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        for book_id in user.borrowed() {
            match self.books.get_mut(book_id) {
                Some(book) => book.increase_copies(),
                // Should not happen, but a stray id must not abort the removal
                None => tracing::warn!(
                    user = %user_id,
                    book = %book_id,
                    "borrowed book missing while removing user"
                ),
            }
        }
        tracing::debug!(id = %user_id, "user removed");
        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Users in insertion order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // Lending
    //
    // Each (user, book) pair moves Available -> Borrowed -> History, and
    // History is absorbing: once a user has returned a book they can never
    // borrow it again. That one-shot policy is deliberate product behavior,
    // not a bug.

    pub fn borrow_book(&mut self, user_id: &str, book_id: &str) -> AppResult<()> {
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| AppError::NotFound(format!("book {book_id}")))?;
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        if user.has_borrowed(book_id) {
            return Err(AppError::InvalidState(
                "you already borrowed this book".to_string(),
            ));
        }
        if user.has_returned(book_id) {
            return Err(AppError::InvalidState(
                "you can't borrow a book twice".to_string(),
            ));
        }
        book.decrease_copies()?;
        user.record_borrow(book_id);
        tracing::debug!(user = %user_id, book = %book_id, "book borrowed");
        Ok(())
    }

    pub fn return_book(&mut self, user_id: &str, book_id: &str) -> AppResult<()> {
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| AppError::NotFound(format!("book {book_id}")))?;
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        if !user.has_borrowed(book_id) {
            return Err(AppError::InvalidState(
                "this book is not borrowed by you".to_string(),
            ));
        }
        user.move_to_history(book_id);
        book.increase_copies();
        tracing::debug!(user = %user_id, book = %book_id, "book returned");
        Ok(())
    }

    // Trusted reconstruction from storage. These bypass the lending checks
    // and report whether the row applied, so the loader can skip pairs whose
    // user or book no longer exists.

    pub(crate) fn restore_borrowed(&mut self, user_id: &str, book_id: &str) -> bool {
        if !self.books.contains_key(book_id) {
            return false;
        }
        match self.users.get_mut(user_id) {
            Some(user) => {
                user.record_borrow(book_id);
                true
            }
            None => false,
        }
    }

    pub(crate) fn restore_history(&mut self, user_id: &str, book_id: &str) -> bool {
        if !self.books.contains_key(book_id) {
            return false;
        }
        match self.users.get_mut(user_id) {
            Some(user) => {
                user.record_history(book_id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use std::collections::HashSet;

    fn book(id: &str, genre: &str, copies: i64) -> Book {
        Book::new(id, format!("Title {id}"), "Author", genre, copies).unwrap()
    }

    fn registry_with(books: &[(&str, &str, i64)], users: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for (id, genre, copies) in books {
            registry.add_book(book(id, genre, *copies)).unwrap();
        }
        for id in users {
            registry
                .add_user(User::new(*id, format!("User {id}"), Role::Regular))
                .unwrap();
        }
        registry
    }

    fn genre_projection(registry: &Registry) -> HashSet<String> {
        registry.books().map(|b| b.genre().to_string()).collect()
    }

    #[test]
    fn test_add_duplicate_book_fails() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &[]);
        let result = registry.add_book(book("b1", "Sci-Fi", 5));
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
        assert_eq!(registry.book_count(), 1);
        // the original copy count is untouched
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 1);
    }

    #[test]
    fn test_remove_missing_book_fails() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.remove_book("b1"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_borrow_decrements_copies_until_exhausted() {
        // Scenario A
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &["u1", "u2"]);

        registry.borrow_book("u1", "b1").unwrap();
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 0);

        let result = registry.borrow_book("u2", "b1");
        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert!(!registry.find_user("u2").unwrap().has_borrowed("b1"));
    }

    #[test]
    fn test_returned_book_can_never_be_borrowed_again() {
        // Scenario B. The one-shot lending ticket is deliberate: history is
        // an absorbing state, so a second borrow after a return must fail.
        // Do not "fix" this without a product decision.
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &["u1"]);

        registry.borrow_book("u1", "b1").unwrap();
        registry.return_book("u1", "b1").unwrap();
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 1);
        assert!(registry.find_user("u1").unwrap().has_returned("b1"));

        let result = registry.borrow_book("u1", "b1");
        assert!(matches!(result, Err(AppError::InvalidState(_))));
        // the failed borrow must not touch the copy count
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 1);
    }

    #[test]
    fn test_borrow_while_already_borrowed_fails() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 3)], &["u1"]);
        registry.borrow_book("u1", "b1").unwrap();
        let result = registry.borrow_book("u1", "b1");
        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 2);
    }

    #[test]
    fn test_borrow_nonexistent_book_fails() {
        let mut registry = registry_with(&[], &["u1"]);
        assert!(matches!(
            registry.borrow_book("u1", "b1"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_return_unborrowed_book_fails() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &["u1"]);
        let result = registry.return_book("u1", "b1");
        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 1);
    }

    #[test]
    fn test_genre_set_tracks_last_book_of_genre() {
        // Scenario C
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1), ("b2", "Sci-Fi", 1)], &[]);
        assert_eq!(genre_projection(&registry), collect_genres(&registry));

        registry.remove_book("b1").unwrap();
        assert!(registry.genres().any(|g| g == "Sci-Fi"));

        registry.remove_book("b2").unwrap();
        assert!(!registry.genres().any(|g| g == "Sci-Fi"));
        assert_eq!(genre_projection(&registry), collect_genres(&registry));
    }

    fn collect_genres(registry: &Registry) -> HashSet<String> {
        registry.genres().map(str::to_string).collect()
    }

    #[test]
    fn test_update_book_keeps_genre_set_consistent() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1), ("b2", "Romance", 1)], &[]);
        registry
            .update_book(
                "b1",
                BookUpdate {
                    genre: Some("Horror".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(genre_projection(&registry), collect_genres(&registry));
        assert!(!registry.genres().any(|g| g == "Sci-Fi"));
        assert!(registry.genres().any(|g| g == "Horror"));
    }

    #[test]
    fn test_update_book_rejects_negative_copies_without_side_effects() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &[]);
        let result = registry.update_book(
            "b1",
            BookUpdate {
                title: Some("New Title".to_string()),
                available_copies: Some(-2),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
        // all-or-nothing: the title edit must not have been applied
        assert_eq!(registry.find_book("b1").unwrap().title(), "Title b1");
    }

    #[test]
    fn test_remove_book_scrubs_users_without_restoring_copies() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1), ("b2", "Sci-Fi", 1)], &["u1"]);
        registry.borrow_book("u1", "b1").unwrap();
        registry.borrow_book("u1", "b2").unwrap();
        registry.return_book("u1", "b2").unwrap();

        registry.remove_book("b1").unwrap();
        registry.remove_book("b2").unwrap();

        let user = registry.find_user("u1").unwrap();
        assert!(user.borrowed().is_empty());
        assert!(user.history().is_empty());
    }

    #[test]
    fn test_remove_user_returns_held_copies() {
        // Scenario D
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &["u1"]);
        registry.borrow_book("u1", "b1").unwrap();
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 0);

        registry.remove_user("u1").unwrap();
        assert!(!registry.has_user("u1"));
        assert_eq!(registry.find_book("b1").unwrap().available_copies(), 1);
    }

    #[test]
    fn test_add_duplicate_user_fails() {
        let mut registry = registry_with(&[], &["u1"]);
        let result = registry.add_user(User::new("u1", "Other", Role::Admin));
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
        assert_eq!(registry.find_user("u1").unwrap().name(), "User u1");
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let registry = registry_with(
            &[("b3", "A", 1), ("b1", "B", 1), ("b2", "C", 1)],
            &["u2", "u1"],
        );
        let book_ids: Vec<&str> = registry.books().map(|b| b.id()).collect();
        assert_eq!(book_ids, ["b3", "b1", "b2"]);
        let user_ids: Vec<&str> = registry.users().map(|u| u.id()).collect();
        assert_eq!(user_ids, ["u2", "u1"]);
    }

    #[test]
    fn test_restore_skips_missing_user_or_book() {
        let mut registry = registry_with(&[("b1", "Sci-Fi", 1)], &["u1"]);
        assert!(!registry.restore_borrowed("ghost", "b1"));
        assert!(!registry.restore_borrowed("u1", "ghost"));
        assert!(registry.restore_borrowed("u1", "b1"));
        assert!(registry.find_user("u1").unwrap().has_borrowed("b1"));
    }
}
