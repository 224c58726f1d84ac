//! Book entity

use crate::error::{AppError, AppResult};
use crate::search::Identifiable;

/// A catalog entry with a stable id and a non-negative copy count
///
/// The copy count is an `i64` to match the relational column; every
/// constructor and setter rejects negative values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: String,
    title: String,
    author: String,
    genre: String,
    available_copies: i64,
}

impl Book {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        available_copies: i64,
    ) -> AppResult<Self> {
        Self::validate_copies(available_copies)?;
        Ok(Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            available_copies,
        })
    }

    pub(crate) fn validate_copies(copies: i64) -> AppResult<()> {
        if copies < 0 {
            return Err(AppError::Validation(
                "available copies cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn available_copies(&self) -> i64 {
        self.available_copies
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub(crate) fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
    }

    pub fn set_available_copies(&mut self, copies: i64) -> AppResult<()> {
        Self::validate_copies(copies)?;
        self.available_copies = copies;
        Ok(())
    }

    /// One copy came back on a return or a cascade
    pub fn increase_copies(&mut self) {
        self.available_copies += 1;
    }

    /// One copy went out on a borrow; fails at zero rather than going negative
    pub fn decrease_copies(&mut self) -> AppResult<()> {
        if self.available_copies == 0 {
            return Err(AppError::InvalidState(
                "there are no available copies".to_string(),
            ));
        }
        self.available_copies -= 1;
        Ok(())
    }
}

impl Identifiable for Book {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_copies() {
        let result = Book::new("b1", "Dune", "Frank Herbert", "Sci-Fi", -1);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_set_copies_rejects_negative() {
        let mut book = Book::new("b1", "Dune", "Frank Herbert", "Sci-Fi", 2).unwrap();
        assert!(book.set_available_copies(-3).is_err());
        assert_eq!(book.available_copies(), 2);
    }

    #[test]
    fn test_decrease_at_zero_fails() {
        let mut book = Book::new("b1", "Dune", "Frank Herbert", "Sci-Fi", 0).unwrap();
        assert!(matches!(
            book.decrease_copies(),
            Err(AppError::InvalidState(_))
        ));
        assert_eq!(book.available_copies(), 0);
    }

    #[test]
    fn test_increase_and_decrease() {
        let mut book = Book::new("b1", "Dune", "Frank Herbert", "Sci-Fi", 1).unwrap();
        book.decrease_copies().unwrap();
        assert_eq!(book.available_copies(), 0);
        book.increase_copies();
        assert_eq!(book.available_copies(), 1);
    }
}
