//! Generic lookup over identifiable entities
//!
//! Linear scan, first match. Fine for the console's ad-hoc searches; the
//! per-user lending lists keep their own id-sets for membership checks.

/// Anything with a stable id and a display name
pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Find the first entity with the given id
pub fn find_by_id<'a, T, I>(items: I, id: &str) -> Option<&'a T>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().find(|item| item.id() == id)
}

/// Find the first entity with the given display name
pub fn find_by_name<'a, T, I>(items: I, name: &str) -> Option<&'a T>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().find(|item| item.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Book;

    fn catalog() -> Vec<Book> {
        vec![
            Book::new("b1", "Dune", "Frank Herbert", "Sci-Fi", 1).unwrap(),
            Book::new("b2", "Emma", "Jane Austen", "Romance", 2).unwrap(),
            Book::new("b3", "Dune", "Frank Herbert", "Sci-Fi", 3).unwrap(),
        ]
    }

    #[test]
    fn test_find_by_id() {
        let books = catalog();
        let hit = find_by_id(&books, "b2").unwrap();
        assert_eq!(hit.title(), "Emma");
        assert!(find_by_id(&books, "b9").is_none());
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let books = catalog();
        let hit = find_by_name(&books, "Dune").unwrap();
        assert_eq!(Identifiable::id(hit), "b1");
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let books = catalog();
        assert!(find_by_name(&books, "dune").is_none());
    }
}
