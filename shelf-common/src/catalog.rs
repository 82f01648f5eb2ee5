//! Flat id -> book catalog
//!
//! Books are never removed; a newer fetch of the same id replaces the
//! previous record.

use crate::models::Book;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: HashMap<String, Book>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or supersede a single book
    pub fn upsert(&mut self, book: Book) {
        self.books.insert(book.id.clone(), book);
    }

    /// Insert or supersede every book in `books`, returning how many were new
    pub fn upsert_many<I>(&mut self, books: I) -> usize
    where
        I: IntoIterator<Item = Book>,
    {
        books
            .into_iter()
            .filter(|book| self.books.insert(book.id.clone(), book.clone()).is_none())
            .count()
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
