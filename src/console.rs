//! Interactive console menus
//!
//! Pure prompting and display; every state change goes through the
//! registry, and domain errors are shown to the operator as messages.

use std::io::{self, Write};

use crate::{
    models::{
        book::Book,
        user::{Role, User},
    },
    registry::{BookUpdate, Registry},
    search,
};

/// Run the welcome loop until the operator exits
pub fn run(registry: &mut Registry) -> io::Result<()> {
    loop {
        println!();
        println!("======================================");
        println!("Welcome to the Library System!");
        println!("======================================");
        println!("1. Login");
        println!("2. Exit");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => login(registry)?,
            "2" => {
                println!("Goodbye! Thanks for using the Library System.");
                return Ok(());
            }
            _ => println!("Invalid input. Please enter 1 or 2."),
        }
    }
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        // stdin closed; unwind to the caller instead of spinning
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim().to_string())
}

fn prompt_i64(message: &str) -> io::Result<i64> {
    loop {
        match prompt(message)?.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}

fn login(registry: &mut Registry) -> io::Result<()> {
    let user_id = loop {
        let id = prompt("Enter your ID (blank to cancel): ")?;
        if id.is_empty() {
            return Ok(());
        }
        match registry.find_user(&id) {
            Some(user) => {
                println!("Login successful! Welcome, {}", user.name());
                break id;
            }
            None => println!("User not found."),
        }
    };

    let is_admin = registry
        .find_user(&user_id)
        .map(User::is_admin)
        .unwrap_or(false);
    if is_admin {
        admin_menu(registry)
    } else {
        user_menu(registry, &user_id)
    }
}

// Regular user menu

fn user_menu(registry: &mut Registry, user_id: &str) -> io::Result<()> {
    loop {
        println!();
        println!("--- Regular User Menu ---");
        println!("1. View Book Catalog");
        println!("2. Borrow Book");
        println!("3. Return Book");
        println!("4. View My Borrowed Books");
        println!("5. View My Borrow History");
        println!("6. Search Catalog");
        println!("0. Logout");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => view_catalog(registry),
            "2" => borrow_book(registry, user_id)?,
            "3" => return_book(registry, user_id)?,
            "4" => view_user_books(registry, user_id, false),
            "5" => view_user_books(registry, user_id, true),
            "6" => search_catalog(registry)?,
            "0" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid option."),
        }
    }
}

fn borrow_book(registry: &mut Registry, user_id: &str) -> io::Result<()> {
    let book_id = prompt("Enter the Book ID to borrow: ")?;
    match registry.borrow_book(user_id, &book_id) {
        Ok(()) => println!("Book borrowed successfully!"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn return_book(registry: &mut Registry, user_id: &str) -> io::Result<()> {
    let book_id = prompt("Enter the Book ID to return: ")?;
    match registry.return_book(user_id, &book_id) {
        Ok(()) => println!("Book returned successfully!"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn view_user_books(registry: &Registry, user_id: &str, history: bool) {
    let Some(user) = registry.find_user(user_id) else {
        return;
    };
    let (title, ids) = if history {
        ("--- Borrow History ---", user.history())
    } else {
        ("--- Borrowed Books ---", user.borrowed())
    };

    println!();
    println!("{title}");
    println!("{:<10} | {:<25} | {:<20} | {:<15}", "ID", "Title", "Author", "Genre");
    println!("{}", "-".repeat(79));
    for id in ids {
        if let Some(book) = registry.find_book(id) {
            println!(
                "{:<10} | {:<25} | {:<20} | {:<15}",
                book.id(),
                book.title(),
                book.author(),
                book.genre()
            );
        }
    }
}

// Admin menu

fn admin_menu(registry: &mut Registry) -> io::Result<()> {
    loop {
        println!();
        println!("=== Admin Menu ===");
        println!("1. Add Book");
        println!("2. Edit Book");
        println!("3. Delete Book");
        println!("4. Register New User");
        println!("5. Remove User");
        println!("6. View All Books");
        println!("7. View All Users");
        println!("8. Search Catalog");
        println!("0. Logout");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => add_book(registry)?,
            "2" => edit_book(registry)?,
            "3" => delete_book(registry)?,
            "4" => register_user(registry)?,
            "5" => remove_user(registry)?,
            "6" => view_catalog(registry),
            "7" => view_users(registry),
            "8" => search_catalog(registry)?,
            "0" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid option. Try again."),
        }
    }
}

fn add_book(registry: &mut Registry) -> io::Result<()> {
    println!();
    println!("Add New Book:");
    let id = prompt("Enter Book ID: ")?;
    let title = prompt("Enter Title: ")?;
    let author = prompt("Enter Author: ")?;
    let genre = prompt("Enter Genre: ")?;
    let copies = prompt_i64("Enter Available Copies: ")?;

    let book = match Book::new(id, title, author, genre, copies) {
        Ok(book) => book,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };
    match registry.add_book(book) {
        Ok(()) => println!("Book added successfully!"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn edit_book(registry: &mut Registry) -> io::Result<()> {
    if registry.book_count() == 0 {
        println!("There are no books to edit.");
        return Ok(());
    }

    let book_id = prompt("Enter the ID of the book to edit: ")?;
    let Some(book) = registry.find_book(&book_id) else {
        println!("Book not found.");
        return Ok(());
    };
    println!("Editing Book: {}", book.title());

    let keep_blank = |input: String| if input.is_empty() { None } else { Some(input) };
    let title = keep_blank(prompt(&format!(
        "Enter new title (or press Enter to keep '{}'): ",
        book.title()
    ))?);
    let author = keep_blank(prompt(&format!(
        "Enter new author (or press Enter to keep '{}'): ",
        book.author()
    ))?);
    let genre = keep_blank(prompt(&format!(
        "Enter new genre (or press Enter to keep '{}'): ",
        book.genre()
    ))?);
    let copies = prompt_i64(&format!(
        "Enter new available copies (or -1 to keep '{}'): ",
        book.available_copies()
    ))?;
    let available_copies = if copies == -1 { None } else { Some(copies) };

    let update = BookUpdate {
        title,
        author,
        genre,
        available_copies,
    };
    match registry.update_book(&book_id, update) {
        Ok(()) => println!("Book updated successfully!"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn delete_book(registry: &mut Registry) -> io::Result<()> {
    if registry.book_count() == 0 {
        println!("There are no books to delete.");
        return Ok(());
    }

    let book_id = prompt("Enter the ID of the book to delete: ")?;
    match registry.remove_book(&book_id) {
        Ok(()) => println!("Book deleted successfully."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn register_user(registry: &mut Registry) -> io::Result<()> {
    let name = prompt("Enter name: ")?;
    let id = loop {
        let id = prompt("Enter ID: ")?;
        if registry.has_user(&id) {
            println!("ID already exists.");
        } else {
            break id;
        }
    };
    let role = loop {
        match prompt("Admin Role? (y/n): ")?.to_lowercase().as_str() {
            "y" => break Role::Admin,
            "n" => break Role::Regular,
            _ => continue,
        }
    };

    match registry.add_user(User::new(id, name, role)) {
        Ok(()) => println!("Registration successful!"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn remove_user(registry: &mut Registry) -> io::Result<()> {
    let user_id = prompt("Enter the ID of the user to remove: ")?;
    match registry.remove_user(&user_id) {
        Ok(()) => println!("User removed; their borrowed copies are back in the catalog."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn view_catalog(registry: &Registry) {
    println!();
    println!("--- Book Catalog ---");
    println!(
        "{:<10} | {:<25} | {:<20} | {:<15} | {:>6}",
        "ID", "Title", "Author", "Genre", "Copies"
    );
    println!("{}", "-".repeat(79));
    for book in registry.books() {
        println!(
            "{:<10} | {:<25} | {:<20} | {:<15} | {:>6}",
            book.id(),
            book.title(),
            book.author(),
            book.genre(),
            book.available_copies()
        );
    }
}

fn view_users(registry: &Registry) {
    println!();
    println!("--- Users ---");
    println!("{:<13} | {:<22} | {:<5}", "ID", "Name", "Role");
    println!("{}", "-".repeat(48));
    for user in registry.users() {
        println!(
            "{:<13} | {:<22} | {:<5}",
            user.id(),
            user.name(),
            user.role()
        );
    }
}

fn search_catalog(registry: &Registry) -> io::Result<()> {
    let term = prompt("Enter a book ID or exact title: ")?;
    let books: Vec<&Book> = registry.books().collect();
    let hit = search::find_by_id(books.iter().copied(), &term)
        .or_else(|| search::find_by_name(books.iter().copied(), &term));
    match hit {
        Some(book) => println!(
            "{} | {} | {} | {} | {} copies",
            book.id(),
            book.title(),
            book.author(),
            book.genre(),
            book.available_copies()
        ),
        None => println!("No matching book."),
    }
    Ok(())
}
