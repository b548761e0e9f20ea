//! Built-in entries shown when the table cannot be read.

use super::Recommendation;

/// The fixed fallback list, newest first.
pub fn sample_recommendations() -> Vec<Recommendation> {
    vec![
        sample(
            1,
            "To Kill a Mockingbird",
            "Harper Lee",
            "Classic, Fiction",
            "2024-01-03T00:00:00.000000Z",
        ),
        sample(
            2,
            "1984",
            "George Orwell",
            "Dystopian",
            "2024-01-02T00:00:00.000000Z",
        ),
        sample(
            3,
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "Classic, Jazz Age",
            "2024-01-01T00:00:00.000000Z",
        ),
    ]
}

fn sample(n: u32, title: &str, author: &str, tags: &str, created_at: &str) -> Recommendation {
    Recommendation {
        id: format!("sample-{n}"),
        title: title.to_string(),
        author: author.to_string(),
        tags: Some(tags.to_string()),
        notes: None,
        contributor: None,
        approved: true,
        created_at: created_at.to_string(),
    }
}
