//! Pre-import instructions
//!
//! Renders the notes a database operator follows before importing the
//! stripped exports: which locales to enable, a SQL script provisioning the
//! genres the destination journal lacks, and the final import step.

use crate::side_data::SideData;
use crate::sql::{escape_literal, quote_literal};

/// Name of the temporary table holding the genres to create
const STAGING_TABLE: &str = "imported_genres";

/// Render the instructions document for `journal` (the journal path)
pub fn render_instructions(data: &SideData, journal: &str) -> String {
    let locales = if data.locales.is_empty() {
        "No locales were found in the processed files.".to_string()
    } else {
        data.locales.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };

    let mut lines = vec![
        "#1. Ensure the following locales are enabled in the journal:".to_string(),
        locales,
        String::new(),
    ];

    if data.genres.is_empty() {
        lines.push("#2. No genres were found in the processed files, no query is needed.".to_string());
    } else {
        lines.push("#2. Run the query below, it will ensure the required genres exist:".to_string());
        lines.push("```sql".to_string());
        lines.push(genre_script(data.genres.iter().map(String::as_str), journal));
        lines.push("```".to_string());
    }

    lines.push(String::new());
    lines.push("#3. Import the stripped XMLs.".to_string());

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// SQL creating every listed genre missing from the journal
///
/// New genres are numbered after the journal's highest `seq`, in genre name
/// order. Running the script twice creates nothing the second time.
pub fn genre_script<'a>(genres: impl IntoIterator<Item = &'a str>, journal: &str) -> String {
    let imported = genres
        .into_iter()
        .map(|genre| format!("SELECT {} AS genre", quote_literal(genre)))
        .collect::<Vec<_>>()
        .join(" UNION ALL ");

    format!(
        "CREATE TEMPORARY TABLE {table} AS
SELECT
j.journal_id AS context_id,
j.primary_locale AS locale,
imported.genre AS name,
(
SELECT COALESCE(MAX(g.seq), 0)
FROM genres g
WHERE g.context_id = j.journal_id
) + ROW_NUMBER() OVER (ORDER BY imported.genre) AS seq
FROM ({imported}) AS imported
INNER JOIN journals j ON j.path = '{journal}'
WHERE NOT EXISTS (
SELECT 1
FROM genres g
INNER JOIN genre_settings gs ON gs.genre_id = g.genre_id AND gs.setting_name = 'name'
WHERE g.context_id = j.journal_id AND gs.setting_value = imported.genre
);

INSERT INTO genres (context_id, seq)
SELECT ig.context_id, ig.seq
FROM {table} ig;

INSERT INTO genre_settings (genre_id, locale, setting_name, setting_value, setting_type)
SELECT g.genre_id, ig.locale, 'name', ig.name, 'string'
FROM {table} ig
INNER JOIN genres g ON g.context_id = ig.context_id AND g.seq = ig.seq;

DROP TABLE {table};",
        table = STAGING_TABLE,
        imported = imported,
        journal = escape_literal(journal),
    )
}
