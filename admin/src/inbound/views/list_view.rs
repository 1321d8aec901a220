//! Table rendering of the current user page.

use std::fmt;

use crate::domain::{LoaderSnapshot, UserRecord};

const HEADERS: [&str; 10] = [
    "ID",
    "First name",
    "Last name",
    "Maiden name",
    "Age",
    "Gender",
    "Username",
    "Password",
    "Birth date",
    "Actions",
];
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";
const EMPTY_TEXT: &str = "No data";
const LOADING_TEXT: &str = "Loading...";

/// Renders a [`LoaderSnapshot`] as a table with one edit action per row.
///
/// The pager line appears only when there is more than one page.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    snapshot: &'a LoaderSnapshot,
}

impl<'a> ListView<'a> {
    pub const fn new(snapshot: &'a LoaderSnapshot) -> Self {
        Self { snapshot }
    }

    fn cells(record: &UserRecord) -> [String; 10] {
        [
            record.id.to_string(),
            record.first_name.clone(),
            record.last_name.clone(),
            record.maiden_name.clone(),
            record.age.to_string(),
            record.gender.to_string(),
            record.username.clone(),
            record.password.clone(),
            record
                .birth_date
                .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            format!("edit {}", record.id),
        ]
    }
}

impl fmt::Display for ListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        if let Some(error) = &snapshot.error {
            writeln!(f, "Error: {error}")?;
        }

        let rows: Vec<[String; 10]> = if snapshot.is_loading {
            Vec::new()
        } else {
            snapshot.page_state.records().iter().map(Self::cells).collect()
        };
        let mut widths = HEADERS.map(|header| header.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(f, &widths, HEADERS.iter().copied())?;
        let rule: usize = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
        writeln!(f, "{}", "-".repeat(rule))?;

        if snapshot.is_loading {
            writeln!(f, "{LOADING_TEXT}")?;
        } else if rows.is_empty() {
            writeln!(f, "{EMPTY_TEXT}")?;
        }
        for row in &rows {
            write_row(f, &widths, row.iter().map(String::as_str))?;
        }

        let pages = snapshot.page_state.page_count();
        if pages > 1 {
            writeln!(
                f,
                "Page {} of {pages} ({} users)",
                snapshot.page_state.page(),
                snapshot.page_state.total()
            )?;
        }
        Ok(())
    }
}

fn write_row<'c>(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize],
    cells: impl Iterator<Item = &'c str>,
) -> fmt::Result {
    let line = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{}", line.trim_end())
}
