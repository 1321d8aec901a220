//! Labelled rendering of the edit form.

use std::fmt;

use crate::domain::{EditPhase, EditSnapshot, UserField};

/// Renders an [`EditSnapshot`]: one labelled line per field with its
/// validation message underneath, a spinner line while details load, and
/// the last detail or save failure as a banner.
#[derive(Debug, Clone, Copy)]
pub struct EditFormView<'a> {
    snapshot: &'a EditSnapshot,
}

impl<'a> EditFormView<'a> {
    pub const fn new(snapshot: &'a EditSnapshot) -> Self {
        Self { snapshot }
    }
}

impl fmt::Display for EditFormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        match snapshot.target {
            Some(id) => writeln!(f, "Edit user {id}")?,
            None => writeln!(f, "Edit user")?,
        }
        if let Some(error) = &snapshot.last_error {
            writeln!(f, "Error: {error}")?;
        }

        match snapshot.phase {
            EditPhase::Idle => return writeln!(f, "No user selected"),
            EditPhase::DetailLoading => return writeln!(f, "Loading..."),
            EditPhase::Editing | EditPhase::Submitting => {}
        }

        let label_width = UserField::ALL
            .iter()
            .map(|field| field.label().len())
            .max()
            .unwrap_or_default();
        for field in UserField::ALL {
            writeln!(
                f,
                "{label:<label_width$} : {value}",
                label = field.label(),
                value = snapshot.form.get(field)
            )?;
            if let Some(message) = snapshot.field_errors.get(field) {
                writeln!(f, "{:label_width$}   ! {message}", "")?;
            }
        }

        if snapshot.phase == EditPhase::Submitting {
            writeln!(f, "Saving...")
        } else {
            writeln!(f, "[Save]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::sample_user;
    use crate::domain::{AdminError, FieldErrors, UserForm, UserId};
    use rstest::rstest;

    fn snapshot(phase: EditPhase) -> EditSnapshot {
        EditSnapshot {
            phase,
            target: Some(UserId::new(5)),
            form: UserForm::from(&sample_user(5)),
            field_errors: FieldErrors::new(),
            last_error: None,
        }
    }

    #[test]
    fn renders_every_field_with_its_label() {
        let rendered = EditFormView::new(&snapshot(EditPhase::Editing)).to_string();

        assert!(rendered.starts_with("Edit user 5\n"));
        for field in UserField::ALL {
            assert!(rendered.contains(field.label()), "missing {field}");
        }
        assert!(rendered.contains("First name  : User5"));
        assert!(rendered.contains("Birth date  : 1990-01-01"));
        assert!(rendered.ends_with("[Save]\n"));
    }

    #[test]
    fn shows_messages_under_failing_fields() {
        let mut view = snapshot(EditPhase::Editing);
        view.field_errors.insert(UserField::Password, "Min 6 chars");
        let rendered = EditFormView::new(&view).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        let password = lines
            .iter()
            .position(|line| line.starts_with("Password"))
            .expect("password line");
        assert_eq!(lines[password + 1].trim(), "! Min 6 chars");
    }

    #[rstest]
    #[case(EditPhase::DetailLoading, "Loading...")]
    #[case(EditPhase::Idle, "No user selected")]
    #[case(EditPhase::Submitting, "Saving...")]
    fn phase_lines(#[case] phase: EditPhase, #[case] expected: &str) {
        let rendered = EditFormView::new(&snapshot(phase)).to_string();
        assert!(rendered.contains(expected));
    }

    #[test]
    fn loading_hides_field_values() {
        let rendered = EditFormView::new(&snapshot(EditPhase::DetailLoading)).to_string();
        assert!(!rendered.contains("User5"));
    }

    #[test]
    fn failures_render_as_a_banner() {
        let mut view = snapshot(EditPhase::Idle);
        view.target = None;
        view.last_error = Some(AdminError::NotFound { id: UserId::new(5) });
        let rendered = EditFormView::new(&view).to_string();

        assert_eq!(rendered, "Edit user\nError: user 5 not found\nNo user selected\n");
    }
}
