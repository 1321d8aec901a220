//! `user-admin` command line: parses arguments and drives the loader and
//! edit session, writing the rendered views to the given output.

use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use pagination::PageRequestError;
use thiserror::Error;
use tracing::info;

use super::views::{EditFormView, ListView};
use crate::domain::ports::UserDirectory;
use crate::domain::{
    AdminError, EditSession, OpenOutcome, PagedListLoader, SubmitOutcome, UserField, UserId,
};

/// `user-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "user-admin",
    about = "Browse and edit users of a DummyJSON-compatible user service",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render one page of users.
    List(PageArgs),
    /// Render the edit form for one user, populated from the detail fetch.
    Show {
        /// User id.
        id: u64,
    },
    /// Apply field overrides to one user and save them.
    Edit(EditArgs),
}

/// Page selection shared by `list` and `edit`.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Records per page; falls back to the configured limit.
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Field overrides for `edit`; values are validated like form input.
#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// User id.
    pub id: u64,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub maiden_name: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// `YYYY-MM-DD`.
    #[arg(long)]
    pub birth_date: Option<String>,
    /// List page shown after a successful save.
    #[command(flatten)]
    pub list: PageArgs,
}

impl EditArgs {
    fn overrides(&self) -> impl Iterator<Item = (UserField, &str)> {
        [
            (UserField::FirstName, &self.first_name),
            (UserField::LastName, &self.last_name),
            (UserField::MaidenName, &self.maiden_name),
            (UserField::Age, &self.age),
            (UserField::Gender, &self.gender),
            (UserField::Username, &self.username),
            (UserField::Password, &self.password),
            (UserField::BirthDate, &self.birth_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|text| (field, text)))
    }
}

/// Failures that end a command with a non-zero exit status.
///
/// The rendered view has already been written when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid page selection: {0}")]
    Page(#[from] PageRequestError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error("edit session ended unexpectedly: {0}")]
    Interrupted(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Dependencies the commands run against.
#[derive(Clone)]
pub struct CliContext {
    pub directory: Arc<dyn UserDirectory>,
    pub page_limit: u32,
    pub refetch_after_save: bool,
}

impl std::fmt::Debug for CliContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliContext")
            .field("page_limit", &self.page_limit)
            .field("refetch_after_save", &self.refetch_after_save)
            .finish_non_exhaustive()
    }
}

impl CliContext {
    async fn open_loader(&self, args: &PageArgs) -> Result<PagedListLoader, CliError> {
        let limit = args.limit.unwrap_or(self.page_limit);
        Ok(PagedListLoader::open(Arc::clone(&self.directory), args.page, limit).await?)
    }
}

/// Run `cli` and write its output to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when the page selection is invalid, a service call
/// fails, the edit is rejected, or `out` cannot be written.
pub async fn run(cli: Cli, context: &CliContext, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Command::List(args) => list(context, &args, out).await,
        Command::Show { id } => show(context, UserId::new(id), out).await,
        Command::Edit(args) => edit(context, &args, out).await,
    }
}

async fn list(context: &CliContext, args: &PageArgs, out: &mut impl Write) -> Result<(), CliError> {
    let loader = context.open_loader(args).await?;
    let snapshot = loader.snapshot();
    write!(out, "{}", ListView::new(&snapshot))?;
    match snapshot.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

async fn show(context: &CliContext, id: UserId, out: &mut impl Write) -> Result<(), CliError> {
    let loader = PagedListLoader::new(Arc::clone(&context.directory), 1, context.page_limit)?;
    let session = EditSession::new(Arc::clone(&context.directory), loader);
    let outcome = session.open_id(id).await;
    write!(out, "{}", EditFormView::new(&session.snapshot()))?;
    match outcome {
        OpenOutcome::Editing => Ok(()),
        OpenOutcome::Failed(error) => Err(error.into()),
        OpenOutcome::Superseded => Err(CliError::Interrupted("detail superseded".to_owned())),
    }
}

async fn edit(context: &CliContext, args: &EditArgs, out: &mut impl Write) -> Result<(), CliError> {
    let loader = context.open_loader(&args.list).await?;
    let session = EditSession::new(Arc::clone(&context.directory), loader.clone())
        .with_refetch_after_save(context.refetch_after_save);
    let id = UserId::new(args.id);

    match session.open_id(id).await {
        OpenOutcome::Editing => {}
        OpenOutcome::Failed(error) => {
            write!(out, "{}", EditFormView::new(&session.snapshot()))?;
            return Err(error.into());
        }
        OpenOutcome::Superseded => {
            return Err(CliError::Interrupted("detail superseded".to_owned()));
        }
    }

    session.edit_form(|form| {
        for (field, value) in args.overrides() {
            form.set(field, value);
        }
    });

    match session.submit().await {
        SubmitOutcome::Saved(record) => {
            info!(user_id = %record.id, "user saved");
            writeln!(out, "Saved user {}", record.id)?;
            write!(out, "{}", ListView::new(&loader.snapshot()))?;
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            write!(out, "{}", EditFormView::new(&session.snapshot()))?;
            Err(AdminError::from(errors).into())
        }
        SubmitOutcome::Failed(error) => {
            write!(out, "{}", EditFormView::new(&session.snapshot()))?;
            Err(error.into())
        }
        SubmitOutcome::Superseded => Err(CliError::Interrupted("save superseded".to_owned())),
        SubmitOutcome::NotEditing(phase) => {
            Err(CliError::Interrupted(format!("cannot save while {phase:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FixtureUserDirectory;
    use rstest::{fixture, rstest};

    #[fixture]
    fn context() -> CliContext {
        CliContext {
            directory: Arc::new(FixtureUserDirectory::sample(25)),
            page_limit: 10,
            refetch_after_save: false,
        }
    }

    async fn run_args(context: &CliContext, args: &[&str]) -> (Result<(), CliError>, String) {
        let cli = Cli::try_parse_from(args).expect("arguments parse");
        let mut out = Vec::new();
        let result = run(cli, context, &mut out).await;
        (result, String::from_utf8(out).expect("utf-8 output"))
    }

    #[rstest]
    #[case(&["user-admin", "list"], 1, None)]
    #[case(&["user-admin", "list", "--page", "3", "--limit", "5"], 3, Some(5))]
    fn parses_list_arguments(
        #[case] args: &[&str],
        #[case] page: u32,
        #[case] limit: Option<u32>,
    ) {
        let cli = Cli::try_parse_from(args).expect("arguments parse");
        let Command::List(parsed) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(parsed.page, page);
        assert_eq!(parsed.limit, limit);
    }

    #[test]
    fn parses_edit_overrides_in_form_order() {
        let cli = Cli::try_parse_from([
            "user-admin",
            "edit",
            "5",
            "--username",
            "annie5",
            "--first-name",
            "Annie",
        ])
        .expect("arguments parse");
        let Command::Edit(args) = cli.command else {
            panic!("expected edit command");
        };
        let overrides: Vec<_> = args.overrides().collect();
        assert_eq!(
            overrides,
            vec![(UserField::FirstName, "Annie"), (UserField::Username, "annie5")]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn list_renders_the_requested_page(context: CliContext) {
        let (result, output) = run_args(&context, &["user-admin", "list", "--page", "3"]).await;

        assert!(result.is_ok());
        assert!(output.contains("edit 21"));
        assert!(!output.contains("edit 20 "));
        assert!(output.ends_with("Page 3 of 3 (25 users)\n"));
    }

    #[rstest]
    #[tokio::test]
    async fn list_rejects_page_zero(context: CliContext) {
        let (result, output) = run_args(&context, &["user-admin", "list", "--page", "0"]).await;
        assert!(matches!(result, Err(CliError::Page(PageRequestError::ZeroPage))));
        assert!(output.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn show_renders_the_detail_form(context: CliContext) {
        let (result, output) = run_args(&context, &["user-admin", "show", "7"]).await;

        assert!(result.is_ok());
        assert!(output.starts_with("Edit user 7\n"));
        assert!(output.contains("User7"));
    }

    #[rstest]
    #[tokio::test]
    async fn show_reports_missing_users(context: CliContext) {
        let (result, output) = run_args(&context, &["user-admin", "show", "99"]).await;

        assert!(matches!(
            result,
            Err(CliError::Admin(AdminError::NotFound { .. }))
        ));
        assert!(output.contains("user 99 not found"));
    }

    #[rstest]
    #[tokio::test]
    async fn edit_saves_and_renders_the_merged_page(context: CliContext) {
        let (result, output) = run_args(
            &context,
            &[
                "user-admin",
                "edit",
                "5",
                "--first-name",
                "Annie",
                "--username",
                "annie5",
            ],
        )
        .await;

        assert!(result.is_ok(), "{result:?}");
        assert!(output.starts_with("Saved user 5\n"));
        let row = output
            .lines()
            .find(|line| line.ends_with("edit 5"))
            .expect("row for user 5");
        assert!(row.contains("Annie"));
    }

    #[rstest]
    #[tokio::test]
    async fn edit_renders_field_errors_without_saving(context: CliContext) {
        let (result, output) = run_args(
            &context,
            &["user-admin", "edit", "5", "--password", "abc", "--age", "x"],
        )
        .await;

        assert!(matches!(
            result,
            Err(CliError::Admin(AdminError::ValidationFailure { .. }))
        ));
        assert!(output.contains("! Min 6 chars"));
        assert!(output.contains("! Must be a number"));
        assert!(!output.contains("Saved user"));
    }
}
