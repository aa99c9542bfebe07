//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, instrument};

use crate::application::services::{DocumentService, OpenDocument};
use crate::application::{Document, OutlineConvert};
use crate::cli::args::{Cli, Commands, ConfigCommands, EditArgs, FormatArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{self, Settings};
use crate::domain::{Formatting, Section};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = cli
        .project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok());
    let settings = Settings::load(project_dir.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Sections { file }) => _sections(&container, file),
        Some(Commands::Paragraphs { file, section }) => _paragraphs(&container, file, *section),
        Some(Commands::Outline { file }) => _outline(&container, file),
        Some(Commands::Insert {
            file,
            section,
            text,
            edit,
            format,
        }) => _insert(&container, file, *section, text, edit, format),
        Some(Commands::Clear {
            file,
            section,
            edit,
        }) => _clear(&container, file, *section, edit),
        Some(Commands::Config { command }) => _config(&container, command, project_dir.as_deref()),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `docsect --help`".to_string(),
        )),
    }
}

/// Translate a 1-based section number.
fn select_section(document: &Document, number: usize) -> CliResult<Section> {
    if number == 0 {
        return Err(CliError::InvalidArgs(
            "section numbers start at 1".to_string(),
        ));
    }
    Ok(document.section(number - 1)?)
}

#[instrument(skip(container))]
fn _sections(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let open = container.document_service().open(file)?;
    let document = &open.document;

    output::header(&format!("{} ({})", file.display(), open.part));
    for (i, section) in document.sections()?.into_iter().enumerate() {
        let paragraphs = document.section_paragraphs(section)?;
        let tables = document.section_tables(section)?;
        let closing = if section.marker().is_some() {
            "marker"
        } else {
            "end of body"
        };
        output::detail(&format!(
            "{:>3}  {:<11} {:>4} paragraphs {:>3} tables  ({})",
            i + 1,
            document.break_type(section)?,
            paragraphs.len(),
            tables.len(),
            closing
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _paragraphs(container: &ServiceContainer, file: &Path, section: Option<usize>) -> CliResult<()> {
    let open = container.document_service().open(file)?;
    let document = &open.document;

    let paragraphs = match section {
        Some(number) => document.section_paragraphs(select_section(document, number)?)?,
        None => document.paragraphs(),
    };
    for paragraph in paragraphs {
        let text = document.paragraph_text(paragraph);
        if document.is_deleted(paragraph) {
            output::info(&text.strikethrough().red());
        } else {
            output::info(&text);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _outline(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let open = container.document_service().open(file)?;
    output::info(&open.document.to_tree_string()?);
    Ok(())
}

#[instrument(skip(container))]
fn _insert(
    container: &ServiceContainer,
    file: &Path,
    section: usize,
    text: &str,
    edit: &EditArgs,
    format: &FormatArgs,
) -> CliResult<()> {
    let service = container.document_service();
    let mut open = service.open(file)?;
    let target = select_section(&open.document, section)?;

    let track = edit.track_changes(container.settings.track_changes);
    let formatting = merge_formatting(&container.settings.formatting, format);
    let text = unescape(text);
    open.document
        .insert_paragraph(target, &text, track, &formatting)?;

    let destination = save(&service, &mut open, file, edit)?;
    output::success(&format!(
        "inserted paragraph into section {} of {}",
        section,
        destination.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _clear(container: &ServiceContainer, file: &Path, section: usize, edit: &EditArgs) -> CliResult<()> {
    let service = container.document_service();
    let mut open = service.open(file)?;
    let target = select_section(&open.document, section)?;
    let count = open.document.section_paragraphs(target)?.len();

    let track = edit.track_changes(container.settings.track_changes);
    open.document.clear(target, track)?;

    let destination = save(&service, &mut open, file, edit)?;
    let verb = if track { "marked deleted" } else { "removed" };
    output::success(&format!(
        "{} {} paragraphs of section {} in {}",
        verb,
        count,
        section,
        destination.display()
    ));
    Ok(())
}

fn save(
    service: &DocumentService,
    open: &mut OpenDocument,
    file: &Path,
    edit: &EditArgs,
) -> CliResult<PathBuf> {
    let destination = edit.output.clone().unwrap_or_else(|| file.to_path_buf());
    service.save(open, &destination)?;
    Ok(destination)
}

fn _config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            if let Some(dir) = project_dir {
                output::action("local", &config::local_config_path(dir).display());
            }
        }
    }
    Ok(())
}

/// Command-line flags override configured formatting.
fn merge_formatting(base: &Formatting, args: &FormatArgs) -> Formatting {
    Formatting {
        bold: base.bold || args.bold,
        italic: base.italic || args.italic,
        underline: base.underline || args.underline,
        strike: base.strike || args.strike,
        size: args.size.or(base.size),
        font_family: args.font.clone().or_else(|| base.font_family.clone()),
        color: args.color.clone().or_else(|| base.color.clone()),
        highlight: args.highlight.clone().or_else(|| base.highlight.clone()),
    }
}

/// `\t` and `\n` typed on the command line.
fn unescape(text: &str) -> String {
    text.replace("\\t", "\t").replace("\\n", "\n")
}
