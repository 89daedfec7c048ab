//! Interactive session: one command per line, each turned into an
//! [`Intent`] and dispatched against a single long-lived [`Gallery`].

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use volunteer_directory::{CreatePayload, Gallery, Intent, ViewMode};

use crate::render;

pub const HELP: &str = "\
Commands:
  search [TERM]          filter by name, AAK number, mobile or address
  filter [AAK]           show one AAK number (no argument shows all)
  clear                  reset search and filter
  view [grid|list]       switch layout (no argument toggles)
  open ID                show a volunteer's ID card
  close                  close the ID card
  new                    start registering a volunteer
  add name=.. code=.. mobile=.. address=.. [image=..]
                         register a volunteer
  delete ID              ask to delete a volunteer
  yes                    confirm the pending delete
  cancel                 abandon the pending delete or registration
  reload                 reload from the directory
  help                   show this help
  quit                   leave the shell
";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Intent(Intent),
    /// Cancel whatever dialog is open.
    Cancel,
    Reload,
    Help,
    Quit,
    /// Blank line: redraw.
    Redraw,
}

/// Parse one line of shell input.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let words = shlex::split(line).ok_or_else(|| "unbalanced quotes".to_string())?;
    let Some((head, rest)) = words.split_first() else {
        return Ok(ShellCommand::Redraw);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "search" | "s" => ShellCommand::Intent(Intent::SetSearch(rest.join(" "))),
        "filter" | "f" => {
            ShellCommand::Intent(Intent::SetCategory(rest.first().cloned()))
        }
        "clear" => ShellCommand::Intent(Intent::ClearFilters),
        "view" | "v" => match rest.first() {
            None => ShellCommand::Intent(Intent::ToggleViewMode),
            Some(mode) => ShellCommand::Intent(Intent::SetViewMode(mode.parse::<ViewMode>()?)),
        },
        "open" | "show" => ShellCommand::Intent(Intent::ViewDetail(required_id(rest)?)),
        "close" => ShellCommand::Intent(Intent::CloseDetail),
        "new" => ShellCommand::Intent(Intent::RequestAdd),
        "add" => ShellCommand::Intent(Intent::SubmitNew(parse_payload(rest)?)),
        "delete" | "rm" => ShellCommand::Intent(Intent::RequestDelete(required_id(rest)?)),
        "yes" | "y" | "confirm" => ShellCommand::Intent(Intent::ConfirmDelete),
        "cancel" | "no" | "n" => ShellCommand::Cancel,
        "reload" => ShellCommand::Reload,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(command)
}

fn required_id(rest: &[String]) -> Result<String, String> {
    rest.first()
        .cloned()
        .ok_or_else(|| "missing volunteer id".to_string())
}

fn parse_payload(fields: &[String]) -> Result<CreatePayload, String> {
    let mut payload = CreatePayload::default();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{field}'"))?;
        let value = value.to_string();
        match key {
            "name" => payload.name = value,
            "code" | "aak" => payload.membership_code = value,
            "mobile" => payload.mobile_number = value,
            "address" => payload.address = value,
            "image" => payload.image = Some(value),
            other => return Err(format!("unknown field '{other}'")),
        }
    }
    Ok(payload)
}

/// Render whatever the user is looking at: an open dialog, the detail card,
/// or the filtered gallery.
async fn redraw<W: Write>(gallery: &Gallery, out: &mut W) -> std::io::Result<()> {
    let view = gallery.snapshot().await;
    if let Some(target) = &view.delete_target {
        writeln!(out, "{}", render::render_delete_prompt(target))?;
        writeln!(out, "Type `yes` to delete or `cancel` to keep.")?;
    } else if view.add_form_open {
        writeln!(out, "New volunteer: add name=.. code=.. mobile=.. address=..")?;
    } else if let Some(record) = &view.selected {
        write!(out, "{}", render::render_detail(record))?;
    } else {
        write!(out, "{}", render::render_view(&view, render::terminal_width()))?;
    }
    Ok(())
}

/// Read commands from `input` until EOF or `quit`, writing frames to `out`.
pub async fn run_shell<R, W>(gallery: &mut Gallery, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let outcome = gallery.load().await?;
    writeln!(out, "{}", render::render_source(&outcome))?;
    redraw(gallery, out).await?;

    let mut lines = input.lines();
    loop {
        write!(out, "volunteers> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "✗ {message}")?;
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                write!(out, "{HELP}")?;
                continue;
            }
            ShellCommand::Reload => match gallery.load().await {
                Ok(outcome) => writeln!(out, "{}", render::render_source(&outcome))?,
                Err(e) => writeln!(out, "✗ {e}")?,
            },
            ShellCommand::Cancel => {
                let view = gallery.snapshot().await;
                let intent = if view.delete_target.is_some() {
                    Intent::CancelDelete
                } else {
                    Intent::CancelAdd
                };
                gallery.dispatch(intent).await;
            }
            ShellCommand::Intent(intent) => {
                for notice in gallery.dispatch(intent).await {
                    writeln!(out, "{}", render::render_notice(&notice))?;
                }
            }
            ShellCommand::Redraw => {}
        }
        redraw(gallery, out).await?;
    }
    Ok(())
}
