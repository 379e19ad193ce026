//! Scribe - Headless Driver
//!
//! Runs an editor instance over stdin. Each input line is one command; every
//! change notification the editor emits is printed as `changed: <html>`.
//!
//! ```text
//! scribe [initial.html] < commands.txt
//! ```

use log::{info, warn};
use scribe::config::load_config;
use scribe::media::{
    CatalogResponse, CatalogService, Completion, LocalFile, MediaAsset, UploadResponse,
    UploadService,
};
use scribe::{EditingSurface, Error, FormatCommand, Result, Selection};
use std::cell::RefCell;
use std::fs;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Application name constant.
const APP_NAME: &str = "Scribe";

const HELP: &str = "\
Commands:
  select <start> <end>   select a byte range of the live view
  caret <offset>         place the caret
  deselect               clear the caret (insertions append)
  <format> [arg]         bold italic underline strike code sub sup h1-h6 p
                         quote pre ul ol align <dir> size <len> color <c>
                         highlight <c> clear undo redo
  source | visual        switch the live view
  fullscreen             toggle fullscreen layout
  edit <html>            replace the live view's content
  link <url> [text]      insert a link
  table <rows> <cols>    insert a table
  hr                     insert a horizontal rule
  upload <path>          upload a local image and insert it
  picker                 open the image picker
  pick <id>              toggle an asset in the picker
  insert-images          insert the picked assets
  close-picker           close the image picker
  state                  show mode and formatting at the caret
  print                  print the document
  quit";

// ─────────────────────────────────────────────────────────────────────────────
// Session-local media services
// ─────────────────────────────────────────────────────────────────────────────

/// Uploads "host" files at their path; the catalog lists this session's
/// uploads.
#[derive(Clone, Default)]
struct SessionMedia {
    uploaded: Rc<RefCell<Vec<MediaAsset>>>,
}

impl UploadService for SessionMedia {
    fn upload(&self, file: &LocalFile, done: Completion<UploadResponse>) {
        let url = format!("file://{}", file.name);
        self.uploaded
            .borrow_mut()
            .push(MediaAsset::from_upload(url.clone(), file.base_name()));
        done(Ok(UploadResponse::ok(url)));
    }
}

impl CatalogService for SessionMedia {
    fn list_images(&self, limit: usize, done: Completion<CatalogResponse>) {
        let images = self.uploaded.borrow().iter().take(limit).cloned().collect();
        done(Ok(CatalogResponse::ok(images)));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Handling
// ─────────────────────────────────────────────────────────────────────────────

enum Outcome {
    Continue,
    Quit,
}

fn parse_usize(word: Option<&str>) -> Option<usize> {
    word.and_then(|w| w.parse().ok())
}

fn run_command(editor: &mut EditingSurface, line: &str) -> Result<Outcome> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    match word {
        "" => {}
        "quit" | "exit" => return Ok(Outcome::Quit),
        "help" => println!("{}", HELP),
        "select" => match (parse_usize(args.next()), parse_usize(args.next())) {
            (Some(start), Some(end)) => editor.set_selection(Some(Selection::new(start, end))),
            _ => println!("usage: select <start> <end>"),
        },
        "caret" => match parse_usize(args.next()) {
            Some(offset) => editor.set_selection(Some(Selection::caret(offset))),
            None => println!("usage: caret <offset>"),
        },
        "deselect" => editor.set_selection(None),
        "source" => {
            editor.switch_to_source();
        }
        "visual" => {
            editor.switch_to_visual();
        }
        "fullscreen" => {
            editor.toggle_fullscreen();
            println!("mode: {}", editor.mode());
        }
        "edit" => {
            if editor.mode().is_source() {
                editor.edit_source(rest);
            } else {
                editor.edit_visual(rest);
            }
        }
        "link" => {
            let url = args.next().unwrap_or_default();
            let text: Vec<&str> = args.collect();
            editor.open_link_modal();
            editor.set_link_url(url);
            if !text.is_empty() {
                editor.set_link_text(text.join(" "));
            }
            confirm(editor)?;
        }
        "table" => {
            editor.open_table_modal();
            if let Some(rows) = parse_usize(args.next()) {
                editor.set_table_rows(rows);
            }
            if let Some(cols) = parse_usize(args.next()) {
                editor.set_table_cols(cols);
            }
            confirm(editor)?;
        }
        "hr" => {
            editor.insert_horizontal_rule();
        }
        "upload" => {
            if rest.is_empty() {
                return Err(Error::Application("usage: upload <path>".to_string()));
            }
            let bytes = fs::read(rest)?;
            let file = LocalFile::new(rest, bytes);
            info!("Uploading {} ({} bytes)", file.name, file.len());
            editor.upload_image(&file);
        }
        "picker" => {
            editor.open_image_picker();
        }
        "pick" => {
            if !editor.toggle_picker_asset(rest) {
                println!("cannot select '{}' right now", rest);
            }
        }
        "insert-images" => {
            let count = editor.insert_selected_images();
            println!("inserted {} image(s)", count);
        }
        "close-picker" => editor.close_image_picker(),
        "state" => {
            println!("mode: {}", editor.mode());
            if let Some(state) = editor.formatting_state() {
                println!("{:?}", state);
            }
        }
        "print" => println!("{}", editor.value()),
        name => match FormatCommand::from_name(name, Some(rest)) {
            Some(command) => {
                if !editor.dispatch(&command) {
                    println!("{}: no change", command.label());
                }
            }
            None => println!("unknown command '{}', try 'help'", name),
        },
    }

    Ok(Outcome::Continue)
}

/// Confirm the open modal, reporting why it cannot be confirmed.
fn confirm(editor: &mut EditingSurface) -> Result<()> {
    match editor.confirm_modal() {
        Ok(_) => Ok(()),
        Err(Error::Validation(e)) => {
            println!("cannot insert: {}", e);
            editor.cancel_modal();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn print_picker(editor: &EditingSurface) {
    let picker = editor.picker();
    if !picker.is_open() || picker.is_loading() {
        return;
    }
    for asset in picker.filtered_assets() {
        let mark = if picker.selection().contains(&asset.id) {
            "x"
        } else {
            " "
        };
        println!("[{}] {} {}", mark, asset.id, asset.alt);
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();
    let initial = match std::env::args().nth(1) {
        Some(path) => fs::read_to_string(&path)?,
        None => String::new(),
    };

    let media = SessionMedia::default();
    let mut editor = EditingSurface::new(
        initial,
        settings,
        Box::new(media.clone()),
        Box::new(media),
        |value: &str| println!("changed: {}", value),
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match run_command(&mut editor, &line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue) => {}
            Err(e) => warn!("{}: {}", line.trim(), e),
        }

        // Completions from the services are handled between commands
        if editor.pump_media_events() > 0 {
            print_picker(&editor);
        }
        io::stdout().flush()?;
    }

    info!("{} exiting", APP_NAME);
    Ok(())
}
