//! orgdeck - outline presentation engine

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use orgdeck::engine::{
    estimate_speaking_time, resolve_frame_level, Command, ExternalViewer, MaskKind, Navigator,
    NotesIndex, Renderer, Session, SessionOptions, ShowArgs, Slide,
};
use orgdeck::load::read_document;
use orgdeck::Document;

#[derive(Parser)]
#[command(name = "orgdeck")]
#[command(version, about = "Present outline documents as slides", long_about = None)]
#[command(after_help = "EXAMPLES:
    orgdeck talk.json              Present the document
    orgdeck -i talk.json           Show document info
    orgdeck --estimate talk.json   Estimate speaking time")]
struct Cli {
    /// Input document (JSON outline)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Show document info without presenting
    #[arg(short, long)]
    info: bool,

    /// Print the outline and exit
    #[arg(long)]
    outline: bool,

    /// Estimate total speaking time and exit
    #[arg(long)]
    estimate: bool,

    /// Speaking rate in words per minute
    #[arg(long, default_value_t = 150)]
    wpm: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input, cli.wpm)
    } else if cli.outline {
        show_outline(&cli.input)
    } else if cli.estimate {
        show_estimate(&cli.input, cli.wpm)
    } else {
        present(&cli.input, cli.wpm)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str, wpm: usize) -> orgdeck::Result<()> {
    let doc = read_document(path)?;
    let frame_level = resolve_frame_level(&doc);
    let nav = Navigator::new(&doc, frame_level)?;
    let notes = NotesIndex::build(&doc);
    let estimate = estimate_speaking_time(&doc, wpm);

    println!("File: {path}");
    if let Some(title) = doc.keyword("TITLE") {
        println!("Title: {title}");
    }
    if let Some(author) = doc.keyword("AUTHOR") {
        println!("Author: {author}");
    }
    println!("Frame level: {frame_level}");
    println!("Pages: {}", nav.page_count());
    println!("Sections with notes: {}", notes
        .sections()
        .iter()
        .filter(|s| !s.text.is_empty())
        .count());
    println!(
        "Speaking time: {:.1} min ({} words at {wpm} wpm)",
        estimate.minutes, estimate.words
    );
    Ok(())
}

fn show_outline(path: &str) -> orgdeck::Result<()> {
    let doc = read_document(path)?;
    print_outline(&doc, doc.root(), 0);
    Ok(())
}

fn print_outline(doc: &Document, id: orgdeck::NodeId, depth: usize) {
    if let Some(node) = doc.node(id) {
        if node.depth > 0 {
            println!("{}- {}", "  ".repeat(depth.saturating_sub(1)), node.title);
        }
    }
    for child in doc.children(id) {
        print_outline(doc, child, depth + 1);
    }
}

fn show_estimate(path: &str, wpm: usize) -> orgdeck::Result<()> {
    let doc = read_document(path)?;
    let estimate = estimate_speaking_time(&doc, wpm);
    println!(
        "{:.1} minutes ({} words at {wpm} wpm)",
        estimate.minutes, estimate.words
    );
    Ok(())
}

// ============================================================================
// Interactive presentation
// ============================================================================

/// Renders slides as plain text with hidden regions elided.
struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, slide: &Slide<'_>) {
        println!("\x1b[2J\x1b[H"); // clear screen
        print!("{}", visible_text(slide));
        if !slide.indicators.is_empty() {
            let markers: Vec<&str> = slide
                .indicators
                .iter()
                .map(|i| match i {
                    orgdeck::Indicator::HasFile => "[file]",
                    orgdeck::Indicator::HasVideo => "[video]",
                })
                .collect();
            println!("{}", markers.join(" "));
        }
        println!("\n-- page {}/{}", slide.page_number, slide.page_count);
        if let Some(notes) = slide.notes {
            if !notes.text.is_empty() {
                println!("-- notes: {}", notes.title);
            }
        }
    }

    fn message(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Drop hidden mask regions from the slide text.
fn visible_text(slide: &Slide<'_>) -> String {
    let text = &slide.layout.text;
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for region in slide.masks.regions() {
        if region.kind != MaskKind::Hidden || region.range.start < pos {
            continue;
        }
        out.push_str(&text[pos..region.range.start]);
        pos = region.range.end;
    }
    out.push_str(&text[pos..]);
    out
}

/// A viewer stub that reports aux actions on stdout. A real deployment
/// would embed a document viewer here.
#[derive(Default)]
struct ShellViewer {
    page: usize,
}

impl ExternalViewer for ShellViewer {
    fn open(&mut self, path: &Path) -> orgdeck::Result<()> {
        self.page = 1;
        println!("[aux] opened {}", path.display());
        Ok(())
    }
    fn fit_to_width(&mut self) {}
    fn fit_to_height(&mut self) {}
    fn go_to_page(&mut self, n: usize) {
        self.page = n;
    }
    fn advance(&mut self) {
        self.page += 1;
        println!("[aux] advanced to page {}", self.page);
    }
    fn current_page(&self) -> usize {
        self.page
    }
    fn total_pages(&self) -> usize {
        // Unknown for arbitrary files; report multi-page so repeat
        // show-file requests advance instead of re-opening.
        usize::MAX
    }
}

fn present(path: &str, wpm: usize) -> orgdeck::Result<()> {
    let doc = read_document(path)?;
    let options = SessionOptions {
        words_per_minute: wpm,
        ..Default::default()
    };
    let mut session = Session::new(doc, TerminalRenderer, ShellViewer::default(), options)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !session.should_quit() {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let command = match parse_command(line.trim()) {
            Some(command) => command,
            None => {
                print_help();
                continue;
            }
        };
        if let Err(e) = session.execute(command) {
            println!("error: {e}");
        }
    }
    Ok(())
}

fn parse_command(line: &str) -> Option<Command> {
    if let Ok(n) = line.parse::<usize>() {
        return Some(Command::JumpTo(n));
    }
    match line {
        "n" | "next" | "" => Some(Command::Next),
        "p" | "prev" => Some(Command::Previous),
        "t" | "top" => Some(Command::Top),
        "N" => Some(Command::NextSubheading),
        "P" => Some(Command::PreviousSubheading),
        "s" | "src" => Some(Command::ToggleAllSrcBlocks),
        "f" | "file" => Some(Command::ShowFile(ShowArgs::default())),
        "a" | "advance" => Some(Command::AdvanceOrShowFile(ShowArgs::default())),
        "v" | "video" => Some(Command::ShowVideo),
        "r" | "refresh" => Some(Command::Refresh),
        "e" | "estimate" => Some(Command::EstimateTime),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn print_help() {
    println!("commands: n(ext) p(rev) t(op) <page> N/P subheading");
    println!("          s(rc toggle) f(ile) a(dvance) v(ideo) r(efresh)");
    println!("          e(stimate) q(uit)");
}
