// Interactive preview session for the spelling engine.
// Run with: cargo run --bin simulator
use anyhow::Result;
use conscript_core::core::result::FallbackResult;
use conscript_core::core::types::virtual_symbol_char;
use conscript_core::protocol::{execute, Command, Response};
use conscript_core::{ConscriptEngine, EngineConfig};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{stdin, stdout, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = EngineConfig::load();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut engine = ConscriptEngine::from_config(&config);
    let mut pronunciation = String::new();
    let mut last_response: Option<Response> = None;

    loop {
        print_ui(&engine, &pronunciation, last_response.as_ref())?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => pronunciation.clear(),
            s if s.starts_with(':') && s.len() > 1 => {
                last_response = Some(match s[1..].parse::<Command>() {
                    Ok(Command::Exit) => break,
                    Ok(command) => execute(&mut engine, command),
                    Err(err) => Response::failure(&err),
                });
            }
            s => pronunciation = s.to_string(),
        }
    }

    println!("\nSaving lexicon...");
    match engine.save() {
        Ok(()) => match engine.store_path() {
            Some(path) => println!("Lexicon saved to '{}'", path.display()),
            None => println!("In-memory session, nothing saved."),
        },
        Err(err) => eprintln!("{} could not save lexicon: {err}", "[ERROR]".red()),
    }
    Ok(())
}

fn render_spelling(engine: &ConscriptEngine, result: &FallbackResult) -> String {
    result
        .spelling
        .iter()
        .map(|slot| {
            let id = slot.symbol_id;
            match (virtual_symbol_char(id), engine.store().symbol(id)) {
                (Some(ch), _) => format!("⟨{ch}⟩").red().to_string(),
                (None, Some(symbol)) if !symbol.units.is_empty() => {
                    symbol.units.join("").green().to_string()
                }
                (None, _) => format!("#{id}").green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_ui(engine: &ConscriptEngine, pronunciation: &str, last: Option<&Response>) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Conscript Spelling Simulator".bold());
    println!("---------------------------------------------------------------");
    println!("Type a pronunciation to preview its spelling, [Enter] to clear.");
    println!("Prefix protocol commands with ':' (e.g. ':ADD_SYMBOL ᚠ', ':MAP_SOUND 1 f').");
    println!("'exit' to save and quit.\n");

    println!(
        "Symbols: {}  Sound mappings: {}  Entries: {}",
        engine.store().symbols().count(),
        engine.store().sound_mappings().len(),
        engine.store().entries().count()
    );

    println!("\nPronunciation: [{pronunciation}]");
    if !pronunciation.is_empty() {
        let strict = engine.preview_spelling(pronunciation);
        let fallback = engine.preview_spelling_with_fallback(pronunciation);
        match strict.error {
            None => println!("Strict   -> {}", "complete".green()),
            Some(err) => println!("Strict   -> {}", err.yellow()),
        }
        println!("Spelling -> {}", render_spelling(engine, &fallback));
        if fallback.has_virtual_glyphs {
            println!("{}", "Virtual symbols stand in for unmatched sounds.".dim());
        }
    }

    if let Some(response) = last {
        println!("\nLast command: {}", response.to_line());
    }
    print!("\n> ");
    out.flush()?;
    Ok(())
}
