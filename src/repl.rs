//! Interactive REPL.

use crate::commands;
use crate::config::Config;
use colored::Colorize;
use fsmhdl_core::{Condition, ConditionSet, MachineDefinition};
use fsmhdl_expr::{Bindings, Expr, GRAMMAR_HELP};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::Path;

const HELP_TEXT: &str = r#"
Available commands:
  help                          Show this help

  <expr>                        Describe an expression
  lower <expr>                  Lower an expression to VHDL
  simplify <expr>               Simplify an expression
  dnf <expr> / cnf <expr>       Normal forms
  eval <bindings> <expr>        Substitute, e.g. eval x=1,y=0 x & ~y
  conditions <c>; <c>; ...      Check conditions for overlap and coverage

  load <file>                   Load a machine definition
  check                         Diagnose the loaded machine
  transitions                   Lower the loaded machine's transitions
  fire <bindings> [state]       Enabled transitions of the loaded machine

  quit, exit                    Exit the REPL
"#;

/// REPL session state.
#[derive(Default)]
struct Session {
    machine: Option<MachineDefinition>,
}

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "fsmhdl REPL".bold().cyan());

    // Create readline editor
    let rl_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .max_history_size(config.repl.max_history)?
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

    // Load history
    let history_path = config.repl.history_path();
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    let mut session = Session::default();
    loop {
        let prompt = format!("{} ", "fsmhdl>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&mut session, config, line) {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    // Save history
    if let Err(e) = rl.save_history(&history_path) {
        tracing::debug!(path = %history_path.display(), error = %e, "could not save history");
    }

    Ok(())
}

fn execute_repl_command(
    session: &mut Session,
    config: &Config,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd.to_lowercase().as_str() {
        "help" | "?" => Ok(Some(format!("{}\n{}", HELP_TEXT, GRAMMAR_HELP))),

        "quit" | "exit" | "q" => Ok(None),

        "lower" => Ok(Some(parse_arg(rest, "lower <expr>")?.to_relational()?)),

        "simplify" => Ok(Some(parse_arg(rest, "simplify <expr>")?.simplify().to_string())),

        "dnf" => Ok(Some(parse_arg(rest, "dnf <expr>")?.to_dnf().to_string())),

        "cnf" => Ok(Some(parse_arg(rest, "cnf <expr>")?.to_cnf().to_string())),

        "eval" => {
            let Some((bindings, expr)) = rest.split_once(char::is_whitespace) else {
                return Ok(Some("Usage: eval <bindings> <expr>".to_string()));
            };
            let bindings = Bindings::parse(bindings)?;
            Ok(Some(Expr::parse(expr)?.substitute(&bindings).to_string()))
        }

        "conditions" => {
            let set = rest
                .split(';')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(Condition::parse)
                .collect::<Result<ConditionSet, _>>()?;
            if set.is_empty() {
                return Ok(Some("Usage: conditions <c>; <c>; ...".to_string()));
            }
            Ok(Some(commands::describe_conditions(&set)))
        }

        "load" => {
            if rest.is_empty() {
                return Ok(Some("Usage: load <file>".to_string()));
            }
            let def = commands::load(Path::new(rest))?;
            let summary = format!(
                "{} {} ({} states, {} transitions)",
                "Loaded".green(),
                def.name.cyan(),
                def.machine.states().len(),
                def.machine.transitions().len()
            );
            session.machine = Some(def);
            Ok(Some(summary))
        }

        "check" => {
            let def = loaded(session)?;
            let out = commands::check_report(def, &config.analysis, config.output.format)?;
            Ok(Some(out.text))
        }

        "transitions" => Ok(Some(commands::lower_report(loaded(session)?)?)),

        "fire" => {
            let mut parts = rest.split_whitespace();
            let Some(bindings) = parts.next() else {
                return Ok(Some("Usage: fire <bindings> [state]".to_string()));
            };
            let bindings = Bindings::parse(bindings)?;
            let from = parts.next();
            Ok(Some(commands::eval_report(loaded(session)?, &bindings, from)?))
        }

        _ => {
            let expr = Expr::parse(line)?;
            Ok(Some(commands::describe_expr(&expr)?))
        }
    }
}

fn parse_arg(text: &str, usage: &str) -> Result<Expr, Box<dyn std::error::Error>> {
    if text.is_empty() {
        return Err(format!("usage: {}", usage).into());
    }
    Ok(Expr::parse(text)?)
}

fn loaded(session: &Session) -> Result<&MachineDefinition, Box<dyn std::error::Error>> {
    session
        .machine
        .as_ref()
        .ok_or_else(|| "no machine loaded; use 'load <file>'".into())
}
