//! Command execution.

use crate::config::{AnalysisConfig, Config, OutputFormat};
use crate::Commands;
use colored::Colorize;
use fsmhdl_core::{Condition, ConditionSet, Diagnostics, FilterMode, Finding, MachineDefinition};
use fsmhdl_expr::{Bindings, Expr};
use serde::Serialize;
use std::path::Path;

/// Result of a command: text to print and whether the command passed.
#[derive(Debug)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl From<String> for CommandOutput {
    fn from(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Executes a command and returns the formatted output.
pub fn execute(cmd: Commands, config: &Config) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let format = config.output.format;
    match cmd {
        Commands::Repl => unreachable!(),

        Commands::Check { file } => {
            let def = load(&file)?;
            Ok(check_report(&def, &config.analysis, format)?)
        }

        Commands::Lower { file } => {
            let def = load(&file)?;
            Ok(lower_report(&def)?.into())
        }

        Commands::Export { file, name } => {
            let def = load(&file)?;
            let name = name.as_deref().unwrap_or(&def.name);
            let model = def.machine.template_model(&def.arena, name)?;
            Ok(render(&model, format)?.into())
        }

        Commands::Eval { file, set, from } => {
            let def = load(&file)?;
            let bindings = Bindings::parse(&set)?;
            Ok(eval_report(&def, &bindings, from.as_deref())?.into())
        }

        Commands::Expr { text } => {
            let expr = Expr::parse(&text)?;
            Ok(describe_expr(&expr)?.into())
        }

        Commands::Conditions { conditions } => {
            let set = conditions
                .iter()
                .map(|c| Condition::parse(c))
                .collect::<Result<ConditionSet, _>>()?;
            Ok(describe_conditions(&set).into())
        }
    }
}

pub fn load(path: &Path) -> Result<MachineDefinition, Box<dyn std::error::Error>> {
    Ok(MachineDefinition::from_file(path)?)
}

#[derive(Serialize)]
struct CheckReport<'a> {
    name: &'a str,
    checksum: &'a str,
    passed: bool,
    failures: Vec<&'a Finding>,
    diagnostics: &'a Diagnostics,
}

/// Returns whether `finding` fails `check` under the given settings.
fn is_failure(finding: &Finding, analysis: &AnalysisConfig) -> bool {
    match finding {
        Finding::OverlappingConditions { .. } | Finding::NonExhaustive { .. } => {
            analysis.per_state_checks
        }
        Finding::Unreachable { .. } | Finding::Unexitable { .. } => analysis.reachability,
        Finding::MissingDefault => analysis.require_default,
        _ => true,
    }
}

/// Diagnoses a machine and reports the findings the configuration enforces.
pub fn check_report(
    def: &MachineDefinition,
    analysis: &AnalysisConfig,
    format: OutputFormat,
) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let diagnostics = def.machine.diagnose(&def.arena);
    let failures: Vec<&Finding> = diagnostics
        .findings
        .iter()
        .filter(|f| is_failure(f, analysis))
        .collect();
    let whole_set_failed =
        analysis.whole_set_checks && !(diagnostics.exclusive && diagnostics.exhaustive);
    let passed = failures.is_empty() && !whole_set_failed;

    if format != OutputFormat::Text {
        let report = CheckReport {
            name: &def.name,
            checksum: &def.checksum,
            passed,
            failures,
            diagnostics: &diagnostics,
        };
        return Ok(CommandOutput {
            text: render(&report, format)?,
            success: passed,
        });
    }

    let mut output = format!(
        "{} {} ({} states, {} transitions, checksum {})\n",
        "Machine".bold(),
        def.name.cyan(),
        def.machine.states().len(),
        def.machine.transitions().len(),
        def.checksum
    );
    for finding in &diagnostics.findings {
        let label = if is_failure(finding, analysis) {
            "error".red()
        } else {
            "warning".yellow()
        };
        output.push_str(&format!(
            "  {} [{}] {}\n",
            label,
            finding.code().dimmed(),
            finding
        ));
    }
    output.push_str(&format!(
        "  whole set: exclusive={} exhaustive={}\n",
        diagnostics.exclusive, diagnostics.exhaustive
    ));
    if whole_set_failed {
        output.push_str(&format!(
            "  {} transition conditions are not exclusive and exhaustive as a whole\n",
            "error".red()
        ));
    }
    output.push_str(&if passed {
        "OK".green().to_string()
    } else {
        "FAILED".red().to_string()
    });

    Ok(CommandOutput {
        text: output,
        success: passed,
    })
}

/// Lists each transition with its condition lowered to VHDL.
pub fn lower_report(def: &MachineDefinition) -> Result<String, Box<dyn std::error::Error>> {
    let arena = &def.arena;
    let mut lines = Vec::new();
    for id in def.machine.transitions().iter() {
        let t = &arena[id];
        lines.push(format!(
            "{} -> {}: {}",
            arena[t.source()].name().cyan(),
            arena[t.destination()].name().cyan(),
            t.condition().vhdl()?
        ));
    }
    if lines.is_empty() {
        return Ok("No transitions".yellow().to_string());
    }
    Ok(lines.join("\n"))
}

/// Lists the transitions enabled under `bindings`, optionally only those
/// leaving the state named `from`.
pub fn eval_report(
    def: &MachineDefinition,
    bindings: &Bindings,
    from: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let arena = &def.arena;
    let transitions = match from {
        Some(name) => {
            let matches = def.machine.get_state(arena, name);
            let mut ids = matches.iter();
            let (Some(state), None) = (ids.next(), ids.next()) else {
                return Err(format!(
                    "expected exactly one state named '{}', found {}",
                    name,
                    matches.len()
                )
                .into());
            };
            def.machine
                .transitions()
                .from_states(arena, Some(state), None, FilterMode::And)
        }
        None => def.machine.transitions().clone(),
    };

    let enabled = transitions.evaluate(arena, bindings);
    if enabled.is_empty() {
        return Ok("No transition enabled".yellow().to_string());
    }

    let lines: Vec<String> = enabled
        .iter()
        .map(|id| {
            let t = &arena[id];
            format!(
                "{} -> {} ({})",
                arena[t.source()].name().cyan(),
                arena[t.destination()].name().green(),
                t.condition()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Describes one expression: canonical text, inputs, normal forms and VHDL.
pub fn describe_expr(expr: &Expr) -> Result<String, Box<dyn std::error::Error>> {
    let inputs: Vec<String> = expr.symbols().into_iter().map(String::from).collect();
    Ok(format!(
        "{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}",
        "expr",
        expr,
        "inputs",
        inputs.join(", "),
        "simplified",
        expr.simplify(),
        "dnf",
        expr.to_dnf().simplify(),
        "cnf",
        expr.to_cnf().simplify(),
        "vhdl",
        expr.to_relational()?
    ))
}

/// Reports exclusivity and exhaustiveness of ad-hoc conditions.
pub fn describe_conditions(set: &ConditionSet) -> String {
    let yes_no = |v: bool| {
        if v {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        }
    };

    let mut output = format!(
        "exclusive: {}\nexhaustive: {}",
        yes_no(set.is_exclusive()),
        yes_no(set.is_exhaustive())
    );
    let members: Vec<&Condition> = set.iter().collect();
    for (i, j) in set.overlapping_pairs() {
        output.push_str(&format!("\n  '{}' overlaps '{}'", members[i], members[j]));
    }
    output
}

/// Serializes `value` in the requested format; text falls back to JSON.
pub fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json | OutputFormat::Text => Ok(serde_json::to_string_pretty(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DETECTOR: &str = r#"
name: detector
states:
  - name: s0
    default: true
    outputs: { u: 0 }
  - name: s1
    outputs: { u: 1 }
transitions:
  - { from: s0, to: s1, condition: "x" }
  - { from: s0, to: s0, condition: "~x" }
  - { from: s1, to: s0, condition: "~x & y" }
  - { from: s1, to: s1, condition: "x | ~y" }
"#;

    const BROKEN: &str = r#"
states:
  - name: a
  - name: b
transitions:
  - { from: a, to: b, condition: "x" }
  - { from: a, to: a, condition: "x & y" }
"#;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        colored::control::set_override(false);
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_check_passes() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.yaml", DETECTOR);
        let out = execute(Commands::Check { file }, &Config::default()).unwrap();
        assert!(out.success, "{}", out.text);
        assert!(out.text.contains("detector"));
        assert!(out.text.ends_with("OK"));
    }

    #[test]
    fn test_check_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "broken.yaml", BROKEN);
        let out = execute(Commands::Check { file }, &Config::default()).unwrap();
        assert!(!out.success);
        assert!(out.text.contains("UNEXITABLE_STATE"));
        assert!(out.text.contains("MISSING_DEFAULT"));
        assert!(out.text.contains("OVERLAPPING_CONDITIONS"));
    }

    #[test]
    fn test_check_respects_analysis_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "broken.yaml", BROKEN);
        let def = load(&file).unwrap();

        let analysis = AnalysisConfig {
            per_state_checks: false,
            whole_set_checks: false,
            require_default: false,
            reachability: false,
        };
        let out = check_report(&def, &analysis, OutputFormat::Text).unwrap();
        assert!(out.success, "{}", out.text);
        assert!(out.text.contains("warning"));
    }

    #[test]
    fn test_check_whole_set() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.yaml", DETECTOR);
        let def = load(&file).unwrap();
        let analysis = AnalysisConfig {
            whole_set_checks: true,
            ..AnalysisConfig::default()
        };
        let out = check_report(&def, &analysis, OutputFormat::Text).unwrap();
        assert!(!out.success);
    }

    #[test]
    fn test_check_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "broken.yaml", BROKEN);
        let def = load(&file).unwrap();
        let out = check_report(&def, &AnalysisConfig::default(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(json["passed"], false);
        assert_eq!(json["name"], "MooreFSM");
        assert!(json["diagnostics"]["findings"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn test_lower() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.yaml", DETECTOR);
        let out = execute(Commands::Lower { file }, &Config::default()).unwrap();
        let lines: Vec<&str> = out.text.lines().collect();
        assert_eq!(lines[0], "s0 -> s1: x='1'");
        assert_eq!(lines[2], "s1 -> s0: x='0' and y='1'");
        assert_eq!(lines[3], "s1 -> s1: x='1' or y='0'");
    }

    #[test]
    fn test_export() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.json", &{
            let def = MachineDefinition::from_yaml_str(DETECTOR).unwrap();
            def.to_json().unwrap().to_string()
        });
        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        let out = execute(
            Commands::Export {
                file,
                name: Some("Detector".into()),
            },
            &config,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(json["name"], "Detector");
        assert_eq!(json["inputs"], serde_json::json!(["x", "y"]));
        assert_eq!(json["transitions"][0]["vhdl"], "x='1'");
    }

    #[test]
    fn test_eval() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.yaml", DETECTOR);
        let out = execute(
            Commands::Eval {
                file: file.clone(),
                set: "x=1".into(),
                from: Some("s0".into()),
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(out.text, "s0 -> s1 (x)");

        let out = execute(
            Commands::Eval {
                file,
                set: "x=0,y=1".into(),
                from: None,
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(out.text.lines().count(), 2);
    }

    #[test]
    fn test_eval_unknown_state() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "detector.yaml", DETECTOR);
        let err = execute(
            Commands::Eval {
                file,
                set: "x=1".into(),
                from: Some("s9".into()),
            },
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn test_expr() {
        colored::control::set_override(false);
        let out = execute(
            Commands::Expr {
                text: "x and (y or not z)".into(),
            },
            &Config::default(),
        )
        .unwrap();
        assert!(out.text.contains("x & (y | !z)"));
        assert!(out.text.contains("x, y, z"));
        assert!(out.text.contains("x='1' and (y='1' or z='0')"));

        let err = execute(Commands::Expr { text: "x &".into() }, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_conditions() {
        colored::control::set_override(false);
        let out = execute(
            Commands::Conditions {
                conditions: vec!["x | y".into(), "~x".into(), "~y".into()],
            },
            &Config::default(),
        )
        .unwrap();
        assert!(out.text.contains("exclusive: no"));
        assert!(out.text.contains("exhaustive: yes"));
        assert!(out.text.contains("'x | y' overlaps '!x'"));
    }
}
