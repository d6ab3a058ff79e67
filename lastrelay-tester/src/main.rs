mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use logic::{
    GameplayStrategy, LogicTester, ScenarioResult, get_scenario, list_scenarios,
    resolve_seed_inputs, run_script,
};
use util::split_csv;

const SCRIPT_SCENARIO: &str = "script";

#[derive(Debug, Parser)]
#[command(name = "lastrelay-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for Signal Lost: The Last Relay")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers, `a..b` ranges or `sweep:N`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Play every simulation scenario with this strategy instead of its own
    #[arg(long)]
    strategy: Option<String>,

    /// Commands for the `script` scenario, separated by `;`
    #[arg(long)]
    script: Option<String>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios, args.script.is_some());
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let strategy = resolve_strategy(args.strategy.as_deref())?;

    let mut results = run_logic_scenarios(&args, &scenarios, &seeds, strategy);
    if scenarios.iter().any(|s| s == SCRIPT_SCENARIO) {
        results.extend(run_script_scenario(&args, &seeds)?);
    }

    write_reports(&args, &results, start_time.elapsed())?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "📡 Last Relay Automated Tester".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

fn expand_scenarios(scenarios_arg: &str, has_script: bool) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        scenarios.extend(
            ["smoke", "determinism", "invariants"]
                .iter()
                .map(|s| (*s).to_string()),
        );
        scenarios.extend(
            GameplayStrategy::ALL
                .iter()
                .map(|strategy| format!("strategy-{}", strategy.key())),
        );
    }
    if has_script && !scenarios.iter().any(|s| s == SCRIPT_SCENARIO) {
        scenarios.push(SCRIPT_SCENARIO.to_string());
    }
    let mut seen = std::collections::HashSet::new();
    scenarios.retain(|s| seen.insert(s.clone()));
    scenarios
}

fn resolve_strategy(raw: Option<&str>) -> Result<Option<GameplayStrategy>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match GameplayStrategy::from_key(raw) {
        Some(strategy) => Ok(Some(strategy)),
        None => bail!(
            "Unknown strategy '{raw}' (expected one of: {})",
            GameplayStrategy::ALL
                .iter()
                .map(|s| s.key())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u32],
    strategy: Option<GameplayStrategy>,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose);

    for scenario_name in scenarios {
        if scenario_name == SCRIPT_SCENARIO {
            continue;
        }
        let Some(mut scenario) = get_scenario(scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        if let Some(strategy) = strategy {
            scenario.plan.strategy = strategy;
        }
        results.extend(tester.run_scenario(&scenario, seeds, args.iterations));
    }

    results
}

fn run_script_scenario(args: &Args, seeds: &[u32]) -> Result<Vec<ScenarioResult>> {
    let Some(script) = args.script.as_deref() else {
        eprintln!(
            "⚠️  Scenario {} needs --script; skipping",
            SCRIPT_SCENARIO.yellow()
        );
        return Ok(Vec::new());
    };

    println!("{}", "📜 Replaying Script".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let mut results = Vec::new();
    for &seed in seeds {
        let start = Instant::now();
        let run = run_script(seed, script)?;
        let duration = start.elapsed();

        if args.verbose || seeds.len() == 1 {
            println!("{}", format!("── seed {seed} ──").bright_white());
            for line in &run.transcript {
                println!("{line}");
            }
        }

        let failures: Vec<String> = run
            .final_state
            .validate()
            .err()
            .map(|err| format!("final state invalid: {err}"))
            .into_iter()
            .collect();
        println!(
            "✅ seed {}: {} accepted, {} rejected, ending: {}",
            run.seed,
            run.accepted,
            run.rejected,
            run.final_state.ending_text().unwrap_or("in progress")
        );
        results.push(ScenarioResult {
            scenario_name: "Script Replay".to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: 1,
            successful_iterations: usize::from(failures.is_empty()),
            failures,
            average_duration: duration,
            performance_data: vec![duration],
        });
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], duration: Duration) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Last Relay Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            strategy: None,
            script: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "lastrelay-main-{label}-{}",
            std::process::id()
        ))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1337,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all,smoke", false);
        assert_eq!(expanded[0], "smoke");
        assert!(expanded.contains(&"strategy-monte-carlo".to_string()));
        assert_eq!(expanded.iter().filter(|s| *s == "smoke").count(), 1);
        assert!(!expanded.contains(&"script".to_string()));
    }

    #[test]
    fn script_flag_adds_script_scenario() {
        let expanded = expand_scenarios("determinism", true);
        assert_eq!(expanded, vec!["determinism".to_string(), "script".to_string()]);
    }

    #[test]
    fn resolve_strategy_rejects_unknown_names() {
        assert_eq!(resolve_strategy(None).unwrap(), None);
        assert_eq!(
            resolve_strategy(Some("Aggressive")).unwrap(),
            Some(GameplayStrategy::Aggressive)
        );
        let err = resolve_strategy(Some("reckless")).unwrap_err();
        assert!(err.to_string().contains("monte-carlo"));
    }

    #[test]
    fn strategy_override_runs_requested_policy() {
        let args = base_args();
        let results = run_logic_scenarios(
            &args,
            &["strategy-cautious".to_string()],
            &[7],
            Some(GameplayStrategy::Balanced),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scenario_name, "Cautious Strategy");
        assert!(results[0].passed, "{:?}", results[0].failures);
    }

    #[test]
    fn script_scenario_replays_each_seed() {
        let args = Args {
            script: Some("scan; repair ant; rest".to_string()),
            ..base_args()
        };
        let results = run_script_scenario(&args, &[1, 2]).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));

        let skipped = run_script_scenario(&base_args(), &[1]).unwrap();
        assert!(skipped.is_empty());
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_file("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("strategy-balanced"));
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = temp_file("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
        assert!(content.contains("generated_at"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_failures() {
        let temp = temp_file("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Total scenarios: 1"));
        assert!(content.contains("failure"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
