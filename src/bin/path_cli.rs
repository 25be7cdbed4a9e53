#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = native::run() {
        eprintln!("path_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use robopath_engine::Engine;
    use robopath_engine::chart::{ChartOptions, DeviationChart, PathChart};
    use robopath_engine::comparison::InsightsReport;
    use robopath_engine::geom::Axis;
    use robopath_engine::overview::{CaseFilter, filter_cases};
    use robopath_engine::parse::test_log::{self, FailureKind, TestOutcome};
    use serde::Serialize;
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"path_cli (robopath-engine)

USAGE:
  path_cli overview <log.json> [--json]
  path_cli list <log.json> [filters]
  path_cli analyze <log.json> <testname> [options]
  path_cli analyze-all <log.json>

FILTERS (list):
  --status <passed|failed>        Only tests with this outcome
  --failure <unequal|threshold>   Only failures of this kind (repeatable)
  --category <name>               Only tests whose name starts with <name>
  --date <YYYY-MM-DD>             Only tests started on this day

OPTIONS (analyze):
  --charts           Include path and deviation chart data (JSON output)
  --json             Print the insights as JSON instead of a table
  --out <path>       Write the JSON output to <path> instead of stdout
  --overwrite        Overwrite an existing --out file
  -h, --help         Show this help
"#;

    #[derive(Serialize)]
    struct AnalysisOutput {
        insights: InsightsReport,
        #[serde(skip_serializing_if = "Option::is_none")]
        charts: Option<ChartBundle>,
    }

    #[derive(Serialize)]
    struct ChartBundle {
        path: PathChart,
        deviation: DeviationChart,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "overview" => cmd_overview(&mut args),
            "list" => cmd_list(&mut args),
            "analyze" => cmd_analyze(&mut args),
            "analyze-all" => cmd_analyze_all(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn load_engine(path: &str) -> Result<Engine, String> {
        let json = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
        let mut engine = Engine::new();
        let count = engine.load_cases(&json).map_err(|e| e.to_string())?;
        log::info!("loaded {count} test cases from {path}");
        Ok(engine)
    }

    fn cmd_overview(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing log file")?;
        let mut as_json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => as_json = true,
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let overview = load_engine(&path)?.overview().map_err(|e| e.to_string())?;
        if as_json {
            println!("{}", to_json(&overview)?);
        } else {
            print!("{overview}");
        }
        Ok(())
    }

    fn cmd_list(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing log file")?;
        let mut filter = CaseFilter::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--status" => filter.outcome = Some(parse_outcome(&args.value("--status")?)?),
                "--failure" => filter
                    .failure_kinds
                    .push(parse_failure_kind(&args.value("--failure")?)?),
                "--category" => filter.category = Some(args.value("--category")?),
                "--date" => {
                    let value = args.value("--date")?;
                    let date = test_log::parse_date(&value)
                        .ok_or_else(|| format!("invalid date `{value}`"))?;
                    filter.date = Some(date);
                }
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let engine = load_engine(&path)?;
        let cases = engine.cases().map_err(|e| e.to_string())?;
        for case in filter_cases(cases, &filter) {
            let kind = case
                .failure_kind()
                .map_or(String::new(), |kind| format!(" ({})", kind.label()));
            println!(
                "{}\t{}\t{}{kind}",
                case.startdate.as_deref().unwrap_or("-"),
                case.name().unwrap_or("-"),
                case.outcome().label()
            );
        }
        Ok(())
    }

    fn cmd_analyze(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing log file")?;
        let test_name = args.next().ok_or("missing test name")?;

        let mut charts = false;
        let mut as_json = false;
        let mut out_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--charts" => charts = true,
                "--json" => as_json = true,
                "--out" => out_path = Some(PathBuf::from(args.value("--out")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let engine = load_engine(&path)?;
        let comparison = engine.comparison(&test_name).map_err(|e| e.to_string())?;
        let insights = comparison.insights_report();

        if !charts && !as_json && out_path.is_none() {
            print!("{}", render_insights(&insights));
            return Ok(());
        }

        let options = ChartOptions::default();
        let output = AnalysisOutput {
            insights,
            charts: charts.then(|| ChartBundle {
                path: comparison.path_chart(&options),
                deviation: comparison.deviation_chart(&options),
            }),
        };
        let json = to_json(&output)?;

        match out_path.as_deref() {
            Some(path) => {
                write_text_file(path, &json, overwrite)?;
                eprintln!("wrote {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }

    fn cmd_analyze_all(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing log file")?;
        if let Some(other) = args.next() {
            return Err(format!("unknown option `{other}`\n\n{USAGE}"));
        }

        let engine = load_engine(&path)?;
        for result in engine.analyze_all().map_err(|e| e.to_string())? {
            match result {
                Ok(insights) => println!(
                    "{}\tmax x={:.3} y={:.3} z={:.3}\tmean x={:.3} y={:.3} z={:.3}",
                    insights.test_name,
                    insights.max_deviation.x,
                    insights.max_deviation.y,
                    insights.max_deviation.z,
                    insights.mean_deviation.x,
                    insights.mean_deviation.y,
                    insights.mean_deviation.z,
                ),
                Err(err) => eprintln!("skipped: {err}"),
            }
        }
        Ok(())
    }

    fn render_insights(insights: &InsightsReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Test Name: {}", insights.test_name);
        let _ = writeln!(out, "Test Date: {}", insights.test_date);
        let _ = writeln!(out, "Status: {}", insights.test_status);
        let _ = writeln!(out);
        let _ = writeln!(out, "Axis  Max Deviations (mm)  Mean Deviations (mm)");
        for axis in Axis::ALL {
            let _ = writeln!(
                out,
                "{:<4}  {:>19.4}  {:>20.4}",
                axis.label(),
                insights.max_deviation.get(axis),
                insights.mean_deviation.get(axis)
            );
        }
        out
    }

    fn parse_outcome(value: &str) -> Result<TestOutcome, String> {
        match value.to_ascii_lowercase().as_str() {
            "passed" | "pass" => Ok(TestOutcome::Passed),
            "failed" | "fail" => Ok(TestOutcome::Failed),
            other => Err(format!("unknown status `{other}` (expected passed or failed)")),
        }
    }

    fn parse_failure_kind(value: &str) -> Result<FailureKind, String> {
        match value.to_ascii_lowercase().as_str() {
            "unequal" => Ok(FailureKind::UnequalLengths),
            "threshold" => Ok(FailureKind::Threshold),
            other => Err(format!("unknown failure type `{other}` (expected unequal or threshold)")),
        }
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
        serde_json::to_string_pretty(value).map_err(|e| format!("encode json: {e}"))
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }

}
