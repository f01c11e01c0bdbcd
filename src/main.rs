use anyhow::{Context, Result};

use shift_planner::display::{print_schedule, write_schedule_to_file};
use shift_planner::export::{default_export_name, export_schedule_csv};
use shift_planner::parser::load_employees;
use shift_planner::rng::ScheduleRng;
use shift_planner::settings::parse_closed_day;
use shift_planner::{generate_schedule, StoreSettings};

const USAGE: &str = "usage: shift-planner <employees.csv> [--settings file.json] [--closed-day Dom] \
[--open HH:MM] [--close HH:MM] [--seed N] [--out file.csv] [--report file.txt]\n       shift-planner web [port]";

/// Value following `flag`, if present
fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
}

fn load_settings(args: &[String]) -> Result<StoreSettings> {
    let mut settings = match parse_arg(args, "--settings") {
        Some(path) => StoreSettings::load(path).with_context(|| format!("reading settings {path}"))?,
        None => StoreSettings::default(),
    };
    if let Some(day) = parse_arg(args, "--closed-day") {
        settings.closed_day = parse_closed_day(day)?;
    }
    if let Some(open) = parse_arg(args, "--open") {
        settings.open_time = open.to_string();
    }
    if let Some(close) = parse_arg(args, "--close") {
        settings.close_time = close.to_string();
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string());
        let settings = load_settings(&args)?;

        println!("Starting web server on port {}...", port);
        println!("Access the API at http://localhost:{}/api/schedule", port);

        shift_planner::web::start_server(port, password, settings).await?;
        return Ok(());
    }

    let Some(csv_path) = args.get(1).filter(|a| !a.starts_with("--")) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let settings = load_settings(&args)?;
    let employees = load_employees(csv_path).with_context(|| format!("loading {csv_path}"))?;
    println!("Loaded {} employees", employees.len());

    let mut rng = match parse_arg(&args, "--seed") {
        Some(seed) => ScheduleRng::seeded(seed.parse().context("--seed must be an integer")?),
        None => ScheduleRng::from_entropy(),
    };

    let schedule = generate_schedule(&employees, &settings, &mut rng);
    print_schedule(&schedule);
    println!("\nSeed: {}", rng.seed());

    let out = parse_arg(&args, "--out")
        .map(str::to_string)
        .unwrap_or_else(default_export_name);
    export_schedule_csv(&schedule, &out)?;
    println!("Schedule saved to {out}");

    if let Some(report) = parse_arg(&args, "--report") {
        write_schedule_to_file(&schedule, report)
            .map_err(|e| anyhow::anyhow!("writing {report}: {e}"))?;
        println!("Report saved to {report}");
    }

    Ok(())
}
