use std::process::ExitCode;

use clap::{value_parser, Arg, ArgMatches, Command};
use trackademia_client::app::terminal::{FixedGeolocator, JsonChartSurface, TerminalUi};
use trackademia_client::interface::Ui;
use trackademia_client::app::{self, Outcome};
use trackademia_client::chart::render_attendance_chart;
use trackademia_client::error::{ErrorKind, Result};
use trackademia_client::format::{format_date, format_time};
use trackademia_client::geo::check_location;
use trackademia_client::logging::init_logging;
use trackademia_client::model::structs::{AnalyticsEntry, EntityId, Position, SessionStatus};
use trackademia_client::{ClientConfig, NoWasmClient};

fn coordinate(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .help(help)
        .allow_negative_numbers(true)
        .value_parser(value_parser!(f64))
}

fn cli() -> Command {
    Command::new("trackademia")
        .about("Command line client for the Trackademia attendance backend")
        .subcommand_required(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Backend address (default: $TRACKADEMIA_BASE_URL or http://localhost:5000)"),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .short('u')
                .global(true)
                .help("Login name (default: $TRACKADEMIA_USERNAME)"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .short('p')
                .global(true)
                .help("Password (default: $TRACKADEMIA_PASSWORD)"),
        )
        .subcommand(
            Command::new("status")
                .about("Change the status of a session")
                .arg(Arg::new("session_id").required(true))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .help("upcoming, active or past"),
                ),
        )
        .subcommand(
            Command::new("enroll")
                .about("Add students to a course")
                .arg(Arg::new("course_id").required(true))
                .arg(Arg::new("student_ids").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("mark")
                .about("Mark attendance for a session from the given coordinates")
                .arg(Arg::new("session_id").required(true))
                .arg(coordinate("lat", "lat", "Latitude in degrees").required(true))
                .arg(coordinate("lon", "lon", "Longitude in degrees").required(true)),
        )
        .subcommand(
            Command::new("format-date")
                .about("Format a date for display")
                .arg(Arg::new("date").required(true)),
        )
        .subcommand(
            Command::new("format-time")
                .about("Format an HH:MM time for display")
                .arg(Arg::new("time").required(true)),
        )
        .subcommand(
            Command::new("chart")
                .about("Print the attendance chart configuration for an analytics JSON file")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("check-location")
                .about("Check whether a position is within range of a session")
                .arg(coordinate("lat", "lat", "Student latitude").required(true))
                .arg(coordinate("lon", "lon", "Student longitude").required(true))
                .arg(coordinate("session_lat", "session-lat", "Session latitude"))
                .arg(coordinate("session_lon", "session-lon", "Session longitude"))
                .arg(
                    Arg::new("max_distance")
                        .long("max-distance")
                        .default_value("50")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("accuracy")
                        .long("accuracy")
                        .value_parser(value_parser!(f64)),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.base_url = url.clone();
    }
    if let Some(username) = matches.get_one::<String>("username") {
        config.username = Some(username.clone());
    }
    if let Some(password) = matches.get_one::<String>("password") {
        config.password = Some(password.clone());
    }
    config
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| ErrorKind::ConfigError(format!("missing <{name}>")).into())
}

fn id(matches: &ArgMatches, name: &str) -> Result<EntityId> {
    Ok(required(matches, name)?
        .parse()
        .unwrap_or_else(|never| match never {}))
}

fn position(matches: &ArgMatches, lat: &str, lon: &str) -> Option<Position> {
    match (matches.get_one::<f64>(lat), matches.get_one::<f64>(lon)) {
        (Some(&latitude), Some(&longitude)) => Some(Position::new(latitude, longitude)),
        _ => None,
    }
}

/// Carry out a server outcome and report whether the change went through.
fn settle<U: Ui>(ui: &U, outcome: Outcome) -> bool {
    outcome.apply(ui);
    outcome.is_refresh()
}

async fn enroll<U: Ui>(config: &ClientConfig, matches: &ArgMatches, ui: &U) -> Result<bool> {
    let client = NoWasmClient::connect(config).await?;
    let course_id = id(matches, "course_id")?;
    let student_ids: Vec<EntityId> = matches
        .get_many::<String>("student_ids")
        .into_iter()
        .flatten()
        .map(|s| s.parse().unwrap_or_else(|never| match never {}))
        .collect();

    if let [student_id] = student_ids.as_slice() {
        let outcome = app::add_student_to_course(&client, ui, course_id, student_id.clone()).await;
        return Ok(settle(ui, outcome));
    }

    let mut all_added = true;
    for (student_id, result) in app::enroll_students(&client, &course_id, &student_ids).await {
        match result {
            Ok(resp) if resp.success => println!("{student_id}: added"),
            Ok(resp) => {
                all_added = false;
                println!(
                    "{student_id}: {}",
                    resp.message.as_deref().unwrap_or(app::ADD_STUDENT_FAILED)
                );
            }
            Err(e) => {
                all_added = false;
                log::error!("Error: {e}");
                println!("{student_id}: {}", app::GENERIC_ERROR);
            }
        }
    }

    if all_added {
        ui.refresh();
    }
    Ok(all_added)
}

/// Run one subcommand. `Ok(false)` means it ran but did not succeed.
async fn run<U: Ui>(config: &ClientConfig, matches: &ArgMatches, ui: &U) -> Result<bool> {
    match matches.subcommand() {
        Some(("status", sub)) => {
            let client = NoWasmClient::connect(config).await?;
            let status: SessionStatus = required(sub, "status")?
                .parse()
                .unwrap_or_else(|never| match never {});
            let outcome = app::update_session_status(&client, ui, id(sub, "session_id")?, status).await;
            Ok(settle(ui, outcome))
        }
        Some(("enroll", sub)) => enroll(config, sub, ui).await,
        Some(("mark", sub)) => {
            let client = NoWasmClient::connect(config).await?;
            let geolocator = FixedGeolocator::new(position(sub, "lat", "lon"));
            let outcome = app::mark_attendance(&client, ui, &geolocator, id(sub, "session_id")?).await;
            Ok(settle(ui, outcome))
        }
        Some(("format-date", sub)) => {
            println!("{}", format_date(required(sub, "date")?)?);
            Ok(true)
        }
        Some(("format-time", sub)) => {
            println!("{}", format_time(required(sub, "time")?)?);
            Ok(true)
        }
        Some(("chart", sub)) => {
            let raw = std::fs::read_to_string(required(sub, "file")?)?;
            let analytics: Vec<AnalyticsEntry> = serde_json::from_str(&raw)?;
            let surface = JsonChartSurface::new(config.chart_canvas_id.clone(), std::io::stdout());
            render_attendance_chart(&surface, &config.chart_canvas_id, &analytics)
        }
        Some(("check-location", sub)) => {
            let student = position(sub, "lat", "lon")
                .ok_or_else(|| ErrorKind::ConfigError("missing --lat/--lon".to_string()))?;
            let session = position(sub, "session_lat", "session_lon");
            let max_distance = sub.get_one::<f64>("max_distance").copied().unwrap_or(50.0);
            let accuracy = sub.get_one::<f64>("accuracy").copied();

            let check = check_location(&student, session.as_ref(), max_distance, accuracy);
            println!("{}", serde_json::to_string_pretty(&check)?);
            Ok(check.within_range)
        }
        _ => Err(ErrorKind::ConfigError("unknown command".to_string()).into()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    let config = load_config(&matches);
    init_logging(&config.log_filter);
    log::debug!("{config:?}");

    Ok(if run(&config, &matches, &TerminalUi).await? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingUi {
        alerts: RefCell<Vec<String>>,
        refreshes: Cell<u32>,
    }

    impl Ui for RecordingUi {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn refresh(&self) {
            self.refreshes.set(self.refreshes.get() + 1);
        }
    }

    async fn run_args(args: &[&str], ui: &RecordingUi) -> Result<bool> {
        let matches = cli().get_matches_from(args.iter().copied());
        run(&ClientConfig::default(), &matches, ui).await
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[tokio::test]
    async fn local_commands_do_not_refresh() {
        let ui = RecordingUi::default();

        assert!(run_args(&["trackademia", "format-date", "2024-01-05"], &ui).await.unwrap());
        assert!(run_args(&["trackademia", "format-time", "14:30"], &ui).await.unwrap());
        assert!(!run_args(
            &["trackademia", "check-location", "--lat", "1", "--lon", "1"],
            &ui
        )
        .await
        .unwrap());

        assert_eq!(ui.refreshes.get(), 0);
        assert!(ui.alerts.borrow().is_empty());
    }

    #[tokio::test]
    async fn bad_date_is_an_error() {
        let ui = RecordingUi::default();
        assert!(run_args(&["trackademia", "format-date", "nope"], &ui).await.is_err());
    }

    #[test]
    fn mark_needs_coordinates() {
        assert!(cli().try_get_matches_from(["trackademia", "mark", "S1"]).is_err());
        assert!(cli()
            .try_get_matches_from(["trackademia", "mark", "S1", "--lat", "-33.9", "--lon", "18.4"])
            .is_ok());
    }
}
