//! Thin CLI driver: loads a graph, runs one query, prints the `RouteResult`
//! as JSON.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use tdroute::config::Config;
use tdroute::driver::Driver;
use tdroute::graph::loader;
use tdroute::result::Objective;

fn parse_objective(mode: &str) -> Option<Objective> {
    match mode {
        "wideness" => Some(Objective::WidenessOnly),
        "turns" => Some(Objective::MinTurnsOnly),
        "pareto" => Some(Objective::WidenessAndTurns),
        _ => None,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = env::args();
    args.next();

    let usage = "usage: tdroute <nodes-file> <edges-file> <src> <dst> <t0> <t1> <budget> <wideness|turns|pareto>";
    let nodes_path = args.next().expect(usage);
    let edges_path = args.next().expect(usage);
    let source: u32 = args.next().expect(usage).parse().expect("src must be an integer node id");
    let destination: u32 = args.next().expect(usage).parse().expect("dst must be an integer node id");
    let tau0: f64 = args.next().expect(usage).parse().expect("t0 must be a number");
    let tau1: f64 = args.next().expect(usage).parse().expect("t1 must be a number");
    let budget: f64 = args.next().expect(usage).parse().expect("budget must be a number");
    let mode = args.next().expect(usage);
    let objective = parse_objective(&mode).unwrap_or_else(|| panic!("unknown objective {mode:?}, {usage}"));

    let config = Config::default();

    let nodes_file = BufReader::new(File::open(&nodes_path).expect("could not open nodes file"));
    let edges_file = BufReader::new(File::open(&edges_path).expect("could not open edges file"));
    let graph = loader::load(nodes_file, edges_file, config.rush_hour_windows);

    let driver = match Driver::new(graph, config) {
        Ok(driver) => driver,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match driver.query(source, destination, tau0, tau1, budget, objective) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result).expect("RouteResult always serializes"));
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "query failed");
            ExitCode::FAILURE
        }
    }
}
