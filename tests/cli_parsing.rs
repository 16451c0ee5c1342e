use clap::Parser;
use serde_json::json;
use sportcache::cli::commands::clear::ClearArgs;
use sportcache::cli::{params_from, Cli, Commands};
use sportcache::InvalidationMatcher;

#[test]
fn test_parse_init() {
    let cli = Cli::try_parse_from(["sportcache", "init", "--force", "/srv/dashboard"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path.to_str(), Some("/srv/dashboard"));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_get_with_params() {
    let cli = Cli::try_parse_from([
        "sportcache",
        "get",
        "fixtures",
        "-p",
        "date=2024-01-01",
        "--param",
        "league=39",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Get(args) => {
            assert_eq!(args.endpoint, "fixtures");
            assert!(!args.fetch);
            let params = params_from(args.params);
            assert_eq!(params.get("date"), Some(&json!("2024-01-01")));
            assert_eq!(params.get("league"), Some(&json!(39)));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_get_rejects_bad_param() {
    assert!(Cli::try_parse_from(["sportcache", "get", "fixtures", "-p", "date"]).is_err());
}

#[test]
fn test_parse_set_with_ttl() {
    let cli = Cli::try_parse_from([
        "sportcache",
        "set",
        "odds",
        r#"{"home":1.9}"#,
        "-p",
        "fixture=5",
        "--ttl",
        "60",
    ])
    .unwrap();

    match cli.command {
        Commands::Set(args) => {
            assert_eq!(args.endpoint, "odds");
            assert_eq!(args.value, r#"{"home":1.9}"#);
            assert_eq!(args.ttl, Some(60));
            assert_eq!(args.params.len(), 1);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_clear_variants() {
    fn clear_args(argv: &[&str]) -> ClearArgs {
        let mut full = vec!["sportcache", "clear"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Clear(args) => args,
            _ => panic!("Wrong top-level command"),
        }
    }

    assert_eq!(clear_args(&["--all"]).matcher(), InvalidationMatcher::All);
    assert_eq!(
        clear_args(&["--endpoint", "fixtures"]).matcher(),
        InvalidationMatcher::Endpoint("fixtures".to_string())
    );
    assert_eq!(
        clear_args(&["--endpoint-prefix", "h2h"]).matcher(),
        InvalidationMatcher::EndpointPrefix("h2h".to_string())
    );
}

#[test]
fn test_parse_clear_requires_target() {
    assert!(Cli::try_parse_from(["sportcache", "clear"]).is_err());
}

#[test]
fn test_parse_preload_and_serve() {
    let cli = Cli::try_parse_from(["sportcache", "preload", "--days-ahead", "3", "--no-leagues"]).unwrap();
    match cli.command {
        Commands::Preload(args) => {
            assert_eq!(args.days_ahead, Some(3));
            assert!(args.no_leagues);
        }
        _ => panic!("Wrong top-level command"),
    }

    let cli = Cli::try_parse_from(["sportcache", "serve", "--no-preload"]).unwrap();
    assert!(matches!(cli.command, Commands::Serve(args) if args.no_preload));
}

#[test]
fn test_parse_stats_and_sweep() {
    assert!(matches!(
        Cli::try_parse_from(["sportcache", "stats"]).unwrap().command,
        Commands::Stats(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["sportcache", "-j", "sweep"]).unwrap().command,
        Commands::Sweep
    ));
}
