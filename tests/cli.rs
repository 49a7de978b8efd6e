use clap::Parser;
use strictimports::cli::{Cli, Commands, OracleKind};

#[test]
fn check_flag_parsing() {
    // Given
    let argv = vec![
        "strictimports",
        "check",
        "--local",
        "github.com/acme",
        "--exclude",
        "*_test.go,gen*",
        "--exclude-dir",
        "gen,third_party",
        "-n",
        "--oracle",
        "builtin",
        "./src",
    ];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    match cmd.command {
        Commands::Check(args) => {
            assert_eq!(args.select.local.as_deref(), Some("github.com/acme"));
            assert_eq!(args.select.exclude, vec!["*_test.go", "gen*"]);
            assert_eq!(args.select.exclude_dir, vec!["gen", "third_party"]);
            assert!(args.select.no_recurse);
            assert_eq!(args.select.oracle, Some(OracleKind::Builtin));
            assert_eq!(args.select.paths.len(), 1);
            assert!(!args.json);
            assert!(!args.diff);
        }
        _ => panic!("expected Check command"),
    }
}

#[test]
fn fix_shares_selection_flags() {
    let argv = vec!["strictimports", "fix", "--local", "example.com/m", "."];

    match Cli::parse_from(argv).command {
        Commands::Fix(args) => {
            assert_eq!(args.select.local.as_deref(), Some("example.com/m"));
            assert!(!args.select.no_recurse);
        }
        _ => panic!("expected Fix command"),
    }
}

#[test]
fn check_requires_at_least_one_path() {
    let result = Cli::try_parse_from(vec!["strictimports", "check"]);
    assert!(result.is_err());
}

#[test]
fn global_flags_apply_after_subcommand() {
    let cli = Cli::parse_from(vec![
        "strictimports",
        "check",
        ".",
        "--no-color",
        "--quiet",
        "--dry-run",
    ]);

    assert!(cli.no_color);
    assert!(cli.quiet);
    assert!(cli.dry_run);
}
