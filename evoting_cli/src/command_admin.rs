use evoting::Error;

pub fn command_tally(matches: &clap::ArgMatches) {
    let config = crate::setup::config();
    let election = crate::setup::election_with(&config);

    // Unwrap is OK, admin-token is required
    let token = matches.value_of("admin-token").unwrap();

    let report = election
        .admin_tally(&config.admin_gate, token)
        .unwrap_or_else(|e| fail("tally", e));

    let report_json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        eprintln!("evoting tally: cannot serialize report: {}", e);
        std::process::exit(1);
    });
    println!("{}", report_json);
}

pub fn command_reset(matches: &clap::ArgMatches) {
    let config = crate::setup::config();
    let election = crate::setup::election_with(&config);

    // Unwrap is OK, admin-token is required
    let token = matches.value_of("admin-token").unwrap();

    let cleared = election
        .admin_reset(&config.admin_gate, token)
        .unwrap_or_else(|e| fail("reset", e));

    println!("{}", serde_json::json!({ "cleared": cleared }));
}

fn fail(command: &str, e: Error) -> ! {
    eprintln!("evoting {}: {}", command, e);
    std::process::exit(1);
}
