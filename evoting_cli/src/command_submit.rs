use content_inspector::ContentType;
use evoting::BallotRequest;
use serde_json::json;

pub fn command_submit(matches: &clap::ArgMatches) {
    // Unwrap is OK, INPUT is required
    let filename = crate::expand(matches.value_of("INPUT").unwrap());

    let file_bytes = match std::fs::read(&filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("evoting submit: unable to read {}: {}, ", &filename, e);
            std::process::exit(1);
        }
    };

    let request: BallotRequest = match content_inspector::inspect(&file_bytes) {
        ContentType::UTF_8 => serde_json::from_slice(&file_bytes).unwrap_or_else(|e| {
            eprintln!("evoting submit: unable to read {}: {}, ", &filename, e);
            std::process::exit(1);
        }),
        ContentType::BINARY => serde_cbor::from_slice(&file_bytes).unwrap_or_else(|e| {
            eprintln!("evoting submit: unable to read {}: {}, ", &filename, e);
            std::process::exit(1);
        }),
        _ => {
            eprintln!("evoting submit: invalid file format for {}", &filename);
            std::process::exit(1);
        }
    };

    let election = crate::setup::election();

    match election.submit(&request) {
        Ok(accepted) => {
            let outcome = json!({
                "status": 200,
                "candidate": accepted.candidate,
                "receipt": accepted.receipt,
            });
            println!("{}", outcome);
        }
        Err(rejection) => {
            let outcome = json!({
                "status": rejection.status(),
                "error": rejection,
                "message": rejection.to_string(),
            });
            println!("{}", outcome);
            std::process::exit(2);
        }
    }
}
