use ed25519_dalek::SecretKey;
use evoting::BallotRequest;
use evoting::VoterClaim;

pub fn command_ballot(matches: &clap::ArgMatches, secret_key: Option<&SecretKey>) {
    // Subcommands
    if let Some(matches) = matches.subcommand_matches("generate") {
        command_ballot_generate(matches, secret_key);
        std::process::exit(0);
    }
}

pub fn command_ballot_generate(matches: &clap::ArgMatches, secret_key: Option<&SecretKey>) {
    let generated;
    let secret_key: &SecretKey = match secret_key {
        Some(sk) => sk,
        None => {
            let (secret, _public) = evoting::generate_keypair();
            eprintln!(
                "evoting ballot: no secret key given, signing with a fresh one: {}",
                hex::encode(secret.to_bytes())
            );
            generated = secret;
            &generated
        }
    };

    // Unwraps are OK, all of these args are required
    let claim = VoterClaim {
        identity: matches.value_of("identity").unwrap().to_owned(),
        card_number: matches.value_of("card-number").unwrap().to_owned(),
        email: matches.value_of("email").unwrap().to_owned(),
        full_name: matches.value_of("full-name").unwrap().to_owned(),
    };
    let candidate = matches.value_of("CANDIDATE").unwrap();

    let request = BallotRequest::signed(&claim, candidate, secret_key);

    let request_json = serde_json::to_string_pretty(&request).unwrap_or_else(|e| {
        eprintln!("evoting ballot: cannot serialize ballot: {}", e);
        std::process::exit(1);
    });
    println!("{}", request_json);
}
