use evoting::Fingerprint;

pub fn command_keygen(_matches: &clap::ArgMatches) {
    let (secret, public) = evoting::generate_keypair();
    let (secret, public) = (
        hex::encode(secret.to_bytes()),
        base64::encode(public.as_bytes()),
    );

    println!("secret-key: {}", secret);
    println!("public-key: {}", public);
}

pub fn command_fingerprint(matches: &clap::ArgMatches) {
    // Unwrap is OK, IDENTITY is required
    let identity = matches.value_of("IDENTITY").unwrap();
    println!("{}", Fingerprint::derive(identity));
}
