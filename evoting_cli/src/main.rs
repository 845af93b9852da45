use clap::{App, AppSettings, Arg, SubCommand};
use ed25519_dalek::SecretKey;
use log::LevelFilter;

mod command_admin;
mod command_ballot;
mod command_keygen;
mod command_submit;
mod setup;

use command_admin::*;
use command_ballot::*;
use command_keygen::*;
use command_submit::*;

fn main() {
    let matches = App::new("evoting")
        .version("0.1")
        .about("Casts, records and tallies signed ballots")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("secret-key")
                .long("secret-key")
                .takes_value(true)
                .help("Voter secret key (hex) - can also be set with EVOTING_SECRET_KEY"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a voter keypair"))
        .subcommand(
            SubCommand::with_name("fingerprint")
                .about("Print the voter fingerprint for a roll identity")
                .arg(
                    Arg::with_name("IDENTITY")
                        .index(1)
                        .required(true)
                        .help("Voter identity as it appears on the roll"),
                ),
        )
        .subcommand(
            SubCommand::with_name("ballot")
                .about("Voter ballots")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("generate")
                        .about("Sign a ballot and print the submission as JSON")
                        .arg(
                            Arg::with_name("identity")
                                .long("identity")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("card-number")
                                .long("card-number")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("email")
                                .long("email")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("full-name")
                                .long("full-name")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("CANDIDATE")
                                .index(1)
                                .required(true)
                                .help("Candidate to vote for"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("submit")
                .about("Submit a ballot to the journal (exit code 2 if rejected)")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("Ballot submission file in JSON or CBOR format"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Tally the journal (admin)")
                .arg(admin_token_arg()),
        )
        .subcommand(
            SubCommand::with_name("reset")
                .about("Empty the ballot box (admin)")
                .arg(admin_token_arg()),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // Subcommands
    match matches.subcommand() {
        ("keygen", Some(matches)) => command_keygen(matches),
        ("fingerprint", Some(matches)) => command_fingerprint(matches),
        ("ballot", Some(sub_matches)) => {
            let secret_key = secret_key(&matches);
            command_ballot(sub_matches, secret_key.as_ref())
        }
        ("submit", Some(matches)) => command_submit(matches),
        ("tally", Some(matches)) => command_tally(matches),
        ("reset", Some(matches)) => command_reset(matches),
        _ => {}
    }
}

fn admin_token_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("admin-token")
        .long("admin-token")
        .takes_value(true)
        .required(true)
        .help("Administrator token")
}

/// The voter secret key from `--secret-key` or `EVOTING_SECRET_KEY`, if either is set
fn secret_key(matches: &clap::ArgMatches) -> Option<SecretKey> {
    let env_var = std::env::var("EVOTING_SECRET_KEY").ok();
    let hex_key = matches.value_of("secret-key").or(env_var.as_deref())?;

    let secret_key = parse_secret_key(hex_key).unwrap_or_else(|e| {
        eprintln!("evoting: {}", e);
        std::process::exit(1);
    });
    Some(secret_key)
}

fn parse_secret_key(hex_key: &str) -> Result<SecretKey, String> {
    let bytes =
        hex::decode(hex_key.trim()).map_err(|e| format!("secret key is not valid hex: {}", e))?;
    SecretKey::from_bytes(&bytes).map_err(|e| format!("invalid secret key: {}", e))
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .unwrap_or_else(|e| {
            eprintln!("evoting: cannot expand {}: {}", input, e);
            std::process::exit(1);
        })
        .into_owned()
}
