use clap::{App, AppSettings, Arg};
use std::ffi::OsString;

use crate::version;

pub fn create_app<'a, 'b>() -> App<'a, 'b> {
    App::new("fwrank")
        .version(version::LATEST)
        .author("Andraz Tori <atori@outbrain.com>")
        .about("FTRL-Proximal online learner for click prediction and ranking")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(Arg::with_name("data")
                .long("data")
                .short("d")
                .value_name("filename")
                .help("File with training/test records (.gz and .zst are decompressed)")
                .takes_value(true)
                .required(true))
        .arg(Arg::with_name("groups")
                .long("groups")
                .value_name("filename")
                .help("File with one group size per line; records are consumed in groups of these sizes")
                .takes_value(true))
        .arg(Arg::with_name("loss")
                .long("loss")
                .value_name("logistic|lambdarank")
                .help("Objective: logistic loss per record or pairwise ranking per group")
                .takes_value(true))
        .arg(Arg::with_name("alpha")
                .long("alpha")
                .value_name("0.1")
                .help("Scale of the per-coordinate adaptive learning rate")
                .takes_value(true))
        .arg(Arg::with_name("beta")
                .long("beta")
                .value_name("1.0")
                .help("Learning rate stabilization constant")
                .takes_value(true))
        .arg(Arg::with_name("l1")
                .long("l1")
                .value_name("1.0")
                .help("L1 regularization strength")
                .allow_hyphen_values(true)
                .takes_value(true))
        .arg(Arg::with_name("l2")
                .long("l2")
                .value_name("1.0")
                .help("L2 regularization strength")
                .allow_hyphen_values(true)
                .takes_value(true))
        .arg(Arg::with_name("hash_space")
                .long("hash_space")
                .short("D")
                .value_name("1048576")
                .help("Number of hashed weight slots")
                .takes_value(true))
        .arg(Arg::with_name("interactions")
                .long("interactions")
                .help("Add hashed pairwise interactions between features of different fields"))
        .arg(Arg::with_name("interaction_dropout")
                .long("interaction_dropout")
                .value_name("0.25")
                .help("Probability of skipping a candidate interaction pair")
                .takes_value(true))
        .arg(Arg::with_name("hash_seed")
                .long("hash_seed")
                .value_name("0")
                .help("Seed of the feature hash")
                .takes_value(true))
        .arg(Arg::with_name("random_seed")
                .long("random_seed")
                .value_name("0")
                .help("Seed of the interaction dropout random source")
                .takes_value(true))
        .arg(Arg::with_name("passes")
                .long("passes")
                .value_name("1")
                .help("Number of passes over the data")
                .takes_value(true))
        .arg(Arg::with_name("testonly")
                .long("testonly")
                .short("t")
                .help("Ignore label information and just test"))
        .arg(Arg::with_name("initial_regressor")
                .long("initial_regressor")
                .short("i")
                .value_name("filename")
                .help("Initial regressor(s) to load into memory (arg is filename)")
                .takes_value(true))
        .arg(Arg::with_name("final_regressor")
                .long("final_regressor")
                .short("f")
                .value_name("filename")
                .help("Final regressor to save (arg is filename)")
                .takes_value(true))
        .arg(Arg::with_name("predictions")
                .long("predictions")
                .short("p")
                .value_name("filename")
                .help("File to output predictions to")
                .takes_value(true))
}

pub fn parse<I, T>(args: I) -> clap::ArgMatches<'static>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    create_app().get_matches_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cl = parse(vec!["fwrank", "-d", "a.txt", "--interactions", "-t", "--l2", "-1"]);
        assert_eq!(cl.value_of("data"), Some("a.txt"));
        assert!(cl.is_present("interactions"));
        assert!(cl.is_present("testonly"));
        assert_eq!(cl.value_of("l2"), Some("-1"));
        assert!(!cl.is_present("groups"));
    }

    #[test]
    fn test_missing_data_is_error() {
        let result = create_app().get_matches_from_safe(vec!["fwrank", "--alpha", "0.1"]);
        assert!(result.is_err());
    }
}
