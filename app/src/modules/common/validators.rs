use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches a message made only of a 4 digit year, eg: `2021`
    pub static ref REGEX_IS_YEAR: Regex = Regex::new(r"^\d{4}$").unwrap();
}
