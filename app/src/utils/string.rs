//! see: https://rust-lang.github.io/rfcs/0445-extension-trait-conventions.html

pub trait StringExt {
    fn pop_if_is(&mut self, c: char) -> bool;
}

impl StringExt for String {
    /// removes the last char of the string if its a specific char,
    ///
    /// returns a bool indicating if a char was removed
    fn pop_if_is(&mut self, c: char) -> bool {
        if self.ends_with(c) {
            self.pop();

            return true;
        }

        false
    }
}

/// lowercases a string and replaces every run of whitespace with a single `-`
///
/// eg: `"Land  Rover"` becomes `"land-rover"`
pub fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_only_the_given_char() {
        let mut url = String::from("http://localhost:3000/");

        assert!(url.pop_if_is('/'));
        assert_eq!(url, "http://localhost:3000");
        assert!(!url.pop_if_is('/'));
    }

    #[test]
    fn slugifies() {
        assert_eq!(slugify("Land  Rover"), "land-rover");
        assert_eq!(slugify(" Model S "), "model-s");
        assert_eq!(slugify("BMW"), "bmw");
    }
}
