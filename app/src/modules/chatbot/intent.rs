//! Keyword based intent detection and the canned replies of the chatbot.
//!
//! keywords are matched as plain substrings of the lowercased message, so `ev` also
//! matches `every` and `hi` matches `this`, the order of the checks decides which
//! intent wins.

use crate::modules::common::validators::REGEX_IS_YEAR;
use entity::{car, sea_orm_active_enums::CarStatus};

pub const HELP_REPLY: &str = "I can help you with:\n\n- Finding cars by price range\n\n- Showing newest/latest cars\n\n- Information about specific car models\n\n- General car inquiries\n\nJust ask me anything about our car inventory!";

pub const THANKS_REPLY: &str = "You're welcome! Is there anything else I can help you with?";

pub const GREETING_REPLY: &str = "Hello! How can I help you find your perfect car today?";

pub const FAREWELL_REPLY: &str =
    "Goodbye! Feel free to come back if you need any help finding a car.";

pub const AFFIRMATIVE_REPLY: &str = "Great! What would you like to know about our cars? I can help you with prices, models, features, or any other specific details.";

pub const SATISFIED_REPLY: &str = "I'm glad you're satisfied! Would you like to know more about our cars? I can show you our latest models, prices, or any specific features you're interested in.";

pub const NO_CARS_REPLY: &str = "I'm sorry, we don't have any cars available at the moment.";

pub const NO_ELECTRIC_CARS_REPLY: &str =
    "I'm sorry, we don't have any electric vehicles in stock at the moment.";

pub const DATABASE_ERROR_REPLY: &str = "I'm having trouble accessing our car database at the moment. Please try again later or contact our support team.";

/// amount of cars listed by the price and newest intents
pub const LISTED_CARS_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CheapestCars,
    NewestCars,
    Help,
    ElectricCars,
    CarsFromYear(i32),
    Thanks,
    Greeting,
    Farewell,
    Affirmative,
    Satisfied,
    Unknown,
}

impl Intent {
    /// detects the intent of a message, the first matching check wins
    pub fn detect(message: &str) -> Intent {
        let lower = message.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
        let is = |words: &[&str]| words.contains(&lower.as_str());

        if has(&["price", "cost"]) {
            Intent::CheapestCars
        } else if has(&["new", "latest"]) {
            Intent::NewestCars
        } else if has(&["help", "assist"]) {
            Intent::Help
        } else if has(&["electric", "ev"]) {
            Intent::ElectricCars
        } else if let Some(year) = parse_year(message) {
            Intent::CarsFromYear(year)
        } else if has(&["thank"]) {
            Intent::Thanks
        } else if has(&["hello", "hi", "hey"]) {
            Intent::Greeting
        } else if has(&["bye", "goodbye"]) {
            Intent::Farewell
        } else if is(&["yes", "yeah", "okay", "ok"]) {
            Intent::Affirmative
        } else if is(&["great", "awesome", "perfect", "excellent"]) {
            Intent::Satisfied
        } else {
            Intent::Unknown
        }
    }

    /// replies that do not depend on the inventory
    pub fn canned_reply(&self) -> Option<&'static str> {
        match self {
            Intent::Help => Some(HELP_REPLY),
            Intent::Thanks => Some(THANKS_REPLY),
            Intent::Greeting => Some(GREETING_REPLY),
            Intent::Farewell => Some(FAREWELL_REPLY),
            Intent::Affirmative => Some(AFFIRMATIVE_REPLY),
            Intent::Satisfied => Some(SATISFIED_REPLY),
            _ => None,
        }
    }
}

fn parse_year(message: &str) -> Option<i32> {
    if REGEX_IS_YEAR.is_match(message) {
        message.parse().ok()
    } else {
        None
    }
}

/// formats a price with thousands separators and at most 3 decimals, eg: `25,999.5`
pub fn format_price(price: f64) -> String {
    let rounded = (price * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let integer = abs.trunc() as u64;
    let fraction = format!("{:.3}", abs.fract());

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // "0.500" -> ".5"
    let decimals = fraction
        .trim_start_matches('0')
        .trim_end_matches('0')
        .trim_end_matches('.');

    format!("{}{}{}", if negative { "-" } else { "" }, grouped, decimals)
}

pub fn cheapest_cars_reply(cars: &[car::Model]) -> String {
    if cars.is_empty() {
        return String::from(NO_CARS_REPLY);
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|c| format!("{} {} ({}) - ${}", c.brand, c.model, c.year, format_price(c.price)))
        .collect();

    format!("Here are some of our most affordable cars:\n{}", lines.join("\n"))
}

pub fn newest_cars_reply(cars: &[car::Model]) -> String {
    if cars.is_empty() {
        return String::from(NO_CARS_REPLY);
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|c| {
            let sold = if c.status == CarStatus::Sold { " - SOLD" } else { "" };
            format!("{} {} ({}){}", c.brand, c.model, c.year, sold)
        })
        .collect();

    format!("Here are our newest cars:\n{}", lines.join("\n"))
}

pub fn electric_cars_reply(cars: &[car::Model]) -> String {
    if cars.is_empty() {
        return String::from(NO_ELECTRIC_CARS_REPLY);
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|c| format!("{} {} ({}) - ${}", c.brand, c.model, c.year, format_price(c.price)))
        .collect();

    format!(
        "We have {} electric vehicles available:\n{}",
        cars.len(),
        lines.join("\n")
    )
}

pub fn cars_from_year_reply(year: i32, cars: &[car::Model]) -> String {
    if cars.is_empty() {
        return format!(
            "I'm sorry, we don't have any cars from {} in stock at the moment.",
            year
        );
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|c| format!("{} {} - ${}", c.brand, c.model, format_price(c.price)))
        .collect();

    format!("Here are our cars from {}:\n{}", year, lines.join("\n"))
}

pub fn default_reply(message: &str) -> String {
    format!(
        "I understand you're asking about \"{}\". I can help you find cars based on:\n\n- Price range\n\n- Make and model\n\n- Year\n\n- Fuel type\n\n- Features\n\nWhat specific information are you looking for?",
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::{
        car::{CarFeatures, CarImages},
        sea_orm_active_enums::{CarCondition, Fuel, Transmission},
    };

    fn car(brand: &str, model: &str, year: i32, price: f64, status: CarStatus) -> car::Model {
        let now = chrono::Utc::now().into();

        car::Model {
            id: 1,
            brand: String::from(brand),
            model: String::from(model),
            year,
            price,
            mileage: 0,
            car_type: None,
            fuel: Fuel::Petrol,
            transmission: Transmission::Automatic,
            drive_train: None,
            status,
            condition: CarCondition::New,
            color: String::from("Red"),
            description: String::new(),
            engine_size: None,
            engine_cylinders: None,
            engine_horsepower: None,
            rating: None,
            features: CarFeatures::default(),
            images: CarImages::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn detects_intents_in_order() {
        assert_eq!(Intent::detect("What is the PRICE of a new car?"), Intent::CheapestCars);
        assert_eq!(Intent::detect("show me the latest models"), Intent::NewestCars);
        assert_eq!(Intent::detect("can you assist me"), Intent::Help);
        assert_eq!(Intent::detect("any Electric cars?"), Intent::ElectricCars);
        assert_eq!(Intent::detect("2021"), Intent::CarsFromYear(2021));
        assert_eq!(Intent::detect("thanks a lot"), Intent::Thanks);
        assert_eq!(Intent::detect("Hey"), Intent::Greeting);
        assert_eq!(Intent::detect("bye"), Intent::Farewell);
        assert_eq!(Intent::detect("OK"), Intent::Affirmative);
        assert_eq!(Intent::detect("Awesome"), Intent::Satisfied);
        assert_eq!(Intent::detect("what about trucks"), Intent::Unknown);
    }

    #[test]
    fn keywords_match_inside_words() {
        // "every" contains "ev"
        assert_eq!(Intent::detect("every sedan"), Intent::ElectricCars);
        // "this" contains "hi"
        assert_eq!(Intent::detect("is this a sedan"), Intent::Greeting);
    }

    #[test]
    fn year_must_be_the_whole_message() {
        assert_eq!(Intent::detect(" 2021"), Intent::Unknown);
        assert_eq!(Intent::detect("cars 2021"), Intent::Unknown);
        assert_eq!(Intent::detect("20211"), Intent::Unknown);
    }

    #[test]
    fn exact_words_do_not_match_sentences() {
        assert_eq!(Intent::detect("ok then"), Intent::Unknown);
        assert_eq!(Intent::detect("great car"), Intent::Unknown);
    }

    #[test]
    fn formats_prices_like_a_locale_string() {
        assert_eq!(format_price(25000.0), "25,000");
        assert_eq!(format_price(999.0), "999");
        assert_eq!(format_price(1234567.5), "1,234,567.5");
        assert_eq!(format_price(0.0), "0");
    }

    #[test]
    fn lists_cars_on_replies() {
        let cars = vec![
            car("Toyota", "Corolla", 2020, 18500.0, CarStatus::Available),
            car("Ford", "Mustang", 2023, 45000.0, CarStatus::Sold),
        ];

        assert_eq!(
            cheapest_cars_reply(&cars),
            "Here are some of our most affordable cars:\nToyota Corolla (2020) - $18,500\nFord Mustang (2023) - $45,000"
        );

        assert_eq!(
            newest_cars_reply(&cars),
            "Here are our newest cars:\nToyota Corolla (2020)\nFord Mustang (2023) - SOLD"
        );

        assert!(electric_cars_reply(&cars).starts_with("We have 2 electric vehicles available:\n"));

        assert_eq!(
            cars_from_year_reply(2020, &cars[..1]),
            "Here are our cars from 2020:\nToyota Corolla - $18,500"
        );
    }

    #[test]
    fn empty_inventory_replies() {
        assert_eq!(cheapest_cars_reply(&[]), NO_CARS_REPLY);
        assert_eq!(newest_cars_reply(&[]), NO_CARS_REPLY);
        assert_eq!(electric_cars_reply(&[]), NO_ELECTRIC_CARS_REPLY);
        assert_eq!(
            cars_from_year_reply(1999, &[]),
            "I'm sorry, we don't have any cars from 1999 in stock at the moment."
        );
    }

    #[test]
    fn default_reply_quotes_the_message() {
        assert!(default_reply("trucks?").starts_with("I understand you're asking about \"trucks?\"."));
    }
}
