use chrono::Local;
use rand::{Rng, seq::IndexedRandom};

const METHODS: [(&str, u8); 4] = [("GET", 6), ("POST", 2), ("PUT", 1), ("DELETE", 1)];
const STATUS: [(u16, u8); 10] = [
    (200, 50),
    (301, 10),
    (400, 10),
    (401, 10),
    (403, 10),
    (404, 30),
    (405, 5),
    (500, 5),
    (302, 2),
    (503, 1),
];
const CORRUPTIONS: [Corruption; 4] = [
    Corruption::Garbage,
    Corruption::NonNumericSize,
    Corruption::MissingSize,
    Corruption::NoBrackets,
];

#[derive(Copy, Clone, Debug)]
enum Corruption {
    Garbage,
    NonNumericSize,
    MissingSize,
    NoBrackets,
}

pub fn generate_access_log<R: Rng + ?Sized>(rng: &mut R, path: &str) -> String {
    let ip = format!(
        "{}.{}.{}.{}",
        rng.random_range(1..255),
        rng.random_range(0..256),
        rng.random_range(0..256),
        rng.random_range(1..255)
    );
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
    let method = METHODS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let status = STATUS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let size = rng.random_range(1..=1024);

    format!("{ip} - [{timestamp}] \"{method} {path} HTTP/1.1\" {status} {size}")
}

pub fn generate_malformed_log<R: Rng + ?Sized>(rng: &mut R, path: &str) -> String {
    let valid = generate_access_log(rng, path);
    match CORRUPTIONS.choose(rng).copied().unwrap_or(Corruption::Garbage) {
        Corruption::Garbage => "Hello, this is not a log line".to_string(),
        Corruption::NonNumericSize => match valid.rsplit_once(' ') {
            Some((head, _)) => format!("{head} size"),
            None => valid,
        },
        Corruption::MissingSize => match valid.rsplit_once(' ') {
            Some((head, _)) => head.to_string(),
            None => valid,
        },
        Corruption::NoBrackets => valid.replacen('[', "", 1).replacen(']', "", 1),
    }
}
