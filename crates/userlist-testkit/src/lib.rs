// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Value, json};
use userlist_app::{User, UserId};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const CITIES: [&str; 14] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Pittsburgh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
    "Columbus",
    "Minneapolis",
    "Omaha",
    "Tucson",
];

const EMAIL_DOMAINS: [&str; 6] = [
    "example.com",
    "example.org",
    "mail.test",
    "inbox.test",
    "corp.example",
    "home.example",
];

/// Seed used by `--demo`.
pub const DEMO_SEED: u64 = 2026;
pub const DEMO_USER_COUNT: usize = 23;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible user records.
#[derive(Debug, Clone)]
pub struct UserFaker {
    rng: DeterministicRng,
    next_id: i64,
    city_pool: usize,
}

impl UserFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
            city_pool: CITIES.len(),
        }
    }

    /// Draw cities from the first `count` entries only, so filters have
    /// several matches per city.
    pub fn with_city_pool(mut self, count: usize) -> Self {
        self.city_pool = count.clamp(1, CITIES.len());
        self
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn user(&mut self) -> User {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        let city = CITIES[self.rng.int_n(self.city_pool)];
        let id = self.next_id;
        self.next_id += 1;

        User {
            id: UserId::new(id),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            city: city.to_owned(),
        }
    }

    pub fn users(&mut self, count: usize) -> Vec<User> {
        (0..count).map(|_| self.user()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// Users shown by `--demo`.
pub fn demo_users() -> Vec<User> {
    UserFaker::new(DEMO_SEED)
        .with_city_pool(6)
        .users(DEMO_USER_COUNT)
}

/// Three users where two share a case-insensitive name prefix and two share a city.
pub fn alice_bob() -> Vec<User> {
    vec![
        user(1, "Alice", "alice@example.test", "NYC"),
        user(2, "alice B", "alice.b@example.test", "LA"),
        user(3, "Bob", "bob@example.test", "NYC"),
    ]
}

pub fn user(id: i64, name: &str, email: &str, city: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_owned(),
        email: email.to_owned(),
        city: city.to_owned(),
    }
}

/// JSON body in the listing endpoint's shape, with the extra fields real
/// servers send alongside the ones that get decoded.
pub fn users_json(users: &[User]) -> String {
    let records = users
        .iter()
        .map(|user| {
            json!({
                "id": user.id.get(),
                "name": user.name,
                "username": user.name.replace(' ', ""),
                "email": user.email,
                "address": {"street": "Main St", "city": user.city, "zipcode": "00000"},
                "phone": "555-0100",
            })
        })
        .collect();
    Value::Array(records).to_string()
}
