#![allow(dead_code)]

use chrono::NaiveDate;
use investment_registry::domain::entities::{Client, Investment, Security};
use std::path::Path;

pub fn client(name: &str, type_of_property: &str, phone: &str) -> Client {
    Client::from_fields(0, name, type_of_property, "Moscow, Tverskaya 1", phone).unwrap()
}

pub fn sample_clients() -> Vec<Client> {
    vec![
        client("Borisov Boris Borisovich", "ООО Ромашка", "89991112233"),
        client("Antonov Anton", "ИП", "+79990001122"),
        client("Chernov Chern", "ЗАО", "9995556677"),
    ]
}

pub fn security(name: &str, security_type: &str, income: f64) -> Security {
    Security::from_fields(0, name, security_type, income).unwrap()
}

pub fn sample_securities() -> Vec<Security> {
    vec![
        security("ОФЗ 26238", "bond", 7.1),
        security("Sberbank", "share", 12.4),
        security("Gazprom bond 2030", "bond", 8.25),
    ]
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn investment(client_id: i64, security_id: i64, amount: f64, start: NaiveDate) -> Investment {
    Investment::from_fields(0, client_id, security_id, amount, start, None, None).unwrap()
}

pub fn write_file(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
