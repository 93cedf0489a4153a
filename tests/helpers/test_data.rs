//! Test data helpers for building request bodies

use fake::faker::address::en::StreetName;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use serde_json::{json, Value};

/// A member body with a random name and contact details
pub fn fake_member() -> Value {
    let name: String = Name().fake();
    let phone: String = PhoneNumber().fake();
    let street: String = StreetName().fake();
    json!({
        "fullName": name,
        "gender": "female",
        "phone": phone,
        "address": street,
    })
}

pub fn member_body(full_name: &str, gender: &str) -> Value {
    json!({ "fullName": full_name, "gender": gender })
}

pub fn member_with(full_name: &str, gender: &str, date_of_birth: Option<&str>, ministry: Option<&str>) -> Value {
    json!({
        "fullName": full_name,
        "gender": gender,
        "dateOfBirth": date_of_birth,
        "ministry": ministry,
    })
}

pub fn donation_body(donor: &str, amount: f64, donation_type: &str, date: &str) -> Value {
    json!({
        "donorName": donor,
        "amount": amount,
        "type": donation_type,
        "date": date,
    })
}

/// Attendance batch for one date; each entry is (member id, status)
pub fn attendance_body(date: &str, small_group: Option<i64>, entries: &[(i64, &str)]) -> Value {
    let records: Vec<Value> = entries
        .iter()
        .map(|(member, status)| json!({ "member": member, "status": status }))
        .collect();
    json!({
        "date": date,
        "smallGroup": small_group,
        "records": records,
    })
}

pub fn event_body(title: &str, date: &str) -> Value {
    json!({ "title": title, "date": date, "location": "Main Hall" })
}
