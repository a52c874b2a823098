pub fn get_default_template(name: &str) -> String {
    match name {
        "booking_confirmation" => include_str!("../../templates/booking_confirmation.html").to_string(),
        "booking_reminder" => include_str!("../../templates/booking_reminder.html").to_string(),
        "voucher_delivery" => include_str!("../../templates/voucher_delivery.html").to_string(),
        "voucher_expiry" => include_str!("../../templates/voucher_expiry.html").to_string(),
        "low_inventory" => include_str!("../../templates/low_inventory.html").to_string(),
        _ => format!("<html><body><p>Default template for {} not found.</p></body></html>", name),
    }
}

pub fn get_default_subject(name: &str) -> &'static str {
    match name {
        "booking_confirmation" => "Your tickets for {{ event_title }}",
        "booking_reminder" => "Tomorrow night: {{ event_title }}",
        "voucher_delivery" => "A gift voucher from {{ purchaser_name }}",
        "voucher_expiry" => "Your gift voucher expires soon",
        "low_inventory" => "Low ticket alert: {{ event_title }}",
        _ => "Notification",
    }
}
