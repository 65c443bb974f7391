use chrono::{DateTime, Utc};

use crate::models::BookingDetails;

pub const EMAIL_SUBJECT: &str = "Booking Confirmation";

/// Minor units to a dollar amount, e.g. `5000` -> `$50.00`.
pub fn format_price(minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// e.g. `Monday, January 7, 2030 at 10:00 AM`
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn sms_body(details: &BookingDetails) -> String {
    format!(
        "Booking Confirmation with {provider}\n\n\
         Service: {service}\n\
         Date & Time: {when}\n\
         Duration: {duration} minutes\n\
         Price: {price}\n\n\
         Please arrive 5-10 minutes before your scheduled time.",
        provider = details.provider_name,
        service = details.service_name,
        when = format_datetime(&details.booking_datetime),
        duration = details.duration_minutes,
        price = format_price(details.price),
    )
}

pub fn email_html(details: &BookingDetails) -> String {
    let provider = escape_html(&details.provider_name);
    let service = escape_html(&details.service_name);

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{subject}</title></head>
<body style="background-color:#ffffff;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
<div style="margin:0 auto;padding:40px 20px;max-width:600px;">
<h1 style="color:#2c3e50;font-size:24px;text-align:center;border-bottom:1px solid #eaeaea;padding-bottom:20px;">{subject}</h1>
<p style="color:#2c3e50;font-size:16px;">Dear {customer},</p>
<p style="color:#34495e;font-size:15px;">Thank you for choosing our services. Your appointment has been successfully booked. Please review the details below:</p>
<div style="background-color:#f8f9fa;padding:24px;border-radius:6px;border:1px solid #eaeaea;">
<p>
<strong>Service:</strong> {service}<br>
<strong>Provider:</strong> {provider}<br>
<strong>Date &amp; Time:</strong> {when}<br>
<strong>Duration:</strong> {duration} minutes<br>
<strong>Price:</strong> {price}
</p>
</div>
<p style="color:#34495e;font-size:15px;">If you need to reschedule or cancel your appointment, please contact us at least 24 hours in advance. For any questions or assistance, our team is here to help.</p>
<p style="color:#34495e;font-size:15px;font-style:italic;">We recommend arriving 5-10 minutes before your scheduled appointment time.</p>
<p style="color:#7f8c8d;font-size:14px;">Best regards,<br>{provider}</p>
</div>
</body>
</html>"#,
        subject = EMAIL_SUBJECT,
        customer = escape_html(&details.customer_name),
        service = service,
        provider = provider,
        when = format_datetime(&details.booking_datetime),
        duration = details.duration_minutes,
        price = format_price(details.price),
    )
}
