use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{Booking, DashboardMetrics, WeeklyTrendPoint, TREND_WEEKS};

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Dashboard figures for one provider's bookings.
///
/// Every booking counts toward `total_bookings`. Cancelled bookings are left
/// out of everything else. The trend covers the twelve Monday-based weeks
/// ending with the week containing `now`.
pub fn compute_metrics(bookings: &[Booking], now: DateTime<Utc>) -> DashboardMetrics {
    let active: Vec<&Booking> = bookings.iter()
        .filter(|booking| booking.status.blocks_slot())
        .collect();

    let today = now.date_naive();
    let unique_customers_this_month = active.iter()
        .filter(|booking| {
            let date = booking.booking_datetime.date_naive();
            date.year() == today.year() && date.month() == today.month()
        })
        .map(|booking| booking.customer_email.trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    let avg_duration_minutes = if active.is_empty() {
        0
    } else {
        let total: i64 = active.iter().map(|booking| booking.duration as i64).sum();
        (total as f64 / active.len() as f64).round() as i64
    };

    let total_revenue: i64 = active.iter().map(|booking| booking.price).sum();

    let current_week = week_start(today);
    let weekly_trend = (0..TREND_WEEKS)
        .rev()
        .map(|weeks_back| {
            let start = current_week - Duration::weeks(weeks_back as i64);
            let end = start + Duration::weeks(1);
            let in_week: Vec<&&Booking> = active.iter()
                .filter(|booking| {
                    let date = booking.booking_datetime.date_naive();
                    date >= start && date < end
                })
                .collect();

            WeeklyTrendPoint {
                week_start: start,
                bookings: in_week.len(),
                revenue: in_week.iter().map(|booking| booking.price).sum(),
            }
        })
        .collect();

    DashboardMetrics {
        total_bookings: bookings.len(),
        unique_customers_this_month,
        avg_duration_minutes,
        total_revenue,
        weekly_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_models::booking::BookingStatus;
    use uuid::Uuid;

    fn booking(at: DateTime<Utc>, email: &str, duration: i32, price: i64, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            customer_name: "Customer".to_string(),
            customer_email: email.to_string(),
            customer_phone: None,
            booking_datetime: at,
            duration,
            price,
            status,
            notes: None,
            created_at: None,
        }
    }

    // Wednesday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let metrics = compute_metrics(&[], now());
        assert_eq!(metrics.total_bookings, 0);
        assert_eq!(metrics.avg_duration_minutes, 0);
        assert_eq!(metrics.total_revenue, 0);
        assert_eq!(metrics.weekly_trend.len(), TREND_WEEKS);
        assert!(metrics.weekly_trend.iter().all(|point| point.bookings == 0));
    }

    #[test]
    fn test_cancelled_only_counts_toward_total() {
        let bookings = vec![
            booking(Utc.with_ymd_and_hms(2030, 1, 14, 9, 0, 0).unwrap(), "a@example.com", 30, 3000, BookingStatus::Confirmed),
            booking(Utc.with_ymd_and_hms(2030, 1, 15, 9, 0, 0).unwrap(), "b@example.com", 60, 6000, BookingStatus::Cancelled),
        ];

        let metrics = compute_metrics(&bookings, now());
        assert_eq!(metrics.total_bookings, 2);
        assert_eq!(metrics.total_revenue, 3000);
        assert_eq!(metrics.unique_customers_this_month, 1);
        assert_eq!(metrics.avg_duration_minutes, 30);
    }

    #[test]
    fn test_unique_customers_ignore_case_and_other_months() {
        let bookings = vec![
            booking(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap(), "Jane@Example.com", 30, 0, BookingStatus::Pending),
            booking(Utc.with_ymd_and_hms(2030, 1, 20, 9, 0, 0).unwrap(), "jane@example.com", 30, 0, BookingStatus::Pending),
            booking(Utc.with_ymd_and_hms(2029, 12, 28, 9, 0, 0).unwrap(), "old@example.com", 30, 0, BookingStatus::Pending),
        ];

        assert_eq!(compute_metrics(&bookings, now()).unique_customers_this_month, 1);
    }

    #[test]
    fn test_average_rounds_to_nearest_minute() {
        let at = Utc.with_ymd_and_hms(2030, 1, 14, 9, 0, 0).unwrap();
        let bookings = vec![
            booking(at, "a@example.com", 30, 0, BookingStatus::Pending),
            booking(at, "b@example.com", 45, 0, BookingStatus::Pending),
        ];

        assert_eq!(compute_metrics(&bookings, now()).avg_duration_minutes, 38);
    }

    #[test]
    fn test_trend_weeks_start_on_monday() {
        let bookings = vec![
            // Sunday: belongs to the previous week.
            booking(Utc.with_ymd_and_hms(2030, 1, 13, 9, 0, 0).unwrap(), "a@example.com", 30, 1000, BookingStatus::Confirmed),
            // Monday of the current week.
            booking(Utc.with_ymd_and_hms(2030, 1, 14, 9, 0, 0).unwrap(), "b@example.com", 30, 2000, BookingStatus::Confirmed),
            booking(Utc.with_ymd_and_hms(2030, 1, 18, 9, 0, 0).unwrap(), "c@example.com", 30, 500, BookingStatus::Pending),
        ];

        let trend = compute_metrics(&bookings, now()).weekly_trend;
        let current = trend.last().unwrap();
        let previous = &trend[TREND_WEEKS - 2];

        assert_eq!(current.week_start, NaiveDate::from_ymd_opt(2030, 1, 14).unwrap());
        assert_eq!(current.bookings, 2);
        assert_eq!(current.revenue, 2500);
        assert_eq!(previous.week_start, NaiveDate::from_ymd_opt(2030, 1, 7).unwrap());
        assert_eq!(previous.bookings, 1);
        assert_eq!(trend[0].week_start, NaiveDate::from_ymd_opt(2029, 10, 29).unwrap());
    }
}
