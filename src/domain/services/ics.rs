use crate::domain::models::{booking::Booking, event::Event};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a confirmed booking, attached to
/// the confirmation email.
pub fn generate_ics(event: &Event, booking: &Booking) -> String {
    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&event.title)
        .description(&event.description)
        .location(&event.location)
        .starts(event.starts_at)
        .ends(event.ends_at())
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
