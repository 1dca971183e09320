//! A module to build ICal files

use chrono::{DateTime, Duration, Utc};
use ics::properties::{Description, DtEnd, DtStart, Summary, Trigger};
use ics::{escape_text, Alarm, Event, ICalendar};

use crate::calendar::CalendarEvent;

/// Create an iCal calendar that contains these events
pub fn build_from(events: &[CalendarEvent]) -> String {
    let s_now = format_date_time(&Utc::now());
    let mut calendar = ICalendar::new("2.0", super::default_prod_id());

    for event in events {
        let details = event.details();
        let mut vevent = Event::new(event.identifier().to_string(), s_now.clone());
        vevent.push(DtStart::new(format_date_time(&details.start)));
        vevent.push(DtEnd::new(format_date_time(&details.end)));
        vevent.push(Summary::new(escape_text(details.title.clone())));
        if let Some(notes) = &details.notes {
            vevent.push(Description::new(escape_text(notes.clone())));
        }
        for alarm in &details.alarms {
            vevent.add_alarm(Alarm::display(
                Trigger::new(format_trigger(alarm)),
                Description::new(escape_text(details.title.clone())),
            ));
        }
        calendar.add_event(vevent);
    }

    calendar.to_string()
}

fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// A trigger that fires `before` the start of its event
fn format_trigger(before: &Duration) -> String {
    format!("-PT{}M", before.num_minutes())
}
