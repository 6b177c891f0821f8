//! User-facing motivational messages.

use crate::streak::StreakUpdate;
use chrono::{Datelike, NaiveDate};

const QUOTES: [&str; 8] = [
    "Jede Bewegung zählt – auch die kleine.",
    "Wer rastet, der rostet.",
    "Heute ist ein guter Tag, um etwas für sich zu tun.",
    "Schritt für Schritt kommt man auch ans Ziel.",
    "Bewegung ist die beste Medizin.",
    "Sie sind stärker, als Sie denken.",
    "Regelmäßigkeit schlägt Anstrengung.",
    "Gesundheit ist nicht alles, aber ohne Gesundheit ist alles nichts.",
];

/// Quote of the day; stable for a whole calendar day
pub fn motivational_quote(day: NaiveDate) -> &'static str {
    QUOTES[day.ordinal0() as usize % QUOTES.len()]
}

/// Message describing what happened to the streak
pub fn streak_message(update: &StreakUpdate) -> String {
    if update.broken {
        return "Ihre Serie wurde unterbrochen – heute beginnt eine neue!".to_string();
    }
    if !update.updated {
        return match update.current {
            0 => "Schließen Sie eine Übung ab, um eine Serie zu starten.".to_string(),
            n => format!("Ihre Serie steht bei {} {}.", n, days_word(n)),
        };
    }
    match update.current {
        1 => "Der erste Tag Ihrer Serie – weiter so!".to_string(),
        n if n == update.longest && n > 1 => {
            format!("Neuer Rekord: {} Tage in Folge aktiv!", n)
        }
        n => format!("{} Tage in Folge aktiv!", n),
    }
}

fn days_word(n: u32) -> &'static str {
    if n == 1 {
        "Tag"
    } else {
        "Tagen"
    }
}
