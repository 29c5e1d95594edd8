//! Stateless derived-text helpers for rendered rows.

use crate::{night::SleepNight, types::Quality};

/// Human-readable label for a quality rating.
pub fn quality_label(quality: Quality) -> &'static str {
    match quality {
        Quality::Unrated => "--",
        Quality::VeryBad => "very bad",
        Quality::Poor => "poor",
        Quality::SoSo => "so-so",
        Quality::Okay => "OK",
        Quality::PrettyGood => "pretty good",
        Quality::Excellent => "excellent",
    }
}

/// Elapsed-duration text for a tracked night.
///
/// Under a minute reads in seconds, under an hour in minutes, everything
/// longer in whole hours.
pub fn duration_text(night: &SleepNight) -> String {
    let seconds = night.duration_ms() / 1000;
    if seconds < 60 {
        format!("{seconds} seconds")
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else {
        format!("{} hours", seconds / 3600)
    }
}

/// Plain-text report of the whole log, newest night first.
pub fn nights_summary(nights: &[SleepNight]) -> String {
    if nights.is_empty() {
        return "No sleep recorded yet.".to_string();
    }

    let mut out = String::from("Your sleep log\n");
    for night in nights {
        out.push_str(&format!(
            "#{}: started {} ms, slept {}, quality {}\n",
            night.id,
            night.start_ms,
            duration_text(night),
            quality_label(night.quality),
        ));
    }
    out
}
