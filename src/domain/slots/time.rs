//! Time expression extraction.
//!
//! Pulls a time expression out of free text without resolving it to an
//! absolute instant. Extraction is pure and deterministic; resolution
//! against a wall clock happens separately in [`TimeExpr::resolve`], where
//! the ambiguity policy for bare clock values (no am/pm) is applied and the
//! applied assumption is surfaced to the caller.

use chrono::{Duration, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Morning or afternoon marker on a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meridiem {
    Am,
    Pm,
}

/// A clock time as written, before meridiem disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    /// Hour as written (1-12 with meridiem, 0-23 without).
    pub hour: u32,
    /// Minutes, zero when unwritten.
    pub minute: u32,
    /// Present when the text said am/pm (or noon/midnight).
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    /// True when the hour could mean two different instants in a day.
    pub fn is_ambiguous(&self) -> bool {
        self.meridiem.is_none() && self.hour >= 1 && self.hour <= 12
    }

    /// Hour on the 24h clock under the given meridiem choice.
    fn hour24(&self, meridiem: Meridiem) -> u32 {
        match (meridiem, self.hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) => h,
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, h) if h < 12 => h + 12,
            (Meridiem::Pm, h) => h,
        }
    }
}

/// Day reference in a time expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayRef {
    Today,
    Tomorrow,
}

/// Policy for resolving a clock time with no am/pm marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Pick whichever meridiem yields the next future occurrence within 24h.
    #[default]
    NextOccurrence,
    /// Always read bare hours as am.
    Morning,
    /// Always read bare hours as pm.
    Evening,
}

/// The assumption a resolution applied, echoed back so ambiguity is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAssumption {
    /// The policy that was in force.
    pub policy: AmbiguityPolicy,
    /// The meridiem the policy chose.
    pub chose: Meridiem,
}

/// A time expression resolved to an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTime {
    /// The resolved instant.
    pub at: Timestamp,
    /// Present when the text was ambiguous and a policy filled the gap.
    pub assumption: Option<AppliedAssumption>,
}

/// A time expression as extracted from text.
///
/// Captures what was written, not an absolute instant, so extraction stays
/// deterministic. A day reference alone ("tomorrow") is an incomplete
/// expression: it narrows the day but does not name a moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExpr {
    /// The matched source text.
    pub raw: String,
    /// Day reference, when present.
    pub day: Option<DayRef>,
    /// Clock time, when present.
    pub clock: Option<ClockTime>,
    /// Relative offset in seconds ("in 10 minutes"), when present.
    pub relative_secs: Option<u64>,
}

impl TimeExpr {
    /// True when the expression names an actual moment.
    ///
    /// A bare day reference does not; it leaves the `time` slot missing
    /// while still contributing partial context.
    pub fn is_complete(&self) -> bool {
        self.clock.is_some() || self.relative_secs.is_some()
    }

    /// True when resolution will need the ambiguity policy.
    pub fn is_ambiguous(&self) -> bool {
        self.clock.map(|c| c.is_ambiguous()).unwrap_or(false)
    }

    /// Resolves the expression to an absolute instant.
    ///
    /// Deterministic given the same `now` and `policy`. Ambiguous clock
    /// values are disambiguated per the policy and the applied assumption
    /// is returned alongside the instant.
    pub fn resolve(&self, now: Timestamp, policy: AmbiguityPolicy) -> Option<ResolvedTime> {
        if let Some(secs) = self.relative_secs {
            return Some(ResolvedTime {
                at: now.plus_secs(secs),
                assumption: None,
            });
        }

        let clock = self.clock?;
        let base = *now.as_datetime();
        let day_offset = match self.day {
            Some(DayRef::Tomorrow) => 1,
            _ => 0,
        };

        let at_hour = |hour24: u32| {
            (base + Duration::days(day_offset))
                .with_hour(hour24)
                .and_then(|dt| dt.with_minute(clock.minute))
                .and_then(|dt| dt.with_second(0))
                .and_then(|dt| dt.with_nanosecond(0))
        };

        if let Some(meridiem) = clock.meridiem {
            let mut dt = at_hour(clock.hour24(meridiem))?;
            // An explicit today-ish time already past rolls to the next day.
            if self.day.is_none() && dt <= base {
                dt += Duration::days(1);
            }
            return Some(ResolvedTime {
                at: Timestamp::from_datetime(dt),
                assumption: None,
            });
        }

        if !clock.is_ambiguous() {
            // 24h-style hour (0 or 13-23): nothing to assume.
            let mut dt = at_hour(clock.hour)?;
            if self.day.is_none() && dt <= base {
                dt += Duration::days(1);
            }
            return Some(ResolvedTime {
                at: Timestamp::from_datetime(dt),
                assumption: None,
            });
        }

        let chose = match policy {
            AmbiguityPolicy::Morning => Meridiem::Am,
            AmbiguityPolicy::Evening => Meridiem::Pm,
            AmbiguityPolicy::NextOccurrence => {
                // Next future occurrence within 24h: try am, then pm, then
                // tomorrow's am.
                let am = at_hour(clock.hour24(Meridiem::Am))?;
                if am > base {
                    Meridiem::Am
                } else {
                    Meridiem::Pm
                }
            }
        };

        let mut dt = at_hour(clock.hour24(chose))?;
        if self.day.is_none() && dt <= base {
            dt += Duration::days(1);
        }
        Some(ResolvedTime {
            at: Timestamp::from_datetime(dt),
            assumption: Some(AppliedAssumption { policy, chose }),
        })
    }
}

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bin\s+(\d{1,4})\s+(minutes?|mins?|hours?|hrs?)\b").unwrap()
});

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    // "at 6", "6:30", "6am", "6 pm", "6:15pm"
    Regex::new(r"(?i)\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?\b").unwrap()
});

static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(today|tomorrow|tonight)\b").unwrap());

/// Extracts a time expression from free text.
///
/// Best-effort pattern matching, not full parsing. A bare number is only
/// read as a clock time when anchored ("at 6", "6:30", "6pm") or when the
/// whole utterance is just the number, which is how a follow-up answer to
/// "what time?" arrives. Returns `None` when nothing time-like is present.
pub fn extract_time(text: &str) -> Option<TimeExpr> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut day = None;
    let mut clock = None;
    let mut relative_secs = None;
    let mut matched: Vec<&str> = Vec::new();

    if let Some(caps) = DAY_RE.captures(trimmed) {
        let word = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        day = Some(match word.to_lowercase().as_str() {
            "tomorrow" => DayRef::Tomorrow,
            _ => DayRef::Today,
        });
        matched.push(caps.get(0).map(|m| m.as_str()).unwrap_or_default());
    }

    if let Some(caps) = RELATIVE_RE.captures(trimmed) {
        let amount: u64 = caps[1].parse().ok()?;
        let unit = caps[2].to_lowercase();
        let secs = if unit.starts_with('h') {
            amount.saturating_mul(3600)
        } else {
            amount.saturating_mul(60)
        };
        relative_secs = Some(secs);
        matched.push(caps.get(0).map(|m| m.as_str()).unwrap_or_default());
    }

    let lowered = trimmed.to_lowercase();
    if lowered.contains("noon") {
        clock = Some(ClockTime {
            hour: 12,
            minute: 0,
            meridiem: Some(Meridiem::Pm),
        });
        matched.push("noon");
    } else if lowered.contains("midnight") {
        clock = Some(ClockTime {
            hour: 12,
            minute: 0,
            meridiem: Some(Meridiem::Am),
        });
        matched.push("midnight");
    } else if relative_secs.is_none() {
        for caps in CLOCK_RE.captures_iter(trimmed) {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let hour: u32 = match caps[1].parse() {
                Ok(h) if h <= 23 => h,
                _ => continue,
            };
            let minute: u32 = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            if minute > 59 {
                continue;
            }
            let meridiem = caps.get(3).map(|m| {
                if m.as_str().to_lowercase().starts_with('a') {
                    Meridiem::Am
                } else {
                    Meridiem::Pm
                }
            });

            // A bare number needs an anchor to count as a time.
            let anchored = meridiem.is_some()
                || caps.get(2).is_some()
                || whole.to_lowercase().starts_with("at ")
                || caps.get(1).map(|m| m.as_str()) == Some(trimmed);
            if !anchored {
                continue;
            }

            clock = Some(ClockTime {
                hour,
                minute,
                meridiem,
            });
            matched.push(whole.trim());
            break;
        }
    }

    if day.is_none() && clock.is_none() && relative_secs.is_none() {
        return None;
    }

    Some(TimeExpr {
        raw: matched.join(" "),
        day,
        clock,
        relative_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap())
    }

    mod extraction {
        use super::*;

        #[test]
        fn extracts_meridiem_clock() {
            let expr = extract_time("set a reminder for 6am").unwrap();
            let clock = expr.clock.unwrap();
            assert_eq!(clock.hour, 6);
            assert_eq!(clock.minute, 0);
            assert_eq!(clock.meridiem, Some(Meridiem::Am));
            assert!(expr.is_complete());
            assert!(!expr.is_ambiguous());
        }

        #[test]
        fn extracts_colon_minutes() {
            let expr = extract_time("dentist at 6:30 pm").unwrap();
            let clock = expr.clock.unwrap();
            assert_eq!((clock.hour, clock.minute), (6, 30));
            assert_eq!(clock.meridiem, Some(Meridiem::Pm));
        }

        #[test]
        fn extracts_anchored_bare_hour_as_ambiguous() {
            let expr = extract_time("wake me at 6").unwrap();
            assert!(expr.is_ambiguous());
        }

        #[test]
        fn whole_utterance_number_counts_as_time() {
            let expr = extract_time("6").unwrap();
            assert_eq!(expr.clock.unwrap().hour, 6);
            assert!(expr.is_ambiguous());
        }

        #[test]
        fn unanchored_number_is_not_a_time() {
            assert!(extract_time("buy 6 eggs").is_none());
        }

        #[test]
        fn extracts_day_only_as_incomplete() {
            let expr = extract_time("set a reminder for tomorrow").unwrap();
            assert_eq!(expr.day, Some(DayRef::Tomorrow));
            assert!(expr.clock.is_none());
            assert!(!expr.is_complete());
        }

        #[test]
        fn extracts_day_with_clock() {
            let expr = extract_time("remind me tomorrow at 9am").unwrap();
            assert_eq!(expr.day, Some(DayRef::Tomorrow));
            assert_eq!(expr.clock.unwrap().hour, 9);
            assert!(expr.is_complete());
        }

        #[test]
        fn extracts_relative_minutes() {
            let expr = extract_time("ping me in 10 minutes").unwrap();
            assert_eq!(expr.relative_secs, Some(600));
            assert!(expr.is_complete());
        }

        #[test]
        fn extracts_relative_hours() {
            let expr = extract_time("in 2 hours").unwrap();
            assert_eq!(expr.relative_secs, Some(7200));
        }

        #[test]
        fn extracts_noon_and_midnight() {
            let noon = extract_time("lunch at noon").unwrap();
            assert_eq!(noon.clock.unwrap().meridiem, Some(Meridiem::Pm));

            let midnight = extract_time("at midnight").unwrap();
            assert_eq!(midnight.clock.unwrap().meridiem, Some(Meridiem::Am));
        }

        #[test]
        fn absent_for_plain_text() {
            assert!(extract_time("add milk to my todo list").is_none());
            assert!(extract_time("").is_none());
        }

        #[test]
        fn deterministic_across_calls() {
            let text = "remind me tomorrow at 6";
            assert_eq!(extract_time(text), extract_time(text));
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn explicit_meridiem_resolves_without_assumption() {
            let expr = extract_time("6am").unwrap();
            let resolved = expr.resolve(at(3, 0), AmbiguityPolicy::NextOccurrence).unwrap();
            assert!(resolved.assumption.is_none());
            assert_eq!(resolved.at.as_datetime().hour(), 6);
        }

        #[test]
        fn past_time_today_rolls_to_tomorrow() {
            let expr = extract_time("6am").unwrap();
            let resolved = expr.resolve(at(9, 0), AmbiguityPolicy::NextOccurrence).unwrap();
            assert!(resolved.at.is_after(&at(9, 0)));
        }

        #[test]
        fn next_occurrence_picks_am_in_the_early_morning() {
            let expr = extract_time("at 6").unwrap();
            let resolved = expr.resolve(at(3, 0), AmbiguityPolicy::NextOccurrence).unwrap();
            let assumption = resolved.assumption.unwrap();
            assert_eq!(assumption.chose, Meridiem::Am);
            assert_eq!(resolved.at.as_datetime().hour(), 6);
        }

        #[test]
        fn next_occurrence_picks_pm_after_morning_has_passed() {
            let expr = extract_time("at 6").unwrap();
            let resolved = expr.resolve(at(10, 0), AmbiguityPolicy::NextOccurrence).unwrap();
            let assumption = resolved.assumption.unwrap();
            assert_eq!(assumption.chose, Meridiem::Pm);
            assert_eq!(resolved.at.as_datetime().hour(), 18);
        }

        #[test]
        fn morning_policy_always_reads_am() {
            let expr = extract_time("at 6").unwrap();
            let resolved = expr.resolve(at(10, 0), AmbiguityPolicy::Morning).unwrap();
            assert_eq!(resolved.assumption.unwrap().chose, Meridiem::Am);
        }

        #[test]
        fn relative_offset_adds_to_now() {
            let expr = extract_time("in 10 minutes").unwrap();
            let now = at(10, 0);
            let resolved = expr.resolve(now, AmbiguityPolicy::NextOccurrence).unwrap();
            assert_eq!(resolved.at.secs_since(&now), 600);
            assert!(resolved.assumption.is_none());
        }

        #[test]
        fn tomorrow_with_clock_lands_on_next_day() {
            let expr = extract_time("tomorrow at 9am").unwrap();
            let now = at(10, 0);
            let resolved = expr.resolve(now, AmbiguityPolicy::NextOccurrence).unwrap();
            assert_eq!(resolved.at.as_datetime().hour(), 9);
            assert!(resolved.at.secs_since(&now) > 12 * 3600);
        }

        #[test]
        fn day_only_expression_does_not_resolve() {
            let expr = extract_time("tomorrow").unwrap();
            assert!(expr.resolve(at(10, 0), AmbiguityPolicy::NextOccurrence).is_none());
        }
    }
}
