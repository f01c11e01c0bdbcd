//! Rule-based reading of the free-text "Esigenze/Preferenze" column.
//!
//! The text is split into clauses on `,`, `;` and the conjunctions `and`/`e`.
//! Each clause is scanned for day names, negation, exclusivity and shift-time
//! words. Shift words in a clause that names a day only apply to that day;
//! elsewhere they become the employee's general preference.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::types::Day;

/// Which part of the day an employee asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShiftPreference {
    pub morning_only: bool,
    pub afternoon_only: bool,
    pub mid_day_only: bool,
    pub split_shift: bool,
}

impl ShiftPreference {
    pub fn is_flexible(&self) -> bool {
        !(self.morning_only || self.afternoon_only || self.mid_day_only || self.split_shift)
    }

    /// Mid-day and split shifts never start at opening or end at closing
    pub fn avoids_open_close(&self) -> bool {
        self.mid_day_only || self.split_shift
    }

    fn merge(&mut self, other: ShiftPreference) {
        self.morning_only |= other.morning_only;
        self.afternoon_only |= other.afternoon_only;
        self.mid_day_only |= other.mid_day_only;
        self.split_shift |= other.split_shift;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPreferences {
    pub general: ShiftPreference,
    pub no_weekend: bool,
    pub weekend_only: bool,
    pub blocked_days: BTreeSet<Day>,
    /// When non-empty the employee works only on these days
    pub required_days: BTreeSet<Day>,
    /// Replaces `general` on the listed days
    pub day_overrides: BTreeMap<Day, ShiftPreference>,
}

impl ParsedPreferences {
    /// Preference in force on `day`
    pub fn for_day(&self, day: Day) -> ShiftPreference {
        self.day_overrides.get(&day).copied().unwrap_or(self.general)
    }

    pub fn requires(&self, day: Day) -> bool {
        self.required_days.contains(&day)
    }

    /// Hard constraints only: blocked days, required days and weekend flags
    pub fn allows(&self, day: Day) -> bool {
        if self.blocked_days.contains(&day) {
            return false;
        }
        if !self.required_days.is_empty() && !self.required_days.contains(&day) {
            return false;
        }
        if self.no_weekend && day.is_weekend() {
            return false;
        }
        if self.weekend_only && !day.is_weekend() {
            return false;
        }
        true
    }
}

const LONG_WEEKEND: [Day; 3] = [Day::Friday, Day::Saturday, Day::Sunday];

const EXCLUSIVE_WORDS: [&str; 2] = ["only", "solo"];
const LONG_WORDS: [&str; 2] = ["long", "lungo"];
const WEEKEND_WORDS: [&str; 2] = ["weekend", "fine settimana"];
const MORNING_WORDS: [&str; 4] = ["morning", "opening", "mattina", "apertura"];
const AFTERNOON_WORDS: [&str; 6] = ["afternoon", "evening", "closing", "pomeriggio", "sera", "chiusura"];
const MID_DAY_WORDS: [&str; 3] = ["central", "centrale", "intermedio"];
const SPLIT_WORDS: [&str; 2] = ["split", "spezzato"];

struct Patterns {
    clause_split: Regex,
    negation: Regex,
    am: Regex,
    /// the verb in "i am", never a time of day
    i_am: Regex,
    pm: Regex,
    mid: Regex,
    days: Vec<(Day, Regex)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let day_words = [
            (Day::Monday, r"lun|luned[iì]|mon|monday"),
            (Day::Tuesday, r"mar|marted[iì]|tue|tues|tuesday"),
            (Day::Wednesday, r"mer|mercoled[iì]|wed|wednesday"),
            (Day::Thursday, r"gio|gioved[iì]|thu|thur|thurs|thursday"),
            (Day::Friday, r"ven|venerd[iì]|fri|friday"),
            (Day::Saturday, r"sab|sabato|sat|saturday"),
            (Day::Sunday, r"dom|domenica|sun|sunday"),
        ];
        Patterns {
            clause_split: Regex::new(r"[,;]|\band\b|\be\b").expect("clause pattern"),
            negation: Regex::new(r"\b(?:no|non|never|mai)\b").expect("negation pattern"),
            am: Regex::new(r"\bam\b").expect("am pattern"),
            i_am: Regex::new(r"\bi\s+am\b").expect("i am pattern"),
            pm: Regex::new(r"\bpm\b").expect("pm pattern"),
            mid: Regex::new(r"\bmid").expect("mid pattern"),
            days: day_words
                .into_iter()
                .map(|(day, words)| {
                    let pattern = format!(r"\b(?:{})\b", words);
                    (day, Regex::new(&pattern).expect("day pattern"))
                })
                .collect(),
        }
    })
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// What a single clause says
#[derive(Debug, Default)]
struct Clause {
    days: Vec<Day>,
    negated: bool,
    exclusive: bool,
    weekend: bool,
    long_weekend: bool,
    shift: ShiftPreference,
}

fn scan_clause(clause: &str) -> Clause {
    let p = patterns();

    let mut days: Vec<Day> = p
        .days
        .iter()
        .filter(|(_, re)| re.is_match(clause))
        .map(|(day, _)| *day)
        .collect();

    let weekend = contains_any(clause, &WEEKEND_WORDS)
        || days.contains(&Day::Saturday)
        || days.contains(&Day::Sunday);
    let long_weekend = weekend && contains_any(clause, &LONG_WORDS);
    if long_weekend {
        for day in LONG_WEEKEND {
            if !days.contains(&day) {
                days.push(day);
            }
        }
    }

    let shift = ShiftPreference {
        morning_only: contains_any(clause, &MORNING_WORDS) || p.am.is_match(&p.i_am.replace_all(clause, " ")),
        afternoon_only: contains_any(clause, &AFTERNOON_WORDS) || p.pm.is_match(clause),
        mid_day_only: contains_any(clause, &MID_DAY_WORDS) || p.mid.is_match(clause),
        split_shift: contains_any(clause, &SPLIT_WORDS),
    };

    Clause {
        days,
        negated: p.negation.is_match(clause),
        exclusive: contains_any(clause, &EXCLUSIVE_WORDS),
        weekend,
        long_weekend,
        shift,
    }
}

/// Turns a preference string into constraints. Unrecognised text yields the
/// fully flexible default.
pub fn parse_preferences(text: &str) -> ParsedPreferences {
    let lowered = text.to_lowercase();
    let whole = lowered.trim();
    let mut prefs = ParsedPreferences::default();
    if whole.is_empty() {
        return prefs;
    }

    for raw_clause in patterns().clause_split.split(whole) {
        let clause = raw_clause.trim();
        if clause.is_empty() {
            continue;
        }
        let scan = scan_clause(clause);

        for &day in &scan.days {
            if scan.negated {
                prefs.blocked_days.insert(day);
            } else if scan.exclusive {
                prefs.required_days.insert(day);
            }
        }

        if scan.weekend && !scan.long_weekend {
            if scan.negated {
                prefs.no_weekend = true;
            } else if scan.exclusive || whole == "weekend" {
                prefs.weekend_only = true;
            }
        }

        if !scan.shift.is_flexible() {
            if scan.days.is_empty() {
                prefs.general.merge(scan.shift);
            } else {
                for &day in &scan.days {
                    prefs.day_overrides.entry(day).or_default().merge(scan.shift);
                }
            }
        }
    }

    // a required day is never also blocked
    let required = prefs.required_days.clone();
    prefs.blocked_days.retain(|day| !required.contains(day));

    prefs
}
