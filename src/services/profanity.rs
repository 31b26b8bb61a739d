use lazy_static::lazy_static;
use regex::Regex;

// Short denylist; the mobile clients do their own display-side filtering
// and moderation handles the rest via reports.
const DENYLIST: &[&str] = &[
    "arse", "arsehole", "asshole", "bastard", "bitch", "bollocks", "crap",
    "cunt", "dick", "dickhead", "fuck", "fucker", "fucking", "motherfucker",
    "nigger", "piss", "prick", "pussy", "shit", "slut", "twat", "wanker",
];

lazy_static! {
    static ref DENYLIST_RE: Regex = {
        let pattern = format!(r"(?i)\b({})\b", DENYLIST.join("|"));
        Regex::new(&pattern).expect("denylist pattern is valid")
    };
}

/// Replace denylisted words with asterisks, keeping the original length.
/// Best-effort: never fails, unmatched text passes through unchanged.
pub fn clean(text: &str) -> String {
    DENYLIST_RE
        .replace_all(text, |caps: &regex::Captures| "*".repeat(caps[0].len()))
        .into_owned()
}
