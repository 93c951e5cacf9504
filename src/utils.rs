use std::collections::BTreeSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::NaiveDate;
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Track;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Parses a catalog release date, honouring its precision.
///
/// `year` and `month` precision dates resolve to the first day of the period.
/// Without a precision hint the shape of the string decides.
pub fn parse_release_date(date: &str, precision: Option<&str>) -> Option<NaiveDate> {
    let date = date.trim();
    let precision = precision.unwrap_or(match date.len() {
        4 => "year",
        7 => "month",
        _ => "day",
    });

    match precision {
        "year" => NaiveDate::parse_from_str(&format!("{date}-01-01"), DATE_FORMAT).ok(),
        "month" => NaiveDate::parse_from_str(&format!("{date}-01"), DATE_FORMAT).ok(),
        _ => NaiveDate::parse_from_str(date, DATE_FORMAT).ok(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reads the content of the last-run file.
pub fn parse_date_file(content: &str) -> Result<NaiveDate, String> {
    let trimmed = content.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| format!("'{trimmed}' is not a YYYY-MM-DD date ({e})"))
}

/// Reads the newline separated track id file. Blank lines are ignored.
pub fn parse_track_ids(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

pub fn encode_track_ids(ids: &BTreeSet<String>) -> String {
    ids.iter().map(|id| format!("{id}\n")).collect()
}

/// Number of digits needed to print `count`.
pub fn index_width(count: usize) -> usize {
    count.to_string().len()
}

pub fn padded_index(index: usize, width: usize) -> String {
    format!("{index:0width$}")
}

/// `Artist A, Artist B - Track`
pub fn describe_track(track: &Track) -> String {
    format!("{} - {}", track.artist_names.join(", "), track.display_name)
}

/// Report lines for the added tracks, numbered from 1 and zero padded to
/// the width of the total count.
pub fn report_lines(descriptions: &[String]) -> Vec<String> {
    let width = index_width(descriptions.len());
    descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {}", padded_index(i + 1, width), d))
        .collect()
}

/// Accepts a bare playlist id, a `spotify:playlist:` URI or an
/// `open.spotify.com/playlist/` URL.
pub fn normalize_playlist_id(value: &str) -> Option<String> {
    let value = value.trim();
    let id = if let Some(rest) = value.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some(idx) = value.find("/playlist/") {
        let rest = &value[idx + "/playlist/".len()..];
        rest.split(['?', '/', '#']).next().unwrap_or_default()
    } else {
        value
    };

    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}
