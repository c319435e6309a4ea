// src/utils/html.rs

/// Clean uploaded question text using the ammonia library.
///
/// Questions are rendered as HTML by the browser client, so anything a
/// teacher uploads goes through a whitelist: safe formatting tags (<b>, <i>,
/// <p>) stay, <script>, <iframe> and event-handler attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
