// Activity identifiers
//
// Format: "<trace_id>:<start_lt>-<action_id>[:<suffix>]". The logical time
// keeps same-timestamp activities sortable; the suffix distinguishes the
// second side of a two-sided liquidity operation ("additional") and the
// synthesized excess row ("excess"). Detail loading re-keys off this id,
// so it must round-trip.

/// Suffix of the second activity of a two-sided liquidity operation
pub const ADDITIONAL_SUFFIX: &str = "additional";

/// Sub id of the synthesized excess activity
pub const EXCESS_SUB_ID: &str = "excess";

/// Assemble an id from its parts
pub fn build_tx_id(hash: &str, sub_id: Option<&str>, suffix: Option<&str>) -> String {
    match (sub_id, suffix) {
        (None, None) => hash.to_string(),
        (Some(sub_id), None) => format!("{}:{}", hash, sub_id),
        (sub_id, Some(suffix)) => format!("{}:{}:{}", hash, sub_id.unwrap_or_default(), suffix),
    }
}

/// Build the id of the activity derived from one action
pub fn build_activity_id(trace_id: &str, start_lt: u64, action_id: &str) -> String {
    format!("{}:{}-{}", trace_id, start_lt, action_id)
}

/// Build the id of the second displayed activity of the same action
pub fn build_additional_activity_id(trace_id: &str, start_lt: u64, action_id: &str) -> String {
    format!("{}:{}-{}:{}", trace_id, start_lt, action_id, ADDITIONAL_SUFFIX)
}

/// A decomposed activity id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedActivityId {
    pub trace_id: String,
    pub sub_id: Option<String>,
    pub suffix: Option<String>,
}

/// Split an activity id back into its parts
pub fn parse_activity_id(id: &str) -> ParsedActivityId {
    let mut parts = id.splitn(3, ':');
    let trace_id = parts.next().unwrap_or_default().to_string();
    let sub_id = parts.next().map(str::to_string);
    let suffix = parts.next().map(str::to_string);
    ParsedActivityId { trace_id, sub_id, suffix }
}

/// Split a "<start_lt>-<action_id>" sub id
pub fn parse_action_sub_id(sub_id: &str) -> (Option<u64>, Option<&str>) {
    match sub_id.split_once('-') {
        Some((lt, action_id)) => (lt.parse().ok(), Some(action_id)),
        None => (sub_id.parse().ok(), None),
    }
}
