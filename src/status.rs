//! Post text for a front page.

/// Compose the status text for one paper.
///
/// With a local date the post reads `name / place / date / link`, one per
/// line; without one it is introduced as today's front page.
pub fn compose_status(name: &str, place: &str, link: &str, local_date: Option<&str>) -> String {
    match local_date {
        Some(date) => format!("{name}\n{place}\n{date}\n{link}"),
        None => format!("Today's front page from:\n{name}\n{place}\n{link}"),
    }
}
