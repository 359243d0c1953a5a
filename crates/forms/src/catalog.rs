//! Service catalog: the identifiers a visitor can pick in the inquiry wizard
//! and the display labels the agency inbox expects.

/// Catalog order is also render order.
pub const SERVICES: &[(&str, &str)] = &[
    ("web", "Web Development"),
    ("mobile", "Mobile Apps"),
    ("ai", "AI Integration"),
    ("design", "UI/UX Design"),
    ("cloud", "Cloud & DevOps"),
    ("consulting", "Tech Consulting"),
];

pub fn label(id: &str) -> Option<&'static str> {
    SERVICES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, label)| *label)
}

pub fn is_known(id: &str) -> bool {
    label(id).is_some()
}

/// Maps identifiers to labels. Known services come out in catalog order;
/// unknown identifiers are passed through verbatim after them. No duplicates.
pub fn labels<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ids: Vec<String> = ids
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mut out: Vec<String> = SERVICES
        .iter()
        .filter(|(id, _)| ids.iter().any(|s| s == id))
        .map(|(_, label)| label.to_string())
        .collect();

    for id in &ids {
        if !is_known(id) && !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

/// Comma-joined labels, as shown in the notification email.
pub fn render<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let labels = labels(ids);
    if labels.is_empty() {
        "Not specified".to_string()
    } else {
        labels.join(", ")
    }
}
