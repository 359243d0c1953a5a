//! Notification emails sent to the agency inboxes.
//!
//! Every value a visitor typed is HTML-escaped before it lands in markup.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EmailAttachment, OutgoingEmail};

/// A labelled summary of one submission.
pub struct Notification<'a> {
    pub heading: &'a str,
    pub subject: String,
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub rows: Vec<(&'a str, String)>,
    /// Free text shown below the table (message, cover letter).
    pub body: Option<(&'a str, &'a str)>,
}

impl Notification<'_> {
    pub fn into_email(
        self,
        to: &str,
        reply_to: Option<&str>,
        attachments: Vec<EmailAttachment>,
    ) -> OutgoingEmail {
        let mut html = format!("<h2>{}</h2>\n<table>\n", escape(self.heading));
        let mut text = format!("{}\n\n", self.heading);

        for (label, value) in &self.rows {
            let value = if value.trim().is_empty() { "-" } else { value.as_str() };
            html.push_str(&format!(
                "  <tr><td><strong>{}</strong></td><td>{}</td></tr>\n",
                escape(label),
                escape(value)
            ));
            text.push_str(&format!("{label}: {value}\n"));
        }
        html.push_str("</table>\n");

        if let Some((label, body)) = self.body.filter(|(_, b)| !b.trim().is_empty()) {
            html.push_str(&format!(
                "<h3>{}</h3>\n<p>{}</p>\n",
                escape(label),
                escape(body).replace('\n', "<br>")
            ));
            text.push_str(&format!("\n{label}:\n{body}\n"));
        }

        let footer = format!(
            "Reference {} - received {}",
            self.reference,
            self.submitted_at.format("%Y-%m-%d %H:%M UTC")
        );
        html.push_str(&format!("<p><small>{}</small></p>\n", escape(&footer)));
        text.push_str(&format!("\n{footer}\n"));

        OutgoingEmail {
            to: vec![to.to_string()],
            reply_to: reply_to.map(str::to_string),
            subject: self.subject,
            html,
            text,
            attachments,
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
