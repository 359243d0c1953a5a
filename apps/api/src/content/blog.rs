use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub author: &'static str,
    /// ISO date, `YYYY-MM-DD`.
    pub published: &'static str,
    pub read_minutes: u32,
    pub tags: &'static [&'static str],
    pub body: &'static str,
}

/// Listing view without the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub slug: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub author: &'static str,
    pub published: &'static str,
    pub read_minutes: u32,
    pub tags: &'static [&'static str],
}

impl BlogPost {
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.published, "%Y-%m-%d").ok()
    }

    pub fn summary(&self) -> BlogSummary {
        BlogSummary {
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            author: self.author,
            published: self.published,
            read_minutes: self.read_minutes,
            tags: self.tags,
        }
    }
}

pub static POSTS: &[BlogPost] = &[
    BlogPost {
        slug: "choosing-a-tech-stack",
        title: "Choosing a Tech Stack Without Regret",
        excerpt: "A practical checklist for picking tools your team can live with.",
        author: "Priya Raman",
        published: "2026-02-10",
        read_minutes: 6,
        tags: &["engineering", "strategy"],
        body: "Start from the problem, not the framework.\n\nList the constraints you cannot move: team skills, hosting, compliance. Then pick the boring option that satisfies them.",
    },
    BlogPost {
        slug: "shipping-ai-features",
        title: "Shipping AI Features Users Trust",
        excerpt: "Structured outputs, fallbacks, and honest error states.",
        author: "Marcus Webb",
        published: "2026-03-18",
        read_minutes: 8,
        tags: &["ai", "product"],
        body: "Language models are probabilistic. Your product should not be.\n\nValidate every response against a contract and show a clear error when it does not fit.",
    },
    BlogPost {
        slug: "design-systems-that-scale",
        title: "Design Systems That Scale",
        excerpt: "Tokens, components, and the governance in between.",
        author: "Lena Ortiz",
        published: "2025-11-04",
        read_minutes: 5,
        tags: &["design"],
        body: "A design system is a product with its own roadmap.\n\nTreat tokens as the API and components as the implementation.",
    },
];

pub fn find(slug: &str) -> Option<&'static BlogPost> {
    POSTS.iter().find(|p| p.slug == slug)
}

/// Newest first, optionally restricted to one tag.
pub fn summaries(tag: Option<&str>) -> Vec<BlogSummary> {
    let tag = tag.map(str::trim).filter(|t| !t.is_empty());
    let mut posts: Vec<&BlogPost> = POSTS
        .iter()
        .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt.eq_ignore_ascii_case(t))))
        .collect();
    posts.sort_by(|a, b| b.published_on().cmp(&a.published_on()));
    posts.into_iter().map(BlogPost::summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_parse() {
        for post in POSTS {
            assert!(post.published_on().is_some(), "bad date on {}", post.slug);
        }
    }

    #[test]
    fn test_summaries_newest_first() {
        let list = summaries(None);
        assert_eq!(list.len(), POSTS.len());
        assert_eq!(list[0].slug, "shipping-ai-features");
        assert_eq!(list.last().unwrap().slug, "design-systems-that-scale");
    }

    #[test]
    fn test_tag_filter() {
        let list = summaries(Some("AI"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].slug, "shipping-ai-features");
    }

    #[test]
    fn test_find() {
        assert!(find("design-systems-that-scale").is_some());
        assert!(find("missing").is_none());
    }
}
